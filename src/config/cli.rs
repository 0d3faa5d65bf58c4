use crate::config::toml_config::ScraperConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

/// Command-line flags. Each one set here overrides the config file.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "watch-scraper")]
#[command(about = "Scrape a search results page, keep listings under a price ceiling, save them to a spreadsheet")]
pub struct CliConfig {
    #[arg(long, short, help = "TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Search results page URL")]
    pub url: Option<String>,

    #[arg(long, help = "Search terms; replaces the q parameter of the URL")]
    pub query: Option<String>,

    #[arg(long, help = "Keep listings priced strictly below this amount")]
    pub max_price: Option<f64>,

    #[arg(long, short, help = "Spreadsheet to write (overwritten)")]
    pub output: Option<String>,

    #[arg(long, help = "Seconds to wait for product cards to render")]
    pub wait_secs: Option<u64>,

    #[arg(long, help = "Show the browser window")]
    pub headful: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub log_json: bool,

    #[arg(long, help = "Log CPU and memory per stage")]
    pub monitor: bool,
}

impl CliConfig {
    /// Defaults, then the config file if given, then flags.
    pub fn resolve(&self) -> Result<ScraperConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                ScraperConfig::from_file(path)?
            }
            None => ScraperConfig::default(),
        };

        if let Some(url) = &self.url {
            config.source.url = url.clone();
        }
        if let Some(query) = &self.query {
            config.source.query = Some(query.clone());
        }
        if let Some(max_price) = self.max_price {
            config.filter.price_ceiling = max_price;
        }
        if let Some(output) = &self.output {
            config.export.output_path = output.clone();
        }
        if let Some(wait_secs) = self.wait_secs {
            config.fetch.wait_timeout_secs = wait_secs;
        }
        if self.headful {
            config.fetch.headless = false;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_no_flags_gives_defaults() {
        let cli = CliConfig::parse_from(["watch-scraper"]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.filter.price_ceiling, 2000.0);
        assert_eq!(config.export.output_path, "watch_data.xlsx");
        assert!(config.fetch.headless);
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[filter]\nprice_ceiling = 900\n\n[export]\noutput_path = \"from_file.xlsx\""
        )
        .unwrap();

        let cli = CliConfig::parse_from([
            "watch-scraper",
            "--config",
            file.path().to_str().unwrap(),
            "--max-price",
            "1500",
            "--wait-secs",
            "40",
            "--headful",
        ]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.filter.price_ceiling, 1500.0);
        assert_eq!(config.export.output_path, "from_file.xlsx");
        assert_eq!(config.fetch.wait_timeout_secs, 40);
        assert!(!config.fetch.headless);
    }

    #[test]
    fn test_logging_flags() {
        let cli = CliConfig::parse_from(["watch-scraper"]);
        assert!(!cli.log_json);
        assert!(!cli.verbose);

        let cli = CliConfig::parse_from(["watch-scraper", "--log-json", "-v"]);
        assert!(cli.log_json);
        assert!(cli.verbose);
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cli = CliConfig::parse_from(["watch-scraper", "--config", "/definitely/not/here.toml"]);
        assert!(cli.resolve().is_err());
    }
}
