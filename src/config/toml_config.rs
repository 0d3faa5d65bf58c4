use crate::core::export::DEFAULT_SHEET_NAME;
use crate::core::filter::DEFAULT_PRICE_CEILING;
use crate::core::parser::ListingParser;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SEARCH_URL: &str = "https://www.flipkart.com/search?q=watches+for+men+under+2000";
pub const DEFAULT_OUTPUT_PATH: &str = "watch_data.xlsx";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub source: SourceConfig,
    pub fetch: FetchConfig,
    pub selectors: SelectorConfig,
    pub filter: FilterConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    /// Replaces the `q` parameter of `url` when set.
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub headless: bool,
    pub browser_path: Option<String>,
    pub user_agent: String,
    pub navigation_timeout_secs: u64,
    pub wait_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub ready_selector: Option<String>,
    pub blocked_markers: Vec<String>,
}

/// CSS selectors for one product card and its fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub card: String,
    pub name: String,
    pub brand: String,
    pub price: String,
    pub availability: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub price_ceiling: f64,
    /// Label only; prices are compared in whatever currency the page shows.
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_path: String,
    pub sheet_name: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SEARCH_URL.to_string(),
            query: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            headless: true,
            browser_path: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            navigation_timeout_secs: 30,
            wait_timeout_secs: 15,
            poll_interval_ms: 500,
            ready_selector: None,
            blocked_markers: vec!["Are you a human?".to_string()],
        }
    }
}

impl FetchConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: "div.hCKiGj".to_string(),
            name: "a.WKTcLC".to_string(),
            brand: "div.syl9yP".to_string(),
            price: "div.Nx9bqj".to_string(),
            availability: None,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            price_ceiling: DEFAULT_PRICE_CEILING,
            currency: "INR".to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

impl ScraperConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScrapeError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScrapeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            ScrapeError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn search_url(&self) -> Result<Url> {
        let mut url =
            Url::parse(&self.source.url).map_err(|e| ScrapeError::InvalidConfigValueError {
                field: "source.url".to_string(),
                value: self.source.url.clone(),
                reason: format!("Invalid URL format: {}", e),
            })?;

        if let Some(query) = self.source.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(key, _)| key != "q")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            url.query_pairs_mut()
                .clear()
                .extend_pairs(kept)
                .append_pair("q", query);
        }

        Ok(url)
    }
}

impl Validate for ScraperConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.url", &self.source.url)?;
        self.search_url()?;

        validation::validate_positive_number(
            "fetch.navigation_timeout_secs",
            self.fetch.navigation_timeout_secs,
            1,
        )?;
        validation::validate_positive_number(
            "fetch.wait_timeout_secs",
            self.fetch.wait_timeout_secs,
            1,
        )?;
        validation::validate_positive_number("fetch.poll_interval_ms", self.fetch.poll_interval_ms, 10)?;
        validation::validate_non_empty_string("fetch.user_agent", &self.fetch.user_agent)?;

        validation::validate_non_empty_string("selectors.card", &self.selectors.card)?;
        validation::validate_non_empty_string("selectors.name", &self.selectors.name)?;
        validation::validate_non_empty_string("selectors.price", &self.selectors.price)?;
        ListingParser::new(&self.selectors)?;

        validation::validate_price("filter.price_ceiling", self.filter.price_ceiling)?;

        validation::validate_path("export.output_path", &self.export.output_path)?;
        validation::validate_sheet_name("export.sheet_name", &self.export.sheet_name)?;

        Ok(())
    }
}

impl ConfigProvider for ScraperConfig {
    fn search_url(&self) -> Result<Url> {
        ScraperConfig::search_url(self)
    }

    fn wait_budget(&self) -> Duration {
        self.fetch.wait_timeout()
    }

    fn selectors(&self) -> &SelectorConfig {
        &self.selectors
    }

    fn price_ceiling(&self) -> f64 {
        self.filter.price_ceiling
    }

    fn currency(&self) -> &str {
        &self.filter.currency
    }

    fn output_path(&self) -> &str {
        &self.export.output_path
    }

    fn sheet_name(&self) -> &str {
        &self.export.sheet_name
    }
}
