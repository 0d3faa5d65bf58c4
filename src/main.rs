use clap::Parser;
use watch_scraper::utils::{logger, validation::Validate};
use watch_scraper::{
    ChromiumFetcher, CliConfig, ListingPipeline, LocalStorage, ScrapeEngine, ScrapeError,
    ScraperConfig,
};

fn exit_with(e: &ScrapeError) -> ! {
    tracing::error!(
        "❌ Scrape failed at {:?} stage: {}",
        e.stage(),
        e
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn load_config(cli: &CliConfig) -> watch_scraper::Result<ScraperConfig> {
    let config = cli.resolve()?;
    config.validate()?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting watch-scraper");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = load_config(&cli).unwrap_or_else(|e| exit_with(&e));
    if cli.monitor {
        tracing::info!("🔍 Process monitoring enabled");
    }

    let fetcher = ChromiumFetcher::new(config.fetch.clone(), &config.selectors.card)
        .unwrap_or_else(|e| exit_with(&e));
    let storage = LocalStorage::new(".");
    let pipeline =
        ListingPipeline::new(fetcher, storage, config).unwrap_or_else(|e| exit_with(&e));

    let engine = ScrapeEngine::new_with_monitoring(pipeline, cli.monitor);
    match engine.run().await {
        Ok(report) => {
            println!(
                "✅ Kept {} of {} listings",
                report.retained, report.parsed
            );
            println!("📁 Output saved to: {}", report.output_path);
        }
        Err(e) => exit_with(&e),
    }
}
