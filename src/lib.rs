pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{chromium::ChromiumFetcher, storage::LocalStorage};
pub use app::pipelines::ListingPipeline;
pub use config::ScraperConfig;
pub use crate::core::engine::ScrapeEngine;
pub use domain::model::{Availability, Listing, RunReport};
pub use utils::error::{ExportError, FetchError, ParseItemError, Result, ScrapeError};
