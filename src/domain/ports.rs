use crate::config::toml_config::SelectorConfig;
use crate::domain::model::{Listing, TransformResult};
use crate::utils::error::{ExportError, FetchError, Result};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Produces the rendered markup of a search page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url, wait_budget: Duration) -> std::result::Result<String, FetchError>;
}

pub trait Storage: Send + Sync {
    /// Replaces whatever is at `path` with `data`.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = std::result::Result<(), ExportError>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn search_url(&self) -> Result<Url>;
    fn wait_budget(&self) -> Duration;
    fn selectors(&self) -> &SelectorConfig;
    fn price_ceiling(&self) -> f64;
    fn currency(&self) -> &str;
    fn output_path(&self) -> &str;
    fn sheet_name(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Listing>>;
    async fn transform(&self, listings: Vec<Listing>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}

