use crate::core::{Pipeline, RunReport};
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

/// Runs a pipeline's stages in order and stops at the first stage error.
/// Errors are returned unlogged; the caller reports them.
pub struct ScrapeEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> ScrapeEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("Starting scrape");

        let listings = self.pipeline.extract().await?;
        let parsed = listings.len();
        self.monitor.log_stage("extract");

        let result = self.pipeline.transform(listings).await?;
        let retained = result.retained.len();
        self.monitor.log_stage("transform");

        let output_path = self.pipeline.load(result).await?;
        self.monitor.log_stage("load");
        self.monitor.log_final_stats();

        tracing::info!(parsed, retained, "Saved {} listings to {}", retained, output_path);
        Ok(RunReport {
            parsed,
            retained,
            output_path,
        })
    }
}
