use crate::core::export::XlsxExporter;
use crate::core::filter::PriceFilter;
use crate::core::parser::ListingParser;
use crate::core::{ConfigProvider, Listing, PageSource, Pipeline, Storage, TransformResult};
use crate::utils::error::Result;

/// Search page → listings → price filter → spreadsheet.
pub struct ListingPipeline<P: PageSource, S: Storage, C: ConfigProvider> {
    source: P,
    exporter: XlsxExporter<S>,
    config: C,
    parser: ListingParser,
    filter: PriceFilter,
}

impl<P: PageSource, S: Storage, C: ConfigProvider> ListingPipeline<P, S, C> {
    pub fn new(source: P, storage: S, config: C) -> Result<Self> {
        let parser = ListingParser::new(config.selectors())?;
        let filter = PriceFilter::new(config.price_ceiling())?;
        let exporter = XlsxExporter::new(storage, config.sheet_name());
        Ok(Self {
            source,
            exporter,
            config,
            parser,
            filter,
        })
    }
}

#[async_trait::async_trait]
impl<P: PageSource, S: Storage, C: ConfigProvider> Pipeline for ListingPipeline<P, S, C> {
    async fn extract(&self) -> Result<Vec<Listing>> {
        let url = self.config.search_url()?;
        let markup = self.source.fetch(&url, self.config.wait_budget()).await?;
        tracing::debug!("Fetched {} bytes of markup", markup.len());

        Ok(self.parser.parse_markup(&markup))
    }

    async fn transform(&self, listings: Vec<Listing>) -> Result<TransformResult> {
        let result = self.filter.apply(listings);
        tracing::info!(
            excluded = result.excluded,
            "Found {} listings under {} {}",
            result.retained.len(),
            self.filter.ceiling(),
            self.config.currency()
        );
        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let path = self.config.output_path();
        self.exporter.export(&result.retained, path).await?;
        Ok(path.to_string())
    }
}
