pub mod engine;
pub mod export;
pub mod filter;
pub mod parser;

pub use crate::domain::model::{Listing, RunReport, TransformResult};
pub use crate::domain::ports::{ConfigProvider, PageSource, Pipeline, Storage};
pub use crate::utils::error::Result;
