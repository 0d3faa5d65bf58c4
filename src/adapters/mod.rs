// Adapters layer: concrete implementations of the domain ports (browser, filesystem).

pub mod chromium;
pub mod storage;
