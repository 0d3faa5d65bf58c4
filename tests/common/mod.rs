#![allow(dead_code)]

use async_trait::async_trait;
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::path::Path;
use std::time::Duration;
use url::Url;
use watch_scraper::core::PageSource;
use watch_scraper::FetchError;

/// Canned page source: serves fixed markup, or times out when given none.
pub struct StaticSource {
    markup: Option<String>,
}

impl StaticSource {
    pub fn serving(markup: impl Into<String>) -> Self {
        Self {
            markup: Some(markup.into()),
        }
    }

    pub fn timing_out() -> Self {
        Self {
            markup: None,
        }
    }
}

#[async_trait]
impl PageSource for StaticSource {
    async fn fetch(&self, _url: &Url, wait_budget: Duration) -> Result<String, FetchError> {
        self.markup.clone().ok_or(FetchError::Timeout {
            waited: wait_budget,
            waiting_for: "\"div.hCKiGj\" to appear".to_string(),
        })
    }
}

pub fn card(name: &str, brand: &str, price: &str) -> String {
    format!(
        r#"<div class="hCKiGj"><div class="syl9yP">{brand}</div><a class="WKTcLC" title="{name}" href="/p/{brand}">{name}</a><div class="hl05eU"><div class="Nx9bqj">{price}</div></div></div>"#
    )
}

pub fn card_without_price(name: &str, brand: &str) -> String {
    format!(r#"<div class="hCKiGj"><div class="syl9yP">{brand}</div><a class="WKTcLC">{name}</a></div>"#)
}

pub fn page(cards: &[String]) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>Search</title></head><body><div id=\"container\">{}</div></body></html>",
        cards.concat()
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub availability: String,
}

fn text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Reads the header and data rows of the first worksheet.
pub fn read_sheet(path: &Path, sheet: &str) -> (Vec<String>, Vec<Row>) {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("open workbook");
    let range = workbook.worksheet_range(sheet).expect("read sheet");
    let mut rows = range.rows();

    let header = rows
        .next()
        .map(|r| r.iter().map(text).collect())
        .unwrap_or_default();

    let data = rows
        .map(|r| Row {
            name: text(&r[0]),
            brand: text(&r[1]),
            price: match &r[2] {
                Data::Float(f) => *f,
                Data::Int(i) => *i as f64,
                other => panic!("price cell is not numeric: {other:?}"),
            },
            availability: text(&r[3]),
        })
        .collect();

    (header, data)
}
