//! Headless Chromium page source using chromiumoxide.
//!
//! Every fetch owns a fresh browser process for its whole duration. The
//! session is closed explicitly on every return path; if the future is
//! dropped mid-flight, `BrowserSession`'s drop aborts the protocol handler and
//! chromiumoxide's own `Browser` drop kills the child process.

use crate::config::toml_config::FetchConfig;
use crate::core::parser::compile_selector;
use crate::domain::ports::PageSource;
use crate::utils::error::{FetchError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use scraper::{Html, Selector};
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

const BROWSER_NAMES: [&str; 3] = ["google-chrome", "chromium", "chromium-browser"];

/// Configured path first, then well-known binaries on `PATH`.
pub fn find_browser(configured: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = configured {
        return Some(PathBuf::from(path));
    }
    BROWSER_NAMES
        .iter()
        .find_map(|name| which::which(name).ok())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    Blocked(String),
    Ready,
    Loading,
}

/// Bot-check markers take priority over readiness.
pub fn classify_page(markup: &str, ready: &Selector, blocked_markers: &[String]) -> PageState {
    let lowered = markup.to_lowercase();
    if let Some(marker) = blocked_markers
        .iter()
        .find(|m| !m.is_empty() && lowered.contains(&m.to_lowercase()))
    {
        return PageState::Blocked(marker.clone());
    }

    let document = Html::parse_document(markup);
    if document.select(ready).next().is_some() {
        PageState::Ready
    } else {
        PageState::Loading
    }
}

pub struct ChromiumFetcher {
    config: FetchConfig,
    ready_css: String,
    ready: Selector,
}

impl ChromiumFetcher {
    /// `card_selector` is the readiness signal unless `fetch.ready_selector` overrides it.
    pub fn new(config: FetchConfig, card_selector: &str) -> Result<Self> {
        let ready_css = config
            .ready_selector
            .clone()
            .unwrap_or_else(|| card_selector.to_string());
        let ready = compile_selector("fetch.ready_selector", &ready_css)?;
        Ok(Self {
            config,
            ready_css,
            ready,
        })
    }
}

#[async_trait]
impl PageSource for ChromiumFetcher {
    async fn fetch(&self, url: &Url, wait_budget: Duration) -> std::result::Result<String, FetchError> {
        tracing::info!("Navigating to {} using headless browser...", url);
        let session = BrowserSession::launch(&self.config).await?;
        let outcome = session.render(url, wait_budget, self).await;
        session.close().await;
        outcome
    }
}

struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    async fn launch(config: &FetchConfig) -> std::result::Result<Self, FetchError> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg(format!("--user-agent={}", config.user_agent))
            .request_timeout(config.navigation_timeout());

        if !config.headless {
            builder = builder.with_head();
        }
        match find_browser(config.browser_path.as_deref()) {
            Some(path) => {
                tracing::debug!("Using browser at {}", path.display());
                builder = builder.chrome_executable(path);
            }
            None => tracing::debug!("No browser on PATH, relying on auto-detection"),
        }

        let browser_config = builder.build().map_err(|message| FetchError::Launch { message })?;
        let (browser, mut handler) =
            Browser::launch(browser_config)
                .await
                .map_err(|e| FetchError::Launch {
                    message: e.to_string(),
                })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self { browser, handler })
    }

    async fn render(
        &self,
        url: &Url,
        wait_budget: Duration,
        fetcher: &ChromiumFetcher,
    ) -> std::result::Result<String, FetchError> {
        let navigation_failed = |e: chromiumoxide::error::CdpError| FetchError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        };

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(navigation_failed)?;

        let navigation_timeout = fetcher.config.navigation_timeout();
        match tokio::time::timeout(navigation_timeout, page.goto(url.as_str())).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(navigation_failed(e)),
            Err(_) => {
                return Err(FetchError::Timeout {
                    waited: navigation_timeout,
                    waiting_for: format!("navigation to {}", url),
                })
            }
        }

        let poll_interval = fetcher.config.poll_interval();
        let wait_for_cards = async {
            loop {
                let markup = page.content().await.map_err(navigation_failed)?;
                match classify_page(&markup, &fetcher.ready, &fetcher.config.blocked_markers) {
                    PageState::Blocked(marker) => {
                        tracing::warn!("Bot check detected ({:?})", marker);
                        return Err(FetchError::Blocked { marker });
                    }
                    PageState::Ready => return Ok(markup),
                    PageState::Loading => {
                        tracing::debug!("Waiting for {:?} to render", fetcher.ready_css);
                        tokio::time::sleep(poll_interval).await;
                    }
                }
            }
        };

        match tokio::time::timeout(wait_budget, wait_for_cards).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                waited: wait_budget,
                waiting_for: format!("{:?} to appear", fetcher.ready_css),
            }),
        }
    }

    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Browser did not close cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Failed to reap browser process: {}", e);
        }
        tracing::debug!("Browser session closed");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<String> {
        vec!["Are you a human?".to_string()]
    }

    #[test]
    fn test_classify_ready_when_cards_present() {
        let ready = Selector::parse("div.hCKiGj").unwrap();
        let markup = r#"<html><body><div class="hCKiGj">card</div></body></html>"#;
        assert_eq!(classify_page(markup, &ready, &markers()), PageState::Ready);
    }

    #[test]
    fn test_classify_loading_without_cards() {
        let ready = Selector::parse("div.hCKiGj").unwrap();
        let markup = "<html><body><div class=\"spinner\"></div></body></html>";
        assert_eq!(classify_page(markup, &ready, &markers()), PageState::Loading);
    }

    #[test]
    fn test_bot_marker_wins_over_cards() {
        let ready = Selector::parse("div.hCKiGj").unwrap();
        let markup = r#"<html><body><h1>ARE YOU A HUMAN?</h1><div class="hCKiGj">card</div></body></html>"#;
        assert_eq!(
            classify_page(markup, &ready, &markers()),
            PageState::Blocked("Are you a human?".to_string())
        );
    }

    #[test]
    fn test_empty_marker_is_ignored() {
        let ready = Selector::parse("div.hCKiGj").unwrap();
        let blank = vec![String::new()];
        assert_eq!(classify_page("<p></p>", &ready, &blank), PageState::Loading);
    }

    #[test]
    fn test_configured_browser_path_wins() {
        assert_eq!(
            find_browser(Some("/opt/chrome/chrome")),
            Some(PathBuf::from("/opt/chrome/chrome"))
        );
    }

    #[test]
    fn test_ready_selector_override() {
        let config = FetchConfig {
            ready_selector: Some("#results".to_string()),
            ..FetchConfig::default()
        };
        let fetcher = ChromiumFetcher::new(config, "div.hCKiGj").unwrap();
        assert_eq!(fetcher.ready_css, "#results");
        assert!(ChromiumFetcher::new(FetchConfig::default(), "div[").is_err());
    }
}
