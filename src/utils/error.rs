use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures while driving the browser to a rendered search page.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to launch browser: {message}")]
    Launch { message: String },

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("timed out after {waited:?} waiting for {waiting_for}")]
    Timeout {
        waited: Duration,
        waiting_for: String,
    },

    #[error("page blocked by bot detection (matched \"{marker}\")")]
    Blocked { marker: String },
}

/// Why a single product card was skipped. Never escapes the parser.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseItemError {
    #[error("card has no product name")]
    MissingName,

    #[error("card has no price")]
    MissingPrice,

    #[error("price text {text:?} is not a number")]
    MalformedPrice { text: String },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to encode workbook: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in field '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for field '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// The pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Config,
    Fetch,
    Export,
}

impl ScrapeError {
    pub fn stage(&self) -> ErrorStage {
        match self {
            ScrapeError::Fetch(_) => ErrorStage::Fetch,
            ScrapeError::Export(_) => ErrorStage::Export,
            ScrapeError::IoError(_)
            | ScrapeError::ConfigValidationError { .. }
            | ScrapeError::InvalidConfigValueError { .. } => ErrorStage::Config,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.stage() {
            ErrorStage::Config => 2,
            ErrorStage::Fetch => 3,
            ErrorStage::Export => 4,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScrapeError::Fetch(FetchError::Blocked { .. }) => {
                "The site served a bot check instead of search results".to_string()
            }
            ScrapeError::Fetch(FetchError::Timeout { waited, .. }) => {
                format!("The search page did not finish loading within {:?}", waited)
            }
            ScrapeError::Fetch(e) => format!("Could not load the search page: {}", e),
            ScrapeError::Export(e) => format!("Could not save the spreadsheet: {}", e),
            ScrapeError::IoError(e) => format!("Could not read configuration: {}", e),
            ScrapeError::ConfigValidationError { field, message } => {
                format!("Invalid configuration ({}): {}", field, message)
            }
            ScrapeError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("Invalid configuration ({} = {:?}): {}", field, value, reason),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScrapeError::Fetch(FetchError::Launch { .. }) => {
                "Install Chrome or Chromium, or set fetch.browser_path in the config file"
            }
            ScrapeError::Fetch(FetchError::Blocked { .. }) => {
                "Run from a different network or try again later"
            }
            ScrapeError::Fetch(FetchError::Timeout { .. }) => {
                "Raise --wait-secs, or check that the card selector still matches the site"
            }
            ScrapeError::Fetch(FetchError::Navigation { .. }) => {
                "Check the search URL and your network connection"
            }
            ScrapeError::Export(_) => "Choose an output path in a writable directory",
            ScrapeError::IoError(_) => "Check that the config file exists and is readable",
            ScrapeError::ConfigValidationError { .. }
            | ScrapeError::InvalidConfigValueError { .. } => {
                "Fix the reported field in the config file or on the command line"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_and_exit_code() {
        let fetch: ScrapeError = FetchError::Timeout {
            waited: Duration::from_secs(5),
            waiting_for: "div.card".to_string(),
        }
        .into();
        assert_eq!(fetch.stage(), ErrorStage::Fetch);
        assert_eq!(fetch.exit_code(), 3);

        let export: ScrapeError = ExportError::Write {
            path: PathBuf::from("/nope/watch_data.xlsx"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(export.stage(), ErrorStage::Export);
        assert_eq!(export.exit_code(), 4);
        assert!(export.user_friendly_message().contains("/nope/watch_data.xlsx"));

        let config = ScrapeError::ConfigValidationError {
            field: "selectors.card".to_string(),
            message: "empty".to_string(),
        };
        assert_eq!(config.exit_code(), 2);
    }

    #[test]
    fn test_blocked_message_names_bot_check() {
        let err: ScrapeError = FetchError::Blocked {
            marker: "Are you a human?".to_string(),
        }
        .into();
        assert!(err.user_friendly_message().contains("bot check"));
        assert!(err.to_string().contains("Are you a human?"));
    }
}
