use crate::utils::error::{Result, ScrapeError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ScrapeError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Prices and ceilings: finite and not below zero.
pub fn validate_price(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a finite, non-negative amount".to_string(),
        });
    }
    Ok(())
}

/// Sheet names follow the spreadsheet limits: 1-31 chars, none of `[]:*?/\`.
pub fn validate_sheet_name(field_name: &str, name: &str) -> Result<()> {
    let invalid = |reason: &str| ScrapeError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() || name.chars().count() > 31 {
        return Err(invalid("Sheet name must be 1 to 31 characters long"));
    }
    if name.chars().any(|c| "[]:*?/\\".contains(c)) {
        return Err(invalid("Sheet name cannot contain any of []:*?/\\"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.url", "https://example.com/search?q=x").is_ok());
        assert!(validate_url("source.url", "http://example.com").is_ok());
        assert!(validate_url("source.url", "").is_err());
        assert!(validate_url("source.url", "invalid-url").is_err());
        assert!(validate_url("source.url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("fetch.wait_timeout_secs", 5, 1).is_ok());
        assert!(validate_positive_number("fetch.wait_timeout_secs", 0, 1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("filter.price_ceiling", 2000.0).is_ok());
        assert!(validate_price("filter.price_ceiling", 0.0).is_ok());
        assert!(validate_price("filter.price_ceiling", -1.0).is_err());
        assert!(validate_price("filter.price_ceiling", f64::NAN).is_err());
        assert!(validate_price("filter.price_ceiling", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_sheet_name() {
        assert!(validate_sheet_name("export.sheet_name", "Sheet1").is_ok());
        assert!(validate_sheet_name("export.sheet_name", "").is_err());
        assert!(validate_sheet_name("export.sheet_name", "a/b").is_err());
        assert!(validate_sheet_name("export.sheet_name", &"x".repeat(32)).is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("export.output_path", "watch_data.xlsx").is_ok());
        assert!(validate_path("export.output_path", "").is_err());
        assert!(validate_path("export.output_path", "bad\0path").is_err());
    }
}
