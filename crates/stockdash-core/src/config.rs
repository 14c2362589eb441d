//! Dashboard configuration.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `STOCKDASH_API_BASE_URL` | `http://localhost:8080` | Stock API base URL |
//! | `STOCKDASH_TIMEOUT_MS` | `3000` | Request timeout |
//! | `STOCKDASH_DEFAULT_SYMBOL` | `AAPL` | Symbol shown before any search |
//! | `STOCKDASH_DEFAULT_PERIOD` | `1m` | Initial quick-select period |
//! | `STOCKDASH_FAILURE_POLICY` | `clear` | `clear` or `retain` on fetch failure |
//! | `STOCKDASH_PAGINATED` | `false` | Use the paginated range endpoint |

use crate::api::RangeEndpoint;
use crate::orchestrator::FailurePolicy;
use crate::{ConfigError, Period, Symbol};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_SYMBOL: &str = "AAPL";
pub const DEFAULT_PAGE_SIZE: u32 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub default_symbol: Symbol,
    pub default_period: Period,
    pub failure_policy: FailurePolicy,
    pub paginated: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: 3_000,
            default_symbol: Symbol::from_static(DEFAULT_SYMBOL),
            default_period: Period::default(),
            failure_policy: FailurePolicy::default(),
            paginated: false,
        }
    }
}

impl DashboardConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("STOCKDASH_API_BASE_URL") {
            config.base_url = non_empty("STOCKDASH_API_BASE_URL", value)?;
        }

        if let Some(value) = lookup("STOCKDASH_TIMEOUT_MS") {
            config.timeout_ms = value.trim().parse::<u64>().map_err(|error| {
                ConfigError::InvalidValue {
                    key: "STOCKDASH_TIMEOUT_MS",
                    value: value.clone(),
                    reason: error.to_string(),
                }
            })?;
        }

        if let Some(value) = lookup("STOCKDASH_DEFAULT_SYMBOL") {
            config.default_symbol =
                Symbol::parse(&value).map_err(|error| ConfigError::InvalidValue {
                    key: "STOCKDASH_DEFAULT_SYMBOL",
                    value: value.clone(),
                    reason: error.to_string(),
                })?;
        }

        if let Some(value) = lookup("STOCKDASH_DEFAULT_PERIOD") {
            config.default_period =
                value
                    .parse::<Period>()
                    .map_err(|error| ConfigError::InvalidValue {
                        key: "STOCKDASH_DEFAULT_PERIOD",
                        value: value.clone(),
                        reason: error.to_string(),
                    })?;
        }

        if let Some(value) = lookup("STOCKDASH_FAILURE_POLICY") {
            config.failure_policy =
                FailurePolicy::parse(&value).ok_or_else(|| ConfigError::InvalidValue {
                    key: "STOCKDASH_FAILURE_POLICY",
                    value: value.clone(),
                    reason: String::from("expected 'clear' or 'retain'"),
                })?;
        }

        if let Some(value) = lookup("STOCKDASH_PAGINATED") {
            config.paginated = parse_flag("STOCKDASH_PAGINATED", &value)?;
        }

        Ok(config)
    }

    pub fn range_endpoint(&self) -> RangeEndpoint {
        if self.paginated {
            RangeEndpoint::Paginated {
                page: 0,
                size: DEFAULT_PAGE_SIZE,
            }
        } else {
            RangeEndpoint::Unpaginated
        }
    }
}

fn non_empty(key: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Empty { key });
    }
    Ok(value.trim().to_owned())
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_owned(),
            reason: String::from("expected a boolean"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = DashboardConfig::from_lookup(|_| None).expect("defaults are valid");
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.default_symbol.as_str(), "AAPL");
        assert_eq!(config.range_endpoint(), RangeEndpoint::Unpaginated);
    }

    #[test]
    fn reads_every_variable() {
        let config = DashboardConfig::from_lookup(lookup_from(&[
            ("STOCKDASH_API_BASE_URL", " https://stocks.example.com "),
            ("STOCKDASH_TIMEOUT_MS", "1500"),
            ("STOCKDASH_DEFAULT_SYMBOL", "msft"),
            ("STOCKDASH_DEFAULT_PERIOD", "6m"),
            ("STOCKDASH_FAILURE_POLICY", "retain"),
            ("STOCKDASH_PAGINATED", "true"),
        ]))
        .expect("valid config");

        assert_eq!(config.base_url, "https://stocks.example.com");
        assert_eq!(config.timeout_ms, 1500);
        assert_eq!(config.default_symbol.as_str(), "MSFT");
        assert_eq!(config.default_period, Period::SixMonths);
        assert_eq!(config.failure_policy, FailurePolicy::RetainStale);
        assert!(matches!(
            config.range_endpoint(),
            RangeEndpoint::Paginated { page: 0, size: 500 }
        ));
    }

    #[test]
    fn reports_the_offending_key() {
        let err = DashboardConfig::from_lookup(lookup_from(&[("STOCKDASH_TIMEOUT_MS", "soon")]))
            .expect_err("must fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "STOCKDASH_TIMEOUT_MS",
                ..
            }
        ));

        let err = DashboardConfig::from_lookup(lookup_from(&[("STOCKDASH_API_BASE_URL", "  ")]))
            .expect_err("must fail");
        assert_eq!(
            err,
            ConfigError::Empty {
                key: "STOCKDASH_API_BASE_URL"
            }
        );
    }
}
