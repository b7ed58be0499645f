//! # Service Configuration
//!
//! Process configuration for the HTTP service, read once at start-up.
//! Invalid values fail start-up rather than falling back to defaults.
//!
//! | Variable                    | Default                                        |
//! |-----------------------------|------------------------------------------------|
//! | `PORT`                      | `3000`                                         |
//! | `VCT_BIND_ADDR`             | `0.0.0.0`                                      |
//! | `VCT_RESOLVER_URL`          | `https://dev.uniresolver.io/1.0/identifiers/`  |
//! | `VCT_RESOLVER_TIMEOUT_SECS` | `30`                                           |
//! | `VCT_MAX_UPLOAD_BYTES`      | `1048576`                                      |
//! | `VCT_HASH_KEY_ORDER`        | `insertion`                                    |
//! | `VCT_CLOCK_SKEW_SECS`       | `300`                                          |
//! | `VCT_SCHEMA_PATH`           | embedded credential schema                     |
//! | `VCT_METRICS_ENABLED`       | `true` (anything but `false` enables)          |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;
use vct_core::KeyOrder;
use vct_did::http::{DEFAULT_RESOLVER_URL, DEFAULT_TIMEOUT};
use vct_verify::{VerifierConfig, DEFAULT_CLOCK_SKEW};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default upload size limit.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable holds a value that does not parse.
    #[error("invalid value for {var}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Parser message.
        reason: String,
    },
}

/// HTTP service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen port.
    pub port: u16,
    /// Listen address.
    pub bind_addr: IpAddr,
    /// Universal Resolver base URL for DID methods not handled locally.
    pub resolver_url: Url,
    /// Timeout enforced by the HTTP resolver.
    pub resolver_timeout: Duration,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
    /// Schema file overriding the embedded credential schema.
    pub schema_path: Option<PathBuf>,
    /// Verification pipeline tunables.
    pub verifier: VerifierConfig,
    /// Serve `GET /metrics` and record request metrics.
    pub metrics_enabled: bool,
}

impl AppConfig {
    /// Configuration with every variable unset.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::from_lookup(|_| None)
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = VerifierConfig::default();
        let resolver_url = match parse_var::<Url>(&lookup, "VCT_RESOLVER_URL")? {
            Some(url) => url,
            None => Url::parse(DEFAULT_RESOLVER_URL).map_err(|e| ConfigError::Invalid {
                var: "VCT_RESOLVER_URL",
                reason: e.to_string(),
            })?,
        };
        let skew_secs: Option<u64> = parse_var(&lookup, "VCT_CLOCK_SKEW_SECS")?;
        let timeout_secs: Option<u64> = parse_var(&lookup, "VCT_RESOLVER_TIMEOUT_SECS")?;

        Ok(Self {
            port: parse_var(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT),
            bind_addr: parse_var(&lookup, "VCT_BIND_ADDR")?
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            resolver_url,
            resolver_timeout: timeout_secs.map(Duration::from_secs).unwrap_or(DEFAULT_TIMEOUT),
            max_upload_bytes: parse_var(&lookup, "VCT_MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            schema_path: lookup("VCT_SCHEMA_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            verifier: VerifierConfig {
                hash_key_order: parse_var::<KeyOrder>(&lookup, "VCT_HASH_KEY_ORDER")?
                    .unwrap_or(defaults.hash_key_order),
                clock_skew: skew_secs.map(Duration::from_secs).unwrap_or(DEFAULT_CLOCK_SKEW),
                check_audience: defaults.check_audience,
            },
            metrics_enabled: lookup("VCT_METRICS_ENABLED")
                .map(|v| v.trim().to_lowercase() != "false")
                .unwrap_or(true),
        })
    }

    /// Socket address to listen on.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.resolver_url.as_str(), DEFAULT_RESOLVER_URL);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.verifier, VerifierConfig::default());
        assert!(config.schema_path.is_none());
        assert!(config.metrics_enabled);
    }

    #[test]
    fn metrics_disabled_only_by_false() {
        for (value, enabled) in [("false", false), ("FALSE", false), ("0", true), ("yes", true)] {
            let config = AppConfig::from_lookup(lookup(&[("VCT_METRICS_ENABLED", value)])).unwrap();
            assert_eq!(config.metrics_enabled, enabled, "{value}");
        }
    }

    #[test]
    fn variables_override_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "8088"),
            ("VCT_BIND_ADDR", "127.0.0.1"),
            ("VCT_RESOLVER_URL", "http://resolver.local:8080/1.0/identifiers/"),
            ("VCT_RESOLVER_TIMEOUT_SECS", "5"),
            ("VCT_MAX_UPLOAD_BYTES", "2048"),
            ("VCT_HASH_KEY_ORDER", "sorted"),
            ("VCT_CLOCK_SKEW_SECS", "0"),
            ("VCT_SCHEMA_PATH", "/etc/vct/schema.json"),
        ]))
        .unwrap();
        assert_eq!(config.listen_addr().to_string(), "127.0.0.1:8088");
        assert_eq!(config.resolver_url.host_str(), Some("resolver.local"));
        assert_eq!(config.resolver_timeout, Duration::from_secs(5));
        assert_eq!(config.max_upload_bytes, 2048);
        assert_eq!(config.verifier.hash_key_order, KeyOrder::Sorted);
        assert_eq!(config.verifier.clock_skew, Duration::ZERO);
        assert_eq!(config.schema_path, Some(PathBuf::from("/etc/vct/schema.json")));
    }

    #[test]
    fn invalid_values_are_errors() {
        for (var, value) in [
            ("PORT", "eighty"),
            ("VCT_HASH_KEY_ORDER", "random"),
            ("VCT_RESOLVER_URL", "not a url"),
            ("VCT_CLOCK_SKEW_SECS", "-1"),
        ] {
            let err = AppConfig::from_lookup(lookup(&[(var, value)])).unwrap_err();
            assert!(err.to_string().contains(var), "{err}");
        }
    }
}
