//! Connection settings: broker list, protocol version, timeouts.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

// Pre-1.0 releases carry four components ("0.10.2.1"), later ones three.
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:0\.\d+\.\d+\.\d+|[1-9]\d*\.\d+\.\d+)$").expect("version pattern is valid")
});

/// Default timeout for admin operations.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// A Kafka protocol version such as `1.1.0` or `0.10.2.1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KafkaVersion {
    parts: Vec<u32>,
}

impl KafkaVersion {
    /// Parse a version string.
    pub fn parse(version: &str) -> Result<Self> {
        let version = version.trim();
        if !VERSION_PATTERN.is_match(version) {
            return Err(Error::InvalidVersion(version.to_string()));
        }

        let parts = version
            .split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| Error::InvalidVersion(version.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { parts })
    }

    /// Whether brokers of this version answer ApiVersions requests (0.10+).
    pub fn supports_api_versions(&self) -> bool {
        self.parts.as_slice() >= [0, 10].as_slice()
    }
}

impl FromStr for KafkaVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for KafkaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.parts.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Split a comma-separated broker list into `host:port` entries.
pub fn parse_brokers(brokers: &str) -> Result<Vec<String>> {
    let parsed: Vec<String> = brokers
        .split(',')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect();

    if parsed.is_empty() {
        return Err(Error::InvalidBrokers("no brokers given".to_string()));
    }

    for broker in &parsed {
        let Some((host, port)) = broker.rsplit_once(':') else {
            return Err(Error::InvalidBrokers(format!(
                "{broker} (expected host:port)"
            )));
        };
        if host.is_empty() || port.parse::<u16>().is_err() {
            return Err(Error::InvalidBrokers(format!(
                "{broker} (expected host:port)"
            )));
        }
    }

    Ok(parsed)
}

/// Everything needed to open an admin connection.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Bootstrap brokers as `host:port`
    pub brokers: Vec<String>,
    /// Protocol version assumed for the brokers
    pub version: KafkaVersion,
    /// Timeout for each admin request
    pub operation_timeout: Duration,
}

impl AdminConfig {
    /// Build from the raw broker list and version strings.
    pub fn new(brokers: &str, version: &str) -> Result<Self> {
        Ok(Self {
            brokers: parse_brokers(brokers)?,
            version: KafkaVersion::parse(version)?,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        })
    }

    /// Override the operation timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(KafkaVersion::parse("1.1.0").unwrap().to_string(), "1.1.0");
        assert_eq!(KafkaVersion::parse("0.10.2.1").unwrap().to_string(), "0.10.2.1");
        assert_eq!(KafkaVersion::parse(" 3.7.0 ").unwrap().to_string(), "3.7.0");
    }

    #[test]
    fn test_parse_version_rejects_garbage() {
        assert!(KafkaVersion::parse("").is_err());
        assert!(KafkaVersion::parse("1.1").is_err());
        assert!(KafkaVersion::parse("0.10.2").is_err());
        assert!(KafkaVersion::parse("1.1.0.0").is_err());
        assert!(KafkaVersion::parse("latest").is_err());
    }

    #[test]
    fn test_supports_api_versions() {
        assert!(!KafkaVersion::parse("0.9.0.1").unwrap().supports_api_versions());
        assert!(KafkaVersion::parse("0.10.0.0").unwrap().supports_api_versions());
        assert!(KafkaVersion::parse("2.8.1").unwrap().supports_api_versions());
    }

    #[test]
    fn test_parse_brokers() {
        assert_eq!(
            parse_brokers("kafka-1:9092, kafka-2:9092,").unwrap(),
            vec!["kafka-1:9092".to_string(), "kafka-2:9092".to_string()]
        );
    }

    #[test]
    fn test_parse_brokers_errors() {
        assert!(parse_brokers("").is_err());
        assert!(parse_brokers(" , ").is_err());
        assert!(parse_brokers("localhost").is_err());
        assert!(parse_brokers("localhost:http").is_err());
        assert!(parse_brokers(":9092").is_err());
    }

    #[test]
    fn test_admin_config_setup_errors() {
        let err = AdminConfig::new("", "1.1.0").unwrap_err();
        assert!(matches!(err, Error::InvalidBrokers(_)));

        let err = AdminConfig::new("localhost:9092", "one").unwrap_err();
        assert!(matches!(err, Error::InvalidVersion(_)));
    }
}
