//! EndpointTarget - one remote metrics sink

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ContractError;

/// A (host, port) pair identifying one remote metrics sink.
///
/// # Examples
/// ```
/// use contracts::EndpointTarget;
///
/// let target = EndpointTarget::new("tsdb1.internal", 4242);
/// assert_eq!(target.to_string(), "tsdb1.internal:4242");
/// assert_eq!(target.base_url(), "http://tsdb1.internal:4242");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointTarget {
    pub host: String,
    pub port: u16,
}

impl EndpointTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Base address handed to the transport. IPv6 literals are bracketed.
    pub fn base_url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for EndpointTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for EndpointTarget {
    type Err = ContractError;

    /// Parse `host:port` or `[v6-address]:port`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (host, port) = s.rsplit_once(':').ok_or_else(|| {
            ContractError::config_parse(format!("expected 'host:port', got '{s}'"))
        })?;

        let port: u16 = port
            .trim()
            .parse()
            .map_err(|e| ContractError::config_parse(format!("invalid port in '{s}': {e}")))?;

        let host = host.trim();
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        Ok(Self::new(host, port))
    }
}
