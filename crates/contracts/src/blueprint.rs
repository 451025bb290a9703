//! ReporterConfig - Config Loader output
//!
//! Describes the endpoints to report to and how metrics are formatted on the way.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{ContractError, EndpointTarget, MetricKind, TimeUnit};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete reporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Explicit endpoint list
    #[serde(default)]
    pub hosts: Vec<EndpointTarget>,

    /// Comma separated `host:port` list, appended after `hosts`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts_string: Option<String>,

    /// Reporting period, in `time_unit`
    #[serde(default = "default_period")]
    pub period: u64,

    #[serde(default = "default_time_unit")]
    pub time_unit: TimeUnit,

    /// Unit rates are converted to
    #[serde(default = "default_rate_unit")]
    pub rate_unit: TimeUnit,

    /// Unit durations are converted to
    #[serde(default = "default_duration_unit")]
    pub duration_unit: TimeUnit,

    /// Metric name prefix, may contain `${...}` placeholders
    #[serde(default)]
    pub prefix: String,

    /// Inclusion predicate (None = report everything)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<PredicateConfig>,

    /// Static tags attached to every data point
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    /// Transport used to reach each endpoint
    #[serde(default)]
    pub transport: TransportConfig,
}

fn default_period() -> u64 {
    60
}

fn default_time_unit() -> TimeUnit {
    TimeUnit::Seconds
}

fn default_rate_unit() -> TimeUnit {
    TimeUnit::Seconds
}

fn default_duration_unit() -> TimeUnit {
    TimeUnit::Milliseconds
}

impl ReporterConfig {
    /// Full ordered endpoint list: `hosts` followed by `hosts_string` entries
    ///
    /// # Errors
    /// A malformed `hosts_string` entry
    pub fn full_host_list(&self) -> Result<Vec<EndpointTarget>, ContractError> {
        let mut targets = self.hosts.clone();
        if let Some(ref hosts_string) = self.hosts_string {
            for entry in hosts_string.split(',').filter(|e| !e.trim().is_empty()) {
                targets.push(entry.parse()?);
            }
        }
        Ok(targets)
    }
}

/// Whether predicate patterns allow or deny
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterColor {
    /// Allow-list: only matching metrics are reported
    White,
    /// Deny-list: matching metrics are dropped
    Black,
}

/// Inclusion predicate as written in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredicateConfig {
    pub color: FilterColor,

    /// Regular expressions, matched against the whole metric name
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Restrict to these metric kinds (None = any kind)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<MetricKind>>,
}

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default)]
    pub transport_type: TransportType,

    /// Max datagram size for the UDP transport
    #[serde(default = "default_max_packet_size")]
    pub max_packet_size: usize,
}

fn default_max_packet_size() -> usize {
    65000
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            transport_type: TransportType::default(),
            max_packet_size: default_max_packet_size(),
        }
    }
}

/// Transport type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    /// JSON datagrams to the endpoint address
    #[default]
    Udp,
    /// Log data points via tracing
    Log,
}
