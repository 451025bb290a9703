//! Transport implementations
//!
//! Contains LogTransport and UdpTransport, plus the `ConfiguredTransport`
//! wrapper the factory hands to every reporter.

mod log;
mod udp;

pub use self::log::LogTransport;
pub use self::udp::{encode_batches, UdpTransport, UdpTransportConfig};

use contracts::{ContractError, DataPoint, MetricsTransport};

/// Transport selected by configuration
pub enum ConfiguredTransport {
    Log(LogTransport),
    Udp(UdpTransport),
}

impl MetricsTransport for ConfiguredTransport {
    fn name(&self) -> &str {
        match self {
            Self::Log(t) => t.name(),
            Self::Udp(t) => t.name(),
        }
    }

    async fn send(&mut self, points: &[DataPoint]) -> Result<(), ContractError> {
        match self {
            Self::Log(t) => t.send(points).await,
            Self::Udp(t) => t.send(points).await,
        }
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        match self {
            Self::Log(t) => t.flush().await,
            Self::Udp(t) => t.flush().await,
        }
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        match self {
            Self::Log(t) => t.close().await,
            Self::Udp(t) => t.close().await,
        }
    }
}
