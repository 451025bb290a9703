//! UdpTransport - JSON datagrams to the endpoint address

use contracts::{ContractError, DataPoint, MetricsTransport};
use std::net::SocketAddr;
use tokio::net::{lookup_host, UdpSocket};
use tracing::{debug, instrument};
use url::{Host, Url};

/// Configuration for UdpTransport
#[derive(Debug, Clone)]
pub struct UdpTransportConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Max datagram size (UDP typically 65507 for IPv4)
    pub max_packet_size: usize,
}

impl UdpTransportConfig {
    /// Resolve the host and port of a base URL such as `http://tsdb1.internal:4242`
    #[instrument(name = "udp_transport_resolve", skip(max_packet_size))]
    pub async fn resolve(base_url: &str, max_packet_size: usize) -> Result<Self, ContractError> {
        let url = Url::parse(base_url).map_err(|e| {
            ContractError::transport_connection("udp", format!("invalid base url '{base_url}': {e}"))
        })?;

        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => {
                return Err(ContractError::transport_connection(
                    "udp",
                    format!("base url '{base_url}' has no host"),
                ))
            }
        };
        let port = url.port_or_known_default().ok_or_else(|| {
            ContractError::transport_connection("udp", format!("base url '{base_url}' has no port"))
        })?;

        let addr = lookup_host((host.as_str(), port))
            .await
            .map_err(|e| {
                ContractError::transport_connection("udp", format!("cannot resolve '{host}': {e}"))
            })?
            .next()
            .ok_or_else(|| {
                ContractError::transport_connection("udp", format!("no address for '{host}'"))
            })?;

        Ok(Self {
            addr,
            max_packet_size,
        })
    }
}

/// Transport that sends data points as JSON arrays over UDP
pub struct UdpTransport {
    name: String,
    config: UdpTransportConfig,
    socket: Option<UdpSocket>,
}

impl UdpTransport {
    /// Create a new UdpTransport connected to `config.addr`
    #[instrument(name = "udp_transport_new", skip(name, config))]
    pub async fn new(name: impl Into<String>, config: UdpTransportConfig) -> std::io::Result<Self> {
        let name = name.into();
        // Bind to any available port of the matching family
        let bind_addr = if config.addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(&config.addr).await?;

        debug!(
            transport = %name,
            target = %config.addr,
            "UdpTransport connected"
        );

        Ok(Self {
            name,
            config,
            socket: Some(socket),
        })
    }

    /// Resolve `base_url` and connect (for factory)
    pub async fn connect(
        name: impl Into<String>,
        base_url: &str,
        max_packet_size: usize,
    ) -> Result<Self, ContractError> {
        let config = UdpTransportConfig::resolve(base_url, max_packet_size).await?;
        Self::new(name, config)
            .await
            .map_err(|e| ContractError::transport_connection("udp", e.to_string()))
    }

    /// Resolved target address
    pub fn addr(&self) -> SocketAddr {
        self.config.addr
    }

    fn socket(&self) -> Result<&UdpSocket, ContractError> {
        self.socket
            .as_ref()
            .ok_or_else(|| ContractError::transport_send(&self.name, "socket not connected"))
    }
}

/// Pack points into JSON arrays no larger than `max_packet_size` bytes each
///
/// Errors are reported as send failures of `transport`.
pub fn encode_batches(
    transport: &str,
    points: &[DataPoint],
    max_packet_size: usize,
) -> Result<Vec<Vec<u8>>, ContractError> {
    let mut batches = Vec::new();
    let mut current = vec![b'['];

    for point in points {
        let encoded = serde_json::to_vec(point)
            .map_err(|e| ContractError::transport_send(transport, format!("json error: {e}")))?;
        if encoded.len() + 2 > max_packet_size {
            return Err(ContractError::transport_send(
                transport,
                format!(
                    "data point '{}' is {} bytes, max packet size is {}",
                    point.metric,
                    encoded.len(),
                    max_packet_size
                ),
            ));
        }

        // ',' + point + ']'
        if current.len() > 1 && current.len() + encoded.len() + 2 > max_packet_size {
            current.push(b']');
            batches.push(std::mem::replace(&mut current, vec![b'[']));
        }
        if current.len() > 1 {
            current.push(b',');
        }
        current.extend_from_slice(&encoded);
    }

    if current.len() > 1 {
        current.push(b']');
        batches.push(current);
    }
    Ok(batches)
}

impl MetricsTransport for UdpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "udp_transport_send",
        skip(self, points),
        fields(transport = %self.name, points = points.len())
    )]
    async fn send(&mut self, points: &[DataPoint]) -> Result<(), ContractError> {
        let socket = self.socket()?;
        let batches = encode_batches(&self.name, points, self.config.max_packet_size)?;

        for datagram in &batches {
            let sent = socket
                .send(datagram)
                .await
                .map_err(|e| ContractError::transport_send(&self.name, e.to_string()))?;
            debug!(transport = %self.name, bytes = sent, "Sent");
        }
        Ok(())
    }

    #[instrument(name = "udp_transport_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // UDP doesn't buffer
        Ok(())
    }

    #[instrument(name = "udp_transport_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.socket = None;
        debug!(transport = %self.name, "UdpTransport closed");
        Ok(())
    }
}
