//! ReporterFactory - builds one reporter per endpoint

use std::future::Future;
use std::sync::Arc;

use contracts::{
    ContractError, EndpointTarget, MetricSource, MetricsReporter, ReporterOptions,
    TransportConfig, TransportType,
};
use tracing::instrument;

use crate::handle::ReporterHandle;
use crate::transports::{ConfiguredTransport, LogTransport, UdpTransport};

/// Constructs reporters for the dispatcher
///
/// Construction may block on the transport (e.g. name resolution); a failure
/// only affects the target being built.
pub trait ReporterFactory {
    type Reporter: MetricsReporter;

    fn build(
        &self,
        target: &EndpointTarget,
        base_url: &str,
        source: Arc<dyn MetricSource>,
        options: &ReporterOptions,
    ) -> impl Future<Output = Result<Self::Reporter, ContractError>> + Send;
}

/// Factory building `ReporterHandle`s over the configured transport
#[derive(Debug, Clone, Default)]
pub struct TransportFactory {
    config: TransportConfig,
}

impl TransportFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

impl ReporterFactory for TransportFactory {
    type Reporter = ReporterHandle<ConfiguredTransport>;

    #[instrument(
        name = "transport_factory_build",
        skip(self, target, source, options),
        fields(target = %target, transport = ?self.config.transport_type)
    )]
    async fn build(
        &self,
        target: &EndpointTarget,
        base_url: &str,
        source: Arc<dyn MetricSource>,
        options: &ReporterOptions,
    ) -> Result<Self::Reporter, ContractError> {
        let name = target.to_string();
        let transport = match self.config.transport_type {
            TransportType::Log => ConfiguredTransport::Log(LogTransport::new(&name)),
            TransportType::Udp => ConfiguredTransport::Udp(
                UdpTransport::connect(&name, base_url, self.config.max_packet_size)
                    .await
                    .map_err(|e| ContractError::reporter_build(&name, e.to_string()))?,
            ),
        };

        Ok(ReporterHandle::new(
            target.clone(),
            source,
            options,
            transport,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::MetricSnapshot;

    struct EmptySource;

    impl MetricSource for EmptySource {
        fn snapshot(&self) -> Vec<(String, MetricSnapshot)> {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn test_build_log_reporter() {
        let factory = TransportFactory::new(TransportConfig {
            transport_type: TransportType::Log,
            ..Default::default()
        });
        let target = EndpointTarget::new("tsdb1.internal", 4242);

        let reporter = factory
            .build(
                &target,
                &target.base_url(),
                Arc::new(EmptySource),
                &ReporterOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(reporter.target(), &target);
        assert!(reporter.report().await.is_ok());
    }

    #[tokio::test]
    async fn test_build_udp_reporter_unresolvable_host() {
        let factory = TransportFactory::default();
        let target = EndpointTarget::new("bad-host.invalid", 4242);

        let result = factory
            .build(
                &target,
                &target.base_url(),
                Arc::new(EmptySource),
                &ReporterOptions::default(),
            )
            .await;

        let err = result.err().unwrap();
        assert!(matches!(err, ContractError::ReporterBuild { .. }));
        assert!(err.to_string().contains("bad-host.invalid:4242"));
    }
}
