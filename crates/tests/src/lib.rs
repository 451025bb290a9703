//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置 -> options -> dispatcher 全链路
//! - 本地 UDP 接收端验证实际发送的数据点
//! - 部分 endpoint 失败时的隔离

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader, HostInfo, ReporterConfig};
    use contracts::{DataPoint, MetricSource, ReporterOptions};
    use dispatcher::{create_dispatcher, DispatcherState};
    use registry::MetricRegistry;
    use tokio::net::UdpSocket;
    use tokio::time::timeout;

    const RECV_TIMEOUT: Duration = Duration::from_secs(2);

    async fn receiver() -> (UdpSocket, String) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap().to_string();
        (socket, addr)
    }

    async fn recv_points(socket: &UdpSocket) -> Vec<DataPoint> {
        let mut buf = vec![0u8; 65536];
        let n = timeout(RECV_TIMEOUT, socket.recv(&mut buf))
            .await
            .expect("no datagram received")
            .unwrap();
        serde_json::from_slice(&buf[..n]).unwrap()
    }

    fn load(content: &str) -> (ReporterConfig, ReporterOptions) {
        let config = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
        let options =
            ConfigLoader::reporter_options_for(&config, &HostInfo::new("web-1.example.com"), |_| {
                None
            })
            .unwrap();
        (config, options)
    }

    fn populated_registry() -> Arc<MetricRegistry> {
        let registry = Arc::new(MetricRegistry::new());
        registry.counter("jobs.done").inc(3);
        registry.gauge("queue.depth").set(7.0);
        registry.histogram("payload.bytes").update(512.0);
        registry
    }

    /// Two reachable endpoints plus one unresolvable: the bad one is skipped,
    /// the others receive every report.
    #[tokio::test]
    async fn test_e2e_partial_failure_and_report() {
        let (rx1, addr1) = receiver().await;
        let (rx2, addr2) = receiver().await;
        let content = format!(
            r#"
hosts_string = "{addr1},bad-host.invalid:4242,{addr2}"
prefix = "app.${{host.name.short}}"
"#
        );
        let (config, options) = load(&content);
        let targets = ConfigLoader::targets(&config).unwrap();
        assert_eq!(targets.len(), 3);

        let registry = populated_registry();
        let source: Arc<dyn MetricSource> = registry.clone();
        let mut dispatcher = create_dispatcher(&config);

        assert!(!dispatcher.enable(source, &targets, &options).await);
        assert_eq!(dispatcher.state(), DispatcherState::Active);
        assert_eq!(
            dispatcher.active_targets(),
            vec![&targets[0], &targets[2]]
        );

        dispatcher.report().await.unwrap();

        for rx in [&rx1, &rx2] {
            let points = recv_points(rx).await;
            let jobs = points
                .iter()
                .find(|p| p.metric == "app.web-1.jobs.done.count")
                .expect("counter point missing");
            assert_eq!(jobs.value, 3.0);
            assert_eq!(
                jobs.tags.get("host").map(String::as_str),
                Some("web-1.example.com")
            );
            assert!(points.iter().any(|p| p.metric == "app.web-1.queue.depth.value"));
            assert_eq!(
                points
                    .iter()
                    .filter(|p| p.metric.starts_with("app.web-1.payload.bytes."))
                    .count(),
                11
            );
        }

        dispatcher.stop().await;
        assert!(dispatcher.is_empty());
        assert_eq!(dispatcher.state(), DispatcherState::Stopped);
        // no handles left, report is a no-op
        dispatcher.report().await.unwrap();
    }

    /// Reporters send on their own schedule without a manual trigger.
    #[tokio::test]
    async fn test_e2e_periodic_reporting() {
        let (rx, addr) = receiver().await;
        let content = format!(
            r#"
hosts_string = "{addr}"
period = 50
time_unit = "milliseconds"
"#
        );
        let (config, options) = load(&content);
        let targets = ConfigLoader::targets(&config).unwrap();

        let registry = populated_registry();
        let source: Arc<dyn MetricSource> = registry.clone();
        let mut dispatcher = create_dispatcher(&config);
        assert!(dispatcher.enable(source, &targets, &options).await);

        let first = recv_points(&rx).await;
        registry.counter("jobs.done").inc(1);
        // a later tick sees the updated registry
        let mut later = recv_points(&rx).await;
        for _ in 0..10 {
            let value = later
                .iter()
                .find(|p| p.metric == "jobs.done.count")
                .map(|p| p.value);
            if value == Some(4.0) {
                break;
            }
            later = recv_points(&rx).await;
        }

        assert!(first.iter().any(|p| p.metric == "jobs.done.count"));
        assert!(later
            .iter()
            .any(|p| p.metric == "jobs.done.count" && p.value == 4.0));

        let metrics = dispatcher.metrics();
        assert!(metrics[0].1.report_count >= 2);

        dispatcher.stop().await;
    }

    /// The compiled predicate decides what reaches the endpoint.
    #[tokio::test]
    async fn test_e2e_predicate_filter() {
        let (rx, addr) = receiver().await;
        let content = format!(
            r#"
hosts_string = "{addr}"

[predicate]
color = "white"
patterns = ["jobs\\..*"]
"#
        );
        let (config, options) = load(&content);
        let targets = ConfigLoader::targets(&config).unwrap();

        let source: Arc<dyn MetricSource> = populated_registry();
        let mut dispatcher = create_dispatcher(&config);
        assert!(dispatcher.enable(source, &targets, &options).await);
        dispatcher.report().await.unwrap();

        let points = recv_points(&rx).await;
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].metric, "jobs.done.count");

        dispatcher.stop().await;
    }

    /// The log transport never touches the network, so every target starts.
    #[tokio::test]
    async fn test_e2e_log_transport() {
        let (config, options) = load(
            r#"
hosts_string = "tsdb1.internal:4242,bad-host.invalid:4242"

[transport]
transport_type = "log"
"#,
        );
        let targets = ConfigLoader::targets(&config).unwrap();

        let source: Arc<dyn MetricSource> = populated_registry();
        let mut dispatcher = create_dispatcher(&config);
        assert!(dispatcher.enable(source, &targets, &options).await);
        assert_eq!(dispatcher.len(), 2);

        dispatcher.report().await.unwrap();
        for (_, snapshot) in dispatcher.metrics() {
            assert_eq!(snapshot.report_count, 1);
            assert_eq!(snapshot.failure_count, 0);
        }

        dispatcher.stop().await;
        dispatcher.stop().await;
    }

    /// Options built from the same configuration are shared by all reporters.
    #[test]
    fn test_options_from_config() {
        let (_, options) = load(
            r#"
hosts_string = "tsdb1.internal:4242"
period = 15
rate_unit = "minutes"
prefix = "svc"
"#,
        );
        assert_eq!(options.period(), Duration::from_secs(15));
        assert_eq!(options.rate_unit, contracts::TimeUnit::Minutes);
        assert_eq!(options.prefix, "svc");
    }
}
