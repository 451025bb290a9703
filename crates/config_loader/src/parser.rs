//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use contracts::{ContractError, ReporterConfig};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<ReporterConfig, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<ReporterConfig, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<ReporterConfig, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{FilterColor, MetricKind, TimeUnit, TransportType};

    #[test]
    fn test_parse_toml_defaults() {
        let content = r#"
[[hosts]]
host = "tsdb1.internal"
port = 4242
"#;
        let config = parse_toml(content).unwrap();
        assert_eq!(config.hosts.len(), 1);
        assert_eq!(config.period, 60);
        assert_eq!(config.time_unit, TimeUnit::Seconds);
        assert_eq!(config.rate_unit, TimeUnit::Seconds);
        assert_eq!(config.duration_unit, TimeUnit::Milliseconds);
        assert!(config.prefix.is_empty());
        assert!(config.predicate.is_none());
        assert_eq!(config.transport.transport_type, TransportType::Udp);
    }

    #[test]
    fn test_parse_toml_full() {
        let content = r#"
hosts_string = "tsdb1.internal:4242,tsdb2.internal:4242"
period = 10
time_unit = "seconds"
rate_unit = "MINUTES"
duration_unit = "microseconds"
prefix = "svc.${host.name.short}"

[predicate]
color = "black"
patterns = ["jvm\\..*"]
kinds = ["gauge", "timer"]

[tags]
dc = "eu-west"

[transport]
transport_type = "log"
"#;
        let config = parse_toml(content).unwrap();
        assert_eq!(config.period, 10);
        assert_eq!(config.rate_unit, TimeUnit::Minutes);
        assert_eq!(config.duration_unit, TimeUnit::Microseconds);
        let predicate = config.predicate.unwrap();
        assert_eq!(predicate.color, FilterColor::Black);
        assert_eq!(predicate.patterns, vec!["jvm\\..*".to_string()]);
        assert_eq!(
            predicate.kinds,
            Some(vec![MetricKind::Gauge, MetricKind::Timer])
        );
        assert_eq!(config.tags.get("dc").map(String::as_str), Some("eu-west"));
        assert_eq!(config.transport.transport_type, TransportType::Log);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "hosts": [{ "host": "tsdb1.internal", "port": 4242 }],
            "period": 30,
            "prefix": "app"
        }"#;
        let config = parse_json(content).unwrap();
        assert_eq!(config.period, 30);
        assert_eq!(config.prefix, "app");
    }

    #[test]
    fn test_parse_unknown_time_unit() {
        let result = parse_toml("time_unit = \"fortnights\"");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let result = parse_toml("invalid toml [[[");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
