//! 配置校验模块
//!
//! 校验规则：
//! - 至少一个 endpoint
//! - host 非空, port > 0
//! - endpoint 不重复
//! - period > 0
//! - predicate 正则可编译

use std::collections::HashSet;

use contracts::{ContractError, EndpointTarget, ReporterConfig};

/// 校验 ReporterConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &ReporterConfig) -> Result<(), ContractError> {
    let targets = config.full_host_list()?;
    validate_targets(&targets)?;
    validate_period(config)?;
    validate_predicate(config)?;
    Ok(())
}

/// 校验 endpoint 列表
fn validate_targets(targets: &[EndpointTarget]) -> Result<(), ContractError> {
    if targets.is_empty() {
        return Err(ContractError::config_validation(
            "hosts",
            "at least one host is required (hosts or hosts_string)",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, target) in targets.iter().enumerate() {
        if target.host.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("hosts[{idx}].host"),
                "host cannot be empty",
            ));
        }
        if target.port == 0 {
            return Err(ContractError::config_validation(
                format!("hosts[{idx}].port"),
                format!("port must be > 0 for '{}'", target.host),
            ));
        }
        if !seen.insert(target) {
            return Err(ContractError::config_validation(
                format!("hosts[{idx}]"),
                format!("duplicate host '{target}'"),
            ));
        }
    }
    Ok(())
}

/// 校验上报周期
fn validate_period(config: &ReporterConfig) -> Result<(), ContractError> {
    if config.period == 0 {
        return Err(ContractError::config_validation(
            "period",
            "period must be > 0",
        ));
    }
    Ok(())
}

/// 校验 predicate
fn validate_predicate(config: &ReporterConfig) -> Result<(), ContractError> {
    if let Some(ref predicate) = config.predicate {
        metric_filter::compile(predicate)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_toml;

    fn validate_toml(content: &str) -> Result<(), ContractError> {
        validate(&parse_toml(content).unwrap())
    }

    #[test]
    fn test_valid_config() {
        let content = r#"
hosts_string = "tsdb1.internal:4242"

[[hosts]]
host = "tsdb2.internal"
port = 4242
"#;
        assert!(validate_toml(content).is_ok());
    }

    #[test]
    fn test_no_hosts() {
        let err = validate_toml("period = 10").unwrap_err();
        assert!(err.to_string().contains("at least one host"));
    }

    #[test]
    fn test_empty_host() {
        let content = r#"
[[hosts]]
host = ""
port = 4242
"#;
        let err = validate_toml(content).unwrap_err();
        assert!(err.to_string().contains("hosts[0].host"));
    }

    #[test]
    fn test_zero_port() {
        let err = validate_toml("hosts_string = \"tsdb1.internal:0\"").unwrap_err();
        assert!(err.to_string().contains("port must be > 0"));
    }

    #[test]
    fn test_duplicate_across_sources() {
        let content = r#"
hosts_string = "tsdb1.internal:4242"

[[hosts]]
host = "tsdb1.internal"
port = 4242
"#;
        let err = validate_toml(content).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_zero_period() {
        let content = r#"
hosts_string = "tsdb1.internal:4242"
period = 0
"#;
        let err = validate_toml(content).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        let content = r#"
hosts_string = "tsdb1.internal:4242"

[predicate]
color = "white"
patterns = ["jvm.(gc"]
"#;
        let err = validate_toml(content).unwrap_err();
        assert!(matches!(err, ContractError::InvalidPattern { .. }));
    }
}
