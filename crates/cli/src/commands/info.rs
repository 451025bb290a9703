//! `info` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::ReporterConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    endpoints: Vec<EndpointInfo>,
    period: String,
    rate_unit: String,
    duration_unit: String,
    prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    predicate: Option<PredicateInfo>,
    tags: BTreeMap<String, String>,
    transport: String,
}

#[derive(Serialize)]
struct EndpointInfo {
    target: String,
    base_url: String,
}

#[derive(Serialize)]
struct PredicateInfo {
    color: String,
    patterns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kinds: Option<Vec<String>>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(&args.config).into());
    }

    let config = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let info = build_config_info(&config)?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(config: &ReporterConfig) -> Result<ConfigInfo> {
    let options =
        ConfigLoader::reporter_options(config).context("Failed to build reporter options")?;

    let endpoints = ConfigLoader::targets(config)?
        .into_iter()
        .map(|t| EndpointInfo {
            target: t.to_string(),
            base_url: t.base_url(),
        })
        .collect();

    let predicate = config.predicate.as_ref().map(|p| PredicateInfo {
        color: format!("{:?}", p.color).to_lowercase(),
        patterns: p.patterns.clone(),
        kinds: p
            .kinds
            .as_ref()
            .map(|kinds| kinds.iter().map(|k| k.to_string()).collect()),
    });

    Ok(ConfigInfo {
        version: format!("{:?}", config.version),
        endpoints,
        period: format!("{} {}", config.period, config.time_unit.as_str()),
        rate_unit: config.rate_unit.as_str().to_string(),
        duration_unit: config.duration_unit.as_str().to_string(),
        prefix: options.prefix,
        predicate,
        tags: options.tags,
        transport: format!("{:?}", config.transport.transport_type),
    })
}

fn print_config_info(info: &ConfigInfo) {
    println!("=== tsdb-fanout Configuration ===\n");

    println!("Endpoints ({})", info.endpoints.len());
    for (i, endpoint) in info.endpoints.iter().enumerate() {
        let branch = if i == info.endpoints.len() - 1 { "└─" } else { "├─" };
        println!("   {} {} ({})", branch, endpoint.target, endpoint.base_url);
    }

    println!("\nReporting");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Period: {}", info.period);
    println!("   ├─ Rate unit: {}", info.rate_unit);
    println!("   ├─ Duration unit: {}", info.duration_unit);
    println!("   ├─ Prefix: {}", if info.prefix.is_empty() { "(none)" } else { info.prefix.as_str() });
    println!("   └─ Transport: {}", info.transport);

    match &info.predicate {
        Some(predicate) => {
            println!("\nPredicate ({})", predicate.color);
            for pattern in &predicate.patterns {
                println!("   ├─ {}", pattern);
            }
            match &predicate.kinds {
                Some(kinds) => println!("   └─ kinds: {}", kinds.join(", ")),
                None => println!("   └─ kinds: any"),
            }
        }
        None => println!("\nPredicate: report everything"),
    }

    if !info.tags.is_empty() {
        println!("\nTags");
        for (key, value) in &info.tags {
            println!("   - {}={}", key, value);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_loader::ConfigFormat;

    #[test]
    fn test_build_config_info() {
        let config = ConfigLoader::load_from_str(
            r#"
hosts_string = "tsdb1.internal:4242"
rate_unit = "minutes"

[[hosts]]
host = "tsdb0.internal"
port = 4242

[predicate]
color = "black"
patterns = ["jvm\\..*"]
kinds = ["gauge"]

[tags]
dc = "eu-west"
"#,
            ConfigFormat::Toml,
        )
        .unwrap();

        let info = build_config_info(&config).unwrap();
        assert_eq!(info.endpoints.len(), 2);
        assert_eq!(info.endpoints[0].target, "tsdb0.internal:4242");
        assert_eq!(info.endpoints[1].base_url, "http://tsdb1.internal:4242");
        assert_eq!(info.rate_unit, "MINUTES");
        assert_eq!(info.period, "60 SECONDS");
        let predicate = info.predicate.unwrap();
        assert_eq!(predicate.color, "black");
        assert_eq!(predicate.kinds, Some(vec!["gauge".to_string()]));
        assert!(info.tags.contains_key("dc"));
        assert!(info.tags.contains_key(config_loader::HOST_TAG));
    }
}
