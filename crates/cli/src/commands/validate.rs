//! `validate` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::ReporterConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::CliError;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    target_count: usize,
    period: String,
    prefix: String,
    transport: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        Err(CliError::invalid_config(&args.config).into())
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();
    let invalid = |error: String| ValidationResult {
        valid: false,
        config_path: config_path.clone(),
        error: Some(error),
        warnings: None,
        summary: None,
    };

    if !args.config.exists() {
        return invalid(format!("File not found: {}", args.config.display()));
    }

    let config = match ConfigLoader::load_from_path(&args.config) {
        Ok(config) => config,
        Err(e) => return invalid(e.to_string()),
    };
    // Prefix placeholders are only checked once resolved
    let options = match ConfigLoader::reporter_options(&config) {
        Ok(options) => options,
        Err(e) => return invalid(e.to_string()),
    };

    let warnings = collect_warnings(&config);
    let target_count = ConfigLoader::targets(&config).map(|t| t.len()).unwrap_or(0);

    ValidationResult {
        valid: true,
        config_path: config_path.clone(),
        error: None,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
        summary: Some(ConfigSummary {
            version: format!("{:?}", config.version),
            target_count,
            period: format!("{} {}", config.period, config.time_unit.as_str()),
            prefix: options.prefix,
            transport: format!("{:?}", config.transport.transport_type),
        }),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &ReporterConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(ref predicate) = config.predicate {
        if predicate.patterns.is_empty() && predicate.kinds.is_none() {
            let effect = match predicate.color {
                contracts::FilterColor::White => "no metric will be reported",
                contracts::FilterColor::Black => "it has no effect",
            };
            warnings.push(format!("predicate has no patterns - {effect}"));
        }
    }

    if config.time_unit.to_duration(config.period) < std::time::Duration::from_secs(1) {
        warnings.push("reporting period is shorter than one second".to_string());
    }

    if config.prefix.ends_with('.') {
        warnings.push("prefix ends with '.' - metric names will contain '..'".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Endpoints: {}", summary.target_count);
            println!("  Period: {}", summary.period);
            println!("  Prefix: {}", summary.prefix);
            println!("  Transport: {}", summary.transport);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_validate_valid_config() {
        let file = write_config(
            r#"
hosts_string = "tsdb1.internal:4242,tsdb2.internal:4242"
prefix = "app."

[predicate]
color = "white"
"#,
        );
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        };

        let result = validate_config(&args);
        assert!(result.valid);
        assert_eq!(result.summary.as_ref().unwrap().target_count, 2);
        assert_eq!(result.warnings.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_validate_missing_file() {
        let args = ValidateArgs {
            config: "does-not-exist.toml".into(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(run_validate(&args).is_err());
    }

    #[test]
    fn test_validate_bad_placeholder() {
        let file = write_config(
            r#"
hosts_string = "tsdb1.internal:4242"
prefix = "${host.address}"
"#,
        );
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("unknown placeholder"));
    }
}
