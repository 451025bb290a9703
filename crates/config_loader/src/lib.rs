//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Turn `ReporterConfig` into endpoint targets and `ReporterOptions`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("reporter.toml")).unwrap();
//! let targets = ConfigLoader::targets(&config).unwrap();
//! let options = ConfigLoader::reporter_options(&config).unwrap();
//! println!("{} targets every {:?}", targets.len(), options.period());
//! ```

mod parser;
mod prefix;
mod validator;

pub use contracts::ReporterConfig;
pub use parser::ConfigFormat;
pub use prefix::{resolve_prefix, HostInfo};

use contracts::{ContractError, EndpointTarget, ReporterOptions};
use std::path::Path;
use tracing::debug;

/// Tag naming the reporting host, added unless configured
pub const HOST_TAG: &str = "host";

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<ReporterConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        debug!(path = %path.display(), ?format, "Loading reporter config");
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ReporterConfig, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Endpoint targets in configuration order
    pub fn targets(config: &ReporterConfig) -> Result<Vec<EndpointTarget>, ContractError> {
        config.full_host_list()
    }

    /// Build reporter options for the local host
    ///
    /// See [`ConfigLoader::reporter_options_for`].
    pub fn reporter_options(config: &ReporterConfig) -> Result<ReporterOptions, ContractError> {
        Self::reporter_options_for(config, &HostInfo::detect(), |name| {
            std::env::var(name).ok()
        })
    }

    /// Build reporter options: resolve the prefix, compile the predicate and
    /// add the `host` tag when the configuration does not set one
    pub fn reporter_options_for(
        config: &ReporterConfig,
        host: &HostInfo,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<ReporterOptions, ContractError> {
        let prefix = resolve_prefix(&config.prefix, host, env)?;
        let filter = metric_filter::generate_filter(config.predicate.as_ref())?;

        let mut tags = config.tags.clone();
        tags.entry(HOST_TAG.to_string())
            .or_insert_with(|| host.name.clone());

        Ok(ReporterOptions {
            rate_unit: config.rate_unit,
            duration_unit: config.duration_unit,
            prefix,
            filter,
            period: config.period,
            time_unit: config.time_unit,
            tags,
        })
    }

    /// Serialize ReporterConfig to TOML string
    pub fn to_toml(config: &ReporterConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize ReporterConfig to JSON string
    pub fn to_json(config: &ReporterConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ReporterConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }
}
