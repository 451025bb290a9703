//! Prefix placeholder resolution
//!
//! Supported placeholders:
//! - `${host.name}`: reporting host name
//! - `${host.name.short}`: host name up to the first dot
//! - `${env.NAME}`: value of environment variable `NAME`

use contracts::ContractError;
use tracing::{debug, warn};

/// Identity of the reporting host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub name: String,
}

impl HostInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Detect the local host name from the operating system, falling back to `localhost`
    pub fn detect() -> Self {
        let detected = hostname::get()
            .map_err(|e| e.to_string())
            .and_then(|raw| {
                raw.into_string()
                    .map_err(|raw| format!("host name {raw:?} is not valid UTF-8"))
            })
            .map(|name| name.trim().to_string())
            .and_then(|name| {
                if name.is_empty() {
                    Err("host name is empty".to_string())
                } else {
                    Ok(name)
                }
            });

        let name = match detected {
            Ok(name) => name,
            Err(reason) => {
                warn!(error = %reason, "Failed to detect host name, using localhost");
                "localhost".to_string()
            }
        };

        debug!(host = %name, "Detected host name");
        Self { name }
    }

    /// Host name up to the first dot
    pub fn short_name(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }
}

/// Resolve every placeholder in `prefix`
///
/// `env` looks up environment variables. An unknown placeholder, an unset
/// variable or an unterminated `${` is an error.
pub fn resolve_prefix(
    prefix: &str,
    host: &HostInfo,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String, ContractError> {
    let mut resolved = String::with_capacity(prefix.len());
    let mut rest = prefix;

    while let Some(start) = rest.find("${") {
        resolved.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| {
            ContractError::config_validation("prefix", format!("unterminated placeholder in '{prefix}'"))
        })?;

        let key = &after[..end];
        let value = match key {
            "host.name" => host.name.clone(),
            "host.name.short" => host.short_name().to_string(),
            _ => match key.strip_prefix("env.") {
                Some(var) => env(var).ok_or_else(|| {
                    ContractError::config_validation(
                        "prefix",
                        format!("environment variable '{var}' is not set"),
                    )
                })?,
                None => {
                    return Err(ContractError::config_validation(
                        "prefix",
                        format!("unknown placeholder '${{{key}}}'"),
                    ))
                }
            },
        };
        resolved.push_str(&value);
        rest = &after[end + 1..];
    }
    resolved.push_str(rest);

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_no_placeholders() {
        let host = HostInfo::new("web-1.prod.example.com");
        assert_eq!(resolve_prefix("app.api", &host, no_env).unwrap(), "app.api");
        assert_eq!(resolve_prefix("", &host, no_env).unwrap(), "");
    }

    #[test]
    fn test_host_placeholders() {
        let host = HostInfo::new("web-1.prod.example.com");
        assert_eq!(
            resolve_prefix("app.${host.name.short}", &host, no_env).unwrap(),
            "app.web-1"
        );
        assert_eq!(
            resolve_prefix("${host.name}.x", &host, no_env).unwrap(),
            "web-1.prod.example.com.x"
        );
    }

    #[test]
    fn test_env_placeholder() {
        let host = HostInfo::new("web-1");
        let env = |name: &str| (name == "DC").then(|| "eu-west".to_string());
        assert_eq!(
            resolve_prefix("${env.DC}.${host.name}", &host, env).unwrap(),
            "eu-west.web-1"
        );
        assert!(resolve_prefix("${env.MISSING}", &host, env).is_err());
    }

    #[test]
    fn test_bad_placeholders() {
        let host = HostInfo::new("web-1");
        assert!(resolve_prefix("${host.address}", &host, no_env).is_err());
        assert!(resolve_prefix("app.${host.name", &host, no_env).is_err());
    }

    #[test]
    fn test_detect_uses_system_host_name() {
        let system = hostname::get().unwrap().into_string().unwrap();
        std::env::set_var("HOSTNAME", "stale-shell-value");

        let detected = HostInfo::detect();

        assert!(!detected.name.is_empty());
        assert_eq!(detected.name, system.trim());
        if system.trim() != "stale-shell-value" {
            assert_ne!(detected.name, "stale-shell-value");
        }
    }

    #[test]
    fn test_short_name_without_dot() {
        assert_eq!(HostInfo::new("localhost").short_name(), "localhost");
    }
}
