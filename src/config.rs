use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::context::{RequestContext, Role};

/// Client configuration: where the backend lives and who is acting.
///
/// Loaded from `~/.ridgeline/rc` (simple `key=value` lines), then overridden
/// by `RIDGELINE_*` environment variables. The rc file is optional as long as
/// the environment carries the required values.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: Option<String>,
    pub tenant_id: String,
    pub user_id: String,
    pub role: Role,
}

impl Config {
    /// Get the configuration directory (HOME takes precedence so tests can
    /// redirect it)
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            if !home.is_empty() {
                return Ok(PathBuf::from(home).join(".ridgeline"));
            }
        }
        dirs::home_dir()
            .map(|home| home.join(".ridgeline"))
            .ok_or_else(|| anyhow!("Could not determine home directory"))
    }

    /// Get the configuration file path
    pub fn rc_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("rc"))
    }

    /// Load configuration from the rc file and environment
    pub fn load() -> Result<Config> {
        let rc_path = Self::rc_path()?;
        let mut values = HashMap::new();

        if rc_path.exists() {
            let content = std::fs::read_to_string(&rc_path)
                .with_context(|| format!("Failed to read config file: {}", rc_path.display()))?;
            values = parse_rc(&content);
        }

        for (env_var, key) in [
            ("RIDGELINE_API_URL", "api.url"),
            ("RIDGELINE_API_KEY", "api.key"),
            ("RIDGELINE_TENANT", "tenant"),
            ("RIDGELINE_USER", "user"),
            ("RIDGELINE_ROLE", "role"),
        ] {
            if let Ok(value) = std::env::var(env_var) {
                if !value.is_empty() {
                    values.insert(key.to_string(), value);
                }
            }
        }

        let api_url = values.remove("api.url").ok_or_else(|| {
            anyhow!(
                "No API URL configured. Set api.url in {} or RIDGELINE_API_URL.",
                rc_path.display()
            )
        })?;
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(anyhow!(
                "Invalid API URL '{}': must start with http:// or https://",
                api_url
            ));
        }

        let tenant_id = values.remove("tenant").ok_or_else(|| {
            anyhow!(
                "No tenant configured. Set tenant in {} or RIDGELINE_TENANT.",
                rc_path.display()
            )
        })?;
        let user_id = values.remove("user").ok_or_else(|| {
            anyhow!(
                "No user configured. Set user in {} or RIDGELINE_USER.",
                rc_path.display()
            )
        })?;

        let role = match values.remove("role") {
            Some(raw) => Role::from_str(&raw)
                .ok_or_else(|| anyhow!("Invalid role '{}'. Valid roles: admin, office, field", raw))?,
            None => Role::Office,
        };

        Ok(Config {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: values.remove("api.key"),
            tenant_id,
            user_id,
            role,
        })
    }

    /// The request context this configuration acts as
    pub fn context(&self) -> RequestContext {
        RequestContext::new(&self.tenant_id, &self.user_id, self.role)
    }
}

/// Parse `key=value` lines; blank lines and `#` comments are skipped
fn parse_rc(content: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            values.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rc_basic() {
        let values = parse_rc("api.url=https://crm.example.com\ntenant=t-acme\n");
        assert_eq!(values.get("api.url").map(String::as_str), Some("https://crm.example.com"));
        assert_eq!(values.get("tenant").map(String::as_str), Some("t-acme"));
    }

    #[test]
    fn test_parse_rc_skips_comments_and_blanks() {
        let content = "# ridgeline config\n\n  tenant = t-acme  \nrole=field\n";
        let values = parse_rc(content);
        assert_eq!(values.len(), 2);
        assert_eq!(values.get("tenant").map(String::as_str), Some("t-acme"));
        assert_eq!(values.get("role").map(String::as_str), Some("field"));
    }

    #[test]
    fn test_parse_rc_keeps_equals_in_value() {
        let values = parse_rc("api.key=abc=def\n");
        assert_eq!(values.get("api.key").map(String::as_str), Some("abc=def"));
    }

    #[test]
    fn test_config_dir_uses_home() {
        // HOME redirection is how the integration tests isolate config;
        // just verify the suffix here
        if std::env::var("HOME").map(|h| !h.is_empty()).unwrap_or(false) {
            let dir = Config::config_dir().unwrap();
            assert!(dir.to_string_lossy().ends_with(".ridgeline"));
        }
    }
}
