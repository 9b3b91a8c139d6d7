//! Configuration management for Threadcast

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";
pub const DEFAULT_PERMALINK_HOST: &str = "x.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub api: ApiConfig,
    pub account: AccountConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// KEY=VALUE file holding the OAuth 1.0a user-context secrets
    pub path: String,
    /// Optional KEY=VALUE file holding `BEARER_TOKEN`, used for user lookups
    pub bearer_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Handle of the posting account, without the leading `@`
    pub handle: String,
    /// Numeric id of the posting account; required for follows
    pub user_id: Option<String>,
    #[serde(default = "default_permalink_host")]
    pub permalink_host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub report_path: String,
    pub dump_path: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_permalink_host() -> String {
    DEFAULT_PERMALINK_HOST.to_string()
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.credentials.path.trim().is_empty() {
            return Err(ConfigError::MissingField("credentials.path".to_string()).into());
        }
        let handle = self.account.handle.trim();
        if handle.is_empty() {
            return Err(ConfigError::MissingField("account.handle".to_string()).into());
        }
        if handle.starts_with('@') {
            return Err(ConfigError::InvalidValue {
                field: "account.handle".to_string(),
                reason: "write the handle without a leading '@'".to_string(),
            }
            .into());
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                reason: format!("'{}' is not an http(s) URL", self.api.base_url),
            }
            .into());
        }
        Ok(())
    }

    pub fn credentials_path(&self) -> PathBuf {
        expand_path(&self.credentials.path)
    }

    pub fn bearer_path(&self) -> Option<PathBuf> {
        self.credentials.bearer_path.as_deref().map(expand_path)
    }

    pub fn report_path(&self) -> PathBuf {
        expand_path(&self.output.report_path)
    }

    pub fn dump_path(&self) -> PathBuf {
        expand_path(&self.output.dump_path)
    }
}

/// Expand `~` and environment variables in a configured path
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).as_ref()),
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("THREADCAST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("threadcast").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
[credentials]
path = "/tmp/x-api"

[account]
handle = "beto_neh"

[output]
report_path = "/tmp/campaign-log.md"
dump_path = "/tmp/thread-results.json"
"#;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_minimal_config_applies_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, MINIMAL);

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_API_BASE);
        assert_eq!(config.account.permalink_host, DEFAULT_PERMALINK_HOST);
        assert_eq!(config.account.user_id, None);
        assert_eq!(config.credentials.bearer_path, None);
        assert_eq!(config.dump_path(), PathBuf::from("/tmp/thread-results.json"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = Config::load_from_path(&dir.path().join("nope.toml"));
        assert!(result.unwrap_err().to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_rejects_missing_section() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[credentials]\npath = \"/tmp/x\"\n");
        let result = Config::load_from_path(&path);
        assert!(result.unwrap_err().to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_load_rejects_handle_with_at_sign() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &MINIMAL.replace("beto_neh", "@beto_neh"));
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("account.handle"));
    }

    #[test]
    fn test_load_rejects_non_http_base_url() {
        let dir = TempDir::new().unwrap();
        let content = format!("{}\n[api]\nbase_url = \"ftp://example.com\"\n", MINIMAL);
        let path = write_config(&dir, &content);
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("api.base_url"));
    }

    #[test]
    #[serial]
    fn test_resolve_config_path_env_override() {
        std::env::set_var("THREADCAST_CONFIG", "/tmp/custom/threadcast.toml");
        let path = resolve_config_path().unwrap();
        std::env::remove_var("THREADCAST_CONFIG");
        assert_eq!(path, PathBuf::from("/tmp/custom/threadcast.toml"));
    }

    #[test]
    #[serial]
    fn test_resolve_config_path_default() {
        std::env::remove_var("THREADCAST_CONFIG");
        let path = resolve_config_path().unwrap();
        assert!(path.ends_with("threadcast/config.toml"));
    }
}
