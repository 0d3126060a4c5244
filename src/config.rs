use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Defaults applied to every transport a client opens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<f64>,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub default_headers: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            connect_timeout_secs: None,
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
            default_headers: HashMap::new(),
        }
    }
}

fn default_max_redirects() -> usize {
    10
}

fn default_user_agent() -> String {
    format!("areq/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Search standard locations for a config file, falling back to defaults.
    /// Priority: explicit path > CWD > XDG config > home dir
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::load(path);
        }

        for candidate in config_search_paths() {
            if candidate.exists() {
                tracing::info!(path = %candidate.display(), "Loading config");
                return Self::load(&candidate);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs_f64)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs_f64)
    }

    fn validate(&self) -> Result<()> {
        for (name, secs) in [
            ("timeout_secs", self.timeout_secs),
            ("connect_timeout_secs", self.connect_timeout_secs),
        ] {
            if let Some(secs) = secs {
                if !secs.is_finite() || secs <= 0.0 {
                    return Err(Error::config(format!(
                        "{name} must be a positive number of seconds, got {secs}"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("areq.toml")];

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(xdg).join("areq").join("config.toml"));
    }
    if let Some(home) = home_dir() {
        paths.push(home.join(".config").join("areq").join("config.toml"));
        paths.push(home.join(".areq.toml"));
    }

    paths
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.max_redirects, 10);
        assert!(config.user_agent.starts_with("areq/"));
        assert!(config.timeout().is_none());
        assert!(config.connect_timeout().is_none());
    }

    #[test]
    fn test_load_config() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
timeout_secs = 2.5
max_redirects = 3

[default_headers]
"X-Trace" = "on"
"#
        )
        .unwrap();

        let config = ClientConfig::load(f.path()).unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.max_redirects, 3);
        assert_eq!(config.default_headers.get("X-Trace"), Some(&"on".to_string()));
        assert!(config.user_agent.starts_with("areq/"));
    }

    #[test]
    fn test_rejects_non_positive_timeout() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "connect_timeout_secs = 0.0").unwrap();

        let err = ClientConfig::load(f.path()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let path = Path::new("/nonexistent/areq.toml");
        let err = ClientConfig::find_and_load(Some(path)).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
