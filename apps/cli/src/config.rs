//! CLI configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/onchmint/config.toml`
//! - Windows: `%APPDATA%/onchmint/config.toml`

use std::path::{Path, PathBuf};

use onchmint_pipeline::{Pacing, PipelineSettings};
use onchmint_protocol::constants::{CHUNK_SIZE, DEFAULT_CONFIRMATIONS};
use serde::{Deserialize, Serialize};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address of the content-store contract.
    #[serde(default = "default_content_store")]
    pub content_store_address: String,

    /// Token contract to mint into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_address: Option<String>,

    /// Base URL for token links.
    #[serde(default = "default_marketplace_url")]
    pub marketplace_url: String,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_confirmations")]
    pub confirmations: u32,

    /// Extra delay after each write in milliseconds (0 = none).
    #[serde(default)]
    pub pacing_ms: u64,

    /// TOML table of media type → hex-encoded metadata header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers_path: Option<PathBuf>,
}

fn default_content_store() -> String {
    "KT1Ae7dT1gsLw2tRnUMXSCmEyF74KVkM6LUo".into()
}

fn default_marketplace_url() -> String {
    "https://objkt.com".into()
}

fn default_chunk_size() -> usize {
    CHUNK_SIZE
}

fn default_confirmations() -> u32 {
    DEFAULT_CONFIRMATIONS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_store_address: default_content_store(),
            collection_address: None,
            marketplace_url: default_marketplace_url(),
            chunk_size: default_chunk_size(),
            confirmations: default_confirmations(),
            pacing_ms: 0,
            headers_path: None,
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or the platform default location.
    ///
    /// A missing default file is created with default values; a missing
    /// explicit path is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = config_path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    let config = Config::default();
                    config.save_to(&path)?;
                    Ok(config)
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // Restrict permissions on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            content_store: self.content_store_address.clone(),
            chunk_size: self.chunk_size,
            confirmations: self.confirmations,
            pacing: Pacing::from_millis(self.pacing_ms),
        }
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("onchmint")
            .join("config.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("onchmint").join("config.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/onchmint/config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.chunk_size, 32_000);
        assert_eq!(config.confirmations, 1);
        assert_eq!(config.pacing_ms, 0);
        assert!(config.collection_address.is_none());
        assert_eq!(config.settings().pacing, Pacing::Confirmation);
    }

    #[test]
    fn config_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            collection_address = "KT1tokens"
            pacing_ms = 1000
            "#,
        )
        .unwrap();
        assert_eq!(config.collection_address.as_deref(), Some("KT1tokens"));
        assert_eq!(config.chunk_size, 32_000);
        assert_eq!(
            config.settings().pacing,
            Pacing::Fixed(Duration::from_secs(1))
        );
    }

    #[test]
    fn config_path_not_empty() {
        let path = config_path().unwrap();
        assert!(path.to_string_lossy().contains("onchmint"));
    }

    #[test]
    fn config_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let config = Config {
            collection_address: Some("KT1saved".into()),
            headers_path: Some(PathBuf::from("/etc/onchmint/headers.toml")),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn explicit_missing_path_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&tmp.path().join("absent.toml"))).is_err());
    }
}
