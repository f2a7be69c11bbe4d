//! Application configuration.
//!
//! Configuration is merged from layered TOML files and `DOCSPACE_`
//! environment variables through the `config` crate; each sub-module is
//! one logical section of the merged document.

pub mod database;
pub mod logging;
pub mod storage;
pub mod tree;
pub mod webdav;

pub use database::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use storage::{S3StorageConfig, StorageConfig, StorageProvider};
pub use tree::TreeConfig;
pub use webdav::WebDavConfig;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Root application configuration.
///
/// Only the database section has no usable default; everything else
/// falls back to its section's `Default` when the files omit it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Metadata-store connection settings.
    pub database: DatabaseConfig,
    /// Object-storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Tree limits.
    #[serde(default)]
    pub tree: TreeConfig,
    /// WebDAV projection settings.
    #[serde(default)]
    pub webdav: WebDavConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load and merge configuration for a deployment profile.
    ///
    /// Later sources win: `config/default.toml`, then
    /// `config/{profile}.toml`, then `DOCSPACE_`-prefixed environment
    /// variables (`DOCSPACE_DATABASE__URL` overrides `database.url`).
    pub fn load(profile: &str) -> Result<Self, AppError> {
        let layered = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{profile}")).required(false))
            .add_source(
                config::Environment::with_prefix("DOCSPACE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(layered.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_section_defaults() {
        let layered = config::Config::builder()
            .add_source(config::File::from_str(
                "[database]\nurl = \"postgres://localhost/docspace\"",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let parsed: AppConfig = layered.try_deserialize().unwrap();
        assert_eq!(parsed.database.max_connections, 16);
        assert_eq!(parsed.tree.max_depth, 20);
        assert_eq!(parsed.logging.format, LogFormat::Json);
        assert_eq!(parsed.storage.provider, StorageProvider::S3);
        assert_eq!(parsed.webdav.api_prefix, "/api/document-space");
    }

    #[test]
    fn test_provider_and_format_parse_lowercase() {
        let layered = config::Config::builder()
            .add_source(config::File::from_str(
                concat!(
                    "[database]\nurl = \"postgres://localhost/docspace\"\n",
                    "[storage]\nprovider = \"memory\"\n",
                    "[logging]\nformat = \"pretty\"\n",
                ),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let parsed: AppConfig = layered.try_deserialize().unwrap();
        assert_eq!(parsed.storage.provider, StorageProvider::Memory);
        assert_eq!(parsed.logging.format, LogFormat::Pretty);
    }
}
