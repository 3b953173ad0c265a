//! Application configuration

use config::{Config, ConfigError, Environment, File};
use parquet::basic::{GzipLevel, ZstdLevel};
use serde::Deserialize;

use crate::errors::AisArchiveError;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub decode: DecodeConfig,
    pub fragments: FragmentConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DecodeConfig {
    /// Abort the whole batch on the first malformed numeric field instead
    /// of skipping the line
    pub strict: bool,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct FragmentConfig {
    pub join_key: JoinKeyPolicy,
}

/// How first and second fragments of a two-part message find each other
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JoinKeyPolicy {
    /// MMSI read from each fragment's own bits [8,38) plus the group tag.
    ///
    /// A continuation fragment carries no header, so its "MMSI" is whatever
    /// payload bits sit at that offset. Kept as the default for output
    /// compatibility with existing archives.
    #[default]
    MmsiAndGroup,
    /// Group tag plus NMEA sequence id only
    GroupAndSequence,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub compression: Compression,
    pub max_rows_per_group: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            max_rows_per_group: 65_536,
        }
    }
}

/// Parquet codec for the written dataset
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    Uncompressed,
}

impl From<Compression> for parquet::basic::Compression {
    fn from(value: Compression) -> Self {
        match value {
            Compression::Snappy => parquet::basic::Compression::SNAPPY,
            Compression::Zstd => parquet::basic::Compression::ZSTD(ZstdLevel::default()),
            Compression::Gzip => parquet::basic::Compression::GZIP(GzipLevel::default()),
            Compression::Uncompressed => parquet::basic::Compression::UNCOMPRESSED,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                Environment::with_prefix("AISARCHIVE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), AisArchiveError> {
        if self.output.max_rows_per_group == 0 {
            return Err(AisArchiveError::ConfigurationError {
                message: "Row group size must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_load_config() {
        env::set_var("AISARCHIVE__DECODE__STRICT", "true");
        env::set_var("AISARCHIVE__FRAGMENTS__JOIN_KEY", "group_and_sequence");
        env::set_var("AISARCHIVE__OUTPUT__COMPRESSION", "zstd");
        env::set_var("AISARCHIVE__OUTPUT__MAX_ROWS_PER_GROUP", "1024");

        let config = AppConfig::load().unwrap();
        assert!(config.decode.strict);
        assert_eq!(config.fragments.join_key, JoinKeyPolicy::GroupAndSequence);
        assert_eq!(config.output.compression, Compression::Zstd);
        assert_eq!(config.output.max_rows_per_group, 1024);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(!config.decode.strict);
        assert_eq!(config.fragments.join_key, JoinKeyPolicy::MmsiAndGroup);
        assert_eq!(config.output.compression, Compression::Snappy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_row_group() {
        let mut config = AppConfig::default();
        config.output.max_rows_per_group = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_compression_mapping() {
        assert_eq!(
            parquet::basic::Compression::from(Compression::Snappy),
            parquet::basic::Compression::SNAPPY
        );
        assert_eq!(
            parquet::basic::Compression::from(Compression::Uncompressed),
            parquet::basic::Compression::UNCOMPRESSED
        );
    }
}
