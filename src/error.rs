//! Error taxonomy. Mirrors spec §7: configuration and source errors are
//! fatal only at `initialize` time; everything that can happen once the
//! adapter is streaming is reported and swallowed by the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting '{0}'")]
    MissingKey(String),
    #[error("setting '{key}' has invalid value '{value}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
    #[error("sharedMapping '{0}' did not resolve to a known adapter")]
    UnknownSharedMapping(String),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("configuration source unavailable: {0}")]
    Unavailable(String),
    #[error("device with idCode {id_code} and label '{label}' collides with an existing entry in both tables")]
    DuplicateDevice { id_code: u16, label: String },
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to write cache for adapter '{adapter}': {source}")]
    Write {
        adapter: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cache file for adapter '{adapter}' is corrupt: {reason}")]
    Corrupt { adapter: String, reason: String },
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("device '{device}' failed during measurement mapping: {reason}")]
    DeviceMappingFailed { device: String, reason: String },
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("configuration source error: {0}")]
    Source(#[from] SourceError),
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}
