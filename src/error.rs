use thiserror::Error;

/// Top-level error for the tracker and the binary.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("storage error")]
    Store(#[from] StoreError),

    #[error("configuration error")]
    Config(#[from] ConfigError),

    #[error("server error: {0}")]
    Server(String),
}

/// Failures of the key-value backend or of payload encoding.
///
/// A payload that fails to decode is only surfaced by
/// [`EntityStore::try_load`](crate::storage::EntityStore::try_load); the
/// regular load path falls back to an empty collection.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failed for key {key}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode value for key {key}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored value for key {key} is malformed")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;
