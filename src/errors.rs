use thiserror::Error;

use crate::calculator::MIN_LISTING_PRICE;

/// Soft input errors. They never leave the handler that triggered them;
/// the UI turns them into the invalid-input marker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("Invalid input")]
    InvalidShipping,

    #[error("Invalid input")]
    InvalidTarget,

    #[error("Invalid input ({}+)", MIN_LISTING_PRICE)]
    BelowMinimumPrice,

    #[error("Invalid input (amount too large)")]
    AmountTooLarge,

    #[error("Nothing to save: the current calculation is invalid")]
    NothingToSave,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored {key} is not a readable list, refusing to overwrite it: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },

    #[error("No item at display position {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("List changed since it was shown (was {expected} items, now {actual})")]
    StaleSnapshot { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML from config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("GUI error: {0}")]
    Gui(#[from] eframe::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
