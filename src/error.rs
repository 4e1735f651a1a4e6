//! Error types for limitcalc.
//!
//! The calculation engine itself never fails; these errors come from the
//! catalog tool and the command line front end.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for limitcalc operations.
pub type Result<T> = std::result::Result<T, LimitCalcError>;

/// Errors that can occur in limitcalc.
#[derive(Debug, Error)]
pub enum LimitCalcError {
    /// Failed to open a catalog file.
    #[error("Failed to open file: {path}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog file is not valid JSON for the expected shape.
    #[error("Invalid catalog {path}: {source}")]
    CatalogFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reference not present in a catalog.
    #[error("Unknown {kind}: {reference}")]
    UnknownReference {
        kind: &'static str,
        reference: String,
    },

    /// Amplifier has no power rating at the requested load.
    #[error("{amplifier} does not support {load} Ohm")]
    UnsupportedLoad { amplifier: String, load: u32 },

    /// Requested load is above the speaker's nominal impedance.
    #[error("{speaker} impedance cannot be higher than {nominal} Ohm")]
    LoadAboveNominal { speaker: String, nominal: u32 },

    /// Argument rejected before reaching the engine.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl LimitCalcError {
    /// Create a FileOpen error.
    pub fn file_open(path: PathBuf, source: std::io::Error) -> Self {
        Self::FileOpen { path, source }
    }

    /// Create a CatalogFormat error.
    pub fn catalog_format(path: PathBuf, source: serde_json::Error) -> Self {
        Self::CatalogFormat { path, source }
    }

    /// Create an UnknownReference error.
    pub fn unknown_reference(kind: &'static str, reference: impl Into<String>) -> Self {
        Self::UnknownReference {
            kind,
            reference: reference.into(),
        }
    }

    /// Create an InvalidArgument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
