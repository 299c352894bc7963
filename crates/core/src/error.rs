//! Error types for terraseries

use thiserror::Error;

/// Main error type for terraseries operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog asset not found: {id}")]
    NotFound { id: String },

    #[error("Read access denied for catalog asset: {id}")]
    AccessDenied { id: String },

    #[error("Band not found: {band}")]
    BandNotFound { band: String },

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("CRS mismatch: {0} vs {1}")]
    CrsMismatch(String, String),

    #[error("Export too large: {required} pixels exceeds ceiling of {ceiling}")]
    ExportTooLarge { required: u64, ceiling: u64 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for terraseries operations
pub type Result<T> = std::result::Result<T, Error>;
