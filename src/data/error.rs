use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a source file into a [`Dataset`](super::model::Dataset).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("malformed source: {0}")]
    Malformed(String),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("column name '{0}' appears more than once after trimming whitespace")]
    DuplicateColumn(String),

    #[error("row {row}, column '{column}': invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    /// Raised only under [`DerivationPolicy::Reject`](super::loader::DerivationPolicy).
    #[error(transparent)]
    Derivation(#[from] DerivationError),
}

/// A row whose `price_per_GB` cannot be derived.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}: cannot derive price_per_GB from capacity_MB {capacity_mb:?}")]
pub struct DerivationError {
    pub row: usize,
    pub capacity_mb: Option<f64>,
}

/// Invalid key/value filter input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("unknown filter dimension '{0}'")]
    UnknownDimension(String),

    #[error("'{value}' is not a valid {dimension} value")]
    InvalidValue { dimension: String, value: String },
}

/// A page identifier outside the defined set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dashboard page '{0}'")]
pub struct UnknownViewError(pub String);

/// A UI request that could not be turned into a selection and page.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    View(#[from] UnknownViewError),
}
