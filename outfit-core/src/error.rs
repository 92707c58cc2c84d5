use std::path::PathBuf;

use thiserror::Error;

/// Problems found while loading or validating a clothing catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("item '{id}' has an inverted temperature range ({min} > {max})")]
    InvalidTemperatureRange { id: String, min: f64, max: f64 },

    #[error("duplicate clothing item id '{0}'")]
    DuplicateId(String),

    #[error("failed to parse catalog JSON")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read catalog file: {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A string that does not name any variant of one of the catalog enums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} '{value}'. Supported values: {expected}.")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}
