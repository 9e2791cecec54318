use thiserror::Error;

/// Errors raised while ingesting or validating a dataset or chart payload.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("row {row} has key '{key}' which is not a dataset column")]
    UnknownKey { row: usize, key: String },
    #[error("payload does not contain a {0}")]
    MissingSection(&'static str),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("no dataset available to reconcile against")]
    MissingDataset,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write delimited text: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error during export: {0}")]
    Io(#[from] std::io::Error),
}
