use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the pipeline stages.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("raw data file not found: {}", .0.display())]
    RawFileMissing(PathBuf),
    #[error("unexpected layout in {}: {reason}", .path.display())]
    UnexpectedLayout { path: PathBuf, reason: String },
    #[error("request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("hub token not set; export {0} with a write token")]
    MissingToken(String),
    #[error("processed dataset is empty: {}", .0.display())]
    EmptyDataset(PathBuf),
    #[error("invalid dataset line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },
}

/// Why the formatter dropped a raw record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropReason {
    #[error("embedded JSON could not be parsed")]
    InvalidEmbeddedJson,
    #[error("record is not an object")]
    NotAnObject,
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("required field '{0}' is empty")]
    EmptyField(&'static str),
    #[error("field '{0}' has an unsupported type")]
    UnsupportedType(&'static str),
}
