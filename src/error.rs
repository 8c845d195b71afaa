use thiserror::Error;

/// Errors surfaced by the task store, storage backends and input parsing.
#[derive(Error, Debug)]
pub enum Error {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize tasks: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid deadline '{0}'. Use YYYY-MM-DD HH:MM or YYYY-MM-DDTHH:MM.")]
    InvalidDeadline(String),

    #[error("invalid priority '{0}'. Use none, medium or high.")]
    InvalidPriority(String),

    #[error("no task id left above the highest stored id")]
    IdsExhausted,

    #[error("invalid {kind} filter '{value}'")]
    InvalidFilter { kind: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
