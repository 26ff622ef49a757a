//! Error types for planshift

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SharedError {
    #[error("Formatting failed: {0}")]
    Format(String),
}

pub type SharedResult<T> = Result<T, SharedError>;
