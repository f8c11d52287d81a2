use thiserror::Error;

/// Failures surfaced by ingestion and the serving boundary.
///
/// Unknown users and undefined similarities are ordinary outcomes (empty
/// neighborhoods, `None` scores) and never appear here.
#[derive(Debug, Error)]
pub enum RecError {
    #[error("malformed input row at line {line}: {detail}")]
    DataFormat { line: usize, detail: String },

    #[error("rating source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("invalid request parameter: {0}")]
    InvalidParameter(String),
}

impl RecError {
    pub fn data_format(line: usize, detail: impl Into<String>) -> Self {
        Self::DataFormat {
            line,
            detail: detail.into(),
        }
    }

    pub fn source_unavailable(detail: impl Into<String>) -> Self {
        Self::SourceUnavailable(detail.into())
    }

    pub fn invalid_parameter(detail: impl Into<String>) -> Self {
        Self::InvalidParameter(detail.into())
    }
}

impl From<std::io::Error> for RecError {
    fn from(e: std::io::Error) -> Self {
        Self::SourceUnavailable(e.to_string())
    }
}

impl From<sqlx::Error> for RecError {
    fn from(e: sqlx::Error) -> Self {
        Self::SourceUnavailable(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RecError>;
