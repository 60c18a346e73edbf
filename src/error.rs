use thiserror::Error;

/// Failures that abort a history load.
///
/// Loader functions wrap these in `anyhow` context so the UI can show the
/// full chain (file → row → cause) in the status line.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing expected column '{column}'")]
    MissingColumn { column: String },

    #[error("row {row}: unparsable timestamp '{value}'")]
    BadTimestamp { row: usize, value: String },

    #[error("row {row}: invalid value '{value}' in column '{column}'")]
    BadValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("environment variable {0} is required for the remote source")]
    MissingEnv(String),

    #[error("remote source {url} answered with status {status}")]
    Remote { status: u16, url: String },
}
