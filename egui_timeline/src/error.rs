use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("Failed to read options: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse options: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid option `{field}`: {reason}")]
    InvalidOption { field: &'static str, reason: String },
}
