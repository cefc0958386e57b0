#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown {kind}: {value}")]
    UnknownToken { kind: &'static str, value: String },

    #[error("Log source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Malformed log data: {0}")]
    Decode(String),
}
