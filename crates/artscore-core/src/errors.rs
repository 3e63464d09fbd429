use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        details: Option<serde_json::Value>,
    },
}

impl CoreError {
    /// Short name of the request stage that produced the error, used as a log field.
    pub fn stage(&self) -> &'static str {
        match self {
            CoreError::Io(_) => "io",
            CoreError::Validation(_) => "validate",
            CoreError::Config(_) => "config",
            CoreError::Upstream { .. } => "upstream",
        }
    }
}
