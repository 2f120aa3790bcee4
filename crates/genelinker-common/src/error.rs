use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneLinkerError {
    /// Empty or otherwise unusable input. Raised before any network call.
    #[error("Invalid input: {0}")]
    UserInput(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("PDF URL not available for \"{0}\"")]
    MissingPdfUrl(String),

    #[error("File operation failed: {0}")]
    FileOperation(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Security policy violation: {0}")]
    SecurityError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GeneLinkerError {
    pub fn is_user_input(&self) -> bool {
        matches!(self, GeneLinkerError::UserInput(_))
    }

    /// File and export failures are specific to one action and may be retried
    /// without touching any other state.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeneLinkerError::Http(_)
                | GeneLinkerError::FileOperation(_)
                | GeneLinkerError::Io(_)
                | GeneLinkerError::Render(_)
                | GeneLinkerError::Pdf(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GeneLinkerError>;
