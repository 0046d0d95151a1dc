use thiserror::Error;

/// The only failure text users ever see; causes go to the logs.
pub const GENERIC_ERROR_MESSAGE: &str =
    "Maaf, terjadi kesalahan saat membuat konten. Pastikan API Key sudah benar dan coba lagi.";

/// Why a generation attempt failed. Every variant is fatal for the batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// Credential missing or rejected.
    #[error("provider configuration error: {0}")]
    Configuration(String),

    /// Provider unreachable, timed out, or answered with a non-success status.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// Provider answered, but not with what was asked for.
    #[error("unexpected provider response: {0}")]
    Schema(String),
}

impl GenerationError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Short machine-readable kind for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Configuration(_) => "configuration",
            GenerationError::Upstream(_) => "upstream",
            GenerationError::Schema(_) => "schema",
        }
    }

    /// What the user is shown, regardless of kind.
    pub fn user_message(&self) -> &'static str {
        GENERIC_ERROR_MESSAGE
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            GenerationError::Schema(error.to_string())
        } else {
            GenerationError::Upstream(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_collapses_to_the_same_user_message() {
        let errors = [
            GenerationError::configuration("API key is missing"),
            GenerationError::upstream("HTTP 503"),
            GenerationError::schema("no image generated"),
        ];
        for error in &errors {
            assert_eq!(error.user_message(), GENERIC_ERROR_MESSAGE);
            assert!(!GENERIC_ERROR_MESSAGE.contains(&error.to_string()));
        }
        assert_eq!(errors[0].kind(), "configuration");
        assert_eq!(errors[2].kind(), "schema");
    }
}
