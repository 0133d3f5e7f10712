use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Extraction failed: {message}")]
    Extraction { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error message is safe to show to an end user as-is
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Extraction { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Invalid input");
        assert_eq!(error.to_string(), "Validation error: Invalid input");
    }

    #[test]
    fn test_extraction_error() {
        let error = DomainError::extraction("no text layer");
        assert_eq!(error.to_string(), "Extraction failed: no text layer");
    }

    #[test]
    fn test_user_facing() {
        assert!(DomainError::validation("x").is_user_facing());
        assert!(DomainError::extraction("x").is_user_facing());
        assert!(!DomainError::internal("x").is_user_facing());
    }
}
