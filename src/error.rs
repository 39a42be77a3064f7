use thiserror::Error;

/// Failures a command can run into. Every variant maps to a message the
/// invoking user sees; none of them are retried.
#[derive(Debug, Error)]
pub enum BotError {
    /// Upstream returned a non-success status or the transport failed.
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    /// No currency or build matched the query.
    #[error("could not find {0}")]
    NotFound(String),

    #[error("a build named `{0}` already exists")]
    DuplicateName(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Bad user input; nothing was computed.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl BotError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            BotError::FetchFailed(_) => {
                "❌ Could not fetch data right now. Please try again later.".to_string()
            }
            BotError::NotFound(what) => format!("❌ Could not find {}.", what),
            BotError::DuplicateName(name) => format!(
                "❌ Build `{}` already exists! Use a different name or delete the old one first.",
                name
            ),
            BotError::Forbidden(reason) => format!("❌ {}", reason),
            BotError::Validation(reason) => format!("❌ {}", reason),
            BotError::Storage(_) => {
                "❌ Something went wrong while saving your data.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        BotError::FetchFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_name_the_subject() {
        let err = BotError::NotFound("currency `exalted`".to_string());
        assert_eq!(err.user_message(), "❌ Could not find currency `exalted`.");

        let err = BotError::DuplicateName("Ranger".to_string());
        assert!(err.user_message().contains("`Ranger` already exists"));

        let err = BotError::FetchFailed("status 503".to_string());
        assert!(!err.user_message().contains("503"));
    }

    #[test]
    fn test_storage_wraps_anyhow() {
        let err: BotError = anyhow::anyhow!("disk full").into();
        assert!(matches!(err, BotError::Storage(_)));
        assert_eq!(err.to_string(), "storage error: disk full");
    }
}
