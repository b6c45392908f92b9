use thiserror::Error;

/// Error types shared by the relay, the relay client and the controllers.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// A required field was missing or empty, or held an unusable value
    #[error("Missing or invalid fields: {}", fields.join(", "))]
    Validation { fields: Vec<String> },
    /// Non-success answer from the upstream provider or the relay
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },
    /// Connection failures and other transport errors
    #[error("Network error: {0}")]
    Network(String),
    /// The request did not complete within its time budget
    #[error("Request timed out: {0}")]
    Timeout(String),
    /// Missing or invalid configuration at the point of use
    #[error("Configuration error: {0}")]
    Config(String),
    /// Storage read or write failure
    #[error("Persistence error: {0}")]
    Persistence(String),
    /// JSON serialization/deserialization errors
    #[error("JSON parse error: {0}")]
    Json(String),
    /// The operation was cancelled before it finished
    #[error("Request cancelled")]
    Cancelled,
}

impl AssistantError {
    /// Builds a validation error from the names of the offending fields.
    pub fn missing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AssistantError::Validation {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Converts reqwest HTTP errors, keeping timeouts distinct from other transport failures.
impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AssistantError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            AssistantError::Upstream {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            AssistantError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        AssistantError::Json(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}

impl From<std::io::Error> for AssistantError {
    fn from(err: std::io::Error) -> Self {
        AssistantError::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_lists_every_missing_field() {
        let err = AssistantError::missing(["query", "apiKey"]);
        assert_eq!(err.to_string(), "Missing or invalid fields: query, apiKey");
    }

    #[test]
    fn json_errors_carry_position() {
        let err: AssistantError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AssistantError::Json(ref msg) if msg.contains("line 1")));
    }
}
