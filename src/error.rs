use serde_json::Value;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a response (connection refused, DNS, abort).
    #[error("network error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The backend answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    Http {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// The backend answered successfully but the body was not the expected JSON.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid store url '{url}': {reason}")]
    Url { url: String, reason: String },

    #[error("unknown filter operator '{0}'")]
    UnknownOperator(String),

    #[error("invalid filter expression: {0}")]
    InvalidFilter(String),

    #[error("invalid sort descriptor: {0}")]
    InvalidSort(String),
}

impl Error {
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Transport(err.into())
    }

    /// Build an HTTP failure from a status and raw body. A JSON body is kept as
    /// the structured payload and its `message` is preferred; otherwise the
    /// status reason phrase is used.
    pub fn from_status(status: u16, reason: &str, raw_body: &[u8]) -> Self {
        let body = serde_json::from_slice::<Value>(raw_body).ok();
        let message = body
            .as_ref()
            .and_then(message_of)
            .unwrap_or_else(|| reason.to_string());

        Error::Http {
            status,
            message,
            body,
        }
    }

    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownOperator(_) | Error::InvalidFilter(_) | Error::InvalidSort(_)
        )
    }
}

// The REST backend reports `message` as either a string or a list of
// validation messages.
fn message_of(body: &Value) -> Option<String> {
    match body.get("message")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_error_prefers_json_message() {
        let body = json!({"statusCode": 404, "message": "User not found", "error": "Not Found"});
        let err = Error::from_status(404, "Not Found", body.to_string().as_bytes());

        match err {
            Error::Http {
                status,
                message,
                body: Some(payload),
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "User not found");
                assert_eq!(payload["error"], "Not Found");
            }
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[test]
    fn test_http_error_joins_validation_messages() {
        let body = json!({"statusCode": 400, "message": ["name must be a string", "age must be positive"]});
        let err = Error::from_status(400, "Bad Request", body.to_string().as_bytes());

        assert_eq!(
            err.to_string(),
            "request failed with status 400: name must be a string; age must be positive"
        );
    }

    #[test]
    fn test_http_error_falls_back_to_reason() {
        let err = Error::from_status(502, "Bad Gateway", b"<html>upstream down</html>");

        match err {
            Error::Http { message, body, .. } => {
                assert_eq!(message, "Bad Gateway");
                assert!(body.is_none());
            }
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[test]
    fn test_compile_error_classification() {
        assert!(Error::UnknownOperator("between".into()).is_compile_error());
        assert!(Error::InvalidSort("42".into()).is_compile_error());
        assert!(!Error::transport("refused").is_compile_error());
    }
}
