use thiserror::Error;

/// Structured failure kinds for campaign API operations.
///
/// The backend has no machine-readable auth error code, so `classify` carries a
/// compatibility shim that promotes legacy message text ("session", "401", "403")
/// to `Auth`. Callers dispatch on the variant, never on message contents.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected locally before any network I/O.
    #[error("{0}")]
    Validation(String),

    /// The backend no longer recognizes our session token.
    #[error("{0}")]
    Auth(String),

    /// Fetch-level failure: DNS, refused connection, interrupted body.
    #[error("network error: {0}")]
    Transport(String),

    /// Non-2xx with a backend-reported message (or the generic fallback when
    /// the body was not parseable JSON).
    #[error("{message}")]
    Backend { status: u16, message: String },
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }

    /// Map a non-2xx response to an error kind.
    pub(crate) fn classify(status: u16, message: String) -> Self {
        if status == 401 || status == 403 || looks_like_auth(&message) {
            ApiError::Auth(message)
        } else {
            ApiError::Backend { status, message }
        }
    }
}

/// Legacy shim: older backend builds report session problems only through
/// message wording.
pub(crate) fn looks_like_auth(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("session") || lower.contains("401") || lower.contains("403")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_classifies_as_auth() {
        assert!(ApiError::classify(401, "Invalid session".into()).is_auth());
        assert!(ApiError::classify(403, "Forbidden".into()).is_auth());
    }

    #[test]
    fn legacy_message_text_classifies_as_auth() {
        assert!(ApiError::classify(400, "Session expired".into()).is_auth());
        assert!(ApiError::classify(500, "got 403 from upstream".into()).is_auth());
    }

    #[test]
    fn other_failures_stay_backend() {
        let err = ApiError::classify(422, "Day is locked".into());
        match err {
            ApiError::Backend { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Day is locked");
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }
}
