//! Tagged result returned by the public operations.

use crate::error::DeckGenError;
use serde::{Deserialize, Serialize};

/// `{status, data}` on success, `{status, error}` on failure.
///
/// Serialises to the shape callers of the presentation editor expect:
///
/// ```json
/// {"status": 200, "data": {"outlines": ["…"]}}
/// {"status": 429, "error": "API rate limit exceeded. Please try again later."}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse<T> {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ActionResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200 && self.data.is_some()
    }
}

impl<T> From<DeckGenError> for ActionResponse<T> {
    fn from(err: DeckGenError) -> Self {
        Self::failure(err.status_code(), err.user_message())
    }
}

impl<T> From<Result<T, DeckGenError>> for ActionResponse<T> {
    fn from(result: Result<T, DeckGenError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => e.into(),
        }
    }
}
