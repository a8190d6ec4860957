//! Unified response envelope returned by every endpoint.
//!
//! The envelope is transport agnostic; the HTTP adapter serialises it as the
//! response body with status 200 for both outcomes.

use serde::Serialize;

use super::ErrorCode;
use super::error_code::{SUCCESS_CODE, SUCCESS_MESSAGE};

/// Fixed-shape `{code, message, data}` response wrapper.
///
/// ## Invariants
/// - `code == 0` for envelopes built by [`Envelope::success`].
/// - Any non-zero `code` implies `data` is absent; the `data` key is then
///   omitted from the JSON form.
///
/// # Examples
/// ```
/// use scaffold::{Envelope, ErrorCode};
///
/// let ok = Envelope::success("hello");
/// assert_eq!(ok.code(), 0);
/// assert_eq!(ok.message(), "success");
///
/// let failed: Envelope<()> = Envelope::from_code(ErrorCode::ServerError);
/// assert_eq!(failed.code(), 50000);
/// assert!(failed.data().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope<T> {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T> Envelope<T> {
    /// Wrap a successful payload.
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: SUCCESS_MESSAGE.to_owned(),
            data: Some(data),
        }
    }

    /// Failure envelope with an explicit code and message.
    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Failure envelope using a predefined code and its default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::error(code.code(), code.message())
    }

    /// Numeric outcome code; zero on success.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Human-readable outcome message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Payload, present only on success.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Whether this envelope reports success.
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}
