//! Stable numeric error codes and their default messages.

use std::fmt;

/// Code carried by every successful envelope.
pub const SUCCESS_CODE: i32 = 0;
/// Message carried by every successful envelope.
pub const SUCCESS_MESSAGE: &str = "success";

/// Failure category exposed to callers through the envelope `code` field.
///
/// Codes are stable wire values; changing one is a breaking change for
/// clients.
///
/// # Examples
/// ```
/// use scaffold::ErrorCode;
///
/// assert_eq!(ErrorCode::ParamsError.code(), 40000);
/// assert_eq!(ErrorCode::ServerError.code(), 50000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The request parameters are missing or invalid.
    ParamsError,
    /// The caller has not authenticated.
    NotLogin,
    /// The caller is authenticated but lacks permission.
    NoAuth,
    /// Access to the resource is forbidden.
    Forbidden,
    /// The requested data does not exist.
    NotFound,
    /// An unexpected failure occurred on the server.
    ServerError,
    /// A business operation could not be completed.
    OperationError,
}

impl ErrorCode {
    /// Numeric code written to the envelope.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParamsError => 40000,
            Self::NotLogin => 40100,
            Self::NoAuth => 40101,
            Self::Forbidden => 40300,
            Self::NotFound => 40400,
            Self::ServerError => 50000,
            Self::OperationError => 50001,
        }
    }

    /// Default human-readable message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ParamsError => "request parameter error",
            Self::NotLogin => "not logged in",
            Self::NoAuth => "no permission",
            Self::Forbidden => "access forbidden",
            Self::NotFound => "requested data does not exist",
            Self::ServerError => "internal server error",
            Self::OperationError => "operation failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}
