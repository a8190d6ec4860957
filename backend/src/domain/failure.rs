//! Conditions raised while handling a request.
//!
//! `Failure` is the closed taxonomy the dispatcher resolves into envelopes:
//! business failures carry their own code, validation failures always map to
//! the parameter-error code, and everything else is unclassified.

use color_eyre::eyre::Report;
use thiserror::Error;

use super::ErrorCode;
use super::validation::{ValidationFailure, ValidationOrigin, Violation};

/// Raised condition terminating one request's error path.
///
/// # Examples
/// ```
/// use scaffold::{ErrorCode, Failure};
///
/// let failure = Failure::business_with(40001, "duplicate username");
/// assert_eq!(failure.to_string(), "business failure 40001: duplicate username");
///
/// let failure = Failure::business(ErrorCode::NotFound);
/// assert!(matches!(failure, Failure::Business { code: 40400, .. }));
/// ```
#[derive(Debug, Error)]
pub enum Failure {
    /// Expected, caller-actionable failure with an explicit code.
    #[error("business failure {code}: {message}")]
    Business { code: i32, message: String },
    /// Request input violated one or more constraints.
    #[error("{0}")]
    Validation(ValidationFailure),
    /// Any other failure; detail is for operators only.
    #[error("unclassified failure: {0}")]
    Unclassified(Report),
}

impl Failure {
    /// Business failure using a predefined code and its default message.
    #[must_use]
    pub fn business(code: ErrorCode) -> Self {
        Self::business_with(code.code(), code.message())
    }

    /// Business failure with an explicit code and message.
    pub fn business_with(code: i32, message: impl Into<String>) -> Self {
        Self::Business {
            code,
            message: message.into(),
        }
    }

    /// Validation failure for `origin` with violations in declaration order.
    #[must_use]
    pub fn validation(origin: ValidationOrigin, violations: Vec<Violation>) -> Self {
        Self::Validation(ValidationFailure::new(origin, violations))
    }

    /// Wrap an arbitrary error as an unclassified failure.
    pub fn unclassified<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unclassified(Report::new(error))
    }
}

impl From<Report> for Failure {
    fn from(report: Report) -> Self {
        Self::Unclassified(report)
    }
}

impl From<ValidationFailure> for Failure {
    fn from(failure: ValidationFailure) -> Self {
        Self::Validation(failure)
    }
}

/// Raise a business failure with `code` when `condition` holds.
///
/// # Examples
/// ```
/// use scaffold::ErrorCode;
/// use scaffold::domain::fail_if;
///
/// assert!(fail_if(false, ErrorCode::ParamsError).is_ok());
/// assert!(fail_if(true, ErrorCode::ParamsError).is_err());
/// ```
pub fn fail_if(condition: bool, code: ErrorCode) -> Result<(), Failure> {
    if condition {
        return Err(Failure::business(code));
    }
    Ok(())
}

/// Raise a business failure with `code` and a custom message when
/// `condition` holds.
pub fn fail_if_with(
    condition: bool,
    code: ErrorCode,
    message: impl Into<String>,
) -> Result<(), Failure> {
    if condition {
        return Err(Failure::business_with(code.code(), message));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::eyre;

    #[test]
    fn business_uses_default_message() {
        let failure = Failure::business(ErrorCode::ParamsError);
        match failure {
            Failure::Business { code, message } => {
                assert_eq!(code, 40000);
                assert_eq!(message, "request parameter error");
            }
            other => panic!("expected business failure, got {other:?}"),
        }
    }

    #[test]
    fn fail_if_with_overrides_message() {
        let result = fail_if_with(true, ErrorCode::OperationError, "quota exhausted");
        assert!(matches!(
            result,
            Err(Failure::Business { code: 50001, ref message }) if message == "quota exhausted"
        ));
    }

    #[test]
    fn reports_convert_to_unclassified() {
        let failure: Failure = eyre!("disk on fire").into();
        assert!(matches!(failure, Failure::Unclassified(_)));
        assert_eq!(failure.to_string(), "unclassified failure: disk on fire");
    }

    #[test]
    fn std_errors_wrap_as_unclassified() {
        let failure = Failure::unclassified(std::io::Error::other("socket closed"));
        assert!(matches!(failure, Failure::Unclassified(_)));
    }

    #[test]
    fn validation_display_names_origin() {
        let failure = Failure::validation(
            ValidationOrigin::Form,
            vec![Violation::new("phone", "phone format invalid")],
        );
        assert_eq!(
            failure.to_string(),
            "form validation failed: phone format invalid"
        );
    }
}
