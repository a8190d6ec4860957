//! Failure dispatch policy: every raised condition becomes exactly one
//! envelope.
//!
//! Rules, most specific first:
//! 1. business failure: its own code and message;
//! 2. body validation: parameter-error code, messages joined with `;`;
//! 3. query/path validation: same, joined with `;`;
//! 4. form validation: same, joined with the full-width `；`;
//! 5. anything else: server-error code and its default message.
//!
//! The full condition is logged before the envelope is built. Only the
//! envelope leaves the process.

use tracing::error;
use tracing::field::display;

use super::{Envelope, ErrorCode, Failure, RequestContext};

/// Resolve a failure into its envelope without logging.
///
/// # Examples
/// ```
/// use scaffold::Failure;
/// use scaffold::domain::dispatch::resolve;
/// use std::io;
///
/// let envelope = resolve(&Failure::unclassified(io::Error::other("secret detail")));
/// assert_eq!(envelope.code(), 50000);
/// assert_eq!(envelope.message(), "internal server error");
/// ```
#[must_use]
pub fn resolve(failure: &Failure) -> Envelope<()> {
    match failure {
        Failure::Business { code, message } => Envelope::error(*code, message.as_str()),
        // Body, parameter and form origins differ only in their separator.
        Failure::Validation(validation) => {
            Envelope::error(ErrorCode::ParamsError.code(), validation.joined_message())
        }
        Failure::Unclassified(_) => Envelope::from_code(ErrorCode::ServerError),
    }
}

/// Log `failure` with the request context, then resolve it.
///
/// This never fails: an empty violation list simply yields an empty message.
pub fn dispatch(failure: &Failure, ctx: &RequestContext) -> Envelope<()> {
    log_failure(failure, ctx);
    resolve(failure)
}

fn log_failure(failure: &Failure, ctx: &RequestContext) {
    let trace_id = ctx.trace_id().map(display);
    match failure {
        Failure::Business { code, .. } => {
            error!(trace_id, code, failure = ?failure, "business failure");
        }
        Failure::Validation(validation) => {
            error!(
                trace_id,
                origin = %validation.origin(),
                violations = validation.violations().len(),
                failure = ?failure,
                "validation failure"
            );
        }
        Failure::Unclassified(report) => {
            error!(trace_id, error = ?report, "unclassified failure");
        }
    }
}

#[cfg(test)]
mod tests;
