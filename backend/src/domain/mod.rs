//! Domain primitives: the response envelope, error codes, the failure
//! taxonomy and its dispatch policy.
//!
//! Purpose: keep the response protocol transport agnostic. Inbound adapters
//! render envelopes as HTTP responses; nothing here depends on Actix.
//!
//! Public surface:
//! - Envelope - `{code, message, data}` response wrapper.
//! - ErrorCode - stable numeric failure categories.
//! - Failure - tagged union of raised conditions.
//! - RequestContext / TraceId - explicit per-request correlation.

pub mod context;
pub mod dispatch;
pub mod envelope;
pub mod error_code;
pub mod failure;
pub mod ports;
pub mod trace_id;
pub mod validation;

pub use self::context::RequestContext;
pub use self::envelope::Envelope;
pub use self::error_code::ErrorCode;
pub use self::failure::{Failure, fail_if, fail_if_with};
pub use self::trace_id::TraceId;

/// HTTP header carrying the trace identifier in both directions.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Handler result: a success envelope or a failure for the dispatcher.
///
/// # Examples
/// ```
/// use scaffold::domain::{ApiResult, Envelope, ErrorCode, Failure};
///
/// fn handler(found: bool) -> ApiResult<&'static str> {
///     if !found {
///         return Err(Failure::business(ErrorCode::NotFound));
///     }
///     Ok(Envelope::success("found"))
/// }
/// assert!(handler(false).is_err());
/// ```
pub type ApiResult<T> = Result<Envelope<T>, Failure>;
