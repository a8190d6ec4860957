//! Per-request trace identifier for correlating logs and responses.
//!
//! `TraceId` is a plain value. It is assigned by the trace middleware and
//! carried explicitly inside [`RequestContext`](super::RequestContext); there
//! is no ambient lookup.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// Correlation identifier that follows one request through the system.
///
/// # Examples
/// ```
/// use scaffold::TraceId;
///
/// let trace_id: TraceId = "00000000-0000-0000-0000-000000000000"
///     .parse()
///     .expect("valid UUID");
/// assert_eq!(trace_id.to_string(), "00000000-0000-0000-0000-000000000000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Generate a new random trace identifier.
    #[must_use]
    #[rustfmt::skip]
    pub fn generate() -> Self { Self(Uuid::new_v4()) }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}
