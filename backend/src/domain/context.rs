//! Explicit per-request context handed to handlers, the dispatcher and the
//! task executor.

use super::TraceId;

/// Request-scoped values threaded through every handler and logging call.
///
/// The trace identifier is optional: the envelope and dispatcher work the
/// same whether or not an upstream layer assigned one.
///
/// # Examples
/// ```
/// use scaffold::{RequestContext, TraceId};
///
/// let trace_id = TraceId::generate();
/// let ctx = RequestContext::new(trace_id);
/// assert_eq!(ctx.trace_id(), Some(trace_id));
/// assert!(RequestContext::detached().trace_id().is_none());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    trace_id: Option<TraceId>,
}

impl RequestContext {
    /// Context for a request carrying `trace_id`.
    #[must_use]
    pub fn new(trace_id: TraceId) -> Self {
        Self {
            trace_id: Some(trace_id),
        }
    }

    /// Context with no trace identifier, used outside request handling.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    /// Trace identifier of the request, if one was assigned.
    #[must_use]
    pub fn trace_id(&self) -> Option<TraceId> {
        self.trace_id
    }

    /// Trace identifier rendered for payloads; `None` when absent.
    #[must_use]
    pub fn trace_label(&self) -> Option<String> {
        self.trace_id.map(|id| id.to_string())
    }
}
