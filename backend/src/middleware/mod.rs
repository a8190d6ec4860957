//! Request middleware.
//!
//! Purpose: attach the explicit request context and funnel every failed
//! request through the failure dispatcher.
//!
//! Install [`Dispatch`] inside [`Trace`] so dispatched failures are logged
//! with the request's trace identifier.

pub mod dispatch;
pub mod trace;

pub use dispatch::Dispatch;
pub use trace::{Trace, request_context};
