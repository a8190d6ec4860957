//! Web backend scaffold.
//!
//! Every endpoint answers with the same `{code, message, data}` envelope.
//! Failures raised by handlers or extractors are resolved by a single
//! dispatch policy, requests carry an explicit trace context, and background
//! work runs on a bounded task executor.

pub mod config;
pub mod domain;
pub mod executor;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use domain::{Envelope, ErrorCode, Failure, RequestContext, TraceId};
pub use middleware::{Dispatch, Trace};
