//! Domain ports defining the edges of the hexagon.
//!
//! Handlers depend on these traits only; adapters in `outbound` provide the
//! implementations and tests substitute mocks.

use async_trait::async_trait;

use super::{Failure, RequestContext};

/// A downstream service the trace demonstration calls on behalf of a request.
///
/// Implementations receive the request context so their logs carry the same
/// trace identifier as the caller's.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DownstreamService: Send + Sync {
    /// Perform the call for the request described by `ctx`.
    async fn call(&self, ctx: &RequestContext) -> Result<(), Failure>;
}
