//! Simulated downstream services used by the trace demonstration.
//!
//! Each adapter waits for a fixed latency and logs the call with the caller's
//! trace identifier, standing in for a network hop.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;
use tracing::field::display;

use crate::domain::ports::DownstreamService;
use crate::domain::{Failure, RequestContext};

/// Downstream stand-in that sleeps for `latency` before succeeding.
#[derive(Debug, Clone)]
pub struct SleepingDownstream {
    name: String,
    latency: Duration,
}

impl SleepingDownstream {
    /// Create an adapter named `name` answering after `latency`.
    pub fn new(name: impl Into<String>, latency: Duration) -> Self {
        Self {
            name: name.into(),
            latency,
        }
    }

    /// Service name used in log events.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

#[async_trait]
impl DownstreamService for SleepingDownstream {
    async fn call(&self, ctx: &RequestContext) -> Result<(), Failure> {
        let trace_id = ctx.trace_id().map(display);
        info!(trace_id, service = %self.name, "calling downstream service");
        tokio::time::sleep(self.latency).await;
        info!(trace_id, service = %self.name, latency = ?self.latency, "downstream service answered");
        Ok(())
    }
}
