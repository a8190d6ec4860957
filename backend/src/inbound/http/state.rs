//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and the task executor, and remain testable without
//! real downstream services.

use std::sync::Arc;

use crate::domain::ports::DownstreamService;
use crate::executor::TaskExecutor;

/// Downstream services called by the trace demonstration, in call order.
#[derive(Clone)]
pub struct DownstreamPorts {
    pub users: Arc<dyn DownstreamService>,
    pub orders: Arc<dyn DownstreamService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn DownstreamService>,
    pub orders: Arc<dyn DownstreamService>,
    pub executor: TaskExecutor,
}

impl HttpState {
    /// Construct state from downstream ports and the shared executor.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// use scaffold::config::ExecutorSettings;
    /// use scaffold::executor::TaskExecutor;
    /// use scaffold::inbound::http::state::{DownstreamPorts, HttpState};
    /// use scaffold::outbound::SleepingDownstream;
    ///
    /// # fn build() -> Result<HttpState, scaffold::executor::ExecutorError> {
    /// let ports = DownstreamPorts {
    ///     users: Arc::new(SleepingDownstream::new("users", Duration::from_millis(100))),
    ///     orders: Arc::new(SleepingDownstream::new("orders", Duration::from_millis(50))),
    /// };
    /// let executor = TaskExecutor::new(ExecutorSettings::default())?;
    /// Ok(HttpState::new(ports, executor))
    /// # }
    /// ```
    pub fn new(ports: DownstreamPorts, executor: TaskExecutor) -> Self {
        let DownstreamPorts { users, orders } = ports;
        Self {
            users,
            orders,
            executor,
        }
    }
}
