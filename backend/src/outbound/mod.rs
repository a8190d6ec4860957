//! Outbound adapters implementing domain ports.
//!
//! Adapters are thin translators with no business logic:
//!
//! - **downstream**: simulated service calls for trace propagation demos.

pub mod downstream;

pub use downstream::SleepingDownstream;
