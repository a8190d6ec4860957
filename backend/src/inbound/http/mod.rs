//! HTTP inbound adapter exposing the REST endpoints.

pub mod app;
pub mod cors;
pub mod error;
pub mod hello;
pub mod response;
pub mod state;
pub mod validation;

pub use app::build_app;
