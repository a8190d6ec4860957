//! Server construction and lifecycle.

use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::Server;
use actix_web::{HttpServer, web};
use tracing::info;

use scaffold::config::AppSettings;
use scaffold::executor::TaskExecutor;
use scaffold::inbound::http::build_app;
use scaffold::inbound::http::state::{DownstreamPorts, HttpState};
use scaffold::outbound::SleepingDownstream;

const USER_SERVICE_LATENCY: Duration = Duration::from_millis(100);
const ORDER_SERVICE_LATENCY: Duration = Duration::from_millis(50);

/// Downstream adapters simulating the user and order services.
fn downstream_ports() -> DownstreamPorts {
    DownstreamPorts {
        users: Arc::new(SleepingDownstream::new("user-service", USER_SERVICE_LATENCY)),
        orders: Arc::new(SleepingDownstream::new("order-service", ORDER_SERVICE_LATENCY)),
    }
}

/// Construct the Actix HTTP server for `settings`, sharing `executor` across
/// workers.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(settings: &AppSettings, executor: TaskExecutor) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState::new(downstream_ports(), executor));
    let cors_settings = settings.cors();
    let bind_addr = settings.bind_addr();

    info!(host = %bind_addr.0, port = bind_addr.1, "starting HTTP server");
    let server = HttpServer::new(move || build_app(state.clone(), cors_settings.clone()))
        .bind(bind_addr)?
        .run();
    Ok(server)
}
