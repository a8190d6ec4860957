//! Backend entry-point: loads settings, starts the HTTP server and drains the
//! task executor on shutdown.

mod server;

use color_eyre::eyre::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use ortho_config::OrthoConfig;
use scaffold::config::AppSettings;
use scaffold::executor::{ShutdownOutcome, TaskExecutor};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .wrap_err("failed to load settings")?;
    let executor =
        TaskExecutor::new(settings.executor()).wrap_err("failed to start task executor")?;

    server::create_server(&settings, executor.clone())
        .wrap_err("failed to start HTTP server")?
        .await
        .wrap_err("HTTP server failed")?;

    match executor.shutdown().await {
        ShutdownOutcome::Drained => info!("shutdown complete"),
        ShutdownOutcome::TimedOut { aborted } => {
            warn!(aborted, "shutdown complete with aborted tasks");
        }
    }
    Ok(())
}
