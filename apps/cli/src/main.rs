mod args;
mod config;
mod paths;
mod scheduler;

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use app_api::{AddLeaveRequest, AppContext, CreateUserRequest};
use attendance_app::{AppConfig, AppPaths, AppState, ensure_app_data_dir};
use clap::Parser;
use http_api::HttpState;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Command};
use crate::config::CliConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = config::load_or_create().map_err(io::Error::other)?;
    if config.created {
        info!(
            path = %config.paths.file.display(),
            port = config.config.port,
            "created default config"
        );
    }

    let data_dir =
        paths::resolve_data_dir(config.config.data_dir.as_deref()).map_err(io::Error::other)?;
    info!(path = %data_dir.display(), "using data dir");

    let paths = AppPaths::new(data_dir);
    ensure_app_data_dir(&paths)?;

    let mut app_config = AppConfig::new(paths.db_path.clone());
    app_config.leave_overlap = config.config.leave_overlap;
    let app_state = AppState::new(app_config);
    app_state.initialize()?;

    let context = AppContext::new(app_state);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(context, &config.config, cli.port).await?,
        Command::AddUser { name } => {
            let created = app_api::create_user(&context, CreateUserRequest { username: name })?;
            println!("Created user {} (id {}).", created.user.username, created.user.id);
            println!("API token: {}", created.api_token);
        }
        Command::AddLeave {
            user_id,
            date,
            leave_type,
            reason,
        } => {
            let leave = app_api::add_leave(
                &context,
                AddLeaveRequest {
                    user_id,
                    date,
                    leave_type,
                    reason,
                },
            )?;
            println!(
                "Recorded {} leave for user {} on {}.",
                leave.leave_type, leave.user_id, leave.date
            );
        }
        Command::Reconcile => {
            let report = app_api::reconcile(&context)?;
            for day in &report.closed {
                println!("Closed session for user {} on {}.", day.user_id, day.date);
            }
            println!(
                "Scanned {} open session(s), closed {}, failed {}.",
                report.scanned,
                report.closed.len(),
                report.failed
            );
        }
    }

    Ok(())
}

async fn serve(
    context: AppContext,
    config: &CliConfig,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = scheduler::spawn(
        context.app_state.clone(),
        Duration::from_secs(config.reconcile_interval_secs),
        shutdown_rx,
    );

    let router = http_api::router(HttpState::new(context));

    let port = port_override.unwrap_or(config.port);
    let (listener, actual_port, used_fallback) = bind_port(&config.host, port).await?;
    if used_fallback {
        warn!(
            configured = port,
            actual = actual_port,
            "configured port was unavailable, using another for this run"
        );
    }
    info!(
        url = %format!("http://{}:{}", config.host, actual_port),
        "attendance tracker is running"
    );

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    let _ = shutdown_tx.send(true);
    if let Err(err) = scheduler.await {
        warn!(error = %err, "scheduler did not stop cleanly");
    }
    served?;
    info!("server stopped");
    Ok(())
}

async fn bind_port(
    host: &str,
    port: u16,
) -> Result<(tokio::net::TcpListener, u16, bool), io::Error> {
    let ip = host.parse::<IpAddr>().map_err(|err| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("host {host:?}: {err}"))
    })?;

    if port == 0 {
        let listener = tokio::net::TcpListener::bind(SocketAddr::new(ip, 0)).await?;
        let actual_port = listener.local_addr()?.port();
        return Ok((listener, actual_port, false));
    }

    match tokio::net::TcpListener::bind(SocketAddr::new(ip, port)).await {
        Ok(listener) => Ok((listener, port, false)),
        Err(_) => {
            let listener = tokio::net::TcpListener::bind(SocketAddr::new(ip, 0)).await?;
            let actual_port = listener.local_addr()?.port();
            Ok((listener, actual_port, true))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
