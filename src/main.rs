mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use rendergate_lib::engine::{LaunchOptions, PlaywrightEngine};
use rendergate_lib::server::{router, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .init();

    let port = args.resolved_port();
    let launch_options = LaunchOptions {
        ignore_https_errors: args.resolved_ignore_https_errors(),
    };
    if launch_options.ignore_https_errors {
        tracing::warn!("TLS certificate errors will be ignored during navigation");
    }

    let state = Arc::new(AppState::new(
        Arc::new(PlaywrightEngine::new(&args.node_command)),
        launch_options,
    ));
    let app = router(state);

    let listener = match tokio::net::TcpListener::bind((args.host.as_str(), port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(host = %args.host, port, error = %err, "failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Listen port on {port}.");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server terminated");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
