use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use release_dashboard_backend::api::{self, AppState};
use release_dashboard_backend::config::{Config, LogFormat};
use release_dashboard_backend::services::devops_client::AzureDevOpsClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment may already carry everything.
    let dotenv = dotenvy::dotenv();

    let config = Config::parse();
    init_tracing(config.log_format);

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => return Err(e).context("failed to read .env"),
    }

    config.validate()?;
    tracing::info!(?config, "Starting release dashboard");

    let devops = AzureDevOpsClient::new(config.azure_pat.clone(), config.request_timeout())?;
    let addr = config.bind_addr().await?;
    let state = Arc::new(AppState::new(config, Arc::new(devops)));

    warn_if_default_project_missing(&state).await;

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Listening on http://{} (API docs at /docs)", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("release_dashboard=info,release_dashboard_backend=info,tower_http=info")
    });

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

/// Requests without a `project` parameter resolve to the default project, so
/// point out early when it is not registered.
async fn warn_if_default_project_missing(state: &AppState) {
    let name = &state.config.default_project;
    match state.projects.find(name).await {
        Ok(Some(_)) => {}
        Ok(None) => tracing::warn!(
            project = %name,
            data_dir = %state.projects.data_dir().display(),
            "Default project is not registered; requests without ?project= will return 404"
        ),
        Err(e) => tracing::warn!(error = %e, "Could not read project registry"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
