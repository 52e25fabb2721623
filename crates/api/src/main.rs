use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use panelsmith_api::config::ServerConfig;
use panelsmith_api::router::build_app_router;
use panelsmith_api::state::AppState;
use panelsmith_jobs::JobsApi;
use panelsmith_openai::OpenAiApi;
use panelsmith_store::ProjectStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "panelsmith_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    if config.openai.api_key.trim().is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set; panel generation will fail");
    }
    if config.jobs.api_token.trim().is_empty() {
        tracing::warn!("JOBS_API_TOKEN is not set; reference jobs will be rejected upstream");
    }

    // --- Project store ---
    let store = ProjectStore::open(&config.data_dir)
        .await
        .expect("Failed to open project store");

    // --- Upstream clients ---
    let openai = Arc::new(
        OpenAiApi::new(config.openai.clone()).expect("Failed to build image generation client"),
    );
    tracing::info!(model = %openai.model(), "Image generation client ready");

    let jobs = Arc::new(JobsApi::new(config.jobs.clone()).expect("Failed to build job client"));

    // --- App state ---
    let state = AppState::new(config.clone(), store, openai.clone(), openai, jobs);
    let app = build_app_router(state.clone(), &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Stop the reference-job poll so no task outlives the runtime.
    state.jobs.shutdown().await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
