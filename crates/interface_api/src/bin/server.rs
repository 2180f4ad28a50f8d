//! Claims Compliance Core - API Server Binary
//!
//! This binary starts the HTTP API server for the claim pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claims-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_AUDIT_KEY=... API_WEBHOOK_BASE_URL=https://n8n.example.com/webhook cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_LOG_FORMAT` - `text` or `json` (default: text)
//! * `API_AUDIT_LOG_PATH` - Audit log file (default: audit.log)
//! * `API_AUDIT_KEY` - Base64 256-bit audit encryption key
//! * `API_AUDIT_TIMEOUT_MS` - Bound on one audit append (default: 5000)
//! * `API_AUDIT_POLICY` - `best_effort` or `required` (default: best_effort)
//! * `API_WEBHOOK_BASE_URL` - Workflow engine webhook base URL
//! * `API_WEBHOOK_TOKEN` - Optional bearer token for the webhooks
//! * `API_DISPATCH_TIMEOUT_MS` - Bound on one dispatch (default: 30000)

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use claims_pipeline::ClaimPipeline;
use domain_access::AccessControl;
use infra_audit::{AuditKey, AuditRecorder, FileAuditSink, XChaChaAuditCipher};
use infra_workflow::{WebhookDispatcher, WorkflowCatalog};
use interface_api::{
    config::{ApiConfig, LogFormat},
    create_router,
};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, wires the claim pipeline and
/// starts the HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The audit key is malformed
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;

    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        audit_policy = ?config.audit_policy,
        "Starting Claims Compliance Core API Server"
    );

    let pipeline = build_pipeline(&config)?;
    let app = create_router(Arc::new(pipeline), config.clone());

    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

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

/// Wires the audit trail, webhook dispatcher and access control into a
/// claim pipeline.
fn build_pipeline(config: &ApiConfig) -> Result<ClaimPipeline, Box<dyn std::error::Error>> {
    let key = match &config.audit_key {
        Some(encoded) => AuditKey::from_base64(encoded)?,
        None => {
            tracing::warn!(
                "API_AUDIT_KEY not set; using a process-local key, audit entries will be unreadable after restart"
            );
            AuditKey::generate()
        }
    };

    let sink = Arc::new(FileAuditSink::new(&config.audit_log_path));
    let recorder = AuditRecorder::new(Arc::new(XChaChaAuditCipher::new(&key)), sink)
        .with_timeout(config.audit_timeout());

    let dispatcher = WebhookDispatcher::new(config.webhook_system_config(), WorkflowCatalog::standard())?;

    tracing::info!(
        audit_log = %config.audit_log_path,
        webhook_base_url = %config.webhook_base_url,
        "Claim pipeline configured"
    );

    Ok(ClaimPipeline::new(AccessControl::default(), Arc::new(dispatcher), recorder)
        .with_config(config.pipeline_config()))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
