use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use herbdx_core::{
    AuditOptions, AuditWriter, CoreConfig, DiagnosisService, FileDiagnosisLogStore,
    InMemoryCatalog,
    config::{count_from_env_value, duration_ms_from_env_value, path_from_env_value},
    constants::{
        DEFAULT_AUDIT_DIR, DEFAULT_AUDIT_MAX_ATTEMPTS, DEFAULT_AUDIT_QUEUE_CAPACITY,
        DEFAULT_AUDIT_RETRY_BACKOFF_MS, DEFAULT_AUDIT_WRITE_TIMEOUT_MS, DEFAULT_CATALOG_PATH,
        DEFAULT_CATALOG_TIMEOUT_MS,
    },
};

/// Main entry point for the HerbDx application
///
/// Loads the catalog, starts the diagnosis log worker, and serves the REST API until
/// Ctrl-C / SIGTERM. Queued diagnosis logs are flushed before the process exits.
///
/// # Environment Variables
/// - `HERBDX_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `HERBDX_CATALOG_PATH`: catalog YAML file (default: "catalog/seed.yaml")
/// - `HERBDX_AUDIT_DIR`: diagnosis log directory (default: "diagnosis_logs")
/// - `HERBDX_CATALOG_TIMEOUT_MS`: bound on each catalog read (default: 2000)
/// - `HERBDX_AUDIT_QUEUE_CAPACITY`: diagnosis log queue size (default: 1024)
/// - `HERBDX_AUDIT_MAX_ATTEMPTS`: attempts per diagnosis log (default: 3)
/// - `HERBDX_AUDIT_RETRY_BACKOFF_MS`: backoff step between attempts (default: 200)
/// - `HERBDX_AUDIT_WRITE_TIMEOUT_MS`: bound on one diagnosis log write (default: 2000)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - any configuration value is invalid,
/// - the catalog cannot be loaded,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("herbdx=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config_from_env()?;
    let rest_addr = std::env::var("HERBDX_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let catalog = InMemoryCatalog::from_file(cfg.catalog_path())?;
    for warning in catalog.warnings() {
        tracing::warn!("catalog: {}", warning);
    }
    let summary = catalog.summary();
    tracing::info!(
        symptoms = summary.symptoms,
        active_syndromes = summary.active_syndromes,
        herbs = summary.herbs,
        relations = summary.relations,
        "++ Loaded catalog from {}",
        cfg.catalog_path().display()
    );

    let store = Arc::new(FileDiagnosisLogStore::new(cfg.audit_dir()));
    let (audit, audit_worker) = AuditWriter::spawn(store, cfg.audit().clone());
    let diagnosis = DiagnosisService::new(Arc::new(catalog), audit, cfg.catalog_timeout());

    let app = api_rest::router(AppState::new(diagnosis));

    tracing::info!("++ Starting HerbDx REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and every audit writer it held) is gone; wait for queued logs.
    tracing::info!("-- Flushing diagnosis logs");
    audit_worker.join().await;

    Ok(())
}

fn config_from_env() -> anyhow::Result<CoreConfig> {
    let env = |name: &str| std::env::var(name).ok();

    let audit = AuditOptions {
        queue_capacity: count_from_env_value(
            "HERBDX_AUDIT_QUEUE_CAPACITY",
            env("HERBDX_AUDIT_QUEUE_CAPACITY"),
            DEFAULT_AUDIT_QUEUE_CAPACITY,
        )?,
        max_attempts: count_from_env_value(
            "HERBDX_AUDIT_MAX_ATTEMPTS",
            env("HERBDX_AUDIT_MAX_ATTEMPTS"),
            DEFAULT_AUDIT_MAX_ATTEMPTS,
        )?,
        retry_backoff: duration_ms_from_env_value(
            "HERBDX_AUDIT_RETRY_BACKOFF_MS",
            env("HERBDX_AUDIT_RETRY_BACKOFF_MS"),
            DEFAULT_AUDIT_RETRY_BACKOFF_MS,
        )?,
        write_timeout: duration_ms_from_env_value(
            "HERBDX_AUDIT_WRITE_TIMEOUT_MS",
            env("HERBDX_AUDIT_WRITE_TIMEOUT_MS"),
            DEFAULT_AUDIT_WRITE_TIMEOUT_MS,
        )?,
    };

    let cfg = CoreConfig::new(
        path_from_env_value(env("HERBDX_CATALOG_PATH"), DEFAULT_CATALOG_PATH),
        path_from_env_value(env("HERBDX_AUDIT_DIR"), DEFAULT_AUDIT_DIR),
        duration_ms_from_env_value(
            "HERBDX_CATALOG_TIMEOUT_MS",
            env("HERBDX_CATALOG_TIMEOUT_MS"),
            DEFAULT_CATALOG_TIMEOUT_MS,
        )?,
        audit,
    )?;

    Ok(cfg)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("failed to listen for SIGTERM: {}", e);
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

    tracing::info!("-- Shutdown signal received");
}
