use std::sync::Arc;

use anyhow::{Context, Result};
use perceptores::{
    app::build_router,
    application::{
        CATALOG_ACTIVITY, CATALOG_LINE, CATALOG_PRIORITY, CATALOG_SITUATION, CATALOG_SPECIALTY,
        perceptor_service::PerceptorService,
    },
    config::AppConfig,
    domain::perceptor::CodeLabel,
    infrastructure::in_memory::{
        InMemoryCatalog, InMemoryManagerDirectory, InMemoryPerceptorRepository,
    },
    state::AppState,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("failed to load configuration")?;

    let service = Arc::new(PerceptorService::new(
        Arc::new(InMemoryPerceptorRepository::new()),
        Arc::new(seeded_catalog()),
        Arc::new(InMemoryManagerDirectory::new()),
    ));
    let state = AppState::new(service);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(bind_addr = %config.bind_addr, "perceptor API started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn seeded_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_catalog(
            CATALOG_PRIORITY,
            vec![
                CodeLabel::new("1", "Critical"),
                CodeLabel::new("2", "High"),
                CodeLabel::new("3", "Normal"),
            ],
        )
        .with_catalog(
            CATALOG_SITUATION,
            vec![
                CodeLabel::new("active", "Active"),
                CodeLabel::new("inactive", "Inactive"),
                CodeLabel::new("seized", "Seized"),
            ],
        )
        .with_catalog(
            CATALOG_SPECIALTY,
            vec![
                CodeLabel::new("CARD", "Cardiology"),
                CodeLabel::new("ONCO", "Oncology"),
                CodeLabel::new("TRAU", "Traumatology"),
                CodeLabel::new("PEDI", "Pediatrics"),
            ],
        )
        .with_catalog(
            CATALOG_ACTIVITY,
            vec![
                CodeLabel::new("GEN", "General care"),
                CodeLabel::new("AMB", "Ambulatory"),
                CodeLabel::new("ICU", "Intensive care"),
            ],
        )
        .with_catalog(
            CATALOG_LINE,
            vec![
                CodeLabel::new("HLT", "Health"),
                CodeLabel::new("ACC", "Accidents"),
            ],
        )
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("perceptores=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install ctrl+c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install sigterm handler");
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
}
