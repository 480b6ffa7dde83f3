//! Agenda Server - appointment scheduling
//!
//! REST API server for service businesses and their clients.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt};

use agenda_server::{
    api,
    config::{AppConfig, LoggingConfig},
    models::parse_time,
    repository::Repository,
    services::Services,
    AppState,
};

/// Initialize tracing. The returned guard must live as long as the process
/// when logging to a file.
fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("agenda_server={},tower_http=debug", config.level).into());

    let (writer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "agenda-server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .init();
    }

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config.logging);

    tracing::info!("Starting Agenda Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let repository = Repository::new(pool.clone());
    let services = Services::new(&repository, &config);

    // Daily scans
    let mut jobs = Vec::new();
    if config.scheduler.enabled {
        let reminder_at = parse_time(&config.scheduler.reminder_time)
            .with_context(|| {
                format!(
                    "Invalid scheduler.reminder_time '{}'",
                    config.scheduler.reminder_time
                )
            })?;
        let expiry_at = parse_time(&config.scheduler.expiry_time)
            .with_context(|| {
                format!(
                    "Invalid scheduler.expiry_time '{}'",
                    config.scheduler.expiry_time
                )
            })?;

        jobs.push(services.reminder_job(reminder_at).spawn());
        jobs.push(services.expiry_job(expiry_at).spawn());
    } else {
        tracing::info!("Scheduler disabled");
    }

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        pool: Some(pool),
    };
    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    for job in jobs {
        job.abort();
    }

    Ok(())
}
