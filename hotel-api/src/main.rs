use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use hotel_api::{app, worker, AppState};
use hotel_core::{EventBus, Hotel, Repositories, SystemClock};
use hotel_store::{Config, DbClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "hotel_api=debug,hotel_core=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Hotel API on port {}", config.server.port);

    let repos = match config.database.url.as_deref() {
        Some(url) => {
            let db = DbClient::new(url, &config.database)
                .await
                .context("Failed to connect to Postgres")?;
            if config.database.run_migrations {
                db.migrate().await.context("Failed to run migrations")?;
            }
            db.repositories()
        }
        None => {
            tracing::warn!("No database.url configured, using the in-memory store; data is lost on restart");
            Repositories::in_memory()
        }
    };

    let events = EventBus::new(config.events.channel_capacity);
    let hotel = Hotel::new(repos, Arc::new(SystemClock), events);
    worker::spawn_event_logger(&hotel.events);

    let app = app(AppState::new(hotel));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
