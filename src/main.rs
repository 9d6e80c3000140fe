// src/main.rs
mod db;
mod error;
mod models;
mod services;
mod state;
mod templates;
mod web;

use crate::services::policy::PolicyConfig;
use crate::state::AppState;
use axum::serve;
use std::{env, net::SocketAddr};
use time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, ExpiredDeletion, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                env::var("RUST_LOG")
                    .unwrap_or_else(|_| {
                        "teknetur=debug,tower_http=info,sqlx=warn,tower_sessions=info".into()
                    })
                    .into()
            }),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("Starting teknetur reservation server...");

    let db_pool = match db::create_db_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to initialize the database: {}", e);
            return Err(anyhow::anyhow!("database setup failed: {}", e));
        }
    };

    // Sessions hold the admin flag and each visitor's booking draft.
    let session_store = SqliteStore::new(db_pool.clone())
        .with_table_name("sessions")
        .map_err(|e| anyhow::anyhow!("failed to create session store: {}", e))?;
    session_store
        .migrate()
        .await
        .map_err(|e| anyhow::anyhow!("failed to migrate session store: {}", e))?;

    let session_store_clone = session_store.clone();
    tokio::spawn(async move {
        if let Err(e) = session_store_clone
            .continuously_delete_expired(tokio::time::Duration::from_secs(60 * 60))
            .await
        {
            tracing::error!("session cleanup task failed: {:?}", e);
        }
    });
    tracing::info!("Session cleanup task started.");

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));

    let policy = PolicyConfig::from_env();
    tracing::info!(
        "Booking policy: near-full cutoff {}, overnight hours [{}, {})",
        policy.near_full_cutoff,
        policy.overnight_from_hour,
        policy.overnight_to_hour
    );

    let app_state = AppState { db_pool, policy };

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Listening on http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind port 3000: {}", e);
            return Err(e.into());
        }
    };

    let app = web::routes::create_router(app_state.clone()).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CookieManagerLayer::new())
            .layer(session_layer),
    );

    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("Fatal server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
