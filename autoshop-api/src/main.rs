//! # Autoshop API Server
//!
//! Loads configuration, prepares the database and serves the REST API
//! until Ctrl-C.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p autoshop-api
//! ```

use anyhow::Context;
use autoshop_api::{
    app::{build_router, AppState},
    config::{AdminCredentials, Config},
};
use autoshop_shared::auth::{password::hash_password, role::Role};
use autoshop_shared::db::{
    migrations::{ensure_database_exists, run_migrations},
    pool::{close_pool, create_pool},
};
use autoshop_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing(config.is_production());

    tracing::info!(
        environment = %config.api.environment,
        "Autoshop API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    if !config.is_production() {
        ensure_database_exists(&config.database.url)
            .await
            .context("Failed to create database")?;
    }

    let pool = create_pool(config.database.clone())
        .await
        .context("Failed to connect to database")?;

    run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    if let Some(admin) = &config.bootstrap_admin {
        ensure_admin(&pool, admin).await?;
    }

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config).context("Invalid JWT configuration")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "autoshop_api=debug,autoshop_shared=debug,tower_http=debug".into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Creates the configured administrator unless the username is taken
async fn ensure_admin(pool: &PgPool, admin: &AdminCredentials) -> anyhow::Result<()> {
    if let Some(existing) = User::find_by_username(pool, &admin.username).await? {
        tracing::debug!(user_id = existing.id, "Bootstrap administrator already present");
        return Ok(());
    }

    let hashed_password = hash_password(&admin.password)?;
    let user = User::create(
        pool,
        CreateUser {
            username: admin.username.clone(),
            hashed_password,
            role: Role::Admin,
        },
    )
    .await
    .context("Failed to create bootstrap administrator")?;

    tracing::info!(user_id = user.id, "Bootstrap administrator created");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
