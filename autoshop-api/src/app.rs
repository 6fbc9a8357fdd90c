/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use autoshop_api::{app::AppState, config::Config};
/// use autoshop_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.database.clone()).await?;
/// let state = AppState::new(pool, config)?;
/// let app = autoshop_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use autoshop_shared::auth::jwt::{TokenCodec, TokenError};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Token codec built once from `config.jwt`
    pub tokens: Arc<TokenCodec>,
}

impl AppState {
    /// Creates application state, building the token codec from the config
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Config` if the JWT settings are unusable.
    pub fn new(db: PgPool, config: Config) -> Result<Self, TokenError> {
        let tokens = config.token_codec()?;

        Ok(Self {
            db,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /api
/// ├── GET  /healthcheck/                      # public
/// └── /v1
///     ├── /auth
///     │   ├── POST /signin/                   # public, form
///     │   └── POST /signup/                   # public, form
///     ├── /users
///     │   ├── GET  /                          # admin
///     │   ├── GET  /customers/                # admin
///     │   ├── POST /customer/                 # admin, form
///     │   ├── PUT  /customer/:customer_id/    # owner or admin
///     │   └── POST /employee/                 # admin, form
///     ├── /vehicles
///     │   ├── GET  /                          # public
///     │   ├── POST /                          # admin
///     │   ├── GET  /:vehicle_id/              # public
///     │   ├── POST /customer/                 # owner or admin
///     │   └── POST /customer/:vehicle_id/     # owner or admin
///     ├── /services
///     │   ├── GET  /                          # public
///     │   ├── POST /                          # admin
///     │   └── GET|PUT|DELETE /:service_id/    # GET public, others admin
///     └── /orders
///         ├── GET  /                          # admin
///         ├── POST /                          # admin
///         └── GET|PUT|DELETE /:order_id/      # GET owner or admin, others admin
/// ```
///
/// Authorization is enforced per handler through the extractors in
/// [`crate::extractors`], so public and gated routes share one router.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth_routes = Router::new()
        .route("/api/v1/auth/signin/", post(routes::auth::signin))
        .route("/api/v1/auth/signup/", post(routes::auth::signup));

    let user_routes = Router::new()
        .route("/api/v1/users/", get(routes::users::list_users))
        .route("/api/v1/users/customers/", get(routes::users::list_customers))
        .route("/api/v1/users/customer/", post(routes::users::create_customer))
        .route(
            "/api/v1/users/customer/:customer_id/",
            put(routes::users::update_customer),
        )
        .route("/api/v1/users/employee/", post(routes::users::create_employee));

    let vehicle_routes = Router::new()
        .route(
            "/api/v1/vehicles/",
            get(routes::vehicles::list_vehicles).post(routes::vehicles::create_vehicle),
        )
        .route("/api/v1/vehicles/:vehicle_id/", get(routes::vehicles::get_vehicle))
        .route(
            "/api/v1/vehicles/customer/",
            post(routes::vehicles::create_vehicle_and_customer_vehicle),
        )
        .route(
            "/api/v1/vehicles/customer/:vehicle_id/",
            post(routes::vehicles::create_customer_vehicle),
        );

    let service_routes = Router::new()
        .route(
            "/api/v1/services/",
            get(routes::services::list_services).post(routes::services::create_service),
        )
        .route(
            "/api/v1/services/:service_id/",
            get(routes::services::get_service)
                .put(routes::services::update_service)
                .delete(routes::services::delete_service),
        );

    let order_routes = Router::new()
        .route(
            "/api/v1/orders/",
            get(routes::orders::list_orders).post(routes::orders::create_order),
        )
        .route(
            "/api/v1/orders/:order_id/",
            get(routes::orders::get_order)
                .put(routes::orders::update_order)
                .delete(routes::orders::delete_order),
        );

    let cors = cors_layer(&state.config.api.cors_origins);

    Router::new()
        .route("/api/healthcheck/", get(routes::health::health_check))
        .merge(auth_routes)
        .merge(user_routes)
        .merge(vehicle_routes)
        .merge(service_routes)
        .merge(order_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_layer(cors_origins: &[String]) -> CorsLayer {
    if cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
