use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_user_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{admin, auth, boards, health, payments, pins, posts, users};
use crate::services::payments::{MockPaymentProvider, PaymentProvider, StripeClient};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
    pub payments: Arc<dyn PaymentProvider>,
}

/// Builds the router with the payment provider chosen from configuration.
///
/// Without a Stripe secret key, payments go to the in-process mock provider.
pub fn create_app(config: Config, pool: PgPool) -> Router {
    let provider: Arc<dyn PaymentProvider> = if config.stripe_enabled() {
        match StripeClient::new(&config.payments) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                warn!(error = %e, "Failed to create Stripe client, using mock payment provider");
                Arc::new(MockPaymentProvider::new())
            }
        }
    } else {
        warn!("No Stripe secret key configured, using mock payment provider");
        Arc::new(MockPaymentProvider::new())
    };

    create_app_with_provider(config, pool, provider)
}

pub fn create_app_with_provider(
    config: Config,
    pool: PgPool,
    payments: Arc<dyn PaymentProvider>,
) -> Router {
    let config = Arc::new(config);

    info!(provider = payments.name(), "Payment provider ready");

    let state = AppState {
        pool,
        config: config.clone(),
        rate_limiter: RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new),
        payments,
    };

    let cors = if config.security.cors_origins.is_empty() {
        // Development default
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Routes that need a signed-in user.
    // Middleware order: auth runs first, then rate limiting (which needs the user id)
    let user_routes = Router::new()
        .route("/api/v1/users/me", get(users::get_current_user))
        .route("/api/v1/boards", post(boards::create_board))
        .route("/api/v1/posts", post(posts::create_post))
        .route("/api/v1/pins/create", post(pins::create_pin))
        .route("/api/v1/pins/remove", post(pins::remove_pin))
        .route("/api/v1/pins/purchase", post(payments::purchase_pins))
        .route("/api/v1/pins/purchases", get(pins::list_purchases))
        .route(
            "/api/v1/admin/boards/pending",
            get(boards::list_pending_boards),
        )
        .route(
            "/api/v1/admin/boards/:board_id/approve",
            post(boards::approve_board),
        )
        .route("/api/v1/admin/upkeep", post(admin::run_upkeep))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/boards", get(boards::list_boards))
        .route("/api/v1/boards/:board_id", get(boards::get_board))
        .route("/api/v1/posts", get(posts::list_posts))
        .route("/api/v1/pins/packs", get(pins::list_packs))
        // Authenticated by the webhook signature
        .route("/api/v1/payments/webhook", post(payments::payment_webhook))
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
