//! HTTP API server with observability for the shop core.
//!
//! Provides REST endpoints for the catalog, user registration, carts and
//! orders, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{
    Argon2Hasher, CartService, Catalog, DomainError, IdentityService, Money, NewItem,
    OrderService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::RecordStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: RecordStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/item", get(routes::items::list::<S>))
        .route("/api/item/{id}", get(routes::items::get::<S>))
        .route("/api/item/name/{name}", get(routes::items::by_name::<S>))
        .route("/api/user/id/{id}", get(routes::users::get_by_id::<S>))
        .route("/api/user/create", post(routes::users::create::<S>))
        .route("/api/user/{username}", get(routes::users::get_by_username::<S>))
        .route("/api/cart/addToCart", post(routes::cart::add::<S>))
        .route("/api/cart/removeFromCart", post(routes::cart::remove::<S>))
        .route("/api/order/submit/{username}", post(routes::orders::submit::<S>))
        .route(
            "/api/order/history/{username}",
            get(routes::orders::history::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over one shared store.
pub fn create_default_state<S: RecordStore + Clone + 'static>(
    store: S,
    config: &Config,
) -> Arc<AppState<S>> {
    Arc::new(AppState {
        catalog: Catalog::new(store.clone()),
        identity: IdentityService::new(store.clone(), Argon2Hasher),
        carts: CartService::new(store.clone()).with_max_attempts(config.cart_write_attempts),
        orders: OrderService::new(store)
            .with_policy(config.submit_policy)
            .with_max_attempts(config.cart_write_attempts),
    })
}

/// Registers the demo catalog. Items already present by name are skipped.
pub async fn seed_catalog<S: RecordStore>(catalog: &Catalog<S>) -> Result<usize, DomainError> {
    let demo = [
        NewItem::new(
            "Round Widget",
            Money::from_cents(299),
            "A widget that is round",
        ),
        NewItem::new(
            "Square Widget",
            Money::from_cents(199),
            "A widget that is square",
        ),
    ];

    let mut registered = 0;
    for item in demo {
        if catalog.find_by_name(&item.name).await?.is_empty() {
            catalog.register(item).await?;
            registered += 1;
        }
    }

    tracing::info!(registered, "Catalog seeded");
    Ok(registered)
}
