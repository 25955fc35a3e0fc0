use axum::{
    http::Method,
    routing::{get, patch, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{
    accounts::{
        list_accounts, login, manage_account, newest_accounts, register_account, update_account,
    },
    health::health_check,
    products::{create_product, list_products, retrieve_product, update_product},
};
use crate::projections;
use crate::schemas::{ApiDoc, AppState};

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Every method wired below must have a projection entry; a missing one is
    // a configuration error and fails here, at startup.
    projections::LIST_CREATE_PRODUCTS.assert_covers(&[Method::GET, Method::POST]);
    projections::PRODUCT_DETAIL.assert_covers(&[Method::GET, Method::PATCH]);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Account routes
        .route(
            "/api/v1/accounts",
            get(list_accounts).post(register_account),
        )
        .route("/api/v1/accounts/newest/:num", get(newest_accounts))
        .route("/api/v1/accounts/:account_id", patch(update_account))
        .route(
            "/api/v1/accounts/:account_id/management",
            patch(manage_account),
        )
        .route("/api/v1/login", post(login))
        // Product routes
        .route("/api/v1/products", get(list_products).post(create_product))
        .route(
            "/api/v1/products/:product_id",
            get(retrieve_product).patch(update_product),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
