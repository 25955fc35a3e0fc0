use std::collections::BTreeMap;

use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::handlers::accounts::{
    AccountResponse, LoginRequest, ManageAccountRequest, RegisterAccountRequest, TokenResponse,
    UpdateAccountRequest,
};
use crate::handlers::products::{
    CreateProductRequest, ProductDetailedResponse, ProductFilteredResponse,
    ProductGeneralResponse, UpdateProductRequest,
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
}

/// API response wrapper
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
    /// Field-level validation messages, present for validation errors only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

/// One page of results
#[derive(Serialize, ToSchema)]
pub struct Page<T> {
    /// Number of results in this page
    pub count: u64,
    /// The results themselves
    pub results: Vec<T>,
}

/// Pagination query parameters. A fresh query is built from these for every
/// request; no query state is shared between requests.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Maximum number of results to return (default 100)
    pub limit: Option<u64>,
    /// Number of results to skip (default 0)
    pub offset: Option<u64>,
}

impl PageQuery {
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(100)
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::accounts::register_account,
        crate::handlers::accounts::login,
        crate::handlers::accounts::list_accounts,
        crate::handlers::accounts::newest_accounts,
        crate::handlers::accounts::update_account,
        crate::handlers::accounts::manage_account,
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::retrieve_product,
        crate::handlers::products::update_product,
    ),
    components(
        schemas(
            ApiResponse<AccountResponse>,
            ApiResponse<TokenResponse>,
            ApiResponse<Page<AccountResponse>>,
            ApiResponse<Page<ProductGeneralResponse>>,
            ApiResponse<ProductDetailedResponse>,
            ApiResponse<ProductFilteredResponse>,
            ErrorResponse,
            HealthResponse,
            RegisterAccountRequest,
            UpdateAccountRequest,
            ManageAccountRequest,
            LoginRequest,
            AccountResponse,
            TokenResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ProductGeneralResponse,
            ProductDetailedResponse,
            ProductFilteredResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "accounts", description = "Account registration, login and management"),
        (name = "products", description = "Product catalog endpoints"),
    ),
    info(
        title = "Storefront API",
        description = "E-commerce backend: seller accounts and the products they sell",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
