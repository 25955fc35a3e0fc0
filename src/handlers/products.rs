use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::Json,
};
use model::entities::{account, product};
use model::fields;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::auth::Principal;
use crate::errors::{validation_error, ApiError, ApiJson};
use crate::handlers::accounts::AccountResponse;
use crate::permissions;
use crate::projections::{ProductProjection, LIST_CREATE_PRODUCTS, PRODUCT_DETAIL};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, Page, PageQuery};

/// Request body for creating a product. The owning seller is taken from the
/// authenticated principal; a `seller` key in the body is ignored.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "description may not be blank"))]
    pub description: String,
    #[validate(custom(function = validate_price))]
    pub price: Decimal,
    #[validate(range(min = 0, message = "quantity must be greater than or equal to 0"))]
    pub quantity: i32,
    pub is_active: Option<bool>,
}

/// Request body for updating a product
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "description may not be blank"))]
    pub description: Option<String>,
    #[validate(custom(function = validate_price))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "quantity must be greater than or equal to 0"))]
    pub quantity: Option<i32>,
    pub is_active: Option<bool>,
}

/// Price must be non-negative and fit the fixed precision from the
/// constraint table: 10 total digits, 2 after the decimal point.
fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    let max_digits = fields::product::PRICE_MAX_DIGITS;
    let decimal_places = fields::product::PRICE_DECIMAL_PLACES;

    if price.is_sign_negative() {
        return Err(validation_error(
            "min",
            "price must be greater than or equal to 0",
        ));
    }
    if price.normalize().scale() > decimal_places {
        return Err(validation_error(
            "decimal_places",
            format!("price supports at most {decimal_places} decimal places"),
        ));
    }
    let integral_limit = Decimal::from(10_i64.pow(max_digits - decimal_places));
    if *price >= integral_limit {
        return Err(validation_error(
            "max_digits",
            format!("price supports at most {max_digits} digits in total"),
        ));
    }
    Ok(())
}

/// Listing projection: flat fields, seller as a bare identifier.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductGeneralResponse {
    pub id: i32,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub is_active: bool,
    pub seller: i32,
}

/// Write projection: all fields with a nested owner summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetailedResponse {
    pub id: i32,
    pub seller: Option<AccountResponse>,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub is_active: bool,
}

/// Detail-read projection: no identifier, nested owner summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductFilteredResponse {
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub is_active: bool,
    pub seller: Option<AccountResponse>,
}

/// A product rendered through one of the three projections.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ProductBody {
    General(ProductGeneralResponse),
    Detailed(ProductDetailedResponse),
    Filtered(ProductFilteredResponse),
}

impl ProductBody {
    /// Render a product through the given projection. The owner summary is
    /// only consulted by the Detailed and Filtered shapes.
    pub fn render(
        projection: ProductProjection,
        product: &product::Model,
        seller: Option<&account::Model>,
    ) -> Self {
        match projection {
            ProductProjection::General => ProductBody::General(ProductGeneralResponse {
                id: product.id,
                description: product.description.clone(),
                price: product.price,
                quantity: product.quantity,
                is_active: product.is_active,
                seller: product.seller_id,
            }),
            ProductProjection::Detailed => ProductBody::Detailed(ProductDetailedResponse {
                id: product.id,
                seller: seller.map(|s| AccountResponse::from(s.clone())),
                description: product.description.clone(),
                price: product.price,
                quantity: product.quantity,
                is_active: product.is_active,
            }),
            ProductProjection::Filtered => ProductBody::Filtered(ProductFilteredResponse {
                description: product.description.clone(),
                price: product.price,
                quantity: product.quantity,
                is_active: product.is_active,
                seller: seller.map(|s| AccountResponse::from(s.clone())),
            }),
        }
    }
}

/// List all products. Open to anyone.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "products",
    params(PageQuery),
    responses(
        (status = 200, description = "Products retrieved successfully", body = ApiResponse<Page<ProductGeneralResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_products(
    method: Method,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ApiResponse<Page<ProductBody>>>, ApiError> {
    let projection = LIST_CREATE_PRODUCTS.resolve(&method);

    let count = product::Entity::find().count(&state.db).await?;
    let rows = product::Entity::find()
        .find_also_related(account::Entity)
        .order_by_asc(product::Column::Id)
        .offset(page.offset())
        .limit(page.limit())
        .all(&state.db)
        .await?;

    debug!("Retrieved {} of {} products", rows.len(), count);
    let results = rows
        .iter()
        .map(|(product, seller)| ProductBody::render(projection, product, seller.as_ref()))
        .collect();

    let response = ApiResponse {
        data: Page { count, results },
        message: "Products retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Create a product. Sellers only; the creator becomes the owning seller.
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created successfully", body = ApiResponse<ProductDetailedResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not a seller", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, body))]
pub async fn create_product(
    method: Method,
    State(state): State<AppState>,
    principal: Principal,
    body: Result<ApiJson<CreateProductRequest>, ApiError>,
) -> Result<(StatusCode, Json<ApiResponse<ProductBody>>), ApiError> {
    if !permissions::allow_seller_or_read_only(&principal, &method) {
        warn!(
            "Denied product creation for principal {:?}",
            principal.id()
        );
        return Err(ApiError::deny(&principal));
    }

    // Denial comes first: the body is only unwrapped for permitted sellers.
    let ApiJson(request) = body?;
    let projection = LIST_CREATE_PRODUCTS.resolve(&method);
    request.validate()?;

    // The predicate guarantees an authenticated seller here.
    let Some(seller) = principal.account() else {
        return Err(ApiError::deny(&principal));
    };

    let new_product = product::ActiveModel {
        description: Set(request.description.clone()),
        price: Set(request.price),
        quantity: Set(request.quantity),
        is_active: Set(request.is_active.unwrap_or(true)),
        seller_id: Set(seller.id),
        ..Default::default()
    };

    let created = new_product.insert(&state.db).await?;
    info!(
        "Product created with ID: {} for seller ID: {}",
        created.id, seller.id
    );

    let response = ApiResponse {
        data: ProductBody::render(projection, &created, Some(seller)),
        message: "Product created successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Retrieve a product by ID. Open to anyone.
#[utoipa::path(
    get,
    path = "/api/v1/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Product retrieved successfully", body = ApiResponse<ProductFilteredResponse>),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn retrieve_product(
    Path(product_id): Path<i32>,
    method: Method,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProductBody>>, ApiError> {
    let projection = PRODUCT_DETAIL.resolve(&method);

    let (product, seller) = product::Entity::find_by_id(product_id)
        .find_also_related(account::Entity)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let response = ApiResponse {
        data: ProductBody::render(projection, &product, seller.as_ref()),
        message: "Product retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update a product. Only its owning seller may do so.
#[utoipa::path(
    patch,
    path = "/api/v1/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated successfully", body = ApiResponse<ProductDetailedResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the owning seller", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, body))]
pub async fn update_product(
    Path(product_id): Path<i32>,
    method: Method,
    State(state): State<AppState>,
    principal: Principal,
    body: Result<ApiJson<UpdateProductRequest>, ApiError>,
) -> Result<Json<ApiResponse<ProductBody>>, ApiError> {
    let existing = product::Entity::find_by_id(product_id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !permissions::allow_product_owner(&principal, &method, &existing) {
        warn!(
            "Denied product update on ID {} for principal {:?}",
            product_id,
            principal.id()
        );
        return Err(ApiError::deny(&principal));
    }

    let ApiJson(request) = body?;
    let projection = PRODUCT_DETAIL.resolve(&method);
    request.validate()?;

    let mut product_active: product::ActiveModel = existing.clone().into();
    let mut updated_fields = Vec::new();

    if let Some(description) = request.description {
        product_active.description = Set(description);
        updated_fields.push("description");
    }
    if let Some(price) = request.price {
        product_active.price = Set(price);
        updated_fields.push("price");
    }
    if let Some(quantity) = request.quantity {
        product_active.quantity = Set(quantity);
        updated_fields.push("quantity");
    }
    if let Some(is_active) = request.is_active {
        product_active.is_active = Set(is_active);
        updated_fields.push("is_active");
    }

    let updated = if updated_fields.is_empty() {
        debug!("No fields to update for product ID: {}", product_id);
        existing
    } else {
        let updated = product_active.update(&state.db).await?;
        info!(
            "Product ID {} updated. Fields: {}",
            product_id,
            updated_fields.join(", ")
        );
        updated
    };

    // The owner predicate makes the principal the owning seller.
    let response = ApiResponse {
        data: ProductBody::render(projection, &updated, principal.account()),
        message: "Product updated successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}
