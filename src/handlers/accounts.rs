use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::account;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{self, Principal};
use crate::errors::{ApiError, ApiJson};
use crate::permissions;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, Page, PageQuery};

/// Request body for registering a new account
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct RegisterAccountRequest {
    /// Username (must be unique)
    #[validate(length(min = 1, max = 20, message = "username must be 1 to 20 characters"))]
    pub username: String,
    /// Password (write-only, never returned)
    #[validate(length(min = 1, message = "password may not be blank"))]
    pub password: String,
    #[validate(length(max = 50, message = "first_name may not exceed 50 characters"))]
    pub first_name: String,
    #[validate(length(max = 50, message = "last_name may not exceed 50 characters"))]
    pub last_name: String,
    /// Whether this account may own and manage products. Required.
    pub is_seller: bool,
}

/// Request body for updating one's own account
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, max = 20, message = "username must be 1 to 20 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 1, message = "password may not be blank"))]
    pub password: Option<String>,
    #[validate(length(max = 50, message = "first_name may not exceed 50 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 50, message = "last_name may not exceed 50 characters"))]
    pub last_name: Option<String>,
}

/// Request body for the superuser-only activation endpoint
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ManageAccountRequest {
    pub is_active: bool,
}

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Account response model. The credential is write-only and never appears here.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_seller: bool,
    pub date_joined: DateTime<Utc>,
    pub is_active: bool,
    pub is_superuser: bool,
}

impl From<account::Model> for AccountResponse {
    fn from(model: account::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            is_seller: model.is_seller,
            date_joined: model.date_joined,
            is_active: model.is_active,
            is_superuser: model.is_superuser,
        }
    }
}

/// Issued token response
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Register a new account. Open to anyone, anonymous included.
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    tag = "accounts",
    request_body = RegisterAccountRequest,
    responses(
        (status = 201, description = "Account registered successfully", body = ApiResponse<AccountResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn register_account(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterAccountRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountResponse>>), ApiError> {
    debug!("Registering account with username: {}", request.username);
    request.validate()?;

    let new_account = account::ActiveModel {
        username: Set(request.username.clone()),
        password_hash: Set(auth::hash_password(&request.password)),
        first_name: Set(request.first_name.clone()),
        last_name: Set(request.last_name.clone()),
        is_seller: Set(request.is_seller),
        is_active: Set(true),
        is_superuser: Set(false),
        date_joined: Set(Utc::now()),
        ..Default::default()
    };

    match new_account.insert(&state.db).await {
        Ok(account_model) => {
            info!(
                "Account registered with ID: {}, username: {}",
                account_model.id, account_model.username
            );
            let response = ApiResponse {
                data: AccountResponse::from(account_model),
                message: "Account registered successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) if ApiError::is_unique_violation(&db_error) => {
            warn!(
                "Registration rejected, username '{}' already exists",
                request.username
            );
            Err(ApiError::field(
                "username",
                "account with this username already exists",
            ))
        }
        Err(db_error) => Err(db_error.into()),
    }
}

/// Exchange username and password for a bearer token. The same token is
/// returned on every successful login.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "accounts",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<TokenResponse>),
        (status = 400, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let account = account::Entity::find()
        .filter(account::Column::Username.eq(&request.username))
        .one(&state.db)
        .await?;

    let account = match account {
        Some(account)
            if account.is_active
                && auth::verify_password(&request.password, &account.password_hash) =>
        {
            account
        }
        _ => {
            warn!("Failed login attempt for username: {}", request.username);
            return Err(ApiError::field(
                "non_field_errors",
                "unable to log in with provided credentials",
            ));
        }
    };

    let token = auth::issue_token(&state.db, account.id).await?;
    info!("Issued token for account ID: {}", account.id);

    let response = ApiResponse {
        data: TokenResponse { token: token.key },
        message: "Login successful".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// List all accounts, oldest first. Open to anyone.
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    tag = "accounts",
    params(PageQuery),
    responses(
        (status = 200, description = "Accounts retrieved successfully", body = ApiResponse<Page<AccountResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ApiResponse<Page<AccountResponse>>>, ApiError> {
    let count = account::Entity::find().count(&state.db).await?;
    let accounts = account::Entity::find()
        .order_by_asc(account::Column::Id)
        .offset(page.offset())
        .limit(page.limit())
        .all(&state.db)
        .await?;

    debug!("Retrieved {} of {} accounts", accounts.len(), count);
    let response = ApiResponse {
        data: Page {
            count,
            results: accounts.into_iter().map(AccountResponse::from).collect(),
        },
        message: "Accounts retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// List the newest `num` accounts, most recently joined first.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/newest/{num}",
    tag = "accounts",
    params(
        ("num" = u64, Path, description = "Maximum number of accounts to return"),
    ),
    responses(
        (status = 200, description = "Accounts retrieved successfully", body = ApiResponse<Page<AccountResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn newest_accounts(
    Path(num): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Page<AccountResponse>>>, ApiError> {
    let accounts = account::Entity::find()
        .order_by_desc(account::Column::DateJoined)
        .order_by_desc(account::Column::Id)
        .limit(num)
        .all(&state.db)
        .await?;

    let response = ApiResponse {
        data: Page {
            count: accounts.len() as u64,
            results: accounts.into_iter().map(AccountResponse::from).collect(),
        },
        message: "Accounts retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update one's own account. Owner-only; the predicate denies everyone else.
#[utoipa::path(
    patch,
    path = "/api/v1/accounts/{account_id}",
    tag = "accounts",
    params(
        ("account_id" = i32, Path, description = "Account ID"),
    ),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated successfully", body = ApiResponse<AccountResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the account owner", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, body))]
pub async fn update_account(
    Path(account_id): Path<i32>,
    method: Method,
    State(state): State<AppState>,
    principal: Principal,
    body: Result<ApiJson<UpdateAccountRequest>, ApiError>,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    let existing = account::Entity::find_by_id(account_id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !permissions::allow_account_owner(&principal, &method, &existing) {
        warn!(
            "Denied account update on ID {} for principal {:?}",
            account_id,
            principal.id()
        );
        return Err(ApiError::deny(&principal));
    }

    // The body is only unwrapped once the owner predicate has passed.
    let ApiJson(request) = body?;
    request.validate()?;

    let mut account_active: account::ActiveModel = existing.clone().into();
    let mut updated_fields = Vec::new();

    if let Some(username) = request.username {
        account_active.username = Set(username);
        updated_fields.push("username");
    }
    if let Some(password) = request.password {
        account_active.password_hash = Set(auth::hash_password(&password));
        updated_fields.push("password");
    }
    if let Some(first_name) = request.first_name {
        account_active.first_name = Set(first_name);
        updated_fields.push("first_name");
    }
    if let Some(last_name) = request.last_name {
        account_active.last_name = Set(last_name);
        updated_fields.push("last_name");
    }

    if updated_fields.is_empty() {
        debug!("No fields to update for account ID: {}", account_id);
        let response = ApiResponse {
            data: AccountResponse::from(existing),
            message: "Account updated successfully".to_string(),
            success: true,
        };
        return Ok(Json(response));
    }

    match account_active.update(&state.db).await {
        Ok(updated) => {
            info!(
                "Account ID {} updated. Fields: {}",
                account_id,
                updated_fields.join(", ")
            );
            let response = ApiResponse {
                data: AccountResponse::from(updated),
                message: "Account updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) if ApiError::is_unique_violation(&db_error) => Err(ApiError::field(
            "username",
            "account with this username already exists",
        )),
        Err(db_error) => Err(db_error.into()),
    }
}

/// Activate or deactivate an account. Superuser-only: this is the one
/// endpoint wired to the method-agnostic admin override.
#[utoipa::path(
    patch,
    path = "/api/v1/accounts/{account_id}/management",
    tag = "accounts",
    params(
        ("account_id" = i32, Path, description = "Account ID"),
    ),
    request_body = ManageAccountRequest,
    responses(
        (status = 200, description = "Account activation state updated", body = ApiResponse<AccountResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not a superuser", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, body))]
pub async fn manage_account(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
    principal: Principal,
    body: Result<ApiJson<ManageAccountRequest>, ApiError>,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    if !permissions::allow_admin(&principal) {
        warn!(
            "Denied account management on ID {} for principal {:?}",
            account_id,
            principal.id()
        );
        return Err(ApiError::deny(&principal));
    }

    let ApiJson(request) = body?;

    let existing = account::Entity::find_by_id(account_id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut account_active: account::ActiveModel = existing.into();
    account_active.is_active = Set(request.is_active);
    let updated = account_active.update(&state.db).await?;

    info!(
        "Account ID {} is_active set to {}",
        account_id, updated.is_active
    );
    let response = ApiResponse {
        data: AccountResponse::from(updated),
        message: "Account updated successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}
