//! Token authentication: credential hashing, token issuance, and the
//! request extractor that resolves a bearer credential to a principal.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use model::entities::{account, auth_token};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::schemas::AppState;

/// The actor behind a request. Resolving a missing, malformed, or unknown
/// credential yields `Anonymous`; it never fails the request by itself.
#[derive(Clone, Debug)]
pub enum Principal {
    Anonymous,
    Authenticated(account::Model),
}

impl Principal {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Authenticated(_))
    }

    pub fn account(&self) -> Option<&account::Model> {
        match self {
            Principal::Anonymous => None,
            Principal::Authenticated(account) => Some(account),
        }
    }

    pub fn id(&self) -> Option<i32> {
        self.account().map(|account| account.id)
    }

    async fn resolve(header: Option<&str>, db: &DatabaseConnection) -> Principal {
        let Some(raw) = header else {
            return Principal::Anonymous;
        };
        // "Token <key>" is the canonical scheme; "Bearer" is accepted too.
        let Some(key) = raw
            .strip_prefix("Token ")
            .or_else(|| raw.strip_prefix("Bearer "))
        else {
            return Principal::Anonymous;
        };

        let token = match auth_token::Entity::find_by_id(key.trim().to_string())
            .one(db)
            .await
        {
            Ok(Some(token)) => token,
            Ok(None) => return Principal::Anonymous,
            Err(db_error) => {
                warn!("Token lookup failed: {}", db_error);
                return Principal::Anonymous;
            }
        };

        match account::Entity::find_by_id(token.account_id).one(db).await {
            // Deactivated accounts no longer authenticate.
            Ok(Some(account)) if account.is_active => Principal::Authenticated(account),
            Ok(_) => Principal::Anonymous,
            Err(db_error) => {
                warn!("Account lookup failed: {}", db_error);
                Principal::Anonymous
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        Ok(Principal::resolve(header, &state.db).await)
    }
}

/// Hash a password with a fresh random salt. Stored as `<salt>$<digest>`,
/// both hex-encoded.
pub fn hash_password(password: &str) -> String {
    let salt: [u8; 16] = rand::random();
    let salt = hex::encode(salt);
    let digest = salted_digest(&salt, password);
    format!("{salt}${digest}")
}

/// Check a password against a stored `<salt>$<digest>` value.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    salted_digest(salt, password) == digest
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"$");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a random token key (40 hex characters).
pub fn generate_token_key() -> String {
    let bytes: [u8; 20] = rand::random();
    hex::encode(bytes)
}

/// Return the account's token, issuing a fresh one on first login.
pub async fn issue_token(
    db: &DatabaseConnection,
    account_id: i32,
) -> Result<auth_token::Model, DbErr> {
    if let Some(token) = auth_token::Entity::find()
        .filter(auth_token::Column::AccountId.eq(account_id))
        .one(db)
        .await?
    {
        return Ok(token);
    }

    auth_token::ActiveModel {
        key: Set(generate_token_key()),
        account_id: Set(account_id),
        created: Set(Utc::now()),
    }
    .insert(db)
    .await
}
