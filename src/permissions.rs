//! Authorization predicates.
//!
//! Two independent families, both pure functions of
//! `(principal, method[, target])`:
//!
//! - resource-class predicates, checked before any object is loaded
//!   (creates, lists);
//! - object-level predicates, checked against the loaded instance.
//!
//! Denial is a hard gate: handlers return before touching serialization or
//! storage. An unsafe request without an authenticated principal is denied,
//! never a panic; the boundary maps the deny to 401 or 403
//! (see `ApiError::deny`).

use axum::http::Method;
use model::entities::{account, product};

use crate::auth::Principal;

/// Safe methods are read-only and always allowed, anonymous included.
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Resource-class predicate for products: unsafe methods require an
/// authenticated seller.
pub fn allow_seller_or_read_only(principal: &Principal, method: &Method) -> bool {
    if is_safe_method(method) {
        return true;
    }
    principal.account().is_some_and(|account| account.is_seller)
}

/// Object-level predicate for a product: unsafe methods require the
/// principal to be the owning seller. Ownership is identifier equality only.
pub fn allow_product_owner(
    principal: &Principal,
    method: &Method,
    product: &product::Model,
) -> bool {
    if is_safe_method(method) {
        return true;
    }
    principal.id() == Some(product.seller_id)
}

/// Object-level predicate for account self-management: unsafe methods require
/// the principal to be the account itself.
pub fn allow_account_owner(
    principal: &Principal,
    method: &Method,
    account: &account::Model,
) -> bool {
    if is_safe_method(method) {
        return true;
    }
    principal.id() == Some(account.id)
}

/// Superuser override. Method-agnostic by design: it grants whenever the
/// principal is a superuser, so it must only be wired to endpoints where an
/// unconditional override is intended (account activation management).
pub fn allow_admin(principal: &Principal) -> bool {
    principal
        .account()
        .is_some_and(|account| account.is_superuser)
}
