//! Static method-to-projection maps for the product endpoints.
//!
//! Each endpoint declares which field projection of a product is used for
//! which HTTP method. The router asserts at wiring time that every method it
//! accepts has an entry, so a missing mapping is a startup failure rather
//! than a per-request one.

use axum::http::Method;

/// A named field projection of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductProjection {
    /// Flat listing shape: all fields, seller as a bare identifier.
    General,
    /// Write shape: all fields, seller as a nested owner summary.
    Detailed,
    /// Detail-read shape: no identifier, seller as a nested owner summary.
    Filtered,
}

/// Method-keyed projection table for one endpoint.
pub struct ProjectionMap {
    entries: &'static [(Method, ProductProjection)],
}

impl ProjectionMap {
    pub const fn new(entries: &'static [(Method, ProductProjection)]) -> Self {
        Self { entries }
    }

    /// Resolve the projection for a method. Panics when the method has no
    /// entry: the router's `assert_covers` call makes that unreachable for
    /// any method it actually wires.
    pub fn resolve(&self, method: &Method) -> ProductProjection {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, projection)| *projection)
            .unwrap_or_else(|| panic!("no projection wired for method {method}"))
    }

    /// Wiring-time check that every accepted method has a projection entry.
    pub fn assert_covers(&self, methods: &[Method]) {
        for method in methods {
            assert!(
                self.entries.iter().any(|(m, _)| m == method),
                "no projection wired for method {method}"
            );
        }
    }
}

/// `/products`: list reads the general shape, create writes the detailed one.
pub static LIST_CREATE_PRODUCTS: ProjectionMap = ProjectionMap::new(&[
    (Method::GET, ProductProjection::General),
    (Method::POST, ProductProjection::Detailed),
]);

/// `/products/:id`: retrieve reads the filtered shape, update writes the
/// detailed one.
pub static PRODUCT_DETAIL: ProjectionMap = ProjectionMap::new(&[
    (Method::GET, ProductProjection::Filtered),
    (Method::PATCH, ProductProjection::Detailed),
]);
