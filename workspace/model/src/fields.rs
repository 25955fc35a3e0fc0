//! Explicit field-constraint tables for the entities.
//!
//! The request validators consult these constants instead of reflecting over
//! the schema, and the test suites assert against the same table, so the
//! boundary validation and the migration can never silently drift apart.

/// Boundary constraint for a single entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldConstraint {
    pub entity: &'static str,
    pub field: &'static str,
    /// Maximum accepted length in characters, for string fields.
    pub max_length: Option<usize>,
    /// Total digits / decimal places, for fixed-point fields.
    pub precision: Option<(u32, u32)>,
    /// Inclusive lower bound, for integer fields.
    pub min: Option<i64>,
    /// Whether the field must be present on creation.
    pub required: bool,
}

pub mod account {
    pub const USERNAME_MAX_LENGTH: usize = 20;
    pub const FIRST_NAME_MAX_LENGTH: usize = 50;
    pub const LAST_NAME_MAX_LENGTH: usize = 50;
}

pub mod product {
    pub const PRICE_MAX_DIGITS: u32 = 10;
    pub const PRICE_DECIMAL_PLACES: u32 = 2;
    pub const QUANTITY_MIN: i64 = 0;
}

pub mod auth_token {
    pub const KEY_LENGTH: usize = 40;
}

/// The full constraint table, one row per boundary-validated field.
pub const CONSTRAINTS: &[FieldConstraint] = &[
    FieldConstraint {
        entity: "accounts",
        field: "username",
        max_length: Some(account::USERNAME_MAX_LENGTH),
        precision: None,
        min: None,
        required: true,
    },
    FieldConstraint {
        entity: "accounts",
        field: "password",
        max_length: None,
        precision: None,
        min: None,
        required: true,
    },
    FieldConstraint {
        entity: "accounts",
        field: "first_name",
        max_length: Some(account::FIRST_NAME_MAX_LENGTH),
        precision: None,
        min: None,
        required: true,
    },
    FieldConstraint {
        entity: "accounts",
        field: "last_name",
        max_length: Some(account::LAST_NAME_MAX_LENGTH),
        precision: None,
        min: None,
        required: true,
    },
    FieldConstraint {
        entity: "accounts",
        field: "is_seller",
        max_length: None,
        precision: None,
        min: None,
        required: true,
    },
    FieldConstraint {
        entity: "products",
        field: "description",
        max_length: None,
        precision: None,
        min: None,
        required: true,
    },
    FieldConstraint {
        entity: "products",
        field: "price",
        max_length: None,
        precision: Some((product::PRICE_MAX_DIGITS, product::PRICE_DECIMAL_PLACES)),
        min: Some(0),
        required: true,
    },
    FieldConstraint {
        entity: "products",
        field: "quantity",
        max_length: None,
        precision: None,
        min: Some(product::QUANTITY_MIN),
        required: true,
    },
];

/// Look up the constraint row for an entity field, if one exists.
pub fn constraint(entity: &str, field: &str) -> Option<&'static FieldConstraint> {
    CONSTRAINTS
        .iter()
        .find(|c| c.entity == entity && c.field == field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_name_fields_are_bounded() {
        let username = constraint("accounts", "username").unwrap();
        let first_name = constraint("accounts", "first_name").unwrap();
        let last_name = constraint("accounts", "last_name").unwrap();

        assert_eq!(username.max_length, Some(20));
        assert_eq!(first_name.max_length, Some(50));
        assert_eq!(last_name.max_length, Some(50));
        assert!(username.required);
    }

    #[test]
    fn price_has_fixed_precision() {
        let price = constraint("products", "price").unwrap();

        assert_eq!(price.precision, Some((10, 2)));
        assert_eq!(price.min, Some(0));
    }

    #[test]
    fn quantity_is_non_negative() {
        let quantity = constraint("products", "quantity").unwrap();

        assert_eq!(quantity.min, Some(0));
        assert!(quantity.required);
    }

    #[test]
    fn unknown_field_has_no_constraint() {
        assert!(constraint("products", "color").is_none());
    }
}
