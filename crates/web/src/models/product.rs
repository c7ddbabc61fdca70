//! Product domain types.

use chrono::{DateTime, Utc};

use catalog_core::{Price, ProductId, UserId};

/// A catalog item (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Free-form description; empty when none was given.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// The user allowed to edit and delete this product.
    pub owner_id: UserId,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether `user` may mutate or delete this product.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }
}

/// Fields for creating a product. The owner is passed separately.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
}

/// Fields for updating a product in place.
///
/// `name` and `price` are always overwritten; `description` only when
/// present.
#[derive(Debug, Clone)]
pub struct ProductChanges {
    pub name: String,
    pub price: Price,
    pub description: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_owned_by_compares_owner_id() {
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(1),
            name: "Widget".to_string(),
            description: String::new(),
            price: Price::from_units(10).unwrap(),
            owner_id: UserId::new(5),
            created_at: now,
            updated_at: now,
        };

        assert!(product.is_owned_by(UserId::new(5)));
        assert!(!product.is_owned_by(UserId::new(6)));
    }
}
