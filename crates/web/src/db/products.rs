//! Product repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use catalog_core::{Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{NewProduct, Product, ProductChanges};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Price,
    user_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            owner_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, user_id, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ProductRepository<'c> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Insert a product owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &mut self,
        owner: UserId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO products (name, description, price, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(owner)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(row.into())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List the products owned by `owner`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(&mut self, owner: UserId) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE user_id = $1 ORDER BY id"
        ))
        .bind(owner)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Overwrite a product's fields in place. The id and owner never change.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &mut self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE products
            SET name = $2,
                price = $3,
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(changes.price)
        .bind(changes.description.as_deref())
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&mut self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sqlx::PgPool;

    use catalog_core::Username;

    use super::*;
    use crate::db::UserRepository;

    async fn seed_user(conn: &mut PgConnection, name: &str) -> UserId {
        UserRepository::new(conn)
            .create(&Username::parse(name).unwrap(), "hash")
            .await
            .unwrap()
            .id
    }

    fn widget(price: i64) -> NewProduct {
        NewProduct {
            name: "Widget".to_string(),
            description: "A widget".to_string(),
            price: Price::from_units(price).unwrap(),
        }
    }

    #[sqlx::test]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_create_then_list_by_owner(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let alice = seed_user(&mut conn, "alice").await;
        let bob = seed_user(&mut conn, "bob").await;
        let mut products = ProductRepository::new(&mut conn);

        let created = products.create(alice, &widget(10)).await.unwrap();
        products.create(bob, &widget(99)).await.unwrap();

        let listed = products.list_by_owner(alice).await.unwrap();
        assert_eq!(listed, vec![created.clone()]);
        assert_eq!(listed[0].name, "Widget");
        assert_eq!(listed[0].price, Price::from_units(10).unwrap());
        assert_eq!(listed[0].owner_id, alice);

        assert_eq!(products.list_by_owner(bob).await.unwrap().len(), 1);
    }

    #[sqlx::test]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_update_changes_only_submitted_fields(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let alice = seed_user(&mut conn, "alice").await;
        let mut products = ProductRepository::new(&mut conn);
        let created = products.create(alice, &widget(10)).await.unwrap();

        let updated = products
            .update(
                created.id,
                &ProductChanges {
                    name: "Widget".to_string(),
                    price: Price::from_units(20).unwrap(),
                    description: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.owner_id, alice);
        assert_eq!(updated.name, "Widget");
        assert_eq!(updated.description, "A widget");
        assert_eq!(updated.price, Price::from_units(20).unwrap());
        assert_eq!(updated.created_at, created.created_at);
    }

    #[sqlx::test]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_delete_removes_product(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let alice = seed_user(&mut conn, "alice").await;
        let mut products = ProductRepository::new(&mut conn);
        let created = products.create(alice, &widget(10)).await.unwrap();

        products.delete(created.id).await.unwrap();

        assert!(products.get(created.id).await.unwrap().is_none());
        assert!(products.list_by_owner(alice).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_missing_product_is_not_found(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut products = ProductRepository::new(&mut conn);
        let missing = ProductId::new(4242);

        assert!(products.get(missing).await.unwrap().is_none());
        assert!(matches!(
            products.delete(missing).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            products
                .update(
                    missing,
                    &ProductChanges {
                        name: "x".to_string(),
                        price: Price::from_units(1).unwrap(),
                        description: None,
                    },
                )
                .await,
            Err(RepositoryError::NotFound)
        ));
    }
}
