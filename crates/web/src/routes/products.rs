//! Product route handlers.
//!
//! Every product belongs to the user who created it. Only the owner can edit
//! or delete it; anyone else is sent back to the listing with a notice.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use sqlx::PgConnection;
use tower_sessions::Session;

use catalog_core::{Price, ProductId};

use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::flash::{self, FlashMessage};
use crate::middleware::{DbConn, OptionalAuth, RequireAuth};
use crate::models::{CurrentUser, NewProduct, Product, ProductChanges};
use crate::state::AppState;

pub const ADDED_MESSAGE: &str = "Product added!";
pub const UPDATED_MESSAGE: &str = "Product updated!";
pub const DELETED_MESSAGE: &str = "Product deleted!";
pub const EDIT_DENIED_MESSAGE: &str = "You do not have permission to edit this product.";
pub const DELETE_DENIED_MESSAGE: &str = "You do not have permission to delete this product.";

// =============================================================================
// Form Types
// =============================================================================

/// Product create/edit form data.
///
/// A missing name or price, or a price that is not a non-negative number,
/// rejects the whole form before the handler runs.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub price: Price,
    pub description: Option<String>,
}

impl ProductForm {
    fn name(&self) -> Result<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("name is required".to_owned()));
        }
        Ok(name.to_owned())
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub messages: Vec<FlashMessage>,
    pub current_user: Option<CurrentUser>,
    pub products: Vec<Product>,
}

/// Create form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/add.html")]
pub struct AddProductTemplate {
    pub messages: Vec<FlashMessage>,
    pub current_user: Option<CurrentUser>,
}

/// Edit form template, prefilled with the stored product.
#[derive(Template, WebTemplate)]
#[template(path = "products/edit.html")]
pub struct EditProductTemplate {
    pub messages: Vec<FlashMessage>,
    pub current_user: Option<CurrentUser>,
    pub product: Product,
}

// =============================================================================
// Listing
// =============================================================================

/// List the current user's products.
///
/// Anonymous visitors get an empty list without touching the database.
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current_user): OptionalAuth,
) -> Result<IndexTemplate> {
    let products = match &current_user {
        Some(user) => {
            let mut conn = state.pool().acquire().await.map_err(RepositoryError::from)?;
            ProductRepository::new(&mut conn)
                .list_by_owner(user.id)
                .await?
        }
        None => Vec::new(),
    };

    Ok(IndexTemplate {
        messages: flash::take(&session).await,
        current_user,
        products,
    })
}

// =============================================================================
// Create
// =============================================================================

/// Display the create form.
pub async fn add_page(RequireAuth(user): RequireAuth, session: Session) -> AddProductTemplate {
    AddProductTemplate {
        messages: flash::take(&session).await,
        current_user: Some(user),
    }
}

/// Create a product owned by the current user.
pub async fn add(
    RequireAuth(user): RequireAuth,
    session: Session,
    mut conn: DbConn,
    Form(form): Form<ProductForm>,
) -> Result<Redirect> {
    let product = NewProduct {
        name: form.name()?,
        description: form.description.unwrap_or_default(),
        price: form.price,
    };

    let product = ProductRepository::new(&mut conn)
        .create(user.id, &product)
        .await?;

    tracing::info!(
        user_id = %user.id,
        product_id = %product.id,
        price = %product.price,
        "Product created"
    );

    flash::push(&session, FlashMessage::success(ADDED_MESSAGE)).await?;
    Ok(Redirect::to("/"))
}

// =============================================================================
// Edit
// =============================================================================

/// Display the edit form for a product the current user owns.
pub async fn edit_page(
    RequireAuth(user): RequireAuth,
    session: Session,
    mut conn: DbConn,
    Path(raw_id): Path<String>,
) -> Result<Response> {
    let product = find_product(&mut conn, &raw_id).await?;
    if !product.is_owned_by(user.id) {
        return deny(&session, &user, &product, EDIT_DENIED_MESSAGE).await;
    }

    Ok(EditProductTemplate {
        messages: flash::take(&session).await,
        current_user: Some(user),
        product,
    }
    .into_response())
}

/// Overwrite a product the current user owns.
///
/// The description is only changed when the form submits one.
pub async fn edit(
    RequireAuth(user): RequireAuth,
    session: Session,
    mut conn: DbConn,
    Path(raw_id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let product = find_product(&mut conn, &raw_id).await?;
    if !product.is_owned_by(user.id) {
        return deny(&session, &user, &product, EDIT_DENIED_MESSAGE).await;
    }

    let changes = ProductChanges {
        name: form.name()?,
        price: form.price,
        description: form.description,
    };

    let updated = ProductRepository::new(&mut conn)
        .update(product.id, &changes)
        .await?;

    tracing::info!(
        user_id = %user.id,
        product_id = %updated.id,
        price = %updated.price,
        "Product updated"
    );

    flash::push(&session, FlashMessage::success(UPDATED_MESSAGE)).await?;
    Ok(Redirect::to("/").into_response())
}

// =============================================================================
// Delete
// =============================================================================

/// Delete a product the current user owns.
pub async fn delete(
    RequireAuth(user): RequireAuth,
    session: Session,
    mut conn: DbConn,
    Path(raw_id): Path<String>,
) -> Result<Response> {
    let product = find_product(&mut conn, &raw_id).await?;
    if !product.is_owned_by(user.id) {
        return deny(&session, &user, &product, DELETE_DENIED_MESSAGE).await;
    }

    ProductRepository::new(&mut conn).delete(product.id).await?;

    tracing::info!(user_id = %user.id, product_id = %product.id, "Product deleted");

    flash::push(&session, FlashMessage::success(DELETED_MESSAGE)).await?;
    Ok(Redirect::to("/").into_response())
}

// =============================================================================
// Helpers
// =============================================================================

/// Load a product or fail with 404. Existence is checked before ownership.
async fn find_product(conn: &mut PgConnection, raw_id: &str) -> Result<Product> {
    let id = parse_product_id(raw_id)?;
    ProductRepository::new(conn)
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// An id segment that does not fit the key column names no product.
fn parse_product_id(raw_id: &str) -> Result<ProductId> {
    raw_id
        .parse::<i32>()
        .map(ProductId::new)
        .map_err(|_| AppError::NotFound(format!("product {raw_id}")))
}

/// Send a non-owner back to the listing with a notice.
async fn deny(
    session: &Session,
    user: &CurrentUser,
    product: &Product,
    message: &str,
) -> Result<Response> {
    tracing::warn!(
        user_id = %user.id,
        product_id = %product.id,
        owner_id = %product.owner_id,
        "Ownership check failed"
    );

    flash::push(session, FlashMessage::danger(message)).await?;
    Ok(Redirect::to("/").into_response())
}
