//! Domain models for the catalog.
//!
//! These types represent validated domain objects separate from database row
//! types (which live next to their repositories in `crate::db`).

pub mod product;
pub mod session;
pub mod user;

pub use product::{NewProduct, Product, ProductChanges};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
