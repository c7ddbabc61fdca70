//! Business logic services for the catalog.
//!
//! # Services
//!
//! - `auth` - Username/password registration and login

pub mod auth;
