//! Per-request database connection.

use std::ops::{Deref, DerefMut};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use sqlx::{PgConnection, Postgres, pool::PoolConnection};

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::state::AppState;

/// A pooled connection held for the duration of one request.
///
/// Acquired when the handler runs and returned to the pool when the handler's
/// future is dropped, on success and on error alike. Repositories borrow it
/// mutably, so one request never interleaves statements across connections.
pub struct DbConn(pub PoolConnection<Postgres>);

impl<S> FromRequestParts<S> for DbConn
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let conn = state
            .pool()
            .acquire()
            .await
            .map_err(RepositoryError::from)?;

        Ok(Self(conn))
    }
}

impl Deref for DbConn {
    type Target = PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DbConn {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
