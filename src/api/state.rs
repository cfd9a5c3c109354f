//! Shared state handed to every request handler.

use crate::{core::notify::Notifier, storage::FileStore};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Application state; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    /// HS256 signing secret for access tokens
    pub jwt_secret: Arc<str>,
    /// Uploaded payment proofs
    pub store: FileStore,
    /// Chat channel announcing confirmed payments
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        jwt_secret: &str,
        store: FileStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            jwt_secret: Arc::from(jwt_secret),
            store,
            notifier,
        }
    }
}
