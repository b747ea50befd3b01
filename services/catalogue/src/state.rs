//! Application state shared across handlers

use sqlx::PgPool;

use crate::repositories::produit::ProduitRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub produit_repository: ProduitRepository,
}
