//! Repositories for database operations

pub mod produit;
