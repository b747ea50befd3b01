//! Catalogue models for request and response payloads

pub mod produit;
