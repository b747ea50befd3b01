//! Product entity and catalogue request/response payloads
//!
//! The entity normalizes every field in its setter (trim, case folding,
//! price rounding), so values are always stored in canonical form. The
//! constructor stamps both timestamps; `touch` refreshes `updated_at` and is
//! called by the repository right before every update.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Catalogue item
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Produit {
    pub id: Uuid,
    pub nom: String,
    pub description: Option<String>,
    pub prix: Decimal,
    pub image: Option<String>,
    pub categorie: String,
    pub taille: Option<String>,
    pub couleur: Option<String>,
    pub sexe: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Produit {
    /// Create an empty product; both timestamps are stamped here
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            nom: String::new(),
            description: None,
            prix: Decimal::ZERO,
            image: None,
            categorie: String::new(),
            taille: None,
            couleur: None,
            sexe: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_nom(&mut self, nom: &str) {
        self.nom = nom.trim().to_string();
    }

    pub fn set_description(&mut self, description: Option<&str>) {
        self.description = normalize_optional(description, |s| s.to_string());
    }

    /// Prices are rounded to 2 decimal places on every write
    pub fn set_prix(&mut self, prix: Decimal) {
        self.prix = prix.round_dp(2);
    }

    pub fn set_image(&mut self, image: Option<&str>) {
        self.image = normalize_optional(image, |s| s.to_string());
    }

    pub fn set_categorie(&mut self, categorie: &str) {
        self.categorie = categorie.trim().to_lowercase();
    }

    pub fn set_taille(&mut self, taille: Option<&str>) {
        self.taille = normalize_optional(taille, |s| s.to_uppercase());
    }

    pub fn set_couleur(&mut self, couleur: Option<&str>) {
        self.couleur = normalize_optional(couleur, |s| s.to_lowercase());
    }

    pub fn set_sexe(&mut self, sexe: Option<&str>) {
        self.sexe = normalize_optional(sexe, |s| s.to_lowercase());
    }

    /// Refresh `updated_at`; invoked before every persistence update
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Produit {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_optional(value: Option<&str>, fold: impl Fn(&str) -> String) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(fold)
}

/// Request body for product creation; every field is optional so missing
/// fields surface as per-field validation errors, not deserializer faults
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduitRequest {
    pub nom: Option<String>,
    pub description: Option<String>,
    pub prix: Option<Decimal>,
    pub image: Option<String>,
    pub categorie: Option<String>,
    pub taille: Option<String>,
    pub couleur: Option<String>,
    pub sexe: Option<String>,
}

/// Request body for partial product updates
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProduitRequest {
    pub nom: Option<String>,
    pub description: Option<String>,
    pub prix: Option<Decimal>,
    pub image: Option<String>,
    pub categorie: Option<String>,
    pub taille: Option<String>,
    pub couleur: Option<String>,
    pub sexe: Option<String>,
}

/// Query parameters for the filtered product listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProduitQuery {
    /// Exact category match
    pub categorie: Option<String>,
    /// Inclusive lower price bound; non-numeric values are ignored
    pub prix_min: Option<String>,
    /// Inclusive upper price bound; non-numeric values are ignored
    pub prix_max: Option<String>,
    /// Case-insensitive name substring
    pub nom: Option<String>,
    /// Exact size match
    pub taille: Option<String>,
    /// Case-insensitive color substring
    pub couleur: Option<String>,
    /// Exact target audience match
    pub sexe: Option<String>,
    /// Sort field, whitelisted
    pub order_by: Option<String>,
    /// Sort direction (asc or desc)
    pub order_direction: Option<String>,
}

/// Response for product listings
#[derive(Debug, Serialize)]
pub struct ProduitListResponse {
    pub data: Vec<Produit>,
    pub count: usize,
}

impl ProduitListResponse {
    pub fn new(data: Vec<Produit>) -> Self {
        let count = data.len();
        Self { data, count }
    }
}

/// One (categorie, count) pair of the category statistics
#[derive(Debug, Serialize, FromRow)]
pub struct CategorieCount {
    pub categorie: String,
    pub count: i64,
}

/// Catalogue-wide statistics
#[derive(Debug, Serialize)]
pub struct Statistiques {
    pub total_produits: i64,
    pub prix_moyen: Decimal,
    pub prix_minimum: Decimal,
    pub prix_maximum: Decimal,
    pub categories: Vec<CategorieCount>,
}
