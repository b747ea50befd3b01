//! Product repository for database operations
//!
//! The filtered listing is composed dynamically with `sqlx::QueryBuilder`:
//! each present criterion appends exactly one clause, absent or empty
//! criteria are ignored, and the sort order is restricted to a whitelist
//! falling back to name-ascending.

use anyhow::Result;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::produit::{CategorieCount, Produit, ProduitQuery, Statistiques};

const SELECT_PRODUIT: &str = "SELECT id, nom, description, prix, image, categorie, taille, \
     couleur, sexe, created_at, updated_at FROM produit";

const ORDER_BY_WHITELIST: [&str; 5] = ["nom", "prix", "categorie", "created_at", "updated_at"];

/// Product repository
#[derive(Clone)]
pub struct ProduitRepository {
    pool: PgPool,
}

impl ProduitRepository {
    /// Create a new product repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a product by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Produit>> {
        let produit = sqlx::query_as::<_, Produit>(&format!("{SELECT_PRODUIT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(produit)
    }

    /// Persist a new product
    pub async fn create(&self, produit: &Produit) -> Result<Produit> {
        let created = sqlx::query_as::<_, Produit>(
            r#"
            INSERT INTO produit (id, nom, description, prix, image, categorie, taille,
                                 couleur, sexe, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, nom, description, prix, image, categorie, taille, couleur,
                      sexe, created_at, updated_at
            "#,
        )
        .bind(produit.id)
        .bind(&produit.nom)
        .bind(&produit.description)
        .bind(produit.prix)
        .bind(&produit.image)
        .bind(&produit.categorie)
        .bind(&produit.taille)
        .bind(&produit.couleur)
        .bind(&produit.sexe)
        .bind(produit.created_at)
        .bind(produit.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a product, touching `updated_at` first
    pub async fn update(&self, produit: &mut Produit) -> Result<Produit> {
        produit.touch();

        let updated = sqlx::query_as::<_, Produit>(
            r#"
            UPDATE produit
            SET nom = $1, description = $2, prix = $3, image = $4, categorie = $5,
                taille = $6, couleur = $7, sexe = $8, updated_at = $9
            WHERE id = $10
            RETURNING id, nom, description, prix, image, categorie, taille, couleur,
                      sexe, created_at, updated_at
            "#,
        )
        .bind(&produit.nom)
        .bind(&produit.description)
        .bind(produit.prix)
        .bind(&produit.image)
        .bind(&produit.categorie)
        .bind(&produit.taille)
        .bind(&produit.couleur)
        .bind(&produit.sexe)
        .bind(produit.updated_at)
        .bind(produit.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a product; false when the id is unknown
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM produit WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Filtered listing; see [`build_filter_query`]
    pub async fn find_with_filters(&self, filtres: &ProduitQuery) -> Result<Vec<Produit>> {
        let mut query = build_filter_query(filtres);
        let produits = query
            .build_query_as::<Produit>()
            .fetch_all(&self.pool)
            .await?;

        Ok(produits)
    }

    /// Products of one category, name ascending
    pub async fn find_by_categorie(&self, categorie: &str) -> Result<Vec<Produit>> {
        let produits = sqlx::query_as::<_, Produit>(&format!(
            "{SELECT_PRODUIT} WHERE categorie = $1 ORDER BY nom ASC"
        ))
        .bind(categorie)
        .fetch_all(&self.pool)
        .await?;

        Ok(produits)
    }

    /// Text search across name, description and category
    pub async fn rechercher(&self, terme: &str) -> Result<Vec<Produit>> {
        let produits = sqlx::query_as::<_, Produit>(&format!(
            "{SELECT_PRODUIT} WHERE nom ILIKE $1 OR description ILIKE $1 OR categorie ILIKE $1 \
             ORDER BY nom ASC"
        ))
        .bind(format!("%{}%", terme))
        .fetch_all(&self.pool)
        .await?;

        Ok(produits)
    }

    /// Most recently added products
    pub async fn find_latest(&self, limit: i64) -> Result<Vec<Produit>> {
        let produits = sqlx::query_as::<_, Produit>(&format!(
            "{SELECT_PRODUIT} ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(produits)
    }

    /// (categorie, count) pairs, most populated first
    pub async fn count_by_categorie(&self) -> Result<Vec<CategorieCount>> {
        let counts = sqlx::query_as::<_, CategorieCount>(
            "SELECT categorie, COUNT(*) AS count FROM produit GROUP BY categorie \
             ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Catalogue-wide statistics; aggregates render as 0 for an empty catalogue
    pub async fn statistiques(&self) -> Result<Statistiques> {
        let (total_produits, prix_moyen, prix_minimum, prix_maximum): (
            i64,
            Decimal,
            Decimal,
            Decimal,
        ) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(ROUND(AVG(prix), 2), 0), COALESCE(MIN(prix), 0), \
             COALESCE(MAX(prix), 0) FROM produit",
        )
        .fetch_one(&self.pool)
        .await?;

        let categories = self.count_by_categorie().await?;

        Ok(Statistiques {
            total_produits,
            prix_moyen,
            prix_minimum,
            prix_maximum,
            categories,
        })
    }

    /// Products of the same category priced within ±30% of the reference,
    /// excluding the reference itself, closest price first
    pub async fn find_similaires(&self, produit: &Produit, limit: i64) -> Result<Vec<Produit>> {
        let prix_min = produit.prix * Decimal::new(7, 1);
        let prix_max = produit.prix * Decimal::new(13, 1);

        let produits = sqlx::query_as::<_, Produit>(&format!(
            "{SELECT_PRODUIT} WHERE categorie = $1 AND prix BETWEEN $2 AND $3 AND id != $4 \
             ORDER BY ABS(prix - $5) ASC LIMIT $6"
        ))
        .bind(&produit.categorie)
        .bind(prix_min)
        .bind(prix_max)
        .bind(produit.id)
        .bind(produit.prix)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(produits)
    }
}

/// Compose the filtered listing query; pure so the clause and whitelist
/// behavior is testable without a database
pub fn build_filter_query(filtres: &ProduitQuery) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(SELECT_PRODUIT);
    let mut has_where = false;

    if let Some(categorie) = present(&filtres.categorie) {
        push_clause(&mut query, &mut has_where);
        query.push("categorie = ").push_bind(categorie.to_string());
    }

    // Non-numeric price bounds are dropped like any other absent criterion
    if let Some(prix_min) = present(&filtres.prix_min).and_then(|s| s.parse::<Decimal>().ok()) {
        push_clause(&mut query, &mut has_where);
        query.push("prix >= ").push_bind(prix_min);
    }

    if let Some(prix_max) = present(&filtres.prix_max).and_then(|s| s.parse::<Decimal>().ok()) {
        push_clause(&mut query, &mut has_where);
        query.push("prix <= ").push_bind(prix_max);
    }

    if let Some(nom) = present(&filtres.nom) {
        push_clause(&mut query, &mut has_where);
        query.push("nom ILIKE ").push_bind(format!("%{}%", nom));
    }

    if let Some(taille) = present(&filtres.taille) {
        push_clause(&mut query, &mut has_where);
        query.push("taille = ").push_bind(taille.to_string());
    }

    if let Some(couleur) = present(&filtres.couleur) {
        push_clause(&mut query, &mut has_where);
        query
            .push("couleur ILIKE ")
            .push_bind(format!("%{}%", couleur));
    }

    if let Some(sexe) = present(&filtres.sexe) {
        push_clause(&mut query, &mut has_where);
        query.push("sexe = ").push_bind(sexe.to_string());
    }

    let (order_by, direction) = order_clause(
        filtres.order_by.as_deref(),
        filtres.order_direction.as_deref(),
    );
    query.push(format!(" ORDER BY {} {}", order_by, direction));

    query
}

/// Whitelisted sort order; anything unrecognized falls back to name ascending
fn order_clause(order_by: Option<&str>, direction: Option<&str>) -> (&'static str, &'static str) {
    let order_by = order_by.unwrap_or("nom");
    let direction = direction.unwrap_or("asc");

    let order_by = ORDER_BY_WHITELIST.iter().find(|&&field| field == order_by);
    let direction = match direction.to_lowercase().as_str() {
        "asc" => Some("ASC"),
        "desc" => Some("DESC"),
        _ => None,
    };

    match (order_by, direction) {
        (Some(&field), Some(direction)) => (field, direction),
        _ => ("nom", "ASC"),
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn push_clause(query: &mut QueryBuilder<'static, Postgres>, has_where: &mut bool) {
    if *has_where {
        query.push(" AND ");
    } else {
        query.push(" WHERE ");
        *has_where = true;
    }
}
