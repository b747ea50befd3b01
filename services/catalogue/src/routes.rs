//! Catalogue service routes

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::produit::{
        CreateProduitRequest, Produit, ProduitListResponse, ProduitQuery, UpdateProduitRequest,
    },
    state::AppState,
    validation,
};

/// Query parameters for the text search endpoint
#[derive(Deserialize)]
pub struct RechercheQuery {
    pub q: Option<String>,
}

/// Query parameters for endpoints taking a result limit
#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// Create the router for the catalogue service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/produits", get(lister_produits).post(creer_produit))
        .route("/api/produits/statistiques", get(statistiques))
        .route("/api/produits/recherche", get(rechercher))
        .route("/api/produits/nouveautes", get(nouveautes))
        .route("/api/produits/categorie/:categorie", get(produits_par_categorie))
        .route(
            "/api/produits/:id",
            get(detail_produit)
                .put(modifier_produit)
                .delete(supprimer_produit),
        )
        .route("/api/produits/:id/similaires", get(produits_similaires))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "catalogue-service"
    }))
}

/// Filtered product listing
pub async fn lister_produits(
    State(state): State<AppState>,
    Query(filtres): Query<ProduitQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let produits = state
        .produit_repository
        .find_with_filters(&filtres)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list products: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(ProduitListResponse::new(produits)))
}

/// Product detail
pub async fn detail_produit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let produit = state
        .produit_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get product: {}", e);
            ApiError::Internal
        })?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(produit))
}

/// Product creation
pub async fn creer_produit(
    State(state): State<AppState>,
    payload: Result<Json<CreateProduitRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) =
        payload.map_err(|_| ApiError::BadRequest("Format JSON invalide".to_string()))?;

    let mut produit = Produit::new();
    apply_create(&mut produit, &payload);

    let erreurs = validation::validate_produit(&produit);
    if !erreurs.is_empty() {
        return Err(ApiError::Validation(erreurs));
    }

    let created = state
        .produit_repository
        .create(&produit)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create product: {}", e);
            ApiError::Internal
        })?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Partial product update
pub async fn modifier_produit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateProduitRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) =
        payload.map_err(|_| ApiError::BadRequest("Format JSON invalide".to_string()))?;

    let mut produit = state
        .produit_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get product: {}", e);
            ApiError::Internal
        })?
        .ok_or(ApiError::NotFound)?;

    apply_update(&mut produit, &payload);

    let erreurs = validation::validate_produit(&produit);
    if !erreurs.is_empty() {
        return Err(ApiError::Validation(erreurs));
    }

    let updated = state
        .produit_repository
        .update(&mut produit)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update product: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(updated))
}

/// Product deletion
pub async fn supprimer_produit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.produit_repository.delete(id).await.map_err(|e| {
        tracing::error!("Failed to delete product: {}", e);
        ApiError::Internal
    })?;

    if !deleted {
        return Err(ApiError::NotFound);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Produit supprimé avec succès",
    })))
}

/// Products of one category
pub async fn produits_par_categorie(
    State(state): State<AppState>,
    Path(categorie): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let produits = state
        .produit_repository
        .find_by_categorie(&categorie.trim().to_lowercase())
        .await
        .map_err(|e| {
            tracing::error!("Failed to list products by category: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(ProduitListResponse::new(produits)))
}

/// Text search across name, description and category
pub async fn rechercher(
    State(state): State<AppState>,
    Query(query): Query<RechercheQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let terme = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ApiError::BadRequest("Le terme de recherche est obligatoire".to_string())
        })?;

    let produits = state.produit_repository.rechercher(terme).await.map_err(|e| {
        tracing::error!("Failed to search products: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(ProduitListResponse::new(produits)))
}

/// Most recently added products
pub async fn nouveautes(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 50);

    let produits = state.produit_repository.find_latest(limit).await.map_err(|e| {
        tracing::error!("Failed to list latest products: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(ProduitListResponse::new(produits)))
}

/// Catalogue statistics
pub async fn statistiques(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.produit_repository.statistiques().await.map_err(|e| {
        tracing::error!("Failed to compute statistics: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(stats))
}

/// Similar products: same category, price within ±30% of the reference
pub async fn produits_similaires(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(5).clamp(1, 50);

    let produit = state
        .produit_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get product: {}", e);
            ApiError::Internal
        })?
        .ok_or(ApiError::NotFound)?;

    let similaires = state
        .produit_repository
        .find_similaires(&produit, limit)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find similar products: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(ProduitListResponse::new(similaires)))
}

fn apply_create(produit: &mut Produit, payload: &CreateProduitRequest) {
    produit.set_nom(payload.nom.as_deref().unwrap_or_default());
    produit.set_description(payload.description.as_deref());
    produit.set_prix(payload.prix.unwrap_or_default());
    produit.set_image(payload.image.as_deref());
    produit.set_categorie(payload.categorie.as_deref().unwrap_or_default());
    produit.set_taille(payload.taille.as_deref());
    produit.set_couleur(payload.couleur.as_deref());
    produit.set_sexe(payload.sexe.as_deref());
}

fn apply_update(produit: &mut Produit, payload: &UpdateProduitRequest) {
    if let Some(nom) = payload.nom.as_deref() {
        produit.set_nom(nom);
    }
    if let Some(description) = payload.description.as_deref() {
        produit.set_description(Some(description));
    }
    if let Some(prix) = payload.prix {
        produit.set_prix(prix);
    }
    if let Some(image) = payload.image.as_deref() {
        produit.set_image(Some(image));
    }
    if let Some(categorie) = payload.categorie.as_deref() {
        produit.set_categorie(categorie);
    }
    if let Some(taille) = payload.taille.as_deref() {
        produit.set_taille(Some(taille));
    }
    if let Some(couleur) = payload.couleur.as_deref() {
        produit.set_couleur(Some(couleur));
    }
    if let Some(sexe) = payload.sexe.as_deref() {
        produit.set_sexe(Some(sexe));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_apply_create_defaults_missing_required_fields() {
        let payload = CreateProduitRequest {
            nom: None,
            description: None,
            prix: None,
            image: None,
            categorie: None,
            taille: None,
            couleur: None,
            sexe: None,
        };

        let mut produit = Produit::new();
        apply_create(&mut produit, &payload);

        // Defaults fail validation as required-field errors
        let erreurs = validation::validate_produit(&produit);
        assert!(erreurs.contains_key("nom"));
        assert!(erreurs.contains_key("prix"));
        assert!(erreurs.contains_key("categorie"));
    }

    #[test]
    fn test_apply_update_only_touches_present_fields() {
        let mut produit = Produit::new();
        produit.set_nom("Basket");
        produit.set_prix(Decimal::from_str("59.90").unwrap());
        produit.set_categorie("chaussures");

        let payload = UpdateProduitRequest {
            nom: None,
            description: None,
            prix: Some(Decimal::from_str("49.90").unwrap()),
            image: None,
            categorie: None,
            taille: None,
            couleur: None,
            sexe: None,
        };
        apply_update(&mut produit, &payload);

        assert_eq!(produit.nom, "Basket");
        assert_eq!(produit.prix, Decimal::from_str("49.90").unwrap());
        assert_eq!(produit.categorie, "chaussures");
    }
}
