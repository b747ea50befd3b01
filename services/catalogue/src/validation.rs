//! Product validation
//!
//! Each field has an ordered list of predicates running against the
//! normalized entity; the first failing predicate produces that field's
//! message. All fields are always evaluated so a client gets every violation
//! in one round trip.

use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::models::produit::Produit;

/// Accepted categories, stored lower-cased
pub const CATEGORIES_VALIDES: [&str; 4] = ["vetements", "chaussures", "accessoires", "sport"];

/// Accepted sizes, stored upper-cased
pub const TAILLES_VALIDES: [&str; 6] = ["XS", "S", "M", "L", "XL", "XXL"];

/// Accepted target audiences
pub const SEXES_VALIDES: [&str; 4] = ["homme", "femme", "enfant", "unisexe"];

/// Exclusive upper bound for prices
pub fn prix_maximum() -> Decimal {
    Decimal::new(99999999, 2) // 999999.99
}

fn validate_nom(nom: &str) -> Result<(), String> {
    if nom.is_empty() {
        return Err("Le nom est obligatoire".to_string());
    }
    let len = nom.chars().count();
    if len < 2 {
        return Err("Le nom doit contenir au moins 2 caractères".to_string());
    }
    if len > 255 {
        return Err("Le nom ne peut pas dépasser 255 caractères".to_string());
    }
    Ok(())
}

fn validate_prix(prix: Decimal) -> Result<(), String> {
    if prix <= Decimal::ZERO {
        return Err("Le prix doit être positif".to_string());
    }
    if prix >= prix_maximum() {
        return Err("Le prix ne peut pas dépasser 999999.99".to_string());
    }
    Ok(())
}

fn validate_categorie(categorie: &str) -> Result<(), String> {
    if categorie.is_empty() {
        return Err("La catégorie est obligatoire".to_string());
    }
    if !CATEGORIES_VALIDES.contains(&categorie) {
        return Err(format!(
            "La catégorie doit être l'une des suivantes : {}",
            CATEGORIES_VALIDES.join(", ")
        ));
    }
    Ok(())
}

fn validate_taille(taille: &str) -> Result<(), String> {
    if !TAILLES_VALIDES.contains(&taille) {
        return Err(format!(
            "La taille doit être une taille valide : {}",
            TAILLES_VALIDES.join(", ")
        ));
    }
    Ok(())
}

fn validate_couleur(couleur: &str) -> Result<(), String> {
    if couleur.chars().count() > 50 {
        return Err("La couleur ne peut pas dépasser 50 caractères".to_string());
    }

    static COULEUR_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = COULEUR_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-ZÀ-ÖØ-öø-ÿ\s-]+$").expect("Failed to compile couleur regex")
    });

    if !regex.is_match(couleur) {
        return Err("La couleur ne peut contenir que des lettres, espaces et tirets".to_string());
    }
    Ok(())
}

fn validate_sexe(sexe: &str) -> Result<(), String> {
    if !SEXES_VALIDES.contains(&sexe) {
        return Err("Le sexe doit être homme, femme, enfant ou unisexe".to_string());
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), String> {
    if description.chars().count() > 2000 {
        return Err("La description ne peut pas dépasser 2000 caractères".to_string());
    }
    Ok(())
}

fn validate_image(image: &str) -> Result<(), String> {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = URL_REGEX
        .get_or_init(|| Regex::new(r"^https?://\S+$").expect("Failed to compile URL regex"));

    if !regex.is_match(image) {
        return Err("L'image doit être une URL valide".to_string());
    }
    if image.chars().count() > 255 {
        return Err("L'URL de l'image ne peut pas dépasser 255 caractères".to_string());
    }
    Ok(())
}

/// Validate a normalized product, collecting every violation per field
pub fn validate_produit(produit: &Produit) -> HashMap<String, String> {
    let mut erreurs = HashMap::new();

    if let Err(message) = validate_nom(&produit.nom) {
        erreurs.insert("nom".to_string(), message);
    }
    if let Err(message) = validate_prix(produit.prix) {
        erreurs.insert("prix".to_string(), message);
    }
    if let Err(message) = validate_categorie(&produit.categorie) {
        erreurs.insert("categorie".to_string(), message);
    }
    if let Some(taille) = produit.taille.as_deref() {
        if let Err(message) = validate_taille(taille) {
            erreurs.insert("taille".to_string(), message);
        }
    }
    if let Some(couleur) = produit.couleur.as_deref() {
        if let Err(message) = validate_couleur(couleur) {
            erreurs.insert("couleur".to_string(), message);
        }
    }
    if let Some(sexe) = produit.sexe.as_deref() {
        if let Err(message) = validate_sexe(sexe) {
            erreurs.insert("sexe".to_string(), message);
        }
    }
    if let Some(description) = produit.description.as_deref() {
        if let Err(message) = validate_description(description) {
            erreurs.insert("description".to_string(), message);
        }
    }
    if let Some(image) = produit.image.as_deref() {
        if let Err(message) = validate_image(image) {
            erreurs.insert("image".to_string(), message);
        }
    }

    erreurs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn produit_valide() -> Produit {
        let mut produit = Produit::new();
        produit.set_nom("T-shirt Nike");
        produit.set_prix(Decimal::from_str("29.99").unwrap());
        produit.set_categorie("vetements");
        produit.set_description(Some("Un beau t-shirt de sport"));
        produit.set_taille(Some("M"));
        produit.set_couleur(Some("rouge"));
        produit.set_sexe(Some("unisexe"));
        produit.set_image(Some("https://example.com/image.jpg"));
        produit
    }

    #[test]
    fn test_valid_produit_has_no_violations() {
        assert!(validate_produit(&produit_valide()).is_empty());
    }

    #[test]
    fn test_nom_obligatoire() {
        let mut produit = produit_valide();
        produit.set_nom("");
        let erreurs = validate_produit(&produit);
        assert!(erreurs["nom"].contains("obligatoire"));
    }

    #[test]
    fn test_nom_trop_court() {
        let mut produit = produit_valide();
        produit.set_nom("A");
        let erreurs = validate_produit(&produit);
        assert!(erreurs["nom"].contains("au moins"));
    }

    #[test]
    fn test_nom_bornes() {
        let mut produit = produit_valide();
        produit.set_nom("Ab");
        assert!(validate_produit(&produit).is_empty());

        produit.set_nom(&"a".repeat(255));
        assert!(validate_produit(&produit).is_empty());

        produit.set_nom(&"a".repeat(256));
        assert!(validate_produit(&produit).contains_key("nom"));
    }

    #[test]
    fn test_prix_positif() {
        let mut produit = produit_valide();
        produit.set_prix(Decimal::from_str("-10.00").unwrap());
        assert!(validate_produit(&produit)["prix"].contains("positif"));

        produit.set_prix(Decimal::ZERO);
        assert!(validate_produit(&produit)["prix"].contains("positif"));
    }

    #[test]
    fn test_prix_trop_eleve() {
        let mut produit = produit_valide();
        produit.set_prix(Decimal::from_str("1000000.00").unwrap());
        assert!(validate_produit(&produit)["prix"].contains("999999.99"));

        // The bound itself is rejected, just below passes
        produit.set_prix(Decimal::from_str("999999.99").unwrap());
        assert!(validate_produit(&produit).contains_key("prix"));

        produit.set_prix(Decimal::from_str("999999.98").unwrap());
        assert!(validate_produit(&produit).is_empty());
    }

    #[test]
    fn test_categorie_inexistante() {
        let mut produit = produit_valide();
        produit.set_categorie("categorie_inexistante");
        assert!(validate_produit(&produit)["categorie"].contains("doit être l'une des suivantes"));
    }

    #[test]
    fn test_categorie_vide() {
        let mut produit = produit_valide();
        produit.set_categorie("");
        assert!(validate_produit(&produit)["categorie"].contains("obligatoire"));
    }

    #[test]
    fn test_categorie_casse_indifferente() {
        let mut produit = produit_valide();
        produit.set_categorie("CHAUSSURES");
        assert!(validate_produit(&produit).is_empty());
        assert_eq!(produit.categorie, "chaussures");
    }

    #[test]
    fn test_taille_invalide() {
        let mut produit = produit_valide();
        produit.set_taille(Some("XXXL"));
        assert!(validate_produit(&produit)["taille"].contains("taille valide"));
    }

    #[test]
    fn test_sexe_invalide() {
        let mut produit = produit_valide();
        produit.set_sexe(Some("alien"));
        assert!(validate_produit(&produit)["sexe"].contains("homme, femme, enfant ou unisexe"));
    }

    #[test]
    fn test_couleur_avec_chiffres() {
        let mut produit = produit_valide();
        produit.set_couleur(Some("rouge123"));
        assert!(validate_produit(&produit).contains_key("couleur"));
    }

    #[test]
    fn test_couleur_trop_longue() {
        let mut produit = produit_valide();
        produit.set_couleur(Some(&"a".repeat(51)));
        assert!(validate_produit(&produit)["couleur"].contains("50"));
    }

    #[test]
    fn test_description_trop_longue() {
        let mut produit = produit_valide();
        produit.set_description(Some(&"a".repeat(2001)));
        assert!(validate_produit(&produit)["description"].contains("2000"));
    }

    #[test]
    fn test_image_url_invalide() {
        let mut produit = produit_valide();
        produit.set_image(Some("pas-une-url-valide"));
        assert!(validate_produit(&produit)["image"].contains("URL"));
    }

    #[test]
    fn test_champs_optionnels_absents_ignores() {
        let mut produit = Produit::new();
        produit.set_nom("Basket");
        produit.set_prix(Decimal::from_str("59.90").unwrap());
        produit.set_categorie("chaussures");
        assert!(validate_produit(&produit).is_empty());
    }
}
