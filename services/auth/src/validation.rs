//! Input validation for registration and login
//!
//! Each field has an ordered list of predicates; the first failing predicate
//! produces the field's message. All fields are always evaluated so a client
//! gets every violation in one round trip.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::models::{LoginRequest, RegisterRequest};

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("L'email est obligatoire".to_string());
    }

    if email.len() > 180 {
        return Err("L'email ne peut pas dépasser 180 caractères".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("L'email n'est pas valide".to_string());
    }

    Ok(())
}

/// Validate a password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Le mot de passe est obligatoire".to_string());
    }

    if password.chars().count() < 6 {
        return Err("Le mot de passe doit contenir au moins 6 caractères".to_string());
    }

    Ok(())
}

/// Validate a display name
pub fn validate_nom(nom: &str) -> Result<(), String> {
    let nom = nom.trim();
    if nom.is_empty() {
        return Err("Le nom est obligatoire".to_string());
    }

    let len = nom.chars().count();
    if !(2..=100).contains(&len) {
        return Err("Le nom doit contenir entre 2 et 100 caractères".to_string());
    }

    Ok(())
}

/// Validate a registration request, collecting every violation per field
pub fn validate_registration(request: &RegisterRequest) -> HashMap<String, String> {
    let mut erreurs = HashMap::new();

    if let Err(message) = validate_email(request.email.as_deref().unwrap_or("")) {
        erreurs.insert("email".to_string(), message);
    }
    if let Err(message) = validate_password(request.password.as_deref().unwrap_or("")) {
        erreurs.insert("password".to_string(), message);
    }
    if let Err(message) = validate_nom(request.nom.as_deref().unwrap_or("")) {
        erreurs.insert("nom".to_string(), message);
    }

    erreurs
}

/// Validate a login request; only presence is checked here, the credential
/// check itself yields the uniform invalid-credentials response
pub fn validate_login(request: &LoginRequest) -> HashMap<String, String> {
    let mut erreurs = HashMap::new();

    if request.email.as_deref().unwrap_or("").trim().is_empty() {
        erreurs.insert(
            "email".to_string(),
            "L'email est obligatoire".to_string(),
        );
    }
    if request.password.as_deref().unwrap_or("").is_empty() {
        erreurs.insert(
            "password".to_string(),
            "Le mot de passe est obligatoire".to_string(),
        );
    }

    erreurs
}
