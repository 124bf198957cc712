//! Client-side form validation.
//!
//! These checks run before a request is made. Failures are presented inline
//! next to the offending field, never as toasts.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Same shape the login form accepts: something@something.tld
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email is required".to_string());
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address".to_string());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    Ok(())
}

pub fn validate_required(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

pub fn validate_amount(amount: f64) -> Result<(), String> {
    if !amount.is_finite() {
        return Err("Amount must be a valid number".to_string());
    }
    if amount <= 0.0 {
        return Err("Amount must be greater than zero".to_string());
    }
    Ok(())
}

/// Ordered collection of per-field validation failures.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<(String, String)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a single field check.
    pub fn check(&mut self, field: &str, result: Result<(), String>) -> &mut Self {
        if let Err(message) = result {
            self.errors.push((field.to_string(), message));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, String)> {
        self.errors.iter()
    }
}

pub fn validate_login(email: &str, password: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.check("email", validate_email(email));
    errors.check("password", validate_password(password));
    errors
}

pub fn validate_register(email: &str, password: &str, name: &str) -> ValidationErrors {
    let mut errors = validate_login(email, password);
    errors.check("name", validate_required(name, "Name"));
    errors
}

pub fn validate_new_record(amount: f64, category: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.check("amount", validate_amount(amount));
    errors.check("category", validate_required(category, "Category"));
    errors
}
