//! Server-side form validation
//!
//! Declarative field rules for the account, contact, and favorites
//! forms. Failures collect into `AppError::Validation` so responses
//! carry field-level messages.

use crate::error::{AppError, FieldError};

/// Password policy: 12-80 chars with upper, lower, digit, and symbol
pub const MIN_PASSWORD_LENGTH: usize = 12;
pub const MAX_PASSWORD_LENGTH: usize = 80;

/// Notes on a favorite are capped at 500 characters
pub const MAX_NOTES_LENGTH: usize = 500;

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn password_error(password: &str, field: &str) -> Option<FieldError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Some(FieldError::new(
            field,
            "Password must be at least 12 characters.",
        ));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Some(FieldError::new(field, "Password is too long."));
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());
    if !(has_lower && has_upper && has_digit && has_symbol) {
        return Some(FieldError::new(
            field,
            "Password must contain uppercase, lowercase, number, and special character.",
        ));
    }
    None
}

fn finish(errors: Vec<FieldError>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub fn registration(
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if first_name.trim().is_empty() {
        errors.push(FieldError::new("first_name", "Please provide a first name."));
    }
    if last_name.trim().len() < 2 {
        errors.push(FieldError::new("last_name", "Please provide a last name."));
    }
    if !is_valid_email(email.trim()) {
        errors.push(FieldError::new("email", "A valid email is required."));
    }
    if let Some(err) = password_error(password, "password") {
        errors.push(err);
    }
    finish(errors)
}

pub fn login(email: &str, password: &str) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if !is_valid_email(email.trim()) {
        errors.push(FieldError::new("email", "A valid email is required."));
    }
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required."));
    }
    finish(errors)
}

pub fn profile_update(first_name: &str, last_name: &str, email: &str) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if first_name.trim().is_empty() {
        errors.push(FieldError::new("first_name", "Please provide a first name."));
    }
    if last_name.trim().len() < 2 {
        errors.push(FieldError::new("last_name", "Please provide a last name."));
    }
    if !is_valid_email(email.trim()) {
        errors.push(FieldError::new("email", "A valid email is required."));
    }
    finish(errors)
}

pub fn password_change(new_password: &str, confirm_password: &str) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if let Some(err) = password_error(new_password, "new_password") {
        errors.push(err);
    }
    if new_password != confirm_password {
        errors.push(FieldError::new("confirm_password", "Passwords do not match."));
    }
    finish(errors)
}

pub fn contact(name: &str, email: &str, message: &str) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "Please enter your name."));
    }
    if !is_valid_email(email.trim()) {
        errors.push(FieldError::new("email", "Please enter a valid email address."));
    }
    if message.trim().is_empty() {
        errors.push(FieldError::new("message", "Please enter a message."));
    }
    finish(errors)
}

pub fn favorite_input(notes: Option<&str>, priority: i32) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if notes.is_some_and(|n| n.len() > MAX_NOTES_LENGTH) {
        errors.push(FieldError::new("notes", "Notes cannot exceed 500 characters."));
    }
    if !(1..=5).contains(&priority) {
        errors.push(FieldError::new("priority", "Priority must be between 1 and 5."));
    }
    finish(errors)
}

pub fn classification_name(name: &str) -> Result<(), AppError> {
    let trimmed = name.trim();
    let mut errors = Vec::new();
    if trimmed.is_empty() {
        errors.push(FieldError::new(
            "classification_name",
            "Classification name is required.",
        ));
    } else if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
        errors.push(FieldError::new(
            "classification_name",
            "Classification name may only contain letters, numbers, and spaces.",
        ));
    }
    finish(errors)
}

pub fn vehicle_fields(
    make: &str,
    model: &str,
    year: i32,
    color: &str,
    price: f64,
    miles: i64,
) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if make.trim().is_empty() {
        errors.push(FieldError::new("make", "Make is required."));
    }
    if model.trim().is_empty() {
        errors.push(FieldError::new("model", "Model is required."));
    }
    if !(1900..=2100).contains(&year) {
        errors.push(FieldError::new("year", "Year must be a four-digit year."));
    }
    if color.trim().is_empty() {
        errors.push(FieldError::new("color", "Color is required."));
    }
    if price < 0.0 {
        errors.push(FieldError::new("price", "Price cannot be negative."));
    }
    if miles < 0 {
        errors.push(FieldError::new("miles", "Mileage cannot be negative."));
    }
    finish(errors)
}
