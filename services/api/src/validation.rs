//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Validate a required free-text field
pub fn validate_required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Please enter a valid email".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 6 {
        return Err("Password must be at least 6 characters".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate phone number
pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone.trim().is_empty() {
        return Err("Phone number is required".to_string());
    }

    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX
        .get_or_init(|| Regex::new(r"^\+?[0-9 -]{7,15}$").expect("Failed to compile phone regex"));

    if !regex.is_match(phone.trim()) {
        return Err("Please enter a valid phone number".to_string());
    }

    Ok(())
}

/// Validate postal pincode
pub fn validate_pincode(pincode: &str) -> Result<(), String> {
    static PINCODE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PINCODE_REGEX
        .get_or_init(|| Regex::new(r"^[0-9]{6}$").expect("Failed to compile pincode regex"));

    if !regex.is_match(pincode) {
        return Err("Pincode must be a 6-digit number".to_string());
    }

    Ok(())
}

/// Validate a selling/purchase price
pub fn validate_price(field: &str, price: f64) -> Result<(), String> {
    if !price.is_finite() || price < 0.0 {
        return Err(format!("{field} must be a non-negative number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_reject_blank_input() {
        assert!(validate_required("Name", "").is_err());
        assert!(validate_required("Name", "   ").is_err());
        assert!(validate_required("Name", "Brake pad").is_ok());
    }

    #[test]
    fn email_format() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn password_length() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn phone_format() {
        assert!(validate_phone("9999999999").is_ok());
        assert!(validate_phone("+91 99999 99999").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("abc").is_err());
    }

    #[test]
    fn pincode_is_six_digits() {
        assert!(validate_pincode("560001").is_ok());
        assert!(validate_pincode("5600").is_err());
        assert!(validate_pincode("56000a").is_err());
    }

    #[test]
    fn price_must_be_non_negative() {
        assert!(validate_price("Selling price", 0.0).is_ok());
        assert!(validate_price("Selling price", 1500.0).is_ok());
        assert!(validate_price("Selling price", -1.0).is_err());
        assert!(validate_price("Selling price", f64::NAN).is_err());
    }
}
