//! Client-side checks run before credentials are sent.

use crate::core::error::FieldErrors;

pub const EMAIL_LENGTH: (usize, usize) = (5, 100);
pub const PASSWORD_LENGTH: (usize, usize) = (8, 100);
pub const FULL_NAME_LENGTH: (usize, usize) = (2, 100);
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

fn add(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !value.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    let len = email.chars().count();
    if !is_email(email) {
        add(errors, "email", "Please enter a valid email address");
    } else if len < EMAIL_LENGTH.0 || len > EMAIL_LENGTH.1 {
        add(
            errors,
            "email",
            &format!(
                "Email must be between {} and {} characters",
                EMAIL_LENGTH.0, EMAIL_LENGTH.1
            ),
        );
    }
}

/// Sign in only needs a well formed email and some password.
pub fn validate_sign_in(email: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, email.trim());
    if password.is_empty() {
        add(&mut errors, "password", "This field is required");
    }
    errors
}

pub fn validate_sign_up(full_name: &str, email: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let name_len = full_name.trim().chars().count();
    if name_len < FULL_NAME_LENGTH.0 || name_len > FULL_NAME_LENGTH.1 {
        add(
            &mut errors,
            "fullName",
            &format!(
                "Full name must be between {} and {} characters",
                FULL_NAME_LENGTH.0, FULL_NAME_LENGTH.1
            ),
        );
    }

    check_email(&mut errors, email.trim());

    let password_len = password.chars().count();
    if password_len < PASSWORD_LENGTH.0 || password_len > PASSWORD_LENGTH.1 {
        add(
            &mut errors,
            "password",
            &format!(
                "Password must be between {} and {} characters",
                PASSWORD_LENGTH.0, PASSWORD_LENGTH.1
            ),
        );
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        add(&mut errors, "password", "Password must contain an uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        add(&mut errors, "password", "Password must contain a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        add(&mut errors, "password", "Password must contain a number");
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        add(&mut errors, "password", "Password must contain a special character");
    }

    errors
}
