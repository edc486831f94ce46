//! Boundary validation: raw request fields in, typed values out.

use uuid::Uuid;

use homeswap_domain::otp::{OtpMethod, is_well_formed_otp};

use crate::error::ApiError;
use crate::usecase::password::validate_new_password;

/// Trimmed, non-empty.
pub fn required(field: &str, value: String) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}

/// `None` for absent or blank values.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Plausibility only: `local@domain.tld`, no whitespace.
pub fn email(value: String) -> Result<String, ApiError> {
    let value = required("email", value)?;
    let plausible = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .rsplit_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };
    if !plausible {
        return Err(ApiError::validation("email is invalid"));
    }
    Ok(value)
}

pub fn password(value: String) -> Result<String, ApiError> {
    validate_new_password(&value)?;
    Ok(value)
}

pub fn id(field: &str, value: &str) -> Result<Uuid, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation(format!("{field} must be a UUID")))
}

pub fn otp_method(value: &str) -> Result<OtpMethod, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::validation("method must be email or phone"))
}

pub fn otp_code(value: String) -> Result<String, ApiError> {
    let value = value.trim().to_owned();
    if !is_well_formed_otp(&value) {
        return Err(ApiError::validation("otp must be 4 digits"));
    }
    Ok(value)
}
