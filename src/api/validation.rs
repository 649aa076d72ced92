use crate::api::errors::ApiError;
use crate::db::types::normalize_option_label;

pub(crate) const MIN_PASSWORD_LEN: usize = 6;
const MAX_USERNAME_LEN: usize = 50;

pub(crate) fn validate_username(username: &str) -> Result<(), ApiError> {
    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && username.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Username must be 1-{MAX_USERNAME_LEN} characters of letters, digits, '.', '_' or '-'"
        )))
    }
}

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

/// Normalizes a submitted option label to `A`..`E`.
pub(crate) fn option_label(raw: &str) -> Result<String, ApiError> {
    normalize_option_label(raw).ok_or_else(|| {
        ApiError::BadRequest(format!("Answer '{raw}' must be one of A, B, C, D or E"))
    })
}

/// Rejects option texts that repeat within a question, ignoring case and
/// surrounding whitespace.
pub(crate) fn validate_distinct_options(options: &[&str]) -> Result<(), ApiError> {
    let normalized: Vec<String> =
        options.iter().map(|option| option.trim().to_lowercase()).collect();

    for (index, option) in normalized.iter().enumerate() {
        if normalized[..index].contains(option) {
            return Err(ApiError::BadRequest(format!(
                "Option texts must be distinct; '{}' appears more than once",
                options[index].trim()
            )));
        }
    }

    Ok(())
}
