//! Input validation for the hub API.
//!
//! Library names are display names, so they may contain spaces and
//! punctuation; addresses must be plain http(s) URLs. Validators return
//! the first failure, and handlers surface it as a 400 response.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// Regex for peer and library addresses. Scheme plus any non-whitespace
/// remainder; finer URL parsing is left to the HTTP client.
pub static ADDRESS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://\S+$").expect("Invalid regex"));

/// Maximum lengths for various fields.
pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_ADDRESS_LENGTH: usize = 300;
pub const MAX_TITLE_LENGTH: usize = 256;
pub const MAX_DESCRIPTION_LENGTH: usize = 4000;
pub const MAX_TAG_LENGTH: usize = 64;
pub const MAX_TAGS: usize = 32;

/// The human-readable message carried by a validation error.
pub fn error_message(err: &ValidationError) -> String {
    err.message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| err.code.to_string())
}

/// Validate a library or peer display name.
pub fn validate_library_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("length");
        err.message = Some("Name cannot be empty".into());
        return Err(err);
    }

    if name.len() > MAX_NAME_LENGTH {
        let mut err = ValidationError::new("length");
        err.message = Some(format!("Name must be at most {} characters", MAX_NAME_LENGTH).into());
        return Err(err);
    }

    if name.chars().any(|c| c.is_control()) {
        let mut err = ValidationError::new("pattern");
        err.message = Some("Name cannot contain control characters".into());
        return Err(err);
    }

    Ok(())
}

/// Validate a peer or library address.
pub fn validate_address(url: &str) -> Result<(), ValidationError> {
    if url.trim().is_empty() {
        let mut err = ValidationError::new("length");
        err.message = Some("URL cannot be empty".into());
        return Err(err);
    }

    if url.len() > MAX_ADDRESS_LENGTH {
        let mut err = ValidationError::new("length");
        err.message =
            Some(format!("URL must be at most {} characters", MAX_ADDRESS_LENGTH).into());
        return Err(err);
    }

    if !ADDRESS_REGEX.is_match(url) {
        let mut err = ValidationError::new("pattern");
        err.message = Some("URL must be an http(s) address".into());
        return Err(err);
    }

    Ok(())
}

/// Validate a registration tag list.
pub fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        let mut err = ValidationError::new("length");
        err.message = Some(format!("At most {} tags are allowed", MAX_TAGS).into());
        return Err(err);
    }

    for tag in tags {
        if tag.len() > MAX_TAG_LENGTH {
            let mut err = ValidationError::new("length");
            err.message =
                Some(format!("Tags must be at most {} characters", MAX_TAG_LENGTH).into());
            return Err(err);
        }
    }

    Ok(())
}

/// Validate a feedback submission.
pub fn validate_feedback(title: &str, description: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() || description.trim().is_empty() {
        let mut err = ValidationError::new("length");
        err.message = Some("Title and description cannot be empty".into());
        return Err(err);
    }

    if title.len() > MAX_TITLE_LENGTH {
        let mut err = ValidationError::new("length");
        err.message = Some(format!("Title must be at most {} characters", MAX_TITLE_LENGTH).into());
        return Err(err);
    }

    if description.len() > MAX_DESCRIPTION_LENGTH {
        let mut err = ValidationError::new("length");
        err.message = Some(
            format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_LENGTH
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}
