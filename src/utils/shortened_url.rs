//! Shortened key validation.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use validator::ValidationError;

/// Minimum key length.
pub const MIN_LENGTH: usize = 3;

/// Maximum key length.
pub const MAX_LENGTH: usize = 10;

/// Allowed key alphabet.
pub static SHORTENED_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\-_]+$").expect("valid shortened url regex"));

/// Keys that collide with static routes under `/links`.
const RESERVED_KEYS: &[&str] = &["export"];

/// Validates a shortened key.
///
/// # Rules
///
/// - Length: 3-10 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
/// - Cannot be a reserved route segment
///
/// Usable as a `validator` custom function.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_shortened_url("my-link").is_ok());
/// assert!(validate_shortened_url("ab").is_err());         // Too short
/// assert!(validate_shortened_url("has space").is_err());  // Invalid character
/// assert!(validate_shortened_url("export").is_err());     // Reserved
/// ```
pub fn validate_shortened_url(key: &str) -> Result<(), ValidationError> {
    let length = key.chars().count();
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(ValidationError::new("length").with_message(Cow::Owned(format!(
            "Shortened URL must be {MIN_LENGTH}-{MAX_LENGTH} characters"
        ))));
    }

    if !SHORTENED_URL_REGEX.is_match(key) {
        return Err(ValidationError::new("charset").with_message(Cow::Borrowed(
            "Shortened URL can only contain letters, digits, hyphens and underscores",
        )));
    }

    if RESERVED_KEYS.contains(&key) {
        return Err(
            ValidationError::new("reserved").with_message(Cow::Borrowed("This key is reserved"))
        );
    }

    Ok(())
}
