//! Short code generation and format validation.
//!
//! Codes are 8 characters from the URL-safe base64 alphabet
//! (`A-Z a-z 0-9 - _`). Uniqueness is ultimately enforced by the database
//! constraint on `short_urls.code`; generation only has to make collisions
//! rare enough that the constraint-violation retry path almost never runs.

use regex::Regex;
use std::sync::LazyLock;

use base64::Engine as _;

/// Length of random bytes before base64 encoding. 6 bytes encode to exactly
/// 8 URL-safe characters without padding.
const CODE_LENGTH_BYTES: usize = 6;

/// Length of a generated short code in characters.
pub const CODE_LENGTH: usize = 8;

/// Compiled format check for codes arriving on the redirect path.
static CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{8}$").unwrap());

/// Generates a cryptographically secure random short code.
///
/// Uses `getrandom` for entropy and encodes the result as URL-safe base64
/// without padding, producing an 8-character code.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
pub fn generate_code() -> String {
    let mut buffer = [0u8; CODE_LENGTH_BYTES];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer)
}

/// Returns true if `code` has the exact shape of a generated short code.
///
/// Used on the redirect path so malformed paths never reach the store.
pub fn is_valid_code(code: &str) -> bool {
    CODE_REGEX.is_match(code)
}
