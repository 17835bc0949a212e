//! core::naming
//!
//! Sanitization of human-supplied names into filesystem- and branch-safe
//! tokens.
//!
//! # Design
//!
//! `safe_name` folds input to ASCII via NFKD decomposition (accented letters
//! keep their base letter, everything else non-ASCII is dropped), then
//! restricts the result to a small allow-list. The output is used both as a
//! file-name segment and as a branch-name segment, so the allow-list is the
//! intersection of what both accept.

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Sanitization left nothing usable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("name '{0}' contains no filesystem-safe characters")]
pub struct InvalidNameError(pub String);

/// Characters allowed in a sanitized name besides ASCII letters and digits.
const ALLOWED_PUNCT: &[char] = &['-', '_', '.', '(', ')', ' '];

/// Convert a string into a safe file- or branch-name segment.
///
/// Whitespace is replaced with `whitespace_replacement` (callers pass `"_"`
/// for file names and `"-"` for branch names). Leading and trailing spaces
/// and periods are stripped before replacement, so a name cannot smuggle in
/// hidden-file dots or trailing padding.
///
/// # Errors
///
/// Returns [`InvalidNameError`] if nothing survives sanitization.
///
/// # Example
///
/// ```
/// use commentarium::core::naming::safe_name;
///
/// assert_eq!(safe_name("Jane Doe", "_").unwrap(), "Jane_Doe");
/// assert_eq!(safe_name("café_ä", "_").unwrap(), "cafe_a");
/// assert_eq!(safe_name("this is a test", "-").unwrap(), "this-is-a-test");
/// ```
pub fn safe_name(name: &str, whitespace_replacement: &str) -> Result<String, InvalidNameError> {
    // NFKD decomposition separates base letters from combining marks; the
    // ASCII filter then drops the marks along with any other non-ASCII char.
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();

    let stripped = ascii.trim_matches(|c| c == ' ' || c == '.');
    let replaced = stripped.replace(' ', whitespace_replacement);

    let cleaned: String = replaced
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || ALLOWED_PUNCT.contains(c))
        .collect();

    // Filtering can expose a new edge dot ("a.<" leaves "a."), so trim again.
    let cleaned = cleaned.trim_matches(|c| c == ' ' || c == '.');

    if cleaned.is_empty() {
        return Err(InvalidNameError(name.to_string()));
    }

    Ok(cleaned.to_string())
}
