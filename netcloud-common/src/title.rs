//! Title normalization
//!
//! Announcements and videos are paired purely on the normalized form of the
//! title, so this function must stay deterministic and total.

/// Canonical matching key for a movie title.
///
/// Transliterates to ASCII, drops everything outside `[A-Za-z0-9 ]`,
/// collapses whitespace runs, trims and lowercases.
///
/// ```
/// use netcloud_common::normalize;
/// assert_eq!(normalize("  Amélie!  "), "amelie");
/// ```
pub fn normalize(raw: &str) -> String {
    let ascii = deunicode::deunicode(raw);

    let kept: String = ascii
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();

    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}
