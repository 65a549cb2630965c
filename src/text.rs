//! Text normalization for answer comparison

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Strip diacritics by decomposing (NFD) and dropping combining marks.
///
/// `"créancier"` becomes `"creancier"`, `"Ça"` becomes `"Ca"`.
pub fn remove_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Normalize text for comparison: lowercase, no accents, trimmed, single spaces.
///
/// Total and idempotent; the empty string maps to itself.
pub fn normalize_text(s: &str) -> String {
    remove_accents(&s.to_lowercase())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// ============= Python Binding =============

#[cfg(feature = "python")]
#[pyo3::pyfunction]
#[pyo3(name = "normalize_text")]
pub fn py_normalize_text(s: &str) -> String {
    normalize_text(s)
}
