//! Common parsing utilities shared by the extraction stages

/// Canonicalize a raw identifier: drop every `[` and `]`, then trim whitespace.
///
/// An absent identifier normalizes to the empty string.
pub fn normalize_identifier(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => raw.replace(['[', ']'], "").trim().to_string(),
        None => String::new(),
    }
}

/// Wrap an identifier in Tableau's bracket delimiters
pub fn bracketed(identifier: &str) -> String {
    format!("[{}]", identifier)
}

/// Join items with `", "`, or return the sentinel when there are none
pub fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}
