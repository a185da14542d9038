//! Identifier-to-caption substitution for formulas and shelf expressions
//!
//! Substitution is plain substring replacement over the lookup tables in
//! insertion order. When one identifier is a substring of another's bracketed
//! form, the result depends on that order; callers rely on it staying stable.

use regex::Regex;
use std::sync::OnceLock;

use super::reference_maps::{ColumnMap, DatasourceMap};
use crate::reader::parser_utils::bracketed;
use crate::records::NO_FORMULA;

/// Resolve a raw formula against the column table.
///
/// An absent formula yields `"No Formula"`.
pub fn resolve_formula(text: Option<&str>, columns: &ColumnMap) -> String {
    match text {
        Some(text) => substitute_captions(text, columns),
        None => NO_FORMULA.to_string(),
    }
}

/// Replace every `[identifier]` with the column caption (unbracketed)
pub fn substitute_captions(text: &str, columns: &ColumnMap) -> String {
    let mut resolved = text.to_string();
    for (identifier, info) in columns {
        let pattern = bracketed(identifier);
        if resolved.contains(&pattern) {
            resolved = resolved.replace(&pattern, &info.caption);
        }
    }
    resolved
}

/// Replace a leading `[datasource].` with `[caption].` for every known datasource.
///
/// Only an anchored prefix is rewritten; occurrences later in the text are left alone.
pub fn resolve_datasource_prefix(text: &str, datasources: &DatasourceMap) -> String {
    let mut resolved = text.to_string();
    for (identifier, caption) in datasources {
        let prefix = format!("[{}].", identifier);
        if let Some(rest) = resolved.strip_prefix(&prefix) {
            resolved = format!("[{}].{}", caption, rest);
        }
    }
    resolved
}

/// Replace every bare occurrence of a column identifier with its caption
pub fn replace_identifiers(text: &str, columns: &ColumnMap) -> String {
    let mut resolved = text.to_string();
    for (identifier, info) in columns {
        if identifier != &info.caption && resolved.contains(identifier.as_str()) {
            resolved = resolved.replace(identifier.as_str(), &info.caption);
        }
    }
    resolved
}

/// Bracketed references still present in a resolved text
pub fn unresolved_references(text: &str) -> Vec<&str> {
    static REFERENCE: OnceLock<Regex> = OnceLock::new();
    let re = REFERENCE.get_or_init(|| Regex::new(r"\[([^\[\]]+)\]").unwrap());

    re.captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}
