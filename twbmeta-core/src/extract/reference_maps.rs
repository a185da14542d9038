//! Lookup tables from internal identifiers to display captions

use indexmap::IndexMap;

use super::formula::{resolve_formula, unresolved_references};
use crate::reader::Element;
use crate::reader::parser_utils::normalize_identifier;
use crate::records::UNKNOWN;

/// Datasource identifier -> caption, in first-insertion order
pub type DatasourceMap = IndexMap<String, String>;

/// Normalized column identifier -> column details, in first-insertion order
pub type ColumnMap = IndexMap<String, ColumnInfo>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub caption: String,
    pub datatype: String,
    /// Formula with known identifiers replaced by captions, or `"No Formula"`
    pub formula: String,
    /// Identifier of the datasource the column was last declared under
    pub datasource: Option<String>,
}

/// Both lookup tables of one document
#[derive(Debug, Clone, Default)]
pub struct ReferenceMaps {
    pub datasources: DatasourceMap,
    pub columns: ColumnMap,
}

impl ReferenceMaps {
    /// Caption of a datasource, falling back to the identifier itself
    pub fn datasource_caption<'a>(&'a self, identifier: &'a str) -> &'a str {
        self.datasources
            .get(identifier)
            .map(String::as_str)
            .unwrap_or(identifier)
    }

    /// Caption of a normalized column identifier, falling back to the identifier itself
    pub fn column_caption<'a>(&'a self, identifier: &'a str) -> &'a str {
        self.columns
            .get(identifier)
            .map(|c| c.caption.as_str())
            .unwrap_or(identifier)
    }
}

/// Build the datasource and column tables in one forward walk of the document.
///
/// Column formulas are resolved against the columns seen so far, so a formula
/// referencing a column declared later keeps that reference bracketed.
pub fn build_reference_maps(root: &Element) -> ReferenceMaps {
    let datasources = build_datasource_map(root);
    let mut columns = ColumnMap::new();
    collect_columns(root, None, &mut columns);

    log::debug!(
        "reference maps: {} datasources, {} columns",
        datasources.len(),
        columns.len()
    );
    ReferenceMaps {
        datasources,
        columns,
    }
}

/// Map every `datasource` element that has both a name and a caption
pub fn build_datasource_map(root: &Element) -> DatasourceMap {
    let mut map = DatasourceMap::new();
    for datasource in root.descendants_named("datasource") {
        if let (Some(name), Some(caption)) = (datasource.attr("name"), datasource.attr("caption"))
            && !name.is_empty()
            && !caption.is_empty()
        {
            map.insert(name.to_string(), caption.to_string());
        }
    }
    map
}

fn collect_columns<'a>(element: &'a Element, owner: Option<&'a str>, columns: &mut ColumnMap) {
    for child in element.child_elements() {
        if child.name == "column" {
            record_column(child, owner, columns);
        }

        let child_owner = match child.name.as_str() {
            "datasource" => child.attr("name").or(owner),
            "datasource-dependencies" => child.attr("datasource").or(owner),
            _ => owner,
        };
        collect_columns(child, child_owner, columns);
    }
}

fn record_column(column: &Element, owner: Option<&str>, columns: &mut ColumnMap) {
    let identifier = normalize_identifier(column.attr("name"));
    if identifier.is_empty() {
        return;
    }

    let caption = column
        .attr("caption")
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| identifier.clone());
    let datatype = column
        .attr("datatype")
        .filter(|d| !d.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string();

    let raw_formula = column
        .first_child("calculation")
        .and_then(|calc| calc.attr("formula"));
    let formula = resolve_formula(raw_formula, columns);
    if raw_formula.is_some() {
        let pending = unresolved_references(&formula);
        if !pending.is_empty() {
            log::debug!(
                "column '{}' keeps unresolved references: {}",
                identifier,
                pending.join(", ")
            );
        }
    }

    columns.insert(
        identifier,
        ColumnInfo {
            caption,
            datatype,
            formula,
            datasource: owner.map(str::to_string),
        },
    );
}
