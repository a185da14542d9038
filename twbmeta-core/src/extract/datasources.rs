//! Field records: one per distinct column, attributed to its datasource

use std::collections::HashSet;

use super::reference_maps::ReferenceMaps;
use crate::records::{DatasourceFieldRecord, NO_DATA_SOURCE, NO_FORMULA};

/// Emit every distinct column once.
///
/// Datasources are visited in table order and each emits the columns it owns;
/// a column already emitted is never repeated. Columns whose owner has no
/// caption entry follow, attributed to the owner's raw identifier.
pub fn build_field_records(maps: &ReferenceMaps) -> Vec<DatasourceFieldRecord> {
    let mut records = Vec::with_capacity(maps.columns.len());
    let mut seen: HashSet<&str> = HashSet::new();

    for (datasource, caption) in &maps.datasources {
        for (identifier, info) in &maps.columns {
            if info.datasource.as_deref() != Some(datasource.as_str()) {
                continue;
            }
            if seen.insert(identifier.as_str()) {
                records.push(field_record(caption, identifier, maps));
            }
        }
    }

    for (identifier, info) in &maps.columns {
        if seen.insert(identifier.as_str()) {
            let caption = info.datasource.as_deref().unwrap_or(NO_DATA_SOURCE);
            records.push(field_record(caption, identifier, maps));
        }
    }

    records
}

fn field_record(datasource_caption: &str, identifier: &str, maps: &ReferenceMaps) -> DatasourceFieldRecord {
    let info = &maps.columns[identifier];
    DatasourceFieldRecord {
        datasource_caption: datasource_caption.to_string(),
        column_name: identifier.to_string(),
        column_caption: info.caption.clone(),
        datatype: info.datatype.clone(),
        formula: info.formula.clone(),
        is_calculated: info.formula != NO_FORMULA,
    }
}
