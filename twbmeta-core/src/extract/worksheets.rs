//! Per-worksheet records with datasource, field and shelf references resolved

use super::dashboards::DashboardMembership;
use super::formula::{replace_identifiers, resolve_datasource_prefix, substitute_captions};
use super::reference_maps::ReferenceMaps;
use crate::reader::Element;
use crate::reader::parser_utils::{join_or, normalize_identifier};
use crate::records::{
    NO_COLUMNS, NO_DATA_SOURCE, NO_FIELDS, NO_ROWS, NO_SLICES, NO_TITLE, UNKNOWN,
    UNKNOWN_WORKSHEET, WorksheetRecord,
};

/// Build one record per `worksheet` element, in document order
pub fn build_worksheet_records(
    root: &Element,
    workbook_name: &str,
    maps: &ReferenceMaps,
    membership: &DashboardMembership,
) -> Vec<WorksheetRecord> {
    root.descendants_named("worksheet")
        .map(|worksheet| build_worksheet_record(worksheet, workbook_name, maps, membership))
        .collect()
}

pub fn build_worksheet_record(
    worksheet: &Element,
    workbook_name: &str,
    maps: &ReferenceMaps,
    membership: &DashboardMembership,
) -> WorksheetRecord {
    let worksheet_name = worksheet.attr("name").unwrap_or(UNKNOWN_WORKSHEET);
    let (data_source, fields) = resolve_binding(worksheet, maps);

    WorksheetRecord {
        workbook_name: workbook_name.to_string(),
        dashboard_name: membership.dashboard_for(worksheet_name).to_string(),
        worksheet_name: worksheet_name.to_string(),
        title: extract_title(worksheet),
        data_source: data_source.unwrap_or_else(|| NO_DATA_SOURCE.to_string()),
        fields: join_or(&fields, NO_FIELDS),
        slices: join_or(&resolve_slices(worksheet, maps), NO_SLICES),
        rows: resolve_shelf(worksheet, "rows", maps).unwrap_or_else(|| NO_ROWS.to_string()),
        columns: resolve_shelf(worksheet, "cols", maps).unwrap_or_else(|| NO_COLUMNS.to_string()),
        chart_type: worksheet
            .descendants_named("mark")
            .find_map(|mark| mark.attr("class"))
            .unwrap_or(UNKNOWN)
            .to_string(),
    }
}

/// First text run of the worksheet title
fn extract_title(worksheet: &Element) -> String {
    worksheet
        .descendants_named("title")
        .next()
        .and_then(|title| {
            title
                .descendants_named("run")
                .filter_map(|run| run.text())
                .map(|text| text.trim().to_string())
                .find(|text| !text.is_empty())
        })
        .unwrap_or_else(|| NO_TITLE.to_string())
}

/// Datasource caption (last dependency wins) and captions of the used fields
fn resolve_binding(worksheet: &Element, maps: &ReferenceMaps) -> (Option<String>, Vec<String>) {
    let mut data_source = None;
    let mut fields = Vec::new();

    for dependency in worksheet.descendants_named("datasource-dependencies") {
        if let Some(identifier) = dependency.attr("datasource") {
            data_source = Some(maps.datasource_caption(identifier).to_string());
        }
        for column in dependency.children_named("column") {
            let identifier = normalize_identifier(column.attr("name"));
            fields.push(maps.column_caption(&identifier).to_string());
        }
    }

    (data_source, fields)
}

fn resolve_slices(worksheet: &Element, maps: &ReferenceMaps) -> Vec<String> {
    worksheet
        .descendants_named("slices")
        .flat_map(|slices| slices.children_named("column"))
        .filter_map(|column| column.text())
        .map(|text| {
            let prefixed = resolve_datasource_prefix(text.trim(), &maps.datasources);
            substitute_captions(&prefixed, &maps.columns)
        })
        .collect()
}

/// Resolve a `rows` or `cols` shelf, or `None` when the shelf is empty.
///
/// A leading `none:` is stripped once from the joined expressions.
fn resolve_shelf(worksheet: &Element, shelf: &str, maps: &ReferenceMaps) -> Option<String> {
    let expressions: Vec<String> = worksheet
        .descendants_named(shelf)
        .filter_map(|element| element.text())
        .map(|text| resolve_shelf_expression(text.trim(), maps))
        .filter(|text| !text.is_empty())
        .collect();

    if expressions.is_empty() {
        return None;
    }
    let joined = expressions.join(", ");
    let joined = joined.strip_prefix("none:").unwrap_or(joined.as_str());
    Some(replace_identifiers(joined, &maps.columns))
}

fn resolve_shelf_expression(text: &str, maps: &ReferenceMaps) -> String {
    let resolved = substitute_captions(text, &maps.columns);
    let resolved = resolve_datasource_prefix(&resolved, &maps.datasources);
    let resolved = substitute_captions(&resolved, &maps.columns);
    normalize_identifier(Some(&resolved))
}
