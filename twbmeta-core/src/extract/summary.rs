//! Workbook-level summary counters

use super::dashboards::DashboardMembership;
use super::reference_maps::ReferenceMaps;
use crate::reader::Element;
use crate::records::{DatasourceFieldRecord, SummaryRecord};

/// Workbook name from `repository-location@id`, without its trailing `_<suffix>` segment
pub fn workbook_name(root: &Element) -> Option<String> {
    let id = root
        .descendants_named("repository-location")
        .find_map(|location| location.attr("id"))?;
    let name = match id.rsplit_once('_') {
        Some((name, _suffix)) => name,
        None => id,
    };
    Some(name.to_string())
}

pub fn summarize(
    workbook_name: &str,
    root: &Element,
    maps: &ReferenceMaps,
    membership: &DashboardMembership,
    fields: &[DatasourceFieldRecord],
) -> SummaryRecord {
    SummaryRecord {
        workbook_name: workbook_name.to_string(),
        dashboards: membership.dashboards.len(),
        datasources: maps.datasources.len(),
        worksheets: root.descendants_named("worksheet").count(),
        calculated_columns: fields.iter().filter(|f| f.is_calculated).count(),
        dashboard_filters: membership.total_filter_usages,
    }
}
