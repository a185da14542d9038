//! Worksheet-to-dashboard membership from dashboard zones

use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

use crate::reader::Element;
use crate::records::NO_DASHBOARD;

#[derive(Debug, Clone, Default)]
pub struct DashboardMembership {
    /// Zone (worksheet) name -> name of the last dashboard that embeds it
    pub worksheet_dashboards: HashMap<String, String>,
    /// Distinct dashboard names, in document order
    pub dashboards: IndexSet<String>,
    /// Dependency column count per dashboard
    pub filter_usages: IndexMap<String, usize>,
    /// Dependency columns across all dashboards, not deduplicated
    pub total_filter_usages: usize,
}

impl DashboardMembership {
    /// Dashboard embedding the worksheet, or `"No Dashboard"`
    pub fn dashboard_for(&self, worksheet: &str) -> &str {
        self.worksheet_dashboards
            .get(worksheet)
            .map(String::as_str)
            .unwrap_or(NO_DASHBOARD)
    }
}

/// Scan every `dashboard` element for named zones and dependency columns
pub fn resolve_dashboard_membership(root: &Element) -> DashboardMembership {
    let mut membership = DashboardMembership::default();

    for dashboard in root.descendants_named("dashboard") {
        let Some(dashboard_name) = dashboard.attr("name") else {
            continue;
        };
        membership.dashboards.insert(dashboard_name.to_string());

        for zone in dashboard.descendants_named("zone") {
            if let Some(zone_name) = zone.attr("name") {
                membership
                    .worksheet_dashboards
                    .insert(zone_name.to_string(), dashboard_name.to_string());
            }
        }

        let usages = count_dependency_columns(dashboard);
        *membership
            .filter_usages
            .entry(dashboard_name.to_string())
            .or_default() += usages;
        membership.total_filter_usages += usages;
    }

    log::debug!(
        "dashboards: {} found, {} zone memberships, {} filter usages",
        membership.dashboards.len(),
        membership.worksheet_dashboards.len(),
        membership.total_filter_usages
    );
    membership
}

fn count_dependency_columns(dashboard: &Element) -> usize {
    dashboard
        .descendants_named("datasource-dependencies")
        .map(|deps| deps.children_named("column").count())
        .sum()
}
