//! Output records produced by extraction

use serde::{Deserialize, Serialize};

pub const NO_DASHBOARD: &str = "No Dashboard";
pub const NO_DATA_SOURCE: &str = "No Data Source";
pub const NO_FORMULA: &str = "No Formula";
pub const NO_TITLE: &str = "No Title";
pub const NO_SLICES: &str = "No Slices";
pub const NO_ROWS: &str = "No Rows";
pub const NO_COLUMNS: &str = "No Columns";
pub const NO_FIELDS: &str = "No Fields";
pub const UNKNOWN: &str = "Unknown";
pub const UNKNOWN_WORKBOOK: &str = "Unknown Workbook";
pub const UNKNOWN_WORKSHEET: &str = "Unknown Worksheet";

/// A record that can be rendered as a row of a delimited table
pub trait TableRow {
    /// Header row, in column order
    const HEADERS: &'static [&'static str];

    /// Cell values, in the same order as [`TableRow::HEADERS`]
    fn cells(&self) -> Vec<String>;
}

/// One worksheet with every reference resolved to captions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetRecord {
    pub workbook_name: String,
    pub dashboard_name: String,
    pub worksheet_name: String,
    pub title: String,
    pub data_source: String,
    /// Captions of the fields the worksheet depends on, in dependency order
    pub fields: String,
    pub slices: String,
    pub rows: String,
    pub columns: String,
    pub chart_type: String,
}

impl TableRow for WorksheetRecord {
    const HEADERS: &'static [&'static str] = &[
        "Workbook Name",
        "Dashboard Name",
        "Worksheet Name",
        "Worksheet Title",
        "Data Source",
        "Slices",
        "Rows",
        "Columns",
        "Chart Type",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.workbook_name.clone(),
            self.dashboard_name.clone(),
            self.worksheet_name.clone(),
            self.title.clone(),
            self.data_source.clone(),
            self.slices.clone(),
            self.rows.clone(),
            self.columns.clone(),
            self.chart_type.clone(),
        ]
    }
}

/// One distinct column and the datasource it is attributed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceFieldRecord {
    pub datasource_caption: String,
    pub column_name: String,
    pub column_caption: String,
    pub datatype: String,
    pub formula: String,
    pub is_calculated: bool,
}

impl TableRow for DatasourceFieldRecord {
    const HEADERS: &'static [&'static str] = &[
        "Datasource Caption",
        "Column Name",
        "Column Caption",
        "Column Datatype",
        "Formula",
        "Calculated Column(Yes/No)",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.datasource_caption.clone(),
            self.column_name.clone(),
            self.column_caption.clone(),
            self.datatype.clone(),
            self.formula.clone(),
            if self.is_calculated { "Yes" } else { "No" }.to_string(),
        ]
    }
}

/// Workbook-level counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub workbook_name: String,
    pub dashboards: usize,
    pub datasources: usize,
    pub worksheets: usize,
    pub calculated_columns: usize,
    pub dashboard_filters: usize,
}

impl SummaryRecord {
    /// Counters in table order: dashboards, datasources, worksheets, calculated columns, dashboard filters
    pub fn counts(&self) -> (usize, usize, usize, usize, usize) {
        (
            self.dashboards,
            self.datasources,
            self.worksheets,
            self.calculated_columns,
            self.dashboard_filters,
        )
    }
}

impl TableRow for SummaryRecord {
    const HEADERS: &'static [&'static str] = &[
        "Workbook Name",
        "# of Dashboards",
        "# of Datasources",
        "# of Worksheets",
        "# of Calculated Columns",
        "# of Dashboard Filters",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.workbook_name.clone(),
            self.dashboards.to_string(),
            self.datasources.to_string(),
            self.worksheets.to_string(),
            self.calculated_columns.to_string(),
            self.dashboard_filters.to_string(),
        ]
    }
}

/// A calculated field's formula after the translation stage.
///
/// `translated` holds either the translated expression or an `"Error: "` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedFormula {
    pub datasource_caption: String,
    pub column_caption: String,
    pub formula: String,
    pub translated: String,
}

impl TableRow for TranslatedFormula {
    const HEADERS: &'static [&'static str] = &[
        "Datasource Caption",
        "Column Caption",
        "Formula",
        "Translated Formula",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.datasource_caption.clone(),
            self.column_caption.clone(),
            self.formula.clone(),
            self.translated.clone(),
        ]
    }
}
