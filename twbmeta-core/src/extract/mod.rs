//! Metadata resolution stages
//!
//! The stages run in dependency order over one document: reference maps and
//! dashboard membership first, then worksheet and field records, then the
//! summary that counts over both.

pub mod dashboards;
pub mod datasources;
pub mod formula;
pub mod reference_maps;
pub mod summary;
pub mod worksheets;

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::config::GlobalConfig;
use crate::error::ExtractError;
use crate::reader::WorkbookDocument;
use crate::records::{DatasourceFieldRecord, SummaryRecord, UNKNOWN_WORKBOOK, WorksheetRecord};

pub use dashboards::{DashboardMembership, resolve_dashboard_membership};
pub use datasources::build_field_records;
pub use formula::{resolve_datasource_prefix, resolve_formula};
pub use reference_maps::{ColumnInfo, ColumnMap, DatasourceMap, ReferenceMaps, build_reference_maps};
pub use summary::summarize;
pub use worksheets::build_worksheet_records;

/// The three record sets of one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentExtraction {
    /// Identifier of the source document
    pub document: String,
    pub worksheets: Vec<WorksheetRecord>,
    pub fields: Vec<DatasourceFieldRecord>,
    pub summary: Vec<SummaryRecord>,
}

/// Position of one document's records inside the concatenated tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSpan {
    pub document: String,
    pub worksheets: Range<usize>,
    pub fields: Range<usize>,
    pub summaries: Range<usize>,
}

/// Record sets of several documents, concatenated in input order
#[derive(Debug, Default)]
pub struct BatchExtraction {
    pub worksheets: Vec<WorksheetRecord>,
    pub fields: Vec<DatasourceFieldRecord>,
    pub summaries: Vec<SummaryRecord>,
    /// One span per extracted document, in input order
    pub documents: Vec<DocumentSpan>,
    /// Documents that could not be extracted
    pub failures: Vec<ExtractError>,
}

impl BatchExtraction {
    pub fn push(&mut self, result: Result<DocumentExtraction, ExtractError>) {
        match result {
            Ok(extraction) => {
                let worksheets = extend(&mut self.worksheets, extraction.worksheets);
                let fields = extend(&mut self.fields, extraction.fields);
                let summaries = extend(&mut self.summaries, extraction.summary);
                self.documents.push(DocumentSpan {
                    document: extraction.document,
                    worksheets,
                    fields,
                    summaries,
                });
            }
            Err(e) => {
                log::warn!("{}", e);
                self.failures.push(e);
            }
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Worksheet records of one extracted document
    pub fn document_worksheets(&self, span: &DocumentSpan) -> &[WorksheetRecord] {
        &self.worksheets[span.worksheets.clone()]
    }

    /// Summary records of one extracted document
    pub fn document_summaries(&self, span: &DocumentSpan) -> &[SummaryRecord] {
        &self.summaries[span.summaries.clone()]
    }
}

fn extend<T>(table: &mut Vec<T>, records: Vec<T>) -> Range<usize> {
    let start = table.len();
    table.extend(records);
    start..table.len()
}

/// Run every stage over a parsed document
pub fn extract_document(document: &WorkbookDocument, options: &GlobalConfig) -> DocumentExtraction {
    let root = &document.root;
    let name = summary::workbook_name(root)
        .or_else(|| {
            options
                .workbook_name_from_file
                .then(|| document.file_stem().map(str::to_string))
                .flatten()
        })
        .unwrap_or_else(|| UNKNOWN_WORKBOOK.to_string());
    log::debug!("{}: extracting workbook '{}'", document.id, name);

    let maps = build_reference_maps(root);
    let membership = resolve_dashboard_membership(root);
    let worksheets = build_worksheet_records(root, &name, &maps, &membership);
    let fields = build_field_records(&maps);
    let summary = summarize(&name, root, &maps, &membership, &fields);

    DocumentExtraction {
        document: document.id.clone(),
        worksheets,
        fields,
        summary: vec![summary],
    }
}
