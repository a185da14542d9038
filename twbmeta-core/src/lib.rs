//! twbmeta-core: metadata extraction for Tableau workbooks
//!
//! Resolves the internal identifiers of a `.twb` document (datasources,
//! columns, worksheets, dashboards) to their display captions and produces
//! three tables: worksheets, datasource fields and a per-workbook summary.

pub mod config;
pub mod error;
pub mod extract;
pub mod reader;
pub mod records;
pub mod translate;
pub mod writer;

use rayon::prelude::*;
use std::path::Path;

pub use config::ExtractorConfig;
pub use error::ExtractError;
pub use extract::{BatchExtraction, DocumentExtraction, DocumentSpan};
pub use records::{DatasourceFieldRecord, SummaryRecord, TranslatedFormula, WorksheetRecord};
pub use translate::{FormulaTranslator, TranslationError};

/// Main extraction interface
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    /// Create a new extractor with default configuration
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    /// Create a new extractor with custom configuration
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract a workbook file (`.twb` or `.twbx`)
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<DocumentExtraction, ExtractError> {
        let document = reader::read_document(path)?;
        Ok(extract::extract_document(&document, &self.config.global))
    }

    /// Extract workbook XML held in memory; `id` labels the document in errors
    pub fn extract_bytes(&self, id: &str, bytes: &[u8]) -> Result<DocumentExtraction, ExtractError> {
        let document = reader::parse_document(id, bytes)?;
        Ok(extract::extract_document(&document, &self.config.global))
    }

    /// Extract several files independently and concatenate their records.
    ///
    /// A document that fails is reported in `failures`; the others are still extracted.
    pub fn extract_batch<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> BatchExtraction {
        let results: Vec<_> = if self.config.global.parallel {
            paths.par_iter().map(|p| self.extract_file(p)).collect()
        } else {
            paths.iter().map(|p| self.extract_file(p)).collect()
        };

        let mut batch = BatchExtraction::default();
        for result in results {
            batch.push(result);
        }
        batch
    }

    /// Translate the formulas of the calculated fields
    pub fn translate(
        &self,
        fields: &[DatasourceFieldRecord],
        translator: &dyn FormulaTranslator,
    ) -> Vec<TranslatedFormula> {
        translate::translate_fields(fields, translator, self.config.global.parallel)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}
