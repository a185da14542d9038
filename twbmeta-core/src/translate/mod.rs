//! Formula translation stage
//!
//! Translation runs after extraction over the calculated fields. Each field is
//! translated independently; a failure becomes an `"Error: ..."` string on that
//! field and never stops the stage.

use rayon::prelude::*;
use thiserror::Error;

use crate::config::TranslationConfig;
use crate::records::{DatasourceFieldRecord, TranslatedFormula};

#[cfg(feature = "http-translation")]
mod http;

#[cfg(feature = "http-translation")]
pub use http::HttpTranslator;

/// Prefix of the sentinel stored when a translation fails
pub const ERROR_PREFIX: &str = "Error: ";

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Response(String),
    #[error("translation unavailable: {0}")]
    Unavailable(String),
}

/// Text-in/text-out translation of a formula into another expression language
pub trait FormulaTranslator: Send + Sync {
    fn translate(&self, formula: &str) -> Result<String, TranslationError>;
}

/// Translate one formula, turning a failure into the error sentinel
pub fn translate_or_sentinel(translator: &dyn FormulaTranslator, formula: &str) -> String {
    match translator.translate(formula) {
        Ok(translated) => translated,
        Err(e) => {
            log::warn!("formula translation failed: {}", e);
            format!("{}{}", ERROR_PREFIX, e)
        }
    }
}

/// Translate the formula of every calculated field.
///
/// Results are attached to their field by position, whatever order the calls complete in.
pub fn translate_fields(
    fields: &[DatasourceFieldRecord],
    translator: &dyn FormulaTranslator,
    parallel: bool,
) -> Vec<TranslatedFormula> {
    let calculated: Vec<&DatasourceFieldRecord> =
        fields.iter().filter(|f| f.is_calculated).collect();
    log::debug!("translating {} calculated fields", calculated.len());

    let translated: Vec<String> = if parallel {
        calculated
            .par_iter()
            .map(|field| translate_or_sentinel(translator, &field.formula))
            .collect()
    } else {
        calculated
            .iter()
            .map(|field| translate_or_sentinel(translator, &field.formula))
            .collect()
    };

    calculated
        .into_iter()
        .zip(translated)
        .map(|(field, translated)| TranslatedFormula {
            datasource_caption: field.datasource_caption.clone(),
            column_caption: field.column_caption.clone(),
            formula: field.formula.clone(),
            translated,
        })
        .collect()
}

/// Build the translator described by the configuration
#[cfg(feature = "http-translation")]
pub fn translator_from_config(
    config: &TranslationConfig,
) -> Result<Box<dyn FormulaTranslator>, TranslationError> {
    Ok(Box::new(HttpTranslator::new(config)?))
}

#[cfg(not(feature = "http-translation"))]
pub fn translator_from_config(
    _config: &TranslationConfig,
) -> Result<Box<dyn FormulaTranslator>, TranslationError> {
    Err(TranslationError::Unavailable(
        "built without the http-translation feature".to_string(),
    ))
}
