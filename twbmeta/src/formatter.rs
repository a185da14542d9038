//! Output formatters for extraction results

use anyhow::Result;
use colored::*;
use std::collections::BTreeMap;
use twbmeta_core::records::NO_DASHBOARD;
use twbmeta_core::translate::ERROR_PREFIX;
use twbmeta_core::{BatchExtraction, TranslatedFormula, WorksheetRecord};

/// Print extraction results per document, grouped by dashboard
pub fn print_human(batch: &BatchExtraction, translations: Option<&[TranslatedFormula]>) {
    for span in &batch.documents {
        for summary in batch.document_summaries(span) {
            println!(
                "{} {} {}",
                "Workbook:".bold(),
                summary.workbook_name.cyan().bold(),
                format!("({})", span.document).bright_black()
            );
            println!(
                "  {} dashboards, {} datasources, {} worksheets, {} calculated columns, {} dashboard filters",
                summary.dashboards,
                summary.datasources,
                summary.worksheets,
                summary.calculated_columns,
                summary.dashboard_filters
            );
        }

        for (dashboard, sheets) in group_by_dashboard(batch.document_worksheets(span)) {
            let label = if dashboard == NO_DASHBOARD {
                dashboard.bright_black()
            } else {
                dashboard.yellow()
            };
            println!("  {} {}", "Dashboard:".bold(), label);
            for sheet in sheets {
                print_worksheet(sheet, 2);
            }
        }
        println!();
    }

    let calculated: Vec<_> = batch
        .fields
        .iter()
        .filter(|f| f.is_calculated)
        .collect();
    if !calculated.is_empty() {
        println!("{}", "Calculated fields:".bold().underline());
        for field in calculated {
            println!(
                "  {} [{}] {}",
                field.column_caption.green(),
                field.datasource_caption.bright_black(),
                field.formula
            );
        }
        println!();
    }

    if let Some(translations) = translations
        && !translations.is_empty()
    {
        println!("{}", "Translated formulas:".bold().underline());
        for translation in translations {
            let translated = if translation.translated.starts_with(ERROR_PREFIX) {
                translation.translated.red()
            } else {
                translation.translated.normal()
            };
            println!("  {} => {}", translation.column_caption.green(), translated);
        }
        println!();
    }

    if batch.failures.is_empty() {
        println!(
            "{}",
            format!("✓ Extracted {} workbook(s)", batch.summaries.len())
                .green()
                .bold()
        );
    } else {
        println!("{}", "Failures:".red().bold().underline());
        for failure in &batch.failures {
            println!("  {} {}", "ERROR".red().bold(), failure);
        }
    }
}

/// Worksheets of one document keyed by dashboard name
fn group_by_dashboard(sheets: &[WorksheetRecord]) -> BTreeMap<&str, Vec<&WorksheetRecord>> {
    let mut dashboards: BTreeMap<&str, Vec<&WorksheetRecord>> = BTreeMap::new();
    for sheet in sheets {
        dashboards
            .entry(sheet.dashboard_name.as_str())
            .or_default()
            .push(sheet);
    }
    dashboards
}

fn print_worksheet(sheet: &WorksheetRecord, indent: usize) {
    let indent_str = "  ".repeat(indent);
    println!(
        "{}{} [{}] {}",
        indent_str,
        sheet.worksheet_name.bold(),
        sheet.chart_type.bright_black(),
        sheet.data_source
    );
    println!("{}  rows: {}", indent_str, sheet.rows);
    println!("{}  columns: {}", indent_str, sheet.columns);
}

/// Print all record tables in JSON format
pub fn print_json(batch: &BatchExtraction, translations: Option<&[TranslatedFormula]>) -> Result<()> {
    let failures: Vec<_> = batch
        .failures
        .iter()
        .map(|e| {
            serde_json::json!({
                "document": e.document(),
                "error": e.to_string(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "worksheets": batch.worksheets,
        "fields": batch.fields,
        "summaries": batch.summaries,
        "translations": translations,
        "failures": failures,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
