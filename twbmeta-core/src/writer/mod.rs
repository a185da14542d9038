//! Writer module for exporting extracted tables

mod csv_writer;

pub use csv_writer::{table_to_string, write_table};

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::extract::BatchExtraction;
use crate::records::{TableRow, TranslatedFormula};

pub const WORKSHEETS_FILE: &str = "worksheets.csv";
pub const FIELDS_FILE: &str = "datasources.csv";
pub const SUMMARY_FILE: &str = "summary.csv";
pub const TRANSLATIONS_FILE: &str = "translations.csv";

/// Write every table of a batch into `dir`, returning the files written
pub fn write_tables_to_dir<P: AsRef<Path>>(
    dir: P,
    extraction: &BatchExtraction,
    translations: Option<&[TranslatedFormula]>,
    delimiter: u8,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut written = vec![
        write_table_file(dir.join(WORKSHEETS_FILE), delimiter, &extraction.worksheets)?,
        write_table_file(dir.join(FIELDS_FILE), delimiter, &extraction.fields)?,
        write_table_file(dir.join(SUMMARY_FILE), delimiter, &extraction.summaries)?,
    ];
    if let Some(translations) = translations {
        written.push(write_table_file(
            dir.join(TRANSLATIONS_FILE),
            delimiter,
            translations,
        )?);
    }

    Ok(written)
}

fn write_table_file<R: TableRow>(path: PathBuf, delimiter: u8, rows: &[R]) -> Result<PathBuf> {
    let file = File::create(&path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    write_table(BufWriter::new(file), delimiter, rows)
        .with_context(|| format!("Failed to write table: {}", path.display()))?;
    log::debug!("wrote {} rows to {}", rows.len(), path.display());
    Ok(path)
}
