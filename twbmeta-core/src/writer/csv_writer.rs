//! Delimited-text export of record tables

use anyhow::Result;
use std::io::Write;

use crate::records::TableRow;

/// Write a header row followed by one row per record
pub fn write_table<W: Write, R: TableRow>(writer: W, delimiter: u8, rows: &[R]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    csv_writer.write_record(R::HEADERS)?;
    for row in rows {
        csv_writer.write_record(row.cells())?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render a table to a UTF-8 string
pub fn table_to_string<R: TableRow>(delimiter: u8, rows: &[R]) -> Result<String> {
    let mut buffer = Vec::new();
    write_table(&mut buffer, delimiter, rows)?;
    Ok(String::from_utf8(buffer)?)
}
