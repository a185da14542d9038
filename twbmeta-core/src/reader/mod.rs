//! Tableau workbook reader for `.twb` XML and packaged `.twbx` archives

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::error::ExtractError;

pub mod document;
pub mod parser_utils;

pub use document::{Element, Node};

/// A parsed workbook, owned by the extraction that reads it
#[derive(Debug, Clone)]
pub struct WorkbookDocument {
    /// Identifier used in error reports (file path or caller-supplied label)
    pub id: String,
    /// Source path, when the document was read from disk
    pub path: Option<PathBuf>,
    /// Document element (`<workbook>`)
    pub root: Element,
}

impl WorkbookDocument {
    /// File stem of the source path, if any
    pub fn file_stem(&self) -> Option<&str> {
        self.path
            .as_deref()
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
    }
}

/// Parse workbook XML bytes
pub fn parse_document(id: impl Into<String>, bytes: &[u8]) -> Result<WorkbookDocument, ExtractError> {
    let id = id.into();
    let root = document::parse_element_tree(bytes).map_err(|message| ExtractError::Xml {
        document: id.clone(),
        message,
    })?;
    Ok(WorkbookDocument {
        id,
        path: None,
        root,
    })
}

/// Read a workbook from a file path (`.twb`, or `.twbx` packages)
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<WorkbookDocument, ExtractError> {
    let path_ref = path.as_ref();
    let id = path_ref.display().to_string();

    let is_packaged = path_ref
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("twbx"))
        .unwrap_or(false);

    let bytes = if is_packaged {
        read_packaged_workbook(path_ref, &id)?
    } else {
        std::fs::read(path_ref).map_err(|source| ExtractError::Io {
            document: id.clone(),
            source,
        })?
    };

    let mut document = parse_document(id, &bytes)?;
    document.path = Some(path_ref.to_path_buf());
    Ok(document)
}

/// Read the workbook XML out of a `.twbx` zip package.
///
/// The root-level `.twb` entry is preferred; otherwise the first `.twb` found anywhere.
fn read_packaged_workbook(path: &Path, id: &str) -> Result<Vec<u8>, ExtractError> {
    let archive_error = |source| ExtractError::Archive {
        document: id.to_string(),
        source,
    };

    let file = File::open(path).map_err(|source| ExtractError::Io {
        document: id.to_string(),
        source,
    })?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(archive_error)?;

    let mut candidates = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(archive_error)?;
        let name = entry.name().to_string();
        if name.to_ascii_lowercase().ends_with(".twb") {
            candidates.push(name);
        }
    }

    let entry_name = candidates
        .iter()
        .find(|name| !name.contains('/'))
        .or_else(|| candidates.first())
        .cloned()
        .ok_or_else(|| ExtractError::MissingWorkbook {
            document: id.to_string(),
        })?;
    log::debug!("{}: reading packaged workbook entry {}", id, entry_name);

    let mut entry = archive.by_name(&entry_name).map_err(archive_error)?;
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).map_err(|source| ExtractError::Io {
        document: id.to_string(),
        source,
    })?;
    Ok(bytes)
}
