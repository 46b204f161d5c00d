//! Workbook input resolution and XML parsing
//!
//! A workbook arrives either as a plain `.twb` XML document or as a `.twbx`
//! package (a zip archive holding the `.twb` next to extracts and images).
//! Both resolve to the document text plus the document's base name.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

pub mod parser_utils;
pub mod xml_tree;

use crate::error::{ParseError, Result};
pub use xml_tree::{Element, parse_document};

const DOCUMENT_EXTENSION: &str = "twb";
const ARCHIVE_EXTENSION: &str = "twbx";

/// The kind of file a workbook path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookKind {
    /// Plain XML document (`.twb`)
    Document,
    /// Packaged workbook (`.twbx`)
    Archive,
}

impl WorkbookKind {
    /// Detect the kind from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        if extension.eq_ignore_ascii_case(DOCUMENT_EXTENSION) {
            Ok(WorkbookKind::Document)
        } else if extension.eq_ignore_ascii_case(ARCHIVE_EXTENSION) {
            Ok(WorkbookKind::Archive)
        } else {
            Err(ParseError::UnsupportedFileType(format!(".{}", extension)))
        }
    }
}

/// Resolved workbook input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookSource {
    /// Base name of the workbook document, without extension
    pub name: String,
    pub kind: WorkbookKind,
    /// The workbook XML document
    pub xml: String,
}

/// Read a workbook file and return its XML document
///
/// The name is the base name of the document itself: the file stem for a
/// `.twb`, the selected member's stem for a `.twbx`.
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<WorkbookSource> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ParseError::NotFound(path.to_path_buf()));
    }

    let kind = WorkbookKind::from_path(path)?;
    let stem = file_stem(path);

    let (name, xml) = match kind {
        WorkbookKind::Document => (stem, decode_document(fs::read(path)?)?),
        WorkbookKind::Archive => read_archive_document(path, &stem)?,
    };

    Ok(WorkbookSource { name, kind, xml })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Workbook documents are UTF-8; anything else is a malformed document
fn decode_document(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|err| {
        let error = err.utf8_error();
        ParseError::malformed(error.valid_up_to() as u64, error.to_string())
    })
}

/// Extract the workbook document from a `.twbx` package
///
/// Returns the selected member's base name along with its text.
fn read_archive_document(path: &Path, stem: &str) -> Result<(String, String)> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut members = Vec::new();
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if entry.is_file() {
            members.push(entry.name().to_string());
        }
    }

    let Some(member) = select_document_member(&members, stem) else {
        return Err(ParseError::NoDocumentInArchive(path.to_path_buf()));
    };
    log::debug!("Reading {} from {}", member, path.display());

    let mut bytes = Vec::new();
    archive.by_name(member)?.read_to_end(&mut bytes)?;
    Ok((file_stem(Path::new(member)), decode_document(bytes)?))
}

/// Pick the workbook document among archive member names
///
/// Candidates are members with a `.twb` extension (case-insensitive). The one
/// whose file name matches the archive's base name wins; otherwise the first
/// candidate in archive order is used.
pub fn select_document_member<'a>(members: &'a [String], stem: &str) -> Option<&'a str> {
    let candidates: Vec<&str> = members
        .iter()
        .map(String::as_str)
        .filter(|name| {
            Path::new(name)
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
        })
        .collect();

    if candidates.len() > 1 {
        log::warn!(
            "Archive holds {} workbook documents, preferring one named after the archive",
            candidates.len()
        );
    }

    let expected = format!("{}.{}", stem, DOCUMENT_EXTENSION);
    candidates
        .iter()
        .find(|name| {
            Path::new(name)
                .file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|file_name| file_name.eq_ignore_ascii_case(&expected))
        })
        .or_else(|| candidates.first())
        .copied()
}
