use crate::conversion::{ConversionError, Pipeline};
use crate::models::{Book, ManuscriptFile, parse_manifest};
use crate::splitting::Splitter;
use relative_path::RelativePath;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid manuscript directory: {0}")]
    InvalidManuscriptDir(String),
    #[error("Invalid book metadata: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Read a manuscript file and return its content
pub fn read_file(relative_path: &RelativePath, root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write content to a file below `root`
pub fn write_file(relative_path: &RelativePath, root: &Path, content: &str) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(root);

    // Create parent directories if they don't exist
    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)
}

pub fn validate_manuscript_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidManuscriptDir(format!(
            "{} does not exist",
            path.display()
        )));
    }

    Ok(())
}

/// Read the manifest listing chapter files in book order
pub fn read_manifest(manifest_path: &Path) -> Result<Vec<ManuscriptFile>, IoError> {
    let files = parse_manifest(&read_document(manifest_path)?);
    log::debug!("Manifest {} lists {} files", manifest_path.display(), files.len());
    Ok(files)
}

/// Convert every chapter, keeping manifest order. The first unresolved
/// transclusion aborts the whole run.
pub fn convert_chapters(
    root: &Path,
    files: Vec<ManuscriptFile>,
    pipeline: &Pipeline,
) -> Result<Vec<(ManuscriptFile, String)>, IoError> {
    validate_manuscript_dir(root)?;
    files
        .into_iter()
        .map(|file| {
            log::info!("Converting {}", file.relative_path());
            let text = read_file(file.relative_path(), root)?;
            let converted = pipeline.convert(&text)?;
            Ok((file, converted))
        })
        .collect()
}

/// Concatenate converted chapters separated by one blank line
pub fn join_chapters(chapters: &[(ManuscriptFile, String)]) -> String {
    chapters
        .iter()
        .map(|(_, text)| text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Write each converted chapter as `NN-<name>` into `out_dir`
pub fn write_chapters(chapters: &[(ManuscriptFile, String)], out_dir: &Path) -> Result<(), IoError> {
    for (file, text) in chapters {
        write_file(RelativePath::new(&file.indexed_file_name()), out_dir, text)?;
    }
    Ok(())
}

/// Convert a file in place. Returns whether its content changed.
pub fn migrate_file(path: &Path, pipeline: &Pipeline) -> Result<bool, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    let converted = pipeline.convert(&text)?;
    if converted == text {
        return Ok(false);
    }
    fs::write(path, converted)?;
    Ok(true)
}

/// Load persisted book metadata. A missing or blank file reads as `{}`.
pub fn read_book_metadata(path: &Path) -> Result<Value, IoError> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    Ok(serde_json::from_str(&text)?)
}

/// Merge `book` into the metadata at `path`, replacing only `sections`.
pub fn write_book_metadata(path: &Path, book: &Book) -> Result<Value, IoError> {
    let merged = book.merge_into(read_book_metadata(path)?)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&merged)?)?;
    Ok(merged)
}

/// Split an annotated document and merge the result into the metadata file
pub fn split_into_metadata(
    document: &Path,
    metadata: &Path,
    splitter: &Splitter,
) -> Result<Book, IoError> {
    let text = read_document(document)?;
    let book = splitter.split(&text);
    write_book_metadata(metadata, &book)?;
    log::info!(
        "Wrote {} sections from {} to {}",
        book.sections.len(),
        document.display(),
        metadata.display()
    );
    Ok(book)
}

/// Split an annotated document into one file per lecture below `out_dir`.
/// Lecture files take the extension of `document`.
pub fn write_lecture_files(
    document: &Path,
    out_dir: &Path,
    splitter: &Splitter,
) -> Result<Vec<PathBuf>, IoError> {
    let text = read_document(document)?;
    let book = splitter.split(&text);

    let mut written = Vec::new();
    for file in book.lecture_files(&document_extension(document)) {
        write_file(&file.relative_path, out_dir, &file.contents)?;
        written.push(file.relative_path.to_path(out_dir));
    }
    Ok(written)
}

fn read_document(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

/// `.html` for `book.html`, empty when there is no extension
fn document_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
