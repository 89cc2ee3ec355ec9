use crate::error::{Error, Result};
use csv::Writer;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
};

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Collapses runs of whitespace (including newlines from the markup) into single spaces
///
/// # Arguments
/// * `text` - Raw text taken from a document node
///
/// # Returns
/// The trimmed text with single spaces between words
pub fn clean_text(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Ensures a directory exists, creating it if necessary
///
/// # Arguments
/// * `dir_path` - Path to the directory
///
/// # Returns
/// Result indicating success or the IO error with its path
pub fn ensure_dir(dir_path: impl AsRef<Path>) -> Result<()> {
    let path = dir_path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    }

    Ok(())
}

/// Ensures the parent directory of a file exists
fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Creates a CSV writer for the specified file, creating parent directories
///
/// # Arguments
/// * `path` - The CSV file to create
/// * `headers` - Column headers for the CSV
///
/// # Returns
/// Result containing the CSV writer or error
pub fn create_csv_writer<S: AsRef<[u8]>>(path: &Path, headers: &[S]) -> Result<Writer<File>> {
    ensure_parent(path)?;

    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = Writer::from_writer(file);
    writer.write_record(headers)?;

    Ok(writer)
}

/// Writes a value as pretty-printed JSON, creating parent directories
///
/// # Arguments
/// * `data` - The value to serialize
/// * `path` - Destination file
pub fn write_json<T: Serialize + ?Sized>(data: &T, path: &Path) -> Result<()> {
    ensure_parent(path)?;

    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), data)?;

    Ok(())
}
