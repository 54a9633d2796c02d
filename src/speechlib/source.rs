//! Filesystem access used by the file and directory constructors.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, trace};

use super::types::error::{Result, SpeechLibError};

/// Reads a whole file into memory.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    debug!("Read {} bytes from {}", data.len(), path.display());
    Ok(data)
}

/// Returns `(file name, contents)` for every regular file directly inside
/// `path`, sorted by name. Subdirectories are not entered.
pub fn list_directory(path: impl AsRef<Path>) -> Result<Vec<(String, Vec<u8>)>> {
    let path = path.as_ref();
    let dir = fs::read_dir(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            SpeechLibError::NotFound(format!("directory {} does not exist", path.display()))
        }
        _ => SpeechLibError::Io(e),
    })?;

    let mut files = Vec::new();
    for entry in dir {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            trace!("Skipping non-file {}", entry.path().display());
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let data = fs::read(entry.path())?;
        files.push((name, data));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    debug!("Listed {} files in {}", files.len(), path.display());
    Ok(files)
}
