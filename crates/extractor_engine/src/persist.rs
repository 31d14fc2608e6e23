use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory {0:?} could not be created: {1}")]
    OutputDir(PathBuf, String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the output directory exists; create it (and its parents) if missing.
///
/// Another process creating the same directory concurrently is not an error.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(dir.to_path_buf(), e.to_string()))?;
    if !dir.is_dir() {
        return Err(PersistError::OutputDir(
            dir.to_path_buf(),
            "path is not a directory".into(),
        ));
    }
    Ok(())
}

/// Atomically replace `target` with `content`: write a temp file next to it, then rename.
///
/// Readers see either the previous file or the complete new one, never a partial write.
pub fn write_text_atomic(target: &Path, content: &str) -> Result<(), PersistError> {
    let dir = parent_dir(target);
    ensure_output_dir(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(target).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}

fn parent_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
