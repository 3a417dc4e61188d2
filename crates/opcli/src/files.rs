use std::path::{Path, PathBuf};

use crate::prelude::*;

/// Write `content` to `path`, creating parent directories as needed.
pub fn write_text_file(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    std::fs::write(path, content).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("wrote {} byte(s) to {}", content.len(), path.display());
    Ok(path.to_path_buf())
}

pub fn read_text_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::ContentFileNotFound(path.to_path_buf()).into());
    }
    std::fs::read_to_string(path).map_err(|source| {
        Error::Read {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

/// `path` if nothing exists there, else the first free `{stem}-{n}{.ext}` sibling with `n >= 2`.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = path
        .extension()
        .map(|e| f!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (2..)
        .map(|n| path.with_file_name(f!("{stem}-{n}{suffix}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}
