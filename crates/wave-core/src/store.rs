//! Local YAML store for resource documents.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::resource::Document;

/// Load a document from `path`.
///
/// An empty file is read as the empty document.
///
/// # Errors
/// Returns [`Error::Io`] if the file can't be read, [`Error::Parse`] if its
/// contents don't match the document shape.
pub fn load_document<D: Document>(path: impl AsRef<Path>) -> Result<D> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(D::default());
    }

    serde_yaml::from_str(&content).map_err(|e| Error::Parse {
        file: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Write `document` to `path`, creating parent directories.
///
/// Keys are written in field order, so repeated pulls of the same remote state
/// produce identical files.
///
/// # Errors
/// Returns error if serialization or write fails.
pub fn save_document<D: Document>(path: impl AsRef<Path>, document: &D) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let content = serde_yaml::to_string(document)?;
    fs::write(path, content)?;
    tracing::debug!(kind = %D::KIND, path = %path.display(), "wrote document");
    Ok(())
}
