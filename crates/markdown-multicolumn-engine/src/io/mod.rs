use crate::models::DocumentId;
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid document directory: {0}")]
    InvalidDocumentDir(String),
    #[error("{0} is not inside the document directory")]
    OutsideRoot(PathBuf),
}

/// Read a markdown document, keyed by its path relative to `root`
pub fn read_document(relative_path: &RelativePath, root: &Path) -> Result<(DocumentId, String), IoError> {
    let absolute_path = relative_path.to_path(root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    let content = fs::read_to_string(&absolute_path)?;
    log::debug!("read {} bytes from {}", content.len(), absolute_path.display());
    Ok((DocumentId::new(relative_path), content))
}

/// Express `path` relative to `root`, for use as a document id
pub fn document_path(path: &Path, root: &Path) -> Result<RelativePathBuf, IoError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| IoError::OutsideRoot(path.to_path_buf()))?;
    RelativePathBuf::from_path(relative).map_err(|_| IoError::OutsideRoot(path.to_path_buf()))
}

/// Scan for markdown files under the document directory
pub fn scan_markdown_files(root: &Path) -> Result<Vec<PathBuf>, IoError> {
    validate_document_dir(root)?;
    let mut files = Vec::new();
    scan_directory_recursive(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == "md"
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_document_dir(path: &Path) -> Result<(), IoError> {
    if !path.is_dir() {
        return Err(IoError::InvalidDocumentDir(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    Ok(())
}
