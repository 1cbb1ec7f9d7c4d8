use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::error::GenerationError;

/// Rendered schema text and the file name it belongs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSchema {
    pub file_name: String,
    pub text: String,
}

/// File name for a service's schema: lower-case, spaces replaced with
/// underscores, `.proto` extension.
pub fn schema_file_name(service_name: &str) -> String {
    format!("{}.proto", service_name.to_lowercase().replace(' ', "_"))
}

/// Write `text` to `dir/<schema_file_name>`, creating `dir` if needed.
///
/// An existing file is overwritten. On failure the file content is
/// indeterminate; retrying overwrites it.
pub fn write_schema(
    dir: &Path,
    service_name: &str,
    text: &str,
) -> Result<PathBuf, GenerationError> {
    fs::create_dir_all(dir).map_err(|source| GenerationError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(schema_file_name(service_name));
    fs::write(&path, text).map_err(|source| GenerationError::Io {
        path: path.clone(),
        source,
    })?;
    info!(path = ?path, bytes = text.len(), "Wrote schema");
    Ok(path)
}
