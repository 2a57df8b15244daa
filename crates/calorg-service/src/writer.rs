//! Persisting the rendered document.

use std::path::Path;

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Writes `text` to `path`, replacing any existing file.
///
/// ## Errors
///
/// Returns `ServiceError::IoError` if the file cannot be written.
#[tracing::instrument(skip(text), fields(path = %path.display(), bytes = text.len()))]
pub async fn write_document(path: &Path, text: &str) -> ServiceResult<()> {
    tokio::fs::write(path, text)
        .await
        .map_err(|source| ServiceError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!("Wrote document");
    Ok(())
}
