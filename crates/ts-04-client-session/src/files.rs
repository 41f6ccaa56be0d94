//! # Local File Helpers
//!
//! Upload from and download to the local filesystem. Local problems are
//! reported before anything is sent to the coordinator.

use crate::errors::SessionError;
use crate::session::ClientSession;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;

impl<S> ClientSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Upload the file at `path` under its base name.
    pub async fn upload_file(&mut self, path: &Path) -> Result<String, SessionError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| SessionError::LocalFile {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path has no UTF-8 file name",
                ),
            })?
            .to_string();

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| SessionError::LocalFile {
                path: path.to_path_buf(),
                source,
            })?;

        info!(file = %file_name, bytes = bytes.len(), "[ts-04] Uploading {}", path.display());
        self.upload(&file_name, &bytes).await
    }

    /// Download `file_name` into `dest`.
    ///
    /// Returns the number of bytes written, or `None` when the coordinator
    /// reported the file missing (in which case `dest` is not created).
    pub async fn download_to(
        &mut self,
        file_name: &str,
        dest: &Path,
    ) -> Result<Option<usize>, SessionError> {
        let parent = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let metadata = tokio::fs::metadata(parent)
            .await
            .map_err(|source| SessionError::LocalFile {
                path: parent.to_path_buf(),
                source,
            })?;
        if !metadata.is_dir() {
            return Err(SessionError::LocalFile {
                path: parent.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        let Some(bytes) = self.download(file_name).await? else {
            return Ok(None);
        };

        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|source| SessionError::LocalFile {
                path: dest.to_path_buf(),
                source,
            })?;
        info!(file = %file_name, bytes = bytes.len(), "[ts-04] Saved to {}", dest.display());
        Ok(Some(bytes.len()))
    }
}
