use std::io;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use imgshift_core::{SourceCandidate, SourceFile};
use imgshift_logging::{engine_debug, engine_warn};
use thiserror::Error;

const UNKNOWN_MIME: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("{0:?} is not a file")]
    NotAFile(PathBuf),
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// On-demand access to the bytes of an acquired file.
#[async_trait::async_trait]
pub trait ByteSource: Send + Sync {
    async fn read_bytes(&self, source: &SourceFile) -> Result<Vec<u8>, AcquireError>;
}

/// Turns user-supplied paths into candidates and reads acquired files.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileAcquirer;

impl FileAcquirer {
    /// Builds a candidate with a mime hint guessed from the extension.
    pub fn candidate(&self, path: &Path) -> Result<SourceCandidate, AcquireError> {
        let is_file = std::fs::metadata(path)
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        let name = match path.file_name() {
            Some(name) if is_file => name.to_string_lossy().into_owned(),
            _ => return Err(AcquireError::NotAFile(path.to_path_buf())),
        };
        let mime_hint = guess_mime(path);
        engine_debug!("Candidate {} mime={}", name, mime_hint);
        Ok(SourceCandidate {
            name,
            mime_hint,
            path: path.to_path_buf(),
        })
    }

    /// Builds candidates for every usable path, skipping (and logging) the rest.
    pub fn candidates<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<SourceCandidate> {
        paths
            .iter()
            .filter_map(|path| match self.candidate(path.as_ref()) {
                Ok(candidate) => Some(candidate),
                Err(err) => {
                    engine_warn!("Skipping candidate: {}", err);
                    None
                }
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl ByteSource for FileAcquirer {
    async fn read_bytes(&self, source: &SourceFile) -> Result<Vec<u8>, AcquireError> {
        tokio::fs::read(&source.path)
            .await
            .map_err(|err| AcquireError::Read {
                path: source.path.clone(),
                source: err,
            })
    }
}

/// Mime type for the path's extension, or `application/octet-stream`.
pub fn guess_mime(path: &Path) -> String {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| UNKNOWN_MIME.to_string())
}
