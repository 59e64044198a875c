use std::collections::HashMap;
use std::fs::{self, Metadata};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use imgshift_core::{DeliveryReceipt, DeliveryRequest};
use imgshift_logging::{engine_debug, engine_info};
use tempfile::{Builder, NamedTempFile};
use thiserror::Error;

const STAGING_PREFIX: &str = ".imgshift-staged-";
const SAVING_PREFIX: &str = ".imgshift-saving-";
const MAX_RENAME_ATTEMPTS: u32 = 10_000;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("artifact reference {0} is not staged")]
    UnknownReference(u64),
    #[error("no free name next to {0}")]
    NoFreeName(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Handle to a staged blob, valid between `SaveTarget::stage` and
/// `SaveTarget::revoke`. Not `Clone`; `ArtifactDelivery` drops it right after
/// revoking.
#[derive(Debug, PartialEq, Eq)]
pub struct ArtifactReference {
    id: u64,
    media_type: String,
    byte_len: u64,
}

impl ArtifactReference {
    pub fn new(id: u64, media_type: impl Into<String>, byte_len: u64) -> Self {
        Self {
            id,
            media_type: media_type.into(),
            byte_len,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }
}

/// The platform save mechanism.
pub trait SaveTarget: Send + Sync {
    /// Materializes a typed blob and returns a reference to it.
    fn stage(&self, media_type: &str, bytes: &[u8]) -> Result<ArtifactReference, DeliveryError>;
    /// Saves the referenced blob under `request.file_name`, returning where it
    /// landed. `request.protected` must never be replaced.
    fn save(
        &self,
        reference: &ArtifactReference,
        request: &DeliveryRequest,
    ) -> Result<PathBuf, DeliveryError>;
    /// Releases the reference and anything staged for it.
    fn revoke(&self, reference: &ArtifactReference);
}

/// Turns a conversion result into a saved file.
#[derive(Clone)]
pub struct ArtifactDelivery {
    target: Arc<dyn SaveTarget>,
}

impl ArtifactDelivery {
    pub fn new(target: Arc<dyn SaveTarget>) -> Self {
        Self { target }
    }

    /// Stage, save once, revoke. The reference is revoked on every path out
    /// of this function, including a failed save.
    pub fn deliver(&self, request: &DeliveryRequest) -> Result<DeliveryReceipt, DeliveryError> {
        let staged = ScopedReference {
            target: self.target.as_ref(),
            reference: self.target.stage(&request.media_type, &request.bytes)?,
        };
        let location = self.target.save(&staged.reference, request)?;
        let receipt = DeliveryReceipt {
            file_name: location
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| request.file_name.clone()),
            media_type: staged.reference.media_type().to_string(),
            location,
            byte_len: staged.reference.byte_len(),
        };
        drop(staged);

        engine_info!(
            "Delivered {} ({}, {} bytes) to {:?}",
            receipt.file_name,
            receipt.media_type,
            receipt.byte_len,
            receipt.location
        );
        Ok(receipt)
    }
}

/// Revokes its reference when dropped.
struct ScopedReference<'a> {
    target: &'a dyn SaveTarget,
    reference: ArtifactReference,
}

impl Drop for ScopedReference<'_> {
    fn drop(&mut self) {
        self.target.revoke(&self.reference);
    }
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), DeliveryError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| DeliveryError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(DeliveryError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| DeliveryError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Saves artifacts into a directory. Staged blobs are hidden temp files in the
/// same directory; saving writes a second temp file and renames it over
/// `{dir}/{file_name}`.
pub struct DirectorySaveTarget {
    dir: PathBuf,
    next_id: AtomicU64,
    staged: Mutex<HashMap<u64, NamedTempFile>>,
}

impl DirectorySaveTarget {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            next_id: AtomicU64::new(1),
            staged: Mutex::new(HashMap::new()),
        }
    }

    /// Number of references currently staged and not yet revoked.
    pub fn live_references(&self) -> usize {
        self.staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `{dir}/{file_name}`, unless that is the protected file; then the first
    /// `{stem} (n){ext}` that does not exist yet.
    fn free_target(
        &self,
        file_name: &str,
        protected: Option<&Path>,
    ) -> Result<PathBuf, DeliveryError> {
        let target = self.dir.join(file_name);
        let Some(source) = protected.filter(|path| is_same_file(&target, path)) else {
            return Ok(target);
        };

        let (stem, ext) = match file_name.rfind('.') {
            Some(dot) => file_name.split_at(dot),
            None => (file_name, ""),
        };
        let free = (1..=MAX_RENAME_ATTEMPTS)
            .map(|n| self.dir.join(format!("{stem} ({n}){ext}")))
            .find(|candidate| fs::symlink_metadata(candidate).is_err())
            .ok_or_else(|| DeliveryError::NoFreeName(file_name.to_string()))?;
        engine_info!(
            "{:?} is the source file {:?}, saving as {:?} instead",
            target,
            source,
            free
        );
        Ok(free)
    }
}

/// Whether both paths name the same existing file, compared by file identity
/// rather than by spelling.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(meta_a), Ok(meta_b)) => same_identity(a, &meta_a, b, &meta_b),
        _ => false,
    }
}

#[cfg(unix)]
fn same_identity(_: &Path, a: &Metadata, _: &Path, b: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_identity(a: &Path, _: &Metadata, b: &Path, _: &Metadata) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl SaveTarget for DirectorySaveTarget {
    fn stage(&self, media_type: &str, bytes: &[u8]) -> Result<ArtifactReference, DeliveryError> {
        ensure_output_dir(&self.dir)?;
        let mut tmp = Builder::new().prefix(STAGING_PREFIX).tempfile_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        engine_debug!(
            "Staged reference {} ({}, {} bytes) at {:?}",
            id,
            media_type,
            bytes.len(),
            tmp.path()
        );
        self.staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tmp);
        Ok(ArtifactReference::new(id, media_type, bytes.len() as u64))
    }

    fn save(
        &self,
        reference: &ArtifactReference,
        request: &DeliveryRequest,
    ) -> Result<PathBuf, DeliveryError> {
        let staged_path = {
            let staged = self.staged.lock().unwrap_or_else(PoisonError::into_inner);
            staged
                .get(&reference.id)
                .map(|tmp| tmp.path().to_path_buf())
                .ok_or(DeliveryError::UnknownReference(reference.id))?
        };

        let target = self.free_target(&request.file_name, request.protected.as_deref())?;
        let mut tmp = Builder::new().prefix(SAVING_PREFIX).tempfile_in(&self.dir)?;
        let mut source = fs::File::open(&staged_path)?;
        io::copy(&mut source, tmp.as_file_mut())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Replace existing file if present; rename does not overwrite on every platform.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| DeliveryError::Io(e.error))?;
        Ok(target)
    }

    fn revoke(&self, reference: &ArtifactReference) {
        let removed = self
            .staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&reference.id);
        if let Some(tmp) = removed {
            engine_debug!("Revoked reference {}", reference.id);
            drop(tmp);
        }
    }
}
