use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use imgshift_core::{DeliveryRequest, TargetFormat};
use imgshift_engine::{
    ArtifactDelivery, ArtifactReference, DeliveryError, DirectorySaveTarget, SaveTarget,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Stage { media_type: String, len: usize },
    Save { id: u64, file_name: String },
    Revoke { id: u64 },
}

#[derive(Default)]
struct RecordingTarget {
    calls: Mutex<Vec<Call>>,
    fail_save: bool,
}

impl RecordingTarget {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl SaveTarget for RecordingTarget {
    fn stage(&self, media_type: &str, bytes: &[u8]) -> Result<ArtifactReference, DeliveryError> {
        self.calls.lock().unwrap().push(Call::Stage {
            media_type: media_type.to_string(),
            len: bytes.len(),
        });
        Ok(ArtifactReference::new(42, media_type, bytes.len() as u64))
    }

    fn save(
        &self,
        reference: &ArtifactReference,
        request: &DeliveryRequest,
    ) -> Result<PathBuf, DeliveryError> {
        self.calls.lock().unwrap().push(Call::Save {
            id: reference.id(),
            file_name: request.file_name.clone(),
        });
        if self.fail_save {
            return Err(DeliveryError::OutputDir("read-only".to_string()));
        }
        Ok(PathBuf::from("/saved").join(&request.file_name))
    }

    fn revoke(&self, reference: &ArtifactReference) {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Revoke { id: reference.id() });
    }
}

#[test]
fn deliver_stages_saves_once_then_revokes() {
    let target = Arc::new(RecordingTarget::default());
    let delivery = ArtifactDelivery::new(target.clone());
    let request = DeliveryRequest::new("photo.jpeg", TargetFormat::Png, Bytes::from_static(b"abc"));

    let receipt = delivery.deliver(&request).unwrap();

    assert_eq!(receipt.file_name, "photo.png");
    assert_eq!(receipt.media_type, "image/png");
    assert_eq!(receipt.byte_len, 3);
    assert_eq!(receipt.location, PathBuf::from("/saved/photo.png"));
    assert_eq!(
        target.calls(),
        vec![
            Call::Stage {
                media_type: "image/png".to_string(),
                len: 3
            },
            Call::Save {
                id: 42,
                file_name: "photo.png".to_string()
            },
            Call::Revoke { id: 42 },
        ]
    );
}

#[test]
fn failed_save_still_revokes() {
    let target = Arc::new(RecordingTarget {
        fail_save: true,
        ..RecordingTarget::default()
    });
    let delivery = ArtifactDelivery::new(target.clone());
    let request = DeliveryRequest::new("a.png", TargetFormat::Gif, Bytes::from_static(b"g"));

    assert!(delivery.deliver(&request).is_err());
    assert_eq!(target.calls().last(), Some(&Call::Revoke { id: 42 }));
}

#[test]
fn directory_target_writes_named_file_without_leftovers() {
    let temp = TempDir::new().unwrap();
    let target = Arc::new(DirectorySaveTarget::new(temp.path().to_path_buf()));
    let delivery = ArtifactDelivery::new(target.clone());
    let request = DeliveryRequest::new(
        "archive.tar.gz",
        TargetFormat::Webp,
        Bytes::from_static(b"RIFF-data"),
    );

    let receipt = delivery.deliver(&request).unwrap();

    assert_eq!(receipt.location, temp.path().join("archive.tar.webp"));
    assert_eq!(fs::read(&receipt.location).unwrap(), b"RIFF-data");
    assert_eq!(dir_entries(temp.path()), vec!["archive.tar.webp".to_string()]);
    assert_eq!(target.live_references(), 0);
}

#[test]
fn directory_target_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("noext.gif"), b"old").unwrap();
    let delivery = ArtifactDelivery::new(Arc::new(DirectorySaveTarget::new(
        temp.path().to_path_buf(),
    )));

    let receipt = delivery
        .deliver(&DeliveryRequest::new(
            "noext",
            TargetFormat::Gif,
            Bytes::from_static(b"new"),
        ))
        .unwrap();

    assert_eq!(fs::read(receipt.location).unwrap(), b"new");
    assert_eq!(dir_entries(temp.path()), vec!["noext.gif".to_string()]);
}

#[test]
fn directory_target_creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("nested").join("out");
    let delivery = ArtifactDelivery::new(Arc::new(DirectorySaveTarget::new(out.clone())));

    let receipt = delivery
        .deliver(&DeliveryRequest::new(
            "a.png",
            TargetFormat::Jpg,
            Bytes::from_static(b"j"),
        ))
        .unwrap();

    assert_eq!(receipt.location, out.join("a.jpg"));
    assert_eq!(receipt.media_type, "image/jpg");
}

#[test]
fn directory_target_failure_leaves_no_staged_files() {
    let temp = TempDir::new().unwrap();
    // A directory occupying the target name makes the save step fail.
    fs::create_dir(temp.path().join("blocked.png")).unwrap();
    let target = Arc::new(DirectorySaveTarget::new(temp.path().to_path_buf()));
    let delivery = ArtifactDelivery::new(target.clone());

    let result = delivery.deliver(&DeliveryRequest::new(
        "blocked.jpg",
        TargetFormat::Png,
        Bytes::from_static(b"p"),
    ));

    assert!(result.is_err());
    assert_eq!(target.live_references(), 0);
    assert_eq!(dir_entries(temp.path()), vec!["blocked.png".to_string()]);
}

#[test]
fn output_path_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();
    let delivery = ArtifactDelivery::new(Arc::new(DirectorySaveTarget::new(file_path)));

    let err = delivery
        .deliver(&DeliveryRequest::new(
            "a.png",
            TargetFormat::Png,
            Bytes::from_static(b"p"),
        ))
        .unwrap_err();

    assert!(matches!(err, DeliveryError::OutputDir(_)));
}

#[test]
fn source_file_in_output_dir_is_never_replaced() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("photo.jpg");
    fs::write(&source, b"original").unwrap();
    let target = Arc::new(DirectorySaveTarget::new(temp.path().to_path_buf()));
    let delivery = ArtifactDelivery::new(target.clone());
    let request = DeliveryRequest::new("photo.jpg", TargetFormat::Jpg, Bytes::from_static(b"re"))
        .protecting(source.clone());

    let first = delivery.deliver(&request).unwrap();
    let second = delivery.deliver(&request).unwrap();

    assert_eq!(fs::read(&source).unwrap(), b"original");
    assert_eq!(first.location, temp.path().join("photo (1).jpg"));
    assert_eq!(first.file_name, "photo (1).jpg");
    assert_eq!(second.location, temp.path().join("photo (2).jpg"));
    assert_eq!(fs::read(&second.location).unwrap(), b"re");
    assert_eq!(
        dir_entries(temp.path()),
        vec![
            "photo (1).jpg".to_string(),
            "photo (2).jpg".to_string(),
            "photo.jpg".to_string(),
        ]
    );
    assert_eq!(target.live_references(), 0);
}

#[test]
fn protected_file_elsewhere_does_not_stop_replacement() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    fs::create_dir(&out).unwrap();
    fs::write(out.join("photo.png"), b"old").unwrap();
    let source = temp.path().join("photo.png");
    fs::write(&source, b"original").unwrap();
    let delivery = ArtifactDelivery::new(Arc::new(DirectorySaveTarget::new(out.clone())));

    let receipt = delivery
        .deliver(
            &DeliveryRequest::new("photo.png", TargetFormat::Png, Bytes::from_static(b"new"))
                .protecting(source.clone()),
        )
        .unwrap();

    assert_eq!(receipt.location, out.join("photo.png"));
    assert_eq!(fs::read(out.join("photo.png")).unwrap(), b"new");
    assert_eq!(fs::read(&source).unwrap(), b"original");
}

#[cfg(unix)]
#[test]
fn source_reached_through_another_name_is_not_replaced() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    fs::create_dir(&out).unwrap();
    let source = temp.path().join("linked.gif");
    fs::write(&source, b"original").unwrap();
    fs::hard_link(&source, out.join("linked.gif")).unwrap();
    let delivery = ArtifactDelivery::new(Arc::new(DirectorySaveTarget::new(out.clone())));

    let receipt = delivery
        .deliver(
            &DeliveryRequest::new("linked.gif", TargetFormat::Gif, Bytes::from_static(b"new"))
                .protecting(source.clone()),
        )
        .unwrap();

    assert_eq!(receipt.location, out.join("linked (1).gif"));
    assert_eq!(fs::read(&source).unwrap(), b"original");
}
