use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;

use crate::{delivered_filename, TargetFormat};

pub type RunId = u64;

/// Output of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub bytes: Bytes,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    EmptyInput,
    SourceUnreadable,
    Decode,
    UnsupportedFormat,
    Encode,
    TimedOut,
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::EmptyInput => write!(f, "empty input"),
            FailureKind::SourceUnreadable => write!(f, "source unreadable"),
            FailureKind::Decode => write!(f, "decode failed"),
            FailureKind::UnsupportedFormat => write!(f, "unsupported format"),
            FailureKind::Encode => write!(f, "encode failed"),
            FailureKind::TimedOut => write!(f, "timed out"),
            FailureKind::Internal => write!(f, "internal error"),
        }
    }
}

/// Why a conversion did not produce output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ConversionFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConversionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

pub type ConversionOutcome = Result<ConversionResult, ConversionFailure>;

/// Everything the save step needs: a typed blob and the name to save it as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Bytes,
    /// File the save must never replace, normally the acquired source.
    pub protected: Option<PathBuf>,
}

impl DeliveryRequest {
    pub fn new(original_name: &str, format: TargetFormat, bytes: Bytes) -> Self {
        Self {
            file_name: delivered_filename(original_name, format),
            media_type: format.media_type(),
            bytes,
            protected: None,
        }
    }

    pub fn protecting(mut self, path: PathBuf) -> Self {
        self.protected = Some(path);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub file_name: String,
    pub media_type: String,
    pub location: PathBuf,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFault {
    pub message: String,
}

impl fmt::Display for DeliveryFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delivery failed: {}", self.message)
    }
}

pub type DeliveryOutcome = Result<DeliveryReceipt, DeliveryFault>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Pending,
    Saved(DeliveryReceipt),
    Faulted(DeliveryFault),
}
