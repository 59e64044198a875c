use std::fmt;
use std::path::PathBuf;

pub type SourceId = u64;

/// A file offered by the user (dropped or picked) before acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCandidate {
    pub name: String,
    pub mime_hint: String,
    pub path: PathBuf,
}

/// The acquired input. Bytes are materialized on demand from `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub id: SourceId,
    pub name: String,
    pub mime_hint: String,
    pub path: PathBuf,
}

/// Acceptance filter applied at the pick/drop boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptFilter {
    mime_family: &'static str,
}

impl AcceptFilter {
    /// Accepts the `image/*` family.
    pub fn images() -> Self {
        Self {
            mime_family: "image/",
        }
    }

    pub fn accepts(&self, mime_hint: &str) -> bool {
        let family = self.mime_family;
        mime_hint.len() > family.len()
            && mime_hint.is_char_boundary(family.len())
            && mime_hint[..family.len()].eq_ignore_ascii_case(family)
    }
}

impl Default for AcceptFilter {
    fn default() -> Self {
        Self::images()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireRejection {
    Empty,
    MultipleFiles { count: usize },
    NotAccepted { name: String, mime_hint: String },
}

impl fmt::Display for AcquireRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquireRejection::Empty => write!(f, "no files offered"),
            AcquireRejection::MultipleFiles { count } => {
                write!(f, "{count} files offered, only one is accepted")
            }
            AcquireRejection::NotAccepted { name, mime_hint } => {
                write!(f, "{name} ({mime_hint}) is not an image")
            }
        }
    }
}

/// Single-file policy: exactly one accepted candidate, otherwise the whole
/// offer is rejected.
pub fn select_candidate(
    mut candidates: Vec<SourceCandidate>,
    filter: &AcceptFilter,
) -> Result<SourceCandidate, AcquireRejection> {
    match candidates.len() {
        0 => return Err(AcquireRejection::Empty),
        1 => {}
        count => return Err(AcquireRejection::MultipleFiles { count }),
    }
    let candidate = candidates.remove(0);
    if !filter.accepts(&candidate.mime_hint) {
        return Err(AcquireRejection::NotAccepted {
            name: candidate.name,
            mime_hint: candidate.mime_hint,
        });
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, mime: &str) -> SourceCandidate {
        SourceCandidate {
            name: name.to_string(),
            mime_hint: mime.to_string(),
            path: PathBuf::from(name),
        }
    }

    #[test]
    fn filter_matches_image_family_only() {
        let filter = AcceptFilter::images();
        assert!(filter.accepts("image/png"));
        assert!(filter.accepts("IMAGE/JPEG"));
        assert!(!filter.accepts("image/"));
        assert!(!filter.accepts("application/pdf"));
        assert!(!filter.accepts(""));
    }

    #[test]
    fn single_file_policy() {
        let filter = AcceptFilter::images();
        assert_eq!(
            select_candidate(Vec::new(), &filter),
            Err(AcquireRejection::Empty)
        );
        assert_eq!(
            select_candidate(
                vec![candidate("a.png", "image/png"), candidate("b.png", "image/png")],
                &filter
            ),
            Err(AcquireRejection::MultipleFiles { count: 2 })
        );
        assert_eq!(
            select_candidate(vec![candidate("a.png", "image/png")], &filter),
            Ok(candidate("a.png", "image/png"))
        );
    }

    #[test]
    fn non_image_is_rejected() {
        let rejection =
            select_candidate(vec![candidate("notes.txt", "text/plain")], &AcceptFilter::images())
                .unwrap_err();
        assert!(matches!(rejection, AcquireRejection::NotAccepted { .. }));
    }
}
