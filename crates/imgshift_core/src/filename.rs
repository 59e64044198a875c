use crate::TargetFormat;

/// Name of the delivered artifact: the original name with its last extension
/// replaced by the target format.
///
/// Everything from the last `.` to the end is dropped; a name without a `.`
/// keeps its full text as the stem.
pub fn delivered_filename(original: &str, format: TargetFormat) -> String {
    let stem = match original.rfind('.') {
        Some(idx) => &original[..idx],
        None => original,
    };
    format!("{stem}.{ext}", ext = format.as_str())
}
