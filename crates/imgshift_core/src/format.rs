use std::fmt;
use std::str::FromStr;

/// Output format offered to the user. "Unset" is modelled as `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetFormat {
    Jpg,
    Png,
    Webp,
    Gif,
}

impl TargetFormat {
    /// Every selectable format, in the order the dropdown lists them.
    pub const ALL: [TargetFormat; 4] = [
        TargetFormat::Jpg,
        TargetFormat::Png,
        TargetFormat::Webp,
        TargetFormat::Gif,
    ];

    /// Identifier used for extensions and the media type suffix.
    pub fn as_str(self) -> &'static str {
        match self {
            TargetFormat::Jpg => "jpg",
            TargetFormat::Png => "png",
            TargetFormat::Webp => "webp",
            TargetFormat::Gif => "gif",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TargetFormat::Jpg => "JPG",
            TargetFormat::Png => "PNG",
            TargetFormat::Webp => "WEBP",
            TargetFormat::Gif => "GIF",
        }
    }

    /// `image/<format>`, built by plain concatenation (so jpg yields `image/jpg`).
    pub fn media_type(self) -> String {
        format!("image/{}", self.as_str())
    }

    /// Parses a dropdown selection where `unset` (or an empty string) clears it.
    pub fn parse_selection(input: &str) -> Result<Option<TargetFormat>, UnknownFormat> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unset") {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown format '{0}' (expected one of jpg, png, webp, gif)")]
pub struct UnknownFormat(pub String);

impl FromStr for TargetFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(TargetFormat::Jpg),
            "png" => Ok(TargetFormat::Png),
            "webp" => Ok(TargetFormat::Webp),
            "gif" => Ok(TargetFormat::Gif),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}
