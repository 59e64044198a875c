use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Directory the save step writes delivered artifacts into.
    pub output_dir: PathBuf,
    /// Upper bound for one conversion call; `None` waits indefinitely.
    pub conversion_timeout: Option<Duration>,
}

impl EngineSettings {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            ..Self::default()
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            conversion_timeout: None,
        }
    }
}
