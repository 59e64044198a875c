use std::fmt;

use crate::{DeliveryRequest, RunId, SourceFile, TargetFormat};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Read the source bytes and hand them to the conversion boundary.
    StartConversion {
        run_id: RunId,
        source: SourceFile,
        format: TargetFormat,
    },
    /// Save a converted artifact.
    Deliver {
        run_id: RunId,
        request: DeliveryRequest,
    },
    /// Show a message to the user; the state is left untouched.
    Prompt(Prompt),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    MissingInputs(MissingInputs),
    ConversionInFlight,
}

/// Which of the two conversion inputs are absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingInputs {
    File,
    Format,
    FileAndFormat,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prompt::MissingInputs(MissingInputs::FileAndFormat) => {
                write!(f, "Please upload a file and select a format.")
            }
            Prompt::MissingInputs(MissingInputs::File) => write!(f, "Please upload a file."),
            Prompt::MissingInputs(MissingInputs::Format) => write!(f, "Please select a format."),
            Prompt::ConversionInFlight => {
                write!(f, "A conversion is already running, please wait.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_what_is_missing() {
        assert_eq!(
            Prompt::MissingInputs(MissingInputs::FileAndFormat).to_string(),
            "Please upload a file and select a format."
        );
        assert_eq!(Prompt::MissingInputs(MissingInputs::File).to_string(), "Please upload a file.");
        assert_eq!(
            Prompt::MissingInputs(MissingInputs::Format).to_string(),
            "Please select a format."
        );
    }
}
