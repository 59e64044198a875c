use std::time::Duration;

use crate::{ConversionFailure, DeliveryStatus, TargetFormat, WorkflowState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub workflow: WorkflowState,
    pub file_name: Option<String>,
    pub selected_format: Option<TargetFormat>,
    pub format_options: Vec<FormatOption>,
    pub convert_enabled: bool,
    pub last_failure: Option<ConversionFailure>,
    pub delivery: Option<DeliveryStatus>,
    pub last_elapsed: Option<Duration>,
    pub dirty: bool,
}

/// One dropdown entry; `value: None` is the "Select format" placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOption {
    pub value: Option<TargetFormat>,
    pub label: &'static str,
    pub selected: bool,
}
