use crate::view_model::{AppViewModel, FormatOption};
use crate::{
    AcceptFilter, ConversionFailure, ConversionResult, DeliveryOutcome, DeliveryRequest,
    DeliveryStatus, RunId, SourceCandidate, SourceFile, SourceId, TargetFormat,
};

/// Derived position of the workflow; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    FileReady,
    FormatReady,
    Converting,
    Delivered,
    Failed,
}

/// Inputs captured when a run starts, so a late result is matched against
/// what was actually converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTicket {
    pub run_id: RunId,
    pub source: SourceFile,
    pub format: TargetFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    None,
    InFlight(RunTicket),
    Succeeded {
        ticket: RunTicket,
        result: ConversionResult,
        delivery: DeliveryStatus,
    },
    Failed {
        ticket: RunTicket,
        failure: ConversionFailure,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    source: Option<SourceFile>,
    format: Option<TargetFormat>,
    run: RunState,
    accept: AcceptFilter,
    last_source_id: SourceId,
    last_run_id: RunId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Option<&SourceFile> {
        self.source.as_ref()
    }

    pub fn format(&self) -> Option<TargetFormat> {
        self.format
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn accept_filter(&self) -> &AcceptFilter {
        &self.accept
    }

    pub fn workflow(&self) -> WorkflowState {
        match &self.run {
            RunState::InFlight(_) => WorkflowState::Converting,
            RunState::Succeeded { .. } => WorkflowState::Delivered,
            RunState::Failed { .. } => WorkflowState::Failed,
            RunState::None => match (&self.source, self.format) {
                (Some(_), Some(_)) => WorkflowState::FormatReady,
                (Some(_), None) => WorkflowState::FileReady,
                (None, _) => WorkflowState::Idle,
            },
        }
    }

    /// The in-flight ticket, if any.
    pub fn in_flight(&self) -> Option<&RunTicket> {
        match &self.run {
            RunState::InFlight(ticket) => Some(ticket),
            _ => None,
        }
    }

    pub fn current_result(&self) -> Option<&ConversionResult> {
        match &self.run {
            RunState::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn current_failure(&self) -> Option<&ConversionFailure> {
        match &self.run {
            RunState::Failed { failure, .. } => Some(failure),
            _ => None,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let workflow = self.workflow();
        let format_options = std::iter::once(FormatOption {
            value: None,
            label: "Select format",
            selected: self.format.is_none(),
        })
        .chain(TargetFormat::ALL.into_iter().map(|format| FormatOption {
            value: Some(format),
            label: format.label(),
            selected: self.format == Some(format),
        }))
        .collect();

        let (delivery, last_elapsed) = match &self.run {
            RunState::Succeeded {
                result, delivery, ..
            } => (Some(delivery.clone()), Some(result.elapsed)),
            _ => (None, None),
        };

        AppViewModel {
            workflow,
            file_name: self.source.as_ref().map(|source| source.name.clone()),
            selected_format: self.format,
            format_options,
            convert_enabled: self.source.is_some()
                && self.format.is_some()
                && workflow != WorkflowState::Converting,
            last_failure: self.current_failure().cloned(),
            delivery,
            last_elapsed,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Replaces the source, dropping any current or in-flight run.
    pub(crate) fn acquire(&mut self, candidate: SourceCandidate) -> &SourceFile {
        self.last_source_id += 1;
        self.run = RunState::None;
        self.dirty = true;
        self.source.insert(SourceFile {
            id: self.last_source_id,
            name: candidate.name,
            mime_hint: candidate.mime_hint,
            path: candidate.path,
        })
    }

    /// Returns `false` when the selection did not change.
    pub(crate) fn select_format(&mut self, format: Option<TargetFormat>) -> bool {
        if self.format == format {
            return false;
        }
        self.format = format;
        self.run = RunState::None;
        self.dirty = true;
        true
    }

    pub(crate) fn begin_run(&mut self, source: SourceFile, format: TargetFormat) -> RunId {
        self.last_run_id += 1;
        self.run = RunState::InFlight(RunTicket {
            run_id: self.last_run_id,
            source,
            format,
        });
        self.dirty = true;
        self.last_run_id
    }

    /// Takes the in-flight ticket if it belongs to `run_id`.
    pub(crate) fn take_in_flight(&mut self, run_id: RunId) -> Option<RunTicket> {
        match &self.run {
            RunState::InFlight(ticket) if ticket.run_id == run_id => {
                match std::mem::take(&mut self.run) {
                    RunState::InFlight(ticket) => Some(ticket),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    pub(crate) fn complete_run(
        &mut self,
        ticket: RunTicket,
        result: ConversionResult,
    ) -> DeliveryRequest {
        let request =
            DeliveryRequest::new(&ticket.source.name, ticket.format, result.bytes.clone())
                .protecting(ticket.source.path.clone());
        self.run = RunState::Succeeded {
            ticket,
            result,
            delivery: DeliveryStatus::Pending,
        };
        self.dirty = true;
        request
    }

    pub(crate) fn fail_run(&mut self, ticket: RunTicket, failure: ConversionFailure) {
        self.run = RunState::Failed { ticket, failure };
        self.dirty = true;
    }

    /// Returns `false` if the outcome does not belong to the current run.
    pub(crate) fn apply_delivery(&mut self, run_id: RunId, outcome: DeliveryOutcome) -> bool {
        match &mut self.run {
            RunState::Succeeded {
                ticket, delivery, ..
            } if ticket.run_id == run_id => {
                *delivery = match outcome {
                    Ok(receipt) => DeliveryStatus::Saved(receipt),
                    Err(fault) => DeliveryStatus::Faulted(fault),
                };
                self.dirty = true;
                true
            }
            _ => false,
        }
    }
}
