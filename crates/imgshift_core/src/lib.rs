//! Imgshift core: pure conversion workflow state machine and view-model helpers.
mod acquire;
mod effect;
mod filename;
mod format;
mod msg;
mod outcome;
mod state;
mod update;
mod view_model;

pub use acquire::{
    select_candidate, AcceptFilter, AcquireRejection, SourceCandidate, SourceFile, SourceId,
};
pub use effect::{Effect, MissingInputs, Prompt};
pub use filename::delivered_filename;
pub use format::{TargetFormat, UnknownFormat};
pub use msg::Msg;
pub use outcome::{
    ConversionFailure, ConversionOutcome, ConversionResult, DeliveryFault, DeliveryOutcome,
    DeliveryReceipt, DeliveryRequest, DeliveryStatus, FailureKind, RunId,
};
pub use state::{AppState, RunState, RunTicket, WorkflowState};
pub use update::update;
pub use view_model::{AppViewModel, FormatOption};
