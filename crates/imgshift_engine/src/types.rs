use imgshift_core::{ConversionOutcome, DeliveryOutcome, RunId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    ConversionCompleted {
        run_id: RunId,
        outcome: ConversionOutcome,
    },
    DeliveryCompleted {
        run_id: RunId,
        outcome: DeliveryOutcome,
    },
}

impl EngineEvent {
    pub fn run_id(&self) -> RunId {
        match self {
            EngineEvent::ConversionCompleted { run_id, .. }
            | EngineEvent::DeliveryCompleted { run_id, .. } => *run_id,
        }
    }
}
