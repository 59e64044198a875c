use imgshift_logging::{engine_debug, engine_info, engine_warn};

use crate::acquire::select_candidate;
use crate::{AppState, Effect, MissingInputs, Msg, Prompt};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesDropped(candidates) => {
            match select_candidate(candidates, state.accept_filter()) {
                Ok(candidate) => {
                    let source = state.acquire(candidate);
                    engine_info!(
                        "Acquired source id={} name={} mime={}",
                        source.id,
                        source.name,
                        source.mime_hint
                    );
                }
                Err(rejection) => {
                    engine_debug!("Ignoring offered files: {}", rejection);
                }
            }
            Vec::new()
        }
        Msg::FormatSelected(format) => {
            if state.select_format(format) {
                engine_debug!("Target format set to {:?}", format);
            }
            Vec::new()
        }
        Msg::ConvertClicked => {
            let (Some(source), Some(format)) = (state.source().cloned(), state.format()) else {
                let missing = match (state.source(), state.format()) {
                    (None, None) => MissingInputs::FileAndFormat,
                    (None, Some(_)) => MissingInputs::File,
                    (Some(_), _) => MissingInputs::Format,
                };
                return (state, vec![Effect::Prompt(Prompt::MissingInputs(missing))]);
            };
            if let Some(ticket) = state.in_flight() {
                engine_debug!("Convert ignored, run {} still in flight", ticket.run_id);
                return (state, vec![Effect::Prompt(Prompt::ConversionInFlight)]);
            }

            let run_id = state.begin_run(source.clone(), format);
            vec![Effect::StartConversion {
                run_id,
                source,
                format,
            }]
        }
        Msg::ConversionFinished { run_id, outcome } => {
            let Some(ticket) = state.take_in_flight(run_id) else {
                engine_debug!("Discarding result of superseded run {}", run_id);
                return (state, Vec::new());
            };
            match outcome {
                Ok(result) => {
                    let request = state.complete_run(ticket, result);
                    vec![Effect::Deliver { run_id, request }]
                }
                Err(failure) => {
                    engine_warn!("Run {} failed: {}", run_id, failure);
                    state.fail_run(ticket, failure);
                    Vec::new()
                }
            }
        }
        Msg::DeliveryFinished { run_id, outcome } => {
            if !state.apply_delivery(run_id, outcome) {
                engine_debug!("Discarding delivery outcome of superseded run {}", run_id);
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
