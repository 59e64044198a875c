use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use anyhow::bail;
use imgshift_core::{Effect, Msg, Prompt};
use imgshift_engine::{EngineEvent, EngineHandle, EngineSettings};
use imgshift_logging::engine_info;

/// Executes effects against the engine and turns engine events back into
/// messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: EngineSettings) -> std::io::Result<Self> {
        Ok(Self {
            engine: EngineHandle::new(settings)?,
        })
    }

    /// Dispatches engine work and returns the prompts meant for the user.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<Prompt> {
        let mut prompts = Vec::new();
        for effect in effects {
            match effect {
                Effect::StartConversion {
                    run_id,
                    source,
                    format,
                } => {
                    engine_info!(
                        "StartConversion run_id={} source={} format={}",
                        run_id,
                        source.name,
                        format
                    );
                    self.engine.convert(run_id, source, format);
                }
                Effect::Deliver { run_id, request } => {
                    engine_info!("Deliver run_id={} file_name={}", run_id, request.file_name);
                    self.engine.deliver(run_id, request);
                }
                Effect::Prompt(prompt) => prompts.push(prompt),
            }
        }
        prompts
    }

    pub fn next_msg(&self, wait: Duration) -> anyhow::Result<Option<Msg>> {
        match self.engine.recv_timeout(wait) {
            Ok(event) => Ok(Some(map_event(event))),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => bail!("conversion engine stopped"),
        }
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ConversionCompleted { run_id, outcome } => {
            Msg::ConversionFinished { run_id, outcome }
        }
        EngineEvent::DeliveryCompleted { run_id, outcome } => {
            Msg::DeliveryFinished { run_id, outcome }
        }
    }
}
