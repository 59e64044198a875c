use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use imgshift_core::{
    ConversionFailure, ConversionOutcome, DeliveryFault, DeliveryOutcome, DeliveryRequest,
    FailureKind, RunId, SourceFile, TargetFormat,
};
use imgshift_logging::{engine_error, engine_info};

use crate::acquire::{ByteSource, FileAcquirer};
use crate::convert::{Converter, ImageCrateConverter};
use crate::deliver::{ArtifactDelivery, DirectorySaveTarget, SaveTarget};
use crate::invoke::ConversionInvoker;
use crate::{EngineEvent, EngineSettings};

enum EngineCommand {
    Convert {
        run_id: RunId,
        source: SourceFile,
        format: TargetFormat,
    },
    Deliver {
        run_id: RunId,
        request: DeliveryRequest,
    },
}

/// Collaborators the engine drives; swapped out in tests.
pub struct EngineParts {
    pub bytes: Arc<dyn ByteSource>,
    pub converter: Arc<dyn Converter>,
    pub save_target: Arc<dyn SaveTarget>,
}

impl EngineParts {
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            bytes: Arc::new(FileAcquirer),
            converter: Arc::new(ImageCrateConverter),
            save_target: Arc::new(DirectorySaveTarget::new(settings.output_dir.clone())),
        }
    }
}

#[derive(Clone)]
struct Workers {
    bytes: Arc<dyn ByteSource>,
    invoker: ConversionInvoker,
    delivery: ArtifactDelivery,
}

pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> io::Result<Self> {
        let parts = EngineParts::from_settings(&settings);
        Self::with_parts(settings, parts)
    }

    pub fn with_parts(settings: EngineSettings, parts: EngineParts) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_time()
            .thread_name("imgshift-engine")
            .build()?;
        let workers = Workers {
            bytes: parts.bytes,
            invoker: ConversionInvoker::new(parts.converter)
                .with_timeout(settings.conversion_timeout),
            delivery: ArtifactDelivery::new(parts.save_target),
        };

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let workers = workers.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let event = handle_command(&workers, command).await;
                    let _ = event_tx.send(event);
                });
            }
            engine_info!("Engine command channel closed, shutting down");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn convert(&self, run_id: RunId, source: SourceFile, format: TargetFormat) {
        let _ = self.cmd_tx.send(EngineCommand::Convert {
            run_id,
            source,
            format,
        });
    }

    pub fn deliver(&self, run_id: RunId, request: DeliveryRequest) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::Deliver { run_id, request });
    }

    /// Waits up to `timeout` for the next event. `Disconnected` means the
    /// engine thread is gone and no further events will arrive.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }
}

async fn handle_command(workers: &Workers, command: EngineCommand) -> EngineEvent {
    match command {
        EngineCommand::Convert {
            run_id,
            source,
            format,
        } => {
            let outcome = convert_source(workers, &source, format).await;
            EngineEvent::ConversionCompleted { run_id, outcome }
        }
        EngineCommand::Deliver { run_id, request } => {
            let delivery = workers.delivery.clone();
            let outcome: DeliveryOutcome =
                match tokio::task::spawn_blocking(move || delivery.deliver(&request)).await {
                    Ok(Ok(receipt)) => Ok(receipt),
                    Ok(Err(err)) => Err(DeliveryFault {
                        message: err.to_string(),
                    }),
                    Err(join_err) => Err(DeliveryFault {
                        message: format!("delivery task aborted: {join_err}"),
                    }),
                };
            if let Err(fault) = &outcome {
                engine_error!("Run {} {}", run_id, fault);
            }
            EngineEvent::DeliveryCompleted { run_id, outcome }
        }
    }
}

async fn convert_source(
    workers: &Workers,
    source: &SourceFile,
    format: TargetFormat,
) -> ConversionOutcome {
    let bytes = match workers.bytes.read_bytes(source).await {
        Ok(bytes) => bytes,
        Err(err) => {
            engine_error!("Could not read source {}: {}", source.name, err);
            return Err(ConversionFailure::new(
                FailureKind::SourceUnreadable,
                err.to_string(),
            ));
        }
    };
    workers.invoker.convert(bytes, format).await
}
