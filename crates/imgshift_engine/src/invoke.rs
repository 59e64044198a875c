use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use imgshift_core::{
    ConversionFailure, ConversionOutcome, ConversionResult, FailureKind, TargetFormat,
};
use imgshift_logging::{engine_error, engine_info};

use crate::convert::Converter;

/// Calls the conversion boundary and normalizes every outcome into a
/// `ConversionOutcome`; nothing from the boundary escapes as a panic or error.
#[derive(Clone)]
pub struct ConversionInvoker {
    converter: Arc<dyn Converter>,
    timeout: Option<Duration>,
}

impl ConversionInvoker {
    pub fn new(converter: Arc<dyn Converter>) -> Self {
        Self {
            converter,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn convert(&self, bytes: Vec<u8>, format: TargetFormat) -> ConversionOutcome {
        if bytes.is_empty() {
            return Err(report(
                format,
                Duration::ZERO,
                ConversionFailure::new(FailureKind::EmptyInput, "source file is empty"),
            ));
        }

        let input_len = bytes.len();
        let converter = Arc::clone(&self.converter);
        let started = Instant::now();
        // The blocking task cannot be aborted; on timeout it runs to completion
        // and its output is dropped.
        let task = tokio::task::spawn_blocking(move || converter.convert(&bytes, format));
        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    return Err(report(
                        format,
                        started.elapsed(),
                        ConversionFailure::new(
                            FailureKind::TimedOut,
                            format!("no result within {limit:?}"),
                        ),
                    ));
                }
            },
            None => task.await,
        };
        let elapsed = started.elapsed();

        match joined {
            Ok(Ok(output)) => {
                engine_info!(
                    "Conversion to {} took {:?} ({} -> {} bytes)",
                    format,
                    elapsed,
                    input_len,
                    output.len()
                );
                Ok(ConversionResult {
                    bytes: Bytes::from(output),
                    elapsed,
                })
            }
            Ok(Err(err)) => Err(report(format, elapsed, err.into_failure())),
            Err(join_err) => Err(report(
                format,
                elapsed,
                ConversionFailure::new(
                    FailureKind::Internal,
                    format!("conversion task aborted: {join_err}"),
                ),
            )),
        }
    }
}

fn report(
    format: TargetFormat,
    elapsed: Duration,
    failure: ConversionFailure,
) -> ConversionFailure {
    engine_error!("Conversion to {} failed after {:?}: {}", format, elapsed, failure);
    failure
}
