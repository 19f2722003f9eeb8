use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::emergency::EmergencyError;
use crate::hardware::HardwareError;

use super::{AlertPattern, PatternTarget};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// How a pattern task ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum PatternOutcome {
    Completed,
    Cancelled { completed_segments: usize },
    Failed { segment: usize, error: HardwareError },
}

/// Plays patterns on one resource, each run on its own tokio task.
#[derive(Clone)]
pub struct PatternPlayer {
    target: Arc<dyn PatternTarget>,
}

impl PatternPlayer {
    pub fn new(target: Arc<dyn PatternTarget>) -> Self {
        Self { target }
    }

    pub fn label(&self) -> &'static str {
        self.target.label()
    }

    /// Spawn the pattern and return immediately. Must be called from inside a
    /// tokio runtime.
    pub fn play(&self, pattern: &AlertPattern) -> PatternHandle {
        let cancel_token = CancellationToken::new();
        let join = tokio::spawn(run_pattern(
            Arc::clone(&self.target),
            pattern.clone(),
            cancel_token.clone(),
        ));

        PatternHandle {
            label: self.target.label(),
            cancel_token,
            join,
        }
    }
}

/// Tracked, cancellable run of one pattern.
pub struct PatternHandle {
    label: &'static str,
    cancel_token: CancellationToken,
    join: JoinHandle<PatternOutcome>,
}

impl PatternHandle {
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Request cancellation without waiting for the resource to go dark.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub async fn wait(self) -> Result<PatternOutcome, EmergencyError> {
        self.join
            .await
            .map_err(|err| EmergencyError::PatternTask(err.to_string()))
    }

    /// Cancel and wait at most `bound` for the task to confirm the resource
    /// is off. On timeout the task is aborted.
    pub async fn cancel_and_wait(self, bound: Duration) -> Result<PatternOutcome, EmergencyError> {
        self.cancel_token.cancel();
        let mut join = self.join;

        match time::timeout(bound, &mut join).await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(err)) => Err(EmergencyError::PatternTask(err.to_string())),
            Err(_) => {
                join.abort();
                Err(EmergencyError::CancellationTimeout {
                    resource: self.label,
                    waited_ms: u64::try_from(bound.as_millis()).unwrap_or(u64::MAX),
                })
            }
        }
    }
}

async fn run_pattern(
    target: Arc<dyn PatternTarget>,
    pattern: AlertPattern,
    cancel_token: CancellationToken,
) -> PatternOutcome {
    let started = Instant::now();
    let label = target.label();

    for (index, segment) in pattern.segments().iter().enumerate() {
        if cancel_token.is_cancelled() {
            return finish(target.as_ref(), PatternOutcome::Cancelled {
                completed_segments: index,
            });
        }

        if let Err(error) = target.on_phase(segment.on()) {
            log_error!("{label}: segment {index} of {} failed to start: {error}", pattern.name());
            return finish(target.as_ref(), PatternOutcome::Failed { segment: index, error });
        }
        if !hold(segment.on(), &cancel_token).await {
            return finish(target.as_ref(), PatternOutcome::Cancelled {
                completed_segments: index,
            });
        }

        if let Err(error) = target.off_phase() {
            log_error!("{label}: segment {index} of {} failed to stop: {error}", pattern.name());
            return finish(target.as_ref(), PatternOutcome::Failed { segment: index, error });
        }
        if !hold(segment.off(), &cancel_token).await {
            return finish(target.as_ref(), PatternOutcome::Cancelled {
                completed_segments: index + 1,
            });
        }
    }

    log_info!(
        "{label}: pattern {} finished in {}ms",
        pattern.name(),
        started.elapsed().as_millis()
    );
    PatternOutcome::Completed
}

/// Sleep for `duration` unless cancelled first. Returns false on cancel.
async fn hold(duration: Duration, cancel_token: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel_token.cancelled() => false,
        _ = time::sleep(duration) => true,
    }
}

fn finish(target: &dyn PatternTarget, outcome: PatternOutcome) -> PatternOutcome {
    if let Err(err) = target.shutdown() {
        log_warn!("{}: shutdown after {:?} failed: {err}", target.label(), outcome);
    }
    if let PatternOutcome::Cancelled { completed_segments } = outcome {
        log_info!("{}: pattern cancelled after {completed_segments} segments", target.label());
    }
    outcome
}
