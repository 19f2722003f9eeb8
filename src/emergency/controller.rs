use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::sync::{broadcast, watch, Mutex};
use uuid::Uuid;

use crate::hardware::{
    AudioChannel, AudioOutput, Capabilities, HardwareError, Torch, Vibrator,
};
use crate::pattern::PatternPlayer;

use super::{
    ActivationOutcome, ActivationReport, DeactivationReport, EmergencyConfig, EmergencyError,
    EmergencySession, EmergencySnapshot, EmergencyStatus, Resource, ResourceStatus,
    StatusChangedEvent,
};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

const EVENT_CAPACITY: usize = 16;

/// Owns the torch, vibrator and audio adapters and runs at most one SOS alert
/// on them at a time.
///
/// `activate()` and `deactivate()` serialize on the session lock; `is_active()`
/// and `status()` read a watch channel and never wait on a transition.
pub struct EmergencyCoordinator {
    torch: Arc<Torch>,
    torch_player: PatternPlayer,
    vibrator: Vibrator,
    audio: AudioOutput,
    config: EmergencyConfig,
    session: Mutex<EmergencySession>,
    status_tx: watch::Sender<EmergencyStatus>,
    events_tx: broadcast::Sender<StatusChangedEvent>,
}

impl EmergencyCoordinator {
    pub fn new(torch: Torch, vibrator: Vibrator, audio: AudioOutput, config: EmergencyConfig) -> Self {
        let torch = Arc::new(torch);
        let torch_player = PatternPlayer::new(torch.clone());
        let (status_tx, _) = watch::channel(EmergencyStatus::Idle);
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

        log_info!(
            "emergency coordinator ready (torch: {}, vibrator: {})",
            torch.is_available(),
            vibrator.is_available()
        );

        Self {
            torch,
            torch_player,
            vibrator,
            audio,
            config,
            session: Mutex::new(EmergencySession::new()),
            status_tx,
            events_tx,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status_tx.borrow().is_engaged()
    }

    pub fn status(&self) -> EmergencyStatus {
        *self.status_tx.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<EmergencyStatus> {
        self.status_tx.subscribe()
    }

    /// Every transition, in order, for presenters that need more than the
    /// latest status.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusChangedEvent> {
        self.events_tx.subscribe()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            torch: self.torch.is_available(),
            vibrator: self.vibrator.is_available(),
        }
    }

    pub fn config(&self) -> &EmergencyConfig {
        &self.config
    }

    pub async fn snapshot(&self) -> EmergencySnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn activate(&self) -> Result<ActivationOutcome, EmergencyError> {
        let mut session = self.session.lock().await;
        if session.status != EmergencyStatus::Idle {
            log_info!("activate ignored, emergency mode already {}", session.status.as_str());
            return Ok(ActivationOutcome::AlreadyActive {
                status: session.status,
            });
        }

        // Permission problems abort before anything is touched.
        let torch_access = self
            .torch
            .is_available()
            .then(|| self.torch.check_access());
        if let Some(Err(HardwareError::PermissionDenied)) = torch_access {
            log_warn!("activate refused: torch permission not granted");
            return Err(EmergencyError::PermissionDenied {
                resource: Resource::Torch,
            });
        }

        let session_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        session.begin(session_id.clone(), started_at);
        self.publish(&session);

        let volume = self.raise_volume(&mut session);
        let vibration = self.start_vibration();
        let torch = match torch_access {
            None => ResourceStatus::Unavailable,
            Some(Err(err)) => {
                log_warn!("torch skipped for session {session_id}: {err}");
                ResourceStatus::Failed(err)
            }
            Some(Ok(())) => {
                session
                    .pattern_tasks
                    .push(self.torch_player.play(&self.config.light_pattern));
                ResourceStatus::Ok
            }
        };

        session.status = EmergencyStatus::Active;
        self.publish(&session);

        let report = ActivationReport {
            session_id,
            started_at,
            torch,
            vibration,
            volume,
        };
        log_info!(
            "emergency mode ACTIVATED (session {}, torch: {:?}, vibration: {:?}, volume: {:?})",
            report.session_id,
            report.torch,
            report.vibration,
            report.volume
        );
        Ok(ActivationOutcome::Started(report))
    }

    pub async fn deactivate(&self) -> DeactivationReport {
        let mut session = self.session.lock().await;
        if session.status == EmergencyStatus::Idle {
            return DeactivationReport::default();
        }

        session.status = EmergencyStatus::Deactivating;
        self.publish(&session);

        let mut report = DeactivationReport {
            was_active: true,
            session_id: session.session_id.clone(),
            ..DeactivationReport::default()
        };

        for handle in std::mem::take(&mut session.pattern_tasks) {
            match handle.cancel_and_wait(self.config.cancel_timeout).await {
                Ok(outcome) => report.pattern_outcomes.push(outcome),
                Err(err @ EmergencyError::CancellationTimeout { .. }) => {
                    log_warn!("{err}; abandoning the task");
                    report.cancellation_timeouts += 1;
                }
                Err(err) => log_error!("pattern task ended badly: {err}"),
            }
        }

        self.vibrator.cancel();

        if let Some(level) = session.saved_volume_level.take() {
            match self.audio.set_level(AudioChannel::Ring, level) {
                Ok(()) => {
                    log_info!("ring volume restored to {level}");
                    report.restored_volume = Some(level);
                }
                Err(err) => {
                    log_error!("failed to restore ring volume to {level}: {err}");
                    session.saved_volume_level = Some(level);
                }
            }
        }

        report.torch_off = self.torch.force_off().is_ok();

        session.end();
        self.publish(&session);

        log_info!(
            "emergency mode DEACTIVATED (session {})",
            report.session_id.as_deref().unwrap_or("-")
        );
        report
    }

    /// Teardown of the owning screen: ends any alert and leaves the torch and
    /// vibrator off even if they were driven manually.
    pub async fn shutdown(&self) -> DeactivationReport {
        let report = self.deactivate().await;
        if !report.was_active {
            self.vibrator.cancel();
            if let Err(err) = self.torch.force_off() {
                log_warn!("torch did not turn off on shutdown: {err}");
            }
        }
        report
    }

    /// Manual flashlight. Refused while an alert owns the torch.
    pub async fn toggle_torch(&self) -> Result<bool, EmergencyError> {
        let session = self.session.lock().await;
        if session.status != EmergencyStatus::Idle {
            return Err(EmergencyError::SessionActive);
        }
        self.torch
            .toggle()
            .map_err(|err| EmergencyError::from_hardware(Resource::Torch, err))
    }

    pub fn is_torch_on(&self) -> bool {
        self.torch.is_on()
    }

    pub fn pulse_vibration(&self, duration: Duration) {
        self.vibrator.play_one_shot(duration);
    }

    pub fn volume_percentage(&self) -> Result<u8, EmergencyError> {
        self.audio
            .volume_percentage(AudioChannel::Ring)
            .map_err(|err| EmergencyError::from_hardware(Resource::Volume, err))
    }

    pub fn is_silent_mode(&self) -> Result<bool, EmergencyError> {
        self.audio
            .is_ringer_silent()
            .map_err(|err| EmergencyError::from_hardware(Resource::Volume, err))
    }

    /// Snapshot the ring level, leave silent mode, then push ring (and
    /// optionally alarm) to maximum. Nothing is raised unless the snapshot
    /// succeeded, so a restore never writes a guessed value.
    fn raise_volume(&self, session: &mut EmergencySession) -> ResourceStatus {
        if session.saved_volume_level.is_none() {
            match self.audio.level(AudioChannel::Ring) {
                Ok(level) => {
                    session.save_volume(level);
                    log_info!("saved ring volume {level}");
                }
                Err(err) => {
                    log_error!("could not read ring volume, leaving audio untouched: {err}");
                    return ResourceStatus::Failed(err);
                }
            }
        }

        let ringer = match self.audio.is_ringer_silent() {
            Ok(true) => {
                log_info!("ringer is silent, switching to normal");
                self.audio.set_ringer_normal()
            }
            Ok(false) => Ok(()),
            Err(err) => Err(err),
        };
        let ring = self.audio.set_to_max(AudioChannel::Ring).map(drop);
        let alarm = if self.config.max_alarm_volume {
            self.audio.set_to_max(AudioChannel::Alarm).map(drop)
        } else {
            Ok(())
        };

        let mut first_failure = None;
        for (step, result) in [("ringer mode", ringer), ("ring volume", ring), ("alarm volume", alarm)] {
            if let Err(err) = result {
                log_error!("failed to raise {step}: {err}");
                first_failure.get_or_insert(err);
            }
        }
        match first_failure {
            Some(err) => ResourceStatus::Failed(err),
            None => ResourceStatus::Ok,
        }
    }

    fn start_vibration(&self) -> ResourceStatus {
        if !self.vibrator.is_available() {
            return ResourceStatus::Unavailable;
        }
        if !self.config.vibration_enabled {
            return ResourceStatus::Skipped;
        }
        self.vibrator.play_waveform(&self.config.vibration_waveform, None);
        ResourceStatus::Ok
    }

    fn publish(&self, session: &EmergencySession) {
        self.status_tx.send_replace(session.status);
        let _ = self.events_tx.send(StatusChangedEvent {
            status: session.status,
            session_id: session.session_id.clone(),
            at: Utc::now(),
        });
    }
}
