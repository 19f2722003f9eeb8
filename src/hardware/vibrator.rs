use std::time::Duration;

use crate::pattern::PatternTarget;

use super::HardwareError;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Platform side of the vibration motor.
pub trait VibratorDevice: Send + Sync {
    fn has_vibrator(&self) -> bool;

    fn vibrate_one_shot(&self, duration: Duration) -> Result<(), HardwareError>;

    /// `timings` alternates off/on spans in milliseconds, starting with off.
    fn vibrate_waveform(&self, timings: &[u64], repeat: Option<usize>)
        -> Result<(), HardwareError>;

    fn cancel(&self) -> Result<(), HardwareError>;
}

/// Best-effort vibration adapter.
///
/// Every call is fire-and-forget: a missing motor or a backend error turns the
/// call into a no-op and nothing is reported upward.
pub struct Vibrator {
    device: Box<dyn VibratorDevice>,
    available: bool,
}

impl Vibrator {
    pub fn new(device: Box<dyn VibratorDevice>) -> Self {
        let available = device.has_vibrator();
        Self { device, available }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn play_one_shot(&self, duration: Duration) {
        if !self.available {
            return;
        }
        if let Err(err) = self.device.vibrate_one_shot(duration) {
            log_warn!("one-shot vibration failed: {err}");
        }
    }

    pub fn play_waveform(&self, timings: &[u64], repeat: Option<usize>) {
        if !self.available || timings.is_empty() {
            return;
        }
        if let Err(err) = self.device.vibrate_waveform(timings, repeat) {
            log_warn!("waveform vibration failed: {err}");
        }
    }

    pub fn cancel(&self) {
        if !self.available {
            return;
        }
        if let Err(err) = self.device.cancel() {
            log_warn!("vibration cancel failed: {err}");
        }
    }
}

impl PatternTarget for Vibrator {
    fn label(&self) -> &'static str {
        "vibrator"
    }

    fn on_phase(&self, duration: Duration) -> Result<(), HardwareError> {
        self.play_one_shot(duration);
        Ok(())
    }

    fn off_phase(&self) -> Result<(), HardwareError> {
        Ok(())
    }

    fn shutdown(&self) -> Result<(), HardwareError> {
        self.cancel();
        Ok(())
    }
}
