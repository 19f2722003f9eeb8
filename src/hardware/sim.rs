//! In-memory devices for hosts without the real hardware.
//!
//! Each simulated device is a cheap `Clone` handle over shared state, so the
//! host (or a test) keeps one handle to inspect while the adapter owns
//! another. Failures can be injected per device; every command that reaches a
//! device is recorded with a tokio timestamp, which follows the paused clock in
//! tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use super::{AudioBackend, AudioChannel, HardwareError, TorchDevice, VibratorDevice};

const ENABLE_LOGS: bool = false;

use crate::log_info;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TorchEvent {
    pub at: Instant,
    pub on: bool,
}

#[derive(Debug, Default)]
struct TorchState {
    present: bool,
    lit: bool,
    access: Option<HardwareError>,
    failure: Option<HardwareError>,
    switch_on_failure: Option<HardwareError>,
    events: Vec<TorchEvent>,
}

#[derive(Debug, Clone)]
pub struct SimTorch {
    inner: Arc<Mutex<TorchState>>,
}

impl SimTorch {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(TorchState {
                present: true,
                ..TorchState::default()
            })),
        }
    }

    pub fn absent() -> Self {
        Self {
            inner: Arc::new(Mutex::new(TorchState::default())),
        }
    }

    /// Make `check_access` report `err`.
    pub fn deny_access(&self, err: Option<HardwareError>) {
        lock(&self.inner).access = err;
    }

    /// Make every torch command fail with `err`.
    pub fn fail_with(&self, err: Option<HardwareError>) {
        lock(&self.inner).failure = err;
    }

    /// Make only "on" commands fail; "off" keeps working.
    pub fn fail_switch_on(&self, err: Option<HardwareError>) {
        lock(&self.inner).switch_on_failure = err;
    }

    pub fn is_lit(&self) -> bool {
        lock(&self.inner).lit
    }

    pub fn events(&self) -> Vec<TorchEvent> {
        lock(&self.inner).events.clone()
    }

    pub fn commands(&self) -> Vec<bool> {
        lock(&self.inner).events.iter().map(|e| e.on).collect()
    }
}

impl Default for SimTorch {
    fn default() -> Self {
        Self::new()
    }
}

impl TorchDevice for SimTorch {
    fn has_flash(&self) -> bool {
        lock(&self.inner).present
    }

    fn check_access(&self) -> Result<(), HardwareError> {
        match lock(&self.inner).access.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn set_torch_mode(&self, on: bool) -> Result<(), HardwareError> {
        let mut state = lock(&self.inner);
        if let Some(err) = state.failure.clone() {
            return Err(err);
        }
        if on {
            if let Some(err) = state.switch_on_failure.clone() {
                return Err(err);
            }
        }
        state.lit = on;
        state.events.push(TorchEvent {
            at: Instant::now(),
            on,
        });
        log_info!("sim torch {}", if on { "on" } else { "off" });
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VibrationEvent {
    OneShot(Duration),
    Waveform {
        timings: Vec<u64>,
        repeat: Option<usize>,
    },
    Cancel,
}

#[derive(Debug, Default)]
struct VibratorState {
    present: bool,
    failure: Option<HardwareError>,
    events: Vec<VibrationEvent>,
}

#[derive(Debug, Clone)]
pub struct SimVibrator {
    inner: Arc<Mutex<VibratorState>>,
}

impl SimVibrator {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VibratorState {
                present: true,
                ..VibratorState::default()
            })),
        }
    }

    pub fn absent() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VibratorState::default())),
        }
    }

    pub fn fail_with(&self, err: Option<HardwareError>) {
        lock(&self.inner).failure = err;
    }

    pub fn events(&self) -> Vec<VibrationEvent> {
        lock(&self.inner).events.clone()
    }

    fn record(&self, event: VibrationEvent) -> Result<(), HardwareError> {
        let mut state = lock(&self.inner);
        if let Some(err) = state.failure.clone() {
            return Err(err);
        }
        state.events.push(event);
        Ok(())
    }
}

impl Default for SimVibrator {
    fn default() -> Self {
        Self::new()
    }
}

impl VibratorDevice for SimVibrator {
    fn has_vibrator(&self) -> bool {
        lock(&self.inner).present
    }

    fn vibrate_one_shot(&self, duration: Duration) -> Result<(), HardwareError> {
        self.record(VibrationEvent::OneShot(duration))
    }

    fn vibrate_waveform(
        &self,
        timings: &[u64],
        repeat: Option<usize>,
    ) -> Result<(), HardwareError> {
        self.record(VibrationEvent::Waveform {
            timings: timings.to_vec(),
            repeat,
        })
    }

    fn cancel(&self) -> Result<(), HardwareError> {
        self.record(VibrationEvent::Cancel)
    }
}

#[derive(Debug)]
struct AudioState {
    ring: i32,
    ring_max: i32,
    alarm: i32,
    alarm_max: i32,
    silent: bool,
    failure: Option<HardwareError>,
    writes: Vec<(AudioChannel, i32)>,
}

#[derive(Debug, Clone)]
pub struct SimAudio {
    inner: Arc<Mutex<AudioState>>,
}

impl SimAudio {
    /// Ring channel at `ring` of `ring_max`; the alarm channel starts at 4 of 7.
    pub fn new(ring: i32, ring_max: i32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AudioState {
                ring,
                ring_max,
                alarm: 4,
                alarm_max: 7,
                silent: false,
                failure: None,
                writes: Vec::new(),
            })),
        }
    }

    pub fn set_ring(&self, level: i32) {
        lock(&self.inner).ring = level;
    }

    pub fn set_silent(&self, silent: bool) {
        lock(&self.inner).silent = silent;
    }

    pub fn fail_with(&self, err: Option<HardwareError>) {
        lock(&self.inner).failure = err;
    }

    pub fn ring(&self) -> i32 {
        lock(&self.inner).ring
    }

    pub fn alarm(&self) -> i32 {
        lock(&self.inner).alarm
    }

    pub fn alarm_max(&self) -> i32 {
        lock(&self.inner).alarm_max
    }

    pub fn is_silent(&self) -> bool {
        lock(&self.inner).silent
    }

    /// Every `set_level` call that reached the device, in order.
    pub fn writes(&self) -> Vec<(AudioChannel, i32)> {
        lock(&self.inner).writes.clone()
    }

    fn check(&self) -> Result<MutexGuard<'_, AudioState>, HardwareError> {
        let state = lock(&self.inner);
        match state.failure.clone() {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }
}

impl Default for SimAudio {
    fn default() -> Self {
        Self::new(5, 15)
    }
}

impl AudioBackend for SimAudio {
    fn level(&self, channel: AudioChannel) -> Result<i32, HardwareError> {
        let state = self.check()?;
        Ok(match channel {
            AudioChannel::Ring => state.ring,
            AudioChannel::Alarm => state.alarm,
        })
    }

    fn max_level(&self, channel: AudioChannel) -> Result<i32, HardwareError> {
        let state = self.check()?;
        Ok(match channel {
            AudioChannel::Ring => state.ring_max,
            AudioChannel::Alarm => state.alarm_max,
        })
    }

    fn set_level(&self, channel: AudioChannel, level: i32) -> Result<(), HardwareError> {
        let mut state = self.check()?;
        match channel {
            AudioChannel::Ring => state.ring = level,
            AudioChannel::Alarm => state.alarm = level,
        }
        state.writes.push((channel, level));
        log_info!("sim {} volume -> {level}", channel.as_str());
        Ok(())
    }

    fn is_ringer_silent(&self) -> Result<bool, HardwareError> {
        Ok(self.check()?.silent)
    }

    fn set_ringer_normal(&self) -> Result<(), HardwareError> {
        self.check()?.silent = false;
        Ok(())
    }
}
