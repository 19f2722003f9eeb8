pub mod player;

pub use player::{PatternHandle, PatternOutcome, PatternPlayer};

use std::borrow::Cow;
use std::time::Duration;

use serde::Serialize;

use crate::hardware::HardwareError;

/// A resource a pattern can be played on.
pub trait PatternTarget: Send + Sync + 'static {
    fn label(&self) -> &'static str;

    /// Start of a pulse. `duration` is how long the pulse will be held.
    fn on_phase(&self, duration: Duration) -> Result<(), HardwareError>;

    fn off_phase(&self) -> Result<(), HardwareError>;

    /// Drive the resource to its resting state after a cancel or a failure.
    fn shutdown(&self) -> Result<(), HardwareError> {
        self.off_phase()
    }
}

/// One pulse: `on_ms` lit / buzzing, then `off_ms` dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSegment {
    pub on_ms: u64,
    pub off_ms: u64,
}

impl PatternSegment {
    pub const fn new(on_ms: u64, off_ms: u64) -> Self {
        Self { on_ms, off_ms }
    }

    pub fn on(&self) -> Duration {
        Duration::from_millis(self.on_ms)
    }

    pub fn off(&self) -> Duration {
        Duration::from_millis(self.off_ms)
    }
}

const DOT_MS: u64 = 200;
const DASH_MS: u64 = 600;
const GAP_MS: u64 = 200;
const LETTER_GAP_MS: u64 = 400;

const DOT: PatternSegment = PatternSegment::new(DOT_MS, GAP_MS);
const DASH: PatternSegment = PatternSegment::new(DASH_MS, GAP_MS);
const LAST_DOT: PatternSegment = PatternSegment::new(DOT_MS, GAP_MS + LETTER_GAP_MS);
const LAST_DASH: PatternSegment = PatternSegment::new(DASH_MS, GAP_MS + LETTER_GAP_MS);

/// ... --- ... for the torch. Letter gaps ride on the off phase of the last
/// pulse of each letter.
static SOS_LIGHT_SEGMENTS: [PatternSegment; 9] = [
    DOT, DOT, LAST_DOT, DASH, DASH, LAST_DASH, DOT, DOT, DOT,
];

/// ... --- ... for the vibration motor, in the platform's flattened form:
/// alternating off/on spans in ms, starting with a 0 ms lead-in.
pub const SOS_VIBRATION_WAVEFORM: [u64; 19] = [
    0, //
    200, 200, 200, 200, 200, 200, //
    500, 200, 500, 200, 500, 200, //
    200, 200, 200, 200, 200, 0,
];

/// Immutable timed on/off waveform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertPattern {
    name: Cow<'static, str>,
    segments: Cow<'static, [PatternSegment]>,
}

impl AlertPattern {
    pub fn new(name: impl Into<Cow<'static, str>>, segments: Vec<PatternSegment>) -> Self {
        Self {
            name: name.into(),
            segments: Cow::Owned(segments),
        }
    }

    pub fn sos_light() -> Self {
        Self {
            name: Cow::Borrowed("sos-light"),
            segments: Cow::Borrowed(&SOS_LIGHT_SEGMENTS),
        }
    }

    pub fn sos_vibration() -> Self {
        Self::from_waveform("sos-vibration", &SOS_VIBRATION_WAVEFORM)
    }

    /// Parse a flattened `[off, on, off, on, ...]` waveform.
    ///
    /// The leading off span has no segment to attach to and is dropped; a
    /// trailing on span without an off span gets an off of 0.
    pub fn from_waveform(name: impl Into<Cow<'static, str>>, timings: &[u64]) -> Self {
        let spans = timings.get(1..).unwrap_or_default();
        let segments = spans
            .chunks(2)
            .map(|pair| match pair {
                [on, off] => PatternSegment::new(*on, *off),
                [on] => PatternSegment::new(*on, 0),
                _ => PatternSegment::new(0, 0),
            })
            .collect();
        Self::new(name, segments)
    }

    /// Flatten into the platform waveform form with a 0 ms lead-in.
    pub fn to_waveform(&self) -> Vec<u64> {
        let mut timings = Vec::with_capacity(self.segments.len() * 2 + 1);
        timings.push(0);
        for segment in self.segments.iter() {
            timings.push(segment.on_ms);
            timings.push(segment.off_ms);
        }
        timings
    }

    /// This pattern played `times` times back to back.
    pub fn repeated(&self, times: usize) -> Self {
        if times <= 1 {
            return self.clone();
        }
        let segments = self
            .segments
            .iter()
            .copied()
            .cycle()
            .take(self.segments.len().saturating_mul(times))
            .collect();
        Self::new(format!("{}x{times}", self.name), segments)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn total_duration(&self) -> Duration {
        let total_ms = self
            .segments
            .iter()
            .map(|s| s.on_ms.saturating_add(s.off_ms))
            .fold(0u64, u64::saturating_add);
        Duration::from_millis(total_ms)
    }
}
