use serde::{Deserialize, Serialize};

use super::HardwareError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AudioChannel {
    Ring,
    Alarm,
}

impl AudioChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioChannel::Ring => "ring",
            AudioChannel::Alarm => "alarm",
        }
    }
}

/// Platform side of the audio manager.
pub trait AudioBackend: Send + Sync {
    fn level(&self, channel: AudioChannel) -> Result<i32, HardwareError>;

    fn max_level(&self, channel: AudioChannel) -> Result<i32, HardwareError>;

    fn set_level(&self, channel: AudioChannel, level: i32) -> Result<(), HardwareError>;

    fn is_ringer_silent(&self) -> Result<bool, HardwareError>;

    fn set_ringer_normal(&self) -> Result<(), HardwareError>;
}

/// Volume and ringer adapter over the two channels the alert touches.
pub struct AudioOutput {
    backend: Box<dyn AudioBackend>,
}

impl AudioOutput {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self { backend }
    }

    pub fn level(&self, channel: AudioChannel) -> Result<i32, HardwareError> {
        self.backend.level(channel)
    }

    pub fn max_level(&self, channel: AudioChannel) -> Result<i32, HardwareError> {
        self.backend.max_level(channel)
    }

    /// Levels outside `0..=max_level` are clamped before reaching the backend.
    pub fn set_level(&self, channel: AudioChannel, level: i32) -> Result<(), HardwareError> {
        let max = self.backend.max_level(channel)?;
        self.backend.set_level(channel, level.clamp(0, max.max(0)))
    }

    pub fn set_to_max(&self, channel: AudioChannel) -> Result<i32, HardwareError> {
        let max = self.backend.max_level(channel)?;
        self.backend.set_level(channel, max)?;
        Ok(max)
    }

    pub fn is_ringer_silent(&self) -> Result<bool, HardwareError> {
        self.backend.is_ringer_silent()
    }

    pub fn set_ringer_normal(&self) -> Result<(), HardwareError> {
        self.backend.set_ringer_normal()
    }

    /// Current level as a whole percentage of the channel's maximum.
    pub fn volume_percentage(&self, channel: AudioChannel) -> Result<u8, HardwareError> {
        let max = self.backend.max_level(channel)?;
        if max <= 0 {
            return Ok(0);
        }
        let current = self.backend.level(channel)?.clamp(0, max);
        Ok(((current as f32 / max as f32) * 100.0) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::sim::SimAudio;

    #[test]
    fn percentage_truncates_like_the_platform() {
        let sim = SimAudio::new(3, 15);
        let audio = AudioOutput::new(Box::new(sim.clone()));
        assert_eq!(audio.volume_percentage(AudioChannel::Ring), Ok(20));

        sim.set_ring(7);
        assert_eq!(audio.volume_percentage(AudioChannel::Ring), Ok(46));
    }

    #[test]
    fn zero_max_reports_zero_percent() {
        let audio = AudioOutput::new(Box::new(SimAudio::new(0, 0)));
        assert_eq!(audio.volume_percentage(AudioChannel::Ring), Ok(0));
    }

    #[test]
    fn set_level_clamps_to_channel_range() {
        let sim = SimAudio::new(3, 15);
        let audio = AudioOutput::new(Box::new(sim.clone()));

        audio.set_level(AudioChannel::Ring, 40).unwrap();
        assert_eq!(sim.ring(), 15);
        audio.set_level(AudioChannel::Ring, -2).unwrap();
        assert_eq!(sim.ring(), 0);
    }

    #[test]
    fn set_to_max_returns_the_level_written() {
        let sim = SimAudio::new(3, 15);
        let audio = AudioOutput::new(Box::new(sim.clone()));
        assert_eq!(audio.set_to_max(AudioChannel::Alarm), Ok(sim.alarm_max()));
        assert_eq!(sim.alarm(), sim.alarm_max());
    }
}
