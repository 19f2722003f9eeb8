//! SOS alert coordination for a handset: Morse SOS on the camera torch, a
//! matching vibration waveform, ringer forced out of silent mode with ring and
//! alarm volume at maximum, and full restoration afterwards.
//!
//! The host supplies platform backends ([`TorchDevice`], [`VibratorDevice`],
//! [`AudioBackend`]), wraps them in adapters and hands those to one
//! [`EmergencyCoordinator`]. [`hardware::sim`] has in-memory backends for
//! hosts without the hardware.

pub mod emergency;
pub mod hardware;
pub mod pattern;
pub mod settings;
pub mod utils;

pub use emergency::{
    ActivationOutcome, ActivationReport, DeactivationReport, EmergencyConfig,
    EmergencyCoordinator, EmergencyError, EmergencySnapshot, EmergencyStatus, Resource,
    ResourceStatus, StatusChangedEvent,
};
pub use hardware::{
    AudioBackend, AudioChannel, AudioOutput, Capabilities, HardwareError, Torch, TorchDevice,
    Vibrator, VibratorDevice,
};
pub use pattern::{AlertPattern, PatternHandle, PatternOutcome, PatternPlayer, PatternSegment};
pub use settings::{EmergencySettings, SettingsStore};
pub use utils::logging::init_logging;
