pub mod audio;
pub mod sim;
pub mod torch;
pub mod vibrator;

pub use audio::{AudioBackend, AudioChannel, AudioOutput};
pub use torch::{Torch, TorchDevice};
pub use vibrator::{Vibrator, VibratorDevice};

use serde::Serialize;
use thiserror::Error;

/// Failure reported by a platform backend.
///
/// Adapters never leave partial state behind when they return one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum HardwareError {
    #[error("hardware not present on this device")]
    Unavailable,
    #[error("device is busy")]
    Busy,
    #[error("permission denied")]
    PermissionDenied,
    #[error("backend failure: {0}")]
    Backend(String),
}

impl HardwareError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Which resources were found when the adapters probed the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub torch: bool,
    pub vibrator: bool,
}
