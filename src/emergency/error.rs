use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::hardware::HardwareError;

/// The three effects an activation fans out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Torch,
    Vibration,
    Volume,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Torch => "torch",
            Resource::Vibration => "vibration",
            Resource::Volume => "volume",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum EmergencyError {
    #[error("{resource} permission denied")]
    PermissionDenied { resource: Resource },

    #[error("{resource} is not present on this device")]
    HardwareUnavailable { resource: Resource },

    #[error("{resource} is busy")]
    HardwareBusy { resource: Resource },

    #[error("{resource} failed: {source}")]
    Hardware {
        resource: Resource,
        #[source]
        source: HardwareError,
    },

    #[error("{resource} pattern did not stop within {waited_ms}ms")]
    CancellationTimeout {
        resource: &'static str,
        waited_ms: u64,
    },

    #[error("pattern task failed: {0}")]
    PatternTask(String),

    #[error("not allowed while an emergency session is active")]
    SessionActive,
}

impl EmergencyError {
    /// Lift an adapter failure into the coordinator taxonomy.
    pub fn from_hardware(resource: Resource, err: HardwareError) -> Self {
        match err {
            HardwareError::Unavailable => Self::HardwareUnavailable { resource },
            HardwareError::Busy => Self::HardwareBusy { resource },
            HardwareError::PermissionDenied => Self::PermissionDenied { resource },
            other => Self::Hardware {
                resource,
                source: other,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_errors_map_onto_taxonomy() {
        assert!(matches!(
            EmergencyError::from_hardware(Resource::Torch, HardwareError::Busy),
            EmergencyError::HardwareBusy {
                resource: Resource::Torch
            }
        ));
        assert!(matches!(
            EmergencyError::from_hardware(Resource::Torch, HardwareError::PermissionDenied),
            EmergencyError::PermissionDenied { .. }
        ));
        assert!(matches!(
            EmergencyError::from_hardware(Resource::Volume, HardwareError::backend("dnd policy")),
            EmergencyError::Hardware { .. }
        ));
    }

    #[test]
    fn messages_name_the_resource() {
        let err = EmergencyError::from_hardware(Resource::Torch, HardwareError::Unavailable);
        assert_eq!(err.to_string(), "torch is not present on this device");

        let err = EmergencyError::CancellationTimeout {
            resource: "torch",
            waited_ms: 500,
        };
        assert_eq!(err.to_string(), "torch pattern did not stop within 500ms");
    }
}
