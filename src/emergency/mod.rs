pub mod config;
pub mod controller;
pub mod error;
pub mod report;
pub mod state;

pub use config::EmergencyConfig;
pub use controller::EmergencyCoordinator;
pub use error::{EmergencyError, Resource};
pub use report::{
    ActivationOutcome, ActivationReport, DeactivationReport, ResourceStatus, StatusChangedEvent,
};
pub use state::{EmergencySession, EmergencySnapshot, EmergencyStatus};
