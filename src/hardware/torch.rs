use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::pattern::PatternTarget;

use super::HardwareError;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

/// Platform side of the camera torch.
pub trait TorchDevice: Send + Sync {
    /// Whether a flash-capable camera exists. Called once at construction.
    fn has_flash(&self) -> bool;

    /// Probe permission / busy state without switching the light.
    fn check_access(&self) -> Result<(), HardwareError> {
        Ok(())
    }

    fn set_torch_mode(&self, on: bool) -> Result<(), HardwareError>;
}

/// Camera torch adapter with a cached availability probe and on/off flag.
pub struct Torch {
    device: Box<dyn TorchDevice>,
    available: bool,
    is_on: Mutex<bool>,
}

impl Torch {
    pub fn new(device: Box<dyn TorchDevice>) -> Self {
        let available = device.has_flash();
        if !available {
            log_info!("no flash-capable camera found, torch disabled");
        }
        Self {
            device,
            available,
            is_on: Mutex::new(false),
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn is_on(&self) -> bool {
        *self.is_on.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn check_access(&self) -> Result<(), HardwareError> {
        if !self.available {
            return Err(HardwareError::Unavailable);
        }
        self.device.check_access()
    }

    /// Switch the torch. Requesting the current state is a no-op.
    pub fn set_on(&self, on: bool) -> Result<(), HardwareError> {
        if !self.available {
            return Err(HardwareError::Unavailable);
        }
        let mut is_on = self.is_on.lock().unwrap_or_else(PoisonError::into_inner);
        if *is_on == on {
            return Ok(());
        }
        self.device.set_torch_mode(on)?;
        *is_on = on;
        Ok(())
    }

    /// Issue the off command even if the cached flag already reads off.
    pub fn force_off(&self) -> Result<(), HardwareError> {
        if !self.available {
            return Ok(());
        }
        let mut is_on = self.is_on.lock().unwrap_or_else(PoisonError::into_inner);
        match self.device.set_torch_mode(false) {
            Ok(()) => {
                *is_on = false;
                Ok(())
            }
            Err(err) => {
                log_error!("failed to force torch off: {err}");
                Err(err)
            }
        }
    }

    /// Flip the torch and return the state it ended up in.
    pub fn toggle(&self) -> Result<bool, HardwareError> {
        let target = !self.is_on();
        self.set_on(target)?;
        Ok(target)
    }
}

impl PatternTarget for Torch {
    fn label(&self) -> &'static str {
        "torch"
    }

    fn on_phase(&self, _duration: Duration) -> Result<(), HardwareError> {
        self.set_on(true)
    }

    fn off_phase(&self) -> Result<(), HardwareError> {
        self.set_on(false)
    }

    fn shutdown(&self) -> Result<(), HardwareError> {
        self.force_off()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::sim::{SimTorch, TorchEvent};

    #[test]
    fn repeated_state_is_a_noop() {
        let sim = SimTorch::new();
        let torch = Torch::new(Box::new(sim.clone()));

        torch.set_on(true).unwrap();
        torch.set_on(true).unwrap();
        torch.set_on(false).unwrap();
        torch.set_on(false).unwrap();

        assert_eq!(sim.commands(), vec![true, false]);
        assert!(!torch.is_on());
    }

    #[test]
    fn failed_switch_on_leaves_flag_off() {
        let sim = SimTorch::new();
        sim.fail_with(Some(HardwareError::Busy));
        let torch = Torch::new(Box::new(sim.clone()));

        assert_eq!(torch.set_on(true), Err(HardwareError::Busy));
        assert!(!torch.is_on());
        assert!(!sim.is_lit());
    }

    #[test]
    fn absent_torch_reports_unavailable() {
        let torch = Torch::new(Box::new(SimTorch::absent()));
        assert!(!torch.is_available());
        assert_eq!(torch.set_on(true), Err(HardwareError::Unavailable));
        assert_eq!(torch.check_access(), Err(HardwareError::Unavailable));
        assert!(torch.force_off().is_ok());
    }

    #[test]
    fn force_off_always_reaches_the_device() {
        let sim = SimTorch::new();
        let torch = Torch::new(Box::new(sim.clone()));

        torch.force_off().unwrap();
        torch.force_off().unwrap();

        let offs = sim
            .events()
            .iter()
            .filter(|e| matches!(e, TorchEvent { on: false, .. }))
            .count();
        assert_eq!(offs, 2);
    }

    #[test]
    fn toggle_returns_new_state() {
        let torch = Torch::new(Box::new(SimTorch::new()));
        assert_eq!(torch.toggle(), Ok(true));
        assert!(torch.is_on());
        assert_eq!(torch.toggle(), Ok(false));
        assert!(!torch.is_on());
    }
}
