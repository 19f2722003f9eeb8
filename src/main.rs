use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use teraguard_sos_lib::{
    hardware::sim::{SimAudio, SimTorch, SimVibrator},
    init_logging, AudioOutput, EmergencyConfig, EmergencyCoordinator, EmergencySettings,
    SettingsStore, Torch, Vibrator,
};

const HOLD_ENV: &str = "EMERGENCY_DEMO_HOLD_MS";

/// Runs one SOS cycle against simulated hardware.
///
/// `teraguard-sos [settings.json]`; `EMERGENCY_DEMO_HOLD_MS` sets how long the
/// alert stays up before it is deactivated.
#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    log::info!("SOS demo starting up...");

    let settings = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => SettingsStore::new(path.clone())
            .with_context(|| format!("loading settings from {}", path.display()))?
            .emergency(),
        None => EmergencySettings::default(),
    };
    let config = EmergencyConfig::from_settings(&settings).with_env_overrides();

    let hold = match std::env::var(HOLD_ENV) {
        Ok(raw) => Duration::from_millis(
            raw.trim()
                .parse()
                .with_context(|| format!("{HOLD_ENV} must be a number of milliseconds"))?,
        ),
        Err(_) => Duration::from_secs(2),
    };

    let torch = SimTorch::new();
    let audio = SimAudio::default();
    let coordinator = EmergencyCoordinator::new(
        Torch::new(Box::new(torch.clone())),
        Vibrator::new(Box::new(SimVibrator::new())),
        AudioOutput::new(Box::new(audio.clone())),
        config,
    );

    let outcome = coordinator.activate().await.context("activation failed")?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    tokio::time::sleep(hold).await;
    println!("{}", serde_json::to_string_pretty(&coordinator.snapshot().await)?);

    let report = coordinator.deactivate().await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    log::info!(
        "torch lit: {}, ring volume: {}, torch commands: {}",
        torch.is_lit(),
        audio.ring(),
        torch.commands().len()
    );
    Ok(())
}
