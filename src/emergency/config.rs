use std::time::Duration;

use crate::pattern::AlertPattern;
use crate::settings::EmergencySettings;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

pub const CANCEL_TIMEOUT_ENV: &str = "EMERGENCY_CANCEL_TIMEOUT_MS";
pub const VIBRATION_ENV: &str = "EMERGENCY_VIBRATION";

/// Upper bound on `light_pattern_repeats`; about a minute of light.
pub const MAX_LIGHT_PATTERN_REPEATS: usize = 10;

/// Runtime knobs of the coordinator.
#[derive(Debug, Clone)]
pub struct EmergencyConfig {
    /// Upper bound on how long `deactivate()` waits for a pattern task to
    /// confirm the resource is off.
    pub cancel_timeout: Duration,
    pub vibration_enabled: bool,
    pub max_alarm_volume: bool,
    pub light_pattern: AlertPattern,
    pub vibration_waveform: Vec<u64>,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self::from_settings(&EmergencySettings::default())
    }
}

impl EmergencyConfig {
    pub fn from_settings(settings: &EmergencySettings) -> Self {
        let mut repeats = settings.light_pattern_repeats;
        if repeats > MAX_LIGHT_PATTERN_REPEATS {
            log_warn!(
                "light_pattern_repeats={repeats} is above {MAX_LIGHT_PATTERN_REPEATS}, clamping"
            );
            repeats = MAX_LIGHT_PATTERN_REPEATS;
        }

        Self {
            cancel_timeout: Duration::from_millis(settings.cancel_timeout_ms),
            vibration_enabled: settings.vibration_enabled,
            max_alarm_volume: settings.max_alarm_volume,
            light_pattern: AlertPattern::sos_light().repeated(repeats),
            vibration_waveform: AlertPattern::sos_vibration().to_waveform(),
        }
    }

    /// Apply `EMERGENCY_CANCEL_TIMEOUT_MS` / `EMERGENCY_VIBRATION` when set.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(CANCEL_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.cancel_timeout = Duration::from_millis(ms),
                Err(err) => log_warn!("ignoring {CANCEL_TIMEOUT_ENV}={raw:?}: {err}"),
            }
        }
        if let Some(raw) = lookup(VIBRATION_ENV) {
            let value = raw.trim();
            self.vibration_enabled = !(value == "0" || value.eq_ignore_ascii_case("false"));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::SOS_VIBRATION_WAVEFORM;
    use crate::settings::SettingsStore;
    use std::collections::HashMap;
    use std::fs;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_follow_settings_defaults() {
        let config = EmergencyConfig::default();
        assert_eq!(config.cancel_timeout, Duration::from_millis(500));
        assert!(config.vibration_enabled);
        assert!(config.max_alarm_volume);
        assert_eq!(config.light_pattern, AlertPattern::sos_light());
        assert_eq!(config.vibration_waveform, SOS_VIBRATION_WAVEFORM.to_vec());
    }

    #[test]
    fn env_overrides_apply() {
        let config = EmergencyConfig::default().with_overrides(lookup(&[
            (CANCEL_TIMEOUT_ENV, " 1200 "),
            (VIBRATION_ENV, "FALSE"),
        ]));
        assert_eq!(config.cancel_timeout, Duration::from_millis(1200));
        assert!(!config.vibration_enabled);
    }

    #[test]
    fn malformed_timeout_is_ignored() {
        let config =
            EmergencyConfig::default().with_overrides(lookup(&[(CANCEL_TIMEOUT_ENV, "soon")]));
        assert_eq!(config.cancel_timeout, Duration::from_millis(500));
    }

    #[test]
    fn repeats_lengthen_the_light_pattern() {
        let settings = EmergencySettings {
            light_pattern_repeats: 3,
            ..EmergencySettings::default()
        };
        let config = EmergencyConfig::from_settings(&settings);
        assert_eq!(config.light_pattern.total_duration(), Duration::from_millis(16800));
    }

    #[test]
    fn oversized_repeats_from_disk_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"emergency":{"light_pattern_repeats":18446744073709551615}}"#,
        )
        .unwrap();

        let settings = SettingsStore::new(path).unwrap().emergency();
        assert_eq!(settings.light_pattern_repeats, usize::MAX);

        let config = EmergencyConfig::from_settings(&settings);
        let single = AlertPattern::sos_light();
        assert_eq!(
            config.light_pattern.segments().len(),
            single.segments().len() * MAX_LIGHT_PATTERN_REPEATS
        );
        assert_eq!(
            config.light_pattern.total_duration(),
            single.total_duration() * MAX_LIGHT_PATTERN_REPEATS as u32
        );
    }
}
