//! Application configuration — TOML-based, platform-aware paths.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gpio::{self, PinId};
use crate::groups::PinGroups;
use crate::sequencer;

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str = "# pilights configuration. Pin numbers use BCM numbering.\n\n";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Echo every pin write (`"<pin>: on"`).
    #[serde(default)]
    pub verbose: bool,

    /// Pins claimed as pulled-up inputs.
    #[serde(default)]
    pub inputs: Vec<PinId>,

    #[serde(default)]
    pub pins: PinGroups,

    #[serde(default)]
    pub timing: Timing,
}

/// Pattern timings. Intervals are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_flicker_interval_ms")]
    pub flicker_interval_ms: u64,
    #[serde(default = "default_flicker_times")]
    pub flicker_times: u32,
    #[serde(default = "default_pulse_pin")]
    pub pulse_pin: PinId,
    #[serde(default = "default_pulse_interval_ms")]
    pub pulse_interval_ms: u64,
    #[serde(default = "default_pulse_times")]
    pub pulse_times: u32,
    /// Software PWM frequency used by `pulse`.
    #[serde(default = "default_pwm_frequency_hz")]
    pub pwm_frequency_hz: f64,
}

fn default_interval_ms() -> u64 {
    sequencer::DEFAULT_INTERVAL.as_millis() as u64
}
fn default_flicker_interval_ms() -> u64 {
    sequencer::DEFAULT_FLICKER_INTERVAL.as_millis() as u64
}
fn default_flicker_times() -> u32 {
    sequencer::DEFAULT_FLICKER_TIMES
}
fn default_pulse_pin() -> PinId {
    sequencer::DEFAULT_PULSE_PIN
}
fn default_pulse_interval_ms() -> u64 {
    sequencer::DEFAULT_PULSE_INTERVAL.as_millis() as u64
}
fn default_pulse_times() -> u32 {
    sequencer::DEFAULT_PULSE_TIMES
}
fn default_pwm_frequency_hz() -> f64 {
    gpio::DEFAULT_PWM_FREQUENCY_HZ
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            interval_ms: default_interval_ms(),
            flicker_interval_ms: default_flicker_interval_ms(),
            flicker_times: default_flicker_times(),
            pulse_pin: default_pulse_pin(),
            pulse_interval_ms: default_pulse_interval_ms(),
            pulse_times: default_pulse_times(),
            pwm_frequency_hz: default_pwm_frequency_hz(),
        }
    }
}

impl Timing {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn flicker_interval(&self) -> Duration {
        Duration::from_millis(self.flicker_interval_ms)
    }

    pub fn pulse_interval(&self) -> Duration {
        Duration::from_millis(self.pulse_interval_ms)
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// All three pin groups are empty.
    NoOutputPins,
    /// A pin appears more than once across the groups and inputs.
    DuplicatePin(PinId),
    /// `timing.pulse_pin` is not one of the grouped output pins.
    PulsePinNotConfigured(PinId),
    /// `timing.pwm_frequency_hz` is zero, negative or not finite.
    InvalidPwmFrequency(f64),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoOutputPins => write!(f, "No LED pins configured"),
            ValidationError::DuplicatePin(pin) => {
                write!(f, "GPIO {pin} is assigned more than once")
            }
            ValidationError::PulsePinNotConfigured(pin) => {
                write!(f, "Pulse pin GPIO {pin} is not in any LED group")
            }
            ValidationError::InvalidPwmFrequency(hz) => {
                write!(f, "Invalid PWM frequency: {hz} Hz")
            }
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pilights"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from disk, or return defaults if not found.
    pub fn load() -> Self {
        let (config, warnings) = Self::load_with_warnings();
        for w in &warnings {
            log::warn!("{w}");
        }
        config
    }

    /// Save config to an arbitrary path atomically (write to temp file, then rename).
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let contents = format!("{CONFIG_HEADER}{serialized}");
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let all = self.pins.all();

        if all.is_empty() {
            errors.push(ValidationError::NoOutputPins);
        }

        let mut seen = BTreeSet::new();
        let mut reported = BTreeSet::new();
        for &pin in all.iter().chain(&self.inputs) {
            if !seen.insert(pin) && reported.insert(pin) {
                errors.push(ValidationError::DuplicatePin(pin));
            }
        }

        if !all.is_empty() && !all.contains(&self.timing.pulse_pin) {
            errors.push(ValidationError::PulsePinNotConfigured(
                self.timing.pulse_pin,
            ));
        }

        let hz = self.timing.pwm_frequency_hz;
        if !hz.is_finite() || hz <= 0.0 {
            errors.push(ValidationError::InvalidPwmFrequency(hz));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// [`validate`](Self::validate), folded into a single error for callers
    /// that only need to stop.
    pub fn check(&self) -> crate::error::Result<()> {
        self.validate().map_err(|errors| {
            let joined: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            crate::PilightsError::Config(joined.join("; "))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ──

    #[test]
    fn defaults() {
        let c = Config::default();
        assert!(!c.verbose);
        assert!(c.inputs.is_empty());
        assert_eq!(c.pins, PinGroups::default());
        assert_eq!(c.timing.interval_ms, 250);
        assert_eq!(c.timing.flicker_interval_ms, 40);
        assert_eq!(c.timing.flicker_times, 20);
        assert_eq!(c.timing.pulse_pin, 18);
        assert_eq!(c.timing.pulse_interval_ms, 1);
        assert_eq!(c.timing.pulse_times, 5);
    }

    #[test]
    fn timing_durations() {
        let t = Timing::default();
        assert_eq!(t.interval(), sequencer::DEFAULT_INTERVAL);
        assert_eq!(t.flicker_interval(), sequencer::DEFAULT_FLICKER_INTERVAL);
        assert_eq!(t.pulse_interval(), sequencer::DEFAULT_PULSE_INTERVAL);
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    // ── TOML ──

    #[test]
    fn serialize_roundtrip() {
        let c = Config {
            verbose: true,
            inputs: vec![26],
            pins: PinGroups::new(vec![2], vec![3], vec![4]),
            timing: Timing {
                interval_ms: 100,
                pulse_pin: 4,
                ..Timing::default()
            },
        };
        let toml_str = toml::to_string_pretty(&c).unwrap();
        let c2: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(c2, c);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = "verbose = true\n[timing]\nflicker_times = 3\n";
        let c: Config = toml::from_str(toml_str).unwrap();
        assert!(c.verbose);
        assert_eq!(c.timing.flicker_times, 3);
        assert_eq!(c.timing.interval_ms, 250);
        assert_eq!(c.pins, PinGroups::default());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let c: Config = toml::from_str("").unwrap();
        assert_eq!(c, Config::default());
    }

    #[test]
    fn wrong_type_toml_is_error() {
        let result: std::result::Result<Config, _> = toml::from_str("verbose = \"yes\"");
        assert!(result.is_err());
    }

    #[test]
    fn config_path_ends_with_file_name() {
        if let Some(path) = Config::path() {
            assert!(path.ends_with("pilights/config.toml"));
        }
    }

    // ── Load / save ──

    #[test]
    fn load_from_missing_file_gives_defaults_without_warning() {
        let dir = tempfile::tempdir().unwrap();
        let (c, warnings) = Config::load_from(&dir.path().join("absent.toml"));
        assert_eq!(c, Config::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn load_from_malformed_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is { not valid toml").unwrap();
        let (c, warnings) = Config::load_from(&path);
        assert_eq!(c, Config::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("config parse error"));
    }

    #[test]
    fn save_to_then_load_from() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let c = Config {
            inputs: vec![21],
            ..Config::default()
        };
        c.save_to(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# pilights configuration"));
        assert!(!path.with_extension("toml.tmp").exists());

        let (loaded, warnings) = Config::load_from(&path);
        assert!(warnings.is_empty());
        assert_eq!(loaded, c);
    }

    // ── Validation ──

    #[test]
    fn validate_no_pins() {
        let c = Config {
            pins: PinGroups::new(vec![], vec![], vec![]),
            ..Config::default()
        };
        let errors = c.validate().unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoOutputPins]);
    }

    #[test]
    fn validate_duplicate_across_groups_reported_once() {
        let c = Config {
            pins: PinGroups::new(vec![18, 5], vec![5], vec![5]),
            ..Config::default()
        };
        let errors = c.validate().unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicatePin(5)]);
    }

    #[test]
    fn validate_input_clashing_with_output() {
        let c = Config {
            inputs: vec![19],
            ..Config::default()
        };
        let errors = c.validate().unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicatePin(19)]);
    }

    #[test]
    fn validate_pulse_pin_outside_groups() {
        let mut c = Config::default();
        c.timing.pulse_pin = 2;
        let errors = c.validate().unwrap_err();
        assert_eq!(errors, vec![ValidationError::PulsePinNotConfigured(2)]);
    }

    #[test]
    fn validate_collects_all_errors() {
        let mut c = Config::default();
        c.timing.pulse_pin = 2;
        c.timing.pwm_frequency_hz = 0.0;
        c.inputs = vec![4];
        let errors = c.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::InvalidPwmFrequency(0.0)));
    }

    #[test]
    fn check_joins_messages() {
        let mut c = Config::default();
        c.timing.pwm_frequency_hz = -1.0;
        let err = c.check().unwrap_err();
        assert_eq!(err.to_string(), "Config error: Invalid PWM frequency: -1 Hz");
    }

    #[test]
    fn validation_error_display() {
        assert_eq!(
            ValidationError::DuplicatePin(5).to_string(),
            "GPIO 5 is assigned more than once"
        );
        assert_eq!(
            ValidationError::PulsePinNotConfigured(2).to_string(),
            "Pulse pin GPIO 2 is not in any LED group"
        );
    }
}
