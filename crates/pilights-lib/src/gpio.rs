//! GPIO access — driver trait + rppal backend.

use std::fmt;
use std::time::Duration;

/// BCM GPIO line number.
pub type PinId = u8;

/// Highest PWM duty value; larger values clamp to full duty.
pub const PWM_MAX: u16 = 1023;

/// Default software PWM frequency.
pub const DEFAULT_PWM_FREQUENCY_HZ: f64 = 200.0;

// ── Error type ──

/// GPIO driver errors.
///
/// `reason` payloads carry the backend's own message unchanged.
#[derive(Debug)]
pub enum GpioError {
    /// The GPIO peripheral could not be opened on this host.
    Unavailable(String),
    PinSetup { pin: PinId, reason: String },
    /// The pin was never claimed, or was released by `cleanup`.
    PinNotConfigured(PinId),
    Write { pin: PinId, reason: String },
    Pwm { pin: PinId, reason: String },
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioError::Unavailable(e) => write!(f, "GPIO unavailable: {e}"),
            GpioError::PinSetup { pin, reason } => {
                write!(f, "Failed to set up GPIO {pin}: {reason}")
            }
            GpioError::PinNotConfigured(pin) => {
                write!(f, "GPIO {pin} is not configured")
            }
            GpioError::Write { pin, reason } => write!(f, "Write to GPIO {pin} failed: {reason}"),
            GpioError::Pwm { pin, reason } => write!(f, "PWM on GPIO {pin} failed: {reason}"),
        }
    }
}

impl std::error::Error for GpioError {}

pub type Result<T> = std::result::Result<T, GpioError>;

// ── Levels ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Low,
    High,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => write!(f, "off"),
            Level::High => write!(f, "on"),
        }
    }
}

/// Map a PWM value onto a 0.0–1.0 duty cycle.
pub fn duty_cycle(value: u16) -> f64 {
    f64::from(value.min(PWM_MAX)) / f64::from(PWM_MAX)
}

// ── Trait ──

/// Low-level pin access. Numbering is BCM.
pub trait GpioDriver {
    /// Drop every pin claim held by this handle.
    fn reset(&self) -> Result<()>;
    fn setup_output(&self, pin: PinId) -> Result<()>;
    /// Claim `pin` as an input with the internal pull-up enabled.
    fn setup_input_pullup(&self, pin: PinId) -> Result<()>;
    fn write(&self, pin: PinId, level: Level) -> Result<()>;
    fn read(&self, pin: PinId) -> Result<Level>;
    /// Switch a configured output pin to PWM output.
    /// Fails with `PinNotConfigured` for any other pin.
    fn enable_pwm(&self, pin: PinId) -> Result<()>;
    /// Set the duty value (0..=[`PWM_MAX`]) of a PWM pin.
    fn pwm_write(&self, pin: PinId, value: u16) -> Result<()>;
    /// Release all claims. PWM pins leave PWM mode.
    fn cleanup(&self) -> Result<()>;

    /// Block the calling thread.
    fn delay(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: GpioDriver + ?Sized> GpioDriver for &T {
    fn reset(&self) -> Result<()> {
        (**self).reset()
    }
    fn setup_output(&self, pin: PinId) -> Result<()> {
        (**self).setup_output(pin)
    }
    fn setup_input_pullup(&self, pin: PinId) -> Result<()> {
        (**self).setup_input_pullup(pin)
    }
    fn write(&self, pin: PinId, level: Level) -> Result<()> {
        (**self).write(pin, level)
    }
    fn read(&self, pin: PinId) -> Result<Level> {
        (**self).read(pin)
    }
    fn enable_pwm(&self, pin: PinId) -> Result<()> {
        (**self).enable_pwm(pin)
    }
    fn pwm_write(&self, pin: PinId, value: u16) -> Result<()> {
        (**self).pwm_write(pin, value)
    }
    fn cleanup(&self) -> Result<()> {
        (**self).cleanup()
    }
    fn delay(&self, duration: Duration) {
        (**self).delay(duration)
    }
}

// ── rppal backend ──

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use rppal::gpio::{Gpio, InputPin, OutputPin};

    /// Raspberry Pi GPIO through rppal (`/dev/gpiomem`).
    ///
    /// Pins are reset to their previous mode when dropped, so `reset` and
    /// `cleanup` only need to forget them.
    pub struct RppalDriver {
        gpio: Gpio,
        outputs: RefCell<BTreeMap<PinId, OutputPin>>,
        inputs: RefCell<BTreeMap<PinId, InputPin>>,
        pwm_frequency: f64,
    }

    impl RppalDriver {
        pub fn open(pwm_frequency: f64) -> Result<Self> {
            let gpio = Gpio::new().map_err(|e| GpioError::Unavailable(e.to_string()))?;
            Ok(RppalDriver {
                gpio,
                outputs: RefCell::new(BTreeMap::new()),
                inputs: RefCell::new(BTreeMap::new()),
                pwm_frequency,
            })
        }

        fn forget_all(&self) {
            self.outputs.borrow_mut().clear();
            self.inputs.borrow_mut().clear();
        }
    }

    impl GpioDriver for RppalDriver {
        fn reset(&self) -> Result<()> {
            self.forget_all();
            Ok(())
        }

        fn setup_output(&self, pin: PinId) -> Result<()> {
            let output = self
                .gpio
                .get(pin)
                .map_err(|e| GpioError::PinSetup {
                    pin,
                    reason: e.to_string(),
                })?
                .into_output();
            self.inputs.borrow_mut().remove(&pin);
            self.outputs.borrow_mut().insert(pin, output);
            Ok(())
        }

        fn setup_input_pullup(&self, pin: PinId) -> Result<()> {
            let input = self
                .gpio
                .get(pin)
                .map_err(|e| GpioError::PinSetup {
                    pin,
                    reason: e.to_string(),
                })?
                .into_input_pullup();
            self.outputs.borrow_mut().remove(&pin);
            self.inputs.borrow_mut().insert(pin, input);
            Ok(())
        }

        fn write(&self, pin: PinId, level: Level) -> Result<()> {
            let mut outputs = self.outputs.borrow_mut();
            let output = outputs
                .get_mut(&pin)
                .ok_or(GpioError::PinNotConfigured(pin))?;
            match level {
                Level::Low => output.set_low(),
                Level::High => output.set_high(),
            }
            Ok(())
        }

        fn read(&self, pin: PinId) -> Result<Level> {
            let inputs = self.inputs.borrow();
            let input = inputs.get(&pin).ok_or(GpioError::PinNotConfigured(pin))?;
            Ok(if input.is_high() {
                Level::High
            } else {
                Level::Low
            })
        }

        fn enable_pwm(&self, pin: PinId) -> Result<()> {
            if !self.outputs.borrow().contains_key(&pin) {
                return Err(GpioError::PinNotConfigured(pin));
            }
            self.pwm_write(pin, 0)
        }

        fn pwm_write(&self, pin: PinId, value: u16) -> Result<()> {
            let mut outputs = self.outputs.borrow_mut();
            let output = outputs
                .get_mut(&pin)
                .ok_or(GpioError::PinNotConfigured(pin))?;
            output
                .set_pwm_frequency(self.pwm_frequency, duty_cycle(value))
                .map_err(|e| GpioError::Pwm {
                    pin,
                    reason: e.to_string(),
                })
        }

        fn cleanup(&self) -> Result<()> {
            for (&pin, output) in self.outputs.borrow_mut().iter_mut() {
                output.clear_pwm().map_err(|e| GpioError::Pwm {
                    pin,
                    reason: e.to_string(),
                })?;
            }
            self.forget_all();
            Ok(())
        }
    }
}

#[cfg(target_os = "linux")]
pub use linux_impl::RppalDriver;

// ── Stub driver for unsupported platforms ──

/// Placeholder driver that can never be opened.
/// Enables compilation and `cargo test` on non-Linux hosts.
#[cfg(not(target_os = "linux"))]
pub struct StubDriver;

#[cfg(not(target_os = "linux"))]
impl StubDriver {
    pub fn open(_pwm_frequency: f64) -> Result<Self> {
        Err(GpioError::Unavailable(
            "GPIO is only supported on Linux".into(),
        ))
    }
}

#[cfg(not(target_os = "linux"))]
impl GpioDriver for StubDriver {
    fn reset(&self) -> Result<()> {
        unreachable!()
    }
    fn setup_output(&self, _pin: PinId) -> Result<()> {
        unreachable!()
    }
    fn setup_input_pullup(&self, _pin: PinId) -> Result<()> {
        unreachable!()
    }
    fn write(&self, _pin: PinId, _level: Level) -> Result<()> {
        unreachable!()
    }
    fn read(&self, _pin: PinId) -> Result<Level> {
        unreachable!()
    }
    fn enable_pwm(&self, _pin: PinId) -> Result<()> {
        unreachable!()
    }
    fn pwm_write(&self, _pin: PinId, _value: u16) -> Result<()> {
        unreachable!()
    }
    fn cleanup(&self) -> Result<()> {
        unreachable!()
    }
}

/// Concrete driver type for the current platform.
#[cfg(target_os = "linux")]
pub type PlatformDriver = RppalDriver;
#[cfg(not(target_os = "linux"))]
pub type PlatformDriver = StubDriver;

/// Open the platform GPIO driver.
pub fn open_driver(pwm_frequency: f64) -> Result<PlatformDriver> {
    PlatformDriver::open(pwm_frequency)
}

// ── Mock driver for testing ──

/// In-memory driver for tests and dry runs.
///
/// Always compiled, hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::{BTreeMap, BTreeSet};

    /// One recorded driver call.
    #[derive(Debug, Clone, PartialEq)]
    pub enum GpioEvent {
        Reset,
        SetupOutput(PinId),
        SetupInput(PinId),
        Write(PinId, Level),
        EnablePwm(PinId),
        PwmWrite(PinId, u16),
        Cleanup,
        Delay(Duration),
    }

    /// Records every call; `delay` returns immediately.
    ///
    /// Writes to pins that were never set up (or were released by
    /// `cleanup`) fail with `PinNotConfigured`, like the hardware backend.
    #[derive(Default)]
    pub struct MockDriver {
        pub events: RefCell<Vec<GpioEvent>>,
        outputs: RefCell<BTreeSet<PinId>>,
        inputs: RefCell<BTreeSet<PinId>>,
        pwm: RefCell<BTreeSet<PinId>>,
        levels: RefCell<BTreeMap<PinId, Level>>,
        /// Level returned by `read` for each input pin (default High, pulled up).
        pub input_levels: RefCell<BTreeMap<PinId, Level>>,
        /// If set, `setup_output` fails for this pin.
        pub fail_setup: Cell<Option<PinId>>,
        /// If set, `write` fails for this pin.
        pub fail_write: Cell<Option<PinId>>,
    }

    impl MockDriver {
        pub fn new() -> Self {
            Self::default()
        }

        fn record(&self, event: GpioEvent) {
            self.events.borrow_mut().push(event);
        }

        pub fn clear_events(&self) {
            self.events.borrow_mut().clear();
        }

        /// Recorded digital writes, in order.
        pub fn writes(&self) -> Vec<(PinId, Level)> {
            self.events
                .borrow()
                .iter()
                .filter_map(|e| match e {
                    GpioEvent::Write(pin, level) => Some((*pin, *level)),
                    _ => None,
                })
                .collect()
        }

        /// Pins that received a High write, in order.
        pub fn switched_on(&self) -> Vec<PinId> {
            self.writes()
                .into_iter()
                .filter(|(_, level)| *level == Level::High)
                .map(|(pin, _)| pin)
                .collect()
        }

        /// Recorded PWM values for `pin`, in order.
        pub fn pwm_values(&self, pin: PinId) -> Vec<u16> {
            self.events
                .borrow()
                .iter()
                .filter_map(|e| match e {
                    GpioEvent::PwmWrite(p, value) if *p == pin => Some(*value),
                    _ => None,
                })
                .collect()
        }

        pub fn delays(&self) -> Vec<Duration> {
            self.events
                .borrow()
                .iter()
                .filter_map(|e| match e {
                    GpioEvent::Delay(d) => Some(*d),
                    _ => None,
                })
                .collect()
        }

        pub fn total_delay(&self) -> Duration {
            self.delays().into_iter().sum()
        }

        /// Last level written to `pin`, if any.
        pub fn level(&self, pin: PinId) -> Option<Level> {
            self.levels.borrow().get(&pin).copied()
        }

        /// Pins whose last written level is High.
        pub fn lit(&self) -> Vec<PinId> {
            self.levels
                .borrow()
                .iter()
                .filter(|(_, level)| **level == Level::High)
                .map(|(pin, _)| *pin)
                .collect()
        }

        pub fn is_output(&self, pin: PinId) -> bool {
            self.outputs.borrow().contains(&pin)
        }

        pub fn is_input(&self, pin: PinId) -> bool {
            self.inputs.borrow().contains(&pin)
        }

        pub fn is_pwm(&self, pin: PinId) -> bool {
            self.pwm.borrow().contains(&pin)
        }

        fn forget_all(&self) {
            self.outputs.borrow_mut().clear();
            self.inputs.borrow_mut().clear();
            self.pwm.borrow_mut().clear();
        }
    }

    impl GpioDriver for MockDriver {
        fn reset(&self) -> Result<()> {
            self.record(GpioEvent::Reset);
            self.forget_all();
            Ok(())
        }

        fn setup_output(&self, pin: PinId) -> Result<()> {
            if self.fail_setup.get() == Some(pin) {
                return Err(GpioError::PinSetup {
                    pin,
                    reason: "mock: setup failure injected".into(),
                });
            }
            self.record(GpioEvent::SetupOutput(pin));
            self.inputs.borrow_mut().remove(&pin);
            self.outputs.borrow_mut().insert(pin);
            Ok(())
        }

        fn setup_input_pullup(&self, pin: PinId) -> Result<()> {
            self.record(GpioEvent::SetupInput(pin));
            self.outputs.borrow_mut().remove(&pin);
            self.inputs.borrow_mut().insert(pin);
            Ok(())
        }

        fn write(&self, pin: PinId, level: Level) -> Result<()> {
            if !self.is_output(pin) {
                return Err(GpioError::PinNotConfigured(pin));
            }
            if self.fail_write.get() == Some(pin) {
                return Err(GpioError::Write {
                    pin,
                    reason: "mock: write failure injected".into(),
                });
            }
            self.record(GpioEvent::Write(pin, level));
            self.levels.borrow_mut().insert(pin, level);
            Ok(())
        }

        fn read(&self, pin: PinId) -> Result<Level> {
            if !self.is_input(pin) {
                return Err(GpioError::PinNotConfigured(pin));
            }
            Ok(self
                .input_levels
                .borrow()
                .get(&pin)
                .copied()
                .unwrap_or(Level::High))
        }

        fn enable_pwm(&self, pin: PinId) -> Result<()> {
            if !self.is_output(pin) {
                return Err(GpioError::PinNotConfigured(pin));
            }
            self.record(GpioEvent::EnablePwm(pin));
            self.pwm.borrow_mut().insert(pin);
            Ok(())
        }

        fn pwm_write(&self, pin: PinId, value: u16) -> Result<()> {
            if !self.is_pwm(pin) {
                return Err(GpioError::Pwm {
                    pin,
                    reason: "pin is not in PWM mode".into(),
                });
            }
            self.record(GpioEvent::PwmWrite(pin, value));
            Ok(())
        }

        fn cleanup(&self) -> Result<()> {
            self.record(GpioEvent::Cleanup);
            self.forget_all();
            Ok(())
        }

        fn delay(&self, duration: Duration) {
            self.record(GpioEvent::Delay(duration));
        }
    }
}
