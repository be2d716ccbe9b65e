//! LED sequencer — timed lighting patterns over the configured pin groups.
//!
//! Every pattern blocks until it has finished and is wrapped in
//! [`timing::logged`]. Callers pass the pins explicitly; [`LedSequencer::all`]
//! is the usual choice and the `DEFAULT_*` constants give the usual timings.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::controller::PinController;
use crate::gpio::{GpioDriver, PinId, Result};
use crate::groups::PinGroups;
use crate::timing;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_FLICKER_INTERVAL: Duration = Duration::from_millis(40);
pub const DEFAULT_FLICKER_TIMES: u32 = 20;
pub const DEFAULT_PULSE_INTERVAL: Duration = Duration::from_millis(1);
pub const DEFAULT_PULSE_TIMES: u32 = 5;
/// BCM 18, the Pi's PWM0 line.
pub const DEFAULT_PULSE_PIN: PinId = 18;

/// Duty change per pulse step.
pub const PULSE_STEP: u16 = 4;
/// A pulse turns around once the duty value reaches this.
pub const PULSE_PEAK: u16 = 1024;

// ── Pattern options ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    On,
    Off,
    StepUp,
    StepDown,
    Cycle,
    WarmUp,
    Flicker,
    Pulse,
}

impl Pattern {
    /// Message logged when the pattern starts.
    pub fn message(self) -> &'static str {
        match self {
            Pattern::On => "On",
            Pattern::Off => "Off",
            Pattern::StepUp => "Step up",
            Pattern::StepDown => "Step down",
            Pattern::Cycle => "Cycle",
            Pattern::WarmUp => "Warming up...",
            Pattern::Flicker => "Flickering...",
            Pattern::Pulse => "Pulsing...",
        }
    }
}

/// Whether `cycle` sweeps back after the forward pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CycleMode {
    /// Forward, then back without repeating the last pin.
    #[default]
    Full,
    Forward,
}

impl FromStr for CycleMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(CycleMode::Full),
            "forward" => Ok(CycleMode::Forward),
            other => Err(format!(
                "unknown cycle mode \"{other}\" (expected full or forward)"
            )),
        }
    }
}

impl fmt::Display for CycleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleMode::Full => write!(f, "full"),
            CycleMode::Forward => write!(f, "forward"),
        }
    }
}

/// State the pins are left in after `flicker`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlickerEnd {
    #[default]
    Off,
    On,
}

impl FromStr for FlickerEnd {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(FlickerEnd::Off),
            "on" => Ok(FlickerEnd::On),
            other => Err(format!("unknown flicker end \"{other}\" (expected on or off)")),
        }
    }
}

impl fmt::Display for FlickerEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlickerEnd::Off => write!(f, "off"),
            FlickerEnd::On => write!(f, "on"),
        }
    }
}

// ── Sequencer ──

pub struct LedSequencer<D: GpioDriver> {
    groups: PinGroups,
    all: Vec<PinId>,
    controller: PinController<D>,
    verbose: bool,
}

impl<D: GpioDriver> LedSequencer<D> {
    /// Configure every grouped pin as an output.
    pub fn new(driver: D, groups: PinGroups) -> Result<Self> {
        Self::with_inputs(driver, groups, &[])
    }

    /// Like [`new`](Self::new), also claiming `inputs` as pulled-up inputs.
    pub fn with_inputs(driver: D, groups: PinGroups, inputs: &[PinId]) -> Result<Self> {
        let all = groups.all();
        let controller = PinController::configure(driver, &all, inputs)?;
        Ok(LedSequencer {
            groups,
            all,
            controller,
            verbose: false,
        })
    }

    /// Echo every pin write to stdout.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn groups(&self) -> &PinGroups {
        &self.groups
    }

    /// Every configured LED: reds, then greens, then blues.
    pub fn all(&self) -> &[PinId] {
        &self.all
    }

    pub fn controller(&self) -> &PinController<D> {
        &self.controller
    }

    // ── Building blocks (not logged) ──

    fn switch_on(&self, leds: &[PinId]) -> Result<()> {
        for &pin in leds {
            self.controller.set_high(pin, self.verbose)?;
        }
        Ok(())
    }

    fn switch_off(&self, leds: &[PinId]) -> Result<()> {
        for &pin in leds {
            self.controller.set_low(pin, self.verbose)?;
        }
        Ok(())
    }

    /// On, hold, off, hold.
    fn blink(&self, pin: PinId, interval: Duration) -> Result<()> {
        self.controller.set_high(pin, self.verbose)?;
        self.controller.delay(interval);
        self.controller.set_low(pin, self.verbose)?;
        self.controller.delay(interval);
        Ok(())
    }

    /// On, hold, off. No pause afterwards.
    fn flash(&self, leds: &[PinId], interval: Duration) -> Result<()> {
        self.switch_on(leds)?;
        self.controller.delay(interval);
        self.switch_off(leds)
    }

    // ── Patterns ──

    pub fn leds_on(&self, leds: &[PinId]) -> Result<()> {
        timing::logged(Pattern::On.message(), || self.switch_on(leds))
    }

    pub fn leds_off(&self, leds: &[PinId]) -> Result<()> {
        timing::logged(Pattern::Off.message(), || self.switch_off(leds))
    }

    /// Light the pins one by one, `interval` apart.
    pub fn step_up(&self, leds: &[PinId], interval: Duration) -> Result<()> {
        timing::logged(Pattern::StepUp.message(), || {
            for &pin in leds {
                self.controller.set_high(pin, self.verbose)?;
                self.controller.delay(interval);
            }
            Ok(())
        })
    }

    /// Turn the pins off one by one, `interval` apart.
    pub fn step_down(&self, leds: &[PinId], interval: Duration) -> Result<()> {
        timing::logged(Pattern::StepDown.message(), || {
            for &pin in leds {
                self.controller.set_low(pin, self.verbose)?;
                self.controller.delay(interval);
            }
            Ok(())
        })
    }

    /// Blink each pin in turn. In [`CycleMode::Full`] the sweep comes back
    /// without repeating the end pin: `[1, 2, 3]` blinks `1, 2, 3, 2, 1`.
    pub fn cycle(&self, leds: &[PinId], interval: Duration, mode: CycleMode) -> Result<()> {
        timing::logged(Pattern::Cycle.message(), || {
            for &pin in leds {
                self.blink(pin, interval)?;
            }
            if mode == CycleMode::Full {
                for &pin in leds.iter().rev().skip(1) {
                    self.blink(pin, interval)?;
                }
            }
            Ok(())
        })
    }

    /// Sweep from the middle of `leds` outwards, one symmetric pair at a
    /// time. With an odd count the centre pin flashes alone first.
    pub fn warm_up(&self, leds: &[PinId], interval: Duration) -> Result<()> {
        timing::logged(Pattern::WarmUp.message(), || {
            let middle = leds.len() / 2;
            if leds.len() % 2 == 0 {
                for i in 0..middle {
                    self.flash(&[leds[middle - 1 - i], leds[middle + i]], interval)?;
                }
            } else {
                self.flash(&[leds[middle]], interval)?;
                for i in 0..middle {
                    self.flash(&[leds[middle - 1 - i], leds[middle + 1 + i]], interval)?;
                }
            }
            Ok(())
        })
    }

    /// Flash all of `leds` together `times` times. [`FlickerEnd::On`] adds
    /// one last switch-on, leaving the pins lit.
    pub fn flicker(
        &self,
        leds: &[PinId],
        interval: Duration,
        times: u32,
        ends_with: FlickerEnd,
    ) -> Result<()> {
        timing::logged(Pattern::Flicker.message(), || {
            for _ in 0..times {
                self.switch_on(leds)?;
                self.controller.delay(interval);
                self.switch_off(leds)?;
                self.controller.delay(interval);
            }
            if ends_with == FlickerEnd::On {
                self.switch_on(leds)?;
                self.controller.delay(interval);
            }
            Ok(())
        })
    }

    /// Fade each pin up and down `times` times with PWM, one pin after the
    /// other, then release every pin claim.
    ///
    /// Consumes the sequencer: after cleanup the pins are no longer
    /// outputs, so a new sequencer has to configure them again.
    pub fn pulse(self, leds: &[PinId], interval: Duration, times: u32) -> Result<()> {
        timing::logged(Pattern::Pulse.message(), move || {
            for &pin in leds {
                self.controller.enable_pwm(pin)?;
                self.ramp(pin, interval, times)?;
            }
            self.controller.release()
        })
    }

    /// One duty-cycle ramp per cycle: 0 up to [`PULSE_PEAK`] and back to 0.
    fn ramp(&self, pin: PinId, interval: Duration, times: u32) -> Result<()> {
        self.controller.pwm_write(pin, 0)?;
        let mut value: u16 = 0;
        let mut rising = true;
        let mut cycles = 0;

        while cycles < times {
            self.controller.pwm_write(pin, value)?;

            if rising {
                value += PULSE_STEP;
            } else {
                value = value.saturating_sub(PULSE_STEP);
            }
            self.controller.delay(interval);

            if value >= PULSE_PEAK {
                rising = false;
            }
            if value == 0 {
                cycles += 1;
                log::debug!("GPIO {pin}: pulse {cycles}/{times}");
                rising = true;
            }

            self.controller.delay(interval);
        }
        Ok(())
    }

    /// Release every pin claim without pulsing.
    pub fn release(self) -> Result<()> {
        self.controller.release()
    }
}
