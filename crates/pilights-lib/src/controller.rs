//! Pin controller — configures pins once and turns them on or off.

use std::time::Duration;

use crate::gpio::{GpioDriver, Level, PinId, Result};

/// Owns the driver handle and the pins configured at startup.
pub struct PinController<D: GpioDriver> {
    driver: D,
    outputs: Vec<PinId>,
    inputs: Vec<PinId>,
}

impl<D: GpioDriver> PinController<D> {
    /// Claim `outputs` as outputs and `inputs` as pulled-up inputs.
    ///
    /// Any claims left over from earlier use of the driver are dropped first,
    /// so this is safe to call once at process start.
    pub fn configure(driver: D, outputs: &[PinId], inputs: &[PinId]) -> Result<Self> {
        driver.reset()?;
        for &pin in outputs {
            driver.setup_output(pin)?;
        }
        for &pin in inputs {
            driver.setup_input_pullup(pin)?;
        }
        log::debug!("configured outputs {outputs:?}, inputs {inputs:?}");
        Ok(PinController {
            driver,
            outputs: outputs.to_vec(),
            inputs: inputs.to_vec(),
        })
    }

    pub fn outputs(&self) -> &[PinId] {
        &self.outputs
    }

    pub fn inputs(&self) -> &[PinId] {
        &self.inputs
    }

    pub fn set_high(&self, pin: PinId, verbose: bool) -> Result<()> {
        self.set(pin, Level::High, verbose)
    }

    pub fn set_low(&self, pin: PinId, verbose: bool) -> Result<()> {
        self.set(pin, Level::Low, verbose)
    }

    fn set(&self, pin: PinId, level: Level, verbose: bool) -> Result<()> {
        self.driver.write(pin, level)?;
        if verbose {
            println!("{pin}: {level}");
        }
        Ok(())
    }

    pub fn read(&self, pin: PinId) -> Result<Level> {
        self.driver.read(pin)
    }

    pub fn enable_pwm(&self, pin: PinId) -> Result<()> {
        self.driver.enable_pwm(pin)
    }

    pub fn pwm_write(&self, pin: PinId, value: u16) -> Result<()> {
        self.driver.pwm_write(pin, value)
    }

    pub fn delay(&self, duration: Duration) {
        self.driver.delay(duration);
    }

    /// Release every pin claim. The controller cannot be used afterwards.
    pub fn release(self) -> Result<()> {
        self.driver.cleanup()
    }
}
