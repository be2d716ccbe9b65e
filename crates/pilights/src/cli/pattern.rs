//! Pattern subcommands — build a sequencer and play one pattern.

use std::time::Duration;

use pilights_lib::gpio::mock::{GpioEvent, MockDriver};

use super::{
    Config, DryRunOutput, GpioDriver, LedSequencer, Options, PatternCommand, Result, demo, gpio,
    join_pins,
};

pub(super) fn cmd_pattern(cmd: PatternCommand, config: &Config, opts: &Options) -> Result<()> {
    if opts.dry_run {
        let driver = MockDriver::new();
        play(&driver, cmd, config, opts.verbose)?;
        print_dry_run(&dry_run_summary(&driver), opts.json);
        return Ok(());
    }

    if opts.json {
        log::warn!("--json only applies to dry runs for patterns (ignored)");
    }
    let driver = gpio::open_driver(config.timing.pwm_frequency_hz)?;
    play(&driver, cmd, config, opts.verbose)
}

fn interval_or(interval_ms: Option<u64>, default: Duration) -> Duration {
    interval_ms.map(Duration::from_millis).unwrap_or(default)
}

/// Configure the pins from `config` and play `cmd` to completion.
pub(super) fn play(
    driver: &dyn GpioDriver,
    cmd: PatternCommand,
    config: &Config,
    verbose: bool,
) -> Result<()> {
    let seq = LedSequencer::with_inputs(driver, config.pins.clone(), &config.inputs)?
        .with_verbose(verbose || config.verbose);
    let timing = &config.timing;

    match cmd {
        PatternCommand::On { select } => seq.leds_on(&select.resolve(seq.groups()))?,
        PatternCommand::Off { select } => seq.leds_off(&select.resolve(seq.groups()))?,
        PatternCommand::StepUp {
            select,
            interval_ms,
        } => seq.step_up(
            &select.resolve(seq.groups()),
            interval_or(interval_ms, timing.interval()),
        )?,
        PatternCommand::StepDown {
            select,
            interval_ms,
        } => seq.step_down(
            &select.resolve(seq.groups()),
            interval_or(interval_ms, timing.interval()),
        )?,
        PatternCommand::Cycle {
            select,
            interval_ms,
            mode,
        } => seq.cycle(
            &select.resolve(seq.groups()),
            interval_or(interval_ms, timing.interval()),
            mode,
        )?,
        PatternCommand::WarmUp {
            select,
            interval_ms,
        } => seq.warm_up(
            &select.resolve(seq.groups()),
            interval_or(interval_ms, timing.interval()),
        )?,
        PatternCommand::Flicker {
            select,
            interval_ms,
            times,
            ends_with,
        } => seq.flicker(
            &select.resolve(seq.groups()),
            interval_or(interval_ms, timing.flicker_interval()),
            times.unwrap_or(timing.flicker_times),
            ends_with,
        )?,
        PatternCommand::Pulse {
            pins,
            interval_ms,
            times,
        } => {
            let pins = if pins.is_empty() {
                vec![timing.pulse_pin]
            } else {
                pins
            };
            seq.pulse(
                &pins,
                interval_or(interval_ms, timing.pulse_interval()),
                times.unwrap_or(timing.pulse_times),
            )?
        }
        PatternCommand::Demo => demo::play_demo(seq, timing)?,
    }
    Ok(())
}

pub(super) fn dry_run_summary(driver: &MockDriver) -> DryRunOutput {
    let pwm_writes = driver
        .events
        .borrow()
        .iter()
        .filter(|e| matches!(e, GpioEvent::PwmWrite(..)))
        .count();
    DryRunOutput {
        pin_writes: driver.writes().len(),
        pwm_writes,
        total_delay_ms: driver.total_delay().as_millis() as u64,
        lit: driver.lit(),
    }
}

fn plural(n: usize, word: &str) -> String {
    format!("{n} {word}{}", if n == 1 { "" } else { "s" })
}

fn print_dry_run(summary: &DryRunOutput, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(summary).unwrap());
        return;
    }

    println!(
        "Dry run: {}, {}, {:.2?} of delays",
        plural(summary.pin_writes, "pin write"),
        plural(summary.pwm_writes, "PWM write"),
        Duration::from_millis(summary.total_delay_ms)
    );
    if summary.lit.is_empty() {
        println!("Lit at end: none");
    } else {
        println!("Lit at end: {}", join_pins(&summary.lit));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{FlickerEnd, PinArgs};
    use pilights_lib::gpio::GpioError;
    use pilights_lib::PilightsError;

    fn select_all() -> PinArgs {
        PinArgs::default()
    }

    #[test]
    fn on_lights_every_configured_pin() {
        let dev = MockDriver::new();
        let config = Config::default();
        play(&dev, PatternCommand::On { select: select_all() }, &config, false).unwrap();
        assert_eq!(dev.lit().len(), 14);
    }

    #[test]
    fn flicker_uses_config_timing() {
        let dev = MockDriver::new();
        let mut config = Config::default();
        config.timing.flicker_times = 2;
        config.timing.flicker_interval_ms = 5;
        play(
            &dev,
            PatternCommand::Flicker {
                select: select_all(),
                interval_ms: None,
                times: None,
                ends_with: FlickerEnd::On,
            },
            &config,
            false,
        )
        .unwrap();
        assert_eq!(dev.delays(), vec![Duration::from_millis(5); 5]);
        assert_eq!(dev.lit().len(), 14);
    }

    #[test]
    fn interval_flag_overrides_config() {
        let dev = MockDriver::new();
        play(
            &dev,
            PatternCommand::StepUp {
                select: select_all(),
                interval_ms: Some(7),
            },
            &Config::default(),
            false,
        )
        .unwrap();
        assert!(dev.delays().iter().all(|d| *d == Duration::from_millis(7)));
    }

    #[test]
    fn pulse_defaults_to_configured_pin() {
        let dev = MockDriver::new();
        play(
            &dev,
            PatternCommand::Pulse {
                pins: vec![],
                interval_ms: Some(0),
                times: Some(1),
            },
            &Config::default(),
            false,
        )
        .unwrap();
        assert_eq!(dev.pwm_values(18).len(), 513);
        assert_eq!(dev.events.borrow().last(), Some(&GpioEvent::Cleanup));
    }

    #[test]
    fn unknown_pin_is_gpio_error() {
        let dev = MockDriver::new();
        let err = play(
            &dev,
            PatternCommand::Off {
                select: PinArgs {
                    pins: vec![2],
                    group: None,
                },
            },
            &Config::default(),
            false,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PilightsError::Gpio(GpioError::PinNotConfigured(2))
        ));
    }

    #[test]
    fn summary_counts_writes_and_delays() {
        let dev = MockDriver::new();
        play(
            &dev,
            PatternCommand::StepUp {
                select: select_all(),
                interval_ms: Some(100),
            },
            &Config::default(),
            false,
        )
        .unwrap();
        let summary = dry_run_summary(&dev);
        assert_eq!(summary.pin_writes, 14);
        assert_eq!(summary.pwm_writes, 0);
        assert_eq!(summary.total_delay_ms, 1400);
        assert_eq!(summary.lit.len(), 14);
    }

    #[test]
    fn plural_words() {
        assert_eq!(plural(1, "pin write"), "1 pin write");
        assert_eq!(plural(0, "PWM write"), "0 PWM writes");
    }
}
