//! `demo` subcommand — every pattern once, in a fixed order.

use pilights_lib::config::Timing;

use super::{CycleMode, FlickerEnd, GpioDriver, LedSequencer};

/// Ends with `pulse`, which releases the pins, so it has to come last.
pub(super) fn play_demo<D: GpioDriver>(
    seq: LedSequencer<D>,
    timing: &Timing,
) -> pilights_lib::gpio::Result<()> {
    let all = seq.all().to_vec();
    seq.leds_off(&all)?;
    seq.step_up(&all, timing.interval())?;
    seq.step_down(&all, timing.interval())?;
    seq.cycle(&all, timing.interval(), CycleMode::Full)?;
    seq.warm_up(&all, timing.interval())?;
    seq.flicker(
        &all,
        timing.flicker_interval(),
        timing.flicker_times,
        FlickerEnd::On,
    )?;
    seq.leds_off(&all)?;
    seq.pulse(&[timing.pulse_pin], timing.pulse_interval(), timing.pulse_times)
}
