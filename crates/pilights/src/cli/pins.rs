//! `pins` subcommand — list the configured pin groups.

use super::{Color, Config, PinsOutput, Result, join_pins, kv, kv_width};

pub(super) fn cmd_pins(config: &Config, json: bool) -> Result<()> {
    let groups = &config.pins;

    if json {
        let output = PinsOutput {
            reds: groups.reds.clone(),
            greens: groups.greens.clone(),
            blues: groups.blues.clone(),
            all: groups.all(),
            inputs: config.inputs.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return Ok(());
    }

    let w = kv_width(&["Red:", "Green:", "Blue:", "Inputs:", "All:"], &[]);
    for (label, color) in [
        ("Red:", Color::Red),
        ("Green:", Color::Green),
        ("Blue:", Color::Blue),
    ] {
        kv(label, join_pins(groups.group(color)), w);
    }
    if !config.inputs.is_empty() {
        kv("Inputs:", join_pins(&config.inputs), w);
    }
    let all = groups.all();
    kv(
        "All:",
        format_args!(
            "{} LED{} (pulse on GPIO {})",
            all.len(),
            if all.len() == 1 { "" } else { "s" },
            config.timing.pulse_pin
        ),
        w,
    );
    Ok(())
}
