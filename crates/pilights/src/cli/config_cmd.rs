//! `config` subcommand — show current configuration and file path.

use super::{Config, ConfigOutput, Options, Result, join_pins, kv, kv_indent, kv_width};

pub(super) fn cmd_config(config: &Config, opts: &Options, init: bool) -> Result<()> {
    let config_path = opts.config.clone().or_else(Config::path);
    let config_exists = config_path.as_ref().is_some_and(|p| p.exists());

    if init {
        let Some(path) = &config_path else {
            return Err(pilights_lib::PilightsError::Config(
                "no config directory".into(),
            ));
        };
        if config_exists {
            println!("Config file already exists: {}", path.display());
        } else {
            Config::default().save_to(path)?;
            println!("Wrote default config to {}", path.display());
        }
        return Ok(());
    }

    let problems: Vec<String> = match config.validate() {
        Ok(()) => vec![],
        Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
    };

    if opts.json {
        let output = ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings: config.clone(),
            problems,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return Ok(());
    }

    // Human-readable output
    let w = kv_width(
        &["Config file:"],
        &[
            "verbose:",
            "inputs:",
            "reds:",
            "greens:",
            "blues:",
            "interval_ms:",
            "flicker_interval_ms:",
            "flicker_times:",
            "pulse_pin:",
            "pulse_interval_ms:",
            "pulse_times:",
            "pwm_frequency_hz:",
        ],
    );

    match &config_path {
        Some(p) => {
            if config_exists {
                kv("Config file:", format_args!("{} (loaded)", p.display()), w);
            } else {
                kv(
                    "Config file:",
                    format_args!("{} (not found, using defaults)", p.display()),
                    w,
                );
            }
        }
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    println!("Settings:");
    kv_indent("verbose:", config.verbose, w);
    kv_indent("inputs:", join_pins(&config.inputs), w);
    println!();

    println!("Pins:");
    kv_indent("reds:", join_pins(&config.pins.reds), w);
    kv_indent("greens:", join_pins(&config.pins.greens), w);
    kv_indent("blues:", join_pins(&config.pins.blues), w);
    println!();

    let t = &config.timing;
    println!("Timing:");
    kv_indent("interval_ms:", t.interval_ms, w);
    kv_indent("flicker_interval_ms:", t.flicker_interval_ms, w);
    kv_indent("flicker_times:", t.flicker_times, w);
    kv_indent("pulse_pin:", t.pulse_pin, w);
    kv_indent("pulse_interval_ms:", t.pulse_interval_ms, w);
    kv_indent("pulse_times:", t.pulse_times, w);
    kv_indent("pwm_frequency_hz:", t.pwm_frequency_hz, w);

    if !problems.is_empty() {
        println!();
        println!("Problems:");
        for p in &problems {
            println!("  {p}");
        }
    }
    Ok(())
}
