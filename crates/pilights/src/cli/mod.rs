//! CLI subcommands — patterns, pin listing, configuration.

mod config_cmd;
mod demo;
mod pattern;
mod pins;

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde::Serialize;

pub(super) use pilights_lib::config::Config;
pub(super) use pilights_lib::error::Result;
pub(super) use pilights_lib::gpio::{self, GpioDriver, PinId};
pub(super) use pilights_lib::groups::{Color, PinGroups};
pub(super) use pilights_lib::sequencer::{CycleMode, FlickerEnd, LedSequencer};

/// Global flags shared by every subcommand.
pub struct Options {
    pub json: bool,
    pub verbose: bool,
    pub dry_run: bool,
    pub config: Option<PathBuf>,
}

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {}", format_kv(key, value, w - 2));
}

/// `[19, 13, 6]` → `"19, 13, 6"`.
pub(super) fn join_pins(pins: &[PinId]) -> String {
    let names: Vec<String> = pins.iter().map(|p| p.to_string()).collect();
    names.join(", ")
}

/// Load the config from `custom_path`, or from the default location.
pub(super) fn load_config(custom_path: Option<&Path>) -> Config {
    match custom_path {
        Some(path) => {
            let (config, warnings) = Config::load_from(path);
            for w in &warnings {
                log::warn!("{w}");
            }
            config
        }
        None => Config::load(),
    }
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct PinsOutput {
    pub reds: Vec<PinId>,
    pub greens: Vec<PinId>,
    pub blues: Vec<PinId>,
    pub all: Vec<PinId>,
    pub inputs: Vec<PinId>,
}

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings: Config,
    pub problems: Vec<String>,
}

#[derive(Serialize)]
pub(super) struct DryRunOutput {
    pub pin_writes: usize,
    pub pwm_writes: usize,
    pub total_delay_ms: u64,
    pub lit: Vec<PinId>,
}

// ── Arguments ──

/// Which LEDs a pattern drives. Defaults to every configured LED.
#[derive(Args, Debug, Clone, Default)]
pub struct PinArgs {
    /// BCM pin numbers, comma separated (e.g. 19,13,6)
    #[arg(long, value_delimiter = ',', conflicts_with = "group")]
    pins: Vec<PinId>,

    /// Drive a single color group (red, green or blue)
    #[arg(long)]
    group: Option<Color>,
}

impl PinArgs {
    pub(super) fn resolve(&self, groups: &PinGroups) -> Vec<PinId> {
        if !self.pins.is_empty() {
            self.pins.clone()
        } else if let Some(color) = self.group {
            groups.group(color).to_vec()
        } else {
            groups.all()
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum PatternCommand {
    /// Turn LEDs on
    On {
        #[command(flatten)]
        select: PinArgs,
    },

    /// Turn LEDs off
    Off {
        #[command(flatten)]
        select: PinArgs,
    },

    /// Turn LEDs on one at a time
    StepUp {
        #[command(flatten)]
        select: PinArgs,
        /// Pause after each LED (default: timing.interval_ms)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Turn LEDs off one at a time
    StepDown {
        #[command(flatten)]
        select: PinArgs,
        /// Pause after each LED (default: timing.interval_ms)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Blink LEDs in turn, optionally sweeping back
    Cycle {
        #[command(flatten)]
        select: PinArgs,
        /// On and off time per LED (default: timing.interval_ms)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// full = forward then back, forward = one pass
        #[arg(long, default_value_t = CycleMode::Full)]
        mode: CycleMode,
    },

    /// Light symmetric pairs from the middle outwards
    WarmUp {
        #[command(flatten)]
        select: PinArgs,
        /// Time each pair stays lit (default: timing.interval_ms)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Flash LEDs together
    Flicker {
        #[command(flatten)]
        select: PinArgs,
        /// On and off time per flash (default: timing.flicker_interval_ms)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Number of flashes (default: timing.flicker_times)
        #[arg(long)]
        times: Option<u32>,
        /// Leave the LEDs on or off afterwards
        #[arg(long, default_value_t = FlickerEnd::Off)]
        ends_with: FlickerEnd,
    },

    /// Fade LEDs up and down with PWM, then release all pins
    Pulse {
        /// BCM pin numbers, comma separated (default: timing.pulse_pin)
        #[arg(long, value_delimiter = ',')]
        pins: Vec<PinId>,
        /// Pause per duty step (default: timing.pulse_interval_ms)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Number of fades (default: timing.pulse_times)
        #[arg(long)]
        times: Option<u32>,
    },

    /// Play every pattern once, ending with a pulse
    Demo,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(flatten)]
    Pattern(PatternCommand),

    /// List the configured pin groups
    Pins,

    /// Show current configuration and file path
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

pub fn run(cmd: Command, opts: &Options) -> Result<()> {
    let config = load_config(opts.config.as_deref());
    match cmd {
        Command::Pattern(pattern) => {
            config.check()?;
            pattern::cmd_pattern(pattern, &config, opts)
        }
        Command::Pins => pins::cmd_pins(&config, opts.json),
        Command::Config { init } => config_cmd::cmd_config(&config, opts, init),
    }
}
