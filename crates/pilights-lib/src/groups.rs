//! Pin groups — the red, green and blue LEDs as wired on the board.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::gpio::PinId;

/// Ordered pin lists per LED color. Order drives every sequencing pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinGroups {
    #[serde(default = "default_reds")]
    pub reds: Vec<PinId>,
    #[serde(default = "default_greens")]
    pub greens: Vec<PinId>,
    #[serde(default = "default_blues")]
    pub blues: Vec<PinId>,
}

fn default_reds() -> Vec<PinId> {
    vec![19, 13, 6, 12]
}
fn default_greens() -> Vec<PinId> {
    vec![5, 17, 22, 24, 25]
}
fn default_blues() -> Vec<PinId> {
    vec![27, 18, 4, 23, 16]
}

impl Default for PinGroups {
    fn default() -> Self {
        PinGroups {
            reds: default_reds(),
            greens: default_greens(),
            blues: default_blues(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Blue,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::Green => write!(f, "green"),
            Color::Blue => write!(f, "blue"),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" | "reds" => Ok(Color::Red),
            "green" | "greens" => Ok(Color::Green),
            "blue" | "blues" => Ok(Color::Blue),
            other => Err(format!(
                "unknown color \"{other}\" (expected red, green or blue)"
            )),
        }
    }
}

impl PinGroups {
    pub fn new(reds: Vec<PinId>, greens: Vec<PinId>, blues: Vec<PinId>) -> Self {
        PinGroups {
            reds,
            greens,
            blues,
        }
    }

    /// `reds + greens + blues`.
    pub fn all(&self) -> Vec<PinId> {
        self.reds
            .iter()
            .chain(&self.greens)
            .chain(&self.blues)
            .copied()
            .collect()
    }

    pub fn group(&self, color: Color) -> &[PinId] {
        match color {
            Color::Red => &self.reds,
            Color::Green => &self.greens,
            Color::Blue => &self.blues,
        }
    }
}
