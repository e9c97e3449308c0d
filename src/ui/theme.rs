//! Light/dark theme preference and the terminal colours it selects

use std::fmt;

use colored::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                accent: Color::Green,
                muted: Color::BrightBlack,
                text: Color::Black,
                matang: Color::Red,
                mentah: Color::Green,
                berbunga: Color::Yellow,
            },
            Theme::Dark => Palette {
                accent: Color::BrightGreen,
                muted: Color::BrightBlack,
                text: Color::BrightWhite,
                matang: Color::BrightRed,
                mentah: Color::BrightGreen,
                berbunga: Color::BrightYellow,
            },
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Theme::Light => "☾",
            Theme::Dark => "☀",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Terminal colours for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub muted: Color,
    pub text: Color,
    pub matang: Color,
    pub mentah: Color,
    pub berbunga: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Theme::default().palette()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trip() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }
}
