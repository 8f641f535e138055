use chrono::{Local, Timelike};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Visual mode. Two states, one transition (`toggle`), persisted on change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Resolve the initial theme: persisted value, then the terminal
    /// background signal, then the local hour of day.
    pub fn resolve(stored: Option<Theme>) -> Theme {
        stored
            .or_else(|| from_terminal_background(std::env::var("COLORFGBG").ok().as_deref()))
            .unwrap_or_else(|| from_hour(Local::now().hour()))
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                bg: Color::White,
                fg: Color::Black,
                dim: Color::DarkGray,
                accent: Color::Blue,
                high: Color::Red,
                done: Color::Green,
            },
            Theme::Dark => Palette {
                bg: Color::Black,
                fg: Color::Gray,
                dim: Color::DarkGray,
                accent: Color::Cyan,
                high: Color::LightRed,
                done: Color::LightGreen,
            },
        }
    }
}

/// Colors the renderer draws with for the current theme.
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub dim: Color,
    pub accent: Color,
    pub high: Color,
    pub done: Color,
}

/// Interpret `COLORFGBG` (set by rxvt, konsole, and friends as "fg;bg" or
/// "fg;default;bg"). Background 7 or 15 means a light terminal.
pub fn from_terminal_background(colorfgbg: Option<&str>) -> Option<Theme> {
    let raw = colorfgbg?;
    let bg: u8 = raw.rsplit(';').next()?.trim().parse().ok()?;
    if bg == 7 || bg == 15 {
        Some(Theme::Light)
    } else {
        Some(Theme::Dark)
    }
}

/// Daytime heuristic: light between 07:00 and 19:59 local time.
pub fn from_hour(hour: u32) -> Theme {
    if (7..20).contains(&hour) {
        Theme::Light
    } else {
        Theme::Dark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_both_ways() {
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
    }

    #[test]
    fn hour_heuristic_boundaries() {
        assert_eq!(from_hour(6), Theme::Dark);
        assert_eq!(from_hour(7), Theme::Light);
        assert_eq!(from_hour(19), Theme::Light);
        assert_eq!(from_hour(20), Theme::Dark);
        assert_eq!(from_hour(0), Theme::Dark);
    }

    #[test]
    fn colorfgbg_light_backgrounds() {
        assert_eq!(from_terminal_background(Some("0;15")), Some(Theme::Light));
        assert_eq!(from_terminal_background(Some("0;default;7")), Some(Theme::Light));
    }

    #[test]
    fn colorfgbg_dark_background() {
        assert_eq!(from_terminal_background(Some("15;0")), Some(Theme::Dark));
    }

    #[test]
    fn colorfgbg_unset_or_unparseable_gives_no_signal() {
        assert_eq!(from_terminal_background(None), None);
        assert_eq!(from_terminal_background(Some("")), None);
        assert_eq!(from_terminal_background(Some("fg;default")), None);
    }

    #[test]
    fn stored_preference_wins() {
        assert_eq!(Theme::resolve(Some(Theme::Dark)), Theme::Dark);
        assert_eq!(Theme::resolve(Some(Theme::Light)), Theme::Light);
    }

    #[test]
    fn theme_serializes_as_lowercase_string() {
        assert_eq!(serde_json::to_string(&Theme::Light).unwrap(), r#""light""#);
        let back: Theme = serde_json::from_str(r#""dark""#).unwrap();
        assert_eq!(back, Theme::Dark);
    }
}
