use crossterm::style::Color;
use cuberun_core::screen::OVERLAY_RGB;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Track background
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Lane separators
    pub lane: Color,
    /// The player's cube
    pub player: Color,
    /// Incoming cubes
    pub obstacle: Color,
    /// Score/HUD text
    pub info: Color,
    /// Game-over title
    pub title: Color,
    /// Key binding text color
    pub key: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb { r: 8, g: 10, b: 24 },
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            lane: Color::Rgb { r: 60, g: 40, b: 120 },
            player: Color::Rgb { r: 80, g: 220, b: 255 },
            obstacle: Color::Rgb { r: 255, g: 60, b: 160 },
            info: Color::Rgb { r: 170, g: 170, b: 200 },
            title: Color::Rgb { r: 255, g: 90, b: 120 },
            key: Color::Rgb { r: 255, g: 200, b: 80 },
        }
    }

    /// Overlay background blended over the track at `alpha`.
    /// Terminals have no transparency, so the dim stage is a mix.
    pub fn overlay_bg(&self, alpha: f64) -> Color {
        let (r, g, b) = OVERLAY_RGB;
        let (br, bg, bb) = match self.bg {
            Color::Rgb { r, g, b } => (r, g, b),
            _ => (0, 0, 0),
        };
        let mix = |over: u8, under: u8| -> u8 {
            (over as f64 * alpha + under as f64 * (1.0 - alpha)).round() as u8
        };
        Color::Rgb {
            r: mix(r, br),
            g: mix(g, bg),
            b: mix(b, bb),
        }
    }
}
