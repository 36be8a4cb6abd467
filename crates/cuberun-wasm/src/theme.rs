//! Color themes for the WASM overlay

use cuberun_core::screen::OVERLAY_RGB;
use serde::{Deserialize, Serialize};

/// RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn as_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    pub fn as_css_alpha(&self, alpha: f64) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
    }
}

/// Color theme for the overlay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    /// Overlay background (drawn with the view's alpha)
    pub background: Color,
    /// "GAME OVER" title
    pub title: Color,
    /// Column headings
    pub heading: Color,
    /// Score and table values
    pub value: Color,
    /// Rank numbers
    pub rank: Color,
    /// Restart button fill
    pub button_bg: Color,
    /// Restart button label
    pub button_text: Color,
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        let (r, g, b) = OVERLAY_RGB;
        Self {
            background: Color::new(r, g, b),
            title: Color::new(255, 70, 120),
            heading: Color::new(160, 160, 190),
            value: Color::new(240, 240, 250),
            rank: Color::new(110, 110, 140),
            button_bg: Color::new(60, 40, 120),
            button_text: Color::new(255, 255, 255),
        }
    }

    /// High contrast theme
    pub fn high_contrast() -> Self {
        Self {
            background: Color::new(0, 0, 0),
            title: Color::new(255, 0, 0),
            heading: Color::new(200, 200, 200),
            value: Color::new(255, 255, 255),
            rank: Color::new(200, 200, 200),
            button_bg: Color::new(0, 80, 160),
            button_text: Color::new(255, 255, 0),
        }
    }
}
