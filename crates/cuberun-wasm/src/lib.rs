//! Browser game-over overlay for Cuberun
//!
//! The overlay draws on its own canvas stacked above the game. The page
//! reports the game state every frame with [`GameOverOverlay::set_game_state`]
//! and drives the overlay from `requestAnimationFrame` through
//! [`GameOverOverlay::tick`].

use cuberun_core::{
    GameOverScreen, GameSnapshot, LeaderboardConfig, OverlayConfig, ScreenEvent,
};
use log::{error, info, LevelFilter};
use std::time::Duration;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, KeyboardEvent};

mod logger;
mod render;
mod storage;
mod sync;
mod theme;


pub use render::{OverlayLayout, Rect};
pub use storage::LocalStore;
pub use sync::{FetchLeaderboard, SpawnLocalDispatcher};
pub use theme::Theme;

// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    logger::init(LevelFilter::Info);
}

/// Keys that act as the RESTART button
pub fn is_restart_key(key: &str) -> bool {
    matches!(key, "Enter" | " " | "r" | "R")
}

fn font_size_for(width: u32, height: u32) -> f64 {
    (width.min(height) as f64 / 22.0).clamp(14.0, 36.0)
}

/// Milliseconds from `performance.now()` as a monotonic duration
fn now() -> Duration {
    let millis = web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0);
    Duration::from_secs_f64(millis.max(0.0) / 1000.0)
}

/// The game-over overlay controller
#[wasm_bindgen]
pub struct GameOverOverlay {
    screen: GameOverScreen<LocalStore, SpawnLocalDispatcher>,
    game: GameSnapshot,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    theme: Theme,
    layout: OverlayLayout,
    width: u32,
    height: u32,
    dpr: f64,
}

#[wasm_bindgen]
impl GameOverOverlay {
    /// Attach the overlay to a canvas element and load the high scores
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, width: u32, height: u32) -> Result<GameOverOverlay, JsValue> {
        let document = web_sys::window()
            .ok_or("No window")?
            .document()
            .ok_or("No document")?;

        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("Canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        let ctx = canvas
            .get_context("2d")?
            .ok_or("Failed to get 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let leaderboard = LeaderboardConfig::from_build_env();
        info!(
            "Leaderboard sync {} ({})",
            if leaderboard.enabled { "enabled" } else { "disabled" },
            leaderboard.base_url
        );
        let dispatcher =
            SpawnLocalDispatcher::new(FetchLeaderboard::new(&leaderboard), leaderboard);
        let screen = GameOverScreen::mount(LocalStore::open(), dispatcher, &OverlayConfig::default());

        let mut overlay = GameOverOverlay {
            screen,
            game: GameSnapshot::running(0.0),
            canvas,
            ctx,
            theme: Theme::dark(),
            layout: OverlayLayout::new(width, height, font_size_for(width, height)),
            width,
            height,
            dpr: 1.0,
        };
        overlay.resize(width, height);
        Ok(overlay)
    }

    /// Report the game's current state; takes effect on the next tick
    #[wasm_bindgen]
    pub fn set_game_state(&mut self, game_over: bool, score: f64) {
        self.game = GameSnapshot { game_over, score };
    }

    /// Advance the overlay (call from requestAnimationFrame)
    #[wasm_bindgen]
    pub fn tick(&mut self) {
        if let Some(ScreenEvent::Entered { score, recorded }) =
            self.screen.update(&self.game, now())
        {
            info!("Run ended with {} (new high score: {})", score, recorded);
        }
        self.render();
    }

    /// Whether the overlay is currently covering the game
    #[wasm_bindgen]
    pub fn is_shown(&self) -> bool {
        self.screen.visibility().is_shown()
    }

    /// "hidden", "entering" or "visible"
    #[wasm_bindgen]
    pub fn visibility(&self) -> String {
        format!("{:?}", self.screen.visibility()).to_lowercase()
    }

    /// The stored top three, highest first
    #[wasm_bindgen]
    pub fn high_scores(&self) -> Vec<f64> {
        self.screen
            .high_scores()
            .entries()
            .iter()
            .map(|&s| s as f64)
            .collect()
    }

    /// Overlay contents as a plain object, `null` while hidden
    #[wasm_bindgen]
    pub fn view(&self) -> Result<JsValue, JsValue> {
        match self.screen.view() {
            Some(view) => serde_wasm_bindgen::to_value(&view).map_err(JsValue::from),
            None => Ok(JsValue::NULL),
        }
    }

    /// Overlay contents as JSON, empty while hidden
    #[wasm_bindgen]
    pub fn view_json(&self) -> String {
        self.screen
            .view()
            .and_then(|view| serde_json::to_string(&view).ok())
            .unwrap_or_default()
    }

    /// Handle keyboard input; returns true if the key was used
    #[wasm_bindgen]
    pub fn handle_key(&mut self, event: &KeyboardEvent) -> bool {
        if self.is_shown() && is_restart_key(&event.key()) {
            self.restart();
            return true;
        }
        false
    }

    /// Handle a click at logical canvas coordinates; returns true if it hit
    /// the restart button
    #[wasm_bindgen]
    pub fn handle_click(&mut self, x: f64, y: f64) -> bool {
        if self.is_shown() && self.layout.restart.contains(x, y) {
            self.restart();
            return true;
        }
        false
    }

    /// Start over by reloading the page
    #[wasm_bindgen]
    pub fn restart(&self) {
        info!("Restarting");
        let reloaded = web_sys::window()
            .ok_or_else(|| JsValue::from_str("No window"))
            .and_then(|w| w.location().reload());
        if let Err(e) = reloaded {
            error!("Could not reload the page: {:?}", e);
        }
    }

    /// Set the color theme
    #[wasm_bindgen]
    pub fn set_theme(&mut self, theme_name: &str) {
        self.theme = match theme_name {
            "high_contrast" => Theme::high_contrast(),
            _ => Theme::dark(),
        };
        self.render();
    }

    /// Resize the overlay canvas
    #[wasm_bindgen]
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(320);
        let height = height.max(240);

        self.width = width;
        self.height = height;

        self.dpr = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0);

        // Actual resolution is scaled by dpr for crisp text
        self.canvas.set_width((width as f64 * self.dpr) as u32);
        self.canvas.set_height((height as f64 * self.dpr) as u32);

        let html_element: &HtmlElement = self.canvas.as_ref();
        let style = html_element.style();
        let _ = style.set_property("width", &format!("{}px", width));
        let _ = style.set_property("height", &format!("{}px", height));

        let _ = self.ctx.reset_transform();
        let _ = self.ctx.scale(self.dpr, self.dpr);

        self.layout = OverlayLayout::new(width, height, font_size_for(width, height));
        self.render();
    }

    fn render(&self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.width as f64, self.height as f64);
        if let Some(view) = self.screen.view() {
            render::render_overlay(
                &self.ctx,
                &view,
                &self.theme,
                &self.layout,
                self.width,
                self.height,
            );
        }
    }
}
