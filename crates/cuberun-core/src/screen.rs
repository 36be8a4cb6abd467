//! The game-over screen
//!
//! Owns the high-score table, the overlay state machine and the hand-off to
//! leaderboard sync. Front ends call [`GameOverScreen::update`] once per frame
//! with the current game state and draw whatever [`GameOverScreen::view`]
//! returns.

use crate::config::OverlayConfig;
use crate::game_state::GameStateSource;
use crate::highscores::{truncate_score, HighScoreTable, TABLE_SIZE};
use crate::overlay::{Edge, OverlayMachine, Visibility};
use crate::store::KeyValueStore;
use log::{error, info};
use serde::Serialize;
use std::time::Duration;

/// Background color of the overlay (`#141622`)
pub const OVERLAY_RGB: (u8, u8, u8) = (0x14, 0x16, 0x22);
/// Background alpha while entering (`CC`)
pub const ENTERING_ALPHA: f64 = 0.8;

/// Starts a leaderboard sync without waiting for it
pub trait SyncDispatcher {
    fn dispatch(&self, score: u64);
}

/// Something the front end may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent {
    /// The run ended; `recorded` is true if the score entered the table
    Entered { score: u64, recorded: bool },
    /// The overlay became fully opaque
    Opaque,
    /// The game-over flag dropped and the overlay is hidden again
    Exited,
}

/// One ranked slot as displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotView {
    /// One-based rank
    pub rank: usize,
    pub label: String,
    /// Slot holds the score of the run that just ended
    pub underlined: bool,
}

/// Everything needed to draw the overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayView {
    pub visibility: Visibility,
    pub title: &'static str,
    pub score_label: String,
    pub slots: Vec<SlotView>,
    pub restart_label: &'static str,
    /// Alpha of the background color
    pub background_alpha: f64,
}

pub struct GameOverScreen<S: KeyValueStore, D: SyncDispatcher> {
    store: S,
    dispatcher: D,
    table: HighScoreTable,
    overlay: OverlayMachine,
    score: f64,
}

impl<S: KeyValueStore, D: SyncDispatcher> GameOverScreen<S, D> {
    /// Create the screen, reading the table from `store` once
    pub fn mount(store: S, dispatcher: D, config: &OverlayConfig) -> Self {
        let table = HighScoreTable::load(&store);
        Self {
            store,
            dispatcher,
            table,
            overlay: OverlayMachine::new(config),
            score: 0.0,
        }
    }

    /// Poll the game state and advance the overlay
    pub fn update(&mut self, game: &impl GameStateSource, now: Duration) -> Option<ScreenEvent> {
        let snapshot = game.snapshot();
        self.score = snapshot.score;

        match self.overlay.observe(snapshot.game_over, now) {
            Some(Edge::Rising) => {
                let score = truncate_score(snapshot.score);
                let recorded = self.record(score);
                self.dispatcher.dispatch(score);
                return Some(ScreenEvent::Entered { score, recorded });
            }
            Some(Edge::Falling) => return Some(ScreenEvent::Exited),
            None => {}
        }

        self.overlay.tick(now).then_some(ScreenEvent::Opaque)
    }

    fn record(&mut self, score: u64) -> bool {
        if !self.table.record(score) {
            return false;
        }

        info!("New high score {} -> {:?}", score, self.table.entries());
        // The in-memory table stays updated even if persisting fails
        if let Err(e) = self.table.save(&mut self.store) {
            error!("Could not persist high scores: {}", e);
        }
        true
    }

    pub fn visibility(&self) -> Visibility {
        self.overlay.visibility()
    }

    pub fn high_scores(&self) -> &HighScoreTable {
        &self.table
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// The overlay contents, `None` while hidden
    pub fn view(&self) -> Option<OverlayView> {
        let visibility = self.overlay.visibility();
        if !visibility.is_shown() {
            return None;
        }

        let score = truncate_score(self.score);
        let highlighted = self.table.rank_of(score);
        let slots = (0..TABLE_SIZE)
            .map(|i| SlotView {
                rank: i + 1,
                label: HighScoreTable::slot_label(self.table.entries()[i]),
                underlined: highlighted == Some(i),
            })
            .collect();

        Some(OverlayView {
            visibility,
            title: "GAME OVER",
            score_label: score.to_string(),
            slots,
            restart_label: "RESTART",
            background_alpha: match visibility {
                Visibility::Visible => 1.0,
                _ => ENTERING_ALPHA,
            },
        })
    }

    /// Start over as if freshly mounted: pending transitions are dropped and
    /// the table is read again from the store
    pub fn reload(&mut self, config: &OverlayConfig) {
        self.overlay.teardown();
        self.overlay = OverlayMachine::new(config);
        self.table = HighScoreTable::load(&self.store);
        self.score = 0.0;
    }

    /// Cancel pending transitions and hand back the collaborators
    pub fn teardown(mut self) -> (S, D) {
        self.overlay.teardown();
        (self.store, self.dispatcher)
    }
}
