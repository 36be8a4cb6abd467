//! Read-only view of the shared game state
//!
//! The game itself owns the score and the game-over flag. The overlay only
//! polls a snapshot of them once per frame.

use serde::{Deserialize, Serialize};

/// What the overlay reads from the running game
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_over: bool,
    pub score: f64,
}

impl GameSnapshot {
    pub fn running(score: f64) -> Self {
        Self {
            game_over: false,
            score,
        }
    }

    pub fn over(score: f64) -> Self {
        Self {
            game_over: true,
            score,
        }
    }
}

/// Anything that can report the current game state
pub trait GameStateSource {
    fn snapshot(&self) -> GameSnapshot;
}

impl GameStateSource for GameSnapshot {
    fn snapshot(&self) -> GameSnapshot {
        *self
    }
}
