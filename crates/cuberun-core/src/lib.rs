//! Cuberun game-over screen engine
//!
//! Platform-independent pieces of the game-over overlay:
//! - [`highscores`]: the persisted top-3 table
//! - [`leaderboard`]: remote score submission with update fallback
//! - [`overlay`]: the Hidden/Entering/Visible state machine
//! - [`screen`]: the component tying them to the shared game state
//!
//! Storage, HTTP and drawing are supplied by the front-end crates.

pub mod config;
pub mod game_state;
pub mod highscores;
pub mod leaderboard;
pub mod overlay;
pub mod screen;
pub mod store;

pub use config::{LeaderboardConfig, OverlayConfig};
pub use game_state::{GameSnapshot, GameStateSource};
pub use highscores::{truncate_score, HighScoreTable, HIGH_SCORES_KEY, TABLE_SIZE};
pub use leaderboard::{
    sync_score, AddScoreRequest, LeaderboardBackend, LeaderboardError, LeaderboardResult,
    MockLeaderboard, ScoreResponse, SyncOutcome, UpdateScoreRequest,
};
pub use overlay::{DelayedAction, OverlayMachine, Visibility};
pub use screen::{GameOverScreen, OverlayView, ScreenEvent, SlotView, SyncDispatcher};
pub use store::{KeyValueStore, MemoryStore, StoreError, StoreResult};
