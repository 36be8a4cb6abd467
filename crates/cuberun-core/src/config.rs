//! Configuration for leaderboard sync and the overlay

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://virtual-gf-py.vercel.app";
pub const DEFAULT_USER_ID: &str = "user1234";
pub const DEFAULT_GAME_TYPE: &str = "game2";

/// Delay before the dim overlay turns fully opaque
pub const DEFAULT_OPAQUE_DELAY: Duration = Duration::from_millis(500);

/// Where and as whom scores are synced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    pub base_url: String,
    pub user_id: String,
    pub game_type: String,
    /// When false no request is ever made
    pub enabled: bool,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            game_type: DEFAULT_GAME_TYPE.to_string(),
            enabled: true,
        }
    }
}

impl LeaderboardConfig {
    /// Read overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides captured at compile time (for the browser build)
    pub fn from_build_env() -> Self {
        Self::from_lookup(|key| {
            let value = match key {
                "CUBERUN_API_URL" => option_env!("CUBERUN_API_URL"),
                "CUBERUN_USER_ID" => option_env!("CUBERUN_USER_ID"),
                "CUBERUN_GAME_TYPE" => option_env!("CUBERUN_GAME_TYPE"),
                "CUBERUN_OFFLINE" => option_env!("CUBERUN_OFFLINE"),
                _ => None,
            };
            value.map(str::to_string)
        })
    }

    /// Build a config from any variable source, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            base_url: non_empty("CUBERUN_API_URL").unwrap_or(defaults.base_url),
            user_id: non_empty("CUBERUN_USER_ID").unwrap_or(defaults.user_id),
            game_type: non_empty("CUBERUN_GAME_TYPE").unwrap_or(defaults.game_type),
            enabled: !non_empty("CUBERUN_OFFLINE").is_some_and(|v| parse_flag(&v)),
        }
    }

    /// Full URL for an endpoint path such as `/score/add_score`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Overlay timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayConfig {
    pub opaque_delay: Duration,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            opaque_delay: DEFAULT_OPAQUE_DELAY,
        }
    }
}
