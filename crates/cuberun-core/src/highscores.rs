//! Local top-3 high-score table
//!
//! The table always holds exactly [`TABLE_SIZE`] entries sorted descending.
//! Empty slots are zero. It is persisted as a JSON array under
//! [`HIGH_SCORES_KEY`].

use crate::store::{KeyValueStore, StoreError, StoreResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Store key holding the serialized table
pub const HIGH_SCORES_KEY: &str = "highscores";

/// Number of ranked slots
pub const TABLE_SIZE: usize = 3;

/// Truncate a run score to the integer form used by the table and the leaderboard.
///
/// Negative, NaN and infinite scores map to zero.
pub fn truncate_score(score: f64) -> u64 {
    if score.is_finite() && score > 0.0 {
        score.trunc() as u64
    } else {
        0
    }
}

/// A persisted table entry. Older saves hold numbers, entries written by the
/// web build before it was typed were stored as strings ("42").
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredScore {
    Number(f64),
    Text(String),
}

impl StoredScore {
    fn value(&self) -> u64 {
        match self {
            StoredScore::Number(n) => truncate_score(*n),
            StoredScore::Text(s) => s.trim().parse::<f64>().map(truncate_score).unwrap_or(0),
        }
    }
}

/// Top-3 scores, descending, zero-padded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HighScoreTable {
    entries: [u64; TABLE_SIZE],
}

impl HighScoreTable {
    /// An empty (all zero) table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from arbitrary scores, keeping the largest three
    pub fn from_scores(scores: impl IntoIterator<Item = u64>) -> Self {
        let mut all: Vec<u64> = scores.into_iter().collect();
        all.sort_unstable_by(|a, b| b.cmp(a));

        let mut entries = [0; TABLE_SIZE];
        for (slot, score) in entries.iter_mut().zip(all) {
            *slot = score;
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[u64; TABLE_SIZE] {
        &self.entries
    }

    /// Smallest entry (the one a qualifying score displaces)
    pub fn lowest(&self) -> u64 {
        self.entries[TABLE_SIZE - 1]
    }

    /// A score qualifies if it is strictly greater than at least one entry
    pub fn qualifies(&self, score: u64) -> bool {
        self.entries.iter().any(|&entry| score > entry)
    }

    /// Record a finished run. Returns `true` if the table changed.
    ///
    /// Ties never displace an entry.
    pub fn record(&mut self, score: u64) -> bool {
        if !self.qualifies(score) {
            return false;
        }

        self.entries[TABLE_SIZE - 1] = score;
        self.entries.sort_unstable_by(|a, b| b.cmp(a));
        true
    }

    /// Zero-based slot holding `score`, used to highlight the current run.
    /// Zero never matches since zero slots are empty.
    pub fn rank_of(&self, score: u64) -> Option<usize> {
        if score == 0 {
            return None;
        }
        self.entries.iter().position(|&entry| entry == score)
    }

    /// Display label for a slot value
    pub fn slot_label(value: u64) -> String {
        if value > 0 {
            value.to_string()
        } else {
            "-".to_string()
        }
    }

    pub fn to_json(&self) -> StoreResult<String> {
        serde_json::to_string(self).map_err(|e| StoreError::Serialize(e.to_string()))
    }

    /// Parse a stored table. Accepts numbers or numeric strings and any
    /// array length; the result is normalized to three descending entries.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let stored: Vec<StoredScore> = serde_json::from_str(json)?;
        Ok(Self::from_scores(stored.iter().map(StoredScore::value)))
    }

    /// Read the table from `store`. A missing key is a first run; an
    /// unreadable or corrupt value is logged and treated the same way.
    pub fn load(store: &impl KeyValueStore) -> Self {
        match store.get(HIGH_SCORES_KEY) {
            Ok(Some(json)) => Self::from_json(&json).unwrap_or_else(|e| {
                warn!("Ignoring corrupt high score table {:?}: {}", json, e);
                Self::new()
            }),
            Ok(None) => {
                debug!("No stored high scores, starting fresh");
                Self::new()
            }
            Err(e) => {
                warn!("Could not read high scores: {}", e);
                Self::new()
            }
        }
    }

    /// Rewrite the whole table under [`HIGH_SCORES_KEY`]
    pub fn save(&self, store: &mut impl KeyValueStore) -> StoreResult<()> {
        let json = self.to_json()?;
        store.set(HIGH_SCORES_KEY, &json)
    }
}
