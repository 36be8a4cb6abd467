//! Remote leaderboard backend abstraction
//!
//! The remote service keeps one score per user and game type. A finished run
//! is submitted with `POST /score/add_score`; if the service answers that the
//! entry already exists the score is sent again with `PUT /score/update_score`.
//! Backends:
//! - HTTP: provided by each front end (fetch in the browser, blocking client
//!   in the terminal)
//! - Mock: in-memory stand-in with the same conflict semantics

use crate::config::LeaderboardConfig;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

pub const ADD_SCORE_PATH: &str = "/score/add_score";
pub const UPDATE_SCORE_PATH: &str = "/score/update_score";

/// Phrase in an `error` field that marks an existing entry
const CONFLICT_MARKER: &str = "already exists";

/// Body of the submit call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddScoreRequest {
    pub user_id: String,
    pub score: u64,
    #[serde(rename = "type")]
    pub game_type: String,
}

/// Body of the update call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateScoreRequest {
    pub user_id: String,
    pub new_score: u64,
    #[serde(rename = "type")]
    pub game_type: String,
}

/// JSON body returned by either endpoint. Only `error` is ever inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreResponse {
    pub body: serde_json::Value,
}

impl ScoreResponse {
    pub fn new(body: serde_json::Value) -> Self {
        Self { body }
    }

    /// Parse a raw response body; anything that is not JSON is an invalid response
    pub fn parse(text: &str) -> LeaderboardResult<Self> {
        serde_json::from_str(text).map_err(|e| LeaderboardError::InvalidResponse(e.to_string()))
    }

    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(serde_json::Value::as_str)
    }

    /// True when the service reports that the entry already exists
    pub fn is_conflict(&self) -> bool {
        self.error_message()
            .is_some_and(|message| message.contains(CONFLICT_MARKER))
    }
}

impl std::fmt::Display for ScoreResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.body)
    }
}

/// Result type for leaderboard operations
pub type LeaderboardResult<T> = Result<T, LeaderboardError>;

/// Errors that can occur during leaderboard operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardError {
    /// Network/connection error
    NetworkError(String),
    /// Server answered with something that is not JSON
    InvalidResponse(String),
    /// Backend cannot be used in this environment
    Unavailable(String),
}

impl std::fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError(e) => write!(f, "Network error: {}", e),
            Self::InvalidResponse(e) => write!(f, "Invalid response: {}", e),
            Self::Unavailable(e) => write!(f, "Leaderboard unavailable: {}", e),
        }
    }
}

impl std::error::Error for LeaderboardError {}

/// Trait for leaderboard backends
///
/// A non-2xx status is not an error as long as the body is JSON: the conflict
/// answer is such a response.
#[allow(async_fn_in_trait)]
pub trait LeaderboardBackend {
    /// Create the entry for this user and game type
    async fn add_score(&self, request: &AddScoreRequest) -> LeaderboardResult<ScoreResponse>;

    /// Overwrite the existing entry
    async fn update_score(&self, request: &UpdateScoreRequest)
        -> LeaderboardResult<ScoreResponse>;

    /// Get backend name for display
    fn backend_name(&self) -> &'static str;
}

/// Which path a sync took. Purely informational; a sync never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Sync is turned off in the config
    Disabled,
    /// Submit succeeded without conflict
    Submitted,
    /// Submit reported a conflict and the update call completed
    Updated,
    /// Submit reported a conflict and the update call failed
    UpdateFailed,
    /// Submit failed at transport level; no update was attempted
    SubmitFailed,
}

/// Submit `score`, falling back to an update if the entry already exists.
///
/// Best effort: no retries, every failure is logged and dropped.
pub async fn sync_score<B: LeaderboardBackend>(
    backend: &B,
    config: &LeaderboardConfig,
    score: u64,
) -> SyncOutcome {
    if !config.enabled {
        debug!("Leaderboard sync disabled, skipping score {}", score);
        return SyncOutcome::Disabled;
    }

    info!("Submitting score: {} ({})", score, backend.backend_name());
    let request = AddScoreRequest {
        user_id: config.user_id.clone(),
        score,
        game_type: config.game_type.clone(),
    };

    let response = match backend.add_score(&request).await {
        Ok(response) => response,
        Err(e) => {
            error!("Error submitting score: {}", e);
            return SyncOutcome::SubmitFailed;
        }
    };
    info!("Score submission response: {}", response);

    if !response.is_conflict() {
        info!("Score submitted successfully");
        return SyncOutcome::Submitted;
    }

    info!("Updating score: {}", score);
    let update = UpdateScoreRequest {
        user_id: config.user_id.clone(),
        new_score: score,
        game_type: config.game_type.clone(),
    };

    match backend.update_score(&update).await {
        Ok(response) => {
            info!("Score update response: {}", response);
            SyncOutcome::Updated
        }
        Err(e) => {
            error!("Error updating score: {}", e);
            SyncOutcome::UpdateFailed
        }
    }
}

// ==================== Mock Backend ====================

/// A call received by [`MockLeaderboard`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Add(AddScoreRequest),
    Update(UpdateScoreRequest),
}

/// In-memory leaderboard with the remote service's conflict semantics
pub struct MockLeaderboard {
    entries: Mutex<HashMap<(String, String), u64>>,
    calls: Mutex<Vec<MockCall>>,
    available: Mutex<bool>,
    scripted_add: Mutex<Option<LeaderboardResult<ScoreResponse>>>,
}

impl MockLeaderboard {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            available: Mutex::new(true),
            scripted_add: Mutex::new(None),
        }
    }

    /// Set whether calls should fail with a network error
    pub fn set_available(&self, available: bool) {
        *lock(&self.available) = available;
    }

    /// Answer every subsequent submit with `result` instead of the stored state
    pub fn script_add_response(&self, result: LeaderboardResult<ScoreResponse>) {
        *lock(&self.scripted_add) = Some(result);
    }

    /// Every call received, in order
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    pub fn score_for(&self, user_id: &str, game_type: &str) -> Option<u64> {
        lock(&self.entries)
            .get(&(user_id.to_string(), game_type.to_string()))
            .copied()
    }

    /// Get entry count
    pub fn count(&self) -> usize {
        lock(&self.entries).len()
    }

    fn check_available(&self) -> LeaderboardResult<()> {
        if *lock(&self.available) {
            Ok(())
        } else {
            Err(LeaderboardError::Unavailable("Mock unavailable".into()))
        }
    }
}

impl Default for MockLeaderboard {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl LeaderboardBackend for MockLeaderboard {
    async fn add_score(&self, request: &AddScoreRequest) -> LeaderboardResult<ScoreResponse> {
        lock(&self.calls).push(MockCall::Add(request.clone()));
        self.check_available()?;

        if let Some(scripted) = lock(&self.scripted_add).clone() {
            return scripted;
        }

        let key = (request.user_id.clone(), request.game_type.clone());
        let mut entries = lock(&self.entries);
        if entries.contains_key(&key) {
            return Ok(ScoreResponse::new(serde_json::json!({
                "error": format!("Score already exists for user {}", request.user_id),
            })));
        }
        entries.insert(key, request.score);
        Ok(ScoreResponse::new(serde_json::json!({
            "message": "Score added successfully",
        })))
    }

    async fn update_score(
        &self,
        request: &UpdateScoreRequest,
    ) -> LeaderboardResult<ScoreResponse> {
        lock(&self.calls).push(MockCall::Update(request.clone()));
        self.check_available()?;

        let key = (request.user_id.clone(), request.game_type.clone());
        let mut entries = lock(&self.entries);
        match entries.get_mut(&key) {
            Some(score) => {
                *score = request.new_score;
                Ok(ScoreResponse::new(serde_json::json!({
                    "message": "Score updated successfully",
                })))
            }
            None => Ok(ScoreResponse::new(serde_json::json!({
                "error": "Score not found",
            }))),
        }
    }

    fn backend_name(&self) -> &'static str {
        "Mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;

    fn add_calls(calls: &[MockCall]) -> usize {
        calls.iter().filter(|c| matches!(c, MockCall::Add(_))).count()
    }

    #[test]
    fn test_request_wire_shape() {
        let add = AddScoreRequest {
            user_id: "user1234".into(),
            score: 42,
            game_type: "game2".into(),
        };
        assert_eq!(
            serde_json::to_value(&add).unwrap(),
            serde_json::json!({"user_id": "user1234", "score": 42, "type": "game2"})
        );

        let update = UpdateScoreRequest {
            user_id: "user1234".into(),
            new_score: 42,
            game_type: "game2".into(),
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"user_id": "user1234", "new_score": 42, "type": "game2"})
        );
    }

    #[test]
    fn test_conflict_detection() {
        let conflict = ScoreResponse::parse(r#"{"error": "score already exists for user"}"#).unwrap();
        assert!(conflict.is_conflict());

        let other = ScoreResponse::parse(r#"{"error": "invalid type"}"#).unwrap();
        assert!(!other.is_conflict());

        let ok = ScoreResponse::parse(r#"{"message": "ok"}"#).unwrap();
        assert!(!ok.is_conflict());
        assert_eq!(ok.error_message(), None);

        assert!(matches!(
            ScoreResponse::parse("<html>502</html>"),
            Err(LeaderboardError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_first_submit_creates_entry() {
        let backend = MockLeaderboard::new();
        let config = LeaderboardConfig::default();

        let outcome = block_on(sync_score(&backend, &config, 42));
        assert_eq!(outcome, SyncOutcome::Submitted);
        assert_eq!(backend.score_for("user1234", "game2"), Some(42));
        assert_eq!(backend.calls().len(), 1);
    }

    #[test]
    fn test_conflict_falls_back_to_update() {
        let backend = MockLeaderboard::new();
        backend.script_add_response(Ok(ScoreResponse::new(
            serde_json::json!({"error": "score already exists for user"}),
        )));
        let config = LeaderboardConfig::default();

        let outcome = block_on(sync_score(&backend, &config, 77));
        assert_eq!(outcome, SyncOutcome::Updated);

        let calls = backend.calls();
        assert_eq!(add_calls(&calls), 1);
        assert_eq!(
            calls[1],
            MockCall::Update(UpdateScoreRequest {
                user_id: "user1234".into(),
                new_score: 77,
                game_type: "game2".into(),
            })
        );
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn test_second_run_updates_existing_entry() {
        let backend = MockLeaderboard::new();
        let config = LeaderboardConfig::default();

        block_on(sync_score(&backend, &config, 10));
        let outcome = block_on(sync_score(&backend, &config, 3));

        assert_eq!(outcome, SyncOutcome::Updated);
        // No read-back or max(): the remote entry simply takes the latest score
        assert_eq!(backend.score_for("user1234", "game2"), Some(3));
        assert_eq!(backend.count(), 1);
    }

    #[test]
    fn test_transport_failure_is_swallowed() {
        let backend = MockLeaderboard::new();
        backend.set_available(false);
        let config = LeaderboardConfig::default();

        let outcome = block_on(sync_score(&backend, &config, 42));
        assert_eq!(outcome, SyncOutcome::SubmitFailed);
        assert_eq!(backend.calls().len(), 1);
    }

    #[test]
    fn test_invalid_body_is_swallowed() {
        let backend = MockLeaderboard::new();
        backend.script_add_response(Err(LeaderboardError::InvalidResponse(
            "expected value at line 1 column 1".into(),
        )));
        let config = LeaderboardConfig::default();

        assert_eq!(
            block_on(sync_score(&backend, &config, 42)),
            SyncOutcome::SubmitFailed
        );
        assert_eq!(add_calls(&backend.calls()), 1);
        assert_eq!(backend.calls().len(), 1);
    }

    #[test]
    fn test_update_failure_is_swallowed() {
        let backend = MockLeaderboard::new();
        let config = LeaderboardConfig::default();
        block_on(sync_score(&backend, &config, 10));

        let flaky = FailingUpdate(&backend);
        assert_eq!(
            block_on(sync_score(&flaky, &config, 20)),
            SyncOutcome::UpdateFailed
        );
        assert_eq!(backend.score_for("user1234", "game2"), Some(10));
    }

    struct FailingUpdate<'a>(&'a MockLeaderboard);

    impl LeaderboardBackend for FailingUpdate<'_> {
        async fn add_score(&self, request: &AddScoreRequest) -> LeaderboardResult<ScoreResponse> {
            self.0.add_score(request).await
        }

        async fn update_score(
            &self,
            _request: &UpdateScoreRequest,
        ) -> LeaderboardResult<ScoreResponse> {
            Err(LeaderboardError::NetworkError("connection reset".into()))
        }

        fn backend_name(&self) -> &'static str {
            "FailingUpdate"
        }
    }

    #[test]
    fn test_disabled_sync_makes_no_calls() {
        let backend = MockLeaderboard::new();
        let config = LeaderboardConfig {
            enabled: false,
            ..Default::default()
        };

        assert_eq!(
            block_on(sync_score(&backend, &config, 42)),
            SyncOutcome::Disabled
        );
        assert!(backend.calls().is_empty());
    }
}
