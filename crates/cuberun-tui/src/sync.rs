//! Leaderboard sync for the terminal build
//!
//! Requests go through a blocking `ureq` agent on a short-lived background
//! thread per finished run, so the render loop never waits on the network.

use cuberun_core::leaderboard::{ADD_SCORE_PATH, UPDATE_SCORE_PATH};
use cuberun_core::{
    sync_score, AddScoreRequest, LeaderboardBackend, LeaderboardConfig, LeaderboardError,
    LeaderboardResult, ScoreResponse, SyncDispatcher, SyncOutcome, UpdateScoreRequest,
};
use log::{debug, error};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// HTTP leaderboard over a blocking client
pub struct UreqLeaderboard {
    agent: ureq::Agent,
    config: LeaderboardConfig,
}

impl UreqLeaderboard {
    pub fn new(config: &LeaderboardConfig) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            config: config.clone(),
        }
    }

    fn send(
        &self,
        method: &str,
        path: &str,
        body: &impl Serialize,
    ) -> LeaderboardResult<ScoreResponse> {
        let url = self.config.endpoint(path);
        let response = match self.agent.request(method, &url).send_json(body) {
            Ok(response) => response,
            // The conflict answer comes back with an error status but a JSON body
            Err(ureq::Error::Status(code, response)) => {
                debug!("{} {} answered HTTP {}", method, url, code);
                response
            }
            Err(e) => return Err(LeaderboardError::NetworkError(e.to_string())),
        };

        let text = response
            .into_string()
            .map_err(|e| LeaderboardError::NetworkError(e.to_string()))?;
        ScoreResponse::parse(&text)
    }
}

impl LeaderboardBackend for UreqLeaderboard {
    async fn add_score(&self, request: &AddScoreRequest) -> LeaderboardResult<ScoreResponse> {
        self.send("POST", ADD_SCORE_PATH, request)
    }

    async fn update_score(
        &self,
        request: &UpdateScoreRequest,
    ) -> LeaderboardResult<ScoreResponse> {
        self.send("PUT", UPDATE_SCORE_PATH, request)
    }

    fn backend_name(&self) -> &'static str {
        "HTTP"
    }
}

/// Runs each sync on its own thread and forgets about it
pub struct ThreadDispatcher<B> {
    backend: Arc<B>,
    config: LeaderboardConfig,
    handles: Mutex<Vec<JoinHandle<SyncOutcome>>>,
}

impl<B> ThreadDispatcher<B>
where
    B: LeaderboardBackend + Send + Sync + 'static,
{
    pub fn new(backend: B, config: LeaderboardConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            config,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Wait for every dispatched sync to finish
    #[cfg(test)]
    pub fn wait_all(&self) -> Vec<SyncOutcome> {
        let handles: Vec<_> = self
            .handles
            .lock()
            .map(|mut h| h.drain(..).collect())
            .unwrap_or_default();
        handles.into_iter().filter_map(|h| h.join().ok()).collect()
    }
}

impl<B> SyncDispatcher for ThreadDispatcher<B>
where
    B: LeaderboardBackend + Send + Sync + 'static,
{
    fn dispatch(&self, score: u64) {
        let backend = Arc::clone(&self.backend);
        let config = self.config.clone();

        let spawned = thread::Builder::new()
            .name("leaderboard-sync".into())
            .spawn(move || {
                let outcome = pollster::block_on(sync_score(backend.as_ref(), &config, score));
                debug!("Leaderboard sync for {} finished: {:?}", score, outcome);
                outcome
            });

        match spawned {
            Ok(handle) => {
                if let Ok(mut handles) = self.handles.lock() {
                    handles.retain(|h| !h.is_finished());
                    handles.push(handle);
                }
            }
            Err(e) => error!("Could not start leaderboard sync: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuberun_core::leaderboard::MockCall;
    use cuberun_core::{
        GameOverScreen, GameSnapshot, MemoryStore, MockLeaderboard, OverlayConfig, HIGH_SCORES_KEY,
    };
    use std::time::Duration;

    #[test]
    fn test_dispatch_runs_sync_in_background() {
        let dispatcher = ThreadDispatcher::new(MockLeaderboard::new(), LeaderboardConfig::default());

        dispatcher.dispatch(42);
        assert_eq!(dispatcher.wait_all(), vec![SyncOutcome::Submitted]);

        dispatcher.dispatch(50);
        assert_eq!(dispatcher.wait_all(), vec![SyncOutcome::Updated]);
        assert_eq!(dispatcher.backend.score_for("user1234", "game2"), Some(50));
    }

    #[test]
    fn test_unreachable_server_is_swallowed() {
        let config = LeaderboardConfig {
            // Port 9 (discard) on localhost; nothing is listening in test environments
            base_url: "http://127.0.0.1:9".into(),
            ..Default::default()
        };
        let dispatcher = ThreadDispatcher::new(UreqLeaderboard::new(&config), config);

        dispatcher.dispatch(42);
        assert_eq!(dispatcher.wait_all(), vec![SyncOutcome::SubmitFailed]);
    }

    #[test]
    fn test_offline_config_skips_requests() {
        let config = LeaderboardConfig {
            enabled: false,
            ..Default::default()
        };
        let dispatcher = ThreadDispatcher::new(MockLeaderboard::new(), config);

        dispatcher.dispatch(42);
        assert_eq!(dispatcher.wait_all(), vec![SyncOutcome::Disabled]);
        assert!(dispatcher.backend.calls().is_empty());
    }

    #[test]
    fn test_failed_submit_still_records_locally() {
        let backend = MockLeaderboard::new();
        backend.set_available(false);
        let dispatcher = ThreadDispatcher::new(backend, LeaderboardConfig::default());
        let mut screen = GameOverScreen::mount(
            MemoryStore::with_entry(HIGH_SCORES_KEY, "[100,50,10]"),
            dispatcher,
            &OverlayConfig::default(),
        );

        screen.update(&GameSnapshot::over(75.0), Duration::ZERO);

        assert_eq!(screen.high_scores().entries(), &[100, 75, 50]);
        assert_eq!(screen.store().raw(HIGH_SCORES_KEY), Some("[100,75,50]"));
        assert_eq!(screen.dispatcher().wait_all(), vec![SyncOutcome::SubmitFailed]);
        let calls = screen.dispatcher().backend.calls();
        assert_eq!(calls.len(), 1);
        assert!(!calls.iter().any(|c| matches!(c, MockCall::Update(_))));
    }
}
