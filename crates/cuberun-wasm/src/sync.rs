//! Leaderboard sync over `fetch`

use cuberun_core::leaderboard::{ADD_SCORE_PATH, UPDATE_SCORE_PATH};
use cuberun_core::{
    sync_score, AddScoreRequest, LeaderboardBackend, LeaderboardConfig, LeaderboardError,
    LeaderboardResult, ScoreResponse, SyncDispatcher, UpdateScoreRequest,
};
use log::debug;
use reqwest::Method;
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;

/// HTTP leaderboard using the browser's fetch through reqwest
pub struct FetchLeaderboard {
    client: reqwest::Client,
    config: LeaderboardConfig,
}

impl FetchLeaderboard {
    pub fn new(config: &LeaderboardConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: config.clone(),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: &impl Serialize,
    ) -> LeaderboardResult<ScoreResponse> {
        let url = self.config.endpoint(path);
        let response = self
            .client
            .request(method, &url)
            .json(body)
            .send()
            .await
            .map_err(|e| LeaderboardError::NetworkError(e.to_string()))?;

        // Status is not checked: the conflict answer is a JSON error body
        debug!("{} answered HTTP {}", url, response.status());
        let text = response
            .text()
            .await
            .map_err(|e| LeaderboardError::NetworkError(e.to_string()))?;
        ScoreResponse::parse(&text)
    }
}

impl LeaderboardBackend for FetchLeaderboard {
    async fn add_score(&self, request: &AddScoreRequest) -> LeaderboardResult<ScoreResponse> {
        self.send(Method::POST, ADD_SCORE_PATH, request).await
    }

    async fn update_score(
        &self,
        request: &UpdateScoreRequest,
    ) -> LeaderboardResult<ScoreResponse> {
        self.send(Method::PUT, UPDATE_SCORE_PATH, request).await
    }

    fn backend_name(&self) -> &'static str {
        "Fetch"
    }
}

/// Spawns each sync on the browser's microtask queue
pub struct SpawnLocalDispatcher {
    backend: Rc<FetchLeaderboard>,
    config: LeaderboardConfig,
}

impl SpawnLocalDispatcher {
    pub fn new(backend: FetchLeaderboard, config: LeaderboardConfig) -> Self {
        Self {
            backend: Rc::new(backend),
            config,
        }
    }
}

impl SyncDispatcher for SpawnLocalDispatcher {
    fn dispatch(&self, score: u64) {
        let backend = Rc::clone(&self.backend);
        let config = self.config.clone();
        spawn_local(async move {
            let outcome = sync_score(backend.as_ref(), &config, score).await;
            debug!("Leaderboard sync for {} finished: {:?}", score, outcome);
        });
    }
}
