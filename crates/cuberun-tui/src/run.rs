//! A minimal endless run: three lanes, cubes coming at the player, score grows
//! with distance. This owns the shared game state the overlay reads.

use cuberun_core::{GameSnapshot, GameStateSource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const LANES: usize = 3;
/// Distance at which new cubes appear
pub const HORIZON: f64 = 40.0;
const BASE_SPEED: f64 = 12.0;
const MAX_SPEED: f64 = 45.0;
/// Speed gained per point of score
const ACCELERATION: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub lane: usize,
    /// Distance in front of the player
    pub distance: f64,
}

pub struct Run {
    score: f64,
    lane: usize,
    obstacles: Vec<Obstacle>,
    game_over: bool,
    spawn_in: f64,
    rng: StdRng,
}

impl Run {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            score: 0.0,
            lane: LANES / 2,
            obstacles: Vec::new(),
            game_over: false,
            spawn_in: 1.0,
            rng,
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn lane(&self) -> usize {
        self.lane
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn speed(&self) -> f64 {
        (BASE_SPEED + self.score * ACCELERATION).min(MAX_SPEED)
    }

    pub fn steer_left(&mut self) {
        if !self.game_over {
            self.lane = self.lane.saturating_sub(1);
        }
    }

    pub fn steer_right(&mut self) {
        if !self.game_over {
            self.lane = (self.lane + 1).min(LANES - 1);
        }
    }

    /// Advance the run by `dt` seconds
    pub fn tick(&mut self, dt: f64) {
        if self.game_over || dt <= 0.0 {
            return;
        }

        let travelled = self.speed() * dt;
        self.score += travelled;

        for obstacle in &mut self.obstacles {
            obstacle.distance -= travelled;
        }
        let lane = self.lane;
        if self
            .obstacles
            .iter()
            .any(|o| o.distance <= 0.0 && o.lane == lane)
        {
            self.game_over = true;
        }
        self.obstacles.retain(|o| o.distance > 0.0);

        self.spawn_in -= dt;
        if self.spawn_in <= 0.0 {
            let lane = self.rng.gen_range(0..LANES);
            self.obstacles.push(Obstacle {
                lane,
                distance: HORIZON,
            });
            self.spawn_in = self.rng.gen_range(0.35..1.1);
        }
    }

    #[cfg(test)]
    pub fn place_obstacle(&mut self, lane: usize, distance: f64) {
        self.obstacles.push(Obstacle { lane, distance });
    }
}

impl Default for Run {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStateSource for Run {
    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            game_over: self.game_over,
            score: self.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run() {
        let run = Run::with_seed(1);
        assert_eq!(run.score(), 0.0);
        assert_eq!(run.lane(), 1);
        assert!(!run.is_over());
        assert!(!run.snapshot().game_over);
    }

    #[test]
    fn test_score_grows_with_distance() {
        let mut run = Run::with_seed(1);
        run.tick(0.5);
        assert!((run.score() - BASE_SPEED * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_steering_is_clamped() {
        let mut run = Run::with_seed(1);
        run.steer_left();
        run.steer_left();
        assert_eq!(run.lane(), 0);
        for _ in 0..5 {
            run.steer_right();
        }
        assert_eq!(run.lane(), LANES - 1);
    }

    #[test]
    fn test_collision_ends_run() {
        let mut run = Run::with_seed(1);
        run.place_obstacle(run.lane(), 1.0);
        run.tick(0.2);

        assert!(run.is_over());
        let snapshot = run.snapshot();
        assert!(snapshot.game_over);
        assert_eq!(snapshot.score, run.score());

        // Frozen once over
        let score = run.score();
        run.tick(1.0);
        run.steer_left();
        assert_eq!(run.score(), score);
        assert_eq!(run.lane(), 1);
    }

    #[test]
    fn test_dodged_obstacle_is_passed() {
        let mut run = Run::with_seed(1);
        run.place_obstacle(0, 1.0);
        run.tick(0.2);

        assert!(!run.is_over());
        assert!(run.obstacles().iter().all(|o| o.distance > 0.0));
    }

    #[test]
    fn test_obstacles_spawn_at_horizon() {
        let mut run = Run::with_seed(7);
        run.tick(1.0);
        let spawned = run.obstacles().last().copied().unwrap();
        assert_eq!(spawned.distance, HORIZON);
        assert!(spawned.lane < LANES);
    }

    #[test]
    fn test_speed_is_capped() {
        let mut run = Run::with_seed(3);
        run.score = 1_000_000.0;
        assert_eq!(run.speed(), MAX_SPEED);
    }
}
