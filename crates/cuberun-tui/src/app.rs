use crate::run::Run;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use cuberun_core::{
    GameOverScreen, KeyValueStore, OverlayConfig, OverlayView, ScreenEvent, SyncDispatcher,
};
use log::info;
use std::time::{Duration, Instant};

/// Result of handling a key press
#[derive(Debug, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
}

/// The main application state
pub struct App<S: KeyValueStore, D: SyncDispatcher> {
    /// The current run (owner of score and game-over flag)
    pub run: Run,
    /// Color theme
    pub theme: Theme,
    screen: GameOverScreen<S, D>,
    overlay_config: OverlayConfig,
    clock: Instant,
    last_tick: Duration,
}

impl<S: KeyValueStore, D: SyncDispatcher> App<S, D> {
    pub fn new(store: S, dispatcher: D, overlay_config: OverlayConfig) -> Self {
        Self::with_run(Run::new(), store, dispatcher, overlay_config)
    }

    pub fn with_run(run: Run, store: S, dispatcher: D, overlay_config: OverlayConfig) -> Self {
        Self {
            run,
            theme: Theme::dark(),
            screen: GameOverScreen::mount(store, dispatcher, &overlay_config),
            overlay_config,
            clock: Instant::now(),
            last_tick: Duration::ZERO,
        }
    }

    /// Faster ticks while the run is live
    pub fn get_tick_rate(&self) -> Duration {
        if self.screen.visibility().is_shown() {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(33)
        }
    }

    pub fn overlay(&self) -> Option<OverlayView> {
        self.screen.view()
    }

    #[cfg(test)]
    pub fn screen(&self) -> &GameOverScreen<S, D> {
        &self.screen
    }

    /// Update the run and the overlay (called every tick)
    pub fn tick(&mut self) {
        let now = self.clock.elapsed();
        self.tick_at(now);
    }

    pub fn tick_at(&mut self, now: Duration) {
        let dt = now.saturating_sub(self.last_tick).as_secs_f64();
        self.last_tick = now;
        self.run.tick(dt);

        match self.screen.update(&self.run, now) {
            Some(ScreenEvent::Entered { score, recorded }) => {
                info!("Run ended with {} (high score: {})", score, recorded);
            }
            Some(ScreenEvent::Opaque) | Some(ScreenEvent::Exited) | None => {}
        }
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return AppAction::Quit,
            _ => {}
        }

        if self.screen.visibility().is_shown() {
            if matches!(
                key.code,
                KeyCode::Char('r') | KeyCode::Enter | KeyCode::Char(' ')
            ) {
                self.restart();
            }
            return AppAction::Continue;
        }

        match key.code {
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => self.run.steer_left(),
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => self.run.steer_right(),
            _ => {}
        }
        AppAction::Continue
    }

    /// Throw the run away and start over from what is on disk
    pub fn restart(&mut self) {
        info!("Restarting run");
        self.run = Run::new();
        self.screen.reload(&self.overlay_config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use cuberun_core::{MemoryStore, Visibility, HIGH_SCORES_KEY};
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        scores: RefCell<Vec<u64>>,
    }

    impl SyncDispatcher for &Recorder {
        fn dispatch(&self, score: u64) {
            self.scores.borrow_mut().push(score);
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn crashed_app(recorder: &Recorder) -> App<MemoryStore, &Recorder> {
        let mut run = Run::with_seed(5);
        run.place_obstacle(run.lane(), 1.0);
        let mut app = App::with_run(run, MemoryStore::new(), recorder, OverlayConfig::default());
        app.tick_at(ms(1000));
        app
    }

    #[test]
    fn test_crash_shows_overlay_and_records() {
        let recorder = Recorder::default();
        let app = crashed_app(&recorder);

        assert!(app.run.is_over());
        assert_eq!(app.screen().visibility(), Visibility::Entering);
        let score = app.run.score() as u64;
        assert_eq!(app.screen().high_scores().entries(), &[score, 0, 0]);
        assert_eq!(*recorder.scores.borrow(), vec![score]);
    }

    #[test]
    fn test_overlay_turns_opaque() {
        let recorder = Recorder::default();
        let mut app = crashed_app(&recorder);

        app.tick_at(ms(1400));
        assert_eq!(app.screen().visibility(), Visibility::Entering);
        app.tick_at(ms(1500));
        assert_eq!(app.screen().visibility(), Visibility::Visible);
        assert_eq!(app.overlay().unwrap().background_alpha, 1.0);
    }

    #[test]
    fn test_restart_key_reloads() {
        let recorder = Recorder::default();
        let mut app = crashed_app(&recorder);
        let recorded = app.screen().high_scores().entries()[0];

        assert_eq!(app.handle_key(key(KeyCode::Char('r'))), AppAction::Continue);
        assert!(!app.run.is_over());
        assert_eq!(app.run.score(), 0.0);
        assert_eq!(app.screen().visibility(), Visibility::Hidden);
        assert_eq!(app.screen().high_scores().entries()[0], recorded);
        assert_eq!(
            app.screen().store().raw(HIGH_SCORES_KEY).map(str::to_string),
            Some(format!("[{},0,0]", recorded))
        );
    }

    #[test]
    fn test_steering_ignored_while_overlay_shown() {
        let recorder = Recorder::default();
        let mut app = crashed_app(&recorder);
        let lane = app.run.lane();

        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.run.lane(), lane);
    }

    #[test]
    fn test_quit_keys() {
        let recorder = Recorder::default();
        let mut app = App::with_run(
            Run::with_seed(1),
            MemoryStore::new(),
            &recorder,
            OverlayConfig::default(),
        );
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), AppAction::Quit);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), AppAction::Quit);
        assert_eq!(app.handle_key(key(KeyCode::Right)), AppAction::Continue);
        assert_eq!(app.run.lane(), 2);
    }
}
