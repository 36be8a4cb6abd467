mod app;
mod render;
mod run;
mod store;
mod sync;
mod theme;

use app::App;
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use cuberun_core::{KeyValueStore, LeaderboardConfig, OverlayConfig, HIGH_SCORES_KEY};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use store::FileStore;
use sync::{ThreadDispatcher, UreqLeaderboard};

/// Endless runner with a local top-3 table and remote leaderboard sync
#[derive(Parser, Debug)]
#[command(name = "cuberun", version, about)]
struct Args {
    /// Leaderboard base URL (overrides CUBERUN_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Leaderboard user id (overrides CUBERUN_USER_ID)
    #[arg(long)]
    user_id: Option<String>,

    /// Leaderboard game type tag (overrides CUBERUN_GAME_TYPE)
    #[arg(long)]
    game_type: Option<String>,

    /// Never contact the leaderboard
    #[arg(long)]
    offline: bool,

    /// Clear the stored high scores before starting
    #[arg(long)]
    reset_scores: bool,

    /// Storage file (defaults to the platform data directory)
    #[arg(long)]
    data_file: Option<PathBuf>,
}

impl Args {
    fn leaderboard_config(&self) -> LeaderboardConfig {
        let mut config = LeaderboardConfig::from_env();
        if let Some(url) = &self.api_url {
            config.base_url = url.clone();
        }
        if let Some(user_id) = &self.user_id {
            config.user_id = user_id.clone();
        }
        if let Some(game_type) = &self.game_type {
            config.game_type = game_type.clone();
        }
        if self.offline {
            config.enabled = false;
        }
        config
    }
}

/// Log to a file beside the store; the terminal is taken by the game
fn init_logging(store_path: &Path) -> io::Result<PathBuf> {
    let log_path = store_path.with_file_name("cuberun.log");
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&log_path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    Ok(log_path)
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let store_path = args.data_file.clone().unwrap_or_else(FileStore::default_path);
    if let Err(e) = init_logging(&store_path) {
        eprintln!("Logging disabled, could not open log beside {}: {}", store_path.display(), e);
    }

    let mut store = FileStore::open(store_path);
    if args.reset_scores {
        if let Err(e) = store.remove(HIGH_SCORES_KEY) {
            eprintln!("Could not reset scores in {}: {}", store.path().display(), e);
        }
    }

    let config = args.leaderboard_config();
    log::info!(
        "Starting cuberun (store: {}, leaderboard: {})",
        store.path().display(),
        if config.enabled { config.base_url.as_str() } else { "offline" }
    );
    let dispatcher = ThreadDispatcher::new(UreqLeaderboard::new(&config), config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    // Run the app
    let mut app = App::new(store, dispatcher, OverlayConfig::default());
    let result = run_app(&mut stdout, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, Show, LeaveAlternateScreen)?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn run_app<S: KeyValueStore, D: cuberun_core::SyncDispatcher>(
    stdout: &mut io::Stdout,
    app: &mut App<S, D>,
) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        let tick_rate = app.get_tick_rate();

        // Render
        render::render(stdout, app)?;
        stdout.flush()?;

        // Handle input with timeout for the next tick
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout.min(Duration::from_millis(33)))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Handle Ctrl+C
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }

                match app.handle_key(key) {
                    app::AppAction::Continue => {}
                    app::AppAction::Quit => break,
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_creates_missing_directory() {
        let dir = std::env::temp_dir().join(format!("cuberun_logs_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let log_path = init_logging(&dir.join("nested").join("cuberun_storage.json")).unwrap();
        assert_eq!(log_path, dir.join("nested").join("cuberun.log"));

        log::error!("leaderboard unreachable");
        log::logger().flush();
        let contents = fs::read_to_string(&log_path).unwrap();
        assert!(contents.contains("leaderboard unreachable"));

        let _ = fs::remove_dir_all(&dir);
    }
}
