use std::{
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use anyhow::Context;
use botornot::{
    app::{App, AppSettings, Control},
    app_dirs::AppDirs,
    catalog::Catalog,
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    session::SessionConfig,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing_subscriber::EnvFilter;

const TICK_RATE_MS: u64 = 100;

/// swipe quiz tui: is it real or a deepfake?
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Judge a shuffled stack of images as real or deepfake before the countdown ends. Swipe with the arrow keys, h / l, or by dragging the card with the mouse."
)]
pub struct Cli {
    /// seconds on the countdown
    #[clap(short = 's', long)]
    seconds: Option<u32>,

    /// maximum number of images per game
    #[clap(short = 'n', long)]
    limit: Option<usize>,

    /// image directory, csv manifest (file_name,label) or json manifest; defaults to the bundled sample
    #[clap(short = 'c', long)]
    catalog: Option<PathBuf>,

    /// horizontal mouse drag, in columns, that counts as a swipe
    #[clap(long)]
    threshold: Option<u16>,

    /// how long answer feedback stays on screen, in milliseconds
    #[clap(long)]
    feedback_ms: Option<u64>,

    /// seed the shuffle for a reproducible sequence of games
    #[clap(long)]
    seed: Option<u64>,

    /// play the catalog in its listed order instead of shuffling
    #[clap(long)]
    in_order: bool,

    /// persist the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Overlay explicit flags on the persisted settings
    fn merge(&self, mut cfg: Config) -> Config {
        if let Some(secs) = self.seconds {
            cfg.total_secs = secs;
        }
        if let Some(limit) = self.limit {
            cfg.queue_limit = limit;
        }
        if let Some(catalog) = &self.catalog {
            cfg.catalog = Some(catalog.clone());
        }
        if let Some(threshold) = self.threshold {
            cfg.swipe_threshold = threshold;
        }
        if let Some(ms) = self.feedback_ms {
            cfg.feedback_ms = ms;
        }
        cfg
    }

    fn to_app_settings(&self, cfg: &Config) -> AppSettings {
        AppSettings {
            session: SessionConfig::from(cfg),
            seed: self.seed,
            swipe_threshold: cfg.swipe_threshold,
            in_order: self.in_order,
        }
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("BOTORNOT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let store = FileConfigStore::new();
    let config = cli.merge(store.load());
    if cli.save_config {
        store
            .save(&config)
            .with_context(|| format!("saving config to {}", store.path().display()))?;
    }

    let catalog = match &config.catalog {
        Some(path) => {
            Catalog::load(path).with_context(|| format!("loading catalog {}", path.display()))?
        }
        None => Catalog::sample().context("loading bundled sample catalog")?,
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(Arc::new(catalog), cli.to_app_settings(&config));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let event = runner.step();
        if app.handle_event(&event, Instant::now()) == Control::Quit {
            break;
        }
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["botornot"]);

        assert_eq!(cli.seconds, None);
        assert_eq!(cli.limit, None);
        assert_eq!(cli.catalog, None);
        assert_eq!(cli.seed, None);
        assert!(!cli.in_order);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_short_and_long_flags() {
        let cli = Cli::parse_from(["botornot", "-s", "30", "-n", "20", "-c", "imgs"]);
        assert_eq!(cli.seconds, Some(30));
        assert_eq!(cli.limit, Some(20));
        assert_eq!(cli.catalog, Some(PathBuf::from("imgs")));

        let cli = Cli::parse_from([
            "botornot",
            "--seconds",
            "90",
            "--threshold",
            "12",
            "--feedback-ms",
            "300",
            "--seed",
            "7",
            "--in-order",
        ]);
        assert_eq!(cli.seconds, Some(90));
        assert_eq!(cli.threshold, Some(12));
        assert_eq!(cli.feedback_ms, Some(300));
        assert_eq!(cli.seed, Some(7));
        assert!(cli.in_order);
    }

    #[test]
    fn test_merge_keeps_unset_values() {
        let stored = Config {
            total_secs: 45,
            queue_limit: 10,
            ..Config::default()
        };
        let cli = Cli::parse_from(["botornot", "-s", "20"]);
        let merged = cli.merge(stored);

        assert_eq!(merged.total_secs, 20);
        assert_eq!(merged.queue_limit, 10);
        assert_eq!(merged.catalog, None);
    }

    #[test]
    fn test_app_settings_from_cli() {
        let cli = Cli::parse_from(["botornot", "--seed", "3", "--feedback-ms", "250"]);
        let cfg = cli.merge(Config::default());
        let settings = cli.to_app_settings(&cfg);

        assert_eq!(settings.seed, Some(3));
        assert_eq!(settings.session.feedback_delay, Duration::from_millis(250));
        assert_eq!(settings.session.total_secs, cfg.total_secs);
    }

    #[test]
    fn test_cli_rejects_bad_numbers() {
        assert!(Cli::try_parse_from(["botornot", "-s", "-1"]).is_err());
        assert!(Cli::try_parse_from(["botornot", "-n", "lots"]).is_err());
    }
}
