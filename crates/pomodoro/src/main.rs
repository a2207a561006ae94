//! pomodoro - Focus/break interval timer for the terminal
//!
//! Usage:
//!   pomodoro                      Open the interactive timer
//!   pomodoro run --plain          Line-based countdown of the current session
//!   pomodoro stats                Today, streak and the last 7 days
//!   pomodoro history              Most recent completed sessions
//!   pomodoro config show|set|reset

mod app;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pomodoro_core::{format, Paths};
use ratatui::prelude::*;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use pomodoro::notify::Backend;
use pomodoro::settings::{Settings, SettingsUpdate};
use pomodoro::stats::{self, Summary};
use pomodoro::{DesktopNotifier, FileStore, SessionRecord, Timer};

use app::App;

/// Pomodoro - focus/break interval timer
#[derive(Parser)]
#[command(name = "pomodoro")]
#[command(about = "Focus/break interval timer with session history and statistics")]
#[command(version)]
#[command(after_help = r#"CYCLE:
    focus -> short break -> focus -> ... -> long break after every N focus
    sessions (N = --long-break-every, default 4). Skipping a session never
    counts it as completed.

EXAMPLES:
    pomodoro                        # Interactive timer
    pomodoro run --plain            # Count down the current session in plain text
    pomodoro stats                  # Today's progress, streak and the last 7 days
    pomodoro history --limit 20     # Last 20 completed sessions
    pomodoro config set --focus 50 --short-break 10
    pomodoro config set --auto-start true

KEY BINDINGS:
    space       Start / pause / resume
    r           Reset the current session
    s           Skip to the next session
    + / -       Lengthen / shorten the current session type by a minute
    Tab         Switch between timer and stats
    ?           Toggle help
    q, Esc      Quit

LOGGING:
    Set RUST_LOG (e.g. RUST_LOG=pomodoro=debug). The interactive timer logs
    to pomodoro.log in the data directory.
"#)]
struct Cli {
    /// Keep settings and history under DIR instead of the user directories
    #[arg(long, global = true, value_name = "DIR")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the timer (default)
    #[command(alias = "r")]
    Run {
        /// Plain line-based countdown instead of the full-screen UI
        #[arg(long)]
        plain: bool,
    },

    /// Show statistics
    #[command(alias = "st")]
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show completed sessions, newest last
    #[command(alias = "h")]
    History {
        /// Number of sessions to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change one or more settings
    Set {
        /// Focus length in minutes (1-120)
        #[arg(long, value_name = "MINS")]
        focus: Option<u32>,

        /// Short break length in minutes (1-60)
        #[arg(long, value_name = "MINS")]
        short_break: Option<u32>,

        /// Long break length in minutes (1-60)
        #[arg(long, value_name = "MINS")]
        long_break: Option<u32>,

        /// Focus sessions before a long break (2-10)
        #[arg(long, value_name = "N")]
        long_break_every: Option<u32>,

        /// Focus sessions to aim for each day (1-20)
        #[arg(long, value_name = "N")]
        daily_goal: Option<u32>,

        /// Start the next session automatically
        #[arg(long, value_name = "BOOL")]
        auto_start: Option<bool>,
    },

    /// Restore default settings
    Reset,
}

// ANSI color codes
const RED: &str = "\x1b[0;31m";
const GREEN: &str = "\x1b[0;32m";
const CYAN: &str = "\x1b[0;36m";
const BOLD: &str = "\x1b[1m";
const NC: &str = "\x1b[0m";

/// Check if stdout is a TTY and colors should be used
fn use_colors() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdout())
}

/// Conditionally apply color
fn color(code: &str, text: &str) -> String {
    if use_colors() {
        format!("{}{}{}", code, text, NC)
    } else {
        text.to_string()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = match &cli.home {
        Some(root) => Paths::with_root(root),
        None => Paths::new(),
    };
    let command = cli.command.unwrap_or(Commands::Run { plain: false });
    let tui = matches!(command, Commands::Run { plain: false });

    init_logging(&paths, tui);

    let store = FileStore::new(&paths);
    let mut timer = Timer::load(Box::new(store));

    match command {
        Commands::Run { plain } => {
            let backend = match Backend::detect() {
                // the bell and echo line would tear the full-screen UI
                Backend::Echo if !plain => Backend::Silent,
                backend => backend,
            };
            timer.add_notifier(Box::new(
                DesktopNotifier::new(backend).with_history(paths.notify_history()),
            ));

            let rt = tokio::runtime::Runtime::new()?;
            if plain {
                rt.block_on(app::run_plain(&mut timer))
            } else {
                rt.block_on(cmd_tui(timer))
            }
        }
        Commands::Stats { json } => cmd_stats(&timer, json),
        Commands::History { limit, json } => cmd_history(&timer, limit, json),
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => cmd_config_show(timer.settings(), json),
            ConfigAction::Set {
                focus,
                short_break,
                long_break,
                long_break_every,
                daily_goal,
                auto_start,
            } => {
                let update = SettingsUpdate {
                    focus_duration: focus,
                    short_break_duration: short_break,
                    long_break_duration: long_break,
                    sessions_until_long_break: long_break_every,
                    daily_goal,
                    auto_start_next: auto_start,
                };
                cmd_config_set(&mut timer, update)
            }
            ConfigAction::Reset => cmd_config_reset(&mut timer),
        },
    }
}

/// Log to stderr, or to the log file while the full-screen UI owns the terminal
fn init_logging(paths: &Paths, tui: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(log_writer(paths, tui))
        .with_ansi(!tui)
        .init();
}

/// Where log lines go. An unusable log file disables logging rather than
/// stopping the timer.
fn log_writer(paths: &Paths, tui: bool) -> BoxMakeWriter {
    if !tui {
        return BoxMakeWriter::new(io::stderr);
    }
    match open_log_file(paths) {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            BoxMakeWriter::new(io::sink)
        }
    }
}

fn open_log_file(paths: &Paths) -> Result<File> {
    std::fs::create_dir_all(&paths.data)
        .with_context(|| format!("Failed to create data directory: {}", paths.data.display()))?;
    let log_path = paths.log_file();
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))
}

async fn cmd_tui(timer: Timer) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(timer);
    let result = app::run_tui(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Show statistics
fn cmd_stats(timer: &Timer, json: bool) -> Result<()> {
    let summary = Summary::from_sessions(timer.sessions(), timer.settings(), stats::today());

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    println!("{}", color(BOLD, "Pomodoro Statistics"));
    println!("===================");
    println!();

    let goal = format!(
        "{} / {}",
        summary.today.sessions_completed, summary.daily_goal
    );
    let goal_color = if summary.goal_progress() >= 1.0 { GREEN } else { CYAN };
    println!("Today:          {}", color(goal_color, &goal));
    println!("  Focus:        {}", format::minutes(summary.today.focus_minutes));
    println!("  Breaks:       {}", format::minutes(summary.today.break_minutes));
    println!("Total sessions: {}", summary.total_sessions);
    println!("Total focus:    {}", format::minutes(summary.total_focus_minutes));
    println!("Streak:         {} day(s)", summary.streak);
    println!();

    println!("{}", color(BOLD, "Last 7 days"));
    println!("-----------");
    let peak = summary.week_peak();
    for day in &summary.week {
        let fraction = if peak == 0 {
            0.0
        } else {
            day.focus_minutes as f64 / peak as f64
        };
        println!(
            "  {}  {} {:>7}  ({} sessions)",
            day.date.format("%a %m-%d"),
            color(RED, &format::bar(fraction, 20)),
            format::minutes(day.focus_minutes),
            day.sessions_completed
        );
    }
    println!();

    Ok(())
}

/// The last `limit` records, oldest of them first
fn recent(records: &[SessionRecord], limit: usize) -> &[SessionRecord] {
    &records[records.len().saturating_sub(limit)..]
}

/// Show recent sessions
fn cmd_history(timer: &Timer, limit: usize, json: bool) -> Result<()> {
    let records = recent(timer.sessions(), limit);

    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No completed sessions yet");
        return Ok(());
    }

    for record in records {
        let when = record
            .completed_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M");
        println!(
            "  {}  {:<12} {}",
            when,
            color(CYAN, record.session_type.label()),
            format::minutes(record.minutes())
        );
    }

    Ok(())
}

/// Show current settings
fn cmd_config_show(settings: &Settings, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(settings)?);
        return Ok(());
    }

    println!("{}", color(BOLD, "Settings"));
    println!("  focus:            {} min", settings.focus_duration);
    println!("  short break:      {} min", settings.short_break_duration);
    println!("  long break:       {} min", settings.long_break_duration);
    println!("  long break every: {} sessions", settings.sessions_until_long_break);
    println!("  daily goal:       {} sessions", settings.daily_goal);
    println!("  auto start:       {}", settings.auto_start_next);

    Ok(())
}

/// Validate and apply a settings edit
fn cmd_config_set(timer: &mut Timer, update: SettingsUpdate) -> Result<()> {
    if update.is_empty() {
        anyhow::bail!("Nothing to change (see `pomodoro config set --help`)");
    }
    update.validate()?;

    timer.update_settings(&update);
    println!("{}", color(GREEN, "[ok] Settings updated"));
    cmd_config_show(timer.settings(), false)
}

/// Restore default settings
fn cmd_config_reset(timer: &mut Timer) -> Result<()> {
    timer.update_settings(&full_update(&Settings::default()));
    println!("{}", color(GREEN, "[ok] Settings reset to defaults"));
    cmd_config_show(timer.settings(), false)
}

/// An update that sets every field to `settings`
fn full_update(settings: &Settings) -> SettingsUpdate {
    SettingsUpdate {
        focus_duration: Some(settings.focus_duration),
        short_break_duration: Some(settings.short_break_duration),
        long_break_duration: Some(settings.long_break_duration),
        sessions_until_long_break: Some(settings.sessions_until_long_break),
        daily_goal: Some(settings.daily_goal),
        auto_start_next: Some(settings.auto_start_next),
    }
}
