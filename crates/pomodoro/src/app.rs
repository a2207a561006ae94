//! Application state and event loops
//!
//! One task owns the `App` (and through it the `Timer`) and reacts to three
//! event sources: driver ticks, key presses forwarded from a reader thread,
//! and Ctrl-C in plain mode. The driver is re-synced with the timer status
//! after every event, before the next await.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use pomodoro::settings::SettingsUpdate;
use pomodoro::stats::{self, Summary};
use pomodoro::timer::{Timer, TimerStatus};
use pomodoro::Driver;
use pomodoro_core::format;
use ratatui::{backend::Backend, Terminal};
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::ui;

/// Which screen is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Timer,
    Stats,
}

impl View {
    pub fn toggle(self) -> Self {
        match self {
            Self::Timer => Self::Stats,
            Self::Stats => Self::Timer,
        }
    }
}

/// Something the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start, resume or pause
    Toggle,
    Reset,
    Skip,
    /// One minute more for the current session type
    Longer,
    /// One minute less for the current session type
    Shorter,
    SwitchView,
    Help,
    Quit,
}

impl Action {
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Self::Quit);
        }
        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => Some(Self::Toggle),
            KeyCode::Char('r') => Some(Self::Reset),
            KeyCode::Char('s') | KeyCode::Char('n') => Some(Self::Skip),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Self::Longer),
            KeyCode::Char('-') => Some(Self::Shorter),
            KeyCode::Tab | KeyCode::BackTab => Some(Self::SwitchView),
            KeyCode::Char('?') => Some(Self::Help),
            KeyCode::Char('q') | KeyCode::Esc => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Application state
pub struct App {
    pub timer: Timer,
    pub view: View,
    pub show_help: bool,
    pub should_quit: bool,
    /// Last status line (completion, rejected edit)
    pub message: Option<String>,
}

impl App {
    pub fn new(timer: Timer) -> Self {
        Self {
            timer,
            view: View::default(),
            show_help: false,
            should_quit: false,
            message: None,
        }
    }

    pub fn handle(&mut self, action: Action) {
        debug!(?action, "key action");
        match action {
            Action::Toggle => match self.timer.status() {
                TimerStatus::Running => self.timer.pause(),
                TimerStatus::Idle | TimerStatus::Paused => {
                    self.message = None;
                    self.timer.start();
                }
            },
            Action::Reset => self.timer.reset(),
            Action::Skip => {
                self.timer.skip();
                self.message = Some(format!("Skipped to {}", self.timer.session_type()));
            }
            Action::Longer => self.adjust_duration(1),
            Action::Shorter => self.adjust_duration(-1),
            Action::SwitchView => self.view = self.view.toggle(),
            Action::Help => self.show_help = !self.show_help,
            Action::Quit => self.should_quit = true,
        }
    }

    /// A tick from the driver
    pub fn on_tick(&mut self) {
        if let Some(completion) = self.timer.tick() {
            self.message = Some(format!(
                "{} complete! Next: {}",
                completion.record.session_type, completion.next
            ));
        }
    }

    pub fn summary(&self) -> Summary {
        Summary::from_sessions(self.timer.sessions(), self.timer.settings(), stats::today())
    }

    fn adjust_duration(&mut self, delta: i64) {
        let session_type = self.timer.session_type();
        let current = self.timer.settings().minutes_for(session_type) as i64;
        let minutes = (current + delta).max(0) as u32;

        let update = SettingsUpdate::duration(session_type, minutes);
        match update.validate() {
            Ok(()) => {
                self.timer.update_settings(&update);
                self.message = Some(format!("{} length: {} min", session_type, minutes));
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }
}

/// Input forwarded from the terminal reader thread
#[derive(Debug)]
enum Input {
    Key(KeyEvent),
    Resize,
}

/// Read terminal events on a blocking thread. The thread exits once the
/// receiver is dropped.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<Input> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || loop {
        match event::poll(Duration::from_millis(200)) {
            Ok(true) => {
                let input = match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => Input::Key(key),
                    Ok(Event::Resize(_, _)) => Input::Resize,
                    Ok(_) => continue,
                    Err(_) => break,
                };
                if tx.send(input).is_err() {
                    break;
                }
            }
            Ok(false) => {
                if tx.is_closed() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    rx
}

/// Interactive terminal UI
pub async fn run_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut inputs = spawn_input_reader();
    let mut driver = Driver::new();
    driver.sync(app.timer.status());

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        tokio::select! {
            _ = driver.tick() => app.on_tick(),
            input = inputs.recv() => match input {
                Some(Input::Key(key)) => {
                    if let Some(action) = Action::from_key(&key) {
                        app.handle(action);
                    }
                }
                Some(Input::Resize) => {}
                None => return Ok(()),
            },
        }

        if app.should_quit {
            return Ok(());
        }
        driver.sync(app.timer.status());
    }
}

/// Line-based countdown: starts the current session and returns once the
/// timer stops running, or pauses it on Ctrl-C.
pub async fn run_plain(timer: &mut Timer) -> Result<()> {
    countdown(timer, Driver::new(), tokio::signal::ctrl_c()).await
}

/// Drive a started timer until it leaves running. `interrupt` is created once
/// so a signal delivered between ticks is not lost.
async fn countdown<F: Future>(timer: &mut Timer, mut driver: Driver, interrupt: F) -> Result<()> {
    tokio::pin!(interrupt);
    timer.start();
    driver.sync(timer.status());
    print_progress(timer)?;

    while driver.is_armed() {
        tokio::select! {
            _ = driver.tick() => {
                match timer.tick() {
                    Some(completion) => {
                        println!();
                        println!(
                            "[ok] {} complete ({}). Next: {}",
                            completion.record.session_type,
                            format::minutes(completion.record.minutes()),
                            completion.next
                        );
                        if timer.status() == TimerStatus::Running {
                            print_progress(timer)?;
                        }
                    }
                    None => print_progress(timer)?,
                }
            }
            _ = &mut interrupt => {
                timer.pause();
                println!();
                println!(
                    "Paused {} with {} left",
                    timer.session_type(),
                    format::clock(timer.remaining_seconds())
                );
            }
        }
        driver.sync(timer.status());
    }

    Ok(())
}

fn print_progress(timer: &Timer) -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(
        stdout,
        "\r{:<12} [{}] {}  ({}/{})",
        timer.session_type().label(),
        format::bar(timer.progress(), 30),
        format::clock(timer.remaining_seconds()),
        timer.focus_count(),
        timer.settings().sessions_until_long_break
    )?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomodoro::session::SessionType;
    use pomodoro::settings::Settings;
    use pomodoro::store::MemoryStore;

    fn app() -> App {
        App::new(Timer::new(Settings::default(), Vec::new(), Box::new(MemoryStore::new())))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(Action::from_key(&key(KeyCode::Char(' '))), Some(Action::Toggle));
        assert_eq!(Action::from_key(&key(KeyCode::Char('s'))), Some(Action::Skip));
        assert_eq!(Action::from_key(&key(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(Action::from_key(&key(KeyCode::Char('x'))), None);
        assert_eq!(
            Action::from_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_toggle_starts_and_pauses() {
        let mut app = app();
        app.handle(Action::Toggle);
        assert_eq!(app.timer.status(), TimerStatus::Running);
        app.handle(Action::Toggle);
        assert_eq!(app.timer.status(), TimerStatus::Paused);
        app.handle(Action::Toggle);
        assert_eq!(app.timer.status(), TimerStatus::Running);
    }

    #[test]
    fn test_adjust_duration_while_idle() {
        let mut app = app();
        app.handle(Action::Longer);
        assert_eq!(app.timer.settings().focus_duration, 26);
        assert_eq!(app.timer.remaining_seconds(), 26 * 60);

        app.handle(Action::Shorter);
        app.handle(Action::Shorter);
        assert_eq!(app.timer.settings().focus_duration, 24);
    }

    #[test]
    fn test_adjust_duration_respects_bounds() {
        let mut app = app();
        app.handle(Action::Skip);
        for _ in 0..10 {
            app.handle(Action::Shorter);
        }
        assert_eq!(app.timer.settings().short_break_duration, 1);
        assert!(app.message.as_deref().unwrap_or("").contains("between 1 and 60"));
    }

    #[test]
    fn test_tick_completion_sets_message() {
        let mut app = app();
        app.handle(Action::Toggle);
        for _ in 0..1500 {
            app.on_tick();
        }
        assert_eq!(app.timer.session_type(), SessionType::ShortBreak);
        assert_eq!(
            app.message.as_deref(),
            Some("Focus complete! Next: Short Break")
        );
        assert_eq!(app.summary().today.sessions_completed, 1);
    }

    #[test]
    fn test_view_and_quit() {
        let mut app = app();
        app.handle(Action::SwitchView);
        assert_eq!(app.view, View::Stats);
        app.handle(Action::SwitchView);
        assert_eq!(app.view, View::Timer);
        app.handle(Action::Quit);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_countdown_interrupt_outlives_ticks() {
        let settings = Settings {
            focus_duration: 1,
            ..Default::default()
        };
        let mut timer = Timer::new(settings, Vec::new(), Box::new(MemoryStore::new()));
        let driver = Driver::with_period(Duration::from_millis(10));

        // fires after several ticks have gone by
        let interrupt = tokio::time::sleep(Duration::from_millis(55));
        countdown(&mut timer, driver, interrupt).await.unwrap();

        assert_eq!(timer.status(), TimerStatus::Paused);
        assert_eq!(timer.session_type(), SessionType::Focus);
        assert!(timer.remaining_seconds() < 60);
        assert!(timer.remaining_seconds() > 30);
        assert!(timer.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_countdown_stops_at_completion() {
        let settings = Settings {
            focus_duration: 1,
            ..Default::default()
        };
        let mut timer = Timer::new(settings, Vec::new(), Box::new(MemoryStore::new()));
        let driver = Driver::with_period(Duration::from_millis(1));

        countdown(&mut timer, driver, std::future::pending::<()>()).await.unwrap();

        assert_eq!(timer.status(), TimerStatus::Idle);
        assert_eq!(timer.session_type(), SessionType::ShortBreak);
        assert_eq!(timer.sessions().len(), 1);
    }
}
