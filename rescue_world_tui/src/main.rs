mod batch;
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    crossterm::{
        self,
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
};
use rescue_world_core::{
    agent::AgentMode,
    config::SimulationOptions,
    layout::Layout,
    simulation::Simulation,
};
use std::{
    io::{self, Stdout},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(version, about = "Cooperative fire rescue simulation", long_about = None)]
struct Args {
    /// Layout file to load; the built-in building is used when omitted
    #[arg(short, long, value_name = "LAYOUT_FILE", global = true)]
    layout: Option<PathBuf>,

    /// Seed for the simulation's random source
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// Operating mode for every agent
    #[arg(short, long, value_enum, default_value_t = ModeArg::Strategy, global = true)]
    mode: ModeArg,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive viewer (the default)
    Run {
        /// Milliseconds between turns while auto-advancing
        #[arg(long, default_value_t = 400)]
        tick_ms: u64,
        /// Where to write the log while the terminal is in use
        #[arg(long, value_name = "LOG_FILE", default_value = "rescue_world.log")]
        log_file: PathBuf,
    },
    /// Play many games in both modes and compare the outcomes
    Batch {
        /// Games per mode
        #[arg(short = 'n', long, default_value_t = 100)]
        iterations: u32,
        /// Stop a game that has not ended after this many turns
        #[arg(long, default_value_t = 1000)]
        max_turns: u32,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play one recorded game and write its snapshot history as JSON
    Export {
        /// Maximum number of turns to play
        #[arg(short, long, default_value_t = 200)]
        turns: u32,
        /// Output file
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Random,
    Strategy,
}

impl From<ModeArg> for AgentMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Random => AgentMode::Random,
            ModeArg::Strategy => AgentMode::Strategy,
        }
    }
}

/// Interactive control surface around one simulation instance.
pub struct App {
    layout: Layout,
    simulation: Simulation,
    auto_advance: bool,
    /// Shown in place of the key help, e.g. a layout fallback warning.
    notice: Option<String>,
    should_quit: bool,
}

impl App {
    fn new(layout: Layout, options: SimulationOptions, notice: Option<String>) -> Result<Self> {
        let simulation = Simulation::new(&layout, options)?;
        Ok(App {
            layout,
            simulation,
            auto_advance: false,
            notice,
            should_quit: false,
        })
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Advances the simulation by one turn.
    fn step(&mut self) {
        let summary = self.simulation.advance();
        if summary.result.is_some() {
            self.auto_advance = false;
        }
    }

    fn toggle_auto(&mut self) {
        self.auto_advance = !self.auto_advance && !self.simulation.is_terminal();
    }

    /// Replaces the instance with a fresh one. Auto-advance is paused.
    fn reset(&mut self, mode: AgentMode) -> Result<()> {
        self.simulation = Simulation::new(&self.layout, SimulationOptions::new(mode))?;
        self.auto_advance = false;
        self.notice = None;
        info!(?mode, seed = self.simulation.seed(), "simulation reset");
        Ok(())
    }

    fn on_key(&mut self, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => self.step(),
            KeyCode::Char('a') => self.toggle_auto(),
            KeyCode::Char('r') => self.reset(self.simulation.mode())?,
            KeyCode::Char('m') => self.reset(self.simulation.mode().other())?,
            _ => {}
        }
        Ok(())
    }

    /// Called on every tick of the main loop.
    fn tick(&mut self) {
        if self.auto_advance {
            self.step();
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Run {
        tick_ms: 400,
        log_file: PathBuf::from("rescue_world.log"),
    });

    match &command {
        Command::Run { log_file, .. } => setup_file_logging(log_file)?,
        _ => setup_stderr_logging(),
    }

    let (layout, notice) = load_layout(args.layout.as_deref());
    let mode = AgentMode::from(args.mode);
    let mut options = SimulationOptions::new(mode);
    if let Some(seed) = args.seed {
        options = options.with_seed(seed);
    }

    match command {
        Command::Run { tick_ms, .. } => {
            let mut terminal = setup_terminal()?;
            let mut app = App::new(layout, options, notice)?;
            let result = run_app(&mut terminal, &mut app, Duration::from_millis(tick_ms));
            restore_terminal(&mut terminal)?;
            result
        }
        Command::Batch {
            iterations,
            max_turns,
            json,
        } => {
            let report = batch::run_batch(&layout, args.seed.unwrap_or_default(), iterations, max_turns)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                batch::print_report(&report);
            }
            Ok(())
        }
        Command::Export { turns, out } => {
            batch::export_history(&layout, options, turns, &out)?;
            println!("wrote {}", out.display());
            Ok(())
        }
    }
}

/// Loads the layout, falling back to the built-in one. The returned notice
/// describes the fallback for the status line; the fallback itself is
/// already logged.
fn load_layout(path: Option<&Path>) -> (Layout, Option<String>) {
    let Some(path) = path else {
        return (Layout::default(), None);
    };
    match Layout::load_or_default(path) {
        (layout, None) => (layout, None),
        (layout, Some(err)) => (
            layout,
            Some(format!("{}: {err}; using built-in layout", path.display())),
        ),
    }
}

/// Logs to a file; the terminal belongs to the UI.
fn setup_file_logging(path: &Path) -> Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log path has no file name: {}", path.display()))?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(fmt::layer().with_writer(non_blocking_file).with_ansi(false))
        .init();

    // Keep the writer alive for the rest of the process.
    std::mem::forget(guard);
    Ok(())
}

fn setup_stderr_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key.code)?;
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let options = SimulationOptions::new(AgentMode::Strategy).with_seed(3);
        App::new(Layout::default(), options, None).unwrap()
    }

    #[test]
    fn keys_drive_the_simulation() {
        let mut app = app();
        app.on_key(KeyCode::Char(' ')).unwrap();
        assert_eq!(app.simulation().counters().turn, 1);

        app.on_key(KeyCode::Char('a')).unwrap();
        assert!(app.auto_advance());
        app.tick();
        assert!(app.simulation().counters().turn >= 2 || app.simulation().is_terminal());

        app.on_key(KeyCode::Char('q')).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn reset_pauses_and_can_switch_mode() {
        let mut app = app();
        app.on_key(KeyCode::Char('a')).unwrap();
        app.on_key(KeyCode::Char('r')).unwrap();
        assert!(!app.auto_advance());
        assert_eq!(app.simulation().counters().turn, 0);
        assert_eq!(app.simulation().mode(), AgentMode::Strategy);

        app.on_key(KeyCode::Char('m')).unwrap();
        assert_eq!(app.simulation().mode(), AgentMode::Random);
    }

    #[test]
    fn missing_layout_file_produces_a_notice() {
        let (layout, notice) = load_layout(Some(Path::new("/nonexistent/layout.txt")));
        assert!(notice.unwrap().contains("built-in layout"));
        assert_eq!(layout.width(), 8);
        assert!(load_layout(None).1.is_none());
    }

    #[test]
    fn mode_argument_maps_to_agent_mode() {
        let args = Args::parse_from(["rescue_world_tui", "--mode", "random", "batch", "-n", "2"]);
        assert_eq!(AgentMode::from(args.mode), AgentMode::Random);
        assert!(matches!(args.command, Some(Command::Batch { iterations: 2, .. })));
    }
}
