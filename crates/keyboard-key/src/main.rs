//! keyboard-key - playable piano keys in the terminal
//!
//! Drag across the keys with the mouse (sliding mode) or click them (tap
//! mode). Note events and haptic pulses are logged.

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
        KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Clear};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use keyboard_key::{
    config::{Config, Theme},
    controller::{NoteEvent, PointerPhase, RetapPolicy},
    geometry::{Alignment, Point},
    haptics::LogHaptics,
    keyboard::Keyboard,
    label::{resolve_label, LabelMode},
    pitch::Pitch,
    scheduler::WallClockScheduler,
    ui::{keys_area, render_keyboard_standalone, to_key_rect},
};

/// Longest the event loop waits for input
const FRAME_TIME: Duration = Duration::from_millis(16);

#[derive(Parser)]
#[command(name = "keyboard-key")]
#[command(author, version, about = "Playable piano keys in the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path (default: ~/.config/keyboard-key/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Click keys instead of dragging across them
    #[arg(long)]
    tap: bool,

    /// Key label convention, e.g. letters_all or solfege
    #[arg(short, long)]
    label_mode: Option<LabelMode>,

    /// Lowest octave (0-9, default 3 for C3)
    #[arg(short, long)]
    octave: Option<u8>,

    /// Number of keys
    #[arg(short, long)]
    keys: Option<u8>,

    /// Disable haptic pulses
    #[arg(long)]
    no_haptics: bool,

    /// Tap-mode auto release in milliseconds
    #[arg(long)]
    tap_release_ms: Option<u64>,

    /// Tap on a sounding key: retrigger, cancel_on_retap or ignore
    #[arg(long)]
    retap: Option<RetapPolicy>,

    /// Square off the anchored edge of every key
    #[arg(long)]
    flat_top: bool,

    /// Edge the key labels sit on: bottom or trailing
    #[arg(long)]
    align: Option<Alignment>,

    /// Outline width around every key, in cells
    #[arg(long)]
    key_border_width: Option<f32>,

    /// Write log output to this file (the terminal is taken by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default configuration file
    Init,
    /// Show the configuration file path
    ConfigPath,
    /// Print the label of a pitch, e.g. `label C#4 letters_all`
    Label {
        /// Pitch such as C4, F#3 or Bb2
        pitch: Pitch,
        /// Label mode; all modes when omitted
        mode: Option<LabelMode>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    match cli.command {
        Some(Commands::Init) => {
            let path = Config::create_default_config_file()?;
            println!("Created default config at: {}", path.display());
            return Ok(());
        }
        Some(Commands::ConfigPath) => {
            let path = Config::config_path()?;
            println!("{}", path.display());
            return Ok(());
        }
        Some(Commands::Label { pitch, mode }) => {
            match mode {
                Some(mode) => println!("{}", resolve_label(&pitch, mode)),
                None => {
                    for mode in LabelMode::ALL {
                        println!("{:<26} {:?}", mode.name(), resolve_label(&pitch, mode));
                    }
                }
            }
            return Ok(());
        }
        None => {}
    }

    // Load config
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_default(),
    };

    // Apply CLI overrides
    if cli.tap {
        config.key.allow_sliding = false;
    }
    if let Some(mode) = cli.label_mode {
        config.key.label_mode = mode;
    }
    if let Some(octave) = cli.octave {
        config.keyboard.lowest_note = 12 + (octave.min(9) * 12);
    }
    if let Some(keys) = cli.keys {
        config.keyboard.key_count = keys.clamp(1, 88);
    }
    if cli.no_haptics {
        config.key.haptics = false;
    }
    if let Some(ms) = cli.tap_release_ms {
        config.key.tap_release_ms = ms;
    }
    if let Some(policy) = cli.retap {
        config.key.retap_policy = policy;
    }
    if cli.flat_top {
        config.theme.flat_top = true;
    }
    if let Some(alignment) = cli.align {
        config.theme.alignment = alignment;
    }
    if let Some(width) = cli.key_border_width {
        config.theme.key_border_width = width;
    }

    // Run the TUI
    run_tui(config)
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(path) = log_file {
        let file = std::fs::File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn run_tui(config: Config) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut keyboard = Keyboard::new(
        config.to_keyboard_settings(),
        config.to_key_settings(),
        |pitch| Box::new(LogHaptics::new(pitch.to_string())),
    );
    let mut scheduler = WallClockScheduler::new();

    log::info!(
        "Keyboard ready: {} keys from {}, {} mode",
        keyboard.keys().len(),
        keyboard.octave_name(),
        if config.key.allow_sliding { "sliding" } else { "tap" }
    );

    // Main loop
    let result = run_event_loop(&mut terminal, &mut keyboard, &mut scheduler, &config.theme);

    // Cleanup
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableFocusChange,
        DisableMouseCapture
    )?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    keyboard: &mut Keyboard,
    scheduler: &mut WallClockScheduler,
    theme: &Theme,
) -> Result<()> {
    let mut laid_out = None;

    loop {
        // Draw
        terminal.draw(|frame| {
            let area = frame.area();

            // Keys must know their bounds before the next pointer event
            let keys = keys_area(area);
            if laid_out != Some(keys) {
                keyboard.layout(to_key_rect(keys));
                laid_out = Some(keys);
            }

            frame.render_widget(Clear, area);
            let bg_block = Block::default().style(Style::default().bg(Color::Rgb(20, 20, 30)));
            frame.render_widget(bg_block, area);

            render_keyboard_standalone(frame, area, keyboard, theme);
        })?;

        // Deliver elapsed tap releases
        for token in scheduler.due() {
            if let Some(event) = keyboard.fire(token) {
                report(&[event]);
            }
        }

        // Wake up in time for the next release
        let timeout = scheduler
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()).min(FRAME_TIME))
            .unwrap_or(FRAME_TIME);

        if !event::poll(timeout)? {
            continue;
        }

        match event::read()? {
            Event::FocusLost => {
                // Release all notes when losing focus
                report(&keyboard.release_all());
            }
            Event::Mouse(mouse) => {
                // Aim at the middle of the cell
                let location = Point::new(mouse.column as f32 + 0.5, mouse.row as f32 + 0.5);
                let tap_mode = !keyboard.key_settings().allow_sliding;

                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) if tap_mode => {
                        if let Some(event) = keyboard.tap(location, scheduler) {
                            report(&[event]);
                        }
                    }
                    MouseEventKind::Down(MouseButton::Left)
                    | MouseEventKind::Drag(MouseButton::Left)
                        if !tap_mode =>
                    {
                        report(&keyboard.pointer(location, PointerPhase::Moved));
                    }
                    MouseEventKind::Up(MouseButton::Left) if !tap_mode => {
                        report(&keyboard.pointer(location, PointerPhase::Ended));
                    }
                    _ => {}
                }
            }
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => {
                    report(&keyboard.release_all());
                    return Ok(());
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    report(&keyboard.release_all());
                    return Ok(());
                }
                // Octave down: < or Left arrow
                KeyCode::Char('<') | KeyCode::Left => {
                    report(&keyboard.octave_down());
                }
                // Octave up: > or Right arrow
                KeyCode::Char('>') | KeyCode::Right => {
                    report(&keyboard.octave_up());
                }
                _ => {}
            },
            _ => {}
        }
    }
}

/// Forward note events to the log; audio output is up to the embedding host
fn report(events: &[(Pitch, NoteEvent)]) {
    for (pitch, event) in events {
        match event {
            NoteEvent::On => log::info!("Note on: {}", pitch),
            NoteEvent::Off => log::info!("Note off: {}", pitch),
        }
    }
}
