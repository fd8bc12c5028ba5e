//! Binary entrypoint for the RustCade cabinet.
//!
//! Commands:
//! - *(none)* - open the cabinet; `--play <id>` launches a game straight away
//! - `list` - print the registered games
//! - `init` - write a starter `rustcade.toml`
mod app;
mod event;
mod ui;

use std::io;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use log::info;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use rustcade_cabinet::cabinet::audio::TerminalBell;
use rustcade_cabinet::cabinet::{AudioService, Controller};
use rustcade_cabinet::config::Config;
use rustcade_cabinet::games::GameRegistry;
use rustcade_cabinet::logging::init_logging;

use app::App;
use event::{Event, EventHandler};

#[derive(Parser)]
#[command(name = "rustcade")]
#[command(about = "A terminal arcade cabinet: one game at a time")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "rustcade.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable sound effects
    #[arg(long)]
    mute: bool,

    /// Launch this game immediately
    #[arg(long, value_name = "GAME")]
    play: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the games in the cabinet
    List,
    /// Write a default configuration file
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let registry = GameRegistry::bundled();

    match cli.command {
        Some(Commands::List) => {
            for module in registry.modules() {
                println!(
                    "{:<10} {:<10} {}x{}",
                    module.id, module.title, module.resolution.width, module.resolution.height
                );
            }
            return Ok(());
        }
        Some(Commands::Init) => {
            Config::create_default(&cli.config)?;
            println!("Wrote {}", cli.config);
            return Ok(());
        }
        None => {}
    }

    let config = Config::load_or_default(&cli.config)?;
    init_logging(&config, cli.verbose)?;
    info!("rustcade {} starting", env!("CARGO_PKG_VERSION"));

    let mut audio = AudioService::new(Box::new(TerminalBell), config.audio.effects.clone());
    audio.set_muted(config.audio.muted || cli.mute);
    let controller =
        Controller::new(registry, audio).with_instructions_duration(config.instructions_duration());
    let mut app = App::new(controller);
    if let Some(id) = &cli.play {
        app.launch(id);
    }

    run(&mut app, &config).context("terminal session failed")
}

fn run(app: &mut App, config: &Config) -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    // key release events, where the terminal can report them
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let event_handler = EventHandler::new(config.frame_interval());

    // Main loop
    let result = loop {
        if let Err(err) = terminal.draw(|frame| ui::render(frame, app)) {
            break Err(err);
        }

        match event_handler.next() {
            Ok(Event::Tick) => app.on_tick(Instant::now()),
            Ok(Event::Key(key)) => app.on_key(key),
            Ok(Event::Mouse(mouse)) => app.on_mouse(mouse),
            Err(err) => break Err(err),
        }

        if app.should_quit {
            break Ok(());
        }
    };

    app.controller.exit_to_menu();

    // Restore terminal
    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
