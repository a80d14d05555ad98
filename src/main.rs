//! asterm - a toy terminal with a blinking prompt
//!
//! asterm draws styled output lines and an input prompt with a blinking caret.
//! Each submitted line runs one command from a small table; commands read and
//! write a session-lifetime environment map.
//!
//! # Features
//!
//! - **Line Markup**: `#H`, `#D`, `#E` and `#r` switch between header, default,
//!   error and rainbow styles inside one line
//! - **Commands**: `echo`, `help`, `set`, `get`
//! - **Environment**: case-insensitive variables; `caretblinkrate` drives the caret
//! - **Color Schemes**: 4 built-in themes
//!
//! # Quick Start
//!
//! ```text
//! asterm                        # Interactive prompt
//! asterm -e "echo hi" -e help   # Run commands and print the output
//! echo "get caretblinkrate" | asterm --plain
//! ```
//!
//! # Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | Enter | Run the input |
//! | Backspace | Delete last character |
//! | PageUp/PageDown | Scroll output |
//! | End | Back to newest output |
//! | Ctrl+C / Ctrl+D | Quit |

mod config;
mod core;
mod ui;

use std::env;
use std::io::{self, BufRead, Cursor, IsTerminal, Write};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::{ColorScheme, Config as AstermConfig};
use crate::core::commands::{CommandTable, STATUS_OK};
use crate::core::session::TerminalSession;
use crate::core::sink::BufferSink;
use crate::ui::renderer::write_line_ansi;
use crate::ui::{Caret, InputAction, KeyMapper, Renderer};

/// Longest wait for input before the loop checks the caret again
const MAX_POLL: Duration = Duration::from_millis(100);

/// Command line options
#[derive(Debug, Default, PartialEq)]
struct Options {
    /// Lines to run without opening the prompt
    exec: Vec<String>,
    /// Read command lines from stdin
    plain: bool,
    /// Color scheme override
    scheme: Option<String>,
}

/// Result of reading the command line
#[derive(Debug, PartialEq)]
enum Cli {
    Run(Options),
    Help,
    Version,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("asterm {}", VERSION);
}

fn print_help() {
    eprintln!("asterm {} - a toy terminal with a blinking prompt", VERSION);
    eprintln!();
    eprintln!("Usage: asterm [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -e, --exec <LINE>     Run a command line and print its output (repeatable)");
    eprintln!("      --plain           Read command lines from stdin, no prompt");
    eprintln!("      --scheme <NAME>   Color scheme for this run");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  echo <text...>        Print the given text");
    eprintln!("  help                  List commands");
    eprintln!("  set <name> <value...> Set an environment variable");
    eprintln!("  get <name>            Print an environment variable");
    eprintln!();
    eprintln!("Markup: #H header, #D default, #E error, #r rainbow");
    eprintln!();
    eprintln!("Configuration: ~/.asterm/config.toml");
    eprintln!("Log file:      ~/.asterm/asterm.log (level via ASTERM_LOG)");
    eprintln!();
    eprintln!("Color schemes: {}", ColorScheme::list().join(", "));
}

fn parse_args(args: &[String]) -> Result<Cli, String> {
    let mut options = Options::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(Cli::Help),
            "-v" | "--version" => return Ok(Cli::Version),
            "-e" | "--exec" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing command line for --exec".to_string());
                }
                options.exec.push(args[i].clone());
            }
            "--plain" => {
                options.plain = true;
            }
            "--scheme" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing scheme name".to_string());
                }
                options.scheme = Some(args[i].clone());
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(Cli::Run(options))
}

/// Log to `~/.asterm/asterm.log`; the screen belongs to the renderer
fn init_logging() {
    let log_path = config::asterm_dir()
        .map(|dir| dir.join("asterm.log"))
        .unwrap_or_else(|| std::path::PathBuf::from("asterm.log"));

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_env("ASTERM_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(Cli::Run(options)) => options,
        Ok(Cli::Help) => {
            print_help();
            return Ok(());
        }
        Ok(Cli::Version) => {
            print_version();
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging();
    info!("asterm {} starting...", VERSION);

    let mut config = AstermConfig::load();
    if let Some(scheme) = options.scheme.clone() {
        config.color_scheme = scheme;
    }

    let color = io::stdout().is_terminal();

    if !options.exec.is_empty() {
        let script = options.exec.join("\n");
        let status = run_batch(&config, Cursor::new(script), &mut io::stdout().lock(), color)?;
        std::process::exit(status);
    }

    if options.plain || !io::stdin().is_terminal() {
        let status = run_batch(&config, io::stdin().lock(), &mut io::stdout().lock(), color)?;
        std::process::exit(status);
    }

    run_terminal(&config)
}

/// Run command lines from `input` without a prompt, one at a time.
/// Output is flushed after every line. Returns the status of the last command.
fn run_batch<R: BufRead, W: Write>(
    config: &AstermConfig,
    mut input: R,
    out: &mut W,
    color: bool,
) -> anyhow::Result<i32> {
    let scheme = config.get_color_scheme();
    let mut session = TerminalSession::new(
        CommandTable::with_builtins(),
        config.environment(),
        BufferSink::new(),
    );

    let mut status = STATUS_OK;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }

        let line = String::from_utf8_lossy(&buf);
        if std::str::from_utf8(&buf).is_err() {
            warn!(line = %line, "input line is not valid UTF-8");
        }

        status = session.execute(&line);
        for output in session.sink_mut().take() {
            if color {
                write_line_ansi(out, &output, &scheme)?;
            } else {
                writeln!(out, "{}", output)?;
            }
        }
        out.flush()?;
    }
    Ok(status)
}

/// Run the interactive prompt
fn run_terminal(config: &AstermConfig) -> anyhow::Result<()> {
    let mut renderer = Renderer::new(config.get_color_scheme());
    renderer.init()?;

    let mut session = TerminalSession::new(
        CommandTable::with_builtins(),
        config.environment(),
        renderer,
    )
    .with_prompt(config.prompt.clone());

    session.greet(&config.greeting);

    let result = run_main_loop(&mut session);
    if let Err(ref e) = result {
        error!("main loop failed: {}", e);
    }

    session.sink_mut().cleanup()?;
    info!("asterm exiting");
    result
}

fn run_main_loop(session: &mut TerminalSession<Renderer>) -> anyhow::Result<()> {
    let mut caret = Caret::new(session.blink_interval(), Instant::now());

    loop {
        if caret.tick(Instant::now()) {
            let renderer = session.sink_mut();
            renderer.advance_rainbow();
            renderer.mark_dirty();
        }

        if session.sink().needs_redraw() {
            let prompt = session.prompt().to_string();
            let input = session.input().to_string();
            session.sink_mut().render(&prompt, &input, caret.glyph())?;
        }

        let timeout = caret.time_to_next(Instant::now()).min(MAX_POLL);
        if !event::poll(timeout)? {
            continue;
        }

        match event::read()? {
            Event::Key(key_event) => {
                if key_event.kind != KeyEventKind::Press {
                    continue;
                }

                // Any key press makes the caret solid again
                caret.reset(session.blink_interval(), Instant::now());
                session.sink_mut().mark_dirty();

                let page = crossterm::terminal::size().map(|(_, rows)| rows as usize / 2).unwrap_or(10);
                match KeyMapper::map(&key_event) {
                    InputAction::Insert(ch) => session.push_char(ch),
                    InputAction::Backspace => session.backspace(),
                    InputAction::Submit => {
                        session.submit();
                    }
                    InputAction::ScrollUp => session.sink_mut().scroll_view_up(page.max(1)),
                    InputAction::ScrollDown => session.sink_mut().scroll_view_down(page.max(1)),
                    InputAction::ScrollBottom => session.sink_mut().scroll_to_bottom(),
                    InputAction::Quit => {
                        info!("quit requested");
                        break;
                    }
                    InputAction::Ignore => {}
                }
            }
            Event::Resize(_, _) => session.sink_mut().mark_dirty(),
            _ => {}
        }
    }

    Ok(())
}
