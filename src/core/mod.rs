//! Core terminal logic, independent of any screen.
//!
//! - **markup**: `#<tag><text>` line markup and styled segments
//! - **commands**: command table, built-in commands and dispatcher
//! - **env**: session environment variables
//! - **duration**: `<number><unit>` duration strings
//! - **sink**: output surfaces that receive finished lines
//! - **session**: `TerminalSession` owning all of the above plus the prompt
//!
//! # Architecture
//!
//! ```text
//! TerminalSession
//! ├── CommandTable (name -> handler)
//! ├── Environment  (lower-cased name -> value)
//! └── LineSink     (BufferSink in tests, Renderer on screen)
//! ```

pub mod commands;
pub mod duration;
pub mod env;
pub mod markup;
pub mod session;
pub mod sink;
