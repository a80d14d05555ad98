//! User interface rendering and input handling.
//!
//! - **renderer**: scrollback and prompt drawing with crossterm
//! - **keymapper**: keyboard input to prompt action mapping
//! - **caret**: caret blink timer

pub mod caret;
pub mod keymapper;
pub mod renderer;

pub use caret::Caret;
pub use keymapper::{InputAction, KeyMapper};
pub use renderer::Renderer;
