//! Configuration and color scheme management for asterm.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.asterm/config.toml`
//! - Built-in color schemes for the line styles (default, nord, dracula, gruvbox-dark)
//! - Seeding of the session environment
//!
//! # Configuration File
//!
//! ```toml
//! prompt = "ast3r.in>"
//! caret_blink_rate = "300ms"
//!
//! # Color scheme: default, nord, dracula, gruvbox-dark
//! color_scheme = "nord"
//!
//! greeting = ["#Hhello", "welcome back"]
//!
//! [environment]
//! editor = "none"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::env::{Environment, CARET_BLINK_RATE, DEFAULT_CARET_BLINK_RATE};
use crate::core::markup::Style;
use crate::core::session::DEFAULT_PROMPT;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Text shown before the input field
    pub prompt: String,
    /// Initial `caretblinkrate` value
    pub caret_blink_rate: String,
    /// Color scheme name
    pub color_scheme: String,
    /// Markup lines printed at startup
    pub greeting: Vec<String>,
    /// Extra environment variables set at startup
    pub environment: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            caret_blink_rate: DEFAULT_CARET_BLINK_RATE.to_string(),
            color_scheme: "default".to_string(),
            greeting: vec![
                "#Haster's website :3".to_string(),
                "i havent done much of anything yet but here this is for now :3".to_string(),
            ],
            environment: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                match fs::read_to_string(&path) {
                    Ok(content) => match Self::parse(&content) {
                        Ok(config) => return config,
                        Err(e) => warn!("Ignoring {}: {}", path.display(), e),
                    },
                    Err(e) => warn!("Cannot read {}: {}", path.display(), e),
                }
            }
        }
        Self::default()
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        asterm_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get the color scheme
    pub fn get_color_scheme(&self) -> ColorScheme {
        ColorScheme::by_name(&self.color_scheme)
    }

    /// Fresh environment holding the configured variables.
    /// `caretblinkrate` is always present.
    pub fn environment(&self) -> Environment {
        let mut env = Environment::new();
        env.set(CARET_BLINK_RATE, self.caret_blink_rate.clone());
        for (name, value) in &self.environment {
            env.set(name, value.clone());
        }
        env
    }
}

/// Color definition (RGB)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to crossterm Color
    pub fn to_crossterm(&self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

/// Color scheme definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorScheme {
    pub name: String,

    pub background: Color,
    pub default_fg: Color,
    pub header_fg: Color,
    pub error_fg: Color,
    /// Colors cycled across the characters of rainbow text
    pub rainbow: Vec<Color>,
    /// Scroll position indicator
    pub indicator_fg: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_scheme()
    }
}

impl ColorScheme {
    /// Default color scheme
    pub fn default_scheme() -> Self {
        Self {
            name: "default".to_string(),
            background: Color::new(0, 0, 0),
            default_fg: Color::new(204, 204, 204),
            header_fg: Color::new(255, 255, 255),
            error_fg: Color::new(255, 85, 85),
            rainbow: vec![
                Color::new(255, 0, 0),
                Color::new(255, 127, 0),
                Color::new(255, 255, 0),
                Color::new(0, 255, 0),
                Color::new(0, 127, 255),
                Color::new(75, 0, 130),
                Color::new(148, 0, 211),
            ],
            indicator_fg: Color::new(128, 128, 128),
        }
    }

    /// Nord scheme
    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            background: Color::new(46, 52, 64),
            default_fg: Color::new(216, 222, 233),
            header_fg: Color::new(136, 192, 208),
            error_fg: Color::new(191, 97, 106),
            rainbow: vec![
                Color::new(191, 97, 106),
                Color::new(208, 135, 112),
                Color::new(235, 203, 139),
                Color::new(163, 190, 140),
                Color::new(136, 192, 208),
                Color::new(129, 161, 193),
                Color::new(180, 142, 173),
            ],
            indicator_fg: Color::new(76, 86, 106),
        }
    }

    /// Dracula scheme
    pub fn dracula() -> Self {
        Self {
            name: "dracula".to_string(),
            background: Color::new(40, 42, 54),
            default_fg: Color::new(248, 248, 242),
            header_fg: Color::new(189, 147, 249),
            error_fg: Color::new(255, 85, 85),
            rainbow: vec![
                Color::new(255, 85, 85),
                Color::new(255, 184, 108),
                Color::new(241, 250, 140),
                Color::new(80, 250, 123),
                Color::new(139, 233, 253),
                Color::new(189, 147, 249),
                Color::new(255, 121, 198),
            ],
            indicator_fg: Color::new(98, 114, 164),
        }
    }

    /// Gruvbox Dark scheme
    pub fn gruvbox_dark() -> Self {
        Self {
            name: "gruvbox-dark".to_string(),
            background: Color::new(40, 40, 40),
            default_fg: Color::new(235, 219, 178),
            header_fg: Color::new(250, 189, 47),
            error_fg: Color::new(251, 73, 52),
            rainbow: vec![
                Color::new(251, 73, 52),
                Color::new(254, 128, 25),
                Color::new(250, 189, 47),
                Color::new(184, 187, 38),
                Color::new(142, 192, 124),
                Color::new(131, 165, 152),
                Color::new(211, 134, 155),
            ],
            indicator_fg: Color::new(146, 131, 116),
        }
    }

    /// Get scheme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "nord" => Self::nord(),
            "dracula" => Self::dracula(),
            "gruvbox-dark" | "gruvbox_dark" | "gruvbox" => Self::gruvbox_dark(),
            _ => Self::default_scheme(),
        }
    }

    /// List available schemes
    pub fn list() -> Vec<&'static str> {
        vec!["default", "nord", "dracula", "gruvbox-dark"]
    }

    /// Foreground for a style; rainbow text uses the `index`-th palette entry
    pub fn style_fg(&self, style: Style, index: usize) -> Color {
        match style {
            Style::Default => self.default_fg,
            Style::Header => self.header_fg,
            Style::Error => self.error_fg,
            Style::Rainbow => {
                if self.rainbow.is_empty() {
                    self.default_fg
                } else {
                    self.rainbow[index % self.rainbow.len()]
                }
            }
        }
    }
}

/// `~/.asterm`, created on first use
pub fn asterm_dir() -> Option<PathBuf> {
    let dir = home_dir()?.join(".asterm");
    if !dir.exists() {
        let _ = fs::create_dir_all(&dir);
    }
    Some(dir)
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.prompt, "ast3r.in>");
        let env = config.environment();
        assert_eq!(env.get(CARET_BLINK_RATE), Some("300ms"));
        assert_eq!(config.greeting.len(), 2);
    }

    #[test]
    fn test_parse_partial_file() {
        let config = Config::parse(
            r#"
            caret_blink_rate = "1s"
            color_scheme = "nord"

            [environment]
            Editor = "vi"
            "#,
        )
        .unwrap();
        assert_eq!(config.prompt, "ast3r.in>");
        assert_eq!(config.get_color_scheme().name, "nord");

        let env = config.environment();
        assert_eq!(env.get("caretblinkrate"), Some("1s"));
        assert_eq!(env.get("editor"), Some("vi"));
    }

    #[test]
    fn test_parse_rejects_bad_types() {
        assert!(Config::parse("greeting = 3").is_err());
    }

    #[test]
    fn test_scheme_lookup() {
        for name in ColorScheme::list() {
            assert_eq!(ColorScheme::by_name(name).name, name);
        }
        assert_eq!(ColorScheme::by_name("unknown").name, "default");
        assert_eq!(ColorScheme::by_name("Gruvbox").name, "gruvbox-dark");
    }

    #[test]
    fn test_rainbow_cycles() {
        let scheme = ColorScheme::default_scheme();
        let n = scheme.rainbow.len();
        assert_eq!(scheme.style_fg(Style::Rainbow, 0), scheme.style_fg(Style::Rainbow, n));
        assert_ne!(scheme.style_fg(Style::Rainbow, 0), scheme.style_fg(Style::Rainbow, 1));
        assert_eq!(scheme.style_fg(Style::Header, 5), scheme.header_fg);
    }
}
