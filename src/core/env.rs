//! Session environment variables
//!
//! Names are case-insensitive: they are lower-cased on every read and write.
//! Entries are never removed.

use std::collections::HashMap;

/// Controls the caret blink period (a duration string such as `300ms`)
pub const CARET_BLINK_RATE: &str = "caretblinkrate";

/// Default caret blink period
pub const DEFAULT_CARET_BLINK_RATE: &str = "300ms";

#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, overwriting any previous value
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.vars.insert(name.to_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Value of a variable, or the empty string when unset
    pub fn get_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_case_insensitive() {
        let mut env = Environment::new();
        env.set("Foo", "bar");
        assert_eq!(env.get("foo"), Some("bar"));
        assert_eq!(env.get("FOO"), Some("bar"));

        env.set("FOO", "baz");
        assert_eq!(env.get("foo"), Some("baz"));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_missing_is_empty() {
        let env = Environment::new();
        assert!(env.is_empty());
        assert_eq!(env.get("missing"), None);
        assert_eq!(env.get_or_empty("missing"), "");
    }
}
