//! Terminal session
//!
//! Ties the command table, the environment and an output surface together and
//! owns the state of the input prompt.

use std::time::Duration as StdDuration;

use tracing::{debug, info, warn};

use super::commands::CommandTable;
use super::duration::Duration;
use super::env::{Environment, CARET_BLINK_RATE};
use super::markup::{parse_line, StyledLine};
use super::sink::LineSink;

/// Blink period used when `caretblinkrate` is unset or unparsable
pub const FALLBACK_BLINK_INTERVAL: StdDuration = StdDuration::from_millis(300);

/// Default prompt text
pub const DEFAULT_PROMPT: &str = "ast3r.in>";

/// A running terminal: commands, environment, output, and the prompt line
pub struct TerminalSession<S: LineSink> {
    commands: CommandTable,
    env: Environment,
    sink: S,
    prompt: String,
    /// Current value of the input field
    input: String,
}

impl<S: LineSink> TerminalSession<S> {
    pub fn new(commands: CommandTable, env: Environment, sink: S) -> Self {
        info!(commands = commands.iter().count(), vars = env.len(), "session created");
        Self {
            commands,
            env,
            sink,
            prompt: DEFAULT_PROMPT.to_string(),
            input: String::new(),
        }
    }

    /// Replace the prompt text shown before the input field
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Print a markup line; `None` prints a blank line
    pub fn print_line(&mut self, text: Option<&str>) {
        self.sink.push_line(parse_line(text));
    }

    /// Run one command line. The status is 0 on success and 1 on failure.
    pub fn execute(&mut self, line: &str) -> i32 {
        self.commands.execute(line, &mut self.env, &mut self.sink)
    }

    /// Print the greeting followed by a blank line
    pub fn greet(&mut self, lines: &[String]) {
        for line in lines {
            self.print_line(Some(line));
        }
        self.print_line(None);
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Close the current prompt and run its contents.
    ///
    /// The prompt is re-printed as a finished line, the command output follows,
    /// then a blank line, and a fresh empty prompt is opened.
    pub fn submit(&mut self) -> i32 {
        let value = std::mem::take(&mut self.input);
        debug!(input = %value, "submit");

        let closed = format!("{}{}", self.prompt, value);
        self.sink.push_line(StyledLine::parse(&closed));

        let status = self.execute(&value);
        self.print_line(None);
        status
    }

    /// Caret blink period from `caretblinkrate`
    pub fn blink_interval(&self) -> StdDuration {
        let Some(rate) = self.env.get(CARET_BLINK_RATE) else {
            return FALLBACK_BLINK_INTERVAL;
        };
        match Duration::parse(rate).map(|d| d.to_std()) {
            Ok(interval) if interval.is_zero() => {
                warn!(rate, "zero caret blink rate, using fallback");
                FALLBACK_BLINK_INTERVAL
            }
            Ok(interval) => interval,
            Err(e) => {
                warn!("{}, using fallback", e);
                FALLBACK_BLINK_INTERVAL
            }
        }
    }

    #[allow(dead_code)]
    pub fn env(&self) -> &Environment {
        &self.env
    }

    #[allow(dead_code)]
    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Commands may be added while the session runs
    #[allow(dead_code)]
    pub fn commands_mut(&mut self) -> &mut CommandTable {
        &mut self.commands
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::{STATUS_FAILED, STATUS_OK};
    use crate::core::markup::{Segment, Style, NBSP};
    use crate::core::sink::BufferSink;

    fn session() -> TerminalSession<BufferSink> {
        let mut env = Environment::new();
        env.set(CARET_BLINK_RATE, "300ms");
        TerminalSession::new(CommandTable::with_builtins(), env, BufferSink::new())
    }

    fn texts(session: &mut TerminalSession<BufferSink>) -> Vec<String> {
        session
            .sink_mut()
            .take()
            .iter()
            .map(StyledLine::plain_text)
            .collect()
    }

    #[test]
    fn test_print_line_blank() {
        let mut s = session();
        s.print_line(None);
        s.print_line(Some(""));
        let lines = s.sink().lines();
        assert_eq!(lines.len(), 2);
        for line in lines {
            assert_eq!(line.segments(), &[Segment::new(Style::Default, "")]);
            assert_eq!(line.plain_text(), NBSP);
        }
    }

    #[test]
    fn test_submit_lifecycle() {
        let mut s = session();
        for ch in "echo hi".chars() {
            s.push_char(ch);
        }
        assert_eq!(s.input(), "echo hi");

        let status = s.submit();
        assert_eq!(status, STATUS_OK);
        assert_eq!(s.input(), "");
        assert_eq!(texts(&mut s), vec!["ast3r.in>echo hi", "hi", NBSP]);
    }

    #[test]
    fn test_submit_unknown() {
        let mut s = session().with_prompt("$ ");
        s.push_char('x');
        s.push_char('y');
        s.backspace();
        assert_eq!(s.submit(), STATUS_FAILED);
        assert_eq!(
            texts(&mut s),
            vec!["$ x", "error: 'x' is not a known command.", NBSP]
        );
    }

    #[test]
    fn test_set_rejected_leaves_env() {
        let mut s = session();
        assert_eq!(s.execute("set foo"), STATUS_FAILED);
        assert_eq!(s.env().get("foo"), None);
    }

    #[test]
    fn test_greet() {
        let mut s = session();
        s.greet(&["#Hhello".to_string(), "world".to_string()]);
        let lines = s.sink().lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].segments()[0].style, Style::Header);
        assert_eq!(lines[1].plain_text(), "world");
        assert_eq!(lines[2].plain_text(), NBSP);
    }

    #[test]
    fn test_blink_interval() {
        let mut s = session();
        assert_eq!(s.blink_interval(), StdDuration::from_millis(300));

        s.execute("set caretblinkrate 1s");
        assert_eq!(s.blink_interval(), StdDuration::from_secs(1));

        s.execute("set CaretBlinkRate 5parsecs");
        assert_eq!(s.blink_interval(), FALLBACK_BLINK_INTERVAL);

        s.execute("set caretblinkrate 0ms");
        assert_eq!(s.blink_interval(), FALLBACK_BLINK_INTERVAL);

        // Rounds to zero nanoseconds
        s.execute("set caretblinkrate 0.0000001ms");
        assert_eq!(s.blink_interval(), FALLBACK_BLINK_INTERVAL);

        s.execute("set caretblinkrate 0.5ms");
        assert_eq!(s.blink_interval(), StdDuration::from_micros(500));
    }

    #[test]
    fn test_register_while_running() {
        let mut s = session();
        s.commands_mut().register("whoami", "prints the user name.", |ctx, _| {
            let user = ctx.env.get_or_empty("user").to_string();
            ctx.print_line(&format!("#H{}", user));
            STATUS_OK
        });
        s.env_mut().set("USER", "guest");

        assert_eq!(s.execute("whoami"), STATUS_OK);
        assert_eq!(s.execute("help"), STATUS_OK);
        let text = texts(&mut s);
        assert_eq!(text[0], "guest");
        assert_eq!(text.len(), 6);
        assert!(text[5].starts_with("whoami - "));
        assert_eq!(text[1], "echo   - prints the given text.");
    }
}
