//! Command table and dispatcher
//!
//! Input is split on single spaces; the first token names the command and the
//! handler receives every token, the name included at index 0.

use std::collections::HashMap;

use tracing::debug;
use unicode_width::UnicodeWidthStr;

use super::env::Environment;
use super::markup::StyledLine;
use super::sink::LineSink;

/// Handler finished normally
pub const STATUS_OK: i32 = 0;
/// Handler reported a user error
pub const STATUS_FAILED: i32 = 1;

/// Command handler: ordered arguments in, status code out
pub type Handler = Box<dyn Fn(&mut CommandContext<'_>, &[&str]) -> i32>;

/// What a handler may touch while it runs
pub struct CommandContext<'a> {
    pub env: &'a mut Environment,
    out: &'a mut dyn LineSink,
    table: &'a CommandTable,
}

impl<'a> CommandContext<'a> {
    pub fn new(env: &'a mut Environment, out: &'a mut dyn LineSink, table: &'a CommandTable) -> Self {
        Self { env, out, table }
    }

    /// Print one markup line
    pub fn print_line(&mut self, text: &str) {
        self.out.push_line(StyledLine::parse(text));
    }

    /// Print `error: <message>` and return the failure status
    pub fn error(&mut self, message: &str) -> i32 {
        report_error(&mut *self.out, message)
    }

    /// The table this command was dispatched from
    pub fn table(&self) -> &CommandTable {
        self.table
    }
}

/// Writes an error line in the error style
fn report_error(out: &mut dyn LineSink, message: &str) -> i32 {
    out.push_line(StyledLine::parse(&format!("#Eerror#D: {}", message)));
    STATUS_FAILED
}

struct Command {
    name: String,
    description: String,
    handler: Handler,
}

/// Name to handler mapping, kept in registration order
#[derive(Default)]
pub struct CommandTable {
    commands: Vec<Command>,
    index: HashMap<String, usize>,
}

impl CommandTable {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding `echo`, `help`, `set` and `get`
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register("echo", "prints the given text.", cmd_echo);
        table.register("help", "displays this help menu.", cmd_help);
        table.register("set", "sets an environment variable to a given value.", cmd_set);
        table.register("get", "prints the value of an environment variable.", cmd_get);
        table
    }

    /// Add a command. Registering an existing name replaces its handler in place.
    pub fn register<F>(&mut self, name: &str, description: &str, handler: F)
    where
        F: Fn(&mut CommandContext<'_>, &[&str]) -> i32 + 'static,
    {
        let command = Command {
            name: name.to_string(),
            description: description.to_string(),
            handler: Box::new(handler),
        };
        match self.index.get(name) {
            Some(&i) => self.commands[i] = command,
            None => {
                self.index.insert(name.to_string(), self.commands.len());
                self.commands.push(command);
            }
        }
    }

    #[allow(dead_code)]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// `(name, description)` pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.commands
            .iter()
            .map(|c| (c.name.as_str(), c.description.as_str()))
    }

    /// Split `line` and run the named command.
    ///
    /// Unknown commands print an error line and return [`STATUS_FAILED`].
    pub fn execute(&self, line: &str, env: &mut Environment, out: &mut dyn LineSink) -> i32 {
        let args: Vec<&str> = line.split(' ').collect();
        let name = args[0];

        let Some(&i) = self.index.get(name) else {
            debug!(command = name, "unknown command");
            return report_error(out, &format!("'{}' is not a known command.", name));
        };

        let mut ctx = CommandContext::new(env, out, self);
        let status = (self.commands[i].handler)(&mut ctx, &args);
        debug!(command = name, status, "command finished");
        status
    }
}

fn cmd_echo(ctx: &mut CommandContext<'_>, args: &[&str]) -> i32 {
    let output = args[1..].join(" ");
    ctx.print_line(&output);
    STATUS_OK
}

fn cmd_help(ctx: &mut CommandContext<'_>, _args: &[&str]) -> i32 {
    let width = ctx.table().iter().map(|(name, _)| name.width()).max().unwrap_or(0);
    let lines: Vec<String> = ctx
        .table()
        .iter()
        .map(|(name, description)| {
            format!("#H{}#D{:pad$} - {}", name, "", description, pad = width - name.width())
        })
        .collect();
    for line in lines {
        ctx.print_line(&line);
    }
    STATUS_OK
}

fn cmd_set(ctx: &mut CommandContext<'_>, args: &[&str]) -> i32 {
    if args.len() <= 2 {
        return ctx.error("not enough parameters.");
    }
    let value = args[2..].join(" ");
    ctx.env.set(args[1], value);
    STATUS_OK
}

fn cmd_get(ctx: &mut CommandContext<'_>, args: &[&str]) -> i32 {
    if args.len() <= 1 {
        return ctx.error("not enough parameters.");
    }
    let name = args[1].to_lowercase();
    let line = format!("#H{}#D={}", name, ctx.env.get_or_empty(&name));
    ctx.print_line(&line);
    STATUS_OK
}
