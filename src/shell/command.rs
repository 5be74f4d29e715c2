//! Typed command lines.
//!
//! A dump command is held as a program name plus a sequence of typed
//! arguments until it is rendered. Rendering is the single place where
//! configuration-derived text turns into shell text, and every value passes
//! through [`quote`] exactly once on the way.

use std::fmt;

use super::quote::quote;

/// A value that ends up on a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Free text from configuration, always quoted.
    Text(String),
    /// A port or other number, rendered as bare decimal.
    Number(u16),
    /// `namespace.name`, each half quoted on its own (`'db'.'table'`).
    Qualified(String, String),
    /// A reference to an overlay variable, expanded by the shell (`"${NAME}"`).
    EnvRef(&'static str),
}

impl Value {
    /// Creates a quoted text value.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    fn render(&self) -> String {
        match self {
            Value::Text(s) => quote(s),
            Value::Number(n) => n.to_string(),
            Value::Qualified(namespace, name) => format!("{}.{}", quote(namespace), quote(name)),
            Value::EnvRef(name) => format!("\"${{{}}}\"", name),
        }
    }
}

/// One argument of a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// A bare flag such as `--single-transaction`.
    Flag(&'static str),
    /// A flag followed by its value as a separate word: `-h 'db.local'`.
    Separate(&'static str, Value),
    /// A flag joined to its value with `=`: `--db='sales'`.
    Joined(&'static str, Value),
    /// A positional value.
    Positional(Value),
    /// Trusted text appended verbatim: operator extra arguments, generated
    /// numeric flags such as `-6`.
    Raw(String),
}

impl Arg {
    fn render(&self) -> String {
        match self {
            Arg::Flag(flag) => (*flag).to_string(),
            Arg::Separate(flag, value) => format!("{} {}", flag, value.render()),
            Arg::Joined(flag, value) => format!("{}={}", flag, value.render()),
            Arg::Positional(value) => value.render(),
            Arg::Raw(raw) => raw.clone(),
        }
    }
}

/// A program and its arguments, not yet rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: &'static str,
    args: Vec<Arg>,
}

impl CommandLine {
    /// Starts a command line for `program`.
    pub fn new(program: &'static str) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    /// Program name.
    pub fn program(&self) -> &'static str {
        self.program
    }

    /// Arguments in order.
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Appends one argument.
    pub fn push(&mut self, arg: Arg) -> &mut Self {
        self.args.push(arg);
        self
    }

    /// Appends a bare flag.
    pub fn flag(&mut self, flag: &'static str) -> &mut Self {
        self.push(Arg::Flag(flag))
    }

    /// Appends a bare flag when `enabled`.
    pub fn flag_if(&mut self, enabled: bool, flag: &'static str) -> &mut Self {
        if enabled {
            self.push(Arg::Flag(flag));
        }
        self
    }

    /// Appends `flag value` as two words.
    pub fn option(&mut self, flag: &'static str, value: Value) -> &mut Self {
        self.push(Arg::Separate(flag, value))
    }

    /// Appends `flag=value`.
    pub fn joined(&mut self, flag: &'static str, value: Value) -> &mut Self {
        self.push(Arg::Joined(flag, value))
    }

    /// Appends a positional value.
    pub fn positional(&mut self, value: Value) -> &mut Self {
        self.push(Arg::Positional(value))
    }

    /// Appends trusted arguments verbatim.
    pub fn raw<I, S>(&mut self, extra: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in extra {
            self.args.push(Arg::Raw(arg.into()));
        }
        self
    }

    /// Renders the command as one shell string, tokens joined by single spaces.
    pub fn render(&self) -> String {
        std::iter::once(self.program.to_string())
            .chain(self.args.iter().map(Arg::render))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
