//! Fully-resolved pipeline description.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::shell::CommandLine;

/// A shell command string, its environment overlay and its deadline.
///
/// Built once per request and not mutated afterwards. The overlay is applied
/// to the spawned shell only; the parent environment is never touched.
#[derive(Clone, PartialEq, Eq)]
pub struct PipelineSpec {
    command: String,
    env: BTreeMap<String, String>,
    timeout: Option<Duration>,
}

impl PipelineSpec {
    /// Wraps an already-rendered shell command.
    ///
    /// The string is handed to `sh -c` as is; callers building from
    /// configuration should go through [`PipelineSpec::pipe`] instead.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            env: BTreeMap::new(),
            timeout: None,
        }
    }

    /// `<producer> | <consumer>`.
    pub fn pipe(producer: &CommandLine, consumer: &CommandLine) -> Self {
        Self::chain(&[producer, consumer])
    }

    /// `<first> | <second> | ...`, each stage rendered on its own.
    pub fn chain(stages: &[&CommandLine]) -> Self {
        let rendered: Vec<String> = stages.iter().map(|stage| stage.render()).collect();
        Self::new(rendered.join(" | "))
    }

    /// Adds one overlay variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Sets the deadline. `None` or a zero duration disables it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    /// Shell command string.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Environment overlay.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Deadline, if armed.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Debug for PipelineSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineSpec")
            .field("command", &self.command)
            .field("env", &self.env.keys().collect::<Vec<_>>())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::Value;

    #[test]
    fn test_pipe_joins_with_bar() {
        let mut dump = CommandLine::new("pg_dump");
        dump.positional(Value::text("app"));
        let mut gzip = CommandLine::new("gzip");
        gzip.raw(["-6"]);
        let spec = PipelineSpec::pipe(&dump, &gzip);
        assert_eq!(spec.command(), "pg_dump 'app' | gzip -6");
    }

    #[test]
    fn test_zero_timeout_is_disabled() {
        let spec = PipelineSpec::new("true").with_timeout(Some(Duration::ZERO));
        assert_eq!(spec.timeout(), None);
        let spec = PipelineSpec::new("true").with_timeout(Some(Duration::from_secs(3)));
        assert_eq!(spec.timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_debug_hides_env_values() {
        let spec = PipelineSpec::new("true").with_env("PGPASSWORD", "s3cret");
        let debug = format!("{:?}", spec);
        assert!(debug.contains("PGPASSWORD"));
        assert!(!debug.contains("s3cret"));
    }
}
