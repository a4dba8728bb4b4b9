//! Output sinks shared by the executor and the orchestrator.

use colored::Colorize;

/// Prefix used on summary and error lines
pub const PLUGIN_NAME: &str = "composer-cleanup";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    VeryVerbose,
    Debug,
}

impl Verbosity {
    pub fn is_elevated(self) -> bool {
        self >= Verbosity::Verbose
    }
}

/// Output sink provided by the host
pub trait Reporter {
    fn info(&mut self, message: &str);
    fn error(&mut self, message: &str);
    fn verbosity(&self) -> Verbosity;
}

/// Writes info lines to stdout and errors to stderr
pub struct ConsoleReporter {
    verbosity: Verbosity,
}

impl ConsoleReporter {
    pub fn new(verbosity: Verbosity) -> Self {
        ConsoleReporter { verbosity }
    }
}

/// Highlight the plugin name when a message starts with it
fn styled(message: &str) -> String {
    match message.strip_prefix(PLUGIN_NAME) {
        Some(rest) => format!("{}{}", PLUGIN_NAME.green(), rest),
        None => message.to_string(),
    }
}

impl Reporter for ConsoleReporter {
    fn info(&mut self, message: &str) {
        if self.verbosity > Verbosity::Quiet {
            println!("{}", styled(message));
        }
    }

    fn error(&mut self, message: &str) {
        eprintln!("{}", styled(message).red());
    }

    fn verbosity(&self) -> Verbosity {
        self.verbosity
    }
}

/// Collects messages in memory instead of printing them
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub verbosity: Verbosity,
    pub infos: Vec<String>,
    pub errors: Vec<String>,
}

impl RecordingReporter {
    pub fn new(verbosity: Verbosity) -> Self {
        RecordingReporter {
            verbosity,
            ..Default::default()
        }
    }
}

impl Reporter for RecordingReporter {
    fn info(&mut self, message: &str) {
        self.infos.push(message.to_string());
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn verbosity(&self) -> Verbosity {
        self.verbosity
    }
}
