//! # Output
//!
//! User-facing progress output of a build, kept apart from log records.
//!
//! - [`OutputConfig`] decides whether colors and emojis are used, from the
//!   `--color` flag and the environment.
//! - [`Reporter`] prints the dotted progress trail of a build
//!   (`. reading the package manifest.`, `.. importing src.`), and prints
//!   nothing at all in quiet mode.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use console::style;
use std::cell::RefCell;
use std::env;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `always` and `never` force colors on or off; anything else detects
    /// support from the environment and the terminal.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always disabled.
    pub fn plain() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

enum Sink {
    Stdout,
    Buffer(RefCell<Vec<String>>),
}

/// Prints build progress.
pub struct Reporter {
    quiet: bool,
    config: OutputConfig,
    sink: Sink,
}

impl Reporter {
    /// A reporter printing to stdout.
    pub fn new(quiet: bool, config: OutputConfig) -> Self {
        Self {
            quiet,
            config,
            sink: Sink::Stdout,
        }
    }

    /// A reporter collecting plain lines in memory.
    pub fn buffered(quiet: bool) -> Self {
        Self {
            quiet,
            config: OutputConfig::plain(),
            sink: Sink::Buffer(RefCell::new(Vec::new())),
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Lines collected by a buffered reporter.
    pub fn lines(&self) -> Vec<String> {
        match &self.sink {
            Sink::Buffer(lines) => lines.borrow().clone(),
            Sink::Stdout => Vec::new(),
        }
    }

    fn emit(&self, line: String) {
        if self.quiet {
            return;
        }
        match &self.sink {
            Sink::Stdout => println!("{}", line),
            Sink::Buffer(lines) => lines.borrow_mut().push(line),
        }
    }

    /// Print a title with an underline.
    pub fn header(&self, title: &str) {
        self.emit(String::new());
        if self.config.use_color {
            self.emit(style(title).bold().to_string());
        } else {
            self.emit(title.to_string());
        }
        self.emit("-".repeat(title.chars().count()));
    }

    /// Print a progress step nested `depth` levels deep.
    pub fn step(&self, depth: usize, message: &str) {
        let dots = ".".repeat(depth.max(1));
        if self.config.use_color {
            self.emit(format!("{} {}", style(dots).dim(), message));
        } else {
            self.emit(format!("{} {}", dots, message));
        }
    }

    /// Print the final success line.
    pub fn success(&self, message: &str) {
        let mark = emoji(&self.config, "✅", "[OK]");
        if self.config.use_color {
            self.emit(format!("{} {}", mark, style(message).green()));
        } else {
            self.emit(format!("{} {}", mark, message));
        }
    }
}
