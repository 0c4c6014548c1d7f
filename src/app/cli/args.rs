//! Command line arguments
//!
//! Global options configure discovery and logging; the subcommand selects
//! what the host does once plugins are loaded.

use crate::core::logging::LogFormat;
use crate::core::styles::help_styles;
use crate::plugin::api::PluginValue;
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

pub const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];
pub const LOG_FORMATS: [&str; 3] = ["text", "ext", "json"];

#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "wim")]
#[command(about = "Plugin host with versioned method invocation")]
#[command(version)]
#[command(after_help = " * can be specified multiple times")]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Extra runtime path searched for plugin modules*
    #[arg(short = 'p', long = "plugin-dir", value_name = "DIR", action = ArgAction::Append)]
    pub plugin_dirs: Vec<PathBuf>,

    /// Module file stem to skip*
    #[arg(long = "exclude-plugin", value_name = "NAME", action = ArgAction::Append)]
    pub plugin_exclusions: Vec<String>,

    /// Do not load the modules compiled into the host
    #[arg(long = "no-builtins")]
    pub no_builtins: bool,

    /// Load modules concurrently
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Force coloured output
    #[arg(long = "color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", conflicts_with = "color")]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = LOG_LEVELS)]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = LOG_FORMATS)]
    pub log_format: Option<String>,

    /// More output per occurrence
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Less output per occurrence
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List loaded plugins (default)
    List,

    /// Show runtime paths and discovered plugin modules
    Paths,

    /// Invoke a plugin method and print the JSON result
    Invoke {
        author: String,
        name: String,
        method: String,

        /// Arguments, parsed as JSON where possible and as strings otherwise
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,

        /// Version range the plugin must satisfy
        #[arg(short = 'r', long = "range", value_name = "RANGE", default_value = "*")]
        range: String,
    },

    /// Keep plugins loaded until a shutdown signal arrives
    Run,
}

impl Args {
    /// Parse the process arguments, exiting on errors, `--help` and `--version`
    pub fn parse_from_env() -> Self {
        let styled = std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
        let matches = <Self as CommandFactory>::command()
            .styles(help_styles(styled))
            .get_matches();
        Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::List)
    }

    /// Net verbosity: positive for -v, negative for -q
    pub fn verbosity(&self) -> i8 {
        self.verbose.min(i8::MAX as u8) as i8 - self.quiet.min(i8::MAX as u8) as i8
    }

    /// `Some(true)`/`Some(false)` when forced, `None` for auto-detection
    pub fn color_setting(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    pub fn use_color(&self) -> bool {
        self.color_setting().unwrap_or_else(|| {
            std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
        })
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
            .as_deref()
            .and_then(|format| format.parse().ok())
            .unwrap_or(LogFormat::Text)
    }

    /// Log file, with `none` and `-` meaning no file
    pub fn log_file(&self) -> Option<&std::path::Path> {
        self.log_file.as_deref().filter(|path| {
            let text = path.to_string_lossy();
            !(text.eq_ignore_ascii_case("none") || text == "-")
        })
    }

    /// True if a module with this file stem or builtin name is excluded
    ///
    /// A `lib` prefix on shared-library stems is ignored, so `--exclude-plugin
    /// echo` also skips `libecho.so`.
    pub fn is_excluded(&self, module_name: &str) -> bool {
        let bare = module_name.strip_prefix("lib").unwrap_or(module_name);
        self.plugin_exclusions
            .iter()
            .any(|excluded| excluded == module_name || excluded == bare)
    }
}

/// Parse `invoke` arguments: JSON where it parses, plain strings otherwise
pub fn parse_invoke_args(args: &[String]) -> Vec<PluginValue> {
    args.iter()
        .map(|arg| {
            serde_json::from_str(arg).unwrap_or_else(|_| PluginValue::String(arg.clone()))
        })
        .collect()
}
