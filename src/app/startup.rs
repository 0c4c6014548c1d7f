//! Application startup

use crate::app::cli::args::Args;
use crate::app::cli::config::load_config_file;
use crate::app::commands;
use crate::app::session::Session;
use crate::core::logging::{init_logging, level_for_verbosity};
use crate::core::version;

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Parse arguments and configuration, start logging, run the command
///
/// Returns the process exit code.
pub async fn startup() -> i32 {
    let mut args = Args::parse_from_env();

    match load_config_file(args.config_file.as_deref()).await {
        Ok(Some((path, config))) => {
            if let Err(e) = args.apply_toml_values(&config) {
                eprintln!("Error in configuration file {}: {}", path.display(), e);
                return 1;
            }
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    }

    let use_color = args.use_color();
    colored::control::set_override(use_color);

    let level = level_for_verbosity(
        args.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL),
        args.verbosity(),
    );
    if let Err(e) = init_logging(Some(level), args.log_format(), args.log_file(), use_color) {
        eprintln!("Error initialising logging: {}", e);
        return 1;
    }

    log::debug!(
        "Wim {} starting (plugin API {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        version::plugin_api_version(),
        version::build_time(),
        version::git_hash()
    );
    log::trace!("Arguments: {:?}", args);

    let session = Session::new(args, use_color);
    commands::execute(&session).await
}
