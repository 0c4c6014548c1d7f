//! Subcommand implementations
//!
//! Each command returns the process exit code: 0 on success, 1 on failure.

use crate::app::cli::args::{parse_invoke_args, Command};
use crate::app::cli::display::{path_lines, print_plugin_table};
use crate::app::session::Session;
use crate::core::error_handling::log_error_with_context;
use crate::core::shutdown::ShutdownCoordinator;
use crate::plugin::api::{PluginResult, PluginValue};
use tokio::sync::broadcast;

pub async fn execute(session: &Session) -> i32 {
    let command = session.args.selected_command();
    if command == Command::Paths {
        return paths(session);
    }

    let reports = session.load().await;
    let failed = reports.iter().filter(|report| !report.succeeded()).count();
    if failed > 0 {
        log::warn!("{} of {} plugin module(s) failed to load", failed, reports.len());
    }

    let code = match command {
        Command::Invoke {
            author,
            name,
            method,
            args,
            range,
        } => match invoke(session, &author, &name, &method, &range, &args) {
            Ok(output) => {
                println!("{}", output);
                0
            }
            Err(err) => {
                log_error_with_context(&err, "Plugin invocation");
                1
            }
        },
        Command::Run => {
            let (coordinator, shutdown) = ShutdownCoordinator::new();
            coordinator.install_signal_handlers();
            return run_until(session, shutdown).await;
        }
        _ => list(session),
    };

    session.manager.unload_all();
    code
}

pub fn list(session: &Session) -> i32 {
    match session.manager.plugins() {
        Ok(plugins) => {
            print_plugin_table(&plugins, session.use_color);
            0
        }
        Err(err) => {
            log_error_with_context(&err, "Listing plugins");
            1
        }
    }
}

pub fn paths(session: &Session) -> i32 {
    for line in path_lines(&session.paths, &session.module_paths(), session.use_color) {
        println!("{}", line);
    }
    0
}

/// Invoke a method and render the result as pretty JSON
pub fn invoke(
    session: &Session,
    author: &str,
    name: &str,
    method: &str,
    range: &str,
    args: &[String],
) -> PluginResult<String> {
    let values = parse_invoke_args(args);
    let result = session
        .manager
        .invoke_plugin_method(author, name, method, range, &values)?;
    Ok(render(&result))
}

fn render(value: &PluginValue) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Stay resident until `shutdown` fires, then unload and clean the cache
pub async fn run_until(session: &Session, mut shutdown: broadcast::Receiver<()>) -> i32 {
    let loaded = session.manager.registry().plugin_count().unwrap_or(0);
    log::info!("{} plugin(s) loaded; waiting for shutdown", loaded);

    if let Err(err) = shutdown.recv().await {
        log::debug!("Shutdown channel closed: {}", err);
    }
    log::info!("Shutting down");

    let unloaded = session.manager.unload_all();
    let cache_failures = session.paths.clean_cache();
    log::debug!(
        "Unloaded {} plugin(s); {} cache entr(ies) could not be removed",
        unloaded,
        cache_failures.len()
    );
    0
}
