//! Table and listing output for the CLI commands

use crate::core::styles::StyleRole;
use crate::paths::api::RuntimePathManager;
use crate::plugin::api::PluginDescriptor;
use prettytable::{format, Cell, Row, Table};
use std::path::Path;

fn cell(text: &str, role: StyleRole, use_color: bool) -> Cell {
    let cell = Cell::new(text);
    match role.prettytable_spec() {
        Some(spec) if use_color => cell.style_spec(spec),
        _ => cell,
    }
}

/// One row per plugin: identity, version, methods and description
pub fn plugin_table(plugins: &[PluginDescriptor], use_color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);

    let header = |text: &str| match StyleRole::Header.prettytable_spec() {
        Some(spec) if use_color => Cell::new(text).style_spec(&format!("b{}", spec)),
        _ => Cell::new(text),
    };
    table.set_titles(Row::new(vec![
        header("Plugin"),
        header("Version"),
        header("Methods"),
        header("Description"),
    ]));

    for plugin in plugins {
        table.add_row(Row::new(vec![
            cell(&plugin.key().to_string(), StyleRole::Key, use_color),
            cell(&plugin.version, StyleRole::Version, use_color),
            cell(&plugin.methods.join(", "), StyleRole::Method, use_color),
            Cell::new(&plugin.description),
        ]));
    }
    table
}

pub fn print_plugin_table(plugins: &[PluginDescriptor], use_color: bool) {
    if plugins.is_empty() {
        eprintln!("No plugins loaded.");
        return;
    }
    plugin_table(plugins, use_color).printstd();
}

/// Runtime paths, marking the ones that do not exist
pub fn path_lines(
    paths: &RuntimePathManager,
    modules: &[impl AsRef<Path>],
    use_color: bool,
) -> Vec<String> {
    let mut lines = vec![StyleRole::Header.paint("Runtime paths:", use_color)];
    for path in paths.runtime_paths() {
        let text = path.display().to_string();
        lines.push(if path.is_dir() {
            format!("  {}", StyleRole::Path.paint(&text, use_color))
        } else {
            let missing = format!("{} (missing)", text);
            format!("  {}", StyleRole::Missing.paint(&missing, use_color))
        });
    }

    lines.push(StyleRole::Header.paint("Plugin modules:", use_color));
    if modules.is_empty() {
        lines.push(format!("  {}", StyleRole::Missing.paint("(none)", use_color)));
    }
    for module in modules {
        lines.push(format!("  {}", module.as_ref().display()));
    }
    lines
}
