//! CLI command implementations
//!
//! Each `execute_*` function handles one subcommand and returns the exit code
//! to finish with. Errors are reported by the caller.

mod check_home;
mod config;
mod installations;
mod run_cmd;

pub use check_home::execute_check_home_command;
pub use config::execute_config_command;
pub use installations::execute_installations_command;
pub use run_cmd::{RunOptions, execute_run_command};

/// Append `-D KEY=VALUE` definitions to a properties string.
///
/// Definitions come last so they override earlier entries with the same key.
/// Keys and values are escaped so they survive properties parsing unchanged.
pub fn merge_definitions(properties: Option<&str>, define: &[(String, String)]) -> Option<String> {
    if define.is_empty() {
        return properties.map(str::to_string);
    }

    let mut merged = properties.map(str::to_string).unwrap_or_default();
    if !merged.is_empty() {
        // A blank line closes a trailing `\` continuation in the existing text
        merged.push_str("\n\n");
    }
    for (key, value) in define {
        merged.push_str(&escape_property(key, true));
        merged.push('=');
        merged.push_str(&escape_property(value, false));
        merged.push('\n');
    }
    Some(merged)
}

fn escape_property(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' if is_key => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '#' | '!' if is_key && i == 0 => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
