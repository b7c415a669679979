//! Colored terminal output for progress and results.
//!
//! This is the human-readable stdout stream; diagnostics go through `tracing`.

use console::style;

/// Print a blue progress marker, e.g. `[call_default]`.
pub fn progress(step: &str) {
    println!("{}", style(format!("[{step}]")).blue());
}

/// Print a blue heading line.
pub fn heading(text: &str) {
    println!("{}", style(text).blue());
}

/// Print an intermediate model response.
pub fn intermediate(text: &str) {
    println!("{}", style(text).yellow());
}

/// Print the final answer under its heading.
pub fn final_response(text: &str) {
    println!("{}\n{}", style("AI Final Response:").blue(), style(text).green());
}

/// Print the settings that must be provided before the assistant can run.
pub fn missing_settings(names: &[String]) {
    println!("{}", style("Missing environment variables:").red());

    for name in names {
        println!("{}", style(format!("- {name}")).red());
    }
}

/// Print a fatal startup error.
pub fn fatal(message: &str) {
    println!("{}", style(message).red());
}

/// Print the usage hint shown when no query is given.
pub fn usage(bin_name: &str) {
    println!("No argument provided\nUse {bin_name} \"<request>\"");
}
