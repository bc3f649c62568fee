//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Color an error count: green when zero, red otherwise
pub fn color_errors(errors: u64) -> String {
    if errors == 0 {
        errors.to_string().green().to_string()
    } else {
        errors.to_string().red().bold().to_string()
    }
}

/// Render a matched master id, or a yellow unmatched marker
pub fn color_match(master_id: Option<&str>) -> String {
    match master_id {
        Some(id) => id.to_string(),
        None => "unmatched".yellow().to_string(),
    }
}
