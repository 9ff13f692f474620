//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use hive_lib::{HoneypotStatus, ValidationResult};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print rows as a table, or `items` as JSON
pub fn print_table<R: Tabled, T: Serialize>(rows: Vec<R>, items: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", "No items found".yellow());
                return;
            }
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => print_json(items),
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("Failed to serialize output: {}", e)),
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print one line per validation rule
pub fn print_check(label: &str, result: &ValidationResult) {
    if result.is_valid {
        print_success(label);
    } else {
        print_error(&format!("{}: {}", label, result.message));
    }
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2}Gi", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.0}Mi", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.0}Ki", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Format a memory option ("512m") for display; unknown values pass through
pub fn format_memory(limit: &str) -> String {
    limit
        .parse::<hive_lib::MemoryLimit>()
        .map(|m| format_bytes(m.bytes()))
        .unwrap_or_else(|_| limit.to_string())
}

/// Format quota/period as a share of one core
pub fn format_cpu_share(share: f64) -> String {
    format!("{:.0}%", share * 100.0)
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "running" | "healthy" => status.green().to_string(),
        "created" | "degraded" => status.yellow().to_string(),
        "exited" | "stopped" => status.blue().to_string(),
        "not found" | "unhealthy" | "error" | "failed" => status.red().to_string(),
        _ => status.to_string(),
    }
}

pub fn color_honeypot_status(status: HoneypotStatus) -> String {
    color_status(status.as_str())
}
