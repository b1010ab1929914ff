//! Shared helper functions for CLI commands
//!
//! This module contains formatting utilities used across multiple command
//! modules to keep the human-readable output consistent.

use clap::ValueEnum;
use console::{style, StyledObject};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::sampling::ColorTag;

/// Style text with the terminal color matching a classification tag
pub fn styled<T>(text: T, color: ColorTag) -> StyledObject<T> {
    match color {
        ColorTag::Green => style(text).green(),
        ColorTag::Yellow => style(text).yellow(),
        ColorTag::Orange => style(text).color256(208),
        ColorTag::Red => style(text).red(),
    }
}

/// Format a percentage for display
///
/// Values too small to show at two decimals are written as "<0.01%" rather
/// than a misleading "0.00%".
pub fn format_percent(value: f64) -> String {
    if value > 0.0 && value < 0.005 {
        "<0.01%".to_string()
    } else {
        format!("{:.2}%", value)
    }
}

/// Format a count of hours, switching to minutes below one hour
pub fn format_hours(hours: f64) -> String {
    if hours < 1.0 {
        format!("{:.0} min", hours * 60.0)
    } else {
        format!("{:.1} h", hours)
    }
}

/// Effective output format: an explicit flag wins over the configured default
pub fn resolve_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    config
        .default_format
        .as_deref()
        .and_then(|name| OutputFormat::from_str(name, true).ok())
        .unwrap_or(OutputFormat::Auto)
}
