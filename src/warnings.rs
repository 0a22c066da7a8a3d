// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Printing of warnings about degraded analysis modes.

use colored::Colorize;

/// Print a warning to standard error.
///
/// Used for conditions that degrade an analysis without invalidating it:
/// a missing periodic cell, atoms with unknown elements, dropped samples.
pub(crate) fn warn(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}
