//! Color constants for the terminal user interface.

use ratatui::style::Color;

// Column accents, one per board status.

/// To Do
pub const SLATE: Color = Color::Rgb(148, 163, 184);
/// In Progress
pub const NAVY: Color = Color::Rgb(0, 40, 85);
/// Review
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Done
pub const DARK_GREEN: Color = Color::Rgb(0, 100, 0);
/// Blocked-card warnings
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
