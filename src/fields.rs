//! Enumerations and field types for the task board.
//!
//! This module defines the closed sets used to categorise tasks and project
//! members: board status columns, priority levels, and membership roles.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Board column a task currently sits in.
///
/// The variant order here is the left-to-right column order of the board.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[serde(alias = "Todo", alias = "To Do")]
    Todo,
    #[serde(alias = "InProgress", alias = "In Progress")]
    InProgress,
    #[serde(alias = "Review")]
    Review,
    #[serde(alias = "Done")]
    Done,
}

impl Status {
    /// All columns in board display order.
    pub const ALL: [Status; 4] = [
        Status::Todo,
        Status::InProgress,
        Status::Review,
        Status::Done,
    ];
}

/// Priority classification for task importance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Project membership role. Admin and Member may mutate the board;
/// Viewer is read-only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    Member,
    Viewer,
}

impl Role {
    /// Whether this role is allowed write actions on the board.
    pub fn can_edit(self) -> bool {
        matches!(self, Role::Admin | Role::Member)
    }
}
