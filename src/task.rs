//! Task data structures.
//!
//! This module defines the core `Task` struct that represents a single card
//! on the board, plus its owned subtasks and comments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// A single checklist item belonging to a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTask {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

/// A comment on a task, attributed to a project member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub timestamp_utc: i64,
}

/// A card on the board.
///
/// `order` gives the task's position within its status column; the ordering
/// engine keeps it a dense 0-based sequence per column. `dependencies` holds
/// ids of tasks that must reach Done before this one may leave Todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub assignee_id: Option<String>,
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub subtasks: Vec<SubTask>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub order: i64,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at_utc: i64,
    pub updated_at_utc: i64,
}

impl Task {
    /// Completed/total subtask counts for progress display.
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        (done, self.subtasks.len())
    }
}
