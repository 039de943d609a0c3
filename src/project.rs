//! Project, member, and chat data structures.
//!
//! A project owns its task collection, its member list with per-user roles,
//! and an independent append-only chat log.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fields::Role;
use crate::task::Task;

/// A workspace member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl User {
    /// First name, used for casual greetings in the stats view.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// A message in a project's chat log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub timestamp_utc: i64,
}

/// A project: task collection, membership with roles, and chat log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
    /// Map from user id to that user's role on this project.
    #[serde(default)]
    pub roles: BTreeMap<String, Role>,
    pub created_at_utc: i64,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub chat: Vec<ChatMessage>,
}

impl Project {
    /// Role of the given user on this project, if they are a member.
    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        self.roles.get(user_id).copied()
    }

    /// Get a task by id.
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Get a mutable reference to a task by id.
    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_name() {
        let u = User {
            id: "u9".into(),
            name: "Alex Rivera".into(),
            email: "alex@example.com".into(),
        };
        assert_eq!(u.first_name(), "Alex");
    }
}
