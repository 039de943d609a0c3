//! Assistant boundary: subtask suggestions and notification drafts.
//!
//! The board treats text generation as an opaque collaborator. This module
//! defines that boundary and ships the deterministic template implementation
//! the board falls back to when no generative backend is wired in; it is the
//! only behaviour the core guarantees, and it needs no network.

use crate::project::User;
use crate::store::format_status;
use crate::task::Task;

/// A drafted email notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub subject: String,
    pub body: String,
}

/// Text-generation collaborator. Both methods are best-effort; suggestion
/// may return nothing and drafting must always produce something.
pub trait Assistant {
    /// Suggest concrete subtask titles for a task being created. May return
    /// an empty list.
    fn suggest_subtasks(&self, title: &str, description: &str) -> Vec<String>;

    /// Draft a status-update email from `sender` to `assignee` about `task`.
    fn draft_notification(&self, task: &Task, assignee: &User, sender: &User) -> NotificationDraft;
}

/// The no-backend implementation: fixed-format drafts built purely from the
/// task and user fields, and sentence-split subtask suggestions.
#[derive(Debug, Default)]
pub struct TemplateAssistant;

impl Assistant for TemplateAssistant {
    fn suggest_subtasks(&self, _title: &str, description: &str) -> Vec<String> {
        description
            .split(['.', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(5)
            .map(str::to_string)
            .collect()
    }

    fn draft_notification(&self, task: &Task, assignee: &User, sender: &User) -> NotificationDraft {
        NotificationDraft {
            subject: format!("Update regarding task: {}", task.title),
            body: format!(
                "Hi {},\n\nJust wanted to give you a quick update on \"{}\". \
                 It is currently {}. Please check the board for details.\n\nBest,\n{}",
                assignee.name,
                task.title,
                format_status(task.status),
                sender.name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Priority, Status};

    fn user(id: &str, name: &str) -> User {
        User {
            id: id.into(),
            name: name.into(),
            email: format!("{id}@example.com"),
        }
    }

    fn task(title: &str, status: Status) -> Task {
        Task {
            id: "t7".into(),
            title: title.into(),
            description: String::new(),
            status,
            priority: Priority::High,
            assignee_id: Some("u2".into()),
            due: None,
            subtasks: Vec::new(),
            dependencies: Vec::new(),
            order: 0,
            comments: Vec::new(),
            created_at_utc: 0,
            updated_at_utc: 0,
        }
    }

    #[test]
    fn test_fallback_draft_format() {
        // The fallback draft names the assignee, title, and current status.
        let draft = TemplateAssistant.draft_notification(
            &task("Frontend Implementation", Status::InProgress),
            &user("u2", "Sarah Chen"),
            &user("u1", "Alex Rivera"),
        );
        assert_eq!(draft.subject, "Update regarding task: Frontend Implementation");
        assert!(draft.body.contains("Hi Sarah Chen,"));
        assert!(draft.body.contains("\"Frontend Implementation\""));
        assert!(draft.body.contains("currently In Progress"));
        assert!(draft.body.ends_with("Best,\nAlex Rivera"));
    }

    #[test]
    fn test_subtask_suggestion_splits_sentences() {
        let suggestions = TemplateAssistant.suggest_subtasks(
            "Setup CI",
            "Pin the runner image. Cache the registry; add a smoke test.",
        );
        assert_eq!(
            suggestions,
            vec!["Pin the runner image", "Cache the registry", "add a smoke test"]
        );
    }

    #[test]
    fn test_subtask_suggestion_may_be_empty() {
        assert!(TemplateAssistant.suggest_subtasks("Setup CI", "").is_empty());
    }
}
