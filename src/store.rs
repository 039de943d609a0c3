//! Workspace store and display helpers.
//!
//! The `Store` owns every project's task collection; all reads and writes to
//! task fields go through it. It is an explicit value owned by the session
//! (loaded in `main`, injected into the board controller), never a global.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::fields::*;
use crate::project::{ChatMessage, Project, User};
use crate::task::{SubTask, Task};

/// In-memory workspace: users plus projects with their tasks and chat logs.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Store {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
}

/// Caller-supplied fields for a new task. Identity, status, and order are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub assignee_id: Option<String>,
    pub due: Option<NaiveDate>,
    pub subtask_titles: Vec<String>,
    pub dependencies: Vec<String>,
}

impl Store {
    /// Load the workspace from a JSON file, seeding the demo workspace if the
    /// file doesn't exist or can't be parsed.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Store::seeded();
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("Error parsing workspace, starting from demo data: {e}");
                    Store::seeded()
                }
            },
            Err(e) => {
                eprintln!("Error reading workspace, starting from demo data: {e}");
                Store::seeded()
            }
        }
    }

    /// Save the workspace to a JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        // Atomic-ish write via temp + rename.
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Get a user by id.
    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    /// Get a project by id.
    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    /// Get a mutable reference to a project by id.
    pub fn project_mut(&mut self, project_id: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == project_id)
    }

    /// Full task list for a project, in storage order. Callers re-sort by
    /// column `order` for display.
    pub fn get_tasks(&self, project_id: &str) -> Result<&[Task], BoardError> {
        self.project(project_id)
            .map(|p| p.tasks.as_slice())
            .ok_or_else(|| BoardError::ProjectNotFound(project_id.to_string()))
    }

    /// Create a task in the Todo column of the given project.
    ///
    /// Assigns a fresh id and `order` one past the current Todo maximum
    /// (0 for an empty column).
    pub fn create_task(&mut self, project_id: &str, data: NewTask) -> Result<Task, BoardError> {
        let task_id = next_id(
            self.project(project_id)
                .ok_or_else(|| BoardError::ProjectNotFound(project_id.to_string()))?
                .tasks
                .iter()
                .map(|t| t.id.as_str()),
            "t",
        );
        let now_utc = Utc::now().timestamp();
        let subtasks = data
            .subtask_titles
            .into_iter()
            .enumerate()
            .map(|(i, title)| SubTask {
                id: format!("{task_id}-st{}", i + 1),
                title,
                completed: false,
            })
            .collect();

        let project = self
            .project_mut(project_id)
            .ok_or_else(|| BoardError::ProjectNotFound(project_id.to_string()))?;
        let order = project
            .tasks
            .iter()
            .filter(|t| t.status == Status::Todo)
            .map(|t| t.order)
            .max()
            .map_or(0, |m| m + 1);

        let task = Task {
            id: task_id,
            title: data.title,
            description: data.description,
            status: Status::Todo,
            priority: data.priority,
            assignee_id: data.assignee_id,
            due: data.due,
            subtasks,
            dependencies: data.dependencies,
            order,
            comments: Vec::new(),
            created_at_utc: now_utc,
            updated_at_utc: now_utc,
        };
        project.tasks.push(task.clone());
        Ok(task)
    }

    /// Replace the stored task matching `task.id`. Errors if the id is absent.
    ///
    /// Does not validate ordering or dependency invariants; callers run the
    /// resolver and ordering engine first.
    pub fn update_task(&mut self, project_id: &str, mut task: Task) -> Result<(), BoardError> {
        let project = self
            .project_mut(project_id)
            .ok_or_else(|| BoardError::ProjectNotFound(project_id.to_string()))?;
        let slot = project
            .task_mut(&task.id)
            .ok_or_else(|| BoardError::TaskNotFound(task.id.clone()))?;
        task.updated_at_utc = Utc::now().timestamp();
        *slot = task;
        Ok(())
    }

    /// Batch-apply updated tasks, matched by id. All ids are checked before
    /// any write, so a bad batch leaves the project untouched.
    pub fn replace_many(&mut self, project_id: &str, tasks: Vec<Task>) -> Result<(), BoardError> {
        let project = self
            .project_mut(project_id)
            .ok_or_else(|| BoardError::ProjectNotFound(project_id.to_string()))?;
        for task in &tasks {
            if !project.tasks.iter().any(|t| t.id == task.id) {
                return Err(BoardError::TaskNotFound(task.id.clone()));
            }
        }
        let now_utc = Utc::now().timestamp();
        for mut task in tasks {
            task.updated_at_utc = now_utc;
            let slot = project
                .tasks
                .iter_mut()
                .find(|t| t.id == task.id)
                .expect("id checked above");
            *slot = task;
        }
        Ok(())
    }

    /// Append a chat message to a project's log.
    pub fn append_chat(
        &mut self,
        project_id: &str,
        user_id: &str,
        content: String,
    ) -> Result<ChatMessage, BoardError> {
        if self.user(user_id).is_none() {
            return Err(BoardError::UserNotFound(user_id.to_string()));
        }
        let project = self
            .project_mut(project_id)
            .ok_or_else(|| BoardError::ProjectNotFound(project_id.to_string()))?;
        let id = next_id(project.chat.iter().map(|m| m.id.as_str()), "m");
        let message = ChatMessage {
            id,
            user_id: user_id.to_string(),
            content,
            timestamp_utc: Utc::now().timestamp(),
        };
        project.chat.push(message.clone());
        Ok(message)
    }

    /// Demo workspace: two projects, three users, a seeded dependency chain.
    pub fn seeded() -> Self {
        let now_utc = Utc::now().timestamp();
        let users = vec![
            User {
                id: "u1".into(),
                name: "Alex Rivera".into(),
                email: "alex@example.com".into(),
            },
            User {
                id: "u2".into(),
                name: "Sarah Chen".into(),
                email: "sarah@example.com".into(),
            },
            User {
                id: "u3".into(),
                name: "Mike Johnson".into(),
                email: "mike@example.com".into(),
            },
        ];

        let mk_task = |id: &str,
                       title: &str,
                       description: &str,
                       status: Status,
                       priority: Priority,
                       assignee: &str,
                       due: (i32, u32, u32),
                       deps: &[&str],
                       order: i64| Task {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            status,
            priority,
            assignee_id: Some(assignee.into()),
            due: NaiveDate::from_ymd_opt(due.0, due.1, due.2),
            subtasks: Vec::new(),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
            order,
            comments: Vec::new(),
            created_at_utc: now_utc,
            updated_at_utc: now_utc,
        };

        let mut t1 = mk_task(
            "t1",
            "Design Homepage Mockups",
            "Create high-fidelity mockups for the new homepage using Figma.",
            Status::Done,
            Priority::High,
            "u1",
            (2023, 11, 15),
            &[],
            0,
        );
        t1.subtasks = vec![
            SubTask {
                id: "st1".into(),
                title: "Hero section".into(),
                completed: true,
            },
            SubTask {
                id: "st2".into(),
                title: "Footer".into(),
                completed: true,
            },
        ];

        let projects = vec![
            Project {
                id: "p1".into(),
                name: "Website Redesign".into(),
                description: "Overhaul the corporate website with new branding.".into(),
                member_ids: vec!["u1".into(), "u2".into(), "u3".into()],
                roles: [
                    ("u1".to_string(), Role::Admin),
                    ("u2".to_string(), Role::Member),
                    ("u3".to_string(), Role::Viewer),
                ]
                .into_iter()
                .collect(),
                created_at_utc: now_utc,
                tasks: vec![
                    t1,
                    mk_task(
                        "t2",
                        "Setup CI/CD Pipeline",
                        "Configure GitHub Actions for automated deployment.",
                        Status::Todo,
                        Priority::Medium,
                        "u2",
                        (2023, 11, 20),
                        &[],
                        0,
                    ),
                    mk_task(
                        "t3",
                        "Frontend Implementation",
                        "Implement the homepage design in React.",
                        Status::Todo,
                        Priority::High,
                        "u2",
                        (2023, 11, 25),
                        &["t1"],
                        1,
                    ),
                    mk_task(
                        "t4",
                        "User Acceptance Testing",
                        "Coordinate with QA team for UAT round 1.",
                        Status::Todo,
                        Priority::High,
                        "u3",
                        (2023, 12, 1),
                        &["t3"],
                        2,
                    ),
                ],
                chat: vec![
                    ChatMessage {
                        id: "m1".into(),
                        user_id: "u2".into(),
                        content: "Hey team, just finished the initial wireframes!".into(),
                        timestamp_utc: now_utc - 86_400,
                    },
                    ChatMessage {
                        id: "m2".into(),
                        user_id: "u1".into(),
                        content: "Great work Sarah! I will review them this afternoon.".into(),
                        timestamp_utc: now_utc - 82_800,
                    },
                ],
            },
            Project {
                id: "p2".into(),
                name: "Mobile App Launch".into(),
                description: "Launch the iOS and Android applications.".into(),
                member_ids: vec!["u1".into(), "u2".into()],
                roles: [
                    ("u1".to_string(), Role::Admin),
                    ("u2".to_string(), Role::Member),
                ]
                .into_iter()
                .collect(),
                created_at_utc: now_utc,
                tasks: Vec::new(),
                chat: Vec::new(),
            },
        ];

        Store { users, projects }
    }
}

/// Generate the next id with the given prefix, one past the highest numeric
/// tail among existing ids ("t4" -> "t5").
fn next_id<'a>(existing: impl Iterator<Item = &'a str>, prefix: &str) -> String {
    let max = existing
        .filter_map(|id| id.trim_start_matches(|c: char| !c.is_ascii_digit()).parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("{prefix}{}", max + 1)
}

/// Format a status for display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Todo => "To Do",
        Status::InProgress => "In Progress",
        Status::Review => "Review",
        Status::Done => "Done",
    }
}

/// Format a priority for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
    }
}

/// Format a role for display.
pub fn format_role(r: Role) -> &'static str {
    match r {
        Role::Admin => "Admin",
        Role::Member => "Member",
        Role::Viewer => "Viewer",
    }
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = d - today;
            if delta.num_days() == 0 {
                "today".into()
            } else if delta.num_days() == 1 {
                "tomorrow".into()
            } else if delta.num_days() > 1 {
                format!("in {}d", delta.num_days())
            } else {
                format!("{}d late", -delta.num_days())
            }
        }
    }
}

/// Today's date in local time, for due formatting at the display layer.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.into(),
            description: String::new(),
            priority: Priority::Medium,
            assignee_id: None,
            due: None,
            subtask_titles: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    #[test]
    fn test_seeded_workspace_shape() {
        let store = Store::seeded();
        assert_eq!(store.users.len(), 3);
        assert_eq!(store.projects.len(), 2);
        let p1 = store.project("p1").unwrap();
        assert_eq!(p1.tasks.len(), 4);
        assert_eq!(p1.role_of("u1"), Some(Role::Admin));
        assert_eq!(p1.role_of("u3"), Some(Role::Viewer));
        assert_eq!(p1.task("t3").unwrap().dependencies, vec!["t1".to_string()]);
    }

    #[test]
    fn test_create_task_assigns_next_todo_order() {
        let mut store = Store::seeded();
        // Seeded Todo column on p1 holds t2/t3/t4 with orders 0..=2.
        let task = store.create_task("p1", new_task("Write launch notes")).unwrap();
        assert_eq!(task.status, Status::Todo);
        assert_eq!(task.order, 3);
        assert_eq!(task.id, "t5");
    }

    #[test]
    fn test_create_task_in_empty_column_starts_at_zero() {
        let mut store = Store::seeded();
        let task = store.create_task("p2", new_task("Kickoff")).unwrap();
        assert_eq!(task.order, 0);
        assert_eq!(task.id, "t1");
    }

    #[test]
    fn test_create_task_unknown_project() {
        let mut store = Store::seeded();
        let err = store.create_task("p9", new_task("x")).unwrap_err();
        assert_eq!(err, BoardError::ProjectNotFound("p9".into()));
    }

    #[test]
    fn test_update_task_unknown_id_is_an_error() {
        let mut store = Store::seeded();
        let mut ghost = store.project("p1").unwrap().task("t1").unwrap().clone();
        ghost.id = "t99".into();
        assert_eq!(
            store.update_task("p1", ghost).unwrap_err(),
            BoardError::TaskNotFound("t99".into())
        );
    }

    #[test]
    fn test_replace_many_is_all_or_nothing() {
        let mut store = Store::seeded();
        let mut good = store.project("p1").unwrap().task("t2").unwrap().clone();
        good.title = "renamed".into();
        let mut ghost = good.clone();
        ghost.id = "t42".into();

        let err = store.replace_many("p1", vec![good, ghost]).unwrap_err();
        assert_eq!(err, BoardError::TaskNotFound("t42".into()));
        // The good task must not have been written.
        assert_eq!(store.project("p1").unwrap().task("t2").unwrap().title, "Setup CI/CD Pipeline");
    }

    #[test]
    fn test_append_chat_allocates_ids() {
        let mut store = Store::seeded();
        let msg = store.append_chat("p1", "u3", "standup in 5".into()).unwrap();
        assert_eq!(msg.id, "m3");
        assert_eq!(store.project("p1").unwrap().chat.len(), 3);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");

        let mut store = Store::seeded();
        store.create_task("p2", new_task("Ship beta")).unwrap();
        store.save(&path).unwrap();

        let reloaded = Store::load(&path);
        assert_eq!(reloaded.projects.len(), 2);
        assert_eq!(reloaded.project("p2").unwrap().tasks.len(), 1);
        assert_eq!(reloaded.project("p2").unwrap().tasks[0].title, "Ship beta");
    }

    #[test]
    fn test_load_missing_file_seeds_demo_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::load(&dir.path().join("nope.json"));
        assert_eq!(store.projects.len(), 2);
    }

    #[test]
    fn test_format_due_relative() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(format_due_relative(Some(today), today), "today");
        assert_eq!(
            format_due_relative(NaiveDate::from_ymd_opt(2024, 3, 13), today),
            "in 3d"
        );
        assert_eq!(
            format_due_relative(NaiveDate::from_ymd_opt(2024, 3, 8), today),
            "2d late"
        );
        assert_eq!(format_due_relative(None, today), "-");
    }
}
