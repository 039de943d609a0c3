//! Board controller.
//!
//! Orchestrates create/move/reorder intents into single consistent updates.
//! Role permission is checked before any store call, the dependency gate is
//! checked for every destination except Todo, and the full new column state
//! is computed before `replace_many` persists it, so each operation is
//! all-or-nothing against the in-memory store.

use chrono::NaiveDate;

use crate::deps;
use crate::error::BoardError;
use crate::fields::{Priority, Status};
use crate::ordering;
use crate::store::{format_role, NewTask, Store};
use crate::task::{Comment, SubTask, Task};

/// A drag-and-drop move, expressed as a discrete intent.
#[derive(Debug, Clone)]
pub struct MoveIntent {
    pub task_id: String,
    pub source: Status,
    pub source_index: usize,
    pub dest: Status,
    pub dest_index: usize,
}

/// Field edits for an existing task. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<String>,
    pub clear_assignee: bool,
    pub due: Option<NaiveDate>,
    pub clear_due: bool,
    pub add_dependencies: Vec<String>,
    pub rm_dependencies: Vec<String>,
}

/// The board façade. Borrows the session's store for the duration of one
/// user action; tests instantiate isolated stores and controllers freely.
pub struct Board<'a> {
    store: &'a mut Store,
}

impl<'a> Board<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Board { store }
    }

    /// The board view: every column in display order with its tasks sorted
    /// by `order`.
    pub fn view(&self, project_id: &str) -> Result<Vec<(Status, Vec<Task>)>, BoardError> {
        let tasks = self.store.get_tasks(project_id)?;
        Ok(Status::ALL
            .iter()
            .map(|&status| {
                (
                    status,
                    ordering::column(tasks, status)
                        .into_iter()
                        .cloned()
                        .collect(),
                )
            })
            .collect())
    }

    /// Create a task in the project's Todo column.
    pub fn create_task(
        &mut self,
        project_id: &str,
        actor_id: &str,
        data: NewTask,
    ) -> Result<Task, BoardError> {
        self.check_can_edit(project_id, actor_id)?;
        // Unknown dependency ids are tolerated; the resolver ignores them.
        self.store.create_task(project_id, data)
    }

    /// Service a drag-and-drop intent.
    ///
    /// Same column and same index is a no-op; same column delegates to the
    /// within-column reorder; a cross-column move must pass the dependency
    /// gate first. Rejections leave the board unchanged.
    pub fn move_task(
        &mut self,
        project_id: &str,
        actor_id: &str,
        intent: &MoveIntent,
    ) -> Result<(), BoardError> {
        self.check_can_edit(project_id, actor_id)?;
        let tasks = self.store.get_tasks(project_id)?;
        if tasks.iter().all(|t| t.id != intent.task_id) {
            return Err(BoardError::TaskNotFound(intent.task_id.clone()));
        }

        if intent.source == intent.dest {
            if intent.source_index == intent.dest_index {
                return Ok(());
            }
            let updated = ordering::reorder_within_column(
                tasks,
                intent.source,
                intent.source_index,
                intent.dest_index,
            );
            return self.store.replace_many(project_id, updated);
        }

        self.gate_transition(tasks, &intent.task_id, intent.dest)?;
        let updated =
            ordering::move_across_columns(tasks, &intent.task_id, intent.dest, intent.dest_index)?;
        self.store.replace_many(project_id, updated)
    }

    /// Explicit status change; the task lands at the end of the target column.
    pub fn change_status(
        &mut self,
        project_id: &str,
        actor_id: &str,
        task_id: &str,
        target: Status,
    ) -> Result<(), BoardError> {
        self.check_can_edit(project_id, actor_id)?;
        let tasks = self.store.get_tasks(project_id)?;
        self.gate_transition(tasks, task_id, target)?;
        let end = ordering::column(tasks, target).len();
        let updated = ordering::move_across_columns(tasks, task_id, target, end)?;
        self.store.replace_many(project_id, updated)
    }

    /// Apply field edits to a task. Dependency edits reject self-reference.
    pub fn edit_task(
        &mut self,
        project_id: &str,
        actor_id: &str,
        task_id: &str,
        patch: TaskPatch,
    ) -> Result<Task, BoardError> {
        self.check_can_edit(project_id, actor_id)?;
        let mut task = self.get_task(project_id, task_id)?.clone();

        if patch.add_dependencies.iter().any(|d| d == task_id) {
            return Err(BoardError::SelfDependency);
        }
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if patch.clear_assignee {
            task.assignee_id = None;
        } else if let Some(assignee_id) = patch.assignee_id {
            task.assignee_id = Some(assignee_id);
        }
        if patch.clear_due {
            task.due = None;
        } else if let Some(due) = patch.due {
            task.due = Some(due);
        }
        for dep in patch.add_dependencies {
            if !task.dependencies.contains(&dep) {
                task.dependencies.push(dep);
            }
        }
        task.dependencies.retain(|d| !patch.rm_dependencies.contains(d));

        self.store.update_task(project_id, task.clone())?;
        Ok(task)
    }

    /// Append a comment to a task, attributed to the actor.
    pub fn add_comment(
        &mut self,
        project_id: &str,
        actor_id: &str,
        task_id: &str,
        content: String,
    ) -> Result<(), BoardError> {
        self.check_can_edit(project_id, actor_id)?;
        let mut task = self.get_task(project_id, task_id)?.clone();
        let id = format!("{task_id}-c{}", task.comments.len() + 1);
        task.comments.push(Comment {
            id,
            user_id: actor_id.to_string(),
            content,
            timestamp_utc: chrono::Utc::now().timestamp(),
        });
        self.store.update_task(project_id, task)
    }

    /// Append a subtask with the given title.
    pub fn add_subtask(
        &mut self,
        project_id: &str,
        actor_id: &str,
        task_id: &str,
        title: String,
    ) -> Result<(), BoardError> {
        self.check_can_edit(project_id, actor_id)?;
        let mut task = self.get_task(project_id, task_id)?.clone();
        let id = format!("{task_id}-st{}", task.subtasks.len() + 1);
        task.subtasks.push(SubTask {
            id,
            title,
            completed: false,
        });
        self.store.update_task(project_id, task)
    }

    /// Flip a subtask's completed flag, matched by its id.
    pub fn toggle_subtask(
        &mut self,
        project_id: &str,
        actor_id: &str,
        task_id: &str,
        subtask_id: &str,
    ) -> Result<(), BoardError> {
        self.check_can_edit(project_id, actor_id)?;
        let mut task = self.get_task(project_id, task_id)?.clone();
        let subtask = task
            .subtasks
            .iter_mut()
            .find(|s| s.id == subtask_id)
            .ok_or_else(|| BoardError::TaskNotFound(subtask_id.to_string()))?;
        subtask.completed = !subtask.completed;
        self.store.update_task(project_id, task)
    }

    fn get_task(&self, project_id: &str, task_id: &str) -> Result<&Task, BoardError> {
        self.store
            .get_tasks(project_id)?
            .iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))
    }

    fn gate_transition(
        &self,
        tasks: &[Task],
        task_id: &str,
        target: Status,
    ) -> Result<(), BoardError> {
        let task = tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))?;
        if !deps::can_transition(task, target, tasks) {
            return Err(BoardError::DependencyBlocked {
                titles: deps::blocking_titles(task, tasks),
            });
        }
        Ok(())
    }

    fn check_can_edit(&self, project_id: &str, actor_id: &str) -> Result<(), BoardError> {
        if self.store.user(actor_id).is_none() {
            return Err(BoardError::UserNotFound(actor_id.to_string()));
        }
        let project = self
            .store
            .project(project_id)
            .ok_or_else(|| BoardError::ProjectNotFound(project_id.to_string()))?;
        match project.role_of(actor_id) {
            Some(role) if role.can_edit() => Ok(()),
            Some(role) => Err(BoardError::PermissionDenied {
                user: actor_id.to_string(),
                role: format_role(role).to_string(),
            }),
            None => Err(BoardError::PermissionDenied {
                user: actor_id.to_string(),
                role: "non-member".to_string(),
            }),
        }
    }
}
