//! Dependency resolver.
//!
//! Pure functions over a task and its project's task set. A task is blocked
//! while any of its dependencies resolves to a task that is not Done;
//! dependency ids that resolve to nothing are ignored. This is the single
//! gate for status changes, used by explicit moves and drag-drop alike.

use crate::fields::Status;
use crate::task::Task;

/// Result of a blocking check: whether the task is gated, and by whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyStatus {
    pub blocked: bool,
    pub blocking_task_ids: Vec<String>,
}

/// Check whether `task` is currently blocked by incomplete dependencies.
pub fn is_blocked(task: &Task, all_tasks: &[Task]) -> DependencyStatus {
    let blocking_task_ids: Vec<String> = task
        .dependencies
        .iter()
        .filter(|dep_id| {
            all_tasks
                .iter()
                .any(|t| &t.id == *dep_id && t.status != Status::Done)
        })
        .cloned()
        .collect();
    DependencyStatus {
        blocked: !blocking_task_ids.is_empty(),
        blocking_task_ids,
    }
}

/// Whether `task` may move to `target`. Todo is always reachable; every
/// other column requires all dependencies Done.
pub fn can_transition(task: &Task, target: Status, all_tasks: &[Task]) -> bool {
    if target == Status::Todo {
        return true;
    }
    !is_blocked(task, all_tasks).blocked
}

/// Titles of the tasks currently blocking `task`, for rejection messages.
pub fn blocking_titles(task: &Task, all_tasks: &[Task]) -> Vec<String> {
    is_blocked(task, all_tasks)
        .blocking_task_ids
        .iter()
        .filter_map(|id| all_tasks.iter().find(|t| &t.id == id))
        .map(|t| t.title.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;

    fn task(id: &str, title: &str, status: Status, deps: &[&str]) -> Task {
        Task {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status,
            priority: Priority::Medium,
            assignee_id: None,
            due: None,
            subtasks: Vec::new(),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
            order: 0,
            comments: Vec::new(),
            created_at_utc: 0,
            updated_at_utc: 0,
        }
    }

    #[test]
    fn test_no_dependencies_is_never_blocked() {
        let tasks = vec![task("t1", "A", Status::Todo, &[])];
        let status = is_blocked(&tasks[0], &tasks);
        assert!(!status.blocked);
        assert!(status.blocking_task_ids.is_empty());
    }

    #[test]
    fn test_done_dependency_does_not_block() {
        let tasks = vec![
            task("t1", "Design", Status::Done, &[]),
            task("t3", "Implement", Status::Todo, &["t1"]),
        ];
        assert!(!is_blocked(&tasks[1], &tasks).blocked);
        assert!(can_transition(&tasks[1], Status::InProgress, &tasks));
    }

    #[test]
    fn test_incomplete_dependency_blocks() {
        let tasks = vec![
            task("t1", "Design", Status::Todo, &[]),
            task("t3", "Implement", Status::Todo, &["t1"]),
        ];
        let status = is_blocked(&tasks[1], &tasks);
        assert!(status.blocked);
        assert_eq!(status.blocking_task_ids, vec!["t1".to_string()]);
        assert!(!can_transition(&tasks[1], Status::InProgress, &tasks));
        assert_eq!(blocking_titles(&tasks[1], &tasks), vec!["Design".to_string()]);
    }

    #[test]
    fn test_todo_is_always_reachable() {
        let tasks = vec![
            task("t1", "Design", Status::InProgress, &[]),
            task("t3", "Implement", Status::Review, &["t1"]),
        ];
        assert!(can_transition(&tasks[1], Status::Todo, &tasks));
    }

    #[test]
    fn test_dangling_dependency_is_ignored() {
        let tasks = vec![task("t3", "Implement", Status::Todo, &["t99"])];
        assert!(!is_blocked(&tasks[0], &tasks).blocked);
        assert!(can_transition(&tasks[0], Status::Done, &tasks));
    }

    #[test]
    fn test_review_dependency_still_blocks() {
        // Anything short of Done gates the dependent.
        let tasks = vec![
            task("t1", "Design", Status::Review, &[]),
            task("t3", "Implement", Status::Todo, &["t1"]),
        ];
        assert!(is_blocked(&tasks[1], &tasks).blocked);
    }

    #[test]
    fn test_cyclic_dependencies_stay_gated() {
        // No cycle detection: both tasks simply remain unable to leave Todo.
        let tasks = vec![
            task("t1", "A", Status::Todo, &["t2"]),
            task("t2", "B", Status::Todo, &["t1"]),
        ];
        assert!(!can_transition(&tasks[0], Status::InProgress, &tasks));
        assert!(!can_transition(&tasks[1], Status::InProgress, &tasks));
        assert!(can_transition(&tasks[0], Status::Todo, &tasks));
    }

    #[test]
    fn test_multiple_blockers_reported_in_dependency_order() {
        let tasks = vec![
            task("t1", "Design", Status::Todo, &[]),
            task("t2", "Pipeline", Status::InProgress, &[]),
            task("t5", "Launch", Status::Todo, &["t1", "t2", "t9"]),
        ];
        let status = is_blocked(&tasks[2], &tasks);
        assert_eq!(
            status.blocking_task_ids,
            vec!["t1".to_string(), "t2".to_string()]
        );
        assert_eq!(
            blocking_titles(&tasks[2], &tasks),
            vec!["Design".to_string(), "Pipeline".to_string()]
        );
    }
}
