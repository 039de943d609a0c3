//! Command implementations for the CLI interface.
//!
//! This module contains the command handlers behind each subcommand, from
//! board mutations through to the chat log, stats summary, and the TUI
//! launcher. Handlers render errors on stderr and exit non-zero; the board
//! core itself never prints.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use std::path::Path;

use chrono::{Duration, NaiveDate};

use crate::board::{Board, MoveIntent, TaskPatch};
use crate::deps;
use crate::draft::{Assistant, TemplateAssistant};
use crate::error::BoardError;
use crate::fields::*;
use crate::ordering;
use crate::store::*;
use crate::task::Task;
use crate::tui::run::run_board_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive kanban board.
    Ui,

    /// Print the board, one section per status column.
    Board,

    /// Add a new task to the To Do column.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Priority: low | medium | high.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Assignee user id.
        #[arg(long)]
        assignee: Option<String>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        due: Option<String>,
        /// Dependency task id. May be repeated.
        #[arg(long = "dep")]
        deps: Vec<String>,
        /// Subtask title. May be repeated.
        #[arg(long = "subtask")]
        subtasks: Vec<String>,
        /// Derive subtasks from the description automatically.
        #[arg(long)]
        breakdown: bool,
    },

    /// Move a task to another status column.
    Mv {
        /// Task id to move.
        task: String,
        /// Destination column: todo | in-progress | review | done.
        #[arg(value_enum)]
        status: Status,
        /// Position within the destination column (default: end).
        #[arg(long)]
        at: Option<usize>,
    },

    /// Reorder a column: move the card at one position to another.
    Reorder {
        /// Column: todo | in-progress | review | done.
        #[arg(value_enum)]
        status: Status,
        /// Current position of the card (0-based).
        from: usize,
        /// Target position.
        to: usize,
    },

    /// View a single task in detail.
    View {
        /// Task id to view.
        task: String,
    },

    /// Update fields on a task.
    Update {
        /// Task id to update.
        task: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Assignee user id.
        #[arg(long)]
        assignee: Option<String>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        due: Option<String>,
        /// Add a dependency. May be repeated.
        #[arg(long = "add-dep")]
        add_deps: Vec<String>,
        /// Remove a dependency. May be repeated.
        #[arg(long = "rm-dep")]
        rm_deps: Vec<String>,
        /// Clear the due date.
        #[arg(long)]
        clear_due: bool,
        /// Clear the assignee.
        #[arg(long)]
        clear_assignee: bool,
    },

    /// Comment on a task.
    Comment {
        /// Task id to comment on.
        task: String,
        /// Comment text.
        text: String,
    },

    /// Manage a task's subtasks.
    Subtask {
        #[command(subcommand)]
        action: SubtaskAction,
    },

    /// Project chat log.
    Chat {
        #[command(subcommand)]
        action: ChatAction,
    },

    /// Draft a status-update email for a task's assignee.
    Notify {
        /// Task id to notify about.
        task: String,
    },

    /// List projects and your role on each.
    Projects,

    /// Workspace summary: totals per status and per-project progress.
    Stats,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SubtaskAction {
    /// Add a subtask to a task.
    Add {
        /// Parent task id.
        task: String,
        /// Subtask title.
        title: String,
    },
    /// Toggle a subtask's completed flag.
    Toggle {
        /// Parent task id.
        task: String,
        /// Subtask id.
        subtask: String,
    },
}

#[derive(Subcommand)]
pub enum ChatAction {
    /// Send a message to the project chat.
    Send {
        /// Message text.
        text: String,
    },
    /// Print the project chat log.
    Log,
}

fn bail(e: BoardError) -> ! {
    eprintln!("{e}");
    std::process::exit(1);
}

fn save_or_die(store: &Store, db_path: &Path) {
    if let Err(e) = store.save(db_path) {
        eprintln!("Failed to save workspace: {e}");
        std::process::exit(1);
    }
}

/// Parse simple due date input: "today", "tomorrow", "in Nd", or YYYY-MM-DD.
pub fn parse_due_input(s: &str) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    let today = today();
    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        _ => {}
    }
    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return Some(today + Duration::days(days));
            }
        }
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Launch the kanban TUI for a project.
pub fn cmd_ui(db_path: &Path, project_id: &str, user_id: &str) {
    if let Err(e) = run_board_tui(db_path, project_id, user_id) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Print the board, one section per status column in display order.
pub fn cmd_board(store: &mut Store, project_id: &str) {
    let project = match store.project(project_id) {
        Some(p) => p,
        None => bail(BoardError::ProjectNotFound(project_id.into())),
    };
    println!("{} - {}", project.name, project.description);

    let view = match Board::new(store).view(project_id) {
        Ok(v) => v,
        Err(e) => bail(e),
    };
    let all_tasks = store.get_tasks(project_id).unwrap_or(&[]).to_vec();
    let now = today();
    for (status, tasks) in view {
        println!("\n{} ({})", format_status(status), tasks.len());
        for task in tasks {
            let assignee = task
                .assignee_id
                .as_deref()
                .and_then(|id| store.user(id))
                .map_or("-", |u| u.name.as_str());
            let blocked = deps::is_blocked(&task, &all_tasks).blocked;
            let marker = if blocked { "  [blocked]" } else { "" };
            let (done, total) = task.subtask_progress();
            let progress = if total > 0 {
                format!("  {done}/{total}")
            } else {
                String::new()
            };
            println!(
                "  {:>2}. {:<6} {:<8} {:<12} {:<14} {}{}{}",
                task.order,
                task.id,
                format_priority(task.priority),
                format_due_relative(task.due, now),
                truncate(assignee, 14),
                task.title,
                progress,
                marker
            );
        }
    }
}

/// Add a task to the To Do column.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    store: &mut Store,
    db_path: &Path,
    project_id: &str,
    user_id: &str,
    title: String,
    desc: Option<String>,
    priority: Priority,
    assignee: Option<String>,
    due: Option<String>,
    deps: Vec<String>,
    mut subtasks: Vec<String>,
    breakdown: bool,
) {
    let description = desc.unwrap_or_default();
    if breakdown && subtasks.is_empty() {
        subtasks = TemplateAssistant.suggest_subtasks(&title, &description);
    }
    let data = NewTask {
        title,
        description,
        priority,
        assignee_id: assignee,
        due: due.as_deref().and_then(parse_due_input),
        subtask_titles: subtasks,
        dependencies: deps,
    };
    let result = Board::new(store).create_task(project_id, user_id, data);
    match result {
        Ok(task) => {
            save_or_die(store, db_path);
            println!("Added task {} at position {} in To Do", task.id, task.order);
        }
        Err(e) => bail(e),
    }
}

/// Move a task to another column, through the dependency gate.
pub fn cmd_mv(
    store: &mut Store,
    db_path: &Path,
    project_id: &str,
    user_id: &str,
    task_id: String,
    status: Status,
    at: Option<usize>,
) {
    let result = match at {
        None => Board::new(store).change_status(project_id, user_id, &task_id, status),
        Some(dest_index) => {
            let (source, source_index) = match locate(store, project_id, &task_id) {
                Ok(loc) => loc,
                Err(e) => bail(e),
            };
            let intent = MoveIntent {
                task_id: task_id.clone(),
                source,
                source_index,
                dest: status,
                dest_index,
            };
            Board::new(store).move_task(project_id, user_id, &intent)
        }
    };
    match result {
        Ok(()) => {
            save_or_die(store, db_path);
            println!("Moved {} to {}", task_id, format_status(status));
        }
        Err(e) => {
            if let Some(titles) = e.blocking_titles() {
                eprintln!(
                    "Cannot move {}. Waiting for dependencies: {}",
                    task_id,
                    titles.join(", ")
                );
                std::process::exit(1);
            }
            bail(e)
        }
    }
}

/// Reorder a column by positions.
pub fn cmd_reorder(
    store: &mut Store,
    db_path: &Path,
    project_id: &str,
    user_id: &str,
    status: Status,
    from: usize,
    to: usize,
) {
    let task_id = {
        let tasks = match store.get_tasks(project_id) {
            Ok(t) => t,
            Err(e) => bail(e),
        };
        let col = ordering::column(tasks, status);
        match col.get(from.min(col.len().saturating_sub(1))) {
            Some(t) => t.id.clone(),
            None => {
                eprintln!("Column {} is empty", format_status(status));
                std::process::exit(1);
            }
        }
    };
    let intent = MoveIntent {
        task_id,
        source: status,
        source_index: from,
        dest: status,
        dest_index: to,
    };
    let result = Board::new(store).move_task(project_id, user_id, &intent);
    match result {
        Ok(()) => {
            save_or_die(store, db_path);
            println!("Reordered {} column", format_status(status));
        }
        Err(e) => bail(e),
    }
}

/// View a single task in detail.
pub fn cmd_view(store: &Store, project_id: &str, task_id: String) {
    let tasks = match store.get_tasks(project_id) {
        Ok(t) => t,
        Err(e) => bail(e),
    };
    let task = match tasks.iter().find(|t| t.id == task_id) {
        Some(t) => t,
        None => bail(BoardError::TaskNotFound(task_id)),
    };

    let assignee = task
        .assignee_id
        .as_deref()
        .and_then(|id| store.user(id))
        .map_or("-".to_string(), |u| u.name.clone());
    println!("Task {}: {}", task.id, task.title);
    println!("Status:    {}", format_status(task.status));
    println!("Priority:  {}", format_priority(task.priority));
    println!("Assignee:  {assignee}");
    println!("Due:       {}", format_due_relative(task.due, today()));
    println!("Order:     {} (within {})", task.order, format_status(task.status));

    let dep_status = deps::is_blocked(task, tasks);
    if task.dependencies.is_empty() {
        println!("Depends:   -");
    } else {
        println!("Depends:   {}", task.dependencies.join(", "));
        if dep_status.blocked {
            println!(
                "Blocked by: {}",
                deps::blocking_titles(task, tasks).join(", ")
            );
        } else {
            println!("Blocked by: none (all dependencies done)");
        }
    }

    if !task.description.is_empty() {
        println!("\n{}", task.description);
    }
    if !task.subtasks.is_empty() {
        println!("\nSubtasks:");
        for st in &task.subtasks {
            let tick = if st.completed { "x" } else { " " };
            println!("  [{tick}] {}  {}", st.id, st.title);
        }
    }
    if !task.comments.is_empty() {
        println!("\nComments:");
        for c in &task.comments {
            let author = store.user(&c.user_id).map_or("?", |u| u.name.as_str());
            println!("  {author}: {}", c.content);
        }
    }
}

/// Update fields on a task.
#[allow(clippy::too_many_arguments)]
pub fn cmd_update(
    store: &mut Store,
    db_path: &Path,
    project_id: &str,
    user_id: &str,
    task_id: String,
    title: Option<String>,
    desc: Option<String>,
    priority: Option<Priority>,
    assignee: Option<String>,
    due: Option<String>,
    add_deps: Vec<String>,
    rm_deps: Vec<String>,
    clear_due: bool,
    clear_assignee: bool,
) {
    let patch = TaskPatch {
        title,
        description: desc,
        priority,
        assignee_id: assignee,
        clear_assignee,
        due: due.as_deref().and_then(parse_due_input),
        clear_due,
        add_dependencies: add_deps,
        rm_dependencies: rm_deps,
    };
    let result = Board::new(store).edit_task(project_id, user_id, &task_id, patch);
    match result {
        Ok(_) => {
            save_or_die(store, db_path);
            println!("Updated {task_id}");
        }
        Err(e) => bail(e),
    }
}

/// Comment on a task.
pub fn cmd_comment(
    store: &mut Store,
    db_path: &Path,
    project_id: &str,
    user_id: &str,
    task_id: String,
    text: String,
) {
    let result = Board::new(store).add_comment(project_id, user_id, &task_id, text);
    match result {
        Ok(()) => {
            save_or_die(store, db_path);
            println!("Commented on {task_id}");
        }
        Err(e) => bail(e),
    }
}

/// Add or toggle subtasks.
pub fn cmd_subtask(
    store: &mut Store,
    db_path: &Path,
    project_id: &str,
    user_id: &str,
    action: SubtaskAction,
) {
    let result = match action {
        SubtaskAction::Add { task, title } => {
            Board::new(store).add_subtask(project_id, user_id, &task, title)
        }
        SubtaskAction::Toggle { task, subtask } => {
            Board::new(store).toggle_subtask(project_id, user_id, &task, &subtask)
        }
    };
    match result {
        Ok(()) => save_or_die(store, db_path),
        Err(e) => bail(e),
    }
}

/// Send to or print the project chat log.
pub fn cmd_chat(
    store: &mut Store,
    db_path: &Path,
    project_id: &str,
    user_id: &str,
    action: ChatAction,
) {
    match action {
        ChatAction::Send { text } => match store.append_chat(project_id, user_id, text) {
            Ok(_) => save_or_die(store, db_path),
            Err(e) => bail(e),
        },
        ChatAction::Log => {
            let project = match store.project(project_id) {
                Some(p) => p,
                None => bail(BoardError::ProjectNotFound(project_id.into())),
            };
            if project.chat.is_empty() {
                println!("No messages yet.");
                return;
            }
            for msg in &project.chat {
                let sender = store.user(&msg.user_id).map_or("?", |u| u.name.as_str());
                println!("{sender}: {}", msg.content);
            }
        }
    }
}

/// Print a drafted status-update email for a task's assignee.
pub fn cmd_notify(store: &Store, project_id: &str, user_id: &str, task_id: String) {
    let tasks = match store.get_tasks(project_id) {
        Ok(t) => t,
        Err(e) => bail(e),
    };
    let task = match tasks.iter().find(|t| t.id == task_id) {
        Some(t) => t,
        None => bail(BoardError::TaskNotFound(task_id)),
    };
    let sender = match store.user(user_id) {
        Some(u) => u,
        None => bail(BoardError::UserNotFound(user_id.into())),
    };
    let assignee = match task.assignee_id.as_deref().and_then(|id| store.user(id)) {
        Some(u) => u,
        None => {
            eprintln!("Task {task_id} has no assignee to notify");
            std::process::exit(1);
        }
    };

    let draft = TemplateAssistant.draft_notification(task, assignee, sender);
    println!("To:      {}", assignee.email);
    println!("Subject: {}", draft.subject);
    println!("\n{}", draft.body);
}

/// List projects with member counts and the session user's role.
pub fn cmd_projects(store: &Store, user_id: &str) {
    println!("{:<5} {:<22} {:<8} {:<7} {}", "ID", "Name", "Members", "Tasks", "Your role");
    for project in &store.projects {
        let role = project
            .role_of(user_id)
            .map_or("-", format_role);
        println!(
            "{:<5} {:<22} {:<8} {:<7} {}",
            project.id,
            truncate(&project.name, 22),
            project.member_ids.len(),
            project.tasks.len(),
            role
        );
    }
}

/// Workspace summary: totals per status, per-project progress, own tasks.
pub fn cmd_stats(store: &Store, user_id: &str) {
    let all_tasks: Vec<&Task> = store.projects.iter().flat_map(|p| p.tasks.iter()).collect();
    let count = |status: Status| all_tasks.iter().filter(|t| t.status == status).count();
    let mine = all_tasks
        .iter()
        .filter(|t| t.assignee_id.as_deref() == Some(user_id))
        .count();

    if let Some(user) = store.user(user_id) {
        println!("Welcome back, {}", user.first_name());
    }
    println!("\nTotal tasks:    {}", all_tasks.len());
    for status in Status::ALL {
        println!("{:<15} {}", format!("{}:", format_status(status)), count(status));
    }
    println!("Assigned to me: {mine}");

    println!("\nProject progress:");
    for project in &store.projects {
        let total = project.tasks.len();
        let done = project
            .tasks
            .iter()
            .filter(|t| t.status == Status::Done)
            .count();
        let pct = if total == 0 {
            0
        } else {
            (done as f64 / total as f64 * 100.0).round() as u32
        };
        println!("  {:<22} {:>3}%  ({done}/{total})", truncate(&project.name, 22), pct);
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

/// Locate a task's current column and position, for building move intents.
fn locate(store: &Store, project_id: &str, task_id: &str) -> Result<(Status, usize), BoardError> {
    let tasks = store.get_tasks(project_id)?;
    let task = tasks
        .iter()
        .find(|t| t.id == task_id)
        .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))?;
    let index = ordering::column(tasks, task.status)
        .iter()
        .position(|t| t.id == task_id)
        .unwrap_or(0);
    Ok((task.status, index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_due_input() {
        let now = today();
        assert_eq!(parse_due_input("today"), Some(now));
        assert_eq!(parse_due_input("tomorrow"), Some(now + Duration::days(1)));
        assert_eq!(parse_due_input("in 3d"), Some(now + Duration::days(3)));
        assert_eq!(
            parse_due_input("2024-06-01"),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
        assert_eq!(parse_due_input("whenever"), None);
    }

    #[test]
    fn test_locate_finds_column_position() {
        let store = Store::seeded();
        assert_eq!(locate(&store, "p1", "t3").unwrap(), (Status::Todo, 1));
        assert_eq!(locate(&store, "p1", "t1").unwrap(), (Status::Done, 0));
        assert!(locate(&store, "p1", "t9").is_err());
    }
}
