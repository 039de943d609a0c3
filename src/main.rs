//! # td - Kanban Task Board CLI
//!
//! A terminal kanban board with per-column task ordering and dependency
//! gating, for a small demo workspace seeded with mock data.
//!
//! ## Key Features
//!
//! - **Status Columns**: To Do → In Progress → Review → Done, each keeping
//!   a dense 0-based card order
//! - **Dependency Gating**: a task cannot leave To Do while any of its
//!   dependencies is unfinished; rejections name the blocking tasks
//! - **Roles**: Admin and Member may edit, Viewer is read-only
//! - **Multiple Interfaces**: full CLI for scripting + interactive TUI board
//! - **Local File Storage**: a single JSON workspace file, seeded with demo
//!   projects on first run
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interactive board
//! td ui
//!
//! # Add a task with a dependency
//! td add "Frontend Implementation" --dep t1 --assignee u2
//!
//! # Try to move it (rejected while t1 is unfinished)
//! td mv t3 in-progress
//!
//! # Reorder the To Do column
//! td reorder todo 0 2
//! ```
//!
//! Data is stored locally in `~/.taskdeck/workspace.json`. The `--user` flag
//! selects the acting user (default `u1`); `--project` selects the project
//! (default `p1`).

use std::path::PathBuf;

use clap::Parser;

pub mod board;
pub mod cli;
pub mod cmd;
pub mod deps;
pub mod draft;
pub mod error;
pub mod fields;
pub mod ordering;
pub mod project;
pub mod store;
pub mod task;
pub mod tui {
    pub mod board;
    pub mod colors;
    pub mod run;
}

use cli::Cli;
use cmd::*;
use store::Store;

fn main() {
    let cli = Cli::parse();

    // Determine the workspace file
    let db_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let dir = PathBuf::from(home).join(".taskdeck");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            eprintln!("Failed to create workspace directory {}: {}", dir.display(), e);
            std::process::exit(1);
        }
        dir.join("workspace.json")
    });

    // The TUI owns its own load/save cycle
    if let Commands::Ui = cli.command {
        cmd_ui(&db_path, &cli.project, &cli.user);
        return;
    }

    let mut store = Store::load(&db_path);

    match cli.command {
        Commands::Ui => unreachable!("UI command handled above"),

        Commands::Board => cmd_board(&mut store, &cli.project),

        Commands::Add { title, desc, priority, assignee, due, deps, subtasks, breakdown } =>
            cmd_add(&mut store, &db_path, &cli.project, &cli.user, title, desc,
                    priority, assignee, due, deps, subtasks, breakdown),

        Commands::Mv { task, status, at } =>
            cmd_mv(&mut store, &db_path, &cli.project, &cli.user, task, status, at),

        Commands::Reorder { status, from, to } =>
            cmd_reorder(&mut store, &db_path, &cli.project, &cli.user, status, from, to),

        Commands::View { task } => cmd_view(&store, &cli.project, task),

        Commands::Update { task, title, desc, priority, assignee, due,
                          add_deps, rm_deps, clear_due, clear_assignee } =>
            cmd_update(&mut store, &db_path, &cli.project, &cli.user, task, title,
                      desc, priority, assignee, due, add_deps, rm_deps,
                      clear_due, clear_assignee),

        Commands::Comment { task, text } =>
            cmd_comment(&mut store, &db_path, &cli.project, &cli.user, task, text),

        Commands::Subtask { action } =>
            cmd_subtask(&mut store, &db_path, &cli.project, &cli.user, action),

        Commands::Chat { action } =>
            cmd_chat(&mut store, &db_path, &cli.project, &cli.user, action),

        Commands::Notify { task } => cmd_notify(&store, &cli.project, &cli.user, task),

        Commands::Projects => cmd_projects(&store, &cli.user),

        Commands::Stats => cmd_stats(&store, &cli.user),

        Commands::Completions { shell } => cmd_completions(shell),
    }
}
