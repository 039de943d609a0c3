use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Kanban task board with per-column ordering and dependency gating.
/// Storage defaults to ~/.taskdeck/workspace.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "td", version, about = "Kanban task board CLI")]
pub struct Cli {
    /// Path to the JSON workspace file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Acting user id. Stands in for a login session.
    #[arg(long, global = true, default_value = "u1")]
    pub user: String,

    /// Project id to operate on.
    #[arg(long, global = true, default_value = "p1")]
    pub project: String,

    #[command(subcommand)]
    pub command: Commands,
}
