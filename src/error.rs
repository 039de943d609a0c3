//! Error taxonomy for board operations.
//!
//! Every failure a caller can act on is a variant here; command handlers
//! render the message, the core never prints.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("project '{0}' not found")]
    ProjectNotFound(String),

    #[error("task '{0}' not found")]
    TaskNotFound(String),

    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("'{user}' has role {role} on this project and may not edit the board")]
    PermissionDenied { user: String, role: String },

    #[error("cannot move task, waiting for dependencies: {}", titles.join(", "))]
    DependencyBlocked { titles: Vec<String> },

    #[error("a task cannot depend on itself")]
    SelfDependency,
}

impl BoardError {
    /// Blocking task titles, when the failure was a dependency gate.
    pub fn blocking_titles(&self) -> Option<&[String]> {
        match self {
            BoardError::DependencyBlocked { titles } => Some(titles),
            _ => None,
        }
    }
}
