mod commands;
mod history;

use thiserror::Error;

pub use commands::Command;
pub use history::{CommandHistory, DEFAULT_HISTORY_LIMIT};

/// Result type for undo/redo operations
pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    /// The recorded step refers to state that is gone
    #[error("History step no longer applies: {0}")]
    NoLongerApplies(String),
}
