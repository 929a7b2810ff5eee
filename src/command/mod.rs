mod commands;
mod stack;

use thiserror::Error;

use crate::board::BoardError;

pub use commands::{Command, CommandAction, MergeKey, MergeKind};
pub use stack::{StackError, UndoStack};

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur while executing, undoing or assembling commands.
///
/// The first four variants are contract violations: they indicate the caller
/// is about to corrupt the history and are additionally caught by debug
/// assertions.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command \"{0}\" is already executed")]
    AlreadyExecuted(String),

    #[error("command \"{0}\" is not executed")]
    NotExecuted(String),

    #[error("cannot modify children of \"{0}\" after it was executed")]
    Frozen(String),

    #[error("no child at index {index} in \"{text}\"")]
    NoSuchChild { text: String, index: usize },

    /// The underlying board mutation failed
    #[error(transparent)]
    Board(#[from] BoardError),
}
