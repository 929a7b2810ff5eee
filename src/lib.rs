#![warn(clippy::all, rust_2018_idioms)]

pub mod board;
pub mod command;
pub mod event;

pub use board::{Board, BoardError, Hole, Length, Point};
pub use command::{Command, CommandAction, CommandError, CommandResult};
pub use command::{MergeKey, MergeKind, StackError, UndoStack};
pub use event::{EventBus, ObserverId, StackEvent, StackObserver};
