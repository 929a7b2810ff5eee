use thiserror::Error;

use super::{Command, CommandError};
use crate::board::Board;
use crate::event::{EventBus, StackEvent};

/// Errors reported by stack operations
#[derive(Debug, Error)]
pub enum StackError {
    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("operation not allowed while a macro is open")]
    MacroOpen,

    #[error("no macro is open")]
    NoMacroOpen,

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// The transactional command history: an ordered list of executed commands,
/// an undo/redo boundary, clean-state tracking, and macro grouping.
///
/// Commands at indices below `current` are applied; the rest form the redo
/// region. Pushing a new command truncates the redo region. All operations
/// are synchronous and the stack exclusively owns every command handed to
/// [`UndoStack::push`].
#[derive(Debug)]
pub struct UndoStack {
    history: Vec<Command>,
    current: usize,
    /// History position at which the document was last saved, if reachable
    clean: Option<usize>,
    /// In-progress macro groups, innermost last
    open_macros: Vec<Command>,
    bus: EventBus,
    // Last reported flag values, for edge-triggered notifications
    was_can_undo: bool,
    was_can_redo: bool,
    was_clean: bool,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoStack {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            current: 0,
            clean: Some(0),
            open_macros: Vec::new(),
            bus: EventBus::new(),
            was_can_undo: false,
            was_can_redo: false,
            was_clean: true,
        }
    }

    /// Execute `command` and record it in the history, taking ownership.
    ///
    /// The command is first offered to the most recent applied command for
    /// merging; if absorbed, the board is updated to the new end state, no
    /// history entry is added and the incoming command is dropped without
    /// ever executing. Otherwise the command executes, the redo region is
    /// truncated and the command is appended.
    ///
    /// While a macro is open the command becomes a child of the innermost
    /// group instead and the history is untouched.
    pub fn push(&mut self, mut command: Command, board: &mut Board) -> Result<(), StackError> {
        // Inside a macro, commands append 1:1 as children of the innermost
        // group; merging only applies to committed history entries.
        if let Some(group) = self.open_macros.last_mut() {
            command.execute(board)?;
            log::debug!("pushed \"{}\" into open macro", command.text());
            group.append_child(command)?;
            self.notify();
            return Ok(());
        }

        if self.current > 0 {
            let last = &mut self.history[self.current - 1];
            if last.merge_with(&command, board)? {
                log::debug!("merged \"{}\" into \"{}\"", command.text(), last.text());
                // Redone entries above the absorbing command would replay
                // from the wrong base state now
                self.truncate_redo_region();
                // The saved state no longer matches the board even though
                // the index did not move
                if self.clean == Some(self.current) {
                    self.clean = None;
                }
                self.notify();
                return Ok(());
            }
        }

        command.execute(board)?;
        log::debug!("pushed \"{}\"", command.text());
        self.truncate_redo_region();
        self.history.push(command);
        self.current += 1;
        self.notify();
        Ok(())
    }

    /// Undo the command just below the boundary. On failure the command stays
    /// executed and the boundary does not move.
    pub fn undo(&mut self, board: &mut Board) -> Result<(), StackError> {
        if !self.open_macros.is_empty() {
            return Err(StackError::MacroOpen);
        }
        if self.current == 0 {
            return Err(StackError::NothingToUndo);
        }
        self.history[self.current - 1].undo(board)?;
        self.current -= 1;
        log::debug!("undid \"{}\"", self.history[self.current].text());
        self.notify();
        Ok(())
    }

    /// Re-execute the command just above the boundary. On failure the
    /// boundary does not move.
    pub fn redo(&mut self, board: &mut Board) -> Result<(), StackError> {
        if !self.open_macros.is_empty() {
            return Err(StackError::MacroOpen);
        }
        if self.current == self.history.len() {
            return Err(StackError::NothingToRedo);
        }
        self.history[self.current].execute(board)?;
        log::debug!("redid \"{}\"", self.history[self.current].text());
        self.current += 1;
        self.notify();
        Ok(())
    }

    /// Open a macro: until the matching [`UndoStack::end_macro`], every push
    /// is collected into one composite history entry. Macros nest; an inner
    /// macro becomes a child of the outer one.
    pub fn begin_macro(&mut self, text: impl Into<String>) {
        let group = Command::group(text);
        log::debug!("beginning macro \"{}\"", group.text());
        self.open_macros.push(group);
        self.notify();
    }

    /// Commit the innermost open macro as a single undoable entry. A macro
    /// that collected no commands is discarded without a history entry.
    pub fn end_macro(&mut self) -> Result<(), StackError> {
        let mut group = self.open_macros.pop().ok_or(StackError::NoMacroOpen)?;
        if group.child_count() == 0 {
            log::debug!("discarding empty macro \"{}\"", group.text());
            self.notify();
            return Ok(());
        }
        // The children were executed one by one as they were pushed
        group.mark_executed();
        match self.open_macros.last_mut() {
            Some(outer) => outer.append_child(group)?,
            None => {
                log::debug!("committing macro \"{}\"", group.text());
                self.truncate_redo_region();
                self.history.push(group);
                self.current += 1;
            }
        }
        self.notify();
        Ok(())
    }

    /// Discard the innermost open macro, undoing whatever of it already ran.
    /// The history and the boundary are untouched.
    ///
    /// If rolling back a child fails the macro stays open and the error is
    /// surfaced; the call may be retried.
    pub fn abort_macro(&mut self, board: &mut Board) -> Result<(), StackError> {
        match self.open_macros.last_mut() {
            None => return Err(StackError::NoMacroOpen),
            Some(group) => {
                log::debug!("aborting macro \"{}\"", group.text());
                group.rollback_children(board)?;
            }
        }
        self.open_macros.pop();
        self.notify();
        Ok(())
    }

    /// True when the board matches the state recorded by the last
    /// [`UndoStack::set_clean`]
    pub fn is_clean(&self) -> bool {
        self.open_macros.is_empty() && self.clean == Some(self.current)
    }

    /// Record the current position as the saved state
    pub fn set_clean(&mut self) -> Result<(), StackError> {
        if !self.open_macros.is_empty() {
            return Err(StackError::MacroOpen);
        }
        self.clean = Some(self.current);
        self.notify();
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.open_macros.is_empty() && self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.open_macros.is_empty() && self.current < self.history.len()
    }

    /// Text of the command an [`UndoStack::undo`] would revert, for menu labels
    pub fn undo_text(&self) -> Option<&str> {
        if self.can_undo() {
            Some(self.history[self.current - 1].text())
        } else {
            None
        }
    }

    /// Text of the command a [`UndoStack::redo`] would apply, for menu labels
    pub fn redo_text(&self) -> Option<&str> {
        if self.can_redo() {
            Some(self.history[self.current].text())
        } else {
            None
        }
    }

    /// Current position of the undo/redo boundary, in `[0, len]`
    pub fn index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn command(&self, index: usize) -> Option<&Command> {
        self.history.get(index)
    }

    /// The notification bus UI code subscribes to
    pub fn observers(&self) -> &EventBus {
        &self.bus
    }

    /// Drop the redo region before appending a new entry; a clean index
    /// pointing into it becomes unreachable.
    fn truncate_redo_region(&mut self) {
        if self.current < self.history.len() {
            let discarded = self.history.split_off(self.current);
            log::debug!("discarding {} redone command(s)", discarded.len());
        }
        if let Some(clean) = self.clean {
            if clean > self.current {
                self.clean = None;
            }
        }
    }

    fn notify(&mut self) {
        self.bus.emit(StackEvent::HistoryChanged {
            index: self.current,
            length: self.history.len(),
        });
        let can_undo = self.can_undo();
        if can_undo != self.was_can_undo {
            self.was_can_undo = can_undo;
            self.bus.emit(StackEvent::CanUndoChanged { can_undo });
        }
        let can_redo = self.can_redo();
        if can_redo != self.was_can_redo {
            self.was_can_redo = can_redo;
            self.bus.emit(StackEvent::CanRedoChanged { can_redo });
        }
        let is_clean = self.is_clean();
        if is_clean != self.was_clean {
            self.was_clean = is_clean;
            self.bus.emit(StackEvent::CleanChanged { is_clean });
        }
    }
}
