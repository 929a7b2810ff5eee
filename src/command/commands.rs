use uuid::Uuid;

use super::{CommandError, CommandResult};
use crate::board::{Board, Hole, Length, Point};

/// Discriminant half of a [`MergeKey`]: which kind of edit a command performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    SetHoleDiameter,
    MoveHole,
}

/// Identifies what a command edits, for cheap merge-compatibility checks.
///
/// Two commands may only merge when their keys are equal: same kind of edit
/// on the same target entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeKey {
    pub kind: MergeKind,
    pub target: Uuid,
}

/// The concrete edit operations the editor can perform on a board.
///
/// Each variant carries everything needed to apply the edit and to revert it
/// exactly, so `apply` followed by `revert` always restores the prior state.
#[derive(Debug, Clone)]
pub enum CommandAction {
    /// No effect of its own; used by macro composites that only group children
    Group,

    AddHole {
        hole: Hole,
    },

    RemoveHole {
        id: Uuid,
        /// Stashed on apply so revert can restore the entity
        removed: Option<Hole>,
    },

    SetHoleDiameter {
        id: Uuid,
        old: Length,
        new: Length,
    },

    MoveHole {
        id: Uuid,
        old: Point,
        new: Point,
    },
}

impl CommandAction {
    fn apply(&mut self, board: &mut Board) -> CommandResult {
        match self {
            CommandAction::Group => Ok(()),
            CommandAction::AddHole { hole } => Ok(board.add_hole(hole.clone())?),
            CommandAction::RemoveHole { id, removed } => {
                *removed = Some(board.remove_hole(*id)?);
                Ok(())
            }
            CommandAction::SetHoleDiameter { id, new, .. } => {
                Ok(board.set_hole_diameter(*id, *new)?)
            }
            CommandAction::MoveHole { id, new, .. } => Ok(board.set_hole_position(*id, *new)?),
        }
    }

    fn revert(&mut self, board: &mut Board) -> CommandResult {
        match self {
            CommandAction::Group => Ok(()),
            CommandAction::AddHole { hole } => {
                board.remove_hole(hole.id())?;
                Ok(())
            }
            CommandAction::RemoveHole { id, removed } => {
                // The stash is always present once the command has run
                debug_assert!(removed.is_some());
                let hole = removed
                    .take()
                    .ok_or(crate::board::BoardError::HoleNotFound(*id))?;
                Ok(board.add_hole(hole)?)
            }
            CommandAction::SetHoleDiameter { id, old, .. } => {
                Ok(board.set_hole_diameter(*id, *old)?)
            }
            CommandAction::MoveHole { id, old, .. } => Ok(board.set_hole_position(*id, *old)?),
        }
    }

    /// Merge-eligibility tag: `None` means this action never merges.
    pub fn merge_key(&self) -> Option<MergeKey> {
        match self {
            CommandAction::SetHoleDiameter { id, .. } => Some(MergeKey {
                kind: MergeKind::SetHoleDiameter,
                target: *id,
            }),
            CommandAction::MoveHole { id, .. } => Some(MergeKey {
                kind: MergeKind::MoveHole,
                target: *id,
            }),
            _ => None,
        }
    }

    /// Absorb `other`'s end state into this already-applied action, updating
    /// the board to match. Returns false when the pair is not mergeable.
    fn merge_from(&mut self, other: &CommandAction, board: &mut Board) -> Result<bool, CommandError> {
        match (self, other) {
            (
                CommandAction::SetHoleDiameter { id, new, .. },
                CommandAction::SetHoleDiameter {
                    id: other_id,
                    new: other_new,
                    ..
                },
            ) if *id == *other_id => {
                board.set_hole_diameter(*id, *other_new)?;
                *new = *other_new;
                Ok(true)
            }
            (
                CommandAction::MoveHole { id, new, .. },
                CommandAction::MoveHole {
                    id: other_id,
                    new: other_new,
                    ..
                },
            ) if *id == *other_id => {
                board.set_hole_position(*id, *other_new)?;
                *new = *other_new;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// A reversible unit of work, possibly composed of ordered child commands.
///
/// Children at lower indices execute first; `undo` walks them in the exact
/// reverse order. The child list is assembled before the first execution and
/// stays frozen afterwards, even across later `undo`/`execute` cycles, which
/// is what keeps replay order stable.
#[derive(Debug)]
pub struct Command {
    text: String,
    executed: bool,
    /// Set on the first successful execution and never cleared
    frozen: bool,
    action: CommandAction,
    children: Vec<Command>,
}

impl Command {
    pub fn new(text: impl Into<String>, action: CommandAction) -> Self {
        Self {
            text: text.into(),
            executed: false,
            frozen: false,
            action,
            children: Vec::new(),
        }
    }

    /// A composite with no effect of its own, used for macro grouping
    pub fn group(text: impl Into<String>) -> Self {
        Self::new(text, CommandAction::Group)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn children(&self) -> &[Command] {
        &self.children
    }

    /// Append `child` to the end of the child list.
    ///
    /// Fails once this command has been executed: the child list must be
    /// fully assembled before the first execution so that undo can rely on
    /// replaying the same sequence.
    pub fn append_child(&mut self, child: Command) -> CommandResult {
        if self.frozen {
            return Err(CommandError::Frozen(self.text.clone()));
        }
        self.children.push(child);
        Ok(())
    }

    /// Remove and return the child at `index`; same freeze rule as
    /// [`Command::append_child`]. Used when abandoning a composite that was
    /// never committed.
    pub fn remove_child(&mut self, index: usize) -> Result<Command, CommandError> {
        if self.frozen {
            return Err(CommandError::Frozen(self.text.clone()));
        }
        if index >= self.children.len() {
            return Err(CommandError::NoSuchChild {
                text: self.text.clone(),
                index,
            });
        }
        Ok(self.children.remove(index))
    }

    /// Perform the forward action: own effect first, then all children in
    /// forward order.
    ///
    /// If a child fails, everything that already ran is rolled back before
    /// the error propagates, so a failed execute leaves no visible effect and
    /// the executed flag untouched.
    pub fn execute(&mut self, board: &mut Board) -> CommandResult {
        if self.executed {
            return Err(CommandError::AlreadyExecuted(self.text.clone()));
        }
        self.action.apply(board)?;
        for index in 0..self.children.len() {
            if let Err(err) = self.children[index].execute(board) {
                self.rollback_partial_execute(board, index);
                return Err(err);
            }
        }
        self.executed = true;
        self.frozen = true;
        Ok(())
    }

    /// Perform the inverse action: children in reverse order, then the own
    /// effect reverted, the exact mirror of [`Command::execute`].
    pub fn undo(&mut self, board: &mut Board) -> CommandResult {
        if !self.executed {
            return Err(CommandError::NotExecuted(self.text.clone()));
        }
        for index in (0..self.children.len()).rev() {
            if let Err(err) = self.children[index].undo(board) {
                self.reexecute_children_from(board, index + 1);
                return Err(err);
            }
        }
        if let Err(err) = self.action.revert(board) {
            self.reexecute_children_from(board, 0);
            return Err(err);
        }
        self.executed = false;
        Ok(())
    }

    /// Offer `other` (about to be pushed, never executed) for absorption into
    /// this most recent history entry. On success the board is updated to
    /// `other`'s end state and `other` must be discarded without executing.
    ///
    /// `Ok(false)` is the normal "push a new entry instead" outcome.
    pub fn merge_with(&mut self, other: &Command, board: &mut Board) -> Result<bool, CommandError> {
        if !self.executed || other.executed {
            return Ok(false);
        }
        // Composites never merge
        if !self.children.is_empty() || !other.children.is_empty() {
            return Ok(false);
        }
        match (self.action.merge_key(), other.action.merge_key()) {
            (Some(own), Some(theirs)) if own == theirs => {
                self.action.merge_from(&other.action, board)
            }
            _ => Ok(false),
        }
    }

    /// Mark a committed macro group as executed without running it; all of
    /// its children were already executed one by one as they were pushed.
    pub(crate) fn mark_executed(&mut self) {
        debug_assert!(self.children.iter().all(Command::is_executed));
        self.executed = true;
        self.frozen = true;
    }

    /// Undo any still-executed children in reverse order. Used when aborting
    /// an open macro; skipping already-undone children keeps the operation
    /// retryable after a failure.
    pub(crate) fn rollback_children(&mut self, board: &mut Board) -> CommandResult {
        for child in self.children.iter_mut().rev() {
            if child.is_executed() {
                child.undo(board)?;
            }
        }
        Ok(())
    }

    fn rollback_partial_execute(&mut self, board: &mut Board, failed: usize) {
        for child in self.children[..failed].iter_mut().rev() {
            if let Err(err) = child.undo(board) {
                log::error!(
                    "rollback of \"{}\" failed after execution error: {err}",
                    child.text
                );
            }
        }
        if let Err(err) = self.action.revert(board) {
            log::error!(
                "rollback of \"{}\" failed after execution error: {err}",
                self.text
            );
        }
    }

    fn reexecute_children_from(&mut self, board: &mut Board, start: usize) {
        for child in self.children[start..].iter_mut() {
            if let Err(err) = child.execute(board) {
                log::error!(
                    "re-execution of \"{}\" failed after undo error: {err}",
                    child.text
                );
            }
        }
    }
}
