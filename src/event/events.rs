/// Notifications emitted by the undo stack after each successful operation.
///
/// Flag events are edge-triggered: they fire only when the value actually
/// changed, so UI code can bind them directly to menu-action enabling and
/// the title-bar "modified" indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackEvent {
    /// History content or the undo/redo boundary moved
    HistoryChanged { index: usize, length: usize },
    CanUndoChanged { can_undo: bool },
    CanRedoChanged { can_redo: bool },
    CleanChanged { is_clean: bool },
}
