use boardedit::{Board, Command, CommandAction, Hole, Length, Point, StackError, UndoStack};
use serde_json::Value;

// Helper to create a test board with two predefined holes
fn create_test_board() -> Board {
    let mut board = Board::new();
    board
        .add_hole(Hole::new(
            Point::new(Length::from_mm(10), Length::from_mm(10)),
            Length::from_mm(1),
        ))
        .unwrap();
    board
        .add_hole(Hole::new(
            Point::new(Length::from_mm(20), Length::from_mm(5)),
            Length::from_mm(2),
        ))
        .unwrap();
    board
}

fn snapshot(board: &Board) -> Value {
    serde_json::to_value(board).unwrap()
}

fn set_diameter_command(board: &Board, id: uuid::Uuid, new: Length) -> Command {
    let old = board.find_hole(id).unwrap().diameter();
    Command::new(
        "Change hole diameter",
        CommandAction::SetHoleDiameter { id, old, new },
    )
}

fn move_command(board: &Board, id: uuid::Uuid, new: Point) -> Command {
    let old = board.find_hole(id).unwrap().position();
    Command::new("Move hole", CommandAction::MoveHole { id, old, new })
}

#[test]
fn test_undo_redo_round_trip() {
    let mut board = create_test_board();
    let mut stack = UndoStack::new();
    let id = board.holes()[0].id();

    let mut snapshots = vec![snapshot(&board)];

    stack
        .push(set_diameter_command(&board, id, Length::from_mm(3)), &mut board)
        .unwrap();
    snapshots.push(snapshot(&board));

    stack
        .push(
            move_command(&board, id, Point::new(Length::from_mm(15), Length::from_mm(15))),
            &mut board,
        )
        .unwrap();
    snapshots.push(snapshot(&board));

    stack
        .push(
            Command::new(
                "Remove hole",
                CommandAction::RemoveHole { id, removed: None },
            ),
            &mut board,
        )
        .unwrap();
    snapshots.push(snapshot(&board));

    assert_eq!(stack.len(), 3);
    assert_eq!(stack.index(), 3);

    // Undo all the way back, checking every intermediate state
    for step in (0..3).rev() {
        stack.undo(&mut board).unwrap();
        assert_eq!(snapshot(&board), snapshots[step]);
    }
    assert!(!stack.can_undo());
    assert!(stack.can_redo());

    // Redo all the way forward again
    for step in 1..=3 {
        stack.redo(&mut board).unwrap();
        assert_eq!(snapshot(&board), snapshots[step]);
    }
    assert!(stack.can_undo());
    assert!(!stack.can_redo());
}

#[test]
fn test_undo_at_start_and_redo_at_end_fail_without_mutation() {
    let mut board = create_test_board();
    let mut stack = UndoStack::new();
    let before = snapshot(&board);

    assert!(matches!(
        stack.undo(&mut board),
        Err(StackError::NothingToUndo)
    ));
    assert!(matches!(
        stack.redo(&mut board),
        Err(StackError::NothingToRedo)
    ));
    assert_eq!(snapshot(&board), before);
    assert_eq!(stack.index(), 0);

    let id = board.holes()[0].id();
    stack
        .push(set_diameter_command(&board, id, Length::from_mm(3)), &mut board)
        .unwrap();
    let after = snapshot(&board);

    assert!(matches!(
        stack.redo(&mut board),
        Err(StackError::NothingToRedo)
    ));
    assert_eq!(snapshot(&board), after);
    assert_eq!(stack.index(), 1);
}

#[test]
fn test_push_after_partial_undo_truncates_redo_region() {
    let mut board = create_test_board();
    let mut stack = UndoStack::new();
    let first = board.holes()[0].id();
    let second = board.holes()[1].id();

    stack
        .push(set_diameter_command(&board, first, Length::from_mm(3)), &mut board)
        .unwrap();
    stack
        .push(set_diameter_command(&board, second, Length::from_mm(4)), &mut board)
        .unwrap();
    stack
        .push(
            move_command(&board, first, Point::new(Length::from_mm(1), Length::from_mm(1))),
            &mut board,
        )
        .unwrap();

    stack.undo(&mut board).unwrap();
    stack.undo(&mut board).unwrap();
    assert_eq!(stack.index(), 1);
    assert_eq!(stack.len(), 3);

    // A fresh edit discards exactly the two undone entries
    stack
        .push(
            move_command(&board, second, Point::new(Length::from_mm(2), Length::from_mm(2))),
            &mut board,
        )
        .unwrap();
    assert_eq!(stack.len(), 2);
    assert_eq!(stack.index(), 2);
    assert!(!stack.can_redo());
    assert_eq!(stack.command(0).unwrap().text(), "Change hole diameter");
    assert_eq!(stack.command(1).unwrap().text(), "Move hole");
}

#[test]
fn test_failed_execute_leaves_history_and_board_unchanged() {
    let mut board = create_test_board();
    let mut stack = UndoStack::new();
    let before = snapshot(&board);

    // Target a hole that does not exist
    let bogus = Hole::new(
        Point::new(Length::from_mm(0), Length::from_mm(0)),
        Length::from_mm(1),
    );
    let command = Command::new(
        "Change hole diameter",
        CommandAction::SetHoleDiameter {
            id: bogus.id(),
            old: Length::from_mm(1),
            new: Length::from_mm(2),
        },
    );

    assert!(stack.push(command, &mut board).is_err());
    assert_eq!(stack.len(), 0);
    assert_eq!(stack.index(), 0);
    assert!(!stack.can_undo());
    assert_eq!(snapshot(&board), before);
}

#[test]
fn test_failed_undo_leaves_boundary_and_flags_unchanged() {
    let mut board = create_test_board();
    let mut stack = UndoStack::new();
    let id = board.holes()[0].id();

    // Executing applies the valid new diameter, but undoing would restore
    // the invalid stored old value and must fail
    stack
        .push(
            Command::new(
                "Change hole diameter",
                CommandAction::SetHoleDiameter {
                    id,
                    old: Length::from_nm(0),
                    new: Length::from_mm(3),
                },
            ),
            &mut board,
        )
        .unwrap();
    assert_eq!(board.find_hole(id).unwrap().diameter(), Length::from_mm(3));

    assert!(stack.undo(&mut board).is_err());

    // The command stays applied and the boundary did not move
    assert_eq!(stack.index(), 1);
    assert_eq!(stack.len(), 1);
    assert!(stack.can_undo());
    assert!(!stack.can_redo());
    assert_eq!(board.find_hole(id).unwrap().diameter(), Length::from_mm(3));

    // The stack is still usable: a fresh edit pushes and undoes normally
    stack
        .push(
            move_command(&board, id, Point::new(Length::from_mm(1), Length::from_mm(1))),
            &mut board,
        )
        .unwrap();
    assert_eq!(stack.len(), 2);
    stack.undo(&mut board).unwrap();
    assert_eq!(stack.index(), 1);
}

#[test]
fn test_clean_state_tracking() {
    let mut board = create_test_board();
    let mut stack = UndoStack::new();
    let id = board.holes()[0].id();

    assert!(stack.is_clean());

    stack
        .push(set_diameter_command(&board, id, Length::from_mm(3)), &mut board)
        .unwrap();
    assert!(!stack.is_clean());

    stack.set_clean().unwrap();
    assert!(stack.is_clean());

    stack.undo(&mut board).unwrap();
    assert!(!stack.is_clean());

    stack.redo(&mut board).unwrap();
    assert!(stack.is_clean());
}

#[test]
fn test_truncation_makes_clean_index_unreachable() {
    let mut board = create_test_board();
    let mut stack = UndoStack::new();
    let id = board.holes()[0].id();

    stack
        .push(set_diameter_command(&board, id, Length::from_mm(3)), &mut board)
        .unwrap();
    stack.set_clean().unwrap();

    // Undo past the saved position, then branch off with a new edit
    stack.undo(&mut board).unwrap();
    stack
        .push(set_diameter_command(&board, id, Length::from_mm(4)), &mut board)
        .unwrap();
    assert!(!stack.is_clean());

    // The saved state was discarded with the redo region, so no amount of
    // undoing brings it back
    stack.undo(&mut board).unwrap();
    assert!(!stack.is_clean());

    stack.set_clean().unwrap();
    assert!(stack.is_clean());
}

#[test]
fn test_undo_and_redo_texts_for_menu_labels() {
    let mut board = create_test_board();
    let mut stack = UndoStack::new();
    let id = board.holes()[0].id();

    assert_eq!(stack.undo_text(), None);
    assert_eq!(stack.redo_text(), None);

    stack
        .push(set_diameter_command(&board, id, Length::from_mm(3)), &mut board)
        .unwrap();
    assert_eq!(stack.undo_text(), Some("Change hole diameter"));
    assert_eq!(stack.redo_text(), None);

    stack.undo(&mut board).unwrap();
    assert_eq!(stack.undo_text(), None);
    assert_eq!(stack.redo_text(), Some("Change hole diameter"));
}
