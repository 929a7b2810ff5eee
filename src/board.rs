use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors reported by board mutations
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("no hole with id {0} on the board")]
    HoleNotFound(Uuid),

    #[error("a hole with id {0} already exists on the board")]
    DuplicateHole(Uuid),

    #[error("invalid hole diameter: {0} nm")]
    InvalidDiameter(i64),
}

/// A length in integer nanometers, the native unit of board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Length(i64);

impl Length {
    pub const fn from_nm(nm: i64) -> Self {
        Self(nm)
    }

    /// Convenience constructor for test and editor code working in millimeters
    pub const fn from_mm(mm: i64) -> Self {
        Self(mm * 1_000_000)
    }

    pub const fn to_nm(self) -> i64 {
        self.0
    }
}

/// A point on the board, in nanometers from the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: Length,
    pub y: Length,
}

impl Point {
    pub const fn new(x: Length, y: Length) -> Self {
        Self { x, y }
    }
}

/// A drilled hole: the domain entity the concrete edit commands target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hole {
    id: Uuid,
    position: Point,
    diameter: Length,
}

impl Hole {
    pub fn new(position: Point, diameter: Length) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            diameter,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn diameter(&self) -> Length {
        self.diameter
    }
}

/// The board being edited: a flat collection of holes.
///
/// All mutations validate their input and report failure through
/// [`BoardError`] without leaving partial state behind, so commands can rely
/// on each call being atomic-or-failed.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    holes: Vec<Hole>,
}

impl Board {
    pub fn new() -> Self {
        Self { holes: Vec::new() }
    }

    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    pub fn find_hole(&self, id: Uuid) -> Option<&Hole> {
        self.holes.iter().find(|h| h.id == id)
    }

    pub fn add_hole(&mut self, hole: Hole) -> Result<(), BoardError> {
        if hole.diameter.to_nm() <= 0 {
            return Err(BoardError::InvalidDiameter(hole.diameter.to_nm()));
        }
        if self.find_hole(hole.id).is_some() {
            return Err(BoardError::DuplicateHole(hole.id));
        }
        // Kept sorted by id: two boards with the same holes are bit-identical
        // no matter in which order edits created them
        let index = self.holes.partition_point(|h| h.id < hole.id);
        self.holes.insert(index, hole);
        Ok(())
    }

    pub fn remove_hole(&mut self, id: Uuid) -> Result<Hole, BoardError> {
        let index = self
            .holes
            .iter()
            .position(|h| h.id == id)
            .ok_or(BoardError::HoleNotFound(id))?;
        Ok(self.holes.remove(index))
    }

    pub fn set_hole_diameter(&mut self, id: Uuid, diameter: Length) -> Result<(), BoardError> {
        if diameter.to_nm() <= 0 {
            return Err(BoardError::InvalidDiameter(diameter.to_nm()));
        }
        let hole = self.hole_mut(id)?;
        hole.diameter = diameter;
        Ok(())
    }

    pub fn set_hole_position(&mut self, id: Uuid, position: Point) -> Result<(), BoardError> {
        let hole = self.hole_mut(id)?;
        hole.position = position;
        Ok(())
    }

    fn hole_mut(&mut self, id: Uuid) -> Result<&mut Hole, BoardError> {
        self.holes
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(BoardError::HoleNotFound(id))
    }
}
