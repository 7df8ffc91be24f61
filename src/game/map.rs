//! Toroidal grid, cells and directions.

// Coordinates are normalized with rem_euclid before any cast to usize
#![allow(clippy::cast_sign_loss)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{AgentId, PlayerId};

/// A position on the grid.
///
/// Any value is accepted; the grid wraps it toroidally on lookup.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    /// X coordinate (column).
    pub x: i32,
    /// Y coordinate (row).
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position one step away in `direction` (not normalized).
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A single-step move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward smaller y.
    North,
    /// Toward larger y.
    South,
    /// Toward larger x.
    East,
    /// Toward smaller x.
    West,
    /// No movement.
    Still,
}

impl Direction {
    /// The four cardinal directions, in tie-break order.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Coordinate delta `(dx, dy)`.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::Still => (0, 0),
        }
    }

    /// Opposite direction (`Still` stays `Still`).
    #[must_use]
    pub const fn invert(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Still => Direction::Still,
        }
    }

    /// Single-character wire form.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Direction::North => 'n',
            Direction::South => 's',
            Direction::East => 'e',
            Direction::West => 'w',
            Direction::Still => 'o',
        }
    }

    /// Index into a cardinal accumulator (`None` for `Still`).
    #[must_use]
    pub const fn cardinal_index(self) -> Option<usize> {
        match self {
            Direction::North => Some(0),
            Direction::South => Some(1),
            Direction::East => Some(2),
            Direction::West => Some(3),
            Direction::Still => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Kind of collection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    /// The home base; new agents appear here.
    Shipyard,
    /// An auxiliary collection point.
    Dropoff,
}

/// A collection point standing on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Structure {
    /// Owning player.
    pub owner: PlayerId,
    /// Shipyard or dropoff.
    pub kind: StructureKind,
}

/// The agent standing on a cell at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant {
    /// Owning player.
    pub owner: PlayerId,
    /// The agent's id.
    pub agent: AgentId,
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    /// Resource amount on the cell.
    pub resource: u32,
    /// Agent present at snapshot time.
    pub occupant: Option<Occupant>,
    /// Collection point on the cell.
    pub structure: Option<Structure>,
    /// Claimed for the current tick.
    reserved: bool,
    /// Enough opponents nearby to grant the extraction bonus this tick.
    inspired: bool,
}

impl Cell {
    /// Create an unoccupied cell holding `resource`.
    #[must_use]
    pub const fn new(resource: u32) -> Self {
        Self {
            resource,
            occupant: None,
            structure: None,
            reserved: false,
            inspired: false,
        }
    }

    /// Whether the cell is claimed this tick.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        self.reserved
    }

    /// Whether the cell is inspired this tick.
    #[must_use]
    pub const fn is_inspired(&self) -> bool {
        self.inspired
    }

    /// Whether `player` owns a collection point on this cell.
    #[must_use]
    pub fn is_collection_point_of(&self, player: PlayerId) -> bool {
        self.structure.is_some_and(|s| s.owner == player)
    }
}

/// The toroidal grid.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Width in cells.
    width: u16,
    /// Height in cells.
    height: u16,
    /// Cells in row-major order.
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an empty grid.
    ///
    /// Returns `None` if width or height is zero.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let size = usize::from(width) * usize::from(height);
        Some(Self {
            width,
            height,
            cells: vec![Cell::default(); size],
        })
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Raw cells in row-major order.
    #[must_use]
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Wrap a position onto the grid.
    #[must_use]
    #[inline]
    pub fn normalize(&self, position: Position) -> Position {
        Position::new(
            position.x.rem_euclid(i32::from(self.width)),
            position.y.rem_euclid(i32::from(self.height)),
        )
    }

    #[inline]
    fn index(&self, position: Position) -> usize {
        let p = self.normalize(position);
        p.y as usize * usize::from(self.width) + p.x as usize
    }

    /// The cell at `position`, wrapping toroidally.
    #[must_use]
    #[inline]
    pub fn cell_at(&self, position: Position) -> &Cell {
        &self.cells[self.index(position)]
    }

    /// Mutable cell at `position`, wrapping toroidally.
    #[must_use]
    #[inline]
    pub fn cell_at_mut(&mut self, position: Position) -> &mut Cell {
        let idx = self.index(position);
        &mut self.cells[idx]
    }

    /// Iterate over all positions and cells.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> {
        let width = usize::from(self.width);
        self.cells.iter().enumerate().map(move |(idx, cell)| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let position = Position::new((idx % width) as i32, (idx / width) as i32);
            (position, cell)
        })
    }

    /// Claim a cell for this tick. Idempotent.
    pub fn mark_unsafe(&mut self, position: Position) {
        self.cell_at_mut(position).reserved = true;
    }

    /// Whether nobody has claimed the cell this tick.
    #[must_use]
    pub fn is_safe(&self, position: Position) -> bool {
        !self.cell_at(position).reserved
    }

    /// Flag a cell as inspired for this tick.
    pub fn mark_inspired(&mut self, position: Position) {
        self.cell_at_mut(position).inspired = true;
    }

    /// Whether the cell is inspired this tick.
    #[must_use]
    pub fn is_inspired(&self, position: Position) -> bool {
        self.cell_at(position).inspired
    }

    /// Clear every per-tick flag. Runs once per tick before any agent logic.
    pub fn reset_tick_flags(&mut self) {
        for cell in &mut self.cells {
            cell.reserved = false;
            cell.inspired = false;
        }
    }

    /// Toroidal Manhattan distance.
    #[must_use]
    pub fn distance(&self, a: Position, b: Position) -> u32 {
        let a = self.normalize(a);
        let b = self.normalize(b);
        let width = i32::from(self.width);
        let height = i32::from(self.height);

        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        (dx.min(width - dx) + dy.min(height - dy)) as u32
    }

    /// Cardinal directions that reduce the distance from `from` to `to`.
    ///
    /// Returns a fixed-size array and count to avoid heap allocation. The x
    /// axis comes first. When an axis delta is exactly half the axis size
    /// both ways are equally short and the wrapped way is chosen.
    #[must_use]
    pub fn approach_moves(&self, from: Position, to: Position) -> ([Direction; 2], u8) {
        let from = self.normalize(from);
        let to = self.normalize(to);
        let mut moves = [Direction::Still; 2];
        let mut count = 0u8;

        let dx = to.x - from.x;
        if dx != 0 {
            let toward = if dx > 0 { Direction::East } else { Direction::West };
            moves[usize::from(count)] = if dx.abs() * 2 < i32::from(self.width) {
                toward
            } else {
                toward.invert()
            };
            count += 1;
        }

        let dy = to.y - from.y;
        if dy != 0 {
            let toward = if dy > 0 { Direction::South } else { Direction::North };
            moves[usize::from(count)] = if dy.abs() * 2 < i32::from(self.height) {
                toward
            } else {
                toward.invert()
            };
            count += 1;
        }

        (moves, count)
    }

    /// The four cardinal neighbours of `position`, normalized.
    #[must_use]
    pub fn adjacent(&self, position: Position) -> [(Direction, Position); 4] {
        Direction::CARDINALS.map(|d| (d, self.normalize(position.offset(d))))
    }

    /// Offsets of every distinct cell in a square window of `radius`.
    ///
    /// On grids smaller than the window the offsets are clamped so that no
    /// cell is visited twice.
    pub fn window(&self, radius: u16) -> impl Iterator<Item = (i32, i32)> + use<> {
        let r = i32::from(radius);
        let width = i32::from(self.width);
        let height = i32::from(self.height);
        let (x_lo, x_hi) = (-r.min((width - 1) / 2), r.min(width / 2));
        let (y_lo, y_hi) = (-r.min((height - 1) / 2), r.min(height / 2));

        (y_lo..=y_hi).flat_map(move |dy| (x_lo..=x_hi).map(move |dx| (dx, dy)))
    }
}
