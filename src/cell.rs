//! Integer cell coordinates, faces and the horizontal directions movements
//! travel along.

use std::fmt;

use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};

use crate::numeric::floor_to_i32;

/// A cell of the voxel world. `y` grows upwards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct CellPos {
    /// East-west coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// North-south coordinate.
    pub z: i32,
}

impl CellPos {
    /// Creates a cell position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The cell containing a world-space point.
    #[must_use]
    pub fn containing(point: DVec3) -> Self {
        Self::new(
            floor_to_i32(point.x),
            floor_to_i32(point.y),
            floor_to_i32(point.z),
        )
    }

    /// Offsets the cell by the given deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The cell directly above.
    #[must_use]
    pub const fn up(self) -> Self {
        self.offset(0, 1, 0)
    }

    /// The cell `n` above.
    #[must_use]
    pub const fn up_by(self, n: i32) -> Self {
        self.offset(0, n, 0)
    }

    /// The cell directly below.
    #[must_use]
    pub const fn down(self) -> Self {
        self.offset(0, -1, 0)
    }

    /// The cell `n` below.
    #[must_use]
    pub const fn down_by(self, n: i32) -> Self {
        self.offset(0, -n, 0)
    }

    /// One step along a horizontal direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        self.step_by(direction, 1)
    }

    /// `n` steps along a horizontal direction.
    #[must_use]
    pub const fn step_by(self, direction: Direction, n: i32) -> Self {
        let (dx, dz) = direction.delta();
        self.offset(dx * n, 0, dz * n)
    }

    /// The neighbouring cell across a face.
    #[must_use]
    pub const fn adjacent(self, face: Face) -> Self {
        let (dx, dy, dz) = face.delta();
        self.offset(dx, dy, dz)
    }

    /// Centre of the cell in world space.
    #[must_use]
    pub fn center(self) -> DVec3 {
        DVec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y) + 0.5,
            f64::from(self.z) + 0.5,
        )
    }

    /// Centre of the cell's bottom face, where a standing agent's feet rest.
    #[must_use]
    pub fn bottom_center(self) -> DVec3 {
        DVec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y),
            f64::from(self.z) + 0.5,
        )
    }

    /// Whether two cells share a column.
    #[must_use]
    pub const fn same_column(self, other: Self) -> bool {
        self.x == other.x && self.z == other.z
    }

    /// The position as an integer vector.
    #[must_use]
    pub const fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for CellPos {
    fn from(value: IVec3) -> Self {
        Self::new(value.x, value.y, value.z)
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A horizontal cardinal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Towards `-z`.
    North,
    /// Towards `+z`.
    South,
    /// Towards `-x`.
    West,
    /// Towards `+x`.
    East,
}

impl Direction {
    /// All four directions.
    pub const HORIZONTALS: [Self; 4] = [Self::North, Self::South, Self::West, Self::East];

    /// The `(dx, dz)` step for this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::West => (-1, 0),
            Self::East => (1, 0),
        }
    }

    /// The reverse direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
        }
    }

    /// The matching horizontal face.
    #[must_use]
    pub const fn face(self) -> Face {
        match self {
            Self::North => Face::North,
            Self::South => Face::South,
            Self::West => Face::West,
            Self::East => Face::East,
        }
    }

    /// The direction of a unit horizontal step, if the delta is one.
    #[must_use]
    pub const fn from_delta(dx: i32, dz: i32) -> Option<Self> {
        match (dx, dz) {
            (0, -1) => Some(Self::North),
            (0, 1) => Some(Self::South),
            (-1, 0) => Some(Self::West),
            (1, 0) => Some(Self::East),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::North => "north",
            Self::South => "south",
            Self::West => "west",
            Self::East => "east",
        };
        f.write_str(name)
    }
}

/// One of the four horizontal diagonals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Diagonal {
    /// `-z`, `+x`.
    NorthEast,
    /// `-z`, `-x`.
    NorthWest,
    /// `+z`, `+x`.
    SouthEast,
    /// `+z`, `-x`.
    SouthWest,
}

impl Diagonal {
    /// All four diagonals.
    pub const ALL: [Self; 4] = [
        Self::NorthEast,
        Self::NorthWest,
        Self::SouthEast,
        Self::SouthWest,
    ];

    /// The two cardinal components, z-axis first.
    #[must_use]
    pub const fn components(self) -> (Direction, Direction) {
        match self {
            Self::NorthEast => (Direction::North, Direction::East),
            Self::NorthWest => (Direction::North, Direction::West),
            Self::SouthEast => (Direction::South, Direction::East),
            Self::SouthWest => (Direction::South, Direction::West),
        }
    }

    /// The `(dx, dz)` step for this diagonal.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        let (z_dir, x_dir) = self.components();
        let (_, dz) = z_dir.delta();
        let (dx, _) = x_dir.delta();
        (dx, dz)
    }

    /// The diagonal of a horizontal step of one cell on each axis.
    #[must_use]
    pub const fn from_delta(dx: i32, dz: i32) -> Option<Self> {
        match (dx, dz) {
            (1, -1) => Some(Self::NorthEast),
            (-1, -1) => Some(Self::NorthWest),
            (1, 1) => Some(Self::SouthEast),
            (-1, 1) => Some(Self::SouthWest),
            _ => None,
        }
    }
}

/// One of the six faces of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    /// The `-y` face.
    Down,
    /// The `+y` face.
    Up,
    /// The `-z` face.
    North,
    /// The `+z` face.
    South,
    /// The `-x` face.
    West,
    /// The `+x` face.
    East,
}

impl Face {
    /// All six faces.
    pub const ALL: [Self; 6] = [
        Self::Down,
        Self::Up,
        Self::North,
        Self::South,
        Self::West,
        Self::East,
    ];

    /// The faces a block may be placed against when bridging: the four sides
    /// followed by the one below.
    pub const HORIZONTALS_AND_DOWN: [Self; 5] = [
        Self::North,
        Self::South,
        Self::East,
        Self::West,
        Self::Down,
    ];

    /// The `(dx, dy, dz)` step across this face.
    #[must_use]
    pub const fn delta(self) -> (i32, i32, i32) {
        match self {
            Self::Down => (0, -1, 0),
            Self::Up => (0, 1, 0),
            Self::North => (0, 0, -1),
            Self::South => (0, 0, 1),
            Self::West => (-1, 0, 0),
            Self::East => (1, 0, 0),
        }
    }

    /// Outward unit normal.
    #[must_use]
    pub fn normal(self) -> DVec3 {
        let (dx, dy, dz) = self.delta();
        DVec3::new(f64::from(dx), f64::from(dy), f64::from(dz))
    }

    /// The face on the other side of the cell.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Down => Self::Up,
            Self::Up => Self::Down,
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
        }
    }
}
