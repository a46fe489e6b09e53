//! Live snapshot of the agent handed to each tick.

use glam::DVec3;

use crate::cell::{CellPos, Face};
use crate::constants::{EYE_HEIGHT, FEET_EPSILON, SNEAK_EYE_HEIGHT};
use crate::numeric::floor_to_i32;
use crate::rotation::Rotation;

/// The block face under the agent's crosshair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHit {
    /// The block struck by the look ray.
    pub cell: CellPos,
    /// The face of that block the ray entered through.
    pub face: Face,
}

impl BlockHit {
    /// The cell a block placed on the hit face would occupy.
    #[must_use]
    pub const fn placement_cell(&self) -> CellPos {
        self.cell.adjacent(self.face)
    }
}

/// Position, motion and view of the agent at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentState {
    /// Centre of the bottom of the bounding box.
    pub position: DVec3,
    /// Motion applied last tick, in blocks per tick.
    pub velocity: DVec3,
    /// Current look direction.
    pub rotation: Rotation,
    /// Whether the agent stands on something.
    pub on_ground: bool,
    /// Whether the agent is sneaking.
    pub sneaking: bool,
    /// Whether horizontal movement was blocked last tick.
    pub collided_horizontally: bool,
    /// The block under the crosshair, if any.
    pub looking_at: Option<BlockHit>,
}

impl AgentState {
    /// An agent at rest, centred on `feet`, looking due south.
    #[must_use]
    pub fn standing_at(feet: CellPos) -> Self {
        Self {
            position: feet.bottom_center(),
            velocity: DVec3::ZERO,
            rotation: Rotation::default(),
            on_ground: true,
            sneaking: false,
            collided_horizontally: false,
            looking_at: None,
        }
    }

    /// The cell the agent's feet occupy.
    ///
    /// Feet resting on a partial block resolve to the cell above it.
    #[must_use]
    pub fn feet(&self) -> CellPos {
        CellPos::new(
            floor_to_i32(self.position.x),
            floor_to_i32(self.position.y + FEET_EPSILON),
            floor_to_i32(self.position.z),
        )
    }

    /// World-space position of the eyes.
    #[must_use]
    pub fn eye_position(&self) -> DVec3 {
        let height = if self.sneaking {
            SNEAK_EYE_HEIGHT
        } else {
            EYE_HEIGHT
        };
        self.position + DVec3::new(0.0, height, 0.0)
    }

    /// Whether the crosshair rests on `cell`.
    #[must_use]
    pub fn is_looking_at(&self, cell: CellPos) -> bool {
        self.looking_at.is_some_and(|hit| hit.cell == cell)
    }

    /// Horizontal distance from the agent to the centre of `cell`, taking the
    /// larger of the two axis offsets.
    #[must_use]
    pub fn horizontal_chebyshev_to(&self, cell: CellPos) -> f64 {
        let center = cell.center();
        (self.position.x - center.x)
            .abs()
            .max((self.position.z - center.z).abs())
    }

    /// Euclidean horizontal distance from the agent to the centre of `cell`.
    #[must_use]
    pub fn horizontal_distance_to(&self, cell: CellPos) -> f64 {
        let center = cell.center();
        (self.position.x - center.x).hypot(self.position.z - center.z)
    }
}
