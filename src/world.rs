//! Read access to the voxel world.
//!
//! [`WorldView`] is the seam between the movement layer and whatever owns
//! the blocks. [`WorldSnapshot`] is an owned, point-in-time copy that can be
//! moved to a background thread for cost calculation.

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::block::BlockState;
use crate::cell::CellPos;

/// Width of a chunk column in cells.
pub const CHUNK_WIDTH: i32 = 16;
/// Default lowest buildable layer.
pub const DEFAULT_MIN_Y: i32 = -64;
/// Default height limit: the first layer that cannot hold blocks.
pub const DEFAULT_MAX_Y: i32 = 320;

/// Read-only block lookup.
///
/// Implementations must be safe to share between threads because planners
/// may evaluate movements off the main thread.
pub trait WorldView: Send + Sync {
    /// The block at `pos`. Unloaded or out-of-range cells read as air.
    fn block_at(&self, pos: CellPos) -> BlockState;

    /// Whether the chunk column containing `(x, z)` is loaded.
    fn is_loaded(&self, x: i32, z: i32) -> bool;

    /// The horizontal world boundary.
    fn border(&self) -> WorldBorder {
        WorldBorder::UNBOUNDED
    }

    /// The lowest layer that can hold blocks.
    fn min_y(&self) -> i32 {
        DEFAULT_MIN_Y
    }

    /// The first layer above the buildable range.
    fn max_y(&self) -> i32 {
        DEFAULT_MAX_Y
    }

    /// An owned copy of the world suitable for background use.
    fn snapshot(&self) -> WorldSnapshot;
}

impl<W: WorldView + ?Sized> WorldView for Arc<W> {
    fn block_at(&self, pos: CellPos) -> BlockState {
        (**self).block_at(pos)
    }

    fn is_loaded(&self, x: i32, z: i32) -> bool {
        (**self).is_loaded(x, z)
    }

    fn border(&self) -> WorldBorder {
        (**self).border()
    }

    fn min_y(&self) -> i32 {
        (**self).min_y()
    }

    fn max_y(&self) -> i32 {
        (**self).max_y()
    }

    fn snapshot(&self) -> WorldSnapshot {
        (**self).snapshot()
    }
}

/// Axis-aligned horizontal limits of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBorder {
    /// Lowest x coordinate inside the border.
    pub min_x: i32,
    /// Highest x coordinate inside the border.
    pub max_x: i32,
    /// Lowest z coordinate inside the border.
    pub min_z: i32,
    /// Highest z coordinate inside the border.
    pub max_z: i32,
}

impl WorldBorder {
    /// A border that never constrains anything.
    pub const UNBOUNDED: Self = Self {
        min_x: i32::MIN,
        max_x: i32::MAX,
        min_z: i32::MIN,
        max_z: i32::MAX,
    };

    /// A square border centred on the origin.
    #[must_use]
    pub const fn square(radius: i32) -> Self {
        Self {
            min_x: -radius,
            max_x: radius,
            min_z: -radius,
            max_z: radius,
        }
    }

    /// Whether the column `(x, z)` lies inside the border.
    #[must_use]
    pub const fn contains(&self, x: i32, z: i32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }

    /// Whether a block may be placed in column `(x, z)`: strictly inside the
    /// border, never on its edge.
    #[must_use]
    pub const fn can_place_at(&self, x: i32, z: i32) -> bool {
        x > self.min_x && x < self.max_x && z > self.min_z && z < self.max_z
    }
}

impl Default for WorldBorder {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// An inclusive box of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Corner with the lowest coordinates.
    pub min: CellPos,
    /// Corner with the highest coordinates.
    pub max: CellPos,
}

impl Region {
    /// Builds a region from two arbitrary corners.
    #[must_use]
    pub fn spanning(a: CellPos, b: CellPos) -> Self {
        Self {
            min: CellPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: CellPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Whether `pos` lies inside the region.
    #[must_use]
    pub const fn contains(&self, pos: CellPos) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }
}

/// An owned map of non-air cells.
///
/// Every chunk is considered loaded unless [`WorldSnapshot::restrict_loaded`]
/// narrows the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldSnapshot {
    blocks: HashMap<CellPos, BlockState>,
    loaded_chunks: Option<HashSet<(i32, i32)>>,
    border: WorldBorder,
    min_y: i32,
    max_y: i32,
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldSnapshot {
    /// An empty, fully loaded world with default height limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: HashMap::new(),
            loaded_chunks: None,
            border: WorldBorder::UNBOUNDED,
            min_y: DEFAULT_MIN_Y,
            max_y: DEFAULT_MAX_Y,
        }
    }

    /// Sets the block at `pos`. Writing air clears the cell.
    pub fn set(&mut self, pos: CellPos, state: impl Into<BlockState>) {
        let block = state.into();
        if block.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, block);
        }
    }

    /// Clears the cell at `pos`.
    pub fn clear(&mut self, pos: CellPos) {
        self.blocks.remove(&pos);
    }

    /// Replaces the world border.
    #[must_use]
    pub fn with_border(mut self, border: WorldBorder) -> Self {
        self.border = border;
        self
    }

    /// Replaces the vertical limits.
    #[must_use]
    pub fn with_height_limits(mut self, min_y: i32, max_y: i32) -> Self {
        self.min_y = min_y;
        self.max_y = max_y;
        self
    }

    /// Marks only the listed chunk columns as loaded.
    #[must_use]
    pub fn restrict_loaded(mut self, chunks: impl IntoIterator<Item = (i32, i32)>) -> Self {
        self.loaded_chunks = Some(chunks.into_iter().collect());
        self
    }

    /// Number of non-air cells stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the snapshot stores no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Chunk column containing the cell column `(x, z)`.
    #[must_use]
    pub const fn chunk_of(x: i32, z: i32) -> (i32, i32) {
        (x.div_euclid(CHUNK_WIDTH), z.div_euclid(CHUNK_WIDTH))
    }
}

impl WorldView for WorldSnapshot {
    fn block_at(&self, pos: CellPos) -> BlockState {
        if pos.y < self.min_y || pos.y >= self.max_y || !self.is_loaded(pos.x, pos.z) {
            return BlockState::AIR;
        }
        self.blocks.get(&pos).copied().unwrap_or(BlockState::AIR)
    }

    fn is_loaded(&self, x: i32, z: i32) -> bool {
        self.loaded_chunks
            .as_ref()
            .map_or(true, |chunks| chunks.contains(&Self::chunk_of(x, z)))
    }

    fn border(&self) -> WorldBorder {
        self.border
    }

    fn min_y(&self) -> i32 {
        self.min_y
    }

    fn max_y(&self) -> i32 {
        self.max_y
    }

    fn snapshot(&self) -> WorldSnapshot {
        self.clone()
    }
}
