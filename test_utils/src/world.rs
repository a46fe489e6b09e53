//! Convenience constructors for voxel scenes used in tests.

use std::ops::RangeInclusive;

use tread::{BlockState, CellPos, Material, WorldSnapshot};

/// Fluent builder over a [`WorldSnapshot`].
///
/// # Examples
/// ```
/// use test_utils::WorldBuilder;
/// use tread::{CellPos, Material, WorldView};
/// let world = WorldBuilder::new()
///     .floor(9, -1..=1, -1..=1, Material::Stone)
///     .build();
/// assert_eq!(world.block_at(CellPos::new(1, 9, -1)).material, Material::Stone);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WorldBuilder {
    world: WorldSnapshot,
}

impl WorldBuilder {
    /// An empty world with the default height limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the rectangle `xs` × `zs` at height `y`.
    pub fn floor(
        mut self,
        y: i32,
        xs: RangeInclusive<i32>,
        zs: RangeInclusive<i32>,
        material: Material,
    ) -> Self {
        for x in xs {
            for z in zs.clone() {
                self.world.set(CellPos::new(x, y, z), material);
            }
        }
        self
    }

    /// Fills a vertical run of cells at `(x, z)`.
    pub fn column(mut self, x: i32, z: i32, ys: RangeInclusive<i32>, state: impl Into<BlockState>) -> Self {
        let block = state.into();
        for y in ys {
            self.world.set(CellPos::new(x, y, z), block);
        }
        self
    }

    /// Sets a single cell.
    pub fn block(mut self, pos: CellPos, state: impl Into<BlockState>) -> Self {
        self.world.set(pos, state);
        self
    }

    /// Empties a single cell.
    pub fn clear(mut self, pos: CellPos) -> Self {
        self.world.clear(pos);
        self
    }

    /// Finishes the scene.
    pub fn build(self) -> WorldSnapshot {
        self.world
    }
}

/// A square stone floor of the given half-width with its top face at `y + 1`.
pub fn flat_world(y: i32, radius: i32) -> WorldSnapshot {
    WorldBuilder::new()
        .floor(y, -radius..=radius, -radius..=radius, Material::Stone)
        .build()
}
