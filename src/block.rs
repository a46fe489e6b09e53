//! Block materials and the per-cell block state read from the world.
//!
//! A [`BlockState`] is a small `Copy` value: a [`Material`] plus the handful
//! of properties the movement layer inspects (slab half, liquid level,
//! ladder facing, snow layers, door state). The physical attributes of each
//! material live in `const fn` tables on [`Material`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::Direction;
use crate::inventory::{ToolKind, ToolTier};

/// The kind of block occupying a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Material {
    /// Empty space.
    #[default]
    Air,
    /// Natural stone.
    Stone,
    /// Cobblestone, the usual throwaway block.
    Cobblestone,
    /// Dirt.
    Dirt,
    /// Grass-covered dirt.
    Grass,
    /// Wooden planks.
    Planks,
    /// A tree trunk.
    Log,
    /// Tree leaves.
    Leaves,
    /// Glass.
    Glass,
    /// Sand; falls when unsupported.
    Sand,
    /// Gravel; falls when unsupported.
    Gravel,
    /// Unbreakable floor.
    Bedrock,
    /// Obsidian.
    Obsidian,
    /// Water, source or flowing.
    Water,
    /// Lava, source or flowing.
    Lava,
    /// A climbable ladder.
    Ladder,
    /// Climbable vines.
    Vine,
    /// Soul sand; slows walking.
    SoulSand,
    /// Magma; damages anything standing on it.
    Magma,
    /// Cactus; damages on contact.
    Cactus,
    /// Fire.
    Fire,
    /// Cobweb; traps on contact.
    Cobweb,
    /// A slab, bottom, top or double.
    Slab,
    /// Stairs.
    Stairs,
    /// Farmland, slightly lower than a full block.
    Farmland,
    /// A grass path, slightly lower than a full block.
    GrassPath,
    /// Snow layers.
    Snow,
    /// A carpet.
    Carpet,
    /// Tall grass.
    TallGrass,
    /// A fern.
    Fern,
    /// A flower.
    Flower,
    /// A torch.
    Torch,
    /// Ice; slippery and melts when broken.
    Ice,
    /// A wooden door.
    Door,
    /// An iron door, which cannot be opened by hand.
    IronDoor,
    /// A fence gate.
    FenceGate,
    /// A fence.
    Fence,
    /// A lily pad floating on water.
    LilyPad,
    /// A chest.
    Chest,
    /// Stone hiding a hostile creature.
    InfestedStone,
    /// An invisible wall.
    Barrier,
    /// An end portal.
    EndPortal,
    /// A trapdoor.
    Trapdoor,
    /// A tripwire.
    Tripwire,
    /// A mob head.
    Skull,
    /// A thorny berry bush.
    SweetBerryBush,
    /// Netherrack.
    Netherrack,
}

impl Material {
    /// Every material, in declaration order.
    pub const ALL: [Self; 47] = [
        Self::Air,
        Self::Stone,
        Self::Cobblestone,
        Self::Dirt,
        Self::Grass,
        Self::Planks,
        Self::Log,
        Self::Leaves,
        Self::Glass,
        Self::Sand,
        Self::Gravel,
        Self::Bedrock,
        Self::Obsidian,
        Self::Water,
        Self::Lava,
        Self::Ladder,
        Self::Vine,
        Self::SoulSand,
        Self::Magma,
        Self::Cactus,
        Self::Fire,
        Self::Cobweb,
        Self::Slab,
        Self::Stairs,
        Self::Farmland,
        Self::GrassPath,
        Self::Snow,
        Self::Carpet,
        Self::TallGrass,
        Self::Fern,
        Self::Flower,
        Self::Torch,
        Self::Ice,
        Self::Door,
        Self::IronDoor,
        Self::FenceGate,
        Self::Fence,
        Self::LilyPad,
        Self::Chest,
        Self::InfestedStone,
        Self::Barrier,
        Self::EndPortal,
        Self::Trapdoor,
        Self::Tripwire,
        Self::Skull,
        Self::SweetBerryBush,
        Self::Netherrack,
    ];

    /// Hardness used by the break-speed formula. Negative means unbreakable.
    #[must_use]
    pub const fn hardness(self) -> f64 {
        match self {
            Self::Air
            | Self::Fire
            | Self::TallGrass
            | Self::Fern
            | Self::Flower
            | Self::Torch
            | Self::LilyPad
            | Self::Tripwire
            | Self::SweetBerryBush => 0.0,
            Self::Snow | Self::Carpet => 0.1,
            Self::Leaves | Self::Vine => 0.2,
            Self::Glass => 0.3,
            Self::Ladder | Self::Cactus | Self::Netherrack => 0.4,
            Self::Dirt | Self::Sand | Self::SoulSand | Self::Magma | Self::Ice => 0.5,
            Self::Grass | Self::Gravel | Self::Farmland => 0.6,
            Self::GrassPath => 0.65,
            Self::InfestedStone => 0.75,
            Self::Skull => 1.0,
            Self::Stone => 1.5,
            Self::Cobblestone
            | Self::Planks
            | Self::Log
            | Self::Slab
            | Self::Stairs
            | Self::FenceGate
            | Self::Fence => 2.0,
            Self::Chest => 2.5,
            Self::Door | Self::Trapdoor => 3.0,
            Self::Cobweb => 4.0,
            Self::IronDoor => 5.0,
            Self::Obsidian => 50.0,
            Self::Bedrock | Self::Water | Self::Lava | Self::Barrier | Self::EndPortal => -1.0,
        }
    }

    /// The tool class that mines this material fastest.
    #[must_use]
    pub const fn preferred_tool(self) -> Option<ToolKind> {
        match self {
            Self::Stone
            | Self::Cobblestone
            | Self::Obsidian
            | Self::Magma
            | Self::IronDoor
            | Self::Netherrack
            | Self::Ice
            | Self::Slab
            | Self::Stairs => Some(ToolKind::Pickaxe),
            Self::Planks
            | Self::Log
            | Self::Door
            | Self::FenceGate
            | Self::Fence
            | Self::Chest
            | Self::Ladder
            | Self::Trapdoor => Some(ToolKind::Axe),
            Self::Dirt
            | Self::Grass
            | Self::Sand
            | Self::Gravel
            | Self::SoulSand
            | Self::Farmland
            | Self::GrassPath
            | Self::Snow => Some(ToolKind::Shovel),
            Self::Leaves | Self::Vine | Self::Cobweb => Some(ToolKind::Shears),
            _ => None,
        }
    }

    /// The lowest tool tier that yields a drop, for materials that need one.
    #[must_use]
    pub const fn harvest_requirement(self) -> Option<(ToolKind, ToolTier)> {
        match self {
            Self::Stone
            | Self::Cobblestone
            | Self::Magma
            | Self::Netherrack
            | Self::Slab
            | Self::Stairs
            | Self::IronDoor => Some((ToolKind::Pickaxe, ToolTier::Wood)),
            Self::Obsidian => Some((ToolKind::Pickaxe, ToolTier::Diamond)),
            _ => None,
        }
    }

    /// Whether the material stops movement in the ordinary case.
    #[must_use]
    pub const fn blocks_movement(self) -> bool {
        !matches!(
            self,
            Self::Air
                | Self::Water
                | Self::Lava
                | Self::Ladder
                | Self::Vine
                | Self::Fire
                | Self::Cobweb
                | Self::Snow
                | Self::Carpet
                | Self::TallGrass
                | Self::Fern
                | Self::Flower
                | Self::Torch
                | Self::LilyPad
                | Self::EndPortal
                | Self::Tripwire
                | Self::Skull
                | Self::SweetBerryBush
        )
    }

    /// Whether a full, opaque cube of this material fills the cell.
    #[must_use]
    pub const fn is_full_cube(self) -> bool {
        matches!(
            self,
            Self::Stone
                | Self::Cobblestone
                | Self::Dirt
                | Self::Grass
                | Self::Planks
                | Self::Log
                | Self::Leaves
                | Self::Sand
                | Self::Gravel
                | Self::Bedrock
                | Self::Obsidian
                | Self::SoulSand
                | Self::Magma
                | Self::Ice
                | Self::InfestedStone
                | Self::Barrier
                | Self::Netherrack
        )
    }

    /// Whether the block drops when the cell beneath it empties.
    #[must_use]
    pub const fn falls(self) -> bool {
        matches!(self, Self::Sand | Self::Gravel)
    }

    /// Whether the material is a liquid.
    #[must_use]
    pub const fn is_liquid(self) -> bool {
        matches!(self, Self::Water | Self::Lava)
    }

    /// Whether a placed block simply replaces this material.
    #[must_use]
    pub const fn is_replaceable(self) -> bool {
        matches!(
            self,
            Self::Air
                | Self::Water
                | Self::Lava
                | Self::TallGrass
                | Self::Fern
                | Self::Vine
                | Self::Fire
                | Self::Snow
        )
    }

    /// Whether the material can be climbed.
    #[must_use]
    pub const fn is_climbable(self) -> bool {
        matches!(self, Self::Ladder | Self::Vine)
    }

    /// Whether walking into this material hurts or traps the agent.
    #[must_use]
    pub const fn is_hazard(self) -> bool {
        matches!(
            self,
            Self::Water
                | Self::Lava
                | Self::Magma
                | Self::Cactus
                | Self::SweetBerryBush
                | Self::Fire
                | Self::EndPortal
                | Self::Cobweb
        )
    }

    /// Surface friction. Higher values slide further.
    #[must_use]
    pub const fn slipperiness(self) -> f64 {
        match self {
            Self::Ice => 0.98,
            _ => 0.6,
        }
    }

    /// Multiplier applied to walking speed on top of this material.
    #[must_use]
    pub const fn speed_factor(self) -> f64 {
        match self {
            Self::SoulSand => 0.4,
            _ => 1.0,
        }
    }

    /// Multiplier applied to jump velocity on top of this material.
    #[must_use]
    pub const fn jump_factor(self) -> f64 {
        1.0
    }

    /// Bit index used by [`MaterialSet`].
    const fn bit(self) -> u64 {
        1_u64 << (self as u8)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Which half of the cell a slab occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SlabHalf {
    /// Lower half.
    #[default]
    Bottom,
    /// Upper half.
    Top,
    /// Both halves.
    Double,
}

/// Material-specific properties of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockProps {
    /// Slab half, for slabs.
    pub slab: SlabHalf,
    /// Liquid level: zero is a source, higher values are flowing.
    pub level: u8,
    /// Direction a ladder faces; the supporting wall is behind it.
    pub facing: Option<Direction>,
    /// Snow layer count, one to eight.
    pub layers: u8,
    /// Whether a door, gate or trapdoor is open.
    pub open: bool,
}

/// The contents of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockState {
    /// What the block is made of.
    pub material: Material,
    /// Material-specific properties.
    pub props: BlockProps,
}

impl BlockState {
    /// Empty space.
    pub const AIR: Self = Self::of(Material::Air);

    /// A block of `material` with default properties.
    #[must_use]
    pub const fn of(material: Material) -> Self {
        let layers = if matches!(material, Material::Snow) { 1 } else { 0 };
        Self {
            material,
            props: BlockProps {
                slab: SlabHalf::Bottom,
                level: 0,
                facing: None,
                layers,
                open: false,
            },
        }
    }

    /// A slab occupying `half`.
    #[must_use]
    pub const fn slab(half: SlabHalf) -> Self {
        let mut state = Self::of(Material::Slab);
        state.props.slab = half;
        state
    }

    /// Water at the given level; zero is a still source.
    #[must_use]
    pub const fn water(level: u8) -> Self {
        let mut state = Self::of(Material::Water);
        state.props.level = level;
        state
    }

    /// Lava at the given level.
    #[must_use]
    pub const fn lava(level: u8) -> Self {
        let mut state = Self::of(Material::Lava);
        state.props.level = level;
        state
    }

    /// A ladder facing away from the wall it hangs on.
    #[must_use]
    pub const fn ladder(facing: Direction) -> Self {
        let mut state = Self::of(Material::Ladder);
        state.props.facing = Some(facing);
        state
    }

    /// A snow cover of `layers` layers.
    #[must_use]
    pub const fn snow(layers: u8) -> Self {
        let mut state = Self::of(Material::Snow);
        state.props.layers = layers;
        state
    }

    /// Returns a copy with the open flag set.
    #[must_use]
    pub const fn with_open(mut self, open: bool) -> Self {
        self.props.open = open;
        self
    }

    /// Whether the cell is empty.
    #[must_use]
    pub const fn is_air(self) -> bool {
        matches!(self.material, Material::Air)
    }

    /// Whether the cell holds a liquid.
    #[must_use]
    pub const fn is_liquid(self) -> bool {
        self.material.is_liquid()
    }

    /// Whether the cell holds water.
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self.material, Material::Water)
    }

    /// Whether the cell holds lava.
    #[must_use]
    pub const fn is_lava(self) -> bool {
        matches!(self.material, Material::Lava)
    }

    /// Whether the cell is a liquid source.
    #[must_use]
    pub const fn is_source(self) -> bool {
        self.is_liquid() && self.props.level == 0
    }

    /// Whether the block falls when unsupported.
    #[must_use]
    pub const fn is_falling_prone(self) -> bool {
        self.material.falls()
    }

    /// Whether the cell is a ladder or vine.
    #[must_use]
    pub const fn is_climbable(self) -> bool {
        self.material.is_climbable()
    }

    /// Whether the cell is a bottom slab.
    #[must_use]
    pub const fn is_bottom_slab(self) -> bool {
        matches!(self.material, Material::Slab) && matches!(self.props.slab, SlabHalf::Bottom)
    }

    /// Whether the cell holds a single slab of either half.
    #[must_use]
    pub const fn is_half_slab(self) -> bool {
        matches!(self.material, Material::Slab) && !matches!(self.props.slab, SlabHalf::Double)
    }

    /// Whether a full, opaque cube fills the cell.
    #[must_use]
    pub const fn is_full_cube(self) -> bool {
        self.material.is_full_cube()
            || (matches!(self.material, Material::Slab) && matches!(self.props.slab, SlabHalf::Double))
    }

    /// Whether the cell holds an openable door or gate.
    #[must_use]
    pub const fn is_openable(self) -> bool {
        matches!(
            self.material,
            Material::Door | Material::FenceGate | Material::Trapdoor
        )
    }

    /// Whether a ray aimed at the cell can strike the block.
    #[must_use]
    pub const fn is_targetable(self) -> bool {
        !self.is_air() && !self.is_liquid()
    }

    /// Mining hardness; negative when unbreakable.
    #[must_use]
    pub const fn hardness(self) -> f64 {
        self.material.hardness()
    }

    /// Height of the collision box from the bottom of the cell, or `None`
    /// when the agent passes through.
    #[must_use]
    pub fn collision_height(self) -> Option<f64> {
        match self.material {
            Material::Slab => match self.props.slab {
                SlabHalf::Bottom => Some(0.5),
                SlabHalf::Top | SlabHalf::Double => Some(1.0),
            },
            Material::Snow if self.props.layers > 1 => {
                Some(f64::from(self.props.layers - 1) / 8.0)
            }
            Material::Farmland | Material::GrassPath => Some(0.9375),
            Material::SoulSand => Some(0.875),
            Material::LilyPad => Some(0.015_625),
            Material::Carpet => Some(0.0625),
            Material::Door | Material::IronDoor | Material::Trapdoor | Material::FenceGate
                if self.props.open =>
            {
                None
            }
            Material::Fence | Material::FenceGate => Some(1.5),
            material if material.blocks_movement() => Some(1.0),
            _ => None,
        }
    }

    /// Surface slipperiness of the block.
    #[must_use]
    pub const fn slipperiness(self) -> f64 {
        self.material.slipperiness()
    }

    /// Walking speed multiplier while standing on the block.
    #[must_use]
    pub const fn speed_factor(self) -> f64 {
        self.material.speed_factor()
    }

    /// Jump velocity multiplier while standing on the block.
    #[must_use]
    pub const fn jump_factor(self) -> f64 {
        self.material.jump_factor()
    }
}

impl From<Material> for BlockState {
    fn from(material: Material) -> Self {
        Self::of(material)
    }
}

/// A compact set of materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Material>", into = "Vec<Material>")]
pub struct MaterialSet(u64);

impl MaterialSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Builds a set from a slice of materials.
    #[must_use]
    pub const fn of(materials: &[Material]) -> Self {
        let mut bits = 0;
        let mut rest = materials;
        while let [first, tail @ ..] = rest {
            bits |= (*first).bit();
            rest = tail;
        }
        Self(bits)
    }

    /// Whether the set contains `material`.
    #[must_use]
    pub const fn contains(self, material: Material) -> bool {
        self.0 & material.bit() != 0
    }

    /// Adds `material` to the set.
    pub fn insert(&mut self, material: Material) {
        self.0 |= material.bit();
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the members in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Material> {
        Material::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl From<Vec<Material>> for MaterialSet {
    fn from(materials: Vec<Material>) -> Self {
        Self::of(&materials)
    }
}

impl From<MaterialSet> for Vec<Material> {
    fn from(set: MaterialSet) -> Self {
        set.iter().collect()
    }
}

impl FromIterator<Material> for MaterialSet {
    fn from_iter<I: IntoIterator<Item = Material>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for material in iter {
            set.insert(material);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn every_material_fits_the_set() {
        let all: MaterialSet = Material::ALL.into_iter().collect();
        for material in Material::ALL {
            assert!(all.contains(material), "{material} missing");
        }
        assert_eq!(all.iter().count(), Material::ALL.len());
    }

    #[test]
    fn material_set_round_trips_through_json() -> Result<(), serde_json::Error> {
        let set = MaterialSet::of(&[Material::Sand, Material::Ice]);
        let json = serde_json::to_string(&set)?;
        assert_eq!(json, r#"["sand","ice"]"#);
        let back: MaterialSet = serde_json::from_str(&json)?;
        assert_eq!(back, set);
        Ok(())
    }

    #[rstest]
    #[case::bottom(SlabHalf::Bottom, true, false)]
    #[case::top(SlabHalf::Top, false, false)]
    #[case::double(SlabHalf::Double, false, true)]
    fn slab_halves(#[case] half: SlabHalf, #[case] bottom: bool, #[case] full: bool) {
        let slab = BlockState::slab(half);
        assert_eq!(slab.is_bottom_slab(), bottom);
        assert_eq!(slab.is_full_cube(), full);
    }

    #[rstest]
    #[case::air(BlockState::AIR, None)]
    #[case::stone(BlockState::of(Material::Stone), Some(1.0))]
    #[case::bottom_slab(BlockState::slab(SlabHalf::Bottom), Some(0.5))]
    #[case::thin_snow(BlockState::snow(1), None)]
    #[case::open_door(BlockState::of(Material::Door).with_open(true), None)]
    #[case::closed_door(BlockState::of(Material::Door), Some(1.0))]
    fn collision_heights(#[case] state: BlockState, #[case] expected: Option<f64>) {
        assert_eq!(state.collision_height(), expected);
    }
}
