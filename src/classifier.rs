//! Block classification predicates.
//!
//! These functions answer the questions every cost function and tick routine
//! asks about a cell: can the agent stand in it, stand on it, place against
//! it, or break it without disturbing its neighbours. They take the world
//! view explicitly because several answers depend on adjacent cells.

use serde::{Deserialize, Serialize};

use crate::block::{BlockState, Material, MaterialSet};
use crate::cell::{CellPos, Direction};
use crate::world::WorldView;

/// Settings that change how blocks are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassifierPolicy {
    /// Treat still water as solid floor and never as passable.
    pub assume_walk_on_water: bool,
    /// Let the agent stand on vines.
    pub allow_vines: bool,
    /// Let the agent stand on bottom slabs.
    pub allow_walk_on_bottom_slab: bool,
    /// Refuse to break blocks that would let a falling block drop.
    pub avoid_updating_falling_blocks: bool,
    /// Materials the agent never walks through.
    pub blocks_to_avoid: MaterialSet,
}

/// Whether the agent's body may occupy the cell.
#[must_use]
pub fn can_walk_through(
    world: &dyn WorldView,
    policy: &ClassifierPolicy,
    pos: CellPos,
    state: BlockState,
) -> bool {
    match state.material {
        Material::Air => return true,
        Material::Fire
        | Material::Tripwire
        | Material::Cobweb
        | Material::EndPortal
        | Material::Skull
        | Material::Trapdoor => return false,
        _ => {}
    }
    if policy.blocks_to_avoid.contains(state.material) {
        return false;
    }
    match state.material {
        Material::Door | Material::FenceGate => true,
        Material::IronDoor => false,
        Material::Carpet => can_walk_on(world, policy, pos.down(), world.block_at(pos.down())),
        Material::Snow => {
            if !world.is_loaded(pos.x, pos.z) {
                return true;
            }
            if state.props.layers >= 3 {
                return false;
            }
            can_walk_on(world, policy, pos.down(), world.block_at(pos.down()))
        }
        Material::Water | Material::Lava => {
            if is_flowing(world, pos, state) {
                return false;
            }
            if policy.assume_walk_on_water {
                return false;
            }
            let above = world.block_at(pos.up());
            if above.is_liquid() || above.material == Material::LilyPad {
                return false;
            }
            state.is_water()
        }
        material => !material.blocks_movement(),
    }
}

/// Whether the cell is empty enough to jump through at speed.
///
/// Stricter than [`can_walk_through`]: climbables, doors, snow and liquids
/// all slow or catch the agent.
#[must_use]
pub fn fully_passable(state: BlockState) -> bool {
    match state.material {
        Material::Air => true,
        Material::Fire
        | Material::Tripwire
        | Material::Cobweb
        | Material::Vine
        | Material::Ladder
        | Material::Door
        | Material::IronDoor
        | Material::FenceGate
        | Material::Snow
        | Material::Water
        | Material::Lava
        | Material::Trapdoor
        | Material::EndPortal
        | Material::Skull
        | Material::Carpet
        | Material::LilyPad
        | Material::SweetBerryBush => false,
        material => !material.blocks_movement(),
    }
}

/// Whether the agent can stand on top of the cell.
#[must_use]
pub fn can_walk_on(
    world: &dyn WorldView,
    policy: &ClassifierPolicy,
    pos: CellPos,
    state: BlockState,
) -> bool {
    match state.material {
        Material::Air | Material::Magma => return false,
        _ => {}
    }
    if state.is_full_cube() {
        return true;
    }
    match state.material {
        Material::Ladder => true,
        Material::Vine => policy.allow_vines,
        Material::Farmland | Material::GrassPath | Material::Chest | Material::Glass => true,
        Material::Stairs => true,
        Material::Slab => policy.allow_walk_on_bottom_slab || !state.is_bottom_slab(),
        Material::Water => {
            let above = world.block_at(pos.up());
            if matches!(above.material, Material::LilyPad | Material::Carpet) {
                return true;
            }
            if is_flowing(world, pos, state) {
                return above.is_water() && !policy.assume_walk_on_water;
            }
            above.is_water() ^ policy.assume_walk_on_water
        }
        _ => false,
    }
}

/// Whether standing on the cell requires it to be solid ground rather than
/// a climbable or a body of water the agent is swimming in.
#[must_use]
pub fn must_be_solid_to_walk_on(
    world: &dyn WorldView,
    policy: &ClassifierPolicy,
    pos: CellPos,
    state: BlockState,
) -> bool {
    if state.is_climbable() {
        return false;
    }
    if state.is_liquid() {
        if policy.assume_walk_on_water {
            return false;
        }
        if world.block_at(pos.up()).is_liquid() {
            return false;
        }
    }
    true
}

/// Whether a block can be placed against a face of the cell.
#[must_use]
pub fn can_place_against(state: BlockState) -> bool {
    state.is_full_cube() || state.material == Material::Glass
}

/// Whether placing a block into the cell replaces its contents.
#[must_use]
pub fn is_replaceable(world: &dyn WorldView, pos: CellPos, state: BlockState) -> bool {
    if state.material == Material::Snow {
        if !world.is_loaded(pos.x, pos.z) {
            return true;
        }
        return state.props.layers == 1;
    }
    state.material.is_replaceable()
}

/// Whether the liquid in the cell, or one flowing into it, is moving.
#[must_use]
pub fn is_flowing(world: &dyn WorldView, pos: CellPos, state: BlockState) -> bool {
    if !state.is_liquid() {
        return false;
    }
    if state.props.level != 0 {
        return true;
    }
    Direction::HORIZONTALS.iter().any(|dir| {
        let neighbour = world.block_at(pos.step(*dir));
        neighbour.is_liquid() && neighbour.props.level != 0
    })
}

/// Whether the agent should never step into the cell.
#[must_use]
pub fn avoid_walking_into(state: BlockState) -> bool {
    state.material.is_hazard()
}

/// Whether breaking the cell is off limits: the block itself is protected
/// by policy, or a neighbour would fall or flow into the gap.
#[must_use]
pub fn avoid_breaking(
    world: &dyn WorldView,
    policy: &ClassifierPolicy,
    pos: CellPos,
    state: BlockState,
) -> bool {
    if matches!(state.material, Material::Ice | Material::InfestedStone) {
        return true;
    }
    avoid_adjacent_breaking(world, policy, pos.up(), true)
        || Direction::HORIZONTALS
            .iter()
            .any(|dir| avoid_adjacent_breaking(world, policy, pos.step(*dir), false))
}

fn avoid_adjacent_breaking(
    world: &dyn WorldView,
    policy: &ClassifierPolicy,
    pos: CellPos,
    directly_above: bool,
) -> bool {
    let state = world.block_at(pos);
    if !directly_above
        && state.is_falling_prone()
        && policy.avoid_updating_falling_blocks
        && can_fall_through(world.block_at(pos.down()))
    {
        return true;
    }
    state.is_liquid()
}

/// Whether a falling block would drop through the cell.
#[must_use]
pub const fn can_fall_through(state: BlockState) -> bool {
    state.is_air() || state.is_liquid() || state.material.is_replaceable()
}

/// Whether frost walker boots would freeze the cell into walkable ice.
#[must_use]
pub fn can_use_frost_walker(frost_walker: u8, state: BlockState) -> bool {
    frost_walker != 0 && state.is_water() && state.is_source()
}

/// Whether the cell at the foot of a climb has a solid neighbour to cling to.
#[must_use]
pub fn has_against(world: &dyn WorldView, pos: CellPos) -> bool {
    climb_against(world, pos).is_some()
}

/// The first solid horizontal neighbour of `pos`, checked north, south, west,
/// east.
#[must_use]
pub fn climb_against(world: &dyn WorldView, pos: CellPos) -> Option<CellPos> {
    Direction::HORIZONTALS
        .iter()
        .map(|dir| pos.step(*dir))
        .find(|neighbour| world.block_at(*neighbour).is_full_cube())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::SlabHalf;
    use crate::world::WorldSnapshot;
    use rstest::{fixture, rstest};

    #[fixture]
    fn policy() -> ClassifierPolicy {
        ClassifierPolicy {
            allow_vines: false,
            allow_walk_on_bottom_slab: true,
            ..ClassifierPolicy::default()
        }
    }

    const ORIGIN: CellPos = CellPos::new(0, 10, 0);

    fn world_with(pos: CellPos, state: BlockState) -> WorldSnapshot {
        let mut world = WorldSnapshot::new();
        world.set(pos, state);
        world
    }

    #[rstest]
    #[case::air(BlockState::AIR, true)]
    #[case::stone(BlockState::of(Material::Stone), false)]
    #[case::torch(BlockState::of(Material::Torch), true)]
    #[case::fire(BlockState::of(Material::Fire), false)]
    #[case::cobweb(BlockState::of(Material::Cobweb), false)]
    #[case::door(BlockState::of(Material::Door), true)]
    #[case::iron_door(BlockState::of(Material::IronDoor), false)]
    #[case::ladder(BlockState::ladder(Direction::North), true)]
    #[case::still_water(BlockState::water(0), true)]
    #[case::flowing_water(BlockState::water(3), false)]
    #[case::lava(BlockState::lava(0), false)]
    fn walk_through(policy: ClassifierPolicy, #[case] state: BlockState, #[case] expected: bool) {
        let world = world_with(ORIGIN, state);
        assert_eq!(can_walk_through(&world, &policy, ORIGIN, state), expected);
    }

    #[rstest]
    fn avoided_materials_block_the_path(mut policy: ClassifierPolicy) {
        let grass = BlockState::of(Material::TallGrass);
        let world = world_with(ORIGIN, grass);
        assert!(can_walk_through(&world, &policy, ORIGIN, grass));
        policy.blocks_to_avoid.insert(Material::TallGrass);
        assert!(!can_walk_through(&world, &policy, ORIGIN, grass));
    }

    #[rstest]
    #[case::stone(BlockState::of(Material::Stone), true)]
    #[case::magma(BlockState::of(Material::Magma), false)]
    #[case::glass(BlockState::of(Material::Glass), true)]
    #[case::top_slab(BlockState::slab(SlabHalf::Top), true)]
    #[case::ladder(BlockState::ladder(Direction::South), true)]
    #[case::vine(BlockState::of(Material::Vine), false)]
    #[case::air(BlockState::AIR, false)]
    #[case::torch(BlockState::of(Material::Torch), false)]
    fn walk_on(policy: ClassifierPolicy, #[case] state: BlockState, #[case] expected: bool) {
        let world = world_with(ORIGIN, state);
        assert_eq!(can_walk_on(&world, &policy, ORIGIN, state), expected);
    }

    #[rstest]
    fn bottom_slabs_follow_policy(mut policy: ClassifierPolicy) {
        let slab = BlockState::slab(SlabHalf::Bottom);
        let world = world_with(ORIGIN, slab);
        assert!(can_walk_on(&world, &policy, ORIGIN, slab));
        policy.allow_walk_on_bottom_slab = false;
        assert!(!can_walk_on(&world, &policy, ORIGIN, slab));
    }

    #[rstest]
    fn water_is_floor_only_when_submerged(mut policy: ClassifierPolicy) {
        let water = BlockState::water(0);
        let mut world = world_with(ORIGIN, water);
        assert!(!can_walk_on(&world, &policy, ORIGIN, water));
        world.set(ORIGIN.up(), water);
        assert!(can_walk_on(&world, &policy, ORIGIN, water));
        policy.assume_walk_on_water = true;
        assert!(!can_walk_on(&world, &policy, ORIGIN, water));
    }

    #[rstest]
    fn breaking_under_a_liquid_is_avoided(policy: ClassifierPolicy) {
        let stone = BlockState::of(Material::Stone);
        let mut world = world_with(ORIGIN, stone);
        assert!(!avoid_breaking(&world, &policy, ORIGIN, stone));
        world.set(ORIGIN.up(), BlockState::water(0));
        assert!(avoid_breaking(&world, &policy, ORIGIN, stone));
    }

    #[rstest]
    fn breaking_beside_unsupported_sand_follows_policy(mut policy: ClassifierPolicy) {
        let stone = BlockState::of(Material::Stone);
        let mut world = world_with(ORIGIN, stone);
        world.set(ORIGIN.step(Direction::East), Material::Sand);
        assert!(!avoid_breaking(&world, &policy, ORIGIN, stone));
        policy.avoid_updating_falling_blocks = true;
        assert!(avoid_breaking(&world, &policy, ORIGIN, stone));
    }

    #[test]
    fn flowing_neighbours_make_a_source_flow() {
        let mut world = world_with(ORIGIN, BlockState::water(0));
        assert!(!is_flowing(&world, ORIGIN, BlockState::water(0)));
        world.set(ORIGIN.step(Direction::West), BlockState::water(2));
        assert!(is_flowing(&world, ORIGIN, BlockState::water(0)));
    }

    #[rstest]
    #[case::air(BlockState::AIR, true)]
    #[case::ladder(BlockState::ladder(Direction::East), false)]
    #[case::flower(BlockState::of(Material::Flower), true)]
    #[case::snow(BlockState::snow(1), false)]
    fn fully_passable_cells(#[case] state: BlockState, #[case] expected: bool) {
        assert_eq!(fully_passable(state), expected);
    }

    #[test]
    fn only_single_snow_layers_are_replaceable() {
        let world = WorldSnapshot::new();
        assert!(is_replaceable(&world, ORIGIN, BlockState::snow(1)));
        assert!(!is_replaceable(&world, ORIGIN, BlockState::snow(4)));
        assert!(is_replaceable(&world, ORIGIN, BlockState::AIR));
        assert!(!is_replaceable(&world, ORIGIN, BlockState::of(Material::Dirt)));
    }
}
