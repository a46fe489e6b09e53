//! Walking one block diagonally, optionally stepping up or down one block.
//!
//! A diagonal needs at least one of its two elbow columns open. When only
//! one is, the agent edges around the corner at a small speed penalty and
//! without sprinting.

use std::f64::consts::SQRT_2;

use glam::DVec3;
use hashbrown::HashSet;

use crate::block::{BlockState, Material};
use crate::cell::CellPos;
use crate::classifier::{
    avoid_walking_into, can_use_frost_walker, can_walk_on, can_walk_through, fully_passable,
    must_be_solid_to_walk_on,
};
use crate::constants::{
    CENTER_AFTER_FALL_COST, DIAGONAL_EDGING_FACTOR, SPRINT_MULTIPLIER, WALK_ONE_BLOCK_COST,
    WALK_ONE_OVER_SOUL_SAND_COST,
};
use crate::context::CalculationContext;
use crate::cost::{fall_n_blocks_cost, jump_one_block_cost, Cost};
use crate::input::Input;
use crate::settings::Settings;

use super::helper;
use super::moves::MoveResult;
use super::{Footprint, MovementState, MovementStatus, Routine, TickEnv};

/// Offset from the agent's centre used to look for support in a corner.
const CORNER_PROBE: f64 = 0.25;

/// Number of elbow cells at the front of the footprint's break list.
const ELBOW_CELLS: usize = 4;

/// Extra cost of one of the two halves of the step being on soul sand.
const SOUL_SAND_HALF: f64 = (WALK_ONE_OVER_SOUL_SAND_COST - WALK_ONE_BLOCK_COST) / 2.0;

/// Per-kind execution state of a diagonal. Diagonals carry none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagonal;

impl Diagonal {
    pub(crate) const fn new() -> Self {
        Self
    }
}

/// The two elbow columns at source level: `(src.x, dest.z)` then
/// `(dest.x, src.z)`.
const fn elbows(src: CellPos, dest: CellPos) -> (CellPos, CellPos) {
    (
        CellPos::new(src.x, src.y, dest.z),
        CellPos::new(dest.x, src.y, src.z),
    )
}

pub(crate) fn footprint(src: CellPos, dest: CellPos) -> Footprint {
    let (a, b) = elbows(src, dest);
    Footprint::new(src, dest, vec![a, a.up(), b, b.up(), dest, dest.up()], None)
}

/// Works out the diagonal step from `src` towards column `(dest_x, dest_z)`:
/// flat, one up, or one down depending on the terrain.
#[must_use]
pub fn calculate(
    ctx: &CalculationContext<'_>,
    src: CellPos,
    dest_x: i32,
    dest_z: i32,
) -> Option<MoveResult> {
    let world = ctx.world();
    let policy = ctx.policy();
    let (x, y, z) = (src.x, src.y, src.z);
    let passable = |pos: CellPos| can_walk_through(world, policy, pos, ctx.get(pos));

    if !passable(CellPos::new(dest_x, y + 1, dest_z)) {
        return None;
    }
    let dest_into_pos = CellPos::new(dest_x, y, dest_z);
    let dest_into = ctx.get(dest_into_pos);
    let from_down = ctx.get(src.down());
    let mut ascend = false;
    let mut descend = false;
    let mut frost_walker = false;
    let dest_walk_on: BlockState;
    if can_walk_through(world, policy, dest_into_pos, dest_into) {
        let walk_on_pos = dest_into_pos.down();
        dest_walk_on = ctx.get(walk_on_pos);
        let standing_on_block = must_be_solid_to_walk_on(world, policy, src.down(), from_down);
        frost_walker = standing_on_block && can_use_frost_walker(ctx.frost_walker(), dest_walk_on);
        if !frost_walker && !can_walk_on(world, policy, walk_on_pos, dest_walk_on) {
            descend = true;
            let landing = walk_on_pos.down();
            if !ctx.allow_diagonal_descend()
                || !can_walk_on(world, policy, landing, ctx.get(landing))
                || !can_walk_through(world, policy, walk_on_pos, dest_walk_on)
            {
                return None;
            }
        }
        frost_walker &= !policy.assume_walk_on_water;
    } else {
        ascend = true;
        if !ctx.allow_diagonal_ascend()
            || !passable(src.up_by(2))
            || !can_walk_on(world, policy, dest_into_pos, dest_into)
            || !passable(CellPos::new(dest_x, y + 2, dest_z))
        {
            return None;
        }
        dest_walk_on = dest_into;
    }

    let mut multiplier = WALK_ONE_BLOCK_COST;
    if dest_walk_on.material == Material::SoulSand {
        multiplier += SOUL_SAND_HALF;
    } else if !frost_walker && dest_walk_on.is_water() {
        multiplier += ctx.walk_on_water_one_penalty() * SQRT_2;
    }
    if from_down.is_climbable() {
        return None;
    }
    if from_down.material == Material::SoulSand {
        multiplier += SOUL_SAND_HALF;
    }
    let cuts_hazard = |pos: CellPos| {
        let state = ctx.get(pos);
        state.material == Material::Magma || state.is_lava()
    };
    if cuts_hazard(CellPos::new(x, y - 1, dest_z)) || cuts_hazard(CellPos::new(dest_x, y - 1, z)) {
        return None;
    }

    let start = ctx.get(src);
    let mut water = false;
    if start.is_water() || dest_into.is_water() {
        if ascend {
            return None;
        }
        // Floating: whatever is underneath no longer matters.
        multiplier = ctx.water_walk_speed();
        water = true;
    }

    let (a, b) = elbows(src, CellPos::new(dest_x, y, dest_z));
    let pb0 = ctx.get(a);
    let pb2 = ctx.get(b);
    if ascend {
        let a_top = passable(a.up_by(2));
        let a_mid = passable(a.up());
        let a_low = can_walk_through(world, policy, a, pb0);
        let b_top = passable(b.up_by(2));
        let b_mid = passable(b.up());
        let b_low = can_walk_through(world, policy, b, pb2);
        let no_option = !(a_top && a_mid && a_low) && !(b_top && b_mid && b_low);
        let plain_ascend_a = a_top && a_mid && can_walk_on(world, policy, a, pb0);
        let plain_ascend_b = b_top && b_mid && can_walk_on(world, policy, b, pb2);
        let head_bonk = (!a_top && a_mid && a_low) || (!b_top && b_mid && b_low);
        if no_option
            || avoid_walking_into(pb0)
            || avoid_walking_into(pb2)
            || plain_ascend_a
            || plain_ascend_b
            || head_bonk
        {
            return None;
        }
        return Some(MoveResult {
            dest: CellPos::new(dest_x, y + 1, dest_z),
            cost: Cost::finite(multiplier * SQRT_2 + jump_one_block_cost()),
            uses_bucket: false,
        });
    }

    let mut option_a = helper::mining_duration(ctx, a, pb0, false);
    let mut option_b = helper::mining_duration(ctx, b, pb2, false);
    if !option_a.is_zero() && !option_b.is_zero() {
        return None;
    }
    let pb1 = ctx.get(a.up());
    option_a += helper::mining_duration(ctx, a.up(), pb1, true);
    if !option_a.is_zero() && !option_b.is_zero() {
        return None;
    }
    let pb3 = ctx.get(b.up());
    if option_a.is_zero()
        && ((avoid_walking_into(pb2) && !pb2.is_water()) || avoid_walking_into(pb3))
    {
        return None;
    }
    option_b += helper::mining_duration(ctx, b.up(), pb3, true);
    if !option_a.is_zero() && !option_b.is_zero() {
        return None;
    }
    if option_b.is_zero()
        && ((avoid_walking_into(pb0) && !pb0.is_water()) || avoid_walking_into(pb1))
    {
        return None;
    }

    if option_a.is_zero() && option_b.is_zero() {
        if ctx.can_sprint() && !water {
            multiplier *= SPRINT_MULTIPLIER;
        }
    } else {
        // Edging round a corner would climb a climbable instead.
        if start.is_climbable() {
            return None;
        }
        multiplier *= DIAGONAL_EDGING_FACTOR;
    }

    let mut cost = multiplier * SQRT_2;
    let dest_y = if descend {
        cost += fall_n_blocks_cost(1).max(CENTER_AFTER_FALL_COST);
        y - 1
    } else {
        y
    };
    Some(MoveResult {
        dest: CellPos::new(dest_x, dest_y, dest_z),
        cost: Cost::finite(cost),
        uses_bucket: false,
    })
}

/// Cost of the diagonal step from `src` to `dest`.
#[must_use]
pub fn cost(ctx: &CalculationContext<'_>, src: CellPos, dest: CellPos) -> Cost {
    match calculate(ctx, src, dest.x, dest.z) {
        Some(result) if result.dest == dest => result.cost,
        _ => Cost::Infeasible,
    }
}

/// The four elbow cells, feet and head, that lead the footprint.
fn elbow_cells(footprint: &Footprint) -> &[CellPos] {
    footprint
        .positions_to_break
        .get(..ELBOW_CELLS)
        .unwrap_or_default()
}

/// Whether a sprint is safe: every elbow cell is wide open.
fn can_sprint(footprint: &Footprint, env: &TickEnv<'_>) -> bool {
    if env.block(env.agent.feet()).is_liquid() && !env.settings.sprint_in_water {
        return false;
    }
    elbow_cells(footprint)
        .iter()
        .all(|pos| fully_passable(env.block(*pos)))
}

impl Routine for Diagonal {
    fn cost(&mut self, ctx: &CalculationContext<'_>, footprint: &Footprint) -> Cost {
        let (src, dest) = (footprint.src, footprint.dest);
        if (dest.x - src.x).abs() != 1 || (dest.z - src.z).abs() != 1 || (dest.y - src.y).abs() > 1
        {
            return Cost::Infeasible;
        }
        cost(ctx, src, dest)
    }

    fn valid_positions(&self, footprint: &Footprint) -> HashSet<CellPos> {
        let (src, dest) = (footprint.src, footprint.dest);
        let (a, b) = elbows(src, dest);
        let mut cells: HashSet<CellPos> = [src, dest, a, b].into_iter().collect();
        if dest.y < src.y {
            cells.extend([dest.up(), a.down(), b.down()]);
        } else if dest.y > src.y {
            cells.extend([src.up(), a.up(), b.up()]);
        }
        cells
    }

    fn on_course(
        &self,
        footprint: &Footprint,
        valid: &HashSet<CellPos>,
        feet: CellPos,
        env: &TickEnv<'_>,
    ) -> bool {
        // Bobbing in water can put the feet a cell low.
        valid.contains(&feet) || (env.block(footprint.src).is_liquid() && valid.contains(&feet.up()))
    }

    fn tick(&mut self, footprint: &Footprint, state: &mut MovementState, env: &TickEnv<'_>) {
        let (src, dest) = (footprint.src, footprint.dest);
        let agent = env.agent;
        if agent.feet() == dest {
            state.set_status(MovementStatus::Success);
            return;
        }
        if dest.y > src.y
            && agent.position.y < f64::from(src.y) + 0.1
            && agent.collided_horizontally
        {
            state.set_input(Input::Jump, true);
        }
        if can_sprint(footprint, env) {
            state.set_input(Input::Sprint, true);
        }
        helper::move_towards(state, env, dest);
    }

    fn safe_to_cancel(&self, footprint: &Footprint, _state: &MovementState, env: &TickEnv<'_>) -> bool {
        let (src, dest) = (footprint.src, footprint.dest);
        let feet = env.agent.feet();
        if feet == src {
            return true;
        }
        let (a, b) = elbows(src, dest);
        if env.can_walk_on(a.down()) && env.can_walk_on(b.down()) {
            return true;
        }
        if feet != a && feet != b {
            return true;
        }
        // Wedged in an elbow: some corner of the body must still be supported.
        let below = env.agent.position - DVec3::Y;
        [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)]
            .iter()
            .map(|(sx, sz)| {
                CellPos::containing(below + DVec3::new(sx * CORNER_PROBE, 0.0, sz * CORNER_PROBE))
            })
            .any(|cell| env.can_walk_on(cell))
    }

    fn timeout(&self, settings: &Settings) -> Option<u32> {
        Some(settings.diagonal_timeout_ticks)
    }

    fn prepares(&self) -> bool {
        false
    }

    fn break_cells<'f>(&self, footprint: &'f Footprint) -> &'f [CellPos] {
        footprint
            .positions_to_break
            .get(ELBOW_CELLS..)
            .unwrap_or_default()
    }

    fn walk_into_cells<'f>(&self, footprint: &'f Footprint) -> &'f [CellPos] {
        elbow_cells(footprint)
    }
}
