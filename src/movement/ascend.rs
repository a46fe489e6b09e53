//! Stepping up one block onto an adjacent column.

use hashbrown::HashSet;

use crate::block::Material;
use crate::cell::{CellPos, Direction};
use crate::classifier::{can_walk_on, can_walk_through, is_replaceable};
use crate::constants::{WALK_ONE_BLOCK_COST, WALK_ONE_OVER_SOUL_SAND_COST};
use crate::context::CalculationContext;
use crate::cost::{jump_one_block_cost, Cost};
use crate::input::Input;

use super::helper::{self, PlaceResult};
use super::{Footprint, MovementState, MovementStatus, Routine, TickEnv};

/// Ticks without a floor after which the agent backs off to make room.
const BACK_OFF_AFTER_TICKS: u32 = 10;

/// Per-kind execution state of an ascend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ascend {
    ticks_without_placement: u32,
}

impl Ascend {
    pub(crate) const fn new() -> Self {
        Self {
            ticks_without_placement: 0,
        }
    }
}

pub(crate) fn footprint(src: CellPos, dest: CellPos) -> Footprint {
    Footprint::new(
        src,
        dest,
        vec![dest, src.up_by(2), dest.up()],
        Some(dest.down()),
    )
}

/// Cost of stepping up from `src` onto `dest`.
#[must_use]
pub fn cost(ctx: &CalculationContext<'_>, src: CellPos, dest: CellPos) -> Cost {
    let world = ctx.world();
    let policy = ctx.policy();
    let floor_pos = dest.down();
    let floor = ctx.get(floor_pos);
    let mut placement = Cost::ZERO;
    if !can_walk_on(world, policy, floor_pos, floor) {
        placement = ctx.cost_of_placing_at(floor_pos, floor);
        if !placement.is_feasible() || !is_replaceable(world, floor_pos, floor) {
            return Cost::Infeasible;
        }
        // The source column is vacated by the time the floor is needed.
        if !helper::has_place_option(ctx, floor_pos, Some(src)) {
            return Cost::Infeasible;
        }
    }

    let above_head = ctx.get(src.up_by(2));
    let src_up = src.up();
    if ctx.get(src.up_by(3)).is_falling_prone()
        && (can_walk_through(world, policy, src_up, ctx.get(src_up)) || !above_head.is_falling_prone())
    {
        // Breaking the block overhead would drop the one above onto us.
        return Cost::Infeasible;
    }

    let src_floor = ctx.get(src.down());
    if src_floor.is_climbable() {
        return Cost::Infeasible;
    }
    let from_slab = src_floor.is_bottom_slab();
    let to_slab = floor.is_bottom_slab();
    if from_slab && !to_slab {
        return Cost::Infeasible;
    }
    let jump_or_walk = jump_one_block_cost().max(WALK_ONE_BLOCK_COST);
    let walk = if to_slab {
        if from_slab {
            jump_or_walk + ctx.jump_penalty()
        } else {
            WALK_ONE_BLOCK_COST
        }
    } else if floor.material == Material::SoulSand {
        WALK_ONE_OVER_SOUL_SAND_COST + ctx.jump_penalty()
    } else {
        jump_or_walk + ctx.jump_penalty()
    };

    let mut total = Cost::finite(walk) + placement;
    total += helper::mining_duration(ctx, src.up_by(2), above_head, false);
    if !total.is_feasible() {
        return total;
    }
    total += helper::mining_duration_at(ctx, dest, false);
    if !total.is_feasible() {
        return total;
    }
    total + helper::mining_duration_at(ctx, dest.up(), true)
}

impl Routine for Ascend {
    fn cost(&mut self, ctx: &CalculationContext<'_>, footprint: &Footprint) -> Cost {
        if footprint.direction().is_none() || footprint.dest.y != footprint.src.y + 1 {
            return Cost::Infeasible;
        }
        cost(ctx, footprint.src, footprint.dest)
    }

    fn valid_positions(&self, footprint: &Footprint) -> HashSet<CellPos> {
        let (src, dest) = (footprint.src, footprint.dest);
        let mut cells: HashSet<CellPos> = [src, src.up(), dest].into_iter().collect();
        if let Some(dir) = footprint.direction() {
            let behind = src.step(dir.opposite());
            cells.extend([behind, behind.up(), dest.step(dir)]);
        }
        cells
    }

    fn before_tick(&self, footprint: &Footprint, state: &mut MovementState, env: &TickEnv<'_>) {
        if env.agent.feet().y < footprint.src.y {
            state.set_status(MovementStatus::Unreachable);
        }
    }

    fn tick(&mut self, footprint: &Footprint, state: &mut MovementState, env: &TickEnv<'_>) {
        let (src, dest) = (footprint.src, footprint.dest);
        let agent = env.agent;
        let feet = agent.feet();
        let overshoot = footprint.direction().map(|dir| dest.step(dir));
        if feet == dest || Some(feet) == overshoot {
            state.set_status(MovementStatus::Success);
            return;
        }

        let floor = dest.down();
        let jumping_onto = env.block(floor);
        if !env.can_walk_on(floor) {
            self.ticks_without_placement += 1;
            if helper::attempt_to_place(state, env, floor, false, true) == PlaceResult::ReadyToPlace {
                state.set_input(Input::Sneak, true);
                if agent.sneaking {
                    state.click_right(floor);
                }
            }
            if self.ticks_without_placement > BACK_OFF_AFTER_TICKS {
                state.set_input(Input::MoveBack, true);
            }
            return;
        }

        helper::move_towards(state, env, dest);
        if jumping_onto.is_bottom_slab() && !env.block(src.down()).is_bottom_slab() {
            // Walk straight onto the slab rather than jumping.
            return;
        }
        if feet == src.up() {
            return;
        }

        let x_axis = f64::from((src.x - dest.x).abs());
        let z_axis = f64::from((src.z - dest.z).abs());
        let center = dest.center();
        let flat_to_next =
            x_axis * (center.x - agent.position.x).abs() + z_axis * (center.z - agent.position.z).abs();
        let side =
            z_axis * (center.x - agent.position.x).abs() + x_axis * (center.z - agent.position.z).abs();
        let lateral = x_axis * agent.velocity.z + z_axis * agent.velocity.x;
        if lateral.abs() > 0.1 {
            return;
        }
        if head_bonk_clear(src, env) {
            state.set_input(Input::Jump, true);
            return;
        }
        if flat_to_next > 1.2 || side > 0.2 {
            return;
        }
        state.set_input(Input::Jump, true);
    }

    fn safe_to_cancel(&self, _footprint: &Footprint, state: &MovementState, _env: &TickEnv<'_>) -> bool {
        state.status() != MovementStatus::Running || self.ticks_without_placement == 0
    }

    fn reset(&mut self) {
        self.ticks_without_placement = 0;
    }
}

/// Whether the cells above the source's horizontal neighbours are open, so
/// an early jump cannot hit a ceiling.
fn head_bonk_clear(src: CellPos, env: &TickEnv<'_>) -> bool {
    let start = src.up_by(2);
    Direction::HORIZONTALS
        .iter()
        .all(|dir| env.can_walk_through(start.step(*dir)))
}
