//! Drops of two or more blocks, optionally broken by placing water.

use glam::DVec3;
use hashbrown::HashSet;

use crate::block::{BlockState, Material};
use crate::cell::{CellPos, Direction};
use crate::classifier::{can_walk_on, can_walk_through, is_flowing};
use crate::constants::{LADDER_CATCH_HEIGHT, LADDER_DOWN_ONE_COST, WALK_OFF_BLOCK_COST};
use crate::context::CalculationContext;
use crate::cost::{fall_n_blocks_cost, Cost};
use crate::input::{Input, ItemRequest};
use crate::rotation::Rotation;

use super::descend;
use super::moves::MoveResult;
use super::{Footprint, MovementState, MovementStatus, Routine, TickEnv};

/// How far below the feet to look for a ladder to keep clear of.
const LADDER_SCAN_DEPTH: i32 = 15;

/// Per-kind execution state of a fall.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fall {
    uses_bucket: bool,
}

impl Fall {
    pub(crate) const fn new() -> Self {
        Self { uses_bucket: false }
    }

    pub(crate) const fn with_bucket(uses_bucket: bool) -> Self {
        Self { uses_bucket }
    }

    /// Whether the landing needs water placed to survive it.
    #[must_use]
    pub const fn uses_bucket(&self) -> bool {
        self.uses_bucket
    }
}

pub(crate) fn footprint(src: CellPos, dest: CellPos) -> Footprint {
    let column = (dest.y..=src.y + 1)
        .rev()
        .map(|y| CellPos::new(dest.x, y, dest.z))
        .collect();
    Footprint::new(src, dest, column, None)
}

/// Follows a drop down column `beside` (the cell next to `src` at source
/// level) until it finds somewhere to land.
///
/// `front_break` is the mining already needed to step into the column. The
/// fall is abandoned when it would release a falling block, passes through
/// anything solid, lands on something unwalkable, or is too high for the
/// agent's fall limits.
pub(crate) fn dynamic_fall_cost(
    ctx: &CalculationContext<'_>,
    src: CellPos,
    beside: CellPos,
    front_break: Cost,
    below: BlockState,
) -> Option<MoveResult> {
    let world = ctx.world();
    let policy = ctx.policy();
    let front = front_break.ticks()?;
    if front != 0.0 && ctx.get(beside.up_by(2)).is_falling_prone() {
        return None;
    }
    if !can_walk_through(world, policy, beside.down_by(2), below) {
        return None;
    }

    let mut so_far = 0.0;
    let mut effective_start = src.y;
    for fall_height in 3.. {
        let y = src.y - fall_height;
        if y < ctx.min_y() {
            return None;
        }
        let onto_pos = CellPos::new(beside.x, y, beside.z);
        let onto = ctx.get(onto_pos);
        let unprotected = u32::try_from(effective_start - y).ok()?;
        let fall = fall_n_blocks_cost(unprotected);

        if onto.is_water() {
            if !can_walk_through(world, policy, onto_pos, onto)
                || policy.assume_walk_on_water
                || is_flowing(world, onto_pos, onto)
            {
                return None;
            }
            let floor = onto_pos.down();
            if !can_walk_on(world, policy, floor, ctx.get(floor)) {
                return None;
            }
            return Some(MoveResult {
                dest: onto_pos,
                cost: Cost::finite(WALK_OFF_BLOCK_COST + fall * 0.5 + front + so_far),
                uses_bucket: false,
            });
        }
        if unprotected <= LADDER_CATCH_HEIGHT && onto.is_climbable() {
            // Grabbing the climbable resets the fall.
            so_far += fall_n_blocks_cost(unprotected - 1) + LADDER_DOWN_ONE_COST;
            effective_start = y;
            continue;
        }
        if can_walk_through(world, policy, onto_pos, onto) {
            continue;
        }
        if !can_walk_on(world, policy, onto_pos, onto) || onto.is_bottom_slab() {
            return None;
        }
        let drop = unprotected - 1;
        let cost = Cost::finite(WALK_OFF_BLOCK_COST + fall + front + so_far);
        if drop <= ctx.max_fall_height_no_water() {
            return Some(MoveResult {
                dest: onto_pos.up(),
                cost,
                uses_bucket: false,
            });
        }
        if ctx.has_water_bucket() && drop <= ctx.max_fall_height_bucket() {
            return Some(MoveResult {
                dest: onto_pos.up(),
                cost: cost + ctx.place_bucket_cost(),
                uses_bucket: true,
            });
        }
        return None;
    }
    None
}

/// Cost of dropping from `src` into the adjacent column down to `dest`.
#[must_use]
pub fn cost(ctx: &CalculationContext<'_>, src: CellPos, dest: CellPos) -> Cost {
    calculate(ctx, src, dest).map_or(Cost::Infeasible, |result| result.cost)
}

fn calculate(ctx: &CalculationContext<'_>, src: CellPos, dest: CellPos) -> Option<MoveResult> {
    if dest.y >= src.y - 1 {
        return None;
    }
    descend::calculate(ctx, src, dest.x, dest.z).filter(|result| result.dest == dest)
}

impl Routine for Fall {
    fn cost(&mut self, ctx: &CalculationContext<'_>, footprint: &Footprint) -> Cost {
        if footprint.direction().is_none() {
            return Cost::Infeasible;
        }
        let Some(result) = calculate(ctx, footprint.src, footprint.dest) else {
            return Cost::Infeasible;
        };
        self.uses_bucket = result.uses_bucket;
        result.cost
    }

    fn valid_positions(&self, footprint: &Footprint) -> HashSet<CellPos> {
        let (src, dest) = (footprint.src, footprint.dest);
        let mut cells: HashSet<CellPos> = (0..=src.y - dest.y).map(|dy| dest.up_by(dy)).collect();
        cells.insert(src);
        cells
    }

    fn tick(&mut self, footprint: &Footprint, state: &mut MovementState, env: &TickEnv<'_>) {
        let (src, dest) = (footprint.src, footprint.dest);
        let agent = env.agent;
        let feet = agent.feet();
        let to_dest = Rotation::towards(agent.eye_position(), dest.center());
        let dest_is_water = env.block(dest).is_water();

        let mut aiming_bucket = false;
        if !dest_is_water && self.uses_bucket && feet != dest {
            if !env.inventory.water_bucket {
                state.set_status(MovementStatus::Unreachable);
                return;
            }
            let height = agent.position.y - f64::from(dest.y);
            if height < env.settings.block_reach_distance && !agent.on_ground {
                state.request_item(ItemRequest::WaterBucket);
                state.set_target(to_dest.with_pitch(90.0), true);
                aiming_bucket = true;
                if agent.is_looking_at(dest) || agent.is_looking_at(dest.down()) {
                    state.click_right(dest);
                }
            }
        }
        if !aiming_bucket {
            state.set_target(to_dest, false);
        }

        if feet == dest && (agent.position.y - f64::from(feet.y) < 0.094 || dest_is_water) {
            if !dest_is_water {
                state.set_status(MovementStatus::Success);
                return;
            }
            if self.uses_bucket && env.inventory.empty_bucket {
                state.request_item(ItemRequest::EmptyBucket);
                if agent.velocity.y >= 0.0 {
                    state.click_right(dest);
                }
                return;
            }
            if agent.velocity.y >= 0.0 {
                state.set_status(MovementStatus::Success);
                return;
            }
        }

        let center = dest.center();
        let drift_x = (agent.position.x + agent.velocity.x - center.x).abs();
        let drift_z = (agent.position.z + agent.velocity.z - center.z).abs();
        if drift_x > 0.1 || drift_z > 0.1 {
            if !agent.on_ground && agent.velocity.y.abs() > 0.4 {
                state.set_input(Input::Sneak, true);
            }
            state.set_input(Input::MoveForward, true);
        }

        let (avoid_x, avoid_z) = match ladder_below(feet, env) {
            Some(facing) => {
                let (dx, dz) = facing.delta();
                let (ax, az) = (f64::from(dx), f64::from(dz));
                let dist = (ax * (center.x - ax / 2.0 - agent.position.x)).abs()
                    + (az * (center.z - az / 2.0 - agent.position.z)).abs();
                if dist < 0.6 {
                    state.set_input(Input::MoveForward, true);
                } else if !agent.on_ground {
                    state.set_input(Input::Sneak, false);
                }
                (ax, az)
            }
            None => (f64::from(src.x - dest.x), f64::from(src.z - dest.z)),
        };
        if !aiming_bucket {
            let aim = center + DVec3::new(0.125 * avoid_x, 0.0, 0.125 * avoid_z);
            state.set_target(Rotation::towards(agent.eye_position(), aim), false);
        }
    }

    fn safe_to_cancel(&self, footprint: &Footprint, state: &MovementState, env: &TickEnv<'_>) -> bool {
        state.status() != MovementStatus::Running || env.agent.feet() == footprint.src
    }
}

/// Facing of the first ladder within reach below the feet.
fn ladder_below(feet: CellPos, env: &TickEnv<'_>) -> Option<Direction> {
    (0..LADDER_SCAN_DEPTH)
        .map(|dy| env.block(feet.down_by(dy)))
        .find(|block| block.material == Material::Ladder)
        .and_then(|ladder| ladder.props.facing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::AgentInventory;
    use crate::settings::Settings;
    use crate::world::WorldSnapshot;
    use rstest::rstest;

    const SRC: CellPos = CellPos::new(0, 30, 0);

    fn cliff(drop: i32) -> WorldSnapshot {
        let mut world = WorldSnapshot::new();
        world.set(SRC.down(), Material::Stone);
        world.set(CellPos::new(0, SRC.y - drop - 1, 1), Material::Stone);
        world
    }

    fn landing(drop: i32) -> CellPos {
        CellPos::new(0, SRC.y - drop, 1)
    }

    #[rstest]
    #[case::two(2, true)]
    #[case::three(3, true)]
    #[case::four(4, false)]
    fn drops_beyond_the_limit_need_water(#[case] drop: i32, #[case] feasible: bool) {
        let world = cliff(drop);
        let ctx = CalculationContext::new(&world, &AgentInventory::default(), &Settings::default());
        assert_eq!(cost(&ctx, SRC, landing(drop)).is_feasible(), feasible);
    }

    #[rstest]
    #[case::four(4, true)]
    #[case::twenty(20, true)]
    #[case::twenty_one(21, false)]
    fn a_water_bucket_extends_the_limit(#[case] drop: i32, #[case] feasible: bool) {
        let world = cliff(drop);
        let inventory = AgentInventory {
            water_bucket: true,
            ..AgentInventory::default()
        };
        let ctx = CalculationContext::new(&world, &inventory, &Settings::default());
        let mut movement = super::super::Movement::fall(SRC, landing(drop));
        assert_eq!(movement.calculate_cost(&ctx).is_feasible(), feasible);
        if let super::super::MovementKind::Fall(fall) = movement.kind() {
            assert_eq!(fall.uses_bucket(), feasible);
        }
    }

    #[rstest]
    fn water_at_the_bottom_allows_any_height() {
        let drop = 40;
        let mut world = cliff(drop);
        world.set(landing(drop), BlockState::water(0));
        let dest = landing(drop);
        world.set(dest.down(), Material::Stone);
        let ctx = CalculationContext::new(&world, &AgentInventory::default(), &Settings::default());
        assert!(cost(&ctx, SRC, dest).is_feasible());
    }

    #[rstest]
    fn longer_falls_cost_more() {
        let short = cliff(2);
        let long = cliff(3);
        let inventory = AgentInventory::default();
        let settings = Settings::default();
        let a = cost(&CalculationContext::new(&short, &inventory, &settings), SRC, landing(2));
        let b = cost(&CalculationContext::new(&long, &inventory, &settings), SRC, landing(3));
        assert!(a < b);
    }
}
