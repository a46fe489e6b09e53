//! Walking off a ledge onto the column beside, one block lower.
//!
//! The descent calculation also discovers longer drops: when the cell below
//! the landing is open it hands over to [`fall::dynamic_fall_cost`].

use hashbrown::HashSet;

use crate::block::Material;
use crate::cell::CellPos;
use crate::classifier::{avoid_walking_into, can_use_frost_walker, can_walk_on};
use crate::constants::{
    CENTER_AFTER_FALL_COST, WALK_OFF_BLOCK_COST, WALK_ONE_BLOCK_COST, WALK_ONE_OVER_SOUL_SAND_COST,
};
use crate::context::CalculationContext;
use crate::cost::{fall_n_blocks_cost, Cost};
use crate::input::Input;
use crate::rotation::Rotation;

use super::fall;
use super::helper;
use super::moves::MoveResult;
use super::{Footprint, MovementState, MovementStatus, Routine, TickEnv};

/// Ticks spent aiming past the landing before turning back to it.
const OVERSHOOT_TICKS: u32 = 20;

/// Per-kind execution state of a descend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descend {
    num_ticks: u32,
}

impl Descend {
    pub(crate) const fn new() -> Self {
        Self { num_ticks: 0 }
    }
}

pub(crate) fn footprint(src: CellPos, dest: CellPos) -> Footprint {
    Footprint::new(
        src,
        dest,
        vec![dest.up_by(2), dest.up(), dest],
        Some(dest.down()),
    )
}

/// Works out where walking off `src` towards column `(dest_x, dest_z)` lands,
/// and at what cost.
///
/// A landing one block down is a descend; anything deeper is a fall.
#[must_use]
pub fn calculate(
    ctx: &CalculationContext<'_>,
    src: CellPos,
    dest_x: i32,
    dest_z: i32,
) -> Option<MoveResult> {
    let world = ctx.world();
    let policy = ctx.policy();
    let beside = CellPos::new(dest_x, src.y, dest_z);
    let landing = beside.down();
    let landing_state = ctx.get(landing);

    let mut front_break = helper::mining_duration(ctx, landing, landing_state, false);
    if !front_break.is_feasible() {
        return None;
    }
    front_break += helper::mining_duration_at(ctx, beside, false);
    if !front_break.is_feasible() {
        return None;
    }
    front_break += helper::mining_duration_at(ctx, beside.up(), true);
    if !front_break.is_feasible() {
        return None;
    }

    let src_floor = ctx.get(src.down());
    if src_floor.is_climbable() {
        return None;
    }

    let below_pos = landing.down();
    let below = ctx.get(below_pos);
    if !can_walk_on(world, policy, below_pos, below) {
        return fall::dynamic_fall_cost(ctx, src, beside, front_break, below);
    }
    if landing_state.is_climbable() || can_use_frost_walker(ctx.frost_walker(), landing_state) {
        return None;
    }

    let mut walk = if front_break.is_zero() {
        WALK_OFF_BLOCK_COST
    } else {
        WALK_ONE_BLOCK_COST
    };
    if src_floor.material == Material::SoulSand {
        walk *= WALK_ONE_OVER_SOUL_SAND_COST / WALK_ONE_BLOCK_COST;
    }
    let mut fall = fall_n_blocks_cost(1);
    if landing_state.is_water() {
        fall *= 0.5;
    }
    Some(MoveResult {
        dest: landing,
        cost: front_break + walk + fall.max(CENTER_AFTER_FALL_COST),
        uses_bucket: false,
    })
}

/// Cost of descending from `src` onto `dest`, one block lower.
#[must_use]
pub fn cost(ctx: &CalculationContext<'_>, src: CellPos, dest: CellPos) -> Cost {
    match calculate(ctx, src, dest.x, dest.z) {
        Some(result) if result.dest == dest => result.cost,
        _ => Cost::Infeasible,
    }
}

impl Routine for Descend {
    fn cost(&mut self, ctx: &CalculationContext<'_>, footprint: &Footprint) -> Cost {
        if footprint.direction().is_none() || footprint.dest.y != footprint.src.y - 1 {
            return Cost::Infeasible;
        }
        cost(ctx, footprint.src, footprint.dest)
    }

    fn valid_positions(&self, footprint: &Footprint) -> HashSet<CellPos> {
        let (src, dest) = (footprint.src, footprint.dest);
        let past = overshoot(footprint);
        [src, dest.up(), dest, past, past.up()].into_iter().collect()
    }

    fn tick(&mut self, footprint: &Footprint, state: &mut MovementState, env: &TickEnv<'_>) {
        let (src, dest) = (footprint.src, footprint.dest);
        let agent = env.agent;
        let feet = agent.feet();
        let past = overshoot(footprint);
        if (feet == dest || feet == past)
            && (env.block(dest).is_liquid() || agent.position.y - f64::from(dest.y) < 0.5)
        {
            state.set_status(MovementStatus::Success);
            return;
        }

        if safe_mode(footprint, env) {
            // Something hazardous lies past the landing: aim short of it.
            let aim = src.center() * 0.17 + dest.center() * 0.83;
            let target = aim.with_y(f64::from(dest.y));
            let yaw = Rotation::towards(agent.eye_position(), target).yaw;
            state.set_target(Rotation::new(yaw, agent.rotation.pitch), false);
            state.set_input(Input::MoveForward, true);
            return;
        }

        let from_landing = agent.horizontal_distance_to(dest);
        let from_start = agent.horizontal_distance_to(src);
        if feet != dest || from_landing > 0.25 {
            let ticks = self.num_ticks;
            self.num_ticks += 1;
            if ticks < OVERSHOOT_TICKS && from_start < 1.25 {
                helper::move_towards(state, env, past);
            } else {
                helper::move_towards(state, env, dest);
            }
        }
    }

    fn safe_to_cancel(&self, footprint: &Footprint, state: &MovementState, env: &TickEnv<'_>) -> bool {
        state.status() != MovementStatus::Running || env.agent.feet() == footprint.src
    }

    fn reset(&mut self) {
        self.num_ticks = 0;
    }
}

/// The cell one further along the line from source to destination, at the
/// destination level.
const fn overshoot(footprint: &Footprint) -> CellPos {
    let (src, dest) = (footprint.src, footprint.dest);
    CellPos::new(dest.x * 2 - src.x, dest.y, dest.z * 2 - src.z)
}

/// Whether running straight through the landing would hit a hazard.
fn safe_mode(footprint: &Footprint, env: &TickEnv<'_>) -> bool {
    let into = overshoot(footprint);
    (0..=2).any(|dy| avoid_walking_into(env.block(into.up_by(dy))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockState;
    use crate::cell::Direction;
    use crate::inventory::AgentInventory;
    use crate::settings::Settings;
    use crate::world::WorldSnapshot;
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    const SRC: CellPos = CellPos::new(0, 10, 0);
    const DEST: CellPos = CellPos::new(0, 9, 1);

    #[fixture]
    fn ledge() -> WorldSnapshot {
        let mut world = WorldSnapshot::new();
        world.set(SRC.down(), Material::Stone);
        world.set(DEST.down(), Material::Stone);
        world
    }

    #[rstest]
    fn walking_off_a_ledge(ledge: WorldSnapshot) {
        let ctx = CalculationContext::new(&ledge, &AgentInventory::default(), &Settings::default());
        let result = calculate(&ctx, SRC, DEST.x, DEST.z);
        assert_eq!(result.map(|r| r.dest), Some(DEST));
        assert_relative_eq!(
            cost(&ctx, SRC, DEST).ticks().unwrap_or(f64::INFINITY),
            WALK_OFF_BLOCK_COST + fall_n_blocks_cost(1).max(CENTER_AFTER_FALL_COST),
            epsilon = 1e-9
        );
    }

    #[rstest]
    fn clearing_the_landing_drops_the_walk_off_discount(mut ledge: WorldSnapshot) {
        ledge.set(DEST, Material::Dirt);
        let ctx = CalculationContext::new(&ledge, &AgentInventory::default(), &Settings::default());
        let mining = helper::mining_duration_at(&ctx, DEST, false);
        let expected = mining + WALK_ONE_BLOCK_COST + fall_n_blocks_cost(1).max(CENTER_AFTER_FALL_COST);
        assert_eq!(cost(&ctx, SRC, DEST), expected);
    }

    #[rstest]
    fn open_floor_below_turns_into_a_fall(mut ledge: WorldSnapshot) {
        ledge.clear(DEST.down());
        ledge.set(DEST.down_by(3), Material::Stone);
        let ctx = CalculationContext::new(&ledge, &AgentInventory::default(), &Settings::default());
        let result = calculate(&ctx, SRC, DEST.x, DEST.z);
        assert_eq!(result.map(|r| r.dest), Some(DEST.down_by(2)));
        assert_eq!(cost(&ctx, SRC, DEST), Cost::Infeasible);
    }

    #[rstest]
    fn ladders_underfoot_block_descending(mut ledge: WorldSnapshot) {
        ledge.set(SRC.down(), BlockState::ladder(Direction::North));
        let ctx = CalculationContext::new(&ledge, &AgentInventory::default(), &Settings::default());
        assert!(calculate(&ctx, SRC, DEST.x, DEST.z).is_none());
    }
}
