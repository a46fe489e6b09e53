//! Digging straight down through the floor.

use hashbrown::HashSet;

use crate::cell::CellPos;
use crate::classifier::can_walk_on;
use crate::constants::LADDER_DOWN_ONE_COST;
use crate::context::CalculationContext;
use crate::cost::{fall_n_blocks_cost, Cost};

use super::helper;
use super::{Footprint, MovementState, MovementStatus, Routine, TickEnv};

/// Ticks to wait centred over the hole before nudging towards it.
const SETTLE_TICKS: u32 = 10;

/// Per-kind execution state of a dig-down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Downward {
    num_ticks: u32,
}

impl Downward {
    pub(crate) const fn new() -> Self {
        Self { num_ticks: 0 }
    }
}

pub(crate) fn footprint(src: CellPos) -> Footprint {
    Footprint::new(src, src.down(), vec![src.down()], None)
}

/// Cost of breaking the floor under `src` and dropping onto the block below.
#[must_use]
pub fn cost(ctx: &CalculationContext<'_>, src: CellPos) -> Cost {
    if !ctx.allow_downward() {
        return Cost::Infeasible;
    }
    let landing = src.down_by(2);
    if !can_walk_on(ctx.world(), ctx.policy(), landing, ctx.get(landing)) {
        return Cost::Infeasible;
    }
    let floor = ctx.get(src.down());
    if floor.is_climbable() {
        return Cost::finite(LADDER_DOWN_ONE_COST);
    }
    // The agent stands on the floor, so nothing rests on it to fall in.
    helper::mining_duration(ctx, src.down(), floor, false) + fall_n_blocks_cost(1)
}

impl Routine for Downward {
    fn cost(&mut self, ctx: &CalculationContext<'_>, footprint: &Footprint) -> Cost {
        cost(ctx, footprint.src)
    }

    fn valid_positions(&self, footprint: &Footprint) -> HashSet<CellPos> {
        [footprint.src, footprint.dest].into_iter().collect()
    }

    fn tick(&mut self, footprint: &Footprint, state: &mut MovementState, env: &TickEnv<'_>) {
        let dest = footprint.dest;
        let agent = env.agent;
        if agent.feet() == dest {
            state.set_status(MovementStatus::Success);
            return;
        }
        let center = dest.center();
        let offset = (agent.position.x - center.x).hypot(agent.position.z - center.z);
        let ticks = self.num_ticks;
        self.num_ticks += 1;
        if ticks < SETTLE_TICKS && offset < 0.2 {
            return;
        }
        helper::move_towards(state, env, dest);
    }

    fn reset(&mut self) {
        self.num_ticks = 0;
    }
}
