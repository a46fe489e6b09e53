//! Going straight up: jump and place a block underneath, or climb a ladder
//! or water column already there.

use hashbrown::HashSet;

use crate::block::Material;
use crate::cell::CellPos;
use crate::classifier::{
    can_place_against, can_walk_through, climb_against, has_against, is_replaceable,
};
use crate::constants::{LADDER_UP_ONE_COST, PILLAR_UNSUPPORTED_PENALTY};
use crate::context::CalculationContext;
use crate::cost::{jump_one_block_cost, Cost};
use crate::input::{Input, ItemRequest};
use crate::rotation::Rotation;

use super::helper;
use super::{Footprint, MovementState, MovementStatus, Routine, TickEnv};

/// Horizontal drift from the column centre beyond which the agent walks back.
const CENTERING_TOLERANCE: f64 = 0.17;

/// Per-kind execution state of a pillar. Pillars carry none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pillar;

impl Pillar {
    pub(crate) const fn new() -> Self {
        Self
    }
}

pub(crate) fn footprint(src: CellPos) -> Footprint {
    Footprint::new(src, src.up(), vec![src.up_by(2)], Some(src))
}

/// Cost of rising one block in place from `src`.
#[must_use]
pub fn cost(ctx: &CalculationContext<'_>, src: CellPos) -> Cost {
    let world = ctx.world();
    let policy = ctx.policy();
    let from = ctx.get(src);
    let from_down = ctx.get(src.down());
    let ladder = from.is_climbable();
    if !ladder && (from_down.is_climbable() || from_down.is_bottom_slab()) {
        return Cost::Infeasible;
    }
    if from.material == Material::Vine && !has_against(world, src) {
        return Cost::Infeasible;
    }

    let head_room_pos = src.up_by(2);
    let head_room = ctx.get(head_room_pos);
    if head_room.material == Material::FenceGate {
        return Cost::Infeasible;
    }
    if head_room.is_water() && from.is_water() && ctx.get(src.up()).is_water() {
        // Swimming up a column of water.
        return Cost::finite(LADDER_UP_ONE_COST);
    }
    if !can_walk_through(world, policy, head_room_pos, head_room) {
        return Cost::Infeasible;
    }

    let mut place = Cost::ZERO;
    if !ladder {
        place = ctx.cost_of_placing_at(src, from);
        if !place.is_feasible() {
            return Cost::Infeasible;
        }
        if from_down.is_air() {
            place = place + PILLAR_UNSUPPORTED_PENALTY;
        }
    }
    if (from.is_liquid() && !can_place_against(from_down))
        || (from_down.is_liquid() && policy.assume_walk_on_water)
    {
        return Cost::Infeasible;
    }
    if matches!(from.material, Material::LilyPad | Material::Carpet) && from_down.is_liquid() {
        // Rising would mean breaking what we stand on.
        return Cost::Infeasible;
    }

    if ladder {
        Cost::finite(LADDER_UP_ONE_COST)
    } else {
        place + jump_one_block_cost() + ctx.jump_penalty()
    }
}

impl Routine for Pillar {
    fn cost(&mut self, ctx: &CalculationContext<'_>, footprint: &Footprint) -> Cost {
        cost(ctx, footprint.src)
    }

    fn valid_positions(&self, footprint: &Footprint) -> HashSet<CellPos> {
        [footprint.src, footprint.dest].into_iter().collect()
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
        let from = env.block(src);

        if from.is_water() && env.block(dest).is_water() {
            state.set_target(helper::rotation_to(env, dest), false);
            let center = dest.center();
            if (agent.position.x - center.x).abs() > 0.2 || (agent.position.z - center.z).abs() > 0.2 {
                state.set_input(Input::MoveForward, true);
            }
            if feet == dest {
                state.set_status(MovementStatus::Success);
            }
            return;
        }

        if from.is_climbable() {
            let against = match from.props.facing {
                Some(facing) if from.material == Material::Ladder => Some(src.step(facing.opposite())),
                _ => climb_against(env.world, src),
            };
            let Some(against) = against else {
                state.set_status(MovementStatus::Unreachable);
                return;
            };
            if feet == dest {
                state.set_status(MovementStatus::Success);
                return;
            }
            if env.block(src.down()).is_bottom_slab() {
                state.set_input(Input::Jump, true);
            }
            helper::move_towards(state, env, against);
            return;
        }

        if !env.inventory.has_throwaway() {
            state.set_status(MovementStatus::Unreachable);
            return;
        }
        state.request_item(ItemRequest::Throwaway);
        let rotation = helper::rotation_to(env, src);
        state.set_target(Rotation::new(agent.rotation.yaw, rotation.pitch), true);
        let y = agent.position.y;
        // Sneak a tick ahead of placing so the click lands while crouched.
        state.set_input(Input::Sneak, y > f64::from(dest.y) || y < f64::from(src.y) + 0.2);

        let center = dest.center();
        let offset = (agent.position.x - center.x).hypot(agent.position.z - center.z);
        let flat_motion = agent.velocity.x.hypot(agent.velocity.z);
        if offset > CENTERING_TOLERANCE {
            state.set_input(Input::MoveForward, true);
            state.set_target(rotation, true);
        } else if flat_motion < 0.05 {
            state.set_input(Input::Jump, y < f64::from(dest.y));
        }

        let block_is_there = env.can_walk_on(src);
        if !block_is_there {
            if !from.is_air() && !is_replaceable(env.world, src, from) {
                if let Some(aim) = env.reach.reachable(agent, env.world, src) {
                    state.set_target(aim, true);
                }
                state.set_input(Input::Jump, false);
                state.request_item(ItemRequest::BestToolFor(from));
                state.click_left(src);
            } else if agent.sneaking
                && (agent.is_looking_at(src.down()) || agent.is_looking_at(src))
                && y > f64::from(dest.y) + 0.1
            {
                state.click_right(src);
            }
        }
        if feet == dest && block_is_there {
            state.set_status(MovementStatus::Success);
        }
    }
}
