//! Walking one block sideways on the same level.
//!
//! When the destination has no floor the traverse bridges: it places a
//! throwaway block against a neighbouring face, or, with nothing else to
//! place against, sneaks to the edge and places against the side of the block
//! it stands on.

use glam::DVec3;
use hashbrown::HashSet;
use log::debug;

use crate::block::Material;
use crate::cell::CellPos;
use crate::classifier::{
    avoid_walking_into, can_use_frost_walker, can_walk_on, is_replaceable, must_be_solid_to_walk_on,
};
use crate::constants::{
    LADDER_MINING_MULTIPLIER, SNEAK_ONE_BLOCK_COST, SPRINT_MULTIPLIER, WALK_ONE_BLOCK_COST,
    WALK_ONE_OVER_SOUL_SAND_COST,
};
use crate::context::CalculationContext;
use crate::cost::Cost;
use crate::input::{Input, ItemRequest};
use crate::rotation::Rotation;

use super::helper::{self, PlaceResult};
use super::{Footprint, MovementState, MovementStatus, Routine, TickEnv};

/// Per-kind execution state of a traverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traverse {
    floor_always_there: bool,
}

impl Traverse {
    pub(crate) const fn new() -> Self {
        Self {
            floor_always_there: true,
        }
    }
}

impl Default for Traverse {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn footprint(src: CellPos, dest: CellPos) -> Footprint {
    Footprint::new(src, dest, vec![dest.up(), dest], Some(dest.down()))
}

/// Cost of walking from `src` to the adjacent `dest`.
#[must_use]
pub fn cost(ctx: &CalculationContext<'_>, src: CellPos, dest: CellPos) -> Cost {
    let world = ctx.world();
    let policy = ctx.policy();
    let head = ctx.get(dest.up());
    let body = ctx.get(dest);
    let floor_pos = dest.down();
    let floor = ctx.get(floor_pos);
    let src_floor = ctx.get(src.down());
    let on_solid = must_be_solid_to_walk_on(world, policy, src.down(), src_floor);
    let frost_walker = on_solid
        && !policy.assume_walk_on_water
        && can_use_frost_walker(ctx.frost_walker(), floor);
    let through_water = head.is_water() || body.is_water();

    if frost_walker || can_walk_on(world, policy, floor_pos, floor) {
        let mut walk = WALK_ONE_BLOCK_COST;
        if through_water {
            walk = ctx.water_walk_speed();
        } else {
            if floor.material == Material::SoulSand {
                walk += (WALK_ONE_OVER_SOUL_SAND_COST - WALK_ONE_BLOCK_COST) / 2.0;
            } else if !frost_walker && floor.is_water() {
                walk += ctx.walk_on_water_one_penalty();
            }
            if src_floor.material == Material::SoulSand {
                walk += (WALK_ONE_OVER_SOUL_SAND_COST - WALK_ONE_BLOCK_COST) / 2.0;
            }
        }
        let body_break = helper::mining_duration(ctx, dest, body, false);
        if !body_break.is_feasible() {
            return Cost::Infeasible;
        }
        let head_break = helper::mining_duration(ctx, dest.up(), head, true);
        if body_break.is_zero() && head_break.is_zero() {
            if !through_water && ctx.can_sprint() {
                walk *= SPRINT_MULTIPLIER;
            }
            return Cost::finite(walk);
        }
        let breaking = body_break + head_break;
        if src_floor.is_climbable() {
            return Cost::finite(walk) + breaking * LADDER_MINING_MULTIPLIER;
        }
        return Cost::finite(walk) + breaking;
    }

    if src_floor.is_climbable() || !is_replaceable(world, floor_pos, floor) {
        return Cost::Infeasible;
    }
    if floor.is_water() && through_water {
        return Cost::Infeasible;
    }
    let place = ctx.cost_of_placing_at(floor_pos, floor);
    if !place.is_feasible() {
        return Cost::Infeasible;
    }
    let body_break = helper::mining_duration(ctx, dest, body, false);
    if !body_break.is_feasible() {
        return Cost::Infeasible;
    }
    let head_break = helper::mining_duration(ctx, dest.up(), head, true);
    let walk = if through_water {
        ctx.water_walk_speed()
    } else {
        WALK_ONE_BLOCK_COST
    };
    if helper::has_place_option(ctx, floor_pos, Some(src.down())) {
        return Cost::finite(walk) + place + body_break + head_break;
    }
    // Only a back-place against the block underfoot remains.
    if src_floor.material == Material::SoulSand || src_floor.is_half_slab() || !on_solid {
        return Cost::Infeasible;
    }
    let sneak = walk * (SNEAK_ONE_BLOCK_COST / WALK_ONE_BLOCK_COST);
    Cost::finite(sneak) + place + body_break + head_break
}

impl Routine for Traverse {
    fn cost(&mut self, ctx: &CalculationContext<'_>, footprint: &Footprint) -> Cost {
        if footprint.direction().is_none() || footprint.src.y != footprint.dest.y {
            return Cost::Infeasible;
        }
        cost(ctx, footprint.src, footprint.dest)
    }

    fn valid_positions(&self, footprint: &Footprint) -> HashSet<CellPos> {
        let (src, dest) = (footprint.src, footprint.dest);
        let mut cells: HashSet<CellPos> = [src, dest].into_iter().collect();
        if let Some(dir) = footprint.direction() {
            cells.insert(dest.step(dir));
            cells.insert(dest.step_by(dir, 2));
        }
        cells
    }

    fn tick(&mut self, footprint: &Footprint, state: &mut MovementState, env: &TickEnv<'_>) {
        let (src, dest) = (footprint.src, footprint.dest);
        let agent = env.agent;
        let upper = dest.up();

        for cell in [upper, dest] {
            let block = env.block(cell);
            if matches!(block.material, Material::Door | Material::FenceGate) && !block.props.open {
                state.set_target(helper::rotation_to(env, cell), true);
                state.click_right(cell);
                return;
            }
        }

        let floor = dest.down();
        let on_ladder = env.block(src.down()).is_climbable();
        let feet = agent.feet();
        if feet.y != dest.y && !on_ladder {
            debug!("traverse {src} -> {dest}: wrong Y level {}", feet.y);
            if feet.y < dest.y {
                state.set_input(Input::Jump, true);
            }
            return;
        }

        if env.can_walk_on(floor) || on_ladder {
            self.walk(footprint, state, env);
            return;
        }
        self.floor_always_there = false;
        bridge(footprint, state, env);
    }

    fn while_prepping(&mut self, footprint: &Footprint, state: &mut MovementState, env: &TickEnv<'_>) {
        if !env.settings.walk_while_breaking {
            return;
        }
        let dest = footprint.dest;
        if env.agent.horizontal_chebyshev_to(dest) < 0.83 {
            return;
        }
        let Some(target) = state.target() else {
            return;
        };
        let head = env.block(dest.up());
        let body = env.block(dest);
        if head.is_full_cube() || (head.is_air() && (body.is_full_cube() || body.is_air())) {
            let yaw = helper::rotation_to(env, dest).yaw;
            state.set_target(Rotation::new(yaw, target.rotation.pitch), true);
            state.set_input(Input::MoveForward, true);
            state.set_input(Input::Sprint, true);
        }
    }

    fn safe_to_cancel(&self, footprint: &Footprint, state: &MovementState, env: &TickEnv<'_>) -> bool {
        state.status() != MovementStatus::Running || env.can_walk_on(footprint.dest.down())
    }

    fn reset(&mut self) {
        self.floor_always_there = true;
    }
}

impl Traverse {
    fn walk(&self, footprint: &Footprint, state: &mut MovementState, env: &TickEnv<'_>) {
        let (src, dest) = (footprint.src, footprint.dest);
        let agent = env.agent;
        let feet = agent.feet();
        if feet == dest {
            state.set_status(MovementStatus::Success);
            return;
        }
        if let Some(dir) = footprint.direction() {
            let overshot = feet == dest.step(dir) || feet == dest.step_by(dir, 2);
            if env.settings.overshoot_traverse && overshot {
                state.set_status(MovementStatus::Success);
                return;
            }
        }
        let climbing = env.block(src).is_climbable() || env.block(src.up()).is_climbable();
        if climbing && agent.position.y > f64::from(src.y) + 0.1 && !agent.on_ground {
            // Still hanging on the ladder; let it drop us first.
            return;
        }
        if let Some(dir) = footprint.direction() {
            let into = dest.step(dir);
            let into_low = env.block(into);
            let into_high = env.block(into.up());
            let wading = env.block(feet).is_liquid();
            if self.floor_always_there
                && (!wading || env.settings.sprint_in_water)
                && (!avoid_walking_into(into_low) || into_low.is_water())
                && !avoid_walking_into(into_high)
            {
                state.set_input(Input::Sprint, true);
            }
        }
        helper::move_towards(state, env, dest.up());
    }
}

fn bridge(footprint: &Footprint, state: &mut MovementState, env: &TickEnv<'_>) {
    let (src, dest) = (footprint.src, footprint.dest);
    let agent = env.agent;
    let floor = dest.down();
    let standing_on = env.block(agent.feet().down());
    if (standing_on.material == Material::SoulSand || standing_on.is_half_slab())
        && agent.horizontal_chebyshev_to(dest) < 0.85
    {
        // Too far out over the edge to place from a low block; back up.
        helper::move_towards(state, env, dest);
        state.set_input(Input::MoveForward, false);
        state.set_input(Input::MoveBack, true);
        return;
    }

    let dist = agent.horizontal_chebyshev_to(dest);
    debug!("traverse {src} -> {dest}: bridging at {floor}");
    let placed = helper::attempt_to_place(state, env, floor, false, true);
    if placed == PlaceResult::ReadyToPlace || dist < 0.6 {
        state.set_input(Input::Sneak, true);
    }
    match placed {
        PlaceResult::ReadyToPlace => {
            if agent.sneaking {
                state.click_right(floor);
            }
            return;
        }
        PlaceResult::Attempting => {
            if dist > 0.83 {
                let yaw = helper::rotation_to(env, dest).yaw;
                let aimed = state
                    .target()
                    .is_some_and(|target| target.rotation.yaw_difference(Rotation::new(yaw, 0.0)) < 0.1);
                if aimed {
                    state.set_input(Input::MoveForward, true);
                }
            } else if let Some(target) = state.target() {
                if agent.rotation.is_really_close_to(target.rotation) {
                    if let Some(hit) = agent.looking_at {
                        // Something sits between us and the face we want.
                        state.click_left(hit.cell);
                    }
                }
            }
            return;
        }
        PlaceResult::NoOption => {}
    }
    if state.status().is_complete() {
        return;
    }

    if agent.feet() == dest {
        // Overhanging the edge: face back and place against the block we
        // stepped off.
        let face = DVec3::new(
            (f64::from(dest.x) + f64::from(src.x) + 1.0) * 0.5,
            f64::from(dest.y) - 0.5,
            (f64::from(dest.z) + f64::from(src.z) + 1.0) * 0.5,
        );
        let back = Rotation::towards(agent.eye_position(), face);
        let offset = (agent.position.x - face.x)
            .abs()
            .max((agent.position.z - face.z).abs());
        if offset < 0.29 {
            let yaw = Rotation::towards(dest.center(), agent.eye_position()).yaw;
            state.set_target(Rotation::new(yaw, back.pitch), true);
            state.set_input(Input::MoveBack, true);
        } else {
            state.set_target(back, true);
        }
        state.set_input(Input::Sneak, true);
        state.request_item(ItemRequest::Throwaway);
        if agent.is_looking_at(src.down()) {
            state.click_right(floor);
        } else if agent.rotation.is_really_close_to(back) {
            if let Some(hit) = agent.looking_at {
                state.click_left(hit.cell);
            }
        }
        return;
    }
    helper::move_towards(state, env, dest.up());
}
