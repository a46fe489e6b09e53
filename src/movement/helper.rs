//! Building blocks shared by the per-kind cost functions and tick routines.

use log::debug;

use crate::block::BlockState;
use crate::cell::{CellPos, Face};
use crate::classifier::{avoid_breaking, can_place_against, can_walk_through};
use crate::context::CalculationContext;
use crate::cost::Cost;
use crate::input::{Input, ItemRequest};
use crate::rotation::Rotation;

use super::{MovementState, MovementStatus, TickEnv};

/// Ticks to mine `state` at `pos`, or zero when the cell is already passable.
///
/// With `include_falling`, a falling block resting on top is mined too,
/// recursively.
pub(crate) fn mining_duration(
    ctx: &CalculationContext<'_>,
    pos: CellPos,
    state: BlockState,
    include_falling: bool,
) -> Cost {
    if can_walk_through(ctx.world(), ctx.policy(), pos, state) {
        return Cost::ZERO;
    }
    if state.is_liquid() {
        return Cost::Infeasible;
    }
    let Some(multiplier) = ctx.break_cost_multiplier_at(pos, state).ticks() else {
        return Cost::Infeasible;
    };
    if avoid_breaking(ctx.world(), ctx.policy(), pos, state) {
        return Cost::Infeasible;
    }
    let speed = ctx.tool_set().break_speed(state);
    if speed <= 0.0 {
        return Cost::Infeasible;
    }
    let mut ticks = Cost::finite((1.0 / speed + ctx.block_break_additional_cost()) * multiplier);
    if include_falling {
        let above = ctx.get(pos.up());
        if above.is_falling_prone() {
            ticks += mining_duration(ctx, pos.up(), above, true);
        }
    }
    ticks
}

/// [`mining_duration`] for whatever currently occupies `pos`.
pub(crate) fn mining_duration_at(
    ctx: &CalculationContext<'_>,
    pos: CellPos,
    include_falling: bool,
) -> Cost {
    mining_duration(ctx, pos, ctx.get(pos), include_falling)
}

/// Whether any horizontal or downward neighbour of `place_at` other than
/// `skip` offers a face to place against.
pub(crate) fn has_place_option(
    ctx: &CalculationContext<'_>,
    place_at: CellPos,
    skip: Option<CellPos>,
) -> bool {
    Face::HORIZONTALS_AND_DOWN
        .iter()
        .map(|face| place_at.adjacent(*face))
        .filter(|against| Some(*against) != skip)
        .any(|against| can_place_against(ctx.get(against)))
}

/// Outcome of trying to aim a throwaway block at a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlaceResult {
    /// The crosshair already rests on a usable face.
    ReadyToPlace,
    /// A usable face exists; the look target now points at it.
    Attempting,
    /// Nothing to place against, or nothing to place.
    NoOption,
}

/// Aims a throwaway block at `place_at`.
///
/// Faces below are preferred over horizontal ones when `prefer_down` is set.
/// With `would_sneak` the aim is computed from the sneaking eye height and
/// the sneak input is requested whenever placement is possible.
pub(crate) fn attempt_to_place(
    state: &mut MovementState,
    env: &TickEnv<'_>,
    place_at: CellPos,
    prefer_down: bool,
    would_sneak: bool,
) -> PlaceResult {
    let mut sneaking_agent = *env.agent;
    sneaking_agent.sneaking |= would_sneak;
    let mut found = false;
    for face in Face::HORIZONTALS_AND_DOWN {
        let against = place_at.adjacent(face);
        if !can_place_against(env.block(against)) {
            continue;
        }
        if !env.inventory.has_throwaway() {
            debug!("no throwaway blocks to place at {place_at}");
            state.set_status(MovementStatus::Unreachable);
            return PlaceResult::NoOption;
        }
        if let Some(rotation) = env.reach.place_rotation(&sneaking_agent, env.world, against, place_at) {
            state.set_target(rotation, true);
            found = true;
            if !prefer_down {
                break;
            }
        }
    }
    if let Some(hit) = env.agent.looking_at {
        let against_ok = can_place_against(env.block(hit.cell)) && hit.placement_cell() == place_at;
        if hit.cell == place_at || against_ok {
            if would_sneak {
                state.set_input(Input::Sneak, true);
            }
            state.request_item(ItemRequest::Throwaway);
            return PlaceResult::ReadyToPlace;
        }
    }
    if found {
        if would_sneak {
            state.set_input(Input::Sneak, true);
        }
        state.request_item(ItemRequest::Throwaway);
        return PlaceResult::Attempting;
    }
    PlaceResult::NoOption
}

/// Rotation from the agent's eyes to the centre of `pos`.
pub(crate) fn rotation_to(env: &TickEnv<'_>, pos: CellPos) -> Rotation {
    Rotation::towards(env.agent.eye_position(), pos.center())
}

/// Turns towards `pos` while keeping the current pitch, and walks forwards.
pub(crate) fn move_towards(state: &mut MovementState, env: &TickEnv<'_>, pos: CellPos) {
    let yaw = rotation_to(env, pos).yaw;
    state.set_target(Rotation::new(yaw, env.agent.rotation.pitch), false);
    state.set_input(Input::MoveForward, true);
}
