//! Sprint-jumping across a gap of one to three open cells.
//!
//! Distances count from the source column, so a parkour of distance two
//! clears a one-block gap. A landing one block higher is possible for short
//! gaps when sprinting is available.

use hashbrown::HashSet;

use crate::block::{BlockState, Material};
use crate::cell::{CellPos, Direction};
use crate::classifier::{avoid_walking_into, can_use_frost_walker, can_walk_on, fully_passable};
use crate::constants::SPRINT_ONE_BLOCK_COST;
use crate::context::CalculationContext;
use crate::cost::{jump_one_block_cost, Cost};
use crate::input::Input;
use crate::settings::Settings;

use super::helper;
use super::moves::MoveResult;
use super::{Footprint, MovementState, MovementStatus, Routine, TickEnv};

/// Shortest parkour: a one-block gap.
pub const MIN_DISTANCE: i32 = 2;

/// Longest parkour, reachable only while sprinting.
pub const MAX_DISTANCE: i32 = 4;

/// Longest gap that can be cleared while also gaining a block of height.
const MAX_ASCEND_DISTANCE: i32 = 3;

/// Per-kind execution state of a parkour jump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parkour {
    direction: Direction,
    distance: i32,
    ascend: bool,
}

impl Parkour {
    pub(crate) const fn new(direction: Direction, distance: i32, ascend: bool) -> Self {
        Self {
            direction,
            distance,
            ascend,
        }
    }

    /// Direction of the jump.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Columns travelled, counting the landing.
    #[must_use]
    pub const fn distance(&self) -> i32 {
        self.distance
    }

    /// Whether the landing is one block higher than the take-off.
    #[must_use]
    pub const fn ascends(&self) -> bool {
        self.ascend
    }
}

pub(crate) fn footprint(src: CellPos, direction: Direction, distance: i32, ascend: bool) -> Footprint {
    let dest = src.step_by(direction, distance).up_by(i32::from(ascend));
    Footprint::new(src, dest, Vec::new(), None)
}

/// What column `i` of a jump offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Landing {
    /// Floor at take-off height.
    Flat,
    /// A block to land on top of, one higher.
    Ascend,
    /// Open air the jump can carry on over.
    Open,
    /// The jump cannot reach or pass this column.
    Blocked,
}

fn passable(ctx: &CalculationContext<'_>, pos: CellPos) -> bool {
    fully_passable(ctx.get(pos))
}

/// The two cells beyond a landing are walked into anyway; neither may be a
/// hazard.
fn overshoot_safe(ctx: &CalculationContext<'_>, pos: CellPos) -> bool {
    !avoid_walking_into(ctx.get(pos)) && !avoid_walking_into(ctx.get(pos.up()))
}

/// Checks the take-off and returns the longest distance the agent can jump
/// from `src`, or `None` when no jump is possible at all.
fn launch(ctx: &CalculationContext<'_>, src: CellPos, dir: Direction) -> Option<i32> {
    if !ctx.allow_parkour() || src.y + 1 >= ctx.max_y() {
        return None;
    }
    let world = ctx.world();
    let policy = ctx.policy();
    let adjacent = src.step(dir);
    if !passable(ctx, adjacent) {
        return None;
    }
    let gap_floor = ctx.get(adjacent.down());
    if can_walk_on(world, policy, adjacent.down(), gap_floor) {
        // A plain traverse covers this.
        return None;
    }
    if avoid_walking_into(gap_floor) && !gap_floor.is_liquid() {
        return None;
    }
    if !passable(ctx, adjacent.up()) || !passable(ctx, adjacent.up_by(2)) || !passable(ctx, src.up_by(2)) {
        return None;
    }
    let standing_on = ctx.get(src.down());
    if standing_on.is_climbable()
        || standing_on.material == Material::Stairs
        || standing_on.is_bottom_slab()
        || standing_on.is_liquid()
    {
        return None;
    }
    Some(if standing_on.material == Material::SoulSand {
        MIN_DISTANCE
    } else if ctx.can_sprint() {
        MAX_DISTANCE
    } else {
        MAX_DISTANCE - 1
    })
}

fn landing(ctx: &CalculationContext<'_>, src: CellPos, dir: Direction, i: i32) -> Landing {
    let world = ctx.world();
    let policy = ctx.policy();
    let column = src.step_by(dir, i);
    if !passable(ctx, column.up()) || !passable(ctx, column.up_by(2)) {
        return Landing::Blocked;
    }
    let into = ctx.get(column);
    if !fully_passable(into) {
        let can_ascend = i <= MAX_ASCEND_DISTANCE
            && ctx.allow_parkour_ascend()
            && ctx.can_sprint()
            && can_walk_on(world, policy, column, into)
            && overshoot_safe(ctx, column.step(dir).up());
        return if can_ascend {
            Landing::Ascend
        } else {
            Landing::Blocked
        };
    }
    let floor_pos = column.down();
    let floor = ctx.get(floor_pos);
    if lands_on(ctx, floor_pos, floor, i) {
        return if overshoot_safe(ctx, column.step(dir)) {
            Landing::Flat
        } else {
            Landing::Blocked
        };
    }
    if !passable(ctx, column.up_by(3)) {
        return Landing::Blocked;
    }
    Landing::Open
}

/// Whether a jump of distance `i` can end on `floor`. Farmland is trampled,
/// and frost walker only helps over short enough gaps.
fn lands_on(ctx: &CalculationContext<'_>, pos: CellPos, floor: BlockState, i: i32) -> bool {
    let frost_reach = (i32::from(ctx.frost_walker()) + 2).min(16);
    (floor.material != Material::Farmland && can_walk_on(ctx.world(), ctx.policy(), pos, floor))
        || (frost_reach >= i && can_use_frost_walker(ctx.frost_walker(), floor))
}

/// Cost of a parkour of distance `n`.
#[must_use]
pub fn cost_for_distance(ctx: &CalculationContext<'_>, n: i32, ascend: bool) -> Cost {
    let n_f = f64::from(n);
    let mut ticks = n_f * SPRINT_ONE_BLOCK_COST
        + jump_one_block_cost()
        + f64::from(n - MIN_DISTANCE) * ctx.parkour_risk_penalty()
        + ctx.jump_penalty();
    if ascend {
        ticks += jump_one_block_cost();
    }
    Cost::finite(ticks)
}

/// Walks the jump column by column and returns the first landing as
/// `(distance, ascend)`.
fn first_landing(ctx: &CalculationContext<'_>, src: CellPos, dir: Direction) -> Option<(i32, bool)> {
    let max = launch(ctx, src, dir)?;
    for i in MIN_DISTANCE..=max {
        match landing(ctx, src, dir, i) {
            Landing::Flat => return Some((i, false)),
            Landing::Ascend => return Some((i, true)),
            Landing::Open => {}
            Landing::Blocked => return None,
        }
    }
    None
}

/// Finds the shortest parkour from `src` in `dir`.
#[must_use]
pub fn calculate(ctx: &CalculationContext<'_>, src: CellPos, dir: Direction) -> Option<(MoveResult, i32, bool)> {
    let (distance, ascend) = first_landing(ctx, src, dir)?;
    let result = MoveResult {
        dest: src.step_by(dir, distance).up_by(i32::from(ascend)),
        cost: cost_for_distance(ctx, distance, ascend),
        uses_bucket: false,
    };
    Some((result, distance, ascend))
}

/// Cost of the specific jump of distance `n` from `src` in `dir`.
///
/// Feasible only while this jump is still the first landing [`calculate`]
/// finds from `src`. A nearer landing or a new obstruction rules it out.
#[must_use]
pub fn cost(ctx: &CalculationContext<'_>, src: CellPos, dir: Direction, n: i32, ascend: bool) -> Cost {
    match first_landing(ctx, src, dir) {
        Some(found) if found == (n, ascend) => cost_for_distance(ctx, n, ascend),
        _ => Cost::Infeasible,
    }
}

impl Routine for Parkour {
    fn cost(&mut self, ctx: &CalculationContext<'_>, footprint: &Footprint) -> Cost {
        cost(ctx, footprint.src, self.direction, self.distance, self.ascend)
    }

    fn valid_positions(&self, footprint: &Footprint) -> HashSet<CellPos> {
        let src = footprint.src;
        (-1..=self.distance)
            .flat_map(|i| {
                let column = src.step_by(self.direction, i);
                [column, column.up()]
            })
            .collect()
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
        if self.distance >= MAX_DISTANCE || self.ascend {
            state.set_input(Input::Sprint, true);
        }
        helper::move_towards(state, env, dest);

        if feet == dest {
            if env.block(dest).is_climbable() || agent.position.y - f64::from(feet.y) < 0.094 {
                state.set_status(MovementStatus::Success);
            }
            return;
        }
        if feet == src {
            return;
        }
        let behind = src.step(self.direction.opposite());
        if feet == src.step(self.direction) || agent.position.y - f64::from(src.y) > 0.0001 {
            if self.distance == 3 && !self.ascend {
                // A two-block gap: jumping too early falls short.
                let center = src.center();
                let from_start = (center.x - agent.position.x)
                    .abs()
                    .max((center.z - agent.position.z).abs());
                if from_start < 0.7 {
                    return;
                }
            }
            state.set_input(Input::Jump, true);
        } else if feet != dest.step(self.direction.opposite()) {
            // Back up for a run-up.
            state.set_input(Input::Sprint, false);
            let target = if feet == behind { src } else { behind };
            helper::move_towards(state, env, target);
        }
    }

    fn safe_to_cancel(&self, footprint: &Footprint, state: &MovementState, env: &TickEnv<'_>) -> bool {
        state.status() != MovementStatus::Running || env.agent.feet() == footprint.src
    }

    fn timeout(&self, settings: &Settings) -> Option<u32> {
        Some(settings.parkour_timeout_ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::AgentInventory;
    use crate::world::WorldSnapshot;
    use rstest::rstest;

    const SRC: CellPos = CellPos::new(0, 10, 0);
    const DIR: Direction = Direction::East;

    /// Take-off block at the source and a landing block `n` columns east.
    fn gap(n: i32) -> WorldSnapshot {
        let mut world = WorldSnapshot::new();
        world.set(SRC.down(), Material::Stone);
        world.set(SRC.step_by(DIR, n).down(), Material::Stone);
        world
    }

    fn parkour_settings() -> Settings {
        Settings {
            allow_parkour: true,
            ..Settings::default()
        }
    }

    #[rstest]
    fn disabled_by_default() {
        let world = gap(2);
        let ctx = CalculationContext::new(&world, &AgentInventory::default(), &Settings::default());
        assert_eq!(cost(&ctx, SRC, DIR, 2, false), Cost::Infeasible);
        assert!(calculate(&ctx, SRC, DIR).is_none());
    }

    #[rstest]
    #[case::one_gap(2)]
    #[case::two_gap(3)]
    #[case::three_gap(4)]
    fn the_shortest_landing_is_found(#[case] n: i32) {
        let world = gap(n);
        let settings = parkour_settings();
        let ctx = CalculationContext::new(&world, &AgentInventory::default(), &settings);
        let (result, distance, ascend) =
            calculate(&ctx, SRC, DIR).unwrap_or_else(|| panic!("no jump of {n}"));
        assert_eq!((result.dest, distance, ascend), (SRC.step_by(DIR, n), n, false));
        assert_eq!(result.cost, cost(&ctx, SRC, DIR, n, false));
    }

    #[rstest]
    fn longer_jumps_cost_more() {
        let settings = parkour_settings();
        let inventory = AgentInventory::default();
        let costs: Vec<Cost> = (2..=4)
            .map(|n| {
                let world = gap(n);
                let ctx = CalculationContext::new(&world, &inventory, &settings);
                cost(&ctx, SRC, DIR, n, false)
            })
            .collect();
        assert!(costs.iter().all(|c| c.is_feasible()));
        assert!(costs.windows(2).all(|pair| matches!(pair, [short, long] if short < long)));
    }

    #[rstest]
    #[case::gap_head(1, 1)]
    #[case::mid_gap_feet(2, 0)]
    #[case::landing_head(4, 2)]
    fn obstructions_rule_out_the_jump(#[case] column: i32, #[case] dy: i32) {
        let mut world = gap(4);
        world.set(SRC.step_by(DIR, column).up_by(dy), Material::Stone);
        let ctx = CalculationContext::new(&world, &AgentInventory::default(), &parkour_settings());
        assert_eq!(cost(&ctx, SRC, DIR, 4, false), Cost::Infeasible);
    }

    #[rstest]
    fn four_needs_a_sprint() {
        let world = gap(4);
        let settings = Settings {
            allow_sprint: false,
            ..parkour_settings()
        };
        let ctx = CalculationContext::new(&world, &AgentInventory::default(), &settings);
        assert_eq!(cost(&ctx, SRC, DIR, 4, false), Cost::Infeasible);
    }

    #[rstest]
    fn an_adjacent_floor_means_traverse_instead() {
        let mut world = gap(2);
        world.set(SRC.step(DIR).down(), Material::Stone);
        let ctx = CalculationContext::new(&world, &AgentInventory::default(), &parkour_settings());
        assert!(calculate(&ctx, SRC, DIR).is_none());
    }

    #[rstest]
    fn a_block_at_landing_height_is_jumped_onto() {
        let mut world = gap(3);
        world.set(SRC.step_by(DIR, 2), Material::Stone);
        let ctx = CalculationContext::new(&world, &AgentInventory::default(), &parkour_settings());
        let found = calculate(&ctx, SRC, DIR).map(|(result, n, ascend)| (result.dest, n, ascend));
        assert_eq!(found, Some((SRC.step_by(DIR, 2).up(), 2, true)));
        assert_eq!(
            cost(&ctx, SRC, DIR, 2, true),
            cost_for_distance(&ctx, 2, false) + jump_one_block_cost()
        );
    }

    #[rstest]
    fn hazards_past_the_landing_rule_it_out() {
        let mut world = gap(2);
        world.set(SRC.step_by(DIR, 3), Material::Fire);
        let ctx = CalculationContext::new(&world, &AgentInventory::default(), &parkour_settings());
        assert!(calculate(&ctx, SRC, DIR).is_none());
    }

    #[rstest]
    fn a_nearer_landing_supersedes_a_longer_jump() {
        let mut world = gap(4);
        world.set(SRC.step_by(DIR, 2).down(), Material::Stone);
        let ctx = CalculationContext::new(&world, &AgentInventory::default(), &parkour_settings());
        assert_eq!(cost(&ctx, SRC, DIR, 4, false), Cost::Infeasible);
        assert!(cost(&ctx, SRC, DIR, 2, false).is_feasible());
    }

    #[rstest]
    #[case::clear(2, vec![])]
    #[case::ceiling_over_the_gap(2, vec![(1, 3)])]
    #[case::ceiling_over_a_long_gap(4, vec![(1, 3), (2, 3)])]
    #[case::ceiling_over_the_landing(3, vec![(3, 3)])]
    #[case::floor_mid_gap(4, vec![(2, -1)])]
    #[case::wall_mid_gap(4, vec![(2, 0)])]
    #[case::head_blocked_mid_gap(4, vec![(2, 1)])]
    #[case::step_up_landing(3, vec![(2, 0)])]
    fn calculated_and_instance_costs_agree(#[case] landing: i32, #[case] blocks: Vec<(i32, i32)>) {
        let mut world = gap(landing);
        for (column, dy) in blocks {
            world.set(SRC.step_by(DIR, column).up_by(dy), Material::Stone);
        }
        let settings = parkour_settings();
        let ctx = CalculationContext::new(&world, &AgentInventory::default(), &settings);
        let found = calculate(&ctx, SRC, DIR);
        for n in MIN_DISTANCE..=MAX_DISTANCE {
            for ascend in [false, true] {
                let expected = match found {
                    Some((result, distance, up)) if (distance, up) == (n, ascend) => result.cost,
                    _ => Cost::Infeasible,
                };
                assert_eq!(cost(&ctx, SRC, DIR, n, ascend), expected, "distance {n}, ascend {ascend}");
            }
        }
    }
}
