//! Movement instances and their tick-driven execution.
//!
//! A [`Movement`] is one planned transition between two cells. Planning asks
//! it for a [`Cost`] through a [`CalculationContext`]; execution ticks it with
//! a [`TickEnv`] describing the live agent and world, and receives a
//! [`TickOutcome`] holding the new phase and the inputs to apply.
//!
//! The phase advances `Prepping -> Waiting -> Running` and then settles on one
//! of `Success`, `Unreachable` or `Failed`. Only [`Movement::reset`] moves it
//! backwards.

pub mod ascend;
pub mod descend;
pub mod diagonal;
pub mod downward;
pub mod fall;
pub(crate) mod helper;
pub mod moves;
pub mod parkour;
pub mod pillar;
mod state;
pub mod traverse;

use hashbrown::HashSet;
use log::{debug, warn};
use once_cell::unsync::OnceCell;
use thiserror::Error;

use crate::agent::AgentState;
use crate::block::BlockState;
use crate::cell::{CellPos, Direction};
use crate::classifier::{can_walk_on, can_walk_through, ClassifierPolicy};
use crate::context::CalculationContext;
use crate::cost::Cost;
use crate::input::{ControlIntent, Input, ItemRequest};
use crate::inventory::AgentInventory;
use crate::rotation::{ReachSolver, Rotation};
use crate::settings::Settings;
use crate::world::WorldView;

pub use ascend::Ascend;
pub use descend::Descend;
pub use diagonal::Diagonal;
pub use downward::Downward;
pub use fall::Fall;
pub use moves::{enumerate_movements, Candidate, MoveOffset, MoveResult, Moves};
pub use parkour::Parkour;
pub use pillar::Pillar;
pub use state::{MovementState, MovementStatus};
pub use traverse::Traverse;

/// Precondition violations when driving a movement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MovementError {
    /// The movement already reached a terminal phase.
    #[error("movement {src} -> {dest} already finished as {status:?}")]
    AlreadyComplete {
        /// Source cell.
        src: CellPos,
        /// Destination cell.
        dest: CellPos,
        /// The terminal phase.
        status: MovementStatus,
    },
    /// The cost was read before it was calculated.
    #[error("cost of movement {src} -> {dest} has not been calculated")]
    CostNotCalculated {
        /// Source cell.
        src: CellPos,
        /// Destination cell.
        dest: CellPos,
    },
}

/// Live inputs for one execution tick.
pub struct TickEnv<'a> {
    /// The world as it is this tick.
    pub world: &'a dyn WorldView,
    /// The agent as it is this tick.
    pub agent: &'a AgentState,
    /// What the agent carries.
    pub inventory: &'a AgentInventory,
    /// Execution settings.
    pub settings: &'a Settings,
    /// Decides whether blocks can be aimed at.
    pub reach: &'a dyn ReachSolver,
    policy: ClassifierPolicy,
}

impl<'a> TickEnv<'a> {
    /// Bundles the live state for one tick.
    #[must_use]
    pub const fn new(
        world: &'a dyn WorldView,
        agent: &'a AgentState,
        inventory: &'a AgentInventory,
        settings: &'a Settings,
        reach: &'a dyn ReachSolver,
    ) -> Self {
        Self {
            world,
            agent,
            inventory,
            settings,
            reach,
            policy: settings.classifier_policy(),
        }
    }

    /// Classifier settings derived from [`TickEnv::settings`].
    #[must_use]
    pub const fn policy(&self) -> &ClassifierPolicy {
        &self.policy
    }

    pub(crate) fn block(&self, pos: CellPos) -> BlockState {
        self.world.block_at(pos)
    }

    pub(crate) fn can_walk_through(&self, pos: CellPos) -> bool {
        can_walk_through(self.world, &self.policy, pos, self.block(pos))
    }

    pub(crate) fn can_walk_on(&self, pos: CellPos) -> bool {
        can_walk_on(self.world, &self.policy, pos, self.block(pos))
    }
}

impl std::fmt::Debug for TickEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickEnv")
            .field("agent", self.agent)
            .field("inventory", self.inventory)
            .finish_non_exhaustive()
    }
}

/// Result of one execution tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Phase after the tick.
    pub status: MovementStatus,
    /// What the executor should do this tick. Idle once the movement is
    /// complete.
    pub intent: ControlIntent,
}

/// The cells a movement touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footprint {
    /// Where the agent's feet start.
    pub src: CellPos,
    /// Where the agent's feet end.
    pub dest: CellPos,
    /// Cells that must be passable before the movement is safe.
    pub positions_to_break: Vec<CellPos>,
    /// Cell that must hold a block for the agent to stand on.
    pub position_to_place: Option<CellPos>,
}

impl Footprint {
    pub(crate) const fn new(
        src: CellPos,
        dest: CellPos,
        positions_to_break: Vec<CellPos>,
        position_to_place: Option<CellPos>,
    ) -> Self {
        Self {
            src,
            dest,
            positions_to_break,
            position_to_place,
        }
    }

    /// Horizontal unit step from source to destination, if there is one.
    pub(crate) const fn direction(&self) -> Option<Direction> {
        Direction::from_delta(self.dest.x - self.src.x, self.dest.z - self.src.z)
    }
}

/// Behaviour that differs between movement kinds.
pub(crate) trait Routine {
    /// Cost of the movement described by `footprint`.
    fn cost(&mut self, ctx: &CalculationContext<'_>, footprint: &Footprint) -> Cost;

    /// Feet cells from which the movement is still in progress.
    fn valid_positions(&self, footprint: &Footprint) -> HashSet<CellPos>;

    /// Whether the agent standing at `feet` is still on course.
    fn on_course(
        &self,
        _footprint: &Footprint,
        valid: &HashSet<CellPos>,
        feet: CellPos,
        _env: &TickEnv<'_>,
    ) -> bool {
        valid.contains(&feet)
    }

    /// Per-tick routine while running.
    fn tick(&mut self, footprint: &Footprint, state: &mut MovementState, env: &TickEnv<'_>);

    /// Checks made before anything else on every tick, including prepping.
    fn before_tick(&self, _footprint: &Footprint, _state: &mut MovementState, _env: &TickEnv<'_>) {}

    /// Extra work done while obstructions are still being cleared.
    fn while_prepping(
        &mut self,
        _footprint: &Footprint,
        _state: &mut MovementState,
        _env: &TickEnv<'_>,
    ) {
    }

    fn safe_to_cancel(
        &self,
        _footprint: &Footprint,
        state: &MovementState,
        _env: &TickEnv<'_>,
    ) -> bool {
        state.status() != MovementStatus::Running
    }

    fn reset(&mut self) {}

    /// Ticks the movement may spend running before it fails.
    fn timeout(&self, _settings: &Settings) -> Option<u32> {
        None
    }

    /// Whether the prepping phase clears obstructions at all.
    fn prepares(&self) -> bool {
        true
    }

    /// Candidates for breaking before the movement starts.
    fn break_cells<'f>(&self, footprint: &'f Footprint) -> &'f [CellPos] {
        &footprint.positions_to_break
    }

    /// Cells the agent passes through on the way, which may be obstructed
    /// without blocking the movement outright.
    fn walk_into_cells<'f>(&self, _footprint: &'f Footprint) -> &'f [CellPos] {
        &[]
    }
}

/// The kind of a movement with its per-kind execution state.
#[derive(Debug, Clone, PartialEq)]
pub enum MovementKind {
    /// One block sideways.
    Traverse(Traverse),
    /// One block sideways and one up.
    Ascend(Ascend),
    /// One block sideways and one down.
    Descend(Descend),
    /// One block sideways and two or more down.
    Fall(Fall),
    /// One block diagonally, possibly one up or down.
    Diagonal(Diagonal),
    /// Straight up by placing a block underneath.
    Pillar(Pillar),
    /// Straight down by breaking the floor.
    Downward(Downward),
    /// A sprint jump across a gap.
    Parkour(Parkour),
}

impl MovementKind {
    /// A short lowercase name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Traverse(_) => "traverse",
            Self::Ascend(_) => "ascend",
            Self::Descend(_) => "descend",
            Self::Fall(_) => "fall",
            Self::Diagonal(_) => "diagonal",
            Self::Pillar(_) => "pillar",
            Self::Downward(_) => "downward",
            Self::Parkour(_) => "parkour",
        }
    }

    fn routine(&self) -> &dyn Routine {
        match self {
            Self::Traverse(kind) => kind,
            Self::Ascend(kind) => kind,
            Self::Descend(kind) => kind,
            Self::Fall(kind) => kind,
            Self::Diagonal(kind) => kind,
            Self::Pillar(kind) => kind,
            Self::Downward(kind) => kind,
            Self::Parkour(kind) => kind,
        }
    }

    fn routine_mut(&mut self) -> &mut dyn Routine {
        match self {
            Self::Traverse(kind) => kind,
            Self::Ascend(kind) => kind,
            Self::Descend(kind) => kind,
            Self::Fall(kind) => kind,
            Self::Diagonal(kind) => kind,
            Self::Pillar(kind) => kind,
            Self::Downward(kind) => kind,
            Self::Parkour(kind) => kind,
        }
    }
}

/// Lazily gathered lists of cells that still need work. Never refreshed
/// implicitly; see [`Movement::reset_block_cache`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct BlockCache {
    to_break: Option<Vec<CellPos>>,
    to_place: Option<Vec<CellPos>>,
    to_walk_into: Option<Vec<CellPos>>,
}

impl BlockCache {
    const fn is_empty(&self) -> bool {
        self.to_break.is_none() && self.to_place.is_none() && self.to_walk_into.is_none()
    }
}

enum Preparation {
    Ready,
    Busy,
    Blocked,
}

/// One planned transition between two cells, with its execution state.
#[derive(Debug, Clone)]
pub struct Movement {
    kind: MovementKind,
    footprint: Footprint,
    cost: Option<Cost>,
    valid_positions: OnceCell<HashSet<CellPos>>,
    cache: BlockCache,
    state: MovementState,
    ticks_running: u32,
}

impl Movement {
    fn with_kind(kind: MovementKind, footprint: Footprint) -> Self {
        Self {
            kind,
            footprint,
            cost: None,
            valid_positions: OnceCell::new(),
            cache: BlockCache::default(),
            state: MovementState::default(),
            ticks_running: 0,
        }
    }

    /// Walk from `src` to the horizontally adjacent `dest`.
    #[must_use]
    pub fn traverse(src: CellPos, dest: CellPos) -> Self {
        Self::with_kind(
            MovementKind::Traverse(Traverse::new()),
            traverse::footprint(src, dest),
        )
    }

    /// Step up from `src` onto `dest`, one block higher.
    #[must_use]
    pub fn ascend(src: CellPos, dest: CellPos) -> Self {
        Self::with_kind(MovementKind::Ascend(Ascend::new()), ascend::footprint(src, dest))
    }

    /// Walk off `src` down onto `dest`, one block lower.
    #[must_use]
    pub fn descend(src: CellPos, dest: CellPos) -> Self {
        Self::with_kind(
            MovementKind::Descend(Descend::new()),
            descend::footprint(src, dest),
        )
    }

    /// Walk off `src` and drop two or more blocks onto `dest`.
    #[must_use]
    pub fn fall(src: CellPos, dest: CellPos) -> Self {
        Self::with_kind(MovementKind::Fall(Fall::new()), fall::footprint(src, dest))
    }

    /// Walk diagonally from `src` to `dest`.
    #[must_use]
    pub fn diagonal(src: CellPos, dest: CellPos) -> Self {
        Self::with_kind(
            MovementKind::Diagonal(Diagonal::new()),
            diagonal::footprint(src, dest),
        )
    }

    /// Jump and place a block underneath.
    #[must_use]
    pub fn pillar(src: CellPos) -> Self {
        Self::with_kind(MovementKind::Pillar(Pillar::new()), pillar::footprint(src))
    }

    /// Break the floor and drop one block.
    #[must_use]
    pub fn downward(src: CellPos) -> Self {
        Self::with_kind(
            MovementKind::Downward(Downward::new()),
            downward::footprint(src),
        )
    }

    /// Jump `distance` blocks in `direction`, landing one higher when
    /// `ascend` is set.
    #[must_use]
    pub fn parkour(src: CellPos, direction: Direction, distance: i32, ascend: bool) -> Self {
        Self::with_kind(
            MovementKind::Parkour(Parkour::new(direction, distance, ascend)),
            parkour::footprint(src, direction, distance, ascend),
        )
    }

    /// Source cell.
    #[must_use]
    pub const fn src(&self) -> CellPos {
        self.footprint.src
    }

    /// Destination cell.
    #[must_use]
    pub const fn dest(&self) -> CellPos {
        self.footprint.dest
    }

    /// The movement kind.
    #[must_use]
    pub const fn kind(&self) -> &MovementKind {
        &self.kind
    }

    /// Cells that must be passable before the movement is safe.
    #[must_use]
    pub fn positions_to_break(&self) -> &[CellPos] {
        &self.footprint.positions_to_break
    }

    /// Cell that must hold a block to stand on.
    #[must_use]
    pub const fn position_to_place(&self) -> Option<CellPos> {
        self.footprint.position_to_place
    }

    /// Current execution phase.
    #[must_use]
    pub const fn status(&self) -> MovementStatus {
        self.state.status()
    }

    /// Ticks spent in the running phase.
    #[must_use]
    pub const fn ticks_running(&self) -> u32 {
        self.ticks_running
    }

    /// The cost, calculated against `ctx` on first use and cached.
    pub fn calculate_cost(&mut self, ctx: &CalculationContext<'_>) -> Cost {
        if let Some(cost) = self.cost {
            return cost;
        }
        self.recalculate_cost(ctx)
    }

    /// Discards the cached cost and calculates it again.
    pub fn recalculate_cost(&mut self, ctx: &CalculationContext<'_>) -> Cost {
        let cost = self.kind.routine_mut().cost(ctx, &self.footprint);
        self.cost = Some(cost);
        cost
    }

    /// The cached cost, if calculated.
    #[must_use]
    pub const fn cached_cost(&self) -> Option<Cost> {
        self.cost
    }

    /// The cached cost.
    ///
    /// # Errors
    /// [`MovementError::CostNotCalculated`] when no cost has been calculated.
    pub const fn calculated_cost(&self) -> Result<Cost, MovementError> {
        match self.cost {
            Some(cost) => Ok(cost),
            None => Err(MovementError::CostNotCalculated {
                src: self.footprint.src,
                dest: self.footprint.dest,
            }),
        }
    }

    pub(crate) fn set_cost(&mut self, cost: Cost) {
        self.cost = Some(cost);
    }

    /// Feet cells from which the movement is still in progress.
    #[must_use]
    pub fn valid_positions(&self) -> &HashSet<CellPos> {
        self.valid_positions
            .get_or_init(|| self.kind.routine().valid_positions(&self.footprint))
    }

    /// Required cells that are not yet passable.
    pub fn to_break(&mut self, world: &dyn WorldView, policy: &ClassifierPolicy) -> &[CellPos] {
        let cells = self.kind.routine().break_cells(&self.footprint);
        self.cache.to_break.get_or_insert_with(|| {
            cells
                .iter()
                .copied()
                .filter(|pos| !can_walk_through(world, policy, *pos, world.block_at(*pos)))
                .collect()
        })
    }

    /// The placement cell, if it still lacks a floor.
    pub fn to_place(&mut self, world: &dyn WorldView, policy: &ClassifierPolicy) -> &[CellPos] {
        let place = self.footprint.position_to_place;
        self.cache.to_place.get_or_insert_with(|| {
            place
                .into_iter()
                .filter(|pos| !can_walk_on(world, policy, *pos, world.block_at(*pos)))
                .collect()
        })
    }

    /// Cells passed through on the way that are not yet passable.
    pub fn to_walk_into(&mut self, world: &dyn WorldView, policy: &ClassifierPolicy) -> &[CellPos] {
        let cells = self.kind.routine().walk_into_cells(&self.footprint);
        self.cache.to_walk_into.get_or_insert_with(|| {
            cells
                .iter()
                .copied()
                .filter(|pos| !can_walk_through(world, policy, *pos, world.block_at(*pos)))
                .collect()
        })
    }

    /// Forgets the gathered break, place and walk-into lists.
    pub fn reset_block_cache(&mut self) {
        self.cache = BlockCache::default();
    }

    /// Whether no break, place or walk-into list is cached.
    #[must_use]
    pub const fn block_cache_is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Restarts execution from the prepping phase.
    pub fn reset(&mut self) {
        self.state = MovementState::default();
        self.ticks_running = 0;
        self.kind.routine_mut().reset();
    }

    /// Whether the movement can be abandoned now without stranding the agent.
    #[must_use]
    pub fn safe_to_cancel(&self, env: &TickEnv<'_>) -> bool {
        self.kind
            .routine()
            .safe_to_cancel(&self.footprint, &self.state, env)
    }

    /// Advances execution by one tick.
    ///
    /// # Errors
    /// [`MovementError::AlreadyComplete`] when the movement already finished.
    pub fn try_update(&mut self, env: &TickEnv<'_>) -> Result<TickOutcome, MovementError> {
        let before = self.state.status();
        if before.is_complete() {
            return Err(MovementError::AlreadyComplete {
                src: self.footprint.src,
                dest: self.footprint.dest,
                status: before,
            });
        }
        self.advance(env);
        let status = self.state.status();
        let gathered = self.state.take_intent();
        if status != before {
            self.log_transition(before, status);
        }
        let intent = if status.is_complete() {
            ControlIntent::default()
        } else {
            gathered
        };
        Ok(TickOutcome { status, intent })
    }

    /// Advances execution by one tick.
    ///
    /// # Panics
    /// Panics if the movement already finished.
    #[track_caller]
    pub fn update(&mut self, env: &TickEnv<'_>) -> TickOutcome {
        match self.try_update(env) {
            Ok(outcome) => outcome,
            Err(err) => panic!("{err}"),
        }
    }

    fn log_transition(&self, before: MovementStatus, after: MovementStatus) {
        let (name, src, dest) = (self.kind.name(), self.footprint.src, self.footprint.dest);
        match after {
            MovementStatus::Unreachable | MovementStatus::Failed => {
                warn!("{name} {src} -> {dest}: {before:?} -> {after:?}");
            }
            _ => debug!("{name} {src} -> {dest}: {before:?} -> {after:?}"),
        }
    }

    fn advance(&mut self, env: &TickEnv<'_>) {
        self.kind
            .routine()
            .before_tick(&self.footprint, &mut self.state, env);
        match self.state.status() {
            MovementStatus::Prepping => self.prep(env),
            MovementStatus::Waiting => {
                self.state.set_status(MovementStatus::Running);
                self.run(env);
            }
            MovementStatus::Running => self.run(env),
            MovementStatus::Success | MovementStatus::Unreachable | MovementStatus::Failed => {}
        }
    }

    fn prep(&mut self, env: &TickEnv<'_>) {
        if !self.kind.routine().prepares() {
            self.state.set_status(MovementStatus::Waiting);
            return;
        }
        match self.prepare(env) {
            Preparation::Ready => self.state.set_status(MovementStatus::Waiting),
            Preparation::Busy => {
                self.kind
                    .routine_mut()
                    .while_prepping(&self.footprint, &mut self.state, env);
            }
            Preparation::Blocked => self.state.set_status(MovementStatus::Unreachable),
        }
    }

    /// Aims at and strikes the first obstruction that can be reached.
    fn prepare(&mut self, env: &TickEnv<'_>) -> Preparation {
        let agent = env.agent;
        let mut obstructed = false;
        for &pos in self.kind.routine().break_cells(&self.footprint) {
            let block = env.block(pos);
            if env.can_walk_through(pos) || block.is_liquid() {
                continue;
            }
            obstructed = true;
            self.state.request_item(ItemRequest::BestToolFor(block));
            if let Some(rotation) = env.reach.reachable(agent, env.world, pos) {
                self.state.set_target(rotation, true);
                if agent.is_looking_at(pos) || agent.rotation.is_really_close_to(rotation) {
                    self.state.click_left(pos);
                }
                return Preparation::Busy;
            }
            let center = pos.center();
            if agent.eye_position().distance(center) <= env.settings.block_reach_distance {
                self.state
                    .set_target(Rotation::towards(agent.eye_position(), center), true);
                self.state.click_left(pos);
                return Preparation::Busy;
            }
        }
        if obstructed {
            Preparation::Blocked
        } else {
            Preparation::Ready
        }
    }

    fn run(&mut self, env: &TickEnv<'_>) {
        self.ticks_running = self.ticks_running.saturating_add(1);
        let agent = env.agent;
        let feet = agent.feet();
        let valid = self.valid_positions();
        if !self
            .kind
            .routine()
            .on_course(&self.footprint, valid, feet, env)
        {
            self.state.set_status(MovementStatus::Unreachable);
            return;
        }
        if env.block(feet).is_liquid()
            && agent.position.y < f64::from(self.footprint.dest.y) + 0.6
        {
            self.state.set_input(Input::Jump, true);
        }
        let eyes = CellPos::containing(agent.eye_position());
        let in_wall = env.block(eyes);
        if in_wall.is_full_cube() {
            self.state.request_item(ItemRequest::BestToolFor(in_wall));
            self.state.click_left(eyes);
        }
        self.kind
            .routine_mut()
            .tick(&self.footprint, &mut self.state, env);
        if self.state.status().is_complete() {
            return;
        }
        if let Some(limit) = self.kind.routine().timeout(env.settings) {
            if self.ticks_running > limit {
                self.state.set_status(MovementStatus::Failed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Material;
    use crate::rotation::RaycastReach;
    use crate::world::WorldSnapshot;
    use rstest::{fixture, rstest};
    use static_assertions::assert_impl_all;

    assert_impl_all!(Movement: Send, Clone);
    assert_impl_all!(MovementError: std::error::Error, Send, Sync);

    #[fixture]
    fn flat() -> WorldSnapshot {
        let mut world = WorldSnapshot::new();
        for x in -3..=3 {
            for z in -3..=3 {
                world.set(CellPos::new(x, 9, z), Material::Stone);
            }
        }
        world
    }

    #[rstest]
    fn cost_must_be_calculated_before_it_is_read(flat: WorldSnapshot) {
        let src = CellPos::new(0, 10, 0);
        let mut movement = Movement::traverse(src, src.offset(0, 0, 1));
        assert!(matches!(
            movement.calculated_cost(),
            Err(MovementError::CostNotCalculated { .. })
        ));
        let ctx = CalculationContext::new(&flat, &AgentInventory::default(), &Settings::default());
        let cost = movement.calculate_cost(&ctx);
        assert_eq!(movement.calculated_cost(), Ok(cost));
    }

    #[rstest]
    fn cached_cost_survives_world_changes_until_recalculated(mut flat: WorldSnapshot) {
        let src = CellPos::new(0, 10, 0);
        let dest = src.offset(0, 0, 1);
        let inventory = AgentInventory::default();
        let settings = Settings::default();
        let mut movement = Movement::traverse(src, dest);
        {
            let ctx = CalculationContext::new(&flat, &inventory, &settings);
            assert!(movement.calculate_cost(&ctx).is_feasible());
        }
        flat.clear(dest.down());
        let ctx = CalculationContext::new(&flat, &inventory, &settings);
        assert!(movement.calculate_cost(&ctx).is_feasible());
        assert_eq!(movement.recalculate_cost(&ctx), Cost::Infeasible);
    }

    #[rstest]
    fn block_cache_is_filled_on_demand_and_cleared_explicitly(mut flat: WorldSnapshot) {
        let src = CellPos::new(0, 10, 0);
        let dest = src.offset(0, 0, 1);
        flat.set(dest, Material::Dirt);
        let policy = Settings::default().classifier_policy();
        let mut movement = Movement::traverse(src, dest);
        assert!(movement.block_cache_is_empty());
        assert_eq!(movement.to_break(&flat, &policy), &[dest]);
        assert!(movement.to_place(&flat, &policy).is_empty());
        assert!(!movement.block_cache_is_empty());

        flat.clear(dest);
        assert_eq!(movement.to_break(&flat, &policy), &[dest]);
        movement.reset_block_cache();
        assert!(movement.block_cache_is_empty());
        assert!(movement.to_break(&flat, &policy).is_empty());
    }

    #[rstest]
    fn ticking_a_finished_movement_is_an_error(flat: WorldSnapshot) {
        let src = CellPos::new(0, 10, 0);
        let mut movement = Movement::traverse(src, src.offset(0, 0, 1));
        let agent = AgentState::standing_at(CellPos::new(3, 10, 3));
        let inventory = AgentInventory::default();
        let settings = Settings::default();
        let reach = RaycastReach::default();
        let env = TickEnv::new(&flat, &agent, &inventory, &settings, &reach);

        assert_eq!(movement.update(&env).status, MovementStatus::Waiting);
        let outcome = movement.update(&env);
        assert_eq!(outcome.status, MovementStatus::Unreachable);
        assert!(outcome.intent.is_idle());
        assert!(matches!(
            movement.try_update(&env),
            Err(MovementError::AlreadyComplete {
                status: MovementStatus::Unreachable,
                ..
            })
        ));

        movement.reset();
        assert_eq!(movement.status(), MovementStatus::Prepping);
        assert_eq!(movement.ticks_running(), 0);
    }

    #[rstest]
    fn standing_in_water_below_the_destination_surface_jumps(mut flat: WorldSnapshot) {
        let src = CellPos::new(0, 10, 0);
        let dest = src.offset(0, 0, 1);
        flat.set(src, BlockState::water(0));
        let agent = AgentState::standing_at(src);
        let inventory = AgentInventory::default();
        let settings = Settings::default();
        let reach = RaycastReach::default();
        let env = TickEnv::new(&flat, &agent, &inventory, &settings, &reach);
        let mut movement = Movement::traverse(src, dest);

        movement.update(&env);
        let outcome = movement.update(&env);
        assert_eq!(outcome.status, MovementStatus::Running);
        assert!(outcome.intent.holds(Input::Jump));
    }
}
