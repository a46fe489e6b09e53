//! The frozen view a planning pass evaluates movements against.
//!
//! A [`CalculationContext`] bundles world access, the agent's capabilities and
//! every policy value a cost function consults. Nothing in it changes after
//! construction, so repeated cost queries against one context always agree.

use std::sync::Arc;

use crate::block::{BlockState, MaterialSet};
use crate::cell::CellPos;
use crate::classifier::ClassifierPolicy;
use crate::constants::{WALK_ONE_BLOCK_COST, WALK_ONE_IN_WATER_COST};
use crate::cost::Cost;
use crate::inventory::{AgentInventory, ToolSet};
use crate::settings::Settings;
use crate::world::{Region, WorldBorder, WorldSnapshot, WorldView};

/// Ticks charged for placing water at the bottom of a bucket-assisted fall.
const PLACE_BUCKET_COST: f64 = 20.0;

/// Whether a context may plan world modifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextMode {
    /// Placement, breaking and water buckets are costed normally.
    #[default]
    Standard,
    /// Placement, breaking and water buckets are always infeasible.
    NoWorldModification,
}

enum WorldAccess<'w> {
    Borrowed(&'w dyn WorldView),
    Owned(Arc<WorldSnapshot>),
}

impl WorldAccess<'_> {
    fn view(&self) -> &dyn WorldView {
        match self {
            Self::Borrowed(world) => *world,
            Self::Owned(snapshot) => snapshot.as_ref(),
        }
    }
}

impl std::fmt::Debug for WorldAccess<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Borrowed(_) => f.write_str("Borrowed"),
            Self::Owned(snapshot) => write!(f, "Owned({} blocks)", snapshot.len()),
        }
    }
}

/// Agent capabilities resolved once per context.
#[derive(Debug, Clone, PartialEq)]
struct Capabilities {
    has_throwaway: bool,
    has_water_bucket: bool,
    can_sprint: bool,
    frost_walker: u8,
    water_walk_speed: f64,
    tools: ToolSet,
}

/// Policy values copied out of [`Settings`].
#[derive(Debug, Clone, PartialEq)]
struct Policy {
    classifier: ClassifierPolicy,
    allow_break: bool,
    allow_parkour: bool,
    allow_parkour_ascend: bool,
    allow_diagonal_descend: bool,
    allow_diagonal_ascend: bool,
    allow_downward: bool,
    allow_place_in_fluids_source: bool,
    allow_place_in_fluids_flow: bool,
    allow_break_anyway: MaterialSet,
    protected_regions: Vec<Region>,
    place_block_cost: f64,
    block_break_additional_cost: f64,
    jump_penalty: f64,
    walk_on_water_one_penalty: f64,
    backtrack_cost_favoring_coefficient: f64,
    parkour_risk_penalty: f64,
    max_fall_height_no_water: u32,
    max_fall_height_bucket: u32,
}

/// World access, capabilities and policy frozen for one planning pass.
#[derive(Debug)]
pub struct CalculationContext<'w> {
    world: WorldAccess<'w>,
    threaded: bool,
    mode: ContextMode,
    border: WorldBorder,
    min_y: i32,
    max_y: i32,
    capabilities: Capabilities,
    policy: Policy,
}

impl<'w> CalculationContext<'w> {
    /// Builds a context that reads the live world through `world`.
    #[must_use]
    pub fn new(world: &'w dyn WorldView, inventory: &AgentInventory, settings: &Settings) -> Self {
        Self::build(WorldAccess::Borrowed(world), false, inventory, settings)
    }

    /// Switches the context's world-modification mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ContextMode) -> Self {
        self.mode = mode;
        self
    }

    fn build(
        world: WorldAccess<'w>,
        threaded: bool,
        inventory: &AgentInventory,
        settings: &Settings,
    ) -> Self {
        let view = world.view();
        let border = view.border();
        let (min_y, max_y) = (view.min_y(), view.max_y());
        let capabilities = Capabilities {
            has_throwaway: settings.allow_place && inventory.has_throwaway(),
            has_water_bucket: settings.allow_water_bucket_fall && inventory.water_bucket,
            can_sprint: settings.allow_sprint,
            frost_walker: inventory.frost_walker,
            water_walk_speed: water_walk_speed(inventory.depth_strider),
            tools: inventory.tool_set(),
        };
        let policy = Policy {
            classifier: settings.classifier_policy(),
            allow_break: settings.allow_break,
            allow_parkour: settings.allow_parkour,
            allow_parkour_ascend: settings.allow_parkour_ascend,
            allow_diagonal_descend: settings.allow_diagonal_descend,
            allow_diagonal_ascend: settings.allow_diagonal_ascend,
            allow_downward: settings.allow_downward,
            allow_place_in_fluids_source: settings.allow_place_in_fluids_source,
            allow_place_in_fluids_flow: settings.allow_place_in_fluids_flow,
            allow_break_anyway: settings.allow_break_anyway,
            protected_regions: settings.protected_regions.clone(),
            place_block_cost: settings.place_block_cost,
            block_break_additional_cost: settings.block_break_additional_cost,
            jump_penalty: settings.jump_penalty,
            walk_on_water_one_penalty: settings.walk_on_water_one_penalty,
            backtrack_cost_favoring_coefficient: settings.backtrack_cost_favoring_coefficient,
            parkour_risk_penalty: settings.parkour_risk_penalty,
            max_fall_height_no_water: settings.max_fall_height_no_water,
            max_fall_height_bucket: settings.max_fall_height_bucket,
        };
        Self {
            world,
            threaded,
            mode: ContextMode::Standard,
            border,
            min_y,
            max_y,
            capabilities,
            policy,
        }
    }

    /// The block at `pos`.
    #[must_use]
    pub fn get(&self, pos: CellPos) -> BlockState {
        self.world.view().block_at(pos)
    }

    /// The world view cost functions read from.
    #[must_use]
    pub fn world(&self) -> &dyn WorldView {
        self.world.view()
    }

    /// Whether the chunk column containing `(x, z)` is loaded.
    #[must_use]
    pub fn is_loaded(&self, x: i32, z: i32) -> bool {
        self.world.view().is_loaded(x, z)
    }

    /// Whether blocks may be placed in column `(x, z)`.
    #[must_use]
    pub const fn within_border(&self, x: i32, z: i32) -> bool {
        self.border.can_place_at(x, z)
    }

    /// Whether the context owns a private snapshot for background use.
    #[must_use]
    pub const fn is_threaded(&self) -> bool {
        self.threaded
    }

    /// Whether `pos` falls inside a protected region.
    #[must_use]
    pub fn is_protected(&self, pos: CellPos) -> bool {
        self.policy
            .protected_regions
            .iter()
            .any(|region| region.contains(pos))
    }

    /// Ticks to place a throwaway block into `pos`, which currently holds
    /// `current`.
    #[must_use]
    pub fn cost_of_placing_at(&self, pos: CellPos, current: BlockState) -> Cost {
        if self.mode == ContextMode::NoWorldModification || !self.capabilities.has_throwaway {
            return Cost::Infeasible;
        }
        if !self.within_border(pos.x, pos.z) || self.is_protected(pos) {
            return Cost::Infeasible;
        }
        if current.is_liquid() {
            let allowed = if current.is_source() {
                self.policy.allow_place_in_fluids_source
            } else {
                self.policy.allow_place_in_fluids_flow
            };
            if !allowed {
                return Cost::Infeasible;
            }
        }
        Cost::finite(self.policy.place_block_cost)
    }

    /// Multiplier on the mining time of `current` at `pos`.
    #[must_use]
    pub fn break_cost_multiplier_at(&self, pos: CellPos, current: BlockState) -> Cost {
        if self.mode == ContextMode::NoWorldModification {
            return Cost::Infeasible;
        }
        if !self.policy.allow_break && !self.policy.allow_break_anyway.contains(current.material) {
            return Cost::Infeasible;
        }
        if self.is_protected(pos) {
            return Cost::Infeasible;
        }
        Cost::finite(1.0)
    }

    /// Ticks to place water at the bottom of a fall.
    #[must_use]
    pub fn place_bucket_cost(&self) -> Cost {
        if self.mode == ContextMode::NoWorldModification || !self.capabilities.has_water_bucket {
            return Cost::Infeasible;
        }
        Cost::finite(PLACE_BUCKET_COST)
    }

    /// Classifier settings.
    #[must_use]
    pub const fn policy(&self) -> &ClassifierPolicy {
        &self.policy.classifier
    }

    /// The agent's tools.
    #[must_use]
    pub const fn tool_set(&self) -> &ToolSet {
        &self.capabilities.tools
    }

    /// Whether a throwaway block is available and placing is allowed.
    #[must_use]
    pub const fn has_throwaway(&self) -> bool {
        self.capabilities.has_throwaway
    }

    /// Whether a water bucket is available for falls.
    #[must_use]
    pub const fn has_water_bucket(&self) -> bool {
        self.capabilities.has_water_bucket
    }

    /// Whether the agent may sprint.
    #[must_use]
    pub const fn can_sprint(&self) -> bool {
        self.capabilities.can_sprint
    }

    /// Frost walker enchantment level.
    #[must_use]
    pub const fn frost_walker(&self) -> u8 {
        self.capabilities.frost_walker
    }

    /// Ticks to wade one block.
    #[must_use]
    pub const fn water_walk_speed(&self) -> f64 {
        self.capabilities.water_walk_speed
    }

    /// Whether breaking is globally allowed.
    #[must_use]
    pub const fn allow_break(&self) -> bool {
        self.policy.allow_break
    }

    /// Whether gap jumps are allowed.
    #[must_use]
    pub const fn allow_parkour(&self) -> bool {
        self.policy.allow_parkour
    }

    /// Whether gap jumps may land one block higher.
    #[must_use]
    pub const fn allow_parkour_ascend(&self) -> bool {
        self.policy.allow_parkour_ascend
    }

    /// Whether diagonals may drop one block.
    #[must_use]
    pub const fn allow_diagonal_descend(&self) -> bool {
        self.policy.allow_diagonal_descend
    }

    /// Whether diagonals may climb one block.
    #[must_use]
    pub const fn allow_diagonal_ascend(&self) -> bool {
        self.policy.allow_diagonal_ascend
    }

    /// Whether digging straight down is allowed.
    #[must_use]
    pub const fn allow_downward(&self) -> bool {
        self.policy.allow_downward
    }

    /// Ticks added to every block break.
    #[must_use]
    pub const fn block_break_additional_cost(&self) -> f64 {
        self.policy.block_break_additional_cost
    }

    /// Ticks added to every jump.
    #[must_use]
    pub const fn jump_penalty(&self) -> f64 {
        self.policy.jump_penalty
    }

    /// Ticks added per block walked on water.
    #[must_use]
    pub const fn walk_on_water_one_penalty(&self) -> f64 {
        self.policy.walk_on_water_one_penalty
    }

    /// Multiplier a search applies to its previous path.
    #[must_use]
    pub const fn backtrack_cost_favoring_coefficient(&self) -> f64 {
        self.policy.backtrack_cost_favoring_coefficient
    }

    /// Ticks added per parkour block beyond two.
    #[must_use]
    pub const fn parkour_risk_penalty(&self) -> f64 {
        self.policy.parkour_risk_penalty
    }

    /// Longest drop taken without water.
    #[must_use]
    pub const fn max_fall_height_no_water(&self) -> u32 {
        self.policy.max_fall_height_no_water
    }

    /// Longest drop taken with a water bucket.
    #[must_use]
    pub const fn max_fall_height_bucket(&self) -> u32 {
        self.policy.max_fall_height_bucket
    }

    /// Lowest layer that can hold blocks.
    #[must_use]
    pub const fn min_y(&self) -> i32 {
        self.min_y
    }

    /// First layer above the buildable range.
    #[must_use]
    pub const fn max_y(&self) -> i32 {
        self.max_y
    }
}

impl CalculationContext<'static> {
    /// Builds a context over a private snapshot of `world`, safe to move to
    /// a worker thread while the live world keeps changing.
    #[must_use]
    pub fn new_threaded(world: &dyn WorldView, inventory: &AgentInventory, settings: &Settings) -> Self {
        let snapshot = Arc::new(world.snapshot());
        Self::build(WorldAccess::Owned(snapshot), true, inventory, settings)
    }
}

/// Ticks per block wading, shortened by depth strider.
fn water_walk_speed(depth_strider: u8) -> f64 {
    let level = f64::from(depth_strider.min(3));
    let multiplier = level / 3.0;
    WALK_ONE_IN_WATER_COST * (1.0 - multiplier) + WALK_ONE_BLOCK_COST * multiplier
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Material;
    use rstest::{fixture, rstest};
    use static_assertions::assert_impl_all;

    assert_impl_all!(CalculationContext<'static>: Send, Sync);

    const SPOT: CellPos = CellPos::new(0, 10, 0);

    #[fixture]
    fn inventory() -> AgentInventory {
        AgentInventory {
            throwaway_blocks: 16,
            water_bucket: true,
            ..AgentInventory::default()
        }
    }

    #[rstest]
    fn placing_costs_the_configured_amount(inventory: AgentInventory) {
        let world = WorldSnapshot::new();
        let settings = Settings::default();
        let ctx = CalculationContext::new(&world, &inventory, &settings);
        assert_eq!(ctx.cost_of_placing_at(SPOT, BlockState::AIR), Cost::finite(20.0));
    }

    #[test]
    fn placing_without_throwaway_is_infeasible() {
        let world = WorldSnapshot::new();
        let ctx = CalculationContext::new(&world, &AgentInventory::default(), &Settings::default());
        assert_eq!(ctx.cost_of_placing_at(SPOT, BlockState::AIR), Cost::Infeasible);
    }

    #[rstest]
    fn protected_regions_forbid_changes(inventory: AgentInventory) {
        let world = WorldSnapshot::new();
        let settings = Settings {
            protected_regions: vec![Region::spanning(SPOT, SPOT.up())],
            ..Settings::default()
        };
        let ctx = CalculationContext::new(&world, &inventory, &settings);
        let stone = BlockState::of(Material::Stone);
        assert_eq!(ctx.cost_of_placing_at(SPOT, BlockState::AIR), Cost::Infeasible);
        assert_eq!(ctx.break_cost_multiplier_at(SPOT, stone), Cost::Infeasible);
        assert!(ctx.break_cost_multiplier_at(SPOT.down(), stone).is_feasible());
    }

    #[rstest]
    fn border_edge_forbids_placement(inventory: AgentInventory) {
        let world = WorldSnapshot::new().with_border(WorldBorder::square(5));
        let ctx = CalculationContext::new(&world, &inventory, &Settings::default());
        assert!(ctx.cost_of_placing_at(CellPos::new(4, 0, 0), BlockState::AIR).is_feasible());
        assert_eq!(
            ctx.cost_of_placing_at(CellPos::new(5, 0, 0), BlockState::AIR),
            Cost::Infeasible
        );
    }

    #[rstest]
    #[case::flowing_forbidden(false, true, BlockState::water(2), false)]
    #[case::flowing_allowed(true, false, BlockState::water(2), true)]
    #[case::source_forbidden(true, false, BlockState::water(0), false)]
    fn fluid_placement_follows_policy(
        inventory: AgentInventory,
        #[case] flow: bool,
        #[case] source: bool,
        #[case] current: BlockState,
        #[case] feasible: bool,
    ) {
        let world = WorldSnapshot::new();
        let settings = Settings {
            allow_place_in_fluids_flow: flow,
            allow_place_in_fluids_source: source,
            ..Settings::default()
        };
        let ctx = CalculationContext::new(&world, &inventory, &settings);
        assert_eq!(ctx.cost_of_placing_at(SPOT, current).is_feasible(), feasible);
    }

    #[rstest]
    fn break_allow_list_overrides_disabled_breaking(inventory: AgentInventory) {
        let world = WorldSnapshot::new();
        let settings = Settings {
            allow_break: false,
            allow_break_anyway: MaterialSet::of(&[Material::Dirt]),
            ..Settings::default()
        };
        let ctx = CalculationContext::new(&world, &inventory, &settings);
        assert!(ctx
            .break_cost_multiplier_at(SPOT, BlockState::of(Material::Dirt))
            .is_feasible());
        assert_eq!(
            ctx.break_cost_multiplier_at(SPOT, BlockState::of(Material::Stone)),
            Cost::Infeasible
        );
    }

    #[rstest]
    fn no_modification_mode_forbids_everything(inventory: AgentInventory) {
        let world = WorldSnapshot::new();
        let ctx = CalculationContext::new(&world, &inventory, &Settings::default())
            .with_mode(ContextMode::NoWorldModification);
        let stone = BlockState::of(Material::Stone);
        assert_eq!(ctx.cost_of_placing_at(SPOT, BlockState::AIR), Cost::Infeasible);
        assert_eq!(ctx.break_cost_multiplier_at(SPOT, stone), Cost::Infeasible);
        assert_eq!(ctx.place_bucket_cost(), Cost::Infeasible);
    }

    #[rstest]
    fn threaded_context_ignores_later_world_changes(inventory: AgentInventory) {
        let mut world = WorldSnapshot::new();
        world.set(SPOT, Material::Stone);
        let ctx = CalculationContext::new_threaded(&world, &inventory, &Settings::default());
        world.clear(SPOT);
        assert!(ctx.is_threaded());
        assert_eq!(ctx.get(SPOT).material, Material::Stone);
    }

    #[rstest]
    #[case(0, WALK_ONE_IN_WATER_COST)]
    #[case(3, WALK_ONE_BLOCK_COST)]
    #[case(7, WALK_ONE_BLOCK_COST)]
    fn depth_strider_speeds_up_wading(#[case] level: u8, #[case] expected: f64) {
        approx::assert_relative_eq!(water_walk_speed(level), expected);
    }
}
