//! Cost evaluation against small hand-built scenes, driven through the
//! public catalog API.

use approx::assert_relative_eq;
use ordered_float::OrderedFloat;
use rstest::{fixture, rstest};
use test_utils::{flat_world, WorldBuilder};
use tread::constants::{SPRINT_MULTIPLIER, WALK_ONE_BLOCK_COST};
use tread::movement::MoveResult;
use tread::{
    enumerate_movements, AgentInventory, CalculationContext, CellPos, ContextMode, Cost, Direction,
    Material, Moves, Settings, WorldSnapshot,
};

const SRC: CellPos = CellPos::new(0, 10, 0);
const EAST: CellPos = CellPos::new(1, 10, 0);

#[fixture]
fn two_blocks() -> WorldSnapshot {
    WorldBuilder::new()
        .block(SRC.down(), Material::Stone)
        .block(EAST.down(), Material::Stone)
        .build()
}

fn ticks(result: Option<MoveResult>) -> f64 {
    result.and_then(|r| r.cost.ticks()).unwrap_or(f64::INFINITY)
}

#[rstest]
#[case::walking(false, WALK_ONE_BLOCK_COST)]
#[case::sprinting(true, WALK_ONE_BLOCK_COST * SPRINT_MULTIPLIER)]
fn a_clear_step_east_costs_one_block(
    two_blocks: WorldSnapshot,
    #[case] allow_sprint: bool,
    #[case] expected: f64,
) {
    let settings = Settings {
        allow_sprint,
        ..Settings::default()
    };
    let ctx = CalculationContext::new(&two_blocks, &AgentInventory::default(), &settings);
    let result = Moves::Traverse(Direction::East).calculate(&ctx, SRC);
    assert_eq!(result.map(|r| r.dest), Some(EAST));
    assert_relative_eq!(ticks(result), expected, epsilon = 1e-9);
}

#[rstest]
#[case::walking(Settings { allow_sprint: false, ..Settings::default() }, WALK_ONE_BLOCK_COST)]
#[case::default_settings_sprint(Settings::default(), WALK_ONE_BLOCK_COST * SPRINT_MULTIPLIER)]
fn a_clear_step_south_costs_one_block_until_the_floor_goes(
    #[case] settings: Settings,
    #[case] expected: f64,
) {
    let south = CellPos::new(0, 10, 1);
    let mut world = WorldBuilder::new()
        .block(SRC.down(), Material::Stone)
        .block(south.down(), Material::Stone)
        .build();
    let inventory = AgentInventory::default();
    let mut step = {
        let ctx = CalculationContext::new(&world, &inventory, &settings);
        let mut step = Moves::Traverse(Direction::South)
            .apply(&ctx, SRC)
            .expect("the step should be feasible");
        assert_eq!(step.dest(), south);
        assert_relative_eq!(
            step.calculate_cost(&ctx).ticks().unwrap_or(f64::INFINITY),
            expected,
            epsilon = 1e-9
        );
        step
    };

    world.clear(south.down());
    let floorless = CalculationContext::new(&world, &inventory, &settings);
    assert_eq!(step.recalculate_cost(&floorless), Cost::Infeasible);
    assert!(Moves::Traverse(Direction::South).calculate(&floorless, SRC).is_none());
}

#[rstest]
fn no_floor_and_nothing_to_bridge_with_is_infeasible(mut two_blocks: WorldSnapshot) {
    two_blocks.clear(EAST.down());
    let ctx = CalculationContext::new(&two_blocks, &AgentInventory::default(), &Settings::default());
    assert!(Moves::Traverse(Direction::East).calculate(&ctx, SRC).is_none());
    assert!(Moves::Traverse(Direction::East).apply(&ctx, SRC).is_none());
}

fn drop_of(height: i32) -> WorldSnapshot {
    WorldBuilder::new()
        .block(SRC.down(), Material::Stone)
        .block(CellPos::new(1, SRC.y - height - 1, 0), Material::Stone)
        .build()
}

#[rstest]
#[case::two(2, true)]
#[case::three(3, true)]
#[case::four(4, false)]
fn unassisted_falls_stop_at_the_configured_height(#[case] height: i32, #[case] feasible: bool) {
    let world = drop_of(height);
    let ctx = CalculationContext::new(&world, &AgentInventory::default(), &Settings::default());
    let movement = Moves::Descend(Direction::East).apply(&ctx, SRC);
    assert_eq!(movement.is_some(), feasible);
    if let Some(fall) = movement {
        assert_eq!(fall.kind().name(), "fall");
        assert_eq!(fall.dest(), CellPos::new(1, SRC.y - height, 0));
    }
}

#[rstest]
#[case::just_past_the_unassisted_limit(4, true)]
#[case::at_the_bucket_limit(20, true)]
#[case::past_the_bucket_limit(21, false)]
fn a_water_bucket_extends_the_fall(#[case] height: i32, #[case] feasible: bool) {
    let world = drop_of(height);
    let inventory = AgentInventory {
        water_bucket: true,
        ..AgentInventory::default()
    };
    let ctx = CalculationContext::new(&world, &inventory, &Settings::default());
    let result = Moves::Descend(Direction::East).calculate(&ctx, SRC);
    assert_eq!(result.is_some(), feasible);
    if let Some(found) = result {
        assert!(found.uses_bucket);
    }
}

fn gap_of(distance: i32) -> WorldSnapshot {
    WorldBuilder::new()
        .block(SRC.down(), Material::Stone)
        .block(SRC.step_by(Direction::East, distance).down(), Material::Stone)
        .build()
}

#[rstest]
fn parkour_costs_grow_with_distance() {
    let settings = Settings {
        allow_parkour: true,
        ..Settings::default()
    };
    let inventory = AgentInventory::default();
    let costs: Vec<Cost> = (2..=4)
        .map(|distance| {
            let world = gap_of(distance);
            let ctx = CalculationContext::new(&world, &inventory, &settings);
            let result = Moves::Parkour(Direction::East).calculate(&ctx, SRC);
            assert_eq!(
                result.map(|r| r.dest),
                Some(SRC.step_by(Direction::East, distance)),
                "jump of {distance}"
            );
            result.map_or(Cost::Infeasible, |r| r.cost)
        })
        .collect();
    assert!(costs.windows(2).all(|pair| matches!(pair, [short, long] if short < long)));
}

#[rstest]
fn parkour_comes_from_settings_json() -> anyhow::Result<()> {
    let settings = Settings::from_json_str(r#"{ "allow_parkour": true }"#)?;
    let world = gap_of(3);
    let ctx = CalculationContext::new(&world, &AgentInventory::default(), &settings);
    let kinds: Vec<&str> = enumerate_movements(&ctx, SRC)
        .iter()
        .map(|c| c.movement.kind().name())
        .collect();
    assert!(kinds.contains(&"parkour"));
    Ok(())
}

#[rstest]
fn threaded_and_borrowed_contexts_agree() {
    let world = WorldBuilder::new()
        .floor(9, -3..=3, -3..=3, Material::Stone)
        .block(CellPos::new(1, 10, 1), Material::Dirt)
        .block(CellPos::new(-1, 10, 0), Material::Stone)
        .column(0, -2, 10..=11, Material::Glass)
        .clear(CellPos::new(0, 9, 1))
        .build();
    let inventory = AgentInventory {
        throwaway_blocks: 8,
        ..AgentInventory::default()
    };
    let settings = Settings::default();
    let summarise = |ctx: &CalculationContext<'_>| -> Vec<(&'static str, CellPos, OrderedFloat<f64>)> {
        enumerate_movements(ctx, SRC)
            .into_iter()
            .map(|c| (c.movement.kind().name(), c.movement.dest(), c.cost))
            .collect()
    };
    let borrowed = CalculationContext::new(&world, &inventory, &settings);
    let threaded = CalculationContext::new_threaded(&world, &inventory, &settings);
    let first = summarise(&borrowed);
    assert!(!first.is_empty());
    assert_eq!(first, summarise(&borrowed));
    assert_eq!(first, summarise(&threaded));
}

#[rstest]
fn a_frozen_context_refuses_to_modify_the_world() {
    let world = WorldBuilder::new()
        .floor(9, -2..=2, -2..=2, Material::Dirt)
        .floor(8, -2..=2, -2..=2, Material::Stone)
        .build();
    let inventory = AgentInventory {
        throwaway_blocks: 8,
        ..AgentInventory::default()
    };
    let settings = Settings::default();
    let standard = CalculationContext::new(&world, &inventory, &settings);
    assert!(Moves::Pillar.calculate(&standard, SRC).is_some());
    assert!(Moves::Downward.calculate(&standard, SRC).is_some());

    let frozen = CalculationContext::new(&world, &inventory, &settings)
        .with_mode(ContextMode::NoWorldModification);
    assert!(Moves::Pillar.calculate(&frozen, SRC).is_none());
    assert!(Moves::Downward.calculate(&frozen, SRC).is_none());
}

#[rstest]
fn destinations_beyond_the_height_limits_are_skipped() {
    let world = flat_world(9, 2).with_height_limits(0, 12);
    let inventory = AgentInventory {
        throwaway_blocks: 8,
        ..AgentInventory::default()
    };
    let ctx = CalculationContext::new(&world, &inventory, &Settings::default());
    assert!(Moves::Pillar.calculate(&ctx, SRC).is_none());
    assert!(Moves::Traverse(Direction::East).calculate(&ctx, SRC).is_some());
}
