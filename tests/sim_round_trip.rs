//! Plays movements through the tick simulator and checks that the agent
//! ends up where each movement promised.

use rstest::{fixture, rstest};
use test_utils::{flat_world, AgentSim, WorldBuilder};
use tread::{
    init_logging, CalculationContext, CellPos, Direction, Material, Movement, MovementStatus, Moves,
    Settings, WorldView,
};

const A: CellPos = CellPos::new(0, 10, 0);
const B: CellPos = CellPos::new(1, 10, 0);
const TICK_BUDGET: u32 = 200;

#[fixture]
fn settings() -> Settings {
    init_logging(false);
    Settings::default()
}

fn run(sim: &mut AgentSim, movement: &mut Movement, settings: &Settings) -> MovementStatus {
    let execution = sim.execute(movement, settings, TICK_BUDGET);
    assert!(execution.ticks < TICK_BUDGET, "ran out of ticks");
    execution.status
}

#[rstest]
fn walking_there_and_back(settings: Settings) {
    let mut sim = AgentSim::new(flat_world(9, 3), A);
    let mut there = Movement::traverse(A, B);
    assert_eq!(run(&mut sim, &mut there, &settings), MovementStatus::Success);
    assert_eq!(sim.agent.feet(), B);

    let mut back = Movement::traverse(B, A);
    assert_eq!(run(&mut sim, &mut back, &settings), MovementStatus::Success);
    assert_eq!(sim.agent.feet(), A);
}

#[rstest]
fn stepping_up_and_back_down(settings: Settings) {
    let world = WorldBuilder::new()
        .floor(9, -3..=3, -3..=3, Material::Stone)
        .block(B, Material::Stone)
        .build();
    let mut sim = AgentSim::new(world, A);
    let ctx_world = sim.world.clone();
    let ctx = CalculationContext::new(&ctx_world, &sim.inventory, &settings);

    let mut up = Moves::Ascend(Direction::East)
        .apply(&ctx, A)
        .expect("the step should be climbable");
    assert_eq!(up.dest(), B.up());
    assert_eq!(run(&mut sim, &mut up, &settings), MovementStatus::Success);
    assert_eq!(sim.agent.feet(), B.up());

    let mut down = Moves::Descend(Direction::West)
        .apply(&ctx, B.up())
        .expect("the ledge should be walkable off");
    assert_eq!(down.dest(), A);
    assert_eq!(run(&mut sim, &mut down, &settings), MovementStatus::Success);
    assert!(matches!(sim.agent.feet(), A | CellPos { x: -1, y: 10, z: 0 }));
}

#[rstest]
fn a_door_in_the_way_is_opened(settings: Settings) {
    let world = WorldBuilder::new()
        .floor(9, -3..=3, -3..=3, Material::Stone)
        .column(B.x, B.z, 10..=11, Material::Door)
        .build();
    let mut sim = AgentSim::new(world, A);
    let mut through = Movement::traverse(A, B);
    assert_eq!(run(&mut sim, &mut through, &settings), MovementStatus::Success);
    assert!(sim.world.block_at(B).props.open);
}

#[rstest]
fn a_gap_with_nothing_to_bridge_it_is_not_planned(settings: Settings) {
    let sim = AgentSim::new(flat_world(9, 0), A);
    let ctx = CalculationContext::new(&sim.world, &sim.inventory, &settings);
    assert!(Moves::Traverse(Direction::East).apply(&ctx, A).is_none());
}
