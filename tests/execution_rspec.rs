//! Behavioural tests for the execution state machine using rust-rspec.
//!
//! A traverse whose destination is filled with stone must clear it while
//! prepping, hand over to running once the way is open, and never report
//! success before then.

#[path = "support/rspec_runner.rs"]
mod rspec_runner;

use std::sync::{Arc, Mutex, MutexGuard};

use mockall::mock;
use rspec::block::Context as Scenario;
use rspec_runner::run_serial;
use test_utils::{AgentSim, WorldBuilder};
use tread::input::ItemRequest;
use tread::{
    AgentState, BlockState, CellPos, Material, Movement, MovementError, MovementStatus,
    ReachSolver, Rotation, Settings, TickEnv, TickOutcome, WorldView,
};

mock! {
    pub Reach {}
    impl ReachSolver for Reach {
        fn reachable(
            &self,
            agent: &AgentState,
            world: &dyn WorldView,
            target: CellPos,
        ) -> Option<Rotation>;
        fn place_rotation(
            &self,
            agent: &AgentState,
            world: &dyn WorldView,
            against: CellPos,
            place_at: CellPos,
        ) -> Option<Rotation>;
    }
}

const SRC: CellPos = CellPos::new(0, 10, 0);
const DEST: CellPos = CellPos::new(1, 10, 0);

/// A reach solver that can always aim from where the agent already looks.
fn aims_anywhere() -> MockReach {
    let mut reach = MockReach::new();
    reach
        .expect_reachable()
        .returning(|agent, _, _| Some(agent.rotation));
    reach.expect_place_rotation().returning(|_, _, _, _| None);
    reach
}

/// A reach solver that never finds an angle.
fn aims_nowhere() -> MockReach {
    let mut reach = MockReach::new();
    reach.expect_reachable().returning(|_, _, _| None);
    reach.expect_place_rotation().returning(|_, _, _, _| None);
    reach
}

#[derive(Debug, Clone)]
struct ExecutionFixture {
    sim: Arc<Mutex<AgentSim>>,
    movement: Arc<Mutex<Movement>>,
    outcomes: Arc<Mutex<Vec<TickOutcome>>>,
    settings: Settings,
}

fn lock<T>(shared: &Arc<Mutex<T>>) -> MutexGuard<'_, T> {
    shared
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl ExecutionFixture {
    fn bootstrap() -> Self {
        Self {
            sim: Arc::new(Mutex::new(Self::bootstrap_sim())),
            movement: Arc::new(Mutex::new(Movement::traverse(SRC, DEST))),
            outcomes: Arc::new(Mutex::new(Vec::new())),
            settings: Settings::default(),
        }
    }

    fn reset(&self) {
        *lock(&self.sim) = Self::bootstrap_sim();
        *lock(&self.movement) = Movement::traverse(SRC, DEST);
        lock(&self.outcomes).clear();
    }

    fn bootstrap_sim() -> AgentSim {
        let world = WorldBuilder::new()
            .floor(9, -2..=3, -2..=2, Material::Stone)
            .block(DEST, Material::Stone)
            .build();
        AgentSim::new(world, SRC)
    }

    /// Ticks the movement once and applies the intent to the simulation.
    fn tick(&self, reach: &MockReach) {
        self.tick_with(reach, &self.settings);
    }

    fn tick_with(&self, reach: &MockReach, settings: &Settings) {
        let mut sim = lock(&self.sim);
        let mut movement = lock(&self.movement);
        let outcome = {
            let env = TickEnv::new(&sim.world, &sim.agent, &sim.inventory, settings, reach);
            movement.update(&env)
        };
        sim.step(&outcome.intent);
        lock(&self.outcomes).push(outcome);
    }

    fn statuses(&self) -> Vec<MovementStatus> {
        lock(&self.outcomes).iter().map(|o| o.status).collect()
    }

    fn last(&self) -> TickOutcome {
        *lock(&self.outcomes)
            .last()
            .expect("at least one tick should have run")
    }

    fn block_at_dest(&self) -> BlockState {
        lock(&self.sim).world.block_at(DEST)
    }

    fn run_to_completion(&self) -> MovementStatus {
        let mut sim = lock(&self.sim);
        let mut movement = lock(&self.movement);
        sim.execute(&mut movement, &self.settings, 200).status
    }

    fn tick_again(&self) -> Result<TickOutcome, MovementError> {
        let sim = lock(&self.sim);
        let reach = aims_anywhere();
        let env = TickEnv::new(&sim.world, &sim.agent, &sim.inventory, &self.settings, &reach);
        lock(&self.movement).try_update(&env)
    }
}

#[test]
fn obstructed_traverse_prepares_before_running() {
    let fixture = ExecutionFixture::bootstrap();
    run_serial(&rspec::given(
        "a traverse into a cell filled with stone",
        fixture,
        |scenario: &mut Scenario<ExecutionFixture>| {
            scenario.before_each(|state| state.reset());

            scenario.when("the stone can be aimed at", |ctx| {
                ctx.before_each(|state| state.tick(&aims_anywhere()));

                ctx.then("the movement stays in Prepping", |state| {
                    assert_eq!(state.last().status, MovementStatus::Prepping);
                });

                ctx.then("it strikes the stone with the best tool", |state| {
                    let intent = state.last().intent;
                    assert_eq!(intent.break_target, Some(DEST));
                    assert_eq!(
                        intent.item,
                        Some(ItemRequest::BestToolFor(BlockState::of(Material::Stone)))
                    );
                });
            });

            scenario.when("no aim can be found but the stone is within reach", |ctx| {
                ctx.before_each(|state| state.tick(&aims_nowhere()));

                ctx.then("it still swings at the stone", |state| {
                    assert_eq!(state.last().status, MovementStatus::Prepping);
                    assert_eq!(state.last().intent.break_target, Some(DEST));
                });
            });

            scenario.when("no aim can be found and the stone is out of reach", |ctx| {
                ctx.before_each(|state| {
                    let short_reach = Settings {
                        block_reach_distance: 1.0,
                        ..Settings::default()
                    };
                    state.tick_with(&aims_nowhere(), &short_reach);
                });

                ctx.then("the movement gives up as unreachable", |state| {
                    assert_eq!(state.last().status, MovementStatus::Unreachable);
                    assert!(state.last().intent.is_idle());
                });
            });

            scenario.when("the stone has been broken", |ctx| {
                ctx.before_each(|state| {
                    for _ in 0..3 {
                        state.tick(&aims_anywhere());
                    }
                });

                ctx.then("the destination is clear", |state| {
                    assert!(state.block_at_dest().is_air());
                });

                ctx.then("it waits one tick and then runs", |state| {
                    assert_eq!(
                        state.statuses(),
                        vec![
                            MovementStatus::Prepping,
                            MovementStatus::Waiting,
                            MovementStatus::Running,
                        ]
                    );
                });
            });

            scenario.when("the movement is driven to the end", |ctx| {
                ctx.before_each(|state| {
                    state.tick(&aims_anywhere());
                });

                ctx.then("it succeeds after prepping and running", |state| {
                    assert_eq!(state.run_to_completion(), MovementStatus::Success);
                    let statuses = state.statuses();
                    assert!(!statuses.contains(&MovementStatus::Success));
                    assert_eq!(statuses.first(), Some(&MovementStatus::Prepping));
                });

                ctx.then("ticking a finished movement is refused", |state| {
                    assert_eq!(state.run_to_completion(), MovementStatus::Success);
                    assert!(matches!(
                        state.tick_again(),
                        Err(MovementError::AlreadyComplete { .. })
                    ));
                });
            });
        },
    ));
}
