//! Compile-time guarantees about what may cross thread boundaries.

use static_assertions::assert_impl_all;
use tread::{
    CalculationContext, Candidate, Cost, Movement, MovementError, RaycastReach, Settings,
    WorldSnapshot,
};

assert_impl_all!(CalculationContext<'static>: Send, Sync);
assert_impl_all!(WorldSnapshot: Send, Sync, Clone);
assert_impl_all!(Settings: Send, Sync, Clone);
assert_impl_all!(Movement: Send, Clone);
assert_impl_all!(Candidate: Send);
assert_impl_all!(RaycastReach: Send, Sync);
assert_impl_all!(MovementError: std::error::Error, Send, Sync);
assert_impl_all!(Cost: Copy, Ord, Send, Sync);

#[test]
fn a_threaded_context_plans_on_another_thread() {
    let mut world = WorldSnapshot::new();
    world.set(tread::CellPos::new(0, 9, 0), tread::Material::Stone);
    world.set(tread::CellPos::new(1, 9, 0), tread::Material::Stone);
    let ctx = CalculationContext::new_threaded(&world, &Default::default(), &Settings::default());
    world.clear(tread::CellPos::new(1, 9, 0));

    let count = std::thread::spawn(move || {
        tread::enumerate_movements(&ctx, tread::CellPos::new(0, 10, 0)).len()
    })
    .join()
    .expect("planning thread should not panic");
    assert_eq!(count, 1, "the snapshot still holds the removed floor");
}
