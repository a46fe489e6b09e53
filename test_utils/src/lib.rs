//! Utility helpers for tests.
//!
//! [`world`] builds small voxel scenes; [`sim`] plays a movement's control
//! intents back against one of them with a simplified physics model so
//! execution can be checked end to end.

pub mod sim;
pub mod world;

pub use sim::{AgentSim, Execution};
pub use world::{flat_world, WorldBuilder};
