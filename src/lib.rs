#![cfg_attr(docsrs, feature(doc_cfg))]
//! Movement layer for goal-directed navigation through a voxel world.
//!
//! The crate answers two questions for a path planner. During planning,
//! [`enumerate_movements`] lists every primitive movement out of a cell with
//! its cost in ticks, evaluated against a frozen [`CalculationContext`].
//! During execution, each chosen [`Movement`] is ticked with a [`TickEnv`]
//! and replies with the [`ControlIntent`] the host should apply next.
pub mod agent;
pub mod block;
pub mod cell;
pub mod classifier;
pub mod constants;
pub mod context;
pub mod cost;
pub mod input;
pub mod inventory;
pub mod logging;
pub mod movement;
pub mod numeric;
pub mod physics;
pub mod rotation;
pub mod settings;
pub mod world;

// Re-export commonly used items
pub use agent::{AgentState, BlockHit};
pub use block::{BlockState, Material, MaterialSet};
pub use cell::{CellPos, Direction, Face};
pub use classifier::ClassifierPolicy;
pub use context::{CalculationContext, ContextMode};
pub use cost::Cost;
pub use input::{ControlIntent, Input, InputSet, ItemRequest, MovementTarget};
pub use inventory::{AgentInventory, Tool, ToolKind, ToolSet, ToolTier};
pub use logging::init as init_logging;
pub use movement::{
    enumerate_movements, Candidate, Movement, MovementError, MovementKind, MovementStatus, Moves,
    TickEnv, TickOutcome,
};
pub use rotation::{RaycastReach, ReachSolver, Rotation};
pub use settings::{Settings, SettingsError};
pub use world::{WorldBorder, WorldSnapshot, WorldView};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use tread::prelude::*;
    //! ```

    pub use crate::enumerate_movements;
    pub use crate::AgentInventory;
    pub use crate::CalculationContext;
    pub use crate::CellPos;
    pub use crate::Cost;
    pub use crate::Movement;
    pub use crate::MovementStatus;
    pub use crate::Settings;
    pub use crate::TickEnv;
    pub use crate::WorldSnapshot;
    pub use ordered_float::OrderedFloat;
}
