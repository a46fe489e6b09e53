//! Tick costs and physical constants shared by the cost functions.
//!
//! Every cost is expressed in game ticks (20 per second). Speeds are the
//! agent's blocks-per-second figures for each locomotion mode.

/// Ticks to walk one block on flat ground.
pub const WALK_ONE_BLOCK_COST: f64 = 20.0 / 4.317;
/// Ticks to wade one block through water.
pub const WALK_ONE_IN_WATER_COST: f64 = 20.0 / 2.2;
/// Ticks to walk one block across soul sand.
pub const WALK_ONE_OVER_SOUL_SAND_COST: f64 = WALK_ONE_BLOCK_COST * 2.0;
/// Ticks to climb one rung of a ladder or vine.
pub const LADDER_UP_ONE_COST: f64 = 20.0 / 2.35;
/// Ticks to descend one rung of a ladder or vine.
pub const LADDER_DOWN_ONE_COST: f64 = 20.0 / 3.0;
/// Ticks to sneak one block.
pub const SNEAK_ONE_BLOCK_COST: f64 = 20.0 / 1.3;
/// Ticks to sprint one block.
pub const SPRINT_ONE_BLOCK_COST: f64 = 20.0 / 5.612;
/// Factor applied to a walking cost when the agent may sprint.
pub const SPRINT_MULTIPLIER: f64 = SPRINT_ONE_BLOCK_COST / WALK_ONE_BLOCK_COST;
/// Ticks to walk off the edge of a block before gravity takes over.
pub const WALK_OFF_BLOCK_COST: f64 = WALK_ONE_BLOCK_COST * 0.8;
/// Ticks spent re-centring on the landing cell after a short fall.
pub const CENTER_AFTER_FALL_COST: f64 = WALK_ONE_BLOCK_COST - WALK_OFF_BLOCK_COST;

/// Vertical acceleration applied every tick while airborne.
pub const GRAVITY: f64 = 0.08;
/// Fraction of vertical velocity retained each tick.
pub const VERTICAL_DRAG: f64 = 0.98;
/// Terminal falling speed implied by [`GRAVITY`] and [`VERTICAL_DRAG`].
pub const TERMINAL_FALL_SPEED: f64 = 3.92;
/// Upward velocity granted by a jump.
pub const JUMP_VELOCITY: f64 = 0.42;
/// Fraction of horizontal velocity retained each tick while airborne.
pub const AIR_DRAG: f64 = 0.91;
/// Default block slipperiness.
pub const DEFAULT_SLIPPERINESS: f64 = 0.6;
/// Horizontal acceleration per tick while grounded and walking.
pub const GROUND_ACCELERATION: f64 = 0.1;
/// Horizontal acceleration per tick while airborne.
pub const AIR_ACCELERATION: f64 = 0.02;
/// Acceleration multiplier while sprinting.
pub const SPRINT_ACCELERATION_FACTOR: f64 = 1.3;
/// Movement input multiplier while sneaking.
pub const SNEAK_INPUT_FACTOR: f64 = 0.3;

/// Height of the agent's eyes above its feet.
pub const EYE_HEIGHT: f64 = 1.62;
/// Eye height while sneaking.
pub const SNEAK_EYE_HEIGHT: f64 = 1.54;
/// Half the width of the agent's bounding box.
pub const AGENT_HALF_WIDTH: f64 = 0.3;
/// Height of the agent's bounding box.
pub const AGENT_HEIGHT: f64 = 1.8;
/// Added to the feet height before flooring so the agent standing on a
/// partial block still resolves to the cell above it.
pub const FEET_EPSILON: f64 = 0.1251;

/// Longest unassisted fall the ladder-reset rule considers safe to catch.
pub const LADDER_CATCH_HEIGHT: u32 = 11;
/// Extra cost added to a pillar when nothing supports the block below.
pub const PILLAR_UNSUPPORTED_PENALTY: f64 = 0.1;
/// Mining multiplier applied when breaking from a ladder.
pub const LADDER_MINING_MULTIPLIER: f64 = 5.0;
/// Cost factor for a diagonal that must edge around a blocked elbow.
pub const DIAGONAL_EDGING_FACTOR: f64 = std::f64::consts::SQRT_2 - 0.001;
