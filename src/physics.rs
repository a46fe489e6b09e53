//! Physics helper functions.
//!
//! Models the agent's per-tick motion closely enough to derive fall and jump
//! timings for the cost tables. The helpers operate on plain numbers so they
//! can be reused by the cost model and by tick simulators in tests.

use glam::DVec3;

use crate::constants::{
    AIR_ACCELERATION, AIR_DRAG, GRAVITY, GROUND_ACCELERATION, SNEAK_INPUT_FACTOR,
    SPRINT_ACCELERATION_FACTOR, TERMINAL_FALL_SPEED, VERTICAL_DRAG,
};

/// Safety limit on the tick search in [`distance_to_ticks`].
const MAX_FALL_TICKS: u32 = 10_000;

/// Downward speed after falling freely for `ticks` ticks from rest.
///
/// # Examples
///
/// ```
/// use tread::physics::fall_velocity;
/// assert_eq!(fall_velocity(0), 0.0);
/// assert!((fall_velocity(1) - 0.0784).abs() < 1e-9);
/// ```
#[must_use]
pub fn fall_velocity(ticks: u32) -> f64 {
    let exponent = i32::try_from(ticks).unwrap_or(i32::MAX);
    (VERTICAL_DRAG.powi(exponent) - 1.0) * -TERMINAL_FALL_SPEED
}

/// Fractional number of ticks needed to fall `distance` blocks from rest.
///
/// Whole ticks are counted while the accumulated drop stays short of the
/// distance; the final partial tick is interpolated from the speed reached in
/// that tick.
#[must_use]
pub fn distance_to_ticks(distance: f64) -> f64 {
    if distance <= 0.0 {
        return 0.0;
    }
    let mut remaining = distance;
    let mut ticks = 0_u32;
    while ticks < MAX_FALL_TICKS {
        let speed = fall_velocity(ticks);
        if remaining <= speed {
            return f64::from(ticks) + remaining / speed;
        }
        remaining -= speed;
        ticks += 1;
    }
    f64::from(ticks)
}

/// Applies one tick of gravity and drag to a vertical velocity.
#[must_use]
pub fn apply_gravity(vertical: f64) -> f64 {
    (vertical - GRAVITY) * VERTICAL_DRAG
}

/// Horizontal acceleration for one tick of input.
///
/// `forward` and `strafe` are the raw input axes in `[-1, 1]`. `yaw` follows
/// the convention that zero faces `+z` and positive angles turn towards `-x`.
#[must_use]
pub fn input_acceleration(
    forward: f64,
    strafe: f64,
    yaw_degrees: f64,
    movement: MovementMode,
) -> DVec3 {
    let factor = if movement.sneaking {
        SNEAK_INPUT_FACTOR
    } else {
        1.0
    };
    let mut wish = DVec3::new(strafe * factor, 0.0, forward * factor);
    if wish.length_squared() > 1.0 {
        wish = wish.normalize();
    }
    let mut accel = if movement.on_ground {
        GROUND_ACCELERATION
    } else {
        AIR_ACCELERATION
    };
    if movement.sprinting && forward > 0.0 && !movement.sneaking {
        accel *= SPRINT_ACCELERATION_FACTOR;
    }
    let (sin, cos) = yaw_degrees.to_radians().sin_cos();
    let forward_axis = DVec3::new(-sin, 0.0, cos);
    let left_axis = DVec3::new(cos, 0.0, sin);
    (forward_axis * wish.z + left_axis * wish.x) * accel
}

/// Fraction of horizontal velocity kept after a tick.
///
/// `slipperiness` is the value of the block under the agent and only matters
/// while grounded.
#[must_use]
pub fn horizontal_retention(on_ground: bool, slipperiness: f64) -> f64 {
    if on_ground {
        slipperiness * AIR_DRAG
    } else {
        AIR_DRAG
    }
}

/// Locomotion flags affecting acceleration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementMode {
    /// Whether the agent stood on a block at the start of the tick.
    pub on_ground: bool,
    /// Whether the sprint input is held.
    pub sprinting: bool,
    /// Whether the sneak input is held.
    pub sneaking: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn one_block_takes_between_five_and_six_ticks() {
        let ticks = distance_to_ticks(1.0);
        assert!(ticks > 5.0 && ticks < 6.0, "got {ticks}");
    }

    #[rstest]
    #[case(0.5, 1.0)]
    #[case(1.0, 2.0)]
    #[case(3.0, 10.0)]
    fn longer_falls_take_longer(#[case] short: f64, #[case] long: f64) {
        assert!(distance_to_ticks(short) < distance_to_ticks(long));
    }

    #[test]
    fn gravity_pulls_a_resting_body_down() {
        assert_relative_eq!(apply_gravity(0.0), -0.0784);
    }

    #[test]
    fn ground_acceleration_follows_yaw() {
        let mode = MovementMode {
            on_ground: true,
            ..MovementMode::default()
        };
        let accel = input_acceleration(1.0, 0.0, -90.0, mode);
        assert_relative_eq!(accel.x, GROUND_ACCELERATION, epsilon = 1e-12);
        assert_relative_eq!(accel.z, 0.0, epsilon = 1e-12);
    }
}
