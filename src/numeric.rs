//! Numeric conversion helpers used across the crate.
//!
//! These utilities guard conversions between floating-point and integer
//! domains. They rely on debug assertions to flag unexpected overflows while
//! keeping the call-sites ergonomic.

/// Convert a finite `f64` into `f32`, asserting that it fits the target type.
#[expect(
    clippy::cast_possible_truncation,
    reason = "Callers assert that the value fits within f32 bounds."
)]
#[must_use]
pub fn expect_f32(value: f64) -> f32 {
    debug_assert!(value.is_finite(), "expected finite f64 for f32 conversion");
    debug_assert!(
        value <= f64::from(f32::MAX),
        "f64 value {value} exceeds f32::MAX"
    );
    debug_assert!(
        value >= f64::from(f32::MIN),
        "f64 value {value} is below f32::MIN"
    );
    value as f32
}

/// Floor a coordinate and clamp it into the `i32` domain.
#[expect(
    clippy::cast_possible_truncation,
    reason = "The value is clamped to the i32 bounds before casting."
)]
#[must_use]
pub fn floor_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let floored = value.floor();
    let clamped = floored.clamp(f64::from(i32::MIN), f64::from(i32::MAX));
    clamped as i32
}

/// Wrap an angle in degrees into `[-180, 180)`.
#[must_use]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped.is_nan() {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::positive(3.7, 3)]
    #[case::negative(-0.2, -1)]
    #[case::exact(-2.0, -2)]
    #[case::huge(1e12, i32::MAX)]
    #[case::nan(f64::NAN, 0)]
    fn floors_into_i32(#[case] value: f64, #[case] expected: i32) {
        assert_eq!(floor_to_i32(value), expected);
    }

    #[rstest]
    #[case(190.0, -170.0)]
    #[case(-190.0, 170.0)]
    #[case(45.0, 45.0)]
    #[case(540.0, -180.0)]
    fn wraps_degrees(#[case] angle: f32, #[case] expected: f32) {
        approx::assert_relative_eq!(wrap_degrees(angle), expected, epsilon = 1e-4);
    }
}
