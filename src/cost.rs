//! Movement costs measured in ticks.
//!
//! A [`Cost`] is either a finite, non-negative tick count or
//! [`Cost::Infeasible`]. Infeasibility is contagious: adding anything to an
//! infeasible cost stays infeasible, so cost functions can accumulate terms
//! and bail out once at the end.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

use once_cell::sync::Lazy;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::physics::distance_to_ticks;

/// Number of precomputed entries in the fall table.
const FALL_TABLE_LEN: usize = 257;

/// Fall durations for whole-block drops, indexed by height.
static FALL_N_BLOCKS_COST: Lazy<[f64; FALL_TABLE_LEN]> = Lazy::new(|| {
    let mut table = [0.0; FALL_TABLE_LEN];
    for (height, slot) in (0_u32..).zip(table.iter_mut()) {
        *slot = distance_to_ticks(f64::from(height));
    }
    table
});

/// Fall time of 1.25 blocks minus 0.25 blocks: the airtime of a jump onto a
/// block one cell higher.
static JUMP_ONE_BLOCK_COST: Lazy<f64> =
    Lazy::new(|| distance_to_ticks(1.25) - distance_to_ticks(0.25));

/// Ticks needed to fall `height` whole blocks.
#[must_use]
pub fn fall_n_blocks_cost(height: u32) -> f64 {
    usize::try_from(height)
        .ok()
        .and_then(|index| FALL_N_BLOCKS_COST.get(index).copied())
        .unwrap_or_else(|| distance_to_ticks(f64::from(height)))
}

/// Ticks of airtime spent jumping up one block.
#[must_use]
pub fn jump_one_block_cost() -> f64 {
    *JUMP_ONE_BLOCK_COST
}

/// Estimated ticks for a movement, or infeasible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Cost {
    /// A finite tick count.
    Finite(OrderedFloat<f64>),
    /// The movement cannot be performed.
    Infeasible,
}

impl Cost {
    /// Zero ticks.
    pub const ZERO: Self = Self::Finite(OrderedFloat(0.0));

    /// Wraps a tick count, mapping non-finite or negative values to
    /// [`Cost::Infeasible`].
    #[must_use]
    pub fn finite(ticks: f64) -> Self {
        if ticks.is_finite() && ticks >= 0.0 {
            Self::Finite(OrderedFloat(ticks))
        } else {
            Self::Infeasible
        }
    }

    /// The tick count, or `None` when infeasible.
    #[must_use]
    pub const fn ticks(self) -> Option<f64> {
        match self {
            Self::Finite(OrderedFloat(ticks)) => Some(ticks),
            Self::Infeasible => None,
        }
    }

    /// Whether the movement can be performed at all.
    #[must_use]
    pub const fn is_feasible(self) -> bool {
        matches!(self, Self::Finite(_))
    }

    /// Whether the cost is exactly zero ticks.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl Default for Cost {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for Cost {
    fn from(ticks: f64) -> Self {
        Self::finite(ticks)
    }
}

impl Add for Cost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Finite(a), Self::Finite(b)) => Self::finite(a.0 + b.0),
            _ => Self::Infeasible,
        }
    }
}

impl Add<f64> for Cost {
    type Output = Self;

    fn add(self, rhs: f64) -> Self {
        self + Self::finite(rhs)
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<f64> for Cost {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        match self {
            Self::Finite(a) => Self::finite(a.0 * rhs),
            Self::Infeasible => Self::Infeasible,
        }
    }
}

impl Sum for Cost {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(ticks) => write!(f, "{:.3} ticks", ticks.0),
            Self::Infeasible => f.write_str("infeasible"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CENTER_AFTER_FALL_COST, WALK_ONE_BLOCK_COST, WALK_OFF_BLOCK_COST};
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::both_finite(Cost::finite(1.5), Cost::finite(2.0), Cost::finite(3.5))]
    #[case::left_infeasible(Cost::Infeasible, Cost::finite(2.0), Cost::Infeasible)]
    #[case::right_infeasible(Cost::finite(1.0), Cost::Infeasible, Cost::Infeasible)]
    fn addition_is_contagious(#[case] a: Cost, #[case] b: Cost, #[case] expected: Cost) {
        assert_eq!(a + b, expected);
    }

    #[rstest]
    #[case::negative(-1.0)]
    #[case::nan(f64::NAN)]
    #[case::infinite(f64::INFINITY)]
    fn invalid_tick_counts_are_infeasible(#[case] ticks: f64) {
        assert_eq!(Cost::finite(ticks), Cost::Infeasible);
    }

    #[test]
    fn feasible_costs_order_before_infeasible() {
        assert!(Cost::finite(1e9) < Cost::Infeasible);
    }

    #[test]
    fn fall_table_grows_with_height() {
        for height in 1..40 {
            assert!(fall_n_blocks_cost(height) > fall_n_blocks_cost(height - 1));
        }
        assert_relative_eq!(fall_n_blocks_cost(0), 0.0);
        assert_relative_eq!(fall_n_blocks_cost(300), distance_to_ticks(300.0));
    }

    #[test]
    fn walk_off_plus_centering_is_one_walk() {
        assert_relative_eq!(WALK_OFF_BLOCK_COST + CENTER_AFTER_FALL_COST, WALK_ONE_BLOCK_COST);
    }

    #[test]
    fn jump_is_cheaper_than_falling_a_block() {
        let jump = jump_one_block_cost();
        assert!(jump > 0.0);
        assert!(jump < fall_n_blocks_cost(1));
    }

    #[test]
    fn summing_costs_accumulates() {
        let total: Cost = [1.0, 2.0, 3.0].into_iter().map(Cost::finite).sum();
        assert_eq!(total.ticks(), Some(6.0));
    }
}
