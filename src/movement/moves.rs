//! The closed catalog of movement kinds and candidate enumeration.
//!
//! Every entry of [`Moves::ALL`] is asked in turn what it can do from a cell.
//! Fixed entries always target the same offset; dynamic ones (descend,
//! diagonal, parkour) let their cost function decide where they end up.

use std::fmt;

use log::trace;
use ordered_float::OrderedFloat;

use crate::cell::{CellPos, Diagonal as DiagonalDir, Direction};
use crate::context::CalculationContext;
use crate::cost::Cost;

use super::{
    ascend, descend, diagonal, downward, fall, parkour, pillar, traverse, Fall, Movement,
    MovementKind,
};

/// Where a catalog entry ends up and at what cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    /// Destination feet cell.
    pub dest: CellPos,
    /// Cost of getting there.
    pub cost: Cost,
    /// Whether the landing needs a water bucket.
    pub uses_bucket: bool,
}

/// Destination offset of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveOffset {
    /// Always `(dx, dy, dz)` from the source.
    Fixed(i32, i32, i32),
    /// Decided by the cost function.
    Dynamic,
}

/// One entry of the movement catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Moves {
    /// Dig through the floor.
    Downward,
    /// Jump and place underneath.
    Pillar,
    /// Walk one block sideways.
    Traverse(Direction),
    /// Step up one block sideways.
    Ascend(Direction),
    /// Step or drop down sideways.
    Descend(Direction),
    /// Walk diagonally.
    Diagonal(DiagonalDir),
    /// Jump a gap.
    Parkour(Direction),
}

impl Moves {
    /// Every catalog entry, in enumeration order.
    pub const ALL: [Self; 22] = [
        Self::Downward,
        Self::Pillar,
        Self::Traverse(Direction::North),
        Self::Traverse(Direction::South),
        Self::Traverse(Direction::East),
        Self::Traverse(Direction::West),
        Self::Ascend(Direction::North),
        Self::Ascend(Direction::South),
        Self::Ascend(Direction::East),
        Self::Ascend(Direction::West),
        Self::Descend(Direction::North),
        Self::Descend(Direction::South),
        Self::Descend(Direction::East),
        Self::Descend(Direction::West),
        Self::Diagonal(DiagonalDir::NorthEast),
        Self::Diagonal(DiagonalDir::NorthWest),
        Self::Diagonal(DiagonalDir::SouthEast),
        Self::Diagonal(DiagonalDir::SouthWest),
        Self::Parkour(Direction::North),
        Self::Parkour(Direction::South),
        Self::Parkour(Direction::East),
        Self::Parkour(Direction::West),
    ];

    /// The destination offset, or [`MoveOffset::Dynamic`].
    #[must_use]
    pub const fn offset(self) -> MoveOffset {
        match self {
            Self::Downward => MoveOffset::Fixed(0, -1, 0),
            Self::Pillar => MoveOffset::Fixed(0, 1, 0),
            Self::Traverse(dir) => {
                let (dx, dz) = dir.delta();
                MoveOffset::Fixed(dx, 0, dz)
            }
            Self::Ascend(dir) => {
                let (dx, dz) = dir.delta();
                MoveOffset::Fixed(dx, 1, dz)
            }
            Self::Descend(_) | Self::Diagonal(_) | Self::Parkour(_) => MoveOffset::Dynamic,
        }
    }

    /// Where the entry leads from `src` and at what cost, or `None` when it
    /// is infeasible there.
    #[must_use]
    pub fn calculate(self, ctx: &CalculationContext<'_>, src: CellPos) -> Option<MoveResult> {
        if let MoveOffset::Fixed(dx, dy, dz) = self.offset() {
            if !in_bounds(ctx, src.offset(dx, dy, dz)) {
                return None;
            }
        }
        let result = self.evaluate(ctx, src);
        match result {
            Some(found) if found.cost.is_feasible() && in_bounds(ctx, found.dest) => Some(found),
            _ => {
                trace!("{self} from {src} is infeasible");
                None
            }
        }
    }

    fn evaluate(self, ctx: &CalculationContext<'_>, src: CellPos) -> Option<MoveResult> {
        let fixed = |dest: CellPos, cost: Cost| MoveResult {
            dest,
            cost,
            uses_bucket: false,
        };
        match self {
            Self::Downward => Some(fixed(src.down(), downward::cost(ctx, src))),
            Self::Pillar => Some(fixed(src.up(), pillar::cost(ctx, src))),
            Self::Traverse(dir) => {
                let dest = src.step(dir);
                Some(fixed(dest, traverse::cost(ctx, src, dest)))
            }
            Self::Ascend(dir) => {
                let dest = src.step(dir).up();
                Some(fixed(dest, ascend::cost(ctx, src, dest)))
            }
            Self::Descend(dir) => {
                let beside = src.step(dir);
                descend::calculate(ctx, src, beside.x, beside.z)
            }
            Self::Diagonal(diag) => {
                let (dx, dz) = diag.delta();
                diagonal::calculate(ctx, src, src.x + dx, src.z + dz)
            }
            Self::Parkour(dir) => parkour::calculate(ctx, src, dir).map(|(result, _, _)| result),
        }
    }

    /// The movement instance this entry produces from `src`, with its cost
    /// already cached, or `None` when infeasible.
    #[must_use]
    pub fn apply(self, ctx: &CalculationContext<'_>, src: CellPos) -> Option<Movement> {
        let result = self.calculate(ctx, src)?;
        let dest = result.dest;
        let mut movement = match self {
            Self::Downward => Movement::downward(src),
            Self::Pillar => Movement::pillar(src),
            Self::Traverse(_) => Movement::traverse(src, dest),
            Self::Ascend(_) => Movement::ascend(src, dest),
            Self::Descend(_) if dest.y == src.y - 1 => Movement::descend(src, dest),
            Self::Descend(_) => Movement::with_kind(
                MovementKind::Fall(Fall::with_bucket(result.uses_bucket)),
                fall::footprint(src, dest),
            ),
            Self::Diagonal(_) => Movement::diagonal(src, dest),
            Self::Parkour(dir) => {
                let distance = (dest.x - src.x).abs() + (dest.z - src.z).abs();
                Movement::parkour(src, dir, distance, dest.y > src.y)
            }
        };
        movement.set_cost(result.cost);
        Some(movement)
    }
}

impl fmt::Display for Moves {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downward => f.write_str("downward"),
            Self::Pillar => f.write_str("pillar"),
            Self::Traverse(dir) => write!(f, "traverse {dir}"),
            Self::Ascend(dir) => write!(f, "ascend {dir}"),
            Self::Descend(dir) => write!(f, "descend {dir}"),
            Self::Diagonal(diag) => write!(f, "diagonal {diag:?}"),
            Self::Parkour(dir) => write!(f, "parkour {dir}"),
        }
    }
}

/// Whether the feet and head of `dest` lie inside the world's height limits,
/// its border and its loaded chunks.
fn in_bounds(ctx: &CalculationContext<'_>, dest: CellPos) -> bool {
    dest.y >= ctx.min_y()
        && dest.y + 1 < ctx.max_y()
        && ctx.within_border(dest.x, dest.z)
        && ctx.is_loaded(dest.x, dest.z)
}

/// A feasible movement and its cost.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The movement, with its cost cached.
    pub movement: Movement,
    /// Cost in ticks.
    pub cost: OrderedFloat<f64>,
}

/// Every feasible movement out of `src`, in catalog order.
#[must_use]
pub fn enumerate_movements(ctx: &CalculationContext<'_>, src: CellPos) -> Vec<Candidate> {
    Moves::ALL
        .iter()
        .filter_map(|entry| entry.apply(ctx, src))
        .filter_map(|movement| {
            let ticks = movement.cached_cost()?.ticks()?;
            Some(Candidate {
                movement,
                cost: OrderedFloat(ticks),
            })
        })
        .collect()
}
