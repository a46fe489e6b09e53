//! Look rotations, ray casting and reachability.
//!
//! Yaw is measured in degrees with zero facing `+z` and positive values
//! turning towards `-x`. Pitch is positive when looking down.

use glam::DVec3;

use crate::agent::{AgentState, BlockHit};
use crate::cell::{CellPos, Face};
use crate::numeric::{expect_f32, wrap_degrees};
use crate::world::WorldView;

/// Largest yaw or pitch difference still treated as the same rotation.
const CLOSE_ENOUGH_DEGREES: f32 = 0.01;
/// How far aim points sit inside a face to avoid grazing edges.
const FACE_INSET: f64 = 0.45;
/// How far a placement aim point sits inside the supporting block.
const PLACE_INSET: f64 = 0.05;

/// A look direction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    /// Horizontal angle in degrees.
    pub yaw: f32,
    /// Vertical angle in degrees, positive downwards.
    pub pitch: f32,
}

impl Rotation {
    /// Creates a rotation.
    #[must_use]
    pub const fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// The rotation that looks from `from` towards `to`.
    #[must_use]
    pub fn towards(from: DVec3, to: DVec3) -> Self {
        let delta = to - from;
        let horizontal = delta.x.hypot(delta.z);
        let yaw = delta.z.atan2(delta.x).to_degrees() - 90.0;
        let pitch = -delta.y.atan2(horizontal).to_degrees();
        Self {
            yaw: wrap_degrees(expect_f32(yaw)),
            pitch: expect_f32(pitch).clamp(-90.0, 90.0),
        }
    }

    /// Returns a copy with a different pitch.
    #[must_use]
    pub const fn with_pitch(self, pitch: f32) -> Self {
        Self {
            yaw: self.yaw,
            pitch,
        }
    }

    /// Unit vector the rotation looks along.
    #[must_use]
    pub fn look_vector(self) -> DVec3 {
        let (yaw_sin, yaw_cos) = f64::from(self.yaw).to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = f64::from(self.pitch).to_radians().sin_cos();
        DVec3::new(-yaw_sin * pitch_cos, -pitch_sin, yaw_cos * pitch_cos)
    }

    /// Whether two rotations are indistinguishable for aiming purposes.
    #[must_use]
    pub fn is_really_close_to(self, other: Self) -> bool {
        wrap_degrees(self.yaw - other.yaw).abs() < CLOSE_ENOUGH_DEGREES
            && (self.pitch - other.pitch).abs() < CLOSE_ENOUGH_DEGREES
    }

    /// Absolute yaw difference after wrapping.
    #[must_use]
    pub fn yaw_difference(self, other: Self) -> f32 {
        wrap_degrees(self.yaw - other.yaw).abs()
    }
}

/// Casts a ray through the grid and returns the first targetable block.
///
/// Liquids and air are skipped. The returned face is the one the ray entered
/// through; a ray starting inside a block reports the face opposite its
/// direction of travel.
#[must_use]
pub fn raycast(
    world: &dyn WorldView,
    origin: DVec3,
    direction: DVec3,
    max_distance: f64,
) -> Option<BlockHit> {
    let dir = direction.try_normalize()?;
    let mut cell = CellPos::containing(origin);
    let step = [axis_step(dir.x), axis_step(dir.y), axis_step(dir.z)];
    let mut t_max = [
        boundary_distance(origin.x, dir.x, cell.x),
        boundary_distance(origin.y, dir.y, cell.y),
        boundary_distance(origin.z, dir.z, cell.z),
    ];
    let t_delta = [
        inverse_abs(dir.x),
        inverse_abs(dir.y),
        inverse_abs(dir.z),
    ];
    let mut entered = dominant_entry_face(dir);

    loop {
        if world.block_at(cell).is_targetable() {
            return Some(BlockHit { cell, face: entered });
        }
        let [tx, ty, tz] = t_max;
        let [sx, sy, sz] = step;
        let [dx, dy, dz] = t_delta;
        if tx <= ty && tx <= tz {
            if tx > max_distance {
                return None;
            }
            cell = cell.offset(sx, 0, 0);
            t_max = [tx + dx, ty, tz];
            entered = if sx > 0 { Face::West } else { Face::East };
        } else if ty <= tz {
            if ty > max_distance {
                return None;
            }
            cell = cell.offset(0, sy, 0);
            t_max = [tx, ty + dy, tz];
            entered = if sy > 0 { Face::Down } else { Face::Up };
        } else {
            if tz > max_distance {
                return None;
            }
            cell = cell.offset(0, 0, sz);
            t_max = [tx, ty, tz + dz];
            entered = if sz > 0 { Face::North } else { Face::South };
        }
    }
}

fn axis_step(component: f64) -> i32 {
    if component > 0.0 {
        1
    } else if component < 0.0 {
        -1
    } else {
        0
    }
}

fn boundary_distance(origin: f64, component: f64, cell: i32) -> f64 {
    if component > 0.0 {
        (f64::from(cell) + 1.0 - origin) / component
    } else if component < 0.0 {
        (origin - f64::from(cell)) / -component
    } else {
        f64::INFINITY
    }
}

fn inverse_abs(component: f64) -> f64 {
    if component == 0.0 {
        f64::INFINITY
    } else {
        1.0 / component.abs()
    }
}

fn dominant_entry_face(dir: DVec3) -> Face {
    let abs = dir.abs();
    if abs.y >= abs.x && abs.y >= abs.z {
        if dir.y > 0.0 {
            Face::Down
        } else {
            Face::Up
        }
    } else if abs.x >= abs.z {
        if dir.x > 0.0 {
            Face::West
        } else {
            Face::East
        }
    } else if dir.z > 0.0 {
        Face::North
    } else {
        Face::South
    }
}

/// Decides whether, and how, the agent can aim at a block.
///
/// Used by the prepping phase to strike obstructions and by placement to
/// find a supporting face.
pub trait ReachSolver: Send + Sync {
    /// A rotation from which the agent's look ray strikes `target`.
    fn reachable(&self, agent: &AgentState, world: &dyn WorldView, target: CellPos)
        -> Option<Rotation>;

    /// A rotation from which the look ray strikes the face of `against`
    /// that borders `place_at`.
    fn place_rotation(
        &self,
        agent: &AgentState,
        world: &dyn WorldView,
        against: CellPos,
        place_at: CellPos,
    ) -> Option<Rotation>;
}

/// A [`ReachSolver`] that verifies candidate aim points by ray casting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastReach {
    reach: f64,
}

impl RaycastReach {
    /// A solver limited to `reach` blocks from the eyes.
    #[must_use]
    pub const fn new(reach: f64) -> Self {
        Self { reach }
    }

    /// The reach distance.
    #[must_use]
    pub const fn reach(&self) -> f64 {
        self.reach
    }

    fn strikes(&self, world: &dyn WorldView, eye: DVec3, point: DVec3) -> Option<(Rotation, BlockHit)> {
        if eye.distance(point) > self.reach {
            return None;
        }
        let rotation = Rotation::towards(eye, point);
        raycast(world, eye, rotation.look_vector(), self.reach).map(|hit| (rotation, hit))
    }
}

impl Default for RaycastReach {
    fn default() -> Self {
        Self::new(4.5)
    }
}

impl ReachSolver for RaycastReach {
    fn reachable(
        &self,
        agent: &AgentState,
        world: &dyn WorldView,
        target: CellPos,
    ) -> Option<Rotation> {
        if agent.is_looking_at(target) {
            return Some(agent.rotation);
        }
        let eye = agent.eye_position();
        let center = target.center();
        std::iter::once(center)
            .chain(Face::ALL.iter().map(|face| center + face.normal() * FACE_INSET))
            .find_map(|point| {
                self.strikes(world, eye, point)
                    .filter(|(_, hit)| hit.cell == target)
                    .map(|(rotation, _)| rotation)
            })
    }

    fn place_rotation(
        &self,
        agent: &AgentState,
        world: &dyn WorldView,
        against: CellPos,
        place_at: CellPos,
    ) -> Option<Rotation> {
        let eye = agent.eye_position();
        let face_center = (against.center() + place_at.center()) * 0.5;
        let point = face_center + (against.center() - place_at.center()) * PLACE_INSET;
        self.strikes(world, eye, point)
            .filter(|(_, hit)| hit.cell == against && hit.placement_cell() == place_at)
            .map(|(rotation, _)| rotation)
    }
}
