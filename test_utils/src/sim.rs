//! A small tick simulator that plays control intents back against a world.
//!
//! The model follows the agent's ground and air physics closely enough for
//! movements to complete the way they would in game: gravity with drag,
//! input acceleration with friction, and per-axis box collision resolved
//! vertically first. Breaking and placing are instant. There is no step-up
//! assist and no sneak edge protection.

use glam::DVec3;
use tread::constants::{AGENT_HALF_WIDTH, AGENT_HEIGHT, JUMP_VELOCITY};
use tread::physics::{apply_gravity, horizontal_retention, input_acceleration, MovementMode};
use tread::rotation::raycast;
use tread::{
    AgentInventory, AgentState, BlockState, CellPos, ControlIntent, Input, ItemRequest, Material,
    Movement, MovementStatus, RaycastReach, Settings, TickEnv, WorldSnapshot, WorldView,
};

/// Vertical speed change per tick while swimming upwards.
const SWIM_UP: f64 = 0.04;
/// Vertical speed change per tick while sinking.
const SINK: f64 = 0.02;
/// Drag applied to all motion in liquid.
const LIQUID_DRAG: f64 = 0.8;
/// Slack used when comparing box faces.
const TOUCH: f64 = 1e-7;

/// How an executed movement ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    /// Status after the last tick.
    pub status: MovementStatus,
    /// Ticks spent.
    pub ticks: u32,
}

/// An agent moving through a mutable world.
#[derive(Debug, Clone)]
pub struct AgentSim {
    /// The world, edited by breaks and placements.
    pub world: WorldSnapshot,
    /// The simulated agent.
    pub agent: AgentState,
    /// What the agent carries.
    pub inventory: AgentInventory,
    reach: RaycastReach,
    held: Option<ItemRequest>,
}

#[derive(Debug, Clone, Copy)]
struct Aabb {
    min: [f64; 3],
    max: [f64; 3],
}

impl Aabb {
    fn agent_at(position: DVec3) -> Self {
        Self {
            min: [position.x - AGENT_HALF_WIDTH, position.y, position.z - AGENT_HALF_WIDTH],
            max: [
                position.x + AGENT_HALF_WIDTH,
                position.y + AGENT_HEIGHT,
                position.z + AGENT_HALF_WIDTH,
            ],
        }
    }

    fn cell(pos: CellPos, height: f64) -> Self {
        let (x, y, z) = (f64::from(pos.x), f64::from(pos.y), f64::from(pos.z));
        Self {
            min: [x, y, z],
            max: [x + 1.0, y + height, z + 1.0],
        }
    }

    fn shifted(mut self, axis: usize, delta: f64) -> Self {
        self.min[axis] += delta;
        self.max[axis] += delta;
        self
    }

    fn overlaps_on(&self, other: &Self, axis: usize) -> bool {
        self.min[axis] < other.max[axis] - TOUCH && self.max[axis] > other.min[axis] + TOUCH
    }

    fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|axis| self.overlaps_on(other, axis))
    }

    /// Shortens `delta` along `axis` so this box stops at `other`.
    fn clip(&self, other: &Self, axis: usize, delta: f64) -> f64 {
        let others_overlap = (0..3)
            .filter(|a| *a != axis)
            .all(|a| self.overlaps_on(other, a));
        if !others_overlap {
            return delta;
        }
        if delta > 0.0 && other.min[axis] >= self.max[axis] - TOUCH {
            delta.min(other.min[axis] - self.max[axis])
        } else if delta < 0.0 && other.max[axis] <= self.min[axis] + TOUCH {
            delta.max(other.max[axis] - self.min[axis])
        } else {
            delta
        }
    }
}

impl AgentSim {
    /// An agent standing at rest on `feet` with an empty inventory.
    pub fn new(world: WorldSnapshot, feet: CellPos) -> Self {
        let mut agent = AgentState::standing_at(feet);
        agent.velocity.y = apply_gravity(0.0);
        let mut sim = Self {
            world,
            agent,
            inventory: AgentInventory::default(),
            reach: RaycastReach::default(),
            held: None,
        };
        sim.refresh_crosshair();
        sim
    }

    /// Replaces the inventory.
    pub fn with_inventory(mut self, inventory: AgentInventory) -> Self {
        self.inventory = inventory;
        self
    }

    /// The item last requested by a movement.
    pub const fn held(&self) -> Option<ItemRequest> {
        self.held
    }

    /// Ticks `movement` until it completes or `max_ticks` pass.
    pub fn execute(&mut self, movement: &mut Movement, settings: &Settings, max_ticks: u32) -> Execution {
        for tick in 1..=max_ticks {
            let outcome = {
                let env = TickEnv::new(&self.world, &self.agent, &self.inventory, settings, &self.reach);
                movement.update(&env)
            };
            if outcome.status.is_complete() {
                return Execution {
                    status: outcome.status,
                    ticks: tick,
                };
            }
            self.step(&outcome.intent);
        }
        Execution {
            status: movement.status(),
            ticks: max_ticks,
        }
    }

    /// Applies one tick of `intent`: look, click, then move.
    pub fn step(&mut self, intent: &ControlIntent) {
        if let Some(target) = intent.target {
            self.agent.rotation = target.rotation;
        }
        self.agent.sneaking = intent.holds(Input::Sneak);
        if intent.item.is_some() {
            self.held = intent.item;
        }
        if let Some(cell) = intent.break_target {
            self.break_block(cell);
        }
        if let Some(cell) = intent.place_target {
            self.use_on(cell);
        }
        self.advance(intent);
        self.refresh_crosshair();
    }

    fn break_block(&mut self, cell: CellPos) {
        let block = self.world.block_at(cell);
        if !block.is_air() && !block.is_liquid() && block.hardness() >= 0.0 {
            self.world.clear(cell);
        }
    }

    fn use_on(&mut self, cell: CellPos) {
        let block = self.world.block_at(cell);
        if block.is_openable() {
            self.world.set(cell, block.with_open(!block.props.open));
            return;
        }
        match self.held {
            Some(ItemRequest::WaterBucket) if self.inventory.water_bucket && !block.is_liquid() => {
                self.world.set(cell, BlockState::water(0));
                self.inventory.water_bucket = false;
                self.inventory.empty_bucket = true;
            }
            Some(ItemRequest::EmptyBucket) if self.inventory.empty_bucket && block.is_water() && block.is_source() => {
                self.world.clear(cell);
                self.inventory.empty_bucket = false;
                self.inventory.water_bucket = true;
            }
            Some(ItemRequest::Throwaway) if self.inventory.has_throwaway() => {
                let fits = block.is_air() || block.material.is_replaceable();
                let occupied = Aabb::agent_at(self.agent.position).intersects(&Aabb::cell(cell, 1.0));
                if fits && !occupied {
                    self.world.set(cell, Material::Cobblestone);
                    self.inventory.throwaway_blocks -= 1;
                }
            }
            _ => {}
        }
    }

    fn advance(&mut self, intent: &ControlIntent) {
        let agent = self.agent;
        let in_liquid = self.world.block_at(agent.feet()).is_liquid();
        let forward = axis(intent.holds(Input::MoveForward), intent.holds(Input::MoveBack));
        let strafe = axis(intent.holds(Input::MoveLeft), intent.holds(Input::MoveRight));
        let mode = MovementMode {
            on_ground: agent.on_ground,
            sprinting: intent.holds(Input::Sprint),
            sneaking: agent.sneaking,
        };
        let mut velocity =
            agent.velocity + input_acceleration(forward, strafe, f64::from(agent.rotation.yaw), mode);
        if intent.holds(Input::Jump) {
            if in_liquid {
                velocity.y += SWIM_UP;
            } else if agent.on_ground {
                velocity.y = JUMP_VELOCITY;
            }
        }

        let (moved, blocked) = self.collide(velocity);
        let on_ground = blocked[1] && velocity.y < 0.0;
        let position = agent.position + moved;
        if blocked[0] {
            velocity.x = 0.0;
        }
        if blocked[1] {
            velocity.y = 0.0;
        }
        if blocked[2] {
            velocity.z = 0.0;
        }

        if in_liquid {
            velocity *= LIQUID_DRAG;
            velocity.y -= SINK;
        } else {
            let below = self
                .world
                .block_at(CellPos::containing(position - DVec3::new(0.0, 0.5, 0.0)));
            let retention = horizontal_retention(on_ground, below.slipperiness());
            velocity.x *= retention;
            velocity.z *= retention;
            velocity.y = apply_gravity(velocity.y);
        }

        self.agent.position = position;
        self.agent.velocity = velocity;
        self.agent.on_ground = on_ground;
        self.agent.collided_horizontally = blocked[0] || blocked[2];
    }

    /// Motion actually made along each axis and which axes were blocked.
    fn collide(&self, motion: DVec3) -> (DVec3, [bool; 3]) {
        let start = Aabb::agent_at(self.agent.position);
        let colliders = self.colliders(&start, motion);
        let wanted = motion.to_array();
        let mut made = [0.0; 3];
        let mut blocked = [false; 3];
        let mut bbox = start;
        for axis in [1, 0, 2] {
            let delta = colliders
                .iter()
                .fold(wanted[axis], |delta, other| bbox.clip(other, axis, delta));
            made[axis] = delta;
            blocked[axis] = (delta - wanted[axis]).abs() > TOUCH;
            bbox = bbox.shifted(axis, delta);
        }
        (DVec3::from_array(made), blocked)
    }

    fn colliders(&self, start: &Aabb, motion: DVec3) -> Vec<Aabb> {
        let reach = motion.abs() + DVec3::ONE;
        let low = CellPos::containing(DVec3::from_array(start.min) - reach);
        let high = CellPos::containing(DVec3::from_array(start.max) + reach);
        let mut boxes = Vec::new();
        for x in low.x..=high.x {
            for y in low.y..=high.y {
                for z in low.z..=high.z {
                    let pos = CellPos::new(x, y, z);
                    if let Some(height) = self.world.block_at(pos).collision_height() {
                        boxes.push(Aabb::cell(pos, height));
                    }
                }
            }
        }
        boxes
    }

    fn refresh_crosshair(&mut self) {
        self.agent.looking_at = raycast(
            &self.world,
            self.agent.eye_position(),
            self.agent.rotation.look_vector(),
            self.reach.reach(),
        );
    }
}

fn axis(positive: bool, negative: bool) -> f64 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}
