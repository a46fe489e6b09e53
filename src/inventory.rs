//! What the agent carries: tools, throwaway blocks and a water bucket.
//!
//! The movement layer never mutates the inventory. Cost calculation freezes
//! the relevant facts into a [`crate::CalculationContext`]; execution only
//! asks the host to select items through [`crate::ItemRequest`].

use serde::{Deserialize, Serialize};

use crate::block::BlockState;

/// Tool classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Stone and metal.
    Pickaxe,
    /// Wood.
    Axe,
    /// Soil and sand.
    Shovel,
    /// Leaves, vines and webs.
    Shears,
}

/// Tool material tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolTier {
    /// Wooden tools.
    Wood,
    /// Golden tools: fast but weak.
    Gold,
    /// Stone tools.
    Stone,
    /// Iron tools.
    Iron,
    /// Diamond tools.
    Diamond,
    /// Netherite tools.
    Netherite,
}

impl ToolTier {
    /// Mining speed multiplier against matching blocks.
    #[must_use]
    pub const fn speed(self) -> f64 {
        match self {
            Self::Wood => 2.0,
            Self::Stone => 4.0,
            Self::Iron => 6.0,
            Self::Diamond => 8.0,
            Self::Netherite => 9.0,
            Self::Gold => 12.0,
        }
    }

    /// Harvest level: a tool drops a block when its level meets the block's.
    #[must_use]
    pub const fn harvest_level(self) -> u8 {
        match self {
            Self::Wood | Self::Gold => 0,
            Self::Stone => 1,
            Self::Iron => 2,
            Self::Diamond => 3,
            Self::Netherite => 4,
        }
    }
}

/// A single tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tool {
    /// What the tool is for.
    pub kind: ToolKind,
    /// What it is made of.
    pub tier: ToolTier,
    /// Efficiency enchantment level.
    #[serde(default)]
    pub efficiency: u8,
}

impl Tool {
    /// An unenchanted tool.
    #[must_use]
    pub const fn new(kind: ToolKind, tier: ToolTier) -> Self {
        Self {
            kind,
            tier,
            efficiency: 0,
        }
    }

    /// Mining speed multiplier of this tool against `state`, efficiency
    /// included.
    #[must_use]
    pub fn speed_against(&self, state: BlockState) -> f64 {
        if state.material.preferred_tool() != Some(self.kind) {
            return 1.0;
        }
        let base = self.tier.speed();
        let level = f64::from(self.efficiency);
        if self.efficiency > 0 {
            base + level * level + 1.0
        } else {
            base
        }
    }

    /// Whether the tool is good enough to harvest `state`.
    #[must_use]
    pub fn can_harvest(&self, state: BlockState) -> bool {
        match state.material.harvest_requirement() {
            None => true,
            Some((kind, tier)) => {
                self.kind == kind && self.tier.harvest_level() >= tier.harvest_level()
            }
        }
    }
}

/// The agent's tools, used to estimate how long blocks take to break.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolSet {
    tools: Vec<Tool>,
}

impl ToolSet {
    /// Wraps a list of tools.
    #[must_use]
    pub const fn new(tools: Vec<Tool>) -> Self {
        Self { tools }
    }

    /// The tools in the set.
    #[must_use]
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Break progress per tick with the best available tool or bare hands.
    ///
    /// Zero means the block cannot be broken. Blocks without hardness break
    /// instantly and report an infinite speed.
    #[must_use]
    pub fn break_speed(&self, state: BlockState) -> f64 {
        let hardness = state.hardness();
        if hardness < 0.0 {
            return 0.0;
        }
        if hardness == 0.0 {
            return f64::INFINITY;
        }
        let hand = Self::strength(1.0, state.material.harvest_requirement().is_none(), hardness);
        self.tools
            .iter()
            .map(|tool| Self::strength(tool.speed_against(state), tool.can_harvest(state), hardness))
            .fold(hand, f64::max)
    }

    /// The tool that breaks `state` fastest, if any beats bare hands.
    #[must_use]
    pub fn best_tool_for(&self, state: BlockState) -> Option<Tool> {
        let hardness = state.hardness();
        if hardness <= 0.0 {
            return None;
        }
        let hand = Self::strength(1.0, state.material.harvest_requirement().is_none(), hardness);
        self.tools
            .iter()
            .map(|tool| {
                (
                    *tool,
                    Self::strength(tool.speed_against(state), tool.can_harvest(state), hardness),
                )
            })
            .filter(|(_, speed)| *speed > hand)
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(tool, _)| tool)
    }

    fn strength(speed: f64, harvestable: bool, hardness: f64) -> f64 {
        let divisor = if harvestable { 30.0 } else { 100.0 };
        speed / hardness / divisor
    }
}

/// A summary of the agent's inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInventory {
    /// Number of blocks the agent is willing to place and lose.
    #[serde(default)]
    pub throwaway_blocks: u32,
    /// Whether a filled water bucket is carried.
    #[serde(default)]
    pub water_bucket: bool,
    /// Whether an empty bucket is carried.
    #[serde(default)]
    pub empty_bucket: bool,
    /// Tools carried.
    #[serde(default)]
    pub tools: Vec<Tool>,
    /// Frost walker enchantment level on the boots.
    #[serde(default)]
    pub frost_walker: u8,
    /// Depth strider enchantment level on the boots.
    #[serde(default)]
    pub depth_strider: u8,
}

impl AgentInventory {
    /// Whether at least one throwaway block is available.
    #[must_use]
    pub const fn has_throwaway(&self) -> bool {
        self.throwaway_blocks > 0
    }

    /// The carried tools as a [`ToolSet`].
    #[must_use]
    pub fn tool_set(&self) -> ToolSet {
        ToolSet::new(self.tools.clone())
    }
}
