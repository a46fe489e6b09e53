//! Tunable traversal policy.
//!
//! [`Settings`] is plain serde data loaded from JSON. Cost functions never
//! read it directly: [`crate::CalculationContext`] copies every value it needs
//! at construction so a planning pass sees one consistent policy. Execution
//! receives it explicitly through [`crate::TickEnv`].

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::block::MaterialSet;
use crate::classifier::ClassifierPolicy;
use crate::world::Region;

/// Errors raised while loading or validating [`Settings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings from {path:?}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The settings document is not valid JSON for [`Settings`].
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is outside its permitted range.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Traversal policy knobs and execution thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Allow breaking blocks.
    pub allow_break: bool,
    /// Allow placing throwaway blocks.
    pub allow_place: bool,
    /// Allow sprinting.
    pub allow_sprint: bool,
    /// Allow jumping over gaps.
    pub allow_parkour: bool,
    /// Allow gap jumps that land one block higher.
    pub allow_parkour_ascend: bool,
    /// Allow diagonals that drop one block.
    pub allow_diagonal_descend: bool,
    /// Allow diagonals that climb one block.
    pub allow_diagonal_ascend: bool,
    /// Allow digging straight down.
    pub allow_downward: bool,
    /// Allow long falls broken by placing water.
    pub allow_water_bucket_fall: bool,
    /// Treat vines as floor.
    pub allow_vines: bool,
    /// Treat bottom slabs as floor.
    pub allow_walk_on_bottom_slab: bool,
    /// Treat still water surfaces as solid floor.
    pub assume_walk_on_water: bool,
    /// Refuse to break blocks that would release falling blocks.
    pub avoid_updating_falling_blocks: bool,
    /// Allow placing into liquid sources.
    pub allow_place_in_fluids_source: bool,
    /// Allow placing into flowing liquid.
    pub allow_place_in_fluids_flow: bool,
    /// Ticks charged per placed block.
    pub place_block_cost: f64,
    /// Ticks added to every block break.
    pub block_break_additional_cost: f64,
    /// Ticks added to every jump.
    pub jump_penalty: f64,
    /// Ticks added per block walked on top of water.
    pub walk_on_water_one_penalty: f64,
    /// Multiplier a search applies to revisiting its previous path.
    pub backtrack_cost_favoring_coefficient: f64,
    /// Longest drop the agent takes without water.
    pub max_fall_height_no_water: u32,
    /// Longest drop the agent takes when it can place water.
    pub max_fall_height_bucket: u32,
    /// Ticks added per block of parkour beyond two.
    pub parkour_risk_penalty: f64,
    /// Reach distance for breaking and placing.
    pub block_reach_distance: f64,
    /// Keep walking towards the destination while breaking.
    pub walk_while_breaking: bool,
    /// Accept overshooting a traverse by up to two blocks.
    pub overshoot_traverse: bool,
    /// Sprint while wading.
    pub sprint_in_water: bool,
    /// Ticks a running parkour jump may take before failing.
    pub parkour_timeout_ticks: u32,
    /// Ticks a running diagonal may take before failing.
    pub diagonal_timeout_ticks: u32,
    /// Materials never walked through.
    pub blocks_to_avoid: MaterialSet,
    /// Materials breakable even when breaking is disabled.
    pub allow_break_anyway: MaterialSet,
    /// Regions where nothing is broken or placed.
    pub protected_regions: Vec<Region>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allow_break: true,
            allow_place: true,
            allow_sprint: true,
            allow_parkour: false,
            allow_parkour_ascend: true,
            allow_diagonal_descend: false,
            allow_diagonal_ascend: false,
            allow_downward: true,
            allow_water_bucket_fall: true,
            allow_vines: false,
            allow_walk_on_bottom_slab: true,
            assume_walk_on_water: false,
            avoid_updating_falling_blocks: true,
            allow_place_in_fluids_source: true,
            allow_place_in_fluids_flow: true,
            place_block_cost: 20.0,
            block_break_additional_cost: 2.0,
            jump_penalty: 2.0,
            walk_on_water_one_penalty: 3.0,
            backtrack_cost_favoring_coefficient: 0.5,
            max_fall_height_no_water: 3,
            max_fall_height_bucket: 20,
            parkour_risk_penalty: 2.0,
            block_reach_distance: 4.5,
            walk_while_breaking: true,
            overshoot_traverse: true,
            sprint_in_water: true,
            parkour_timeout_ticks: 40,
            diagonal_timeout_ticks: 60,
            blocks_to_avoid: MaterialSet::EMPTY,
            allow_break_anyway: MaterialSet::EMPTY,
            protected_regions: Vec::new(),
        }
    }
}

impl Settings {
    /// Parses and validates settings from a JSON document. Missing fields
    /// take their defaults.
    ///
    /// # Errors
    /// Returns [`SettingsError::Parse`] for malformed JSON and
    /// [`SettingsError::Invalid`] when validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses and validates a JSON settings file.
    ///
    /// # Errors
    /// Returns [`SettingsError::Io`] when the file cannot be read, otherwise
    /// the errors of [`Settings::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks that every value is in range.
    ///
    /// # Errors
    /// Returns [`SettingsError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let costs = [
            ("place_block_cost", self.place_block_cost),
            ("block_break_additional_cost", self.block_break_additional_cost),
            ("jump_penalty", self.jump_penalty),
            ("walk_on_water_one_penalty", self.walk_on_water_one_penalty),
            (
                "backtrack_cost_favoring_coefficient",
                self.backtrack_cost_favoring_coefficient,
            ),
            ("parkour_risk_penalty", self.parkour_risk_penalty),
        ];
        for (field, value) in costs {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("{value} is not a non-negative number")));
            }
        }
        if !self.block_reach_distance.is_finite() || self.block_reach_distance <= 0.0 {
            return Err(invalid(
                "block_reach_distance",
                format!("{} must be positive", self.block_reach_distance),
            ));
        }
        if self.max_fall_height_bucket < self.max_fall_height_no_water {
            return Err(invalid(
                "max_fall_height_bucket",
                format!(
                    "{} is below max_fall_height_no_water ({})",
                    self.max_fall_height_bucket, self.max_fall_height_no_water
                ),
            ));
        }
        Ok(())
    }

    /// The classifier-relevant subset of the settings.
    #[must_use]
    pub const fn classifier_policy(&self) -> ClassifierPolicy {
        ClassifierPolicy {
            assume_walk_on_water: self.assume_walk_on_water,
            allow_vines: self.allow_vines,
            allow_walk_on_bottom_slab: self.allow_walk_on_bottom_slab,
            avoid_updating_falling_blocks: self.avoid_updating_falling_blocks,
            blocks_to_avoid: self.blocks_to_avoid,
        }
    }
}

fn invalid(field: &'static str, reason: String) -> SettingsError {
    warn!("rejecting setting {field}: {reason}");
    SettingsError::Invalid { field, reason }
}
