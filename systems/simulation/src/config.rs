//! Round driver configuration loaded from TOML.

use std::time::Duration;

use hiding_wumpus_system_hiding::HidingConfig;
use hiding_wumpus_system_pursuit::PursuitConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted grid edge, in cells.
pub const MAX_GRID_SIZE: u32 = 512;

/// Every tunable of a simulation run.
///
/// Missing TOML keys fall back to [`SimulationConfig::default`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of cells along each grid edge.
    pub grid_size: u32,
    /// Side length of the square play area in pixels.
    pub display_size: f32,
    /// Height of the UI strip above the grid in pixels.
    pub header_height: f32,
    /// Fixed simulation step in seconds.
    pub timestep_seconds: f32,
    /// Seconds between two decisions of the same agent.
    pub think_interval_seconds: f32,
    /// Seeker speed in cells per second.
    pub seeker_speed: f32,
    /// Hider speed in cells per second.
    pub hider_speed: f32,
    /// Simulated seconds after which an uncaught hider wins the round.
    pub round_time_limit_seconds: f32,
    /// Seed for every random choice made by the policies.
    pub seed: u64,
    /// Seeker tunables.
    pub pursuit: PursuitConfig,
    /// Hider tunables.
    pub hiding: HidingConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            display_size: 600.0,
            header_height: 100.0,
            timestep_seconds: 1.0 / 30.0,
            think_interval_seconds: 1.0,
            seeker_speed: 4.0,
            hider_speed: 4.0,
            round_time_limit_seconds: 300.0,
            seed: 0,
            pursuit: PursuitConfig::default(),
            hiding: HidingConfig::default(),
        }
    }
}

/// Errors raised while loading or validating a [`SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("could not parse simulation config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A field holds a value the simulation cannot run with.
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        /// Dotted name of the offending field.
        field: &'static str,
        /// What the value must satisfy.
        reason: &'static str,
    },
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        grid_size(self.grid_size)?;
        positive("display_size", self.display_size)?;
        non_negative("header_height", self.header_height)?;
        positive("timestep_seconds", self.timestep_seconds)?;
        positive("think_interval_seconds", self.think_interval_seconds)?;
        positive("seeker_speed", self.seeker_speed)?;
        positive("hider_speed", self.hider_speed)?;
        positive("round_time_limit_seconds", self.round_time_limit_seconds)?;
        non_negative("pursuit.freeze_seconds", self.pursuit.freeze_seconds)?;
        non_negative(
            "pursuit.prediction_window_seconds",
            self.pursuit.prediction_window_seconds,
        )?;

        let weights = self.hiding.weights;
        non_negative("hiding.weights.wall_proximity", weights.wall_proximity)?;
        non_negative("hiding.weights.shadow_depth", weights.shadow_depth)?;
        non_negative("hiding.weights.travel_distance", weights.travel_distance)?;
        non_negative("hiding.weights.blind_spot_size", weights.blind_spot_size)?;
        Ok(())
    }

    /// Pixel length of one cell edge.
    #[must_use]
    pub fn tile_length(&self) -> f32 {
        self.display_size / self.grid_size.max(1) as f32
    }

    /// Fixed step as a duration.
    pub fn timestep(&self) -> Result<Duration, ConfigError> {
        duration("timestep_seconds", self.timestep_seconds)
    }

    /// Decision period as a duration.
    pub fn think_interval(&self) -> Result<Duration, ConfigError> {
        duration("think_interval_seconds", self.think_interval_seconds)
    }

    /// Number of fixed steps that make up a full round.
    #[must_use]
    pub fn max_steps(&self) -> u64 {
        let ratio = self.round_time_limit_seconds / self.timestep_seconds;
        // absorbs f32 noise such as 300 / (1 / 30) landing just above 9000
        (ratio - 1e-3).ceil().max(1.0) as u64
    }
}

pub(crate) fn grid_size(size: u32) -> Result<(), ConfigError> {
    if (1..=MAX_GRID_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field: "grid_size",
            reason: "must be between 1 and 512",
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be a finite number greater than zero",
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be a finite number no less than zero",
        })
    }
}

fn duration(field: &'static str, value: f32) -> Result<Duration, ConfigError> {
    positive(field, value)?;
    Duration::try_from_secs_f32(value).map_err(|_| ConfigError::Invalid {
        field,
        reason: "does not fit in a duration",
    })
}
