//! Configuration for the palaver simulation.
//!
//! Loadable from TOML. Every field carries a default matching the tuning
//! the system shipped with, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Top-level palaver configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PalaverConfig {
    /// Conversation pacing and interruption settings.
    #[serde(default)]
    pub conversation: ConversationConfig,
    /// Faction relationship model tuning.
    #[serde(default)]
    pub relationship: RelationshipConfig,
}

impl PalaverConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `PalaverError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::PalaverError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Conversation state machine pacing and interruption behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Delay between the greeting and the reply turn, in milliseconds.
    #[serde(default = "default_turn_delay")]
    pub reply_delay_ms: u64,
    /// Delay between the reply and the response turn, in milliseconds.
    #[serde(default = "default_turn_delay")]
    pub response_delay_ms: u64,
    /// Delay between the response and outcome application, in milliseconds.
    #[serde(default = "default_outcome_delay")]
    pub outcome_delay_ms: u64,
    /// Minimum cooldown stamped on a finished conversation, in milliseconds.
    #[serde(default = "default_cooldown_min")]
    pub cooldown_min_ms: u64,
    /// Maximum cooldown stamped on a finished conversation, in milliseconds.
    #[serde(default = "default_cooldown_max")]
    pub cooldown_max_ms: u64,
    /// Whether the interruption check before the response turn also aborts
    /// on a paused game. The original behavior skipped the pause flag on
    /// this one check; set to `false` to reproduce that.
    #[serde(default = "default_true")]
    pub recheck_pause_before_response: bool,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: 3000,
            response_delay_ms: 3000,
            outcome_delay_ms: 1500,
            cooldown_min_ms: 10_000,
            cooldown_max_ms: 15_000,
            recheck_pause_before_response: true,
        }
    }
}

/// Faction relationship model tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipConfig {
    /// Scores are clamped to `[-score_bound, score_bound]` on every
    /// mutation and read. Attitude thresholds assume this range.
    #[serde(default = "default_score_bound")]
    pub score_bound: f32,
    /// Downward shift applied to (victim faction → killer faction) on
    /// every death.
    #[serde(default = "default_kill_repulsion")]
    pub kill_repulsion: f32,
    /// Magnitude of the physics push applied on the h4 (convert friend)
    /// and m4 (ally deserts) extremes. Fixed, independent of the check
    /// differential that triggered it.
    #[serde(default = "default_physics_push")]
    pub physics_push: f32,
    /// Exponential decay rate of the impulse channel, per second.
    #[serde(default = "default_impulse_decay")]
    pub impulse_decay_rate: f32,
    /// Movement below this magnitude reads as a stable trend.
    #[serde(default = "default_trend_epsilon")]
    pub trend_epsilon: f32,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            score_bound: 100.0,
            kill_repulsion: 15.0,
            physics_push: 5.0,
            impulse_decay_rate: 0.05,
            trend_epsilon: 0.5,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_turn_delay() -> u64 {
    3000
}

fn default_outcome_delay() -> u64 {
    1500
}

fn default_cooldown_min() -> u64 {
    10_000
}

fn default_cooldown_max() -> u64 {
    15_000
}

fn default_score_bound() -> f32 {
    100.0
}

fn default_kill_repulsion() -> f32 {
    15.0
}

fn default_physics_push() -> f32 {
    5.0
}

fn default_impulse_decay() -> f32 {
    0.05
}

fn default_trend_epsilon() -> f32 {
    0.5
}
