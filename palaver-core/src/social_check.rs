//! Social check resolution — one contested stat roll per conversation.
//!
//! The initiator leads with whichever offensive stat is stronger (ties
//! favor deception), which fixes the matching defensive stat on the
//! target. Both sides add an independent uniform roll in `[0, 100)` and
//! the differential classifies into the 9-step [`Tier`] ladder.
//!
//! Resolution is pure: side effects (relationship shifts, friend
//! conversion, ally desertion) are applied by the conversation machine at
//! outcome time, never here. With a scripted [`Roller`] the result is
//! fully deterministic.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dice::Roller;
use crate::types::{AgentId, SocialStats, Tier};

/// Which offensive angle the initiator leads with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approach {
    /// Deception: Cunning vs the target's Suspicion.
    Cunning,
    /// Persuasion: Charm vs the target's Distrust.
    Charm,
}

impl Approach {
    /// Display label for the initiator's side of the roll.
    #[must_use]
    pub fn offense_label(self) -> &'static str {
        match self {
            Approach::Cunning => "Cunning",
            Approach::Charm => "Charm",
        }
    }

    /// Display label for the target's side of the roll.
    #[must_use]
    pub fn defense_label(self) -> &'static str {
        match self {
            Approach::Cunning => "Suspicion",
            Approach::Charm => "Distrust",
        }
    }
}

/// The transient result of one resolved social check.
///
/// Produced once per conversation at the reply turn, consumed once at
/// conversation end; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialCheck {
    /// Who led the check.
    pub initiator: AgentId,
    /// Who defended.
    pub target: AgentId,
    /// Offensive angle chosen from the initiator's stats.
    pub approach: Approach,
    /// The initiator's active attack stat.
    pub attack_stat: f32,
    /// The initiator's roll in `[0, 100)`.
    pub attacker_roll: f32,
    /// `attack_stat + attacker_roll`.
    pub attacker_total: f32,
    /// The target's matching defense stat.
    pub defender_stat: f32,
    /// The target's roll in `[0, 100)`.
    pub defender_roll: f32,
    /// `defender_stat + defender_roll`.
    pub defender_total: f32,
    /// `attacker_total - defender_total`.
    pub differential: f32,
    /// Graded outcome classified from the differential.
    pub tier: Tier,
}

/// Resolve one contested social roll between two agents.
///
/// The initiator's `lie_attack` and `charm_attack` are compared; the
/// greater (ties favor lie) fixes the approach and the target's matching
/// defense stat. Missing stats have already defaulted to 50 inside
/// [`SocialStats`].
pub fn resolve(
    initiator: AgentId,
    target: AgentId,
    initiator_stats: &SocialStats,
    target_stats: &SocialStats,
    roller: &mut dyn Roller,
) -> SocialCheck {
    let approach = if initiator_stats.lie_attack >= initiator_stats.charm_attack {
        Approach::Cunning
    } else {
        Approach::Charm
    };

    let (attack_stat, defender_stat) = match approach {
        Approach::Cunning => (initiator_stats.lie_attack, target_stats.lie_defense),
        Approach::Charm => (initiator_stats.charm_attack, target_stats.charm_defense),
    };

    let attacker_roll = roller.roll_percent();
    let defender_roll = roller.roll_percent();
    let attacker_total = attack_stat + attacker_roll;
    let defender_total = defender_stat + defender_roll;
    let differential = attacker_total - defender_total;
    let tier = Tier::from_differential(differential);

    debug!(
        %initiator,
        %target,
        offense = approach.offense_label(),
        attacker_total,
        defender_total,
        differential,
        %tier,
        "social check resolved"
    );

    SocialCheck {
        initiator,
        target,
        approach,
        attack_stat,
        attacker_roll,
        attacker_total,
        defender_stat,
        defender_roll,
        defender_total,
        differential,
        tier,
    }
}
