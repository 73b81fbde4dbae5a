//! Core type definitions for the palaver simulation.
//!
//! Factions form a closed set; everything else in the game references them
//! by value. Unknown faction keys in external data degrade to [`Faction::Any`]
//! rather than failing deserialization.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Unique identifier for a conversation participant (NPC, player, ally).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    /// Create a new random agent ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Factions
// ---------------------------------------------------------------------------

/// A named group holding a relationship score against every other faction.
///
/// The set is closed: factions never change identity. Agents change
/// *effective* faction instead (conversion to ally maps the effective
/// faction to [`Faction::PlayerDroid`] while `original_faction` is retained
/// for dialogue and attitude purposes).
///
/// [`Faction::Any`] is the wildcard bucket: phrase filters use it to match
/// every faction, and unrecognized faction keys in external data fall back
/// to it instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    /// Rebel cells.
    Rebels,
    /// Imperial forces.
    Imperials,
    /// Clone soldiers.
    Clones,
    /// Mandalorian clans.
    Mandalorians,
    /// Sith adherents.
    Sith,
    /// Taker scavenger bands.
    Takers,
    /// Independent droids.
    Droids,
    /// Alien species without a wider allegiance.
    Aliens,
    /// The player's droid and everyone converted to its side.
    PlayerDroid,
    /// Wildcard / catch-all bucket.
    #[serde(other)]
    Any,
}

impl Faction {
    /// Every concrete faction, excluding the [`Faction::Any`] wildcard.
    pub const ALL: [Faction; 9] = [
        Faction::Rebels,
        Faction::Imperials,
        Faction::Clones,
        Faction::Mandalorians,
        Faction::Sith,
        Faction::Takers,
        Faction::Droids,
        Faction::Aliens,
        Faction::PlayerDroid,
    ];

    /// Whether this is the wildcard bucket.
    #[must_use]
    pub fn is_wildcard(self) -> bool {
        self == Faction::Any
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Faction::Rebels => "rebels",
            Faction::Imperials => "imperials",
            Faction::Clones => "clones",
            Faction::Mandalorians => "mandalorians",
            Faction::Sith => "sith",
            Faction::Takers => "takers",
            Faction::Droids => "droids",
            Faction::Aliens => "aliens",
            Faction::PlayerDroid => "player_droid",
            Faction::Any => "any",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Agent state
// ---------------------------------------------------------------------------

/// Coarse behavioral state of an agent, as seen by the conversation core.
///
/// Conversations only proceed while both participants remain in
/// [`AgentState::Idling`] or [`AgentState::Conversing`]
/// ([`AgentState::Following`] is additionally allowed for allies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Standing around, available for interaction.
    Idling,
    /// Currently in a conversation.
    Conversing,
    /// Following the player (allies).
    Following,
    /// In combat.
    Attacking,
    /// Running away.
    Fleeing,
}

// ---------------------------------------------------------------------------
// Conversation turns
// ---------------------------------------------------------------------------

/// The three scripted turns of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// Opening line from the initiator.
    Greeting,
    /// The target's answer; the social check is resolved here.
    Reply,
    /// The initiator's closing line.
    Response,
}

impl fmt::Display for TurnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TurnKind::Greeting => "greeting",
            TurnKind::Reply => "reply",
            TurnKind::Response => "response",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Outcome / attitude ladder
// ---------------------------------------------------------------------------

/// The 9-step graded ladder shared by social-check outcomes and
/// relationship attitude buckets.
///
/// `M4..M1` are increasingly mild failures, `Equals` is a wash, `H1..H4`
/// are increasingly strong successes. Greeting phrases are tagged with the
/// same ladder so attitude selection and outcome classification speak one
/// vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Catastrophic failure: a conversing ally deserts.
    M4,
    /// Severe failure.
    M3,
    /// Significant failure.
    M2,
    /// Mild failure.
    M1,
    /// Neither side gained ground.
    Equals,
    /// Mild success.
    H1,
    /// Significant success.
    H2,
    /// Strong success.
    H3,
    /// Overwhelming success: the target becomes a friend.
    H4,
}

impl Tier {
    /// Classify a roll differential (attacker total minus defender total).
    ///
    /// Boundary rules, with the outer `>10` / `<-10` tests taking
    /// precedence over the sub-buckets:
    ///
    /// | differential        | tier   |
    /// |---------------------|--------|
    /// | > 99                | H4     |
    /// | > 50, ≤ 99          | H3     |
    /// | > 30, ≤ 50          | H2     |
    /// | > 10, ≤ 30          | H1     |
    /// | -10 ..= 10          | Equals |
    /// | < -10, ≥ -30        | M1     |
    /// | < -30, ≥ -50        | M2     |
    /// | < -50, ≥ -99        | M3     |
    /// | < -99               | M4     |
    ///
    /// The same thresholds classify a relationship score into an attitude
    /// bucket (scores are clamped to a bound of comparable magnitude, so
    /// the extremes are reachable only at saturation).
    #[must_use]
    pub fn from_differential(differential: f32) -> Self {
        if differential > 10.0 {
            if differential > 50.0 {
                if differential > 99.0 {
                    Tier::H4
                } else {
                    Tier::H3
                }
            } else if differential > 30.0 {
                Tier::H2
            } else {
                Tier::H1
            }
        } else if differential < -10.0 {
            if differential < -50.0 {
                if differential < -99.0 {
                    Tier::M4
                } else {
                    Tier::M3
                }
            } else if differential < -30.0 {
                Tier::M2
            } else {
                Tier::M1
            }
        } else {
            Tier::Equals
        }
    }

    /// Friendliness rank: -4 (`M4`) through 0 (`Equals`) to +4 (`H4`).
    ///
    /// Monotonic in the differential: a larger differential never maps to
    /// a lower rank.
    #[must_use]
    pub fn rank(self) -> i8 {
        match self {
            Tier::M4 => -4,
            Tier::M3 => -3,
            Tier::M2 => -2,
            Tier::M1 => -1,
            Tier::Equals => 0,
            Tier::H1 => 1,
            Tier::H2 => 2,
            Tier::H3 => 3,
            Tier::H4 => 4,
        }
    }

    /// The faction-relationship delta this outcome applies, positive toward
    /// the initiator on success, negative away on failure.
    #[must_use]
    pub fn relationship_shift(self) -> f32 {
        match self {
            Tier::H1 => 2.0,
            Tier::H2 => 5.0,
            Tier::H3 => 8.0,
            Tier::H4 => 10.0,
            Tier::Equals => 0.0,
            Tier::M1 => -2.0,
            Tier::M2 => -5.0,
            Tier::M3 => -8.0,
            Tier::M4 => -10.0,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::M4 => "m4",
            Tier::M3 => "m3",
            Tier::M2 => "m2",
            Tier::M1 => "m1",
            Tier::Equals => "equals",
            Tier::H1 => "h1",
            Tier::H2 => "h2",
            Tier::H3 => "h3",
            Tier::H4 => "h4",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Relationship trend
// ---------------------------------------------------------------------------

/// Direction a relationship has moved since it was last sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Score has risen since the last sample.
    Improving,
    /// Score has fallen since the last sample.
    Worsening,
    /// No meaningful movement.
    Stable,
}

// ---------------------------------------------------------------------------
// Social stats
// ---------------------------------------------------------------------------

/// Default value for a missing social stat.
pub const DEFAULT_STAT: f32 = 50.0;

/// Default phrase language.
pub const DEFAULT_LANGUAGE: &str = "language_basic";

fn default_stat() -> f32 {
    DEFAULT_STAT
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Per-agent social stat bag.
///
/// Every field carries a serde default so malformed or partial agent
/// configuration degrades to the documented defaults (stat 50, language
/// `language_basic`) instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialStats {
    /// Offensive deception stat (display label: Cunning).
    #[serde(default = "default_stat")]
    pub lie_attack: f32,
    /// Offensive charm stat (display label: Charm).
    #[serde(default = "default_stat")]
    pub charm_attack: f32,
    /// Defense against deception (display label: Suspicion).
    #[serde(default = "default_stat")]
    pub lie_defense: f32,
    /// Defense against charm (display label: Distrust).
    #[serde(default = "default_stat")]
    pub charm_defense: f32,
    /// Language this agent speaks; phrases must match it exactly.
    #[serde(default = "default_language")]
    pub language: String,
    /// Optional subgroup tag (finer-grained than faction, e.g. a species).
    #[serde(default)]
    pub group_key: Option<String>,
    /// Agents with this flag never start or accept conversations.
    #[serde(default)]
    pub no_conversation: bool,
}

impl Default for SocialStats {
    fn default() -> Self {
        Self {
            lie_attack: DEFAULT_STAT,
            charm_attack: DEFAULT_STAT,
            lie_defense: DEFAULT_STAT,
            charm_defense: DEFAULT_STAT,
            language: DEFAULT_LANGUAGE.to_string(),
            group_key: None,
            no_conversation: false,
        }
    }
}
