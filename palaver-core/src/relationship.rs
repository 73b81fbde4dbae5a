//! Faction relationship model — the source of truth for inter-faction
//! sentiment.
//!
//! Each ordered faction pair carries two additive channels:
//!
//! - **base** — the persistent score, mutated by conversation outcomes,
//!   kill repulsion, and legacy relation shifts;
//! - **impulse** — a momentum-like channel fed by physics pushes (friend
//!   conversion, ally desertion) that eases back to zero over time.
//!
//! The effective relationship is `clamp(base + impulse)`. Scores are not
//! symmetric: (a, b) and (b, a) move independently. Self-pairs and the
//! wildcard bucket read neutral and ignore writes, so an unrecognized
//! faction can never corrupt the graph or raise an error.
//!
//! State is session-scoped by design: the graph is seeded from a static
//! baseline table at construction and never persisted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RelationshipConfig;
use crate::types::{Faction, Tier, Trend};

/// One ordered pair's relationship state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct PairState {
    /// Persistent score channel.
    base: f32,
    /// Decaying momentum channel fed by physics pushes.
    impulse: f32,
    /// Effective score at the last `take_sample` call.
    prev_sample: f32,
}

/// A single entry of the baseline sentiment table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BaselineEntry {
    /// Source faction.
    pub from: Faction,
    /// Target faction.
    pub to: Faction,
    /// Starting base score for the ordered pair.
    pub score: f32,
}

/// Directed graph of faction sentiment with shift, physics, and trend
/// operations.
#[derive(Debug, Clone)]
pub struct FactionGraph {
    pairs: HashMap<(Faction, Faction), PairState>,
    converts: HashMap<Faction, u32>,
    config: RelationshipConfig,
}

impl FactionGraph {
    /// Create a graph seeded from the built-in baseline table.
    #[must_use]
    pub fn new(config: RelationshipConfig) -> Self {
        Self::with_baselines(config, &default_baselines())
    }

    /// Create a graph seeded from an explicit baseline table. Pairs not
    /// listed start neutral. Entries naming the wildcard or a self-pair
    /// are ignored.
    #[must_use]
    pub fn with_baselines(config: RelationshipConfig, baselines: &[BaselineEntry]) -> Self {
        let mut graph = Self {
            pairs: HashMap::new(),
            converts: HashMap::new(),
            config,
        };
        for entry in baselines {
            if let Some(key) = graph.pair_key(entry.from, entry.to) {
                let bound = graph.config.score_bound;
                graph.pairs.insert(
                    key,
                    PairState {
                        base: entry.score.clamp(-bound, bound),
                        impulse: 0.0,
                        prev_sample: entry.score.clamp(-bound, bound),
                    },
                );
            }
        }
        graph
    }

    /// Valid mutation/read key for an ordered pair, or `None` when the
    /// pair is neutral by construction (wildcard or self-pair).
    fn pair_key(&self, a: Faction, b: Faction) -> Option<(Faction, Faction)> {
        if a.is_wildcard() || b.is_wildcard() || a == b {
            None
        } else {
            Some((a, b))
        }
    }

    /// Current effective relationship score for the ordered pair `(a, b)`.
    ///
    /// Defined for every pair in the closed set; self-pairs and wildcard
    /// lookups are neutral (0.0).
    #[must_use]
    pub fn relationship(&self, a: Faction, b: Faction) -> f32 {
        let Some(key) = self.pair_key(a, b) else {
            return 0.0;
        };
        let bound = self.config.score_bound;
        self.pairs
            .get(&key)
            .map_or(0.0, |p| (p.base + p.impulse).clamp(-bound, bound))
    }

    /// Attitude bucket for the ordered pair, used to pick greeting tone.
    ///
    /// Pure function of the current score.
    #[must_use]
    pub fn attitude(&self, a: Faction, b: Faction) -> Tier {
        Tier::from_differential(self.relationship(a, b))
    }

    /// Direction the pair has moved since [`FactionGraph::take_sample`]
    /// last ran for it. A never-sampled pair compares against its
    /// baseline.
    #[must_use]
    pub fn trend(&self, a: Faction, b: Faction) -> Trend {
        let Some(key) = self.pair_key(a, b) else {
            return Trend::Stable;
        };
        let Some(pair) = self.pairs.get(&key) else {
            return Trend::Stable;
        };
        let bound = self.config.score_bound;
        let delta = (pair.base + pair.impulse).clamp(-bound, bound) - pair.prev_sample;
        if delta > self.config.trend_epsilon {
            Trend::Improving
        } else if delta < -self.config.trend_epsilon {
            Trend::Worsening
        } else {
            Trend::Stable
        }
    }

    /// Record the current effective score as the pair's sample point.
    ///
    /// Sampling cadence belongs to the caller (the avatar display in the
    /// original system); the graph only retains the previous value.
    pub fn take_sample(&mut self, a: Faction, b: Faction) {
        let current = self.relationship(a, b);
        if let Some(key) = self.pair_key(a, b) {
            self.pairs.entry(key).or_default().prev_sample = current;
        }
    }

    /// Add `delta` to the stored base score for `(a, b)`, clamped to the
    /// configured bound. No-op for wildcard or self-pairs.
    pub fn shift_base(&mut self, a: Faction, b: Faction, delta: f32) {
        let Some(key) = self.pair_key(a, b) else {
            debug!(%a, %b, delta, "relationship shift ignored for neutral pair");
            return;
        };
        let bound = self.config.score_bound;
        let pair = self.pairs.entry(key).or_default();
        pair.base = (pair.base + delta).clamp(-bound, bound);
        debug!(%a, %b, delta, base = pair.base, "relationship base shifted");
    }

    /// Apply a directional push to the impulse channel — a momentum
    /// signal distinct from a flat shift. Positive force pushes `a`
    /// toward `b`, negative away.
    pub fn apply_physics(&mut self, a: Faction, b: Faction, force: f32) {
        let Some(key) = self.pair_key(a, b) else {
            debug!(%a, %b, force, "physics push ignored for neutral pair");
            return;
        };
        let bound = self.config.score_bound;
        let pair = self.pairs.entry(key).or_default();
        pair.impulse = (pair.impulse + force).clamp(-bound, bound);
        debug!(%a, %b, force, impulse = pair.impulse, "physics push applied");
    }

    /// Decay every pair's impulse channel toward zero.
    ///
    /// `impulse_new = impulse × e^(-rate × dt_seconds)`. Residues below
    /// a small epsilon snap to zero so the channel settles.
    pub fn decay_impulses(&mut self, dt_seconds: f32) {
        let factor = (-self.config.impulse_decay_rate * dt_seconds).exp();
        for pair in self.pairs.values_mut() {
            pair.impulse *= factor;
            if pair.impulse.abs() < 1e-3 {
                pair.impulse = 0.0;
            }
        }
    }

    /// Push the victim faction's relationship to the killer's faction
    /// downward. Called on every death.
    pub fn apply_kill_repulsion(&mut self, killer: Faction, victim: Faction) {
        let magnitude = self.config.kill_repulsion;
        info!(%killer, %victim, magnitude, "kill repulsion");
        self.shift_base(victim, killer, -magnitude);
    }

    /// Bookkeeping for an NPC whose effective faction became
    /// [`Faction::PlayerDroid`]. Retains a per-faction convert count.
    pub fn register_ally(&mut self, original: Faction) {
        if original.is_wildcard() {
            return;
        }
        let count = self.converts.entry(original).or_insert(0);
        *count += 1;
        info!(faction = %original, converts = *count, "ally registered");
    }

    /// How many agents of `faction` have been converted to the player's
    /// side this session.
    #[must_use]
    pub fn ally_converts(&self, faction: Faction) -> u32 {
        self.converts.get(&faction).copied().unwrap_or(0)
    }

    /// The tuning this graph was built with.
    #[must_use]
    pub fn config(&self) -> &RelationshipConfig {
        &self.config
    }
}

impl Default for FactionGraph {
    fn default() -> Self {
        Self::new(RelationshipConfig::default())
    }
}

/// The static baseline sentiment table the graph is seeded with at game
/// start. Pairs not listed start neutral; entries are mirrored so both
/// directions begin aligned.
#[must_use]
pub fn default_baselines() -> Vec<BaselineEntry> {
    let mutual: &[(Faction, Faction, f32)] = &[
        (Faction::Rebels, Faction::Imperials, -60.0),
        (Faction::Rebels, Faction::Sith, -40.0),
        (Faction::Rebels, Faction::Mandalorians, -10.0),
        (Faction::Rebels, Faction::Aliens, 20.0),
        (Faction::Rebels, Faction::Droids, 10.0),
        (Faction::Imperials, Faction::Sith, 40.0),
        (Faction::Imperials, Faction::Clones, 30.0),
        (Faction::Imperials, Faction::Aliens, -30.0),
        (Faction::Imperials, Faction::Droids, -20.0),
        (Faction::Imperials, Faction::Takers, -25.0),
        (Faction::Clones, Faction::Mandalorians, 15.0),
        (Faction::Mandalorians, Faction::Takers, -15.0),
        (Faction::Sith, Faction::PlayerDroid, -30.0),
        (Faction::Takers, Faction::Droids, -35.0),
        (Faction::Aliens, Faction::PlayerDroid, 10.0),
    ];
    let mut table = Vec::with_capacity(mutual.len() * 2);
    for &(a, b, score) in mutual {
        table.push(BaselineEntry {
            from: a,
            to: b,
            score,
        });
        table.push(BaselineEntry {
            from: b,
            to: a,
            score,
        });
    }
    table
}
