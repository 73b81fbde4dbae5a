//! Phrase corpus and selection — picking one line of dialogue from a
//! tagged corpus.
//!
//! A [`Phrase`] is an immutable record tagged with turn kinds, attitude,
//! language, faction/subgroup gates, and topic links. The corpus is loaded
//! from externally-parsed JSON (an array of records under a `phrases` key)
//! and treated as read-only for the lifetime of a session.
//!
//! Gate semantics, which the filter implements exactly:
//!
//! - **from side**: the phrase's `from_faction` includes `any` or the
//!   speaker's faction, OR its `from_subgroup` includes the speaker's
//!   subgroup — a logical OR, so a subgroup-restricted phrase with no
//!   faction match is still selectable by subgroup alone;
//! - **to side**: `to_faction` must include `any` or the listener's
//!   faction, AND, when `to_subgroup` is present, it must include the
//!   listener's subgroup — a hard AND gate, unlike the from side;
//! - **topic**: reply/response turns additionally require
//!   `on_topic_received` to include the received topic, falling back to
//!   `"none"`-tagged phrases when nothing matches a concrete topic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dice::Roller;
use crate::error::{PalaverError, Result};
use crate::types::{Faction, Tier, TurnKind};

/// The topic tag meaning "no particular topic".
pub const TOPIC_NONE: &str = "none";

// ---------------------------------------------------------------------------
// Phrase records
// ---------------------------------------------------------------------------

/// What completing a phrase does to the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseOutcome {
    /// No effect beyond being spoken.
    #[default]
    None,
    /// The phrase carries the conversation's social check.
    SocialCheck,
    /// The phrase closes the conversation.
    EndDialogue,
    /// Legacy direct relation change, magnitude in [`Phrase::value`].
    RelationShift,
}

/// One immutable line of dialogue with its selection tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phrase {
    /// Turn kinds this phrase can fill.
    #[serde(rename = "type")]
    pub turn_types: Vec<TurnKind>,
    /// Attitude bucket this phrase is written for; matched exactly.
    pub attitude: Tier,
    /// Language tag; matched exactly against the speaker's language.
    #[serde(default = "default_language")]
    pub language: String,
    /// Factions allowed to speak this line (`any` matches all).
    pub from_faction: Vec<Faction>,
    /// Subgroups allowed to speak this line; satisfies the from side on
    /// its own.
    #[serde(default)]
    pub from_subgroup: Option<Vec<String>>,
    /// Factions this line may be addressed to (`any` matches all).
    pub to_faction: Vec<Faction>,
    /// When present, the listener's subgroup must be in this list.
    #[serde(default)]
    pub to_subgroup: Option<Vec<String>>,
    /// Topics this line answers to (reply/response turns).
    #[serde(default)]
    pub on_topic_received: Option<Vec<String>>,
    /// Reaction classes (`liked`/`disliked`/`neutral`) this line answers
    /// to, consulted by the response fallback ladder.
    #[serde(default)]
    pub on_topic_reaction: Option<Vec<String>>,
    /// Topic this line raises for the next turn.
    #[serde(default)]
    pub topic: Option<String>,
    /// The spoken text.
    pub text: String,
    /// What completing the phrase does.
    #[serde(default)]
    pub outcome: PhraseOutcome,
    /// Magnitude for [`PhraseOutcome::RelationShift`].
    #[serde(default)]
    pub value: Option<f32>,
}

impl Phrase {
    /// Topic this phrase raises, or `"none"`.
    #[must_use]
    pub fn topic_or_none(&self) -> &str {
        self.topic.as_deref().unwrap_or(TOPIC_NONE)
    }
}

fn default_language() -> String {
    crate::types::DEFAULT_LANGUAGE.to_string()
}

/// The read-only phrase corpus for a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhraseBook {
    /// All loaded phrases.
    pub phrases: Vec<Phrase>,
}

impl PhraseBook {
    /// Parse a corpus from a JSON document of shape
    /// `{ "phrases": [ ... ] }`.
    ///
    /// # Errors
    /// Returns `PalaverError::Corpus` if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PalaverError::Corpus(e.to_string()))
    }

    /// Load a corpus from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Bulk-append another corpus (the external `loadPhrases` shape).
    pub fn append(&mut self, mut other: PhraseBook) {
        self.phrases.append(&mut other.phrases);
    }

    /// Number of phrases loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// Whether the corpus is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Topic preferences
// ---------------------------------------------------------------------------

/// How a faction classifies a received topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicReaction {
    /// The faction likes hearing about this.
    Liked,
    /// The faction resents hearing about this.
    Disliked,
    /// No opinion.
    Neutral,
}

impl TopicReaction {
    /// Tag string as it appears in `on_topic_reaction` lists.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TopicReaction::Liked => "liked",
            TopicReaction::Disliked => "disliked",
            TopicReaction::Neutral => "neutral",
        }
    }
}

/// Per-faction liked/disliked topic lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicTaste {
    /// Topics the faction responds warmly to.
    #[serde(default)]
    pub liked: Vec<String>,
    /// Topics the faction bristles at.
    #[serde(default)]
    pub disliked: Vec<String>,
}

/// Faction topic-preference table with an `any` catch-all bucket.
///
/// Unrecognized factions and unlisted topics resolve to
/// [`TopicReaction::Neutral`]; lookups never fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicPreferences {
    tastes: HashMap<Faction, TopicTaste>,
}

impl TopicPreferences {
    /// Build a table from explicit per-faction tastes.
    #[must_use]
    pub fn new(tastes: HashMap<Faction, TopicTaste>) -> Self {
        Self { tastes }
    }

    /// Classify `topic` from `faction`'s point of view, consulting the
    /// faction's own taste first and the `any` bucket second.
    #[must_use]
    pub fn reaction(&self, faction: Faction, topic: &str) -> TopicReaction {
        for key in [faction, Faction::Any] {
            if let Some(taste) = self.tastes.get(&key) {
                if taste.liked.iter().any(|t| t == topic) {
                    return TopicReaction::Liked;
                }
                if taste.disliked.iter().any(|t| t == topic) {
                    return TopicReaction::Disliked;
                }
            }
        }
        TopicReaction::Neutral
    }
}

impl Default for TopicPreferences {
    fn default() -> Self {
        let mut tastes = HashMap::new();
        tastes.insert(
            Faction::Rebels,
            TopicTaste {
                liked: vec!["proindependence".into(), "freedom".into()],
                disliked: vec!["empire".into(), "order".into()],
            },
        );
        tastes.insert(
            Faction::Imperials,
            TopicTaste {
                liked: vec!["empire".into(), "order".into()],
                disliked: vec!["proindependence".into(), "freedom".into()],
            },
        );
        tastes.insert(
            Faction::Sith,
            TopicTaste {
                liked: vec!["power".into(), "the_force".into()],
                disliked: vec!["proindependence".into()],
            },
        );
        tastes.insert(
            Faction::Mandalorians,
            TopicTaste {
                liked: vec!["bounty".into(), "honor".into()],
                disliked: vec!["empire".into()],
            },
        );
        tastes.insert(
            Faction::Takers,
            TopicTaste {
                liked: vec!["scrap".into(), "salvage".into()],
                disliked: vec!["order".into()],
            },
        );
        tastes.insert(
            Faction::Droids,
            TopicTaste {
                liked: vec!["maintenance".into()],
                disliked: vec!["scrap".into()],
            },
        );
        tastes.insert(
            Faction::Any,
            TopicTaste {
                liked: vec!["trade".into()],
                disliked: vec!["war".into()],
            },
        );
        Self { tastes }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Dialogue-facing view of an agent: the faction phrases are gated on
/// (an ally's *original* faction), plus subgroup and language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseActor {
    /// Faction used for phrase gating.
    pub faction: Faction,
    /// Optional subgroup tag.
    pub subgroup: Option<String>,
    /// Language the actor speaks.
    pub language: String,
}

/// Selects phrases from a corpus under faction, attitude, language, and
/// topic gates.
#[derive(Debug, Clone, Default)]
pub struct PhraseSelector {
    book: PhraseBook,
    preferences: TopicPreferences,
}

impl PhraseSelector {
    /// Build a selector over a corpus with the default topic preferences.
    #[must_use]
    pub fn new(book: PhraseBook) -> Self {
        Self {
            book,
            preferences: TopicPreferences::default(),
        }
    }

    /// Replace the topic-preference table.
    #[must_use]
    pub fn with_preferences(mut self, preferences: TopicPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// The underlying corpus.
    #[must_use]
    pub fn book(&self) -> &PhraseBook {
        &self.book
    }

    /// Pick one phrase matching the full filter, uniformly at random
    /// among survivors.
    ///
    /// Returns `None` when no phrase matches even after the
    /// fallback-to-`"none"` retry — the caller treats that as a normal
    /// early end of the conversation, not an error.
    pub fn find_phrase(
        &self,
        speaker: &PhraseActor,
        listener: &PhraseActor,
        turn: TurnKind,
        attitude: Tier,
        topic_received: &str,
        roller: &mut dyn Roller,
    ) -> Option<&Phrase> {
        let candidates: Vec<&Phrase> = self
            .base_candidates(speaker, listener, turn, attitude)
            .into_iter()
            .filter(|p| topic_gate(p, turn, topic_received))
            .collect();

        if !candidates.is_empty() {
            return Some(candidates[roller.pick(candidates.len())]);
        }

        // Graceful fallback: retry requiring the "none" topic.
        if matches!(turn, TurnKind::Reply | TurnKind::Response) && topic_received != TOPIC_NONE {
            let fallback: Vec<&Phrase> = self
                .base_candidates(speaker, listener, turn, attitude)
                .into_iter()
                .filter(|p| topic_gate(p, turn, TOPIC_NONE))
                .collect();
            if !fallback.is_empty() {
                debug!(%turn, topic_received, "phrase found via none-topic fallback");
                return Some(fallback[roller.pick(fallback.len())]);
            }
        }

        debug!(%turn, %attitude, topic_received, "no phrase found");
        None
    }

    /// Pick the final response phrase via the four-step fallback ladder:
    ///
    /// 1. phrases matching the received topic;
    /// 2. failing that (and the topic wasn't `"none"`), phrases matching
    ///    the speaker faction's reaction class for the topic;
    /// 3. failing that, phrases whose outcome carries the social check;
    /// 4. failing that, generic end-of-dialogue phrases with no topic
    ///    requirement.
    ///
    /// Steps are evaluated in exactly this order, stopping at the first
    /// non-empty result.
    pub fn find_response(
        &self,
        speaker: &PhraseActor,
        listener: &PhraseActor,
        attitude: Tier,
        topic_received: &str,
        roller: &mut dyn Roller,
    ) -> Option<&Phrase> {
        let pool: Vec<&Phrase> =
            self.base_candidates(speaker, listener, TurnKind::Response, attitude);

        // 1. Topic-matched.
        let matched: Vec<&Phrase> = pool
            .iter()
            .copied()
            .filter(|p| topic_gate(p, TurnKind::Response, topic_received))
            .collect();
        if !matched.is_empty() {
            return Some(matched[roller.pick(matched.len())]);
        }

        // 2. Reaction-class match from the faction preference table.
        if topic_received != TOPIC_NONE {
            let reaction = self.preferences.reaction(speaker.faction, topic_received);
            let reacted: Vec<&Phrase> = pool
                .iter()
                .copied()
                .filter(|p| {
                    p.on_topic_reaction
                        .as_ref()
                        .is_some_and(|r| r.iter().any(|tag| tag == reaction.as_str()))
                })
                .collect();
            if !reacted.is_empty() {
                debug!(topic_received, reaction = reaction.as_str(), "response via reaction class");
                return Some(reacted[roller.pick(reacted.len())]);
            }
        }

        // 3. Phrases carrying the social check.
        let checks: Vec<&Phrase> = pool
            .iter()
            .copied()
            .filter(|p| p.outcome == PhraseOutcome::SocialCheck)
            .collect();
        if !checks.is_empty() {
            debug!(topic_received, "response via social-check phrase");
            return Some(checks[roller.pick(checks.len())]);
        }

        // 4. Generic end-of-dialogue phrases with no topic requirement.
        let closers: Vec<&Phrase> = pool
            .iter()
            .copied()
            .filter(|p| p.outcome == PhraseOutcome::EndDialogue && p.on_topic_received.is_none())
            .collect();
        if !closers.is_empty() {
            debug!(topic_received, "response via generic closer");
            return Some(closers[roller.pick(closers.len())]);
        }

        debug!(%attitude, topic_received, "no response phrase found");
        None
    }

    /// Candidates passing every gate except the topic gate. Borrows only
    /// from the corpus, not from the actors.
    fn base_candidates<'a>(
        &'a self,
        speaker: &PhraseActor,
        listener: &PhraseActor,
        turn: TurnKind,
        attitude: Tier,
    ) -> Vec<&'a Phrase> {
        self.book
            .phrases
            .iter()
            .filter(|p| {
                p.turn_types.contains(&turn)
                    && p.attitude == attitude
                    && p.language == speaker.language
                    && from_gate(p, speaker)
                    && to_gate(p, listener)
            })
            .collect()
    }
}

/// From-side gate: faction OR subgroup.
fn from_gate(phrase: &Phrase, speaker: &PhraseActor) -> bool {
    let faction_ok = phrase
        .from_faction
        .iter()
        .any(|f| f.is_wildcard() || *f == speaker.faction);
    let subgroup_ok = match (&phrase.from_subgroup, &speaker.subgroup) {
        (Some(groups), Some(key)) => groups.iter().any(|g| g == key),
        _ => false,
    };
    faction_ok || subgroup_ok
}

/// To-side gate: faction AND (when present) subgroup.
fn to_gate(phrase: &Phrase, listener: &PhraseActor) -> bool {
    let faction_ok = phrase
        .to_faction
        .iter()
        .any(|f| f.is_wildcard() || *f == listener.faction);
    if !faction_ok {
        return false;
    }
    match &phrase.to_subgroup {
        Some(groups) => listener
            .subgroup
            .as_ref()
            .is_some_and(|key| groups.iter().any(|g| g == key)),
        None => true,
    }
}

/// Topic gate, applied only to reply and response turns.
fn topic_gate(phrase: &Phrase, turn: TurnKind, topic_received: &str) -> bool {
    if turn == TurnKind::Greeting {
        return true;
    }
    phrase
        .on_topic_received
        .as_ref()
        .is_some_and(|topics| topics.iter().any(|t| t == topic_received))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::SequenceRoller;

    fn phrase(turn: TurnKind, attitude: Tier, from: &[Faction], to: &[Faction]) -> Phrase {
        Phrase {
            turn_types: vec![turn],
            attitude,
            language: crate::types::DEFAULT_LANGUAGE.to_string(),
            from_faction: from.to_vec(),
            from_subgroup: None,
            to_faction: to.to_vec(),
            to_subgroup: None,
            on_topic_received: None,
            on_topic_reaction: None,
            topic: None,
            text: "...".to_string(),
            outcome: PhraseOutcome::None,
            value: None,
        }
    }

    fn actor(faction: Faction) -> PhraseActor {
        PhraseActor {
            faction,
            subgroup: None,
            language: crate::types::DEFAULT_LANGUAGE.to_string(),
        }
    }

    fn selector(phrases: Vec<Phrase>) -> PhraseSelector {
        PhraseSelector::new(PhraseBook { phrases })
    }

    #[test]
    fn greeting_matches_faction_and_attitude() {
        let p1 = phrase(
            TurnKind::Greeting,
            Tier::H1,
            &[Faction::Rebels],
            &[Faction::Any],
        );
        let sel = selector(vec![p1]);
        let mut roller = SequenceRoller::new();

        let found = sel.find_phrase(
            &actor(Faction::Rebels),
            &actor(Faction::Imperials),
            TurnKind::Greeting,
            Tier::H1,
            TOPIC_NONE,
            &mut roller,
        );
        assert!(found.is_some());

        // Wrong attitude filters it out.
        let miss = sel.find_phrase(
            &actor(Faction::Rebels),
            &actor(Faction::Imperials),
            TurnKind::Greeting,
            Tier::H2,
            TOPIC_NONE,
            &mut roller,
        );
        assert!(miss.is_none());
    }

    #[test]
    fn to_faction_mismatch_returns_none() {
        let p1 = phrase(
            TurnKind::Greeting,
            Tier::H1,
            &[Faction::Rebels],
            &[Faction::Imperials],
        );
        let sel = selector(vec![p1]);
        let mut roller = SequenceRoller::new();

        let miss = sel.find_phrase(
            &actor(Faction::Rebels),
            &actor(Faction::Rebels),
            TurnKind::Greeting,
            Tier::H1,
            TOPIC_NONE,
            &mut roller,
        );
        assert!(miss.is_none());
    }

    #[test]
    fn subgroup_alone_satisfies_from_gate() {
        let mut p = phrase(
            TurnKind::Greeting,
            Tier::Equals,
            &[Faction::Sith],
            &[Faction::Any],
        );
        p.from_subgroup = Some(vec!["darkJedi".to_string()]);
        let sel = selector(vec![p]);
        let mut roller = SequenceRoller::new();

        let mut speaker = actor(Faction::Aliens);
        speaker.subgroup = Some("darkJedi".to_string());

        let found = sel.find_phrase(
            &speaker,
            &actor(Faction::Rebels),
            TurnKind::Greeting,
            Tier::Equals,
            TOPIC_NONE,
            &mut roller,
        );
        assert!(found.is_some(), "subgroup alone must satisfy the from side");
    }

    #[test]
    fn to_subgroup_is_a_hard_and_gate() {
        let mut p = phrase(
            TurnKind::Greeting,
            Tier::Equals,
            &[Faction::Any],
            &[Faction::Any],
        );
        p.to_subgroup = Some(vec!["wookiees".to_string()]);
        let sel = selector(vec![p]);
        let mut roller = SequenceRoller::new();

        // Listener without the subgroup fails despite the faction match.
        let miss = sel.find_phrase(
            &actor(Faction::Rebels),
            &actor(Faction::Aliens),
            TurnKind::Greeting,
            Tier::Equals,
            TOPIC_NONE,
            &mut roller,
        );
        assert!(miss.is_none());

        let mut listener = actor(Faction::Aliens);
        listener.subgroup = Some("wookiees".to_string());
        let found = sel.find_phrase(
            &actor(Faction::Rebels),
            &listener,
            TurnKind::Greeting,
            Tier::Equals,
            TOPIC_NONE,
            &mut roller,
        );
        assert!(found.is_some());
    }

    #[test]
    fn language_must_match_exactly() {
        let mut p = phrase(
            TurnKind::Greeting,
            Tier::Equals,
            &[Faction::Any],
            &[Faction::Any],
        );
        p.language = "language_droid".to_string();
        let sel = selector(vec![p]);
        let mut roller = SequenceRoller::new();

        let miss = sel.find_phrase(
            &actor(Faction::Droids),
            &actor(Faction::Rebels),
            TurnKind::Greeting,
            Tier::Equals,
            TOPIC_NONE,
            &mut roller,
        );
        assert!(miss.is_none());

        let mut speaker = actor(Faction::Droids);
        speaker.language = "language_droid".to_string();
        let found = sel.find_phrase(
            &speaker,
            &actor(Faction::Rebels),
            TurnKind::Greeting,
            Tier::Equals,
            TOPIC_NONE,
            &mut roller,
        );
        assert!(found.is_some());
    }

    #[test]
    fn reply_requires_topic_match() {
        let mut p = phrase(
            TurnKind::Reply,
            Tier::Equals,
            &[Faction::Any],
            &[Faction::Any],
        );
        p.on_topic_received = Some(vec!["bounty".to_string()]);
        let sel = selector(vec![p]);
        let mut roller = SequenceRoller::new();

        let found = sel.find_phrase(
            &actor(Faction::Mandalorians),
            &actor(Faction::Rebels),
            TurnKind::Reply,
            Tier::Equals,
            "bounty",
            &mut roller,
        );
        assert!(found.is_some());

        let miss = sel.find_phrase(
            &actor(Faction::Mandalorians),
            &actor(Faction::Rebels),
            TurnKind::Reply,
            Tier::Equals,
            "salvage",
            &mut roller,
        );
        assert!(miss.is_none());
    }

    #[test]
    fn reply_falls_back_to_none_topic() {
        let mut p = phrase(
            TurnKind::Reply,
            Tier::Equals,
            &[Faction::Any],
            &[Faction::Any],
        );
        p.on_topic_received = Some(vec![TOPIC_NONE.to_string()]);
        let sel = selector(vec![p]);
        let mut roller = SequenceRoller::new();

        let found = sel.find_phrase(
            &actor(Faction::Rebels),
            &actor(Faction::Imperials),
            TurnKind::Reply,
            Tier::Equals,
            "proindependence",
            &mut roller,
        );
        assert!(found.is_some(), "must fall back to the none-topic phrase");
    }

    #[test]
    fn response_ladder_prefers_topic_then_reaction_then_check_then_closer() {
        let mut topical = phrase(
            TurnKind::Response,
            Tier::Equals,
            &[Faction::Any],
            &[Faction::Any],
        );
        topical.on_topic_received = Some(vec!["empire".to_string()]);
        topical.text = "topical".to_string();

        let mut reaction = phrase(
            TurnKind::Response,
            Tier::Equals,
            &[Faction::Any],
            &[Faction::Any],
        );
        reaction.on_topic_reaction = Some(vec!["disliked".to_string()]);
        reaction.text = "reaction".to_string();

        let mut check = phrase(
            TurnKind::Response,
            Tier::Equals,
            &[Faction::Any],
            &[Faction::Any],
        );
        check.outcome = PhraseOutcome::SocialCheck;
        check.text = "check".to_string();

        let mut closer = phrase(
            TurnKind::Response,
            Tier::Equals,
            &[Faction::Any],
            &[Faction::Any],
        );
        closer.outcome = PhraseOutcome::EndDialogue;
        closer.text = "closer".to_string();

        let speaker = actor(Faction::Rebels);
        let listener = actor(Faction::Imperials);

        // All four present: topic match wins.
        let sel = selector(vec![
            topical.clone(),
            reaction.clone(),
            check.clone(),
            closer.clone(),
        ]);
        let mut roller = SequenceRoller::new();
        let found = sel
            .find_response(&speaker, &listener, Tier::Equals, "empire", &mut roller)
            .expect("phrase");
        assert_eq!(found.text, "topical");

        // No topic match: rebels dislike "empire", reaction phrase wins.
        let sel = selector(vec![reaction.clone(), check.clone(), closer.clone()]);
        let mut roller = SequenceRoller::new();
        let found = sel
            .find_response(&speaker, &listener, Tier::Equals, "empire", &mut roller)
            .expect("phrase");
        assert_eq!(found.text, "reaction");

        // No reaction match either: social-check phrase wins.
        let sel = selector(vec![check.clone(), closer.clone()]);
        let mut roller = SequenceRoller::new();
        let found = sel
            .find_response(&speaker, &listener, Tier::Equals, "empire", &mut roller)
            .expect("phrase");
        assert_eq!(found.text, "check");

        // Only the generic closer remains.
        let sel = selector(vec![closer]);
        let mut roller = SequenceRoller::new();
        let found = sel
            .find_response(&speaker, &listener, Tier::Equals, "empire", &mut roller)
            .expect("phrase");
        assert_eq!(found.text, "closer");

        // Nothing at all.
        let sel = selector(vec![]);
        let mut roller = SequenceRoller::new();
        assert!(
            sel.find_response(&speaker, &listener, Tier::Equals, "empire", &mut roller)
                .is_none()
        );
    }

    #[test]
    fn reaction_table_falls_back_to_any_bucket() {
        let prefs = TopicPreferences::default();
        assert_eq!(
            prefs.reaction(Faction::Rebels, "empire"),
            TopicReaction::Disliked
        );
        assert_eq!(
            prefs.reaction(Faction::Clones, "trade"),
            TopicReaction::Liked
        );
        assert_eq!(
            prefs.reaction(Faction::Clones, "podracing"),
            TopicReaction::Neutral
        );
    }

    #[test]
    fn corpus_json_round_trip() {
        let json = r#"{
            "phrases": [{
                "type": ["greeting"],
                "attitude": "h1",
                "language": "language_basic",
                "from_faction": ["rebels"],
                "to_faction": ["any"],
                "topic": "proindependence",
                "text": "Psst. The sector is ours tonight."
            }]
        }"#;
        let book = PhraseBook::from_json(json).expect("parse");
        assert_eq!(book.len(), 1);
        let p = &book.phrases[0];
        assert_eq!(p.turn_types, vec![TurnKind::Greeting]);
        assert_eq!(p.attitude, Tier::H1);
        assert_eq!(p.outcome, PhraseOutcome::None);
        assert_eq!(p.topic_or_none(), "proindependence");
    }

    #[test]
    fn corpus_append_bulk_loads() {
        let mut book = PhraseBook::default();
        assert!(book.is_empty());
        book.append(PhraseBook {
            phrases: vec![phrase(
                TurnKind::Greeting,
                Tier::Equals,
                &[Faction::Any],
                &[Faction::Any],
            )],
        });
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn selected_phrase_outlives_actor_borrows() {
        let p1 = phrase(
            TurnKind::Greeting,
            Tier::Equals,
            &[Faction::Any],
            &[Faction::Any],
        );
        let sel = selector(vec![p1]);
        let mut roller = SequenceRoller::new();

        // The returned reference borrows the corpus, not the actors.
        let found = {
            let speaker = actor(Faction::Rebels);
            let listener = actor(Faction::Imperials);
            sel.find_phrase(
                &speaker,
                &listener,
                TurnKind::Greeting,
                Tier::Equals,
                TOPIC_NONE,
                &mut roller,
            )
        };
        assert_eq!(found.expect("phrase").text, "...");

        let response = {
            let speaker = actor(Faction::Rebels);
            let listener = actor(Faction::Imperials);
            sel.find_response(&speaker, &listener, Tier::Equals, TOPIC_NONE, &mut roller)
        };
        assert!(response.is_none());
    }

    #[test]
    fn uniform_pick_respects_roller() {
        let mut a = phrase(
            TurnKind::Greeting,
            Tier::Equals,
            &[Faction::Any],
            &[Faction::Any],
        );
        a.text = "first".to_string();
        let mut b = a.clone();
        b.text = "second".to_string();
        let sel = selector(vec![a, b]);

        let mut roller = SequenceRoller::new().with_picks(&[1]);
        let found = sel
            .find_phrase(
                &actor(Faction::Rebels),
                &actor(Faction::Rebels),
                TurnKind::Greeting,
                Tier::Equals,
                TOPIC_NONE,
                &mut roller,
            )
            .expect("phrase");
        assert_eq!(found.text, "second");
    }
}
