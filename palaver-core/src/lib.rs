//! # Palaver Core Library
//!
//! Faction relationship and NPC conversation simulation for game worlds.
//!
//! The core is four cooperating pieces:
//!
//! - [`FactionGraph`] — directed inter-faction sentiment scores with
//!   baseline seeding, clamped shifts, a decaying momentum channel, and
//!   attitude/trend classification
//! - [`social_check`] — one contested Cunning-vs-Suspicion or
//!   Charm-vs-Distrust roll per conversation, graded on a 9-step ladder
//! - [`PhraseSelector`] — filtered random selection from a tagged phrase
//!   corpus (faction, subgroup, attitude, language, topic)
//! - [`ConversationController`] — a deadline-driven greeting / reply /
//!   response / outcome state machine over host-provided agents
//!
//! ## Determinism Contract
//!
//! Every stochastic decision goes through an injected [`Roller`] and every
//! deadline through a caller-supplied millisecond clock, so a scripted
//! roller and a fake clock replay an entire conversation bit-for-bit.
//! Gameplay paths never return errors: missing phrases end a conversation
//! early, unknown factions degrade to the wildcard bucket, and malformed
//! stats fall back to documented defaults.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod conversation;
pub mod dice;
pub mod error;
pub mod phrase;
pub mod relationship;
pub mod social_check;
pub mod types;

pub use config::{ConversationConfig, PalaverConfig, RelationshipConfig};
pub use conversation::{
    AudioSink, Conversation, ConversationController, ConversationLog, DisplaySink, NullLog,
    Participant, Stage,
};
pub use dice::{RngRoller, Roller, SequenceRoller};
pub use error::{PalaverError, Result};
pub use phrase::{
    Phrase, PhraseActor, PhraseBook, PhraseOutcome, PhraseSelector, TopicPreferences, TOPIC_NONE,
};
pub use relationship::{default_baselines, BaselineEntry, FactionGraph};
pub use social_check::{Approach, SocialCheck};
pub use types::*;
