//! Conversation state machine — greeting, reply, response, outcome.
//!
//! A conversation is a deadline-driven state machine: each stage records
//! the absolute time of its next transition and [`ConversationController::tick`]
//! advances it when the clock passes the deadline. The caller owns the
//! clock (milliseconds as `u64`), so tests drive a whole conversation with
//! a fake clock and a scripted roller.
//!
//! Before every turn the controller re-checks that both participants are
//! still able to talk; a failed check interrupts the conversation without
//! applying any outcome. Outcomes mutate the faction graph exactly once,
//! at the outcome stage, never earlier.
//!
//! World access goes through three seams: [`Participant`] (agent state the
//! controller reads and writes), [`DisplaySink`] / [`AudioSink`]
//! (presentation), and [`ConversationLog`] (diagnostics). All have no-op
//! defaults where sensible so hosts implement only what they need.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::ConversationConfig;
use crate::dice::Roller;
use crate::phrase::{Phrase, PhraseActor, PhraseOutcome, PhraseSelector, TOPIC_NONE};
use crate::relationship::FactionGraph;
use crate::social_check::{self, SocialCheck};
use crate::types::{AgentId, AgentState, Faction, SocialStats, Tier, TurnKind};

// ---------------------------------------------------------------------------
// World seams
// ---------------------------------------------------------------------------

/// Agent-side surface the controller needs from the host world.
///
/// The effective [`Participant::faction`] is what relationship scores key
/// on (allies read as [`Faction::PlayerDroid`]); the
/// [`Participant::dialogue_faction`] is what phrase gates key on (an ally
/// still greets like a member of its original faction).
pub trait Participant {
    /// Stable identifier.
    fn id(&self) -> AgentId;

    /// Display name.
    fn name(&self) -> &str;

    /// Effective faction, used for relationship scores.
    fn faction(&self) -> Faction;

    /// Faction the agent belonged to before conversion, if any.
    fn original_faction(&self) -> Option<Faction>;

    /// Faction used for phrase gating: the original faction when the
    /// agent was converted, the effective faction otherwise.
    fn dialogue_faction(&self) -> Faction {
        self.original_faction().unwrap_or_else(|| self.faction())
    }

    /// Whether the agent has been converted to the player's side.
    fn is_ally(&self) -> bool;

    /// Whether this is the player avatar.
    fn is_player(&self) -> bool;

    /// Whether the agent is dead.
    fn is_dead(&self) -> bool;

    /// Current behavioral state.
    fn state(&self) -> AgentState;

    /// Overwrite the behavioral state.
    fn set_state(&mut self, state: AgentState);

    /// Social stats used for checks and phrase gating.
    fn stats(&self) -> &SocialStats;

    /// Mark the agent as in (or out of) a conversation.
    fn set_conversing(&mut self, conversing: bool);

    /// Record (or clear) the agent this one is talking to.
    fn set_conversation_target(&mut self, target: Option<AgentId>);

    /// Turn the agent to face another.
    fn face_toward(&mut self, other: AgentId);

    /// Toggle the conversation highlight on the agent.
    fn set_highlight(&mut self, on: bool) {
        let _ = on;
    }

    /// Convert the agent to the player's side (h4 outcome).
    fn mark_friend(&mut self);

    /// Revert a converted ally to its original faction (m4 outcome).
    fn renounce_allegiance(&mut self);

    /// Turn the agent hostile to the player and remaining allies,
    /// following desertion.
    fn aggro_player(&mut self);
}

/// Presentation of spoken phrases and outcome effects.
pub trait DisplaySink {
    /// Show one spoken phrase above the speaker.
    fn show_phrase(&mut self, speaker: AgentId, speaker_name: &str, text: &str);

    /// Show the resolved social check (stats, rolls, totals).
    fn show_social_check(&mut self, check: &SocialCheck) {
        let _ = check;
    }

    /// Show a faction relationship change.
    fn show_faction_shift(&mut self, from: Faction, to: Faction, delta: f32) {
        let _ = (from, to, delta);
    }

    /// Start fading out whatever is currently shown for the agent.
    fn begin_fade_out(&mut self, agent: AgentId) {
        let _ = agent;
    }
}

/// Conversation audio cues.
pub trait AudioSink {
    /// Play the speech blip for a speaking agent.
    fn play_conversation_sound(&mut self, speaker: AgentId);
}

/// Structured diagnostics for conversations. Every method has a no-op
/// default body.
pub trait ConversationLog {
    /// A conversation started.
    fn started(&mut self, initiator: AgentId, target: AgentId, attitude: Tier) {
        let _ = (initiator, target, attitude);
    }

    /// A phrase was spoken.
    fn phrase(&mut self, speaker: AgentId, turn: TurnKind, text: &str) {
        let _ = (speaker, turn, text);
    }

    /// No phrase matched for a turn; the conversation ends early.
    fn no_phrase(&mut self, turn: TurnKind) {
        let _ = turn;
    }

    /// The conversation was interrupted before completing.
    fn interrupted(&mut self, stage: Stage) {
        let _ = stage;
    }

    /// The social check was resolved.
    fn social_check(&mut self, check: &SocialCheck) {
        let _ = check;
    }

    /// The outcome was applied to the faction graph.
    fn outcome(&mut self, tier: Tier) {
        let _ = tier;
    }

    /// The conversation ended (completed or interrupted).
    fn ended(&mut self, initiator: AgentId, target: AgentId) {
        let _ = (initiator, target);
    }
}

/// Log that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl ConversationLog for NullLog {}

// ---------------------------------------------------------------------------
// Conversation state
// ---------------------------------------------------------------------------

/// Stage the conversation has most recently completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The greeting has been spoken.
    Greeting,
    /// The reply has been spoken and the check resolved.
    Reply,
    /// The response has been spoken.
    Response,
    /// The outcome has been applied.
    Outcome,
    /// The conversation is over.
    Ended,
}

/// One in-flight conversation between two agents.
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Agent that opened the conversation.
    pub initiator: AgentId,
    /// Agent being talked to.
    pub target: AgentId,
    /// Stage most recently completed.
    pub stage: Stage,
    /// Absolute time of the next stage transition, in milliseconds.
    pub next_transition_at: u64,
    /// Topic raised by the greeting.
    pub greeting_topic: String,
    /// Topic raised by the reply.
    pub reply_topic: String,
    /// The resolved social check, present from the reply stage on.
    pub check: Option<SocialCheck>,
    /// Outcome tag carried by the response phrase.
    pub response_outcome: PhraseOutcome,
    /// Magnitude for a legacy relation-shift response.
    pub response_value: Option<f32>,
    /// Whether the conversation has ended (idempotence guard).
    pub ended: bool,
    /// Earliest time either participant may converse again, stamped at
    /// the end of the conversation.
    pub cooldown_until: Option<u64>,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drives conversations: starts them, advances their stages on tick, and
/// applies their outcomes to the faction graph.
pub struct ConversationController {
    config: ConversationConfig,
    selector: PhraseSelector,
    graph: Arc<RwLock<FactionGraph>>,
    display: Box<dyn DisplaySink>,
    audio: Box<dyn AudioSink>,
    log: Box<dyn ConversationLog>,
    roller: Box<dyn Roller>,
}

impl ConversationController {
    /// Wire a controller to its world seams.
    pub fn new(
        config: ConversationConfig,
        selector: PhraseSelector,
        graph: Arc<RwLock<FactionGraph>>,
        display: Box<dyn DisplaySink>,
        audio: Box<dyn AudioSink>,
        log: Box<dyn ConversationLog>,
        roller: Box<dyn Roller>,
    ) -> Self {
        Self {
            config,
            selector,
            graph,
            display,
            audio,
            log,
            roller,
        }
    }

    /// Shared handle to the faction graph this controller mutates.
    #[must_use]
    pub fn graph(&self) -> Arc<RwLock<FactionGraph>> {
        Arc::clone(&self.graph)
    }

    /// Try to open a conversation at `now_ms`.
    ///
    /// Returns `None` without side effects when either agent refuses
    /// conversations, is dead or busy, or no greeting phrase matches the
    /// initiator's current attitude toward the target. On success both
    /// agents are marked conversing and facing each other, the greeting
    /// is spoken, and the returned conversation is ready to tick.
    pub fn start(
        &mut self,
        initiator: &mut dyn Participant,
        target: &mut dyn Participant,
        now_ms: u64,
    ) -> Option<Conversation> {
        if initiator.id() == target.id() {
            return None;
        }
        if initiator.stats().no_conversation || target.stats().no_conversation {
            debug!(initiator = %initiator.id(), target = %target.id(), "conversation refused");
            return None;
        }
        if initiator.is_dead() || target.is_dead() {
            return None;
        }
        if !can_participate(initiator) || !can_participate(target) {
            return None;
        }

        let attitude = self
            .graph
            .read()
            .attitude(initiator.faction(), target.dialogue_faction());

        let greeting = self
            .selector
            .find_phrase(
                &actor_of(initiator),
                &actor_of(target),
                TurnKind::Greeting,
                attitude,
                TOPIC_NONE,
                &mut *self.roller,
            )?
            .clone();

        initiator.set_conversing(true);
        target.set_conversing(true);
        initiator.set_conversation_target(Some(target.id()));
        target.set_conversation_target(Some(initiator.id()));
        initiator.face_toward(target.id());
        target.face_toward(initiator.id());
        initiator.set_highlight(true);
        target.set_highlight(true);

        info!(
            initiator = %initiator.id(),
            target = %target.id(),
            %attitude,
            topic = greeting.topic_or_none(),
            "conversation started"
        );
        self.log.started(initiator.id(), target.id(), attitude);
        self.speak(initiator, TurnKind::Greeting, &greeting);

        Some(Conversation {
            initiator: initiator.id(),
            target: target.id(),
            stage: Stage::Greeting,
            next_transition_at: now_ms + self.config.reply_delay_ms,
            greeting_topic: greeting.topic_or_none().to_string(),
            reply_topic: TOPIC_NONE.to_string(),
            check: None,
            response_outcome: PhraseOutcome::None,
            response_value: None,
            ended: false,
            cooldown_until: None,
        })
    }

    /// Advance the conversation if its deadline has passed.
    ///
    /// Safe to call every frame; does nothing before the deadline and
    /// nothing after the conversation has ended.
    pub fn tick(
        &mut self,
        convo: &mut Conversation,
        initiator: &mut dyn Participant,
        target: &mut dyn Participant,
        now_ms: u64,
        paused: bool,
    ) {
        if convo.ended || now_ms < convo.next_transition_at {
            return;
        }

        match convo.stage {
            Stage::Greeting => self.advance_to_reply(convo, initiator, target, now_ms, paused),
            Stage::Reply => self.advance_to_response(convo, initiator, target, now_ms, paused),
            Stage::Response => {
                self.execute_outcome(convo, initiator, target);
                convo.stage = Stage::Outcome;
                self.end(convo, initiator, target, now_ms);
            }
            Stage::Outcome | Stage::Ended => {}
        }
    }

    /// End the conversation, releasing both agents and stamping the
    /// cooldown. Idempotent.
    pub fn end(
        &mut self,
        convo: &mut Conversation,
        initiator: &mut dyn Participant,
        target: &mut dyn Participant,
        now_ms: u64,
    ) {
        if convo.ended {
            return;
        }
        convo.ended = true;
        convo.stage = Stage::Ended;

        self.release(initiator);
        self.release(target);

        let spread = self
            .config
            .cooldown_max_ms
            .saturating_sub(self.config.cooldown_min_ms);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let jitter = (spread as f32 * self.roller.roll_percent() / 100.0) as u64;
        convo.cooldown_until = Some(now_ms + self.config.cooldown_min_ms + jitter);

        info!(initiator = %convo.initiator, target = %convo.target, "conversation ended");
        self.log.ended(convo.initiator, convo.target);
    }

    /// Return one agent to its resting state. Dead agents are left alone.
    fn release(&mut self, agent: &mut dyn Participant) {
        if agent.is_dead() {
            return;
        }
        agent.set_conversing(false);
        agent.set_conversation_target(None);
        agent.set_highlight(false);
        self.display.begin_fade_out(agent.id());
        if !agent.is_player() && agent.state() == AgentState::Conversing {
            let resting = if agent.is_ally() {
                AgentState::Following
            } else {
                AgentState::Idling
            };
            agent.set_state(resting);
        }
    }

    // -- stage transitions --------------------------------------------------

    fn advance_to_reply(
        &mut self,
        convo: &mut Conversation,
        initiator: &mut dyn Participant,
        target: &mut dyn Participant,
        now_ms: u64,
        paused: bool,
    ) {
        if self.interrupt_if_unable(convo, initiator, target, now_ms, paused) {
            return;
        }

        let attitude = self
            .graph
            .read()
            .attitude(target.faction(), initiator.dialogue_faction());
        let Some(reply) = self
            .selector
            .find_phrase(
                &actor_of(target),
                &actor_of(initiator),
                TurnKind::Reply,
                attitude,
                &convo.greeting_topic,
                &mut *self.roller,
            )
            .cloned()
        else {
            // No reply means no check is ever rolled for this conversation.
            self.log.no_phrase(TurnKind::Reply);
            self.end(convo, initiator, target, now_ms);
            return;
        };

        let check = social_check::resolve(
            initiator.id(),
            target.id(),
            initiator.stats(),
            target.stats(),
            &mut *self.roller,
        );
        self.display.show_social_check(&check);
        self.log.social_check(&check);
        convo.check = Some(check);

        self.speak(target, TurnKind::Reply, &reply);
        convo.reply_topic = reply.topic_or_none().to_string();
        convo.stage = Stage::Reply;
        convo.next_transition_at = now_ms + self.config.response_delay_ms;
    }

    fn advance_to_response(
        &mut self,
        convo: &mut Conversation,
        initiator: &mut dyn Participant,
        target: &mut dyn Participant,
        now_ms: u64,
        paused: bool,
    ) {
        let paused = paused && self.config.recheck_pause_before_response;
        if self.interrupt_if_unable(convo, initiator, target, now_ms, paused) {
            return;
        }

        let attitude = self
            .graph
            .read()
            .attitude(initiator.faction(), target.dialogue_faction());
        let Some(response) = self
            .selector
            .find_response(
                &actor_of(initiator),
                &actor_of(target),
                attitude,
                &convo.reply_topic,
                &mut *self.roller,
            )
            .cloned()
        else {
            self.log.no_phrase(TurnKind::Response);
            self.end(convo, initiator, target, now_ms);
            return;
        };

        self.speak(initiator, TurnKind::Response, &response);
        convo.response_outcome = response.outcome;
        convo.response_value = response.value;
        convo.stage = Stage::Response;
        convo.next_transition_at = now_ms + self.config.outcome_delay_ms;
    }

    /// Apply the stored social check to the faction graph, plus any legacy
    /// relation-shift carried by the response phrase. Runs at most once per
    /// conversation; every conversation that reaches this stage applies its
    /// check regardless of the response phrase's outcome tag.
    fn execute_outcome(
        &mut self,
        convo: &mut Conversation,
        initiator: &mut dyn Participant,
        target: &mut dyn Participant,
    ) {
        let from = target.dialogue_faction();
        let to = initiator.faction();

        if let Some(check) = convo.check.as_ref() {
            let tier = check.tier;
            let shift = tier.relationship_shift();
            self.graph.write().shift_base(from, to, shift);
            self.display.show_faction_shift(from, to, shift);
            self.log.outcome(tier);

            match tier {
                Tier::H4 => {
                    info!(target = %target.id(), "target converted to friend");
                    target.mark_friend();
                    let mut graph = self.graph.write();
                    let push = graph.config().physics_push;
                    graph.register_ally(from);
                    graph.apply_physics(from, to, push);
                }
                Tier::M4 if initiator.is_ally() => {
                    info!(initiator = %initiator.id(), "ally deserts");
                    let original = initiator.dialogue_faction();
                    initiator.renounce_allegiance();
                    initiator.aggro_player();
                    let mut graph = self.graph.write();
                    let push = graph.config().physics_push;
                    graph.apply_physics(original, Faction::PlayerDroid, -push);
                }
                _ => {}
            }
        } else {
            warn!(
                initiator = %convo.initiator,
                target = %convo.target,
                "conversation reached outcome with no resolved check"
            );
        }

        if convo.response_outcome == PhraseOutcome::RelationShift {
            if let Some(value) = convo.response_value {
                self.graph.write().shift_base(from, to, value);
                self.display.show_faction_shift(from, to, value);
            } else {
                warn!("relation-shift outcome with no value");
            }
        }
    }

    // -- helpers ------------------------------------------------------------

    /// Interrupt and end the conversation if either participant can no
    /// longer talk, or the game is paused. Returns `true` when it did.
    fn interrupt_if_unable(
        &mut self,
        convo: &mut Conversation,
        initiator: &mut dyn Participant,
        target: &mut dyn Participant,
        now_ms: u64,
        paused: bool,
    ) -> bool {
        let unable = paused
            || initiator.is_dead()
            || target.is_dead()
            || !can_participate(initiator)
            || !can_participate(target);
        if unable {
            debug!(
                initiator = %convo.initiator,
                target = %convo.target,
                stage = ?convo.stage,
                paused,
                "conversation interrupted"
            );
            self.log.interrupted(convo.stage);
            self.end(convo, initiator, target, now_ms);
        }
        unable
    }

    fn speak(&mut self, speaker: &mut dyn Participant, turn: TurnKind, phrase: &Phrase) {
        self.audio.play_conversation_sound(speaker.id());
        self.display
            .show_phrase(speaker.id(), speaker.name(), &phrase.text);
        self.log.phrase(speaker.id(), turn, &phrase.text);
    }
}

/// States in which an agent may hold a conversation. Allies keep talking
/// while following the player.
fn can_participate(agent: &dyn Participant) -> bool {
    match agent.state() {
        AgentState::Idling | AgentState::Conversing => true,
        AgentState::Following => agent.is_ally(),
        AgentState::Attacking | AgentState::Fleeing => false,
    }
}

fn actor_of(agent: &dyn Participant) -> PhraseActor {
    PhraseActor {
        faction: agent.dialogue_faction(),
        subgroup: agent.stats().group_key.clone(),
        language: agent.stats().language.clone(),
    }
}
