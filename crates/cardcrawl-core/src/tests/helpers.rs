//! Test helper functions for setting up battles and enemies.
//!
//! This module provides factory functions and setup utilities that make
//! writing tests more ergonomic and consistent.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use rand_chacha::ChaCha8Rng;

use crate::battle::Battle;
use crate::card::{Card, CardCost, CardType, TargetType};
use crate::effect::effect;
use crate::entity::{Enemy, EnemyBehavior, EnemyTemplate, EntityId, Intent, Player};
use crate::event::BattleEvent;
use crate::host::{BattleHost, BattleResult, Cue, SelectionRequest};

/// Seed used by every helper that builds a battle.
pub const SEED: u64 = 42;

// =============================================================================
// Hosts
// =============================================================================

/// Everything a [`RecordingHost`] observed.
#[derive(Debug, Default)]
pub struct HostLog {
    /// Number of refresh callbacks.
    pub refreshes: usize,
    /// Battle-end callbacks, in order.
    pub results: Vec<BattleResult>,
    /// Presentation cues, in order.
    pub cues: Vec<Cue>,
    /// Selection prompts, in order.
    pub prompts: Vec<String>,
    /// Answers handed out to selection requests, front first.
    pub answers: VecDeque<Vec<usize>>,
}

/// A host that records every callback into a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    /// Shared with the test after the host is moved into the battle.
    pub log: Rc<RefCell<HostLog>>,
}

impl RecordingHost {
    /// Creates a host with an empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BattleHost for RecordingHost {
    fn refresh(&mut self) {
        self.log.borrow_mut().refreshes += 1;
    }

    fn battle_ended(&mut self, result: BattleResult) {
        self.log.borrow_mut().results.push(result);
    }

    fn select(&mut self, request: &SelectionRequest<'_>) -> Vec<usize> {
        let mut log = self.log.borrow_mut();
        log.prompts.push(request.prompt.to_owned());
        log.answers.pop_front().unwrap_or_default()
    }

    fn present(&mut self, cue: Cue, _delay: Duration) {
        self.log.borrow_mut().cues.push(cue);
    }
}

// =============================================================================
// Enemies
// =============================================================================

/// Cycles through a fixed list of intents, one per move.
pub struct Scripted {
    intents: Vec<Intent>,
}

impl EnemyBehavior for Scripted {
    fn next_intent(&self, enemy: &Enemy, _turn: u32, _rng: &mut ChaCha8Rng) -> Intent {
        self.intents[enemy.history().len() % self.intents.len()].clone()
    }
}

/// A fixed-HP enemy that plays `intents` in order, looping.
pub fn scripted(name: &str, hp: i32, intents: Vec<Intent>) -> EnemyTemplate {
    assert!(!intents.is_empty(), "scripted enemy needs at least one intent");
    EnemyTemplate::new(name, hp..=hp, Arc::new(Scripted { intents }))
}

/// A fixed-HP enemy that attacks for `damage` every turn.
pub fn attacker(hp: i32, damage: i32) -> EnemyTemplate {
    scripted("Attacker", hp, vec![Intent::attack("Hit", damage)])
}

// =============================================================================
// Cards
// =============================================================================

/// A 1-cost single-target attack dealing `damage` once.
pub fn test_attack(damage: i32) -> Card {
    Card::new(
        "test_attack",
        "Test Attack",
        CardCost::Fixed(1),
        CardType::Attack,
        TargetType::Single,
        effect(|ctx| {
            ctx.attack_target();
        }),
    )
    .with_damage(damage)
}

/// A 1-cost attack hitting every enemy twice for `damage`.
pub fn double_hit_all(damage: i32) -> Card {
    Card::new(
        "double_hit_all",
        "Double Hit All",
        CardCost::Fixed(1),
        CardType::Attack,
        TargetType::All,
        effect(|ctx| {
            ctx.attack_target();
            ctx.attack_target();
        }),
    )
    .with_damage(damage)
}

// =============================================================================
// Battle Setup
// =============================================================================

/// An 80 HP player holding `deck`.
pub fn player_with(deck: Vec<Card>) -> Player {
    Player::new(80).with_deck(deck)
}

/// Creates and starts a battle with the default host.
pub fn start_battle(player: Player, encounter: &[EnemyTemplate]) -> Battle {
    let mut battle = Battle::new(player, encounter, SEED);
    battle.start();
    battle
}

/// Creates and starts a battle with a recording host.
///
/// # Returns
///
/// The battle and a handle to the host's log.
pub fn start_recorded(
    player: Player,
    encounter: &[EnemyTemplate],
) -> (Battle, Rc<RefCell<HostLog>>) {
    let host = RecordingHost::new();
    let log = Rc::clone(&host.log);
    let mut battle = Battle::new(player, encounter, SEED).with_host(host);
    battle.start();
    (battle, log)
}

/// Index of the first card in hand with content id `id`.
pub fn hand_index(battle: &Battle, id: &str) -> usize {
    battle
        .player()
        .hand
        .iter()
        .position(|card| card.id() == id)
        .unwrap_or_else(|| panic!("no {id} in hand"))
}

/// Living enemy ids, left to right.
pub fn enemy_ids(battle: &Battle) -> Vec<EntityId> {
    battle.arena().living_ids()
}

/// Current HP of an enemy.
pub fn enemy_hp(battle: &Battle, id: EntityId) -> i32 {
    battle
        .arena()
        .get(id)
        .map(|enemy| enemy.combat.hp())
        .unwrap_or_else(|| panic!("no enemy {id}"))
}

/// Targets of every `DamageDealt` event, in order.
pub fn damage_targets(events: &[BattleEvent]) -> Vec<EntityId> {
    events
        .iter()
        .filter_map(|event| match event {
            BattleEvent::DamageDealt { target, .. } => Some(*target),
            _ => None,
        })
        .collect()
}

/// Counts events matching `predicate`.
pub fn count_events(events: &[BattleEvent], predicate: impl Fn(&BattleEvent) -> bool) -> usize {
    events.iter().filter(|event| predicate(event)).count()
}

/// Plays greedily (leftmost playable card, leftmost enemy) until the battle
/// ends or `max_turns` have passed, checking invariants after every action.
pub fn autoplay(battle: &mut Battle, max_turns: u32) {
    while !battle.is_over() && battle.turn() <= max_turns {
        let played = (0..battle.player().hand.len()).any(|index| {
            let affordable = battle
                .player()
                .hand
                .get(index)
                .is_some_and(|card| card.is_affordable(battle.player()));
            affordable && battle.play_card(index, None).is_ok()
        });
        if !played {
            battle.end_turn().expect("end turn during player phase");
        }
        battle.check_invariants().expect("invariants hold");
    }
}
