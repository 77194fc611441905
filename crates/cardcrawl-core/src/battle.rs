//! The battle engine: turn state machine, pile transitions, and the
//! engine-level damage pipeline.
//!
//! [`Battle`] owns the player and the [`Arena`] for the duration of an
//! encounter and drives the cycle:
//!
//! ```text
//! Idle --start--> Player --end_turn--> Enemy --enemy_turn--> Player ...
//!                    \                    \
//!                     +--> Won / Lost <----+     (sticky)
//! ```
//!
//! # Architecture
//!
//! - Player actions ([`Battle::play_card`], [`Battle::use_potion`],
//!   [`Battle::end_turn`]) are guarded by phase, the terminal state, and a
//!   `processing` flag. A rejected action returns [`ActionRejected`] and
//!   changes nothing; re-entrant calls made while a card resolves are dropped.
//! - Every HP change goes through [`Battle::deal_damage`], which applies the
//!   per-entity pipeline, routes reflect damage, performs the player-only
//!   bookkeeping, fires `on_take_damage`, and checks for the end of battle.
//! - All randomness comes from one seeded `ChaCha8Rng`, so identical seeds
//!   and inputs produce identical event logs.
//!
//! # Example
//!
//! ```
//! use cardcrawl_core::battle::{Battle, Phase};
//! use cardcrawl_core::content::{cards, enemies};
//! use cardcrawl_core::entity::Player;
//!
//! let player = Player::new(80).with_deck(cards::starter_deck());
//! let mut battle = Battle::new(player, &[enemies::cultist()], 7);
//! battle.start();
//!
//! assert_eq!(battle.phase(), Phase::Player);
//! assert_eq!(battle.player().hand.len(), 5);
//! assert_eq!(battle.player().energy(), 3);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::arena::Arena;
use crate::card::pile::PileKind;
use crate::card::{Card, CardType, CardUid, TargetType};
use crate::config::BattleConfig;
use crate::effect::{run_targeted, EffectContext};
use crate::entity::enemy::EnemyContext;
use crate::entity::status::{StatusChange, StatusKind};
use crate::entity::{DamageSource, Enemy, EnemyTemplate, EntityId, Intent, Player};
use crate::error::{ActionRejected, InvariantViolation};
use crate::event::{BattleEvent, EventLog};
use crate::hook::{HookPoints, Relic};
use crate::host::{BattleHost, BattleResult, Cue, NullHost, SelectionRequest};
use crate::view::BattleView;

/// Battle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Created but not started.
    Idle,
    /// The player may act.
    Player,
    /// Enemies are acting.
    Enemy,
    /// Every enemy is dead. Terminal.
    Won,
    /// The player is dead. Terminal.
    Lost,
}

impl Phase {
    /// Returns true for `Won` and `Lost`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Player => "player",
            Self::Enemy => "enemy",
            Self::Won => "won",
            Self::Lost => "lost",
        };
        f.write_str(name)
    }
}

/// A single encounter.
pub struct Battle {
    config: BattleConfig,
    player: Player,
    arena: Arena,
    phase: Phase,
    turn: u32,
    processing: bool,
    rng: ChaCha8Rng,
    host: Box<dyn BattleHost>,
    events: EventLog,
    next_card_uid: u64,
    card_count: usize,
}

impl Battle {
    /// Creates a battle against `encounter`, spawning enemies left to right.
    ///
    /// # Arguments
    ///
    /// * `player` - The player, owned by the battle until [`Battle::finish`]
    /// * `encounter` - Enemy templates, left to right
    /// * `seed` - Seed for every random decision in the battle
    #[must_use]
    pub fn new(player: Player, encounter: &[EnemyTemplate], seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut arena = Arena::new();
        let mut events = EventLog::new();
        for template in encounter {
            let id = arena.spawn(template, &mut rng);
            events.push(BattleEvent::EnemySpawned {
                enemy: id,
                name: template.name.clone(),
            });
        }
        Self {
            config: BattleConfig::default(),
            player,
            arena,
            phase: Phase::Idle,
            turn: 0,
            processing: false,
            rng,
            host: Box::new(NullHost),
            events,
            next_card_uid: 0,
            card_count: 0,
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the host.
    #[must_use]
    pub fn with_host(mut self, host: impl BattleHost + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// The player.
    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// The player, mutably.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// The enemies.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The enemies, mutably.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current turn (1-based once started).
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Returns true while a card or potion is resolving.
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        self.processing
    }

    /// Returns true once the battle is won or lost.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// The outcome, once decided.
    #[must_use]
    pub const fn result(&self) -> Option<BattleResult> {
        match self.phase {
            Phase::Won => Some(BattleResult::Win),
            Phase::Lost => Some(BattleResult::Lose),
            _ => None,
        }
    }

    /// The battle's random stream, for content that needs randomness.
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn events(&self) -> &[BattleEvent] {
        self.events.events()
    }

    /// Drains the event log.
    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        self.events.take_events()
    }

    /// A serialisable snapshot with previews.
    #[must_use]
    pub fn view(&self) -> BattleView {
        BattleView::capture(self)
    }

    /// Damage per hit the card at `hand_index` would deal to `target` now.
    #[must_use]
    pub fn preview_damage(&self, hand_index: usize, target: EntityId) -> Option<i32> {
        let card = self.player.hand.get(hand_index)?;
        let enemy = self.arena.get(target)?;
        card.final_damage(&self.player, &enemy.combat)
    }

    /// Ends the encounter and hands the player back, with battle-scoped state
    /// (piles, block, statuses) cleared.
    #[must_use]
    pub fn finish(mut self) -> Player {
        self.player.reset_for_battle();
        self.player
    }

    // =========================================================================
    // Internal plumbing
    // =========================================================================

    fn emit(&mut self, event: BattleEvent) {
        trace!(?event, "battle event");
        self.events.push(event);
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, turn = self.turn, "phase changed");
            self.phase = phase;
            self.emit(BattleEvent::PhaseChanged { phase });
        }
    }

    fn refresh(&mut self) {
        self.host.refresh();
    }

    fn present_hit(&mut self, target: EntityId, amount: i32) {
        let delay = self.config.hit_delay();
        self.host.present(Cue::Hit { target, amount }, delay);
    }

    /// Calls `f` for every relic subscribed to `point`, in acquisition order.
    fn dispatch<F>(&mut self, point: HookPoints, mut f: F)
    where
        F: FnMut(&dyn Relic, &mut Self),
    {
        let subscribers = self.player.relics().subscribers(point);
        for relic in subscribers {
            trace!(relic = %relic.declaration().id, ?point, "hook");
            f(relic.as_ref(), self);
        }
    }

    fn adopt(&mut self, mut card: Card) -> Card {
        let uid = CardUid::new(self.next_card_uid);
        self.next_card_uid += 1;
        self.card_count += 1;
        card.set_temporary_cost(None);
        card.with_uid(uid)
    }

    fn ensure_player_action(&self) -> Result<(), ActionRejected> {
        if self.phase.is_terminal() {
            return Err(ActionRejected::BattleOver);
        }
        if self.processing {
            return Err(ActionRejected::Busy);
        }
        if self.phase != Phase::Player {
            return Err(ActionRejected::WrongPhase(self.phase));
        }
        Ok(())
    }

    fn resolve_target(
        &self,
        shape: TargetType,
        requested: Option<EntityId>,
    ) -> Result<Option<EntityId>, ActionRejected> {
        if !shape.needs_enemy() {
            return Ok(None);
        }
        let fallback = self.arena.first_living().ok_or(ActionRejected::NoTarget)?;
        match shape {
            TargetType::Single => Ok(Some(
                requested
                    .filter(|id| self.arena.is_alive(*id))
                    .unwrap_or(fallback),
            )),
            _ => Ok(None),
        }
    }

    pub(crate) fn notify_card_play(&mut self, card: &Card, target: Option<EntityId>, x_value: u32) {
        self.emit(BattleEvent::CardPlayed {
            card: card.id().to_owned(),
            uid: card.uid(),
            target,
            x_value,
        });
        self.dispatch(HookPoints::CARD_PLAY, |relic, battle| {
            relic.on_card_play(battle, card);
        });
    }

    pub(crate) fn notify_after_card_play(&mut self, card: &Card) {
        self.dispatch(HookPoints::AFTER_CARD_PLAY, |relic, battle| {
            relic.after_card_play(battle, card);
        });
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Starts the battle: resets battle-scoped player state, builds the
    /// shuffled draw pile from clones of the master deck, fires
    /// `on_battle_start`, and begins turn 1. Ignored unless `Idle`.
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            debug!(phase = %self.phase, "start ignored");
            return;
        }
        self.player.reset_for_battle();
        self.card_count = 0;
        let deck = self.player.master_deck().to_vec();
        for card in deck {
            let card = self.adopt(card);
            self.player.draw_pile.push(card);
        }
        self.player.draw_pile.shuffle(&mut self.rng);
        self.turn = 1;
        debug!(
            cards = self.card_count,
            enemies = self.arena.len(),
            "battle started"
        );

        self.dispatch(HookPoints::BATTLE_START, |relic, battle| {
            relic.on_battle_start(battle);
        });
        self.check_battle_end();
        self.start_player_turn();
    }

    /// Begins a player turn: turn-start conversions, energy refill, block
    /// reset, draw, `on_player_turn_start`, then every living enemy declares
    /// its intent.
    pub fn start_player_turn(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        self.set_phase(Phase::Player);

        let statuses = self.player.combat.statuses_mut();
        let demon_form = statuses.get(StatusKind::DemonForm);
        if demon_form > 0 {
            statuses.adjust(StatusKind::Strength, demon_form);
        }
        statuses.remove(StatusKind::FlameBarrier);
        if demon_form > 0 {
            self.emit(BattleEvent::StatusApplied {
                target: EntityId::PLAYER,
                kind: StatusKind::Strength,
                amount: demon_form,
            });
        }

        self.player.refill_energy();
        // TODO: honour barricade here once block retention is settled for the player.
        self.player.combat.clear_block();
        self.emit(BattleEvent::TurnStarted { turn: self.turn });

        let hand_size = self.config.hand_size;
        self.draw_cards(hand_size);

        self.dispatch(HookPoints::PLAYER_TURN_START, |relic, battle| {
            relic.on_player_turn_start(battle);
        });
        self.update_intents();
        self.refresh();
    }

    fn update_intents(&mut self) {
        for id in self.arena.living_ids() {
            let Some(enemy) = self.arena.get(id) else {
                continue;
            };
            let intent = enemy.behavior().next_intent(enemy, self.turn, &mut self.rng);
            self.emit(BattleEvent::IntentDeclared {
                enemy: id,
                name: intent.name.clone(),
                kind: intent.kind,
            });
            if let Some(enemy) = self.arena.get_mut(id) {
                enemy.set_next_move(Some(intent));
            }
        }
    }

    /// Decides the battle if it is over. Idempotent.
    ///
    /// Victory (every enemy dead or gone) fires `on_victory` and then tells
    /// the host; defeat tells the host. Either happens at most once.
    pub fn check_battle_end(&mut self) -> Option<BattleResult> {
        if let Some(result) = self.result() {
            return Some(result);
        }
        if self.phase == Phase::Idle {
            return None;
        }
        let result = if self.arena.all_dead() {
            BattleResult::Win
        } else if !self.player.combat.is_alive() {
            BattleResult::Lose
        } else {
            return None;
        };

        debug!(?result, turn = self.turn, "battle ended");
        match result {
            BattleResult::Win => {
                self.set_phase(Phase::Won);
                self.dispatch(HookPoints::VICTORY, |relic, battle| {
                    relic.on_victory(battle);
                });
            }
            BattleResult::Lose => self.set_phase(Phase::Lost),
        }
        self.emit(BattleEvent::BattleEnded { result });
        self.host.battle_ended(result);
        Some(result)
    }

    // =========================================================================
    // Player actions
    // =========================================================================

    /// Plays the card at `hand_index` against `target`.
    ///
    /// For single-target cards a dead or absent `target` falls back to the
    /// leftmost living enemy. On success the card goes to the exhaust pile
    /// (exhausting cards, powers) or the discard pile.
    ///
    /// # Errors
    ///
    /// The reason the play was refused; nothing changes on error.
    pub fn play_card(
        &mut self,
        hand_index: usize,
        target: Option<EntityId>,
    ) -> Result<(), ActionRejected> {
        let result = self.try_play_card(hand_index, target);
        if let Err(reason) = &result {
            debug!(%reason, hand_index, "card play rejected");
        }
        result
    }

    fn try_play_card(
        &mut self,
        hand_index: usize,
        target: Option<EntityId>,
    ) -> Result<(), ActionRejected> {
        self.ensure_player_action()?;
        let card = self
            .player
            .hand
            .get(hand_index)
            .ok_or(ActionRejected::NoSuchCard(hand_index))?;
        if card.card_type() == CardType::Attack
            && self.player.combat.statuses().has(StatusKind::Entangled)
        {
            return Err(ActionRejected::Entangled);
        }
        let target = self.resolve_target(card.target(), target)?;
        let Some(mut card) = self.player.hand.remove(hand_index) else {
            return Err(ActionRejected::NoSuchCard(hand_index));
        };

        self.processing = true;
        let outcome = card.play(self, target, false);
        self.processing = false;

        if let Err(reason) = outcome {
            self.player.hand.insert(hand_index, card);
            return Err(reason);
        }
        self.route_played_card(card);
        self.check_battle_end();
        self.refresh();
        Ok(())
    }

    fn route_played_card(&mut self, card: Card) {
        if card.is_exhaust() {
            self.exhaust_card(card);
        } else if card.card_type() == CardType::Power {
            self.player.exhaust_pile.push(card);
        } else {
            self.player.discard_pile.push(card);
        }
    }

    /// Uses the potion in `slot`.
    ///
    /// # Errors
    ///
    /// Same guards as [`Battle::play_card`], plus
    /// [`ActionRejected::NoSuchPotion`] for an empty slot.
    pub fn use_potion(
        &mut self,
        slot: usize,
        target: Option<EntityId>,
    ) -> Result<(), ActionRejected> {
        self.ensure_player_action()?;
        let potion = self
            .player
            .potion(slot)
            .cloned()
            .ok_or(ActionRejected::NoSuchPotion(slot))?;
        let target = self.resolve_target(potion.target(), target)?;
        self.player.take_potion(slot);
        debug!(potion = potion.id(), ?target, "potion used");

        self.processing = true;
        self.emit(BattleEvent::PotionUsed {
            potion: potion.id().to_owned(),
        });
        let effect = potion.effect();
        run_targeted(self, effect.as_ref(), potion.target(), target, None, 0);
        self.dispatch(HookPoints::POTION_USE, |relic, battle| {
            relic.on_potion_use(battle, &potion);
        });
        self.processing = false;

        self.check_battle_end();
        self.refresh();
        Ok(())
    }

    /// Ends the player's turn and runs the enemy turn.
    ///
    /// In order: in-hand damage (burns), ethereal cards exhausted and the rest
    /// discarded, temporary costs cleared, `on_turn_end`, the player's
    /// turn-end tick, then the enemy phase.
    ///
    /// # Errors
    ///
    /// Rejected outside the player phase or while a card resolves.
    pub fn end_turn(&mut self) -> Result<(), ActionRejected> {
        self.ensure_player_action()?;
        debug!(turn = self.turn, "player turn ended");

        let burns: Vec<i32> = self
            .player
            .hand
            .iter()
            .map(Card::hand_end_damage)
            .filter(|damage| *damage > 0)
            .collect();
        for damage in burns {
            self.deal_damage(DamageSource::Unsourced, EntityId::PLAYER, damage);
        }
        if self.phase.is_terminal() {
            self.refresh();
            return Ok(());
        }

        for card in self.player.hand.drain() {
            if card.is_ethereal() {
                self.exhaust_card(card);
            } else {
                self.player.discard_pile.push(card);
            }
        }
        for kind in PileKind::ALL {
            for card in self.player.pile_mut(kind).iter_mut() {
                card.set_temporary_cost(None);
            }
        }

        self.dispatch(HookPoints::TURN_END, |relic, battle| {
            relic.on_turn_end(battle);
        });

        let report = self.player.combat.statuses_mut().tick();
        if report.block > 0 {
            self.player_gain_block_raw(report.block);
        }
        if report.heal > 0 {
            self.heal_player(report.heal);
        }
        if self.phase.is_terminal() {
            self.refresh();
            return Ok(());
        }

        self.set_phase(Phase::Enemy);
        self.refresh();
        let delay = self.config.enemy_turn_delay();
        self.host.present(Cue::EnemyTurn, delay);
        self.enemy_turn();
        Ok(())
    }

    // =========================================================================
    // Enemy turn
    // =========================================================================

    /// Runs every living enemy's displayed intent, ticks enemy statuses,
    /// advances the turn, and starts the next player turn if the battle goes
    /// on. Does nothing outside the enemy phase.
    pub fn enemy_turn(&mut self) {
        if self.phase != Phase::Enemy {
            return;
        }
        for id in self.arena.living_ids() {
            if self.phase.is_terminal() {
                break;
            }
            let Some(enemy) = self.arena.get_mut(id) else {
                continue;
            };
            if !enemy.is_alive() {
                continue;
            }
            enemy.combat.clear_block();
            let Some(intent) = enemy.take_next_move() else {
                continue;
            };
            self.execute_intent(id, &intent);
        }

        if !self.phase.is_terminal() {
            for id in self.arena.living_ids() {
                let Some(enemy) = self.arena.get_mut(id) else {
                    continue;
                };
                let report = enemy.combat.statuses_mut().tick();
                let block = enemy.combat.gain_block_raw(report.block);
                let healed = enemy.combat.heal(report.heal);
                if block > 0 {
                    self.emit(BattleEvent::BlockGained {
                        target: id,
                        amount: block,
                    });
                }
                if healed > 0 {
                    self.emit(BattleEvent::Healed {
                        target: id,
                        amount: healed,
                    });
                }
            }
        }

        self.turn += 1;
        if !self.phase.is_terminal() && self.player.combat.is_alive() {
            self.start_player_turn();
        }
    }

    fn execute_intent(&mut self, actor: EntityId, intent: &Intent) {
        debug!(enemy = %actor, intent = %intent.name, "enemy acts");
        let delay = self.config.hit_delay();
        self.host.present(Cue::EnemyAction { enemy: actor }, delay);

        if let Some(value) = intent.attack_value() {
            for _ in 0..intent.hits() {
                if self.phase.is_terminal() {
                    break;
                }
                let Some(damage) = self
                    .arena
                    .get(actor)
                    .filter(|enemy| enemy.is_alive())
                    .map(|enemy| enemy.combat.calculate_damage(value))
                else {
                    break;
                };
                self.present_hit(EntityId::PLAYER, damage);
                self.deal_damage(DamageSource::Entity(actor), EntityId::PLAYER, damage);
            }
        }

        if let Some(effect) = &intent.effect {
            if !self.phase.is_terminal() && self.arena.is_alive(actor) {
                let mut ctx = EnemyContext::new(self, actor);
                effect.apply(&mut ctx);
            }
        }

        if let Some(enemy) = self.arena.get_mut(actor) {
            enemy.record_move(&intent.name);
        }
        self.emit(BattleEvent::EnemyActed {
            enemy: actor,
            name: intent.name.clone(),
        });
        self.refresh();
    }

    // =========================================================================
    // Damage, block, statuses, healing
    // =========================================================================

    /// Applies a hit of `amount` to `target` and everything it triggers.
    ///
    /// # Processing Order
    ///
    /// 1. The target's pipeline (vulnerable, block, HP, curl up, plated armor)
    /// 2. Reflect damage back to an attacking entity (never reflected again)
    /// 3. Player only: HP-loss count, `rupture` on unsourced damage,
    ///    `on_take_damage`
    /// 4. Battle-end check
    ///
    /// Dead or absent enemies are not hit.
    ///
    /// # Returns
    ///
    /// HP actually removed.
    pub fn deal_damage(&mut self, source: DamageSource, target: EntityId, amount: i32) -> i32 {
        let outcome = if target.is_player() {
            self.player.combat.take_damage(amount, source)
        } else {
            match self.arena.get_mut(target) {
                Some(enemy) if enemy.is_alive() => enemy.combat.take_damage(amount, source),
                _ => return 0,
            }
        };

        self.emit(BattleEvent::DamageDealt {
            source,
            target,
            amount: outcome.incoming,
            blocked: outcome.blocked,
            hp_lost: outcome.hp_lost,
        });
        if outcome.curl_up_block > 0 {
            self.emit(BattleEvent::BlockGained {
                target,
                amount: outcome.curl_up_block,
            });
        }
        if outcome.killed && !target.is_player() {
            debug!(enemy = %target, "enemy died");
            self.emit(BattleEvent::EnemyDied { enemy: target });
        }

        if outcome.reflect > 0 {
            if let Some(attacker) = source.attacker() {
                self.deal_damage(DamageSource::Reflect, attacker, outcome.reflect);
            }
        }

        if target.is_player() && outcome.hp_lost > 0 {
            self.player.record_hp_loss();
            if source == DamageSource::Unsourced {
                let rupture = self.player.combat.statuses().get(StatusKind::Rupture);
                if rupture > 0 {
                    self.player
                        .combat
                        .statuses_mut()
                        .adjust(StatusKind::Strength, rupture);
                    self.emit(BattleEvent::StatusApplied {
                        target,
                        kind: StatusKind::Strength,
                        amount: rupture,
                    });
                }
            }
            let hp_lost = outcome.hp_lost;
            self.dispatch(HookPoints::TAKE_DAMAGE, |relic, battle| {
                relic.on_take_damage(battle, hp_lost);
            });
        }

        self.check_battle_end();
        outcome.hp_lost
    }

    /// A player attack hit on `target` (with a presentation cue).
    pub(crate) fn player_hit(&mut self, target: EntityId, damage: i32) -> i32 {
        self.present_hit(target, damage);
        self.deal_damage(DamageSource::Entity(EntityId::PLAYER), target, damage)
    }

    /// The player gains exactly `amount` block, notifying `on_gain_block`
    /// subscribers. Returns the block gained.
    pub fn player_gain_block_raw(&mut self, amount: i32) -> i32 {
        let gained = self.player.combat.gain_block_raw(amount);
        if gained > 0 {
            self.emit(BattleEvent::BlockGained {
                target: EntityId::PLAYER,
                amount: gained,
            });
            self.dispatch(HookPoints::GAIN_BLOCK, |relic, battle| {
                relic.on_gain_block(battle, gained);
            });
        }
        gained
    }

    /// An enemy gains block through its dexterity and frail.
    pub fn enemy_gain_block(&mut self, id: EntityId, base: i32) -> i32 {
        let gained = match self.arena.get_mut(id) {
            Some(enemy) if enemy.is_alive() => enemy.combat.gain_block(base),
            _ => return 0,
        };
        if gained > 0 {
            self.emit(BattleEvent::BlockGained {
                target: id,
                amount: gained,
            });
        }
        gained
    }

    /// Heals the player through the relic folds. Returns the HP restored.
    pub fn heal_player(&mut self, amount: i32) -> i32 {
        let healed = self.player.heal(amount);
        if healed > 0 {
            self.emit(BattleEvent::Healed {
                target: EntityId::PLAYER,
                amount: healed,
            });
        }
        healed
    }

    /// Adds energy to the player.
    pub fn gain_energy(&mut self, amount: u32) {
        self.player.gain_energy(amount);
    }

    /// Applies `amount` stacks of `kind` to `target`.
    ///
    /// `on_apply_status` fires when the player is the source and the status
    /// took hold.
    ///
    /// # Returns
    ///
    /// True if the ledger changed (false when negated by artifact, when
    /// `amount` is zero, or when the target is dead or absent).
    pub fn apply_status(
        &mut self,
        source: Option<EntityId>,
        target: EntityId,
        kind: StatusKind,
        amount: i32,
    ) -> bool {
        let change = if target.is_player() {
            self.player.combat.statuses_mut().add(kind, amount)
        } else {
            match self.arena.get_mut(target) {
                Some(enemy) if enemy.is_alive() => enemy.combat.statuses_mut().add(kind, amount),
                _ => return false,
            }
        };
        match change {
            StatusChange::Applied(_) => {
                self.emit(BattleEvent::StatusApplied {
                    target,
                    kind,
                    amount,
                });
                if source == Some(EntityId::PLAYER) {
                    self.dispatch(HookPoints::APPLY_STATUS, |relic, battle| {
                        relic.on_apply_status(battle, target, kind, amount);
                    });
                }
                true
            }
            StatusChange::Negated => {
                self.emit(BattleEvent::StatusNegated { target, kind });
                false
            }
            StatusChange::Unchanged => false,
        }
    }

    // =========================================================================
    // Piles
    // =========================================================================

    /// Draws up to `count` cards, reshuffling the discard pile into the draw
    /// pile whenever it runs dry. Draws nothing under `no_draw`.
    ///
    /// # Returns
    ///
    /// The number of cards drawn.
    pub fn draw_cards(&mut self, count: usize) -> usize {
        if self.player.combat.statuses().has(StatusKind::NoDraw) {
            debug!("draw suppressed by no_draw");
            return 0;
        }
        let mut drawn = 0;
        for _ in 0..count {
            if self.player.draw_pile.is_empty() {
                if self.player.discard_pile.is_empty() {
                    break;
                }
                self.reshuffle_discard_into_draw();
            }
            let Some(card) = self.player.draw_pile.pop() else {
                break;
            };
            self.player.hand.push(card);
            drawn += 1;
        }
        if drawn > 0 {
            trace!(drawn, "cards drawn");
            self.emit(BattleEvent::CardsDrawn { count: drawn });
        }
        drawn
    }

    fn reshuffle_discard_into_draw(&mut self) {
        let cards = self.player.discard_pile.drain();
        self.player.draw_pile.extend(cards);
        self.player.draw_pile.shuffle(&mut self.rng);
        let cards = self.player.draw_pile.len();
        debug!(cards, "discard pile shuffled into draw pile");
        self.emit(BattleEvent::Shuffled { cards });
        self.dispatch(HookPoints::SHUFFLE, |relic, battle| {
            relic.on_shuffle(battle);
        });
    }

    /// Shuffles one of the player's piles in place (Fisher-Yates).
    pub fn shuffle(&mut self, pile: PileKind) {
        self.player.pile_mut(pile).shuffle(&mut self.rng);
    }

    /// Moves a card to the exhaust pile, runs its on-exhaust effect, and
    /// fires `on_card_exhaust`.
    pub fn exhaust_card(&mut self, card: Card) {
        let snapshot = card.clone();
        let on_exhaust = card.on_exhaust();
        debug!(card = %card.id(), "card exhausted");
        self.player.exhaust_pile.push(card);
        self.emit(BattleEvent::CardExhausted {
            card: snapshot.id().to_owned(),
        });
        if let Some(effect) = on_exhaust {
            let mut ctx = EffectContext::new(self, None, None, 0);
            effect.apply(&mut ctx);
        }
        self.dispatch(HookPoints::CARD_EXHAUST, |relic, battle| {
            relic.on_card_exhaust(battle, &snapshot);
        });
    }

    /// Moves the card at `index` of `from` onto the top of `to`.
    pub fn move_card(&mut self, from: PileKind, index: usize, to: PileKind) -> bool {
        match self.player.pile_mut(from).remove(index) {
            Some(card) => {
                self.player.pile_mut(to).push(card);
                true
            }
            None => false,
        }
    }

    /// Creates a new battle card in `pile` (at a random depth for the draw
    /// pile, on top otherwise).
    pub fn add_card_to_pile(&mut self, card: Card, pile: PileKind) {
        let card = self.adopt(card);
        self.emit(BattleEvent::CardCreated {
            card: card.id().to_owned(),
        });
        if pile == PileKind::Draw {
            let depth = self.rng.gen_range(0..=self.player.draw_pile.len());
            self.player.draw_pile.insert(depth, card);
        } else {
            self.player.pile_mut(pile).push(card);
        }
    }

    /// Asks the host to pick up to `count` cards from `pile`.
    ///
    /// An empty pile resolves to no selection without asking. The result is
    /// sorted, deduplicated, in range, and at most `count` long.
    pub fn request_selection(&mut self, pile: PileKind, prompt: &str, count: usize) -> Vec<usize> {
        let candidates = self.player.pile(pile).cards();
        if candidates.is_empty() || count == 0 {
            return Vec::new();
        }
        let len = candidates.len();
        let request = SelectionRequest {
            prompt,
            candidates,
            count,
        };
        let mut chosen = self.host.select(&request);
        chosen.retain(|index| *index < len);
        chosen.sort_unstable();
        chosen.dedup();
        chosen.truncate(count);
        chosen
    }

    // =========================================================================
    // Enemy services
    // =========================================================================

    /// Picks a living enemy uniformly from the battle's random stream.
    pub fn random_living_enemy(&mut self) -> Option<EntityId> {
        let living = self.arena.living_ids();
        living.choose(&mut self.rng).copied()
    }

    /// Adds an enemy on the right. It declares an intent at the next player
    /// turn start.
    pub fn spawn_enemy(&mut self, template: &EnemyTemplate) -> EntityId {
        let id = self.arena.spawn(template, &mut self.rng);
        self.emit(BattleEvent::EnemySpawned {
            enemy: id,
            name: template.name.clone(),
        });
        id
    }

    /// Removes an enemy from the battle (it flees), then checks for victory.
    pub fn remove_enemy(&mut self, id: EntityId) -> Option<Enemy> {
        let enemy = self.arena.despawn(id)?;
        debug!(enemy = %id, "enemy removed");
        self.emit(BattleEvent::EnemyFled { enemy: id });
        self.check_battle_end();
        Some(enemy)
    }

    /// Replaces `parent` with enemies built from `a` and `b`, both at the
    /// parent's remaining HP, in the parent's position.
    pub fn split_enemy(
        &mut self,
        parent: EntityId,
        a: &EnemyTemplate,
        b: &EnemyTemplate,
    ) -> Option<(EntityId, EntityId)> {
        let (left, right) = self.arena.split(parent, a, b, &mut self.rng)?;
        debug!(%parent, %left, %right, "enemy split");
        self.emit(BattleEvent::EnemySplit {
            parent,
            children: [left, right],
        });
        self.emit(BattleEvent::EnemySpawned {
            enemy: left,
            name: a.name.clone(),
        });
        self.emit(BattleEvent::EnemySpawned {
            enemy: right,
            name: b.name.clone(),
        });
        Some((left, right))
    }

    // =========================================================================
    // Invariants
    // =========================================================================

    /// Verifies the structural invariants: every battle card is in exactly
    /// one pile, HP is within range, and no zero status entry is stored.
    ///
    /// # Errors
    ///
    /// The first violation found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut seen = BTreeSet::new();
        let mut found = 0;
        for kind in PileKind::ALL {
            for card in self.player.pile(kind).iter() {
                found += 1;
                let uid = card.uid().ok_or(InvariantViolation::MissingUid)?;
                if !seen.insert(uid) {
                    return Err(InvariantViolation::DuplicateCard(uid));
                }
            }
        }
        if self.phase != Phase::Idle && !self.processing && found != self.card_count {
            return Err(InvariantViolation::CardCount {
                expected: self.card_count,
                found,
            });
        }

        let combatants = std::iter::once((EntityId::PLAYER, &self.player.combat))
            .chain(self.arena.iter().map(|enemy| (enemy.id(), &enemy.combat)));
        for (id, combat) in combatants {
            if combat.hp() < 0 || combat.hp() > combat.max_hp() {
                return Err(InvariantViolation::HpOutOfRange {
                    entity: id.as_u64(),
                    hp: combat.hp(),
                    max_hp: combat.max_hp(),
                });
            }
            if combat.statuses().iter().any(|(_, value)| value == 0) {
                return Err(InvariantViolation::ZeroStatus(id.as_u64()));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Battle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Battle")
            .field("phase", &self.phase)
            .field("turn", &self.turn)
            .field("processing", &self.processing)
            .field("player", &self.player)
            .field("arena", &self.arena)
            .finish_non_exhaustive()
    }
}
