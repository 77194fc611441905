//! The player: persistent run state plus the battle-scoped piles.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::card::pile::{Pile, PileKind};
use crate::card::{Card, CardCost};
use crate::config::rules;
use crate::error::ActionRejected;
use crate::hook::{HookPoints, Relic, RelicRegistry};
use crate::potion::Potion;

use super::CombatState;

/// Kinds of rooms on the map, reported to `on_room_enter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    /// Ordinary fight.
    Monster,
    /// Elite fight.
    Elite,
    /// Boss fight.
    Boss,
    /// Merchant.
    Shop,
    /// Campfire.
    Rest,
    /// Unknown room.
    Event,
    /// Treasure chest.
    Treasure,
}

/// The player character.
///
/// Everything except the four battle piles and `hp_loss_count` persists
/// between battles.
#[derive(Debug, Clone)]
pub struct Player {
    /// HP, block, and statuses.
    pub combat: CombatState,
    energy: u32,
    max_energy: u32,
    /// Cards waiting to be drawn; the top is the end of the pile.
    pub draw_pile: Pile,
    /// Cards in hand.
    pub hand: Pile,
    /// Played and discarded cards.
    pub discard_pile: Pile,
    /// Cards removed for the rest of the battle.
    pub exhaust_pile: Pile,
    master_deck: Vec<Card>,
    gold: u32,
    potions: Vec<Option<Potion>>,
    relics: RelicRegistry,
    relic_counters: BTreeMap<String, i64>,
    hp_loss_count: u32,
}

impl Player {
    /// Creates a player at full health with an empty deck.
    #[must_use]
    pub fn new(max_hp: i32) -> Self {
        Self {
            combat: CombatState::new(max_hp),
            energy: 0,
            max_energy: rules::DEFAULT_MAX_ENERGY,
            draw_pile: Pile::new(),
            hand: Pile::new(),
            discard_pile: Pile::new(),
            exhaust_pile: Pile::new(),
            master_deck: Vec::new(),
            gold: 0,
            potions: vec![None; rules::DEFAULT_POTION_SLOTS],
            relics: RelicRegistry::new(),
            relic_counters: BTreeMap::new(),
            hp_loss_count: 0,
        }
    }

    /// Replaces the master deck without firing `on_card_add`.
    #[must_use]
    pub fn with_deck(mut self, deck: Vec<Card>) -> Self {
        self.master_deck = deck;
        self
    }

    /// Sets the starting gold.
    #[must_use]
    pub fn with_gold(mut self, gold: u32) -> Self {
        self.gold = gold;
        self
    }

    /// Resizes the potion belt, dropping potions in removed slots.
    #[must_use]
    pub fn with_potion_slots(mut self, slots: usize) -> Self {
        self.potions.resize(slots, None);
        self
    }

    // =========================================================================
    // Energy
    // =========================================================================

    /// Current energy.
    #[must_use]
    pub const fn energy(&self) -> u32 {
        self.energy
    }

    /// Energy restored at the start of each turn.
    #[must_use]
    pub const fn max_energy(&self) -> u32 {
        self.max_energy
    }

    /// Sets the per-turn energy.
    pub fn set_max_energy(&mut self, max_energy: u32) {
        self.max_energy = max_energy;
    }

    /// Adds energy (may exceed the maximum until the next turn).
    pub fn gain_energy(&mut self, amount: u32) {
        self.energy = self.energy.saturating_add(amount);
    }

    pub(crate) fn refill_energy(&mut self) {
        self.energy = self.max_energy;
    }

    /// Pays `cost` and returns the X value (0 for numeric costs).
    ///
    /// A free play counts a numeric cost as paid: neither the energy check nor
    /// the deduction happens. An X cost drains all energy unless `free_play`
    /// is set.
    ///
    /// # Errors
    ///
    /// [`ActionRejected::Unplayable`] for a negative cost,
    /// [`ActionRejected::InsufficientEnergy`] when the cost exceeds the energy.
    /// No energy is spent on failure.
    pub fn pay(&mut self, cost: CardCost, free_play: bool) -> Result<u32, ActionRejected> {
        match cost {
            CardCost::X => {
                let x = self.energy;
                if !free_play {
                    self.energy = 0;
                }
                Ok(x)
            }
            CardCost::Fixed(amount) if amount < 0 => Err(ActionRejected::Unplayable),
            CardCost::Fixed(_) if free_play => Ok(0),
            CardCost::Fixed(amount) => {
                let amount = amount.unsigned_abs();
                if self.energy < amount {
                    return Err(ActionRejected::InsufficientEnergy);
                }
                self.energy -= amount;
                Ok(0)
            }
        }
    }

    // =========================================================================
    // Piles and deck
    // =========================================================================

    /// Returns one of the four battle piles.
    #[must_use]
    pub const fn pile(&self, kind: PileKind) -> &Pile {
        match kind {
            PileKind::Draw => &self.draw_pile,
            PileKind::Hand => &self.hand,
            PileKind::Discard => &self.discard_pile,
            PileKind::Exhaust => &self.exhaust_pile,
        }
    }

    /// Returns one of the four battle piles, mutably.
    pub fn pile_mut(&mut self, kind: PileKind) -> &mut Pile {
        match kind {
            PileKind::Draw => &mut self.draw_pile,
            PileKind::Hand => &mut self.hand,
            PileKind::Discard => &mut self.discard_pile,
            PileKind::Exhaust => &mut self.exhaust_pile,
        }
    }

    /// The persistent deck.
    #[must_use]
    pub fn master_deck(&self) -> &[Card] {
        &self.master_deck
    }

    /// Adds a card to the master deck and fires `on_card_add`.
    pub fn add_card(&mut self, card: Card) {
        debug!(card = %card.id(), "card added to deck");
        self.master_deck.push(card.clone());
        for relic in self.relics.subscribers(HookPoints::CARD_ADD) {
            relic.on_card_add(self, &card);
        }
    }

    /// Removes a card from the master deck.
    pub fn remove_card(&mut self, index: usize) -> Option<Card> {
        (index < self.master_deck.len()).then(|| self.master_deck.remove(index))
    }

    /// Upgrades a master-deck card. Returns true if it changed.
    pub fn upgrade_card(&mut self, index: usize) -> bool {
        self.master_deck
            .get_mut(index)
            .is_some_and(Card::upgrade)
    }

    pub(crate) fn reset_for_battle(&mut self) {
        self.draw_pile.clear();
        self.hand.clear();
        self.discard_pile.clear();
        self.exhaust_pile.clear();
        self.combat.clear_block();
        self.combat.statuses_mut().clear();
        self.hp_loss_count = 0;
        self.energy = 0;
    }

    // =========================================================================
    // Gold, rooms
    // =========================================================================

    /// Current gold.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    /// Adds gold.
    pub fn gain_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Spends gold and fires `on_gold_spend`.
    ///
    /// Returns false, spending nothing, if the player cannot afford it.
    pub fn spend_gold(&mut self, amount: u32) -> bool {
        if amount > self.gold {
            return false;
        }
        self.gold -= amount;
        for relic in self.relics.subscribers(HookPoints::GOLD_SPEND) {
            relic.on_gold_spend(self, amount);
        }
        true
    }

    /// Enters a room and fires `on_room_enter`.
    pub fn enter_room(&mut self, room: RoomKind) {
        debug!(?room, "room entered");
        for relic in self.relics.subscribers(HookPoints::ROOM_ENTER) {
            relic.on_room_enter(self, room);
        }
    }

    // =========================================================================
    // Potions
    // =========================================================================

    /// Potion slots; `None` is an empty slot.
    #[must_use]
    pub fn potions(&self) -> &[Option<Potion>] {
        &self.potions
    }

    /// The potion in `slot`, if any.
    #[must_use]
    pub fn potion(&self, slot: usize) -> Option<&Potion> {
        self.potions.get(slot).and_then(Option::as_ref)
    }

    /// Puts a potion in the first empty slot. Returns false if the belt is full.
    pub fn obtain_potion(&mut self, potion: Potion) -> bool {
        match self.potions.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(potion);
                true
            }
            None => false,
        }
    }

    /// Empties `slot`, returning its potion.
    pub fn take_potion(&mut self, slot: usize) -> Option<Potion> {
        self.potions.get_mut(slot).and_then(Option::take)
    }

    /// Throws away the potion in `slot` without using it.
    pub fn discard_potion(&mut self, slot: usize) -> bool {
        self.take_potion(slot).is_some()
    }

    // =========================================================================
    // Relics
    // =========================================================================

    /// Held relics in acquisition order.
    #[must_use]
    pub const fn relics(&self) -> &RelicRegistry {
        &self.relics
    }

    /// Acquires a relic and fires its own `on_obtain`.
    pub fn obtain_relic(&mut self, relic: Arc<dyn Relic>) {
        debug!(relic = %relic.declaration().id, "relic obtained");
        self.relics.push(Arc::clone(&relic));
        if relic.declaration().hooks.contains(HookPoints::OBTAIN) {
            relic.on_obtain(self);
        }
    }

    /// Reads a relic counter (0 if unset).
    #[must_use]
    pub fn counter(&self, key: &str) -> i64 {
        self.relic_counters.get(key).copied().unwrap_or(0)
    }

    /// Sets a relic counter.
    pub fn set_counter(&mut self, key: &str, value: i64) {
        self.relic_counters.insert(key.to_owned(), value);
    }

    /// Adds `delta` to a relic counter and returns the new value.
    pub fn bump_counter(&mut self, key: &str, delta: i64) -> i64 {
        let value = self.relic_counters.entry(key.to_owned()).or_insert(0);
        *value += delta;
        *value
    }

    // =========================================================================
    // Arithmetic with relic folds
    // =========================================================================

    /// Number of times the player lost HP this battle.
    #[must_use]
    pub const fn hp_loss_count(&self) -> u32 {
        self.hp_loss_count
    }

    pub(crate) fn record_hp_loss(&mut self) {
        self.hp_loss_count += 1;
    }

    /// Outgoing attack damage: strength and weak, then `modify_damage_dealt`.
    #[must_use]
    pub fn outgoing_damage(&self, base: i32) -> i32 {
        let damage = self.combat.calculate_damage(base);
        self.relics
            .fold(HookPoints::MODIFY_DAMAGE_DEALT, damage, |relic, value| {
                relic.modify_damage_dealt(self, value)
            })
            .max(0)
    }

    /// Block a card worth `base` would grant: dexterity and frail, then
    /// `modify_block_gained`.
    #[must_use]
    pub fn block_gain(&self, base: i32) -> i32 {
        let block = self.combat.calculate_block(base);
        self.relics
            .fold(HookPoints::MODIFY_BLOCK_GAINED, block, |relic, value| {
                relic.modify_block_gained(self, value)
            })
            .max(0)
    }

    /// Gains block through [`Player::block_gain`]. Returns the block gained.
    pub fn gain_block(&mut self, base: i32) -> i32 {
        let amount = self.block_gain(base);
        self.combat.gain_block_raw(amount)
    }

    /// Heals through `modify_heal_amount`, firing `on_hp_recovery` when any HP
    /// was restored. Returns the HP restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let amount = self
            .relics
            .fold(HookPoints::MODIFY_HEAL_AMOUNT, amount.max(0), |relic, value| {
                relic.modify_heal_amount(self, value)
            });
        let healed = self.combat.heal(amount);
        if healed > 0 {
            for relic in self.relics.subscribers(HookPoints::HP_RECOVERY) {
                relic.on_hp_recovery(self, healed);
            }
        }
        healed
    }
}
