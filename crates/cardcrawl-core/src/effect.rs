//! Card and potion effects.
//!
//! An [`Effect`] receives an [`EffectContext`]: mutable access to the battle,
//! the card being resolved (if any), the resolved target, and the X value.
//! Closures implement [`Effect`] directly; [`effect`] wraps one for storage.
//!
//! # Example
//!
//! ```
//! use cardcrawl_core::effect::effect;
//! use cardcrawl_core::entity::status::StatusKind;
//!
//! let inflame = effect(|ctx| {
//!     ctx.apply_self_status(StatusKind::Strength, 2);
//! });
//! # let _ = inflame;
//! ```

use std::sync::Arc;

use crate::battle::Battle;
use crate::card::pile::PileKind;
use crate::card::{Card, TargetType};
use crate::entity::status::StatusKind;
use crate::entity::{DamageSource, EntityId, Player};

/// Something that happens when a card or potion resolves.
pub trait Effect: Send + Sync {
    /// Applies the effect.
    fn apply(&self, ctx: &mut EffectContext<'_>);
}

impl<F> Effect for F
where
    F: Fn(&mut EffectContext<'_>) + Send + Sync,
{
    fn apply(&self, ctx: &mut EffectContext<'_>) {
        self(ctx);
    }
}

/// Wraps a closure as a shareable effect.
pub fn effect<F>(f: F) -> Arc<dyn Effect>
where
    F: Fn(&mut EffectContext<'_>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// An effect that does nothing (status and curse cards).
#[must_use]
pub fn no_effect() -> Arc<dyn Effect> {
    effect(|_| {})
}

/// Runs `effect` according to `target_type`.
///
/// `All` runs once per enemy alive at that moment, left to right; `Random`
/// picks one living enemy from the battle's random stream; the rest run once.
pub(crate) fn run_targeted(
    battle: &mut Battle,
    effect: &dyn Effect,
    target_type: TargetType,
    target: Option<EntityId>,
    mut card: Option<&mut Card>,
    x_value: u32,
) {
    match target_type {
        TargetType::All => {
            for id in battle.arena().living_ids() {
                if !battle.arena().is_alive(id) || battle.is_over() {
                    continue;
                }
                let mut ctx = EffectContext::new(battle, card.as_deref_mut(), Some(id), x_value);
                effect.apply(&mut ctx);
            }
        }
        TargetType::Random => {
            let target = battle.random_living_enemy();
            let mut ctx = EffectContext::new(battle, card, target, x_value);
            effect.apply(&mut ctx);
        }
        TargetType::Single | TargetType::SelfTarget => {
            let mut ctx = EffectContext::new(battle, card, target, x_value);
            effect.apply(&mut ctx);
        }
    }
}

/// Engine access for a resolving effect.
pub struct EffectContext<'a> {
    battle: &'a mut Battle,
    card: Option<&'a mut Card>,
    target: Option<EntityId>,
    x_value: u32,
}

impl<'a> EffectContext<'a> {
    pub(crate) fn new(
        battle: &'a mut Battle,
        card: Option<&'a mut Card>,
        target: Option<EntityId>,
        x_value: u32,
    ) -> Self {
        Self {
            battle,
            card,
            target,
            x_value,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The battle, read-only.
    #[must_use]
    pub fn battle(&self) -> &Battle {
        &*self.battle
    }

    /// The battle, mutably.
    pub fn battle_mut(&mut self) -> &mut Battle {
        &mut *self.battle
    }

    /// The player.
    #[must_use]
    pub fn player(&self) -> &Player {
        self.battle.player()
    }

    /// The player, mutably.
    pub fn player_mut(&mut self) -> &mut Player {
        self.battle.player_mut()
    }

    /// The card being resolved (none for potions and on-exhaust effects).
    #[must_use]
    pub fn card(&self) -> Option<&Card> {
        self.card.as_deref()
    }

    /// The card being resolved, mutably.
    pub fn card_mut(&mut self) -> Option<&mut Card> {
        self.card.as_deref_mut()
    }

    /// Returns true if the resolving card is upgraded.
    #[must_use]
    pub fn is_upgraded(&self) -> bool {
        self.card().is_some_and(Card::is_upgraded)
    }

    /// The resolved target, if the shape has one.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Energy captured by an X cost (0 otherwise).
    #[must_use]
    pub const fn x_value(&self) -> u32 {
        self.x_value
    }

    // =========================================================================
    // Damage
    // =========================================================================

    /// Hits `target` for the card's projected damage. Returns HP removed.
    ///
    /// Does nothing outside a card or for a card without damage.
    pub fn attack(&mut self, target: EntityId) -> i32 {
        let Some(damage) = self
            .card
            .as_deref()
            .and_then(|card| card.damage(self.battle.player()))
        else {
            return 0;
        };
        self.battle.player_hit(target, damage)
    }

    /// Hits the resolved target for the card's projected damage.
    pub fn attack_target(&mut self) -> i32 {
        match self.target {
            Some(target) => self.attack(target),
            None => 0,
        }
    }

    /// Hits `target` with an attack of `base` damage through the player's
    /// outgoing modifiers.
    pub fn attack_with_base(&mut self, target: EntityId, base: i32) -> i32 {
        let damage = self.battle.player().outgoing_damage(base);
        self.battle.player_hit(target, damage)
    }

    /// Deals flat damage from the player to `target`, ignoring strength and
    /// weak (the target's vulnerable still applies).
    pub fn deal_damage(&mut self, target: EntityId, amount: i32) -> i32 {
        self.battle.player_hit(target, amount)
    }

    /// The player loses HP to unsourced damage (block still absorbs it).
    pub fn self_damage(&mut self, amount: i32) -> i32 {
        self.battle
            .deal_damage(DamageSource::Unsourced, EntityId::PLAYER, amount)
    }

    /// Picks a living enemy from the battle's random stream.
    pub fn random_enemy(&mut self) -> Option<EntityId> {
        self.battle.random_living_enemy()
    }

    // =========================================================================
    // Block, statuses, healing
    // =========================================================================

    /// Gains the card's projected block. Returns the block gained.
    pub fn gain_card_block(&mut self) -> i32 {
        let Some(block) = self
            .card
            .as_deref()
            .and_then(|card| card.block(self.battle.player()))
        else {
            return 0;
        };
        self.battle.player_gain_block_raw(block)
    }

    /// Gains `base` block through dexterity, frail, and relic folds.
    pub fn gain_block(&mut self, base: i32) -> i32 {
        let block = self.battle.player().block_gain(base);
        self.battle.player_gain_block_raw(block)
    }

    /// Applies a status from the player to `target`.
    pub fn apply_status(&mut self, target: EntityId, kind: StatusKind, amount: i32) -> bool {
        self.battle
            .apply_status(Some(EntityId::PLAYER), target, kind, amount)
    }

    /// Applies a status to the resolved target, if any.
    pub fn apply_target_status(&mut self, kind: StatusKind, amount: i32) -> bool {
        match self.target {
            Some(target) => self.apply_status(target, kind, amount),
            None => false,
        }
    }

    /// Applies a status to the player.
    pub fn apply_self_status(&mut self, kind: StatusKind, amount: i32) -> bool {
        self.apply_status(EntityId::PLAYER, kind, amount)
    }

    /// Heals the player. Returns the HP restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        self.battle.heal_player(amount)
    }

    /// Gains energy.
    pub fn gain_energy(&mut self, amount: u32) {
        self.battle.gain_energy(amount);
    }

    // =========================================================================
    // Cards
    // =========================================================================

    /// Draws up to `count` cards. Returns the number drawn.
    pub fn draw(&mut self, count: usize) -> usize {
        self.battle.draw_cards(count)
    }

    /// Asks the host to pick up to `count` cards from `pile`.
    ///
    /// Returns sorted, deduplicated, in-range indices; empty when the pile is
    /// empty.
    pub fn choose(&mut self, pile: PileKind, prompt: &str, count: usize) -> Vec<usize> {
        self.battle.request_selection(pile, prompt, count)
    }

    /// Moves the card at `index` of `from` to the top of `to`.
    pub fn move_card(&mut self, from: PileKind, index: usize, to: PileKind) -> bool {
        self.battle.move_card(from, index, to)
    }

    /// Exhausts the card at `index` of the hand.
    pub fn exhaust_from_hand(&mut self, index: usize) -> bool {
        match self.battle.player_mut().hand.remove(index) {
            Some(card) => {
                self.battle.exhaust_card(card);
                true
            }
            None => false,
        }
    }

    /// Creates a new battle card in `pile`.
    pub fn add_card(&mut self, card: Card, pile: PileKind) {
        self.battle.add_card_to_pile(card, pile);
    }
}
