//! Cards: cost, targeting, projections, and play resolution.
//!
//! A [`Card`] is a template plus per-instance runtime fields. The master deck
//! holds the persistent instances; a battle works on clones, so only master-deck
//! mutations (upgrades) outlive a battle.
//!
//! # Cost precedence
//!
//! [`Card::cost`] consults, in order:
//! 1. `corruption` on the player (skills cost 0)
//! 2. the temporary cost (cleared at the end of the owner's turn)
//! 3. the cost calculator
//! 4. the static cost
//!
//! # Projections
//!
//! [`Card::damage`] and [`Card::block`] run the same arithmetic the live
//! effect uses, so previews never disagree with what happens on play.
//!
//! # Example
//!
//! ```
//! use cardcrawl_core::card::{Card, CardCost, CardType, TargetType};
//! use cardcrawl_core::effect::effect;
//! use cardcrawl_core::entity::Player;
//! use cardcrawl_core::entity::status::StatusKind;
//!
//! let strike = Card::new("strike", "Strike", CardCost::Fixed(1), CardType::Attack, TargetType::Single,
//!     effect(|ctx| {
//!         ctx.attack_target();
//!     }))
//!     .with_damage(6);
//!
//! let mut player = Player::new(80);
//! player.combat.statuses_mut().add(StatusKind::Strength, 2);
//! assert_eq!(strike.damage(&player), Some(8));
//! ```

pub mod pile;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battle::Battle;
use crate::effect::{run_targeted, Effect};
use crate::entity::status::StatusKind;
use crate::entity::{CombatState, EntityId, Player};
use crate::error::ActionRejected;

/// Identity of one card instance within a battle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardUid(u64);

impl CardUid {
    /// Creates a uid from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CardUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Energy cost of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardCost {
    /// A fixed amount; negative means unplayable.
    Fixed(i32),
    /// Consumes all remaining energy.
    X,
}

impl CardCost {
    /// Returns true if the card can never be paid for.
    #[must_use]
    pub const fn is_unplayable(self) -> bool {
        matches!(self, Self::Fixed(amount) if amount < 0)
    }
}

/// Card category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    /// Deals damage; blocked by `entangled`.
    Attack,
    /// Utility.
    Skill,
    /// Persistent effect; removed from play once played.
    Power,
    /// Clutter added by enemies.
    Status,
    /// Never playable.
    Curse,
}

/// Target shape of a card or potion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// The player.
    #[serde(rename = "self")]
    SelfTarget,
    /// One chosen enemy.
    Single,
    /// One enemy picked at random when the effect resolves.
    Random,
    /// Every living enemy, left to right.
    All,
}

impl TargetType {
    /// Returns true if the shape needs at least one living enemy.
    #[must_use]
    pub const fn needs_enemy(self) -> bool {
        !matches!(self, Self::SelfTarget)
    }
}

/// Computes a card value from the player and the card itself.
pub type CardValueFn = Arc<dyn Fn(&Player, &Card) -> i32 + Send + Sync>;

/// Fields swapped in by [`Card::upgrade`]. `None` fields are left untouched.
#[derive(Clone, Default)]
pub struct UpgradeData {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New static cost.
    pub cost: Option<CardCost>,
    /// New cost calculator.
    pub cost_calculator: Option<CardValueFn>,
    /// New effect.
    pub effect: Option<Arc<dyn Effect>>,
    /// New base damage.
    pub base_damage: Option<i32>,
    /// New damage calculator.
    pub damage_calculator: Option<CardValueFn>,
    /// New base block.
    pub base_block: Option<i32>,
    /// New block calculator.
    pub block_calculator: Option<CardValueFn>,
    /// New on-exhaust effect.
    pub on_exhaust: Option<Arc<dyn Effect>>,
    /// New end-of-turn damage while held in hand.
    pub hand_end_damage: Option<i32>,
}

/// A playable card.
#[derive(Clone)]
pub struct Card {
    id: String,
    uid: Option<CardUid>,
    name: String,
    description: String,
    cost: CardCost,
    card_type: CardType,
    target: TargetType,
    ethereal: bool,
    exhaust: bool,
    upgraded: bool,
    misc_value: i32,
    temporary_cost: Option<i32>,
    base_damage: Option<i32>,
    base_block: Option<i32>,
    cost_calculator: Option<CardValueFn>,
    damage_calculator: Option<CardValueFn>,
    block_calculator: Option<CardValueFn>,
    effect: Arc<dyn Effect>,
    on_exhaust: Option<Arc<dyn Effect>>,
    hand_end_damage: i32,
    upgrade: Option<Arc<UpgradeData>>,
}

impl Card {
    /// Creates a card.
    ///
    /// # Arguments
    ///
    /// * `id` - Stable content identifier (shared by every copy)
    /// * `name` - Display name
    /// * `cost` - Static energy cost
    /// * `card_type` - Category
    /// * `target` - Target shape
    /// * `effect` - What happens on play
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cost: CardCost,
        card_type: CardType,
        target: TargetType,
        effect: Arc<dyn Effect>,
    ) -> Self {
        Self {
            id: id.into(),
            uid: None,
            name: name.into(),
            description: String::new(),
            cost,
            card_type,
            target,
            ethereal: false,
            exhaust: false,
            upgraded: false,
            misc_value: 0,
            temporary_cost: None,
            base_damage: None,
            base_block: None,
            cost_calculator: None,
            damage_calculator: None,
            block_calculator: None,
            effect,
            on_exhaust: None,
            hand_end_damage: 0,
            upgrade: None,
        }
    }

    // =========================================================================
    // Builders
    // =========================================================================

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the base damage.
    #[must_use]
    pub fn with_damage(mut self, damage: i32) -> Self {
        self.base_damage = Some(damage);
        self
    }

    /// Sets the base block.
    #[must_use]
    pub fn with_block(mut self, block: i32) -> Self {
        self.base_block = Some(block);
        self
    }

    /// Exhausts on play.
    #[must_use]
    pub fn exhausting(mut self) -> Self {
        self.exhaust = true;
        self
    }

    /// Exhausts if still in hand at turn end.
    #[must_use]
    pub fn ethereal(mut self) -> Self {
        self.ethereal = true;
        self
    }

    /// Sets a cost calculator.
    #[must_use]
    pub fn with_cost_calculator(mut self, calculator: CardValueFn) -> Self {
        self.cost_calculator = Some(calculator);
        self
    }

    /// Sets a damage calculator, replacing the base damage.
    #[must_use]
    pub fn with_damage_calculator(mut self, calculator: CardValueFn) -> Self {
        self.damage_calculator = Some(calculator);
        self
    }

    /// Sets a block calculator, replacing the base block.
    #[must_use]
    pub fn with_block_calculator(mut self, calculator: CardValueFn) -> Self {
        self.block_calculator = Some(calculator);
        self
    }

    /// Sets an effect run when the card is exhausted.
    #[must_use]
    pub fn with_on_exhaust(mut self, effect: Arc<dyn Effect>) -> Self {
        self.on_exhaust = Some(effect);
        self
    }

    /// Deals `damage` to the player at turn end while held in hand.
    #[must_use]
    pub fn with_hand_end_damage(mut self, damage: i32) -> Self {
        self.hand_end_damage = damage;
        self
    }

    /// Sets the upgrade bundle.
    #[must_use]
    pub fn with_upgrade(mut self, upgrade: UpgradeData) -> Self {
        self.upgrade = Some(Arc::new(upgrade));
        self
    }

    /// Assigns a battle uid.
    #[must_use]
    pub fn with_uid(mut self, uid: CardUid) -> Self {
        self.uid = Some(uid);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Content identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Battle uid, if this is a battle clone.
    #[must_use]
    pub const fn uid(&self) -> Option<CardUid> {
        self.uid
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Static cost.
    #[must_use]
    pub const fn base_cost(&self) -> CardCost {
        self.cost
    }

    /// Category.
    #[must_use]
    pub const fn card_type(&self) -> CardType {
        self.card_type
    }

    /// Target shape.
    #[must_use]
    pub const fn target(&self) -> TargetType {
        self.target
    }

    /// Returns true if the card exhausts on play.
    #[must_use]
    pub const fn is_exhaust(&self) -> bool {
        self.exhaust
    }

    /// Returns true if the card exhausts when left in hand at turn end.
    #[must_use]
    pub const fn is_ethereal(&self) -> bool {
        self.ethereal
    }

    /// Returns true once upgraded.
    #[must_use]
    pub const fn is_upgraded(&self) -> bool {
        self.upgraded
    }

    /// Scratch value carried by this instance (added to damage projections).
    #[must_use]
    pub const fn misc_value(&self) -> i32 {
        self.misc_value
    }

    /// Adds to the scratch value.
    pub fn add_misc_value(&mut self, delta: i32) {
        self.misc_value += delta;
    }

    /// Cost override until the end of the owner's turn.
    #[must_use]
    pub const fn temporary_cost(&self) -> Option<i32> {
        self.temporary_cost
    }

    /// Sets or clears the turn-scoped cost override.
    pub fn set_temporary_cost(&mut self, cost: Option<i32>) {
        self.temporary_cost = cost;
    }

    /// Damage dealt to the player at turn end while held in hand.
    #[must_use]
    pub const fn hand_end_damage(&self) -> i32 {
        self.hand_end_damage
    }

    /// The on-exhaust effect, if any.
    #[must_use]
    pub fn on_exhaust(&self) -> Option<Arc<dyn Effect>> {
        self.on_exhaust.clone()
    }

    // =========================================================================
    // Cost and projections
    // =========================================================================

    /// Effective cost for `player`.
    #[must_use]
    pub fn cost(&self, player: &Player) -> CardCost {
        if self.card_type == CardType::Skill && player.combat.statuses().has(StatusKind::Corruption)
        {
            return CardCost::Fixed(0);
        }
        if let Some(cost) = self.temporary_cost {
            return CardCost::Fixed(cost);
        }
        if let Some(calculator) = &self.cost_calculator {
            return CardCost::Fixed(calculator(player, self));
        }
        self.cost
    }

    /// Returns true if `player` could pay for this card right now.
    #[must_use]
    pub fn is_affordable(&self, player: &Player) -> bool {
        if self.card_type == CardType::Curse {
            return false;
        }
        match self.cost(player) {
            CardCost::X => true,
            CardCost::Fixed(amount) => amount >= 0 && amount.unsigned_abs() <= player.energy(),
        }
    }

    fn raw_damage(&self, player: &Player) -> Option<i32> {
        let base = match &self.damage_calculator {
            Some(calculator) => Some(calculator(player, self)),
            None => self.base_damage,
        };
        base.map(|base| base + self.misc_value)
    }

    /// Outgoing damage per hit, before the target's modifiers.
    #[must_use]
    pub fn damage(&self, player: &Player) -> Option<i32> {
        self.raw_damage(player)
            .map(|base| player.outgoing_damage(base))
    }

    /// Damage per hit against `target`, exactly as the live pipeline applies it.
    #[must_use]
    pub fn final_damage(&self, player: &Player, target: &CombatState) -> Option<i32> {
        self.damage(player)
            .map(|damage| target.apply_target_modifiers(damage))
    }

    /// Block granted, exactly as the live pipeline applies it.
    #[must_use]
    pub fn block(&self, player: &Player) -> Option<i32> {
        let base = match &self.block_calculator {
            Some(calculator) => Some(calculator(player, self)),
            None => self.base_block,
        };
        base.map(|base| player.block_gain(base))
    }

    // =========================================================================
    // Play and upgrade
    // =========================================================================

    /// Pays for and resolves this card.
    ///
    /// The card must already be out of the hand; the caller routes it to a
    /// pile afterwards. With `free_play` a numeric cost counts as paid whatever
    /// the energy, and an X cost reads the energy without draining it.
    ///
    /// # Errors
    ///
    /// Returns why the card could not be paid for. Nothing is mutated on
    /// failure.
    pub fn play(
        &mut self,
        battle: &mut Battle,
        target: Option<EntityId>,
        free_play: bool,
    ) -> Result<(), ActionRejected> {
        if self.card_type == CardType::Curse {
            return Err(ActionRejected::Unplayable);
        }
        let cost = self.cost(battle.player());
        let x_value = battle.player_mut().pay(cost, free_play)?;
        debug!(card = %self.id, ?target, x_value, free_play, "card played");

        battle.notify_card_play(self, target, x_value);

        let is_attack = self.card_type == CardType::Attack;
        let repeats = if is_attack
            && battle
                .player_mut()
                .combat
                .statuses_mut()
                .consume_one(StatusKind::DoubleTap)
        {
            2
        } else {
            1
        };

        let effect = Arc::clone(&self.effect);
        for _ in 0..repeats {
            run_targeted(battle, effect.as_ref(), self.target, target, Some(&mut *self), x_value);
        }

        if is_attack {
            let rage = battle.player().combat.statuses().get(StatusKind::Rage);
            if rage > 0 {
                battle.player_gain_block_raw(rage);
            }
        }

        battle.notify_after_card_play(self);
        Ok(())
    }

    /// Swaps in the upgrade bundle.
    ///
    /// Returns false, changing nothing, if already upgraded or if the card has
    /// no upgrade.
    pub fn upgrade(&mut self) -> bool {
        if self.upgraded {
            return false;
        }
        let Some(data) = self.upgrade.clone() else {
            return false;
        };
        if let Some(name) = &data.name {
            self.name.clone_from(name);
        }
        if let Some(description) = &data.description {
            self.description.clone_from(description);
        }
        if let Some(cost) = data.cost {
            self.cost = cost;
        }
        if let Some(calculator) = &data.cost_calculator {
            self.cost_calculator = Some(Arc::clone(calculator));
        }
        if let Some(effect) = &data.effect {
            self.effect = Arc::clone(effect);
        }
        if let Some(damage) = data.base_damage {
            self.base_damage = Some(damage);
        }
        if let Some(calculator) = &data.damage_calculator {
            self.damage_calculator = Some(Arc::clone(calculator));
        }
        if let Some(block) = data.base_block {
            self.base_block = Some(block);
        }
        if let Some(calculator) = &data.block_calculator {
            self.block_calculator = Some(Arc::clone(calculator));
        }
        if let Some(effect) = &data.on_exhaust {
            self.on_exhaust = Some(Arc::clone(effect));
        }
        if let Some(damage) = data.hand_end_damage {
            self.hand_end_damage = damage;
        }
        self.upgraded = true;
        true
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("id", &self.id)
            .field("uid", &self.uid)
            .field("name", &self.name)
            .field("cost", &self.cost)
            .field("card_type", &self.card_type)
            .field("target", &self.target)
            .field("upgraded", &self.upgraded)
            .field("misc_value", &self.misc_value)
            .field("temporary_cost", &self.temporary_cost)
            .finish_non_exhaustive()
    }
}
