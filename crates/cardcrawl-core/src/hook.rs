//! Relic hooks: ordered observers of battle and run events.
//!
//! A relic is any value implementing [`Relic`]. Every callback defaults to a
//! no-op; a relic declares the callbacks it actually implements through
//! [`HookPoints`] in its [`RelicDeclaration`], and the [`RelicRegistry`] only
//! dispatches to declared subscribers.
//!
//! # Architecture
//!
//! - Notification hooks receive the battle (in-battle events) or the player
//!   (run events that can happen outside a battle) mutably.
//! - `modify_*` hooks fold: relics are visited in acquisition order and each
//!   relic's output is the next relic's input.
//! - The engine never inspects a relic's identity. Per-relic state belongs in
//!   the player's relic counters.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use cardcrawl_core::entity::Player;
//! use cardcrawl_core::hook::{HookPoints, Relic, RelicDeclaration, RelicRegistry};
//!
//! struct Whetstone(RelicDeclaration);
//!
//! impl Relic for Whetstone {
//!     fn declaration(&self) -> &RelicDeclaration {
//!         &self.0
//!     }
//!
//!     fn modify_damage_dealt(&self, _player: &Player, damage: i32) -> i32 {
//!         damage + 1
//!     }
//! }
//!
//! let mut registry = RelicRegistry::new();
//! registry.push(Arc::new(Whetstone(RelicDeclaration::new(
//!     "whetstone",
//!     "Whetstone",
//!     HookPoints::MODIFY_DAMAGE_DEALT,
//! ))));
//!
//! let player = Player::new(80);
//! let damage = registry.fold(HookPoints::MODIFY_DAMAGE_DEALT, 6, |relic, value| {
//!     relic.modify_damage_dealt(&player, value)
//! });
//! assert_eq!(damage, 7);
//! ```

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::battle::Battle;
use crate::card::Card;
use crate::entity::status::StatusKind;
use crate::entity::{EntityId, Player, RoomKind};
use crate::potion::Potion;

bitflags! {
    /// Set of hook callbacks a relic subscribes to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct HookPoints: u32 {
        /// [`Relic::on_obtain`]
        const OBTAIN = 1 << 0;
        /// [`Relic::on_battle_start`]
        const BATTLE_START = 1 << 1;
        /// [`Relic::on_player_turn_start`]
        const PLAYER_TURN_START = 1 << 2;
        /// [`Relic::on_turn_end`]
        const TURN_END = 1 << 3;
        /// [`Relic::on_victory`]
        const VICTORY = 1 << 4;
        /// [`Relic::on_card_play`]
        const CARD_PLAY = 1 << 5;
        /// [`Relic::after_card_play`]
        const AFTER_CARD_PLAY = 1 << 6;
        /// [`Relic::on_take_damage`]
        const TAKE_DAMAGE = 1 << 7;
        /// [`Relic::on_hp_recovery`]
        const HP_RECOVERY = 1 << 8;
        /// [`Relic::on_shuffle`]
        const SHUFFLE = 1 << 9;
        /// [`Relic::on_card_exhaust`]
        const CARD_EXHAUST = 1 << 10;
        /// [`Relic::on_card_add`]
        const CARD_ADD = 1 << 11;
        /// [`Relic::on_potion_use`]
        const POTION_USE = 1 << 12;
        /// [`Relic::on_room_enter`]
        const ROOM_ENTER = 1 << 13;
        /// [`Relic::modify_damage_dealt`]
        const MODIFY_DAMAGE_DEALT = 1 << 14;
        /// [`Relic::modify_block_gained`]
        const MODIFY_BLOCK_GAINED = 1 << 15;
        /// [`Relic::modify_heal_amount`]
        const MODIFY_HEAL_AMOUNT = 1 << 16;
        /// [`Relic::on_gold_spend`]
        const GOLD_SPEND = 1 << 17;
        /// [`Relic::on_apply_status`]
        const APPLY_STATUS = 1 << 18;
        /// [`Relic::on_gain_block`]
        const GAIN_BLOCK = 1 << 19;
    }
}

/// Static description of a relic: identity for display plus its hook set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelicDeclaration {
    /// Stable identifier, also used as the key for relic counters.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Callbacks this relic implements.
    pub hooks: HookPoints,
}

impl RelicDeclaration {
    /// Creates a declaration.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, hooks: HookPoints) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hooks,
        }
    }
}

/// A relic observer.
///
/// Only callbacks named in [`RelicDeclaration::hooks`] are ever invoked; an
/// overridden callback whose point is not declared is never called.
#[allow(unused_variables)]
pub trait Relic: Send + Sync {
    /// Returns this relic's declaration.
    fn declaration(&self) -> &RelicDeclaration;

    /// The relic was just acquired.
    fn on_obtain(&self, player: &mut Player) {}

    /// A battle started (before the first draw).
    fn on_battle_start(&self, battle: &mut Battle) {}

    /// The player's turn started (after the draw, before intents update).
    fn on_player_turn_start(&self, battle: &mut Battle) {}

    /// The player ended their turn.
    fn on_turn_end(&self, battle: &mut Battle) {}

    /// Every enemy is dead.
    fn on_victory(&self, battle: &mut Battle) {}

    /// A card's cost was paid and its effect is about to run.
    fn on_card_play(&self, battle: &mut Battle, card: &Card) {}

    /// A card's effect finished.
    fn after_card_play(&self, battle: &mut Battle, card: &Card) {}

    /// The player lost `hp_lost` HP in battle.
    fn on_take_damage(&self, battle: &mut Battle, hp_lost: i32) {}

    /// The player recovered `healed` HP.
    fn on_hp_recovery(&self, player: &mut Player, healed: i32) {}

    /// The discard pile was shuffled into the draw pile.
    fn on_shuffle(&self, battle: &mut Battle) {}

    /// A card was exhausted.
    fn on_card_exhaust(&self, battle: &mut Battle, card: &Card) {}

    /// A card was added to the master deck.
    fn on_card_add(&self, player: &mut Player, card: &Card) {}

    /// A potion was used.
    fn on_potion_use(&self, battle: &mut Battle, potion: &Potion) {}

    /// The player entered a room.
    fn on_room_enter(&self, player: &mut Player, room: RoomKind) {}

    /// Folds outgoing player attack damage.
    fn modify_damage_dealt(&self, player: &Player, damage: i32) -> i32 {
        damage
    }

    /// Folds block the player is about to gain from a card.
    fn modify_block_gained(&self, player: &Player, block: i32) -> i32 {
        block
    }

    /// Folds an amount the player is about to heal.
    fn modify_heal_amount(&self, player: &Player, amount: i32) -> i32 {
        amount
    }

    /// The player spent `amount` gold.
    fn on_gold_spend(&self, player: &mut Player, amount: u32) {}

    /// The player applied `amount` stacks of `kind` to `target`.
    fn on_apply_status(&self, battle: &mut Battle, target: EntityId, kind: StatusKind, amount: i32) {}

    /// The player gained `amount` block (always positive).
    ///
    /// Block gained from inside this callback notifies again.
    fn on_gain_block(&self, battle: &mut Battle, amount: i32) {}
}

/// Relics in acquisition order.
#[derive(Clone, Default)]
pub struct RelicRegistry {
    relics: Vec<Arc<dyn Relic>>,
}

impl RelicRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a relic.
    pub fn push(&mut self, relic: Arc<dyn Relic>) {
        trace!(relic = %relic.declaration().id, "relic registered");
        self.relics.push(relic);
    }

    /// Returns the number of relics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.relics.len()
    }

    /// Returns true if no relics are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relics.is_empty()
    }

    /// Iterates over relics in acquisition order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Relic>> + '_ {
        self.relics.iter()
    }

    /// Returns true if a relic with `id` is held.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.relics.iter().any(|relic| relic.declaration().id == id)
    }

    /// Snapshot of the relics subscribed to `point`, in acquisition order.
    ///
    /// The snapshot is owned so that callbacks may mutate the player that holds
    /// this registry; relics obtained during dispatch are not visited.
    #[must_use]
    pub fn subscribers(&self, point: HookPoints) -> Vec<Arc<dyn Relic>> {
        self.relics
            .iter()
            .filter(|relic| relic.declaration().hooks.contains(point))
            .cloned()
            .collect()
    }

    /// Folds `init` through every relic subscribed to `point`.
    pub fn fold<F>(&self, point: HookPoints, init: i32, mut f: F) -> i32
    where
        F: FnMut(&dyn Relic, i32) -> i32,
    {
        self.relics
            .iter()
            .filter(|relic| relic.declaration().hooks.contains(point))
            .fold(init, |value, relic| f(relic.as_ref(), value))
    }
}

impl fmt::Debug for RelicRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.relics.iter().map(|relic| &relic.declaration().id))
            .finish()
    }
}
