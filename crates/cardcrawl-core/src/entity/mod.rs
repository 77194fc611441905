//! Entity model: identity, HP, block, and the damage pipeline.
//!
//! This module provides the combat state shared by the player and enemies:
//! - [`EntityId`]: Stable identifier used for targeting
//! - [`DamageSource`]: Where a hit came from (decides reflect and rupture)
//! - [`CombatState`]: HP, block, and the [`StatusLedger`]
//!
//! # Architecture
//!
//! [`CombatState`] performs all per-entity arithmetic. Effects that reach
//! beyond one entity (reflecting thorns back at the attacker, player-only
//! bookkeeping, relic hooks) are reported in a [`DamageOutcome`] and applied by
//! the battle engine.
//!
//! # Example
//!
//! ```
//! use cardcrawl_core::entity::{CombatState, DamageSource, EntityId};
//! use cardcrawl_core::entity::status::StatusKind;
//!
//! let mut target = CombatState::new(20);
//! target.statuses_mut().add(StatusKind::Vulnerable, 1);
//! target.gain_block_raw(5);
//!
//! let outcome = target.take_damage(10, DamageSource::Entity(EntityId::PLAYER));
//! assert_eq!(outcome.incoming, 15);
//! assert_eq!(outcome.blocked, 5);
//! assert_eq!(outcome.hp_lost, 10);
//! assert_eq!(target.hp(), 10);
//! ```

pub mod enemy;
pub mod player;
pub mod status;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

use crate::config::rules;
use status::{StatusKind, StatusLedger};

pub use enemy::{Enemy, EnemyBehavior, EnemyTemplate, Intent, IntentKind};
pub use player::{Player, RoomKind};

/// Unique identifier for a combatant.
///
/// The player is always [`EntityId::PLAYER`]; enemies receive monotonically
/// increasing ids starting at 1, so ids are never reused within a battle.
///
/// # Example
///
/// ```
/// use cardcrawl_core::entity::EntityId;
///
/// let id = EntityId::new(3);
/// assert_eq!(id.as_u64(), 3);
/// assert!(EntityId::PLAYER < id);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// The player's identifier.
    pub const PLAYER: Self = Self(0);

    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns true if this is the player's identifier.
    #[must_use]
    pub const fn is_player(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Origin of a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageSource {
    /// An attack by another combatant; thorns and flame barrier reflect to it.
    Entity(EntityId),
    /// Reflected damage. Never reflected again.
    Reflect,
    /// Self-inflicted or environmental damage (burns, HP costs, relics).
    Unsourced,
}

impl DamageSource {
    /// Returns the attacking entity, if any.
    #[must_use]
    pub const fn attacker(self) -> Option<EntityId> {
        match self {
            Self::Entity(id) => Some(id),
            Self::Reflect | Self::Unsourced => None,
        }
    }
}

/// What happened when an entity took a hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageOutcome {
    /// Damage after the target's modifiers, before block.
    pub incoming: i32,
    /// Damage absorbed by block.
    pub blocked: i32,
    /// HP actually removed.
    pub hp_lost: i32,
    /// Damage owed back to the attacker (thorns plus flame barrier).
    pub reflect: i32,
    /// Block granted by `curl_up`.
    pub curl_up_block: i32,
    /// True if this hit reduced the entity from alive to dead.
    pub killed: bool,
}

/// HP, block, and statuses for one combatant.
///
/// Fields are private so that `0 <= hp <= max_hp` and `block >= 0` always
/// hold; every mutator clamps its input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    hp: i32,
    max_hp: i32,
    block: i32,
    statuses: StatusLedger,
}

impl CombatState {
    /// Creates a combatant at full health.
    ///
    /// A non-positive `max_hp` is raised to 1.
    #[must_use]
    pub fn new(max_hp: i32) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            hp: max_hp,
            max_hp,
            block: 0,
            statuses: StatusLedger::new(),
        }
    }

    /// Creates a combatant with `hp` out of `max_hp`.
    #[must_use]
    pub fn with_hp(hp: i32, max_hp: i32) -> Self {
        let mut state = Self::new(max_hp);
        state.hp = hp.clamp(0, state.max_hp);
        state
    }

    /// Current HP.
    #[must_use]
    pub const fn hp(&self) -> i32 {
        self.hp
    }

    /// Maximum HP.
    #[must_use]
    pub const fn max_hp(&self) -> i32 {
        self.max_hp
    }

    /// Current block.
    #[must_use]
    pub const fn block(&self) -> i32 {
        self.block
    }

    /// Returns true while HP is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// The status ledger.
    #[must_use]
    pub const fn statuses(&self) -> &StatusLedger {
        &self.statuses
    }

    /// The status ledger, mutably.
    pub fn statuses_mut(&mut self) -> &mut StatusLedger {
        &mut self.statuses
    }

    /// Outgoing damage for an attack with `base` damage.
    ///
    /// Adds `strength`, applies `weak` (x0.75, floor), and clamps at zero.
    #[must_use]
    pub fn calculate_damage(&self, base: i32) -> i32 {
        let mut damage = base + self.statuses.get(StatusKind::Strength);
        if self.statuses.has(StatusKind::Weak) {
            damage = rules::scale_floor(damage, rules::WEAK_MULTIPLIER);
        }
        damage.max(0)
    }

    /// Incoming damage after this entity's own modifiers (`vulnerable`).
    #[must_use]
    pub fn apply_target_modifiers(&self, raw: i32) -> i32 {
        let raw = raw.max(0);
        if self.statuses.has(StatusKind::Vulnerable) {
            rules::scale_ceil(raw, rules::VULNERABLE_MULTIPLIER)
        } else {
            raw
        }
    }

    /// Block actually gained from a block card worth `base`.
    ///
    /// Adds `dexterity`, applies `frail` (x0.75, floor), and clamps at zero.
    #[must_use]
    pub fn calculate_block(&self, base: i32) -> i32 {
        let mut block = base + self.statuses.get(StatusKind::Dexterity);
        if self.statuses.has(StatusKind::Frail) {
            block = rules::scale_floor(block, rules::FRAIL_MULTIPLIER);
        }
        block.max(0)
    }

    /// Gains block through `dexterity` and `frail`. Returns the block gained.
    pub fn gain_block(&mut self, base: i32) -> i32 {
        let amount = self.calculate_block(base);
        self.gain_block_raw(amount)
    }

    /// Gains exactly `amount` block (negative input is ignored).
    pub fn gain_block_raw(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0);
        self.block += amount;
        amount
    }

    /// Drops all block.
    pub fn clear_block(&mut self) {
        self.block = 0;
    }

    /// Restores up to `amount` HP, returning the HP actually restored.
    ///
    /// The dead are not healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if !self.is_alive() {
            return 0;
        }
        let healed = amount.max(0).min(self.max_hp - self.hp);
        self.hp += healed;
        healed
    }

    /// Raises max HP and current HP by `amount`.
    pub fn increase_max_hp(&mut self, amount: i32) {
        let amount = amount.max(0);
        self.max_hp += amount;
        self.hp += amount;
    }

    /// Sets HP directly, clamped to `[0, max_hp]`.
    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.clamp(0, self.max_hp);
    }

    /// Applies a hit of `raw` damage through the per-entity pipeline.
    ///
    /// # Processing Order
    ///
    /// 1. Target modifiers (`vulnerable`)
    /// 2. Block absorbs first; the overflow becomes HP loss
    /// 3. HP floors at zero
    /// 4. `curl_up` grants its block on the first HP loss and is consumed
    /// 5. Reflect (`thorns + flame_barrier`) is computed for entity sources
    /// 6. `plated_armor` loses a stack if HP was lost
    ///
    /// Reflect is only reported; the caller routes it back to the attacker.
    pub fn take_damage(&mut self, raw: i32, source: DamageSource) -> DamageOutcome {
        let was_alive = self.is_alive();
        let incoming = self.apply_target_modifiers(raw);
        let blocked = incoming.min(self.block);
        self.block -= blocked;
        let overflow = incoming - blocked;
        let hp_lost = overflow.min(self.hp);
        self.hp -= hp_lost;

        let mut outcome = DamageOutcome {
            incoming,
            blocked,
            hp_lost,
            killed: was_alive && !self.is_alive(),
            ..DamageOutcome::default()
        };

        if hp_lost > 0 && self.statuses.has(StatusKind::CurlUp) {
            let curl = self.statuses.remove(StatusKind::CurlUp);
            if self.is_alive() {
                outcome.curl_up_block = self.gain_block_raw(curl);
            }
        }

        if source.attacker().is_some() {
            outcome.reflect = (self.statuses.get(StatusKind::Thorns)
                + self.statuses.get(StatusKind::FlameBarrier))
            .max(0);
        }

        if hp_lost > 0 && self.statuses.get(StatusKind::PlatedArmor) > 0 {
            self.statuses.adjust(StatusKind::PlatedArmor, -1);
        }

        trace!(
            raw,
            incoming,
            blocked,
            hp_lost,
            reflect = outcome.reflect,
            hp = self.hp,
            "damage resolved"
        );
        outcome
    }
}
