//! Enemies, their intents, and the behaviour trait that chooses them.
//!
//! An enemy decides its next [`Intent`] at the start of every player turn via
//! its [`EnemyBehavior`]. The intent is displayed to the player before the
//! enemy turn executes it; an enemy without a displayed intent does nothing.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::battle::Battle;
use crate::card::pile::PileKind;
use crate::card::Card;
use crate::entity::status::StatusKind;
use crate::entity::{CombatState, EntityId};

/// Broad category of an intent, shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Deals damage.
    Attack,
    /// Strengthens the enemy.
    Buff,
    /// Weakens the player.
    Debuff,
    /// Anything else (splitting, fleeing, summoning).
    Special,
}

/// Side effect of an intent, run after its attack hits.
pub trait IntentEffect: Send + Sync {
    /// Applies the effect on behalf of `ctx.actor()`.
    fn apply(&self, ctx: &mut EnemyContext<'_>);
}

impl<F> IntentEffect for F
where
    F: Fn(&mut EnemyContext<'_>) + Send + Sync,
{
    fn apply(&self, ctx: &mut EnemyContext<'_>) {
        self(ctx);
    }
}

/// Wraps a closure as a shareable intent effect.
pub fn intent_effect<F>(f: F) -> Arc<dyn IntentEffect>
where
    F: Fn(&mut EnemyContext<'_>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// What an enemy will do on its next turn.
#[derive(Clone)]
pub struct Intent {
    /// Category shown to the player.
    pub kind: IntentKind,
    /// Move name.
    pub name: String,
    /// Base damage per hit for attacks.
    pub value: Option<i32>,
    /// Number of hits for attacks (1 when absent).
    pub times: Option<u32>,
    /// Side effect run after the attack.
    pub effect: Option<Arc<dyn IntentEffect>>,
}

impl Intent {
    fn new(kind: IntentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            value: None,
            times: None,
            effect: None,
        }
    }

    /// An attack for `damage` base damage.
    #[must_use]
    pub fn attack(name: impl Into<String>, damage: i32) -> Self {
        Self {
            value: Some(damage),
            ..Self::new(IntentKind::Attack, name)
        }
    }

    /// A buff intent running `effect`.
    #[must_use]
    pub fn buff(name: impl Into<String>, effect: Arc<dyn IntentEffect>) -> Self {
        Self::new(IntentKind::Buff, name).with_effect(effect)
    }

    /// A debuff intent running `effect`.
    #[must_use]
    pub fn debuff(name: impl Into<String>, effect: Arc<dyn IntentEffect>) -> Self {
        Self::new(IntentKind::Debuff, name).with_effect(effect)
    }

    /// A special intent running `effect`.
    #[must_use]
    pub fn special(name: impl Into<String>, effect: Arc<dyn IntentEffect>) -> Self {
        Self::new(IntentKind::Special, name).with_effect(effect)
    }

    /// Repeats the attack `times` times.
    #[must_use]
    pub fn times(mut self, times: u32) -> Self {
        self.times = Some(times);
        self
    }

    /// Attaches a side effect.
    #[must_use]
    pub fn with_effect(mut self, effect: Arc<dyn IntentEffect>) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Number of hits (at least 1).
    #[must_use]
    pub fn hits(&self) -> u32 {
        self.times.unwrap_or(1).max(1)
    }

    /// Base damage per hit if this intent attacks.
    #[must_use]
    pub fn attack_value(&self) -> Option<i32> {
        match self.kind {
            IntentKind::Attack => self.value.filter(|value| *value > 0),
            _ => None,
        }
    }
}

impl fmt::Debug for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Intent")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("value", &self.value)
            .field("times", &self.times)
            .field("has_effect", &self.effect.is_some())
            .finish()
    }
}

/// Chooses an enemy's intents.
pub trait EnemyBehavior: Send + Sync {
    /// Picks the intent to display for the coming turn.
    ///
    /// # Arguments
    ///
    /// * `enemy` - The enemy choosing (its move history is available)
    /// * `turn` - The battle turn about to start (1-based)
    /// * `rng` - The battle's random stream
    fn next_intent(&self, enemy: &Enemy, turn: u32, rng: &mut ChaCha8Rng) -> Intent;

    /// Called once when the enemy is spawned, before the first intent.
    #[allow(unused_variables)]
    fn on_spawn(&self, enemy: &mut Enemy, rng: &mut ChaCha8Rng) {}
}

/// Recipe for spawning an enemy.
#[derive(Clone)]
pub struct EnemyTemplate {
    /// Display name.
    pub name: String,
    /// Max HP rolled uniformly from this range.
    pub hp: RangeInclusive<i32>,
    /// Intent selection.
    pub behavior: Arc<dyn EnemyBehavior>,
}

impl EnemyTemplate {
    /// Creates a template.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        hp: RangeInclusive<i32>,
        behavior: Arc<dyn EnemyBehavior>,
    ) -> Self {
        Self {
            name: name.into(),
            hp,
            behavior,
        }
    }

    pub(crate) fn roll_hp(&self, rng: &mut ChaCha8Rng) -> i32 {
        let (low, high) = (*self.hp.start(), *self.hp.end());
        if low >= high {
            low
        } else {
            rng.gen_range(low..=high)
        }
    }
}

impl fmt::Debug for EnemyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnemyTemplate")
            .field("name", &self.name)
            .field("hp", &self.hp)
            .finish_non_exhaustive()
    }
}

/// A live enemy.
#[derive(Clone)]
pub struct Enemy {
    id: EntityId,
    name: String,
    /// HP, block, and statuses.
    pub combat: CombatState,
    next_move: Option<Intent>,
    behavior: Arc<dyn EnemyBehavior>,
    history: Vec<String>,
}

impl Enemy {
    /// Creates an enemy with explicit combat state.
    #[must_use]
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        combat: CombatState,
        behavior: Arc<dyn EnemyBehavior>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            combat,
            next_move: None,
            behavior,
            history: Vec::new(),
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true while HP is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.combat.is_alive()
    }

    /// The intent currently displayed to the player.
    #[must_use]
    pub const fn next_move(&self) -> Option<&Intent> {
        self.next_move.as_ref()
    }

    /// Replaces the displayed intent.
    pub fn set_next_move(&mut self, intent: Option<Intent>) {
        self.next_move = intent;
    }

    pub(crate) fn take_next_move(&mut self) -> Option<Intent> {
        self.next_move.take()
    }

    /// Names of executed moves, oldest first.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Name of the most recently executed move.
    #[must_use]
    pub fn last_move(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }

    pub(crate) fn record_move(&mut self, name: &str) {
        self.history.push(name.to_owned());
    }

    /// The behaviour choosing this enemy's intents.
    #[must_use]
    pub fn behavior(&self) -> Arc<dyn EnemyBehavior> {
        Arc::clone(&self.behavior)
    }
}

impl fmt::Debug for Enemy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enemy")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("combat", &self.combat)
            .field("next_move", &self.next_move)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

/// Engine access for an executing intent effect.
pub struct EnemyContext<'a> {
    battle: &'a mut Battle,
    actor: EntityId,
}

impl<'a> EnemyContext<'a> {
    pub(crate) fn new(battle: &'a mut Battle, actor: EntityId) -> Self {
        Self { battle, actor }
    }

    /// The acting enemy's id.
    #[must_use]
    pub const fn actor(&self) -> EntityId {
        self.actor
    }

    /// The acting enemy, if it is still present.
    #[must_use]
    pub fn enemy(&self) -> Option<&Enemy> {
        self.battle.arena().get(self.actor)
    }

    /// The battle, read-only.
    #[must_use]
    pub fn battle(&self) -> &Battle {
        &*self.battle
    }

    /// The battle, mutably.
    pub fn battle_mut(&mut self) -> &mut Battle {
        &mut *self.battle
    }

    /// The acting enemy gains block (through its dexterity and frail).
    pub fn gain_block(&mut self, amount: i32) -> i32 {
        self.battle.enemy_gain_block(self.actor, amount)
    }

    /// Applies a status to the acting enemy.
    pub fn apply_self_status(&mut self, kind: StatusKind, amount: i32) -> bool {
        self.battle
            .apply_status(Some(self.actor), self.actor, kind, amount)
    }

    /// Applies a status to the player.
    pub fn apply_player_status(&mut self, kind: StatusKind, amount: i32) -> bool {
        self.battle
            .apply_status(Some(self.actor), EntityId::PLAYER, kind, amount)
    }

    /// Shuffles a new card into one of the player's piles.
    pub fn add_card(&mut self, card: Card, pile: PileKind) {
        self.battle.add_card_to_pile(card, pile);
    }

    /// Replaces the acting enemy with two new ones sharing its remaining HP.
    pub fn split_into(&mut self, a: &EnemyTemplate, b: &EnemyTemplate) -> Option<(EntityId, EntityId)> {
        self.battle.split_enemy(self.actor, a, b)
    }

    /// Removes the acting enemy from the battle.
    pub fn flee(&mut self) {
        self.battle.remove_enemy(self.actor);
    }
}
