//! The host interface: how the engine talks to whatever drives it.
//!
//! A host is notified after visible state changes, told once when the battle
//! ends, asked to pick cards for selection effects, and given presentation
//! cues with their pacing delay. Every method has a default, so a host only
//! implements what it needs. [`NullHost`] implements none of them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::entity::EntityId;

/// Final outcome of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleResult {
    /// Every enemy died or fled.
    Win,
    /// The player died.
    Lose,
}

/// A moment the host may want to animate or pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    /// A hit is about to land on `target`.
    Hit {
        /// Entity being hit.
        target: EntityId,
        /// Damage before the target's block.
        amount: i32,
    },
    /// The enemy turn is about to resolve.
    EnemyTurn,
    /// An enemy is about to act.
    EnemyAction {
        /// The acting enemy.
        enemy: EntityId,
    },
}

/// A request to choose cards.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    /// Text shown to the player.
    pub prompt: &'a str,
    /// Cards to choose from (never empty).
    pub candidates: &'a [Card],
    /// Maximum number of cards to choose.
    pub count: usize,
}

/// Callbacks from the engine to its driver.
#[allow(unused_variables)]
pub trait BattleHost {
    /// State visible to the player changed.
    fn refresh(&mut self) {}

    /// The battle ended. Called exactly once.
    fn battle_ended(&mut self, result: BattleResult) {}

    /// Returns indices into `request.candidates`. Out-of-range and duplicate
    /// indices are ignored; returning nothing cancels the selection.
    fn select(&mut self, request: &SelectionRequest<'_>) -> Vec<usize> {
        Vec::new()
    }

    /// A presentation cue, with the configured delay for pacing.
    fn present(&mut self, cue: Cue, delay: Duration) {}
}

/// A host that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl BattleHost for NullHost {}
