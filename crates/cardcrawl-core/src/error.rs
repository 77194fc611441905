//! Error types.
//!
//! Rejected player actions never change state, so every variant of
//! [`ActionRejected`] is safe to ignore. [`InvariantViolation`] reports a
//! broken structural invariant and indicates an engine bug.

use thiserror::Error;

use crate::battle::Phase;
use crate::card::CardUid;

/// Why a player action was not performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionRejected {
    /// The battle has been won or lost.
    #[error("the battle is over")]
    BattleOver,
    /// The action is not legal in the current phase.
    #[error("not allowed during the {0} phase")]
    WrongPhase(Phase),
    /// Another action is still resolving.
    #[error("another action is still resolving")]
    Busy,
    /// No card at this hand index.
    #[error("no card at hand index {0}")]
    NoSuchCard(usize),
    /// No potion in this slot.
    #[error("no potion in slot {0}")]
    NoSuchPotion(usize),
    /// The card can never be played (curse, negative cost).
    #[error("this card cannot be played")]
    Unplayable,
    /// The player cannot pay the cost.
    #[error("not enough energy")]
    InsufficientEnergy,
    /// Attacks are blocked by `entangled`.
    #[error("entangled: attacks cannot be played")]
    Entangled,
    /// The card needs a living enemy and none exists.
    #[error("no living enemy to target")]
    NoTarget,
}

/// A broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A card instance appears in more than one pile, or twice in one.
    #[error("card {0} appears more than once across the battle piles")]
    DuplicateCard(CardUid),
    /// A battle card has no uid.
    #[error("a battle card has no uid")]
    MissingUid,
    /// Cards were lost or created outside the engine.
    #[error("expected {expected} cards across the battle piles, found {found}")]
    CardCount {
        /// Cards the engine created.
        expected: usize,
        /// Cards found in piles.
        found: usize,
    },
    /// HP outside `[0, max_hp]`.
    #[error("entity {entity} has hp {hp} outside [0, {max_hp}]")]
    HpOutOfRange {
        /// Entity id.
        entity: u64,
        /// Current HP.
        hp: i32,
        /// Max HP.
        max_hp: i32,
    },
    /// A zero-magnitude status entry was stored.
    #[error("entity {0} stores a zero status entry")]
    ZeroStatus(u64),
}
