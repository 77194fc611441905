//! # Cardcrawl Core
//!
//! Combat resolution core for the cardcrawl deck-building battler.
//!
//! This crate provides the deterministic rules engine that turns a hand of
//! cards, a set of status effects, and enemy intents into a sequence of state
//! transitions: block before HP loss, vulnerability before block, thorns after
//! damage.
//!
//! ## Architecture
//!
//! - **Status ledger** ([`entity::status`]): stacking, artifact negation, and
//!   turn-end decay
//! - **Entities** ([`entity`]): the damage, block, and heal pipeline shared by
//!   the player and enemies
//! - **Cards** ([`card`], [`effect`]): cost precedence, targeting, and effect
//!   resolution
//! - **Hooks** ([`hook`]): relic observers dispatched in acquisition order
//! - **Battle** ([`battle`], [`arena`]): the turn state machine
//!
//! The engine talks to its driver through [`host::BattleHost`] and records
//! every visible change in an [`event::EventLog`].
//!
//! ## Usage
//!
//! ```
//! use cardcrawl_core::battle::Battle;
//! use cardcrawl_core::content::{cards, enemies, relics};
//! use cardcrawl_core::entity::Player;
//!
//! let mut player = Player::new(80).with_deck(cards::starter_deck());
//! player.obtain_relic(relics::burning_blood());
//!
//! let mut battle = Battle::new(player, &[enemies::jaw_worm()], 42);
//! battle.start();
//! battle.end_turn().unwrap();
//! assert_eq!(battle.turn(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod battle;
pub mod card;
pub mod config;
pub mod content;
pub mod effect;
pub mod entity;
pub mod error;
pub mod event;
pub mod hook;
pub mod host;
pub mod potion;
pub mod view;

#[cfg(test)]
mod tests;

pub use arena::Arena;
pub use battle::{Battle, Phase};
pub use card::{Card, CardCost, CardType, TargetType};
pub use config::BattleConfig;
pub use entity::{EntityId, Player};
pub use error::ActionRejected;
pub use event::BattleEvent;
pub use host::{BattleHost, BattleResult};
