//! Reference content catalog.
//!
//! A small, playable set of cards, relics, potions, and enemies used by the
//! tests, the simulator, and the benchmarks:
//!
//! - [`cards`]: the starter deck, sample attacks/skills/powers, status cards
//!   and curses
//! - [`relics`]: one relic per hook family
//! - [`potions`]: flat damage, block, buffs, debuffs, energy
//! - [`enemies`]: scripted and weighted-random enemies, a splitting slime,
//!   and a thief that flees
//!
//! Every constructor returns a fresh value; content is never shared mutably.
//!
//! # Example
//!
//! ```
//! use cardcrawl_core::content::{cards, relics};
//! use cardcrawl_core::entity::Player;
//!
//! let mut player = Player::new(80).with_deck(cards::starter_deck());
//! player.obtain_relic(relics::burning_blood());
//! assert_eq!(player.master_deck().len(), 10);
//! ```

pub mod cards;
pub mod enemies;
pub mod potions;
pub mod relics;
