//! # Cardcrawl Simulator
//!
//! Headless driver for [`cardcrawl_core`]: builds a player and an encounter
//! from a [`SimConfig`], plays seeded battles with a greedy autopilot, and
//! summarises each one as a serialisable [`BattleSummary`].
//!
//! ## Usage
//!
//! ```
//! use cardcrawl_sim::{run, SimConfig};
//!
//! let config = SimConfig::from_toml_str(
//!     r#"
//!     seed = 7
//!     battles = 2
//!     encounter = ["cultist"]
//!     "#,
//! )
//! .unwrap();
//!
//! let report = run(&config).unwrap();
//! assert_eq!(report.battles.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod autopilot;
pub mod catalog;
pub mod config;
pub mod runner;

pub use config::{ConfigError, SimConfig};
pub use runner::{run, run_battle, BattleSummary, RunReport};
