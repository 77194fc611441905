//! Battle runner and summaries.

use cardcrawl_core::entity::EntityId;
use cardcrawl_core::host::BattleResult;
use cardcrawl_core::{Battle, BattleEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::autopilot::{autoplay, AutopilotHost};
use crate::config::{ConfigError, SimConfig};

/// Outcome of one simulated battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSummary {
    /// Seed the battle ran with.
    pub seed: u64,
    /// `None` if the turn limit was reached first.
    pub result: Option<BattleResult>,
    /// Turn on which the battle ended (or was abandoned).
    pub turns: u32,
    /// Player HP at the end.
    pub player_hp: i32,
    /// Player max HP at the end.
    pub player_max_hp: i32,
    /// Cards played.
    pub cards_played: usize,
    /// HP removed from enemies.
    pub damage_dealt: i32,
    /// HP removed from the player.
    pub damage_taken: i32,
    /// Events recorded.
    pub events: usize,
}

impl BattleSummary {
    fn from_battle(seed: u64, battle: &Battle) -> Self {
        let events = battle.events();
        let mut damage_dealt = 0;
        let mut damage_taken = 0;
        let mut cards_played = 0;
        for event in events {
            match event {
                BattleEvent::DamageDealt {
                    target, hp_lost, ..
                } => {
                    if *target == EntityId::PLAYER {
                        damage_taken += hp_lost;
                    } else {
                        damage_dealt += hp_lost;
                    }
                }
                BattleEvent::CardPlayed { .. } => cards_played += 1,
                _ => {}
            }
        }
        Self {
            seed,
            result: battle.result(),
            turns: battle.turn(),
            player_hp: battle.player().combat.hp(),
            player_max_hp: battle.player().combat.max_hp(),
            cards_played,
            damage_dealt,
            damage_taken,
            events: events.len(),
        }
    }
}

/// Summaries of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Battles won.
    pub wins: usize,
    /// Battles lost.
    pub losses: usize,
    /// Battles abandoned at the turn limit.
    pub unfinished: usize,
    /// One summary per battle, in seed order.
    pub battles: Vec<BattleSummary>,
}

/// Plays one battle with `seed`.
///
/// # Errors
///
/// The configuration names unknown content or has invalid numbers.
pub fn run_battle(config: &SimConfig, seed: u64) -> Result<BattleSummary, ConfigError> {
    let player = config.build_player()?;
    let encounter = config.build_encounter()?;
    let mut battle = Battle::new(player, &encounter, seed)
        .with_config(config.battle.clone())
        .with_host(AutopilotHost);
    battle.start();
    let played = autoplay(&mut battle, config.max_turns);
    debug!(seed, played, "autoplay finished");

    let summary = BattleSummary::from_battle(seed, &battle);
    info!(
        seed,
        result = ?summary.result,
        turns = summary.turns,
        hp = summary.player_hp,
        "battle simulated"
    );
    Ok(summary)
}

/// Plays `config.battles` battles with consecutive seeds.
///
/// # Errors
///
/// The configuration is invalid; checked before any battle is played.
pub fn run(config: &SimConfig) -> Result<RunReport, ConfigError> {
    config.validate()?;
    let battles = (0..u64::from(config.battles))
        .map(|offset| run_battle(config, config.seed.wrapping_add(offset)))
        .collect::<Result<Vec<_>, _>>()?;
    let count = |result| battles.iter().filter(|b| b.result == result).count();
    Ok(RunReport {
        wins: count(Some(BattleResult::Win)),
        losses: count(Some(BattleResult::Lose)),
        unfinished: count(None),
        battles,
    })
}
