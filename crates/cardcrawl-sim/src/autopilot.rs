//! Greedy autopilot.
//!
//! The autopilot is deliberately simple: it plays the leftmost playable card
//! at the weakest living enemy until nothing is playable, drinks its potions
//! once HP falls below half, and ends the turn. Selections take the leftmost
//! candidates.

use cardcrawl_core::card::TargetType;
use cardcrawl_core::entity::EntityId;
use cardcrawl_core::host::{BattleHost, BattleResult, SelectionRequest};
use cardcrawl_core::Battle;
use tracing::{debug, trace};

/// Host used by simulated battles.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutopilotHost;

impl BattleHost for AutopilotHost {
    fn battle_ended(&mut self, result: BattleResult) {
        debug!(?result, "autopilot battle ended");
    }

    fn select(&mut self, request: &SelectionRequest<'_>) -> Vec<usize> {
        trace!(prompt = request.prompt, count = request.count, "autopilot selection");
        (0..request.count.min(request.candidates.len())).collect()
    }
}

/// The living enemy with the least HP, leftmost on ties.
#[must_use]
pub fn weakest_enemy(battle: &Battle) -> Option<EntityId> {
    battle
        .arena()
        .living()
        .min_by_key(|enemy| enemy.combat.hp())
        .map(cardcrawl_core::entity::Enemy::id)
}

/// Plays one player turn and ends it.
///
/// # Returns
///
/// Number of cards played.
pub fn play_turn(battle: &mut Battle) -> usize {
    let mut played = 0;
    drink_potions(battle);
    while !battle.is_over() && play_one_card(battle) {
        played += 1;
    }
    if !battle.is_over() {
        if let Err(reason) = battle.end_turn() {
            debug!(%reason, "autopilot could not end the turn");
        }
    }
    played
}

fn play_one_card(battle: &mut Battle) -> bool {
    let target = weakest_enemy(battle);
    for index in 0..battle.player().hand.len() {
        let Some(card) = battle.player().hand.get(index) else {
            break;
        };
        if !card.is_affordable(battle.player()) {
            continue;
        }
        let target = if card.target() == TargetType::Single {
            target
        } else {
            None
        };
        let id = card.id().to_owned();
        if battle.play_card(index, target).is_ok() {
            trace!(card = %id, ?target, "autopilot played");
            return true;
        }
    }
    false
}

fn drink_potions(battle: &mut Battle) {
    let combat = &battle.player().combat;
    if combat.hp() * 2 >= combat.max_hp() {
        return;
    }
    for slot in 0..battle.player().potions().len() {
        if battle.player().potion(slot).is_none() {
            continue;
        }
        let target = weakest_enemy(battle);
        if battle.use_potion(slot, target).is_ok() {
            debug!(slot, "autopilot drank a potion");
        }
        if battle.is_over() {
            return;
        }
    }
}

/// Plays turns until the battle ends or `max_turns` have started.
///
/// # Returns
///
/// Number of cards played.
pub fn autoplay(battle: &mut Battle, max_turns: u32) -> usize {
    let mut played = 0;
    while !battle.is_over() && battle.turn() <= max_turns {
        let turn = battle.turn();
        played += play_turn(battle);
        if battle.turn() == turn && !battle.is_over() {
            break;
        }
    }
    played
}
