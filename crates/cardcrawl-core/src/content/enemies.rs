//! Enemy catalog.
//!
//! Behaviours read the enemy's move history rather than the battle turn, so
//! an enemy spawned mid-battle starts its pattern from the beginning.

use std::sync::Arc;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::card::pile::PileKind;
use crate::content::cards;
use crate::entity::enemy::intent_effect;
use crate::entity::status::StatusKind;
use crate::entity::{Enemy, EnemyBehavior, EnemyTemplate, Intent};

// =============================================================================
// Cultist
// =============================================================================

struct Cultist;

impl EnemyBehavior for Cultist {
    fn next_intent(&self, enemy: &Enemy, _turn: u32, _rng: &mut ChaCha8Rng) -> Intent {
        if enemy.history().is_empty() {
            Intent::buff(
                "Incantation",
                intent_effect(|ctx| {
                    ctx.apply_self_status(StatusKind::Ritual, 3);
                }),
            )
        } else {
            Intent::attack("Dark Strike", 6)
        }
    }
}

/// Cultist: gains ritual on its first turn, then attacks for 6 every turn.
#[must_use]
pub fn cultist() -> EnemyTemplate {
    EnemyTemplate::new("Cultist", 48..=54, Arc::new(Cultist))
}

// =============================================================================
// Jaw Worm
// =============================================================================

const CHOMP: &str = "Chomp";
const THRASH: &str = "Thrash";
const BELLOW: &str = "Bellow";

struct JawWorm;

impl JawWorm {
    fn intent(name: &str) -> Intent {
        match name {
            THRASH => Intent::attack(THRASH, 7).with_effect(intent_effect(|ctx| {
                ctx.gain_block(5);
            })),
            BELLOW => Intent::buff(
                BELLOW,
                intent_effect(|ctx| {
                    ctx.apply_self_status(StatusKind::Strength, 3);
                    ctx.gain_block(6);
                }),
            ),
            _ => Intent::attack(CHOMP, 11),
        }
    }
}

impl EnemyBehavior for JawWorm {
    fn next_intent(&self, enemy: &Enemy, _turn: u32, rng: &mut ChaCha8Rng) -> Intent {
        if enemy.history().is_empty() {
            return Self::intent(CHOMP);
        }
        let roll = rng.gen_range(0..100);
        let pick = match roll {
            0..=24 => CHOMP,
            25..=54 => THRASH,
            _ => BELLOW,
        };
        // Chomp and Bellow never repeat.
        let pick = if pick != THRASH && enemy.last_move() == Some(pick) {
            THRASH
        } else {
            pick
        };
        Self::intent(pick)
    }
}

/// Jaw Worm: opens with Chomp, then picks weighted moves without repeating
/// Chomp or Bellow.
#[must_use]
pub fn jaw_worm() -> EnemyTemplate {
    EnemyTemplate::new("Jaw Worm", 40..=44, Arc::new(JawWorm))
}

// =============================================================================
// Red Louse
// =============================================================================

const BITE: &str = "Bite";
const GROW: &str = "Grow";

struct RedLouse;

impl EnemyBehavior for RedLouse {
    fn next_intent(&self, enemy: &Enemy, _turn: u32, rng: &mut ChaCha8Rng) -> Intent {
        let history = enemy.history();
        let bit_twice = history.len() >= 2 && history[history.len() - 2..].iter().all(|m| m == BITE);
        let grow = if bit_twice {
            true
        } else if enemy.last_move() == Some(GROW) {
            false
        } else {
            rng.gen_bool(0.25)
        };
        if grow {
            Intent::buff(
                GROW,
                intent_effect(|ctx| {
                    ctx.apply_self_status(StatusKind::Strength, 3);
                }),
            )
        } else {
            Intent::attack(BITE, 6)
        }
    }

    fn on_spawn(&self, enemy: &mut Enemy, rng: &mut ChaCha8Rng) {
        let curl_up = rng.gen_range(3..=7);
        enemy.combat.statuses_mut().add(StatusKind::CurlUp, curl_up);
    }
}

/// Red Louse: curls up (3-7 block) the first time it loses HP; bites for 6 or
/// grows stronger.
#[must_use]
pub fn red_louse() -> EnemyTemplate {
    EnemyTemplate::new("Red Louse", 10..=15, Arc::new(RedLouse))
}

// =============================================================================
// Slimes
// =============================================================================

const FLAME_TACKLE: &str = "Flame Tackle";
const LICK: &str = "Lick";

fn flame_tackle(damage: i32, slimed: usize) -> Intent {
    Intent::attack(FLAME_TACKLE, damage).with_effect(intent_effect(move |ctx| {
        for _ in 0..slimed {
            ctx.add_card(cards::slimed(), PileKind::Discard);
        }
    }))
}

fn lick(frail: i32) -> Intent {
    Intent::debuff(
        LICK,
        intent_effect(move |ctx| {
            ctx.apply_player_status(StatusKind::Frail, frail);
        }),
    )
}

struct LargeSlime;

impl EnemyBehavior for LargeSlime {
    fn next_intent(&self, enemy: &Enemy, _turn: u32, _rng: &mut ChaCha8Rng) -> Intent {
        if enemy.combat.hp() * 2 <= enemy.combat.max_hp() {
            return Intent::special(
                "Split",
                intent_effect(|ctx| {
                    ctx.split_into(&medium_slime(), &medium_slime());
                }),
            );
        }
        if enemy.last_move() == Some(FLAME_TACKLE) {
            lick(2)
        } else {
            flame_tackle(16, 2)
        }
    }
}

/// Large Slime: alternates Flame Tackle and Lick; at half HP or less it
/// splits into two medium slimes sharing its remaining HP.
#[must_use]
pub fn large_slime() -> EnemyTemplate {
    EnemyTemplate::new("Large Slime", 64..=70, Arc::new(LargeSlime))
}

struct MediumSlime;

impl EnemyBehavior for MediumSlime {
    fn next_intent(&self, enemy: &Enemy, _turn: u32, _rng: &mut ChaCha8Rng) -> Intent {
        if enemy.last_move() == Some(FLAME_TACKLE) {
            lick(1)
        } else {
            flame_tackle(8, 1)
        }
    }
}

/// Medium Slime: alternates Flame Tackle and Lick.
#[must_use]
pub fn medium_slime() -> EnemyTemplate {
    EnemyTemplate::new("Medium Slime", 28..=32, Arc::new(MediumSlime))
}

// =============================================================================
// Looter
// =============================================================================

struct Looter;

impl EnemyBehavior for Looter {
    fn next_intent(&self, enemy: &Enemy, _turn: u32, _rng: &mut ChaCha8Rng) -> Intent {
        match enemy.history().len() {
            0 | 1 => Intent::attack("Mug", 10),
            2 => Intent::buff(
                "Smoke Bomb",
                intent_effect(|ctx| {
                    ctx.gain_block(6);
                }),
            ),
            _ => Intent::special("Escape", intent_effect(|ctx| ctx.flee())),
        }
    }
}

/// Looter: mugs twice, throws a smoke bomb, then escapes on its fourth move.
#[must_use]
pub fn looter() -> EnemyTemplate {
    EnemyTemplate::new("Looter", 44..=48, Arc::new(Looter))
}

// =============================================================================
// Sentry
// =============================================================================

const BOLT: &str = "Bolt";

struct Sentry;

impl EnemyBehavior for Sentry {
    fn next_intent(&self, enemy: &Enemy, _turn: u32, _rng: &mut ChaCha8Rng) -> Intent {
        if enemy.last_move() == Some(BOLT) {
            Intent::attack("Beam", 9)
        } else {
            Intent::debuff(
                BOLT,
                intent_effect(|ctx| {
                    for _ in 0..2 {
                        ctx.add_card(cards::dazed(), PileKind::Discard);
                    }
                }),
            )
        }
    }

    fn on_spawn(&self, enemy: &mut Enemy, _rng: &mut ChaCha8Rng) {
        enemy.combat.statuses_mut().add(StatusKind::Artifact, 1);
    }
}

/// Sentry: starts with 1 artifact; alternates shuffling Dazed into the
/// discard pile and a 9 damage beam.
#[must_use]
pub fn sentry() -> EnemyTemplate {
    EnemyTemplate::new("Sentry", 38..=42, Arc::new(Sentry))
}

// =============================================================================
// Dummy
// =============================================================================

struct Dummy;

impl EnemyBehavior for Dummy {
    fn next_intent(&self, _enemy: &Enemy, _turn: u32, _rng: &mut ChaCha8Rng) -> Intent {
        Intent::special("Wait", intent_effect(|_ctx| {}))
    }
}

/// A target with exactly `hp` HP that never does anything.
#[must_use]
pub fn dummy(hp: i32) -> EnemyTemplate {
    EnemyTemplate::new("Dummy", hp..=hp, Arc::new(Dummy))
}
