//! Potion catalog.

use crate::card::TargetType;
use crate::effect::effect;
use crate::entity::status::StatusKind;
use crate::potion::Potion;

/// Deals 20 damage to one enemy.
#[must_use]
pub fn fire_potion() -> Potion {
    Potion::new(
        "fire_potion",
        "Fire Potion",
        TargetType::Single,
        effect(|ctx| {
            if let Some(target) = ctx.target() {
                ctx.deal_damage(target, 20);
            }
        }),
    )
}

/// Deals 10 damage to every enemy.
#[must_use]
pub fn explosive_potion() -> Potion {
    Potion::new(
        "explosive_potion",
        "Explosive Potion",
        TargetType::All,
        effect(|ctx| {
            if let Some(target) = ctx.target() {
                ctx.deal_damage(target, 10);
            }
        }),
    )
}

/// Gains 12 block, unaffected by dexterity and frail.
#[must_use]
pub fn block_potion() -> Potion {
    Potion::new(
        "block_potion",
        "Block Potion",
        TargetType::SelfTarget,
        effect(|ctx| {
            ctx.battle_mut().player_gain_block_raw(12);
        }),
    )
}

/// Gains 2 strength.
#[must_use]
pub fn strength_potion() -> Potion {
    Potion::new(
        "strength_potion",
        "Strength Potion",
        TargetType::SelfTarget,
        effect(|ctx| {
            ctx.apply_self_status(StatusKind::Strength, 2);
        }),
    )
}

/// Applies 3 weak to one enemy.
#[must_use]
pub fn weak_potion() -> Potion {
    Potion::new(
        "weak_potion",
        "Weak Potion",
        TargetType::Single,
        effect(|ctx| {
            ctx.apply_target_status(StatusKind::Weak, 3);
        }),
    )
}

/// Gains 2 energy.
#[must_use]
pub fn energy_potion() -> Potion {
    Potion::new(
        "energy_potion",
        "Energy Potion",
        TargetType::SelfTarget,
        effect(|ctx| ctx.gain_energy(2)),
    )
}
