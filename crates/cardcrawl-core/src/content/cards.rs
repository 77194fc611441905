//! Card catalog.

use std::sync::Arc;

use rand::Rng;

use crate::card::pile::PileKind;
use crate::card::{Card, CardCost, CardType, CardValueFn, TargetType, UpgradeData};
use crate::effect::{effect, no_effect, Effect};
use crate::entity::status::StatusKind;
use crate::entity::Player;

fn value_fn<F>(f: F) -> CardValueFn
where
    F: Fn(&Player, &Card) -> i32 + Send + Sync + 'static,
{
    Arc::new(f)
}

fn upgraded(name: &str, description: &str) -> UpgradeData {
    UpgradeData {
        name: Some(name.to_owned()),
        description: Some(description.to_owned()),
        ..UpgradeData::default()
    }
}

/// Attacks the resolved target once.
fn single_hit() -> Arc<dyn Effect> {
    effect(|ctx| {
        ctx.attack_target();
    })
}

/// Applies `base` stacks of `kind` to the player (`boosted` when upgraded).
fn self_status(kind: StatusKind, base: i32, boosted: i32) -> Arc<dyn Effect> {
    effect(move |ctx| {
        let amount = if ctx.is_upgraded() { boosted } else { base };
        ctx.apply_self_status(kind, amount);
    })
}

// =============================================================================
// Starter deck
// =============================================================================

/// Strike: deal 6 damage (9 upgraded).
#[must_use]
pub fn strike() -> Card {
    Card::new(
        "strike",
        "Strike",
        CardCost::Fixed(1),
        CardType::Attack,
        TargetType::Single,
        single_hit(),
    )
    .with_description("Deal 6 damage.")
    .with_damage(6)
    .with_upgrade(UpgradeData {
        base_damage: Some(9),
        ..upgraded("Strike+", "Deal 9 damage.")
    })
}

/// Defend: gain 5 block (8 upgraded).
#[must_use]
pub fn defend() -> Card {
    Card::new(
        "defend",
        "Defend",
        CardCost::Fixed(1),
        CardType::Skill,
        TargetType::SelfTarget,
        effect(|ctx| {
            ctx.gain_card_block();
        }),
    )
    .with_description("Gain 5 Block.")
    .with_block(5)
    .with_upgrade(UpgradeData {
        base_block: Some(8),
        ..upgraded("Defend+", "Gain 8 Block.")
    })
}

fn bash_effect(vulnerable: i32) -> Arc<dyn Effect> {
    effect(move |ctx| {
        ctx.attack_target();
        ctx.apply_target_status(StatusKind::Vulnerable, vulnerable);
    })
}

/// Bash: deal 8 damage and apply 2 vulnerable (10 and 3 upgraded).
#[must_use]
pub fn bash() -> Card {
    Card::new(
        "bash",
        "Bash",
        CardCost::Fixed(2),
        CardType::Attack,
        TargetType::Single,
        bash_effect(2),
    )
    .with_description("Deal 8 damage. Apply 2 Vulnerable.")
    .with_damage(8)
    .with_upgrade(UpgradeData {
        base_damage: Some(10),
        effect: Some(bash_effect(3)),
        ..upgraded("Bash+", "Deal 10 damage. Apply 3 Vulnerable.")
    })
}

/// Five strikes, four defends, and a bash.
#[must_use]
pub fn starter_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(10);
    deck.extend(std::iter::repeat_with(strike).take(5));
    deck.extend(std::iter::repeat_with(defend).take(4));
    deck.push(bash());
    deck
}

// =============================================================================
// Attacks
// =============================================================================

/// Cleave: deal 8 damage to every enemy (11 upgraded).
#[must_use]
pub fn cleave() -> Card {
    Card::new(
        "cleave",
        "Cleave",
        CardCost::Fixed(1),
        CardType::Attack,
        TargetType::All,
        single_hit(),
    )
    .with_description("Deal 8 damage to ALL enemies.")
    .with_damage(8)
    .with_upgrade(UpgradeData {
        base_damage: Some(11),
        ..upgraded("Cleave+", "Deal 11 damage to ALL enemies.")
    })
}

/// Twin Strike: deal 5 damage twice (7 upgraded).
#[must_use]
pub fn twin_strike() -> Card {
    Card::new(
        "twin_strike",
        "Twin Strike",
        CardCost::Fixed(1),
        CardType::Attack,
        TargetType::Single,
        effect(|ctx| {
            for _ in 0..2 {
                ctx.attack_target();
            }
        }),
    )
    .with_description("Deal 5 damage twice.")
    .with_damage(5)
    .with_upgrade(UpgradeData {
        base_damage: Some(7),
        ..upgraded("Twin Strike+", "Deal 7 damage twice.")
    })
}

/// Whirlwind: deal 5 damage to every enemy X times (8 upgraded).
#[must_use]
pub fn whirlwind() -> Card {
    Card::new(
        "whirlwind",
        "Whirlwind",
        CardCost::X,
        CardType::Attack,
        TargetType::All,
        effect(|ctx| {
            for _ in 0..ctx.x_value() {
                ctx.attack_target();
            }
        }),
    )
    .with_description("Deal 5 damage to ALL enemies X times.")
    .with_damage(5)
    .with_upgrade(UpgradeData {
        base_damage: Some(8),
        ..upgraded("Whirlwind+", "Deal 8 damage to ALL enemies X times.")
    })
}

/// Pommel Strike: deal 9 damage, draw 1 (10 and 2 upgraded).
#[must_use]
pub fn pommel_strike() -> Card {
    Card::new(
        "pommel_strike",
        "Pommel Strike",
        CardCost::Fixed(1),
        CardType::Attack,
        TargetType::Single,
        effect(|ctx| {
            ctx.attack_target();
            let draw = if ctx.is_upgraded() { 2 } else { 1 };
            ctx.draw(draw);
        }),
    )
    .with_description("Deal 9 damage. Draw 1 card.")
    .with_damage(9)
    .with_upgrade(UpgradeData {
        base_damage: Some(10),
        ..upgraded("Pommel Strike+", "Deal 10 damage. Draw 2 cards.")
    })
}

/// Rampage: deal 8 damage; this card's damage grows by 5 each play (8
/// upgraded) for the rest of the battle.
#[must_use]
pub fn rampage() -> Card {
    Card::new(
        "rampage",
        "Rampage",
        CardCost::Fixed(1),
        CardType::Attack,
        TargetType::Single,
        effect(|ctx| {
            ctx.attack_target();
            let growth = if ctx.is_upgraded() { 8 } else { 5 };
            if let Some(card) = ctx.card_mut() {
                card.add_misc_value(growth);
            }
        }),
    )
    .with_description("Deal 8 damage. Increase this card's damage by 5 this combat.")
    .with_damage(8)
    .with_upgrade(upgraded(
        "Rampage+",
        "Deal 8 damage. Increase this card's damage by 8 this combat.",
    ))
}

/// Headbutt: deal 9 damage, then put a card from the discard pile on top of
/// the draw pile (12 upgraded).
#[must_use]
pub fn headbutt() -> Card {
    Card::new(
        "headbutt",
        "Headbutt",
        CardCost::Fixed(1),
        CardType::Attack,
        TargetType::Single,
        effect(|ctx| {
            ctx.attack_target();
            let chosen = ctx.choose(
                PileKind::Discard,
                "Choose a card to put on top of your draw pile",
                1,
            );
            if let Some(&index) = chosen.first() {
                ctx.move_card(PileKind::Discard, index, PileKind::Draw);
            }
        }),
    )
    .with_description("Deal 9 damage. Put a card from your discard pile on top of your draw pile.")
    .with_damage(9)
    .with_upgrade(UpgradeData {
        base_damage: Some(12),
        ..upgraded(
            "Headbutt+",
            "Deal 12 damage. Put a card from your discard pile on top of your draw pile.",
        )
    })
}

/// Hemokinesis: lose 2 HP, deal 15 damage (20 upgraded).
#[must_use]
pub fn hemokinesis() -> Card {
    Card::new(
        "hemokinesis",
        "Hemokinesis",
        CardCost::Fixed(1),
        CardType::Attack,
        TargetType::Single,
        effect(|ctx| {
            ctx.self_damage(2);
            ctx.attack_target();
        }),
    )
    .with_description("Lose 2 HP. Deal 15 damage.")
    .with_damage(15)
    .with_upgrade(UpgradeData {
        base_damage: Some(20),
        ..upgraded("Hemokinesis+", "Lose 2 HP. Deal 20 damage.")
    })
}

fn hp_losses(player: &Player) -> i32 {
    i32::try_from(player.hp_loss_count()).unwrap_or(i32::MAX)
}

/// Blood for Blood: costs 1 less for each time the player lost HP this
/// battle; deal 18 damage (cost 3 and 22 damage upgraded).
#[must_use]
pub fn blood_for_blood() -> Card {
    Card::new(
        "blood_for_blood",
        "Blood for Blood",
        CardCost::Fixed(4),
        CardType::Attack,
        TargetType::Single,
        single_hit(),
    )
    .with_description("Costs 1 less for each time you lose HP this combat. Deal 18 damage.")
    .with_damage(18)
    .with_cost_calculator(value_fn(|player, _card| (4 - hp_losses(player)).max(0)))
    .with_upgrade(UpgradeData {
        cost: Some(CardCost::Fixed(3)),
        cost_calculator: Some(value_fn(|player, _card| (3 - hp_losses(player)).max(0))),
        base_damage: Some(22),
        ..upgraded(
            "Blood for Blood+",
            "Costs 1 less for each time you lose HP this combat. Deal 22 damage.",
        )
    })
}

/// Body Slam: deal damage equal to the player's block (costs 0 upgraded).
#[must_use]
pub fn body_slam() -> Card {
    Card::new(
        "body_slam",
        "Body Slam",
        CardCost::Fixed(1),
        CardType::Attack,
        TargetType::Single,
        single_hit(),
    )
    .with_description("Deal damage equal to your Block.")
    .with_damage_calculator(value_fn(|player, _card| player.combat.block()))
    .with_upgrade(UpgradeData {
        cost: Some(CardCost::Fixed(0)),
        ..upgraded("Body Slam+", "Deal damage equal to your Block.")
    })
}

/// Sword Boomerang: deal 3 damage to a random enemy 3 times (4 times
/// upgraded).
#[must_use]
pub fn sword_boomerang() -> Card {
    Card::new(
        "sword_boomerang",
        "Sword Boomerang",
        CardCost::Fixed(1),
        CardType::Attack,
        TargetType::Random,
        effect(|ctx| {
            let hits = if ctx.is_upgraded() { 4 } else { 3 };
            ctx.attack_target();
            for _ in 1..hits {
                if let Some(target) = ctx.random_enemy() {
                    ctx.attack(target);
                }
            }
        }),
    )
    .with_description("Deal 3 damage to a random enemy 3 times.")
    .with_damage(3)
    .with_upgrade(upgraded(
        "Sword Boomerang+",
        "Deal 3 damage to a random enemy 4 times.",
    ))
}

// =============================================================================
// Skills
// =============================================================================

/// Shrug It Off: gain 8 block, draw 1 (11 upgraded).
#[must_use]
pub fn shrug_it_off() -> Card {
    Card::new(
        "shrug_it_off",
        "Shrug It Off",
        CardCost::Fixed(1),
        CardType::Skill,
        TargetType::SelfTarget,
        effect(|ctx| {
            ctx.gain_card_block();
            ctx.draw(1);
        }),
    )
    .with_description("Gain 8 Block. Draw 1 card.")
    .with_block(8)
    .with_upgrade(UpgradeData {
        base_block: Some(11),
        ..upgraded("Shrug It Off+", "Gain 11 Block. Draw 1 card.")
    })
}

/// Flex: gain 2 strength until end of turn (4 upgraded).
#[must_use]
pub fn flex() -> Card {
    Card::new(
        "flex",
        "Flex",
        CardCost::Fixed(0),
        CardType::Skill,
        TargetType::SelfTarget,
        effect(|ctx| {
            let amount = if ctx.is_upgraded() { 4 } else { 2 };
            ctx.apply_self_status(StatusKind::Strength, amount);
            ctx.apply_self_status(StatusKind::StrengthDown, amount);
        }),
    )
    .with_description("Gain 2 Strength. At the end of your turn, lose 2 Strength.")
    .with_upgrade(upgraded(
        "Flex+",
        "Gain 4 Strength. At the end of your turn, lose 4 Strength.",
    ))
}

/// Offering: lose 6 HP, gain 2 energy, draw 3 (5 upgraded). Exhaust.
#[must_use]
pub fn offering() -> Card {
    Card::new(
        "offering",
        "Offering",
        CardCost::Fixed(0),
        CardType::Skill,
        TargetType::SelfTarget,
        effect(|ctx| {
            ctx.self_damage(6);
            ctx.gain_energy(2);
            let draw = if ctx.is_upgraded() { 5 } else { 3 };
            ctx.draw(draw);
        }),
    )
    .with_description("Lose 6 HP. Gain 2 energy. Draw 3 cards. Exhaust.")
    .exhausting()
    .with_upgrade(upgraded(
        "Offering+",
        "Lose 6 HP. Gain 2 energy. Draw 5 cards. Exhaust.",
    ))
}

/// Double Tap: the next attack this turn is played twice (2 attacks upgraded).
#[must_use]
pub fn double_tap() -> Card {
    Card::new(
        "double_tap",
        "Double Tap",
        CardCost::Fixed(1),
        CardType::Skill,
        TargetType::SelfTarget,
        self_status(StatusKind::DoubleTap, 1, 2),
    )
    .with_description("This turn, your next Attack is played twice.")
    .with_upgrade(upgraded(
        "Double Tap+",
        "This turn, your next 2 Attacks are played twice.",
    ))
}

/// Flame Barrier: gain 12 block and 4 flame barrier (16 and 6 upgraded).
#[must_use]
pub fn flame_barrier() -> Card {
    Card::new(
        "flame_barrier",
        "Flame Barrier",
        CardCost::Fixed(2),
        CardType::Skill,
        TargetType::SelfTarget,
        effect(|ctx| {
            ctx.gain_card_block();
            let reflect = if ctx.is_upgraded() { 6 } else { 4 };
            ctx.apply_self_status(StatusKind::FlameBarrier, reflect);
        }),
    )
    .with_description("Gain 12 Block. Whenever you are attacked this turn, deal 4 damage back.")
    .with_block(12)
    .with_upgrade(UpgradeData {
        base_block: Some(16),
        ..upgraded(
            "Flame Barrier+",
            "Gain 16 Block. Whenever you are attacked this turn, deal 6 damage back.",
        )
    })
}

/// Armaments: gain 5 block and upgrade a card in hand (every card upgraded).
#[must_use]
pub fn armaments() -> Card {
    Card::new(
        "armaments",
        "Armaments",
        CardCost::Fixed(1),
        CardType::Skill,
        TargetType::SelfTarget,
        effect(|ctx| {
            ctx.gain_card_block();
            if ctx.is_upgraded() {
                for card in ctx.player_mut().hand.iter_mut() {
                    card.upgrade();
                }
                return;
            }
            let chosen = ctx.choose(PileKind::Hand, "Choose a card to upgrade", 1);
            if let Some(&index) = chosen.first() {
                if let Some(card) = ctx.player_mut().hand.get_mut(index) {
                    card.upgrade();
                }
            }
        }),
    )
    .with_description("Gain 5 Block. Upgrade a card in your hand for the rest of combat.")
    .with_block(5)
    .with_upgrade(upgraded(
        "Armaments+",
        "Gain 5 Block. Upgrade ALL cards in your hand for the rest of combat.",
    ))
}

/// True Grit: gain 7 block and exhaust a random card in hand (9 block and a
/// chosen card upgraded).
#[must_use]
pub fn true_grit() -> Card {
    Card::new(
        "true_grit",
        "True Grit",
        CardCost::Fixed(1),
        CardType::Skill,
        TargetType::SelfTarget,
        effect(|ctx| {
            ctx.gain_card_block();
            let len = ctx.player().hand.len();
            if len == 0 {
                return;
            }
            let index = if ctx.is_upgraded() {
                ctx.choose(PileKind::Hand, "Choose a card to exhaust", 1)
                    .first()
                    .copied()
            } else {
                Some(ctx.battle_mut().rng_mut().gen_range(0..len))
            };
            if let Some(index) = index {
                ctx.exhaust_from_hand(index);
            }
        }),
    )
    .with_description("Gain 7 Block. Exhaust a random card in your hand.")
    .with_block(7)
    .with_upgrade(UpgradeData {
        base_block: Some(9),
        ..upgraded("True Grit+", "Gain 9 Block. Exhaust a card in your hand.")
    })
}

fn gain_energy(amount: u32) -> Arc<dyn Effect> {
    effect(move |ctx| ctx.gain_energy(amount))
}

/// Sentinel: gain 5 block; gain 2 energy when exhausted (8 and 3 upgraded).
#[must_use]
pub fn sentinel() -> Card {
    Card::new(
        "sentinel",
        "Sentinel",
        CardCost::Fixed(1),
        CardType::Skill,
        TargetType::SelfTarget,
        effect(|ctx| {
            ctx.gain_card_block();
        }),
    )
    .with_description("Gain 5 Block. If this card is Exhausted, gain 2 energy.")
    .with_block(5)
    .with_on_exhaust(gain_energy(2))
    .with_upgrade(UpgradeData {
        base_block: Some(8),
        on_exhaust: Some(gain_energy(3)),
        ..upgraded(
            "Sentinel+",
            "Gain 8 Block. If this card is Exhausted, gain 3 energy.",
        )
    })
}

/// Rage: gain 3 block whenever an attack is played this turn (5 upgraded).
#[must_use]
pub fn rage() -> Card {
    Card::new(
        "rage",
        "Rage",
        CardCost::Fixed(0),
        CardType::Skill,
        TargetType::SelfTarget,
        self_status(StatusKind::Rage, 3, 5),
    )
    .with_description("Whenever you play an Attack this turn, gain 3 Block.")
    .with_upgrade(upgraded(
        "Rage+",
        "Whenever you play an Attack this turn, gain 5 Block.",
    ))
}

// =============================================================================
// Powers
// =============================================================================

/// Inflame: gain 2 strength (3 upgraded).
#[must_use]
pub fn inflame() -> Card {
    Card::new(
        "inflame",
        "Inflame",
        CardCost::Fixed(1),
        CardType::Power,
        TargetType::SelfTarget,
        self_status(StatusKind::Strength, 2, 3),
    )
    .with_description("Gain 2 Strength.")
    .with_upgrade(upgraded("Inflame+", "Gain 3 Strength."))
}

/// Metallicize: gain 3 block at the end of every turn (4 upgraded).
#[must_use]
pub fn metallicize() -> Card {
    Card::new(
        "metallicize",
        "Metallicize",
        CardCost::Fixed(1),
        CardType::Power,
        TargetType::SelfTarget,
        self_status(StatusKind::Metallicize, 3, 4),
    )
    .with_description("At the end of your turn, gain 3 Block.")
    .with_upgrade(upgraded(
        "Metallicize+",
        "At the end of your turn, gain 4 Block.",
    ))
}

/// Rupture: gain 1 strength whenever a card makes the player lose HP (2
/// upgraded).
#[must_use]
pub fn rupture() -> Card {
    Card::new(
        "rupture",
        "Rupture",
        CardCost::Fixed(1),
        CardType::Power,
        TargetType::SelfTarget,
        self_status(StatusKind::Rupture, 1, 2),
    )
    .with_description("Whenever you lose HP from a card, gain 1 Strength.")
    .with_upgrade(upgraded(
        "Rupture+",
        "Whenever you lose HP from a card, gain 2 Strength.",
    ))
}

/// Demon Form: gain 2 strength at the start of every turn (3 upgraded).
#[must_use]
pub fn demon_form() -> Card {
    Card::new(
        "demon_form",
        "Demon Form",
        CardCost::Fixed(3),
        CardType::Power,
        TargetType::SelfTarget,
        self_status(StatusKind::DemonForm, 2, 3),
    )
    .with_description("At the start of each turn, gain 2 Strength.")
    .with_upgrade(upgraded(
        "Demon Form+",
        "At the start of each turn, gain 3 Strength.",
    ))
}

/// Corruption: skills cost 0 (costs 2 upgraded).
#[must_use]
pub fn corruption() -> Card {
    Card::new(
        "corruption",
        "Corruption",
        CardCost::Fixed(3),
        CardType::Power,
        TargetType::SelfTarget,
        self_status(StatusKind::Corruption, 1, 1),
    )
    .with_description("Skills cost 0.")
    .with_upgrade(UpgradeData {
        cost: Some(CardCost::Fixed(2)),
        ..upgraded("Corruption+", "Skills cost 0.")
    })
}

// =============================================================================
// Status cards and curses
// =============================================================================

/// Burn: unplayable; 2 damage to the player at turn end while in hand (4
/// upgraded).
#[must_use]
pub fn burn() -> Card {
    Card::new(
        "burn",
        "Burn",
        CardCost::Fixed(-1),
        CardType::Status,
        TargetType::SelfTarget,
        no_effect(),
    )
    .with_description("Unplayable. At the end of your turn, take 2 damage.")
    .with_hand_end_damage(2)
    .with_upgrade(UpgradeData {
        hand_end_damage: Some(4),
        ..upgraded("Burn+", "Unplayable. At the end of your turn, take 4 damage.")
    })
}

/// Wound: unplayable.
#[must_use]
pub fn wound() -> Card {
    Card::new(
        "wound",
        "Wound",
        CardCost::Fixed(-1),
        CardType::Status,
        TargetType::SelfTarget,
        no_effect(),
    )
    .with_description("Unplayable.")
}

/// Dazed: unplayable, ethereal.
#[must_use]
pub fn dazed() -> Card {
    Card::new(
        "dazed",
        "Dazed",
        CardCost::Fixed(-1),
        CardType::Status,
        TargetType::SelfTarget,
        no_effect(),
    )
    .with_description("Unplayable. Ethereal.")
    .ethereal()
}

/// Slimed: costs 1 and does nothing. Exhaust.
#[must_use]
pub fn slimed() -> Card {
    Card::new(
        "slimed",
        "Slimed",
        CardCost::Fixed(1),
        CardType::Status,
        TargetType::SelfTarget,
        no_effect(),
    )
    .with_description("Exhaust.")
    .exhausting()
}

/// Injury: a curse; never playable.
#[must_use]
pub fn injury() -> Card {
    Card::new(
        "injury",
        "Injury",
        CardCost::Fixed(-1),
        CardType::Curse,
        TargetType::SelfTarget,
        no_effect(),
    )
    .with_description("Unplayable.")
}
