//! Name lookup over the reference content.
//!
//! Names are the content ids used by the core catalog (`"strike"`,
//! `"jaw_worm"`, `"pen_nib"`). A card name ending in `+` yields the upgraded
//! card.

use std::sync::Arc;

use cardcrawl_core::card::Card;
use cardcrawl_core::content::{cards, enemies, potions, relics};
use cardcrawl_core::entity::EnemyTemplate;
use cardcrawl_core::hook::Relic;
use cardcrawl_core::potion::Potion;

/// HP of the `dummy` training target.
pub const DUMMY_HP: i32 = 50;

/// Looks up a card by id, upgrading it for a trailing `+`.
#[must_use]
pub fn card(name: &str) -> Option<Card> {
    if let Some(base) = name.strip_suffix('+') {
        let mut card = card(base)?;
        card.upgrade();
        return Some(card);
    }
    let card = match name {
        "strike" => cards::strike(),
        "defend" => cards::defend(),
        "bash" => cards::bash(),
        "cleave" => cards::cleave(),
        "twin_strike" => cards::twin_strike(),
        "whirlwind" => cards::whirlwind(),
        "pommel_strike" => cards::pommel_strike(),
        "rampage" => cards::rampage(),
        "headbutt" => cards::headbutt(),
        "hemokinesis" => cards::hemokinesis(),
        "blood_for_blood" => cards::blood_for_blood(),
        "body_slam" => cards::body_slam(),
        "sword_boomerang" => cards::sword_boomerang(),
        "shrug_it_off" => cards::shrug_it_off(),
        "flex" => cards::flex(),
        "offering" => cards::offering(),
        "double_tap" => cards::double_tap(),
        "flame_barrier" => cards::flame_barrier(),
        "armaments" => cards::armaments(),
        "true_grit" => cards::true_grit(),
        "sentinel" => cards::sentinel(),
        "rage" => cards::rage(),
        "inflame" => cards::inflame(),
        "metallicize" => cards::metallicize(),
        "rupture" => cards::rupture(),
        "demon_form" => cards::demon_form(),
        "corruption" => cards::corruption(),
        "burn" => cards::burn(),
        "wound" => cards::wound(),
        "dazed" => cards::dazed(),
        "slimed" => cards::slimed(),
        "injury" => cards::injury(),
        _ => return None,
    };
    Some(card)
}

/// Looks up an enemy template by id.
#[must_use]
pub fn enemy(name: &str) -> Option<EnemyTemplate> {
    let template = match name {
        "cultist" => enemies::cultist(),
        "jaw_worm" => enemies::jaw_worm(),
        "red_louse" => enemies::red_louse(),
        "large_slime" => enemies::large_slime(),
        "medium_slime" => enemies::medium_slime(),
        "looter" => enemies::looter(),
        "sentry" => enemies::sentry(),
        "dummy" => enemies::dummy(DUMMY_HP),
        _ => return None,
    };
    Some(template)
}

/// Looks up a relic by id.
#[must_use]
pub fn relic(name: &str) -> Option<Arc<dyn Relic>> {
    let relic = match name {
        "burning_blood" => relics::burning_blood(),
        "anchor" => relics::anchor(),
        "lantern" => relics::lantern(),
        "bag_of_preparation" => relics::bag_of_preparation(),
        "vajra" => relics::vajra(),
        "bronze_scales" => relics::bronze_scales(),
        "bag_of_marbles" => relics::bag_of_marbles(),
        "orichalcum" => relics::orichalcum(),
        "pen_nib" => relics::pen_nib(),
        "sundial" => relics::sundial(),
        "charons_ashes" => relics::charons_ashes(),
        "centennial_puzzle" => relics::centennial_puzzle(),
        "champion_belt" => relics::champion_belt(),
        "magic_flower" => relics::magic_flower(),
        "toy_ornithopter" => relics::toy_ornithopter(),
        "strawberry" => relics::strawberry(),
        "ceramic_fish" => relics::ceramic_fish(),
        "maw_bank" => relics::maw_bank(),
        "meal_ticket" => relics::meal_ticket(),
        _ => return None,
    };
    Some(relic)
}

/// Looks up a potion by id.
#[must_use]
pub fn potion(name: &str) -> Option<Potion> {
    let potion = match name {
        "fire_potion" => potions::fire_potion(),
        "explosive_potion" => potions::explosive_potion(),
        "block_potion" => potions::block_potion(),
        "strength_potion" => potions::strength_potion(),
        "weak_potion" => potions::weak_potion(),
        "energy_potion" => potions::energy_potion(),
        _ => return None,
    };
    Some(potion)
}
