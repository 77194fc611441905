//! Relic catalog.
//!
//! Each relic is a small observer type declaring exactly the hooks it
//! implements. Relics that remember something between callbacks keep it in
//! the player's relic counters under their own id.

use std::sync::Arc;

use crate::battle::Battle;
use crate::card::{Card, CardType};
use crate::config::rules;
use crate::entity::status::StatusKind;
use crate::entity::{DamageSource, EntityId, Player, RoomKind};
use crate::hook::{HookPoints, Relic, RelicDeclaration};
use crate::potion::Potion;

macro_rules! relic {
    ($ty:ident, $ctor:ident, $id:literal, $name:literal, $hooks:expr) => {
        struct $ty {
            declaration: RelicDeclaration,
        }

        #[doc = concat!("Creates ", $name, ".")]
        #[must_use]
        pub fn $ctor() -> Arc<dyn Relic> {
            Arc::new($ty {
                declaration: RelicDeclaration::new($id, $name, $hooks),
            })
        }
    };
}

// =============================================================================
// Battle lifecycle
// =============================================================================

relic!(BurningBlood, burning_blood, "burning_blood", "Burning Blood", HookPoints::VICTORY);

/// Heals 6 HP after every victory.
impl Relic for BurningBlood {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_victory(&self, battle: &mut Battle) {
        battle.heal_player(6);
    }
}

relic!(Anchor, anchor, "anchor", "Anchor", HookPoints::PLAYER_TURN_START);

/// Starts each battle with 10 block.
impl Relic for Anchor {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_player_turn_start(&self, battle: &mut Battle) {
        if battle.turn() == 1 {
            battle.player_gain_block_raw(10);
        }
    }
}

relic!(Lantern, lantern, "lantern", "Lantern", HookPoints::PLAYER_TURN_START);

impl Relic for Lantern {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_player_turn_start(&self, battle: &mut Battle) {
        if battle.turn() == 1 {
            battle.gain_energy(1);
        }
    }
}

relic!(
    BagOfPreparation,
    bag_of_preparation,
    "bag_of_preparation",
    "Bag of Preparation",
    HookPoints::PLAYER_TURN_START
);

impl Relic for BagOfPreparation {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_player_turn_start(&self, battle: &mut Battle) {
        if battle.turn() == 1 {
            battle.draw_cards(2);
        }
    }
}

relic!(Vajra, vajra, "vajra", "Vajra", HookPoints::BATTLE_START);

impl Relic for Vajra {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_battle_start(&self, battle: &mut Battle) {
        battle.apply_status(None, EntityId::PLAYER, StatusKind::Strength, 1);
    }
}

relic!(
    BronzeScales,
    bronze_scales,
    "bronze_scales",
    "Bronze Scales",
    HookPoints::BATTLE_START
);

impl Relic for BronzeScales {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_battle_start(&self, battle: &mut Battle) {
        battle.apply_status(None, EntityId::PLAYER, StatusKind::Thorns, 3);
    }
}

relic!(
    BagOfMarbles,
    bag_of_marbles,
    "bag_of_marbles",
    "Bag of Marbles",
    HookPoints::BATTLE_START
);

impl Relic for BagOfMarbles {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_battle_start(&self, battle: &mut Battle) {
        for id in battle.arena().living_ids() {
            battle.apply_status(Some(EntityId::PLAYER), id, StatusKind::Vulnerable, 1);
        }
    }
}

relic!(Orichalcum, orichalcum, "orichalcum", "Orichalcum", HookPoints::TURN_END);

/// Grants 6 block at turn end when the player has none.
impl Relic for Orichalcum {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_turn_end(&self, battle: &mut Battle) {
        if battle.player().combat.block() == 0 {
            battle.player_gain_block_raw(6);
        }
    }
}

// =============================================================================
// Cards and piles
// =============================================================================

const PEN_NIB: &str = "pen_nib";

relic!(
    PenNib,
    pen_nib,
    "pen_nib",
    "Pen Nib",
    HookPoints::CARD_PLAY
        .union(HookPoints::AFTER_CARD_PLAY)
        .union(HookPoints::MODIFY_DAMAGE_DEALT)
);

/// Every 10th attack deals double damage.
impl Relic for PenNib {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_card_play(&self, battle: &mut Battle, card: &Card) {
        if card.card_type() == CardType::Attack {
            battle.player_mut().bump_counter(PEN_NIB, 1);
        }
    }

    fn modify_damage_dealt(&self, player: &Player, damage: i32) -> i32 {
        if player.counter(PEN_NIB) >= 10 {
            damage * 2
        } else {
            damage
        }
    }

    fn after_card_play(&self, battle: &mut Battle, _card: &Card) {
        if battle.player().counter(PEN_NIB) >= 10 {
            battle.player_mut().set_counter(PEN_NIB, 0);
        }
    }
}

const SUNDIAL: &str = "sundial";

relic!(Sundial, sundial, "sundial", "Sundial", HookPoints::SHUFFLE);

/// Every third shuffle grants 2 energy.
impl Relic for Sundial {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_shuffle(&self, battle: &mut Battle) {
        if battle.player_mut().bump_counter(SUNDIAL, 1) >= 3 {
            battle.player_mut().set_counter(SUNDIAL, 0);
            battle.gain_energy(2);
        }
    }
}

relic!(
    CharonsAshes,
    charons_ashes,
    "charons_ashes",
    "Charon's Ashes",
    HookPoints::CARD_EXHAUST
);

/// Deals 3 damage to every enemy whenever a card is exhausted.
impl Relic for CharonsAshes {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_card_exhaust(&self, battle: &mut Battle, _card: &Card) {
        for id in battle.arena().living_ids() {
            battle.deal_damage(DamageSource::Unsourced, id, 3);
        }
    }
}

// =============================================================================
// Damage and statuses
// =============================================================================

const CENTENNIAL_PUZZLE: &str = "centennial_puzzle";

relic!(
    CentennialPuzzle,
    centennial_puzzle,
    "centennial_puzzle",
    "Centennial Puzzle",
    HookPoints::BATTLE_START.union(HookPoints::TAKE_DAMAGE)
);

/// The first time the player loses HP each battle, draw 3 cards.
impl Relic for CentennialPuzzle {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_battle_start(&self, battle: &mut Battle) {
        battle.player_mut().set_counter(CENTENNIAL_PUZZLE, 0);
    }

    fn on_take_damage(&self, battle: &mut Battle, _hp_lost: i32) {
        if battle.player().counter(CENTENNIAL_PUZZLE) == 0 {
            battle.player_mut().set_counter(CENTENNIAL_PUZZLE, 1);
            battle.draw_cards(3);
        }
    }
}

relic!(
    ChampionBelt,
    champion_belt,
    "champion_belt",
    "Champion Belt",
    HookPoints::APPLY_STATUS
);

/// Whenever the player applies vulnerable, also apply 1 weak.
impl Relic for ChampionBelt {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_apply_status(&self, battle: &mut Battle, target: EntityId, kind: StatusKind, _amount: i32) {
        if kind == StatusKind::Vulnerable {
            battle.apply_status(None, target, StatusKind::Weak, 1);
        }
    }
}

// =============================================================================
// Healing and potions
// =============================================================================

relic!(
    MagicFlower,
    magic_flower,
    "magic_flower",
    "Magic Flower",
    HookPoints::MODIFY_HEAL_AMOUNT
);

/// Healing is 50% more effective (rounded up).
impl Relic for MagicFlower {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn modify_heal_amount(&self, _player: &Player, amount: i32) -> i32 {
        rules::scale_ceil(amount, (3, 2))
    }
}

relic!(
    ToyOrnithopter,
    toy_ornithopter,
    "toy_ornithopter",
    "Toy Ornithopter",
    HookPoints::POTION_USE
);

impl Relic for ToyOrnithopter {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_potion_use(&self, battle: &mut Battle, _potion: &Potion) {
        battle.heal_player(5);
    }
}

// =============================================================================
// Run events
// =============================================================================

relic!(Strawberry, strawberry, "strawberry", "Strawberry", HookPoints::OBTAIN);

impl Relic for Strawberry {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_obtain(&self, player: &mut Player) {
        player.combat.increase_max_hp(7);
    }
}

relic!(
    CeramicFish,
    ceramic_fish,
    "ceramic_fish",
    "Ceramic Fish",
    HookPoints::CARD_ADD
);

impl Relic for CeramicFish {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_card_add(&self, player: &mut Player, _card: &Card) {
        player.gain_gold(9);
    }
}

const MAW_BANK: &str = "maw_bank";

relic!(
    MawBank,
    maw_bank,
    "maw_bank",
    "Maw Bank",
    HookPoints::ROOM_ENTER.union(HookPoints::GOLD_SPEND)
);

/// Grants 12 gold per room entered until the player spends gold.
impl Relic for MawBank {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_room_enter(&self, player: &mut Player, _room: RoomKind) {
        if player.counter(MAW_BANK) != -1 {
            player.gain_gold(12);
        }
    }

    fn on_gold_spend(&self, player: &mut Player, _amount: u32) {
        player.set_counter(MAW_BANK, -1);
    }
}

relic!(
    MealTicket,
    meal_ticket,
    "meal_ticket",
    "Meal Ticket",
    HookPoints::ROOM_ENTER
);

impl Relic for MealTicket {
    fn declaration(&self) -> &RelicDeclaration {
        &self.declaration
    }

    fn on_room_enter(&self, player: &mut Player, room: RoomKind) {
        if room == RoomKind::Shop {
            player.heal(15);
        }
    }
}
