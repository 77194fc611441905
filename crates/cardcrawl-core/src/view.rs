//! Read-only battle snapshots for hosts and tooling.
//!
//! A [`BattleView`] captures everything a front end draws: HP, block,
//! statuses, piles, displayed intents with their projected damage, and
//! per-card cost and damage previews. Views are plain serialisable data and
//! hold no reference into the battle.

use serde::{Deserialize, Serialize};

use crate::battle::{Battle, Phase};
use crate::card::{Card, CardCost, CardType, CardUid, TargetType};
use crate::entity::status::StatusKind;
use crate::entity::{CombatState, Enemy, EntityId, IntentKind, Player};

/// Snapshot of a whole battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleView {
    /// Phase at capture time.
    pub phase: Phase,
    /// Turn number.
    pub turn: u32,
    /// The player.
    pub player: PlayerView,
    /// Enemies, left to right, dead included.
    pub enemies: Vec<EnemyView>,
}

/// Snapshot of the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Current HP.
    pub hp: i32,
    /// Maximum HP.
    pub max_hp: i32,
    /// Current block.
    pub block: i32,
    /// Current energy.
    pub energy: u32,
    /// Energy at turn start.
    pub max_energy: u32,
    /// Gold.
    pub gold: u32,
    /// Non-zero statuses in kind order.
    pub statuses: Vec<(StatusKind, i32)>,
    /// Cards in hand, with previews.
    pub hand: Vec<CardView>,
    /// Cards in the draw pile.
    pub draw_pile: usize,
    /// Cards in the discard pile.
    pub discard_pile: usize,
    /// Cards in the exhaust pile.
    pub exhaust_pile: usize,
    /// Potion ids by slot.
    pub potions: Vec<Option<String>>,
    /// Relic ids in acquisition order.
    pub relics: Vec<String>,
}

/// Snapshot of one enemy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyView {
    /// Entity id.
    pub id: EntityId,
    /// Name.
    pub name: String,
    /// Current HP.
    pub hp: i32,
    /// Maximum HP.
    pub max_hp: i32,
    /// Current block.
    pub block: i32,
    /// Non-zero statuses in kind order.
    pub statuses: Vec<(StatusKind, i32)>,
    /// Displayed intent, if any.
    pub intent: Option<IntentView>,
    /// Whether the enemy is alive.
    pub alive: bool,
}

/// A displayed intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentView {
    /// Category.
    pub kind: IntentKind,
    /// Move name.
    pub name: String,
    /// Damage per hit against the player right now, for attacks.
    pub damage: Option<i32>,
    /// Number of hits.
    pub times: u32,
}

/// A card in hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    /// Instance uid.
    pub uid: Option<CardUid>,
    /// Content id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Card type.
    pub card_type: CardType,
    /// Target shape.
    pub target: TargetType,
    /// Effective cost.
    pub cost: CardCost,
    /// Whether the cost can be paid now.
    pub playable: bool,
    /// Damage per hit before the target's modifiers.
    pub damage: Option<i32>,
    /// Block the card would grant.
    pub block: Option<i32>,
    /// Upgraded.
    pub upgraded: bool,
}

impl BattleView {
    /// Captures the current state of `battle`.
    #[must_use]
    pub fn capture(battle: &Battle) -> Self {
        let player = battle.player();
        Self {
            phase: battle.phase(),
            turn: battle.turn(),
            player: PlayerView::capture(player),
            enemies: battle
                .arena()
                .iter()
                .map(|enemy| EnemyView::capture(enemy, &player.combat))
                .collect(),
        }
    }

    /// Looks up an enemy view by id.
    #[must_use]
    pub fn enemy(&self, id: EntityId) -> Option<&EnemyView> {
        self.enemies.iter().find(|enemy| enemy.id == id)
    }
}

fn statuses(combat: &CombatState) -> Vec<(StatusKind, i32)> {
    combat.statuses().iter().collect()
}

impl PlayerView {
    fn capture(player: &Player) -> Self {
        Self {
            hp: player.combat.hp(),
            max_hp: player.combat.max_hp(),
            block: player.combat.block(),
            energy: player.energy(),
            max_energy: player.max_energy(),
            gold: player.gold(),
            statuses: statuses(&player.combat),
            hand: player
                .hand
                .iter()
                .map(|card| CardView::capture(card, player))
                .collect(),
            draw_pile: player.draw_pile.len(),
            discard_pile: player.discard_pile.len(),
            exhaust_pile: player.exhaust_pile.len(),
            potions: player
                .potions()
                .iter()
                .map(|slot| slot.as_ref().map(|potion| potion.id().to_owned()))
                .collect(),
            relics: player
                .relics()
                .iter()
                .map(|relic| relic.declaration().id.clone())
                .collect(),
        }
    }
}

impl EnemyView {
    fn capture(enemy: &Enemy, player: &CombatState) -> Self {
        let intent = enemy.next_move().map(|intent| IntentView {
            kind: intent.kind,
            name: intent.name.clone(),
            damage: intent.attack_value().map(|value| {
                player.apply_target_modifiers(enemy.combat.calculate_damage(value))
            }),
            times: intent.hits(),
        });
        Self {
            id: enemy.id(),
            name: enemy.name().to_owned(),
            hp: enemy.combat.hp(),
            max_hp: enemy.combat.max_hp(),
            block: enemy.combat.block(),
            statuses: statuses(&enemy.combat),
            intent,
            alive: enemy.is_alive(),
        }
    }
}

impl CardView {
    fn capture(card: &Card, player: &Player) -> Self {
        Self {
            uid: card.uid(),
            id: card.id().to_owned(),
            name: card.name().to_owned(),
            card_type: card.card_type(),
            target: card.target(),
            cost: card.cost(player),
            playable: card.is_affordable(player),
            damage: card.damage(player),
            block: card.block(player),
            upgraded: card.is_upgraded(),
        }
    }
}
