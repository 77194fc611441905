//! Integration tests for the battle engine.
//!
//! These tests drive full battles through the public entry points and check
//! the order-dependent interactions: block before HP loss, vulnerable before
//! block, reflect after damage, hooks in acquisition order.

use std::sync::{Arc, Mutex};

use crate::battle::Phase;
use crate::card::pile::PileKind;
use crate::content::{cards, enemies, potions, relics};
use crate::entity::status::StatusKind;
use crate::entity::{EntityId, Intent};
use crate::error::ActionRejected;
use crate::event::BattleEvent;
use crate::hook::{HookPoints, Relic, RelicDeclaration};
use crate::host::{BattleResult, Cue};

use super::helpers::{
    attacker, count_events, damage_targets, double_hit_all, enemy_hp, enemy_ids, hand_index,
    player_with, scripted, start_battle, start_recorded, test_attack,
};

fn defends(n: usize) -> Vec<crate::card::Card> {
    std::iter::repeat_with(cards::defend).take(n).collect()
}

fn deck(first: crate::card::Card, rest: usize) -> Vec<crate::card::Card> {
    let mut deck = vec![first];
    deck.extend(defends(rest));
    deck
}

// =============================================================================
// Turn Cycle
// =============================================================================

mod turn_tests {
    use super::*;

    #[test]
    fn start_draws_and_refills() {
        let battle = start_battle(player_with(cards::starter_deck()), &[enemies::dummy(30)]);
        assert_eq!(battle.phase(), Phase::Player);
        assert_eq!(battle.turn(), 1);
        assert_eq!(battle.player().hand.len(), 5);
        assert_eq!(battle.player().draw_pile.len(), 5);
        assert_eq!(battle.player().energy(), 3);
        battle.check_invariants().unwrap();
    }

    #[test]
    fn intents_are_declared_before_they_run() {
        let battle = start_battle(player_with(defends(5)), &[attacker(20, 5)]);
        let enemy = enemy_ids(&battle)[0];
        let intent = battle.arena().get(enemy).unwrap().next_move().unwrap();
        assert_eq!(intent.attack_value(), Some(5));
        assert!(battle
            .events()
            .iter()
            .any(|event| matches!(event, BattleEvent::IntentDeclared { enemy: e, .. } if *e == enemy)));
    }

    #[test]
    fn end_turn_runs_enemies_and_starts_next_turn() {
        let (mut battle, log) = start_recorded(player_with(defends(10)), &[attacker(20, 5)]);
        battle.end_turn().unwrap();

        assert_eq!(battle.phase(), Phase::Player);
        assert_eq!(battle.turn(), 2);
        assert_eq!(battle.player().combat.hp(), 75);
        assert_eq!(battle.player().hand.len(), 5);
        assert_eq!(battle.player().discard_pile.len(), 5);
        assert_eq!(battle.player().energy(), 3);

        let cues = log.borrow().cues.clone();
        let enemy = enemy_ids(&battle)[0];
        let turn_cue = cues.iter().position(|c| *c == Cue::EnemyTurn).unwrap();
        let action_cue = cues
            .iter()
            .position(|c| *c == Cue::EnemyAction { enemy })
            .unwrap();
        assert!(turn_cue < action_cue);
        assert!(cues.contains(&Cue::Hit {
            target: EntityId::PLAYER,
            amount: 5
        }));
        assert!(log.borrow().refreshes > 0);
    }

    #[test]
    fn block_resets_at_turn_start() {
        let mut battle = start_battle(player_with(defends(10)), &[enemies::dummy(30)]);
        battle.play_card(0, None).unwrap();
        assert_eq!(battle.player().combat.block(), 5);
        battle.end_turn().unwrap();
        assert_eq!(battle.player().combat.block(), 0);
    }

    #[test]
    fn enemy_block_resets_when_it_acts() {
        let guard = scripted(
            "Guard",
            30,
            vec![Intent::buff(
                "Brace",
                crate::entity::enemy::intent_effect(|ctx| {
                    ctx.gain_block(7);
                }),
            )],
        );
        let mut battle = start_battle(player_with(defends(10)), &[guard]);
        let enemy = enemy_ids(&battle)[0];
        battle.end_turn().unwrap();
        assert_eq!(battle.arena().get(enemy).unwrap().combat.block(), 7);
        battle.end_turn().unwrap();
        assert_eq!(battle.arena().get(enemy).unwrap().combat.block(), 7);
    }

    #[test]
    fn burn_in_hand_hurts_at_turn_end() {
        let mut battle = start_battle(player_with(deck(cards::burn(), 4)), &[enemies::dummy(30)]);
        battle.end_turn().unwrap();
        assert_eq!(battle.player().combat.hp(), 78);
        assert_eq!(battle.player().hp_loss_count(), 1);
    }

    #[test]
    fn ethereal_cards_exhaust_at_turn_end() {
        let mut battle = start_battle(player_with(deck(cards::dazed(), 4)), &[enemies::dummy(30)]);
        battle.end_turn().unwrap();
        assert_eq!(battle.player().exhaust_pile.len(), 1);
        assert_eq!(battle.player().exhaust_pile.cards()[0].id(), "dazed");
        battle.check_invariants().unwrap();
    }

    #[test]
    fn temporary_costs_clear_at_turn_end() {
        let mut battle = start_battle(player_with(cards::starter_deck()), &[enemies::dummy(30)]);
        battle.player_mut().hand.get_mut(0).unwrap().set_temporary_cost(Some(0));
        battle.end_turn().unwrap();
        for kind in PileKind::ALL {
            assert!(battle
                .player()
                .pile(kind)
                .iter()
                .all(|card| card.temporary_cost().is_none()));
        }
    }

    #[test]
    fn finish_returns_persistent_player() {
        let mut battle = start_battle(player_with(deck(cards::armaments(), 4)), &[enemies::dummy(30)]);
        battle.play_card(hand_index(&battle, "armaments"), None).unwrap();
        let player = battle.finish();

        assert_eq!(player.master_deck().len(), 5);
        assert!(player.master_deck().iter().all(|card| !card.is_upgraded()));
        for kind in PileKind::ALL {
            assert!(player.pile(kind).is_empty());
        }
        assert_eq!(player.combat.block(), 0);
    }
}

// =============================================================================
// Damage Pipeline
// =============================================================================

mod damage_tests {
    use super::*;

    #[test]
    fn strike_into_ten_hp() {
        let mut battle = start_battle(player_with(deck(cards::strike(), 4)), &[enemies::dummy(10)]);
        let enemy = enemy_ids(&battle)[0];
        battle.play_card(hand_index(&battle, "strike"), Some(enemy)).unwrap();

        assert_eq!(enemy_hp(&battle, enemy), 4);
        assert_eq!(battle.player().energy(), 2);
        assert_eq!(battle.player().discard_pile.len(), 1);
        battle.check_invariants().unwrap();
    }

    #[test]
    fn strike_into_block() {
        let mut battle = start_battle(player_with(deck(cards::strike(), 4)), &[enemies::dummy(10)]);
        let enemy = enemy_ids(&battle)[0];
        battle.enemy_gain_block(enemy, 5);
        battle.play_card(hand_index(&battle, "strike"), Some(enemy)).unwrap();

        let combat = &battle.arena().get(enemy).unwrap().combat;
        assert_eq!(combat.hp(), 9);
        assert_eq!(combat.block(), 0);
    }

    #[test]
    fn all_target_hits_each_enemy_in_turn() {
        let mut battle = start_battle(
            player_with(deck(double_hit_all(1), 4)),
            &[enemies::dummy(10), enemies::dummy(10)],
        );
        let ids = enemy_ids(&battle);
        battle.take_events();
        battle
            .play_card(hand_index(&battle, "double_hit_all"), None)
            .unwrap();

        let events = battle.take_events();
        assert_eq!(damage_targets(&events), vec![ids[0], ids[0], ids[1], ids[1]]);
        assert_eq!(enemy_hp(&battle, ids[0]), 8);
        assert_eq!(enemy_hp(&battle, ids[1]), 8);
    }

    #[test]
    fn vulnerable_applies_before_block() {
        let mut battle = start_battle(player_with(deck(test_attack(10), 4)), &[enemies::dummy(50)]);
        let enemy = enemy_ids(&battle)[0];
        assert!(battle.apply_status(None, enemy, StatusKind::Vulnerable, 1));
        battle.enemy_gain_block(enemy, 5);
        battle
            .play_card(hand_index(&battle, "test_attack"), Some(enemy))
            .unwrap();
        assert_eq!(enemy_hp(&battle, enemy), 40);
    }

    #[test]
    fn vulnerable_multiplies_damage() {
        let mut battle = start_battle(player_with(deck(test_attack(10), 4)), &[enemies::dummy(50)]);
        let enemy = enemy_ids(&battle)[0];
        battle.apply_status(None, enemy, StatusKind::Vulnerable, 1);
        let index = hand_index(&battle, "test_attack");
        assert_eq!(battle.preview_damage(index, enemy), Some(15));
        battle.play_card(index, Some(enemy)).unwrap();
        assert_eq!(enemy_hp(&battle, enemy), 35);
    }

    #[test]
    fn weak_applies_after_strength() {
        let mut battle = start_battle(player_with(deck(cards::strike(), 4)), &[enemies::dummy(50)]);
        let enemy = enemy_ids(&battle)[0];
        battle.apply_status(None, EntityId::PLAYER, StatusKind::Strength, 3);
        let index = hand_index(&battle, "strike");
        assert_eq!(battle.preview_damage(index, enemy), Some(9));

        battle.apply_status(None, EntityId::PLAYER, StatusKind::Weak, 1);
        assert_eq!(battle.preview_damage(index, enemy), Some(6));
        battle.play_card(index, Some(enemy)).unwrap();
        assert_eq!(enemy_hp(&battle, enemy), 44);
    }

    #[test]
    fn thorns_do_not_recurse() {
        let mut battle = start_battle(player_with(defends(10)), &[attacker(20, 5)]);
        let enemy = enemy_ids(&battle)[0];
        battle.apply_status(None, EntityId::PLAYER, StatusKind::Thorns, 3);
        battle.apply_status(None, enemy, StatusKind::Thorns, 2);
        battle.take_events();

        battle.end_turn().unwrap();

        assert_eq!(battle.player().combat.hp(), 75);
        assert_eq!(enemy_hp(&battle, enemy), 17);
        let events = battle.take_events();
        assert_eq!(damage_targets(&events), vec![EntityId::PLAYER, enemy]);
    }

    #[test]
    fn reflected_hits_do_not_feed_rupture() {
        let mut battle = start_battle(player_with(deck(cards::strike(), 4)), &[enemies::dummy(30)]);
        let enemy = enemy_ids(&battle)[0];
        battle.apply_status(None, EntityId::PLAYER, StatusKind::Rupture, 2);
        battle.apply_status(None, enemy, StatusKind::Thorns, 2);

        battle.play_card(hand_index(&battle, "strike"), Some(enemy)).unwrap();

        assert_eq!(enemy_hp(&battle, enemy), 24);
        assert_eq!(battle.player().combat.hp(), 78);
        assert_eq!(battle.player().hp_loss_count(), 1);
        let statuses = battle.player().combat.statuses();
        assert_eq!(statuses.get(StatusKind::Strength), 0);
    }

    #[test]
    fn flame_barrier_reflects_each_hit_then_expires() {
        let twice = scripted("Twice", 30, vec![Intent::attack("Double", 5).times(2)]);
        let mut battle = start_battle(player_with(deck(cards::flame_barrier(), 4)), &[twice]);
        let enemy = enemy_ids(&battle)[0];
        battle
            .play_card(hand_index(&battle, "flame_barrier"), None)
            .unwrap();
        battle.end_turn().unwrap();

        assert_eq!(battle.player().combat.hp(), 80);
        assert_eq!(enemy_hp(&battle, enemy), 22);
        assert!(!battle
            .player()
            .combat
            .statuses()
            .has(StatusKind::FlameBarrier));
    }

    #[test]
    fn curl_up_grants_block_once() {
        let mut battle = start_battle(player_with(deck(cards::strike(), 4)), &[enemies::red_louse()]);
        let enemy = enemy_ids(&battle)[0];
        let curl = battle
            .arena()
            .get(enemy)
            .unwrap()
            .combat
            .statuses()
            .get(StatusKind::CurlUp);
        assert!(curl > 0);

        battle.play_card(hand_index(&battle, "strike"), Some(enemy)).unwrap();
        let combat = &battle.arena().get(enemy).unwrap().combat;
        assert_eq!(combat.block(), curl);
        assert!(!combat.statuses().has(StatusKind::CurlUp));
    }

    #[test]
    fn dead_target_falls_back_to_first_living() {
        let mut battle = start_battle(
            player_with(deck(cards::strike(), 4)),
            &[enemies::dummy(10), enemies::dummy(10), enemies::dummy(10)],
        );
        let ids = enemy_ids(&battle);
        battle.arena_mut().get_mut(ids[0]).unwrap().combat.set_hp(0);

        battle.play_card(hand_index(&battle, "strike"), Some(ids[0])).unwrap();
        assert_eq!(enemy_hp(&battle, ids[1]), 4);
        assert_eq!(enemy_hp(&battle, ids[2]), 10);
    }
}

// =============================================================================
// Cards
// =============================================================================

mod card_tests {
    use super::*;

    #[test]
    fn x_cost_drains_energy() {
        let mut battle = start_battle(player_with(deck(cards::whirlwind(), 4)), &[enemies::dummy(50)]);
        let enemy = enemy_ids(&battle)[0];
        battle.play_card(hand_index(&battle, "whirlwind"), None).unwrap();
        assert_eq!(enemy_hp(&battle, enemy), 35);
        assert_eq!(battle.player().energy(), 0);
    }

    #[test]
    fn free_x_play_reads_energy_without_draining() {
        let mut battle = start_battle(player_with(deck(cards::whirlwind(), 4)), &[enemies::dummy(50)]);
        let enemy = enemy_ids(&battle)[0];
        let index = hand_index(&battle, "whirlwind");
        let mut card = battle.player_mut().hand.remove(index).unwrap();

        card.play(&mut battle, None, true).unwrap();
        battle.player_mut().discard_pile.push(card);

        assert_eq!(enemy_hp(&battle, enemy), 35);
        assert_eq!(battle.player().energy(), 3);
        battle.check_invariants().unwrap();
    }

    #[test]
    fn free_play_ignores_empty_energy() {
        let mut battle = start_battle(player_with(deck(cards::bash(), 4)), &[enemies::dummy(50)]);
        let enemy = enemy_ids(&battle)[0];
        for _ in 0..3 {
            battle.play_card(hand_index(&battle, "defend"), None).unwrap();
        }
        assert_eq!(battle.player().energy(), 0);

        let index = hand_index(&battle, "bash");
        let mut card = battle.player_mut().hand.remove(index).unwrap();
        card.play(&mut battle, Some(enemy), true).unwrap();
        battle.player_mut().discard_pile.push(card);

        assert_eq!(enemy_hp(&battle, enemy), 42);
        let statuses = battle.arena().get(enemy).unwrap().combat.statuses();
        assert_eq!(statuses.get(StatusKind::Vulnerable), 2);
        assert_eq!(battle.player().energy(), 0);
        battle.check_invariants().unwrap();
    }

    #[test]
    fn whirlwind_finishes_each_enemy_before_the_next() {
        let mut battle = start_battle(
            player_with(deck(cards::whirlwind(), 4)),
            &[enemies::dummy(50), enemies::dummy(50)],
        );
        let ids = enemy_ids(&battle);
        battle.take_events();
        battle.play_card(hand_index(&battle, "whirlwind"), None).unwrap();
        let events = battle.take_events();
        assert_eq!(
            damage_targets(&events),
            vec![ids[0], ids[0], ids[0], ids[1], ids[1], ids[1]]
        );
    }

    #[test]
    fn powers_leave_play() {
        let mut battle = start_battle(player_with(deck(cards::inflame(), 4)), &[enemies::dummy(50)]);
        battle.play_card(hand_index(&battle, "inflame"), None).unwrap();
        assert_eq!(battle.player().combat.statuses().get(StatusKind::Strength), 2);
        assert_eq!(battle.player().exhaust_pile.len(), 1);
        assert!(battle.player().discard_pile.is_empty());
        battle.check_invariants().unwrap();
    }

    #[test]
    fn exhausting_card_goes_to_exhaust() {
        let offerings = std::iter::repeat_with(cards::offering).take(10).collect();
        let mut battle = start_battle(player_with(offerings), &[enemies::dummy(50)]);
        battle.play_card(0, None).unwrap();
        assert_eq!(battle.player().combat.hp(), 74);
        assert_eq!(battle.player().energy(), 5);
        assert_eq!(battle.player().hand.len(), 7);
        assert_eq!(battle.player().exhaust_pile.len(), 1);
        battle.check_invariants().unwrap();
    }

    #[test]
    fn double_tap_repeats_next_attack() {
        let mut hand = vec![cards::double_tap(), cards::strike()];
        hand.extend(defends(3));
        let mut battle = start_battle(player_with(hand), &[enemies::dummy(50)]);
        let enemy = enemy_ids(&battle)[0];
        battle.play_card(hand_index(&battle, "double_tap"), None).unwrap();
        battle.play_card(hand_index(&battle, "strike"), Some(enemy)).unwrap();

        assert_eq!(enemy_hp(&battle, enemy), 38);
        assert!(!battle.player().combat.statuses().has(StatusKind::DoubleTap));
    }

    #[test]
    fn rage_grants_block_per_attack() {
        let mut hand = vec![cards::rage(), cards::strike(), cards::strike()];
        hand.extend(defends(2));
        let mut battle = start_battle(player_with(hand), &[enemies::dummy(50)]);
        battle.play_card(hand_index(&battle, "rage"), None).unwrap();
        battle.play_card(hand_index(&battle, "strike"), None).unwrap();
        battle.play_card(hand_index(&battle, "strike"), None).unwrap();
        assert_eq!(battle.player().combat.block(), 6);
    }

    #[test]
    fn rupture_turns_self_damage_into_strength() {
        let mut hand = vec![cards::rupture(), cards::hemokinesis()];
        hand.extend(defends(3));
        let mut battle = start_battle(player_with(hand), &[enemies::dummy(50)]);
        let enemy = enemy_ids(&battle)[0];
        battle.play_card(hand_index(&battle, "rupture"), None).unwrap();
        battle
            .play_card(hand_index(&battle, "hemokinesis"), Some(enemy))
            .unwrap();

        assert_eq!(battle.player().combat.hp(), 78);
        assert_eq!(battle.player().hp_loss_count(), 1);
        assert_eq!(battle.player().combat.statuses().get(StatusKind::Strength), 1);
        assert_eq!(enemy_hp(&battle, enemy), 34);
    }

    #[test]
    fn rampage_grows_within_battle_only() {
        let mut battle = start_battle(player_with(vec![cards::rampage()]), &[enemies::dummy(99)]);
        let enemy = enemy_ids(&battle)[0];
        battle.play_card(0, Some(enemy)).unwrap();
        assert_eq!(enemy_hp(&battle, enemy), 91);
        battle.end_turn().unwrap();
        battle.play_card(0, Some(enemy)).unwrap();
        assert_eq!(enemy_hp(&battle, enemy), 78);

        let player = battle.finish();
        assert_eq!(player.master_deck()[0].misc_value(), 0);
    }

    #[test]
    fn headbutt_moves_chosen_card_to_draw_top() {
        let mut hand = vec![cards::headbutt(), cards::defend()];
        hand.extend(std::iter::repeat_with(cards::strike).take(3));
        let (mut battle, log) = start_recorded(player_with(hand), &[enemies::dummy(50)]);
        battle.play_card(hand_index(&battle, "defend"), None).unwrap();
        log.borrow_mut().answers.push_back(vec![0]);

        battle.play_card(hand_index(&battle, "headbutt"), None).unwrap();

        assert_eq!(log.borrow().prompts.len(), 1);
        let draw = battle.player().draw_pile.cards();
        assert_eq!(draw.last().map(|card| card.id()), Some("defend"));
        assert_eq!(battle.player().discard_pile.len(), 1);
        battle.check_invariants().unwrap();
    }

    #[test]
    fn selection_from_empty_pile_does_not_ask() {
        let (mut battle, log) = start_recorded(player_with(deck(cards::headbutt(), 4)), &[enemies::dummy(50)]);
        battle.play_card(hand_index(&battle, "headbutt"), None).unwrap();
        assert!(log.borrow().prompts.is_empty());
    }

    #[test]
    fn exhausted_sentinel_refunds_energy() {
        let (mut battle, _log) =
            start_recorded(player_with(vec![cards::true_grit(), cards::sentinel()]), &[enemies::dummy(50)]);
        battle.play_card(hand_index(&battle, "true_grit"), None).unwrap();

        assert_eq!(battle.player().energy(), 4);
        assert_eq!(battle.player().combat.block(), 7);
        assert_eq!(battle.player().exhaust_pile.cards()[0].id(), "sentinel");
        battle.check_invariants().unwrap();
    }

    #[test]
    fn created_cards_join_the_partition() {
        let mut battle = start_battle(player_with(defends(5)), &[enemies::dummy(50)]);
        battle.add_card_to_pile(cards::wound(), PileKind::Draw);
        battle.add_card_to_pile(cards::slimed(), PileKind::Discard);
        assert_eq!(battle.player().draw_pile.len(), 1);
        assert_eq!(battle.player().discard_pile.len(), 1);
        battle.check_invariants().unwrap();
    }
}

// =============================================================================
// Draw
// =============================================================================

mod draw_tests {
    use super::*;

    #[test]
    fn empty_draw_pile_reshuffles_once() {
        let mut battle = start_battle(
            player_with(std::iter::repeat_with(cards::strike).take(10).collect()),
            &[enemies::dummy(50)],
        );
        for _ in 0..3 {
            assert!(battle.move_card(PileKind::Draw, 0, PileKind::Discard));
        }
        assert_eq!(battle.player().draw_pile.len(), 2);
        battle.take_events();

        assert_eq!(battle.draw_cards(3), 3);

        let events = battle.take_events();
        let shuffles = count_events(&events, |e| matches!(e, BattleEvent::Shuffled { .. }));
        assert_eq!(shuffles, 1);
        assert_eq!(battle.player().hand.len(), 8);
        assert_eq!(battle.player().draw_pile.len(), 2);
        assert!(battle.player().discard_pile.is_empty());
        battle.check_invariants().unwrap();
    }

    #[test]
    fn draw_stops_when_both_piles_empty() {
        let mut battle = start_battle(player_with(defends(5)), &[enemies::dummy(50)]);
        assert_eq!(battle.draw_cards(3), 0);
        assert_eq!(battle.player().hand.len(), 5);
    }

    #[test]
    fn no_draw_suppresses_until_turn_end() {
        let mut battle = start_battle(
            player_with(std::iter::repeat_with(cards::strike).take(10).collect()),
            &[enemies::dummy(50)],
        );
        battle.apply_status(None, EntityId::PLAYER, StatusKind::NoDraw, 1);
        assert_eq!(battle.draw_cards(2), 0);
        assert_eq!(battle.player().hand.len(), 5);

        battle.end_turn().unwrap();
        assert!(!battle.player().combat.statuses().has(StatusKind::NoDraw));
        assert_eq!(battle.player().hand.len(), 5);
    }
}

// =============================================================================
// Guards
// =============================================================================

mod guard_tests {
    use super::*;

    struct Reentrant {
        declaration: RelicDeclaration,
        outcomes: Arc<Mutex<Vec<Result<(), ActionRejected>>>>,
    }

    impl Relic for Reentrant {
        fn declaration(&self) -> &RelicDeclaration {
            &self.declaration
        }

        fn on_card_play(&self, battle: &mut crate::battle::Battle, _card: &crate::card::Card) {
            let outcome = battle.play_card(0, None);
            self.outcomes.lock().unwrap().push(outcome);
            let outcome = battle.end_turn();
            self.outcomes.lock().unwrap().push(outcome);
        }
    }

    #[test]
    fn actions_before_start_are_rejected() {
        let mut battle = crate::battle::Battle::new(player_with(defends(5)), &[enemies::dummy(10)], 1);
        assert_eq!(
            battle.play_card(0, None),
            Err(ActionRejected::WrongPhase(Phase::Idle))
        );
        assert_eq!(battle.end_turn(), Err(ActionRejected::WrongPhase(Phase::Idle)));
    }

    #[test]
    fn missing_card_is_rejected() {
        let mut battle = start_battle(player_with(defends(5)), &[enemies::dummy(10)]);
        assert_eq!(battle.play_card(9, None), Err(ActionRejected::NoSuchCard(9)));
        assert_eq!(battle.use_potion(0, None), Err(ActionRejected::NoSuchPotion(0)));
    }

    #[test]
    fn unaffordable_card_stays_in_place() {
        let bashes = std::iter::repeat_with(cards::bash).take(5).collect();
        let mut battle = start_battle(player_with(bashes), &[enemies::dummy(99)]);
        battle.play_card(0, None).unwrap();
        let uid = battle.player().hand.get(1).and_then(|card| card.uid());

        assert_eq!(battle.play_card(1, None), Err(ActionRejected::InsufficientEnergy));
        assert_eq!(battle.player().hand.len(), 4);
        assert_eq!(battle.player().hand.get(1).and_then(|card| card.uid()), uid);
        assert_eq!(battle.player().energy(), 1);
        battle.check_invariants().unwrap();
    }

    #[test]
    fn unplayable_cards_are_rejected() {
        let mut battle = start_battle(player_with(deck(cards::wound(), 4)), &[enemies::dummy(10)]);
        let index = hand_index(&battle, "wound");
        assert_eq!(battle.play_card(index, None), Err(ActionRejected::Unplayable));
        assert_eq!(battle.player().hand.len(), 5);
    }

    #[test]
    fn entangled_blocks_attacks_only() {
        let mut battle = start_battle(player_with(deck(cards::strike(), 4)), &[enemies::dummy(10)]);
        battle.apply_status(None, EntityId::PLAYER, StatusKind::Entangled, 1);
        assert_eq!(
            battle.play_card(hand_index(&battle, "strike"), None),
            Err(ActionRejected::Entangled)
        );
        assert!(battle.play_card(hand_index(&battle, "defend"), None).is_ok());
    }

    #[test]
    fn no_living_enemy_is_no_target() {
        let mut battle = start_battle(player_with(deck(cards::strike(), 4)), &[enemies::dummy(10)]);
        let enemy = enemy_ids(&battle)[0];
        battle.arena_mut().despawn(enemy);
        assert_eq!(
            battle.play_card(hand_index(&battle, "strike"), None),
            Err(ActionRejected::NoTarget)
        );
        assert!(battle.play_card(hand_index(&battle, "defend"), None).is_ok());
    }

    #[test]
    fn reentrant_actions_are_dropped() {
        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let mut player = player_with(deck(cards::strike(), 4));
        player.obtain_relic(Arc::new(Reentrant {
            declaration: RelicDeclaration::new("reentrant", "Reentrant", HookPoints::CARD_PLAY),
            outcomes: Arc::clone(&outcomes),
        }));
        let mut battle = start_battle(player, &[enemies::dummy(50)]);

        battle.play_card(hand_index(&battle, "strike"), None).unwrap();

        assert_eq!(
            *outcomes.lock().unwrap(),
            vec![Err(ActionRejected::Busy), Err(ActionRejected::Busy)]
        );
        assert_eq!(battle.player().hand.len(), 4);
        assert_eq!(battle.phase(), Phase::Player);
        battle.check_invariants().unwrap();
    }
}

// =============================================================================
// Battle End
// =============================================================================

mod end_tests {
    use super::*;

    #[test]
    fn victory_is_reported_once() {
        let mut player = player_with(deck(cards::strike(), 4));
        player.obtain_relic(relics::burning_blood());
        player.combat.set_hp(60);
        let (mut battle, log) = start_recorded(player, &[enemies::dummy(6)]);

        battle.play_card(hand_index(&battle, "strike"), None).unwrap();
        assert_eq!(battle.phase(), Phase::Won);
        assert_eq!(battle.check_battle_end(), Some(BattleResult::Win));
        assert_eq!(battle.check_battle_end(), Some(BattleResult::Win));

        assert_eq!(log.borrow().results, vec![BattleResult::Win]);
        assert_eq!(battle.player().combat.hp(), 66);
        let ended = count_events(battle.events(), |e| matches!(e, BattleEvent::BattleEnded { .. }));
        assert_eq!(ended, 1);

        assert_eq!(battle.play_card(0, None), Err(ActionRejected::BattleOver));
        assert_eq!(battle.end_turn(), Err(ActionRejected::BattleOver));
        assert_eq!(battle.use_potion(0, None), Err(ActionRejected::BattleOver));
    }

    #[test]
    fn defeat_is_reported_once() {
        let mut player = player_with(defends(5));
        player.combat.set_hp(4);
        let (mut battle, log) = start_recorded(player, &[attacker(30, 5)]);
        battle.end_turn().unwrap();

        assert_eq!(battle.phase(), Phase::Lost);
        assert_eq!(battle.result(), Some(BattleResult::Lose));
        assert_eq!(log.borrow().results, vec![BattleResult::Lose]);
        assert_eq!(battle.check_battle_end(), Some(BattleResult::Lose));
        assert_eq!(log.borrow().results.len(), 1);
    }

    #[test]
    fn looter_escapes_and_battle_is_won() {
        let mut battle = start_battle(player_with(defends(10)), &[enemies::looter()]);
        for _ in 0..4 {
            battle.end_turn().unwrap();
        }
        assert_eq!(battle.result(), Some(BattleResult::Win));
        assert_eq!(battle.player().combat.hp(), 60);
        assert!(battle.arena().is_empty());
        let fled = count_events(battle.events(), |e| matches!(e, BattleEvent::EnemyFled { .. }));
        assert_eq!(fled, 1);
    }

    #[test]
    fn large_slime_splits_into_two_at_remaining_hp() {
        let mut battle = start_battle(player_with(defends(10)), &[enemies::large_slime()]);
        let slime = enemy_ids(&battle)[0];
        battle.arena_mut().get_mut(slime).unwrap().combat.set_hp(30);

        battle.end_turn().unwrap();
        assert_eq!(battle.player().combat.hp(), 64);
        let slimed = battle
            .player()
            .discard_pile
            .iter()
            .filter(|card| card.id() == "slimed")
            .count();
        assert_eq!(slimed, 2);
        assert_eq!(
            battle.arena().get(slime).unwrap().next_move().map(|i| i.name.as_str()),
            Some("Split")
        );

        battle.end_turn().unwrap();
        let children = enemy_ids(&battle);
        assert_eq!(children.len(), 2);
        for child in children {
            let enemy = battle.arena().get(child).unwrap();
            assert_eq!(enemy.name(), "Medium Slime");
            assert_eq!(enemy.combat.hp(), 30);
            assert_eq!(enemy.combat.max_hp(), 30);
            assert!(enemy.next_move().is_some());
        }
        battle.check_invariants().unwrap();
    }

    #[test]
    fn cultist_ritual_builds_strength() {
        let mut battle = start_battle(player_with(defends(10)), &[enemies::cultist()]);
        battle.end_turn().unwrap();
        assert_eq!(battle.player().combat.hp(), 80);
        battle.end_turn().unwrap();
        assert_eq!(battle.player().combat.hp(), 71);
    }
}

// =============================================================================
// Relics and Potions
// =============================================================================

mod relic_tests {
    use super::*;

    struct Ward {
        declaration: RelicDeclaration,
        gains: Arc<Mutex<Vec<i32>>>,
    }

    impl Relic for Ward {
        fn declaration(&self) -> &RelicDeclaration {
            &self.declaration
        }

        fn on_gain_block(&self, battle: &mut crate::battle::Battle, amount: i32) {
            self.gains.lock().unwrap().push(amount);
            battle.player_mut().combat.statuses_mut().add(StatusKind::Thorns, 1);
        }
    }

    #[test]
    fn gain_block_notifies_after_block_lands() {
        let gains = Arc::new(Mutex::new(Vec::new()));
        let mut player = player_with(vec![
            cards::defend(),
            cards::strike(),
            cards::strike(),
            cards::strike(),
            cards::strike(),
        ]);
        player.obtain_relic(Arc::new(Ward {
            declaration: RelicDeclaration::new("ward", "Ward", HookPoints::GAIN_BLOCK),
            gains: Arc::clone(&gains),
        }));
        let mut battle = start_battle(player, &[enemies::dummy(50)]);
        battle
            .player_mut()
            .combat
            .statuses_mut()
            .add(StatusKind::Dexterity, 2);

        battle.play_card(hand_index(&battle, "strike"), None).unwrap();
        assert!(gains.lock().unwrap().is_empty());

        battle.play_card(hand_index(&battle, "defend"), None).unwrap();
        assert_eq!(*gains.lock().unwrap(), vec![7]);
        assert_eq!(battle.player().combat.block(), 7);
        let statuses = battle.player().combat.statuses();
        assert_eq!(statuses.get(StatusKind::Thorns), 1);
    }

    #[test]
    fn first_turn_relics() {
        let mut player = player_with(std::iter::repeat_with(cards::strike).take(10).collect());
        player.obtain_relic(relics::anchor());
        player.obtain_relic(relics::lantern());
        player.obtain_relic(relics::bag_of_preparation());
        let mut battle = start_battle(player, &[enemies::dummy(99)]);

        assert_eq!(battle.player().combat.block(), 10);
        assert_eq!(battle.player().energy(), 4);
        assert_eq!(battle.player().hand.len(), 7);

        battle.end_turn().unwrap();
        assert_eq!(battle.player().combat.block(), 0);
        assert_eq!(battle.player().energy(), 3);
        assert_eq!(battle.player().hand.len(), 5);
    }

    #[test]
    fn battle_start_statuses() {
        let mut player = player_with(defends(5));
        player.obtain_relic(relics::vajra());
        player.obtain_relic(relics::bronze_scales());
        player.obtain_relic(relics::bag_of_marbles());
        let battle = start_battle(player, &[enemies::dummy(20), enemies::dummy(20)]);

        let statuses = battle.player().combat.statuses();
        assert_eq!(statuses.get(StatusKind::Strength), 1);
        assert_eq!(statuses.get(StatusKind::Thorns), 3);
        for id in enemy_ids(&battle) {
            let enemy = battle.arena().get(id).unwrap();
            assert_eq!(enemy.combat.statuses().get(StatusKind::Vulnerable), 1);
        }
    }

    #[test]
    fn pen_nib_doubles_tenth_attack() {
        let mut player = player_with(deck(cards::strike(), 4));
        player.obtain_relic(relics::pen_nib());
        player.set_counter("pen_nib", 9);
        let mut battle = start_battle(player, &[enemies::dummy(50)]);
        let enemy = enemy_ids(&battle)[0];

        battle.play_card(hand_index(&battle, "strike"), None).unwrap();
        assert_eq!(enemy_hp(&battle, enemy), 38);
        assert_eq!(battle.player().counter("pen_nib"), 0);
    }

    #[test]
    fn champion_belt_adds_weak() {
        let mut player = player_with(deck(cards::bash(), 4));
        player.obtain_relic(relics::champion_belt());
        let mut battle = start_battle(player, &[enemies::dummy(50)]);
        let enemy = enemy_ids(&battle)[0];

        battle.play_card(hand_index(&battle, "bash"), None).unwrap();
        let statuses = battle.arena().get(enemy).unwrap().combat.statuses();
        assert_eq!(statuses.get(StatusKind::Vulnerable), 2);
        assert_eq!(statuses.get(StatusKind::Weak), 1);
    }

    #[test]
    fn artifact_negates_debuff() {
        let mut battle = start_battle(player_with(deck(cards::bash(), 4)), &[enemies::sentry()]);
        let enemy = enemy_ids(&battle)[0];
        battle.take_events();

        battle.play_card(hand_index(&battle, "bash"), None).unwrap();
        let statuses = battle.arena().get(enemy).unwrap().combat.statuses();
        assert!(!statuses.has(StatusKind::Vulnerable));
        assert!(!statuses.has(StatusKind::Artifact));
        let negated = count_events(&battle.take_events(), |e| {
            matches!(e, BattleEvent::StatusNegated { kind: StatusKind::Vulnerable, .. })
        });
        assert_eq!(negated, 1);
    }

    #[test]
    fn centennial_puzzle_draws_on_first_hp_loss() {
        let mut player = player_with(std::iter::repeat_with(cards::hemokinesis).take(10).collect());
        player.obtain_relic(relics::centennial_puzzle());
        let mut battle = start_battle(player, &[enemies::dummy(99)]);

        battle.play_card(0, None).unwrap();
        assert_eq!(battle.player().hand.len(), 7);
        battle.play_card(0, None).unwrap();
        assert_eq!(battle.player().hand.len(), 6);
    }

    #[test]
    fn charons_ashes_burn_on_exhaust() {
        let mut player = player_with(vec![cards::true_grit(), cards::defend()]);
        player.obtain_relic(relics::charons_ashes());
        let mut battle = start_battle(player, &[enemies::dummy(20), enemies::dummy(20)]);

        battle.play_card(hand_index(&battle, "true_grit"), None).unwrap();
        for id in enemy_ids(&battle) {
            assert_eq!(enemy_hp(&battle, id), 17);
        }
    }

    #[test]
    fn sundial_pays_every_third_shuffle() {
        let mut player = player_with(defends(5));
        player.obtain_relic(relics::sundial());
        let mut battle = start_battle(player, &[enemies::dummy(99)]);

        battle.end_turn().unwrap();
        battle.end_turn().unwrap();
        assert_eq!(battle.player().energy(), 3);
        battle.end_turn().unwrap();
        assert_eq!(battle.player().energy(), 5);
        assert_eq!(battle.player().counter("sundial"), 0);
    }

    #[test]
    fn orichalcum_guards_an_empty_block() {
        let mut player = player_with(defends(5));
        player.obtain_relic(relics::orichalcum());
        let mut battle = start_battle(player, &[attacker(30, 5)]);
        battle.end_turn().unwrap();
        assert_eq!(battle.player().combat.hp(), 80);
    }

    #[test]
    fn metallicize_blocks_at_turn_end() {
        let mut battle = start_battle(player_with(deck(cards::metallicize(), 4)), &[attacker(30, 5)]);
        battle.play_card(hand_index(&battle, "metallicize"), None).unwrap();
        battle.end_turn().unwrap();
        assert_eq!(battle.player().combat.hp(), 78);
    }

    #[test]
    fn potions_consume_their_slot() {
        let mut player = player_with(defends(5));
        player.obtain_relic(relics::toy_ornithopter());
        player.combat.set_hp(70);
        assert!(player.obtain_potion(potions::fire_potion()));
        let mut battle = start_battle(player, &[enemies::dummy(30)]);
        let enemy = enemy_ids(&battle)[0];

        battle.use_potion(0, Some(enemy)).unwrap();
        assert_eq!(enemy_hp(&battle, enemy), 10);
        assert_eq!(battle.player().combat.hp(), 75);
        assert!(battle.player().potion(0).is_none());
        assert_eq!(battle.use_potion(0, Some(enemy)), Err(ActionRejected::NoSuchPotion(0)));
    }

    #[test]
    fn explosive_potion_hits_everyone() {
        let mut player = player_with(defends(5));
        assert!(player.obtain_potion(potions::explosive_potion()));
        let mut battle = start_battle(player, &[enemies::dummy(30), enemies::dummy(30)]);
        battle.use_potion(0, None).unwrap();
        for id in enemy_ids(&battle) {
            assert_eq!(enemy_hp(&battle, id), 20);
        }
    }
}
