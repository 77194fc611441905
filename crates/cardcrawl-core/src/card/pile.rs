//! Ordered card containers.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Card, CardUid};

/// The four battle piles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PileKind {
    /// Cards waiting to be drawn.
    Draw,
    /// Cards in hand.
    Hand,
    /// Played and discarded cards.
    Discard,
    /// Cards removed for the rest of the battle.
    Exhaust,
}

impl PileKind {
    /// All piles, in a fixed order.
    pub const ALL: [Self; 4] = [Self::Draw, Self::Hand, Self::Discard, Self::Exhaust];
}

/// An ordered stack of cards. Index 0 is the bottom; `pop` takes from the top.
#[derive(Debug, Clone, Default)]
pub struct Pile {
    cards: Vec<Card>,
}

impl Pile {
    /// Creates an empty pile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns true if the pile holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Puts a card on top.
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Inserts a card at `index`, clamped to the pile length.
    pub fn insert(&mut self, index: usize, card: Card) {
        let index = index.min(self.cards.len());
        self.cards.insert(index, card);
    }

    /// Takes the top card.
    pub fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Removes the card at `index`, preserving the order of the rest.
    pub fn remove(&mut self, index: usize) -> Option<Card> {
        (index < self.cards.len()).then(|| self.cards.remove(index))
    }

    /// Removes and returns every card, bottom first.
    pub fn drain(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
    }

    /// Appends cards on top, in order.
    pub fn extend(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards.extend(cards);
    }

    /// Removes every card.
    pub fn clear(&mut self) {
        self.cards.clear();
    }

    /// The card at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    /// The card at `index`, mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Card> {
        self.cards.get_mut(index)
    }

    /// Position of the card with `uid`.
    #[must_use]
    pub fn position(&self, uid: CardUid) -> Option<usize> {
        self.cards.iter().position(|card| card.uid() == Some(uid))
    }

    /// The cards, bottom first.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Iterates bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &Card> + '_ {
        self.cards.iter()
    }

    /// Iterates bottom to top, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Card> + '_ {
        self.cards.iter_mut()
    }

    /// Shuffles in place (Fisher-Yates).
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }
}
