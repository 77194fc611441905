//! Battle event log for telemetry, replays, and tests.
//!
//! Every state-visible mutation the engine performs is recorded as a
//! [`BattleEvent`]. The log never feeds back into the simulation; hosts drain
//! it with [`crate::battle::Battle::take_events`].
//!
//! # Example
//!
//! ```
//! use cardcrawl_core::event::{BattleEvent, EventLog};
//!
//! let mut log = EventLog::new();
//! log.push(BattleEvent::TurnStarted { turn: 1 });
//! assert_eq!(log.len(), 1);
//!
//! let events = log.take_events();
//! assert_eq!(events.len(), 1);
//! assert!(log.is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::battle::Phase;
use crate::card::CardUid;
use crate::entity::status::StatusKind;
use crate::entity::{DamageSource, EntityId, IntentKind};
use crate::host::BattleResult;

/// Something that happened in a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleEvent {
    /// The phase changed.
    PhaseChanged {
        /// New phase.
        phase: Phase,
    },
    /// A player turn started.
    TurnStarted {
        /// Turn number (1-based).
        turn: u32,
    },
    /// Cards moved from the draw pile to the hand.
    CardsDrawn {
        /// Number drawn.
        count: usize,
    },
    /// The discard pile was shuffled into the draw pile.
    Shuffled {
        /// Cards in the new draw pile.
        cards: usize,
    },
    /// A card was paid for and is resolving.
    CardPlayed {
        /// Content id.
        card: String,
        /// Instance uid.
        uid: Option<CardUid>,
        /// Requested target.
        target: Option<EntityId>,
        /// Captured X value.
        x_value: u32,
    },
    /// A card went to the exhaust pile.
    CardExhausted {
        /// Content id.
        card: String,
    },
    /// A card was created in a battle pile.
    CardCreated {
        /// Content id.
        card: String,
    },
    /// A hit resolved.
    DamageDealt {
        /// Origin of the hit.
        source: DamageSource,
        /// Entity hit.
        target: EntityId,
        /// Damage after the target's modifiers.
        amount: i32,
        /// Absorbed by block.
        blocked: i32,
        /// HP removed.
        hp_lost: i32,
    },
    /// Block was gained.
    BlockGained {
        /// Entity gaining block.
        target: EntityId,
        /// Block gained.
        amount: i32,
    },
    /// HP was restored.
    Healed {
        /// Entity healed.
        target: EntityId,
        /// HP restored.
        amount: i32,
    },
    /// A status was applied.
    StatusApplied {
        /// Entity affected.
        target: EntityId,
        /// Status kind.
        kind: StatusKind,
        /// Delta requested.
        amount: i32,
    },
    /// An `artifact` stack absorbed a debuff.
    StatusNegated {
        /// Entity affected.
        target: EntityId,
        /// Status kind that was blocked.
        kind: StatusKind,
    },
    /// An enemy chose its displayed intent.
    IntentDeclared {
        /// The enemy.
        enemy: EntityId,
        /// Move name.
        name: String,
        /// Category.
        kind: IntentKind,
    },
    /// An enemy executed its intent.
    EnemyActed {
        /// The enemy.
        enemy: EntityId,
        /// Move name.
        name: String,
    },
    /// An enemy entered the battle.
    EnemySpawned {
        /// The new enemy.
        enemy: EntityId,
        /// Its name.
        name: String,
    },
    /// An enemy died.
    EnemyDied {
        /// The enemy.
        enemy: EntityId,
    },
    /// An enemy left the battle alive.
    EnemyFled {
        /// The enemy.
        enemy: EntityId,
    },
    /// An enemy was replaced by two others.
    EnemySplit {
        /// The original enemy.
        parent: EntityId,
        /// The replacements, left to right.
        children: [EntityId; 2],
    },
    /// A potion was used.
    PotionUsed {
        /// Content id.
        potion: String,
    },
    /// The battle ended.
    BattleEnded {
        /// Outcome.
        result: BattleResult,
    },
}

/// Append-only event buffer.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<BattleEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event.
    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    /// Drains and returns all recorded events, oldest first.
    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discards all events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
