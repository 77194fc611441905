//! Status ledger: stacking buffs and debuffs on a single entity.
//!
//! Every entity carries a [`StatusLedger`], an ordered map from
//! [`StatusKind`] to a signed magnitude. Entries with magnitude zero are never
//! stored.
//!
//! # Stacking rules
//!
//! - Applying a stack merges additively with an existing entry.
//! - A debuff application against an entity with `artifact` consumes one
//!   artifact stack and is discarded entirely.
//! - `strength` and `dexterity` are sign-sensitive: a negative delta is a
//!   debuff, a positive one a buff.
//!
//! # Turn-end tick
//!
//! [`StatusLedger::tick`] runs once at the end of the owner's turn and
//! applies decay, self-consumption, and conversions in a single pass over a
//! snapshot of the entries, so a kind created by a conversion is not revisited
//! in the same pass.
//!
//! # Example
//!
//! ```
//! use cardcrawl_core::entity::status::{StatusKind, StatusLedger};
//!
//! let mut ledger = StatusLedger::new();
//! ledger.add(StatusKind::Artifact, 1);
//!
//! // The artifact absorbs the debuff.
//! ledger.add(StatusKind::Weak, 2);
//! assert!(!ledger.has(StatusKind::Weak));
//! assert!(!ledger.has(StatusKind::Artifact));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Kinds of status effects understood by the engine.
///
/// The declaration order is the ledger's iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Flat bonus to outgoing attack damage. Sign-sensitive.
    Strength,
    /// Flat bonus to block gained. Sign-sensitive.
    Dexterity,
    /// Incoming damage x1.5 (rounded up). Decrements at turn end.
    Vulnerable,
    /// Outgoing damage x0.75 (rounded down). Decrements at turn end.
    Weak,
    /// Block gained x0.75 (rounded down). Decrements at turn end.
    Frail,
    /// Attacks cannot be played. Decrements at turn end.
    Entangled,
    /// Strength lost at turn end, then removed.
    StrengthDown,
    /// Negates the next debuff applications, one per stack.
    Artifact,
    /// Strength gained at turn end.
    Ritual,
    /// Heal at turn end, then decrement.
    Regeneration,
    /// Block gained at turn end.
    Metallicize,
    /// Block gained at turn end; loses a stack whenever HP is lost.
    PlatedArmor,
    /// Damage reflected to an attacker.
    Thorns,
    /// Damage reflected to an attacker; expires at the start of the player's turn.
    FlameBarrier,
    /// One-shot block on the first HP loss.
    CurlUp,
    /// Strength gained whenever the player loses HP to unsourced damage.
    Rupture,
    /// Strength gained at the start of every player turn.
    DemonForm,
    /// Block is retained between turns.
    Barricade,
    /// Block gained whenever an attack is played. Removed at turn end.
    Rage,
    /// Skills cost 0.
    Corruption,
    /// No cards may be drawn. Removed at turn end.
    NoDraw,
    /// The next attack played resolves twice. Removed at turn end.
    DoubleTap,
}

/// Static classification of a status kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusClass {
    /// Beneficial to its owner.
    Buff,
    /// Harmful to its owner; blocked by `artifact`.
    Debuff,
    /// Neither; never blocked by `artifact`.
    Neutral,
}

impl StatusKind {
    /// Returns the static classification of this kind.
    #[must_use]
    pub const fn class(self) -> StatusClass {
        match self {
            Self::Vulnerable | Self::Weak | Self::Frail | Self::Entangled | Self::StrengthDown => {
                StatusClass::Debuff
            }
            Self::NoDraw | Self::DoubleTap => StatusClass::Neutral,
            _ => StatusClass::Buff,
        }
    }

    /// Returns true if the sign of a delta decides buff versus debuff.
    #[must_use]
    pub const fn is_sign_sensitive(self) -> bool {
        matches!(self, Self::Strength | Self::Dexterity)
    }

    /// Returns true if applying `delta` of this kind counts as a debuff.
    #[must_use]
    pub const fn is_debuff_application(self, delta: i32) -> bool {
        if self.is_sign_sensitive() {
            delta < 0
        } else {
            matches!(self.class(), StatusClass::Debuff) && delta > 0
        }
    }

    /// Returns true if this kind loses one stack at its owner's turn end.
    #[must_use]
    pub const fn decrements_at_turn_end(self) -> bool {
        matches!(
            self,
            Self::Vulnerable | Self::Weak | Self::Frail | Self::Entangled
        )
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Strength => "strength",
            Self::Dexterity => "dexterity",
            Self::Vulnerable => "vulnerable",
            Self::Weak => "weak",
            Self::Frail => "frail",
            Self::Entangled => "entangled",
            Self::StrengthDown => "strength_down",
            Self::Artifact => "artifact",
            Self::Ritual => "ritual",
            Self::Regeneration => "regeneration",
            Self::Metallicize => "metallicize",
            Self::PlatedArmor => "plated_armor",
            Self::Thorns => "thorns",
            Self::FlameBarrier => "flame_barrier",
            Self::CurlUp => "curl_up",
            Self::Rupture => "rupture",
            Self::DemonForm => "demon_form",
            Self::Barricade => "barricade",
            Self::Rage => "rage",
            Self::Corruption => "corruption",
            Self::NoDraw => "no_draw",
            Self::DoubleTap => "double_tap",
        };
        f.write_str(name)
    }
}

/// Result of a single [`StatusLedger::add`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusChange {
    /// The delta was merged; carries the resulting magnitude (0 if purged).
    Applied(i32),
    /// An `artifact` stack absorbed the debuff.
    Negated,
    /// The delta was zero.
    Unchanged,
}

impl StatusChange {
    /// Returns true if the ledger now reflects the requested delta.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Heal and block the owner must apply after a turn-end tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// HP to restore (from `regeneration`).
    pub heal: i32,
    /// Block to grant (from `metallicize` and `plated_armor`).
    pub block: i32,
}

/// Ordered collection of status stacks on one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLedger {
    stacks: BTreeMap<StatusKind, i32>,
}

impl StatusLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `delta` stacks of `kind`, honouring `artifact`.
    ///
    /// # Arguments
    ///
    /// * `kind` - The status kind to apply
    /// * `delta` - Signed stack change; zero is a no-op
    pub fn add(&mut self, kind: StatusKind, delta: i32) -> StatusChange {
        if delta == 0 {
            return StatusChange::Unchanged;
        }
        if kind.is_debuff_application(delta) && self.get(StatusKind::Artifact) > 0 {
            self.adjust(StatusKind::Artifact, -1);
            trace!(%kind, delta, "debuff negated by artifact");
            return StatusChange::Negated;
        }
        let value = self.adjust(kind, delta);
        trace!(%kind, delta, value, "status applied");
        StatusChange::Applied(value)
    }

    /// Merges `delta` into `kind` without the artifact check.
    ///
    /// Returns the resulting magnitude; a zero result removes the entry.
    pub fn adjust(&mut self, kind: StatusKind, delta: i32) -> i32 {
        let value = self.get(kind) + delta;
        if value == 0 {
            self.stacks.remove(&kind);
        } else {
            self.stacks.insert(kind, value);
        }
        value
    }

    /// Returns the magnitude of `kind`, or 0 if absent.
    #[must_use]
    pub fn get(&self, kind: StatusKind) -> i32 {
        self.stacks.get(&kind).copied().unwrap_or(0)
    }

    /// Returns true if `kind` is present with a nonzero magnitude.
    #[must_use]
    pub fn has(&self, kind: StatusKind) -> bool {
        self.get(kind) != 0
    }

    /// Removes `kind` entirely, returning its previous magnitude.
    pub fn remove(&mut self, kind: StatusKind) -> i32 {
        self.stacks.remove(&kind).unwrap_or(0)
    }

    /// Consumes a single stack of `kind` if present.
    ///
    /// Returns true if a stack was consumed.
    pub fn consume_one(&mut self, kind: StatusKind) -> bool {
        if self.get(kind) > 0 {
            self.adjust(kind, -1);
            true
        } else {
            false
        }
    }

    /// Iterates over `(kind, magnitude)` pairs in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (StatusKind, i32)> + '_ {
        self.stacks.iter().map(|(kind, value)| (*kind, *value))
    }

    /// Returns the number of distinct kinds present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    /// Returns true if no status is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Removes every status.
    pub fn clear(&mut self) {
        self.stacks.clear();
    }

    /// Applies the turn-end decay, consumption, and conversions.
    ///
    /// Conversions into `strength` are applied after the pass so that they
    /// never interact with the snapshot being processed.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        let mut strength_delta = 0;
        let snapshot: Vec<(StatusKind, i32)> = self.iter().collect();

        for (kind, value) in snapshot {
            match kind {
                k if k.decrements_at_turn_end() => {
                    self.adjust(kind, -value.signum());
                }
                StatusKind::NoDraw | StatusKind::Rage | StatusKind::DoubleTap => {
                    self.remove(kind);
                }
                StatusKind::StrengthDown => {
                    strength_delta -= value;
                    self.remove(kind);
                }
                StatusKind::Ritual => strength_delta += value,
                StatusKind::Regeneration => {
                    report.heal += value.max(0);
                    self.adjust(kind, -value.signum());
                }
                StatusKind::Metallicize | StatusKind::PlatedArmor => {
                    report.block += value.max(0);
                }
                _ => {}
            }
        }

        if strength_delta != 0 {
            self.adjust(StatusKind::Strength, strength_delta);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod add_tests {
        use super::*;

        #[test]
        fn merges_additively() {
            let mut ledger = StatusLedger::new();
            ledger.add(StatusKind::Strength, 2);
            ledger.add(StatusKind::Strength, 3);
            assert_eq!(ledger.get(StatusKind::Strength), 5);
        }

        #[test]
        fn zero_result_is_purged() {
            let mut ledger = StatusLedger::new();
            ledger.add(StatusKind::Strength, 2);
            ledger.add(StatusKind::Strength, -2);
            assert!(!ledger.has(StatusKind::Strength));
            assert!(ledger.is_empty());
        }

        #[test]
        fn zero_delta_is_noop() {
            let mut ledger = StatusLedger::new();
            assert_eq!(ledger.add(StatusKind::Weak, 0), StatusChange::Unchanged);
            assert!(ledger.is_empty());
        }

        #[test]
        fn artifact_negates_one_debuff() {
            let mut ledger = StatusLedger::new();
            ledger.add(StatusKind::Artifact, 1);

            assert_eq!(ledger.add(StatusKind::Vulnerable, 2), StatusChange::Negated);
            assert_eq!(ledger.get(StatusKind::Vulnerable), 0);
            assert_eq!(ledger.get(StatusKind::Artifact), 0);

            assert_eq!(ledger.add(StatusKind::Vulnerable, 2), StatusChange::Applied(2));
        }

        #[test]
        fn artifact_negates_negative_strength() {
            let mut ledger = StatusLedger::new();
            ledger.add(StatusKind::Artifact, 1);
            ledger.add(StatusKind::Strength, -1);
            assert_eq!(ledger.get(StatusKind::Strength), 0);
        }

        #[test]
        fn artifact_ignores_buffs_and_neutral() {
            let mut ledger = StatusLedger::new();
            ledger.add(StatusKind::Artifact, 1);
            ledger.add(StatusKind::Strength, 2);
            ledger.add(StatusKind::NoDraw, 1);
            assert_eq!(ledger.get(StatusKind::Strength), 2);
            assert!(ledger.has(StatusKind::NoDraw));
            assert_eq!(ledger.get(StatusKind::Artifact), 1);
        }

        #[test]
        fn negative_strength_is_stored() {
            let mut ledger = StatusLedger::new();
            ledger.add(StatusKind::Strength, -2);
            assert_eq!(ledger.get(StatusKind::Strength), -2);
            assert!(ledger.has(StatusKind::Strength));
        }
    }

    mod tick_tests {
        use super::*;

        #[test]
        fn decrementing_kinds_lose_one() {
            let mut ledger = StatusLedger::new();
            ledger.add(StatusKind::Vulnerable, 2);
            ledger.add(StatusKind::Weak, 1);
            ledger.tick();
            assert_eq!(ledger.get(StatusKind::Vulnerable), 1);
            assert!(!ledger.has(StatusKind::Weak));
        }

        #[test]
        fn turn_scoped_kinds_self_consume() {
            let mut ledger = StatusLedger::new();
            ledger.add(StatusKind::NoDraw, 1);
            ledger.add(StatusKind::Rage, 3);
            ledger.add(StatusKind::DoubleTap, 2);
            ledger.tick();
            assert!(ledger.is_empty());
        }

        #[test]
        fn strength_down_converts() {
            let mut ledger = StatusLedger::new();
            ledger.add(StatusKind::Strength, 4);
            ledger.add(StatusKind::StrengthDown, 2);
            ledger.tick();
            assert_eq!(ledger.get(StatusKind::Strength), 2);
            assert!(!ledger.has(StatusKind::StrengthDown));
        }

        #[test]
        fn ritual_grants_strength_once() {
            let mut ledger = StatusLedger::new();
            ledger.add(StatusKind::Ritual, 3);
            ledger.tick();
            assert_eq!(ledger.get(StatusKind::Strength), 3);
            assert_eq!(ledger.get(StatusKind::Ritual), 3);
        }

        #[test]
        fn regeneration_reports_heal_and_decrements() {
            let mut ledger = StatusLedger::new();
            ledger.add(StatusKind::Regeneration, 4);
            let report = ledger.tick();
            assert_eq!(report.heal, 4);
            assert_eq!(ledger.get(StatusKind::Regeneration), 3);
        }

        #[test]
        fn metallicize_and_plated_armor_report_block() {
            let mut ledger = StatusLedger::new();
            ledger.add(StatusKind::Metallicize, 3);
            ledger.add(StatusKind::PlatedArmor, 4);
            let report = ledger.tick();
            assert_eq!(report.block, 7);
            assert_eq!(ledger.get(StatusKind::PlatedArmor), 4);
        }

        #[test]
        fn persistent_kinds_untouched() {
            let mut ledger = StatusLedger::new();
            ledger.add(StatusKind::Thorns, 3);
            ledger.add(StatusKind::Artifact, 1);
            ledger.tick();
            assert_eq!(ledger.get(StatusKind::Thorns), 3);
            assert_eq!(ledger.get(StatusKind::Artifact), 1);
        }
    }

    #[test]
    fn iteration_follows_kind_order() {
        let mut ledger = StatusLedger::new();
        ledger.add(StatusKind::Weak, 1);
        ledger.add(StatusKind::Strength, 1);
        let kinds: Vec<_> = ledger.iter().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, vec![StatusKind::Strength, StatusKind::Weak]);
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&StatusKind::PlatedArmor).unwrap();
        assert_eq!(json, "\"plated_armor\"");
    }
}
