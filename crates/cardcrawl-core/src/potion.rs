//! Potions: single-use effects held in the player's belt.

use std::fmt;
use std::sync::Arc;

use crate::card::TargetType;
use crate::effect::Effect;

/// A consumable.
#[derive(Clone)]
pub struct Potion {
    id: String,
    name: String,
    target: TargetType,
    effect: Arc<dyn Effect>,
}

impl Potion {
    /// Creates a potion.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        target: TargetType,
        effect: Arc<dyn Effect>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            target,
            effect,
        }
    }

    /// Content identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target shape.
    #[must_use]
    pub const fn target(&self) -> TargetType {
        self.target
    }

    /// The effect run on use.
    #[must_use]
    pub fn effect(&self) -> Arc<dyn Effect> {
        Arc::clone(&self.effect)
    }
}

impl fmt::Debug for Potion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Potion")
            .field("id", &self.id)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
