//! Arena: the ordered roster of enemies in a battle.
//!
//! The arena owns every enemy for the duration of an encounter. Enemies keep
//! the left-to-right order they were spawned in; a split replaces the parent
//! with its two children at the parent's position.
//!
//! # Determinism
//!
//! Entity ids are assigned monotonically starting at 1 (0 is the player) and
//! are never reused, so targeting by id is stable across deaths, flights, and
//! splits.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use cardcrawl_core::arena::Arena;
//! use cardcrawl_core::content::enemies;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(1);
//! let mut arena = Arena::new();
//! let a = arena.spawn(&enemies::cultist(), &mut rng);
//! let b = arena.spawn(&enemies::jaw_worm(), &mut rng);
//!
//! assert_eq!(arena.living_ids(), vec![a, b]);
//! ```

use std::sync::Arc;

use rand_chacha::ChaCha8Rng;

use crate::entity::{CombatState, Enemy, EnemyTemplate, EntityId};

/// Ordered enemy container.
#[derive(Debug, Clone)]
pub struct Arena {
    /// Next id to assign.
    next_id: u64,
    /// Enemies, left to right.
    enemies: Vec<Enemy>,
}

impl Arena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            enemies: Vec::new(),
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn instantiate(&mut self, template: &EnemyTemplate, hp: i32, rng: &mut ChaCha8Rng) -> Enemy {
        let id = self.allocate_id();
        let mut enemy = Enemy::new(
            id,
            template.name.clone(),
            CombatState::new(hp),
            Arc::clone(&template.behavior),
        );
        template.behavior.on_spawn(&mut enemy, rng);
        enemy
    }

    /// Spawns an enemy on the right, rolling its HP.
    ///
    /// # Returns
    ///
    /// The id assigned to the new enemy.
    pub fn spawn(&mut self, template: &EnemyTemplate, rng: &mut ChaCha8Rng) -> EntityId {
        let hp = template.roll_hp(rng);
        let enemy = self.instantiate(template, hp, rng);
        let id = enemy.id();
        self.enemies.push(enemy);
        id
    }

    /// Removes an enemy, returning it.
    pub fn despawn(&mut self, id: EntityId) -> Option<Enemy> {
        let index = self.position(id)?;
        Some(self.enemies.remove(index))
    }

    /// Replaces `parent` with two enemies whose HP and max HP both equal the
    /// parent's remaining HP.
    ///
    /// # Returns
    ///
    /// The children's ids, left to right, or `None` if `parent` is absent.
    pub fn split(
        &mut self,
        parent: EntityId,
        a: &EnemyTemplate,
        b: &EnemyTemplate,
        rng: &mut ChaCha8Rng,
    ) -> Option<(EntityId, EntityId)> {
        let index = self.position(parent)?;
        let hp = self.enemies[index].combat.hp().max(1);
        let left = self.instantiate(a, hp, rng);
        let right = self.instantiate(b, hp, rng);
        let ids = (left.id(), right.id());
        self.enemies.splice(index..=index, [left, right]);
        Some(ids)
    }

    /// Index of `id` in left-to-right order.
    #[must_use]
    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.enemies.iter().position(|enemy| enemy.id() == id)
    }

    /// Returns an enemy by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id() == id)
    }

    /// Returns an enemy by id, mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id() == id)
    }

    /// Returns true if `id` is present and alive.
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(Enemy::is_alive)
    }

    /// Iterates over all enemies (living and dead), left to right.
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> + '_ {
        self.enemies.iter()
    }

    /// Iterates over all enemies mutably, left to right.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> + '_ {
        self.enemies.iter_mut()
    }

    /// Iterates over living enemies, left to right.
    pub fn living(&self) -> impl Iterator<Item = &Enemy> + '_ {
        self.enemies.iter().filter(|enemy| enemy.is_alive())
    }

    /// Snapshot of living enemy ids, left to right.
    #[must_use]
    pub fn living_ids(&self) -> Vec<EntityId> {
        self.living().map(Enemy::id).collect()
    }

    /// The leftmost living enemy.
    #[must_use]
    pub fn first_living(&self) -> Option<EntityId> {
        self.living().next().map(Enemy::id)
    }

    /// Returns true if no enemy is alive (including when the arena is empty).
    #[must_use]
    pub fn all_dead(&self) -> bool {
        self.living().next().is_none()
    }

    /// Number of enemies, living or dead.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    /// Returns true if the arena holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}
