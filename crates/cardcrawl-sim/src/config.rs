//! Simulator configuration.
//!
//! Every field has a default, so an empty TOML file is a valid configuration:
//! one battle against a jaw worm with the starter deck and burning blood.
//!
//! ```toml
//! seed = 42
//! battles = 10
//! max_turns = 40
//! player_hp = 80
//! encounter = ["red_louse", "cultist"]
//! deck = ["strike", "strike+", "defend", "bash"]
//! relics = ["burning_blood", "pen_nib"]
//! potions = ["fire_potion"]
//!
//! [battle]
//! hand_size = 5
//! ```

use std::path::{Path, PathBuf};

use cardcrawl_core::content::cards;
use cardcrawl_core::entity::{EnemyTemplate, Player};
use cardcrawl_core::BattleConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog;

/// Why a configuration could not be loaded or turned into a battle.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`SimConfig`].
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },
    /// A content name matched nothing in the catalog.
    #[error("unknown {kind} `{name}`")]
    UnknownContent {
        /// Catalog searched (`card`, `enemy`, `relic`, `potion`).
        kind: &'static str,
        /// Name as written.
        name: String,
    },
    /// The encounter lists no enemies.
    #[error("the encounter has no enemies")]
    EmptyEncounter,
    /// Starting HP must be positive.
    #[error("player hp must be positive, got {0}")]
    InvalidHp(i32),
    /// More potions than belt slots.
    #[error("{count} potions do not fit in {slots} slots")]
    TooManyPotions {
        /// Potions configured.
        count: usize,
        /// Belt slots.
        slots: usize,
    },
}

/// Run parameters and the battle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Passed through to every battle.
    pub battle: BattleConfig,
    /// Seed of the first battle; battle `i` uses `seed + i`.
    pub seed: u64,
    /// Number of battles to play.
    pub battles: u32,
    /// Turn limit after which an undecided battle is abandoned.
    pub max_turns: u32,
    /// Starting (and maximum) HP.
    pub player_hp: i32,
    /// Potion belt size.
    pub potion_slots: usize,
    /// Enemy ids, left to right.
    pub encounter: Vec<String>,
    /// Card ids; empty means the starter deck.
    pub deck: Vec<String>,
    /// Relic ids, in acquisition order.
    pub relics: Vec<String>,
    /// Potion ids.
    pub potions: Vec<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            seed: 42,
            battles: 1,
            max_turns: 50,
            player_hp: 80,
            potion_slots: 3,
            encounter: vec!["jaw_worm".to_owned()],
            deck: Vec::new(),
            relics: vec!["burning_blood".to_owned()],
            potions: Vec::new(),
        }
    }
}

impl SimConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// The TOML parse error.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads a configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] or [`ConfigError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks every name and number by building the player and encounter once.
    ///
    /// # Errors
    ///
    /// The first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build_player()?;
        self.build_encounter()?;
        Ok(())
    }

    /// Builds the player: deck, potions, then relics in order.
    ///
    /// Relics are obtained last so their `on_obtain` effects see the full
    /// player.
    ///
    /// # Errors
    ///
    /// An invalid HP, an unknown name, or more potions than slots.
    pub fn build_player(&self) -> Result<Player, ConfigError> {
        if self.player_hp <= 0 {
            return Err(ConfigError::InvalidHp(self.player_hp));
        }
        if self.potions.len() > self.potion_slots {
            return Err(ConfigError::TooManyPotions {
                count: self.potions.len(),
                slots: self.potion_slots,
            });
        }

        let deck = if self.deck.is_empty() {
            cards::starter_deck()
        } else {
            self.deck
                .iter()
                .map(|name| lookup("card", name, catalog::card))
                .collect::<Result<Vec<_>, _>>()?
        };
        let mut player = Player::new(self.player_hp)
            .with_deck(deck)
            .with_potion_slots(self.potion_slots);

        for name in &self.potions {
            player.obtain_potion(lookup("potion", name, catalog::potion)?);
        }
        for name in &self.relics {
            player.obtain_relic(lookup("relic", name, catalog::relic)?);
        }
        Ok(player)
    }

    /// Builds the enemy templates, left to right.
    ///
    /// # Errors
    ///
    /// An empty encounter or an unknown enemy name.
    pub fn build_encounter(&self) -> Result<Vec<EnemyTemplate>, ConfigError> {
        if self.encounter.is_empty() {
            return Err(ConfigError::EmptyEncounter);
        }
        self.encounter
            .iter()
            .map(|name| lookup("enemy", name, catalog::enemy))
            .collect()
    }
}

fn lookup<T>(
    kind: &'static str,
    name: &str,
    find: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    find(name).ok_or_else(|| ConfigError::UnknownContent {
        kind,
        name: name.to_owned(),
    })
}
