//! Consumables carried into battle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Consumable item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    /// Restores [`ItemKind::HEALTH_POTION_HEAL`] health.
    HealthPotion,
    /// Restores [`ItemKind::MANA_POTION_RESTORE`] mana and grants Clarity.
    ManaPotion,
    /// Removes every damage-over-time effect.
    Antidote,
}

impl ItemKind {
    /// Health restored by a health potion, before healing modifiers.
    pub const HEALTH_POTION_HEAL: u32 = 40;

    /// Mana restored by a mana potion.
    pub const MANA_POTION_RESTORE: u32 = 30;

    /// Rounds of Clarity granted by a mana potion.
    pub const MANA_POTION_CLARITY: u32 = 2;
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HealthPotion => f.write_str("health potion"),
            Self::ManaPotion => f.write_str("mana potion"),
            Self::Antidote => f.write_str("antidote"),
        }
    }
}

/// Item counts, kept in a `BTreeMap` so snapshots serialize in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: BTreeMap<ItemKind, u32>,
}

impl Inventory {
    /// Empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style add.
    #[must_use]
    pub fn with(mut self, kind: ItemKind, count: u32) -> Self {
        self.add(kind, count);
        self
    }

    /// Adds `count` items of `kind`.
    pub fn add(&mut self, kind: ItemKind, count: u32) {
        if count > 0 {
            *self.items.entry(kind).or_insert(0) += count;
        }
    }

    /// How many of `kind` are left.
    #[must_use]
    pub fn count(&self, kind: ItemKind) -> u32 {
        self.items.get(&kind).copied().unwrap_or(0)
    }

    /// Removes one item of `kind`. Returns false when none is left.
    pub fn take(&mut self, kind: ItemKind) -> bool {
        match self.items.get_mut(&kind) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.items.remove(&kind);
                }
                true
            }
            _ => false,
        }
    }

    /// True when nothing is left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
