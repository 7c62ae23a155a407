//! Creature record store: arena of records keyed by id plus an explicit
//! turn-order index.
//!
//! The `order` vector is the authoritative turn order. Only the roller
//! re-sorts it; every other operation either appends, removes, or swaps.

use std::collections::HashMap;

use tracing::debug;

use crate::error::DecodeError;
use crate::tracker::creature::{Creature, CreatureField, CreatureId, CreatureTemplate, Direction};

#[derive(Debug, Clone, Default)]
pub struct CreatureStore {
    records: HashMap<CreatureId, Creature>,
    order: Vec<CreatureId>,
    next_id: u64,
}

impl CreatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from an ordered list. Fails on duplicate ids, leaving
    /// nothing half-built.
    pub fn from_creatures(creatures: Vec<Creature>) -> Result<Self, DecodeError> {
        let mut store = Self::new();
        for creature in creatures {
            let id = creature.id;
            if store.records.contains_key(&id) {
                return Err(DecodeError::DuplicateId(id.0));
            }
            store.next_id = store.next_id.max(id.0.saturating_add(1));
            store.order.push(id);
            store.records.insert(id, creature);
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: CreatureId) -> Option<&Creature> {
        self.records.get(&id)
    }

    /// Ids in turn order.
    pub fn order(&self) -> &[CreatureId] {
        &self.order
    }

    /// Creatures in turn order.
    pub fn iter(&self) -> impl Iterator<Item = &Creature> + '_ {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Owned copy of the list in turn order.
    pub fn snapshot(&self) -> Vec<Creature> {
        self.iter().cloned().collect()
    }

    /// Append `amount` creatures built from `template`. Returns the new ids.
    pub fn add(&mut self, template: &CreatureTemplate, amount: usize) -> Vec<CreatureId> {
        let mut ids = Vec::new();
        for k in 1..=amount {
            let id = CreatureId(self.next_id);
            self.next_id += 1;
            let creature = Creature::from_template(id, template.name_for(k, amount), template);
            self.records.insert(id, creature);
            self.order.push(id);
            ids.push(id);
        }
        debug!(name = %template.name, amount, "added creatures");
        ids
    }

    /// Delete a creature. Returns false when the id is not present.
    pub fn remove(&mut self, id: CreatureId) -> bool {
        if self.records.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|&o| o != id);
        true
    }

    /// Replace one attribute. Returns false when the id is not present.
    pub fn update(&mut self, id: CreatureId, field: CreatureField) -> bool {
        match self.records.get_mut(&id) {
            Some(creature) => {
                debug!(%id, field = field.name(), "updated creature");
                creature.apply(field);
                true
            }
            None => false,
        }
    }

    /// Flip the lock flag. Returns the new state, or None when absent.
    pub fn toggle_lock(&mut self, id: CreatureId) -> Option<bool> {
        let creature = self.records.get_mut(&id)?;
        creature.is_locked = !creature.is_locked;
        Some(creature.is_locked)
    }

    /// Swap with the neighbour in `direction`. Lock state is not consulted.
    /// Returns false at either boundary or when the id is absent.
    pub fn move_creature(&mut self, id: CreatureId, direction: Direction) -> bool {
        let Some(pos) = self.order.iter().position(|&o| o == id) else {
            return false;
        };
        let target = match direction {
            Direction::Up if pos > 0 => pos - 1,
            Direction::Down if pos + 1 < self.order.len() => pos + 1,
            _ => return false,
        };
        self.order.swap(pos, target);
        true
    }

    /// Remove every creature. Ids keep counting up so none is reused.
    pub fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
    }

    pub(crate) fn get_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.records.get_mut(&id)
    }

    /// Install a new turn order. Must be a permutation of the current one.
    pub(crate) fn set_order(&mut self, order: Vec<CreatureId>) {
        debug_assert_eq!(order.len(), self.order.len());
        self.order = order;
    }
}
