//! Fixed-capacity entity pools
//!
//! Slots are allocated once and toggled active/inactive. The pool never
//! grows: when every slot is busy, `acquire` returns `None` and the caller
//! skips its spawn.

use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, MovingEntity};

/// Pre-allocated slots for one entity kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityPool {
    kind: EntityKind,
    slots: Vec<MovingEntity>,
}

impl EntityPool {
    pub fn new(kind: EntityKind, capacity: usize) -> Self {
        let slots = (0..capacity as u32)
            .map(|slot| MovingEntity::new(slot, kind))
            .collect();
        Self { kind, slots }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|e| e.active).count()
    }

    /// First inactive slot, or `None` when the pool is exhausted
    ///
    /// The slot stays inactive until the caller resets it.
    pub fn acquire(&mut self) -> Option<&mut MovingEntity> {
        match self.slots.iter().position(|e| !e.active) {
            Some(i) => Some(&mut self.slots[i]),
            None => {
                log::trace!("{:?} pool exhausted ({} slots)", self.kind, self.slots.len());
                None
            }
        }
    }

    /// Return a slot to the pool
    pub fn release(&mut self, slot: u32) {
        if let Some(entity) = self.slots.get_mut(slot as usize) {
            entity.retire();
        }
    }

    /// Deactivate every slot
    pub fn clear(&mut self) {
        for entity in &mut self.slots {
            entity.retire();
        }
    }

    pub fn get(&self, slot: u32) -> Option<&MovingEntity> {
        self.slots.get(slot as usize)
    }

    /// All slots in stable slot order, active or not
    pub fn iter(&self) -> impl Iterator<Item = &MovingEntity> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MovingEntity> {
        self.slots.iter_mut()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &MovingEntity> {
        self.slots.iter().filter(|e| e.active)
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut MovingEntity> {
        self.slots.iter_mut().filter(|e| e.active)
    }
}
