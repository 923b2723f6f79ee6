//! Per-entity trait registry.
//!
//! Traits live in index-stable slots; a freed slot is reused by the next
//! insert. Two maps index them: by concrete type
//! for typed lookup, and by name for the one-name-per-host rule. Lifecycle
//! subscriptions are kept in a [`Subscribers`] table keyed by slot, so a trait
//! detached mid-dispatch simply stops being called.

use std::any::TypeId;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::events::bus::Subscribers;
use crate::events::lifecycle::Lifecycle;
use crate::traits::Trait;

/// Slot index used as the lifecycle handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraitKey(pub usize);

struct TraitSlot {
    name: String,
    type_id: TypeId,
    enabled: bool,
    detach_pending: bool,
    /// `None` while the trait is lifted out for a callback.
    inner: Option<Box<dyn Trait>>,
}

#[derive(Default)]
pub struct TraitSet {
    slots: Vec<Option<TraitSlot>>,
    free: Vec<usize>,
    /// Occupied slots in attachment order.
    order: Vec<usize>,
    by_type: FxHashMap<TypeId, SmallVec<[usize; 1]>>,
    by_name: FxHashMap<String, usize>,
    lifecycle: Rc<Subscribers<Lifecycle, TraitKey>>,
}

impl TraitSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// True if a trait of this type is attached, even while it is mid-callback.
    pub fn contains_type(&self, type_id: TypeId) -> bool {
        self.by_type.get(&type_id).is_some_and(|v| !v.is_empty())
    }

    /// Names in attachment order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter_map(|&i| self.slots[i].as_ref())
            .map(|s| s.name.as_str())
    }

    /// Register a trait and subscribe it to its lifecycle kinds.
    pub(crate) fn insert<T: Trait>(&mut self, value: T) -> usize {
        let index = self.free.pop().unwrap_or_else(|| {
            self.slots.push(None);
            self.slots.len() - 1
        });
        let name = value.name().to_owned();
        for kind in value.lifecycle() {
            self.lifecycle.bind(*kind, TraitKey(index));
        }
        self.by_type.entry(TypeId::of::<T>()).or_default().push(index);
        self.by_name.insert(name.clone(), index);
        self.slots[index] = Some(TraitSlot {
            name,
            type_id: TypeId::of::<T>(),
            enabled: true,
            detach_pending: false,
            inner: Some(Box::new(value)),
        });
        self.order.push(index);
        index
    }

    /// Unsubscribe and drop the slot, returning the trait if it was present.
    pub(crate) fn remove(&mut self, index: usize) -> Option<Box<dyn Trait>> {
        let slot = self.slots.get_mut(index)?.take()?;
        for kind in Lifecycle::ALL {
            self.lifecycle.unbind_handler(kind, &TraitKey(index));
        }
        if let Some(indices) = self.by_type.get_mut(&slot.type_id) {
            indices.retain(|i| *i != index);
            if indices.is_empty() {
                self.by_type.remove(&slot.type_id);
            }
        }
        self.by_name.remove(&slot.name);
        self.order.retain(|i| *i != index);
        self.free.push(index);
        slot.inner
    }

    pub fn index_of<T: Trait>(&self) -> Option<usize> {
        self.by_type
            .get(&TypeId::of::<T>())
            .and_then(|indices| indices.first().copied())
    }

    pub fn index_by_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// First attached `T` that is not currently mid-callback.
    pub fn get<T: Trait>(&self) -> Option<&T> {
        let indices = self.by_type.get(&TypeId::of::<T>())?;
        indices.iter().find_map(|&i| {
            self.slots[i]
                .as_ref()?
                .inner
                .as_deref()?
                .as_any()
                .downcast_ref::<T>()
        })
    }

    pub fn get_mut<T: Trait>(&mut self) -> Option<&mut T> {
        let index = {
            let indices = self.by_type.get(&TypeId::of::<T>())?;
            indices.iter().copied().find(|&i| {
                self.slots[i]
                    .as_ref()
                    .is_some_and(|slot| slot.inner.is_some())
            })?
        };
        self.slots[index]
            .as_mut()?
            .inner
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    pub fn by_name(&self, name: &str) -> Option<&dyn Trait> {
        let index = self.index_by_name(name)?;
        self.slots[index].as_ref()?.inner.as_deref()
    }

    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut (dyn Trait + 'static)> {
        let index = self.index_by_name(name)?;
        self.slots[index].as_mut()?.inner.as_deref_mut()
    }

    pub fn is_enabled(&self, index: usize) -> bool {
        self.slots
            .get(index)
            .and_then(Option::as_ref)
            .is_some_and(|slot| slot.enabled)
    }

    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.slots.get_mut(index).and_then(Option::as_mut) {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// True while the trait in `index` is lifted out for a callback.
    pub fn is_taken(&self, index: usize) -> bool {
        self.slots
            .get(index)
            .and_then(Option::as_ref)
            .is_some_and(|slot| slot.inner.is_none())
    }

    pub(crate) fn take(&mut self, index: usize) -> Option<Box<dyn Trait>> {
        self.slots.get_mut(index)?.as_mut()?.inner.take()
    }

    /// Put a lifted trait back. Returns it instead if a detach was requested
    /// while it was out, so the caller can finish detaching.
    pub(crate) fn restore(&mut self, index: usize, value: Box<dyn Trait>) -> Option<Box<dyn Trait>> {
        match self.slots.get_mut(index).and_then(Option::as_mut) {
            Some(slot) if slot.detach_pending => Some(value),
            Some(slot) => {
                slot.inner = Some(value);
                None
            }
            None => Some(value),
        }
    }

    pub(crate) fn mark_detach_pending(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index).and_then(Option::as_mut) {
            slot.detach_pending = true;
        }
    }

    /// Indices of attached traits in attachment order.
    pub(crate) fn indices(&self) -> Vec<usize> {
        self.order.clone()
    }

    pub(crate) fn lifecycle(&self) -> Rc<Subscribers<Lifecycle, TraitKey>> {
        Rc::clone(&self.lifecycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{Health, Lifetime, Physics};

    #[test]
    fn attach_detach_cycles_reuse_one_slot() {
        let mut set = TraitSet::new();
        for _ in 0..10 {
            let index = set.insert(Lifetime::new(1.0));
            assert!(set.remove(index).is_some());
        }
        assert_eq!(set.slots.len(), 1);
        assert!(set.is_empty());
    }

    #[test]
    fn reused_slot_keeps_attachment_order_and_subscriptions() {
        let mut set = TraitSet::new();
        let health = set.insert(Health::new(1.0));
        let lifetime = set.insert(Lifetime::new(1.0));
        set.remove(health);

        let physics = set.insert(Physics::new(1.0));
        assert_eq!(physics, health);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["lifetime", "physics"]);
        assert_eq!(set.indices(), vec![lifetime, physics]);
        assert!(set.lifecycle().is_bound(Lifecycle::TimeShift, &TraitKey(physics)));
        assert!(set.get::<Physics>().is_some());
        assert!(set.get::<Health>().is_none());
    }
}
