//! Synchronous publish/subscribe channel.
//!
//! [`Subscribers`] is the slot table: handlers are stored per event kind in
//! binding order. Unbinding blanks a slot instead of removing it, so a handler
//! may unbind itself or a sibling while a dispatch is walking the same list.
//! Blank slots are compacted once the outermost dispatch returns.
//!
//! [`EventBus`] specialises the table for closure handlers over a typed event
//! enum. The entity trait set reuses [`Subscribers`] directly with trait slot
//! keys as handlers.
//!
//! # Example
//!
//! ```ignore
//! let bus = Rc::new(EventBus::<WorldEvent>::new());
//! let id = bus.bind(WorldEventKind::Simulated, Handler::new(|e| println!("{e:?}")));
//! bus.trigger(&WorldEvent::Simulated { step: 0.1, total: 0.1, tick: 0 });
//! bus.unbind(WorldEventKind::Simulated, id);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use rustc_hash::FxHashMap;

/// Token identifying one binding on one bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct Slot<H> {
    id: HandlerId,
    handler: Option<H>,
    once: bool,
}

struct Table<K, H> {
    slots: FxHashMap<K, Vec<Slot<H>>>,
    next_id: u64,
    dirty: bool,
}

/// Ordered handler slots per event kind with inert-on-unbind semantics.
pub struct Subscribers<K, H> {
    table: RefCell<Table<K, H>>,
    depth: Cell<u32>,
}

impl<K, H> Default for Subscribers<K, H> {
    fn default() -> Self {
        Self {
            table: RefCell::new(Table {
                slots: FxHashMap::default(),
                next_id: 0,
                dirty: false,
            }),
            depth: Cell::new(0),
        }
    }
}

/// Decrements the dispatch depth even if a handler panics.
struct DepthGuard<'a>(&'a Cell<u32>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl<K, H> Subscribers<K, H>
where
    K: Copy + Eq + Hash,
    H: Clone + PartialEq,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `kind`. Binding a handler that is already live
    /// under `kind` returns the existing id and adds nothing.
    pub fn bind(&self, kind: K, handler: H) -> HandlerId {
        self.insert(kind, handler, false)
    }

    /// Register `handler` to be invoked at most once.
    pub fn once(&self, kind: K, handler: H) -> HandlerId {
        self.insert(kind, handler, true)
    }

    fn insert(&self, kind: K, handler: H, once: bool) -> HandlerId {
        let mut table = self.table.borrow_mut();
        if let Some(existing) = table.slots.get(&kind).and_then(|slots| {
            slots
                .iter()
                .find(|s| s.handler.as_ref() == Some(&handler))
                .map(|s| s.id)
        }) {
            return existing;
        }
        let id = HandlerId(table.next_id);
        table.next_id += 1;
        table.slots.entry(kind).or_default().push(Slot {
            id,
            handler: Some(handler),
            once,
        });
        id
    }

    /// Make the binding inert. Unknown kinds or ids are ignored.
    pub fn unbind(&self, kind: K, id: HandlerId) -> bool {
        self.blank(kind, |slot| slot.id == id)
    }

    /// Make every live binding of `handler` under `kind` inert.
    pub fn unbind_handler(&self, kind: K, handler: &H) -> bool {
        self.blank(kind, |slot| slot.handler.as_ref() == Some(handler))
    }

    fn blank(&self, kind: K, matches: impl Fn(&Slot<H>) -> bool) -> bool {
        let found = {
            let mut table = self.table.borrow_mut();
            let mut found = false;
            if let Some(slots) = table.slots.get_mut(&kind) {
                for slot in slots.iter_mut().filter(|s| s.handler.is_some()) {
                    if matches(slot) {
                        slot.handler = None;
                        found = true;
                    }
                }
            }
            table.dirty |= found;
            found
        };
        if found && self.depth.get() == 0 {
            self.compact();
        }
        found
    }

    pub fn is_bound(&self, kind: K, handler: &H) -> bool {
        self.table
            .borrow()
            .slots
            .get(&kind)
            .is_some_and(|slots| slots.iter().any(|s| s.handler.as_ref() == Some(handler)))
    }

    /// Number of live handlers under `kind`.
    pub fn live_count(&self, kind: K) -> usize {
        self.table
            .borrow()
            .slots
            .get(&kind)
            .map_or(0, |slots| slots.iter().filter(|s| s.handler.is_some()).count())
    }

    /// Total slots under `kind`, inert ones included.
    pub fn slot_count(&self, kind: K) -> usize {
        self.table.borrow().slots.get(&kind).map_or(0, Vec::len)
    }

    /// Call `f` with every handler live under `kind`, in binding order.
    ///
    /// The slot list is measured once up front: handlers bound during the
    /// dispatch wait for the next one. No table borrow is held while `f` runs.
    pub fn dispatch(&self, kind: K, mut f: impl FnMut(H)) {
        self.depth.set(self.depth.get() + 1);
        let guard = DepthGuard(&self.depth);

        let len = self.slot_count(kind);
        for index in 0..len {
            let handler = {
                let mut table = self.table.borrow_mut();
                let Some(slot) = table.slots.get_mut(&kind).and_then(|s| s.get_mut(index)) else {
                    break;
                };
                let (handler, blanked) = if slot.once {
                    let taken = slot.handler.take();
                    let blanked = taken.is_some();
                    (taken, blanked)
                } else {
                    (slot.handler.clone(), false)
                };
                table.dirty |= blanked;
                handler
            };
            if let Some(handler) = handler {
                f(handler);
            }
        }

        drop(guard);
        if self.depth.get() == 0 {
            self.compact();
        }
    }

    fn compact(&self) {
        let mut table = self.table.borrow_mut();
        if !table.dirty {
            return;
        }
        table.slots.retain(|_, slots| {
            slots.retain(|s| s.handler.is_some());
            !slots.is_empty()
        });
        table.dirty = false;
    }
}

/// Typed event carried by an [`EventBus`].
pub trait BusEvent: 'static {
    /// Closed set of channels handlers subscribe to.
    type Kind: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Closure handler compared by identity.
pub struct Handler<E: ?Sized>(Rc<dyn Fn(&E)>);

impl<E: ?Sized> Handler<E> {
    pub fn new(f: impl Fn(&E) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &E) {
        (self.0)(event)
    }
}

impl<E: ?Sized> Clone for Handler<E> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<E: ?Sized> PartialEq for Handler<E> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<E: ?Sized> fmt::Debug for Handler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

/// Per-object synchronous event channel.
///
/// Owners keep the bus behind an `Rc` so handlers can hold a `Weak` back to
/// it and unbind themselves mid-dispatch.
pub struct EventBus<E: BusEvent> {
    subscribers: Subscribers<E::Kind, Handler<E>>,
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            subscribers: Subscribers::default(),
        }
    }
}

impl<E: BusEvent> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, kind: E::Kind, handler: Handler<E>) -> HandlerId {
        self.subscribers.bind(kind, handler)
    }

    /// Bind a closure; shorthand for `bind(kind, Handler::new(f))`.
    pub fn on(&self, kind: E::Kind, f: impl Fn(&E) + 'static) -> HandlerId {
        self.subscribers.bind(kind, Handler::new(f))
    }

    /// Bind a handler that unbinds itself after its first invocation.
    pub fn once(&self, kind: E::Kind, handler: Handler<E>) -> HandlerId {
        self.subscribers.once(kind, handler)
    }

    pub fn unbind(&self, kind: E::Kind, id: HandlerId) -> bool {
        self.subscribers.unbind(kind, id)
    }

    pub fn unbind_handler(&self, kind: E::Kind, handler: &Handler<E>) -> bool {
        self.subscribers.unbind_handler(kind, handler)
    }

    pub fn is_bound(&self, kind: E::Kind, handler: &Handler<E>) -> bool {
        self.subscribers.is_bound(kind, handler)
    }

    pub fn live_count(&self, kind: E::Kind) -> usize {
        self.subscribers.live_count(kind)
    }

    /// Invoke every live handler bound to `event.kind()`, in binding order.
    pub fn trigger(&self, event: &E) {
        self.subscribers.dispatch(event.kind(), |handler| handler.call(event));
    }
}
