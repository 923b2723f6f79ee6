//! Duration-gated callbacks.
//!
//! [`Loops`] binds to one tick channel of a bus. `do_for(d, cb)` calls `cb`
//! once per tick with `(elapsed, progress)` until the accumulated time reaches
//! `d`, then unbinds itself and resolves its future with a [`Completion`].
//!
//! There is no cancel. If the bus is dropped or simply stops ticking, the
//! future stays pending and the handler goes away with the bus.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::debug;

use crate::events::bus::{EventBus, HandlerId};
use crate::scheduler::future::SyncFuture;
use crate::scheduler::TickEvent;

/// What a finished wait reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Completion {
    /// Simulated time accumulated, including the overshoot of the last tick.
    pub elapsed: f64,
    /// `elapsed - duration`: how far the final tick overshot.
    pub offset: f64,
    /// Total of the emitting clock on the completing tick.
    pub total: Option<f64>,
    /// Tick number of the completing tick, for world ticks.
    pub tick: Option<u64>,
}

impl Completion {
    fn immediate() -> Self {
        Self {
            elapsed: 0.0,
            offset: 0.0,
            total: None,
            tick: None,
        }
    }
}

/// `do_for` / `wait_for` bound to one tick channel of one bus.
pub struct Loops<E: TickEvent> {
    bus: Weak<EventBus<E>>,
    kind: E::Kind,
}

impl<E: TickEvent> Clone for Loops<E> {
    fn clone(&self) -> Self {
        Self {
            bus: Weak::clone(&self.bus),
            kind: self.kind,
        }
    }
}

impl<E: TickEvent> Loops<E> {
    pub fn new(bus: &Rc<EventBus<E>>, kind: E::Kind) -> Self {
        Self {
            bus: Rc::downgrade(bus),
            kind,
        }
    }

    /// Call `callback(elapsed, progress)` every tick for `duration` seconds.
    ///
    /// `progress` is `min(elapsed / duration, 1)`. The callback sees `1.0`
    /// exactly once, on the tick that crosses the duration, and the future
    /// resolves in that same call.
    pub fn do_for(
        &self,
        duration: f64,
        callback: impl FnMut(f64, f64) + 'static,
    ) -> SyncFuture<Completion> {
        let mut callback = callback;
        if duration <= 0.0 {
            callback(0.0, 1.0);
            return SyncFuture::resolved(Completion::immediate());
        }

        let (future, resolver) = SyncFuture::pending();
        let Some(bus) = self.bus.upgrade() else {
            debug!("do_for on a dropped bus; wait stays pending");
            return future;
        };

        let kind = self.kind;
        let weak = Weak::clone(&self.bus);
        let elapsed = Cell::new(0.0);
        let callback = RefCell::new(callback);
        let resolver = RefCell::new(Some(resolver));
        let id_cell: Rc<Cell<Option<HandlerId>>> = Rc::new(Cell::new(None));
        let own_id = Rc::clone(&id_cell);

        let id = bus.on(kind, move |event: &E| {
            let Some(info) = event.tick_info() else {
                return;
            };
            // A finished wait may still be walked by the dispatch that ended it.
            if resolver.borrow().is_none() {
                return;
            }
            let now = elapsed.get() + info.delta;
            elapsed.set(now);
            let progress = (now / duration).min(1.0);

            if progress >= 1.0 {
                if let (Some(bus), Some(id)) = (weak.upgrade(), own_id.get()) {
                    bus.unbind(kind, id);
                }
            }

            (&mut *callback.borrow_mut())(now, progress);

            if progress >= 1.0 {
                let taken = resolver.borrow_mut().take();
                if let Some(resolver) = taken {
                    resolver.resolve(Completion {
                        elapsed: now,
                        offset: now - duration,
                        total: info.total,
                        tick: info.tick,
                    });
                }
            }
        });
        id_cell.set(Some(id));
        future
    }

    /// Resolve after `duration` seconds of ticks.
    pub fn wait_for(&self, duration: f64) -> SyncFuture<Completion> {
        self.do_for(duration, |_, _| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::world::{WorldEvent, WorldEventKind};

    fn tick(bus: &EventBus<WorldEvent>, step: f64, tick: u64) {
        bus.trigger(&WorldEvent::Simulated {
            step,
            total: step * (tick + 1) as f64,
            tick,
        });
    }

    #[test]
    fn zero_duration_runs_once_and_resolves() {
        let bus = Rc::new(EventBus::<WorldEvent>::new());
        let loops = Loops::new(&bus, WorldEventKind::Simulated);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let done = loops.do_for(0.0, move |e, p| s.borrow_mut().push((e, p)));
        assert_eq!(*seen.borrow(), vec![(0.0, 1.0)]);
        assert!(done.is_resolved());
        assert_eq!(bus.live_count(WorldEventKind::Simulated), 0);
    }

    #[test]
    fn wait_for_unbinds_after_resolving() {
        let bus = Rc::new(EventBus::<WorldEvent>::new());
        let loops = Loops::new(&bus, WorldEventKind::Simulated);
        let done = loops.wait_for(0.25);
        tick(&bus, 0.1, 0);
        tick(&bus, 0.1, 1);
        assert!(!done.is_resolved());
        tick(&bus, 0.1, 2);
        let completion = done.value().expect("resolved on third tick");
        assert_eq!(completion.tick, Some(2));
        assert!((completion.offset - 0.05).abs() < 1e-9);
        assert_eq!(bus.live_count(WorldEventKind::Simulated), 0);
    }

    #[test]
    fn non_tick_events_on_other_kinds_do_not_advance() {
        let bus = Rc::new(EventBus::<WorldEvent>::new());
        let loops = Loops::new(&bus, WorldEventKind::Simulated);
        let done = loops.wait_for(1.0);
        bus.trigger(&WorldEvent::EmitAudio("boom".into()));
        assert!(!done.is_resolved());
    }

    #[test]
    fn dropped_bus_leaves_wait_pending() {
        let bus = Rc::new(EventBus::<WorldEvent>::new());
        let loops = Loops::new(&bus, WorldEventKind::Simulated);
        let done = loops.wait_for(1.0);
        drop(bus);
        assert!(!done.is_resolved());
        let late = loops.wait_for(1.0);
        assert!(!late.is_resolved());
    }
}
