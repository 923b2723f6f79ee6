//! Synchronous-resolution future.
//!
//! Unlike a platform promise, continuations attached to an already-resolved
//! [`SyncFuture`] run inline, in the caller's stack, and resolving a pending
//! one runs its continuations inline inside the resolver's call. Scripted
//! sequences chained on tick-driven waits therefore never drift off the tick
//! that completed them.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type Continuation<T> = Box<dyn FnOnce(T)>;

enum State<T> {
    Pending(Vec<Continuation<T>>),
    Resolved(T),
}

/// Shared handle to a value that becomes available exactly once.
pub struct SyncFuture<T> {
    state: Rc<RefCell<State<T>>>,
}

/// Write side of a pending [`SyncFuture`]. Consumed by [`Resolver::resolve`].
///
/// Dropping it unresolved leaves the future pending forever, which is how an
/// abandoned wait silently stops.
pub struct Resolver<T> {
    state: Rc<RefCell<State<T>>>,
}

impl<T> Clone for SyncFuture<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: Clone + 'static> SyncFuture<T> {
    pub fn pending() -> (SyncFuture<T>, Resolver<T>) {
        let state = Rc::new(RefCell::new(State::Pending(Vec::new())));
        (
            SyncFuture {
                state: Rc::clone(&state),
            },
            Resolver { state },
        )
    }

    pub fn resolved(value: T) -> SyncFuture<T> {
        SyncFuture {
            state: Rc::new(RefCell::new(State::Resolved(value))),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(*self.state.borrow(), State::Resolved(_))
    }

    /// The resolved value, if any.
    pub fn value(&self) -> Option<T> {
        match &*self.state.borrow() {
            State::Resolved(v) => Some(v.clone()),
            State::Pending(_) => None,
        }
    }

    /// Run `f` with the value: immediately if resolved, else at resolution.
    pub fn on_resolve(&self, f: impl FnOnce(T) + 'static) {
        let ready = {
            let mut state = self.state.borrow_mut();
            match &mut *state {
                State::Resolved(v) => Some(v.clone()),
                State::Pending(waiters) => {
                    waiters.push(Box::new(f));
                    return;
                }
            }
        };
        if let Some(v) = ready {
            f(v);
        }
    }

    /// Map the value into a new future.
    pub fn then<U: Clone + 'static>(&self, f: impl FnOnce(T) -> U + 'static) -> SyncFuture<U> {
        let (next, resolver) = SyncFuture::pending();
        self.on_resolve(move |v| resolver.resolve(f(v)));
        next
    }

    /// Chain a step that itself produces a future.
    pub fn and_then<U: Clone + 'static>(
        &self,
        f: impl FnOnce(T) -> SyncFuture<U> + 'static,
    ) -> SyncFuture<U> {
        let (next, resolver) = SyncFuture::pending();
        self.on_resolve(move |v| f(v).on_resolve(move |u| resolver.resolve(u)));
        next
    }

    /// Resolve when every input has, with values in input order.
    pub fn all(futures: Vec<SyncFuture<T>>) -> SyncFuture<Vec<T>> {
        if futures.is_empty() {
            return SyncFuture::resolved(Vec::new());
        }

        let (joined, resolver) = SyncFuture::pending();
        let results: Rc<RefCell<Vec<Option<T>>>> = Rc::new(RefCell::new(vec![None; futures.len()]));
        let remaining = Rc::new(Cell::new(futures.len()));
        let resolver = Rc::new(RefCell::new(Some(resolver)));

        for (index, future) in futures.iter().enumerate() {
            let results = Rc::clone(&results);
            let remaining = Rc::clone(&remaining);
            let resolver = Rc::clone(&resolver);
            future.on_resolve(move |v| {
                results.borrow_mut()[index] = Some(v);
                remaining.set(remaining.get() - 1);
                if remaining.get() == 0 {
                    let values = results.borrow_mut().drain(..).flatten().collect();
                    if let Some(r) = resolver.borrow_mut().take() {
                        r.resolve(values);
                    }
                }
            });
        }
        joined
    }
}

impl<T: Clone + 'static> Resolver<T> {
    /// Store the value and run every waiting continuation in order.
    pub fn resolve(self, value: T) {
        let previous = std::mem::replace(
            &mut *self.state.borrow_mut(),
            State::Resolved(value.clone()),
        );
        if let State::Pending(waiters) = previous {
            for waiter in waiters {
                waiter(value.clone());
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SyncFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.state.borrow() {
            State::Resolved(v) => f.debug_tuple("SyncFuture::Resolved").field(v).finish(),
            State::Pending(w) => f
                .debug_struct("SyncFuture::Pending")
                .field("waiters", &w.len())
                .finish(),
        }
    }
}
