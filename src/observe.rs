// ============================================================================
// LISTENER REGISTRY
// ============================================================================
//
// Single-threaded listener registries.
//
// Widgets and notch collections raise events through a `Listeners`
// registry. Subscribing hands back a `Subscription` which removes the
// callback again when it is unsubscribed or dropped.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListenerId(u64);

type Callback<E> = Rc<dyn Fn(&E)>;

struct Registry<E> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(ListenerId, Callback<E>)>>,
}

trait Detach {
    fn detach(&self, id: ListenerId) -> bool;
    fn contains(&self, id: ListenerId) -> bool;
}

impl<E> Detach for Registry<E> {
    fn detach(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    fn contains(&self, id: ListenerId) -> bool {
        self.entries.borrow().iter().any(|(entry, _)| *entry == id)
    }
}

/// An ordered set of callbacks for events of type `E`.
///
/// Cloning a `Listeners` shares the registry.
pub struct Listeners<E> {
    registry: Rc<Registry<E>>,
}

impl<E: 'static> Listeners<E> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(Registry {
                next_id: Cell::new(0),
                entries: RefCell::new(Vec::new()),
            }),
        }
    }

    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> Subscription {
        let id = ListenerId(self.registry.next_id.get());
        self.registry.next_id.set(id.0 + 1);
        self.registry
            .entries
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let registry: Rc<dyn Detach> = self.registry.clone();
        Subscription {
            id,
            registry: Rc::downgrade(&registry),
        }
    }

    /// Calls every listener registered at the time of the call, in
    /// subscription order. A listener unsubscribed by an earlier callback
    /// of the same call is skipped.
    pub fn notify(&self, event: &E) {
        let snapshot: Vec<(ListenerId, Callback<E>)> = self
            .registry
            .entries
            .borrow()
            .iter()
            .map(|(id, callback)| (*id, Rc::clone(callback)))
            .collect();
        for (id, callback) in snapshot {
            if self.registry.contains(id) {
                callback(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.registry.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Listeners<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.registry.entries.borrow().len())
            .finish()
    }
}

/// Handle for one registered listener.
pub struct Subscription {
    id: ListenerId,
    registry: Weak<dyn Detach>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.contains(self.id))
    }

    /// Removes the listener. Returns `false` if it was already gone.
    pub fn unsubscribe(self) -> bool {
        self.release()
    }

    fn release(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.detach(self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
