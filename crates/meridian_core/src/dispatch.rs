//! # Event Dispatch
//!
//! Ordered, synchronous fan-out to registered handlers.
//!
//! ## Re-entrancy
//!
//! Every method takes `&self`, so a handler that was handed a reference to
//! its own dispatcher can unregister itself (or others) from inside the
//! callback. Removal during dispatch leaves a tombstone that is skipped and
//! compacted once the outermost dispatch returns, or unwinds out of a
//! panicking handler. Handlers registered during a dispatch are first called
//! by the next one.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Registration token returned by [`EventDispatcher::add_handler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

struct Entry<H: ?Sized> {
    id: HandlerId,
    /// `None` once removed during a dispatch.
    handler: Option<Rc<H>>,
}

/// Registration-ordered list of handlers of one capability set `H`
/// (usually a `dyn Trait`).
pub struct EventDispatcher<H: ?Sized> {
    entries: RefCell<Vec<Entry<H>>>,
    next_id: Cell<u64>,
    /// Nesting depth of running dispatches.
    depth: Cell<u32>,
    /// Set when a removal left a tombstone.
    dirty: Cell<bool>,
}

impl<H: ?Sized> EventDispatcher<H> {
    /// Creates a dispatcher with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            depth: Cell::new(0),
            dirty: Cell::new(false),
        }
    }

    /// Registers `handler` after all existing handlers.
    pub fn add_handler(&self, handler: Rc<H>) -> HandlerId {
        let id = HandlerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push(Entry {
            id,
            handler: Some(handler),
        });
        id
    }

    /// Unregisters a handler. Safe to call from inside a callback.
    ///
    /// Returns false if `id` was not registered.
    pub fn remove_handler(&self, id: HandlerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let Some(pos) = entries
            .iter()
            .position(|entry| entry.id == id && entry.handler.is_some())
        else {
            return false;
        };
        if self.depth.get() > 0 {
            entries[pos].handler = None;
            self.dirty.set(true);
        } else {
            entries.remove(pos);
        }
        true
    }

    /// Returns true if `id` is currently registered.
    #[must_use]
    pub fn has_handler(&self, id: HandlerId) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|entry| entry.id == id && entry.handler.is_some())
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.handler.is_some())
            .count()
    }

    /// Returns true if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls `f` once per handler, in registration order.
    ///
    /// The handler list is not borrowed while `f` runs, so `f` may add or
    /// remove handlers and may dispatch again.
    pub fn dispatch(&self, mut f: impl FnMut(&H)) {
        let count = self.entries.borrow().len();
        let _depth = DispatchDepth::enter(self);

        for index in 0..count {
            let handler = self
                .entries
                .borrow()
                .get(index)
                .and_then(|entry| entry.handler.clone());
            if let Some(handler) = handler {
                f(&*handler);
            }
        }
    }
}

/// Holds one level of dispatch depth. Dropping the outermost level
/// compacts tombstones.
struct DispatchDepth<'a, H: ?Sized>(&'a EventDispatcher<H>);

impl<'a, H: ?Sized> DispatchDepth<'a, H> {
    fn enter(dispatcher: &'a EventDispatcher<H>) -> Self {
        dispatcher.depth.set(dispatcher.depth.get() + 1);
        Self(dispatcher)
    }
}

impl<H: ?Sized> Drop for DispatchDepth<'_, H> {
    fn drop(&mut self) {
        let dispatcher = self.0;
        dispatcher.depth.set(dispatcher.depth.get() - 1);
        if dispatcher.depth.get() == 0 && dispatcher.dirty.replace(false) {
            dispatcher
                .entries
                .borrow_mut()
                .retain(|entry| entry.handler.is_some());
        }
    }
}

impl<H: ?Sized> Default for EventDispatcher<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> fmt::Debug for EventDispatcher<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.len())
            .field("depth", &self.depth.get())
            .finish()
    }
}
