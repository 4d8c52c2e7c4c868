//! The single-request rendezvous slot.
//!
//! A [`Slot`] mediates between one consumer asking for the next value and
//! one producer supplying it, whichever side shows up first. The consumer
//! holds the slot strongly; the [`Producer`] observes it weakly. When the
//! last consumer handle drops, a parked producer callback is told
//! `terminated = true`: abandonment is the one cancellation signal in this
//! crate, and it is a normal way for a stream to end, not an error.
//!
//! At most one callback may wait on each side. Registering a second one, or
//! delivering with nobody waiting, is a contract violation and panics.
//!
//! # Examples
//!
//! ```
//! use bounce::Slot;
//! use std::{cell::Cell, rc::Rc};
//!
//! let slot = Slot::new();
//! let producer = slot.producer();
//!
//! let got = Rc::new(Cell::new(None));
//! let out = got.clone();
//! slot.request(move |value: i32| out.set(Some(value)));
//!
//! // The consumer is already waiting, so the producer hears about it
//! // immediately and can deliver on the spot.
//! let sink = producer.clone();
//! producer.on_request(move |terminated| {
//!     if !terminated {
//!         sink.deliver(42);
//!     }
//! });
//! assert_eq!(got.get(), Some(42));
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

struct Shared<T: 'static> {
    awaiting_request: RefCell<Option<Box<dyn FnOnce(bool)>>>,
    awaiting_data: RefCell<Option<Box<dyn FnOnce(T)>>>,
}

impl<T: 'static> Drop for Shared<T> {
    fn drop(&mut self) {
        // consumer gone; a parked producer learns it was abandoned
        if let Some(ready) = self.awaiting_request.get_mut().take() {
            ready(true);
        }
    }
}

/// The consumer side of a rendezvous. Clones share one slot; the slot lives
/// while any of them does.
pub struct Slot<T: 'static> {
    shared: Rc<Shared<T>>,
}

/// The producer side of a rendezvous: a weak observer of the slot.
///
/// Producer handles never keep the slot alive. Once the consumer side is
/// gone, [`on_request`] reports `terminated = true` right away and
/// [`deliver`] is no longer legal.
///
/// [`on_request`]: Producer::on_request
/// [`deliver`]: Producer::deliver
pub struct Producer<T: 'static> {
    shared: Weak<Shared<T>>,
}

impl<T: 'static> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Slot {
            shared: self.shared.clone(),
        }
    }
}

impl<T: 'static> Clone for Producer<T> {
    fn clone(&self) -> Self {
        Producer {
            shared: self.shared.clone(),
        }
    }
}

impl<T: 'static> Default for Slot<T> {
    fn default() -> Self {
        Slot::new()
    }
}

impl<T: 'static> Slot<T> {
    /// Create an empty slot with nobody waiting on either side.
    pub fn new() -> Slot<T> {
        Slot {
            shared: Rc::new(Shared {
                awaiting_request: RefCell::new(None),
                awaiting_data: RefCell::new(None),
            }),
        }
    }

    /// Obtain a producer handle for this slot.
    pub fn producer(&self) -> Producer<T> {
        Producer {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Ask for the next value; `on_data` fires once it is delivered.
    ///
    /// If the producer is already parked waiting for a request, it is woken
    /// immediately (and may well deliver before `request` returns). Only one
    /// request may be outstanding at a time.
    ///
    /// # Panics
    ///
    /// Panics if a previous request is still waiting for its value.
    pub fn request(&self, on_data: impl FnOnce(T) + 'static) {
        assert!(
            self.shared.awaiting_data.borrow().is_none(),
            "a request is already waiting on this slot"
        );
        // park the callback first: the woken producer delivers into it
        *self.shared.awaiting_data.borrow_mut() = Some(Box::new(on_data));
        let parked = self.shared.awaiting_request.borrow_mut().take();
        if let Some(ready) = parked {
            ready(false);
        }
    }
}

impl<T: 'static> Producer<T> {
    /// Wait for the consumer to ask for a value.
    ///
    /// `ready` fires exactly once, with `terminated = false` when a request
    /// is (or becomes) pending, or with `terminated = true` when the
    /// consumer side is already gone or goes away while the producer waits.
    /// On `terminated = true` the producer is expected to drop its context
    /// and stop.
    ///
    /// # Panics
    ///
    /// Panics if another `on_request` callback is already parked.
    pub fn on_request(&self, ready: impl FnOnce(bool) + 'static) {
        let Some(shared) = self.shared.upgrade() else {
            ready(true);
            return;
        };
        let request_pending = shared.awaiting_data.borrow().is_some();
        if request_pending {
            ready(false);
            return;
        }
        assert!(
            shared.awaiting_request.borrow().is_none(),
            "the producer is already waiting on this slot"
        );
        *shared.awaiting_request.borrow_mut() = Some(Box::new(ready));
    }

    /// Deliver a value to the waiting request.
    ///
    /// The waiting callback is taken out of the slot before it runs, so it
    /// may issue the next `request` from inside itself.
    ///
    /// # Panics
    ///
    /// Panics if no request is waiting or the consumer side is gone.
    pub fn deliver(&self, value: T) {
        let shared = self
            .shared
            .upgrade()
            .expect("deliver on a slot whose consumer is gone");
        let on_data = shared
            .awaiting_data
            .borrow_mut()
            .take()
            .expect("deliver without a waiting request");
        on_data(value);
    }
}
