//! The release-triggered result cell.
//!
//! A [`Gather`] owns a value together with the finalizer that wants it. The
//! finalizer runs exactly once, with the value moved into it, at the moment
//! the last handle to the cell is dropped. Whoever still holds a clone is by
//! definition still working on the result; the reference count replaces any
//! explicit "all branches reported back" bookkeeping.
//!
//! # Examples
//!
//! ```
//! use bounce::Gather;
//! use std::{cell::Cell, rc::Rc};
//!
//! let delivered = Rc::new(Cell::new(0));
//! let out = delivered.clone();
//! {
//!     let cell = Gather::with_value(0, move |v| out.set(v));
//!     let other = cell.clone();
//!     *cell.data() += 2;
//!     *other.data() += 3;
//! } // last handle dropped here, the finalizer receives 5
//! assert_eq!(delivered.get(), 5);
//! ```

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

struct Inner<T> {
    value: T,
    deliver: Box<dyn FnOnce(T)>,
}

struct Shared<T: 'static> {
    slot: RefCell<Option<Inner<T>>>,
}

impl<T: 'static> Drop for Shared<T> {
    fn drop(&mut self) {
        if let Some(Inner { value, deliver }) = self.slot.get_mut().take() {
            deliver(value);
        }
    }
}

/// A shared result cell that delivers its value on release.
///
/// All clones refer to one record holding the value and the finalizer. The
/// finalizer fires synchronously when the last clone drops; there is no
/// other way the cell gives its value up.
pub struct Gather<T: 'static> {
    shared: Rc<Shared<T>>,
}

impl<T: 'static> Clone for Gather<T> {
    fn clone(&self) -> Self {
        Gather {
            shared: self.shared.clone(),
        }
    }
}

impl<T: 'static> Gather<T> {
    /// Create a cell around `T::default()`, to be mutated into shape before
    /// the last handle drops.
    pub fn new(deliver: impl FnOnce(T) + 'static) -> Gather<T>
    where
        T: Default,
    {
        Gather::with_value(T::default(), deliver)
    }

    /// Create a cell around an explicit initial value.
    pub fn with_value(value: T, deliver: impl FnOnce(T) + 'static) -> Gather<T> {
        Gather {
            shared: Rc::new(Shared {
                slot: RefCell::new(Some(Inner {
                    value,
                    deliver: Box::new(deliver),
                })),
            }),
        }
    }

    /// Mutable access to the gathered value.
    ///
    /// The borrow must be released before the cell can be borrowed again,
    /// same as any [`RefCell`] borrow; keep it short-lived.
    pub fn data(&self) -> RefMut<'_, T> {
        RefMut::map(self.shared.slot.borrow_mut(), |slot| {
            let inner = slot.as_mut().expect("gathered value already delivered");
            &mut inner.value
        })
    }

    /// Make a one-shot assigner for the field `project` selects.
    ///
    /// Each assigner holds its own handle to the cell, so issuing one per
    /// concurrent sub-request makes the finalizer fire exactly when every
    /// sub-result has arrived and been stored.
    ///
    /// ```
    /// use bounce::Gather;
    /// use std::{cell::Cell, rc::Rc};
    ///
    /// let delivered = Rc::new(Cell::new((0, 0)));
    /// let out = delivered.clone();
    /// let cell = Gather::new(move |pair| out.set(pair));
    /// let first = cell.setter(|pair: &mut (i32, i32)| &mut pair.0);
    /// let second = cell.setter(|pair: &mut (i32, i32)| &mut pair.1);
    /// drop(cell);
    /// first(10);
    /// second(20); // the last holder releases, so the finalizer fires
    /// assert_eq!(delivered.get(), (10, 20));
    /// ```
    pub fn setter<V>(
        &self,
        project: impl FnOnce(&mut T) -> &mut V + 'static,
    ) -> impl FnOnce(V) + 'static {
        let cell = self.clone();
        move |value| {
            let mut data = cell.data();
            *project(&mut data) = value;
        }
    }
}
