//! Timer Slot
//!
//! Holds at most one pending timer handle. Handles cancel on drop (gloo
//! `Timeout`), so replacing or clearing the slot cancels the old timer.

use std::cell::RefCell;
use std::rc::Rc;

pub struct TimerSlot<H> {
    pending: Rc<RefCell<Option<H>>>,
}

impl<H> Clone for TimerSlot<H> {
    fn clone(&self) -> Self {
        Self {
            pending: Rc::clone(&self.pending),
        }
    }
}

impl<H> Default for TimerSlot<H> {
    fn default() -> Self {
        Self {
            pending: Rc::new(RefCell::new(None)),
        }
    }
}

impl<H> TimerSlot<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handle`, dropping the one it replaces
    pub fn set(&self, handle: H) {
        let previous = self.pending.borrow_mut().replace(handle);
        drop(previous);
    }

    pub fn cancel(&self) {
        let previous = self.pending.borrow_mut().take();
        drop(previous);
    }

    pub fn is_set(&self) -> bool {
        self.pending.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Counts how many handles have been dropped
    struct Handle(Rc<Cell<usize>>);

    impl Drop for Handle {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_set_drops_previous_handle() {
        let dropped = Rc::new(Cell::new(0));
        let slot = TimerSlot::new();

        slot.set(Handle(dropped.clone()));
        assert_eq!(dropped.get(), 0);

        slot.set(Handle(dropped.clone()));
        assert_eq!(dropped.get(), 1);
        assert!(slot.is_set());
    }

    #[test]
    fn test_cancel_through_clone_drops_pending_handle() {
        let dropped = Rc::new(Cell::new(0));
        let slot = TimerSlot::new();
        let listener_copy = slot.clone();

        listener_copy.set(Handle(dropped.clone()));
        slot.cancel();

        assert_eq!(dropped.get(), 1);
        assert!(!listener_copy.is_set());
    }

    #[test]
    fn test_cancel_on_empty_slot() {
        let slot: TimerSlot<Handle> = TimerSlot::new();
        slot.cancel();
        assert!(!slot.is_set());
    }
}
