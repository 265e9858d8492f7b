//! Reads that may happen while a host hook holds the game borrowed

use std::cell::{Cell, RefCell};

/// Read through `cell`, or return the last value read if it is mutably
/// borrowed further up the stack
pub fn read_or_last<T, V: Copy>(cell: &RefCell<T>, last: &Cell<V>, read: impl FnOnce(&T) -> V) -> V {
    match cell.try_borrow() {
        Ok(value) => {
            let v = read(&value);
            last.set(v);
            v
        }
        Err(_) => {
            log::warn!("Re-entrant read, returning last known value");
            last.get()
        }
    }
}
