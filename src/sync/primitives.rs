//! Interrupt-safe building blocks.
//!
//! [`CriticalSectionCell`] guards the engine shared with interrupt handlers
//! and the completion mask. [`AtomicWaker`] parks one task per channel until
//! its completion interrupt fires.

use core::cell::RefCell;
#[cfg(any(feature = "async", test))]
use core::task::Waker;
use critical_section::Mutex;

/// A `RefCell` that is only reachable inside a critical section.
///
/// Usable from `static` items: the constructor is `const`, and every
/// accessor masks interrupts for the duration of the closure.
pub struct CriticalSectionCell<T> {
    cell: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Wraps `value`.
    pub const fn new(value: T) -> Self {
        Self {
            cell: Mutex::new(RefCell::new(value)),
        }
    }

    /// Runs `f` on the value with interrupts masked.
    ///
    /// # Panics
    ///
    /// Panics when called from inside another accessor of the same cell.
    /// Use [`try_with`](Self::try_with) where nesting is possible.
    #[inline]
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        critical_section::with(|cs| f(&mut self.cell.borrow_ref_mut(cs)))
    }

    /// Like [`with`](Self::with), but yields `None` instead of panicking
    /// when the value is already borrowed.
    #[inline]
    pub fn try_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        critical_section::with(|cs| {
            let mut guard = self.cell.borrow(cs).try_borrow_mut().ok()?;
            Some(f(&mut guard))
        })
    }

    /// Shared-borrow counterpart of [`with`](Self::with).
    #[inline]
    pub fn with_ref<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        critical_section::with(|cs| f(&self.cell.borrow_ref(cs)))
    }
}

// SAFETY: the value is only touched inside `critical_section::with`, which
// excludes every other context; `T: Send` covers moving it between them.
unsafe impl<T: Send> Sync for CriticalSectionCell<T> {}

/// Single-slot waker register for one channel's completion.
///
/// The task polling a future registers its waker; the interrupt handler
/// takes and wakes it. A wake with nothing registered is dropped.
#[cfg(any(feature = "async", test))]
pub struct AtomicWaker {
    slot: CriticalSectionCell<Option<Waker>>,
}

#[cfg(any(feature = "async", test))]
impl AtomicWaker {
    /// An empty register.
    pub const fn new() -> Self {
        Self {
            slot: CriticalSectionCell::new(None),
        }
    }

    /// Stores `waker`, replacing any earlier one.
    pub fn register(&self, waker: &Waker) {
        self.slot.with(|slot| match slot {
            // `clone_from` skips the clone when both wake the same task
            Some(current) => current.clone_from(waker),
            None => *slot = Some(waker.clone()),
        });
    }

    /// Takes the stored waker and wakes it outside the critical section.
    #[inline]
    pub fn wake(&self) {
        if let Some(waker) = self.slot.with(Option::take) {
            waker.wake();
        }
    }

    /// `true` while a waker is waiting to be woken.
    pub fn is_registered(&self) -> bool {
        self.slot.with_ref(Option::is_some)
    }
}

#[cfg(any(feature = "async", test))]
impl Default for AtomicWaker {
    fn default() -> Self {
        Self::new()
    }
}
