//! Bounded exclusive-checkout pool for cipher contexts.
//!
//! A checked-out context has exactly one owner until its guard drops; the
//! at-most-one-owner-at-a-time invariant of the tuple generator is enforced
//! by this structure, not by caller convention. Checkout blocks while the
//! pool is empty, which caps concurrency at the pool's size.

use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use ephem_crypto::CryptoError;

/// Fixed-capacity pool of reusable contexts.
pub struct ContextPool<T> {
    slots: Mutex<PoolSlots<T>>,
    available: Condvar,
}

struct PoolSlots<T> {
    contexts: Vec<T>,
    closed: bool,
}

impl<T> ContextPool<T> {
    /// Build a pool owning the given contexts.
    #[must_use]
    pub fn new(contexts: Vec<T>) -> Self {
        Self {
            slots: Mutex::new(PoolSlots {
                contexts,
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolSlots<T>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check a context out, blocking while none is available.
    ///
    /// The returned guard gives exclusive access and returns the context to
    /// the pool when dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::GeneratorStopped`] once the pool is closed.
    pub fn checkout(&self) -> Result<PoolGuard<'_, T>, CryptoError> {
        let mut slots = self.lock();
        loop {
            if slots.closed {
                return Err(CryptoError::GeneratorStopped);
            }
            if let Some(context) = slots.contexts.pop() {
                return Ok(PoolGuard {
                    pool: self,
                    context: Some(context),
                });
            }
            slots = self
                .available
                .wait(slots)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Close the pool and release its contexts. Idempotent; blocked and
    /// future checkouts fail.
    pub fn close(&self) {
        let mut slots = self.lock();
        slots.closed = true;
        slots.contexts.clear();
        drop(slots);
        self.available.notify_all();
    }

    fn check_in(&self, context: T) {
        let mut slots = self.lock();
        // A context returned after close is dropped with the guard
        if !slots.closed {
            slots.contexts.push(context);
        }
        drop(slots);
        self.available.notify_one();
    }
}

/// Exclusive handle to a pooled context.
pub struct PoolGuard<'a, T> {
    pool: &'a ContextPool<T>,
    context: Option<T>,
}

impl<T> Deref for PoolGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.context
            .as_ref()
            .unwrap_or_else(|| unreachable!("pool guard context taken before drop"))
    }
}

impl<T> DerefMut for PoolGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.context
            .as_mut()
            .unwrap_or_else(|| unreachable!("pool guard context taken before drop"))
    }
}

impl<T> Drop for PoolGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(context) = self.context.take() {
            self.pool.check_in(context);
        }
    }
}
