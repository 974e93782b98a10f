use crate::core::Result;
use std::sync::{Condvar, Mutex, PoisonError};

/// Blocks waiters until a fixed number of participants have signalled.
pub struct CountdownEvent {
    count: Mutex<usize>,
    condvar: Condvar,
}

impl CountdownEvent {
    pub fn new(count: usize) -> Self {
        CountdownEvent {
            count: Mutex::new(count),
            condvar: Condvar::new(),
        }
    }

    /// Decrement the count by one. Returns true for the signal that reached zero.
    pub fn signal(&self) -> bool {
        // Signals are sent from drop guards during unwinding as well, so a
        // poisoned count is still decremented.
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        if *count == 0 {
            return false;
        }
        *count -= 1;
        if *count == 0 {
            self.condvar.notify_all();
            true
        } else {
            false
        }
    }

    /// Lower the target by `n` participants that will never signal.
    pub fn forfeit(&self, n: usize) {
        for _ in 0..n {
            self.signal();
        }
    }

    pub fn remaining(&self) -> usize {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait until the count reaches zero.
    pub fn wait(&self) -> Result<()> {
        let count = self.count.lock()?;
        let _count = self.condvar.wait_while(count, |count| *count > 0)?;
        Ok(())
    }

    /// Guard that signals once when dropped.
    pub fn participant(&self) -> Participant<'_> {
        Participant { event: self }
    }
}

pub struct Participant<'a> {
    event: &'a CountdownEvent,
}

impl Drop for Participant<'_> {
    fn drop(&mut self) {
        self.event.signal();
    }
}
