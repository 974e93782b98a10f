use crate::core::{KvError, Result};
use log::warn;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

struct GateState<T> {
    turn: u64,
    abandoned: bool,
    value: T,
}

/// Lets callers through strictly in sequence-number order.
///
/// A caller blocks in [`TurnGate::wait_turn`] until the turn counter equals
/// its sequence number. Waiting never holds the gate lock, so every other
/// caller can still check its own turn. The caller whose turn it is gets a
/// [`Turn`] that keeps the gate closed until it is advanced.
///
/// The gate can carry a value (for example an output buffer) that is only
/// reachable through a `Turn`, which makes every access to it ordered.
pub struct TurnGate<T = ()> {
    name: &'static str,
    state: Mutex<GateState<T>>,
    turn_changed: Condvar,
    timeout: Option<Duration>,
}

impl<T> TurnGate<T> {
    pub fn new(name: &'static str, value: T) -> Self {
        Self {
            name,
            state: Mutex::new(GateState {
                turn: 0,
                abandoned: false,
                value,
            }),
            turn_changed: Condvar::new(),
            timeout: None,
        }
    }

    /// Bound every wait. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Blocks until it is `seq`'s turn.
    ///
    /// The timeout bounds how long the gate may stand still: every time the
    /// turn advances the deadline starts over. Fails with `GateTimeout` if
    /// the turn does not move for a whole timeout period and with
    /// `GateAbandoned` if the gate was abandoned while waiting.
    pub fn wait_turn(&self, seq: u64) -> Result<Turn<'_, T>> {
        let mut guard = self.state.lock()?;
        debug_assert!(guard.turn <= seq, "turn {} already passed", seq);

        match self.timeout {
            Some(timeout) => {
                while guard.turn != seq && !guard.abandoned {
                    let seen = guard.turn;
                    let (next, result) = self.turn_changed.wait_timeout_while(
                        guard,
                        timeout,
                        |state| state.turn == seen && !state.abandoned,
                    )?;
                    guard = next;
                    if result.timed_out() && guard.turn == seen && !guard.abandoned {
                        return Err(KvError::GateTimeout {
                            gate: self.name,
                            seq,
                            current: seen,
                        });
                    }
                }
            }
            None => {
                guard = self
                    .turn_changed
                    .wait_while(guard, |state| state.turn != seq && !state.abandoned)?;
            }
        }

        if guard.abandoned {
            return Err(KvError::GateAbandoned {
                gate: self.name,
                seq,
            });
        }

        Ok(Turn {
            gate: self,
            seq,
            guard,
            advanced: false,
        })
    }

    /// Wakes every waiter and makes all current and future waits fail.
    pub fn abandon(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.abandoned {
            state.abandoned = true;
            warn!("{} gate abandoned at turn {}", self.name, state.turn);
        }
        drop(state);
        self.turn_changed.notify_all();
    }

    pub fn is_abandoned(&self) -> bool {
        self.state
            .lock()
            .map(|state| state.abandoned)
            .unwrap_or(true)
    }

    pub fn current_turn(&self) -> Result<u64> {
        Ok(self.state.lock()?.turn)
    }

    pub fn into_inner(self) -> Result<T> {
        Ok(self.state.into_inner()?.value)
    }
}

/// Exclusive passage through a [`TurnGate`] for one sequence number.
///
/// [`Turn::advance`] hands the gate to the next sequence number. Dropping a
/// turn without advancing it (for example while unwinding from a panic)
/// abandons the gate, so no waiter blocks on a turn that can never come.
pub struct Turn<'a, T> {
    gate: &'a TurnGate<T>,
    seq: u64,
    guard: MutexGuard<'a, GateState<T>>,
    advanced: bool,
}

impl<T> Turn<'_, T> {
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.guard.value
    }

    /// Waiters wake once the guard is released at the end of this call.
    pub fn advance(mut self) {
        self.guard.turn += 1;
        self.advanced = true;
        self.gate.turn_changed.notify_all();
    }
}

impl<T> Drop for Turn<'_, T> {
    fn drop(&mut self) {
        if !self.advanced {
            self.guard.abandoned = true;
            warn!(
                "{} gate turn {} dropped without advancing",
                self.gate.name, self.seq
            );
            self.gate.turn_changed.notify_all();
        }
    }
}
