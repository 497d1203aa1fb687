//! Optimistic mutations.
//!
//! An optimistic change is written to local state before the backend
//! confirms it. The policy:
//!
//! - on failure, the previous value is restored, but only if the field still
//!   holds the value this mutation applied; a newer change is never undone;
//! - on success, nothing happens. The applied value stays authoritative and
//!   the response body is not read back, so a slow or stale server read can
//!   not flip the field back.
//!
//! Local state may therefore diverge from the server until the next full
//! refetch.

/// Accessor for the field an optimistic mutation targets.
pub type Lens<T, V> = fn(&mut T) -> &mut V;

/// How an optimistic mutation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settled {
    /// Confirmed; the applied value was kept.
    Kept,
    /// Failed; the previous value was restored.
    RolledBack,
    /// Failed, but the field had changed since; left untouched.
    Superseded,
}

/// A change applied ahead of confirmation, remembering what it replaced.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimisticMutation<V> {
    previous: V,
    applied: V,
}

impl<V: Clone + PartialEq> OptimisticMutation<V> {
    /// Write `next` into `target` and remember the old value.
    pub fn apply(target: &mut V, next: V) -> Self {
        let previous = std::mem::replace(target, next.clone());
        OptimisticMutation {
            previous,
            applied: next,
        }
    }

    pub fn previous(&self) -> &V {
        &self.previous
    }

    pub fn applied(&self) -> &V {
        &self.applied
    }

    /// Restore the previous value if `target` still holds the applied one.
    pub fn rollback(&self, target: &mut V) -> Settled {
        if *target == self.applied {
            *target = self.previous.clone();
            Settled::RolledBack
        } else {
            Settled::Superseded
        }
    }

    /// Settle against the outcome of the confirming call.
    ///
    /// `target` is `None` when the record is gone from local state (e.g. a
    /// refetch dropped it), which counts as superseded on failure.
    pub fn settle<T, E>(&self, target: Option<&mut V>, outcome: &Result<T, E>) -> Settled {
        match (outcome, target) {
            (Ok(_), _) => Settled::Kept,
            (Err(_), Some(target)) => self.rollback(target),
            (Err(_), None) => Settled::Superseded,
        }
    }
}
