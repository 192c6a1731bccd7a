//! Async-completion channel: out-of-band `sendResponse`, the
//! notify bracket, and the PENDING-uniqueness bookkeeping behind it.
//!
//! `Notifier` is a `Clone`-able handle wrapping a shared queue that
//! applications hold across threads; the "channel" is the outbound-batch
//! queue the dispatcher drains on its next transport exchange rather than a
//! direct kernel write, since this protocol batches several responses per
//! exchange instead of writing one message per reply.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, RwLock};

use crate::status::Status;

struct PendingQueue {
    /// Encoded response records awaiting the next batch flush.
    outbound: Mutex<Vec<Vec<u8>>>,
    /// Hints for which a PENDING response has been accepted, so a duplicate
    /// `send_response` can be rejected per property 8.
    completed_hints: Mutex<HashSet<u64>>,
}

struct NotifyState {
    /// Held exclusively between `notify_begin` and `notify_end`; a `Rename`
    /// handler also takes this exclusively while running, so the two can
    /// never interleave.
    lock: RwLock<()>,
    condvar: Condvar,
    rename_in_progress: Mutex<bool>,
}

/// A handle by which application code submits out-of-band responses and
/// fire-and-forget kernel notifications. `Clone + Send + Sync`, so it can be
/// stashed inside a PENDING handler's parked state and used from any thread.
#[derive(Clone)]
pub struct Notifier {
    queue: Arc<PendingQueue>,
    notify_state: Arc<NotifyState>,
}

impl Notifier {
    pub(crate) fn new() -> Notifier {
        Notifier {
            queue: Arc::new(PendingQueue {
                outbound: Mutex::new(Vec::new()),
                completed_hints: Mutex::new(HashSet::new()),
            }),
            notify_state: Arc::new(NotifyState {
                lock: RwLock::new(()),
                condvar: Condvar::new(),
                rename_in_progress: Mutex::new(false),
            }),
        }
    }

    /// Enqueues `response` for the dispatcher's next transport exchange.
    /// Returns an error if a response for this `hint` was already accepted.
    pub fn send_response(&self, hint: u64, encoded: Vec<u8>) -> Result<(), Status> {
        let mut completed = self.queue.completed_hints.lock();
        if !completed.insert(hint) {
            return Err(Status::INVALID_PARAMETER);
        }
        drop(completed);
        self.queue.outbound.lock().push(encoded);
        Ok(())
    }

    /// Drains everything queued by [`Notifier::send_response`] since the last
    /// drain, for the dispatcher to fold into its outbound batch.
    pub(crate) fn drain_outbound(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.queue.outbound.lock())
    }

    /// Begins a notify bracket: blocks out a concurrent `Rename` and, if one
    /// is already running, waits up to `timeout` for it to finish before
    /// giving up with `CANT_WAIT`.
    pub fn notify_begin(&self, timeout: Duration) -> Result<NotifyGuard<'_>, Status> {
        let deadline = Instant::now() + timeout;
        let mut in_progress = self.notify_state.rename_in_progress.lock();
        while *in_progress {
            if timeout.is_zero() {
                return Err(Status::CANT_WAIT);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Status::CANT_WAIT);
            }
            let timed_out = self.notify_state.condvar.wait_for(&mut in_progress, remaining).timed_out();
            if timed_out {
                return Err(Status::CANT_WAIT);
            }
        }
        drop(in_progress);
        let guard = self.notify_state.lock.read();
        Ok(NotifyGuard { _guard: guard })
    }

    /// Marks a `Rename` as in progress for the duration of `f`, blocking out
    /// any concurrent notify bracket; called internally by the rename
    /// handler rather than by application code.
    pub(crate) fn with_rename_exclusive<R>(&self, f: impl FnOnce() -> R) -> R {
        {
            let mut in_progress = self.notify_state.rename_in_progress.lock();
            *in_progress = true;
        }
        let _write_guard = self.notify_state.lock.write();
        let result = f();
        {
            let mut in_progress = self.notify_state.rename_in_progress.lock();
            *in_progress = false;
        }
        self.notify_state.condvar.notify_all();
        result
    }
}

/// Held for the duration of a notify bracket; dropping it ends the bracket.
pub struct NotifyGuard<'a> {
    _guard: parking_lot::RwLockReadGuard<'a, ()>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").finish_non_exhaustive()
    }
}

/// Encodes a notify record's wire format: `{ size: u16; filter: u32; action:
/// u32; name: [u16] }`.
#[must_use]
pub fn encode_notify_record(filter: u32, action: u32, name: &str) -> Vec<u8> {
    let name_utf16: Vec<u16> = name.encode_utf16().collect();
    let size = 10 + name_utf16.len() * 2;
    let mut buf = Vec::with_capacity(size);
    buf.extend_from_slice(&(size as u16).to_le_bytes());
    buf.extend_from_slice(&filter.to_le_bytes());
    buf.extend_from_slice(&action.to_le_bytes());
    for unit in name_utf16 {
        buf.extend_from_slice(&unit.to_le_bytes());
    }
    buf
}
