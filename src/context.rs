//! Thread-local "current operation context".
//!
//! A thread-local avoids plumbing the current request's opcode, object id,
//! and case-sensitivity flag through every helper function a handler might
//! call. It also outlives the handler that populated it: code completing a
//! pending read, write, or directory query runs from arbitrary application
//! threads long after the original handler returned, at which point there is
//! no call stack left to thread a parameter through. The thread-local is
//! scoped strictly to the duration of one handler invocation by
//! [`OperationContext::scoped`].

use std::cell::RefCell;

use crate::abi::Opcode;

/// The `(request, response)` pair visible to a handler and any helper it
/// calls, for the duration of that handler's execution.
#[derive(Clone, Copy, Debug)]
pub struct OperationContext {
    pub hint: u64,
    pub opcode: Opcode,
    pub object_id: u64,
    pub process_id: u32,
    pub case_sensitive: bool,
    /// The requested output buffer size, valid only when `opcode` is
    /// `QueryDirectory`; captured here so a deferred fill can later serve the
    /// first chunk with the same limit the original request carried.
    pub query_directory_buffer_size: u32,
}

thread_local! {
    static CURRENT: RefCell<Option<OperationContext>> = const { RefCell::new(None) };
}

impl OperationContext {
    /// Publishes `self` as the current operation context for the duration of
    /// `f`, then clears it, matching the dispatcher's publish-before-dispatch
    /// / clear-after-return sequence.
    pub fn scoped<R>(self, f: impl FnOnce() -> R) -> R {
        CURRENT.with(|cell| *cell.borrow_mut() = Some(self));
        let result = f();
        CURRENT.with(|cell| *cell.borrow_mut() = None);
        result
    }

    /// Returns the context associated with the currently executing handler on
    /// the calling thread, or `None` outside a handler.
    #[must_use]
    pub fn current() -> Option<OperationContext> {
        CURRENT.with(|cell| *cell.borrow())
    }

    /// `true` if the originating open for the current operation requested
    /// case-sensitive name comparison.
    #[must_use]
    pub fn current_is_case_sensitive() -> bool {
        OperationContext::current().map(|ctx| ctx.case_sensitive).unwrap_or(false)
    }
}
