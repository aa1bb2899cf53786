//! Per-context debugger state.
//!
//! Each script execution context gets one [`DebuggerContext`]: a monitor
//! (mutex + condition variable) guarding the context's source table,
//! registered breakpoints and the inbound message queue of its parked
//! thread.
//!
//! The state itself never blocks. Waiting for a message is the parked
//! thread's job, through [`DebuggerContext::wait`].

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::fmt;

use parking_lot::{Condvar, Mutex, MutexGuard};
use rustc_hash::FxHashMap;

use crate::identifiers::{ContextHandle, SourceId};
use crate::protocol::{Breakpoint, Envelope};

// ============================================================================
// ContextState
// ============================================================================

/// Mutable state of one context, only reachable through its monitor.
#[derive(Debug, Default)]
pub struct ContextState {
    /// Source name to engine source id.
    sources: FxHashMap<String, SourceId>,
    /// Breakpoints registered with the engine, in registration order.
    breakpoints: Vec<Breakpoint>,
    /// Pending thread-scoped requests, oldest first.
    messages: VecDeque<Envelope>,
}

impl ContextState {
    /// Returns the engine id of a parsed source.
    #[inline]
    #[must_use]
    pub fn source_id(&self, file_name: &str) -> Option<SourceId> {
        self.sources.get(file_name).copied()
    }

    /// Records a parsed source, replacing any previous id.
    #[inline]
    pub fn record_source(&mut self, file_name: impl Into<String>, source: SourceId) {
        self.sources.insert(file_name.into(), source);
    }

    /// Returns the registered breakpoints.
    #[inline]
    #[must_use]
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Returns `true` if an equal breakpoint is registered.
    #[inline]
    #[must_use]
    pub fn has_breakpoint(&self, breakpoint: &Breakpoint) -> bool {
        self.breakpoints.contains(breakpoint)
    }

    /// Adds a registered breakpoint.
    #[inline]
    pub fn add_breakpoint(&mut self, breakpoint: Breakpoint) {
        self.breakpoints.push(breakpoint);
    }

    /// Removes the registered breakpoint equal to `breakpoint`.
    ///
    /// The returned value carries the engine id.
    pub fn remove_breakpoint(&mut self, breakpoint: &Breakpoint) -> Option<Breakpoint> {
        let index = self.breakpoints.iter().position(|bp| bp == breakpoint)?;
        Some(self.breakpoints.remove(index))
    }

    /// Forgets every registered breakpoint.
    #[inline]
    pub fn clear_breakpoints(&mut self) {
        self.breakpoints.clear();
    }

    /// Queues a request for the parked thread.
    #[inline]
    pub fn push_message(&mut self, message: Envelope) {
        self.messages.push_back(message);
    }

    /// Takes the oldest queued request, `None` if the queue is empty.
    #[inline]
    pub fn next_message(&mut self) -> Option<Envelope> {
        self.messages.pop_front()
    }

    /// Returns the number of queued requests.
    #[inline]
    #[must_use]
    pub fn pending_messages(&self) -> usize {
        self.messages.len()
    }
}

// ============================================================================
// DebuggerContext
// ============================================================================

/// Monitor of one script execution context.
pub struct DebuggerContext {
    /// Engine handle, also the thread id on the wire.
    handle: ContextHandle,
    /// Guarded state.
    state: Mutex<ContextState>,
    /// Wakes the parked thread.
    monitor: Condvar,
}

impl fmt::Debug for DebuggerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebuggerContext")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl DebuggerContext {
    /// Creates an empty context record.
    #[must_use]
    pub fn new(handle: ContextHandle) -> Self {
        Self {
            handle,
            state: Mutex::new(ContextState::default()),
            monitor: Condvar::new(),
        }
    }

    /// Returns the engine handle.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> ContextHandle {
        self.handle
    }

    /// Locks the context state.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, ContextState> {
        self.state.lock()
    }

    /// Blocks until the monitor is notified, releasing the lock meanwhile.
    #[inline]
    pub fn wait(&self, state: &mut MutexGuard<'_, ContextState>) {
        self.monitor.wait(state);
    }

    /// Wakes every thread waiting on the monitor.
    #[inline]
    pub fn notify(&self) {
        self.monitor.notify_all();
    }

    /// Queues a request and wakes the parked thread.
    pub fn post(&self, message: Envelope) {
        let mut state = self.lock();
        state.push_message(message);
        self.notify();
    }
}

// ============================================================================
// Tests
// ============================================================================
