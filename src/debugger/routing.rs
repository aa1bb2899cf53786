//! Dispatch of inbound remote commands.
//!
//! Runs on the connection's event loop and never blocks on a parked
//! thread:
//!
//! | Command | Handling |
//! |---------|----------|
//! | `AddBreakpoint`, `RemoveBreakpoint` | Applied to every context |
//! | `Continue`, `StepIn`, `StepOver`, `StepOut` | Native call, then release |
//! | `Pause` | Breaks every context |
//! | `Evaluate`, `VariableRequest` | Queued on the parked thread's context |
//! | anything else | Ignored |

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, trace, warn};

use crate::identifiers::ContextHandle;
use crate::protocol::{Breakpoint, Envelope, Payload};

use super::context::DebuggerContext;
use super::core::DebuggerInner;

// ============================================================================
// Resume
// ============================================================================

/// How a parked thread resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resume {
    Continue,
    StepIn,
    StepOver,
    StepOut,
}

// ============================================================================
// DebuggerInner - Routing
// ============================================================================

impl DebuggerInner {
    /// Dispatches one decoded remote message.
    pub fn route(&self, envelope: Envelope) {
        trace!(id = %envelope.id, command = envelope.payload.tag(), "Routing message");

        if let Some(target) = envelope.payload.target_thread() {
            self.enqueue(target, envelope);
            return;
        }

        match envelope.payload {
            Payload::AddBreakpoint(breakpoint) => self.add_breakpoint(breakpoint),
            Payload::RemoveBreakpoint(breakpoint) => self.remove_breakpoint(&breakpoint),
            Payload::Continue(thread) => self.resume(thread.id, Resume::Continue),
            Payload::StepIn(thread) => self.resume(thread.id, Resume::StepIn),
            Payload::StepOver(thread) => self.resume(thread.id, Resume::StepOver),
            Payload::StepOut(thread) => self.resume(thread.id, Resume::StepOut),
            Payload::Pause(_) => self.break_all(),
            Payload::Unknown { command } => debug!(command, "Ignoring unknown command"),
            other => debug!(command = other.tag(), "Ignoring command"),
        }
    }

    /// Queues a thread-scoped request on the target context.
    fn enqueue(&self, target: ContextHandle, envelope: Envelope) {
        let Some(ctx) = self.context(target) else {
            warn!(thread = %target, command = envelope.payload.tag(), "Request for unknown thread");
            return;
        };

        if !self.is_parked(target) {
            warn!(thread = %target, command = envelope.payload.tag(), "Request for a running thread");
            return;
        }

        ctx.post(envelope);
    }

    /// Makes the native resume call and releases the parked thread.
    fn resume(&self, context: ContextHandle, how: Resume) {
        if !self.is_parked(context) {
            debug!(context = %context, ?how, "Thread not parked, ignoring");
            return;
        }

        match how {
            Resume::Continue => self.engine.continue_program(context),
            Resume::StepIn => self.engine.step_into_statement(context),
            Resume::StepOver => self.engine.step_over_statement(context),
            Resume::StepOut => self.engine.step_out_of_function(context),
        }

        if self.release(context) {
            debug!(context = %context, ?how, "Thread released");
        }
    }

    /// Breaks every context at its next statement.
    fn break_all(&self) {
        for ctx in self.context_snapshot() {
            self.engine.break_program(ctx.handle());
        }
    }
}

// ============================================================================
// DebuggerInner - Breakpoints
// ============================================================================

impl DebuggerInner {
    /// Adds a breakpoint to the session and to every context.
    fn add_breakpoint(&self, breakpoint: Breakpoint) {
        {
            let mut session = self.breakpoints.lock();
            match session.iter_mut().find(|bp| **bp == breakpoint) {
                Some(existing) => *existing = breakpoint.clone(),
                None => session.push(breakpoint.clone()),
            }
        }

        for ctx in self.context_snapshot() {
            // A changed condition or hit count needs a fresh engine breakpoint.
            self.unregister_breakpoint(&ctx, &breakpoint);
            self.register_breakpoint(&ctx, &breakpoint);
        }
    }

    /// Removes a breakpoint from the session and from every context.
    fn remove_breakpoint(&self, breakpoint: &Breakpoint) {
        self.breakpoints.lock().retain(|bp| bp != breakpoint);

        for ctx in self.context_snapshot() {
            self.unregister_breakpoint(&ctx, breakpoint);
        }
    }

    /// Registers a breakpoint with the engine for one context.
    ///
    /// Skipped if already registered or if the source is not parsed yet.
    pub fn register_breakpoint(&self, ctx: &DebuggerContext, breakpoint: &Breakpoint) -> bool {
        let handle = ctx.handle();
        let mut state = ctx.lock();

        if state.has_breakpoint(breakpoint) {
            return false;
        }

        let Some(source) = state.source_id(&breakpoint.file_name) else {
            debug!(
                context = %handle,
                file = %breakpoint.file_name,
                line = breakpoint.line,
                "Source unknown, breakpoint pending"
            );
            return false;
        };

        let id = self.engine.set_breakpoint(
            handle,
            source,
            breakpoint.engine_line(),
            breakpoint.column,
            breakpoint.condition.as_deref().unwrap_or(""),
            breakpoint.hit_count,
        );

        let mut registered = breakpoint.clone();
        registered.id = id;
        state.add_breakpoint(registered);

        debug!(
            context = %handle,
            file = %breakpoint.file_name,
            line = breakpoint.line,
            id = %id,
            "Breakpoint registered"
        );
        true
    }

    /// Removes a registered breakpoint from one context.
    fn unregister_breakpoint(&self, ctx: &DebuggerContext, breakpoint: &Breakpoint) -> bool {
        let removed = ctx.lock().remove_breakpoint(breakpoint);
        let Some(registered) = removed else {
            return false;
        };

        self.engine.remove_breakpoint(ctx.handle(), registered.id);
        debug!(context = %ctx.handle(), id = %registered.id, "Breakpoint removed");
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
