//! Hit intake and the park/release cycle.
//!
//! A hit parks the calling engine thread:
//!
//! 1. The raw stack trace is parsed; an empty stack means a spurious hit.
//! 2. Frame 0 variables are collected.
//! 3. The context is registered as parked, then the hit event is sent. If
//!    the session ended meanwhile, or the event cannot be sent, the thread
//!    does not park.
//! 4. The thread waits on its context monitor, running queued Evaluate and
//!    VariableRequest messages in between, until it is no longer parked.
//!
//! Release removes the entry from the parked table before notifying, so a
//! park is released at most once no matter how many releasers race.

// ============================================================================
// Imports
// ============================================================================

use std::collections::hash_map::Entry;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::identifiers::{ContextHandle, MessageId};
use crate::protocol::{EvaluateResponse, Payload, ThreadInfo, VariableResponse};

use super::context::DebuggerContext;
use super::core::DebuggerInner;
use super::introspection;

// ============================================================================
// HitKind
// ============================================================================

/// Cause of a pause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HitKind {
    /// A breakpoint was reached.
    Breakpoint,
    /// An exception was thrown, with its message.
    Exception(String),
    /// A step completed.
    Step,
}

impl HitKind {
    /// Returns the pause message carried in the thread info.
    fn message(&self) -> Option<String> {
        match self {
            Self::Exception(message) => Some(message.clone()),
            Self::Breakpoint | Self::Step => None,
        }
    }

    /// Wraps the thread info into the matching event.
    fn into_event(self, thread: ThreadInfo) -> Payload {
        match self {
            Self::Breakpoint => Payload::BreakpointHit(thread),
            Self::Exception(_) => Payload::ExceptionHit(thread),
            Self::Step => Payload::StepHit(thread),
        }
    }
}

/// Returns the display name of the calling engine thread.
fn thread_name(context: ContextHandle) -> String {
    std::thread::current()
        .name()
        .map_or_else(|| format!("Thread {context}"), str::to_string)
}

// ============================================================================
// DebuggerInner - Park
// ============================================================================

impl DebuggerInner {
    /// Returns `true` if the thread of `context` is parked.
    pub fn is_parked(&self, context: ContextHandle) -> bool {
        self.breakpoint_hits.lock().contains_key(&context)
    }

    /// Handles a hit on the calling engine thread, blocking until released.
    pub fn handle_break(&self, context: ContextHandle, kind: HitKind) {
        if !self.is_running() {
            return;
        }

        if self.is_parked(context) {
            debug!(context = %context, "Re-entrant hit ignored");
            return;
        }

        let Some(ctx) = self.context(context) else {
            warn!(context = %context, "Hit in untracked context");
            return;
        };

        let frames = introspection::parse_stack_trace(&self.engine.stack_trace(context));
        if frames.is_empty() {
            debug!(context = %context, "Hit without stack frames ignored");
            return;
        }

        let mut thread = ThreadInfo::new(context, thread_name(context), kind.message(), frames);

        match introspection::frame_variables(self.engine.as_ref(), context) {
            Ok(variables) => {
                if let Some(top) = thread.stack_frames.first_mut() {
                    top.variables = variables;
                }
            }
            Err(e) => warn!(context = %context, error = %e, "Failed to collect frame variables"),
        }

        if !self.register_park(&ctx) {
            return;
        }

        let event = kind.into_event(thread.clone());
        info!(context = %context, command = event.tag(), "Thread parked");
        if !self.send_event(event) {
            self.release(context);
            return;
        }

        self.park(&ctx, &thread);
        info!(context = %context, "Thread resumed");
    }

    /// Records `ctx` as parked.
    ///
    /// Holds the registry lock so a concurrent reset either sees the park
    /// and releases it, or has already dropped the context and the hit is
    /// abandoned. Returns `false` if the thread must not park.
    fn register_park(&self, ctx: &Arc<DebuggerContext>) -> bool {
        let handle = ctx.handle();
        let contexts = self.contexts.lock();

        let registered = contexts
            .get(&handle)
            .is_some_and(|current| Arc::ptr_eq(current, ctx));
        if !registered || !self.is_running() {
            debug!(context = %handle, "Session ended during hit intake");
            return false;
        }

        match self.breakpoint_hits.lock().entry(handle) {
            Entry::Occupied(_) => {
                debug!(context = %handle, "Re-entrant hit ignored");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(ctx));
                true
            }
        }
    }

    /// Waits on the context monitor until the thread is released.
    fn park(&self, ctx: &DebuggerContext, thread: &ThreadInfo) {
        let handle = ctx.handle();
        let mut state = ctx.lock();

        while self.is_parked(handle) {
            match state.next_message() {
                Some(message) => {
                    drop(state);
                    self.handle_thread_message(thread, message.id, message.payload);
                    state = ctx.lock();
                }
                None => ctx.wait(&mut state),
            }
        }

        let stale = state.pending_messages();
        while state.next_message().is_some() {}
        if stale > 0 {
            debug!(context = %handle, stale, "Dropped requests queued after release");
        }
    }

    /// Releases the parked thread of `context`.
    ///
    /// Returns `false` if it was not parked.
    pub fn release(&self, context: ContextHandle) -> bool {
        let parked = self.breakpoint_hits.lock().remove(&context);
        let Some(ctx) = parked else {
            return false;
        };

        let _state = ctx.lock();
        ctx.notify();
        true
    }
}

// ============================================================================
// DebuggerInner - Thread Requests
// ============================================================================

impl DebuggerInner {
    /// Runs one queued request on the parked thread.
    fn handle_thread_message(&self, thread: &ThreadInfo, id: MessageId, payload: Payload) {
        match payload {
            Payload::Evaluate(request) => self.evaluate(thread, id, &request.expression),
            Payload::VariableRequest(request) => {
                self.request_variables(thread, id, &request.variable_name);
            }
            other => debug!(command = other.tag(), "Ignoring queued message"),
        }
    }

    /// Evaluates an expression and answers with its rendering.
    fn evaluate(&self, thread: &ThreadInfo, id: MessageId, expression: &str) {
        let engine = self.engine.as_ref();

        let response = match engine.evaluate_script(thread.id, expression) {
            Ok(value) => EvaluateResponse::success(introspection::describe_evaluation(
                engine, thread.id, expression, &value,
            )),
            Err(e) => {
                debug!(context = %thread.id, expression, error = %e, "Evaluation failed");
                EvaluateResponse::failure(failure_message(e))
            }
        };

        self.respond(id, Payload::EvaluateResponse(response));
    }

    /// Lists the members of a variable.
    fn request_variables(&self, thread: &ThreadInfo, id: MessageId, variable_name: &str) {
        let members = introspection::object_members(
            self.engine.as_ref(),
            self.reflection.as_ref(),
            thread.id,
            variable_name,
        );

        let variables = match members {
            Ok(variables) => variables,
            Err(e) if self.options.recoverable_variable_requests => {
                warn!(context = %thread.id, variable_name, error = %e, "Variable request failed");
                Vec::new()
            }
            Err(e) => {
                error!(
                    context = %thread.id,
                    variable_name,
                    error = %e,
                    "Variable request failed, ending session"
                );
                self.stop();
                return;
            }
        };

        self.respond(
            id,
            Payload::VariableResponse(VariableResponse {
                variables,
                thread: thread.clone(),
            }),
        );
    }
}

/// Returns the message reported for a failed evaluation.
fn failure_message(error: Error) -> String {
    match error {
        Error::ScriptError { message } => message,
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
