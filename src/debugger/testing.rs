//! Recording engine shared by the debugger unit tests.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicI64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::engine::{ScriptEngine, ScriptValue};
use crate::error::{Error, Result};
use crate::identifiers::{BreakpointId, ContextHandle, SourceId};

// ============================================================================
// Call
// ============================================================================

/// A native call made by the debugger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Attach(ContextHandle),
    Detach(ContextHandle),
    /// Context, source and 0-based line.
    SetBreakpoint(ContextHandle, SourceId, u32),
    RemoveBreakpoint(ContextHandle, BreakpointId),
    ClearBreakpoints(ContextHandle),
    BreakProgram(ContextHandle),
    Continue(ContextHandle),
    StepInto(ContextHandle),
    StepOver(ContextHandle),
    StepOut(ContextHandle),
    StartProfiler(ContextHandle),
    StopProfiler(ContextHandle),
}

// ============================================================================
// MockEngine
// ============================================================================

/// Engine that records native calls; every evaluation fails.
#[derive(Default)]
pub struct MockEngine {
    calls: Mutex<Vec<Call>>,
    attached: Mutex<FxHashSet<ContextHandle>>,
    next_breakpoint: AtomicI64,
    stack: String,
}

impl MockEngine {
    /// Sets the stack trace returned for every context.
    pub fn with_stack(mut self, stack: &str) -> Self {
        self.stack = stack.to_string();
        self
    }

    /// Returns the recorded calls.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Returns how many times `call` was made.
    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl ScriptEngine for MockEngine {
    fn global_context(&self) -> ContextHandle {
        ContextHandle::new(1)
    }

    fn attach(&self, context: ContextHandle) {
        self.attached.lock().insert(context);
        self.record(Call::Attach(context));
    }

    fn detach(&self, context: ContextHandle) {
        self.attached.lock().remove(&context);
        self.record(Call::Detach(context));
    }

    fn is_attached(&self, context: ContextHandle) -> bool {
        self.attached.lock().contains(&context)
    }

    fn set_breakpoint(
        &self,
        context: ContextHandle,
        source: SourceId,
        line: u32,
        _column: u32,
        _condition: &str,
        _hit_count: u32,
    ) -> BreakpointId {
        self.record(Call::SetBreakpoint(context, source, line));
        BreakpointId::new(self.next_breakpoint.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn remove_breakpoint(&self, context: ContextHandle, breakpoint: BreakpointId) {
        self.record(Call::RemoveBreakpoint(context, breakpoint));
    }

    fn clear_breakpoints(&self, context: ContextHandle) {
        self.record(Call::ClearBreakpoints(context));
    }

    fn break_program(&self, context: ContextHandle) {
        self.record(Call::BreakProgram(context));
    }

    fn continue_program(&self, context: ContextHandle) {
        self.record(Call::Continue(context));
    }

    fn step_into_statement(&self, context: ContextHandle) {
        self.record(Call::StepInto(context));
    }

    fn step_over_statement(&self, context: ContextHandle) {
        self.record(Call::StepOver(context));
    }

    fn step_out_of_function(&self, context: ContextHandle) {
        self.record(Call::StepOut(context));
    }

    fn evaluate_script(&self, _context: ContextHandle, script: &str) -> Result<ScriptValue> {
        Err(Error::script_error(format!("ReferenceError: {script} is not defined")))
    }

    fn property_names_of_current_scope(&self, _context: ContextHandle) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn stack_trace(&self, _context: ContextHandle) -> String {
        self.stack.clone()
    }

    fn start_profiler(&self, context: ContextHandle) {
        self.record(Call::StartProfiler(context));
    }

    fn stop_profiler(&self, context: ContextHandle) -> String {
        self.record(Call::StopProfiler(context));
        format!("{{\"context\":{context}}}")
    }
}
