//! Scripting engine collaborator interface.
//!
//! The coordinator never touches the engine directly; it only issues the
//! native calls below, addressed by [`ContextHandle`]. Evaluation may
//! happen re-entrantly while an engine thread is parked inside a hit
//! callback, so implementations must allow [`ScriptEngine::evaluate_script`]
//! from that thread.
//!
//! # Collaborators
//!
//! | Trait | Role |
//! |-------|------|
//! | [`ScriptEngine`] | Debugger instrumentation, stepping, evaluation, profiler |
//! | [`HostReflection`] | Declared properties of host-mapped objects |

// ============================================================================
// Submodules
// ============================================================================

/// Script values returned by evaluation.
pub mod value;

// ============================================================================
// Imports
// ============================================================================

use crate::error::Result;
use crate::identifiers::{BreakpointId, ContextHandle, SourceId};

// ============================================================================
// Re-exports
// ============================================================================

pub use value::ScriptValue;

// ============================================================================
// ScriptEngine
// ============================================================================

/// Native-call interface of the scripting engine.
pub trait ScriptEngine: Send + Sync {
    /// Returns the handle of the default, global context.
    fn global_context(&self) -> ContextHandle;

    /// Attaches debugger instrumentation to a context.
    fn attach(&self, context: ContextHandle);

    /// Detaches debugger instrumentation from a context.
    fn detach(&self, context: ContextHandle);

    /// Returns `true` if instrumentation is attached.
    fn is_attached(&self, context: ContextHandle) -> bool;

    /// Registers a breakpoint and returns its engine id.
    ///
    /// `line` is 0-based; `condition` is empty when unconditional.
    fn set_breakpoint(
        &self,
        context: ContextHandle,
        source: SourceId,
        line: u32,
        column: u32,
        condition: &str,
        hit_count: u32,
    ) -> BreakpointId;

    /// Removes a registered breakpoint.
    fn remove_breakpoint(&self, context: ContextHandle, breakpoint: BreakpointId);

    /// Removes every breakpoint of a context.
    fn clear_breakpoints(&self, context: ContextHandle);

    /// Breaks execution at the next statement.
    fn break_program(&self, context: ContextHandle);

    /// Resumes execution until the next breakpoint.
    fn continue_program(&self, context: ContextHandle);

    /// Resumes and stops at the next statement, entering calls.
    fn step_into_statement(&self, context: ContextHandle);

    /// Resumes and stops at the next statement, over calls.
    fn step_over_statement(&self, context: ContextHandle);

    /// Resumes and stops after the current function returns.
    fn step_out_of_function(&self, context: ContextHandle);

    /// Evaluates a script in the current debugger scope.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ScriptError`] if the script throws.
    fn evaluate_script(&self, context: ContextHandle, script: &str) -> Result<ScriptValue>;

    /// Returns the names visible in the current debugger scope.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ScriptError`] if the scope cannot be read.
    fn property_names_of_current_scope(&self, context: ContextHandle) -> Result<Vec<String>>;

    /// Returns the raw stack trace text of the current call stack.
    ///
    /// One frame per line: `#<index> <name>() at <file>:<line>`.
    fn stack_trace(&self, context: ContextHandle) -> String;

    /// Starts the profiler.
    fn start_profiler(&self, context: ContextHandle);

    /// Stops the profiler and returns its JSON output.
    fn stop_profiler(&self, context: ContextHandle) -> String;
}

// ============================================================================
// HostReflection
// ============================================================================

/// Reflection layer that maps host objects into scripts.
///
/// Whether a value is mapped is probed through the engine (the
/// `isMappedObject` property); this trait only lists what a mapped
/// object declares.
pub trait HostReflection: Send + Sync {
    /// Returns the declared property names of a mapped object.
    fn declared_properties(&self, value: &ScriptValue) -> Vec<String>;
}

/// Reflection for engines that expose no host objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReflection;

impl HostReflection for NoReflection {
    fn declared_properties(&self, _value: &ScriptValue) -> Vec<String> {
        Vec::new()
    }
}
