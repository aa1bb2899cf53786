//! Debugging protocol message types.
//!
//! This module defines the wire format spoken with the remote debugger:
//! newline-delimited JSON envelopes whose payload shape is selected by a
//! command tag.
//!
//! # Protocol Overview
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | Request | Remote → Local | Breakpoints, stepping, evaluation |
//! | Response | Local → Remote | Answer to a request, echoes its `id` |
//! | Event | Local → Remote | Hits, logs, profiling (`id` = `-1`) |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Closed set of command tags |
//! | `envelope` | Envelope, payload sum type and codec |
//! | `model` | Payload records |

// ============================================================================
// Submodules
// ============================================================================

/// Command tags.
pub mod command;

/// Envelope and codec.
pub mod envelope;

/// Payload records.
pub mod model;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::DebugCommand;
pub use envelope::{Envelope, Payload};
pub use model::{
    Breakpoint, EvaluateRequest, EvaluateResponse, LogMessage, LogType, ProfilingInfo,
    StackFrame, ThreadInfo, Variable, VariableRequest, VariableResponse,
};
