//! jsdebug-bridge - Remote debugging for embedded JavaScript engines.
//!
//! This library lets an external debugger pause, inspect and step through
//! a scripting engine running inside a host process, over a line-framed
//! TCP/JSON connection.
//!
//! # Architecture
//!
//! The library follows a client model:
//!
//! - **Local End (Rust)**: Connects out, reports hits, answers requests
//! - **Remote End (Debugger)**: Sets breakpoints, resumes, evaluates
//!
//! Key design principles:
//!
//! - Engine threads that hit a breakpoint park inside the callback until released
//! - Evaluation for a parked thread runs on that thread, not on the socket reader
//! - Losing the connection releases every parked thread
//! - The engine is reached only through the [`ScriptEngine`] trait
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use jsdebug_bridge::{Debugger, Result, ScriptEngine};
//!
//! async fn run(engine: Arc<dyn ScriptEngine>) -> Result<()> {
//!     let debugger = Debugger::builder().engine(engine).build()?;
//!
//!     // Connect to the remote debugger
//!     debugger.attach("127.0.0.1", 9222).await?;
//!
//!     // Engine callbacks then report sources and hits:
//!     // debugger.source_parsed(context, "app.js", source_id);
//!     // debugger.handle_breakpoint_hit(context);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`debugger`] | Session coordinator: [`Debugger`], [`DebuggerBuilder`] |
//! | [`engine`] | Engine collaborator traits and [`ScriptValue`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Wire message types and codec |
//! | [`transport`] | TCP transport layer |

// ============================================================================
// Modules
// ============================================================================

/// Session coordinator.
///
/// Use [`Debugger::builder()`] to create a configured debugger instance.
pub mod debugger;

/// Scripting engine collaborator interface.
///
/// Implement [`ScriptEngine`] (and optionally [`HostReflection`]) for the
/// embedded engine.
pub mod engine;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for engine entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Debugging protocol message types.
///
/// Envelope, payload records and the two-phase codec.
pub mod protocol;

/// TCP transport layer.
///
/// Line-framed connection to the remote debugger.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Debugger types
pub use debugger::{Debugger, DebuggerBuilder, DebuggerOptions};

// Engine types
pub use engine::{HostReflection, NoReflection, ScriptEngine, ScriptValue};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{BreakpointId, ContextHandle, MessageId, SourceId};

// Protocol types
pub use protocol::{
    Breakpoint, DebugCommand, Envelope, EvaluateRequest, EvaluateResponse, LogMessage, LogType,
    Payload, ProfilingInfo, StackFrame, ThreadInfo, Variable, VariableRequest, VariableResponse,
};
