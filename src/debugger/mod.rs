//! Remote debugging session coordinator.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Debugger`] | Session coordinator and engine callback target |
//! | [`DebuggerBuilder`] | Fluent configuration builder |
//! | [`DebuggerOptions`] | Session options |
//! | [`DebuggerContext`] | Per-context monitor and state |
//!
//! # Control Flow
//!
//! ```text
//! engine hit ──► park ──► introspection ──► codec ──► connection ──► remote
//! remote ──► connection ──► codec ──► routing ──► engine call ──► release
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for debugger configuration.
pub mod builder;

/// Per-context monitor and state.
pub mod context;

/// Session coordinator.
pub mod core;

/// Stack and variable introspection.
pub mod introspection;

/// Session options.
pub mod options;

mod park;
mod profiler;
mod routing;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::DebuggerBuilder;
pub use context::{ContextState, DebuggerContext};
pub use self::core::Debugger;
pub use options::DebuggerOptions;
