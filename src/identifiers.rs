//! Type-safe identifiers for debugger entities.
//!
//! Newtype wrappers prevent mixing a context handle with a source id or a
//! breakpoint id at compile time. All of them serialize as bare integers.
//!
//! | Type | Wire form | Assigned by |
//! |------|-----------|-------------|
//! | [`ContextHandle`] | integer | Engine (also used as thread id) |
//! | [`SourceId`] | integer | Engine, reported on source parse |
//! | [`BreakpointId`] | integer | Engine, on breakpoint registration |
//! | [`MessageId`] | integer | Remote side (`-1` for events) |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// ContextHandle
// ============================================================================

/// Opaque handle of a script execution context.
///
/// Only used as a routing key; the coordinator never dereferences it.
/// A paused thread is identified by the handle of the context it runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextHandle(i64);

impl ContextHandle {
    /// Creates a handle from its raw engine value.
    #[inline]
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw engine value.
    #[inline]
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// SourceId
// ============================================================================

/// Engine identifier of a parsed script source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(i64);

impl SourceId {
    /// Creates a source id from its raw engine value.
    #[inline]
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw engine value.
    #[inline]
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// BreakpointId
// ============================================================================

/// Engine-assigned breakpoint identifier.
///
/// `0` until the breakpoint is registered with the engine. Breakpoints
/// coming from the remote side never carry a real id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreakpointId(i64);

impl BreakpointId {
    /// Id of a breakpoint that was never registered.
    pub const UNASSIGNED: Self = Self(0);

    /// Creates a breakpoint id from its raw engine value.
    #[inline]
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns `true` once the engine assigned an id.
    #[inline]
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        self.0 != 0
    }

    /// Returns the raw engine value.
    #[inline]
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BreakpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// MessageId
// ============================================================================

/// Request/response correlation id of a protocol envelope.
///
/// Responses echo the id of the request they answer. Unsolicited
/// events sent to the remote debugger carry [`MessageId::EVENT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(i64);

impl MessageId {
    /// Id of unsolicited, server-bound events.
    pub const EVENT: Self = Self(-1);

    /// Creates a message id.
    #[inline]
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns `true` if this id marks an unsolicited event.
    #[inline]
    #[must_use]
    pub const fn is_event(&self) -> bool {
        self.0 == Self::EVENT.0
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::EVENT
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_handle_serializes_as_integer() {
        let handle = ContextHandle::new(7);
        assert_eq!(serde_json::to_string(&handle).expect("serialize"), "7");

        let parsed: ContextHandle = serde_json::from_str("7").expect("parse");
        assert_eq!(parsed, handle);
    }

    #[test]
    fn test_breakpoint_id_unassigned() {
        assert!(!BreakpointId::default().is_assigned());
        assert!(!BreakpointId::UNASSIGNED.is_assigned());
        assert!(BreakpointId::new(3).is_assigned());
    }

    #[test]
    fn test_message_id_event() {
        assert!(MessageId::EVENT.is_event());
        assert!(MessageId::default().is_event());
        assert!(!MessageId::new(12).is_event());
        assert_eq!(MessageId::EVENT.to_string(), "-1");
    }
}
