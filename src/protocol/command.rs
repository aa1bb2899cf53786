//! Command tags of the debugging protocol.
//!
//! The tag set is closed. Each tag statically decides the shape of the
//! envelope's `arguments` object (see [`Payload`](super::Payload)).
//!
//! # Commands
//!
//! | Direction | Commands |
//! |-----------|----------|
//! | Remote → Local | `AddBreakpoint`, `RemoveBreakpoint`, `StepIn`, `StepOut`, `StepOver`, `Pause`, `Continue`, `Evaluate`, `VariableRequest`, `SQLExecutionRequest` |
//! | Local → Remote | `BreakpointHit`, `ExceptionHit`, `StepHit`, `EvaluateResponse`, `VariableResponse`, `LogMessage`, `Profiling` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// DebugCommand
// ============================================================================

/// All command tags sent or received over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebugCommand {
    /// Adds a breakpoint to every context.
    AddBreakpoint,
    /// Removes a breakpoint from every context.
    RemoveBreakpoint,
    /// A thread stopped on a breakpoint.
    BreakpointHit,
    /// A thread stopped on an exception.
    ExceptionHit,
    /// A thread stopped after a step.
    StepHit,
    /// Steps into the next statement.
    StepIn,
    /// Steps out of the current function.
    StepOut,
    /// Steps over the next statement.
    StepOver,
    /// Breaks every context immediately.
    Pause,
    /// Resumes a parked thread.
    Continue,
    /// Evaluates an expression on a parked thread.
    Evaluate,
    /// Result of an evaluation.
    EvaluateResponse,
    /// Requests the members of a variable.
    VariableRequest,
    /// Members of a variable.
    VariableResponse,
    /// Log record.
    LogMessage,
    /// Reserved, never handled.
    #[serde(rename = "SQLExecutionRequest")]
    SqlExecutionRequest,
    /// Profiler output.
    Profiling,
}

impl DebugCommand {
    /// Every command tag, in wire declaration order.
    pub const ALL: [Self; 17] = [
        Self::AddBreakpoint,
        Self::RemoveBreakpoint,
        Self::BreakpointHit,
        Self::ExceptionHit,
        Self::StepHit,
        Self::StepIn,
        Self::StepOut,
        Self::StepOver,
        Self::Pause,
        Self::Continue,
        Self::Evaluate,
        Self::EvaluateResponse,
        Self::VariableRequest,
        Self::VariableResponse,
        Self::LogMessage,
        Self::SqlExecutionRequest,
        Self::Profiling,
    ];

    /// Returns the exact wire tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AddBreakpoint => "AddBreakpoint",
            Self::RemoveBreakpoint => "RemoveBreakpoint",
            Self::BreakpointHit => "BreakpointHit",
            Self::ExceptionHit => "ExceptionHit",
            Self::StepHit => "StepHit",
            Self::StepIn => "StepIn",
            Self::StepOut => "StepOut",
            Self::StepOver => "StepOver",
            Self::Pause => "Pause",
            Self::Continue => "Continue",
            Self::Evaluate => "Evaluate",
            Self::EvaluateResponse => "EvaluateResponse",
            Self::VariableRequest => "VariableRequest",
            Self::VariableResponse => "VariableResponse",
            Self::LogMessage => "LogMessage",
            Self::SqlExecutionRequest => "SQLExecutionRequest",
            Self::Profiling => "Profiling",
        }
    }

    /// Returns the tag for a wire string, if it belongs to the closed set.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.as_str() == tag)
    }
}

impl fmt::Display for DebugCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebugCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s).ok_or_else(|| Error::unknown_command(s))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_match_serde_names() {
        for command in DebugCommand::ALL {
            let json = serde_json::to_string(&command).expect("serialize");
            assert_eq!(json, format!("\"{}\"", command.as_str()));
        }
    }

    #[test]
    fn test_sql_execution_request_tag() {
        assert_eq!(
            DebugCommand::SqlExecutionRequest.as_str(),
            "SQLExecutionRequest"
        );
        assert_eq!(
            DebugCommand::from_tag("SQLExecutionRequest"),
            Some(DebugCommand::SqlExecutionRequest)
        );
    }

    #[test]
    fn test_from_str_unknown() {
        let err = "Restart".parse::<DebugCommand>().unwrap_err();
        assert!(matches!(err, Error::UnknownCommand { .. }));
        assert_eq!(
            "StepOver".parse::<DebugCommand>().expect("known tag"),
            DebugCommand::StepOver
        );
    }
}
