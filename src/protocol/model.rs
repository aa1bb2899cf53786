//! Payload records carried in the `arguments` field of an envelope.
//!
//! Field names follow the wire format (camelCase). Optional fields are
//! omitted when absent.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identifiers::{BreakpointId, ContextHandle};

// ============================================================================
// Breakpoint
// ============================================================================

/// A source breakpoint.
///
/// Equality only looks at file, line and column: a breakpoint coming from
/// the remote side never carries the engine id, yet must match the
/// registered one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    /// Source file name.
    #[serde(rename = "file", alias = "fileName")]
    pub file_name: String,
    /// 1-based line.
    pub line: u32,
    /// Column.
    #[serde(default)]
    pub column: u32,
    /// Condition expression, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Number of hits before the breakpoint breaks execution.
    #[serde(default)]
    pub hit_count: u32,
    /// Engine id, assigned on registration.
    #[serde(default)]
    pub id: BreakpointId,
}

impl Breakpoint {
    /// Creates an unregistered breakpoint.
    #[inline]
    #[must_use]
    pub fn new(file_name: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file_name: file_name.into(),
            line,
            column,
            ..Default::default()
        }
    }

    /// Sets the condition expression.
    #[inline]
    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Sets the hit count threshold.
    #[inline]
    #[must_use]
    pub fn with_hit_count(mut self, hit_count: u32) -> Self {
        self.hit_count = hit_count;
        self
    }

    /// Returns the engine's 0-based line.
    #[inline]
    #[must_use]
    pub fn engine_line(&self) -> u32 {
        self.line.saturating_sub(1)
    }
}

impl PartialEq for Breakpoint {
    fn eq(&self, other: &Self) -> bool {
        self.file_name == other.file_name && self.line == other.line && self.column == other.column
    }
}

impl Eq for Breakpoint {}

// ============================================================================
// Variable
// ============================================================================

/// A rendered variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Rendered value.
    pub value: String,
    /// Whether the variable is a function argument.
    #[serde(default)]
    pub is_argument: bool,
}

impl Variable {
    /// Creates a plain variable.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            is_argument: false,
        }
    }

    /// Creates a variable tagged as function argument.
    #[inline]
    #[must_use]
    pub fn argument(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            is_argument: true,
            ..Self::new(name, value)
        }
    }
}

// ============================================================================
// StackFrame
// ============================================================================

/// One frame of a paused thread's call stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    /// Frame index as reported by the engine.
    pub id: u32,
    /// Function name, empty for anonymous frames.
    #[serde(default)]
    pub name: String,
    /// Source file name.
    pub file_name: String,
    /// Line number.
    pub line: u32,
    /// Local variables (frame 0 only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,
}

impl StackFrame {
    /// Creates a frame without variables.
    #[inline]
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, file_name: impl Into<String>, line: u32) -> Self {
        Self {
            id,
            name: name.into(),
            file_name: file_name.into(),
            line,
            variables: Vec::new(),
        }
    }
}

// ============================================================================
// ThreadInfo
// ============================================================================

/// A paused engine thread.
///
/// Remote commands reference a thread only by `id`; the other fields are
/// filled in outbound hit events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThreadInfo {
    /// Thread id (the context handle).
    pub id: ContextHandle,
    /// Human-readable thread name.
    pub name: String,
    /// Pause cause, `None` for a plain breakpoint hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Stack frames, innermost first.
    pub stack_frames: Vec<StackFrame>,
}

impl ThreadInfo {
    /// Creates a thread reference carrying only an id.
    #[inline]
    #[must_use]
    pub fn reference(id: ContextHandle) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Creates a paused thread record.
    #[inline]
    #[must_use]
    pub fn new(
        id: ContextHandle,
        name: impl Into<String>,
        message: Option<String>,
        stack_frames: Vec<StackFrame>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            message,
            stack_frames,
        }
    }

    /// Returns the innermost frame.
    #[inline]
    #[must_use]
    pub fn top_frame(&self) -> Option<&StackFrame> {
        self.stack_frames.first()
    }
}

// ============================================================================
// Evaluate
// ============================================================================

/// Expression evaluation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    /// Expression source.
    pub expression: String,
    /// Target thread.
    #[serde(alias = "threadInfo")]
    pub thread: ThreadInfo,
}

/// Expression evaluation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateResponse {
    /// Rendered value, or the error message on failure.
    pub value: String,
    /// Whether the evaluation succeeded.
    pub success: bool,
}

impl EvaluateResponse {
    /// Creates a success response.
    #[inline]
    #[must_use]
    pub fn success(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            success: true,
        }
    }

    /// Creates a failure response.
    #[inline]
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            value: message.into(),
            success: false,
        }
    }
}

// ============================================================================
// Variable request
// ============================================================================

/// Request for the members of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableRequest {
    /// Expression naming the variable.
    pub variable_name: String,
    /// Target thread.
    #[serde(alias = "threadInfo")]
    pub thread: ThreadInfo,
}

/// Members of a requested variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableResponse {
    /// Rendered members.
    pub variables: Vec<Variable>,
    /// Thread the request ran on.
    #[serde(alias = "threadInfo")]
    pub thread: ThreadInfo,
}

// ============================================================================
// LogMessage
// ============================================================================

/// Category of a log record, encoded as its byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum LogType {
    /// Error.
    Error = 1,
    /// Warning.
    Warning = 2,
    /// Debug.
    Debug = 4,
    /// Trace.
    Trace = 8,
    /// Script console output.
    Console = 16,
    /// Telemetry.
    Telemetry = 32,
}

impl From<LogType> for u8 {
    fn from(value: LogType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for LogType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Error),
            2 => Ok(Self::Warning),
            4 => Ok(Self::Debug),
            8 => Ok(Self::Trace),
            16 => Ok(Self::Console),
            32 => Ok(Self::Telemetry),
            other => Err(Error::protocol(format!("invalid log type: {other}"))),
        }
    }
}

/// A log record forwarded to the remote debugger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    /// Category.
    #[serde(rename = "type")]
    pub log_type: LogType,
    /// Message text.
    pub message: String,
    /// Origin of the message.
    #[serde(default)]
    pub source: String,
    /// Additional details.
    #[serde(default)]
    pub details: String,
}

impl LogMessage {
    /// Creates a log record.
    #[inline]
    #[must_use]
    pub fn new(
        log_type: LogType,
        message: impl Into<String>,
        source: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            log_type,
            message: message.into(),
            source: source.into(),
            details: details.into(),
        }
    }

    /// Creates a console record.
    #[inline]
    #[must_use]
    pub fn console(
        message: impl Into<String>,
        source: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::new(LogType::Console, message, source, details)
    }
}

// ============================================================================
// ProfilingInfo
// ============================================================================

/// Profiler output of every context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilingInfo {
    /// JSON array text, one element per context.
    pub data: String,
}

impl ProfilingInfo {
    /// Joins per-context JSON fragments into one JSON array.
    #[must_use]
    pub fn from_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = fragments
            .into_iter()
            .map(|fragment| fragment.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");

        Self {
            data: format!("[{joined}]"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
