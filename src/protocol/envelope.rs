//! Protocol envelope and its codec.
//!
//! # Format
//!
//! One JSON object per line:
//!
//! ```json
//! { "id": 4, "command": "Evaluate", "arguments": { "expression": "x", "thread": { "id": 1 } } }
//! ```
//!
//! The shape of `arguments` depends on `command`, so decoding is done in
//! two phases: the envelope is read with `arguments` kept as raw JSON, the
//! tag is resolved, then the arguments are decoded into the tag's payload
//! type. Tags outside the closed set decode to [`Payload::Unknown`] rather
//! than failing.

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::{ContextHandle, MessageId};

use super::command::DebugCommand;
use super::model::{
    Breakpoint, EvaluateRequest, EvaluateResponse, LogMessage, ProfilingInfo, ThreadInfo,
    VariableRequest, VariableResponse,
};

// ============================================================================
// Payload
// ============================================================================

/// Tag-dependent envelope payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `AddBreakpoint`.
    AddBreakpoint(Breakpoint),
    /// `RemoveBreakpoint`.
    RemoveBreakpoint(Breakpoint),
    /// `BreakpointHit`.
    BreakpointHit(ThreadInfo),
    /// `ExceptionHit`.
    ExceptionHit(ThreadInfo),
    /// `StepHit`.
    StepHit(ThreadInfo),
    /// `StepIn`.
    StepIn(ThreadInfo),
    /// `StepOut`.
    StepOut(ThreadInfo),
    /// `StepOver`.
    StepOver(ThreadInfo),
    /// `Pause`. Debuggers commonly send it without a thread.
    Pause(Option<ThreadInfo>),
    /// `Continue`.
    Continue(ThreadInfo),
    /// `Evaluate`.
    Evaluate(EvaluateRequest),
    /// `EvaluateResponse`.
    EvaluateResponse(EvaluateResponse),
    /// `VariableRequest`.
    VariableRequest(VariableRequest),
    /// `VariableResponse`.
    VariableResponse(VariableResponse),
    /// `LogMessage`.
    LogMessage(LogMessage),
    /// `SQLExecutionRequest`, reserved.
    SqlExecutionRequest,
    /// `Profiling`.
    Profiling(ProfilingInfo),
    /// Tag outside the closed set.
    Unknown {
        /// The tag as received.
        command: String,
    },
}

impl Payload {
    /// Returns the command tag, `None` for [`Payload::Unknown`].
    #[must_use]
    pub fn command(&self) -> Option<DebugCommand> {
        let command = match self {
            Self::AddBreakpoint(_) => DebugCommand::AddBreakpoint,
            Self::RemoveBreakpoint(_) => DebugCommand::RemoveBreakpoint,
            Self::BreakpointHit(_) => DebugCommand::BreakpointHit,
            Self::ExceptionHit(_) => DebugCommand::ExceptionHit,
            Self::StepHit(_) => DebugCommand::StepHit,
            Self::StepIn(_) => DebugCommand::StepIn,
            Self::StepOut(_) => DebugCommand::StepOut,
            Self::StepOver(_) => DebugCommand::StepOver,
            Self::Pause(_) => DebugCommand::Pause,
            Self::Continue(_) => DebugCommand::Continue,
            Self::Evaluate(_) => DebugCommand::Evaluate,
            Self::EvaluateResponse(_) => DebugCommand::EvaluateResponse,
            Self::VariableRequest(_) => DebugCommand::VariableRequest,
            Self::VariableResponse(_) => DebugCommand::VariableResponse,
            Self::LogMessage(_) => DebugCommand::LogMessage,
            Self::SqlExecutionRequest => DebugCommand::SqlExecutionRequest,
            Self::Profiling(_) => DebugCommand::Profiling,
            Self::Unknown { .. } => return None,
        };
        Some(command)
    }

    /// Returns the wire tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Unknown { command } => command.as_str(),
            other => other.command().map_or("", |command| command.as_str()),
        }
    }

    /// Returns the target thread of a thread-scoped request.
    #[must_use]
    pub fn target_thread(&self) -> Option<ContextHandle> {
        match self {
            Self::Evaluate(request) => Some(request.thread.id),
            Self::VariableRequest(request) => Some(request.thread.id),
            _ => None,
        }
    }

    /// Decodes the raw arguments of a known command.
    fn decode(command: DebugCommand, arguments: Value) -> Result<Self> {
        let payload = match command {
            DebugCommand::AddBreakpoint => Self::AddBreakpoint(from_arguments(command, arguments)?),
            DebugCommand::RemoveBreakpoint => {
                Self::RemoveBreakpoint(from_arguments(command, arguments)?)
            }
            DebugCommand::BreakpointHit => Self::BreakpointHit(from_arguments(command, arguments)?),
            DebugCommand::ExceptionHit => Self::ExceptionHit(from_arguments(command, arguments)?),
            DebugCommand::StepHit => Self::StepHit(from_arguments(command, arguments)?),
            DebugCommand::StepIn => Self::StepIn(from_arguments(command, arguments)?),
            DebugCommand::StepOut => Self::StepOut(from_arguments(command, arguments)?),
            DebugCommand::StepOver => Self::StepOver(from_arguments(command, arguments)?),
            DebugCommand::Pause => Self::Pause(from_arguments(command, arguments)?),
            DebugCommand::Continue => Self::Continue(from_arguments(command, arguments)?),
            DebugCommand::Evaluate => Self::Evaluate(from_arguments(command, arguments)?),
            DebugCommand::EvaluateResponse => {
                Self::EvaluateResponse(from_arguments(command, arguments)?)
            }
            DebugCommand::VariableRequest => {
                Self::VariableRequest(from_arguments(command, arguments)?)
            }
            DebugCommand::VariableResponse => {
                Self::VariableResponse(from_arguments(command, arguments)?)
            }
            DebugCommand::LogMessage => Self::LogMessage(from_arguments(command, arguments)?),
            DebugCommand::SqlExecutionRequest => Self::SqlExecutionRequest,
            DebugCommand::Profiling => Self::Profiling(from_arguments(command, arguments)?),
        };
        Ok(payload)
    }

    /// Encodes the payload into raw arguments.
    fn arguments(&self) -> Result<Value> {
        let value = match self {
            Self::AddBreakpoint(bp) | Self::RemoveBreakpoint(bp) => serde_json::to_value(bp)?,
            Self::BreakpointHit(thread)
            | Self::ExceptionHit(thread)
            | Self::StepHit(thread)
            | Self::StepIn(thread)
            | Self::StepOut(thread)
            | Self::StepOver(thread)
            | Self::Continue(thread) => serde_json::to_value(thread)?,
            Self::Pause(thread) => serde_json::to_value(thread)?,
            Self::Evaluate(request) => serde_json::to_value(request)?,
            Self::EvaluateResponse(response) => serde_json::to_value(response)?,
            Self::VariableRequest(request) => serde_json::to_value(request)?,
            Self::VariableResponse(response) => serde_json::to_value(response)?,
            Self::LogMessage(record) => serde_json::to_value(record)?,
            Self::Profiling(info) => serde_json::to_value(info)?,
            Self::SqlExecutionRequest | Self::Unknown { .. } => Value::Null,
        };
        Ok(value)
    }
}

/// Decodes the arguments of `command` into its payload type.
fn from_arguments<T: DeserializeOwned>(command: DebugCommand, arguments: Value) -> Result<T> {
    serde_json::from_value(arguments)
        .map_err(|e| Error::protocol(format!("invalid {command} arguments: {e}")))
}

// ============================================================================
// RawEnvelope
// ============================================================================

/// Envelope with undecoded arguments (first decoding phase).
#[derive(Debug, Serialize, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    id: MessageId,
    command: String,
    #[serde(default)]
    arguments: Value,
}

// ============================================================================
// Envelope
// ============================================================================

/// One protocol message.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Correlation id, [`MessageId::EVENT`] for unsolicited events.
    pub id: MessageId,
    /// Tag-dependent payload.
    pub payload: Payload,
}

impl Envelope {
    /// Creates an envelope answering request `id`.
    #[inline]
    #[must_use]
    pub fn new(id: MessageId, payload: Payload) -> Self {
        Self { id, payload }
    }

    /// Creates an unsolicited event envelope.
    #[inline]
    #[must_use]
    pub fn event(payload: Payload) -> Self {
        Self::new(MessageId::EVENT, payload)
    }

    /// Encodes the envelope as a single JSON line (without terminator).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if a payload field cannot be serialized.
    pub fn encode(&self) -> Result<String> {
        let raw = RawEnvelope {
            id: self.id,
            command: self.payload.tag().to_string(),
            arguments: self.payload.arguments()?,
        };
        Ok(serde_json::to_string(&raw)?)
    }

    /// Decodes an envelope from one JSON line.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the line is not a JSON envelope
    /// - [`Error::Protocol`] if the arguments do not match the tag's shape
    pub fn decode(text: &str) -> Result<Self> {
        let raw: RawEnvelope = serde_json::from_str(text)?;

        let payload = match DebugCommand::from_tag(&raw.command) {
            Some(command) => Payload::decode(command, raw.arguments)?,
            None => Payload::Unknown {
                command: raw.command,
            },
        };

        Ok(Self {
            id: raw.id,
            payload,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::protocol::model::{LogType, StackFrame, Variable};

    fn thread() -> ThreadInfo {
        let mut frame = StackFrame::new(1, "f1", "Test.js", 4);
        frame.variables = vec![
            Variable::new("this", "[object Window]"),
            Variable::argument("a", "1"),
        ];
        ThreadInfo::new(
            ContextHandle::new(9),
            "main",
            Some("TypeError".into()),
            vec![frame, StackFrame::new(2, "f2", "Test.js", 8)],
        )
    }

    fn sample_payloads() -> Vec<Payload> {
        vec![
            Payload::AddBreakpoint(Breakpoint::new("app.js", 10, 0).with_condition("i == 3")),
            Payload::RemoveBreakpoint(Breakpoint::new("app.js", 10, 0)),
            Payload::BreakpointHit(thread()),
            Payload::ExceptionHit(thread()),
            Payload::StepHit(thread()),
            Payload::StepIn(ThreadInfo::reference(ContextHandle::new(9))),
            Payload::StepOut(ThreadInfo::reference(ContextHandle::new(9))),
            Payload::StepOver(ThreadInfo::reference(ContextHandle::new(9))),
            Payload::Pause(None),
            Payload::Pause(Some(ThreadInfo::reference(ContextHandle::new(2)))),
            Payload::Continue(ThreadInfo::reference(ContextHandle::new(9))),
            Payload::Evaluate(EvaluateRequest {
                expression: "1+1".into(),
                thread: ThreadInfo::reference(ContextHandle::new(9)),
            }),
            Payload::EvaluateResponse(EvaluateResponse::success("(1+1) = 2")),
            Payload::VariableRequest(VariableRequest {
                variable_name: "obj".into(),
                thread: ThreadInfo::reference(ContextHandle::new(9)),
            }),
            Payload::VariableResponse(VariableResponse {
                variables: vec![Variable::new("0", "a"), Variable::new("length", "1")],
                thread: ThreadInfo::reference(ContextHandle::new(9)),
            }),
            Payload::LogMessage(LogMessage::new(LogType::Warning, "careful", "app.js", "")),
            Payload::SqlExecutionRequest,
            Payload::Profiling(ProfilingInfo::from_fragments(["{}"])),
        ]
    }

    #[test]
    fn test_every_command_survives_encode_decode() {
        let payloads = sample_payloads();
        let covered: Vec<_> = payloads.iter().filter_map(Payload::command).collect();
        for command in DebugCommand::ALL {
            assert!(covered.contains(&command), "no sample for {command}");
        }

        for (index, payload) in payloads.into_iter().enumerate() {
            let envelope = Envelope::new(MessageId::new(index as i64), payload);
            let text = envelope.encode().expect("encode");
            assert!(!text.contains('\n'));
            let decoded = Envelope::decode(&text).expect("decode");
            assert_eq!(decoded, envelope);
        }
    }

    #[test]
    fn test_decode_arguments_before_command() {
        let text = r#"{"arguments":{"expression":"x","thread":{"id":3}},"id":7,"command":"Evaluate"}"#;
        let envelope = Envelope::decode(text).expect("decode");

        assert_eq!(envelope.id, MessageId::new(7));
        assert_eq!(envelope.payload.target_thread(), Some(ContextHandle::new(3)));
        match envelope.payload {
            Payload::Evaluate(request) => assert_eq!(request.expression, "x"),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_decode_unknown_command_is_not_an_error() {
        let envelope =
            Envelope::decode(r#"{"id":1,"command":"Restart","arguments":{}}"#).expect("decode");
        assert_eq!(
            envelope.payload,
            Payload::Unknown {
                command: "Restart".into()
            }
        );
        assert_eq!(envelope.payload.command(), None);
    }

    #[test]
    fn test_decode_payload_shape_mismatch() {
        let err = Envelope::decode(r#"{"id":1,"command":"AddBreakpoint","arguments":{"line":"x"}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_decode_malformed_line() {
        let err = Envelope::decode("not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_only_requests_target_a_thread() {
        let scoped: Vec<_> = sample_payloads()
            .into_iter()
            .filter(|payload| payload.target_thread().is_some())
            .filter_map(|payload| payload.command())
            .collect();
        assert_eq!(
            scoped,
            vec![DebugCommand::Evaluate, DebugCommand::VariableRequest]
        );
    }

    #[test]
    fn test_event_envelope_id() {
        let text = Envelope::event(Payload::LogMessage(LogMessage::console("hi", "", "")))
            .encode()
            .expect("encode");
        let value: Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["id"], -1);
        assert_eq!(value["command"], "LogMessage");
        assert_eq!(value["arguments"]["type"], 16);
    }

    #[test]
    fn test_pause_without_arguments() {
        let envelope = Envelope::decode(r#"{"id":3,"command":"Pause"}"#).expect("decode");
        assert_eq!(envelope.payload, Payload::Pause(None));
    }
}
