//! Stack and variable introspection of a parked thread.
//!
//! Everything here runs on the parked engine thread and reads state by
//! re-entrant evaluation through [`ScriptEngine`].
//!
//! # Stack Trace Grammar
//!
//! One frame per line:
//!
//! ```text
//! #<index> <name>(<args>) at <file>:<line>
//! ```
//!
//! Frames with an empty file are synthetic wrappers and are dropped.
//!
//! # Rendering
//!
//! | Value | Rendered as |
//! |-------|-------------|
//! | `null`, `undefined` | `<null>` |
//! | Unmapped script object | `[object <constructor name>]` |
//! | Array | `[object Array]` |
//! | Date | `yyyy-MM-dd HH:mm:ss` |
//! | Number, string, boolean | natural text |
//! | Host object | `[object <class name>]` |

// ============================================================================
// Imports
// ============================================================================

use std::sync::OnceLock;

use regex::Regex;
use rustc_hash::FxHashSet;
use tracing::{trace, warn};

use crate::engine::{HostReflection, ScriptEngine, ScriptValue};
use crate::error::Result;
use crate::identifiers::ContextHandle;
use crate::protocol::{StackFrame, Variable};

// ============================================================================
// Constants
// ============================================================================

/// Receiver name, always listed first.
const THIS: &str = "this";

/// Implicit arguments object, never listed itself.
const ARGUMENTS: &str = "arguments";

/// Rendering of absent values.
const NULL_DESCRIPTION: &str = "<null>";

/// Fallback name of a script object whose constructor cannot be read.
const UNMAPPED_CLASS: &str = "JavaScript";

/// Date rendering pattern.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// Stack Frames
// ============================================================================

/// Returns the frame grammar.
fn frame_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)#(\d+)\s*(\w*).*at\s+(.*):(\d+)").expect("valid regex"))
}

/// Parses a raw stack trace into frames, innermost first.
///
/// Lines that do not match the grammar and frames without a file are
/// skipped; the order of the remaining frames is preserved.
#[must_use]
pub fn parse_stack_trace(trace: &str) -> Vec<StackFrame> {
    frame_pattern()
        .captures_iter(trace)
        .filter_map(|caps| {
            let file_name = caps.get(3)?.as_str().trim();
            if file_name.is_empty() {
                return None;
            }
            let id = caps.get(1)?.as_str().parse().ok()?;
            let line = caps.get(4)?.as_str().parse().ok()?;
            let name = caps.get(2).map_or("", |m| m.as_str());
            Some(StackFrame::new(id, name, file_name, line))
        })
        .collect()
}

// ============================================================================
// Rendering
// ============================================================================

/// Renders a value that needs no engine round-trip.
fn describe_plain(value: &ScriptValue) -> String {
    match value {
        ScriptValue::Null | ScriptValue::Undefined => NULL_DESCRIPTION.to_string(),
        ScriptValue::Boolean(b) => b.to_string(),
        ScriptValue::Number(n) => format_number(*n),
        ScriptValue::String(s) => s.clone(),
        ScriptValue::Date(date) => date.format(DATE_TIME_FORMAT).to_string(),
        ScriptValue::Array(_) => "[object Array]".to_string(),
        ScriptValue::Object { class_name } => format!("[object {class_name}]"),
        ScriptValue::Unmapped => format!("[object {UNMAPPED_CLASS}]"),
    }
}

/// Formats a number the way scripts print it.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// Renders `value`, the result of evaluating `expression`.
///
/// Unmapped script objects are resolved to their constructor name by
/// evaluating `<expression>.constructor.name`.
pub fn describe(
    engine: &dyn ScriptEngine,
    context: ContextHandle,
    expression: &str,
    value: &ScriptValue,
) -> String {
    if !matches!(value, ScriptValue::Unmapped) {
        return describe_plain(value);
    }

    let script = format!("{expression}.constructor.name");
    match engine.evaluate_script(context, &script) {
        Ok(name) if !name.is_nullish() => format!("[object {}]", describe_plain(&name)),
        Ok(_) => describe_plain(value),
        Err(e) => {
            warn!(context = %context, expression, error = %e, "Failed to read constructor name");
            describe_plain(value)
        }
    }
}

/// Renders an Evaluate result: the expression echoed, then its value.
pub fn describe_evaluation(
    engine: &dyn ScriptEngine,
    context: ContextHandle,
    expression: &str,
    value: &ScriptValue,
) -> String {
    let echoed = format!("({expression})");
    let description = describe(engine, context, &echoed, value);
    format!("{echoed} = {description}")
}

// ============================================================================
// Frame Variables
// ============================================================================

/// Builds the variable list of the innermost frame.
///
/// `this` comes first, then the detected function arguments in argument
/// order, then the remaining locals sorted case-insensitively. A variable
/// that fails to evaluate is logged and left out.
///
/// # Errors
///
/// Returns an error if the scope names cannot be read.
pub fn frame_variables(engine: &dyn ScriptEngine, context: ContextHandle) -> Result<Vec<Variable>> {
    let scope = engine.property_names_of_current_scope(context)?;
    let has_arguments = scope.iter().any(|name| name == ARGUMENTS);

    let mut names: Vec<String> = scope
        .into_iter()
        .filter(|name| name != THIS && name != ARGUMENTS)
        .collect();
    names.sort_by_key(|name| name.to_lowercase());
    names.dedup();

    let arguments = if has_arguments {
        promote_arguments(engine, context, &mut names)
    } else {
        FxHashSet::default()
    };

    let mut variables = Vec::with_capacity(names.len() + 1);
    let ordered = std::iter::once(THIS).chain(names.iter().map(String::as_str));

    for name in ordered {
        let value = match engine.evaluate_script(context, name) {
            Ok(value) => value,
            Err(e) => {
                warn!(context = %context, variable = name, error = %e, "Skipping variable");
                continue;
            }
        };

        variables.push(Variable {
            name: name.to_string(),
            value: describe(engine, context, name, &value),
            is_argument: arguments.contains(name),
        });
    }

    Ok(variables)
}

/// Moves the names bound to `arguments[i]` to the front, in argument order.
///
/// Every name equal to an argument is promoted, so a local copy of a
/// parameter is tagged along with the parameter. Returns the promoted names.
fn promote_arguments(
    engine: &dyn ScriptEngine,
    context: ContextHandle,
    names: &mut Vec<String>,
) -> FxHashSet<String> {
    let mut arguments = FxHashSet::default();

    let length = match engine.evaluate_script(context, "arguments.length") {
        Ok(value) => value.as_number().unwrap_or(0.0),
        Err(e) => {
            warn!(context = %context, error = %e, "Failed to read arguments length");
            return arguments;
        }
    };

    let mut promoted = 0;
    for index in 0..(length.max(0.0) as usize) {
        let remaining = names.split_off(promoted);
        let (matched, rest): (Vec<_>, Vec<_>) = remaining.into_iter().partition(|name| {
            let script = format!("arguments[{index}] === {name}");
            matches!(engine.evaluate_script(context, &script), Ok(v) if v.is_true())
        });

        for name in &matched {
            trace!(context = %context, index, name = %name, "Argument detected");
            arguments.insert(name.clone());
        }

        promoted += matched.len();
        names.extend(matched);
        names.extend(rest);
    }

    arguments
}

// ============================================================================
// Object Members
// ============================================================================

/// Returns the expression reading `property` of `object`.
///
/// Purely numeric properties are indexed, others use dot access.
#[must_use]
pub fn member_expression(object: &str, property: &str) -> String {
    if !property.is_empty() && property.bytes().all(|b| b.is_ascii_digit()) {
        format!("{object}[{property}]")
    } else {
        format!("{object}.{property}")
    }
}

/// Lists and renders the members of the variable named `variable_name`.
///
/// Host-mapped objects list their declared properties; other values list
/// `Object.keys`.
///
/// # Errors
///
/// Returns the first evaluation error; no partial list is produced.
pub fn object_members(
    engine: &dyn ScriptEngine,
    reflection: &dyn HostReflection,
    context: ContextHandle,
    variable_name: &str,
) -> Result<Vec<Variable>> {
    let probe = format!("{variable_name}.isMappedObject");
    let is_mapped = engine.evaluate_script(context, &probe)?.is_true();

    let properties = if is_mapped {
        let object = engine.evaluate_script(context, variable_name)?;
        reflection.declared_properties(&object)
    } else {
        engine
            .evaluate_script(context, &format!("Object.keys({variable_name});"))?
            .string_elements()
    };

    properties
        .into_iter()
        .map(|property| {
            let script = member_expression(variable_name, &property);
            let value = engine.evaluate_script(context, &script)?;
            let description = describe(engine, context, &script, &value);
            Ok(Variable::new(property, description))
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
