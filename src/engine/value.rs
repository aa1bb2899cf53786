//! Values produced by script evaluation.

// ============================================================================
// Imports
// ============================================================================

use chrono::NaiveDateTime;

// ============================================================================
// ScriptValue
// ============================================================================

/// Result of evaluating a script expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    /// `null`.
    Null,
    /// `undefined`.
    Undefined,
    /// Boolean.
    Boolean(bool),
    /// Number.
    Number(f64),
    /// String.
    String(String),
    /// Date, in engine-local time.
    Date(NaiveDateTime),
    /// Array.
    Array(Vec<ScriptValue>),
    /// Host object exposed through the reflection layer.
    Object {
        /// Class name of the host object.
        class_name: String,
    },
    /// Native script object with no host counterpart.
    Unmapped,
}

impl ScriptValue {
    /// Returns `true` for `null` and `undefined`.
    #[inline]
    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// Returns `true` for the boolean `true`.
    #[inline]
    #[must_use]
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Boolean(true))
    }

    /// Returns the number, if this is one.
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string elements of an array, skipping non-strings.
    #[must_use]
    pub fn string_elements(&self) -> Vec<String> {
        match self {
            Self::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Self::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl From<bool> for ScriptValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for ScriptValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(ScriptValue::Null.is_nullish());
        assert!(ScriptValue::Undefined.is_nullish());
        assert!(!ScriptValue::Unmapped.is_nullish());
        assert!(ScriptValue::from(true).is_true());
        assert!(!ScriptValue::from("true").is_true());
        assert_eq!(ScriptValue::from(2.0).as_number(), Some(2.0));
        assert_eq!(ScriptValue::Null.as_number(), None);
    }

    #[test]
    fn test_string_elements() {
        let keys = ScriptValue::Array(vec!["a".into(), ScriptValue::Number(1.0), "b".into()]);
        assert_eq!(keys.string_elements(), vec!["a", "b"]);
        assert!(ScriptValue::from("a").string_elements().is_empty());
    }
}
