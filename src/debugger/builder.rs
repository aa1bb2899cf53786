//! Builder pattern for debugger configuration.
//!
//! Provides a fluent API for configuring and creating [`Debugger`] instances.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use jsdebug_bridge::{Debugger, ScriptEngine};
//!
//! # fn example(engine: Arc<dyn ScriptEngine>) -> jsdebug_bridge::Result<()> {
//! let debugger = Debugger::builder().engine(engine).build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::{HostReflection, NoReflection, ScriptEngine};
use crate::error::{Error, Result};

use super::core::Debugger;
use super::options::DebuggerOptions;

// ============================================================================
// DebuggerBuilder
// ============================================================================

/// Builder for configuring a [`Debugger`] instance.
///
/// Use [`Debugger::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct DebuggerBuilder {
    /// Scripting engine.
    engine: Option<Arc<dyn ScriptEngine>>,
    /// Host reflection layer.
    reflection: Option<Arc<dyn HostReflection>>,
    /// Session options.
    options: DebuggerOptions,
}

impl fmt::Debug for DebuggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebuggerBuilder")
            .field("engine", &self.engine.is_some())
            .field("reflection", &self.reflection.is_some())
            .field("options", &self.options)
            .finish()
    }
}

// ============================================================================
// DebuggerBuilder Implementation
// ============================================================================

impl DebuggerBuilder {
    /// Creates a new builder with no engine.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scripting engine.
    #[inline]
    #[must_use]
    pub fn engine(mut self, engine: Arc<dyn ScriptEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Sets the host reflection layer.
    ///
    /// Without one, no object is treated as mapped.
    #[inline]
    #[must_use]
    pub fn reflection(mut self, reflection: Arc<dyn HostReflection>) -> Self {
        self.reflection = Some(reflection);
        self
    }

    /// Replaces all session options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: DebuggerOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = timeout;
        self
    }

    /// Keeps the session alive when a variable request fails.
    #[inline]
    #[must_use]
    pub fn recoverable_variable_requests(mut self) -> Self {
        self.options.recoverable_variable_requests = true;
        self
    }

    /// Builds the debugger with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no engine is set
    /// - [`Error::Config`] if the options are invalid
    pub fn build(self) -> Result<Debugger> {
        let engine = self.validate_engine()?;
        self.options.validate().map_err(Error::config)?;

        let reflection = self
            .reflection
            .unwrap_or_else(|| Arc::new(NoReflection) as Arc<dyn HostReflection>);

        Ok(Debugger::new(engine, reflection, self.options))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl DebuggerBuilder {
    /// Validates the engine configuration.
    fn validate_engine(&self) -> Result<Arc<dyn ScriptEngine>> {
        self.engine.clone().ok_or_else(|| {
            Error::config(
                "Script engine is required. Use .engine() to set it.\n\
                 Example: Debugger::builder().engine(Arc::new(my_engine))",
            )
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::debugger::testing::MockEngine;

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = DebuggerBuilder::new();
        assert!(builder.engine.is_none());
        assert!(builder.reflection.is_none());
        assert_eq!(builder.options, DebuggerOptions::default());
    }

    #[test]
    fn test_build_fails_without_engine() {
        let err = DebuggerBuilder::new().build().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("engine"));
    }

    #[test]
    fn test_build_fails_with_zero_timeout() {
        let result = DebuggerBuilder::new()
            .engine(Arc::new(MockEngine::default()))
            .connect_timeout(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_applies_options() {
        let debugger = DebuggerBuilder::new()
            .engine(Arc::new(MockEngine::default()))
            .connect_timeout(Duration::from_secs(1))
            .recoverable_variable_requests()
            .build()
            .expect("build");

        assert_eq!(debugger.options().connect_timeout, Duration::from_secs(1));
        assert!(debugger.options().recoverable_variable_requests);
        assert!(!debugger.is_running());
    }

    #[test]
    fn test_builder_is_clone() {
        let builder = DebuggerBuilder::new().engine(Arc::new(MockEngine::default()));
        let cloned = builder.clone();
        assert!(cloned.engine.is_some());
    }
}
