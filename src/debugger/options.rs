//! Debugger session configuration.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use jsdebug_bridge::DebuggerOptions;
//!
//! let options = DebuggerOptions::new()
//!     .with_connect_timeout(Duration::from_secs(5))
//!     .with_recoverable_variable_requests();
//!
//! assert!(options.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::transport::DEFAULT_CONNECT_TIMEOUT;

// ============================================================================
// DebuggerOptions
// ============================================================================

/// Debugger session options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebuggerOptions {
    /// Timeout for reaching the remote debugger.
    pub connect_timeout: Duration,

    /// Answer a failing variable request with an empty list instead of
    /// ending the session.
    pub recoverable_variable_requests: bool,
}

impl Default for DebuggerOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl DebuggerOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            recoverable_variable_requests: false,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl DebuggerOptions {
    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Keeps the session alive when a variable request fails.
    #[inline]
    #[must_use]
    pub fn with_recoverable_variable_requests(mut self) -> Self {
        self.recoverable_variable_requests = true;
        self
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.connect_timeout.is_zero() {
            return Err("Connect timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_default() {
        let options = DebuggerOptions::new();
        assert_eq!(options.connect_timeout, Duration::from_secs(3));
        assert!(!options.recoverable_variable_requests);
        assert_eq!(options, DebuggerOptions::default());
    }

    #[test]
    fn test_builder_chain() {
        let options = DebuggerOptions::new()
            .with_connect_timeout(Duration::from_millis(250))
            .with_recoverable_variable_requests();

        assert_eq!(options.connect_timeout, Duration::from_millis(250));
        assert!(options.recoverable_variable_requests);
    }

    #[test]
    fn test_validate_zero_timeout() {
        let options = DebuggerOptions::new().with_connect_timeout(Duration::ZERO);
        assert!(options.validate().is_err());
    }
}
