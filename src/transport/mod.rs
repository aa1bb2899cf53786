//! TCP transport layer.
//!
//! This module handles communication with the remote debugger over a
//! plain TCP socket carrying one JSON envelope per line.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Debugger       │                              │  Remote         │
//! │  (engine side)  │         TCP, lines           │  debugger       │
//! │  Connection     │─────────────────────────────►│  (server)       │
//! │  + listener     │◄─────────────────────────────│                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Connection::connect` - Connect with timeout, signal "established"
//! 2. Event loop delivers each inbound line to the listener
//! 3. `Connection::send_message` - Queue outbound lines
//! 4. `Connection::disconnect` or any I/O failure - Signal "lost" once

// ============================================================================
// Submodules
// ============================================================================

/// TCP connection and event loop.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, ConnectionListener, DEFAULT_CONNECT_TIMEOUT};
