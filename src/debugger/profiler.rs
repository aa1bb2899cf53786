//! Profiler control.
//!
//! Profiling and stepping are mutually exclusive on the engine: starting
//! the profiler detaches the debugger instrumentation from every context,
//! stopping it re-attaches.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, info};

use crate::protocol::{Payload, ProfilingInfo};

use super::core::DebuggerInner;

// ============================================================================
// DebuggerInner - Profiler
// ============================================================================

impl DebuggerInner {
    /// Detaches every context and starts its profiler.
    pub fn start_profiler(&self) {
        if !self.is_running() {
            debug!("No session, profiler not started");
            return;
        }

        let contexts = self.context_snapshot();
        for ctx in &contexts {
            self.engine.detach(ctx.handle());
            self.engine.start_profiler(ctx.handle());
        }

        info!(contexts = contexts.len(), "Profiler started");
    }

    /// Stops every profiler, re-attaches and sends the collected data.
    pub fn stop_profiler(&self) {
        if !self.is_running() {
            debug!("No session, profiler not stopped");
            return;
        }

        let contexts = self.context_snapshot();
        let fragments: Vec<String> = contexts
            .iter()
            .map(|ctx| {
                let fragment = self.engine.stop_profiler(ctx.handle());
                self.engine.attach(ctx.handle());
                fragment
            })
            .filter(|fragment| !fragment.trim().is_empty())
            .collect();

        info!(
            contexts = contexts.len(),
            fragments = fragments.len(),
            "Profiler stopped"
        );
        self.send_event(Payload::Profiling(ProfilingInfo::from_fragments(fragments)));
    }
}

// ============================================================================
// Tests
// ============================================================================
