//! Debugger session coordinator.
//!
//! The [`Debugger`] owns every context record, the table of parked
//! threads and the connection to the remote debugger. It is fed from two
//! sides:
//!
//! - the engine, which reports contexts, parsed sources and hits
//!   (`attach_context`, `source_parsed`, `handle_breakpoint_hit`, ...)
//! - the connection, whose event loop delivers decoded remote commands
//!
//! # Locking
//!
//! The context registry and the parked-thread table are each guarded by
//! one coarse lock. Neither is held while calling into the engine or while
//! locking a context monitor; callers snapshot what they need first.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use jsdebug_bridge::{Debugger, ScriptEngine};
//!
//! # async fn example(engine: Arc<dyn ScriptEngine>) -> jsdebug_bridge::Result<()> {
//! let debugger = Debugger::builder().engine(engine).build()?;
//! debugger.attach("127.0.0.1", 9222).await?;
//!
//! // From the engine's breakpoint callback:
//! // debugger.handle_breakpoint_hit(context);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, error, info, warn};

use crate::engine::{HostReflection, ScriptEngine};
use crate::error::{Error, Result};
use crate::identifiers::{ContextHandle, MessageId, SourceId};
use crate::protocol::{Breakpoint, Envelope, LogMessage, Payload};
use crate::transport::{Connection, ConnectionListener};

use super::builder::DebuggerBuilder;
use super::context::DebuggerContext;
use super::options::DebuggerOptions;
use super::park::HitKind;

// ============================================================================
// Types
// ============================================================================

/// Context records keyed by handle.
pub(crate) type ContextMap = FxHashMap<ContextHandle, Arc<DebuggerContext>>;

/// Internal shared state of the debugger.
pub(crate) struct DebuggerInner {
    /// Scripting engine.
    pub engine: Arc<dyn ScriptEngine>,

    /// Host reflection layer.
    pub reflection: Arc<dyn HostReflection>,

    /// Session options.
    pub options: DebuggerOptions,

    /// Connection to the remote debugger, if one was made.
    pub client: Mutex<Option<Connection>>,

    /// Known contexts.
    pub contexts: Mutex<ContextMap>,

    /// Contexts whose thread is parked, keyed by thread id.
    pub breakpoint_hits: Mutex<ContextMap>,

    /// Breakpoints added by the remote side during this session.
    pub breakpoints: Mutex<Vec<Breakpoint>>,
}

// ============================================================================
// Debugger
// ============================================================================

/// Remote debugging session coordinator.
///
/// Cheap to clone; clones share the same session.
///
/// # Thread Safety
///
/// Engine notifications may arrive from any thread. A hit blocks the
/// calling thread until the remote side releases it or the session ends;
/// there is no timeout.
#[derive(Clone)]
pub struct Debugger {
    /// Shared inner state.
    pub(crate) inner: Arc<DebuggerInner>,
}

// ============================================================================
// Debugger - Display
// ============================================================================

impl fmt::Debug for Debugger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debugger")
            .field("running", &self.is_running())
            .field("context_count", &self.context_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Debugger - Public API
// ============================================================================

impl Debugger {
    /// Creates a configuration builder for the debugger.
    #[inline]
    #[must_use]
    pub fn builder() -> DebuggerBuilder {
        DebuggerBuilder::new()
    }

    /// Returns the session options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &DebuggerOptions {
        &self.inner.options
    }

    /// Connects to a remote debugger.
    ///
    /// Does nothing if a session with the same host and port is running.
    /// A session with another target is stopped first.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the remote debugger cannot be reached;
    /// the debugger state is reset in that case.
    pub async fn attach(&self, host: &str, port: u16) -> Result<()> {
        let current = self.inner.client.lock().clone();
        if let Some(client) = current
            && client.is_connected()
        {
            if client.host() == host && client.port() == port {
                debug!(host, port, "Debugger already attached");
                return Ok(());
            }
            info!(
                old_host = client.host(),
                old_port = client.port(),
                host,
                port,
                "Debugger target changed"
            );
            client.disconnect();
        }

        let listener: Arc<dyn ConnectionListener> =
            Arc::new(SessionListener(Arc::downgrade(&self.inner)));

        match Connection::connect(host, port, self.inner.options.connect_timeout, listener).await {
            Ok(client) => {
                *self.inner.client.lock() = Some(client);
                Ok(())
            }
            Err(e) => {
                warn!(host, port, error = %e, "Failed to attach debugger");
                self.inner.client.lock().take();
                self.inner.reset_state();
                Err(e)
            }
        }
    }

    /// Ends the session, releasing every parked thread.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Returns `true` while connected to a remote debugger.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    /// Returns the number of known contexts.
    #[inline]
    #[must_use]
    pub fn context_count(&self) -> usize {
        self.inner.contexts.lock().len()
    }

    /// Returns `true` if the thread of `context` is parked.
    #[inline]
    #[must_use]
    pub fn is_parked(&self, context: ContextHandle) -> bool {
        self.inner.is_parked(context)
    }

    /// Returns the breakpoints added by the remote side.
    #[must_use]
    pub fn session_breakpoints(&self) -> Vec<Breakpoint> {
        self.inner.breakpoints.lock().clone()
    }

    /// Returns the breakpoints registered with the engine for `context`.
    #[must_use]
    pub fn registered_breakpoints(&self, context: ContextHandle) -> Vec<Breakpoint> {
        self.inner
            .context(context)
            .map(|ctx| ctx.lock().breakpoints().to_vec())
            .unwrap_or_default()
    }

    /// Engine notification: a new execution context exists.
    ///
    /// Ignored while no session runs.
    pub fn attach_context(&self, context: ContextHandle) {
        if !self.inner.is_running() {
            debug!(context = %context, "No session, context not tracked");
            return;
        }
        self.inner.register_context(context);
    }

    /// Engine notification: an execution context is going away.
    pub fn detach_context(&self, context: ContextHandle) {
        let removed = self.inner.contexts.lock().remove(&context);
        match removed {
            Some(ctx) => {
                self.inner.teardown_context(&ctx);
                debug!(context = %context, "Context detached");
            }
            None => debug!(context = %context, "Detach for unknown context"),
        }
    }

    /// Engine notification: a source was parsed in `context`.
    ///
    /// Session breakpoints for that file are registered now.
    pub fn source_parsed(&self, context: ContextHandle, file_name: &str, source: SourceId) {
        let Some(ctx) = self.inner.context(context) else {
            debug!(context = %context, file_name, "Source parsed in untracked context");
            return;
        };

        ctx.lock().record_source(file_name, source);
        debug!(context = %context, file_name, source = %source, "Source parsed");

        let pending: Vec<Breakpoint> = self
            .inner
            .breakpoints
            .lock()
            .iter()
            .filter(|bp| bp.file_name == file_name)
            .cloned()
            .collect();

        for breakpoint in &pending {
            self.inner.register_breakpoint(&ctx, breakpoint);
        }
    }

    /// Engine callback: a breakpoint was hit.
    ///
    /// Blocks until the remote side resumes the thread.
    pub fn handle_breakpoint_hit(&self, context: ContextHandle) {
        self.inner.handle_break(context, HitKind::Breakpoint);
    }

    /// Engine callback: an exception stopped execution.
    ///
    /// Blocks until the remote side resumes the thread.
    pub fn handle_exception_hit(&self, context: ContextHandle, message: impl Into<String>) {
        self.inner
            .handle_break(context, HitKind::Exception(message.into()));
    }

    /// Engine callback: a step completed.
    ///
    /// Blocks until the remote side resumes the thread.
    pub fn handle_step_hit(&self, context: ContextHandle) {
        self.inner.handle_break(context, HitKind::Step);
    }

    /// Forwards script console output to the remote debugger.
    pub fn log(&self, message: &str, source: &str, details: &str) {
        self.send_log(LogMessage::console(message, source, details));
    }

    /// Forwards a log record to the remote debugger.
    ///
    /// Does nothing while no session runs.
    pub fn send_log(&self, record: LogMessage) {
        if !self.inner.is_running() {
            return;
        }
        self.inner.send_event(Payload::LogMessage(record));
    }

    /// Starts the profiler on every context.
    pub fn start_profiler(&self) {
        self.inner.start_profiler();
    }

    /// Stops the profiler and sends the collected data.
    pub fn stop_profiler(&self) {
        self.inner.stop_profiler();
    }
}

// ============================================================================
// Debugger - Internal API
// ============================================================================

impl Debugger {
    /// Creates a debugger with no session.
    pub(crate) fn new(
        engine: Arc<dyn ScriptEngine>,
        reflection: Arc<dyn HostReflection>,
        options: DebuggerOptions,
    ) -> Self {
        let inner = Arc::new(DebuggerInner {
            engine,
            reflection,
            options,
            client: Mutex::new(None),
            contexts: Mutex::new(FxHashMap::default()),
            breakpoint_hits: Mutex::new(FxHashMap::default()),
            breakpoints: Mutex::new(Vec::new()),
        });

        Self { inner }
    }
}

// ============================================================================
// DebuggerInner - Session
// ============================================================================

impl DebuggerInner {
    /// Returns `true` while connected.
    pub fn is_running(&self) -> bool {
        self.client
            .lock()
            .as_ref()
            .is_some_and(Connection::is_connected)
    }

    /// Disconnects; the connection reports the loss back to us.
    pub fn stop(&self) {
        let client = self.client.lock().clone();
        if let Some(client) = client {
            info!("Stopping debugger session");
            client.disconnect();
        }
    }

    /// Returns the record of `context`.
    pub fn context(&self, context: ContextHandle) -> Option<Arc<DebuggerContext>> {
        self.contexts.lock().get(&context).cloned()
    }

    /// Returns every context record, ordered by handle.
    pub fn context_snapshot(&self) -> Vec<Arc<DebuggerContext>> {
        let mut snapshot: Vec<_> = self.contexts.lock().values().cloned().collect();
        snapshot.sort_by_key(|ctx| ctx.handle());
        snapshot
    }

    /// Creates the record of `context` and attaches instrumentation.
    pub fn register_context(&self, context: ContextHandle) {
        let created = {
            let mut contexts = self.contexts.lock();
            if contexts.contains_key(&context) {
                false
            } else {
                contexts.insert(context, Arc::new(DebuggerContext::new(context)));
                true
            }
        };

        if !self.engine.is_attached(context) {
            self.engine.attach(context);
        }

        if created {
            debug!(context = %context, "Context attached");
        }
    }

    /// Clears engine breakpoints, releases a parked thread and detaches.
    pub fn teardown_context(&self, context: &DebuggerContext) {
        let handle = context.handle();

        self.engine.clear_breakpoints(handle);
        context.lock().clear_breakpoints();

        if self.release(handle) {
            debug!(context = %handle, "Parked thread released on teardown");
        }

        if self.engine.is_attached(handle) {
            self.engine.detach(handle);
        }
    }

    /// Discards every context and releases every parked thread.
    pub fn reset_state(&self) {
        let contexts: Vec<_> = self.contexts.lock().drain().map(|(_, ctx)| ctx).collect();
        for context in &contexts {
            self.teardown_context(context);
        }

        let leftovers: Vec<_> = self
            .breakpoint_hits
            .lock()
            .drain()
            .map(|(_, ctx)| ctx)
            .collect();
        for context in &leftovers {
            let _state = context.lock();
            context.notify();
        }

        self.breakpoints.lock().clear();

        info!(
            contexts = contexts.len(),
            released = leftovers.len(),
            "Debugger state reset"
        );
    }

    /// Sends an unsolicited event, returning `false` if it was not sent.
    pub fn send_event(&self, payload: Payload) -> bool {
        self.respond(MessageId::EVENT, payload)
    }

    /// Sends a message; a failure ends the session.
    ///
    /// Returns `false` if the message was not sent.
    pub fn respond(&self, id: MessageId, payload: Payload) -> bool {
        let envelope = Envelope::new(id, payload);

        let text = match envelope.encode() {
            Ok(text) => text,
            Err(e) => {
                error!(command = envelope.payload.tag(), error = %e, "Failed to encode message");
                return false;
            }
        };

        let client = self.client.lock().clone();
        let result = match client {
            Some(client) => client.send_message(&text),
            None => Err(Error::ConnectionClosed),
        };

        if let Err(e) = result {
            warn!(command = envelope.payload.tag(), error = %e, "Failed to send message");
            if e.is_connection_error() {
                self.stop();
            }
            return false;
        }
        true
    }
}

// ============================================================================
// SessionListener
// ============================================================================

/// Connection listener forwarding to the debugger.
///
/// Holds a weak reference so the connection does not keep the debugger
/// alive.
struct SessionListener(Weak<DebuggerInner>);

impl ConnectionListener for SessionListener {
    fn on_connection_established(&self) {
        if let Some(inner) = self.0.upgrade() {
            let global = inner.engine.global_context();
            inner.register_context(global);
        }
    }

    fn on_connection_lost(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.reset_state();
        }
    }

    fn on_message_received(&self, message: &str) {
        let Some(inner) = self.0.upgrade() else {
            return;
        };

        match Envelope::decode(message) {
            Ok(envelope) => inner.route(envelope),
            Err(e) => warn!(error = %e, "Dropping malformed message"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::debugger::testing::{Call, MockEngine};

    fn debugger(engine: &Arc<MockEngine>) -> Debugger {
        Debugger::builder()
            .engine(Arc::clone(engine) as Arc<dyn ScriptEngine>)
            .build()
            .expect("build")
    }

    #[test]
    fn test_debugger_is_clone_and_debug() {
        fn assert_traits<T: Clone + fmt::Debug + Send + Sync>() {}
        assert_traits::<Debugger>();
    }

    #[test]
    fn test_attach_context_ignored_without_session() {
        let engine = Arc::new(MockEngine::default());
        let debugger = debugger(&engine);

        debugger.attach_context(ContextHandle::new(2));
        assert_eq!(debugger.context_count(), 0);
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_register_and_detach_context() {
        let engine = Arc::new(MockEngine::default());
        let debugger = debugger(&engine);
        let ctx = ContextHandle::new(2);

        debugger.inner.register_context(ctx);
        debugger.inner.register_context(ctx);
        assert_eq!(debugger.context_count(), 1);
        assert_eq!(engine.count(&Call::Attach(ctx)), 1);

        debugger.detach_context(ctx);
        assert_eq!(debugger.context_count(), 0);
        assert!(engine.calls().contains(&Call::ClearBreakpoints(ctx)));
        assert!(engine.calls().contains(&Call::Detach(ctx)));
    }

    #[test]
    fn test_source_parsed_retries_session_breakpoints() {
        let engine = Arc::new(MockEngine::default());
        let debugger = debugger(&engine);
        let ctx = ContextHandle::new(1);

        debugger.inner.register_context(ctx);
        debugger
            .inner
            .breakpoints
            .lock()
            .push(Breakpoint::new("app.js", 10, 0));

        debugger.source_parsed(ctx, "other.js", SourceId::new(3));
        assert!(debugger.registered_breakpoints(ctx).is_empty());

        debugger.source_parsed(ctx, "app.js", SourceId::new(7));
        let registered = debugger.registered_breakpoints(ctx);
        assert_eq!(registered.len(), 1);
        assert!(registered[0].id.is_assigned());
        assert!(
            engine
                .calls()
                .contains(&Call::SetBreakpoint(ctx, SourceId::new(7), 9))
        );
    }

    #[test]
    fn test_reset_state_clears_everything() {
        let engine = Arc::new(MockEngine::default());
        let debugger = debugger(&engine);

        debugger.inner.register_context(ContextHandle::new(1));
        debugger.inner.register_context(ContextHandle::new(2));
        debugger
            .inner
            .breakpoints
            .lock()
            .push(Breakpoint::new("app.js", 1, 0));

        debugger.inner.reset_state();

        assert_eq!(debugger.context_count(), 0);
        assert!(debugger.session_breakpoints().is_empty());
        assert_eq!(engine.count(&Call::Detach(ContextHandle::new(1))), 1);
        assert_eq!(engine.count(&Call::Detach(ContextHandle::new(2))), 1);
    }

    #[test]
    fn test_log_without_session_is_noop() {
        let engine = Arc::new(MockEngine::default());
        let debugger = debugger(&engine);

        debugger.log("hello", "app.js", "");
        debugger.stop();
        assert!(!debugger.is_running());
    }

    #[test]
    fn test_send_without_connection_reports_failure() {
        let engine = Arc::new(MockEngine::default());
        let debugger = debugger(&engine);

        assert!(!debugger.inner.send_event(Payload::Pause(None)));
        assert!(!debugger.is_running());
    }

    #[tokio::test]
    async fn test_attach_failure_resets_state() {
        let engine = Arc::new(MockEngine::default());
        let debugger = debugger(&engine);

        let port = {
            let probe = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind");
            probe.local_addr().expect("addr").port()
        };

        let err = debugger.attach("127.0.0.1", port).await.unwrap_err();
        assert!(err.is_connection_error());
        assert!(!debugger.is_running());
        assert_eq!(debugger.context_count(), 0);
    }
}
