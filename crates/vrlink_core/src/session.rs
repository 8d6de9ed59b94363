//! Native VR session lifecycle
//!
//! [`VrSession`] owns the opaque native session handle and drives its
//! lifecycle: construct, register the callback trampolines, step the
//! mainloop, shut down. Exactly one native handle exists per session; it is
//! never copied and is released exactly once — by [`VrSession::shutdown`],
//! or by the drop backstop if the caller forgot.
//!
//! The session is deliberately `!Send`: the binding is a single-threaded
//! call-and-return layer, and all handler dispatch happens nested inside
//! [`VrSession::step`] on the calling thread.

use crate::dispatch::{self, CallbackDispatcher};
use crate::error::{Result, VrError};
use crate::ffi::{CallbackToken, RuntimeApi, SessionHandle};
use crate::handler::{VrEventHandler, VrRenderHandler};
use crate::library::RuntimeLibrary;
use crate::plugins::{self, PluginRegistry};
use std::ffi::{c_char, CString};
use std::os::raw::c_int;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Ready,
    Shutdown,
}

/// An active binding to the native VR runtime
pub struct VrSession {
    runtime: Arc<RuntimeLibrary>,
    handle: SessionHandle,
    dispatcher: Arc<CallbackDispatcher>,
    event_token: CallbackToken,
    render_token: CallbackToken,
    state: SessionState,
}

impl VrSession {
    /// Resolve and load the runtime library under `root`, then start a session
    ///
    /// `args` is forwarded verbatim to native init (the native side parses
    /// its own configuration flags). `plugins` is consulted once, during the
    /// discovery pass that follows callback registration.
    pub fn create(root: impl AsRef<Path>, args: &[String], plugins: PluginRegistry) -> Result<Self> {
        let root = root.as_ref();
        let runtime = RuntimeLibrary::load(root)?;
        Self::with_runtime(runtime, root.join("plugins"), args, plugins)
    }

    /// Start a session on an already-loaded runtime
    ///
    /// Used by [`VrSession::create`]; also the entry point for driving a
    /// table-built runtime ([`RuntimeLibrary::from_api`]) in tests.
    pub fn with_runtime(
        runtime: Arc<RuntimeLibrary>,
        plugins_root: PathBuf,
        args: &[String],
        plugins: PluginRegistry,
    ) -> Result<Self> {
        let api = *runtime.api();

        let plugins_root_c = CString::new(plugins_root.to_string_lossy().into_owned())
            .map_err(|_| VrError::InvalidArgument("plugins root contains an interior NUL".into()))?;
        let arg_storage = args
            .iter()
            .map(|a| CString::new(a.as_str()))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| VrError::InvalidArgument("argument vector contains an interior NUL".into()))?;
        let argv: Vec<*const c_char> = arg_storage.iter().map(|a| a.as_ptr()).collect();

        let handle = (api.init)(plugins_root_c.as_ptr(), argv.len() as c_int, argv.as_ptr());
        if handle.is_null() {
            return Err(VrError::InitError { plugins_root });
        }
        log::debug!("native session initialized (plugins root '{}')", plugins_root.display());

        let dispatcher = Arc::new(CallbackDispatcher::new(api));
        dispatch::install(&dispatcher);
        let event_token = (api.register_event_callback)(handle, dispatch::event_trampoline);
        let render_token = (api.register_render_callback)(
            handle,
            dispatch::render_scene_trampoline,
            dispatch::render_context_trampoline,
        );

        let mut session = Self {
            runtime,
            handle,
            dispatcher,
            event_token,
            render_token,
            state: SessionState::Ready,
        };

        let registered = plugins::discover(&mut session, &plugins);
        if registered > 0 {
            log::info!("{} companion plugin(s) attached to the session", registered);
        }

        Ok(session)
    }

    /// Append an event handler; dispatch order equals registration order
    ///
    /// Must be called before the first [`VrSession::step`].
    pub fn add_event_handler(&mut self, handler: impl VrEventHandler + 'static) -> Result<()> {
        self.ensure_ready()?;
        self.dispatcher.add_event_handler(Box::new(handler));
        Ok(())
    }

    /// Append a render handler; dispatch order equals registration order
    ///
    /// Must be called before the first [`VrSession::step`].
    pub fn add_render_handler(&mut self, handler: impl VrRenderHandler + 'static) -> Result<()> {
        self.ensure_ready()?;
        self.dispatcher.add_render_handler(Box::new(handler));
        Ok(())
    }

    /// Advance the native runtime by one blocking iteration
    ///
    /// The native side may invoke the registered trampolines any number of
    /// times (events, then the render context and scene passes) before this
    /// call returns.
    pub fn step(&mut self) -> Result<()> {
        self.ensure_ready()?;
        (self.runtime.api().mainloop_step)(self.handle);
        Ok(())
    }

    /// Release the callback registrations and the native handle
    ///
    /// Must be called exactly once, after the last [`VrSession::step`]; a
    /// second call is rejected with [`VrError::UseAfterShutdown`].
    pub fn shutdown(&mut self) -> Result<()> {
        self.ensure_ready()?;
        self.release();
        Ok(())
    }

    /// Number of registered event handlers
    pub fn event_handler_count(&self) -> usize {
        self.dispatcher.event_handler_count()
    }

    /// Number of registered render handlers
    pub fn render_handler_count(&self) -> usize {
        self.dispatcher.render_handler_count()
    }

    /// The raw native session handle (advanced FFI usage)
    pub fn handle(&self) -> SessionHandle {
        self.handle
    }

    pub(crate) fn runtime_api(&self) -> &RuntimeApi {
        self.runtime.api()
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::Shutdown => Err(VrError::UseAfterShutdown),
        }
    }

    fn release(&mut self) {
        (self.runtime.api().shutdown)(self.handle, self.event_token, self.render_token);
        dispatch::uninstall(&self.dispatcher);
        self.state = SessionState::Shutdown;
        log::debug!("native session shut down");
    }
}

impl Drop for VrSession {
    fn drop(&mut self) {
        if self.state == SessionState::Ready {
            log::warn!("session dropped without an explicit shutdown; releasing the native handle");
            self.release();
        }
    }
}
