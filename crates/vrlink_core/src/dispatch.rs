//! Callback dispatch between the native runtime and registered handlers
//!
//! The native runtime retains only raw C function pointers, so the
//! trampolines here are free `extern "C"` functions; per-session state is
//! reached through a process-wide slot holding the active session's
//! [`CallbackDispatcher`]. Each trampoline invocation wraps the raw data
//! reference in a fresh [`DataIndex`] and fans out to every registered
//! handler in registration order, synchronously.
//!
//! Failure policy: a panic in a handler is caught at the trampoline
//! boundary, logged, and dispatch continues with the remaining handlers.
//! Panics never unwind into native frames.

use crate::ffi::{DataHandle, RuntimeApi};
use crate::handler::{VrEventHandler, VrRenderHandler};
use crate::index::DataIndex;
use parking_lot::{Mutex, RwLock};
use std::ffi::{c_char, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// The dispatcher whose session is currently registered with the native side
static ACTIVE: RwLock<Option<Arc<CallbackDispatcher>>> = RwLock::new(None);

/// Owns the handler registries for one session and fans callbacks out to them
///
/// Registries are append-only and ordered: dispatch order equals
/// registration order, and handlers live for the session's lifetime.
pub struct CallbackDispatcher {
    api: RuntimeApi,
    event_handlers: Mutex<Vec<Box<dyn VrEventHandler>>>,
    render_handlers: Mutex<Vec<Box<dyn VrRenderHandler>>>,
}

impl CallbackDispatcher {
    /// Create a dispatcher with empty registries
    pub fn new(api: RuntimeApi) -> Self {
        Self {
            api,
            event_handlers: Mutex::new(Vec::new()),
            render_handlers: Mutex::new(Vec::new()),
        }
    }

    /// Append an event handler
    pub fn add_event_handler(&self, handler: Box<dyn VrEventHandler>) {
        self.event_handlers.lock().push(handler);
    }

    /// Append a render handler
    pub fn add_render_handler(&self, handler: Box<dyn VrRenderHandler>) {
        self.render_handlers.lock().push(handler);
    }

    /// Number of registered event handlers
    pub fn event_handler_count(&self) -> usize {
        self.event_handlers.lock().len()
    }

    /// Number of registered render handlers
    pub fn render_handler_count(&self) -> usize {
        self.render_handlers.lock().len()
    }

    /// Fan one event out to every event handler, in registration order
    pub(crate) fn dispatch_event(&self, name: *const c_char, data: DataHandle) {
        if name.is_null() {
            log::warn!("native runtime delivered an event with a null name; dropping it");
            return;
        }
        let name = unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned();
        let index = DataIndex::new(&self.api, data);

        let mut handlers = self.event_handlers.lock();
        for handler in handlers.iter_mut() {
            let call = catch_unwind(AssertUnwindSafe(|| handler.on_event(&name, &index)));
            if call.is_err() {
                log::error!(
                    "event handler panicked while handling '{}'; continuing with remaining handlers",
                    name
                );
            }
        }
    }

    /// Fan the context sub-phase out to every render handler
    pub(crate) fn dispatch_render_context(&self, state: DataHandle) {
        let index = DataIndex::new(&self.api, state);

        let mut handlers = self.render_handlers.lock();
        for handler in handlers.iter_mut() {
            let call = catch_unwind(AssertUnwindSafe(|| handler.on_render_context(&index)));
            if call.is_err() {
                log::error!("render handler panicked in the context pass; continuing");
            }
        }
    }

    /// Fan the scene pass out to every render handler
    pub(crate) fn dispatch_render_scene(&self, state: DataHandle) {
        let index = DataIndex::new(&self.api, state);

        let mut handlers = self.render_handlers.lock();
        for handler in handlers.iter_mut() {
            let call = catch_unwind(AssertUnwindSafe(|| handler.on_render_scene(&index)));
            if call.is_err() {
                log::error!("render handler panicked in the scene pass; continuing");
            }
        }
    }
}

/// Install a session's dispatcher as the target of the trampolines
///
/// One session per process is the supported model; installing over a live
/// dispatcher replaces it with a warning.
pub(crate) fn install(dispatcher: &Arc<CallbackDispatcher>) {
    let mut slot = ACTIVE.write();
    if slot.is_some() {
        log::warn!("replacing the active session dispatcher; one session per process is the supported model");
    }
    *slot = Some(dispatcher.clone());
}

/// Remove a session's dispatcher, if it is still the active one
pub(crate) fn uninstall(dispatcher: &Arc<CallbackDispatcher>) {
    let mut slot = ACTIVE.write();
    if slot.as_ref().is_some_and(|active| Arc::ptr_eq(active, dispatcher)) {
        *slot = None;
    }
}

/// Event trampoline registered with the native runtime
pub(crate) extern "C" fn event_trampoline(name: *const c_char, data: DataHandle) {
    let dispatcher = ACTIVE.read().clone();
    if let Some(dispatcher) = dispatcher {
        dispatcher.dispatch_event(name, data);
    }
}

/// Render-scene trampoline registered with the native runtime
pub(crate) extern "C" fn render_scene_trampoline(state: DataHandle) {
    let dispatcher = ACTIVE.read().clone();
    if let Some(dispatcher) = dispatcher {
        dispatcher.dispatch_render_scene(state);
    }
}

/// Render-context trampoline registered with the native runtime
pub(crate) extern "C" fn render_context_trampoline(state: DataHandle) {
    let dispatcher = ACTIVE.read().clone();
    if let Some(dispatcher) = dispatcher {
        dispatcher.dispatch_render_context(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::testing::stub_api;

    #[derive(Clone)]
    struct Recorder {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl VrEventHandler for Recorder {
        fn on_event(&mut self, name: &str, _data: &DataIndex) {
            self.log.lock().push(format!("{}:{}", self.tag, name));
        }
    }

    impl VrRenderHandler for Recorder {
        fn on_render_context(&mut self, _state: &DataIndex) {
            self.log.lock().push(format!("{}:context", self.tag));
        }

        fn on_render_scene(&mut self, _state: &DataIndex) {
            self.log.lock().push(format!("{}:scene", self.tag));
        }
    }

    struct Panicker;

    impl VrEventHandler for Panicker {
        fn on_event(&mut self, _name: &str, _data: &DataIndex) {
            panic!("handler bug");
        }
    }

    #[test]
    fn test_event_dispatch_follows_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = CallbackDispatcher::new(stub_api());
        dispatcher.add_event_handler(Box::new(Recorder { tag: "a", log: log.clone() }));
        dispatcher.add_event_handler(Box::new(Recorder { tag: "b", log: log.clone() }));

        dispatcher.dispatch_event(b"/KbdEsc_Down\0".as_ptr() as *const c_char, DataHandle::null());

        assert_eq!(*log.lock(), vec!["a:/KbdEsc_Down", "b:/KbdEsc_Down"]);
    }

    #[test]
    fn test_render_passes_reach_all_handlers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = CallbackDispatcher::new(stub_api());
        dispatcher.add_render_handler(Box::new(Recorder { tag: "a", log: log.clone() }));
        dispatcher.add_render_handler(Box::new(Recorder { tag: "b", log: log.clone() }));

        dispatcher.dispatch_render_context(DataHandle::null());
        dispatcher.dispatch_render_scene(DataHandle::null());

        assert_eq!(*log.lock(), vec!["a:context", "b:context", "a:scene", "b:scene"]);
    }

    #[test]
    fn test_panicking_handler_does_not_stop_dispatch() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = CallbackDispatcher::new(stub_api());
        dispatcher.add_event_handler(Box::new(Panicker));
        dispatcher.add_event_handler(Box::new(Recorder { tag: "b", log: log.clone() }));

        dispatcher.dispatch_event(b"/A\0".as_ptr() as *const c_char, DataHandle::null());

        assert_eq!(*log.lock(), vec!["b:/A"]);
    }

    #[test]
    fn test_null_event_name_is_dropped() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = CallbackDispatcher::new(stub_api());
        dispatcher.add_event_handler(Box::new(Recorder { tag: "a", log: log.clone() }));

        dispatcher.dispatch_event(std::ptr::null(), DataHandle::null());

        assert!(log.lock().is_empty());
    }
}
