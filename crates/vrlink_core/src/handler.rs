//! Handler capabilities for dispatched runtime callbacks

use crate::index::DataIndex;

/// Receives input events dispatched by the native runtime
///
/// Handlers are `Send` because they are stored behind the process-wide
/// dispatcher slot; dispatch itself is strictly single-threaded, nested
/// inside [`crate::session::VrSession::step`].
pub trait VrEventHandler: Send {
    /// Called once per event, with the hierarchical event name
    /// (e.g. `/KbdEsc_Down`) and a scoped view of the event payload.
    ///
    /// The payload view is only valid until this method returns.
    fn on_event(&mut self, name: &str, data: &DataIndex);
}

/// Receives render callbacks dispatched by the native runtime
pub trait VrRenderHandler: Send {
    /// Called once per context sub-phase, before the scene pass
    fn on_render_context(&mut self, _state: &DataIndex) {}

    /// Called once per scene pass with the current render state
    fn on_render_scene(&mut self, state: &DataIndex);
}
