//! # vrlink_core - Native VR Runtime Binding
//!
//! Binds a Rust application to the VRLink native VR runtime: loads the
//! platform-specific shared library, bridges the runtime's C-style event and
//! render callbacks into registered handler objects, and marshals the
//! runtime's opaque key-value data structures into Rust values.
//!
//! ## Overview
//!
//! The native runtime owns windows, devices, and the render pipeline; this
//! crate owns the boundary. An application constructs a [`VrSession`]
//! (which resolves and loads the library, initializes the native side, and
//! registers the callback trampolines), attaches handlers, then repeatedly
//! steps the session. Each step blocks while the native runtime processes
//! one frame, during which it may deliver events and the render passes to
//! the registered handlers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │  Application /  │────▶│    VrSession    │
//! │  VrPlugins      │     │  (owns handle)  │
//! └─────────────────┘     └────────┬────────┘
//!                                  │
//!                                  ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │ RuntimeLibrary  │◀────│   libloading    │
//! │  (RuntimeApi)   │     │                 │
//! └────────┬────────┘     └─────────────────┘
//!          │
//!          ▼
//! ┌──────────────────────┐     ┌─────────────────┐
//! │ CallbackDispatcher   │────▶│   DataIndex     │
//! │ (C trampolines,      │     │ (scoped typed   │
//! │  handler registries) │     │  value reads)   │
//! └──────────────────────┘     └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use vrlink_core::prelude::*;
//!
//! struct App;
//!
//! impl VrEventHandler for App {
//!     fn on_event(&mut self, name: &str, _data: &DataIndex) {
//!         println!("event: {}", name);
//!     }
//! }
//!
//! impl VrRenderHandler for App {
//!     fn on_render_scene(&mut self, state: &DataIndex) {
//!         if let Some(width) = state.get_value("WindowWidth", "/") {
//!             // ...
//!         }
//!     }
//! }
//!
//! let mut session = VrSession::create("/opt/vrlink", &[], PluginRegistry::new())?;
//! session.add_event_handler(App)?;
//! session.add_render_handler(App)?;
//! loop {
//!     session.step()?;
//! }
//! ```
//!
//! ## Threading
//!
//! The binding is single-threaded, call-and-return: all dispatch happens
//! nested inside [`VrSession::step`] on the calling thread, and the session
//! type is `!Send`. Cancellation is cooperative — a handler flips a flag and
//! the application stops stepping.

mod dispatch;
mod error;
mod ffi;
mod handler;
mod index;
mod library;
mod plugins;
mod session;

pub use dispatch::CallbackDispatcher;
pub use error::{Result, VrError};
pub use ffi::{
    CallbackToken, DataHandle, DataTag, RuntimeApi, SessionHandle, PLUGIN_LIST_CAPACITY,
};
pub use handler::{VrEventHandler, VrRenderHandler};
pub use index::{DataIndex, DataValue};
pub use library::{locate_runtime_library, RuntimeLibrary, RUNTIME_LIB_NAME};
pub use plugins::{PluginRegistry, VrPlugin};
pub use session::VrSession;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Result, VrError};
    pub use crate::handler::{VrEventHandler, VrRenderHandler};
    pub use crate::index::{DataIndex, DataValue};
    pub use crate::plugins::{PluginRegistry, VrPlugin};
    pub use crate::session::VrSession;
}
