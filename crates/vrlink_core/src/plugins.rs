//! Companion plugin discovery
//!
//! The native runtime can name companion plugins it wants activated on the
//! Rust side. Discovery queries that list into a fixed buffer after session
//! init and resolves each name against a [`PluginRegistry`] populated at
//! startup — a static registration table in place of import-by-name. A
//! missing or failing plugin is reported individually and never aborts
//! discovery of the remaining plugins or the session itself.

use crate::error::Result;
use crate::ffi::PLUGIN_LIST_CAPACITY;
use crate::session::VrSession;
use std::collections::HashMap;
use std::ffi::{c_char, CStr};
use std::sync::Arc;

/// A plugin that can attach its own handlers to a session
pub trait VrPlugin: Send + Sync {
    /// Plugin name, as the native runtime reports it in the plugin list
    fn name(&self) -> &str;

    /// Called during discovery; the plugin registers whatever handlers it
    /// needs on the session.
    fn register(&self, session: &mut VrSession) -> Result<()>;
}

/// Name-keyed table of available plugins
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn VrPlugin>>,
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin under its own name
    pub fn add(&mut self, plugin: Arc<dyn VrPlugin>) {
        let name = plugin.name().to_string();
        if self.plugins.insert(name.clone(), plugin).is_some() {
            log::warn!("plugin '{}' already registered; replacing it", name);
        }
    }

    /// Look up a plugin by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn VrPlugin>> {
        self.plugins.get(name)
    }

    /// Number of registered plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// True if no plugins are registered
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Run plugin discovery for a freshly initialized session
///
/// Returns the number of plugins that registered successfully.
pub(crate) fn discover(session: &mut VrSession, registry: &PluginRegistry) -> usize {
    let api = *session.runtime_api();
    let mut buffer = [0u8; PLUGIN_LIST_CAPACITY];

    let has_plugins = (api.set_plugin_list)(session.handle(), buffer.as_mut_ptr() as *mut c_char);
    if !has_plugins {
        log::debug!("native runtime reports no companion plugins");
        return 0;
    }

    let list = match CStr::from_bytes_until_nul(&buffer) {
        Ok(s) => s.to_string_lossy().into_owned(),
        // Native side filled the whole buffer without a terminator.
        Err(_) => String::from_utf8_lossy(&buffer).into_owned(),
    };

    let mut registered = 0;
    for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        match registry.get(name) {
            Some(plugin) => match plugin.register(session) {
                Ok(()) => {
                    log::info!("registered companion plugin '{}'", name);
                    registered += 1;
                }
                Err(e) => log::error!("plugin '{}' failed to register: {}", name, e),
            },
            None => log::error!(
                "native runtime requested plugin '{}', but no such plugin is registered",
                name
            ),
        }
    }
    registered
}
