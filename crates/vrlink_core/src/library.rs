//! Dynamic loading of the native VR runtime library
//!
//! Resolves the platform-specific library path under the installation root,
//! loads it, and binds the full runtime symbol table. Loading is process-wide
//! idempotent: resolving the same library a second time returns the handle
//! that is already loaded instead of reloading it.

use crate::error::{Result, VrError};
use crate::ffi::*;
use libloading::{Library, Symbol};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Base name of the native runtime library
pub const RUNTIME_LIB_NAME: &str = "VRLinkNative";

#[cfg(target_os = "windows")]
const PLATFORM_SUBDIR: &str = "bin";
#[cfg(target_os = "windows")]
const LIB_PREFIX: &str = "";
#[cfg(target_os = "windows")]
const LIB_EXTENSION: &str = ".dll";

#[cfg(target_os = "macos")]
const PLATFORM_SUBDIR: &str = "lib";
#[cfg(target_os = "macos")]
const LIB_PREFIX: &str = "lib";
#[cfg(target_os = "macos")]
const LIB_EXTENSION: &str = ".dylib";

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const PLATFORM_SUBDIR: &str = "lib";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const LIB_PREFIX: &str = "lib";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const LIB_EXTENSION: &str = ".so";

/// Libraries already loaded in this process, keyed by resolved path
static LOADED: RwLock<BTreeMap<PathBuf, Arc<RuntimeLibrary>>> = RwLock::new(BTreeMap::new());

/// Resolve the native runtime library path under an installation root
///
/// Convention: `<root>/plugins/<name>/<platformSubdir>/<prefix><name><ext>`,
/// with a debug build fallback that appends a single `d` before the
/// extension. Fails with [`VrError::LibraryNotFound`] naming both attempted
/// paths when neither exists.
pub fn locate_runtime_library(root: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = root
        .as_ref()
        .join("plugins")
        .join(RUNTIME_LIB_NAME)
        .join(PLATFORM_SUBDIR);

    let primary = dir.join(format!("{}{}{}", LIB_PREFIX, RUNTIME_LIB_NAME, LIB_EXTENSION));
    if primary.exists() {
        return Ok(primary);
    }

    let fallback = dir.join(format!("{}{}d{}", LIB_PREFIX, RUNTIME_LIB_NAME, LIB_EXTENSION));
    if fallback.exists() {
        log::debug!("using debug runtime library '{}'", fallback.display());
        return Ok(fallback);
    }

    Err(VrError::LibraryNotFound { primary, fallback })
}

/// The loaded native VR runtime library
///
/// Owns the dynamic library handle and the bound symbol table. Wrapped in an
/// `Arc` by [`RuntimeLibrary::load`] so sessions and the process-wide cache
/// can share one load.
pub struct RuntimeLibrary {
    /// Resolved library path (a placeholder for table-built runtimes)
    path: PathBuf,
    /// Bound symbol table
    api: RuntimeApi,
    /// Keeps the library mapped for as long as the symbol table is reachable
    _library: Option<Library>,
}

impl RuntimeLibrary {
    /// Load the runtime library for an installation root
    ///
    /// Idempotent per process: if the resolved path has already been loaded,
    /// the existing handle is returned.
    pub fn load(root: impl AsRef<Path>) -> Result<Arc<Self>> {
        let path = locate_runtime_library(root)?;

        if let Some(existing) = LOADED.read().get(&path) {
            return Ok(existing.clone());
        }

        let library = unsafe {
            Library::new(&path).map_err(|e| VrError::load_error(&path, e.to_string()))?
        };

        let api = bind_api(&library, &path)?;

        let runtime = Arc::new(Self {
            path: path.clone(),
            api,
            _library: Some(library),
        });

        let mut loaded = LOADED.write();
        // A racing load of the same path keeps the first entry.
        let entry = loaded.entry(path.clone()).or_insert_with(|| runtime.clone());
        if Arc::ptr_eq(entry, &runtime) {
            log::info!("loaded native runtime library '{}'", path.display());
        }
        Ok(entry.clone())
    }

    /// Build a runtime from an explicit symbol table
    ///
    /// For testing and embedding: no library is opened, calls go straight to
    /// the supplied function pointers.
    pub fn from_api(api: RuntimeApi) -> Arc<Self> {
        Arc::new(Self {
            path: PathBuf::from("<in-process>"),
            api,
            _library: None,
        })
    }

    /// The bound symbol table
    pub fn api(&self) -> &RuntimeApi {
        &self.api
    }

    /// The resolved library path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RuntimeLibrary {
    fn drop(&mut self) {
        if self._library.is_some() {
            log::debug!("unloading native runtime library '{}'", self.path.display());
        }
    }
}

/// Bind one required symbol, copying the function pointer out of the library
fn bind_symbol<T: Copy>(library: &Library, path: &Path, symbol: &[u8]) -> Result<T> {
    let name = std::str::from_utf8(&symbol[..symbol.len() - 1]).unwrap_or("<non-utf8>");
    let sym: Symbol<'_, T> = unsafe {
        library
            .get(symbol)
            .map_err(|_| VrError::symbol_not_found(path.display().to_string(), name))?
    };
    Ok(*sym)
}

/// Bind the complete runtime symbol table
fn bind_api(library: &Library, path: &Path) -> Result<RuntimeApi> {
    Ok(RuntimeApi {
        init: bind_symbol(library, path, b"vrlink_session_init\0")?,
        register_event_callback: bind_symbol(library, path, b"vrlink_register_event_callback\0")?,
        register_render_callback: bind_symbol(library, path, b"vrlink_register_render_callback\0")?,
        set_plugin_list: bind_symbol(library, path, b"vrlink_set_plugin_list\0")?,
        mainloop_step: bind_symbol(library, path, b"vrlink_mainloop_step\0")?,
        shutdown: bind_symbol(library, path, b"vrlink_session_shutdown\0")?,
        data_get_type: bind_symbol(library, path, b"vrlink_data_get_type\0")?,
        data_get_int: bind_symbol(library, path, b"vrlink_data_get_int\0")?,
        data_get_float: bind_symbol(library, path, b"vrlink_data_get_float\0")?,
        data_get_string: bind_symbol(library, path, b"vrlink_data_get_string\0")?,
        data_get_int_array: bind_symbol(library, path, b"vrlink_data_get_int_array\0")?,
        data_get_float_array: bind_symbol(library, path, b"vrlink_data_get_float_array\0")?,
        free_value: bind_symbol(library, path, b"vrlink_free_value\0")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary_name() -> String {
        format!("{}{}{}", LIB_PREFIX, RUNTIME_LIB_NAME, LIB_EXTENSION)
    }

    fn fallback_name() -> String {
        format!("{}{}d{}", LIB_PREFIX, RUNTIME_LIB_NAME, LIB_EXTENSION)
    }

    fn library_dir(root: &Path) -> PathBuf {
        root.join("plugins").join(RUNTIME_LIB_NAME).join(PLATFORM_SUBDIR)
    }

    #[test]
    fn test_locate_prefers_primary() {
        let root = tempfile::tempdir().unwrap();
        let dir = library_dir(root.path());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(primary_name()), b"").unwrap();
        std::fs::write(dir.join(fallback_name()), b"").unwrap();

        let resolved = locate_runtime_library(root.path()).unwrap();
        assert_eq!(resolved, dir.join(primary_name()));
    }

    #[test]
    fn test_locate_falls_back_to_debug_name() {
        let root = tempfile::tempdir().unwrap();
        let dir = library_dir(root.path());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(fallback_name()), b"").unwrap();

        let resolved = locate_runtime_library(root.path()).unwrap();
        assert_eq!(resolved, dir.join(fallback_name()));
    }

    #[test]
    fn test_locate_reports_both_attempted_paths() {
        let root = tempfile::tempdir().unwrap();

        let err = locate_runtime_library(root.path()).unwrap_err();
        match &err {
            VrError::LibraryNotFound { primary, fallback } => {
                assert_eq!(*primary, library_dir(root.path()).join(primary_name()));
                assert_eq!(*fallback, library_dir(root.path()).join(fallback_name()));
            }
            other => panic!("expected LibraryNotFound, got {:?}", other),
        }
        let message = err.to_string();
        assert!(message.contains(&primary_name()));
        assert!(message.contains(&fallback_name()));
    }

    #[test]
    fn test_from_api_has_no_backing_library() {
        let runtime = RuntimeLibrary::from_api(crate::ffi::testing::stub_api());
        assert_eq!(runtime.path(), Path::new("<in-process>"));
    }
}
