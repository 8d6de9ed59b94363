//! Error types for the VR runtime binding

use std::path::PathBuf;
use thiserror::Error;

/// Result type for binding operations
pub type Result<T> = std::result::Result<T, VrError>;

/// Errors that can occur in the VR runtime binding
#[derive(Debug, Error)]
pub enum VrError {
    /// Neither the primary nor the debug-suffixed library path exists
    #[error("native runtime library not found (tried '{primary}' and '{fallback}')")]
    LibraryNotFound {
        primary: PathBuf,
        fallback: PathBuf,
    },

    /// The library exists but the dynamic loader rejected it
    #[error("failed to load native runtime library '{path}': {message}")]
    LoadError {
        path: PathBuf,
        message: String,
    },

    /// Library does not contain a required symbol
    #[error("symbol '{symbol}' not found in library '{library}'")]
    SymbolNotFound {
        library: String,
        symbol: String,
    },

    /// Native initialization returned a null session handle
    #[error("native runtime initialization failed (plugins root '{plugins_root}')")]
    InitError {
        plugins_root: PathBuf,
    },

    /// Operation invoked on a session that has already been shut down
    #[error("session operation invoked after shutdown")]
    UseAfterShutdown,

    /// A companion plugin failed to register with the session
    #[error("plugin '{name}' failed to register: {message}")]
    PluginError {
        name: String,
        message: String,
    },

    /// A caller-supplied string cannot cross the FFI boundary
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl VrError {
    /// Create a load error
    pub fn load_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        VrError::LoadError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a symbol not found error
    pub fn symbol_not_found(library: impl Into<String>, symbol: impl Into<String>) -> Self {
        VrError::SymbolNotFound {
            library: library.into(),
            symbol: symbol.into(),
        }
    }

    /// Create a plugin registration error
    pub fn plugin_error(name: impl Into<String>, message: impl Into<String>) -> Self {
        VrError::PluginError {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_not_found_names_both_paths() {
        let err = VrError::LibraryNotFound {
            primary: PathBuf::from("/vr/plugins/lib/libX.so"),
            fallback: PathBuf::from("/vr/plugins/lib/libXd.so"),
        };
        let message = err.to_string();
        assert!(message.contains("libX.so"));
        assert!(message.contains("libXd.so"));
    }

    #[test]
    fn test_helper_constructors() {
        let err = VrError::symbol_not_found("libVR.so", "vrlink_session_init");
        assert!(err.to_string().contains("vrlink_session_init"));

        let err = VrError::plugin_error("alpha", "no entry point");
        assert!(err.to_string().contains("alpha"));
    }
}
