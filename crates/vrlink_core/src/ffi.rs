//! FFI types and function signatures for the native VR runtime
//!
//! This module defines the C ABI surface used to communicate between Rust
//! and the native runtime library. All handle types use `#[repr(C)]` for
//! ABI compatibility; callbacks use the C calling convention.

use std::ffi::{c_char, c_void};
use std::os::raw::{c_float, c_int};

/// Capacity of the fixed buffer the native side fills with the
/// comma-separated companion plugin list.
pub const PLUGIN_LIST_CAPACITY: usize = 500;

/// Opaque handle to a native VR session
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    /// Pointer to the native session object
    pub ptr: *mut c_void,
}

impl SessionHandle {
    /// Create a null handle
    pub const fn null() -> Self {
        Self { ptr: std::ptr::null_mut() }
    }

    /// Check if handle is null
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }
}

/// Opaque reference to a native data index (event payload or render state)
///
/// Only valid for the duration of the callback invocation that produced it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataHandle {
    /// Pointer to the native data structure
    pub ptr: *const c_void,
}

impl DataHandle {
    /// Create a null reference
    pub const fn null() -> Self {
        Self { ptr: std::ptr::null() }
    }

    /// Check if the reference is null
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }
}

/// Opaque token returned by the native callback-registration calls
///
/// Handed back to `vrlink_session_shutdown` so the native side can release
/// its callback wrappers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackToken {
    /// Pointer to the native callback wrapper
    pub ptr: *mut c_void,
}

impl CallbackToken {
    /// Create a null token
    pub const fn null() -> Self {
        Self { ptr: std::ptr::null_mut() }
    }

    /// Check if the token is null
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }
}

/// Type tag of a value stored in a native data index
///
/// The tag set is closed. Raw tag `0` means the key is absent; any value
/// outside the five tags below is treated the same way (no value), never as
/// an error.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTag {
    /// 32-bit integer, returned by value
    Int = 1,
    /// 32-bit float, returned by value
    Float = 2,
    /// NUL-terminated string in a native-allocated buffer
    String = 3,
    /// Array of 32-bit integers in a native-allocated buffer
    IntArray = 4,
    /// Array of 32-bit floats in a native-allocated buffer
    FloatArray = 5,
}

impl DataTag {
    /// Decode a raw native tag; absent (0) and unrecognized tags map to `None`
    pub fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            1 => Some(DataTag::Int),
            2 => Some(DataTag::Float),
            3 => Some(DataTag::String),
            4 => Some(DataTag::IntArray),
            5 => Some(DataTag::FloatArray),
            _ => None,
        }
    }

    /// The raw tag passed back to the native `free_value` call
    pub fn as_raw(self) -> c_int {
        self as c_int
    }
}

/// Event callback signature expected by the native runtime
pub type EventCallbackFn = extern "C" fn(event_name: *const c_char, data: DataHandle);

/// Render callback signature expected by the native runtime
///
/// Used for both the context sub-phase and the scene sub-phase.
pub type RenderCallbackFn = extern "C" fn(render_state: DataHandle);

/// `vrlink_session_init`: returns a null handle on failure
pub type InitFn =
    extern "C" fn(plugins_root: *const c_char, argc: c_int, argv: *const *const c_char) -> SessionHandle;

/// `vrlink_register_event_callback`
pub type RegisterEventCallbackFn =
    extern "C" fn(handle: SessionHandle, callback: EventCallbackFn) -> CallbackToken;

/// `vrlink_register_render_callback`: scene callback plus context callback
pub type RegisterRenderCallbackFn = extern "C" fn(
    handle: SessionHandle,
    scene: RenderCallbackFn,
    context: RenderCallbackFn,
) -> CallbackToken;

/// `vrlink_set_plugin_list`: fills a `PLUGIN_LIST_CAPACITY` byte buffer,
/// returns true iff the list is non-empty
pub type SetPluginListFn = extern "C" fn(handle: SessionHandle, out: *mut c_char) -> bool;

/// `vrlink_mainloop_step`: one blocking runtime iteration
pub type MainloopStepFn = extern "C" fn(handle: SessionHandle);

/// `vrlink_session_shutdown`: releases the callback registrations and the session
pub type ShutdownFn =
    extern "C" fn(handle: SessionHandle, event_token: CallbackToken, render_token: CallbackToken);

/// `vrlink_data_get_type`
pub type DataGetTypeFn =
    extern "C" fn(data: DataHandle, key: *const c_char, namespace: *const c_char) -> c_int;

/// `vrlink_data_get_int`
pub type DataGetIntFn =
    extern "C" fn(data: DataHandle, key: *const c_char, namespace: *const c_char) -> c_int;

/// `vrlink_data_get_float`
pub type DataGetFloatFn =
    extern "C" fn(data: DataHandle, key: *const c_char, namespace: *const c_char) -> c_float;

/// `vrlink_data_get_string`: native-allocated buffer, released via `free_value`
pub type DataGetStringFn =
    extern "C" fn(data: DataHandle, key: *const c_char, namespace: *const c_char) -> *mut c_char;

/// `vrlink_data_get_int_array`: length written through `out_len`
pub type DataGetIntArrayFn = extern "C" fn(
    data: DataHandle,
    key: *const c_char,
    namespace: *const c_char,
    out_len: *mut c_int,
) -> *mut c_int;

/// `vrlink_data_get_float_array`: length written through `out_len`
pub type DataGetFloatArrayFn = extern "C" fn(
    data: DataHandle,
    key: *const c_char,
    namespace: *const c_char,
    out_len: *mut c_int,
) -> *mut c_float;

/// `vrlink_free_value`: releases a native-allocated value buffer
pub type FreeValueFn = extern "C" fn(tag: c_int, ptr: *mut c_void);

/// Bound symbol table of the native runtime library
///
/// Every field is required; a library missing any of these symbols fails to
/// load. The table is plain `Copy` data, so scoped marshaller views and the
/// dispatcher can hold it without keeping borrow chains into the library.
#[derive(Clone, Copy)]
pub struct RuntimeApi {
    pub init: InitFn,
    pub register_event_callback: RegisterEventCallbackFn,
    pub register_render_callback: RegisterRenderCallbackFn,
    pub set_plugin_list: SetPluginListFn,
    pub mainloop_step: MainloopStepFn,
    pub shutdown: ShutdownFn,
    pub data_get_type: DataGetTypeFn,
    pub data_get_int: DataGetIntFn,
    pub data_get_float: DataGetFloatFn,
    pub data_get_string: DataGetStringFn,
    pub data_get_int_array: DataGetIntArrayFn,
    pub data_get_float_array: DataGetFloatArrayFn,
    pub free_value: FreeValueFn,
}

#[cfg(test)]
pub(crate) mod testing {
    //! Inert `RuntimeApi` stub for unit tests; override fields with struct
    //! update syntax.

    use super::*;

    extern "C" fn init(
        _plugins_root: *const c_char,
        _argc: c_int,
        _argv: *const *const c_char,
    ) -> SessionHandle {
        SessionHandle { ptr: 0x1 as *mut c_void }
    }

    extern "C" fn register_event_callback(
        _handle: SessionHandle,
        _callback: EventCallbackFn,
    ) -> CallbackToken {
        CallbackToken::null()
    }

    extern "C" fn register_render_callback(
        _handle: SessionHandle,
        _scene: RenderCallbackFn,
        _context: RenderCallbackFn,
    ) -> CallbackToken {
        CallbackToken::null()
    }

    extern "C" fn set_plugin_list(_handle: SessionHandle, _out: *mut c_char) -> bool {
        false
    }

    extern "C" fn mainloop_step(_handle: SessionHandle) {}

    extern "C" fn shutdown(
        _handle: SessionHandle,
        _event_token: CallbackToken,
        _render_token: CallbackToken,
    ) {
    }

    extern "C" fn data_get_type(
        _data: DataHandle,
        _key: *const c_char,
        _namespace: *const c_char,
    ) -> c_int {
        0
    }

    extern "C" fn data_get_int(
        _data: DataHandle,
        _key: *const c_char,
        _namespace: *const c_char,
    ) -> c_int {
        0
    }

    extern "C" fn data_get_float(
        _data: DataHandle,
        _key: *const c_char,
        _namespace: *const c_char,
    ) -> c_float {
        0.0
    }

    extern "C" fn data_get_string(
        _data: DataHandle,
        _key: *const c_char,
        _namespace: *const c_char,
    ) -> *mut c_char {
        std::ptr::null_mut()
    }

    extern "C" fn data_get_int_array(
        _data: DataHandle,
        _key: *const c_char,
        _namespace: *const c_char,
        out_len: *mut c_int,
    ) -> *mut c_int {
        unsafe { *out_len = 0 };
        std::ptr::null_mut()
    }

    extern "C" fn data_get_float_array(
        _data: DataHandle,
        _key: *const c_char,
        _namespace: *const c_char,
        out_len: *mut c_int,
    ) -> *mut c_float {
        unsafe { *out_len = 0 };
        std::ptr::null_mut()
    }

    extern "C" fn free_value(_tag: c_int, _ptr: *mut c_void) {}

    pub(crate) fn stub_api() -> RuntimeApi {
        RuntimeApi {
            init,
            register_event_callback,
            register_render_callback,
            set_plugin_list,
            mainloop_step,
            shutdown,
            data_get_type,
            data_get_int,
            data_get_float,
            data_get_string,
            data_get_int_array,
            data_get_float_array,
            free_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_decoding() {
        assert_eq!(DataTag::from_raw(1), Some(DataTag::Int));
        assert_eq!(DataTag::from_raw(2), Some(DataTag::Float));
        assert_eq!(DataTag::from_raw(3), Some(DataTag::String));
        assert_eq!(DataTag::from_raw(4), Some(DataTag::IntArray));
        assert_eq!(DataTag::from_raw(5), Some(DataTag::FloatArray));
        assert_eq!(DataTag::from_raw(0), None);
        assert_eq!(DataTag::from_raw(6), None);
        assert_eq!(DataTag::from_raw(-1), None);
    }

    #[test]
    fn test_tag_roundtrip() {
        for tag in [
            DataTag::Int,
            DataTag::Float,
            DataTag::String,
            DataTag::IntArray,
            DataTag::FloatArray,
        ] {
            assert_eq!(DataTag::from_raw(tag.as_raw()), Some(tag));
        }
    }

    #[test]
    fn test_null_handles() {
        assert!(SessionHandle::null().is_null());
        assert!(DataHandle::null().is_null());
        assert!(CallbackToken::null().is_null());
    }
}
