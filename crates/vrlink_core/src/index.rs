//! Typed value extraction from native data indices
//!
//! The native runtime hands callbacks an opaque key-value structure (event
//! payloads, render state). [`DataIndex`] is a scoped view over one such
//! reference: it queries the value's type tag, decodes the value into a
//! [`DataValue`], and releases any native-allocated buffer exactly once
//! before returning. Absent keys and unrecognized tags decode to `None`,
//! never to an error.

use crate::ffi::{DataHandle, DataTag, RuntimeApi};
use std::ffi::{c_void, CStr, CString};
use std::marker::PhantomData;
use std::os::raw::c_int;

/// A value read out of a native data index
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    /// Integer value
    Int(i32),
    /// Float value
    Float(f32),
    /// String value
    String(String),
    /// Integer array value
    IntArray(Vec<i32>),
    /// Float array value
    FloatArray(Vec<f32>),
}

impl DataValue {
    /// Get as integer
    pub fn as_int(&self) -> Option<i32> {
        match self {
            DataValue::Int(v) => Some(*v),
            DataValue::Float(v) => Some(*v as i32),
            _ => None,
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f32> {
        match self {
            DataValue::Float(v) => Some(*v),
            DataValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Get as integer array
    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            DataValue::IntArray(v) => Some(v),
            _ => None,
        }
    }

    /// Get as float array
    pub fn as_float_array(&self) -> Option<&[f32]> {
        match self {
            DataValue::FloatArray(v) => Some(v),
            _ => None,
        }
    }

    /// Get type name for debugging
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Int(_) => "int",
            DataValue::Float(_) => "float",
            DataValue::String(_) => "string",
            DataValue::IntArray(_) => "int array",
            DataValue::FloatArray(_) => "float array",
        }
    }
}

/// Scoped view over one native data index
///
/// Created fresh by the dispatcher for every callback invocation and only
/// valid for its duration; the lifetime keeps handlers from retaining the
/// view past the callback's return.
pub struct DataIndex<'a> {
    api: &'a RuntimeApi,
    data: DataHandle,
    _scope: PhantomData<&'a ()>,
}

impl<'a> DataIndex<'a> {
    /// Wrap a raw data reference
    ///
    /// Public for callers driving a [`RuntimeApi`] table of their own (fake
    /// runtimes in tests, embedders); application code receives ready-made
    /// views through the handler traits.
    pub fn new(api: &'a RuntimeApi, data: DataHandle) -> Self {
        Self {
            api,
            data,
            _scope: PhantomData,
        }
    }

    /// The raw native reference
    pub fn raw(&self) -> DataHandle {
        self.data
    }

    /// Read the value stored under `(key, namespace)`
    ///
    /// Returns `None` for absent keys and unrecognized type tags. String and
    /// array values are copied out of the native buffer, which is then
    /// released exactly once via the runtime's `free_value` before this
    /// method returns.
    pub fn get_value(&self, key: &str, namespace: &str) -> Option<DataValue> {
        let key_c = match CString::new(key) {
            Ok(k) => k,
            Err(_) => {
                log::warn!("data index key '{}' contains an interior NUL", key.escape_debug());
                return None;
            }
        };
        let ns_c = match CString::new(namespace) {
            Ok(n) => n,
            Err(_) => {
                log::warn!(
                    "data index namespace '{}' contains an interior NUL",
                    namespace.escape_debug()
                );
                return None;
            }
        };

        let raw_tag = (self.api.data_get_type)(self.data, key_c.as_ptr(), ns_c.as_ptr());
        let tag = match DataTag::from_raw(raw_tag) {
            Some(tag) => tag,
            None => {
                log::trace!("no value for '{}' in '{}' (tag {})", key, namespace, raw_tag);
                return None;
            }
        };

        match tag {
            DataTag::Int => Some(DataValue::Int(
                (self.api.data_get_int)(self.data, key_c.as_ptr(), ns_c.as_ptr()),
            )),
            DataTag::Float => Some(DataValue::Float(
                (self.api.data_get_float)(self.data, key_c.as_ptr(), ns_c.as_ptr()),
            )),
            DataTag::String => {
                let ptr = (self.api.data_get_string)(self.data, key_c.as_ptr(), ns_c.as_ptr());
                if ptr.is_null() {
                    return None;
                }
                let value = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
                (self.api.free_value)(tag.as_raw(), ptr as *mut c_void);
                Some(DataValue::String(value))
            }
            DataTag::IntArray => {
                let mut len: c_int = 0;
                let ptr = (self.api.data_get_int_array)(
                    self.data,
                    key_c.as_ptr(),
                    ns_c.as_ptr(),
                    &mut len,
                );
                let values = if ptr.is_null() || len <= 0 {
                    Vec::new()
                } else {
                    unsafe { std::slice::from_raw_parts(ptr, len as usize) }.to_vec()
                };
                if !ptr.is_null() {
                    (self.api.free_value)(tag.as_raw(), ptr as *mut c_void);
                }
                Some(DataValue::IntArray(values))
            }
            DataTag::FloatArray => {
                let mut len: c_int = 0;
                let ptr = (self.api.data_get_float_array)(
                    self.data,
                    key_c.as_ptr(),
                    ns_c.as_ptr(),
                    &mut len,
                );
                let values = if ptr.is_null() || len <= 0 {
                    Vec::new()
                } else {
                    unsafe { std::slice::from_raw_parts(ptr, len as usize) }.to_vec()
                };
                if !ptr.is_null() {
                    (self.api.free_value)(tag.as_raw(), ptr as *mut c_void);
                }
                Some(DataValue::FloatArray(values))
            }
        }
    }
}
