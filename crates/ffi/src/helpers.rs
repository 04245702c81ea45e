use crate::error::{with_last_error_mut, BakeConvertErrorCode, ConvertFfiError, DefaultConvertError};
use bake_convert_core::Result;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Set the thread-local error message and code.
/// Accepts any type implementing the `ConvertFfiError` trait.
pub(crate) fn set_last_error(error: &impl ConvertFfiError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl ConvertFfiError) -> BakeConvertErrorCode {
    set_last_error(error);
    error.code()
}

/// Clear the thread-local error message and code.
/// Called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = BakeConvertErrorCode::Ok;
    });
}

/// Record a core result: clears the error on success, tracks it on failure.
pub(crate) fn track_result<T>(result: Result<T>) -> std::result::Result<T, BakeConvertErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(e) => Err(track_error(&DefaultConvertError::from(&e))),
    }
}

/// Borrow a C string argument as `&str`.
///
/// # Safety
/// `ptr` must be null or point to a valid null-terminated string that outlives the borrow.
pub(crate) unsafe fn str_from_ptr<'a>(
    ptr: *const c_char,
    param_name: &str,
) -> std::result::Result<&'a str, BakeConvertErrorCode> {
    if ptr.is_null() {
        return Err(track_error(&DefaultConvertError::null_pointer(param_name)));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| track_error(&DefaultConvertError::invalid_utf8(param_name)))
}

/// Borrow a `(pointer, length)` pair as a slice.
///
/// # Safety
/// `ptr` must be null or point to `len` initialized values.
pub(crate) unsafe fn slice_from_ptr<'a>(
    ptr: *const f64,
    len: usize,
    param_name: &str,
) -> std::result::Result<&'a [f64], BakeConvertErrorCode> {
    if ptr.is_null() {
        return Err(track_error(&DefaultConvertError::null_pointer(param_name)));
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

/// Parse a JSON C string argument into `T`.
///
/// # Safety
/// Same contract as [`str_from_ptr`].
pub(crate) unsafe fn json_from_ptr<T: serde::de::DeserializeOwned>(
    ptr: *const c_char,
    param_name: &str,
) -> std::result::Result<T, BakeConvertErrorCode> {
    let text = str_from_ptr(ptr, param_name)?;
    serde_json::from_str(text).map_err(|e| track_error(&DefaultConvertError::invalid_json(param_name, &e)))
}
