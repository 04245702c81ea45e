use bake_convert_core::ConversionError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for FFI error types.
///
/// Gives every failure crossing the C boundary a code for control flow and a
/// message for diagnostics.
///
/// # Example
/// ```ignore
/// let err = DefaultConvertError::null_pointer("out_volume");
/// assert_eq!(err.code(), BakeConvertErrorCode::NullPointer);
/// assert_eq!(err.msg(), "Parameter 'out_volume' cannot be null");
/// ```
pub(crate) trait ConvertFfiError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> BakeConvertErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `ConvertFfiError` for common FFI error scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultConvertError {
    code: BakeConvertErrorCode,
    msg: String,
}

impl DefaultConvertError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_json"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: BakeConvertErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for a C string that is not valid UTF-8.
    pub fn invalid_utf8(param_name: &str) -> Self {
        Self {
            code: BakeConvertErrorCode::InvalidUtf8,
            msg: format!("Parameter '{param_name}' is not valid UTF-8"),
        }
    }

    /// Create error for JSON that does not parse into the expected type.
    ///
    /// # Arguments
    /// * `param_name` - The JSON parameter (e.g., `"recipe_json"`, `"intent_json"`)
    /// * `error` - The parser's description of the problem
    pub fn invalid_json(param_name: &str, error: &serde_json::Error) -> Self {
        Self {
            code: BakeConvertErrorCode::InvalidJson,
            msg: format!("Parameter '{param_name}' is not valid JSON: {error}"),
        }
    }

    /// Create error for invalid parameter.
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: BakeConvertErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl From<&ConversionError> for DefaultConvertError {
    fn from(error: &ConversionError) -> Self {
        Self {
            code: BakeConvertErrorCode::from(error),
            msg: error.to_string(),
        }
    }
}

impl ConvertFfiError for DefaultConvertError {
    fn code(&self) -> BakeConvertErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by conversion functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BakeConvertErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// A C string argument is not valid UTF-8.
    InvalidUtf8 = 2,

    /// A JSON argument does not parse into the expected shape.
    InvalidJson = 3,

    /// Flour weight used as a baker's-percentage base is not positive.
    InvalidFlourWeight = 4,

    /// Scale factor is not positive and finite.
    InvalidScaleFactor = 5,

    /// Pan family, dimensions, or pan list are invalid.
    InvalidPan = 6,

    /// Product type, method, or mixer tag is not supported.
    UnsupportedTag = 7,

    /// The recipe has no ingredients.
    EmptyIngredientList = 8,

    /// An ingredient is measured in pieces with no known piece weight.
    UnknownPieceWeight = 9,

    /// Invalid parameter passed to function.
    InvalidParameter = 10,
}

impl From<&ConversionError> for BakeConvertErrorCode {
    fn from(error: &ConversionError) -> Self {
        match error {
            ConversionError::InvalidFlourWeight(_) => BakeConvertErrorCode::InvalidFlourWeight,
            ConversionError::InvalidScaleFactor(_) => BakeConvertErrorCode::InvalidScaleFactor,
            ConversionError::UnsupportedPanFamily(_)
            | ConversionError::InvalidPanDimension { .. }
            | ConversionError::DimensionCount { .. }
            | ConversionError::EmptyPanList => BakeConvertErrorCode::InvalidPan,
            ConversionError::UnsupportedProductType(_)
            | ConversionError::UnsupportedMethod(_)
            | ConversionError::UnsupportedMixer(_) => BakeConvertErrorCode::UnsupportedTag,
            ConversionError::EmptyIngredientList => BakeConvertErrorCode::EmptyIngredientList,
            ConversionError::UnknownPieceWeight(_) => BakeConvertErrorCode::UnknownPieceWeight,
        }
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// The CString is kept here so the pointer handed out stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, BakeConvertErrorCode)> =
        const { RefCell::new((None, BakeConvertErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, BakeConvertErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, BakeConvertErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if the last call on this thread failed.
/// - `null` if the last call succeeded.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```c
/// char* out = NULL;
/// BakeConvertErrorCode err = bake_convert_recipe_json(recipe, intent, NULL, &out);
/// if (err != Ok) {
///     const char* error = bake_convert_get_last_error();
///     if (error) {
///         fprintf(stderr, "conversion failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn bake_convert_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `Ok` (0) if the last call on this thread succeeded.
#[no_mangle]
pub extern "C" fn bake_convert_get_last_error_code() -> BakeConvertErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
