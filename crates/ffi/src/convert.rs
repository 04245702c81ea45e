//! JSON entry point to the conversion engine
//!
//! Recipes, intents and tables cross the boundary as JSON in the same shape
//! the core crate serializes them. The result string is owned by Rust and
//! must be released with [`bake_convert_string_free`].

use bake_convert_core::{ConversionEngine, ConversionIntent, ConversionTables, Recipe};
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;
use tracing::debug;

use crate::error::{BakeConvertErrorCode, DefaultConvertError};
use crate::helpers::{json_from_ptr, track_error, track_result};

/// Convert a recipe.
///
/// # Parameters
/// - `recipe_json`: The source recipe
/// - `intent_json`: The conversion intent (`{"type": "panChange", ...}`)
/// - `tables_json`: Lookup tables, or null for the built-in defaults
/// - `out_json`: Receives the conversion outcome (recipe, diffs, summary) as JSON
///
/// # Returns
/// - `Ok` on success, with `*out_json` set
/// - `InvalidJson` / `InvalidUtf8` if an argument does not parse
/// - The code matching the conversion failure otherwise; see `bake_convert_get_last_error`
///
/// # Safety
/// `recipe_json` and `intent_json` must be valid C strings, `tables_json`
/// must be null or a valid C string, and `out_json` must be a valid pointer.
/// Free `*out_json` with `bake_convert_string_free`.
#[no_mangle]
pub unsafe extern "C" fn bake_convert_recipe_json(
    recipe_json: *const c_char,
    intent_json: *const c_char,
    tables_json: *const c_char,
    out_json: *mut *mut c_char,
) -> BakeConvertErrorCode {
    if out_json.is_null() {
        return track_error(&DefaultConvertError::null_pointer("out_json"));
    }
    *out_json = ptr::null_mut();

    let recipe: Recipe = match json_from_ptr(recipe_json, "recipe_json") {
        Ok(recipe) => recipe,
        Err(code) => return code,
    };
    let intent: ConversionIntent = match json_from_ptr(intent_json, "intent_json") {
        Ok(intent) => intent,
        Err(code) => return code,
    };
    let tables = if tables_json.is_null() {
        ConversionTables::default()
    } else {
        match json_from_ptr(tables_json, "tables_json") {
            Ok(tables) => tables,
            Err(code) => return code,
        }
    };

    let engine = ConversionEngine::new(tables);
    let outcome = match track_result(engine.convert(&recipe, &intent)) {
        Ok(outcome) => outcome,
        Err(code) => return code,
    };
    let text = match serde_json::to_string(&outcome) {
        Ok(text) => text,
        Err(e) => {
            return track_error(&DefaultConvertError::invalid_parameter(format!(
                "failed to serialize conversion outcome: {e}"
            )))
        }
    };
    match CString::new(text) {
        Ok(cstring) => {
            debug!(recipe = %outcome.recipe.name, "conversion returned over FFI");
            *out_json = cstring.into_raw();
            BakeConvertErrorCode::Ok
        }
        Err(_) => track_error(&DefaultConvertError::invalid_parameter(
            "conversion outcome contains an interior NUL byte".to_string(),
        )),
    }
}

/// Free a string returned by this library. Null is a no-op.
///
/// # Safety
/// `ptr` must be null or a pointer obtained from this library that has not
/// been freed yet.
#[no_mangle]
pub unsafe extern "C" fn bake_convert_string_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}
