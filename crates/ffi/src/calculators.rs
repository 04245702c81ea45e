//! Stateless calculators exposed one function per formula

use bake_convert_core::bakeware::{scaling_factor, volume};
use bake_convert_core::ddt::{calculate_ice_amount, calculate_water_temp, calculate_water_temp_with_preferment};
use bake_convert_core::environment::{boiling_point, pressure};
use bake_convert_core::{Celsius, Grams, Meters, PanConfig, PanFamily, Result};
use std::os::raw::c_char;

use crate::error::{BakeConvertErrorCode, DefaultConvertError};
use crate::helpers::{clear_last_error, slice_from_ptr, str_from_ptr, track_error, track_result};

/// Build a pan from a family tag and its positional dimensions.
///
/// # Safety
/// `family` must be a valid C string and `dims` must point to `len` values.
unsafe fn pan_from_parts(
    family: *const c_char,
    dims: *const f64,
    len: usize,
) -> std::result::Result<PanConfig, BakeConvertErrorCode> {
    let tag = str_from_ptr(family, "family")?;
    let dims = slice_from_ptr(dims, len, "dims")?;
    let parsed: Result<PanConfig> = tag
        .parse::<PanFamily>()
        .and_then(|f| PanConfig::from_dimensions(f, dims));
    track_result(parsed)
}

/// Volume of a pan in cm³.
///
/// # Parameters
/// - `family`: Pan family tag (`"round"`, `"loaf"`, `"chiffon"`, ...)
/// - `dims`, `len`: Dimensions in cm, in the family's positional order
/// - `out_volume`: Receives the volume
///
/// # Returns
/// - `Ok` on success, with `out_volume` set
/// - `InvalidPan` for an unknown family, wrong dimension count, or non-positive dimension
/// - `NullPointer` if any pointer is null
///
/// # Safety
/// `family` must be a valid C string, `dims` must point to `len` values and
/// `out_volume` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn bake_convert_pan_volume(
    family: *const c_char,
    dims: *const f64,
    len: usize,
    out_volume: *mut f64,
) -> BakeConvertErrorCode {
    if out_volume.is_null() {
        return track_error(&DefaultConvertError::null_pointer("out_volume"));
    }
    let pan = match pan_from_parts(family, dims, len) {
        Ok(pan) => pan,
        Err(code) => return code,
    };
    match track_result(volume(&pan)) {
        Ok(v) => {
            *out_volume = *v;
            BakeConvertErrorCode::Ok
        }
        Err(code) => code,
    }
}

/// Volume ratio from a source pan to a target pan.
///
/// # Safety
/// Same contract as [`bake_convert_pan_volume`] for both pans; `out_factor`
/// must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn bake_convert_scaling_factor(
    source_family: *const c_char,
    source_dims: *const f64,
    source_len: usize,
    target_family: *const c_char,
    target_dims: *const f64,
    target_len: usize,
    out_factor: *mut f64,
) -> BakeConvertErrorCode {
    if out_factor.is_null() {
        return track_error(&DefaultConvertError::null_pointer("out_factor"));
    }
    let source = match pan_from_parts(source_family, source_dims, source_len) {
        Ok(pan) => pan,
        Err(code) => return code,
    };
    let target = match pan_from_parts(target_family, target_dims, target_len) {
        Ok(pan) => pan,
        Err(code) => return code,
    };
    match track_result(scaling_factor(&source, &target)) {
        Ok(factor) => {
            *out_factor = factor;
            BakeConvertErrorCode::Ok
        }
        Err(code) => code,
    }
}

/// Mixing water temperature (°C) for a straight dough.
///
/// `3 × target − flour − room − friction`
#[no_mangle]
pub extern "C" fn bake_convert_water_temp(target: f64, flour: f64, room: f64, friction: f64) -> f64 {
    clear_last_error();
    *calculate_water_temp(Celsius::from(target), Celsius::from(flour), Celsius::from(room), friction)
}

/// Mixing water temperature (°C) when a pre-ferment joins the final mix.
///
/// `4 × target − flour − room − preferment − friction`
#[no_mangle]
pub extern "C" fn bake_convert_water_temp_with_preferment(
    target: f64,
    flour: f64,
    room: f64,
    preferment: f64,
    friction: f64,
) -> f64 {
    clear_last_error();
    *calculate_water_temp_with_preferment(
        Celsius::from(target),
        Celsius::from(flour),
        Celsius::from(room),
        Celsius::from(preferment),
        friction,
    )
}

/// Split `total_liquid` grams into ice and tap water so the mix lands at `target` °C.
///
/// # Returns
/// - `Ok` with `out_ice` and `out_water` set
/// - `InvalidParameter` if `total_liquid` is negative or not finite
/// - `NullPointer` if an out pointer is null
///
/// # Safety
/// `out_ice` and `out_water` must be valid pointers.
#[no_mangle]
pub unsafe extern "C" fn bake_convert_ice_split(
    total_liquid: f64,
    tap: f64,
    target: f64,
    out_ice: *mut f64,
    out_water: *mut f64,
) -> BakeConvertErrorCode {
    if out_ice.is_null() {
        return track_error(&DefaultConvertError::null_pointer("out_ice"));
    }
    if out_water.is_null() {
        return track_error(&DefaultConvertError::null_pointer("out_water"));
    }
    if !total_liquid.is_finite() || total_liquid < 0.0 {
        return track_error(&DefaultConvertError::invalid_parameter(format!(
            "total_liquid must be finite and non-negative, got {total_liquid}"
        )));
    }
    let split = calculate_ice_amount(Grams::new(total_liquid), Celsius::from(tap), Celsius::from(target));
    *out_ice = *split.ice;
    *out_water = *split.water;
    clear_last_error();
    BakeConvertErrorCode::Ok
}

/// Altitude argument as `Meters`, rejecting values the models do not cover.
fn altitude_from(altitude: f64) -> std::result::Result<Meters, BakeConvertErrorCode> {
    if !altitude.is_finite() || altitude < 0.0 {
        return Err(track_error(&DefaultConvertError::invalid_parameter(format!(
            "altitude must be finite and non-negative, got {altitude}"
        ))));
    }
    Ok(Meters::new(altitude))
}

/// Barometric pressure (kPa) at `altitude` meters.
///
/// # Safety
/// `out_pressure` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn bake_convert_pressure(altitude: f64, out_pressure: *mut f64) -> BakeConvertErrorCode {
    if out_pressure.is_null() {
        return track_error(&DefaultConvertError::null_pointer("out_pressure"));
    }
    match altitude_from(altitude) {
        Ok(altitude) => {
            *out_pressure = *pressure(altitude);
            clear_last_error();
            BakeConvertErrorCode::Ok
        }
        Err(code) => code,
    }
}

/// Boiling point of water (°C) at `altitude` meters.
///
/// # Safety
/// `out_boiling_point` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn bake_convert_boiling_point(
    altitude: f64,
    out_boiling_point: *mut f64,
) -> BakeConvertErrorCode {
    if out_boiling_point.is_null() {
        return track_error(&DefaultConvertError::null_pointer("out_boiling_point"));
    }
    match altitude_from(altitude) {
        Ok(altitude) => {
            *out_boiling_point = *boiling_point(altitude);
            clear_last_error();
            BakeConvertErrorCode::Ok
        }
        Err(code) => code,
    }
}
