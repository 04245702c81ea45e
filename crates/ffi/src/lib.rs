//! C ABI for the recipe conversion engine
//!
//! Two surfaces:
//! - Stateless calculators (pan volume, scaling factor, water temperature,
//!   ice split, pressure, boiling point) taking and returning plain numbers
//! - A JSON entry point running a full conversion
//!
//! Every fallible function returns a [`BakeConvertErrorCode`] and records a
//! per-thread message readable with `bake_convert_get_last_error`.

mod calculators;
mod convert;
mod error;
mod helpers;

pub use calculators::{
    bake_convert_boiling_point, bake_convert_ice_split, bake_convert_pan_volume, bake_convert_pressure,
    bake_convert_scaling_factor, bake_convert_water_temp, bake_convert_water_temp_with_preferment,
};
pub use convert::{bake_convert_recipe_json, bake_convert_string_free};
pub use error::{bake_convert_get_last_error, bake_convert_get_last_error_code, BakeConvertErrorCode};
