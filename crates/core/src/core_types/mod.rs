//! Core types and utilities

pub mod ingredient;
pub mod recipe;
pub mod units;

pub use ingredient::{Ingredient, IngredientCategory, MeasureUnit};
pub use recipe::{DoughStages, Recipe};
pub use units::*;
