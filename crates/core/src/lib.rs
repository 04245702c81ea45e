//! Recipe Conversion Engine
//!
//! Converts a baking recipe between equivalent representations while keeping
//! its essential ratios (hydration, baker's percentages):
//! - Different bakeware, through exact pan volumes and magic numbers
//! - Different batch sizes, by multiplier, yield, piece weight or flour weight
//! - Different pre-fermentation methods (sponge, poolish, biga, tangzhong,
//!   autolyse, cold retard, sourdough) and back
//! - A target dough temperature, by solving the mixing water temperature
//! - The kitchen's temperature, humidity and altitude
//!
//! Every function is a pure computation over its inputs. The
//! [`ConversionEngine`] holds only the injected [`ConversionTables`] and
//! returns a fresh [`Recipe`] for every call.
//!
//! ```
//! use bake_convert_core::{ConversionEngine, ConversionIntent, Ingredient, IngredientCategory, PanConfig, Recipe};
//!
//! let recipe = Recipe::new(
//!     "Country loaf",
//!     vec![
//!         Ingredient::flour("Bread flour", 500.0),
//!         Ingredient::new("Water", 350.0, IngredientCategory::Liquid),
//!         Ingredient::new("Salt", 10.0, IngredientCategory::Salt),
//!         Ingredient::new("Instant yeast", 5.0, IngredientCategory::Leavening),
//!     ],
//!     PanConfig::round(20.0, 8.0),
//! );
//! let engine = ConversionEngine::default();
//! let out = engine
//!     .convert(&recipe, &ConversionIntent::PanChange { pan: PanConfig::round(24.0, 8.0) })
//!     .unwrap();
//! assert!((out.summary.hydration_after - 70.0).abs() < 1e-9);
//! ```

// Core types and utilities
pub mod core_types;

// Components
pub mod bakeware;
pub mod ddt;
pub mod environment;
pub mod formula;
pub mod measure;
pub mod method;

// Orchestration
pub mod conversion;
pub mod error;
pub mod rounding;
pub mod tables;

// Re-export core types
pub use core_types::{Celsius, CubicCentimeters, Grams, Hours, Meters, Minutes};
pub use core_types::{DoughStages, Ingredient, IngredientCategory, MeasureUnit, Recipe};

// Re-export component types
pub use bakeware::{MagicNumberTable, PanAllocation, PanConfig, PanFamily, PanMaterial, ProductType};
pub use ddt::{DdtPlan, DdtRequest, MixerType};
pub use environment::{Environment, EnvironmentEvaluation};
pub use method::{MethodKind, MethodSpec, PrefermentParams};

// Re-export orchestration types
pub use conversion::{
    CompositeIntent, ConversionEngine, ConversionIntent, ConversionOutcome, ConversionSummary,
    IngredientDiff, QuantityTarget,
};
pub use error::{ConversionError, ConversionWarning, Result};
pub use tables::ConversionTables;
