//! Error and warning types
//!
//! Two severities:
//! - [`ConversionError`] aborts a conversion. It is a precondition violation
//!   the caller has to fix before retrying.
//! - [`ConversionWarning`] is advisory. The conversion proceeds and the warning
//!   rides along in the result, because bakers use unusual ratios on purpose.

use crate::method::MethodKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard failure of a conversion
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Flour weight used as a baker's-percentage denominator is not positive
    #[error("flour weight must be positive, got {0}")]
    InvalidFlourWeight(f64),

    /// Scale factor (or a factor derived from yields/piece weights) is not positive and finite
    #[error("scale factor must be positive and finite, got {0}")]
    InvalidScaleFactor(f64),

    /// Pan family tag outside the supported set
    #[error("unsupported pan family '{0}'")]
    UnsupportedPanFamily(String),

    /// Conversion requested on a recipe without ingredients
    #[error("ingredient list is empty")]
    EmptyIngredientList,

    /// A pan dimension is zero, negative, or not finite
    #[error("pan dimension '{dimension}' must be finite and positive, got {value}")]
    InvalidPanDimension {
        /// Dimension name ("diameter", "innerDiameter", ...)
        dimension: &'static str,
        /// Offending value
        value: f64,
    },

    /// Positional dimension list has the wrong length for the family
    #[error("pan family '{family}' takes {expected} dimensions, got {got}")]
    DimensionCount {
        /// Family tag
        family: &'static str,
        /// Number of dimensions the family needs
        expected: usize,
        /// Number supplied
        got: usize,
    },

    /// Ingredient measured in pieces with no known piece weight
    #[error("no piece weight known for '{0}'")]
    UnknownPieceWeight(String),

    /// Product type tag not present in the magic number table
    #[error("unsupported product type '{0}'")]
    UnsupportedProductType(String),

    /// Method tag outside the supported set
    #[error("unsupported method '{0}'")]
    UnsupportedMethod(String),

    /// Mixer tag outside the friction table's set
    #[error("unsupported mixer '{0}'")]
    UnsupportedMixer(String),

    /// Multi-pan distribution called without pans
    #[error("pan list is empty")]
    EmptyPanList,
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ConversionError>;

/// Advisory message attached to a conversion result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConversionWarning {
    /// Not enough liquid in the formula to hydrate the pre-ferment as specified;
    /// all available liquid went into the pre-ferment
    InsufficientLiquid {
        method: MethodKind,
        required: f64,
        available: f64,
    },
    /// Hydration outside the range where dough handles normally
    HydrationOutOfRange { hydration: f64, min: f64, max: f64 },
    /// Salt baker's percentage outside the usual range
    SaltOutOfRange { percent: f64, min: f64, max: f64 },
    /// Commercial leavening baker's percentage outside the usual range
    LeaveningOutOfRange { percent: f64, min: f64, max: f64 },
    /// Extreme ambient condition
    Environment {
        warning: String,
        recommendation: String,
    },
    /// Mixing water would have to be colder than ice can make it
    DoughTemperatureUnreachable {
        required_water_temp: f64,
        predicted_dough_temp: f64,
    },
    /// Mixing water hot enough to damage yeast
    WaterTooHot { water_temp: f64 },
    /// Reverting a sourdough formula cannot recover its commercial leavening
    LeaveningNotRestored { method: MethodKind },
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionWarning::InsufficientLiquid {
                method,
                required,
                available,
            } => write!(
                f,
                "{method} needs {required:.1} g liquid but the formula only has {available:.1} g; the split is approximate"
            ),
            ConversionWarning::HydrationOutOfRange {
                hydration,
                min,
                max,
            } => {
                if hydration < min {
                    write!(f, "hydration below {min:.0}% ({hydration:.1}%): dough will be stiff and dry")
                } else {
                    write!(f, "hydration above {max:.0}% ({hydration:.1}%): dough will be slack and hard to shape")
                }
            }
            ConversionWarning::SaltOutOfRange { percent, min, max } => {
                if percent < min {
                    write!(f, "salt below {min}% ({percent:.2}%): flavour and gluten strength suffer")
                } else {
                    write!(f, "salt above {max}% ({percent:.2}%): fermentation will be inhibited")
                }
            }
            ConversionWarning::LeaveningOutOfRange { percent, min, max } => {
                if percent < min {
                    write!(f, "leavening below {min}% ({percent:.2}%): expect a long, slow rise")
                } else {
                    write!(f, "leavening above {max}% ({percent:.2}%): risk of over-proofing and yeasty flavour")
                }
            }
            ConversionWarning::Environment {
                warning,
                recommendation,
            } => write!(f, "{warning} ({recommendation})"),
            ConversionWarning::DoughTemperatureUnreachable {
                required_water_temp,
                predicted_dough_temp,
            } => write!(
                f,
                "water would need to be {required_water_temp:.1}°C; with ice water the dough will reach about {predicted_dough_temp:.1}°C"
            ),
            ConversionWarning::WaterTooHot { water_temp } => write!(
                f,
                "water at {water_temp:.1}°C will damage the yeast; chill the dry ingredients instead"
            ),
            ConversionWarning::LeaveningNotRestored { method } => write!(
                f,
                "{method} formula carries no commercial leavening; add yeast before baking it straight"
            ),
        }
    }
}
