//! Ambient environment adjustment
//!
//! Kitchen temperature, humidity and altitude change how a formula behaves:
//! - Humidity: dry air means flour carries less moisture (more flour, less
//!   liquid); humid air the opposite. Coarse step at ≤40% and ≥70%.
//! - Temperature: yeast works faster when warm, so leavening and fermentation
//!   time shrink above 25 °C and grow below it.
//! - Altitude: lower pressure lowers the boiling point. Above 1000 m the oven
//!   runs 10 °C hotter and bakes 10% longer.
//!
//! Pressure uses the isothermal barometric model, boiling point the
//! Clausius-Clapeyron fit in inHg/°F converted back to SI.

use crate::core_types::units::{Celsius, Fahrenheit, Kilopascals, Meters};
use crate::core_types::{Ingredient, IngredientCategory};
use crate::error::ConversionWarning;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scale height of the barometric model (m)
pub const SCALE_HEIGHT: f64 = 8434.0;

/// Ambient conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Room temperature
    pub temp: Celsius,
    /// Relative humidity, 0–100 %
    pub humidity: f64,
    pub altitude: Meters,
}

impl Environment {
    pub fn new(temp: Celsius, humidity: f64, altitude: Meters) -> Self {
        Environment {
            temp,
            humidity: humidity.clamp(0.0, 100.0),
            altitude,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            temp: Celsius::new(25.0),
            humidity: 55.0,
            altitude: Meters::SEA_LEVEL,
        }
    }
}

/// Thresholds and factors for environment adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentTable {
    /// Temperature at which no leavening/time correction applies
    pub reference_temp: f64,
    /// Leavening base per `temp_step` degrees above reference
    pub warm_leavening_base: f64,
    /// Leavening base per `temp_step` degrees below reference
    pub cool_leavening_base: f64,
    pub temp_step: f64,
    /// Fermentation rate multiplier per 10 °C
    pub fermentation_q10: f64,

    pub dry_humidity: f64,
    pub humid_humidity: f64,
    pub dry_flour_factor: f64,
    pub dry_liquid_factor: f64,
    pub humid_flour_factor: f64,
    pub humid_liquid_factor: f64,

    /// Altitude above which the oven correction applies (m)
    pub oven_bump_altitude: f64,
    pub oven_bump: f64,
    pub baking_time_factor: f64,

    pub cold_room: f64,
    pub hot_room: f64,
    pub low_humidity: f64,
    pub high_humidity: f64,
    pub high_altitude: f64,
}

impl Default for EnvironmentTable {
    fn default() -> Self {
        EnvironmentTable {
            reference_temp: 25.0,
            warm_leavening_base: 0.975,
            cool_leavening_base: 1.05,
            temp_step: 2.0,
            fermentation_q10: 2.0,
            dry_humidity: 40.0,
            humid_humidity: 70.0,
            dry_flour_factor: 1.02,
            dry_liquid_factor: 0.98,
            humid_flour_factor: 0.98,
            humid_liquid_factor: 1.02,
            oven_bump_altitude: 1000.0,
            oven_bump: 10.0,
            baking_time_factor: 1.1,
            cold_room: 18.0,
            hot_room: 30.0,
            low_humidity: 30.0,
            high_humidity: 80.0,
            high_altitude: 900.0,
        }
    }
}

/// Atmospheric pressure at `altitude`: `101.325·e^(−h/8434)` kPa
pub fn pressure(altitude: Meters) -> Kilopascals {
    Kilopascals::new(*Kilopascals::SEA_LEVEL * (-*altitude / SCALE_HEIGHT).exp())
}

/// Boiling point of water at `altitude`
///
/// `49.161·ln(P) + 44.932` with P in inHg gives °F; 100 °C at sea level.
pub fn boiling_point(altitude: Meters) -> Celsius {
    let in_hg = pressure(altitude).to_inches_of_mercury();
    Fahrenheit::new(49.161 * in_hg.ln() + 44.932).to_celsius()
}

/// `(flour, liquid)` multipliers for a relative humidity
pub fn humidity_factors(humidity: f64, table: &EnvironmentTable) -> (f64, f64) {
    if humidity <= table.dry_humidity {
        (table.dry_flour_factor, table.dry_liquid_factor)
    } else if humidity >= table.humid_humidity {
        (table.humid_flour_factor, table.humid_liquid_factor)
    } else {
        (1.0, 1.0)
    }
}

/// Leavening multiplier: `0.975^((T−25)/2)` when warm, `1.05^((25−T)/2)` when cool
pub fn leavening_factor(temp: Celsius, table: &EnvironmentTable) -> f64 {
    let delta = *temp - table.reference_temp;
    if delta > 0.0 {
        table.warm_leavening_base.powf(delta / table.temp_step)
    } else if delta < 0.0 {
        table.cool_leavening_base.powf(-delta / table.temp_step)
    } else {
        1.0
    }
}

/// Fermentation time multiplier: `q10^((25−T)/10)`
pub fn fermentation_time_factor(temp: Celsius, table: &EnvironmentTable) -> f64 {
    table
        .fermentation_q10
        .powf((table.reference_temp - *temp) / 10.0)
}

/// Oven temperature offset (°C) and baking time multiplier for an altitude
pub fn altitude_process_adjustment(altitude: Meters, table: &EnvironmentTable) -> (f64, f64) {
    if *altitude > table.oven_bump_altitude {
        (table.oven_bump, table.baking_time_factor)
    } else {
        (0.0, 1.0)
    }
}

/// Overall assessment of an environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnvironmentStatus {
    Normal,
    Caution,
}

/// Advisory result of [`evaluate_environment`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentEvaluation {
    pub overall: EnvironmentStatus,
    pub warnings: Vec<String>,
    /// Same length as `warnings`; one recommendation per warning
    pub recommendations: Vec<String>,
}

impl EnvironmentEvaluation {
    /// Warnings paired with their recommendations
    pub fn to_warnings(&self) -> Vec<ConversionWarning> {
        self.warnings
            .iter()
            .zip(&self.recommendations)
            .map(|(warning, recommendation)| ConversionWarning::Environment {
                warning: warning.clone(),
                recommendation: recommendation.clone(),
            })
            .collect()
    }
}

/// Threshold checks on temperature, humidity and altitude
pub fn evaluate_environment(env: &Environment, table: &EnvironmentTable) -> EnvironmentEvaluation {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let temp = *env.temp;

    if temp < table.cold_room {
        pairs.push((
            format!("room temperature {temp:.1}°C is cold; fermentation will be slow"),
            "use warmer water or a proofing box, and allow extra proofing time".into(),
        ));
    } else if temp > table.hot_room {
        pairs.push((
            format!("room temperature {temp:.1}°C is hot; dough may over-proof"),
            "use cold water, reduce yeast and watch the dough rather than the clock".into(),
        ));
    }

    if env.humidity < table.low_humidity {
        pairs.push((
            format!("humidity {:.0}% is low; dough surfaces will dry out", env.humidity),
            "cover the dough while it rests and consider a little more liquid".into(),
        ));
    } else if env.humidity > table.high_humidity {
        pairs.push((
            format!("humidity {:.0}% is high; flour will absorb less water", env.humidity),
            "hold back some liquid and add it only if the dough needs it".into(),
        ));
    }

    if *env.altitude > table.high_altitude {
        pairs.push((
            format!(
                "altitude {:.0} m lowers the boiling point to {:.1}°C",
                *env.altitude,
                *boiling_point(env.altitude)
            ),
            "reduce leavening slightly, raise oven temperature and shorten proofing".into(),
        ));
    }

    let overall = if pairs.is_empty() {
        EnvironmentStatus::Normal
    } else {
        EnvironmentStatus::Caution
    };
    let (warnings, recommendations) = pairs.into_iter().unzip();
    EnvironmentEvaluation {
        overall,
        warnings,
        recommendations,
    }
}

/// Process-level effects of an environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentFactors {
    pub flour_factor: f64,
    pub liquid_factor: f64,
    pub leavening_factor: f64,
    pub fermentation_time_factor: f64,
    /// Added to the baking temperature (°C)
    pub oven_temp_offset: f64,
    pub baking_time_factor: f64,
    pub pressure: Kilopascals,
    pub boiling_point: Celsius,
    pub evaluation: EnvironmentEvaluation,
}

/// Every factor for `env`, without touching any ingredients
pub fn factors(env: &Environment, table: &EnvironmentTable) -> EnvironmentFactors {
    let (flour_factor, liquid_factor) = humidity_factors(env.humidity, table);
    let (oven_temp_offset, baking_time_factor) = altitude_process_adjustment(env.altitude, table);
    EnvironmentFactors {
        flour_factor,
        liquid_factor,
        leavening_factor: leavening_factor(env.temp, table),
        fermentation_time_factor: fermentation_time_factor(env.temp, table),
        oven_temp_offset,
        baking_time_factor,
        pressure: pressure(env.altitude),
        boiling_point: boiling_point(env.altitude),
        evaluation: evaluate_environment(env, table),
    }
}

/// Adjusted ingredients together with the factors that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentAdjustment {
    pub ingredients: Vec<Ingredient>,
    pub factors: EnvironmentFactors,
}

/// Adjust ingredient quantities and compute process corrections
///
/// Flour lines (including those flagged as flour) get the flour factor, the
/// liquid category gets the liquid factor, leavening the temperature factor.
pub fn adjust(ingredients: &[Ingredient], env: &Environment, table: &EnvironmentTable) -> EnvironmentAdjustment {
    let factors = factors(env, table);
    let adjusted = ingredients
        .iter()
        .map(|ing| {
            let factor = if ing.counts_as_flour() {
                factors.flour_factor
            } else {
                match ing.category {
                    IngredientCategory::Liquid => factors.liquid_factor,
                    IngredientCategory::Leavening => factors.leavening_factor,
                    _ => 1.0,
                }
            };
            ing.with_amount(ing.amount * factor)
        })
        .collect();

    debug!(
        temp = *env.temp,
        humidity = env.humidity,
        altitude = *env.altitude,
        flour_factor = factors.flour_factor,
        liquid_factor = factors.liquid_factor,
        leavening_factor = factors.leavening_factor,
        oven_temp_offset = factors.oven_temp_offset,
        "environment adjustment"
    );
    EnvironmentAdjustment {
        ingredients: adjusted,
        factors,
    }
}
