//! Unit normalization
//!
//! Converts every ingredient line to grams. Mass units convert by a fixed
//! factor; volume units go through a per-ingredient density (g/ml) looked up
//! by name, then alias, then the category fallback; piece units go through the
//! piece-weight table.

use crate::core_types::{Celsius, Fahrenheit, Ingredient, IngredientCategory, MeasureUnit};
use crate::error::{ConversionError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Densities and piece weights used for volume→mass normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityTable {
    /// Lowercase ingredient name -> grams per milliliter
    pub densities: FxHashMap<String, f64>,
    /// Lowercase alias -> canonical name in `densities`
    pub aliases: FxHashMap<String, String>,
    /// Fallback density per category when the name is unknown
    pub category_defaults: FxHashMap<IngredientCategory, f64>,
    /// Lowercase ingredient name -> grams per piece
    pub piece_weights: FxHashMap<String, f64>,
}

impl Default for DensityTable {
    fn default() -> Self {
        // g/ml, from grams-per-US-cup references divided by 236.588
        let densities = [
            ("water", 1.0),
            ("milk", 1.03),
            ("buttermilk", 1.03),
            ("cream", 1.01),
            ("bread flour", 0.54),
            ("all-purpose flour", 0.53),
            ("cake flour", 0.48),
            ("whole wheat flour", 0.51),
            ("rye flour", 0.43),
            ("granulated sugar", 0.85),
            ("brown sugar", 0.93),
            ("powdered sugar", 0.51),
            ("honey", 1.42),
            ("salt", 1.22),
            ("kosher salt", 0.68),
            ("instant yeast", 0.59),
            ("active dry yeast", 0.64),
            ("baking powder", 0.81),
            ("butter", 0.96),
            ("vegetable oil", 0.92),
            ("olive oil", 0.91),
            ("egg", 1.03),
            ("milk powder", 0.46),
        ];
        let aliases = [
            ("flour", "all-purpose flour"),
            ("ap flour", "all-purpose flour"),
            ("plain flour", "all-purpose flour"),
            ("strong flour", "bread flour"),
            ("sugar", "granulated sugar"),
            ("icing sugar", "powdered sugar"),
            ("yeast", "instant yeast"),
            ("dry yeast", "active dry yeast"),
            ("oil", "vegetable oil"),
            ("eggs", "egg"),
            ("whole milk", "milk"),
            ("table salt", "salt"),
        ];
        let category_defaults = [
            (IngredientCategory::Flour, 0.53),
            (IngredientCategory::Liquid, 1.0),
            (IngredientCategory::Egg, 1.03),
            (IngredientCategory::Fat, 0.92),
            (IngredientCategory::Sugar, 0.85),
            (IngredientCategory::Salt, 1.22),
            (IngredientCategory::Leavening, 0.6),
            (IngredientCategory::Dairy, 1.03),
            (IngredientCategory::Other, 0.6),
        ];
        let piece_weights = [("egg", 50.0), ("egg yolk", 18.0), ("egg white", 32.0)];

        DensityTable {
            densities: densities
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            aliases: aliases
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            category_defaults: category_defaults.into_iter().collect(),
            piece_weights: piece_weights
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

impl DensityTable {
    /// Resolve a name through the alias map
    fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    /// Density in g/ml for an ingredient; always defined thanks to the
    /// category fallback (water density if the category is missing too)
    pub fn density_for(&self, name: &str, category: IngredientCategory) -> f64 {
        let key = name.trim().to_lowercase();
        self.densities
            .get(self.canonical(&key))
            .or_else(|| self.category_defaults.get(&category))
            .copied()
            .unwrap_or(1.0)
    }

    /// Grams per piece, if known
    pub fn piece_weight(&self, name: &str) -> Option<f64> {
        let key = name.trim().to_lowercase();
        self.piece_weights.get(self.canonical(&key)).copied()
    }
}

/// Mass in grams of an amount written in `unit`
pub fn to_grams(ingredient: &Ingredient, table: &DensityTable) -> Result<f64> {
    let amount = ingredient.amount;
    if let Some(factor) = ingredient.unit.grams_per_unit() {
        return Ok(amount * factor);
    }
    if let Some(ml) = ingredient.unit.milliliters_per_unit() {
        let density = table.density_for(&ingredient.name, ingredient.category);
        return Ok(amount * ml * density);
    }
    // Piece is the only unit that is neither mass nor volume
    table
        .piece_weight(&ingredient.name)
        .map(|w| amount * w)
        .ok_or_else(|| ConversionError::UnknownPieceWeight(ingredient.name.clone()))
}

/// Copy of the ingredient list with every amount in grams
pub fn normalize_ingredients(
    ingredients: &[Ingredient],
    table: &DensityTable,
) -> Result<Vec<Ingredient>> {
    ingredients
        .iter()
        .map(|ing| {
            if ing.unit == MeasureUnit::Gram {
                return Ok(ing.clone());
            }
            let grams = to_grams(ing, table)?;
            debug!(
                name = %ing.name,
                unit = ?ing.unit,
                amount = ing.amount,
                grams,
                "normalized ingredient to grams"
            );
            let mut out = ing.with_amount(grams);
            out.unit = MeasureUnit::Gram;
            Ok(out)
        })
        .collect()
}

/// Amount of `ingredient` (in grams) expressed in `unit`
pub fn from_grams(
    grams: f64,
    unit: MeasureUnit,
    name: &str,
    category: IngredientCategory,
    table: &DensityTable,
) -> Result<f64> {
    if let Some(factor) = unit.grams_per_unit() {
        return Ok(grams / factor);
    }
    if let Some(ml) = unit.milliliters_per_unit() {
        return Ok(grams / (ml * table.density_for(name, category)));
    }
    table
        .piece_weight(name)
        .map(|w| grams / w)
        .ok_or_else(|| ConversionError::UnknownPieceWeight(name.to_string()))
}

/// Fahrenheit to Celsius
pub fn fahrenheit_to_celsius(value: f64) -> Celsius {
    Fahrenheit::new(value).to_celsius()
}

/// Celsius to Fahrenheit
pub fn celsius_to_fahrenheit(value: f64) -> Fahrenheit {
    Celsius::new(value).to_fahrenheit()
}
