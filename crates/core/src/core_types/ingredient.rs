//! Ingredient lines
//!
//! An [`Ingredient`] is one line of a formula. Its `amount` is expressed in
//! `unit`; once the orchestrator has normalized a recipe every amount is in
//! grams and the math components treat it as mass.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ingredient category, used to decide which lines count as flour, which
/// hydrate the dough, and which get method/environment specific treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IngredientCategory {
    /// Any milled grain; denominator of baker's percentages
    Flour,
    /// Water, milk and other free liquid
    Liquid,
    /// Whole egg, yolk or white
    Egg,
    /// Butter, oil, shortening
    Fat,
    /// Sugar, honey, malt
    Sugar,
    /// Salt
    Salt,
    /// Yeast, baking powder, commercial leaveners
    Leavening,
    /// Milk powder, cheese, cream that is not counted as free liquid
    Dairy,
    /// Everything else (seeds, inclusions, flavourings)
    Other,
}

impl IngredientCategory {
    /// Lowercase tag used in serialized data and CLI input
    pub fn as_str(self) -> &'static str {
        match self {
            IngredientCategory::Flour => "flour",
            IngredientCategory::Liquid => "liquid",
            IngredientCategory::Egg => "egg",
            IngredientCategory::Fat => "fat",
            IngredientCategory::Sugar => "sugar",
            IngredientCategory::Salt => "salt",
            IngredientCategory::Leavening => "leavening",
            IngredientCategory::Dairy => "dairy",
            IngredientCategory::Other => "other",
        }
    }
}

impl fmt::Display for IngredientCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit an ingredient amount is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasureUnit {
    #[default]
    Gram,
    Kilogram,
    Milligram,
    Ounce,
    Pound,
    Milliliter,
    Liter,
    Teaspoon,
    Tablespoon,
    Cup,
    FluidOunce,
    /// Countable item (one egg); weight comes from the piece-weight table
    Piece,
}

impl MeasureUnit {
    /// Grams per unit for mass units, `None` for volume and piece units
    pub fn grams_per_unit(self) -> Option<f64> {
        match self {
            MeasureUnit::Gram => Some(1.0),
            MeasureUnit::Kilogram => Some(1000.0),
            MeasureUnit::Milligram => Some(0.001),
            MeasureUnit::Ounce => Some(28.349523125),
            MeasureUnit::Pound => Some(453.59237),
            _ => None,
        }
    }

    /// Milliliters per unit for volume units, `None` otherwise
    ///
    /// US customary measures (cup = 236.588 ml).
    pub fn milliliters_per_unit(self) -> Option<f64> {
        match self {
            MeasureUnit::Milliliter => Some(1.0),
            MeasureUnit::Liter => Some(1000.0),
            MeasureUnit::Teaspoon => Some(4.92892),
            MeasureUnit::Tablespoon => Some(14.78676),
            MeasureUnit::Cup => Some(236.588),
            MeasureUnit::FluidOunce => Some(29.57353),
            _ => None,
        }
    }

    /// Whether the unit measures mass directly
    pub fn is_mass(self) -> bool {
        self.grams_per_unit().is_some()
    }

    /// Whether the unit measures volume
    pub fn is_volume(self) -> bool {
        self.milliliters_per_unit().is_some()
    }
}

/// One line of a recipe formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    /// Display name ("Bread flour", "Water")
    pub name: String,
    /// Quantity in `unit`; non-negative
    pub amount: f64,
    /// Unit of `amount`
    #[serde(default)]
    pub unit: MeasureUnit,
    /// Category used by every component to decide treatment
    pub category: IngredientCategory,
    /// Counts toward total flour even outside the flour category
    /// (e.g. a nut meal replacing part of the flour)
    #[serde(default)]
    pub is_flour: bool,
}

impl Ingredient {
    /// Create an ingredient measured in grams
    pub fn new(name: impl Into<String>, amount: f64, category: IngredientCategory) -> Self {
        Ingredient {
            name: name.into(),
            amount,
            unit: MeasureUnit::Gram,
            category,
            is_flour: false,
        }
    }

    /// Shorthand for a flour line in grams
    pub fn flour(name: impl Into<String>, amount: f64) -> Self {
        Self::new(name, amount, IngredientCategory::Flour)
    }

    /// Set the unit (builder style)
    pub fn with_unit(mut self, unit: MeasureUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Mark a non-flour category line as a flour contributor
    pub fn counted_as_flour(mut self) -> Self {
        self.is_flour = true;
        self
    }

    /// Copy of this line with a different amount
    pub fn with_amount(&self, amount: f64) -> Self {
        Ingredient {
            amount,
            ..self.clone()
        }
    }

    /// Contributes to the baker's percentage denominator
    #[inline]
    pub fn counts_as_flour(&self) -> bool {
        self.category == IngredientCategory::Flour || self.is_flour
    }

    /// Contributes to hydration (liquid and egg)
    #[inline]
    pub fn is_hydrating(&self) -> bool {
        matches!(
            self.category,
            IngredientCategory::Liquid | IngredientCategory::Egg
        )
    }

    /// Same name and category (used to match lines across conversions)
    pub fn same_line(&self, other: &Ingredient) -> bool {
        self.category == other.category && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.1} {:?} ({})", self.name, self.amount, self.unit, self.category)
    }
}

/// Sum of amounts of the lines matching `pred`
pub(crate) fn sum_where(ingredients: &[Ingredient], pred: impl Fn(&Ingredient) -> bool) -> f64 {
    ingredients
        .iter()
        .filter(|i| pred(i))
        .map(|i| i.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_marks_non_flour_as_flour() {
        let almond = Ingredient::new("Almond meal", 50.0, IngredientCategory::Other).counted_as_flour();
        assert!(almond.counts_as_flour());
        assert!(!Ingredient::new("Sugar", 50.0, IngredientCategory::Sugar).counts_as_flour());
    }

    #[test]
    fn test_hydrating_categories() {
        assert!(Ingredient::new("Water", 1.0, IngredientCategory::Liquid).is_hydrating());
        assert!(Ingredient::new("Egg", 1.0, IngredientCategory::Egg).is_hydrating());
        assert!(!Ingredient::new("Butter", 1.0, IngredientCategory::Fat).is_hydrating());
        assert!(!Ingredient::new("Milk powder", 1.0, IngredientCategory::Dairy).is_hydrating());
    }

    #[test]
    fn test_unit_kinds() {
        assert!(MeasureUnit::Pound.is_mass());
        assert!(MeasureUnit::Cup.is_volume());
        assert!(!MeasureUnit::Piece.is_mass());
        assert!(!MeasureUnit::Piece.is_volume());
    }

    #[test]
    fn test_same_line_ignores_case() {
        let a = Ingredient::new("Water", 100.0, IngredientCategory::Liquid);
        let b = Ingredient::new("water", 300.0, IngredientCategory::Liquid);
        let c = Ingredient::new("water", 300.0, IngredientCategory::Dairy);
        assert!(a.same_line(&b));
        assert!(!a.same_line(&c));
    }
}
