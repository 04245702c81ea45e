//! Recipe value object
//!
//! `ingredients` is always the overall formula. For split methods the
//! pre-ferment and final-dough breakdown lives in `stages` and is derived from
//! the overall formula, never the other way round.

use super::ingredient::Ingredient;
use super::units::{Celsius, Hours, Minutes};
use crate::bakeware::{PanConfig, ProductType};
use crate::formula;
use crate::method::{MethodKind, MethodSpec};
use crate::rounding::{round_temperature, round_time, round_weight};
use serde::{Deserialize, Serialize};

/// Pre-ferment and final dough of a split method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoughStages {
    /// Method the split was made for
    pub method: MethodKind,
    /// Stage 1 (sponge, poolish, biga, roux, autolyse mass, starter)
    pub preferment: Vec<Ingredient>,
    /// Stage 2; lines whose remainder rounds to zero are omitted
    pub main_dough: Vec<Ingredient>,
    /// How long stage 1 rests before the final mix
    pub preferment_hours: Hours,
}

impl DoughStages {
    /// Flour in both stages together
    pub fn total_flour(&self) -> f64 {
        formula::total_flour(&self.preferment) + formula::total_flour(&self.main_dough)
    }

    fn rounded(&self) -> DoughStages {
        DoughStages {
            method: self.method,
            preferment: round_lines(&self.preferment),
            main_dough: round_lines(&self.main_dough),
            preferment_hours: self.preferment_hours,
        }
    }
}

fn default_yield() -> f64 {
    1.0
}

/// A baking recipe: ingredients plus process metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    /// Overall formula
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub method: MethodSpec,
    pub pan: PanConfig,
    /// Product category, when known; enables magic-number dough sizing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductType>,
    /// Servings or pieces the formula makes
    #[serde(default = "default_yield")]
    pub yield_count: f64,
    pub baking_temp: Celsius,
    pub baking_time: Minutes,
    /// Bulk fermentation time
    #[serde(default)]
    pub fermentation_time: Hours,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<DoughStages>,
}

impl Recipe {
    /// Straight-dough recipe with one yield, 180 °C for 30 minutes
    pub fn new(name: impl Into<String>, ingredients: Vec<Ingredient>, pan: PanConfig) -> Self {
        Recipe {
            name: name.into(),
            ingredients,
            method: MethodSpec::Straight,
            pan,
            product: None,
            yield_count: default_yield(),
            baking_temp: Celsius::new(180.0),
            baking_time: Minutes::new(30.0),
            fermentation_time: Hours::default(),
            stages: None,
        }
    }

    pub fn with_product(mut self, product: ProductType) -> Self {
        self.product = Some(product);
        self
    }

    pub fn with_yield(mut self, yield_count: f64) -> Self {
        self.yield_count = yield_count;
        self
    }

    pub fn with_bake(mut self, temp: Celsius, time: Minutes) -> Self {
        self.baking_temp = temp;
        self.baking_time = time;
        self
    }

    pub fn with_fermentation(mut self, time: Hours) -> Self {
        self.fermentation_time = time;
        self
    }

    pub fn total_flour(&self) -> f64 {
        formula::total_flour(&self.ingredients)
    }

    pub fn total_weight(&self) -> f64 {
        formula::total_weight(&self.ingredients)
    }

    pub fn hydration(&self) -> f64 {
        formula::hydration(&self.ingredients)
    }

    /// Copy rounded for display: weights to 0.1 g, temperature to whole
    /// degrees, times to whole minutes
    pub fn rounded(&self) -> Recipe {
        let fermentation_minutes = round_time(*self.fermentation_time.to_minutes());
        Recipe {
            ingredients: round_lines(&self.ingredients),
            baking_temp: Celsius::new(round_temperature(*self.baking_temp)),
            baking_time: Minutes::new(round_time(*self.baking_time)),
            fermentation_time: Minutes::new(fermentation_minutes).to_hours(),
            stages: self.stages.as_ref().map(DoughStages::rounded),
            ..self.clone()
        }
    }
}

fn round_lines(lines: &[Ingredient]) -> Vec<Ingredient> {
    lines
        .iter()
        .map(|i| i.with_amount(round_weight(i.amount)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::IngredientCategory;

    #[test]
    fn test_rounded_copy_leaves_source_untouched() {
        let recipe = Recipe::new(
            "Rolls",
            vec![
                Ingredient::flour("Bread flour", 333.333),
                Ingredient::new("Water", 216.666, IngredientCategory::Liquid),
            ],
            PanConfig::rectangle(30.0, 20.0, 5.0),
        )
        .with_bake(Celsius::new(176.67), Minutes::new(27.5))
        .with_fermentation(Hours::new(1.26));

        let r = recipe.rounded();
        assert_eq!(r.ingredients[0].amount, 333.3);
        assert_eq!(r.ingredients[1].amount, 216.7);
        assert_eq!(*r.baking_temp, 177.0);
        assert_eq!(*r.baking_time, 28.0);
        assert!((*r.fermentation_time.to_minutes() - 76.0).abs() < 1e-9);
        assert_eq!(recipe.ingredients[0].amount, 333.333);
    }

    #[test]
    fn test_serde_defaults() {
        let json = r#"{
            "name": "Loaf",
            "ingredients": [
                {"name": "Flour", "amount": 500, "category": "flour"},
                {"name": "Water", "amount": 350, "category": "liquid"}
            ],
            "pan": {"family": "round", "diameter": 20, "height": 8},
            "bakingTemp": 220,
            "bakingTime": 35
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.method, MethodSpec::Straight);
        assert_eq!(recipe.yield_count, 1.0);
        assert!(recipe.stages.is_none());
        assert!((recipe.hydration() - 70.0).abs() < 1e-9);
    }
}
