//! Straight-dough to pre-ferment splits
//!
//! Total flour and total liquid are computed once. The pre-ferment takes
//! `flour_ratio` of every flour line, enough liquid for its hydration (drawn
//! proportionally from every liquid line), and leavening per the method's
//! rule. Everything else is the final dough. Each line is split, never
//! rebalanced, so neither stage can go negative and flour is conserved
//! exactly.

use super::ratios::{LeaveningRule, MethodRatio, MethodRatioTable};
use super::MethodKind;
use crate::core_types::ingredient::sum_where;
use crate::core_types::{Ingredient, IngredientCategory};
use crate::error::{ConversionError, ConversionWarning, Result};
use crate::formula::total_flour;
use crate::rounding::round_weight;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Two-stage result of a split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSplit {
    pub preferment: Vec<Ingredient>,
    pub main_dough: Vec<Ingredient>,
    pub warnings: Vec<ConversionWarning>,
}

fn is_liquid(ing: &Ingredient) -> bool {
    ing.category == IngredientCategory::Liquid
}

fn is_leavening(ing: &Ingredient) -> bool {
    ing.category == IngredientCategory::Leavening
}

/// Split `ingredients` for `kind` with an explicit ratio
pub fn split(ingredients: &[Ingredient], kind: MethodKind, ratio: &MethodRatio) -> Result<MethodSplit> {
    let flour = total_flour(ingredients);
    if flour <= 0.0 || !flour.is_finite() {
        return Err(ConversionError::InvalidFlourWeight(flour));
    }

    let pre_flour = flour * ratio.flour_ratio;
    let liquid_total = sum_where(ingredients, is_liquid);
    let leavening_total = sum_where(ingredients, is_leavening);
    let mut warnings = Vec::new();

    let liquid_share = match ratio.hydration {
        None => 1.0,
        Some(hydration) => {
            let required = pre_flour * hydration;
            if liquid_total + 1e-9 < required {
                warn!(
                    method = %kind,
                    required,
                    available = liquid_total,
                    "not enough liquid for the pre-ferment"
                );
                warnings.push(ConversionWarning::InsufficientLiquid {
                    method: kind,
                    required,
                    available: liquid_total,
                });
            }
            if liquid_total > 0.0 {
                (required / liquid_total).min(1.0)
            } else {
                0.0
            }
        }
    };

    let leavening_share = match ratio.leavening {
        LeaveningRule::MoveAll => 1.0,
        LeaveningRule::FractionOfPrefermentFlour(fraction) if leavening_total > 0.0 => {
            (pre_flour * fraction / leavening_total).min(1.0)
        }
        LeaveningRule::FractionOfPrefermentFlour(_) | LeaveningRule::None | LeaveningRule::Replace => 0.0,
    };

    let mut preferment = Vec::new();
    let mut main_dough = Vec::new();
    for ing in ingredients {
        if ratio.leavening == LeaveningRule::Replace && is_leavening(ing) {
            continue;
        }
        let share = if ing.counts_as_flour() {
            ratio.flour_ratio
        } else if is_liquid(ing) {
            liquid_share
        } else if is_leavening(ing) {
            leavening_share
        } else {
            0.0
        };

        let pre_amount = ing.amount * share;
        let main_amount = ing.amount - pre_amount;
        if pre_amount > 0.0 {
            preferment.push(ing.with_amount(pre_amount));
        }
        if round_weight(main_amount) > 0.0 {
            main_dough.push(ing.with_amount(main_amount));
        }
    }

    debug!(
        method = %kind,
        pre_flour,
        liquid_share,
        leavening_share,
        preferment_lines = preferment.len(),
        main_lines = main_dough.len(),
        "split formula"
    );

    Ok(MethodSplit {
        preferment,
        main_dough,
        warnings,
    })
}

/// Remove commercial leavening (sourdough replaces it with the starter)
pub fn without_leavening(ingredients: &[Ingredient]) -> Vec<Ingredient> {
    ingredients.iter().filter(|i| !is_leavening(i)).cloned().collect()
}

/// Cold retard: no split, leavening × stage factor, sugar × sugar factor
pub fn straight_to_cold_fermentation(
    ingredients: &[Ingredient],
    hours: f64,
    table: &MethodRatioTable,
) -> Vec<Ingredient> {
    let leavening_factor = table.cold_leavening_factor(hours);
    debug!(hours, leavening_factor, "cold fermentation factors");
    ingredients
        .iter()
        .map(|ing| match ing.category {
            IngredientCategory::Leavening => ing.with_amount(ing.amount * leavening_factor),
            IngredientCategory::Sugar => ing.with_amount(ing.amount * table.cold_sugar_factor),
            _ => ing.clone(),
        })
        .collect()
}

/// Inverse of [`straight_to_cold_fermentation`]
pub fn cold_fermentation_to_straight(
    ingredients: &[Ingredient],
    hours: f64,
    table: &MethodRatioTable,
) -> Vec<Ingredient> {
    let leavening_factor = table.cold_leavening_factor(hours);
    ingredients
        .iter()
        .map(|ing| match ing.category {
            IngredientCategory::Leavening => ing.with_amount(ing.amount / leavening_factor),
            IngredientCategory::Sugar => ing.with_amount(ing.amount / table.cold_sugar_factor),
            _ => ing.clone(),
        })
        .collect()
}
