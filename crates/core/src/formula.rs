//! Baker's percentage math
//!
//! Every ingredient is expressed relative to the total flour weight (flour =
//! 100%). Pan conversion, batch conversion and yield adjustment all reduce to
//! [`scale`], which multiplies every amount uniformly so ratios are preserved
//! by construction.
//!
//! All functions expect ingredients already normalized to grams.

use crate::core_types::{Ingredient, IngredientCategory};
use crate::core_types::ingredient::sum_where;
use crate::error::{ConversionError, ConversionWarning, Result};
use crate::method::MethodKind;
use serde::{Deserialize, Serialize};

/// Hydration range where dough consistency is normal (%)
pub const HYDRATION_RANGE: (f64, f64) = (50.0, 100.0);

/// Usual salt range (% of flour)
pub const SALT_RANGE: (f64, f64) = (1.5, 3.0);

/// Usual commercial leavening range (% of flour)
pub const LEAVENING_RANGE: (f64, f64) = (0.5, 3.0);

/// An ingredient together with its baker's percentage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BakersLine {
    /// The ingredient as it was percentaged
    pub ingredient: Ingredient,
    /// Amount as a percentage of total flour weight
    pub percentage: f64,
}

/// Result of [`validate_ratios`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioValidation {
    /// No warnings were raised
    pub is_valid: bool,
    /// Hydration computed from the percentages
    pub hydration: f64,
    /// Advisory messages
    pub warnings: Vec<ConversionWarning>,
}

/// Total flour weight (flour category plus lines flagged `is_flour`)
pub fn total_flour(ingredients: &[Ingredient]) -> f64 {
    sum_where(ingredients, Ingredient::counts_as_flour)
}

/// Total weight of all lines
pub fn total_weight(ingredients: &[Ingredient]) -> f64 {
    sum_where(ingredients, |_| true)
}

/// Total weight of one category
pub fn category_total(ingredients: &[Ingredient], category: IngredientCategory) -> f64 {
    sum_where(ingredients, |i| i.category == category)
}

/// Express every ingredient as a percentage of `flour_weight`
pub fn to_percentage(ingredients: &[Ingredient], flour_weight: f64) -> Result<Vec<BakersLine>> {
    if flour_weight <= 0.0 || !flour_weight.is_finite() {
        return Err(ConversionError::InvalidFlourWeight(flour_weight));
    }
    Ok(ingredients
        .iter()
        .map(|ing| BakersLine {
            ingredient: ing.clone(),
            percentage: ing.amount / flour_weight * 100.0,
        })
        .collect())
}

/// Percentages of the recipe's own flour total
pub fn to_percentage_of_own_flour(ingredients: &[Ingredient]) -> Result<Vec<BakersLine>> {
    to_percentage(ingredients, total_flour(ingredients))
}

/// Inverse of [`to_percentage`]: absolute weights for `target_flour_weight`
pub fn to_absolute_weight(lines: &[BakersLine], target_flour_weight: f64) -> Result<Vec<Ingredient>> {
    if target_flour_weight <= 0.0 || !target_flour_weight.is_finite() {
        return Err(ConversionError::InvalidFlourWeight(target_flour_weight));
    }
    Ok(lines
        .iter()
        .map(|line| {
            line.ingredient
                .with_amount(line.percentage / 100.0 * target_flour_weight)
        })
        .collect())
}

/// Liquid + egg weight over flour weight, in percent; 0 when there is no flour
pub fn hydration(ingredients: &[Ingredient]) -> f64 {
    let flour = total_flour(ingredients);
    if flour <= 0.0 {
        return 0.0;
    }
    sum_where(ingredients, Ingredient::is_hydrating) / flour * 100.0
}

/// Multiply every amount by `factor`
pub fn scale(ingredients: &[Ingredient], factor: f64) -> Result<Vec<Ingredient>> {
    if factor <= 0.0 || !factor.is_finite() {
        return Err(ConversionError::InvalidScaleFactor(factor));
    }
    Ok(ingredients
        .iter()
        .map(|ing| ing.with_amount(ing.amount * factor))
        .collect())
}

/// Scale from `current_yield` servings/pieces to `target_yield`
pub fn adjust_to_yield(
    ingredients: &[Ingredient],
    current_yield: f64,
    target_yield: f64,
) -> Result<Vec<Ingredient>> {
    scale(ingredients, target_yield / current_yield)
}

/// Scale so the whole batch yields `piece_count` pieces of `piece_weight` grams
pub fn adjust_by_piece_weight(
    ingredients: &[Ingredient],
    piece_weight: f64,
    piece_count: u32,
) -> Result<Vec<Ingredient>> {
    let current = total_weight(ingredients);
    scale(ingredients, piece_weight * f64::from(piece_count) / current)
}

fn percent_where(lines: &[BakersLine], pred: impl Fn(&Ingredient) -> bool) -> f64 {
    lines
        .iter()
        .filter(|l| pred(&l.ingredient))
        .map(|l| l.percentage)
        .sum()
}

/// Advisory sanity check of a percentaged formula
///
/// Hydration, salt and leavening are all checked; a formula with no salt or
/// no leavening is outside its range and warns.
pub fn validate_ratios(lines: &[BakersLine]) -> RatioValidation {
    check_ratios(lines, true)
}

/// [`validate_ratios`] for a formula made with `method`
///
/// Sourdough formulas rise on their levain, so commercial leavening is not
/// checked for them.
pub fn validate_ratios_for(lines: &[BakersLine], method: MethodKind) -> RatioValidation {
    check_ratios(lines, method != MethodKind::Sourdough)
}

fn check_ratios(lines: &[BakersLine], check_leavening: bool) -> RatioValidation {
    let flour_pct = percent_where(lines, Ingredient::counts_as_flour);
    let hydration = if flour_pct > 0.0 {
        percent_where(lines, Ingredient::is_hydrating) / flour_pct * 100.0
    } else {
        0.0
    };

    let mut warnings = Vec::new();
    let (h_min, h_max) = HYDRATION_RANGE;
    if !(h_min..=h_max).contains(&hydration) {
        warnings.push(ConversionWarning::HydrationOutOfRange {
            hydration,
            min: h_min,
            max: h_max,
        });
    }

    let salt = percent_where(lines, |i| i.category == IngredientCategory::Salt);
    let (s_min, s_max) = SALT_RANGE;
    if !(s_min..=s_max).contains(&salt) {
        warnings.push(ConversionWarning::SaltOutOfRange {
            percent: salt,
            min: s_min,
            max: s_max,
        });
    }

    let leavening = percent_where(lines, |i| i.category == IngredientCategory::Leavening);
    let (l_min, l_max) = LEAVENING_RANGE;
    if check_leavening && !(l_min..=l_max).contains(&leavening) {
        warnings.push(ConversionWarning::LeaveningOutOfRange {
            percent: leavening,
            min: l_min,
            max: l_max,
        });
    }

    RatioValidation {
        is_valid: warnings.is_empty(),
        hydration,
        warnings,
    }
}
