//! Conversion orchestrator
//!
//! Stateless per call. Every call applies one intent from a closed set to an
//! immutable source [`Recipe`]:
//!
//! 1. Check preconditions (non-empty ingredients, positive flour where the
//!    step needs it)
//! 2. Normalize the working copy to grams (the copy-on-write boundary; the
//!    math functions never see the caller's values)
//! 3. Run the component steps. A composite intent always runs them in the
//!    order pan → method → quantity → environment → DDT, since DDT depends on
//!    the final liquid total
//! 4. Recompute the pre-ferment stages from the final overall formula
//! 5. Diff every ingredient against the normalized source and summarize
//!
//! The engine owns only its lookup tables; it never mutates a source recipe.

use crate::bakeware::{scaling_factor, volume, MagicNumberOptions, PanAllocation, PanConfig, PanShare};
use crate::core_types::units::{Grams, Meters, Minutes};
use crate::core_types::{Ingredient, IngredientCategory, Recipe};
use crate::ddt::{self, DdtPlan, DdtRequest};
use crate::environment::{self, Environment, EnvironmentFactors};
use crate::error::{ConversionError, ConversionWarning, Result};
use crate::formula::{self, RatioValidation};
use crate::measure::normalize_ingredients;
use crate::method::{self, MethodKind, MethodSpec};
use crate::tables::ConversionTables;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// How the batch size changes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum QuantityTarget {
    /// Multiply every amount
    Multiplier { factor: f64 },
    /// Scale from the recipe's yield to `target` servings/pieces
    Yield { target: f64 },
    /// `count` pieces of `weight` grams each
    PieceWeight { weight: f64, count: u32 },
    /// Total flour of `grams`, everything else by baker's percentage
    FlourWeight { grams: f64 },
}

/// Sub-steps of a composite intent; each is optional
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompositeIntent {
    pub pan: Option<PanConfig>,
    pub method: Option<MethodSpec>,
    pub quantity: Option<QuantityTarget>,
    pub environment: Option<Environment>,
    pub ddt: Option<DdtRequest>,
}

/// One conversion transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ConversionIntent {
    PanChange { pan: PanConfig },
    MethodChange { method: MethodSpec },
    QuantityChange { target: QuantityTarget },
    DdtApply { request: DdtRequest },
    EnvironmentApply { environment: Environment },
    Composite(Box<CompositeIntent>),
}

impl ConversionIntent {
    pub fn composite(steps: CompositeIntent) -> Self {
        ConversionIntent::Composite(Box::new(steps))
    }

    /// The fixed-order step list this intent expands to
    fn into_composite(self) -> CompositeIntent {
        match self {
            ConversionIntent::PanChange { pan } => CompositeIntent {
                pan: Some(pan),
                ..CompositeIntent::default()
            },
            ConversionIntent::MethodChange { method } => CompositeIntent {
                method: Some(method),
                ..CompositeIntent::default()
            },
            ConversionIntent::QuantityChange { target } => CompositeIntent {
                quantity: Some(target),
                ..CompositeIntent::default()
            },
            ConversionIntent::DdtApply { request } => CompositeIntent {
                ddt: Some(request),
                ..CompositeIntent::default()
            },
            ConversionIntent::EnvironmentApply { environment } => CompositeIntent {
                environment: Some(environment),
                ..CompositeIntent::default()
            },
            ConversionIntent::Composite(composite) => *composite,
        }
    }
}

/// Step actually applied, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConversionStep {
    Pan,
    Method,
    Quantity,
    Environment,
    Ddt,
}

impl fmt::Display for ConversionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConversionStep::Pan => "pan",
            ConversionStep::Method => "method",
            ConversionStep::Quantity => "quantity",
            ConversionStep::Environment => "environment",
            ConversionStep::Ddt => "ddt",
        };
        f.write_str(s)
    }
}

/// Per-ingredient change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDiff {
    pub name: String,
    pub category: IngredientCategory,
    /// Grams before (0 for an added line)
    pub before: f64,
    /// Grams after (0 for a removed line)
    pub after: f64,
    pub delta_absolute: f64,
    /// `None` when `before` is 0
    pub delta_percent: Option<f64>,
}

impl IngredientDiff {
    fn new(line: &Ingredient, before: f64, after: f64) -> Self {
        IngredientDiff {
            name: line.name.clone(),
            category: line.category,
            before,
            after,
            delta_absolute: after - before,
            delta_percent: (before > 0.0).then(|| (after - before) / before * 100.0),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.delta_absolute.abs() < 1e-9
    }
}

/// Process parameter tracked in the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProcessParameter {
    BakingTemp,
    BakingTime,
    FermentationTime,
    YieldCount,
}

/// A process parameter that changed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessChange {
    pub parameter: ProcessParameter,
    pub before: f64,
    pub after: f64,
}

/// Everything besides the ingredient diffs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    pub steps: Vec<ConversionStep>,
    /// Total weight after over total weight before
    pub weight_ratio: f64,
    pub method_before: MethodKind,
    pub method_after: MethodKind,
    pub process_changes: Vec<ProcessChange>,
    pub hydration_before: f64,
    pub hydration_after: f64,
    /// Ratio check of the converted formula
    pub validation: RatioValidation,
    /// Dough weight the final pan ideally holds, when the product type is known
    pub ideal_dough_weight: Option<f64>,
    pub environment: Option<EnvironmentFactors>,
    pub ddt: Option<DdtPlan>,
    /// Every soft warning raised along the way, validation included
    pub warnings: Vec<ConversionWarning>,
}

/// Result of one conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutcome {
    pub recipe: Recipe,
    pub diffs: Vec<IngredientDiff>,
    pub summary: ConversionSummary,
}

/// Mutable state of one conversion call; never escapes `convert`
struct Working {
    recipe: Recipe,
    steps: Vec<ConversionStep>,
    warnings: Vec<ConversionWarning>,
    environment: Option<EnvironmentFactors>,
    ddt: Option<DdtPlan>,
}

/// Recipe conversion engine
///
/// Holds the lookup tables and nothing else, so one engine can serve any
/// number of concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct ConversionEngine {
    tables: ConversionTables,
}

impl ConversionEngine {
    pub fn new(tables: ConversionTables) -> Self {
        ConversionEngine { tables }
    }

    pub fn tables(&self) -> &ConversionTables {
        &self.tables
    }

    /// Apply `intent` to `source`, returning a new recipe with diffs and summary
    pub fn convert(&self, source: &Recipe, intent: &ConversionIntent) -> Result<ConversionOutcome> {
        if source.ingredients.is_empty() {
            return Err(ConversionError::EmptyIngredientList);
        }
        let composite = intent.clone().into_composite();

        let mut normalized = source.clone();
        normalized.ingredients = normalize_ingredients(&source.ingredients, &self.tables.densities)?;
        let before = normalized.clone();
        let mut work = Working {
            recipe: normalized,
            steps: Vec::new(),
            warnings: Vec::new(),
            environment: None,
            ddt: None,
        };

        if let Some(pan) = &composite.pan {
            apply_pan(&mut work, pan)?;
        }
        if let Some(spec) = &composite.method {
            self.apply_method(&mut work, spec)?;
        }
        if let Some(target) = composite.quantity {
            apply_quantity(&mut work, target)?;
        }
        if let Some(env) = &composite.environment {
            self.apply_environment(&mut work, env);
        }
        self.restage(&mut work)?;
        if let Some(request) = &composite.ddt {
            self.apply_ddt(&mut work, request);
        }

        let altitude = composite.environment.map_or(Meters::SEA_LEVEL, |e| e.altitude);
        Ok(self.finish(&before, work, altitude))
    }

    /// Run independent conversions in parallel
    ///
    /// Results come back in input order and are identical to calling
    /// [`Self::convert`] on each job in turn.
    pub fn convert_batch(&self, jobs: &[(Recipe, ConversionIntent)]) -> Vec<Result<ConversionOutcome>> {
        debug!(jobs = jobs.len(), "batch conversion");
        jobs.par_iter()
            .map(|(recipe, intent)| self.convert(recipe, intent))
            .collect()
    }

    /// Split a recipe's total dough across several pans
    ///
    /// Needs the recipe's product type for the magic numbers.
    pub fn distribute_to_pans(
        &self,
        recipe: &Recipe,
        pans: &[PanAllocation],
        altitude: Meters,
    ) -> Result<Vec<PanShare>> {
        let product = recipe
            .product
            .ok_or_else(|| ConversionError::UnsupportedProductType("unspecified".into()))?;
        let ingredients = normalize_ingredients(&recipe.ingredients, &self.tables.densities)?;
        let total = Grams::new(formula::total_weight(&ingredients).max(0.0));
        self.tables
            .magic_numbers
            .distribute_to_multiple_pans(total, pans, product, altitude)
    }

    fn apply_method(&self, work: &mut Working, spec: &MethodSpec) -> Result<()> {
        let flour = work.recipe.total_flour();
        if flour <= 0.0 {
            return Err(ConversionError::InvalidFlourWeight(flour));
        }
        let table = &self.tables.methods;
        let current = work.recipe.method;
        let (straight, reverted) = method::revert_to_straight(&work.recipe.ingredients, &current, table);
        work.warnings.extend(reverted);
        let bulk = match current {
            MethodSpec::ColdFermentation { .. } => current.bulk_before_retard(),
            _ => Some(work.recipe.fermentation_time),
        };
        let target = spec.remembering_bulk(bulk);
        // split warnings are recomputed by the final restage
        let outcome = method::apply_method(&straight, &target, table)?;
        work.recipe.ingredients = outcome.ingredients;
        if let Some(time) = outcome.fermentation_time.or_else(|| current.bulk_before_retard()) {
            work.recipe.fermentation_time = time;
        }
        info!(from = %current, to = %target, "method change");
        work.recipe.method = target;
        work.steps.push(ConversionStep::Method);
        Ok(())
    }

    fn apply_environment(&self, work: &mut Working, env: &Environment) {
        let adjustment = environment::adjust(&work.recipe.ingredients, env, &self.tables.environment);
        let factors = adjustment.factors;
        let recipe = &mut work.recipe;
        recipe.ingredients = adjustment.ingredients;
        recipe.baking_temp = recipe.baking_temp.offset(factors.oven_temp_offset);
        recipe.baking_time = Minutes::new((*recipe.baking_time * factors.baking_time_factor).max(0.0));
        // a cold retard runs at fridge temperature whatever the kitchen does
        if !matches!(recipe.method, MethodSpec::ColdFermentation { .. }) {
            recipe.fermentation_time = recipe.fermentation_time * factors.fermentation_time_factor;
        }
        work.warnings.extend(factors.evaluation.to_warnings());
        work.environment = Some(factors);
        work.steps.push(ConversionStep::Environment);
    }

    fn apply_ddt(&self, work: &mut Working, request: &DdtRequest) {
        let ingredients = &work.recipe.ingredients;
        let liquid = formula::category_total(ingredients, IngredientCategory::Liquid);
        let plan = ddt::plan(
            request,
            Grams::new(liquid.max(0.0)),
            formula::hydration(ingredients),
            &self.tables.ddt,
        );
        work.warnings.extend(plan.warnings.iter().cloned());
        work.ddt = Some(plan);
        work.steps.push(ConversionStep::Ddt);
    }

    /// Derive the stages from the current overall formula
    fn restage(&self, work: &mut Working) -> Result<()> {
        let recipe = &mut work.recipe;
        let (stages, warnings) = method::restage(&recipe.ingredients, &recipe.method, &self.tables.methods)?;
        recipe.stages = stages;
        work.warnings.extend(warnings);
        Ok(())
    }

    fn finish(&self, before: &Recipe, mut work: Working, altitude: Meters) -> ConversionOutcome {
        let after = &work.recipe;
        let diffs = diff_ingredients(&before.ingredients, &after.ingredients);

        let validation = match formula::to_percentage_of_own_flour(&after.ingredients) {
            Ok(lines) => formula::validate_ratios_for(&lines, after.method.kind()),
            Err(_) => RatioValidation::default(),
        };
        work.warnings.extend(validation.warnings.iter().cloned());

        let ideal_dough_weight = after.product.and_then(|product| {
            let options = MagicNumberOptions {
                altitude,
                ..MagicNumberOptions::default()
            };
            let pan_volume = volume(&after.pan).ok()?;
            self.tables
                .magic_numbers
                .dough_weight(pan_volume, product, options)
                .ok()
                .map(|g| *g)
        });

        for w in &work.warnings {
            warn!(warning = %w, "conversion warning");
        }

        let before_weight = before.total_weight();
        let summary = ConversionSummary {
            steps: work.steps,
            weight_ratio: if before_weight > 0.0 {
                after.total_weight() / before_weight
            } else {
                1.0
            },
            method_before: before.method.kind(),
            method_after: after.method.kind(),
            process_changes: process_changes(before, after),
            hydration_before: before.hydration(),
            hydration_after: after.hydration(),
            validation,
            ideal_dough_weight,
            environment: work.environment,
            ddt: work.ddt,
            warnings: work.warnings,
        };
        info!(
            recipe = %after.name,
            steps = ?summary.steps,
            changed = diffs.iter().filter(|d| !d.is_unchanged()).count(),
            warnings = summary.warnings.len(),
            "conversion complete"
        );
        ConversionOutcome {
            recipe: work.recipe,
            diffs,
            summary,
        }
    }
}

fn apply_pan(work: &mut Working, target: &PanConfig) -> Result<()> {
    let factor = scaling_factor(&work.recipe.pan, target)?;
    debug!(from = %work.recipe.pan, to = %target, factor, "pan change");
    work.recipe.ingredients = formula::scale(&work.recipe.ingredients, factor)?;
    work.recipe.yield_count *= factor;
    work.recipe.pan = target.clone();
    work.steps.push(ConversionStep::Pan);
    Ok(())
}

fn apply_quantity(work: &mut Working, target: QuantityTarget) -> Result<()> {
    let recipe = &mut work.recipe;
    let ingredients = &recipe.ingredients;
    let scaled = match target {
        QuantityTarget::Multiplier { factor } => formula::scale(ingredients, factor)?,
        QuantityTarget::Yield { target } => {
            formula::adjust_to_yield(ingredients, recipe.yield_count, target)?
        }
        QuantityTarget::PieceWeight { weight, count } => {
            formula::adjust_by_piece_weight(ingredients, weight, count)?
        }
        QuantityTarget::FlourWeight { grams } => {
            let lines = formula::to_percentage_of_own_flour(ingredients)?;
            formula::to_absolute_weight(&lines, grams)?
        }
    };
    let ratio = formula::total_weight(&scaled) / formula::total_weight(ingredients);
    recipe.yield_count = match target {
        QuantityTarget::Yield { target } => target,
        QuantityTarget::PieceWeight { count, .. } => f64::from(count),
        QuantityTarget::Multiplier { .. } | QuantityTarget::FlourWeight { .. } => {
            recipe.yield_count * ratio
        }
    };
    debug!(?target, ratio, "quantity change");
    recipe.ingredients = scaled;
    work.steps.push(ConversionStep::Quantity);
    Ok(())
}

/// Match lines by name and category; unmatched lines count as added/removed
pub fn diff_ingredients(before: &[Ingredient], after: &[Ingredient]) -> Vec<IngredientDiff> {
    let mut used = vec![false; after.len()];
    let mut diffs = Vec::with_capacity(before.len().max(after.len()));
    for line in before {
        let matched = after
            .iter()
            .enumerate()
            .find(|(i, other)| !used[*i] && line.same_line(other));
        match matched {
            Some((i, other)) => {
                used[i] = true;
                diffs.push(IngredientDiff::new(line, line.amount, other.amount));
            }
            None => diffs.push(IngredientDiff::new(line, line.amount, 0.0)),
        }
    }
    for (line, _) in after.iter().zip(&used).filter(|(_, u)| !**u) {
        diffs.push(IngredientDiff::new(line, 0.0, line.amount));
    }
    diffs
}

fn process_changes(before: &Recipe, after: &Recipe) -> Vec<ProcessChange> {
    [
        (ProcessParameter::BakingTemp, *before.baking_temp, *after.baking_temp),
        (ProcessParameter::BakingTime, *before.baking_time, *after.baking_time),
        (
            ProcessParameter::FermentationTime,
            *before.fermentation_time,
            *after.fermentation_time,
        ),
        (ProcessParameter::YieldCount, before.yield_count, after.yield_count),
    ]
    .into_iter()
    .filter(|(_, b, a)| (a - b).abs() > 1e-9)
    .map(|(parameter, before, after)| ProcessChange {
        parameter,
        before,
        after,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{Celsius, Hours, MeasureUnit};
    use approx::assert_relative_eq;

    fn sandwich_loaf() -> Recipe {
        Recipe::new(
            "Sandwich loaf",
            vec![
                Ingredient::flour("Bread flour", 500.0),
                Ingredient::new("Water", 325.0, IngredientCategory::Liquid),
                Ingredient::new("Salt", 10.0, IngredientCategory::Salt),
                Ingredient::new("Instant yeast", 5.0, IngredientCategory::Leavening),
            ],
            PanConfig::loaf(22.0, 20.0, 11.0, 7.0),
        )
        .with_fermentation(Hours::new(2.0))
    }

    #[test]
    fn test_empty_recipe_is_rejected() {
        let mut r = sandwich_loaf();
        r.ingredients.clear();
        let engine = ConversionEngine::default();
        let intent = ConversionIntent::QuantityChange {
            target: QuantityTarget::Multiplier { factor: 2.0 },
        };
        assert_eq!(engine.convert(&r, &intent), Err(ConversionError::EmptyIngredientList));
    }

    #[test]
    fn test_source_is_not_mutated() {
        let source = sandwich_loaf();
        let snapshot = source.clone();
        let engine = ConversionEngine::default();
        let intent = ConversionIntent::PanChange {
            pan: PanConfig::round(20.0, 8.0),
        };
        let out = engine.convert(&source, &intent).unwrap();
        assert_eq!(source, snapshot);
        assert_ne!(out.recipe.ingredients, source.ingredients);
    }

    #[test]
    fn test_normalization_happens_before_diff() {
        let mut source = sandwich_loaf();
        source.ingredients[0] = Ingredient::flour("Bread flour", 0.5).with_unit(MeasureUnit::Kilogram);
        let engine = ConversionEngine::default();
        let intent = ConversionIntent::QuantityChange {
            target: QuantityTarget::Multiplier { factor: 2.0 },
        };
        let out = engine.convert(&source, &intent).unwrap();
        assert_eq!(out.diffs[0].before, 500.0);
        assert_eq!(out.diffs[0].after, 1000.0);
        assert_eq!(out.recipe.ingredients[0].unit, MeasureUnit::Gram);
    }

    #[test]
    fn test_diff_reports_added_and_removed_lines() {
        let before = vec![
            Ingredient::flour("Flour", 100.0),
            Ingredient::new("Yeast", 1.0, IngredientCategory::Leavening),
        ];
        let after = vec![
            Ingredient::flour("flour", 150.0),
            Ingredient::new("Raisins", 20.0, IngredientCategory::Other),
        ];
        let diffs = diff_ingredients(&before, &after);
        assert_eq!(diffs.len(), 3);
        assert_eq!(diffs[0].delta_percent, Some(50.0));
        assert_eq!(diffs[1].after, 0.0);
        assert_eq!(diffs[1].delta_percent, Some(-100.0));
        assert_eq!(diffs[2].before, 0.0);
        assert_eq!(diffs[2].delta_percent, None);
    }

    #[test]
    fn test_quantity_targets_set_yield() {
        let engine = ConversionEngine::default();
        let source = sandwich_loaf().with_yield(8.0);

        let by_yield = engine
            .convert(
                &source,
                &ConversionIntent::QuantityChange {
                    target: QuantityTarget::Yield { target: 12.0 },
                },
            )
            .unwrap();
        assert_relative_eq!(by_yield.recipe.total_flour(), 750.0);
        assert_eq!(by_yield.recipe.yield_count, 12.0);

        let by_flour = engine
            .convert(
                &source,
                &ConversionIntent::QuantityChange {
                    target: QuantityTarget::FlourWeight { grams: 1000.0 },
                },
            )
            .unwrap();
        assert_relative_eq!(by_flour.recipe.ingredients[1].amount, 650.0);
        assert_relative_eq!(by_flour.recipe.yield_count, 16.0);
        assert_relative_eq!(by_flour.summary.weight_ratio, 2.0);
    }

    #[test]
    fn test_environment_changes_process() {
        let engine = ConversionEngine::default();
        let env = Environment::new(Celsius::new(15.0), 55.0, Meters::new(1600.0));
        let out = engine
            .convert(&sandwich_loaf(), &ConversionIntent::EnvironmentApply { environment: env })
            .unwrap();
        assert_eq!(*out.recipe.baking_temp, 190.0);
        assert_relative_eq!(*out.recipe.baking_time, 33.0);
        assert_relative_eq!(*out.recipe.fermentation_time, 4.0);
        let params: Vec<_> = out.summary.process_changes.iter().map(|c| c.parameter).collect();
        assert_eq!(
            params,
            vec![
                ProcessParameter::BakingTemp,
                ProcessParameter::BakingTime,
                ProcessParameter::FermentationTime
            ]
        );
        // cold room + high altitude
        assert_eq!(
            out.summary
                .warnings
                .iter()
                .filter(|w| matches!(w, ConversionWarning::Environment { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_ideal_dough_weight_needs_product() {
        let engine = ConversionEngine::default();
        let intent = ConversionIntent::PanChange {
            pan: PanConfig::rectangle(20.0, 10.0, 10.0),
        };
        let plain = engine.convert(&sandwich_loaf(), &intent).unwrap();
        assert!(plain.summary.ideal_dough_weight.is_none());

        let bread = sandwich_loaf().with_product(crate::bakeware::ProductType::WhiteBread);
        let sized = engine.convert(&bread, &intent).unwrap();
        assert_relative_eq!(sized.summary.ideal_dough_weight.unwrap(), 500.0);
    }
}
