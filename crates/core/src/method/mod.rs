//! Method conversion
//!
//! A state machine over the method family, not over time: any method can be
//! converted to any other by reverting to the straight formula and applying
//! the target method. Split methods keep the overall formula in
//! `Recipe::ingredients` and describe the two stages in [`DoughStages`].

pub mod ratios;
pub mod split;

pub use ratios::{ColdStage, LeaveningRule, MethodRatio, MethodRatioTable};
pub use split::MethodSplit;

use crate::core_types::{DoughStages, Hours, Ingredient};
use crate::error::{ConversionError, ConversionWarning, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Method family tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MethodKind {
    Straight,
    Sponge,
    Poolish,
    Biga,
    Tangzhong,
    Autolyse,
    ColdFermentation,
    Sourdough,
}

impl MethodKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MethodKind::Straight => "straight",
            MethodKind::Sponge => "sponge",
            MethodKind::Poolish => "poolish",
            MethodKind::Biga => "biga",
            MethodKind::Tangzhong => "tangzhong",
            MethodKind::Autolyse => "autolyse",
            MethodKind::ColdFermentation => "coldFermentation",
            MethodKind::Sourdough => "sourdough",
        }
    }
}

impl FromStr for MethodKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "straight" | "direct" => Ok(MethodKind::Straight),
            "sponge" => Ok(MethodKind::Sponge),
            "poolish" => Ok(MethodKind::Poolish),
            "biga" => Ok(MethodKind::Biga),
            "tangzhong" | "yudane" => Ok(MethodKind::Tangzhong),
            "autolyse" => Ok(MethodKind::Autolyse),
            "coldfermentation" | "cold" | "retard" => Ok(MethodKind::ColdFermentation),
            "sourdough" | "levain" => Ok(MethodKind::Sourdough),
            _ => Err(ConversionError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overrides for a split method; unset fields fall back to the ratio table
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrefermentParams {
    /// Fraction of total flour in the pre-ferment
    pub flour_ratio: Option<f64>,
    /// Pre-ferment liquid over pre-ferment flour
    pub hydration: Option<f64>,
    /// Pre-ferment resting time
    pub hours: Option<f64>,
}

/// Method with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MethodSpec {
    #[default]
    Straight,
    Sponge(PrefermentParams),
    Poolish(PrefermentParams),
    Biga(PrefermentParams),
    Tangzhong(PrefermentParams),
    Autolyse(PrefermentParams),
    Sourdough(PrefermentParams),
    ColdFermentation {
        hours: f64,
        /// Bulk fermentation the dough had before the retard
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bulk_hours: Option<f64>,
    },
}

impl MethodSpec {
    /// Spec for `kind` with every parameter taken from the ratio table
    pub fn with_defaults(kind: MethodKind, table: &MethodRatioTable) -> MethodSpec {
        let params = PrefermentParams::default();
        match kind {
            MethodKind::Straight => MethodSpec::Straight,
            MethodKind::Sponge => MethodSpec::Sponge(params),
            MethodKind::Poolish => MethodSpec::Poolish(params),
            MethodKind::Biga => MethodSpec::Biga(params),
            MethodKind::Tangzhong => MethodSpec::Tangzhong(params),
            MethodKind::Autolyse => MethodSpec::Autolyse(params),
            MethodKind::Sourdough => MethodSpec::Sourdough(params),
            MethodKind::ColdFermentation => MethodSpec::ColdFermentation {
                hours: table.default_hours(MethodKind::ColdFermentation),
                bulk_hours: None,
            },
        }
    }

    pub fn kind(&self) -> MethodKind {
        match self {
            MethodSpec::Straight => MethodKind::Straight,
            MethodSpec::Sponge(_) => MethodKind::Sponge,
            MethodSpec::Poolish(_) => MethodKind::Poolish,
            MethodSpec::Biga(_) => MethodKind::Biga,
            MethodSpec::Tangzhong(_) => MethodKind::Tangzhong,
            MethodSpec::Autolyse(_) => MethodKind::Autolyse,
            MethodSpec::Sourdough(_) => MethodKind::Sourdough,
            MethodSpec::ColdFermentation { .. } => MethodKind::ColdFermentation,
        }
    }

    /// Parameters of a split method
    pub fn params(&self) -> Option<PrefermentParams> {
        match *self {
            MethodSpec::Sponge(p)
            | MethodSpec::Poolish(p)
            | MethodSpec::Biga(p)
            | MethodSpec::Tangzhong(p)
            | MethodSpec::Autolyse(p)
            | MethodSpec::Sourdough(p) => Some(p),
            MethodSpec::Straight | MethodSpec::ColdFermentation { .. } => None,
        }
    }

    /// Table ratio with this spec's overrides applied
    pub fn effective_ratio(&self, table: &MethodRatioTable) -> Option<MethodRatio> {
        let params = self.params()?;
        let mut ratio = table.ratio(self.kind())?;
        if let Some(flour_ratio) = params.flour_ratio {
            ratio.flour_ratio = flour_ratio;
        }
        if params.hydration.is_some() {
            ratio.hydration = params.hydration;
        }
        Some(ratio)
    }

    /// Pre-ferment resting time, or retard length for cold fermentation
    pub fn hours(&self, table: &MethodRatioTable) -> f64 {
        match *self {
            MethodSpec::Straight => 0.0,
            MethodSpec::ColdFermentation { hours, .. } => hours,
            _ => self
                .params()
                .and_then(|p| p.hours)
                .unwrap_or_else(|| table.default_hours(self.kind())),
        }
    }

    /// Bulk fermentation time to restore when leaving a cold retard
    pub fn bulk_before_retard(&self) -> Option<Hours> {
        match *self {
            MethodSpec::ColdFermentation {
                bulk_hours: Some(bulk), ..
            } => Some(Hours::new(bulk.max(0.0))),
            _ => None,
        }
    }

    /// Record `bulk` on a cold retard that does not carry its own
    pub fn remembering_bulk(self, bulk: Option<Hours>) -> MethodSpec {
        match self {
            MethodSpec::ColdFermentation {
                hours,
                bulk_hours: None,
            } => MethodSpec::ColdFermentation {
                hours,
                bulk_hours: bulk.map(|b| *b),
            },
            other => other,
        }
    }
}

impl fmt::Display for MethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodSpec::ColdFermentation { hours, .. } => write!(f, "{} ({hours} h)", self.kind()),
            _ => write!(f, "{}", self.kind()),
        }
    }
}

/// Formula and stages after a method change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodOutcome {
    /// Overall formula
    pub ingredients: Vec<Ingredient>,
    pub stages: Option<DoughStages>,
    /// Bulk fermentation override: the retard length entering a cold
    /// retard, the remembered bulk time leaving one
    pub fermentation_time: Option<Hours>,
    pub warnings: Vec<ConversionWarning>,
}

/// Apply `spec` to a straight formula
pub fn apply_method(
    straight: &[Ingredient],
    spec: &MethodSpec,
    table: &MethodRatioTable,
) -> Result<MethodOutcome> {
    match *spec {
        MethodSpec::Straight => Ok(MethodOutcome {
            ingredients: straight.to_vec(),
            stages: None,
            fermentation_time: None,
            warnings: Vec::new(),
        }),
        MethodSpec::ColdFermentation { hours, .. } => Ok(MethodOutcome {
            ingredients: split::straight_to_cold_fermentation(straight, hours, table),
            stages: None,
            fermentation_time: Some(Hours::new(hours.max(0.0))),
            warnings: Vec::new(),
        }),
        _ => {
            let ingredients = if spec.kind() == MethodKind::Sourdough {
                split::without_leavening(straight)
            } else {
                straight.to_vec()
            };
            let (stages, warnings) = restage(&ingredients, spec, table)?;
            Ok(MethodOutcome {
                ingredients,
                stages,
                fermentation_time: None,
                warnings,
            })
        }
    }
}

/// Recompute the stage breakdown of an overall formula
///
/// Returns no stages for methods that do not split.
pub fn restage(
    ingredients: &[Ingredient],
    spec: &MethodSpec,
    table: &MethodRatioTable,
) -> Result<(Option<DoughStages>, Vec<ConversionWarning>)> {
    let Some(ratio) = spec.effective_ratio(table) else {
        return Ok((None, Vec::new()));
    };
    let kind = spec.kind();
    let MethodSplit {
        preferment,
        main_dough,
        warnings,
    } = split::split(ingredients, kind, &ratio)?;
    let stages = DoughStages {
        method: kind,
        preferment,
        main_dough,
        preferment_hours: Hours::new(spec.hours(table).max(0.0)),
    };
    Ok((Some(stages), warnings))
}

/// Recover the straight formula from a formula made with `from`
///
/// Sourdough formulas have had their commercial leavening replaced; it cannot
/// be recovered and a warning says so.
pub fn revert_to_straight(
    ingredients: &[Ingredient],
    from: &MethodSpec,
    table: &MethodRatioTable,
) -> (Vec<Ingredient>, Vec<ConversionWarning>) {
    match *from {
        MethodSpec::ColdFermentation { hours, .. } => (
            split::cold_fermentation_to_straight(ingredients, hours, table),
            Vec::new(),
        ),
        MethodSpec::Sourdough(_) => (
            ingredients.to_vec(),
            vec![ConversionWarning::LeaveningNotRestored {
                method: MethodKind::Sourdough,
            }],
        ),
        _ => (ingredients.to_vec(), Vec::new()),
    }
}

/// Convert an overall formula from one method to another
pub fn convert_method(
    ingredients: &[Ingredient],
    from: &MethodSpec,
    to: &MethodSpec,
    table: &MethodRatioTable,
) -> Result<MethodOutcome> {
    let (straight, mut warnings) = revert_to_straight(ingredients, from, table);
    let to = to.remembering_bulk(from.bulk_before_retard());
    let mut outcome = apply_method(&straight, &to, table)?;
    warnings.append(&mut outcome.warnings);
    outcome.warnings = warnings;
    outcome.fermentation_time = outcome.fermentation_time.or_else(|| from.bulk_before_retard());
    info!(from = %from.kind(), to = %to.kind(), warnings = outcome.warnings.len(), "method converted");
    debug!(stages = outcome.stages.is_some(), "method outcome");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::IngredientCategory;
    use crate::formula::{category_total, total_flour};
    use approx::assert_relative_eq;

    fn formula() -> Vec<Ingredient> {
        vec![
            Ingredient::flour("Bread flour", 1000.0),
            Ingredient::new("Water", 680.0, IngredientCategory::Liquid),
            Ingredient::new("Salt", 20.0, IngredientCategory::Salt),
            Ingredient::new("Yeast", 8.0, IngredientCategory::Leavening),
            Ingredient::new("Sugar", 30.0, IngredientCategory::Sugar),
        ]
    }

    #[test]
    fn test_method_kind_parsing() {
        assert_eq!("cold-fermentation".parse::<MethodKind>(), Ok(MethodKind::ColdFermentation));
        assert_eq!("Poolish".parse::<MethodKind>(), Ok(MethodKind::Poolish));
        assert_eq!(
            "lievito".parse::<MethodKind>(),
            Err(ConversionError::UnsupportedMethod("lievito".into()))
        );
    }

    #[test]
    fn test_spec_json_shape() {
        let spec: MethodSpec =
            serde_json::from_str(r#"{"kind":"poolish","flourRatio":0.4,"hours":16}"#).unwrap();
        assert_eq!(
            spec,
            MethodSpec::Poolish(PrefermentParams {
                flour_ratio: Some(0.4),
                hydration: None,
                hours: Some(16.0),
            })
        );
        let cold: MethodSpec = serde_json::from_str(r#"{"kind":"coldFermentation","hours":36}"#).unwrap();
        assert_eq!(
            cold,
            MethodSpec::ColdFermentation {
                hours: 36.0,
                bulk_hours: None,
            }
        );
        let remembered: MethodSpec =
            serde_json::from_str(r#"{"kind":"coldFermentation","hours":18,"bulkHours":2}"#).unwrap();
        assert_eq!(remembered.bulk_before_retard(), Some(Hours::new(2.0)));
        let straight: MethodSpec = serde_json::from_str(r#"{"kind":"straight"}"#).unwrap();
        assert_eq!(straight, MethodSpec::Straight);
    }

    #[test]
    fn test_overrides_replace_table_values() {
        let table = MethodRatioTable::default();
        let spec = MethodSpec::Poolish(PrefermentParams {
            flour_ratio: Some(0.3),
            hydration: None,
            hours: None,
        });
        let ratio = spec.effective_ratio(&table).unwrap();
        assert_eq!(ratio.flour_ratio, 0.3);
        assert_eq!(ratio.hydration, Some(1.0));
        assert_eq!(spec.hours(&table), 12.0);
    }

    #[test]
    fn test_straight_to_poolish_keeps_overall_formula() {
        let table = MethodRatioTable::default();
        let spec = MethodSpec::with_defaults(MethodKind::Poolish, &table);
        let out = convert_method(&formula(), &MethodSpec::Straight, &spec, &table).unwrap();
        assert_eq!(out.ingredients, formula());
        let stages = out.stages.unwrap();
        assert_eq!(stages.method, MethodKind::Poolish);
        assert_relative_eq!(stages.total_flour(), 1000.0);
        assert_eq!(*stages.preferment_hours, 12.0);
    }

    #[test]
    fn test_cold_round_trip_restores_straight() {
        let table = MethodRatioTable::default();
        let cold = MethodSpec::ColdFermentation {
            hours: 30.0,
            bulk_hours: Some(2.0),
        };
        let out = convert_method(&formula(), &MethodSpec::Straight, &cold, &table).unwrap();
        assert_relative_eq!(category_total(&out.ingredients, IngredientCategory::Leavening), 2.0);
        assert_eq!(out.fermentation_time, Some(Hours::new(30.0)));
        assert!(out.stages.is_none());

        let back = convert_method(&out.ingredients, &cold, &MethodSpec::Straight, &table).unwrap();
        assert_relative_eq!(category_total(&back.ingredients, IngredientCategory::Leavening), 8.0);
        assert_relative_eq!(category_total(&back.ingredients, IngredientCategory::Sugar), 30.0, epsilon = 1e-12);
        assert_eq!(back.fermentation_time, Some(Hours::new(2.0)));
    }

    #[test]
    fn test_retard_keeps_remembered_bulk_time() {
        let first = MethodSpec::ColdFermentation {
            hours: 18.0,
            bulk_hours: Some(1.5),
        };
        let fresh = MethodSpec::ColdFermentation {
            hours: 36.0,
            bulk_hours: None,
        };
        assert_eq!(
            fresh.remembering_bulk(first.bulk_before_retard()),
            MethodSpec::ColdFermentation {
                hours: 36.0,
                bulk_hours: Some(1.5),
            }
        );
        assert_eq!(MethodSpec::Straight.remembering_bulk(Some(Hours::new(3.0))), MethodSpec::Straight);
        assert_eq!(fresh.bulk_before_retard(), None);
    }

    #[test]
    fn test_sourdough_to_straight_warns() {
        let table = MethodRatioTable::default();
        let levain = MethodSpec::with_defaults(MethodKind::Sourdough, &table);
        let sour = convert_method(&formula(), &MethodSpec::Straight, &levain, &table).unwrap();
        assert_eq!(category_total(&sour.ingredients, IngredientCategory::Leavening), 0.0);

        let back = convert_method(&sour.ingredients, &levain, &MethodSpec::Straight, &table).unwrap();
        assert_eq!(
            back.warnings,
            vec![ConversionWarning::LeaveningNotRestored {
                method: MethodKind::Sourdough
            }]
        );
        assert_relative_eq!(total_flour(&back.ingredients), 1000.0);
    }

    #[test]
    fn test_sponge_to_biga_goes_through_straight() {
        let table = MethodRatioTable::default();
        let sponge = MethodSpec::with_defaults(MethodKind::Sponge, &table);
        let biga = MethodSpec::with_defaults(MethodKind::Biga, &table);
        let first = convert_method(&formula(), &MethodSpec::Straight, &sponge, &table).unwrap();
        let second = convert_method(&first.ingredients, &sponge, &biga, &table).unwrap();
        let stages = second.stages.unwrap();
        assert_eq!(stages.method, MethodKind::Biga);
        assert_relative_eq!(total_flour(&stages.preferment), 600.0);
    }
}
