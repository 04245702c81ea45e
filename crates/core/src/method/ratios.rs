//! Method ratio table
//!
//! Each split method carves a pre-ferment out of the straight formula using a
//! `(flour ratio, hydration, leavening rule)` triple. Cold fermentation does
//! not split; it scales leavening by a stage factor picked from the retard
//! length.

use super::MethodKind;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// What happens to the commercial leavening when a pre-ferment is carved out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "fraction", rename_all = "camelCase")]
pub enum LeaveningRule {
    /// All leavening goes into the pre-ferment
    MoveAll,
    /// Pre-ferment gets `fraction × pre-ferment flour` of leavening
    FractionOfPrefermentFlour(f64),
    /// Leavening stays in the final dough
    None,
    /// Commercial leavening is removed; the pre-ferment itself leavens
    Replace,
}

/// Split parameters for one method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRatio {
    /// Fraction of total flour that goes into the pre-ferment
    pub flour_ratio: f64,
    /// Pre-ferment liquid as a fraction of its flour; `None` moves all liquid
    pub hydration: Option<f64>,
    pub leavening: LeaveningRule,
}

/// One cold-retard stage: retards up to `up_to_hours` use `leavening_factor`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColdStage {
    pub up_to_hours: f64,
    pub leavening_factor: f64,
}

/// Lookup data for method conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRatioTable {
    pub ratios: FxHashMap<MethodKind, MethodRatio>,
    /// Ascending by `up_to_hours`
    pub cold_stages: Vec<ColdStage>,
    /// Leavening factor for retards longer than the last stage
    pub cold_long_factor: f64,
    /// Sugar multiplier for cold retards (feeds the long, slow fermentation)
    pub cold_sugar_factor: f64,
    /// Pre-ferment resting time when the method spec does not give one
    pub default_hours: FxHashMap<MethodKind, f64>,
}

impl Default for MethodRatioTable {
    fn default() -> Self {
        let ratios = [
            (
                MethodKind::Sponge,
                MethodRatio {
                    flour_ratio: 0.70,
                    hydration: Some(0.60),
                    leavening: LeaveningRule::MoveAll,
                },
            ),
            (
                MethodKind::Poolish,
                MethodRatio {
                    flour_ratio: 0.50,
                    hydration: Some(1.00),
                    leavening: LeaveningRule::FractionOfPrefermentFlour(0.002),
                },
            ),
            (
                MethodKind::Biga,
                MethodRatio {
                    flour_ratio: 0.60,
                    hydration: Some(0.50),
                    leavening: LeaveningRule::FractionOfPrefermentFlour(0.001),
                },
            ),
            (
                MethodKind::Tangzhong,
                MethodRatio {
                    flour_ratio: 0.10,
                    hydration: Some(5.00),
                    leavening: LeaveningRule::None,
                },
            ),
            (
                MethodKind::Autolyse,
                MethodRatio {
                    flour_ratio: 1.00,
                    hydration: None,
                    leavening: LeaveningRule::None,
                },
            ),
            (
                MethodKind::Sourdough,
                MethodRatio {
                    flour_ratio: 0.20,
                    hydration: Some(1.00),
                    leavening: LeaveningRule::Replace,
                },
            ),
        ];
        let default_hours = [
            (MethodKind::Sponge, 4.0),
            (MethodKind::Poolish, 12.0),
            (MethodKind::Biga, 14.0),
            (MethodKind::Tangzhong, 0.0),
            (MethodKind::Autolyse, 0.5),
            (MethodKind::Sourdough, 8.0),
            (MethodKind::ColdFermentation, 18.0),
        ];

        MethodRatioTable {
            ratios: ratios.into_iter().collect(),
            cold_stages: vec![
                ColdStage {
                    up_to_hours: 12.0,
                    leavening_factor: 0.5,
                },
                ColdStage {
                    up_to_hours: 24.0,
                    leavening_factor: 0.35,
                },
            ],
            cold_long_factor: 0.25,
            cold_sugar_factor: 1.05,
            default_hours: default_hours.into_iter().collect(),
        }
    }
}

impl MethodRatioTable {
    /// Split ratio for a method; `None` for straight and cold fermentation
    pub fn ratio(&self, kind: MethodKind) -> Option<MethodRatio> {
        self.ratios.get(&kind).copied()
    }

    /// Leavening factor for a cold retard of `hours`
    pub fn cold_leavening_factor(&self, hours: f64) -> f64 {
        self.cold_stages
            .iter()
            .find(|stage| hours <= stage.up_to_hours)
            .map_or(self.cold_long_factor, |stage| stage.leavening_factor)
    }

    pub fn default_hours(&self, kind: MethodKind) -> f64 {
        self.default_hours.get(&kind).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cold_stage_boundaries() {
        let table = MethodRatioTable::default();
        assert_eq!(table.cold_leavening_factor(8.0), 0.5);
        assert_eq!(table.cold_leavening_factor(12.0), 0.5);
        assert_eq!(table.cold_leavening_factor(18.0), 0.35);
        assert_eq!(table.cold_leavening_factor(24.0), 0.35);
        assert_eq!(table.cold_leavening_factor(48.0), 0.25);
    }

    #[test]
    fn test_non_split_methods_have_no_ratio() {
        let table = MethodRatioTable::default();
        assert!(table.ratio(MethodKind::Straight).is_none());
        assert!(table.ratio(MethodKind::ColdFermentation).is_none());
        assert_eq!(table.ratio(MethodKind::Biga).map(|r| r.flour_ratio), Some(0.6));
    }

    #[test]
    fn test_leavening_rule_json_shape() {
        let json = serde_json::to_string(&LeaveningRule::FractionOfPrefermentFlour(0.002)).unwrap();
        assert_eq!(json, r#"{"rule":"fractionOfPrefermentFlour","fraction":0.002}"#);
        let back: LeaveningRule = serde_json::from_str(r#"{"rule":"moveAll"}"#).unwrap();
        assert_eq!(back, LeaveningRule::MoveAll);
    }
}
