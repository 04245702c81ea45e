//! Desired dough temperature
//!
//! N-factor method: the final dough temperature is the mean of the component
//! temperatures plus the mixer friction rise spread across them.
//!
//! ```text
//! water = target·N − (Σ other components + friction)
//! ```
//!
//! with N = 3 (flour, room, water) or N = 4 when a pre-ferment is added. When
//! the water would have to be colder than 0 °C, part of the liquid is replaced
//! by ice using a heat balance that includes the latent heat of fusion.

use crate::core_types::units::{Celsius, Grams, Minutes};
use crate::error::{ConversionError, ConversionWarning, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Specific heat of water (J/g·K)
pub const WATER_SPECIFIC_HEAT: f64 = 4.186;

/// Latent heat of fusion of ice (J/g)
pub const ICE_LATENT_HEAT: f64 = 334.0;

/// Mixer used to develop the dough
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MixerType {
    Hand,
    StandMixer,
    Spiral,
    Planetary,
    FoodProcessor,
}

impl MixerType {
    pub fn as_str(self) -> &'static str {
        match self {
            MixerType::Hand => "hand",
            MixerType::StandMixer => "standMixer",
            MixerType::Spiral => "spiral",
            MixerType::Planetary => "planetary",
            MixerType::FoodProcessor => "foodProcessor",
        }
    }
}

impl FromStr for MixerType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "hand" => Ok(MixerType::Hand),
            "standmixer" | "stand" => Ok(MixerType::StandMixer),
            "spiral" => Ok(MixerType::Spiral),
            "planetary" => Ok(MixerType::Planetary),
            "foodprocessor" | "processor" => Ok(MixerType::FoodProcessor),
            _ => Err(ConversionError::UnsupportedMixer(s.to_string())),
        }
    }
}

impl fmt::Display for MixerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Friction rise of one mixer type (°C)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrictionProfile {
    /// Friction at the reference mixing time
    pub base: f64,
    /// Change per minute away from the reference time
    pub per_minute: f64,
    pub reference_minutes: f64,
}

/// Friction and water-temperature lookup data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DdtTable {
    pub mixers: FxHashMap<MixerType, FrictionProfile>,
    /// Extra friction per hydration point below `reference_hydration`
    pub per_hydration_point: f64,
    pub reference_hydration: f64,
    /// Tap water temperature assumed for ice splits
    pub tap_water_temp: f64,
    /// Water above this damages yeast
    pub max_water_temp: f64,
}

impl Default for DdtTable {
    fn default() -> Self {
        let mixers = [
            (MixerType::Hand, (4.0, 0.2, 15.0)),
            (MixerType::StandMixer, (12.0, 1.0, 8.0)),
            (MixerType::Spiral, (14.0, 1.2, 6.0)),
            (MixerType::Planetary, (16.0, 1.1, 8.0)),
            (MixerType::FoodProcessor, (20.0, 8.0, 1.0)),
        ]
        .into_iter()
        .map(|(mixer, (base, per_minute, reference_minutes))| {
            (
                mixer,
                FrictionProfile {
                    base,
                    per_minute,
                    reference_minutes,
                },
            )
        })
        .collect();

        DdtTable {
            mixers,
            per_hydration_point: 0.1,
            reference_hydration: 65.0,
            tap_water_temp: 20.0,
            max_water_temp: 50.0,
        }
    }
}

/// Friction factor for a mixer, mixing time and hydration
///
/// Table lookup by mixer with a linear correction: longer mixing and stiffer
/// dough both heat the dough more. Never negative.
pub fn recommend_friction_factor(
    mixer: MixerType,
    mixing_time: Minutes,
    hydration: f64,
    table: &DdtTable,
) -> f64 {
    let Some(profile) = table.mixers.get(&mixer) else {
        return 0.0;
    };
    let friction = profile.base
        + profile.per_minute * (*mixing_time - profile.reference_minutes)
        + table.per_hydration_point * (table.reference_hydration - hydration);
    friction.max(0.0)
}

/// Three-factor water temperature: `target·3 − (flour + room + friction)`
pub fn calculate_water_temp(target: Celsius, flour: Celsius, room: Celsius, friction: f64) -> Celsius {
    Celsius::from(*target * 3.0 - (*flour + *room + friction))
}

/// Four-factor water temperature: `target·4 − (flour + room + preferment + friction)`
pub fn calculate_water_temp_with_preferment(
    target: Celsius,
    flour: Celsius,
    room: Celsius,
    preferment: Celsius,
    friction: f64,
) -> Celsius {
    Celsius::from(*target * 4.0 - (*flour + *room + *preferment + friction))
}

/// Liquid split into ice and water
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IceSplit {
    pub ice: Grams,
    pub water: Grams,
}

/// Split `total_liquid` into ice and tap water so the mix settles at `target`
///
/// Heat balance: `water·c·(tap − target) = ice·(L + c·target)`. The target is
/// clamped at 0 °C (ice water is the coldest mix available); a target at or
/// above tap temperature needs no ice.
pub fn calculate_ice_amount(total_liquid: Grams, tap: Celsius, target: Celsius) -> IceSplit {
    let target = target.max(Celsius::FREEZING);
    if target >= tap {
        return IceSplit {
            ice: Grams::ZERO,
            water: total_liquid,
        };
    }
    let c = WATER_SPECIFIC_HEAT;
    let ice = *total_liquid * c * (*tap - *target) / (ICE_LATENT_HEAT + c * *tap);
    let ice = Grams::new(ice.clamp(0.0, *total_liquid));
    IceSplit {
        ice,
        water: total_liquid - ice,
    }
}

/// Expected dough temperature from component temperatures and a known friction
pub fn predict_with_friction(components: &[Celsius], friction: f64) -> Celsius {
    if components.is_empty() {
        return Celsius::from(friction);
    }
    let sum: f64 = components.iter().map(|c| **c).sum();
    let n = components.len() as f64;
    Celsius::from((sum + friction) / n)
}

/// Forward check of the water solve, with friction from the mixer model
pub fn predict_dough_temp(
    components: &[Celsius],
    mixing_time: Minutes,
    mixer: MixerType,
    hydration: f64,
    table: &DdtTable,
) -> Celsius {
    let friction = recommend_friction_factor(mixer, mixing_time, hydration, table);
    predict_with_friction(components, friction)
}

/// Where the friction factor comes from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FrictionSource {
    /// Measured by the baker
    Fixed { friction: f64 },
    /// Estimated from the mixer model
    Mixer { mixer: MixerType, minutes: f64 },
}

impl FrictionSource {
    pub fn resolve(&self, hydration: f64, table: &DdtTable) -> f64 {
        match *self {
            FrictionSource::Fixed { friction } => friction,
            FrictionSource::Mixer { mixer, minutes } => {
                recommend_friction_factor(mixer, Minutes::new(minutes.max(0.0)), hydration, table)
            }
        }
    }
}

/// Inputs to a DDT plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DdtRequest {
    pub target: Celsius,
    pub flour_temp: Celsius,
    pub room_temp: Celsius,
    #[serde(default)]
    pub preferment_temp: Option<Celsius>,
    pub friction: FrictionSource,
    /// Overrides the table's tap water temperature
    #[serde(default)]
    pub tap_water_temp: Option<Celsius>,
    /// Always split into ice and water, even when the water is above 0 °C
    #[serde(default)]
    pub use_ice: bool,
}

impl DdtRequest {
    /// Three-factor request with a fixed friction
    pub fn new(target: Celsius, flour_temp: Celsius, room_temp: Celsius, friction: f64) -> Self {
        DdtRequest {
            target,
            flour_temp,
            room_temp,
            preferment_temp: None,
            friction: FrictionSource::Fixed { friction },
            tap_water_temp: None,
            use_ice: false,
        }
    }

    pub fn with_preferment(mut self, temp: Celsius) -> Self {
        self.preferment_temp = Some(temp);
        self
    }

    pub fn with_mixer(mut self, mixer: MixerType, minutes: f64) -> Self {
        self.friction = FrictionSource::Mixer { mixer, minutes };
        self
    }

    pub fn with_ice(mut self) -> Self {
        self.use_ice = true;
        self
    }
}

/// Water temperature plan for a target dough temperature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DdtPlan {
    pub friction: f64,
    /// Solved water temperature; below 0 °C means ice is needed
    pub required_water_temp: Celsius,
    /// Temperature of the liquid actually added
    pub mixing_water_temp: Celsius,
    pub ice: Option<IceSplit>,
    pub predicted_dough_temp: Celsius,
    pub warnings: Vec<ConversionWarning>,
}

/// Solve the water temperature and, when needed, the ice split
///
/// `total_liquid` is the liquid that will be temperature-controlled and
/// `hydration` feeds the friction model.
pub fn plan(request: &DdtRequest, total_liquid: Grams, hydration: f64, table: &DdtTable) -> DdtPlan {
    let friction = request.friction.resolve(hydration, table);
    let required = match request.preferment_temp {
        Some(pre) => calculate_water_temp_with_preferment(
            request.target,
            request.flour_temp,
            request.room_temp,
            pre,
            friction,
        ),
        None => calculate_water_temp(request.target, request.flour_temp, request.room_temp, friction),
    };

    let mut warnings = Vec::new();
    let mixing_water_temp = required.max(Celsius::FREEZING);
    let tap = request
        .tap_water_temp
        .unwrap_or_else(|| Celsius::from(table.tap_water_temp));
    let ice = (*required < 0.0 || request.use_ice)
        .then(|| calculate_ice_amount(total_liquid, tap, mixing_water_temp));

    let mut components = vec![request.flour_temp, request.room_temp, mixing_water_temp];
    components.extend(request.preferment_temp);
    let predicted = predict_with_friction(&components, friction);

    if *required < 0.0 {
        warn!(
            required = *required,
            predicted = *predicted,
            "target dough temperature unreachable with ice water"
        );
        warnings.push(ConversionWarning::DoughTemperatureUnreachable {
            required_water_temp: *required,
            predicted_dough_temp: *predicted,
        });
    } else if *required > table.max_water_temp {
        warn!(water = *required, "mixing water too hot");
        warnings.push(ConversionWarning::WaterTooHot {
            water_temp: *required,
        });
    }

    debug!(
        friction,
        required = *required,
        mixing = *mixing_water_temp,
        predicted = *predicted,
        ice = ?ice.map(|s| *s.ice),
        "ddt plan"
    );

    DdtPlan {
        friction,
        required_water_temp: required,
        mixing_water_temp,
        ice,
        predicted_dough_temp: predicted,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_three_factor_water_temp() {
        let w = calculate_water_temp(Celsius::new(25.0), Celsius::new(20.0), Celsius::new(22.0), 24.0);
        assert_eq!(*w, 9.0);
    }

    #[test]
    fn test_four_factor_water_temp() {
        let w = calculate_water_temp_with_preferment(
            Celsius::new(24.0),
            Celsius::new(21.0),
            Celsius::new(23.0),
            Celsius::new(18.0),
            10.0,
        );
        assert_eq!(*w, 24.0 * 4.0 - (21.0 + 23.0 + 18.0 + 10.0));
    }

    #[test]
    fn test_friction_recommendation() {
        let table = DdtTable::default();
        let f = recommend_friction_factor(MixerType::StandMixer, Minutes::new(8.0), 65.0, &table);
        assert_relative_eq!(f, 12.0);
        let longer = recommend_friction_factor(MixerType::StandMixer, Minutes::new(10.0), 65.0, &table);
        assert_relative_eq!(longer, 14.0);
        let stiffer = recommend_friction_factor(MixerType::StandMixer, Minutes::new(8.0), 55.0, &table);
        assert_relative_eq!(stiffer, 13.0);
        let barely = recommend_friction_factor(MixerType::Hand, Minutes::new(0.0), 100.0, &table);
        assert!(barely >= 0.0);
    }

    #[test]
    fn test_ice_split_balances_heat() {
        let split = calculate_ice_amount(Grams::new(700.0), Celsius::new(20.0), Celsius::new(5.0));
        assert_relative_eq!(*split.ice + *split.water, 700.0);
        // heat lost by the water equals heat taken by the ice
        let lost = *split.water * WATER_SPECIFIC_HEAT * (20.0 - 5.0);
        let gained = *split.ice * (ICE_LATENT_HEAT + WATER_SPECIFIC_HEAT * 5.0);
        assert_relative_eq!(lost, gained, epsilon = 1e-9);
    }

    #[test]
    fn test_no_ice_when_target_above_tap() {
        let split = calculate_ice_amount(Grams::new(500.0), Celsius::new(20.0), Celsius::new(30.0));
        assert_eq!(split.ice, Grams::ZERO);
        assert_eq!(split.water, Grams::new(500.0));
    }

    #[test]
    fn test_prediction_inverts_water_solve() {
        let (target, flour, room, friction) = (Celsius::new(26.0), Celsius::new(21.0), Celsius::new(24.0), 12.0);
        let water = calculate_water_temp(target, flour, room, friction);
        let predicted = predict_with_friction(&[flour, room, water], friction);
        assert_relative_eq!(*predicted, 26.0);
    }

    #[test]
    fn test_predict_dough_temp_uses_mixer_friction() {
        let table = DdtTable::default();
        let (flour, room) = (Celsius::new(22.0), Celsius::new(24.0));
        // stand mixer at its 8 min reference and 65% hydration: friction 12
        let water = calculate_water_temp(Celsius::new(26.0), flour, room, 12.0);
        assert_eq!(*water, 20.0);
        let components = [flour, room, water];
        let predicted =
            predict_dough_temp(&components, Minutes::new(8.0), MixerType::StandMixer, 65.0, &table);
        assert_relative_eq!(*predicted, 26.0);

        // two more minutes on a stiffer dough: 12 + 2 + 0.5
        let longer =
            predict_dough_temp(&components, Minutes::new(10.0), MixerType::StandMixer, 60.0, &table);
        assert_relative_eq!(*longer, (66.0 + 14.5) / 3.0, epsilon = 1e-12);
        assert!(longer > predicted);
    }

    #[test]
    fn test_plan_with_unreachable_target_uses_ice() {
        let request = DdtRequest::new(Celsius::new(22.0), Celsius::new(30.0), Celsius::new(32.0), 20.0);
        let plan = plan(&request, Grams::new(650.0), 65.0, &DdtTable::default());
        assert_eq!(*plan.required_water_temp, -16.0);
        assert_eq!(*plan.mixing_water_temp, 0.0);
        let ice = plan.ice.unwrap();
        assert!(*ice.ice > 0.0);
        assert_relative_eq!(*ice.ice + *ice.water, 650.0);
        assert_relative_eq!(*plan.predicted_dough_temp, (30.0 + 32.0 + 0.0 + 20.0) / 3.0);
        assert!(matches!(
            plan.warnings[..],
            [ConversionWarning::DoughTemperatureUnreachable { .. }]
        ));
    }

    #[test]
    fn test_plan_warns_on_hot_water() {
        let request = DdtRequest::new(Celsius::new(30.0), Celsius::new(10.0), Celsius::new(12.0), 2.0);
        let plan = plan(&request, Grams::new(500.0), 65.0, &DdtTable::default());
        assert_eq!(*plan.required_water_temp, 66.0);
        assert!(plan.ice.is_none());
        assert!(matches!(plan.warnings[..], [ConversionWarning::WaterTooHot { .. }]));
    }

    #[test]
    fn test_plan_with_mixer_and_requested_ice() {
        let request = DdtRequest::new(Celsius::new(25.0), Celsius::new(20.0), Celsius::new(22.0), 0.0)
            .with_mixer(MixerType::Spiral, 6.0)
            .with_ice();
        let plan = plan(&request, Grams::new(600.0), 65.0, &DdtTable::default());
        assert_relative_eq!(plan.friction, 14.0);
        assert_relative_eq!(*plan.required_water_temp, 75.0 - 56.0);
        // 19 °C water from 20 °C tap needs a little ice
        assert!(*plan.ice.unwrap().ice > 0.0);
        assert!(plan.warnings.is_empty());
    }
}
