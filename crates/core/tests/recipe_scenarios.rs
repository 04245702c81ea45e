//! Reference scenarios for the conversion components
//!
//! Each test pins one worked example with a known answer: baker's
//! percentages, hydration, pan volume, DDT water temperature, cold
//! fermentation factors and ratio validation.
//!
//! Run tests with: cargo test --test `recipe_scenarios`

use approx::assert_relative_eq;
use bake_convert_core::bakeware::{volume, MagicNumberOptions, MagicNumberTable, PanMaterial};
use bake_convert_core::ddt::calculate_water_temp;
use bake_convert_core::environment::{boiling_point, pressure};
use bake_convert_core::formula::{hydration, to_percentage, to_percentage_of_own_flour, validate_ratios};
use bake_convert_core::method::split::straight_to_cold_fermentation;
use bake_convert_core::method::MethodRatioTable;
use bake_convert_core::{
    Celsius, ConversionError, ConversionWarning, CubicCentimeters, Ingredient, IngredientCategory, Meters,
    PanConfig, ProductType,
};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// BAKER'S PERCENTAGE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_lean_dough_percentages() {
    let ings = vec![
        Ingredient::flour("Flour", 1000.0),
        Ingredient::new("Water", 650.0, IngredientCategory::Liquid),
        Ingredient::new("Salt", 20.0, IngredientCategory::Salt),
        Ingredient::new("Yeast", 10.0, IngredientCategory::Leavening),
        Ingredient::new("Sugar", 50.0, IngredientCategory::Sugar),
    ];
    let pcts: Vec<f64> = to_percentage(&ings, 1000.0)
        .unwrap()
        .into_iter()
        .map(|l| l.percentage)
        .collect();
    assert_eq!(pcts, vec![100.0, 65.0, 2.0, 1.0, 5.0]);
}

#[test]
fn test_two_flours_two_liquids_hydration() {
    let ings = vec![
        Ingredient::flour("Bread flour", 800.0),
        Ingredient::flour("Rye flour", 200.0),
        Ingredient::new("Water", 500.0, IngredientCategory::Liquid),
        Ingredient::new("Milk", 200.0, IngredientCategory::Liquid),
    ];
    assert_relative_eq!(hydration(&ings), 70.0);
}

#[test]
fn test_zero_flour_weight_is_a_hard_failure() {
    let ings = vec![Ingredient::new("Water", 100.0, IngredientCategory::Liquid)];
    assert_eq!(to_percentage(&ings, 0.0), Err(ConversionError::InvalidFlourWeight(0.0)));
    assert_eq!(
        to_percentage_of_own_flour(&ings),
        Err(ConversionError::InvalidFlourWeight(0.0))
    );
}

#[test]
fn test_dry_dough_fails_validation() {
    let ings = vec![
        Ingredient::flour("Flour", 1000.0),
        Ingredient::new("Water", 450.0, IngredientCategory::Liquid),
        Ingredient::new("Salt", 20.0, IngredientCategory::Salt),
        Ingredient::new("Yeast", 10.0, IngredientCategory::Leavening),
    ];
    let result = validate_ratios(&to_percentage_of_own_flour(&ings).unwrap());
    assert!(!result.is_valid);
    assert_relative_eq!(result.hydration, 45.0);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.to_string().contains("hydration below 50%")));
    assert!(matches!(
        result.warnings[0],
        ConversionWarning::HydrationOutOfRange { .. }
    ));
}

// ═══════════════════════════════════════════════════════════════════════════════
// BAKEWARE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_eighteen_centimeter_round_pan() {
    let v = volume(&PanConfig::round(18.0, 5.0)).unwrap();
    assert!((*v - 1272.3).abs() < 0.05, "got {v}");
}

#[test]
fn test_unknown_pan_family_tag() {
    assert_eq!(
        "bundt".parse::<bake_convert_core::PanFamily>(),
        Err(ConversionError::UnsupportedPanFamily("bundt".into()))
    );
}

#[test]
fn test_chiffon_is_annulus() {
    let outer = volume(&PanConfig::round(20.0, 9.0)).unwrap();
    let inner = volume(&PanConfig::round(7.0, 9.0)).unwrap();
    let chiffon = volume(&PanConfig::chiffon(20.0, 7.0, 9.0)).unwrap();
    assert_relative_eq!(*chiffon, *outer - *inner, epsilon = 1e-9);
}

#[test]
fn test_magic_number_at_altitude_on_glass() {
    let table = MagicNumberTable::default();
    let options = MagicNumberOptions {
        material: PanMaterial::Glass,
        altitude: Meters::new(2000.0),
    };
    let dough = table
        .dough_weight(CubicCentimeters::new(1900.0), ProductType::Cheesecake, options)
        .unwrap();
    assert_relative_eq!(*dough, 1900.0 / (1.9 * 0.95 * 0.92), epsilon = 1e-9);
}

// ═══════════════════════════════════════════════════════════════════════════════
// METHOD AND TEMPERATURE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_water_temperature_three_factor() {
    let w = calculate_water_temp(Celsius::new(25.0), Celsius::new(20.0), Celsius::new(22.0), 24.0);
    assert_eq!(*w, 9.0);
}

#[test]
fn test_cold_fermentation_eighteen_hours() {
    let ings = vec![
        Ingredient::flour("Flour", 1000.0),
        Ingredient::new("Water", 680.0, IngredientCategory::Liquid),
        Ingredient::new("Yeast", 7.0, IngredientCategory::Leavening),
        Ingredient::new("Sugar", 20.0, IngredientCategory::Sugar),
        Ingredient::new("Butter", 50.0, IngredientCategory::Fat),
    ];
    let cold = straight_to_cold_fermentation(&ings, 18.0, &MethodRatioTable::default());
    assert_eq!(cold[0].amount, 1000.0);
    assert_eq!(cold[1].amount, 680.0);
    assert_eq!(cold[2].amount, 7.0 * 0.35);
    assert_eq!(cold[3].amount, 20.0 * 1.05);
    assert_eq!(cold[4].amount, 50.0);
}

#[test]
fn test_pressure_and_boiling_point_at_altitude() {
    let p = pressure(Meters::new(8434.0));
    assert_relative_eq!(*p, 101.325 / std::f64::consts::E, epsilon = 1e-9);
    assert!(*boiling_point(Meters::new(2000.0)) < *boiling_point(Meters::new(1000.0)));
}
