//! Property tests for the conversion invariants
//!
//! Randomized formulas and pans check the properties that must hold for
//! every input, not just the worked examples:
//! - Scaling by k then 1/k restores the formula
//! - Percentages converted back at the same flour weight restore the formula
//! - Pan and quantity changes never move hydration
//! - Multi-pan allocations always sum to the total dough
//! - Pan volume grows with every dimension of every family (bar a chiffon
//!   pan's tube)
//! - Method splits conserve flour
//! - Conversion is deterministic
//!
//! Run tests with: cargo test --test `conversion_properties`

use bake_convert_core::bakeware::{volume, MagicNumberTable, PanAllocation, PanFamily, PanMaterial};
use bake_convert_core::formula::{scale, to_absolute_weight, to_percentage_of_own_flour, total_flour};
use bake_convert_core::method::{split, MethodRatioTable};
use bake_convert_core::{
    ConversionEngine, ConversionIntent, Grams, Ingredient, IngredientCategory, Meters, MethodKind, PanConfig,
    ProductType, QuantityTarget, Recipe,
};
use proptest::prelude::*;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn formula_strategy() -> impl Strategy<Value = Vec<Ingredient>> {
    (100.0..2000.0f64, 0.4..1.0f64, 0.0..0.03f64, 0.002..0.03f64, 0.0..0.2f64).prop_map(
        |(flour, water, salt, yeast, sugar)| {
            vec![
                Ingredient::flour("Bread flour", flour),
                Ingredient::new("Water", flour * water, IngredientCategory::Liquid),
                Ingredient::new("Salt", flour * salt, IngredientCategory::Salt),
                Ingredient::new("Yeast", flour * yeast, IngredientCategory::Leavening),
                Ingredient::new("Sugar", flour * sugar, IngredientCategory::Sugar),
            ]
        },
    )
}

fn round_pan_strategy() -> impl Strategy<Value = PanConfig> {
    (10.0..35.0f64, 3.0..12.0f64).prop_map(|(d, h)| PanConfig::round(d, h))
}

const FAMILIES: [PanFamily; 9] = [
    PanFamily::Round,
    PanFamily::Square,
    PanFamily::Rectangle,
    PanFamily::Loaf,
    PanFamily::Pullman,
    PanFamily::Pound,
    PanFamily::Chiffon,
    PanFamily::Muffin,
    PanFamily::Sheet,
];

/// A family with valid positional dimensions
fn pan_dimensions_strategy() -> impl Strategy<Value = (PanFamily, Vec<f64>)> {
    (
        prop::sample::select(FAMILIES.to_vec()),
        prop::collection::vec(2.0..40.0f64, 4),
        0.1..0.5f64,
        1u32..24,
    )
        .prop_map(|(family, sizes, tube, cups)| {
            let mut dims: Vec<f64> = sizes[..family.dimension_names().len()].to_vec();
            match family {
                PanFamily::Chiffon => dims[1] = dims[0] * tube,
                PanFamily::Muffin => dims[3] = f64::from(cups),
                _ => {}
            }
            (family, dims)
        })
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    // ═══════════════════════════════════════════════════════════════════════
    // FORMULA
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn prop_scale_then_inverse_restores(ings in formula_strategy(), k in 0.05..20.0f64) {
        let back = scale(&scale(&ings, k).unwrap(), 1.0 / k).unwrap();
        for (a, b) in ings.iter().zip(&back) {
            prop_assert!(close(a.amount, b.amount), "{} vs {}", a.amount, b.amount);
        }
    }

    #[test]
    fn prop_percentage_round_trip(ings in formula_strategy()) {
        let lines = to_percentage_of_own_flour(&ings).unwrap();
        let back = to_absolute_weight(&lines, total_flour(&ings)).unwrap();
        for (a, b) in ings.iter().zip(&back) {
            prop_assert!(close(a.amount, b.amount));
            prop_assert_eq!(&a.name, &b.name);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // BAKEWARE
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn prop_volume_grows_with_each_dimension(
        (family, dims) in pan_dimensions_strategy(),
        grow in 1.01..2.0f64,
    ) {
        let base = *volume(&PanConfig::from_dimensions(family, &dims).unwrap()).unwrap();
        for (index, name) in family.dimension_names().iter().enumerate() {
            // the tube of a chiffon pan takes volume away
            if family == PanFamily::Chiffon && *name == "innerDiameter" {
                continue;
            }
            let mut larger = dims.clone();
            larger[index] = if *name == "cups" { dims[index] + 1.0 } else { dims[index] * grow };
            let grown = *volume(&PanConfig::from_dimensions(family, &larger).unwrap()).unwrap();
            prop_assert!(grown > base, "{family} {name}: {grown} <= {base}");
        }
    }

    #[test]
    fn prop_distribution_sums_to_total(
        total in 200.0..5000.0f64,
        pans in prop::collection::vec((round_pan_strategy(), 1u32..4), 1..5),
    ) {
        let allocations: Vec<PanAllocation> = pans
            .into_iter()
            .map(|(pan, count)| PanAllocation { pan, count, material: PanMaterial::Aluminum })
            .collect();
        let shares = MagicNumberTable::default()
            .distribute_to_multiple_pans(Grams::new(total), &allocations, ProductType::SpongeCake, Meters::SEA_LEVEL)
            .unwrap();
        let sum: f64 = shares.iter().map(|s| s.actual_amount).sum();
        prop_assert!(close(sum, total), "{sum} vs {total}");
        prop_assert_eq!(shares.len(), allocations.len());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // METHOD
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn prop_split_conserves_flour(ings in formula_strategy(), kind_index in 0usize..6) {
        let kinds = [
            MethodKind::Sponge,
            MethodKind::Poolish,
            MethodKind::Biga,
            MethodKind::Tangzhong,
            MethodKind::Autolyse,
            MethodKind::Sourdough,
        ];
        let kind = kinds[kind_index];
        let ratio = MethodRatioTable::default().ratio(kind).unwrap();
        let out = split::split(&ings, kind, &ratio).unwrap();
        let flour = total_flour(&out.preferment) + total_flour(&out.main_dough);
        prop_assert!((flour - total_flour(&ings)).abs() < 0.1);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ENGINE
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn prop_pan_and_quantity_keep_hydration(
        ings in formula_strategy(),
        from in round_pan_strategy(),
        to in round_pan_strategy(),
        k in 0.1..10.0f64,
    ) {
        let engine = ConversionEngine::default();
        let recipe = Recipe::new("Loaf", ings, from);
        let out = engine.convert(&recipe, &ConversionIntent::PanChange { pan: to }).unwrap();
        prop_assert!(close(out.summary.hydration_before, out.summary.hydration_after));

        let scaled = engine
            .convert(&recipe, &ConversionIntent::QuantityChange {
                target: QuantityTarget::Multiplier { factor: k },
            })
            .unwrap();
        prop_assert!(close(scaled.recipe.hydration(), recipe.hydration()));
        prop_assert!(close(scaled.summary.weight_ratio, k));
    }

    #[test]
    fn prop_conversion_is_deterministic(ings in formula_strategy(), to in round_pan_strategy()) {
        let engine = ConversionEngine::default();
        let recipe = Recipe::new("Loaf", ings, PanConfig::round(20.0, 8.0));
        let intent = ConversionIntent::PanChange { pan: to };
        let first = engine.convert(&recipe, &intent).unwrap();
        let second = engine.convert(&recipe, &intent).unwrap();
        prop_assert_eq!(first, second);
    }
}
