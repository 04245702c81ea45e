use anyhow::{ensure, Context, Result};
use bake_convert_core::bakeware::volume;
use bake_convert_core::ddt;
use bake_convert_core::environment::{evaluate_environment, factors};
use bake_convert_core::{
    Celsius, ConversionEngine, ConversionIntent, ConversionOutcome, ConversionTables, DdtRequest, Environment, Grams,
    Meters, MethodKind, MethodSpec, MixerType, PanConfig, PanFamily, PrefermentParams, QuantityTarget, Recipe,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

/// Recipe conversion from the command line
#[derive(Parser, Debug)]
#[command(name = "bake-convert")]
#[command(about = "Convert baking recipes between pans, methods, batch sizes and kitchens", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Conversion tables as JSON (densities, magic numbers, method ratios, ...)
    #[arg(long, global = true)]
    tables: Option<PathBuf>,

    /// Print results as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Move a recipe to a different pan
    Pan {
        /// Recipe JSON file
        recipe: PathBuf,
        /// Target pan family (round, square, rectangle, loaf, pullman, pound, chiffon, muffin, sheet)
        #[arg(long)]
        family: String,
        /// Target dimensions in cm, comma separated
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        dims: Vec<f64>,
    },

    /// Change the pre-fermentation method
    Method {
        /// Recipe JSON file
        recipe: PathBuf,
        /// Target method (straight, sponge, poolish, biga, tangzhong, autolyse, sourdough, coldFermentation)
        #[arg(long)]
        to: String,
        /// Fraction of flour in the pre-ferment
        #[arg(long)]
        flour_ratio: Option<f64>,
        /// Pre-ferment hydration as a fraction of its flour
        #[arg(long)]
        hydration: Option<f64>,
        /// Pre-ferment or retard hours
        #[arg(long)]
        hours: Option<f64>,
    },

    /// Change the batch size
    Scale {
        /// Recipe JSON file
        recipe: PathBuf,
        /// Multiply every amount
        #[arg(long, conflicts_with_all = ["servings", "flour", "piece_weight"])]
        factor: Option<f64>,
        /// Target number of servings or pieces
        #[arg(long, conflicts_with_all = ["flour", "piece_weight"])]
        servings: Option<f64>,
        /// Target total flour in grams
        #[arg(long, conflicts_with = "piece_weight")]
        flour: Option<f64>,
        /// Weight of one piece in grams
        #[arg(long, requires = "count")]
        piece_weight: Option<f64>,
        /// Number of pieces
        #[arg(long)]
        count: Option<u32>,
    },

    /// Solve the mixing water temperature for a desired dough temperature
    Ddt {
        /// Desired dough temperature (°C)
        #[arg(long, default_value_t = 26.0)]
        target: f64,
        /// Flour temperature (°C)
        #[arg(long)]
        flour: f64,
        /// Room temperature (°C)
        #[arg(long)]
        room: f64,
        /// Pre-ferment temperature (°C), switches to the four-factor formula
        #[arg(long)]
        preferment: Option<f64>,
        /// Fixed friction factor (°C)
        #[arg(long, conflicts_with = "mixer")]
        friction: Option<f64>,
        /// Mixer used to estimate the friction factor
        #[arg(long, requires = "minutes")]
        mixer: Option<String>,
        /// Mixing time in minutes
        #[arg(long)]
        minutes: Option<f64>,
        /// Liquid in grams, used for the ice split
        #[arg(long, default_value_t = 0.0)]
        liquid: f64,
        /// Formula hydration (%), feeds the friction estimate
        #[arg(long, default_value_t = 65.0)]
        hydration: f64,
        /// Always report an ice split
        #[arg(long)]
        ice: bool,
    },

    /// Adapt a recipe to the kitchen's temperature, humidity and altitude
    Env {
        /// Recipe JSON file
        recipe: PathBuf,
        /// Room temperature (°C)
        #[arg(long)]
        temp: f64,
        /// Relative humidity (%)
        #[arg(long)]
        humidity: f64,
        /// Altitude (m)
        #[arg(long, default_value_t = 0.0)]
        altitude: f64,
    },

    /// Volume of a pan
    Volume {
        /// Pan family
        #[arg(long)]
        family: String,
        /// Dimensions in cm, comma separated
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        dims: Vec<f64>,
    },

    /// Assess kitchen conditions without converting anything
    Evaluate {
        /// Room temperature (°C)
        #[arg(long)]
        temp: f64,
        /// Relative humidity (%)
        #[arg(long)]
        humidity: f64,
        /// Altitude (m)
        #[arg(long, default_value_t = 0.0)]
        altitude: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let tables = match &cli.tables {
        Some(path) => load_tables(path)?,
        None => ConversionTables::default(),
    };
    let engine = ConversionEngine::new(tables);

    match cli.command {
        Command::Pan { recipe, family, dims } => {
            let pan = parse_pan(&family, &dims)?;
            convert(&engine, &recipe, &ConversionIntent::PanChange { pan }, cli.json)
        }
        Command::Method {
            recipe,
            to,
            flour_ratio,
            hydration,
            hours,
        } => {
            let kind: MethodKind = to.parse()?;
            let spec = method_spec(kind, flour_ratio, hydration, hours, &engine);
            convert(&engine, &recipe, &ConversionIntent::MethodChange { method: spec }, cli.json)
        }
        Command::Scale {
            recipe,
            factor,
            servings,
            flour,
            piece_weight,
            count,
        } => {
            let target = match (factor, servings, flour, piece_weight.zip(count)) {
                (Some(factor), _, _, _) => QuantityTarget::Multiplier { factor },
                (_, Some(target), _, _) => QuantityTarget::Yield { target },
                (_, _, Some(grams), _) => QuantityTarget::FlourWeight { grams },
                (_, _, _, Some((weight, count))) => QuantityTarget::PieceWeight { weight, count },
                _ => anyhow::bail!("one of --factor, --servings, --flour or --piece-weight is required"),
            };
            convert(&engine, &recipe, &ConversionIntent::QuantityChange { target }, cli.json)
        }
        Command::Ddt {
            target,
            flour,
            room,
            preferment,
            friction,
            mixer,
            minutes,
            liquid,
            hydration,
            ice,
        } => {
            ensure!(liquid >= 0.0, "--liquid must be non-negative, got {liquid}");
            let mut request = DdtRequest::new(
                Celsius::from(target),
                Celsius::from(flour),
                Celsius::from(room),
                friction.unwrap_or(0.0),
            );
            if let Some(pre) = preferment {
                request = request.with_preferment(Celsius::from(pre));
            }
            if let Some(mixer) = mixer {
                let mixer: MixerType = mixer.parse()?;
                request = request.with_mixer(mixer, minutes.unwrap_or(0.0));
            }
            if ice {
                request = request.with_ice();
            }
            let plan = ddt::plan(&request, Grams::new(liquid), hydration, &engine.tables().ddt);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
                return Ok(());
            }
            println!("=== Desired Dough Temperature ===\n");
            println!("Friction factor:     {:.1}°C", plan.friction);
            println!("Required water:      {:.1}°C", *plan.required_water_temp);
            println!("Mixing water:        {:.1}°C", *plan.mixing_water_temp);
            println!("Predicted dough:     {:.1}°C", *plan.predicted_dough_temp);
            if let Some(split) = plan.ice {
                println!("Ice / water:         {:.0} g / {:.0} g", *split.ice, *split.water);
            }
            for w in &plan.warnings {
                println!("! {w}");
            }
            Ok(())
        }
        Command::Env {
            recipe,
            temp,
            humidity,
            altitude,
        } => {
            let environment = Environment::new(Celsius::from(temp), humidity, altitude_arg(altitude)?);
            convert(&engine, &recipe, &ConversionIntent::EnvironmentApply { environment }, cli.json)
        }
        Command::Volume { family, dims } => {
            let pan = parse_pan(&family, &dims)?;
            let v = volume(&pan)?;
            if cli.json {
                println!("{}", serde_json::json!({ "pan": pan, "volume": *v }));
            } else {
                println!("{pan}: {:.1} cm³", *v);
            }
            Ok(())
        }
        Command::Evaluate {
            temp,
            humidity,
            altitude,
        } => {
            let env = Environment::new(Celsius::from(temp), humidity, altitude_arg(altitude)?);
            let table = &engine.tables().environment;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&factors(&env, table))?);
                return Ok(());
            }
            let evaluation = evaluate_environment(&env, table);
            let f = factors(&env, table);
            println!("=== Kitchen Conditions ===\n");
            println!("Status:          {:?}", evaluation.overall);
            println!("Pressure:        {:.1} kPa", *f.pressure);
            println!("Boiling point:   {:.1}°C", *f.boiling_point);
            println!("Leavening ×      {:.3}", f.leavening_factor);
            println!("Fermentation ×   {:.3}", f.fermentation_time_factor);
            println!("Flour × / liquid ×  {:.3} / {:.3}", f.flour_factor, f.liquid_factor);
            for (warning, recommendation) in evaluation.warnings.iter().zip(&evaluation.recommendations) {
                println!("! {warning}: {recommendation}");
            }
            Ok(())
        }
    }
}

fn load_tables(path: &Path) -> Result<ConversionTables> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading tables {}", path.display()))?;
    let tables: ConversionTables =
        serde_json::from_str(&text).with_context(|| format!("parsing tables {}", path.display()))?;
    info!(path = %path.display(), version = tables.version, "loaded conversion tables");
    Ok(tables)
}

fn load_recipe(path: &Path) -> Result<Recipe> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading recipe {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing recipe {}", path.display()))
}

fn parse_pan(family: &str, dims: &[f64]) -> Result<PanConfig> {
    let family: PanFamily = family.parse()?;
    Ok(PanConfig::from_dimensions(family, dims)?)
}

fn altitude_arg(altitude: f64) -> Result<Meters> {
    ensure!(
        altitude.is_finite() && altitude >= 0.0,
        "--altitude must be non-negative, got {altitude}"
    );
    Ok(Meters::new(altitude))
}

fn method_spec(
    kind: MethodKind,
    flour_ratio: Option<f64>,
    hydration: Option<f64>,
    hours: Option<f64>,
    engine: &ConversionEngine,
) -> MethodSpec {
    let params = PrefermentParams {
        flour_ratio,
        hydration,
        hours,
    };
    match MethodSpec::with_defaults(kind, &engine.tables().methods) {
        MethodSpec::Straight => MethodSpec::Straight,
        MethodSpec::ColdFermentation { hours: default, .. } => MethodSpec::ColdFermentation {
            hours: hours.unwrap_or(default),
            bulk_hours: None,
        },
        MethodSpec::Sponge(_) => MethodSpec::Sponge(params),
        MethodSpec::Poolish(_) => MethodSpec::Poolish(params),
        MethodSpec::Biga(_) => MethodSpec::Biga(params),
        MethodSpec::Tangzhong(_) => MethodSpec::Tangzhong(params),
        MethodSpec::Autolyse(_) => MethodSpec::Autolyse(params),
        MethodSpec::Sourdough(_) => MethodSpec::Sourdough(params),
    }
}

fn convert(engine: &ConversionEngine, recipe: &Path, intent: &ConversionIntent, json: bool) -> Result<()> {
    let recipe = load_recipe(recipe)?;
    let outcome = engine.convert(&recipe, intent)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

fn print_outcome(outcome: &ConversionOutcome) {
    let recipe = outcome.recipe.rounded();
    let summary = &outcome.summary;

    println!("=== {} ===\n", recipe.name);
    println!("Pan: {}   Method: {}", recipe.pan, recipe.method);
    println!(
        "Hydration: {:.1}% -> {:.1}%   Weight ×{:.3}\n",
        summary.hydration_before, summary.hydration_after, summary.weight_ratio
    );

    println!("{:<24} {:>10} {:>10} {:>8}", "Ingredient", "Before", "After", "Δ%");
    for diff in &outcome.diffs {
        let pct = diff
            .delta_percent
            .map_or_else(|| "new".to_string(), |p| format!("{p:+.1}"));
        println!("{:<24} {:>10.1} {:>10.1} {:>8}", diff.name, diff.before, diff.after, pct);
    }

    if let Some(stages) = &recipe.stages {
        println!("\n{} ({:.1} h)", stages.method, *stages.preferment_hours);
        for ing in &stages.preferment {
            println!("  {:<22} {:>10.1}", ing.name, ing.amount);
        }
        println!("Final dough");
        for ing in &stages.main_dough {
            println!("  {:<22} {:>10.1}", ing.name, ing.amount);
        }
    }

    for change in &summary.process_changes {
        println!("{:?}: {:.1} -> {:.1}", change.parameter, change.before, change.after);
    }
    if let Some(ideal) = summary.ideal_dough_weight {
        println!("Ideal dough for this pan: {ideal:.0} g");
    }
    for w in &summary.warnings {
        println!("! {w}");
    }
}
