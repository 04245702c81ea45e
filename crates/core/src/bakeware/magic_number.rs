//! Magic numbers: pan volume to dough weight
//!
//! A magic number is the specific volume of a baked product (cm³ of pan per
//! gram of dough). Dividing a pan's volume by it gives the dough weight that
//! fills the pan properly:
//!
//! ```text
//! dough = volume / (base[product] · material_factor · altitude_factor(altitude))
//! ```
//!
//! The altitude factor is piecewise-linear between breakpoints and clamps
//! outside them.

use super::geometry::{volume, PanConfig};
use crate::core_types::units::{CubicCentimeters, Grams, Meters};
use crate::error::{ConversionError, Result};
use crate::rounding::round_weight;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Baked product category with its own specific volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductType {
    WhiteBread,
    Pullman,
    Brioche,
    SpongeCake,
    ChiffonCake,
    PoundCake,
    Muffin,
    Cheesecake,
}

impl ProductType {
    /// camelCase tag
    pub fn as_str(self) -> &'static str {
        match self {
            ProductType::WhiteBread => "whiteBread",
            ProductType::Pullman => "pullman",
            ProductType::Brioche => "brioche",
            ProductType::SpongeCake => "spongeCake",
            ProductType::ChiffonCake => "chiffonCake",
            ProductType::PoundCake => "poundCake",
            ProductType::Muffin => "muffin",
            ProductType::Cheesecake => "cheesecake",
        }
    }
}

impl FromStr for ProductType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "whitebread" | "bread" => Ok(ProductType::WhiteBread),
            "pullman" | "shokupan" => Ok(ProductType::Pullman),
            "brioche" => Ok(ProductType::Brioche),
            "spongecake" | "genoise" => Ok(ProductType::SpongeCake),
            "chiffoncake" | "chiffon" => Ok(ProductType::ChiffonCake),
            "poundcake" => Ok(ProductType::PoundCake),
            "muffin" => Ok(ProductType::Muffin),
            "cheesecake" => Ok(ProductType::Cheesecake),
            _ => Err(ConversionError::UnsupportedProductType(s.to_string())),
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pan material; affects heat transfer and therefore the ideal fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PanMaterial {
    #[default]
    Aluminum,
    Steel,
    Tinplate,
    Glass,
    Ceramic,
    Silicone,
    NonStick,
}

/// One (altitude, factor) breakpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AltitudeBreakpoint {
    /// Altitude in meters
    pub altitude: f64,
    /// Multiplier applied to the magic number at that altitude
    pub factor: f64,
}

/// Material and altitude for a magic-number lookup
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MagicNumberOptions {
    pub material: PanMaterial,
    pub altitude: Meters,
}

/// A group of identical pans to fill from one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanAllocation {
    pub pan: PanConfig,
    /// Number of identical pans
    pub count: u32,
    #[serde(default)]
    pub material: PanMaterial,
}

/// Dough assigned to one pan group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanShare {
    pub pan: PanConfig,
    pub count: u32,
    /// Dough that would fill this group exactly according to its magic number
    pub ideal_amount: f64,
    /// Dough actually allocated from the batch
    pub actual_amount: f64,
    /// `actual_amount / count`
    pub per_pan_amount: f64,
}

/// Magic numbers and their modifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicNumberTable {
    /// Base specific volume per product (cm³/g)
    pub base: FxHashMap<ProductType, f64>,
    /// Material multiplier (1.0 for plain aluminum)
    pub materials: FxHashMap<PanMaterial, f64>,
    /// Ascending altitude breakpoints
    pub altitude_breakpoints: Vec<AltitudeBreakpoint>,
    /// Factor used above the last breakpoint
    pub above_table_factor: f64,
}

impl Default for MagicNumberTable {
    fn default() -> Self {
        let base = [
            (ProductType::WhiteBread, 4.0),
            (ProductType::Pullman, 3.8),
            (ProductType::Brioche, 3.2),
            (ProductType::SpongeCake, 5.1),
            (ProductType::ChiffonCake, 4.2),
            (ProductType::PoundCake, 2.4),
            (ProductType::Muffin, 2.6),
            (ProductType::Cheesecake, 1.9),
        ];
        let materials = [
            (PanMaterial::Aluminum, 1.0),
            (PanMaterial::Steel, 1.02),
            (PanMaterial::Tinplate, 1.0),
            (PanMaterial::Glass, 0.95),
            (PanMaterial::Ceramic, 0.97),
            (PanMaterial::Silicone, 1.05),
            (PanMaterial::NonStick, 1.0),
        ];
        let altitude_breakpoints = [
            (0.0, 1.0),
            (500.0, 0.98),
            (1000.0, 0.96),
            (1500.0, 0.94),
            (2000.0, 0.92),
            (2500.0, 0.90),
        ]
        .into_iter()
        .map(|(altitude, factor)| AltitudeBreakpoint { altitude, factor })
        .collect();

        MagicNumberTable {
            base: base.into_iter().collect(),
            materials: materials.into_iter().collect(),
            altitude_breakpoints,
            above_table_factor: 0.88,
        }
    }
}

impl MagicNumberTable {
    /// Piecewise-linear altitude factor
    ///
    /// Below the first breakpoint the first factor applies; above the last
    /// breakpoint `above_table_factor` applies.
    pub fn altitude_factor(&self, altitude: Meters) -> f64 {
        let alt = *altitude;
        let points = &self.altitude_breakpoints;
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return 1.0;
        };
        if alt <= first.altitude {
            return first.factor;
        }
        if alt > last.altitude {
            return self.above_table_factor;
        }
        for pair in points.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if alt <= hi.altitude {
                let t = (alt - lo.altitude) / (hi.altitude - lo.altitude);
                return lo.factor * (1.0 - t) + hi.factor * t;
            }
        }
        last.factor
    }

    /// Base magic number for a product
    pub fn base_magic_number(&self, product: ProductType) -> Result<f64> {
        self.base
            .get(&product)
            .copied()
            .ok_or_else(|| ConversionError::UnsupportedProductType(product.as_str().to_string()))
    }

    /// Material multiplier (1.0 when the material is missing from the table)
    pub fn material_factor(&self, material: PanMaterial) -> f64 {
        self.materials.get(&material).copied().unwrap_or(1.0)
    }

    /// Magic number after material and altitude modifiers
    pub fn effective_magic_number(
        &self,
        product: ProductType,
        options: MagicNumberOptions,
    ) -> Result<f64> {
        Ok(self.base_magic_number(product)?
            * self.material_factor(options.material)
            * self.altitude_factor(options.altitude))
    }

    /// Dough weight that fills `pan_volume`
    pub fn dough_weight(
        &self,
        pan_volume: CubicCentimeters,
        product: ProductType,
        options: MagicNumberOptions,
    ) -> Result<Grams> {
        let magic = self.effective_magic_number(product, options)?;
        Ok(Grams::new(*pan_volume / magic))
    }

    /// Pan volume needed for `dough` (inverse of [`Self::dough_weight`])
    pub fn required_volume(
        &self,
        dough: Grams,
        product: ProductType,
        options: MagicNumberOptions,
    ) -> Result<CubicCentimeters> {
        let magic = self.effective_magic_number(product, options)?;
        Ok(CubicCentimeters::new(*dough * magic))
    }

    /// Split `total_dough` across pan groups in proportion to their ideal fill
    ///
    /// Running totals are rounded to 0.1 g and capped at `total_dough`, so no
    /// group goes negative; the last group takes the exact remainder and the
    /// allocations always sum to `total_dough`.
    pub fn distribute_to_multiple_pans(
        &self,
        total_dough: Grams,
        pans: &[PanAllocation],
        product: ProductType,
        altitude: Meters,
    ) -> Result<Vec<PanShare>> {
        if pans.is_empty() {
            return Err(ConversionError::EmptyPanList);
        }

        let mut ideals = Vec::with_capacity(pans.len());
        for alloc in pans {
            if alloc.count == 0 {
                return Err(ConversionError::InvalidPanDimension {
                    dimension: "count",
                    value: 0.0,
                });
            }
            let options = MagicNumberOptions {
                material: alloc.material,
                altitude,
            };
            let per_pan = self.dough_weight(volume(&alloc.pan)?, product, options)?;
            ideals.push(*per_pan * f64::from(alloc.count));
        }
        let ideal_total: f64 = ideals.iter().sum();
        let total = *total_dough;

        let mut shares = Vec::with_capacity(pans.len());
        let mut allocated = 0.0;
        let mut cumulative_ideal = 0.0;
        let last = pans.len() - 1;
        for (i, (alloc, ideal)) in pans.iter().zip(&ideals).enumerate() {
            cumulative_ideal += ideal;
            let actual = if i == last {
                (total - allocated).max(0.0)
            } else {
                let running = round_weight(total * cumulative_ideal / ideal_total).min(total);
                (running - allocated).max(0.0)
            };
            allocated += actual;
            shares.push(PanShare {
                pan: alloc.pan.clone(),
                count: alloc.count,
                ideal_amount: *ideal,
                actual_amount: actual,
                per_pan_amount: actual / f64::from(alloc.count),
            });
        }
        debug!(
            total,
            ideal_total,
            groups = shares.len(),
            "distributed dough across pans"
        );
        Ok(shares)
    }
}
