//! Injectable lookup data
//!
//! Every constant table the engine consults, gathered in one serde value.
//! Callers load a tuned copy (from JSON, say) once and hand it to
//! [`crate::ConversionEngine::new`]; `Default` carries the built-in values.

use crate::bakeware::MagicNumberTable;
use crate::ddt::DdtTable;
use crate::environment::EnvironmentTable;
use crate::measure::DensityTable;
use crate::method::MethodRatioTable;
use serde::{Deserialize, Serialize};

/// Version of the built-in tables
pub const TABLES_VERSION: u32 = 1;

fn default_version() -> u32 {
    TABLES_VERSION
}

/// All lookup tables, versioned
///
/// Missing sections fall back to their defaults when deserializing, so a
/// tuning file only needs the sections it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionTables {
    #[serde(default = "default_version")]
    pub version: u32,
    pub densities: DensityTable,
    pub magic_numbers: MagicNumberTable,
    pub methods: MethodRatioTable,
    pub ddt: DdtTable,
    pub environment: EnvironmentTable,
}

impl Default for ConversionTables {
    fn default() -> Self {
        ConversionTables {
            version: TABLES_VERSION,
            densities: DensityTable::default(),
            magic_numbers: MagicNumberTable::default(),
            methods: MethodRatioTable::default(),
            ddt: DdtTable::default(),
            environment: EnvironmentTable::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let json = r#"{
            "version": 2,
            "environment": {
                "referenceTemp": 24.0, "warmLeaveningBase": 0.975, "coolLeaveningBase": 1.05,
                "tempStep": 2.0, "fermentationQ10": 2.0,
                "dryHumidity": 40.0, "humidHumidity": 70.0,
                "dryFlourFactor": 1.02, "dryLiquidFactor": 0.98,
                "humidFlourFactor": 0.98, "humidLiquidFactor": 1.02,
                "ovenBumpAltitude": 1000.0, "ovenBump": 10.0, "bakingTimeFactor": 1.1,
                "coldRoom": 18.0, "hotRoom": 30.0, "lowHumidity": 30.0,
                "highHumidity": 80.0, "highAltitude": 900.0
            }
        }"#;
        let tables: ConversionTables = serde_json::from_str(json).unwrap();
        assert_eq!(tables.version, 2);
        assert_eq!(tables.environment.reference_temp, 24.0);
        assert_eq!(tables.methods, MethodRatioTable::default());
        assert_eq!(tables.magic_numbers, MagicNumberTable::default());
    }

    #[test]
    fn test_default_tables_survive_json() {
        let tables = ConversionTables::default();
        let json = serde_json::to_string(&tables).unwrap();
        let back: ConversionTables = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tables);
    }
}
