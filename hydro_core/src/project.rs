//! # Project Configuration
//!
//! `ProjectConfiguration` is the single input of the engine. It serializes to
//! human-readable JSON; every section has a `Default` describing a typical
//! residential project, so partial documents load.
//!
//! ## Structure
//!
//! ```text
//! ProjectConfiguration
//! ├── meta: ProjectMetadata (names, schema version, revisions)
//! ├── building: BuildingProfile (type, population, demand)
//! ├── enabled_modules: Vec<ModuleKind>
//! ├── cold_water / hot_water / sewage / grease / rainwater / reuse / gas / waste_room
//! └── pump_catalog / heater_catalog (user-extensible catalogs)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use hydro_core::project::ProjectConfiguration;
//!
//! let config = ProjectConfiguration::new("Residencial Aurora", "Jane Engineer");
//! let json = serde_json::to_string_pretty(&config).unwrap();
//! let roundtrip: ProjectConfiguration = serde_json::from_str(&json).unwrap();
//! assert_eq!(roundtrip.meta.name, "Residencial Aurora");
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculations::cold_water::ColdWaterConfig;
use crate::calculations::gas::GasConfig;
use crate::calculations::grease::GreaseConfig;
use crate::calculations::hot_water::HotWaterConfig;
use crate::calculations::rainwater::RainwaterConfig;
use crate::calculations::reuse::ReuseConfig;
use crate::calculations::sewage::SewageConfig;
use crate::calculations::waste_room::WasteRoomConfig;
use crate::calculations::ModuleKind;
use crate::errors::{non_negative, CalcError, CalcResult};
use crate::tables::catalogs::{default_pump_catalog, PumpModel, WaterHeater};

/// Current schema version of project documents
pub const SCHEMA_VERSION: &str = "0.1.0";

// ============================================================================
// Metadata
// ============================================================================

/// Descriptive data carried with the project. Never influences results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub name: String,
    pub location: String,
    pub owner: String,
    /// Responsible engineer
    pub engineer: String,
    /// Professional registration of the engineer
    pub registration: String,
    pub revisions: Vec<Revision>,
}

impl Default for ProjectMetadata {
    fn default() -> Self {
        ProjectMetadata {
            version: SCHEMA_VERSION.to_string(),
            name: String::new(),
            location: String::new(),
            owner: String::new(),
            engineer: String::new(),
            registration: String::new(),
            revisions: Vec::new(),
        }
    }
}

/// Entry of the revision table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub label: String,
    pub date: NaiveDate,
    pub description: String,
}

// ============================================================================
// Building profile
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    #[default]
    SingleFamily,
    MultiFamily,
    Commercial,
    Industrial,
}

impl BuildingType {
    pub fn display_name(&self) -> &'static str {
        match self {
            BuildingType::SingleFamily => "Single-family residence",
            BuildingType::MultiFamily => "Multi-family residential building",
            BuildingType::Commercial => "Commercial building",
            BuildingType::Industrial => "Industrial building",
        }
    }

    pub fn is_residential(&self) -> bool {
        matches!(self, BuildingType::SingleFamily | BuildingType::MultiFamily)
    }
}

/// Run of identical storeys in a multi-family building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorGroup {
    pub floors: u32,
    pub apartments_per_floor: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionMethod {
    /// population × L/person·day
    #[default]
    PerCapita,
    /// total area × L/m²·day
    ByArea,
}

/// How the daily water demand is estimated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandSettings {
    pub method: ConsumptionMethod,
    /// L/person·day
    pub per_capita_lpd: f64,
    /// L/m²·day
    pub per_area_lpm2d: f64,
    pub reserve_days: f64,
}

impl Default for DemandSettings {
    fn default() -> Self {
        DemandSettings {
            method: ConsumptionMethod::PerCapita,
            per_capita_lpd: 150.0,
            per_area_lpm2d: 5.0,
            reserve_days: 2.0,
        }
    }
}

/// Building description shared by every module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingProfile {
    pub building_type: BuildingType,
    /// Number of storeys (multi-family blocks count their floor groups instead)
    pub floors: u32,
    /// Occupants of a single-family, commercial or industrial building
    pub persons: u32,
    /// Multi-family only
    pub floor_groups: Vec<FloorGroup>,
    /// Multi-family only
    pub persons_per_apartment: u32,
    pub total_area_m2: f64,
    pub demand: DemandSettings,
}

impl Default for BuildingProfile {
    fn default() -> Self {
        BuildingProfile {
            building_type: BuildingType::SingleFamily,
            floors: 2,
            persons: 4,
            floor_groups: vec![FloorGroup {
                floors: 10,
                apartments_per_floor: 4,
            }],
            persons_per_apartment: 3,
            total_area_m2: 250.0,
            demand: DemandSettings::default(),
        }
    }
}

impl BuildingProfile {
    pub fn validate(&self) -> CalcResult<()> {
        non_negative("total_area_m2", self.total_area_m2)?;
        non_negative("per_capita_lpd", self.demand.per_capita_lpd).map_err(|e| e.within("demand"))?;
        non_negative("per_area_lpm2d", self.demand.per_area_lpm2d).map_err(|e| e.within("demand"))?;
        non_negative("reserve_days", self.demand.reserve_days).map_err(|e| e.within("demand"))?;
        if self.building_type == BuildingType::MultiFamily && self.floor_groups.is_empty() {
            return Err(CalcError::invalid_input(
                "floor_groups",
                "[]",
                "A multi-family building needs at least one floor group",
            ));
        }
        Ok(())
    }

    /// Number of dwelling units: the apartments of a multi-family building, else one.
    pub fn dwelling_units(&self) -> u32 {
        match self.building_type {
            BuildingType::MultiFamily => self.floor_groups.iter().map(|g| g.floors * g.apartments_per_floor).sum(),
            _ => 1,
        }
    }

    /// Storeys of the building: the summed floor groups of a multi-family block, else `floors`.
    pub fn storeys(&self) -> u32 {
        match self.building_type {
            BuildingType::MultiFamily => self.floor_groups.iter().map(|g| g.floors).sum(),
            _ => self.floors,
        }
    }

    /// Design population of the whole building.
    pub fn population(&self) -> u32 {
        match self.building_type {
            BuildingType::MultiFamily => self.dwelling_units() * self.persons_per_apartment,
            _ => self.persons,
        }
    }

    /// Occupants of one dwelling unit.
    pub fn persons_per_dwelling(&self) -> u32 {
        match self.building_type {
            BuildingType::MultiFamily => self.persons_per_apartment,
            _ => self.persons,
        }
    }

    /// Daily water demand (L).
    pub fn daily_demand_l(&self) -> f64 {
        match self.demand.method {
            ConsumptionMethod::PerCapita => f64::from(self.population()) * self.demand.per_capita_lpd,
            ConsumptionMethod::ByArea => self.total_area_m2 * self.demand.per_area_lpm2d,
        }
    }
}

// ============================================================================
// Root configuration
// ============================================================================

/// Everything the engine needs to size a building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfiguration {
    pub meta: ProjectMetadata,
    pub building: BuildingProfile,
    /// Modules to compute; reported in canonical order regardless of this order
    pub enabled_modules: Vec<ModuleKind>,
    pub cold_water: ColdWaterConfig,
    pub hot_water: HotWaterConfig,
    pub sewage: SewageConfig,
    pub grease: GreaseConfig,
    pub rainwater: RainwaterConfig,
    pub reuse: ReuseConfig,
    pub gas: GasConfig,
    pub waste_room: WasteRoomConfig,
    pub pump_catalog: Vec<PumpModel>,
    pub heater_catalog: Vec<WaterHeater>,
}

impl Default for ProjectConfiguration {
    fn default() -> Self {
        ProjectConfiguration {
            meta: ProjectMetadata::default(),
            building: BuildingProfile::default(),
            enabled_modules: ModuleKind::ALL.to_vec(),
            cold_water: ColdWaterConfig::default(),
            hot_water: HotWaterConfig::default(),
            sewage: SewageConfig::default(),
            grease: GreaseConfig::default(),
            rainwater: RainwaterConfig::default(),
            reuse: ReuseConfig::default(),
            gas: GasConfig::default(),
            waste_room: WasteRoomConfig::default(),
            pump_catalog: default_pump_catalog(),
            heater_catalog: Vec::new(),
        }
    }
}

impl ProjectConfiguration {
    /// Default configuration with a project name and engineer.
    pub fn new(name: impl Into<String>, engineer: impl Into<String>) -> Self {
        let mut config = ProjectConfiguration::default();
        config.meta.name = name.into();
        config.meta.engineer = engineer.into();
        config
    }

    pub fn is_enabled(&self, kind: ModuleKind) -> bool {
        self.enabled_modules.contains(&kind)
    }

    /// Parse a JSON project document.
    pub fn from_json(json: &str) -> CalcResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> CalcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_population() {
        let building = BuildingProfile::default();
        assert_eq!(building.population(), 4);
        assert_eq!(building.dwelling_units(), 1);
        assert_eq!(building.daily_demand_l(), 600.0);
    }

    #[test]
    fn test_multi_family_population() {
        let building = BuildingProfile {
            building_type: BuildingType::MultiFamily,
            floor_groups: vec![
                FloorGroup { floors: 10, apartments_per_floor: 4 },
                FloorGroup { floors: 2, apartments_per_floor: 2 },
            ],
            persons_per_apartment: 3,
            ..BuildingProfile::default()
        };
        assert_eq!(building.dwelling_units(), 44);
        assert_eq!(building.population(), 132);
        assert_eq!(building.persons_per_dwelling(), 3);
    }

    #[test]
    fn test_storeys_follow_building_type() {
        let house = BuildingProfile::default();
        assert_eq!(house.storeys(), 2);

        let block = BuildingProfile {
            building_type: BuildingType::MultiFamily,
            floor_groups: vec![
                FloorGroup { floors: 10, apartments_per_floor: 4 },
                FloorGroup { floors: 2, apartments_per_floor: 2 },
            ],
            ..BuildingProfile::default()
        };
        assert_eq!(block.storeys(), 12);
    }

    #[test]
    fn test_demand_by_area() {
        let mut building = BuildingProfile::default();
        building.demand.method = ConsumptionMethod::ByArea;
        assert_eq!(building.daily_demand_l(), 1250.0);
    }

    #[test]
    fn test_multi_family_without_groups_is_invalid() {
        let building = BuildingProfile {
            building_type: BuildingType::MultiFamily,
            floor_groups: Vec::new(),
            ..BuildingProfile::default()
        };
        assert!(building.validate().is_err());
    }

    #[test]
    fn test_partial_document_loads() {
        let json = r#"{ "building": { "persons": 6 }, "enabled_modules": ["cold_water"] }"#;
        let config = ProjectConfiguration::from_json(json).unwrap();
        assert_eq!(config.building.persons, 6);
        assert_eq!(config.building.floors, 2);
        assert!(config.is_enabled(ModuleKind::ColdWater));
        assert!(!config.is_enabled(ModuleKind::FuelGas));
        assert_eq!(config.pump_catalog.len(), 4);
    }

    #[test]
    fn test_revision_dates_serialize_as_iso() {
        let mut config = ProjectConfiguration::new("Aurora", "Jane Engineer");
        config.meta.revisions.push(Revision {
            label: "R00".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            description: "First issue".to_string(),
        });
        let json = config.to_json().unwrap();
        assert!(json.contains("2025-03-14"));
        let roundtrip = ProjectConfiguration::from_json(&json).unwrap();
        assert_eq!(roundtrip.meta, config.meta);
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let err = ProjectConfiguration::from_json("{ not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
