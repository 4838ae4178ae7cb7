//! # Sizing Modules
//!
//! One sizer per building system. Each follows the pattern:
//!
//! - `*Config` - Input parameters (JSON-serializable, every field defaulted)
//! - `*Outcome` - Typed results with warnings and suggestions
//! - `calculate(config, ...) -> CalcResult<*Outcome>` - Pure calculation function
//!
//! Outcomes implement [`ReportSection`], which writes the labelled results and
//! the derivation narrative into a [`ModuleReport`].
//!
//! ## Available Modules
//!
//! - [`cold_water`] - Reservoirs, pumping, PRV, water meter, building feed, paths
//! - [`hot_water`] - Heating, hot-water paths, recirculation, expansion vessel
//! - [`sewage`] - Stacks, collector, vents, chambers, lift station, [`treatment`]
//! - [`grease`] - Grease trap and kitchen down-pipe
//! - [`rainwater`] - Conductors, gutter, collectors, retention
//! - [`reuse`] - Rainwater harvest, reservoir and payback
//! - [`gas`] - Gas network (Pole) and cylinder shelter
//! - [`waste_room`] - Waste storage room
//!
//! Shared sizers: [`tank`] and [`pump`].

pub mod cold_water;
pub mod gas;
pub mod grease;
pub mod hot_water;
pub mod pump;
pub mod rainwater;
pub mod reuse;
pub mod sewage;
pub mod tank;
pub mod treatment;
pub mod waste_room;

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::project::ProjectConfiguration;
use crate::report::{ModuleReport, ProjectReport, ReportSection};

// Re-export commonly used types
pub use cold_water::{ColdWaterConfig, ColdWaterOutcome};
pub use gas::{GasConfig, GasOutcome};
pub use grease::{GreaseConfig, GreaseOutcome};
pub use hot_water::{HotWaterConfig, HotWaterOutcome};
pub use rainwater::{RainwaterConfig, RainwaterOutcome};
pub use reuse::{ReuseConfig, ReuseOutcome};
pub use sewage::{SewageConfig, SewageOutcome};
pub use waste_room::{WasteRoomConfig, WasteRoomOutcome};

/// The building systems the engine can size, in canonical report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    ColdWater,
    HotWater,
    Sewage,
    GreaseTrap,
    Rainwater,
    RainwaterReuse,
    FuelGas,
    WasteRoom,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 8] = [
        ModuleKind::ColdWater,
        ModuleKind::HotWater,
        ModuleKind::Sewage,
        ModuleKind::GreaseTrap,
        ModuleKind::Rainwater,
        ModuleKind::RainwaterReuse,
        ModuleKind::FuelGas,
        ModuleKind::WasteRoom,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ModuleKind::ColdWater => "Cold Water",
            ModuleKind::HotWater => "Hot Water",
            ModuleKind::Sewage => "Sanitary Sewage",
            ModuleKind::GreaseTrap => "Grease Trap",
            ModuleKind::Rainwater => "Rainwater Drainage",
            ModuleKind::RainwaterReuse => "Rainwater Reuse",
            ModuleKind::FuelGas => "Fuel Gas",
            ModuleKind::WasteRoom => "Waste Room",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ModuleKind::ColdWater => "Reservoirs, pumping, water meter and distribution network",
            ModuleKind::HotWater => "Water heating, hot-water network and recirculation",
            ModuleKind::Sewage => "Soil stacks, collectors, ventilation and on-site treatment",
            ModuleKind::GreaseTrap => "Kitchen grease trap and down-pipe",
            ModuleKind::Rainwater => "Roof conductors, gutters and collectors",
            ModuleKind::RainwaterReuse => "Rainwater harvesting reservoir and feasibility",
            ModuleKind::FuelGas => "Gas distribution network and cylinder shelter",
            ModuleKind::WasteRoom => "Solid waste storage room and containers",
        }
    }

    /// Standards cited by the module, as (code, title)
    pub fn standards(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            ModuleKind::ColdWater => &[
                ("NBR 5626", "Building cold water systems - Design, installation and maintenance"),
                ("NBR 12218", "Design of public water distribution networks"),
            ],
            ModuleKind::HotWater => &[
                ("NBR 5626", "Building hot and cold water systems"),
                ("NBR 7198", "Design and installation of building hot water systems"),
            ],
            ModuleKind::Sewage => &[
                ("NBR 8160", "Building sanitary sewage systems - Design and installation"),
                ("NBR 7229", "Design, construction and operation of septic tanks"),
                ("NBR 13969", "Septic tanks - Complementary treatment and effluent disposal"),
            ],
            ModuleKind::GreaseTrap => &[("NBR 8160", "Building sanitary sewage systems - Grease traps")],
            ModuleKind::Rainwater => &[("NBR 10844", "Building rainwater drainage systems")],
            ModuleKind::RainwaterReuse => &[("NBR 15527", "Use of rainwater for non-potable purposes")],
            ModuleKind::FuelGas => &[("NBR 15526", "Gas distribution networks for residential and commercial use")],
            ModuleKind::WasteRoom => &[
                ("NBR 13463", "Solid waste collection"),
                ("NBR 12235", "Storage of solid waste"),
            ],
        }
    }
}

/// Typed outcome of a module, stored in its report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModuleDetail {
    ColdWater(ColdWaterOutcome),
    HotWater(HotWaterOutcome),
    Sewage(SewageOutcome),
    GreaseTrap(GreaseOutcome),
    Rainwater(RainwaterOutcome),
    RainwaterReuse(ReuseOutcome),
    FuelGas(GasOutcome),
    WasteRoom(WasteRoomOutcome),
}

fn report_for<T: ReportSection + Clone>(kind: ModuleKind, outcome: T, wrap: fn(T) -> ModuleDetail) -> ModuleReport {
    let mut report = ModuleReport::new(kind, wrap(outcome.clone()));
    outcome.write_to(&mut report);
    report
}

/// Size one module of a project.
///
/// # Errors
///
/// Validation errors carry the dotted path of the offending field, prefixed
/// with the module's configuration key (e.g. `sewage.stack_count`).
pub fn calculate_module(kind: ModuleKind, config: &ProjectConfiguration) -> CalcResult<ModuleReport> {
    tracing::debug!(module = kind.display_name(), "calculating module");
    let building = &config.building;
    building.validate().map_err(|e| e.within("building"))?;

    let report = match kind {
        ModuleKind::ColdWater => report_for(
            kind,
            cold_water::calculate(&config.cold_water, building, &config.pump_catalog).map_err(|e| e.within("cold_water"))?,
            ModuleDetail::ColdWater,
        ),
        ModuleKind::HotWater => report_for(
            kind,
            hot_water::calculate(&config.hot_water, building, &config.heater_catalog).map_err(|e| e.within("hot_water"))?,
            ModuleDetail::HotWater,
        ),
        ModuleKind::Sewage => report_for(
            kind,
            sewage::calculate(&config.sewage, building).map_err(|e| e.within("sewage"))?,
            ModuleDetail::Sewage,
        ),
        ModuleKind::GreaseTrap => report_for(
            kind,
            grease::calculate(&config.grease, building).map_err(|e| e.within("grease"))?,
            ModuleDetail::GreaseTrap,
        ),
        ModuleKind::Rainwater => report_for(
            kind,
            rainwater::calculate(&config.rainwater).map_err(|e| e.within("rainwater"))?,
            ModuleDetail::Rainwater,
        ),
        ModuleKind::RainwaterReuse => report_for(
            kind,
            reuse::calculate(&config.reuse, building).map_err(|e| e.within("reuse"))?,
            ModuleDetail::RainwaterReuse,
        ),
        ModuleKind::FuelGas => report_for(
            kind,
            gas::calculate(&config.gas).map_err(|e| e.within("gas"))?,
            ModuleDetail::FuelGas,
        ),
        ModuleKind::WasteRoom => report_for(
            kind,
            waste_room::calculate(&config.waste_room, building).map_err(|e| e.within("waste_room"))?,
            ModuleDetail::WasteRoom,
        ),
    };

    if !report.warnings.is_empty() {
        tracing::info!(module = kind.display_name(), warnings = report.warnings.len(), "module finished with warnings");
    }
    Ok(report)
}

/// Size every enabled module, in canonical order.
pub fn calculate_project(config: &ProjectConfiguration) -> CalcResult<ProjectReport> {
    let modules = ModuleKind::ALL
        .iter()
        .filter(|kind| config.is_enabled(**kind))
        .map(|kind| calculate_module(*kind, config))
        .collect::<CalcResult<Vec<_>>>()?;
    Ok(ProjectReport { modules })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_kind_json() {
        assert_eq!(serde_json::to_string(&ModuleKind::RainwaterReuse).unwrap(), "\"rainwater_reuse\"");
        let kind: ModuleKind = serde_json::from_str("\"fuel_gas\"").unwrap();
        assert_eq!(kind, ModuleKind::FuelGas);
    }

    #[test]
    fn test_every_module_cites_a_standard() {
        for kind in ModuleKind::ALL {
            assert!(!kind.standards().is_empty(), "{:?}", kind);
            assert!(!kind.description().is_empty());
        }
    }

    #[test]
    fn test_default_project_runs_every_module() {
        let config = ProjectConfiguration::new("House", "J. Engineer");
        let report = calculate_project(&config).unwrap();
        assert_eq!(report.modules.len(), 8);
        let kinds: Vec<ModuleKind> = report.modules.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, ModuleKind::ALL.to_vec());
        for module in &report.modules {
            assert!(!module.results.is_empty(), "{} has no results", module.name);
            assert!(!module.steps.is_empty(), "{} has no steps", module.name);
        }
    }

    #[test]
    fn test_disabled_modules_are_skipped() {
        let mut config = ProjectConfiguration::default();
        config.enabled_modules = vec![ModuleKind::Sewage, ModuleKind::ColdWater];
        let report = calculate_project(&config).unwrap();
        // canonical order regardless of the configured order
        assert_eq!(report.modules[0].kind, ModuleKind::ColdWater);
        assert_eq!(report.modules[1].kind, ModuleKind::Sewage);
        assert!(report.module(ModuleKind::FuelGas).is_none());
    }

    #[test]
    fn test_errors_carry_module_prefix() {
        let mut config = ProjectConfiguration::default();
        config.sewage.stack_count = 0;
        let err = calculate_module(ModuleKind::Sewage, &config).unwrap_err();
        assert!(err.to_string().contains("sewage.stack_count"), "{}", err);
    }

    #[test]
    fn test_recalculation_is_deterministic() {
        let config = ProjectConfiguration::default();
        let a = serde_json::to_string(&calculate_project(&config).unwrap()).unwrap();
        let b = serde_json::to_string(&calculate_project(&config).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_report_detail_exposes_paths() {
        let config = ProjectConfiguration::default();
        let cold = calculate_module(ModuleKind::ColdWater, &config).unwrap();
        assert!(!cold.paths().is_empty());
        assert!(cold.gas_paths().is_empty());
        let gas = calculate_module(ModuleKind::FuelGas, &config).unwrap();
        assert_eq!(gas.gas_paths().len(), 1);
    }
}
