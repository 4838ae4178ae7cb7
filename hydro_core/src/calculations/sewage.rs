//! # Sanitary Sewage Module
//!
//! Building drainage per NBR 8160, with optional on-site
//! [`treatment`](super::treatment) and a sewage lift station.
//!
//! ## Steps
//!
//! 1. Unit total of one dwelling's fixtures × dwelling units
//! 2. Flow by Hunter (UHC, C = 0.3) or probabilistic (UD, C = 0.14)
//! 3. Soil stack and building collector from flow bands, DN100 floor with a WC
//! 4. Vent column and branch vents
//! 5. Inspection chambers along the collector
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "method": "hunter",
//!   "fixtures": [{ "name": "WC (flush tank)", "quantity": 2 }],
//!   "stack_count": 1,
//!   "vent_column_count": 1,
//!   "collector_length_m": 30.0
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::treatment::{size_treatment, TreatmentConfig, TreatmentOutcome};
use crate::errors::{at_least_one, non_negative, positive, CalcError, CalcResult};
use crate::hydraulics::flow::{sewage_unit_sum, FixtureCount, SewageMethod};
use crate::project::BuildingProfile;
use crate::report::{ModuleReport, ReportSection, Suggestion, Warning, WarningCode};
use crate::tables::catalogs::SEWAGE_PUMPS;

/// Minimum DN of any pipe carrying a water closet (mm)
pub const WATER_CLOSET_MIN_DN: u32 = 100;

/// Maximum spacing between inspection chambers (m)
pub const INSPECTION_SPACING_M: f64 = 25.0;

/// Storeys above which the vent column is DN100
pub const TALL_BUILDING_FLOORS: u32 = 10;

/// Minimum design flow of a lift station (L/s)
pub const LIFT_MIN_FLOW_LPS: f64 = 0.5;

/// Pump cycle time of the wet well (min)
pub const LIFT_CYCLE_MIN: f64 = 5.0;

/// Friction allowance on the discharge line, as a fraction of its length
pub const LIFT_FRICTION_RATIO: f64 = 0.05;

/// Drain diameter and minimum slope for a flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrainBand {
    pub nominal_mm: u32,
    pub min_slope_percent: f64,
}

/// Banded drain diameter for a flow (L/s).
pub fn drain_band(flow_lps: f64) -> DrainBand {
    let (nominal_mm, min_slope_percent) = if flow_lps <= 1.8 {
        (75, 2.0)
    } else if flow_lps <= 6.0 {
        (100, 1.0)
    } else if flow_lps <= 21.0 {
        (150, 0.5)
    } else {
        (200, 0.5)
    };
    DrainBand {
        nominal_mm,
        min_slope_percent,
    }
}

/// Band of a drain that must also carry a WC when `water_closet` is set.
pub fn drain_band_with_floor(flow_lps: f64, water_closet: bool) -> DrainBand {
    let band = drain_band(flow_lps);
    if water_closet && band.nominal_mm < WATER_CLOSET_MIN_DN {
        drain_band(6.0)
    } else {
        band
    }
}

/// Vent column DN from units per column and storeys.
pub fn vent_column_dn(units_per_column: f64, floors: u32) -> u32 {
    if units_per_column > 180.0 || floors > TALL_BUILDING_FLOORS {
        100
    } else if units_per_column > 30.0 {
        75
    } else if units_per_column > 10.0 {
        50
    } else {
        40
    }
}

/// Branch vent DN from the units it serves and its developed length (m).
pub fn branch_vent_dn(units: f64, length_m: f64) -> u32 {
    if units <= 2.0 {
        if length_m <= 2.4 {
            40
        } else {
            50
        }
    } else if units <= 8.0 {
        if length_m <= 4.0 {
            40
        } else {
            50
        }
    } else if units <= 24.0 {
        if length_m <= 18.0 {
            50
        } else {
            75
        }
    } else if units <= 72.0 {
        75
    } else {
        100
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchVent {
    pub description: String,
    pub units: f64,
    pub length_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiftStationConfig {
    pub enabled: bool,
    pub lift_height_m: f64,
    pub discharge_length_m: f64,
}

impl Default for LiftStationConfig {
    fn default() -> Self {
        LiftStationConfig {
            enabled: false,
            lift_height_m: 5.0,
            discharge_length_m: 50.0,
        }
    }
}

/// Sewage module input. Fixtures are those of one dwelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SewageConfig {
    pub method: SewageMethod,
    pub fixtures: Vec<FixtureCount>,
    pub stack_count: u32,
    pub collector_count: u32,
    pub vent_column_count: u32,
    pub branch_vents: Vec<BranchVent>,
    pub collector_length_m: f64,
    pub collector_slope_percent: f64,
    pub bends_45: u32,
    pub bends_90: u32,
    pub lift_station: LiftStationConfig,
    pub treatment: TreatmentConfig,
}

impl Default for SewageConfig {
    fn default() -> Self {
        SewageConfig {
            method: SewageMethod::Hunter,
            fixtures: vec![
                FixtureCount::new("WC (flush tank)", 2),
                FixtureCount::new("Lavatory", 2),
                FixtureCount::new("Shower", 2),
            ],
            stack_count: 1,
            collector_count: 1,
            vent_column_count: 1,
            branch_vents: vec![BranchVent {
                description: "Bathroom branch".to_string(),
                units: 6.0,
                length_m: 2.5,
            }],
            collector_length_m: 30.0,
            collector_slope_percent: 2.0,
            bends_45: 1,
            bends_90: 2,
            lift_station: LiftStationConfig::default(),
            treatment: TreatmentConfig::default(),
        }
    }
}

impl SewageConfig {
    pub fn validate(&self) -> CalcResult<()> {
        at_least_one("stack_count", self.stack_count)?;
        at_least_one("collector_count", self.collector_count)?;
        at_least_one("vent_column_count", self.vent_column_count)?;
        non_negative("collector_length_m", self.collector_length_m)?;
        positive("collector_slope_percent", self.collector_slope_percent)?;
        for (i, vent) in self.branch_vents.iter().enumerate() {
            non_negative("units", vent.units).map_err(|e| e.within(format!("branch_vents[{}]", i)))?;
            non_negative("length_m", vent.length_m).map_err(|e| e.within(format!("branch_vents[{}]", i)))?;
        }
        if self.lift_station.enabled {
            non_negative("lift_height_m", self.lift_station.lift_height_m).map_err(|e| e.within("lift_station"))?;
            non_negative("discharge_length_m", self.lift_station.discharge_length_m)
                .map_err(|e| e.within("lift_station"))?;
        }
        if self.treatment.enabled {
            self.treatment.validate().map_err(|e| e.within("treatment"))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchVentSizing {
    pub description: String,
    pub units: f64,
    pub length_m: f64,
    pub nominal_diameter_mm: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiftStationSizing {
    pub design_flow_lps: f64,
    pub cycle_min: f64,
    pub wet_well_volume_l: f64,
    pub total_head_m: f64,
    pub pump: String,
    pub degraded: bool,
}

/// Sewage module result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SewageOutcome {
    pub method: SewageMethod,
    pub dwelling_units: u32,
    pub units_per_dwelling: f64,
    pub total_units: f64,
    pub has_water_closet: bool,
    pub total_flow_lps: f64,
    pub stack_count: u32,
    pub flow_per_stack_lps: f64,
    pub stack: DrainBand,
    pub collector_count: u32,
    pub flow_per_collector_lps: f64,
    pub collector: DrainBand,
    /// Slope the collector is laid at (%)
    pub collector_slope_percent: f64,
    pub vent_column_count: u32,
    pub units_per_vent_column: f64,
    pub floors: u32,
    pub vent_column_dn: u32,
    pub branch_vents: Vec<BranchVentSizing>,
    pub inspection_chambers: Vec<String>,
    pub lift_station: Option<LiftStationSizing>,
    pub treatment: Option<TreatmentOutcome>,
    pub suggestions: Vec<Suggestion>,
    pub warnings: Vec<Warning>,
}

/// Size the sanitary drainage system.
pub fn calculate(config: &SewageConfig, building: &BuildingProfile) -> CalcResult<SewageOutcome> {
    config.validate()?;
    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    let dwellings = building.dwelling_units();
    let load = sewage_unit_sum(&config.fixtures, config.method);
    warnings.extend(load.units.warnings("sewage fixtures"));
    let total_units = load.units.total * f64::from(dwellings);
    let total_flow = config.method.flow_lps(total_units);
    if total_flow == 0.0 {
        warnings.push(Warning::new(WarningCode::ZeroFlow, "Sewage fixtures contribute no flow"));
    }

    let per_stack = total_flow / f64::from(config.stack_count);
    let stack = drain_band_with_floor(per_stack, load.has_water_closet);
    let per_collector = total_flow / f64::from(config.collector_count);
    let collector = drain_band_with_floor(per_collector, load.has_water_closet);
    if config.collector_slope_percent < collector.min_slope_percent {
        warnings.push(Warning::new(
            WarningCode::InsufficientSlope,
            format!(
                "Collector laid at {}% below the {}% minimum for DN{}",
                config.collector_slope_percent, collector.min_slope_percent, collector.nominal_mm
            ),
        ));
    }

    // === Ventilation ===
    let units_per_vent = total_units / f64::from(config.vent_column_count);
    let flow_per_vent = total_flow / f64::from(config.vent_column_count);
    let storeys = building.storeys();
    let vent_dn = vent_column_dn(units_per_vent, storeys).max(drain_band(flow_per_vent).nominal_mm);
    let branch_vents = config
        .branch_vents
        .iter()
        .map(|v| BranchVentSizing {
            description: v.description.clone(),
            units: v.units,
            length_m: v.length_m,
            nominal_diameter_mm: branch_vent_dn(v.units, v.length_m),
        })
        .collect();

    // === Inspection chambers ===
    let mut chambers = vec!["Start of the building collector".to_string()];
    let along = (config.collector_length_m / INSPECTION_SPACING_M).floor() as u32;
    for i in 1..=along {
        chambers.push(format!(
            "Along the collector at {:.0} m (25 m maximum spacing)",
            f64::from(i) * INSPECTION_SPACING_M
        ));
    }
    if config.bends_45 + config.bends_90 > 0 {
        chambers.push(format!(
            "At the changes of direction ({} × 45°, {} × 90°)",
            config.bends_45, config.bends_90
        ));
    }
    chambers.push("Junction with the public sewer or treatment system".to_string());
    suggestions.extend(
        chambers
            .iter()
            .map(|location| Suggestion::InspectionChamber { location: location.clone() }),
    );

    let lift_station = if config.lift_station.enabled {
        let sizing = size_lift_station(&config.lift_station, total_flow)?;
        if sizing.degraded {
            warnings.push(Warning::new(
                WarningCode::DegradedSelection,
                format!(
                    "No sewage pump covers {:.2} L/s at {:.2} m; largest model {} listed",
                    sizing.design_flow_lps, sizing.total_head_m, sizing.pump
                ),
            ));
        }
        suggestions.push(Suggestion::SewagePump { name: sizing.pump.clone() });
        Some(sizing)
    } else {
        None
    };

    let treatment = if config.treatment.enabled {
        Some(size_treatment(&config.treatment, building.population()).map_err(|e| e.within("treatment"))?)
    } else {
        None
    };

    tracing::debug!(total_units, total_flow_lps = total_flow, stack_dn = stack.nominal_mm, "sewage sized");

    Ok(SewageOutcome {
        method: config.method,
        dwelling_units: dwellings,
        units_per_dwelling: load.units.total,
        total_units,
        has_water_closet: load.has_water_closet,
        total_flow_lps: total_flow,
        stack_count: config.stack_count,
        flow_per_stack_lps: per_stack,
        stack,
        collector_count: config.collector_count,
        flow_per_collector_lps: per_collector,
        collector,
        collector_slope_percent: config.collector_slope_percent,
        vent_column_count: config.vent_column_count,
        units_per_vent_column: units_per_vent,
        floors: storeys,
        vent_column_dn: vent_dn,
        branch_vents,
        inspection_chambers: chambers,
        lift_station,
        treatment,
        suggestions,
        warnings,
    })
}

/// Wet well and pump of a sewage lift station.
pub fn size_lift_station(config: &LiftStationConfig, total_flow_lps: f64) -> CalcResult<LiftStationSizing> {
    let q = total_flow_lps.max(LIFT_MIN_FLOW_LPS);
    // V = Q·T/4 with Q in L/s and T in s
    let volume = q * LIFT_CYCLE_MIN * 60.0 / 4.0;
    let head = config.lift_height_m + config.discharge_length_m * LIFT_FRICTION_RATIO;
    let (pump, degraded) = match SEWAGE_PUMPS.iter().find(|p| p.max_flow_lps > q && p.max_head_m > head) {
        Some(p) => (p, false),
        None => (
            SEWAGE_PUMPS
                .last()
                .ok_or_else(|| CalcError::catalog_entry_not_found("sewage pumps", "any"))?,
            true,
        ),
    };
    Ok(LiftStationSizing {
        design_flow_lps: q,
        cycle_min: LIFT_CYCLE_MIN,
        wet_well_volume_l: volume,
        total_head_m: head,
        pump: pump.name.to_string(),
        degraded,
    })
}

impl ReportSection for SewageOutcome {
    fn write_to(&self, report: &mut ModuleReport) {
        let label = self.method.unit_label();
        report.result(format!("Total {}", label), self.total_units, label);
        report.result("Total sewage flow", self.total_flow_lps, "L/s");
        report.step(
            "Sewage flow",
            "NBR 8160",
            format!(
                "{} {} per dwelling × {} dwelling(s) = {:.2} {}\nQ = {} × √{:.2} = {:.2} L/s",
                self.units_per_dwelling,
                label,
                self.dwelling_units,
                self.total_units,
                label,
                self.method.coefficient(),
                self.total_units,
                self.total_flow_lps
            ),
        );

        report.result(format!("Soil stack DN ({} units)", self.stack_count), self.stack.nominal_mm, "mm");
        report.result(format!("Vent column DN ({} units)", self.vent_column_count), self.vent_column_dn, "mm");
        report.result(
            format!("Building collector DN ({} units)", self.collector_count),
            self.collector.nominal_mm,
            format!("mm (minimum slope {}%)", self.collector.min_slope_percent),
        );
        report.result("Collector slope", self.collector_slope_percent, "%");
        let floor_note = if self.has_water_closet {
            format!("; a water closet is present so DN{} is the minimum", WATER_CLOSET_MIN_DN)
        } else {
            String::new()
        };
        report.step(
            "Soil stack",
            "NBR 8160",
            format!(
                "Flow per stack {:.2} L/s: DN {} mm{}",
                self.flow_per_stack_lps, self.stack.nominal_mm, floor_note
            ),
        );
        report.step(
            "Building collector",
            "NBR 8160",
            format!(
                "{:.2} L/s over {} collector(s) = {:.2} L/s each: DN {} mm at {}% minimum slope{}",
                self.total_flow_lps,
                self.collector_count,
                self.flow_per_collector_lps,
                self.collector.nominal_mm,
                self.collector.min_slope_percent,
                floor_note
            ),
        );
        report.step(
            "Vent column",
            "NBR 8160",
            format!(
                "{:.2} {} per vent column over {} storeys: DN {} mm (never below the equivalent soil stack)",
                self.units_per_vent_column, label, self.floors, self.vent_column_dn
            ),
        );
        for vent in &self.branch_vents {
            report.result(format!("Branch vent '{}'", vent.description), vent.nominal_diameter_mm, "mm");
            report.step(
                format!("Branch vent '{}'", vent.description),
                "NBR 8160",
                format!(
                    "{} UHC over {} m: DN {} mm",
                    vent.units, vent.length_m, vent.nominal_diameter_mm
                ),
            );
        }

        report.result("Inspection chambers", self.inspection_chambers.len() as u32, "units");
        report.step("Inspection chambers", "NBR 8160", self.inspection_chambers.join("\n"));

        if let Some(lift) = &self.lift_station {
            report.result("Wet well useful volume", lift.wet_well_volume_l, "L");
            report.result("Suggested sewage pump", lift.pump.as_str(), "");
            report.step(
                "Sewage lift station",
                "NBR 8160",
                format!(
                    "Q = {:.2} L/s, cycle {} min: V = Q × T / 4 = {:.0} L; TDH ≈ {:.2} mca; pump {}",
                    lift.design_flow_lps, lift.cycle_min, lift.wet_well_volume_l, lift.total_head_m, lift.pump
                ),
            );
        }

        if let Some(treatment) = &self.treatment {
            treatment.write_to(report);
        }

        report.warnings.extend(self.warnings.iter().cloned());
        report.suggestions.extend(self.suggestions.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{BuildingType, FloorGroup};

    #[test]
    fn test_bands() {
        assert_eq!(drain_band(1.8).nominal_mm, 75);
        assert_eq!(drain_band(1.81).nominal_mm, 100);
        assert_eq!(drain_band(21.0).nominal_mm, 150);
        assert_eq!(drain_band(30.0).nominal_mm, 200);
        assert_eq!(drain_band(0.5).min_slope_percent, 2.0);
    }

    #[test]
    fn test_hunter_twenty_units_with_wc() {
        // 20 UHC: Q = 0.3·√20 ≈ 1.342 L/s, banded DN75 but the WC forces DN100
        let config = SewageConfig {
            fixtures: vec![
                FixtureCount::new("WC (flush tank)", 4),
                FixtureCount::new("Shower", 4),
            ],
            ..SewageConfig::default()
        };
        let outcome = calculate(&config, &BuildingProfile::default()).unwrap();
        assert_eq!(outcome.total_units, 20.0);
        assert!((outcome.total_flow_lps - 1.3416).abs() < 1e-4);
        assert_eq!(drain_band(outcome.total_flow_lps).nominal_mm, 75);
        assert_eq!(outcome.stack.nominal_mm, 100);
        assert_eq!(outcome.collector.nominal_mm, 100);
    }

    #[test]
    fn test_no_wc_keeps_banded_diameter() {
        let config = SewageConfig {
            fixtures: vec![FixtureCount::new("Lavatory", 2)],
            ..SewageConfig::default()
        };
        let outcome = calculate(&config, &BuildingProfile::default()).unwrap();
        assert_eq!(outcome.stack.nominal_mm, 75);
        assert_eq!(outcome.collector.min_slope_percent, 2.0);
    }

    #[test]
    fn test_multi_family_multiplies_units() {
        let building = BuildingProfile {
            building_type: BuildingType::MultiFamily,
            floors: 12,
            floor_groups: vec![FloorGroup { floors: 12, apartments_per_floor: 4 }],
            ..BuildingProfile::default()
        };
        let outcome = calculate(&SewageConfig::default(), &building).unwrap();
        // (2×3 + 2×1 + 2×2) × 48
        assert_eq!(outcome.total_units, 576.0);
        assert_eq!(outcome.vent_column_dn, 100);
    }

    #[test]
    fn test_vent_bands() {
        assert_eq!(vent_column_dn(5.0, 2), 40);
        assert_eq!(vent_column_dn(12.0, 2), 50);
        assert_eq!(vent_column_dn(31.0, 2), 75);
        assert_eq!(vent_column_dn(5.0, 11), 100);
        assert_eq!(branch_vent_dn(6.0, 2.5), 40);
        assert_eq!(branch_vent_dn(2.0, 3.0), 50);
        assert_eq!(branch_vent_dn(20.0, 20.0), 75);
        assert_eq!(branch_vent_dn(100.0, 1.0), 100);
    }

    #[test]
    fn test_vent_never_below_equivalent_stack() {
        // 12 UHC → DN50 by units, but 0.3·√12 = 1.04 L/s bands to DN75
        let config = SewageConfig {
            fixtures: vec![FixtureCount::new("Shower", 6)],
            ..SewageConfig::default()
        };
        let outcome = calculate(&config, &BuildingProfile::default()).unwrap();
        assert_eq!(outcome.vent_column_dn, 75);
    }

    #[test]
    fn test_tall_block_vent_counts_floor_groups() {
        // 12 storeys come from the floor groups; `floors` keeps its default of 2
        let building = BuildingProfile {
            building_type: BuildingType::MultiFamily,
            floor_groups: vec![FloorGroup { floors: 12, apartments_per_floor: 1 }],
            ..BuildingProfile::default()
        };
        let config = SewageConfig {
            fixtures: vec![FixtureCount::new("Lavatory", 1)],
            ..SewageConfig::default()
        };
        let outcome = calculate(&config, &building).unwrap();
        assert_eq!(outcome.dwelling_units, 12);
        assert_eq!(outcome.floors, 12);
        assert_eq!(outcome.units_per_vent_column, 12.0);
        // more than 10 storeys forces DN100 whatever the unit load
        assert_eq!(outcome.vent_column_dn, 100);

        let low_rise = BuildingProfile {
            floor_groups: vec![FloorGroup { floors: 4, apartments_per_floor: 3 }],
            ..building
        };
        let outcome = calculate(&config, &low_rise).unwrap();
        assert_eq!(outcome.floors, 4);
        assert_eq!(outcome.vent_column_dn, 75);
    }

    #[test]
    fn test_collector_count_splits_flow() {
        // 20 showers × 2 UHC = 40 UHC: Q = 0.3·√40 ≈ 1.897 L/s
        let single = SewageConfig {
            fixtures: vec![FixtureCount::new("Shower", 20)],
            ..SewageConfig::default()
        };
        let outcome = calculate(&single, &BuildingProfile::default()).unwrap();
        assert_eq!(outcome.collector.nominal_mm, 100);

        let split = SewageConfig {
            collector_count: 2,
            ..single
        };
        let outcome = calculate(&split, &BuildingProfile::default()).unwrap();
        assert!((outcome.flow_per_collector_lps - 0.3 * 40f64.sqrt() / 2.0).abs() < 1e-12);
        assert_eq!(outcome.collector.nominal_mm, 75);
        assert_eq!(outcome.collector.min_slope_percent, 2.0);
    }

    #[test]
    fn test_zero_collectors_rejected() {
        let config = SewageConfig {
            collector_count: 0,
            ..SewageConfig::default()
        };
        let err = calculate(&config, &BuildingProfile::default()).unwrap_err();
        assert!(err.to_string().contains("collector_count"), "{}", err);
    }

    #[test]
    fn test_inspection_chambers() {
        let outcome = calculate(&SewageConfig::default(), &BuildingProfile::default()).unwrap();
        // start + 1 along 30 m + bends + public sewer
        assert_eq!(outcome.inspection_chambers.len(), 4);
        let straight = SewageConfig {
            bends_45: 0,
            bends_90: 0,
            collector_length_m: 10.0,
            ..SewageConfig::default()
        };
        assert_eq!(calculate(&straight, &BuildingProfile::default()).unwrap().inspection_chambers.len(), 2);
    }

    #[test]
    fn test_lift_station() {
        let sizing = size_lift_station(&LiftStationConfig::default(), 0.2).unwrap();
        assert_eq!(sizing.design_flow_lps, 0.5);
        assert!((sizing.wet_well_volume_l - 37.5).abs() < 1e-12);
        assert!((sizing.total_head_m - 7.5).abs() < 1e-12);
        assert_eq!(sizing.pump, "Schneider BCS-250 (1 CV)");
        assert!(!sizing.degraded);

        let tall = LiftStationConfig {
            lift_height_m: 30.0,
            ..LiftStationConfig::default()
        };
        let sizing = size_lift_station(&tall, 1.0).unwrap();
        assert!(sizing.degraded);
        assert_eq!(sizing.pump, "Thebe THES-16 (2 CV)");
    }

    #[test]
    fn test_probabilistic_method() {
        let config = SewageConfig {
            method: SewageMethod::Probabilistic,
            ..SewageConfig::default()
        };
        let outcome = calculate(&config, &BuildingProfile::default()).unwrap();
        // 2×1.3 + 2×0.3 + 2×0.4 = 4.0 UD
        assert!((outcome.total_units - 4.0).abs() < 1e-12);
        assert!((outcome.total_flow_lps - 0.28).abs() < 1e-12);
    }

    #[test]
    fn test_unmapped_fixture_warns() {
        let config = SewageConfig {
            fixtures: vec![FixtureCount::new("Jacuzzi", 1)],
            ..SewageConfig::default()
        };
        let outcome = calculate(&config, &BuildingProfile::default()).unwrap();
        assert_eq!(outcome.total_flow_lps, 0.0);
        assert!(outcome.warnings.iter().any(|w| w.code == WarningCode::UnmappedFixture));
        assert!(outcome.warnings.iter().any(|w| w.code == WarningCode::ZeroFlow));
    }

    #[test]
    fn test_flat_collector_warns() {
        // default fixtures carry a WC, so the collector is DN100 at 1% minimum
        let config = SewageConfig {
            collector_slope_percent: 0.5,
            ..SewageConfig::default()
        };
        let outcome = calculate(&config, &BuildingProfile::default()).unwrap();
        assert_eq!(outcome.collector.min_slope_percent, 1.0);
        assert!(outcome.warnings.iter().any(|w| w.code == WarningCode::InsufficientSlope));
    }

    #[test]
    fn test_zero_stacks_rejected() {
        let config = SewageConfig {
            stack_count: 0,
            ..SewageConfig::default()
        };
        assert!(calculate(&config, &BuildingProfile::default()).is_err());
    }
}
