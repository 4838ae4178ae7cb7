//! # Grease Trap Module
//!
//! Grease trap volume and kitchen down-pipe per NBR 8160.
//!
//! Residential kitchens use discrete trap bands:
//!
//! | Kitchens | Trap | Volume |
//! |---|---|---|
//! | 1 | simple | 18 L |
//! | 2 to 12 | double | 31 L |
//! | more than 12 | special | 120 L |
//!
//! Commercial and industrial kitchens use V = 2·N + 20 with N meals per day.

use serde::{Deserialize, Serialize};

use crate::errors::{at_least_one, CalcResult};
use crate::hydraulics::flow::HUNTER_COEFFICIENT;
use crate::project::{BuildingProfile, BuildingType};
use crate::report::{ModuleReport, ReportSection, Warning, WarningCode};

/// Hunter units of one kitchen sink
pub const KITCHEN_SINK_UHC: f64 = 2.0;

/// Minimum DN of a grease down-pipe (mm)
pub const MIN_DOWN_PIPE_DN: u32 = 75;

/// Maximum DN of a grease down-pipe (mm)
pub const MAX_DOWN_PIPE_DN: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallMode {
    /// One trap for every kitchen of the building
    #[default]
    Central,
    /// One trap per dwelling
    PerUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapKind {
    Simple,
    Double,
    Special,
}

impl TrapKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            TrapKind::Simple => "Simple grease trap",
            TrapKind::Double => "Double grease trap",
            TrapKind::Special => "Special grease trap",
        }
    }
}

/// Residential trap band for a number of kitchens.
pub fn residential_trap(kitchens: u32) -> (TrapKind, f64) {
    match kitchens {
        0 | 1 => (TrapKind::Simple, 18.0),
        2..=12 => (TrapKind::Double, 31.0),
        _ => (TrapKind::Special, 120.0),
    }
}

/// Commercial trap volume (L) for N meals per day.
pub fn commercial_trap_volume_l(meals_per_day: u32) -> f64 {
    2.0 * f64::from(meals_per_day) + 20.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreaseConfig {
    pub install_mode: InstallMode,
    pub kitchens_per_unit: u32,
    pub meals_per_day: u32,
    pub stack_count: u32,
}

impl Default for GreaseConfig {
    fn default() -> Self {
        GreaseConfig {
            install_mode: InstallMode::Central,
            kitchens_per_unit: 1,
            meals_per_day: 50,
            stack_count: 1,
        }
    }
}

impl GreaseConfig {
    pub fn validate(&self) -> CalcResult<()> {
        at_least_one("stack_count", self.stack_count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownPipe {
    pub units_per_stack: f64,
    pub flow_lps: f64,
    pub nominal_diameter_mm: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreaseOutcome {
    pub building_type: BuildingType,
    pub install_mode: InstallMode,
    /// Kitchens served by one trap (residential only)
    pub kitchens: u32,
    pub meals_per_day: Option<u32>,
    pub trap: TrapKind,
    pub volume_l: f64,
    pub trap_count: u32,
    pub down_pipe: DownPipe,
    pub warnings: Vec<Warning>,
}

/// Size the grease trap and its down-pipe.
pub fn calculate(config: &GreaseConfig, building: &BuildingProfile) -> CalcResult<GreaseOutcome> {
    config.validate()?;
    let mut warnings = Vec::new();

    let outcome = if building.building_type.is_residential() {
        let dwellings = building.dwelling_units();
        let (kitchens, trap_count) = match config.install_mode {
            InstallMode::Central => (config.kitchens_per_unit * dwellings, 1),
            InstallMode::PerUnit => (config.kitchens_per_unit, dwellings),
        };
        if kitchens == 0 {
            warnings.push(Warning::new(
                WarningCode::DefaultApplied,
                "No kitchens declared; the simple trap is listed",
            ));
        }
        let (trap, volume_l) = residential_trap(kitchens);

        // === Down-pipe ===
        let building_kitchens = config.kitchens_per_unit * dwellings;
        let units = f64::from(building_kitchens) * KITCHEN_SINK_UHC / f64::from(config.stack_count);
        let flow = HUNTER_COEFFICIENT * units.sqrt();
        let band = super::sewage::drain_band(flow).nominal_mm;
        let down_pipe = DownPipe {
            units_per_stack: units,
            flow_lps: flow,
            nominal_diameter_mm: band.clamp(MIN_DOWN_PIPE_DN, MAX_DOWN_PIPE_DN),
        };

        GreaseOutcome {
            building_type: building.building_type,
            install_mode: config.install_mode,
            kitchens,
            meals_per_day: None,
            trap,
            volume_l,
            trap_count,
            down_pipe,
            warnings,
        }
    } else {
        GreaseOutcome {
            building_type: building.building_type,
            install_mode: InstallMode::Central,
            kitchens: 0,
            meals_per_day: Some(config.meals_per_day),
            trap: TrapKind::Special,
            volume_l: commercial_trap_volume_l(config.meals_per_day),
            trap_count: 1,
            down_pipe: DownPipe {
                units_per_stack: 0.0,
                flow_lps: 0.0,
                nominal_diameter_mm: MAX_DOWN_PIPE_DN,
            },
            warnings,
        }
    };

    tracing::debug!(volume_l = outcome.volume_l, trap_count = outcome.trap_count, "grease trap sized");
    Ok(outcome)
}

impl ReportSection for GreaseOutcome {
    fn write_to(&self, report: &mut ModuleReport) {
        report.result("Trap type", self.trap.display_name(), "");
        report.result("Trap volume", self.volume_l, "L");
        report.result("Number of traps", self.trap_count, "units");
        report.result("Down-pipe DN", self.down_pipe.nominal_diameter_mm, "mm");

        match self.meals_per_day {
            Some(meals) => report.step(
                "Commercial grease trap",
                "NBR 8160",
                format!("V = 2 × N + 20 = 2 × {} + 20 = {:.0} L", meals, self.volume_l),
            ),
            None => {
                let mode = match self.install_mode {
                    InstallMode::Central => "central trap for the building",
                    InstallMode::PerUnit => "one trap per dwelling",
                };
                report.step(
                    "Residential grease trap",
                    "NBR 8160",
                    format!(
                        "{} kitchen(s) per trap ({}): {} of {:.0} L",
                        self.kitchens,
                        mode,
                        self.trap.display_name(),
                        self.volume_l
                    ),
                );
                report.step(
                    "Kitchen down-pipe",
                    "NBR 8160",
                    format!(
                        "{:.1} UHC per stack, Q = 0.3 × √{:.1} = {:.2} L/s: DN {} mm (75 to 100)",
                        self.down_pipe.units_per_stack,
                        self.down_pipe.units_per_stack,
                        self.down_pipe.flow_lps,
                        self.down_pipe.nominal_diameter_mm
                    ),
                );
            }
        }

        report.warnings.extend(self.warnings.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::FloorGroup;

    fn apartments(floors: u32, per_floor: u32) -> BuildingProfile {
        BuildingProfile {
            building_type: BuildingType::MultiFamily,
            floors,
            floor_groups: vec![FloorGroup { floors, apartments_per_floor: per_floor }],
            ..BuildingProfile::default()
        }
    }

    #[test]
    fn test_residential_bands() {
        assert_eq!(residential_trap(1), (TrapKind::Simple, 18.0));
        assert_eq!(residential_trap(2), (TrapKind::Double, 31.0));
        assert_eq!(residential_trap(12), (TrapKind::Double, 31.0));
        assert_eq!(residential_trap(13), (TrapKind::Special, 120.0));
    }

    #[test]
    fn test_single_family_house() {
        let outcome = calculate(&GreaseConfig::default(), &BuildingProfile::default()).unwrap();
        assert_eq!(outcome.trap, TrapKind::Simple);
        assert_eq!(outcome.volume_l, 18.0);
        assert_eq!(outcome.down_pipe.nominal_diameter_mm, 75);
    }

    #[test]
    fn test_central_versus_per_unit() {
        let building = apartments(4, 4);
        let central = calculate(&GreaseConfig::default(), &building).unwrap();
        assert_eq!(central.kitchens, 16);
        assert_eq!(central.trap, TrapKind::Special);
        assert_eq!(central.trap_count, 1);

        let per_unit = GreaseConfig {
            install_mode: InstallMode::PerUnit,
            ..GreaseConfig::default()
        };
        let outcome = calculate(&per_unit, &building).unwrap();
        assert_eq!(outcome.trap, TrapKind::Simple);
        assert_eq!(outcome.trap_count, 16);
    }

    #[test]
    fn test_down_pipe_capped_at_100() {
        // 40 kitchens × 2 UHC = 80 UHC → 2.68 L/s, banded DN100
        let outcome = calculate(&GreaseConfig::default(), &apartments(10, 4)).unwrap();
        assert!((outcome.down_pipe.flow_lps - 0.3 * 80f64.sqrt()).abs() < 1e-12);
        assert_eq!(outcome.down_pipe.nominal_diameter_mm, 100);

        let huge = calculate(&GreaseConfig::default(), &apartments(40, 20)).unwrap();
        assert_eq!(huge.down_pipe.nominal_diameter_mm, 100);
    }

    #[test]
    fn test_commercial_kitchen() {
        let building = BuildingProfile {
            building_type: BuildingType::Commercial,
            ..BuildingProfile::default()
        };
        let outcome = calculate(&GreaseConfig::default(), &building).unwrap();
        assert_eq!(outcome.volume_l, 120.0);
        assert_eq!(outcome.meals_per_day, Some(50));
        assert_eq!(outcome.down_pipe.nominal_diameter_mm, 100);
    }

    #[test]
    fn test_zero_kitchens_warns() {
        let config = GreaseConfig {
            kitchens_per_unit: 0,
            ..GreaseConfig::default()
        };
        let outcome = calculate(&config, &BuildingProfile::default()).unwrap();
        assert_eq!(outcome.volume_l, 18.0);
        assert!(outcome.warnings.iter().any(|w| w.code == WarningCode::DefaultApplied));
    }
}
