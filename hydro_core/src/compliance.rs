//! # Compliance Checklist
//!
//! Re-queries a [`ProjectReport`] against normative yes/no predicates. Items of
//! modules that were not calculated are reported as not applicable.
//!
//! | Id | Standard | Predicate |
//! |---|---|---|
//! | `af-velocity` | NBR 5626 | every cold-water segment at or below 3.0 m/s |
//! | `af-pressure` | NBR 5626 | every terminal minimum pressure met |
//! | `af-static` | NBR 5626 | static head within 40 mca, or a PRV enabled |
//! | `af-reserve` | NBR 5626 | installed tanks hold the total reserve |
//! | `es-wc-diameter` | NBR 8160 | with a WC, stack and collector at least DN100 |
//! | `es-slope` | NBR 8160 | collector laid at its minimum slope or steeper |
//! | `gas-loss` | NBR 15526 | every gas path below 10% of the outlet pressure |

use serde::{Deserialize, Serialize};

use crate::calculations::sewage::WATER_CLOSET_MIN_DN;
use crate::calculations::{ColdWaterOutcome, GasOutcome, ModuleDetail, ModuleKind, SewageOutcome};
use crate::hydraulics::path::MAX_VELOCITY_MPS;
use crate::report::ProjectReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Met,
    Pending,
    NotApplicable,
}

impl ComplianceStatus {
    fn from_check(met: bool) -> Self {
        if met {
            ComplianceStatus::Met
        } else {
            ComplianceStatus::Pending
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComplianceStatus::Met => "Met",
            ComplianceStatus::Pending => "Pending",
            ComplianceStatus::NotApplicable => "N/A",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub standard: String,
    pub description: String,
    pub status: ComplianceStatus,
    pub justification: String,
}

impl ChecklistItem {
    fn new(id: &str, standard: &str, description: &str, outcome: Option<(bool, String)>) -> Self {
        let (status, justification) = match outcome {
            Some((met, why)) => (ComplianceStatus::from_check(met), why),
            None => (ComplianceStatus::NotApplicable, "Module not calculated".to_string()),
        };
        ChecklistItem {
            id: id.to_string(),
            standard: standard.to_string(),
            description: description.to_string(),
            status,
            justification,
        }
    }
}

fn cold_water(report: &ProjectReport) -> Option<&ColdWaterOutcome> {
    match &report.module(ModuleKind::ColdWater)?.detail {
        ModuleDetail::ColdWater(o) => Some(o),
        _ => None,
    }
}

fn sewage(report: &ProjectReport) -> Option<&SewageOutcome> {
    match &report.module(ModuleKind::Sewage)?.detail {
        ModuleDetail::Sewage(o) => Some(o),
        _ => None,
    }
}

fn gas(report: &ProjectReport) -> Option<&GasOutcome> {
    match &report.module(ModuleKind::FuelGas)?.detail {
        ModuleDetail::FuelGas(o) => Some(o),
        _ => None,
    }
}

/// Evaluate every checklist item against a calculated project.
pub fn evaluate(report: &ProjectReport) -> Vec<ChecklistItem> {
    let cold = cold_water(report);
    let sew = sewage(report);

    let velocity = cold.map(|o| {
        let max = o
            .paths
            .iter()
            .map(|p| p.max_velocity_mps())
            .fold(0.0, f64::max);
        (max <= MAX_VELOCITY_MPS, format!("Highest velocity {:.2} m/s", max))
    });

    let pressure = cold.map(|o| {
        let failing: Vec<String> = o
            .paths
            .iter()
            .flat_map(|p| {
                p.segments
                    .iter()
                    .filter(|s| !s.minimum_pressure_met)
                    .map(move |s| format!("{} / segment {}", p.name, s.id))
            })
            .collect();
        if failing.is_empty() {
            (true, "All terminal points reach their minimum pressure".to_string())
        } else {
            (false, format!("Below minimum: {}", failing.join(", ")))
        }
    });

    let static_head = cold.map(|o| {
        let s = &o.static_pressure;
        let why = if s.prv_enabled {
            format!("{:.1} mca static head, PRV enabled", s.static_head_mca)
        } else {
            format!("{:.1} mca static head", s.static_head_mca)
        };
        (!s.exceeds_limit || s.prv_enabled, why)
    });

    let reserve = cold.map(|o| {
        let installed = o.reservoirs.installed_capacity_l();
        let total = o.reservoirs.total_reserve_l;
        (
            installed >= total,
            format!("Installed {:.0} L for a {:.0} L reserve", installed, total),
        )
    });

    let wc_diameter = sew.map(|o| {
        if o.has_water_closet {
            let dn = o.stack.nominal_mm.min(o.collector.nominal_mm);
            (
                dn >= WATER_CLOSET_MIN_DN,
                format!("Stack DN{}, collector DN{}", o.stack.nominal_mm, o.collector.nominal_mm),
            )
        } else {
            (true, "No water closet on the system".to_string())
        }
    });

    let slope = sew.map(|o| {
        (
            o.collector_slope_percent >= o.collector.min_slope_percent,
            format!(
                "Laid at {}%, minimum {}% for DN{}",
                o.collector_slope_percent, o.collector.min_slope_percent, o.collector.nominal_mm
            ),
        )
    });

    let gas_loss = gas(report).map(|o| {
        let worst = o
            .paths
            .iter()
            .map(|p| p.total_drop_mmh2o)
            .fold(0.0, f64::max);
        (
            o.paths.iter().all(|p| p.within_allowance()),
            format!(
                "Largest drop {:.2} mmH₂O of {:.1} mmH₂O outlet pressure",
                worst, o.outlet_pressure_mmh2o
            ),
        )
    });

    vec![
        ChecklistItem::new("af-velocity", "NBR 5626", "Maximum water velocity of 3.0 m/s", velocity),
        ChecklistItem::new("af-pressure", "NBR 5626", "Minimum dynamic pressure at every point of use", pressure),
        ChecklistItem::new("af-static", "NBR 5626", "Static pressure within 40 mca (or PRV installed)", static_head),
        ChecklistItem::new("af-reserve", "NBR 5626", "Storage meets the reserve volume", reserve),
        ChecklistItem::new("es-wc-diameter", "NBR 8160", "DN100 minimum for drains carrying a water closet", wc_diameter),
        ChecklistItem::new("es-slope", "NBR 8160", "Minimum slope of the building collector", slope),
        ChecklistItem::new("gas-loss", "NBR 15526", "Gas network pressure drop below 10% of outlet pressure", gas_loss),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::calculate_project;
    use crate::project::ProjectConfiguration;

    fn status(items: &[ChecklistItem], id: &str) -> ComplianceStatus {
        items
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.status)
            .unwrap_or_else(|| panic!("missing item {}", id))
    }

    #[test]
    fn test_default_project_checklist() {
        let report = calculate_project(&ProjectConfiguration::default()).unwrap();
        let items = evaluate(&report);
        assert_eq!(items.len(), 7);
        assert_eq!(status(&items, "af-velocity"), ComplianceStatus::Met);
        assert_eq!(status(&items, "af-static"), ComplianceStatus::Met);
        assert_eq!(status(&items, "af-reserve"), ComplianceStatus::Met);
        assert_eq!(status(&items, "es-wc-diameter"), ComplianceStatus::Met);
        assert_eq!(status(&items, "es-slope"), ComplianceStatus::Met);
        assert_eq!(status(&items, "gas-loss"), ComplianceStatus::Met);
    }

    #[test]
    fn test_disabled_modules_not_applicable() {
        let mut config = ProjectConfiguration::default();
        config.enabled_modules = vec![ModuleKind::FuelGas];
        let items = evaluate(&calculate_project(&config).unwrap());
        assert_eq!(status(&items, "af-velocity"), ComplianceStatus::NotApplicable);
        assert_eq!(status(&items, "es-slope"), ComplianceStatus::NotApplicable);
        assert_eq!(status(&items, "gas-loss"), ComplianceStatus::Met);
    }

    #[test]
    fn test_flat_collector_pending() {
        let mut config = ProjectConfiguration::default();
        config.sewage.collector_slope_percent = 0.5;
        let items = evaluate(&calculate_project(&config).unwrap());
        assert_eq!(status(&items, "es-slope"), ComplianceStatus::Pending);
    }

    #[test]
    fn test_tall_building_without_prv_pending() {
        let mut config = ProjectConfiguration::default();
        config.building.floors = 12;
        config.enabled_modules = vec![ModuleKind::ColdWater];
        let items = evaluate(&calculate_project(&config).unwrap());
        assert_eq!(status(&items, "af-static"), ComplianceStatus::Pending);

        config.cold_water.prv.enabled = true;
        let items = evaluate(&calculate_project(&config).unwrap());
        assert_eq!(status(&items, "af-static"), ComplianceStatus::Met);
    }
}
