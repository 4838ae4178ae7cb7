//! # Waste Room Module
//!
//! Storage room for solid waste between collections.
//!
//! ```text
//! daily       = population · rate
//! accumulated = daily · interval · safety factor
//! area        = accumulated / stacking height
//! ```
//!
//! With selective collection the volume is split evenly between organic and
//! recyclable fractions, each with its own containers.

use serde::{Deserialize, Serialize};

use crate::errors::{non_negative, positive, CalcResult};
use crate::project::BuildingProfile;
use crate::report::{ModuleReport, ReportSection, Warning, WarningCode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WasteRoomConfig {
    /// Waste generated per person (L/day)
    pub rate_l_per_person_day: f64,
    pub collection_interval_days: f64,
    pub safety_factor: f64,
    pub selective_collection: bool,
    pub stacking_height_m: f64,
    pub container_capacity_l: f64,
}

impl Default for WasteRoomConfig {
    fn default() -> Self {
        WasteRoomConfig {
            rate_l_per_person_day: 2.5,
            collection_interval_days: 2.0,
            safety_factor: 1.25,
            selective_collection: true,
            stacking_height_m: 1.0,
            container_capacity_l: 240.0,
        }
    }
}

impl WasteRoomConfig {
    pub fn validate(&self) -> CalcResult<()> {
        non_negative("rate_l_per_person_day", self.rate_l_per_person_day)?;
        non_negative("collection_interval_days", self.collection_interval_days)?;
        positive("safety_factor", self.safety_factor)?;
        positive("stacking_height_m", self.stacking_height_m)?;
        positive("container_capacity_l", self.container_capacity_l)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteFraction {
    pub name: String,
    pub volume_l: f64,
    pub containers: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteRoomOutcome {
    pub population: u32,
    pub daily_volume_l: f64,
    pub accumulated_volume_l: f64,
    pub area_m2: f64,
    pub container_capacity_l: f64,
    pub fractions: Vec<WasteFraction>,
    pub warnings: Vec<Warning>,
}

impl WasteRoomOutcome {
    pub fn total_containers(&self) -> u32 {
        self.fractions.iter().map(|f| f.containers).sum()
    }
}

fn containers_for(volume_l: f64, capacity_l: f64) -> u32 {
    (volume_l / capacity_l).ceil() as u32
}

/// Size the waste storage room.
pub fn calculate(config: &WasteRoomConfig, building: &BuildingProfile) -> CalcResult<WasteRoomOutcome> {
    config.validate()?;
    let mut warnings = Vec::new();
    let population = building.population();
    let daily = f64::from(population) * config.rate_l_per_person_day;
    let accumulated = daily * config.collection_interval_days * config.safety_factor;
    if accumulated == 0.0 {
        warnings.push(Warning::new(WarningCode::ZeroFlow, "No waste accumulates between collections"));
    }

    let fractions = if config.selective_collection {
        let half = accumulated / 2.0;
        vec![
            WasteFraction {
                name: "Organic".to_string(),
                volume_l: half,
                containers: containers_for(half, config.container_capacity_l),
            },
            WasteFraction {
                name: "Recyclable".to_string(),
                volume_l: half,
                containers: containers_for(half, config.container_capacity_l),
            },
        ]
    } else {
        vec![WasteFraction {
            name: "Organic".to_string(),
            volume_l: accumulated,
            containers: containers_for(accumulated, config.container_capacity_l),
        }]
    };

    tracing::debug!(population, accumulated_l = accumulated, "waste room sized");

    Ok(WasteRoomOutcome {
        population,
        daily_volume_l: daily,
        accumulated_volume_l: accumulated,
        area_m2: accumulated / 1000.0 / config.stacking_height_m,
        container_capacity_l: config.container_capacity_l,
        fractions,
        warnings,
    })
}

impl ReportSection for WasteRoomOutcome {
    fn write_to(&self, report: &mut ModuleReport) {
        report.result("Stored volume", self.accumulated_volume_l, "L");
        report.result("Room floor area", self.area_m2, "m²");
        for f in &self.fractions {
            report.result(format!("{} containers", f.name), f.containers, "units");
        }
        report.step(
            "Waste volume",
            "NBR 13463",
            format!(
                "{} persons: {:.1} L/day; stored between collections with safety factor: {:.1} L",
                self.population, self.daily_volume_l, self.accumulated_volume_l
            ),
        );
        let split: Vec<String> = self
            .fractions
            .iter()
            .map(|f| {
                format!(
                    "{}: {:.1} L in {} container(s) of {:.0} L",
                    f.name, f.volume_l, f.containers, self.container_capacity_l
                )
            })
            .collect();
        report.step("Containers and area", "NBR 12235", format!("{}\nArea {:.2} m²", split.join("\n"), self.area_m2));
        report.warnings.extend(self.warnings.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{BuildingType, FloorGroup};

    #[test]
    fn test_default_house() {
        let outcome = calculate(&WasteRoomConfig::default(), &BuildingProfile::default()).unwrap();
        // 4 × 2.5 × 2 × 1.25
        assert!((outcome.accumulated_volume_l - 25.0).abs() < 1e-12);
        assert!((outcome.area_m2 - 0.025).abs() < 1e-12);
        assert_eq!(outcome.fractions.len(), 2);
        assert_eq!(outcome.total_containers(), 2);
    }

    #[test]
    fn test_apartment_block_containers() {
        let building = BuildingProfile {
            building_type: BuildingType::MultiFamily,
            floor_groups: vec![FloorGroup { floors: 10, apartments_per_floor: 4 }],
            persons_per_apartment: 3,
            ..BuildingProfile::default()
        };
        let config = WasteRoomConfig {
            selective_collection: false,
            ..WasteRoomConfig::default()
        };
        let outcome = calculate(&config, &building).unwrap();
        // 120 × 2.5 × 2 × 1.25 = 750 L → 4 containers of 240 L
        assert!((outcome.accumulated_volume_l - 750.0).abs() < 1e-12);
        assert_eq!(outcome.fractions[0].containers, 4);
    }

    #[test]
    fn test_empty_building_warns() {
        let building = BuildingProfile {
            persons: 0,
            ..BuildingProfile::default()
        };
        let outcome = calculate(&WasteRoomConfig::default(), &building).unwrap();
        assert_eq!(outcome.total_containers(), 0);
        assert!(outcome.warnings.iter().any(|w| w.code == WarningCode::ZeroFlow));
    }
}
