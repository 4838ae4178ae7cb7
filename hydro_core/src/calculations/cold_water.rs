//! # Cold-Water Module
//!
//! Cold-water supply per NBR 5626:
//!
//! - Daily demand from the building profile
//! - Reservoirs ([`tank`](super::tank)) and, when a lower tank exists, the
//!   lift pump ([`pump`](super::pump))
//! - Distribution paths through the [`path`](crate::hydraulics::path) solver
//! - Pressure-reducing valve check and static-pressure alert
//! - Water meter and building feed pipe
//!
//! ## Assumptions
//!
//! - Storey height of 3 m for the static-pressure estimate
//! - Static pressure above 40 mca calls for a PRV
//! - Building feed uses Hazen-Williams with C = 150

use serde::{Deserialize, Serialize};

use super::pump::{size_pump, PumpConfig, PumpOutcome};
use super::tank::{size_reservoirs, ReservoirConfig, ReservoirOutcome};
use crate::errors::{non_negative, positive, CalcError, CalcResult};
use crate::hydraulics::flow::{probable_flow_lps, water_weight_sum, FixtureCount};
use crate::hydraulics::head_loss::hazen_williams;
use crate::hydraulics::path::{solve_path, FittingCount, Network, Path, PathResult, Segment};
use crate::project::{BuildingProfile, ConsumptionMethod};
use crate::report::{ModuleReport, ReportSection, Suggestion, Warning, WarningCode};
use crate::tables::catalogs::{PumpModel, WATER_METERS};
use crate::tables::pipes::{PipeMaterial, PipeSize};
use crate::tables::{select_at_least, Selection};
use crate::units::{CubicMetersPerHour, CubicMetersPerSecond, LitersPerSecond};

/// Storey height used to estimate the static head (m)
pub const STOREY_HEIGHT_M: f64 = 3.0;

/// Static pressure above which a PRV is required (mca)
pub const MAX_STATIC_PRESSURE_MCA: f64 = 40.0;

/// Margin a PRV needs between upstream and downstream pressure (mca)
pub const PRV_MARGIN_MCA: f64 = 5.0;

/// Hazen-Williams C used for the building feed
pub const BUILDING_FEED_C: f64 = 150.0;

/// Pressure-reducing valve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrvConfig {
    pub enabled: bool,
    pub location: String,
    pub upstream_pressure_mca: f64,
    pub downstream_pressure_mca: f64,
}

impl Default for PrvConfig {
    fn default() -> Self {
        PrvConfig {
            enabled: false,
            location: "Riser, floor 10".to_string(),
            upstream_pressure_mca: 60.0,
            downstream_pressure_mca: 35.0,
        }
    }
}

/// Pipe from the street main to the building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingFeedConfig {
    pub length_m: f64,
    /// PVC or HDPE
    pub material: PipeMaterial,
    pub max_velocity_mps: f64,
}

impl Default for BuildingFeedConfig {
    fn default() -> Self {
        BuildingFeedConfig {
            length_m: 20.0,
            material: PipeMaterial::Pvc,
            max_velocity_mps: 2.5,
        }
    }
}

impl BuildingFeedConfig {
    pub fn validate(&self) -> CalcResult<()> {
        non_negative("length_m", self.length_m)?;
        positive("max_velocity_mps", self.max_velocity_mps)?;
        if !matches!(self.material, PipeMaterial::Pvc | PipeMaterial::Hdpe) {
            return Err(CalcError::invalid_input(
                "material",
                self.material.display_name(),
                "Building feed must be PVC or HDPE",
            ));
        }
        Ok(())
    }
}

/// Cold-water module input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColdWaterConfig {
    pub reservoirs: ReservoirConfig,
    pub pumping: PumpConfig,
    pub network: Network,
    pub paths: Vec<Path>,
    pub prv: PrvConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_feed: Option<BuildingFeedConfig>,
}

impl Default for ColdWaterConfig {
    fn default() -> Self {
        ColdWaterConfig {
            reservoirs: ReservoirConfig::default(),
            pumping: PumpConfig::default(),
            network: Network::default(),
            paths: vec![default_path()],
            prv: PrvConfig::default(),
            building_feed: Some(BuildingFeedConfig::default()),
        }
    }
}

fn default_path() -> Path {
    Path {
        id: 1,
        name: "Most unfavourable point (top-floor shower)".to_string(),
        initial_pressure_mca: 10.0,
        segments: vec![
            Segment {
                id: 1,
                description: "Tank -> riser".to_string(),
                fixtures: vec![
                    FixtureCount::new("Shower", 1),
                    FixtureCount::new("WC flush tank", 1),
                    FixtureCount::new("Lavatory faucet", 1),
                ],
                real_length_m: 10.0,
                start_elevation_m: 10.0,
                end_elevation_m: 10.0,
                fittings: vec![FittingCount::new("Gate valve open", 1), FittingCount::new("Elbow 90°", 2)],
                terminal_fixture: "Shower".to_string(),
            },
            Segment {
                id: 2,
                description: "Riser AF-01".to_string(),
                fixtures: vec![FixtureCount::new("Shower", 1), FixtureCount::new("Lavatory faucet", 1)],
                real_length_m: 12.0,
                start_elevation_m: 10.0,
                end_elevation_m: -2.0,
                fittings: vec![FittingCount::new("Tee 90° side outlet", 1)],
                terminal_fixture: "Shower".to_string(),
            },
            Segment {
                id: 3,
                description: "Bathroom branch".to_string(),
                fixtures: vec![FixtureCount::new("Shower", 1)],
                real_length_m: 5.0,
                start_elevation_m: -2.0,
                end_elevation_m: -1.5,
                fittings: vec![FittingCount::new("Elbow 90°", 3), FittingCount::new("Pressure valve open", 1)],
                terminal_fixture: "Shower".to_string(),
            },
        ],
    }
}

impl ColdWaterConfig {
    pub fn validate(&self) -> CalcResult<()> {
        self.reservoirs.validate().map_err(|e| e.within("reservoirs"))?;
        if self.reservoirs.lower_count > 0 {
            self.pumping.validate().map_err(|e| e.within("pumping"))?;
        }
        self.network.friction.validate().map_err(|e| e.within("network"))?;
        for (i, path) in self.paths.iter().enumerate() {
            path.validate().map_err(|e| e.within(format!("paths[{}]", i)))?;
        }
        if self.prv.enabled {
            non_negative("upstream_pressure_mca", self.prv.upstream_pressure_mca).map_err(|e| e.within("prv"))?;
            non_negative("downstream_pressure_mca", self.prv.downstream_pressure_mca).map_err(|e| e.within("prv"))?;
        }
        if let Some(feed) = &self.building_feed {
            feed.validate().map_err(|e| e.within("building_feed"))?;
        }
        Ok(())
    }
}

/// PRV status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrvCheck {
    pub location: String,
    pub upstream_pressure_mca: f64,
    pub downstream_pressure_mca: f64,
    pub ok: bool,
}

/// Static pressure at the base of the riser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPressureCheck {
    pub initial_pressure_mca: f64,
    pub floors: u32,
    pub static_head_mca: f64,
    pub exceeds_limit: bool,
    pub prv_enabled: bool,
    /// Floor at which a PRV is suggested
    pub suggested_prv_floor: Option<u32>,
}

/// Water meter sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterMeterSizing {
    pub weight_sum: f64,
    pub flow_lps: f64,
    pub flow_m3h: f64,
    pub name: String,
    pub nominal_diameter_mm: u32,
    pub max_flow_m3h: f64,
    pub degraded: bool,
}

/// Building feed pipe sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingFeedSizing {
    pub material: PipeMaterial,
    pub flow_m3s: f64,
    pub max_velocity_mps: f64,
    pub minimum_diameter_mm: f64,
    pub nominal_diameter_mm: u32,
    pub internal_diameter_mm: f64,
    pub length_m: f64,
    pub head_loss_m: f64,
    pub degraded: bool,
}

/// Cold-water module result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColdWaterOutcome {
    pub population: u32,
    pub consumption_method: ConsumptionMethod,
    pub daily_demand_l: f64,
    pub reservoirs: ReservoirOutcome,
    pub pump: Option<PumpOutcome>,
    pub prv: Option<PrvCheck>,
    pub static_pressure: StaticPressureCheck,
    pub water_meter: WaterMeterSizing,
    pub building_feed: Option<BuildingFeedSizing>,
    pub paths: Vec<PathResult>,
    pub max_head_loss_m: f64,
    pub suggestions: Vec<Suggestion>,
    pub warnings: Vec<Warning>,
}

/// Size the cold-water system.
///
/// # Errors
///
/// Any validation error of the configuration, with a dotted field path.
pub fn calculate(config: &ColdWaterConfig, building: &BuildingProfile, pumps: &[PumpModel]) -> CalcResult<ColdWaterOutcome> {
    config.validate()?;
    building.validate().map_err(|e| e.within("building"))?;

    let population = building.population();
    let daily_demand = building.daily_demand_l();

    let reservoirs =
        size_reservoirs(&config.reservoirs, daily_demand, building.demand.reserve_days).map_err(|e| e.within("reservoirs"))?;
    let pump = if config.reservoirs.lower_count > 0 {
        Some(size_pump(&config.pumping, daily_demand, pumps).map_err(|e| e.within("pumping"))?)
    } else {
        None
    };

    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    let prv = config.prv.enabled.then(|| PrvCheck {
        location: config.prv.location.clone(),
        upstream_pressure_mca: config.prv.upstream_pressure_mca,
        downstream_pressure_mca: config.prv.downstream_pressure_mca,
        ok: config.prv.upstream_pressure_mca > config.prv.downstream_pressure_mca + PRV_MARGIN_MCA,
    });

    // === Distribution ===
    let mut paths = Vec::with_capacity(config.paths.len());
    for (i, path) in config.paths.iter().enumerate() {
        let result = solve_path(path, &config.network).map_err(|e| e.within(format!("paths[{}]", i)))?;
        warnings.extend(result.warnings.iter().cloned());
        suggestions.extend(result.suggestions.iter().map(|advice| Suggestion::DiameterChange {
            path_id: result.id,
            segment_id: advice.segment_id,
            description: advice.description.clone(),
            new_nominal_diameter_mm: advice.new_nominal_diameter_mm,
            justification: advice.justification.clone(),
        }));
        paths.push(result);
    }
    let max_head_loss = paths.iter().map(|p| p.total_head_loss_m).fold(0.0, f64::max);

    // === Static pressure ===
    let initial_pressure = config.paths.first().map(|p| p.initial_pressure_mca).unwrap_or(0.0);
    let storeys = building.storeys();
    let static_head = initial_pressure + f64::from(storeys) * STOREY_HEIGHT_M;
    let exceeds_limit = static_head > MAX_STATIC_PRESSURE_MCA;
    let suggested_prv_floor = (exceeds_limit && !config.prv.enabled).then_some(storeys / 2);
    if let Some(floor) = suggested_prv_floor {
        warnings.push(Warning::new(
            WarningCode::MinimumPressureNotMet,
            format!(
                "Static pressure at the riser base (~{:.2} mca) exceeds {} mca; a pressure-reducing valve is required",
                static_head, MAX_STATIC_PRESSURE_MCA
            ),
        ));
        suggestions.push(Suggestion::PressureReducingValve {
            floor,
            static_pressure_mca: static_head,
        });
    }
    let static_pressure = StaticPressureCheck {
        initial_pressure_mca: initial_pressure,
        floors: storeys,
        static_head_mca: static_head,
        exceeds_limit,
        prv_enabled: config.prv.enabled,
        suggested_prv_floor,
    };

    // === Water meter ===
    let first_segments: Vec<FixtureCount> = config
        .paths
        .iter()
        .filter_map(|p| p.segments.first())
        .flat_map(|s| s.fixtures.iter().cloned())
        .collect();
    let meter_weights = water_weight_sum(&first_segments).total;
    let meter_flow_lps = probable_flow_lps(meter_weights);
    let meter_flow_m3h = CubicMetersPerHour::from(LitersPerSecond(meter_flow_lps)).0;
    let meter = select_at_least(&WATER_METERS, |m| m.max_flow_m3h, meter_flow_m3h)
        .ok_or_else(|| CalcError::catalog_entry_not_found("water meters", format!("{:.2} m³/h", meter_flow_m3h)))?;
    if meter.degraded {
        warnings.push(Warning::new(
            WarningCode::DegradedSelection,
            format!(
                "Probable flow {:.2} m³/h exceeds the largest water meter ({})",
                meter_flow_m3h, meter.value.name
            ),
        ));
    }
    suggestions.push(Suggestion::WaterMeter {
        nominal_diameter_mm: meter.value.nominal_diameter_mm,
        name: meter.value.name.to_string(),
    });
    let water_meter = WaterMeterSizing {
        weight_sum: meter_weights,
        flow_lps: meter_flow_lps,
        flow_m3h: meter_flow_m3h,
        name: meter.value.name.to_string(),
        nominal_diameter_mm: meter.value.nominal_diameter_mm,
        max_flow_m3h: meter.value.max_flow_m3h,
        degraded: meter.degraded,
    };

    // === Building feed ===
    let building_feed = match &config.building_feed {
        Some(feed) if meter_flow_lps > 0.0 => {
            let sizing = size_building_feed(feed, meter_flow_lps)?;
            if sizing.degraded {
                warnings.push(Warning::new(
                    WarningCode::ExcessVelocity,
                    format!(
                        "No {} size reaches the {:.1} mm minimum building-feed diameter",
                        feed.material.display_name(),
                        sizing.minimum_diameter_mm
                    ),
                ));
            }
            suggestions.push(Suggestion::BuildingFeedDiameter {
                nominal_diameter_mm: sizing.nominal_diameter_mm,
            });
            Some(sizing)
        }
        _ => None,
    };

    tracing::debug!(population, daily_demand_l = daily_demand, paths = paths.len(), "cold water sized");

    Ok(ColdWaterOutcome {
        population,
        consumption_method: building.demand.method,
        daily_demand_l: daily_demand,
        reservoirs,
        pump,
        prv,
        static_pressure,
        water_meter,
        building_feed,
        paths,
        max_head_loss_m: max_head_loss,
        suggestions,
        warnings,
    })
}

/// Smallest feed pipe whose internal diameter reaches Dmin = √(4Q/(π·Vmax)).
pub fn size_building_feed(feed: &BuildingFeedConfig, flow_lps: f64) -> CalcResult<BuildingFeedSizing> {
    feed.validate()?;
    let q = CubicMetersPerSecond::from(LitersPerSecond(flow_lps)).0;
    let d_min_mm = (4.0 * q / (std::f64::consts::PI * feed.max_velocity_mps)).sqrt() * 1000.0;
    let pick: Selection<PipeSize> = select_at_least(feed.material.sizes(), |s| s.internal_mm, d_min_mm)
        .ok_or_else(|| CalcError::catalog_entry_not_found("pipe sizes", feed.material.display_name()))?;
    let head_loss = hazen_williams(q, BUILDING_FEED_C, pick.value.internal_mm / 1000.0) * feed.length_m;
    Ok(BuildingFeedSizing {
        material: feed.material,
        flow_m3s: q,
        max_velocity_mps: feed.max_velocity_mps,
        minimum_diameter_mm: d_min_mm,
        nominal_diameter_mm: pick.value.nominal_mm,
        internal_diameter_mm: pick.value.internal_mm,
        length_m: feed.length_m,
        head_loss_m: head_loss,
        degraded: pick.degraded,
    })
}

impl ReportSection for ColdWaterOutcome {
    fn write_to(&self, report: &mut ModuleReport) {
        report.result("Design population", self.population, "persons");
        report.result("Daily consumption", self.daily_demand_l, "L");
        let demand = match self.consumption_method {
            ConsumptionMethod::PerCapita => format!(
                "D = population × per-capita consumption = {} × {:.0} = {:.0} L/day",
                self.population,
                if self.population > 0 { self.daily_demand_l / f64::from(self.population) } else { 0.0 },
                self.daily_demand_l
            ),
            ConsumptionMethod::ByArea => format!("D = area × consumption per m² = {:.0} L/day", self.daily_demand_l),
        };
        report.step("Daily water demand", "NBR 5626", demand);

        self.reservoirs.write_to(report);
        if let Some(pump) = &self.pump {
            pump.write_to(report);
        }

        if let Some(prv) = &self.prv {
            report.result("PRV status", if prv.ok { "OK" } else { "Insufficient pressure" }, "");
            report.step(
                "Pressure-reducing valve",
                "NBR 5626",
                format!(
                    "{}: upstream {:.1} mca > downstream {:.1} mca + {} mca margin: {}",
                    prv.location,
                    prv.upstream_pressure_mca,
                    prv.downstream_pressure_mca,
                    PRV_MARGIN_MCA,
                    if prv.ok { "OK" } else { "insufficient" }
                ),
            );
        }

        for path in &self.paths {
            report.step(
                format!("Path '{}'", path.name),
                "NBR 5626",
                format!(
                    "{} segments, total head loss {:.2} mca, final pressure {:.2} mca",
                    path.segments.len(),
                    path.total_head_loss_m,
                    path.final_pressure_mca()
                ),
            );
        }
        report.result("Maximum head loss", self.max_head_loss_m, "mca");

        let s = &self.static_pressure;
        if s.suggested_prv_floor.is_some() {
            report.result("Static pressure alert", s.static_head_mca, "mca");
            report.step(
                "Static pressure check",
                "NBR 5626",
                format!(
                    "Static pressure at the riser base ≈ {:.2} + {} × {} = {:.2} mca exceeds {} mca; a PRV is recommended",
                    s.initial_pressure_mca, s.floors, STOREY_HEIGHT_M, s.static_head_mca, MAX_STATIC_PRESSURE_MCA
                ),
            );
        }

        let m = &self.water_meter;
        report.result("Probable maximum flow", m.flow_m3h, "m³/h");
        report.result("Suggested water meter", m.name.as_str(), "");
        report.step(
            "Water meter",
            "NBR 5626",
            format!(
                "Q = 0.3 × √{:.2} = {:.3} L/s = {:.2} m³/h; meter {} (Qmax {:.1} m³/h)",
                m.weight_sum, m.flow_lps, m.flow_m3h, m.name, m.max_flow_m3h
            ),
        );

        if let Some(feed) = &self.building_feed {
            report.result("Building feed DN", feed.nominal_diameter_mm, "mm");
            report.result("Building feed head loss", feed.head_loss_m, "mca");
            report.step(
                "Building feed pipe",
                "NBR 5626",
                format!(
                    "Dmin = √(4Q/(π·Vmax)) = √(4 × {:.5} / (π × {})) = {:.2} mm\nAdopted {} DN {} (Ø int {:.1} mm), head loss {:.2} mca over {:.0} m",
                    feed.flow_m3s,
                    feed.max_velocity_mps,
                    feed.minimum_diameter_mm,
                    feed.material.display_name(),
                    feed.nominal_diameter_mm,
                    feed.internal_diameter_mm,
                    feed.head_loss_m,
                    feed.length_m
                ),
            );
        }

        report.warnings.extend(self.warnings.iter().cloned());
        report.suggestions.extend(self.suggestions.iter().cloned());
    }
}
