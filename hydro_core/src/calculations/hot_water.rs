//! # Hot-Water Module
//!
//! Hot-water supply per NBR 5626 / NBR 7198.
//!
//! Two heating systems:
//!
//! - **Central** (storage): daily demand of 45 L/person, a storage heater
//!   sized to recover it in the heating time, an optional recirculation loop
//!   and an optional expansion vessel.
//! - **Individual** (instantaneous): one tankless heater per dwelling sized for
//!   the probable flow of every hot-water point.
//!
//! Distribution paths go through the same path solver as cold water, with PPR
//! and Hazen-Williams C = 140 by default.

use serde::{Deserialize, Serialize};

use crate::errors::{non_negative, positive, CalcError, CalcResult};
use crate::hydraulics::flow::{probable_flow_lps, water_weight_sum, FixtureCount};
use crate::hydraulics::head_loss::{hazen_williams, FrictionMethod};
use crate::hydraulics::path::{solve_path, FittingCount, Network, Path, PathResult, Segment};
use crate::project::BuildingProfile;
use crate::report::{ModuleReport, ReportSection, Suggestion, Warning, WarningCode};
use crate::tables::catalogs::{HeaterKind, WaterHeater};
use crate::tables::pipes::PipeMaterial;
use crate::tables::water::properties_at;
use crate::units::{LitersPerMinute, LitersPerSecond};

/// Hot-water consumption of a central system (L/person·day)
pub const CENTRAL_CONSUMPTION_LPD: f64 = 45.0;

/// Specific heat of water (Wh/L·°C)
pub const SPECIFIC_HEAT_WH: f64 = 1.163;

/// Instantaneous heater constant: kW ≈ L/min × ΔT / 14.3
pub const INSTANTANEOUS_FACTOR: f64 = 14.3;

/// Ambient temperature around the recirculation loop (°C)
pub const AMBIENT_TEMPERATURE_C: f64 = 25.0;

/// Recirculation flow (L/s)
pub const RECIRCULATION_FLOW_LPS: f64 = 0.1;

/// Recirculation pump efficiency
pub const RECIRCULATION_PUMP_EFFICIENCY: f64 = 0.4;

/// Insulated outer diameter as a multiple of DN
pub const INSULATION_FACTOR: f64 = 1.1;

/// Atmospheric pressure added to gauge pressure (bar)
pub const ATMOSPHERIC_BAR: f64 = 1.013;

/// Derating applied to absolute pressures of the expansion vessel
pub const VESSEL_PRESSURE_FACTOR: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotWaterSystem {
    #[default]
    Individual,
    Central,
}

/// Recirculation loop of a central system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecirculationConfig {
    pub enabled: bool,
    pub loop_length_m: f64,
    pub material: PipeMaterial,
    pub nominal_diameter_mm: u32,
}

impl Default for RecirculationConfig {
    fn default() -> Self {
        RecirculationConfig {
            enabled: false,
            loop_length_m: 50.0,
            material: PipeMaterial::Cpvc,
            nominal_diameter_mm: 22,
        }
    }
}

/// Expansion vessel of a central system. Pressures are gauge, in bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionVesselConfig {
    pub enabled: bool,
    pub min_pressure_bar: f64,
    pub max_pressure_bar: f64,
}

impl Default for ExpansionVesselConfig {
    fn default() -> Self {
        ExpansionVesselConfig {
            enabled: false,
            min_pressure_bar: 2.0,
            max_pressure_bar: 4.0,
        }
    }
}

/// Hot-water module input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotWaterConfig {
    pub system: HotWaterSystem,
    pub cold_temperature_c: f64,
    pub hot_temperature_c: f64,
    /// Recovery time of a storage heater (h)
    pub heating_hours: f64,
    pub network: Network,
    pub paths: Vec<Path>,
    pub recirculation: RecirculationConfig,
    pub expansion_vessel: ExpansionVesselConfig,
    /// Heater chosen from the heater catalog, by name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_heater: Option<String>,
}

impl Default for HotWaterConfig {
    fn default() -> Self {
        HotWaterConfig {
            system: HotWaterSystem::Individual,
            cold_temperature_c: 20.0,
            hot_temperature_c: 60.0,
            heating_hours: 4.0,
            network: Network {
                material: PipeMaterial::Ppr,
                friction: FrictionMethod::HazenWilliams { c: 140.0 },
            },
            paths: vec![Path {
                id: 1,
                name: "Most unfavourable hot-water point".to_string(),
                initial_pressure_mca: 10.0,
                segments: vec![
                    Segment {
                        id: 1,
                        description: "Heater outlet".to_string(),
                        fixtures: vec![FixtureCount::new("Shower", 1)],
                        real_length_m: 5.0,
                        start_elevation_m: 0.0,
                        end_elevation_m: 0.0,
                        fittings: vec![FittingCount::new("Elbow 90°", 2)],
                        terminal_fixture: "Shower".to_string(),
                    },
                    Segment {
                        id: 2,
                        description: "Riser AQ-01".to_string(),
                        fixtures: vec![FixtureCount::new("Shower", 1)],
                        real_length_m: 3.0,
                        start_elevation_m: 0.0,
                        end_elevation_m: 3.0,
                        fittings: Vec::new(),
                        terminal_fixture: "Shower".to_string(),
                    },
                ],
            }],
            recirculation: RecirculationConfig::default(),
            expansion_vessel: ExpansionVesselConfig::default(),
            selected_heater: None,
        }
    }
}

impl HotWaterConfig {
    pub fn validate(&self) -> CalcResult<()> {
        if self.hot_temperature_c <= self.cold_temperature_c {
            return Err(CalcError::invalid_input(
                "hot_temperature_c",
                self.hot_temperature_c.to_string(),
                "Hot-water temperature must exceed the cold-water temperature",
            ));
        }
        self.network.friction.validate().map_err(|e| e.within("network"))?;
        for (i, path) in self.paths.iter().enumerate() {
            path.validate().map_err(|e| e.within(format!("paths[{}]", i)))?;
        }
        if self.system == HotWaterSystem::Central {
            positive("heating_hours", self.heating_hours)?;
            if self.recirculation.enabled {
                non_negative("loop_length_m", self.recirculation.loop_length_m).map_err(|e| e.within("recirculation"))?;
                if self.recirculation.nominal_diameter_mm == 0 {
                    return Err(CalcError::invalid_input(
                        "recirculation.nominal_diameter_mm",
                        "0",
                        "Diameter must be positive",
                    ));
                }
            }
            if self.expansion_vessel.enabled {
                let vessel = &self.expansion_vessel;
                non_negative("min_pressure_bar", vessel.min_pressure_bar).map_err(|e| e.within("expansion_vessel"))?;
                if vessel.max_pressure_bar <= vessel.min_pressure_bar {
                    return Err(CalcError::invalid_input(
                        "expansion_vessel.max_pressure_bar",
                        vessel.max_pressure_bar.to_string(),
                        "Maximum pressure must exceed the minimum pressure",
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn delta_t(&self) -> f64 {
        self.hot_temperature_c - self.cold_temperature_c
    }
}

/// Storage heater of a central system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralHeating {
    pub daily_demand_l: f64,
    pub heating_hours: f64,
    pub storage_volume_l: f64,
    pub power_kw: f64,
    /// Catalog heater whose volume and power were adopted
    pub heater: Option<String>,
}

/// Tankless heater of one dwelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantaneousHeating {
    pub weight_sum: f64,
    pub flow_lps: f64,
    pub flow_lpm: f64,
    pub power_kw: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecirculationSizing {
    pub material: PipeMaterial,
    pub nominal_diameter_mm: u32,
    pub internal_diameter_mm: f64,
    pub loop_length_m: f64,
    /// Outer surface of the insulated loop (m²)
    pub surface_m2: f64,
    /// Hot water minus ambient (°C)
    pub temperature_difference_c: f64,
    pub heat_loss_kw: f64,
    pub head_loss_m: f64,
    pub pump_power_cv: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionVesselSizing {
    pub storage_volume_l: f64,
    pub cold_density: f64,
    pub hot_density: f64,
    pub expansion_volume_l: f64,
    pub min_pressure_abs_bar: f64,
    pub max_pressure_abs_bar: f64,
    pub vessel_volume_l: f64,
}

/// Hot-water module result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotWaterOutcome {
    pub system: HotWaterSystem,
    pub delta_t: f64,
    /// Whole building for central systems, one dwelling for individual ones
    pub population: u32,
    pub central: Option<CentralHeating>,
    pub individual: Option<InstantaneousHeating>,
    pub recirculation: Option<RecirculationSizing>,
    pub expansion_vessel: Option<ExpansionVesselSizing>,
    pub paths: Vec<PathResult>,
    pub max_head_loss_m: f64,
    pub suggestions: Vec<Suggestion>,
    pub warnings: Vec<Warning>,
}

/// Size the hot-water system.
pub fn calculate(config: &HotWaterConfig, building: &BuildingProfile, heaters: &[WaterHeater]) -> CalcResult<HotWaterOutcome> {
    config.validate()?;
    let delta_t = config.delta_t();
    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    let selected = match &config.selected_heater {
        Some(name) => Some(
            heaters
                .iter()
                .find(|h| &h.name == name)
                .ok_or_else(|| CalcError::catalog_entry_not_found("water heaters", name.clone()))?,
        ),
        None => None,
    };

    let (population, central, individual) = match config.system {
        HotWaterSystem::Central => {
            let population = building.population();
            let daily_demand = f64::from(population) * CENTRAL_CONSUMPTION_LPD;
            let mut heating = CentralHeating {
                daily_demand_l: daily_demand,
                heating_hours: config.heating_hours,
                storage_volume_l: daily_demand,
                power_kw: storage_power_kw(daily_demand, delta_t, config.heating_hours),
                heater: None,
            };
            match selected {
                Some(heater) if heater.kind == HeaterKind::Storage => {
                    heating.storage_volume_l = heater.volume_l;
                    heating.power_kw = heater.power_kw;
                    heating.heater = Some(heater.name.clone());
                }
                Some(heater) => {
                    let warning = Warning::new(
                        WarningCode::DefaultApplied,
                        format!("Heater '{}' is not a storage heater; computed volume and power kept", heater.name),
                    );
                    warnings.push(warning);
                }
                None => {}
            }
            (population, Some(heating), None)
        }
        HotWaterSystem::Individual => {
            let fixtures: Vec<FixtureCount> = config
                .paths
                .iter()
                .flat_map(|p| p.segments.iter())
                .flat_map(|s| s.fixtures.iter().cloned())
                .collect();
            // unmapped names are already reported by the path solver
            let load = water_weight_sum(&fixtures);
            let flow_lps = probable_flow_lps(load.total);
            let flow_lpm = LitersPerMinute::from(LitersPerSecond(flow_lps)).0;
            let heating = InstantaneousHeating {
                weight_sum: load.total,
                flow_lps,
                flow_lpm,
                power_kw: flow_lpm * delta_t / INSTANTANEOUS_FACTOR,
            };
            (building.persons_per_dwelling(), None, Some(heating))
        }
    };

    let recirculation = match (&central, config.recirculation.enabled) {
        (Some(_), true) => Some(size_recirculation(&config.recirculation, config.hot_temperature_c)),
        _ => None,
    };
    let expansion_vessel = match (&central, config.expansion_vessel.enabled) {
        (Some(heating), true) => Some(size_expansion_vessel(
            heating.storage_volume_l,
            config.cold_temperature_c,
            config.hot_temperature_c,
            &config.expansion_vessel,
        )),
        _ => None,
    };

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

    tracing::debug!(system = ?config.system, population, "hot water sized");

    Ok(HotWaterOutcome {
        system: config.system,
        delta_t,
        population,
        central,
        individual,
        recirculation,
        expansion_vessel,
        paths,
        max_head_loss_m: max_head_loss,
        suggestions,
        warnings,
    })
}

/// Heater power to warm `volume_l` by `delta_t` in `hours` (kW).
pub fn storage_power_kw(volume_l: f64, delta_t: f64, hours: f64) -> f64 {
    volume_l * delta_t * SPECIFIC_HEAT_WH / (hours * 1000.0)
}

pub fn size_recirculation(config: &RecirculationConfig, hot_temperature_c: f64) -> RecirculationSizing {
    let outer_d = INSULATION_FACTOR * f64::from(config.nominal_diameter_mm) / 1000.0;
    let surface = std::f64::consts::PI * outer_d * config.loop_length_m;
    let dt = hot_temperature_c - AMBIENT_TEMPERATURE_C;
    let heat_loss = config.material.thermal_conductivity() * surface * dt / 1000.0;

    let internal_mm = config.material.internal_diameter_mm(config.nominal_diameter_mm);
    let q = RECIRCULATION_FLOW_LPS / 1000.0;
    let head_loss = hazen_williams(q, 150.0, internal_mm / 1000.0) * config.loop_length_m;
    let pump_power = RECIRCULATION_FLOW_LPS * head_loss / (75.0 * RECIRCULATION_PUMP_EFFICIENCY);

    RecirculationSizing {
        material: config.material,
        nominal_diameter_mm: config.nominal_diameter_mm,
        internal_diameter_mm: internal_mm,
        loop_length_m: config.loop_length_m,
        surface_m2: surface,
        temperature_difference_c: dt,
        heat_loss_kw: heat_loss,
        head_loss_m: head_loss,
        pump_power_cv: pump_power,
    }
}

/// Vt = Vb·(ρcold/ρhot − 1) / (1 − Pmin,abs/Pmax,abs)
pub fn size_expansion_vessel(
    storage_volume_l: f64,
    cold_temperature_c: f64,
    hot_temperature_c: f64,
    vessel: &ExpansionVesselConfig,
) -> ExpansionVesselSizing {
    let cold_density = properties_at(cold_temperature_c).density;
    let hot_density = properties_at(hot_temperature_c).density;
    let expansion = storage_volume_l * (cold_density / hot_density - 1.0);
    let p_min = (vessel.min_pressure_bar + ATMOSPHERIC_BAR) * VESSEL_PRESSURE_FACTOR;
    let p_max = (vessel.max_pressure_bar + ATMOSPHERIC_BAR) * VESSEL_PRESSURE_FACTOR;
    ExpansionVesselSizing {
        storage_volume_l,
        cold_density,
        hot_density,
        expansion_volume_l: expansion,
        min_pressure_abs_bar: p_min,
        max_pressure_abs_bar: p_max,
        vessel_volume_l: expansion / (1.0 - p_min / p_max),
    }
}

impl ReportSection for HotWaterOutcome {
    fn write_to(&self, report: &mut ModuleReport) {
        if let Some(central) = &self.central {
            report.result("Design population (hot water)", self.population, "persons");
            report.result("Storage volume", central.storage_volume_l, "L");
            report.result("Central heater power", central.power_kw, "kW");
            report.step(
                "Design assumptions",
                "NBR 7198",
                format!(
                    "Central (storage) system for the whole building ({} persons); {} L/person·day, ΔT = {:.0} °C",
                    self.population, CENTRAL_CONSUMPTION_LPD, self.delta_t
                ),
            );
            report.step(
                "Daily hot-water demand",
                "NBR 7198",
                format!(
                    "D = {} × {} = {:.0} L/day",
                    self.population, CENTRAL_CONSUMPTION_LPD, central.daily_demand_l
                ),
            );
            let power = match &central.heater {
                Some(name) => format!(
                    "Catalog heater {} adopted: {:.0} L, {:.2} kW",
                    name, central.storage_volume_l, central.power_kw
                ),
                None => format!(
                    "P = V × ΔT × {} / (t × 1000) = {:.0} × {:.0} × {} / ({} × 1000) = {:.2} kW",
                    SPECIFIC_HEAT_WH,
                    central.storage_volume_l,
                    self.delta_t,
                    SPECIFIC_HEAT_WH,
                    central.heating_hours,
                    central.power_kw
                ),
            };
            report.step("Heater power", "NBR 7198", power);
        }

        if let Some(individual) = &self.individual {
            report.result("Design population (dwelling)", self.population, "persons");
            report.result("Probable hot-water flow", individual.flow_lpm, "L/min");
            report.result("Instantaneous heater power", individual.power_kw, "kW");
            report.step(
                "Design assumptions",
                "NBR 5626",
                format!(
                    "Individual (instantaneous) system for one dwelling ({} persons), ΔT = {:.0} °C",
                    self.population, self.delta_t
                ),
            );
            report.step(
                "Probable hot-water flow",
                "NBR 5626",
                format!(
                    "Q = 0.3 × √{:.2} = {:.3} L/s = {:.2} L/min",
                    individual.weight_sum, individual.flow_lps, individual.flow_lpm
                ),
            );
            report.step(
                "Instantaneous heater power",
                "NBR 5626",
                format!(
                    "P ≈ Q × ΔT / {} = {:.2} × {:.0} / {} = {:.2} kW",
                    INSTANTANEOUS_FACTOR, individual.flow_lpm, self.delta_t, INSTANTANEOUS_FACTOR, individual.power_kw
                ),
            );
        }

        if let Some(r) = &self.recirculation {
            report.result("Recirculation heat loss", r.heat_loss_kw, "kW");
            report.result("Recirculation pump power", r.pump_power_cv, "CV");
            report.step(
                "Recirculation loop",
                "NBR 7198",
                format!(
                    "Heat loss = k × A × ΔT = {} × {:.2} × {:.0} = {:.1} W\nLoop head loss {:.3} mca at {} L/s; pump power = Q × ΔH / (75 × {}) = {:.4} CV",
                    r.material.thermal_conductivity(),
                    r.surface_m2,
                    r.temperature_difference_c,
                    r.heat_loss_kw * 1000.0,
                    r.head_loss_m,
                    RECIRCULATION_FLOW_LPS,
                    RECIRCULATION_PUMP_EFFICIENCY,
                    r.pump_power_cv
                ),
            );
        }

        if let Some(v) = &self.expansion_vessel {
            report.result("Expansion vessel volume", v.vessel_volume_l, "L");
            report.step(
                "Expansion vessel",
                "NBR 7198",
                format!(
                    "Vt = Vb × (ρc/ρh − 1) / (1 − Pi/Pf) = {:.0} × ({:.1}/{:.1} − 1) / (1 − {:.2}/{:.2}) = {:.2} L",
                    v.storage_volume_l,
                    v.cold_density,
                    v.hot_density,
                    v.min_pressure_abs_bar,
                    v.max_pressure_abs_bar,
                    v.vessel_volume_l
                ),
            );
        }

        for path in &self.paths {
            report.step(
                format!("Path '{}'", path.name),
                "NBR 7198",
                format!(
                    "{} segments, total head loss {:.2} mca, final pressure {:.2} mca",
                    path.segments.len(),
                    path.total_head_loss_m,
                    path.final_pressure_mca()
                ),
            );
        }
        report.result("Maximum head loss (hot water)", self.max_head_loss_m, "mca");

        report.warnings.extend(self.warnings.iter().cloned());
        report.suggestions.extend(self.suggestions.iter().cloned());
    }
}
