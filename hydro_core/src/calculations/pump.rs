//! # Pump Sizer
//!
//! Sizes the lift pump that fills the upper reservoir from the lower one.
//!
//! ## Method
//!
//! 1. Flow Q = daily demand / (operating hours × 3600)
//! 2. Discharge-line head loss by Hazen-Williams over the virtual length
//! 3. Total dynamic head TDH = suction height + discharge height + head loss
//! 4. Power (CV) = Q·TDH / (75·η)
//! 5. NPSH available = P_atm − suction height − vapour pressure(T) − suction loss,
//!    the suction loss approximated as J × 1.5 × suction height
//! 6. Catalog pumps ranked by the distance from the duty point to the nearest
//!    point of their curve (m³/h and mca)
//! 7. Water hammer: wave celerity from water and wall elasticity (wall
//!    thickness taken as 10 % of DN), Joukowsky overpressure for a rapid
//!    closure, Michaud for a slow one
//!
//! With several pumps in parallel each pump delivers Q/N; in series each
//! delivers TDH/N.

use serde::{Deserialize, Serialize};

use crate::errors::{non_negative, percentage, positive, CalcError, CalcResult};
use crate::hydraulics::head_loss::hazen_williams;
use crate::hydraulics::path::{fittings_equivalent_length, FittingCount};
use crate::report::{ModuleReport, ReportSection, Suggestion, Warning, WarningCode};
use crate::tables::catalogs::PumpModel;
use crate::tables::pipes::PipeMaterial;
use crate::tables::water::properties_at;
use crate::units::{velocity, CubicMetersPerHour, CubicMetersPerSecond, LitersPerSecond, Millimeters, GRAVITY};

/// Operating hours used when none are given
pub const DEFAULT_OPERATING_HOURS: f64 = 4.0;

/// Factor applied to the suction height to approximate the suction line's virtual length
pub const SUCTION_LENGTH_FACTOR: f64 = 1.5;

/// Wall thickness as a fraction of the nominal diameter
pub const WALL_THICKNESS_RATIO: f64 = 0.1;

/// Overpressure, as a fraction of TDH, above which protection is advised
pub const TRANSIENT_PROTECTION_RATIO: f64 = 0.4;

/// Number of ranked catalog pumps reported
pub const RANKED_PUMPS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpArrangement {
    #[default]
    Single,
    Series,
    Parallel,
}

/// Pumping station parameters.
///
/// ## JSON Example
///
/// ```json
/// {
///   "suction_height_m": 2.0,
///   "discharge_height_m": 8.0,
///   "real_length_m": 15.0,
///   "efficiency_percent": 60.0,
///   "arrangement": "single",
///   "pump_count": 1,
///   "atmospheric_pressure_mca": 10.33,
///   "water_temperature_c": 20.0,
///   "valve_closure_time_s": 5.0,
///   "operating_hours": 4.0,
///   "material": "pvc",
///   "nominal_diameter_mm": 32,
///   "fittings": [{"name": "Elbow 90°", "quantity": 4}],
///   "selected_pump": "Thebe THA-16 (1.5 CV)"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpConfig {
    pub suction_height_m: f64,
    pub discharge_height_m: f64,
    /// Real length of the discharge line (m)
    pub real_length_m: f64,
    pub efficiency_percent: f64,
    pub arrangement: PumpArrangement,
    pub pump_count: u32,
    pub atmospheric_pressure_mca: f64,
    pub water_temperature_c: f64,
    pub valve_closure_time_s: f64,
    /// Daily operating hours; zero falls back to 4 h
    pub operating_hours: f64,
    pub material: PipeMaterial,
    pub nominal_diameter_mm: u32,
    pub fittings: Vec<FittingCount>,
    /// Catalog pump chosen by the designer, checked for cavitation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_pump: Option<String>,
}

impl Default for PumpConfig {
    fn default() -> Self {
        PumpConfig {
            suction_height_m: 2.0,
            discharge_height_m: 8.0,
            real_length_m: 15.0,
            efficiency_percent: 60.0,
            arrangement: PumpArrangement::Single,
            pump_count: 1,
            atmospheric_pressure_mca: 10.33,
            water_temperature_c: 20.0,
            valve_closure_time_s: 5.0,
            operating_hours: DEFAULT_OPERATING_HOURS,
            material: PipeMaterial::Pvc,
            nominal_diameter_mm: 32,
            fittings: vec![
                FittingCount::new("Elbow 90°", 4),
                FittingCount::new("Gate valve open", 1),
                FittingCount::new("Check valve light", 1),
                FittingCount::new("Normal inlet", 1),
                FittingCount::new("Pipe outlet", 1),
            ],
            selected_pump: None,
        }
    }
}

impl PumpConfig {
    pub fn validate(&self) -> CalcResult<()> {
        non_negative("suction_height_m", self.suction_height_m)?;
        non_negative("discharge_height_m", self.discharge_height_m)?;
        non_negative("real_length_m", self.real_length_m)?;
        percentage("efficiency_percent", self.efficiency_percent)?;
        positive("atmospheric_pressure_mca", self.atmospheric_pressure_mca)?;
        positive("valve_closure_time_s", self.valve_closure_time_s)?;
        non_negative("operating_hours", self.operating_hours)?;
        if self.pump_count == 0 {
            return Err(CalcError::invalid_input("pump_count", "0", "At least one pump is required"));
        }
        if self.nominal_diameter_mm == 0 {
            return Err(CalcError::invalid_input("nominal_diameter_mm", "0", "Diameter must be positive"));
        }
        Ok(())
    }

    /// Pumps sharing the duty (1 for a single pump)
    pub fn sharing_pumps(&self) -> u32 {
        match self.arrangement {
            PumpArrangement::Single => 1,
            PumpArrangement::Series | PumpArrangement::Parallel => self.pump_count,
        }
    }
}

/// One ranked catalog pump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpCandidate {
    pub name: String,
    pub manufacturer: String,
    /// Nearest curve point
    pub flow_m3h: f64,
    pub head_mca: f64,
    /// Distance from the duty point to the nearest curve point
    pub distance: f64,
    pub npsh_required_mca: f64,
    pub cavitation_risk: bool,
}

/// Cavitation check of the designer's pump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedPumpCheck {
    pub name: String,
    pub npsh_required_mca: f64,
    pub npsh_ok: bool,
}

/// Water-hammer analysis of the discharge line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransientAnalysis {
    pub wave_celerity_mps: f64,
    pub critical_time_s: f64,
    pub velocity_mps: f64,
    /// Valve closes within the critical time (Joukowsky)
    pub rapid_closure: bool,
    pub overpressure_mca: f64,
    pub max_pressure_mca: f64,
    pub protection_required: bool,
}

/// Pump duty, NPSH, catalog ranking and transient analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpOutcome {
    pub operating_hours: f64,
    pub flow_lps: f64,
    pub flow_m3h: f64,
    pub geometric_height_m: f64,
    pub internal_diameter_mm: f64,
    pub equivalent_length_m: f64,
    pub virtual_length_m: f64,
    pub unit_head_loss: f64,
    pub discharge_head_loss_m: f64,
    pub total_dynamic_head_m: f64,
    pub power_cv: f64,
    pub arrangement: PumpArrangement,
    pub pump_count: u32,
    /// Duty of each pump in the arrangement
    pub per_pump_flow_m3h: f64,
    pub per_pump_head_m: f64,
    pub per_pump_power_cv: f64,
    pub vapor_pressure_mca: f64,
    pub suction_head_loss_m: f64,
    pub npsh_available_mca: f64,
    pub ranking: Vec<PumpCandidate>,
    /// Best-ranked pump whose curve reaches the duty head
    pub recommended: Option<PumpCandidate>,
    pub recommendation_degraded: bool,
    pub selected: Option<SelectedPumpCheck>,
    pub transient: TransientAnalysis,
    pub suggestions: Vec<Suggestion>,
    pub warnings: Vec<Warning>,
}

/// NPSH available (mca).
pub fn npsh_available(atmospheric_mca: f64, suction_height_m: f64, water_temperature_c: f64, suction_loss_m: f64) -> f64 {
    atmospheric_mca - suction_height_m - properties_at(water_temperature_c).vapor_pressure_mca - suction_loss_m
}

/// Pressure-wave celerity (m/s) in a water-filled pipe.
///
/// a = √[(K/ρ) / (1 + (K/E)·(D/e))]
pub fn wave_celerity(bulk_modulus_pa: f64, density: f64, elastic_modulus_pa: f64, internal_mm: f64, wall_mm: f64) -> f64 {
    if density <= 0.0 || elastic_modulus_pa <= 0.0 || wall_mm <= 0.0 {
        return 0.0;
    }
    ((bulk_modulus_pa / density) / (1.0 + (bulk_modulus_pa / elastic_modulus_pa) * (internal_mm / wall_mm))).sqrt()
}

/// Size the lift pump for `daily_demand_l`.
///
/// # Errors
///
/// `InvalidInput` for negative heights or lengths, an efficiency outside
/// (0, 100] %, or zero pumps. `CatalogEntryNotFound` when the selected pump
/// is not in `catalog`.
pub fn size_pump(config: &PumpConfig, daily_demand_l: f64, catalog: &[PumpModel]) -> CalcResult<PumpOutcome> {
    config.validate()?;
    non_negative("daily_demand_l", daily_demand_l)?;

    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    // === Duty point ===
    let operating_hours = if config.operating_hours > 0.0 {
        config.operating_hours
    } else {
        warnings.push(Warning::new(
            WarningCode::DefaultApplied,
            format!("Pump operating hours not set, {} h assumed", DEFAULT_OPERATING_HOURS),
        ));
        DEFAULT_OPERATING_HOURS
    };
    let flow_lps = daily_demand_l / (operating_hours * 3600.0);
    let flow_m3h = CubicMetersPerHour::from(LitersPerSecond(flow_lps)).0;
    let flow_m3s = CubicMetersPerSecond::from(LitersPerSecond(flow_lps)).0;
    if flow_lps <= 0.0 {
        warnings.push(Warning::new(WarningCode::ZeroFlow, "Pump flow is zero: no daily demand"));
    }

    // === Discharge line ===
    let dn = config.nominal_diameter_mm;
    if !config.material.has_size(dn) {
        warnings.push(Warning::new(
            WarningCode::DefaultApplied,
            format!(
                "DN {} is not a {} catalog size; internal diameter taken as 0.9 x DN",
                dn,
                config.material.display_name()
            ),
        ));
    }
    let internal_mm = config.material.internal_diameter_mm(dn);
    let internal_m = internal_mm / 1000.0;
    let (equivalent_length, unmapped) = fittings_equivalent_length(&config.fittings, dn);
    for name in unmapped {
        warnings.push(Warning::new(
            WarningCode::UnmappedFitting,
            format!("Pump discharge: fitting '{}' has no equivalent length and contributes zero", name),
        ));
    }
    let virtual_length = config.real_length_m + equivalent_length;
    let unit_head_loss = hazen_williams(flow_m3s, config.material.hazen_williams_c(), internal_m);
    let discharge_loss = unit_head_loss * virtual_length;
    let geometric = config.suction_height_m + config.discharge_height_m;
    let tdh = geometric + discharge_loss;
    let efficiency = config.efficiency_percent / 100.0;
    let power_cv = flow_lps * tdh / (75.0 * efficiency);

    // === Arrangement ===
    let n = f64::from(config.sharing_pumps());
    let (per_pump_flow_m3h, per_pump_head_m) = match config.arrangement {
        PumpArrangement::Single => (flow_m3h, tdh),
        PumpArrangement::Parallel => (flow_m3h / n, tdh),
        PumpArrangement::Series => (flow_m3h, tdh / n),
    };
    let per_pump_power_cv = power_cv / n;

    // === NPSH ===
    let water = properties_at(config.water_temperature_c);
    let suction_loss = unit_head_loss * config.suction_height_m * SUCTION_LENGTH_FACTOR;
    let npsh_a = npsh_available(
        config.atmospheric_pressure_mca,
        config.suction_height_m,
        config.water_temperature_c,
        suction_loss,
    );

    // === Catalog ranking ===
    let mut ranked: Vec<(PumpCandidate, &PumpModel)> = catalog
        .iter()
        .filter_map(|pump| {
            let (point, distance) = pump.nearest_point(per_pump_flow_m3h, per_pump_head_m)?;
            Some((
                PumpCandidate {
                    name: pump.name.clone(),
                    manufacturer: pump.manufacturer.clone(),
                    flow_m3h: point.flow_m3h,
                    head_mca: point.head_mca,
                    distance,
                    npsh_required_mca: pump.npsh_required_mca,
                    cavitation_risk: npsh_a <= pump.npsh_required_mca,
                },
                pump,
            ))
        })
        .collect();
    ranked.sort_by(|a, b| a.0.distance.total_cmp(&b.0.distance));

    let adequate = ranked
        .iter()
        .find(|(_, pump)| pump.head_at(per_pump_flow_m3h).is_some_and(|h| h >= per_pump_head_m));
    let (recommended, recommendation_degraded) = match (adequate, ranked.first()) {
        (Some((candidate, _)), _) => (Some(candidate.clone()), false),
        (None, Some((candidate, _))) => {
            warnings.push(Warning::new(
                WarningCode::DegradedSelection,
                format!(
                    "No catalog pump reaches {:.2} mca at {:.2} m³/h; closest curve is {}",
                    per_pump_head_m, per_pump_flow_m3h, candidate.name
                ),
            ));
            (Some(candidate.clone()), true)
        }
        (None, None) => (None, false),
    };
    if let Some(candidate) = &recommended {
        suggestions.push(Suggestion::Pump {
            name: candidate.name.clone(),
            manufacturer: candidate.manufacturer.clone(),
        });
    }
    let ranking: Vec<PumpCandidate> = ranked.into_iter().take(RANKED_PUMPS).map(|(c, _)| c).collect();

    // === Selected pump ===
    let selected = match &config.selected_pump {
        Some(name) => {
            let pump = catalog
                .iter()
                .find(|p| &p.name == name)
                .ok_or_else(|| CalcError::catalog_entry_not_found("pump catalog", name.clone()))?;
            let npsh_ok = npsh_a > pump.npsh_required_mca;
            if !npsh_ok {
                warnings.push(Warning::new(
                    WarningCode::CavitationRisk,
                    format!(
                        "{}: NPSH available {:.2} mca does not exceed the required {:.2} mca",
                        pump.name, npsh_a, pump.npsh_required_mca
                    ),
                ));
            }
            Some(SelectedPumpCheck {
                name: pump.name.clone(),
                npsh_required_mca: pump.npsh_required_mca,
                npsh_ok,
            })
        }
        None => None,
    };

    // === Transient ===
    let celerity = wave_celerity(
        water.bulk_modulus_pa,
        water.density,
        config.material.elastic_modulus_pa(),
        internal_mm,
        f64::from(dn) * WALL_THICKNESS_RATIO,
    );
    let v = velocity(CubicMetersPerSecond(flow_m3s), Millimeters(internal_mm).into());
    let critical_time = if celerity > 0.0 { 2.0 * config.real_length_m / celerity } else { 0.0 };
    let rapid_closure = config.valve_closure_time_s <= critical_time;
    let overpressure = if rapid_closure {
        celerity * v / GRAVITY
    } else {
        2.0 * config.real_length_m * v / (GRAVITY * config.valve_closure_time_s)
    };
    let protection_required = overpressure > tdh * TRANSIENT_PROTECTION_RATIO;
    if protection_required {
        warnings.push(Warning::new(
            WarningCode::TransientProtection,
            format!(
                "Water-hammer overpressure {:.2} mca exceeds 40 % of TDH; install an air valve and/or relief valve",
                overpressure
            ),
        ));
    }

    tracing::debug!(flow_lps, tdh, npsh_a, celerity, "pump sized");

    Ok(PumpOutcome {
        operating_hours,
        flow_lps,
        flow_m3h,
        geometric_height_m: geometric,
        internal_diameter_mm: internal_mm,
        equivalent_length_m: equivalent_length,
        virtual_length_m: virtual_length,
        unit_head_loss,
        discharge_head_loss_m: discharge_loss,
        total_dynamic_head_m: tdh,
        power_cv,
        arrangement: config.arrangement,
        pump_count: config.sharing_pumps(),
        per_pump_flow_m3h,
        per_pump_head_m,
        per_pump_power_cv,
        vapor_pressure_mca: water.vapor_pressure_mca,
        suction_head_loss_m: suction_loss,
        npsh_available_mca: npsh_a,
        ranking,
        recommended,
        recommendation_degraded,
        selected,
        transient: TransientAnalysis {
            wave_celerity_mps: celerity,
            critical_time_s: critical_time,
            velocity_mps: v,
            rapid_closure,
            overpressure_mca: overpressure,
            max_pressure_mca: tdh + config.atmospheric_pressure_mca + overpressure,
            protection_required,
        },
        suggestions,
        warnings,
    })
}

impl ReportSection for PumpOutcome {
    fn write_to(&self, report: &mut ModuleReport) {
        report.result("Pump flow", self.flow_lps, "L/s");
        report.result("Total dynamic head", self.total_dynamic_head_m, "mca");
        report.result("Pump power", self.power_cv, "CV");
        report.result("NPSH available", self.npsh_available_mca, "mca");
        if let Some(pump) = &self.recommended {
            report.result("Recommended pump", pump.name.as_str(), "");
        }
        if let Some(check) = &self.selected {
            report.result(
                format!("NPSH status ({})", check.name),
                if check.npsh_ok { "OK" } else { "Cavitation risk" },
                "",
            );
        }
        report.result("Water-hammer overpressure", self.transient.overpressure_mca, "mca");

        report.step(
            format!("Pumping flow ({} h)", self.operating_hours),
            "NBR 5626",
            format!(
                "Q = V / t = {:.0} L / ({} h × 3600) = {:.3} L/s ({:.2} m³/h)",
                self.flow_lps * self.operating_hours * 3600.0,
                self.operating_hours,
                self.flow_lps,
                self.flow_m3h
            ),
        );
        report.step(
            "Discharge head loss (Hazen-Williams)",
            "NBR 5626",
            format!(
                "J = 10.67·Q^1.852 / (C^1.852·D^4.87), D = {:.1} mm\nVirtual length = {:.2} + {:.2} = {:.2} m\nJ = {:.5} m/m, loss = {:.2} mca",
                self.internal_diameter_mm,
                self.virtual_length_m - self.equivalent_length_m,
                self.equivalent_length_m,
                self.virtual_length_m,
                self.unit_head_loss,
                self.discharge_head_loss_m
            ),
        );
        report.step(
            "Total dynamic head",
            "NBR 5626",
            format!(
                "TDH = H_geo + loss = {:.2} + {:.2} = {:.2} mca",
                self.geometric_height_m, self.discharge_head_loss_m, self.total_dynamic_head_m
            ),
        );
        let arrangement = match self.arrangement {
            PumpArrangement::Single => String::new(),
            PumpArrangement::Parallel => format!(
                "\n{} pumps in parallel: {:.2} m³/h at {:.2} mca, {:.2} CV each",
                self.pump_count, self.per_pump_flow_m3h, self.per_pump_head_m, self.per_pump_power_cv
            ),
            PumpArrangement::Series => format!(
                "\n{} pumps in series: {:.2} m³/h at {:.2} mca, {:.2} CV each",
                self.pump_count, self.per_pump_flow_m3h, self.per_pump_head_m, self.per_pump_power_cv
            ),
        };
        report.step(
            "Motor power",
            "",
            format!(
                "P = Q·TDH / (75·η) = {:.3} × {:.2} / 75η = {:.2} CV{}",
                self.flow_lps, self.total_dynamic_head_m, self.power_cv, arrangement
            ),
        );
        report.step(
            "Cavitation check (NPSH)",
            "",
            format!(
                "NPSHa = P_atm − H_suction − P_vapour − loss_suction = {:.2} mca (P_vapour = {:.3} mca, loss = {:.3} mca)",
                self.npsh_available_mca, self.vapor_pressure_mca, self.suction_head_loss_m
            ),
        );
        if !self.ranking.is_empty() {
            let lines: Vec<String> = self
                .ranking
                .iter()
                .map(|c| {
                    format!(
                        "{} ({}): {:.1} m³/h at {:.1} mca, NPSHr {:.1} mca{}",
                        c.name,
                        c.manufacturer,
                        c.flow_m3h,
                        c.head_mca,
                        c.npsh_required_mca,
                        if c.cavitation_risk { " - cavitation risk" } else { "" }
                    )
                })
                .collect();
            report.step("Catalog pumps nearest the duty point", "", lines.join("\n"));
        }
        let t = &self.transient;
        report.step(
            "Water hammer (Joukowsky / Michaud)",
            "",
            format!(
                "a = {:.1} m/s, T_c = 2L/a = {:.2} s, V = {:.2} m/s\n{} closure: ΔH = {:.2} mca, H_max = {:.2} mca{}",
                t.wave_celerity_mps,
                t.critical_time_s,
                t.velocity_mps,
                if t.rapid_closure { "Rapid" } else { "Slow" },
                t.overpressure_mca,
                t.max_pressure_mca,
                if t.protection_required {
                    "\nAir valve and/or relief valve recommended"
                } else {
                    ""
                }
            ),
        );

        report.warnings.extend(self.warnings.iter().cloned());
        report.suggestions.extend(self.suggestions.iter().cloned());
    }
}
