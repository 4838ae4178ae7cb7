//! # Fuel Gas Module
//!
//! Low-pressure gas network and cylinder shelter per NBR 15526.
//!
//! ## Pole's formula
//!
//! ```text
//! D^5 = Q² · d · L / (K² · ΔP)      K = 0.0011
//!
//! D  internal diameter (mm)
//! Q  flow (m³/h) = accumulated power (kW) / calorific value (kWh/m³)
//! d  relative density of the gas
//! L  segment length (m)
//! ΔP allowed drop (mmH₂O)
//! ```
//!
//! The allowed drop of a path is 10% of the regulator outlet pressure, shared
//! between segments by their length. Power is accumulated from the farthest
//! appliance back toward the meter. The required diameter is rounded to the
//! nearest copper internal diameter and the real drop recomputed for it.

use serde::{Deserialize, Serialize};

use crate::errors::{at_least_one, non_negative, positive, CalcError, CalcResult};
use crate::report::{ModuleReport, ReportSection, Warning, WarningCode};
use crate::tables::catalogs::{
    Cylinder, GasShelter, GAS_SHELTERS, NATURAL_GAS_SHELTER_DIMENSIONS, NATURAL_GAS_SHELTER_VENTILATION,
};
use crate::tables::pipes::PipeMaterial;
use crate::tables::{nearest_by, select_at_least};
use crate::units::MMH2O_PER_MBAR;

/// Pole's coefficient
pub const POLE_K: f64 = 0.0011;

/// Share of the outlet pressure a path may lose
pub const ALLOWED_DROP_RATIO: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GasType {
    #[default]
    Lpg,
    NaturalGas,
}

impl GasType {
    pub fn relative_density(&self) -> f64 {
        match self {
            GasType::Lpg => 1.55,
            GasType::NaturalGas => 0.6,
        }
    }

    /// Volumetric calorific value (kWh/m³)
    pub fn calorific_value(&self) -> f64 {
        match self {
            GasType::Lpg => 28.0,
            GasType::NaturalGas => 9.4,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GasType::Lpg => "LPG",
            GasType::NaturalGas => "Natural gas",
        }
    }
}

/// Pole's required internal diameter (mm).
pub fn pole_diameter_mm(flow_m3h: f64, relative_density: f64, length_m: f64, drop_mmh2o: f64) -> f64 {
    if flow_m3h <= 0.0 || length_m <= 0.0 {
        return 0.0;
    }
    (flow_m3h.powi(2) * relative_density * length_m / (POLE_K.powi(2) * drop_mmh2o)).powf(0.2)
}

/// Pole's pressure drop (mmH₂O) through an internal diameter (mm).
pub fn pole_drop_mmh2o(flow_m3h: f64, relative_density: f64, length_m: f64, diameter_mm: f64) -> f64 {
    if diameter_mm <= 0.0 {
        return 0.0;
    }
    flow_m3h.powi(2) * relative_density * length_m / (POLE_K.powi(2) * diameter_mm.powi(5))
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasSegment {
    pub id: String,
    pub description: String,
    pub length_m: f64,
    /// Rated power of the appliances fed at the end of this segment (kW)
    pub power_kw: f64,
}

/// Segments ordered from the meter or regulator to the farthest appliance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasPath {
    pub id: String,
    pub name: String,
    pub segments: Vec<GasSegment>,
}

impl GasPath {
    pub fn validate(&self) -> CalcResult<()> {
        if self.segments.is_empty() {
            return Err(CalcError::invalid_input("segments", "[]", "A gas path needs at least one segment"));
        }
        for (i, s) in self.segments.iter().enumerate() {
            positive("length_m", s.length_m).map_err(|e| e.within(format!("segments[{}]", i)))?;
            non_negative("power_kw", s.power_kw).map_err(|e| e.within(format!("segments[{}]", i)))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    pub gas_type: GasType,
    /// Regulator outlet pressure (bar)
    pub outlet_pressure_bar: f64,
    pub cylinder: Cylinder,
    pub cylinder_count: u32,
    pub paths: Vec<GasPath>,
}

impl Default for GasConfig {
    fn default() -> Self {
        GasConfig {
            gas_type: GasType::Lpg,
            outlet_pressure_bar: 0.028,
            cylinder: Cylinder::P45,
            cylinder_count: 2,
            paths: vec![GasPath {
                id: "G1".to_string(),
                name: "Main path (heater + stove)".to_string(),
                segments: vec![
                    GasSegment {
                        id: "G1-1".to_string(),
                        description: "Meter to heater".to_string(),
                        length_m: 15.0,
                        power_kw: 25.0,
                    },
                    GasSegment {
                        id: "G1-2".to_string(),
                        description: "Heater to stove".to_string(),
                        length_m: 8.0,
                        power_kw: 11.0,
                    },
                ],
            }],
        }
    }
}

impl GasConfig {
    pub fn validate(&self) -> CalcResult<()> {
        positive("outlet_pressure_bar", self.outlet_pressure_bar)?;
        if self.gas_type == GasType::Lpg {
            at_least_one("cylinder_count", self.cylinder_count)?;
        }
        for (i, path) in self.paths.iter().enumerate() {
            path.validate().map_err(|e| e.within(format!("paths[{}]", i)))?;
        }
        Ok(())
    }

    pub fn outlet_pressure_mmh2o(&self) -> f64 {
        self.outlet_pressure_bar * 1000.0 * MMH2O_PER_MBAR
    }
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasSegmentResult {
    pub id: String,
    pub description: String,
    pub length_m: f64,
    pub power_kw: f64,
    pub accumulated_power_kw: f64,
    pub flow_m3h: f64,
    pub allowed_drop_mmh2o: f64,
    pub required_diameter_mm: f64,
    pub nominal_diameter_mm: u32,
    pub internal_diameter_mm: f64,
    pub pressure_drop_mmh2o: f64,
    /// Drop from the start of the path to the end of this segment
    pub cumulative_drop_mmh2o: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasPathResult {
    pub id: String,
    pub name: String,
    pub segments: Vec<GasSegmentResult>,
    pub total_drop_mmh2o: f64,
    pub allowed_drop_mmh2o: f64,
}

impl GasPathResult {
    pub fn within_allowance(&self) -> bool {
        self.total_drop_mmh2o < self.allowed_drop_mmh2o
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterSizing {
    /// `None` for a natural-gas meter enclosure
    pub cylinder: Option<Cylinder>,
    pub count: u32,
    pub dimensions: String,
    pub ventilation: String,
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasOutcome {
    pub gas_type: GasType,
    pub outlet_pressure_mmh2o: f64,
    pub shelter: ShelterSizing,
    pub paths: Vec<GasPathResult>,
    pub warnings: Vec<Warning>,
}

/// Shelter for a cylinder bank: the listed entry, else the smallest of the
/// same cylinder holding at least `count`, else the largest of that cylinder.
pub fn select_shelter(cylinder: Cylinder, count: u32) -> CalcResult<ShelterSizing> {
    let same: Vec<GasShelter> = GAS_SHELTERS.iter().copied().filter(|s| s.cylinder == cylinder).collect();
    let pick = select_at_least(&same, |s| f64::from(s.count), f64::from(count))
        .ok_or_else(|| CalcError::catalog_entry_not_found("gas shelters", format!("{:?}", cylinder)))?;
    Ok(ShelterSizing {
        cylinder: Some(cylinder),
        count,
        dimensions: pick.value.dimensions.to_string(),
        ventilation: pick.value.ventilation.to_string(),
        degraded: pick.degraded,
    })
}

/// Size one gas path.
pub fn solve_gas_path(path: &GasPath, gas: GasType, outlet_pressure_mmh2o: f64) -> CalcResult<GasPathResult> {
    path.validate()?;
    let allowance = ALLOWED_DROP_RATIO * outlet_pressure_mmh2o;
    let total_length: f64 = path.segments.iter().map(|s| s.length_m).sum();
    let density = gas.relative_density();
    let copper = PipeMaterial::Copper.sizes();

    // Farthest appliance first
    let mut accumulated = 0.0;
    let mut sized: Vec<GasSegmentResult> = Vec::with_capacity(path.segments.len());
    for segment in path.segments.iter().rev() {
        accumulated += segment.power_kw;
        let flow = accumulated / gas.calorific_value();
        let allowed = allowance * segment.length_m / total_length;
        let required = pole_diameter_mm(flow, density, segment.length_m, allowed);
        let size = nearest_by(copper, |s| s.internal_mm, required)
            .ok_or_else(|| CalcError::catalog_entry_not_found("copper sizes", "any"))?;
        let drop = pole_drop_mmh2o(flow, density, segment.length_m, size.internal_mm);
        sized.push(GasSegmentResult {
            id: segment.id.clone(),
            description: segment.description.clone(),
            length_m: segment.length_m,
            power_kw: segment.power_kw,
            accumulated_power_kw: accumulated,
            flow_m3h: flow,
            allowed_drop_mmh2o: allowed,
            required_diameter_mm: required,
            nominal_diameter_mm: size.nominal_mm,
            internal_diameter_mm: size.internal_mm,
            pressure_drop_mmh2o: drop,
            cumulative_drop_mmh2o: 0.0,
        });
    }
    sized.reverse();

    let mut cumulative = 0.0;
    for s in &mut sized {
        cumulative += s.pressure_drop_mmh2o;
        s.cumulative_drop_mmh2o = cumulative;
    }

    Ok(GasPathResult {
        id: path.id.clone(),
        name: path.name.clone(),
        segments: sized,
        total_drop_mmh2o: cumulative,
        allowed_drop_mmh2o: allowance,
    })
}

/// Size the gas network and its shelter.
pub fn calculate(config: &GasConfig) -> CalcResult<GasOutcome> {
    config.validate()?;
    let mut warnings = Vec::new();

    let shelter = match config.gas_type {
        GasType::NaturalGas => ShelterSizing {
            cylinder: None,
            count: 0,
            dimensions: NATURAL_GAS_SHELTER_DIMENSIONS.to_string(),
            ventilation: NATURAL_GAS_SHELTER_VENTILATION.to_string(),
            degraded: false,
        },
        GasType::Lpg => {
            let shelter = select_shelter(config.cylinder, config.cylinder_count)?;
            if shelter.degraded {
                warnings.push(Warning::new(
                    WarningCode::DegradedSelection,
                    format!(
                        "No listed shelter for {} × {:?}; the largest {:?} shelter is shown",
                        config.cylinder_count, config.cylinder, config.cylinder
                    ),
                ));
            }
            shelter
        }
    };

    let outlet = config.outlet_pressure_mmh2o();
    let mut paths = Vec::with_capacity(config.paths.len());
    for (i, path) in config.paths.iter().enumerate() {
        let result = solve_gas_path(path, config.gas_type, outlet).map_err(|e| e.within(format!("paths[{}]", i)))?;
        if result.segments.iter().all(|s| s.flow_m3h == 0.0) {
            warnings.push(Warning::new(
                WarningCode::ZeroFlow,
                format!("Gas path '{}' feeds no appliance power", result.name),
            ));
        }
        if !result.within_allowance() {
            warnings.push(Warning::new(
                WarningCode::MinimumPressureNotMet,
                format!(
                    "Gas path '{}' loses {:.2} mmH₂O, above the {:.2} mmH₂O allowance",
                    result.name, result.total_drop_mmh2o, result.allowed_drop_mmh2o
                ),
            ));
        }
        tracing::debug!(path = %result.id, total_drop = result.total_drop_mmh2o, "gas path sized");
        paths.push(result);
    }

    Ok(GasOutcome {
        gas_type: config.gas_type,
        outlet_pressure_mmh2o: outlet,
        shelter,
        paths,
        warnings,
    })
}

impl ReportSection for GasOutcome {
    fn write_to(&self, report: &mut ModuleReport) {
        report.result("Gas type", self.gas_type.display_name(), "");
        report.result("Shelter dimensions", self.shelter.dimensions.as_str(), "");
        report.result("Shelter ventilation", self.shelter.ventilation.as_str(), "");
        let bank = match self.shelter.cylinder {
            Some(c) => format!("{} × {:?} cylinder(s)", self.shelter.count, c),
            None => "natural-gas meter".to_string(),
        };
        report.step(
            "Gas shelter",
            "NBR 15526",
            format!(
                "For {}: minimum dimensions {}, ventilation {}",
                bank, self.shelter.dimensions, self.shelter.ventilation
            ),
        );

        for path in &self.paths {
            report.result(format!("Pressure drop '{}'", path.name), path.total_drop_mmh2o, "mmH₂O");
            let lines: Vec<String> = path
                .segments
                .iter()
                .map(|s| {
                    format!(
                        "{}: {:.1} kW → Q = {:.3} m³/h, L = {} m, ΔP allowed {:.2} mmH₂O → D = {:.1} mm → DN {} (Øi {} mm), ΔP = {:.2} mmH₂O",
                        s.id,
                        s.accumulated_power_kw,
                        s.flow_m3h,
                        s.length_m,
                        s.allowed_drop_mmh2o,
                        s.required_diameter_mm,
                        s.nominal_diameter_mm,
                        s.internal_diameter_mm,
                        s.pressure_drop_mmh2o
                    )
                })
                .collect();
            report.step(
                format!("Gas path '{}' (Pole)", path.name),
                "NBR 15526",
                format!(
                    "Outlet {:.1} mmH₂O, allowance {:.2} mmH₂O\n{}\nTotal drop {:.2} mmH₂O",
                    self.outlet_pressure_mmh2o,
                    path.allowed_drop_mmh2o,
                    lines.join("\n"),
                    path.total_drop_mmh2o
                ),
            );
        }

        report.warnings.extend(self.warnings.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pole_inverse() {
        let d = pole_diameter_mm(1.5, 1.55, 10.0, 20.0);
        let drop = pole_drop_mmh2o(1.5, 1.55, 10.0, d);
        assert!((drop - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_path() {
        let outcome = calculate(&GasConfig::default()).unwrap();
        let path = &outcome.paths[0];
        // 28 mbar × 10.197 = 285.5 mmH₂O, 10% allowance
        assert!((path.allowed_drop_mmh2o - 28.5516).abs() < 1e-3);

        // power accumulates from the stove back to the meter
        assert_eq!(path.segments[0].accumulated_power_kw, 36.0);
        assert_eq!(path.segments[1].accumulated_power_kw, 11.0);
        assert!((path.segments[0].flow_m3h - 36.0 / 28.0).abs() < 1e-12);

        // Ø 17.7 mm required → copper 22 (19.8 mm); Ø 11.0 mm → copper 15 (13.0 mm)
        assert_eq!(path.segments[0].nominal_diameter_mm, 22);
        assert_eq!(path.segments[1].nominal_diameter_mm, 15);
        assert!(path.within_allowance());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_cumulative_drop_is_monotonic() {
        let outcome = calculate(&GasConfig::default()).unwrap();
        let path = &outcome.paths[0];
        let mut last = 0.0;
        for s in &path.segments {
            assert!(s.cumulative_drop_mmh2o >= last);
            last = s.cumulative_drop_mmh2o;
        }
        assert!((last - path.total_drop_mmh2o).abs() < 1e-12);
    }

    #[test]
    fn test_long_path_exceeds_allowance() {
        let mut config = GasConfig::default();
        config.paths[0].segments[0].length_m = 60.0;
        config.paths[0].segments[0].power_kw = 150.0;
        let outcome = calculate(&config).unwrap();
        assert!(!outcome.paths[0].within_allowance());
        assert!(outcome.warnings.iter().any(|w| w.code == WarningCode::MinimumPressureNotMet));
    }

    #[test]
    fn test_shelters() {
        let exact = select_shelter(Cylinder::P45, 2).unwrap();
        assert_eq!(exact.dimensions, "1.20 x 0.60 x 1.50 m");
        assert!(!exact.degraded);

        let bigger = select_shelter(Cylinder::P45, 3).unwrap();
        assert_eq!(bigger.dimensions, "2.00 x 0.80 x 1.50 m");
        assert!(!bigger.degraded);

        let too_many = select_shelter(Cylinder::P13, 5).unwrap();
        assert_eq!(too_many.dimensions, "1.00 x 0.40 x 0.80 m");
        assert!(too_many.degraded);
    }

    #[test]
    fn test_natural_gas_uses_meter_enclosure() {
        let config = GasConfig {
            gas_type: GasType::NaturalGas,
            cylinder_count: 0,
            ..GasConfig::default()
        };
        let outcome = calculate(&config).unwrap();
        assert_eq!(outcome.shelter.cylinder, None);
        assert_eq!(outcome.shelter.ventilation, NATURAL_GAS_SHELTER_VENTILATION);
        // lower calorific value, more volume for the same power
        assert!((outcome.paths[0].segments[0].flow_m3h - 36.0 / 9.4).abs() < 1e-12);
    }

    #[test]
    fn test_empty_gas_path_rejected() {
        let mut config = GasConfig::default();
        config.paths[0].segments.clear();
        let err = calculate(&config).unwrap_err();
        assert!(err.to_string().contains("paths[0].segments"));
    }
}
