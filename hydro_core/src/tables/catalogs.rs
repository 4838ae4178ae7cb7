//! # Equipment Catalogs
//!
//! Commercial ranges the sizers round up to: water tanks, water meters,
//! clean-water pumps (with performance curves), sewage lift pumps, LPG
//! cylinder shelters and water heaters.
//!
//! Pumps and heaters are user-extensible, so they are owned and
//! serializable and live in the project configuration; the lists here are
//! the defaults.

use serde::{Deserialize, Serialize};

// ============================================================================
// Tanks and water meters
// ============================================================================

/// Commercial water tank capacities (L), ascending
pub const COMMERCIAL_TANKS_L: [f64; 21] = [
    500.0, 750.0, 1000.0, 1500.0, 2000.0, 2500.0, 3000.0, 4000.0, 5000.0, 6000.0, 7500.0, 8000.0, 10000.0,
    12000.0, 15000.0, 16000.0, 20000.0, 25000.0, 30000.0, 40000.0, 50000.0,
];

/// Water meter (hydrometer) model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaterMeter {
    pub name: &'static str,
    /// Nominal flow Qn (m³/h)
    pub nominal_flow_m3h: f64,
    /// Maximum flow Qmax (m³/h)
    pub max_flow_m3h: f64,
    pub nominal_diameter_mm: u32,
}

pub const WATER_METERS: [WaterMeter; 5] = [
    WaterMeter { name: "DN 20 (3/4\")", nominal_flow_m3h: 1.5, max_flow_m3h: 3.0, nominal_diameter_mm: 20 },
    WaterMeter { name: "DN 25 (1\")", nominal_flow_m3h: 2.5, max_flow_m3h: 5.0, nominal_diameter_mm: 25 },
    WaterMeter { name: "DN 32 (1 1/4\")", nominal_flow_m3h: 3.5, max_flow_m3h: 7.0, nominal_diameter_mm: 32 },
    WaterMeter { name: "DN 40 (1 1/2\")", nominal_flow_m3h: 5.0, max_flow_m3h: 10.0, nominal_diameter_mm: 40 },
    WaterMeter { name: "DN 50 (2\")", nominal_flow_m3h: 10.0, max_flow_m3h: 20.0, nominal_diameter_mm: 50 },
];

// ============================================================================
// Clean-water pumps
// ============================================================================

/// One point of a pump performance curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub flow_m3h: f64,
    pub head_mca: f64,
}

/// Centrifugal pump with its performance curve.
///
/// ## JSON Example
///
/// ```json
/// {
///   "name": "Thebe THA-16 (1.5 CV)",
///   "manufacturer": "Thebe",
///   "npsh_required_mca": 3.8,
///   "curve": [{"flow_m3h": 2.0, "head_mca": 32.0}, {"flow_m3h": 4.0, "head_mca": 30.0}]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpModel {
    pub name: String,
    pub manufacturer: String,
    pub npsh_required_mca: f64,
    /// Curve points sorted by ascending flow
    pub curve: Vec<CurvePoint>,
}

impl PumpModel {
    fn new(name: &str, manufacturer: &str, npsh_required_mca: f64, points: &[(f64, f64)]) -> Self {
        PumpModel {
            name: name.to_string(),
            manufacturer: manufacturer.to_string(),
            npsh_required_mca,
            curve: points
                .iter()
                .map(|&(flow_m3h, head_mca)| CurvePoint { flow_m3h, head_mca })
                .collect(),
        }
    }

    /// Curve point closest to the duty point, by Euclidean distance in
    /// (m³/h, mca) space. `None` for an empty curve.
    pub fn nearest_point(&self, flow_m3h: f64, head_mca: f64) -> Option<(CurvePoint, f64)> {
        self.curve
            .iter()
            .map(|p| (*p, (p.flow_m3h - flow_m3h).hypot(p.head_mca - head_mca)))
            .fold(None, |best, candidate| match best {
                Some((_, d)) if d <= candidate.1 => best,
                _ => Some(candidate),
            })
    }

    /// Head delivered at `flow_m3h`, interpolated along the curve.
    /// `None` outside the curve's flow range.
    pub fn head_at(&self, flow_m3h: f64) -> Option<f64> {
        let first = self.curve.first()?;
        if flow_m3h < first.flow_m3h {
            return None;
        }
        if self.curve.len() == 1 {
            return if flow_m3h == first.flow_m3h { Some(first.head_mca) } else { None };
        }
        self.curve.windows(2).find_map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            if flow_m3h >= a.flow_m3h && flow_m3h <= b.flow_m3h && b.flow_m3h > a.flow_m3h {
                let t = (flow_m3h - a.flow_m3h) / (b.flow_m3h - a.flow_m3h);
                Some(a.head_mca + t * (b.head_mca - a.head_mca))
            } else {
                None
            }
        })
    }
}

/// Default pump catalog
pub fn default_pump_catalog() -> Vec<PumpModel> {
    vec![
        PumpModel::new(
            "Dancor Pratika CP-4R (1 CV)",
            "Dancor",
            4.0,
            &[(1.0, 30.0), (2.0, 29.0), (4.0, 26.0), (6.0, 22.0), (8.0, 16.0), (10.0, 8.0)],
        ),
        PumpModel::new(
            "Schneider BC-92S 1CV (1.0 CV)",
            "Schneider",
            4.0,
            &[(1.8, 30.0), (3.6, 28.0), (5.4, 25.0), (7.2, 21.0), (9.0, 15.0)],
        ),
        PumpModel::new(
            "Schneider ME-1620 (2 CV)",
            "Schneider",
            4.5,
            &[(5.0, 35.0), (10.0, 33.0), (15.0, 29.0), (20.0, 22.0), (25.0, 12.0)],
        ),
        PumpModel::new(
            "Thebe THA-16 (1.5 CV)",
            "Thebe",
            3.8,
            &[(2.0, 32.0), (4.0, 30.0), (6.0, 27.0), (8.0, 22.0), (10.0, 15.0)],
        ),
    ]
}

// ============================================================================
// Sewage lift pumps
// ============================================================================

/// Submersible sewage pump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SewagePump {
    pub name: &'static str,
    pub max_flow_lps: f64,
    pub max_head_m: f64,
    /// Largest solid the impeller passes (mm)
    pub solids_passage_mm: f64,
}

/// Sorted by ascending capacity
pub const SEWAGE_PUMPS: [SewagePump; 3] = [
    SewagePump { name: "Schneider BCS-250 (1 CV)", max_flow_lps: 10.0, max_head_m: 12.0, solids_passage_mm: 50.0 },
    SewagePump { name: "Dancor DS-32 (1.5 CV)", max_flow_lps: 15.0, max_head_m: 15.0, solids_passage_mm: 35.0 },
    SewagePump { name: "Thebe THES-16 (2 CV)", max_flow_lps: 20.0, max_head_m: 18.0, solids_passage_mm: 50.0 },
];

// ============================================================================
// Gas shelters
// ============================================================================

/// LPG cylinder size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cylinder {
    P13,
    P45,
    P190,
}

/// Minimum shelter for a cylinder bank (NBR 13523 / NBR 15526).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GasShelter {
    pub cylinder: Cylinder,
    pub count: u32,
    pub dimensions: &'static str,
    pub ventilation: &'static str,
}

/// Sorted by cylinder type, then count
pub const GAS_SHELTERS: [GasShelter; 6] = [
    GasShelter { cylinder: Cylinder::P13, count: 1, dimensions: "0.60 x 0.40 x 0.80 m", ventilation: "Top and bottom (200 cm² each)" },
    GasShelter { cylinder: Cylinder::P13, count: 2, dimensions: "1.00 x 0.40 x 0.80 m", ventilation: "Top and bottom (200 cm² each)" },
    GasShelter { cylinder: Cylinder::P45, count: 1, dimensions: "0.80 x 0.60 x 1.50 m", ventilation: "Top and bottom (400 cm² each)" },
    GasShelter { cylinder: Cylinder::P45, count: 2, dimensions: "1.20 x 0.60 x 1.50 m", ventilation: "Top and bottom (400 cm² each)" },
    GasShelter { cylinder: Cylinder::P45, count: 4, dimensions: "2.00 x 0.80 x 1.50 m", ventilation: "Top and bottom (600 cm² each)" },
    GasShelter { cylinder: Cylinder::P190, count: 2, dimensions: "2.50 x 1.20 x 2.20 m", ventilation: "Per NBR 13523" },
];

/// Natural-gas meter enclosure
pub const NATURAL_GAS_SHELTER_DIMENSIONS: &str = "Per site-specific design and utility standard";
pub const NATURAL_GAS_SHELTER_VENTILATION: &str = "Permanent ventilation";

// ============================================================================
// Water heaters
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaterKind {
    /// Storage (boiler) heater
    Storage,
    /// Instantaneous (tankless) heater
    Instantaneous,
}

/// Water heater model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterHeater {
    pub name: String,
    pub manufacturer: String,
    pub kind: HeaterKind,
    /// Storage volume (L), 0 for instantaneous heaters
    pub volume_l: f64,
    pub power_kw: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tank_catalog_sorted() {
        assert!(COMMERCIAL_TANKS_L.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_nearest_point() {
        let pump = &default_pump_catalog()[0];
        let (point, distance) = pump.nearest_point(4.2, 25.0).unwrap();
        assert_eq!(point.flow_m3h, 4.0);
        assert!((distance - (0.04f64 + 1.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_head_at_interpolates() {
        let pump = &default_pump_catalog()[0];
        assert_eq!(pump.head_at(5.0), Some(24.0));
        assert_eq!(pump.head_at(0.5), None);
        assert_eq!(pump.head_at(12.0), None);
    }

    #[test]
    fn test_empty_curve() {
        let pump = PumpModel::new("None", "", 0.0, &[]);
        assert!(pump.nearest_point(1.0, 1.0).is_none());
        assert!(pump.head_at(1.0).is_none());
    }
}
