//! # Open-Channel Hydraulics
//!
//! Manning's equation for gutters and for gravity pipes running partially
//! full:
//!
//! ```text
//! Q = A · Rh^(2/3) · S^(1/2) / n        Rh = A / P
//! ```
//!
//! Gutters are checked flowing full. Collector pipes are solved for the water
//! depth that carries a given flow, by bisection on the depth between zero and
//! the depth of maximum discharge (≈ 0.938·D).

use serde::{Deserialize, Serialize};

use crate::errors::{positive, CalcError, CalcResult};
use crate::report::{Warning, WarningCode};
use crate::units::GRAVITY;

/// Depth ratio y/D at which a circular pipe carries its maximum discharge
pub const MAX_DISCHARGE_DEPTH_RATIO: f64 = 0.938;

/// Density of water used for tractive stress (kg/m³)
pub const WATER_DENSITY: f64 = 1000.0;

/// Tractive stress at which a collector is self-cleansing (Pa)
pub const SELF_CLEANSING_STRESS_PA: f64 = 1.0;

/// Manning discharge (m³/s) for a section of area `area` and wetted perimeter
/// `perimeter` on slope `slope` (m/m).
pub fn manning_flow(area: f64, perimeter: f64, slope: f64, n: f64) -> f64 {
    if area <= 0.0 || perimeter <= 0.0 || slope <= 0.0 || n <= 0.0 {
        return 0.0;
    }
    let rh = area / perimeter;
    area * rh.powf(2.0 / 3.0) * slope.sqrt() / n
}

// ============================================================================
// Gutter sections
// ============================================================================

/// Gutter cross-section, evaluated flowing full.
///
/// ## JSON Example
///
/// ```json
/// { "shape": "rectangular", "width_m": 0.3, "height_m": 0.2 }
/// { "shape": "semicircular", "diameter_m": 0.2 }
/// { "shape": "trapezoidal", "top_width_m": 0.3, "bottom_width_m": 0.15, "height_m": 0.2 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum GutterSection {
    Rectangular { width_m: f64, height_m: f64 },
    Semicircular { diameter_m: f64 },
    Trapezoidal { top_width_m: f64, bottom_width_m: f64, height_m: f64 },
}

impl Default for GutterSection {
    fn default() -> Self {
        GutterSection::Rectangular { width_m: 0.3, height_m: 0.2 }
    }
}

impl GutterSection {
    pub fn validate(&self) -> CalcResult<()> {
        match *self {
            GutterSection::Rectangular { width_m, height_m } => {
                positive("width_m", width_m)?;
                positive("height_m", height_m)
            }
            GutterSection::Semicircular { diameter_m } => positive("diameter_m", diameter_m),
            GutterSection::Trapezoidal { top_width_m, bottom_width_m, height_m } => {
                positive("top_width_m", top_width_m)?;
                positive("bottom_width_m", bottom_width_m)?;
                positive("height_m", height_m)
            }
        }
    }

    /// Flow area (m²)
    pub fn area(&self) -> f64 {
        match *self {
            GutterSection::Rectangular { width_m, height_m } => width_m * height_m,
            GutterSection::Semicircular { diameter_m } => {
                let r = diameter_m / 2.0;
                std::f64::consts::PI * r * r / 2.0
            }
            GutterSection::Trapezoidal { top_width_m, bottom_width_m, height_m } => {
                (top_width_m + bottom_width_m) / 2.0 * height_m
            }
        }
    }

    /// Wetted perimeter (m)
    pub fn wetted_perimeter(&self) -> f64 {
        match *self {
            GutterSection::Rectangular { width_m, height_m } => width_m + 2.0 * height_m,
            GutterSection::Semicircular { diameter_m } => std::f64::consts::PI * diameter_m / 2.0,
            GutterSection::Trapezoidal { top_width_m, bottom_width_m, height_m } => {
                let side = ((top_width_m - bottom_width_m) / 2.0).hypot(height_m);
                bottom_width_m + 2.0 * side
            }
        }
    }

    pub fn hydraulic_radius(&self) -> f64 {
        let p = self.wetted_perimeter();
        if p <= 0.0 {
            return 0.0;
        }
        self.area() / p
    }

    /// Full-section capacity (L/s)
    pub fn capacity_lps(&self, slope: f64, n: f64) -> f64 {
        manning_flow(self.area(), self.wetted_perimeter(), slope, n) * 1000.0
    }

    pub fn describe(&self) -> String {
        match *self {
            GutterSection::Rectangular { width_m, height_m } => {
                format!("rectangular {:.2} x {:.2} m", width_m, height_m)
            }
            GutterSection::Semicircular { diameter_m } => format!("semicircular Ø {:.2} m", diameter_m),
            GutterSection::Trapezoidal { top_width_m, bottom_width_m, height_m } => format!(
                "trapezoidal {:.2}/{:.2} x {:.2} m",
                top_width_m, bottom_width_m, height_m
            ),
        }
    }
}

// ============================================================================
// Partially-full circular pipe
// ============================================================================

/// Geometry of a circular pipe of diameter `d` filled to depth `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircularFill {
    /// Central angle subtended by the free surface (rad)
    pub theta: f64,
    pub area_m2: f64,
    pub wetted_perimeter_m: f64,
    pub hydraulic_radius_m: f64,
}

impl CircularFill {
    pub fn at_depth(diameter_m: f64, depth_m: f64) -> Self {
        let ratio = (depth_m / diameter_m).clamp(0.0, 1.0);
        let theta = 2.0 * (1.0 - 2.0 * ratio).acos();
        let area = diameter_m * diameter_m / 8.0 * (theta - theta.sin());
        let perimeter = diameter_m * theta / 2.0;
        let rh = if perimeter > 0.0 { area / perimeter } else { 0.0 };
        CircularFill {
            theta,
            area_m2: area,
            wetted_perimeter_m: perimeter,
            hydraulic_radius_m: rh,
        }
    }

    pub fn flow_m3s(&self, slope: f64, n: f64) -> f64 {
        manning_flow(self.area_m2, self.wetted_perimeter_m, slope, n)
    }
}

/// Convergence controls for the depth solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Stop when the depth bracket is narrower than this (m)
    pub tolerance_m: f64,
    pub max_iterations: u32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            tolerance_m: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Steady uniform flow state of a partially-full collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialFlow {
    pub depth_m: f64,
    /// y / D
    pub depth_ratio: f64,
    pub velocity_mps: f64,
    pub hydraulic_radius_m: f64,
    /// τ = ρ·g·Rh·S (Pa)
    pub tractive_stress_pa: f64,
    pub self_cleansing: bool,
    /// Largest discharge the pipe carries with a free surface (L/s)
    pub max_capacity_lps: f64,
    /// Flow exceeds `max_capacity_lps`; depth is reported at the maximum-discharge depth
    pub capacity_exceeded: bool,
    pub iterations: u32,
    pub converged: bool,
    pub warnings: Vec<Warning>,
}

/// Solve the depth at which a circular pipe carries `flow_lps`.
///
/// Bisection on y ∈ (0, 0.938·D], where discharge increases monotonically
/// with depth.
///
/// # Errors
///
/// `InvalidInput` for a non-positive diameter, slope or roughness.
pub fn solve_partial_flow(
    flow_lps: f64,
    diameter_m: f64,
    slope: f64,
    n: f64,
    settings: SolverSettings,
) -> CalcResult<PartialFlow> {
    positive("diameter_m", diameter_m)?;
    positive("slope", slope)?;
    positive("manning_n", n)?;
    if flow_lps < 0.0 || flow_lps.is_nan() {
        return Err(CalcError::invalid_input("flow_lps", flow_lps.to_string(), "Cannot be negative"));
    }

    let target = flow_lps / 1000.0;
    let y_max = MAX_DISCHARGE_DEPTH_RATIO * diameter_m;
    let q_max = CircularFill::at_depth(diameter_m, y_max).flow_m3s(slope, n);
    let mut warnings = Vec::new();

    if target <= 0.0 {
        return Ok(PartialFlow {
            depth_m: 0.0,
            depth_ratio: 0.0,
            velocity_mps: 0.0,
            hydraulic_radius_m: 0.0,
            tractive_stress_pa: 0.0,
            self_cleansing: false,
            max_capacity_lps: q_max * 1000.0,
            capacity_exceeded: false,
            iterations: 0,
            converged: true,
            warnings: vec![Warning::new(WarningCode::ZeroFlow, "Collector carries no flow")],
        });
    }

    let (depth, iterations, converged, capacity_exceeded) = if target > q_max {
        warnings.push(Warning::new(
            WarningCode::CapacityExceeded,
            format!(
                "{:.2} L/s exceeds the {:.2} L/s free-surface capacity of Ø {:.0} mm",
                flow_lps,
                q_max * 1000.0,
                diameter_m * 1000.0
            ),
        ));
        (y_max, 0, true, true)
    } else {
        let mut lo = 0.0;
        let mut hi = y_max;
        let mut iterations = 0;
        while hi - lo > settings.tolerance_m && iterations < settings.max_iterations {
            let mid = 0.5 * (lo + hi);
            let q = CircularFill::at_depth(diameter_m, mid).flow_m3s(slope, n);
            if q < target {
                lo = mid;
            } else {
                hi = mid;
            }
            iterations += 1;
        }
        let converged = hi - lo <= settings.tolerance_m;
        tracing::trace!(iterations, depth_m = 0.5 * (lo + hi), converged, "collector depth bisection");
        if !converged {
            warnings.push(Warning::new(
                WarningCode::NonConvergence,
                format!(
                    "Depth solver stopped after {} iterations with a {:.2e} m bracket",
                    iterations,
                    hi - lo
                ),
            ));
        }
        (0.5 * (lo + hi), iterations, converged, false)
    };

    let fill = CircularFill::at_depth(diameter_m, depth);
    let velocity = if fill.area_m2 > 0.0 { target / fill.area_m2 } else { 0.0 };
    let tau = WATER_DENSITY * GRAVITY * fill.hydraulic_radius_m * slope;

    Ok(PartialFlow {
        depth_m: depth,
        depth_ratio: depth / diameter_m,
        velocity_mps: velocity,
        hydraulic_radius_m: fill.hydraulic_radius_m,
        tractive_stress_pa: tau,
        self_cleansing: tau >= SELF_CLEANSING_STRESS_PA,
        max_capacity_lps: q_max * 1000.0,
        capacity_exceeded,
        iterations,
        converged,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangular_gutter() {
        let gutter = GutterSection::Rectangular { width_m: 0.3, height_m: 0.2 };
        assert!((gutter.area() - 0.06).abs() < 1e-12);
        assert!((gutter.wetted_perimeter() - 0.7).abs() < 1e-12);

        let rh: f64 = 0.06 / 0.7;
        let expected = 0.06 * rh.powf(2.0 / 3.0) * 0.01f64.sqrt() / 0.009 * 1000.0;
        let capacity = gutter.capacity_lps(0.01, 0.009);
        assert!((capacity - expected).abs() < 1e-9);
        // ≈ 129.6 L/s
        assert!((capacity - 129.6).abs() < 0.5, "capacity = {}", capacity);
    }

    #[test]
    fn test_semicircular_and_trapezoidal() {
        let semi = GutterSection::Semicircular { diameter_m: 0.2 };
        assert!((semi.area() - std::f64::consts::PI * 0.01 / 2.0).abs() < 1e-12);
        assert!((semi.hydraulic_radius() - 0.05).abs() < 1e-12);

        let trap = GutterSection::Trapezoidal { top_width_m: 0.3, bottom_width_m: 0.1, height_m: 0.1 };
        assert!((trap.area() - 0.02).abs() < 1e-12);
        assert!((trap.wetted_perimeter() - (0.1 + 2.0 * 0.02f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_gutter_validation() {
        assert!(GutterSection::Rectangular { width_m: 0.0, height_m: 0.2 }.validate().is_err());
        assert!(GutterSection::default().validate().is_ok());
    }

    #[test]
    fn test_half_full_pipe_geometry() {
        let fill = CircularFill::at_depth(0.1, 0.05);
        assert!((fill.theta - std::f64::consts::PI).abs() < 1e-12);
        assert!((fill.hydraulic_radius_m - 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_partial_flow_matches_target() {
        let result = solve_partial_flow(5.0, 0.15, 0.01, 0.009, SolverSettings::default()).unwrap();
        assert!(result.converged);
        assert!(!result.capacity_exceeded);
        let q = CircularFill::at_depth(0.15, result.depth_m).flow_m3s(0.01, 0.009) * 1000.0;
        assert!((q - 5.0).abs() < 1e-3, "q = {}", q);
        assert!(result.depth_ratio > 0.0 && result.depth_ratio < MAX_DISCHARGE_DEPTH_RATIO);
        assert!(result.self_cleansing);
    }

    #[test]
    fn test_partial_flow_over_capacity() {
        let result = solve_partial_flow(500.0, 0.1, 0.005, 0.009, SolverSettings::default()).unwrap();
        assert!(result.capacity_exceeded);
        assert!((result.depth_ratio - MAX_DISCHARGE_DEPTH_RATIO).abs() < 1e-12);
        assert!(result.warnings.iter().any(|w| w.code == WarningCode::CapacityExceeded));
    }

    #[test]
    fn test_partial_flow_iteration_cap() {
        let settings = SolverSettings { tolerance_m: 1e-12, max_iterations: 3 };
        let result = solve_partial_flow(5.0, 0.15, 0.01, 0.009, settings).unwrap();
        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
        assert!(result.warnings.iter().any(|w| w.code == WarningCode::NonConvergence));
    }

    #[test]
    fn test_partial_flow_zero_and_invalid() {
        let zero = solve_partial_flow(0.0, 0.1, 0.01, 0.009, SolverSettings::default()).unwrap();
        assert_eq!(zero.depth_m, 0.0);
        assert!(solve_partial_flow(1.0, 0.0, 0.01, 0.009, SolverSettings::default()).is_err());
        assert!(solve_partial_flow(1.0, 0.1, 0.0, 0.009, SolverSettings::default()).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn bisection_reproduces_flow(
            diameter in 0.075f64..0.3,
            slope in 0.005f64..0.03,
            fraction in 0.01f64..0.99,
        ) {
            let q_max = CircularFill::at_depth(diameter, MAX_DISCHARGE_DEPTH_RATIO * diameter).flow_m3s(slope, 0.009);
            let flow_lps = fraction * q_max * 1000.0;
            let result = solve_partial_flow(flow_lps, diameter, slope, 0.009, SolverSettings::default()).unwrap();
            prop_assert!(result.converged);
            let q = CircularFill::at_depth(diameter, result.depth_m).flow_m3s(slope, 0.009) * 1000.0;
            prop_assert!((q - flow_lps).abs() / flow_lps < 1e-3);
        }
    }
}
