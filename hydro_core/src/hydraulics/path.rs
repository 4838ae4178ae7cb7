//! # Path Hydraulics Solver
//!
//! Walks a path of pipe segments from the source (tank or street main) to the
//! most unfavourable point of use and computes, per segment:
//!
//! 1. Flow from the segment's fixture-weight sum (always recomputed from the
//!    fixture list)
//! 2. Diameter: the smallest catalog size keeping velocity ≤ 3.0 m/s, else the
//!    largest size with the excess-velocity flag set
//! 3. Virtual length = real length + fitting equivalent lengths
//! 4. Head loss from the network's friction law, split into distributed
//!    (real length) and local (fittings) parts
//! 5. Pressure: available = upstream + (start − end elevation),
//!    final = available − head loss
//!
//! The final pressure of one segment is the upstream pressure of the next.
//!
//! ## Assumptions
//!
//! - Water at 20 °C for Darcy-Weisbach friction
//! - A segment with no flow gets velocity 0 and the smallest catalog size of
//!   at least DN 20
//! - Resizing advice (velocity > 2.8 m/s, or < 0.6 m/s with more than 5 mca of
//!   spare pressure) is returned as suggestions and never applied

use serde::{Deserialize, Serialize};

use crate::errors::{non_negative, CalcError, CalcResult};
use crate::hydraulics::flow::{probable_flow_lps, water_weight_sum, FixtureCount};
use crate::hydraulics::head_loss::FrictionMethod;
use crate::report::{Warning, WarningCode};
use crate::tables::fittings::equivalent_length_m;
use crate::tables::fixtures::water_fixture;
use crate::tables::pipes::{PipeMaterial, PipeSize};
use crate::tables::water::{properties_at, WaterProperties, REFERENCE_TEMPERATURE_C};
use crate::tables::Selection;
use crate::units::{velocity, CubicMetersPerSecond, LitersPerSecond, Meters, Millimeters, KPA_PER_MCA};

/// Maximum velocity in pressurised water pipes (m/s)
pub const MAX_VELOCITY_MPS: f64 = 3.0;

/// Velocity above which a larger diameter is advised (m/s)
pub const UPSIZE_ADVICE_MPS: f64 = 2.8;

/// Velocity below which a smaller diameter is advised (m/s)
pub const DOWNSIZE_ADVICE_MPS: f64 = 0.6;

/// Spare pressure required before advising a smaller diameter (mca)
pub const DOWNSIZE_PRESSURE_MARGIN_MCA: f64 = 5.0;

/// Smallest diameter assigned to a segment without flow (mm)
pub const ZERO_FLOW_FLOOR_MM: u32 = 20;

/// A fitting and how many of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittingCount {
    pub name: String,
    pub quantity: u32,
}

impl FittingCount {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        FittingCount {
            name: name.into(),
            quantity,
        }
    }
}

/// One pipe run between two nodes.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": 1,
///   "description": "Tank -> riser",
///   "fixtures": [{"name": "Shower", "quantity": 1}],
///   "real_length_m": 10.0,
///   "start_elevation_m": 10.0,
///   "end_elevation_m": 10.0,
///   "fittings": [{"name": "Elbow 90°", "quantity": 2}],
///   "terminal_fixture": "Shower"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: u32,
    #[serde(default)]
    pub description: String,
    /// Fixtures served downstream of this segment
    #[serde(default)]
    pub fixtures: Vec<FixtureCount>,
    /// Real pipe length (m)
    pub real_length_m: f64,
    /// Elevation at the upstream end (m)
    pub start_elevation_m: f64,
    /// Elevation at the downstream end (m)
    pub end_elevation_m: f64,
    #[serde(default)]
    pub fittings: Vec<FittingCount>,
    /// Fixture whose minimum pressure the segment outlet must meet
    #[serde(default)]
    pub terminal_fixture: String,
}

impl Segment {
    pub fn validate(&self) -> CalcResult<()> {
        non_negative("real_length_m", self.real_length_m)?;
        if !self.start_elevation_m.is_finite() || !self.end_elevation_m.is_finite() {
            return Err(CalcError::invalid_input(
                "start_elevation_m",
                format!("{} / {}", self.start_elevation_m, self.end_elevation_m),
                "Elevations must be finite",
            ));
        }
        Ok(())
    }
}

/// Ordered run of segments from the source to a point of use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub id: u32,
    pub name: String,
    /// Pressure at the start of the first segment (mca)
    pub initial_pressure_mca: f64,
    pub segments: Vec<Segment>,
}

impl Path {
    pub fn validate(&self) -> CalcResult<()> {
        if self.segments.is_empty() {
            return Err(CalcError::invalid_input(
                "segments",
                "[]",
                "A path needs at least one segment",
            ));
        }
        if !self.initial_pressure_mca.is_finite() {
            return Err(CalcError::invalid_input(
                "initial_pressure_mca",
                self.initial_pressure_mca.to_string(),
                "Initial pressure must be finite",
            ));
        }
        for (i, segment) in self.segments.iter().enumerate() {
            segment.validate().map_err(|e| e.within(format!("segments[{}]", i)))?;
        }
        Ok(())
    }
}

/// Pipe material and friction law shared by every path of a network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    pub material: PipeMaterial,
    pub friction: FrictionMethod,
}

impl Default for Network {
    fn default() -> Self {
        Network {
            material: PipeMaterial::Pvc,
            friction: FrictionMethod::HazenWilliams { c: 150.0 },
        }
    }
}

/// Computed state of one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub id: u32,
    pub description: String,
    pub terminal_fixture: String,
    /// ΣP of the segment's fixtures
    pub weight_sum: f64,
    pub flow_lps: f64,
    pub velocity_mps: f64,
    pub nominal_diameter_mm: u32,
    pub internal_diameter_mm: f64,
    pub real_length_m: f64,
    pub equivalent_length_m: f64,
    pub virtual_length_m: f64,
    /// J (m/m)
    pub unit_head_loss: f64,
    pub distributed_head_loss_m: f64,
    pub local_head_loss_m: f64,
    pub total_head_loss_m: f64,
    pub cumulative_head_loss_m: f64,
    /// Start minus end elevation (m); positive when descending
    pub elevation_delta_m: f64,
    pub available_pressure_mca: f64,
    pub final_pressure_mca: f64,
    pub final_pressure_kpa: f64,
    pub minimum_pressure_mca: f64,
    pub minimum_pressure_met: bool,
    pub velocity_exceeded: bool,
}

/// Resizing advice for one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiameterAdvice {
    pub segment_id: u32,
    pub description: String,
    pub new_nominal_diameter_mm: u32,
    pub justification: String,
}

/// Solved path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    pub id: u32,
    pub name: String,
    pub initial_pressure_mca: f64,
    pub segments: Vec<SegmentResult>,
    pub total_head_loss_m: f64,
    pub suggestions: Vec<DiameterAdvice>,
    pub warnings: Vec<Warning>,
}

impl PathResult {
    /// Pressure at the end of the last segment
    pub fn final_pressure_mca(&self) -> f64 {
        self.segments
            .last()
            .map(|s| s.final_pressure_mca)
            .unwrap_or(self.initial_pressure_mca)
    }

    pub fn all_minimum_pressures_met(&self) -> bool {
        self.segments.iter().all(|s| s.minimum_pressure_met)
    }

    pub fn max_velocity_mps(&self) -> f64 {
        self.segments.iter().map(|s| s.velocity_mps).fold(0.0, f64::max)
    }
}

/// Diameter picked for a flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiameterChoice {
    pub size: PipeSize,
    pub velocity_mps: f64,
}

/// Smallest catalog size of `material` with velocity ≤ `max_velocity`.
///
/// Degraded (largest size) when no size satisfies the limit. Zero flow picks
/// the smallest size of at least DN 20.
pub fn select_diameter(material: PipeMaterial, flow_lps: f64, max_velocity: f64) -> CalcResult<Selection<DiameterChoice>> {
    let sizes = material.sizes();
    let largest = *sizes
        .last()
        .ok_or_else(|| CalcError::catalog_entry_not_found("pipe sizes", material.display_name()))?;

    if flow_lps <= 0.0 {
        let size = sizes
            .iter()
            .copied()
            .find(|s| s.nominal_mm >= ZERO_FLOW_FLOOR_MM)
            .unwrap_or(largest);
        return Ok(Selection::exact(DiameterChoice { size, velocity_mps: 0.0 }));
    }

    let q: CubicMetersPerSecond = LitersPerSecond(flow_lps).into();
    for size in sizes {
        let v = velocity(q, Millimeters(size.internal_mm).into());
        if v <= max_velocity {
            return Ok(Selection::exact(DiameterChoice { size: *size, velocity_mps: v }));
        }
    }
    let v = velocity(q, Millimeters(largest.internal_mm).into());
    Ok(Selection::degraded(DiameterChoice { size: largest, velocity_mps: v }))
}

/// Σ equivalent length (m) of a fitting list at DN `nominal_mm`, plus the
/// names that were not found.
pub fn fittings_equivalent_length(fittings: &[FittingCount], nominal_mm: u32) -> (f64, Vec<String>) {
    let mut total = 0.0;
    let mut unmapped = Vec::new();
    for fitting in fittings {
        match equivalent_length_m(&fitting.name, nominal_mm) {
            Some(le) => total += le * f64::from(fitting.quantity),
            None => {
                if !unmapped.contains(&fitting.name) {
                    unmapped.push(fitting.name.clone());
                }
            }
        }
    }
    (total, unmapped)
}

/// Solve every segment of `path` on `network`.
///
/// # Errors
///
/// `InvalidInput` for an empty path or a negative length.
pub fn solve_path(path: &Path, network: &Network) -> CalcResult<PathResult> {
    path.validate()?;
    network.friction.validate()?;

    let water = properties_at(REFERENCE_TEMPERATURE_C);
    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();
    let mut segments = Vec::with_capacity(path.segments.len());
    let mut upstream_pressure = path.initial_pressure_mca;
    let mut cumulative = 0.0;

    for segment in &path.segments {
        let context = format!("Path '{}', segment {}", path.name, segment.id);
        let result = solve_segment(segment, network, &water, upstream_pressure, cumulative, &context, &mut warnings)?;

        if let Some(advice) = advise(&result, network.material) {
            suggestions.push(advice);
        }

        upstream_pressure = result.final_pressure_mca;
        cumulative = result.cumulative_head_loss_m;
        segments.push(result);
    }

    tracing::debug!(
        path = %path.name,
        segments = segments.len(),
        total_head_loss_m = cumulative,
        "path solved"
    );

    Ok(PathResult {
        id: path.id,
        name: path.name.clone(),
        initial_pressure_mca: path.initial_pressure_mca,
        segments,
        total_head_loss_m: cumulative,
        suggestions,
        warnings,
    })
}

fn solve_segment(
    segment: &Segment,
    network: &Network,
    water: &WaterProperties,
    upstream_pressure: f64,
    cumulative_before: f64,
    context: &str,
    warnings: &mut Vec<Warning>,
) -> CalcResult<SegmentResult> {
    // === Flow ===
    let weights = water_weight_sum(&segment.fixtures);
    warnings.extend(weights.warnings(context));
    let flow_lps = probable_flow_lps(weights.total);
    if flow_lps <= 0.0 {
        warnings.push(Warning::new(
            WarningCode::ZeroFlow,
            format!("{}: no fixture load, velocity set to 0", context),
        ));
    }

    // === Diameter ===
    let choice = select_diameter(network.material, flow_lps, MAX_VELOCITY_MPS)?;
    if choice.degraded {
        warnings.push(Warning::new(
            WarningCode::ExcessVelocity,
            format!(
                "{}: {:.2} m/s exceeds {} m/s even at the largest {} size (DN {})",
                context,
                choice.value.velocity_mps,
                MAX_VELOCITY_MPS,
                network.material.display_name(),
                choice.value.size.nominal_mm
            ),
        ));
    }
    let DiameterChoice { size, velocity_mps } = choice.value;

    // === Lengths ===
    let (equivalent_length, unmapped) = fittings_equivalent_length(&segment.fittings, size.nominal_mm);
    for name in unmapped {
        warnings.push(Warning::new(
            WarningCode::UnmappedFitting,
            format!("{}: fitting '{}' has no equivalent length and contributes zero", context, name),
        ));
    }
    let virtual_length = segment.real_length_m + equivalent_length;

    // === Head loss ===
    let q: CubicMetersPerSecond = LitersPerSecond(flow_lps).into();
    let d: Meters = Millimeters(size.internal_mm).into();
    let unit_head_loss = network.friction.unit_loss(q.0, d.0, water);
    let distributed = unit_head_loss * segment.real_length_m;
    let local = unit_head_loss * equivalent_length;
    let total = distributed + local;
    let cumulative = cumulative_before + total;

    // === Pressure ===
    let elevation_delta = segment.start_elevation_m - segment.end_elevation_m;
    let available = upstream_pressure + elevation_delta;
    let final_pressure = available - total;

    let minimum_pressure = terminal_minimum_pressure(&segment.terminal_fixture, context, warnings);
    let minimum_pressure_met = final_pressure >= minimum_pressure;
    if !minimum_pressure_met {
        warnings.push(Warning::new(
            WarningCode::MinimumPressureNotMet,
            format!(
                "{}: {:.2} mca at the outlet is below the {:.2} mca required by '{}'",
                context, final_pressure, minimum_pressure, segment.terminal_fixture
            ),
        ));
    }

    Ok(SegmentResult {
        id: segment.id,
        description: segment.description.clone(),
        terminal_fixture: segment.terminal_fixture.clone(),
        weight_sum: weights.total,
        flow_lps,
        velocity_mps,
        nominal_diameter_mm: size.nominal_mm,
        internal_diameter_mm: size.internal_mm,
        real_length_m: segment.real_length_m,
        equivalent_length_m: equivalent_length,
        virtual_length_m: virtual_length,
        unit_head_loss,
        distributed_head_loss_m: distributed,
        local_head_loss_m: local,
        total_head_loss_m: total,
        cumulative_head_loss_m: cumulative,
        elevation_delta_m: elevation_delta,
        available_pressure_mca: available,
        final_pressure_mca: final_pressure,
        final_pressure_kpa: final_pressure * KPA_PER_MCA,
        minimum_pressure_mca: minimum_pressure,
        minimum_pressure_met,
        velocity_exceeded: choice.degraded,
    })
}

fn terminal_minimum_pressure(name: &str, context: &str, warnings: &mut Vec<Warning>) -> f64 {
    if name.is_empty() {
        return 0.0;
    }
    match water_fixture(name) {
        Some(fixture) => fixture.minimum_pressure_mca,
        None => {
            warnings.push(Warning::new(
                WarningCode::UnmappedFixture,
                format!("{}: terminal fixture '{}' has no minimum pressure, 0 mca assumed", context, name),
            ));
            0.0
        }
    }
}

fn advise(segment: &SegmentResult, material: PipeMaterial) -> Option<DiameterAdvice> {
    if segment.flow_lps <= 0.0 {
        return None;
    }
    if segment.velocity_mps > UPSIZE_ADVICE_MPS {
        let larger = material.next_larger(segment.nominal_diameter_mm)?;
        return Some(DiameterAdvice {
            segment_id: segment.id,
            description: segment.description.clone(),
            new_nominal_diameter_mm: larger.nominal_mm,
            justification: format!(
                "Velocity {:.2} m/s is close to the {} m/s limit; DN {} lowers noise and head loss",
                segment.velocity_mps, MAX_VELOCITY_MPS, larger.nominal_mm
            ),
        });
    }
    if segment.velocity_mps < DOWNSIZE_ADVICE_MPS
        && segment.final_pressure_mca > segment.minimum_pressure_mca + DOWNSIZE_PRESSURE_MARGIN_MCA
    {
        let smaller = material.next_smaller(segment.nominal_diameter_mm)?;
        return Some(DiameterAdvice {
            segment_id: segment.id,
            description: segment.description.clone(),
            new_nominal_diameter_mm: smaller.nominal_mm,
            justification: format!(
                "Velocity {:.2} m/s is low and {:.2} mca is available; DN {} may reduce cost",
                segment.velocity_mps, segment.final_pressure_mca, smaller.nominal_mm
            ),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(id: u32, fixtures: Vec<FixtureCount>, length: f64, z0: f64, z1: f64) -> Segment {
        Segment {
            id,
            description: format!("S{}", id),
            fixtures,
            real_length_m: length,
            start_elevation_m: z0,
            end_elevation_m: z1,
            fittings: vec![FittingCount::new("Elbow 90°", 2)],
            terminal_fixture: "Shower".to_string(),
        }
    }

    fn test_path() -> Path {
        Path {
            id: 1,
            name: "Top-floor shower".to_string(),
            initial_pressure_mca: 2.0,
            segments: vec![
                segment(
                    1,
                    vec![FixtureCount::new("Shower", 4), FixtureCount::new("WC flush tank", 4)],
                    10.0,
                    10.0,
                    10.0,
                ),
                segment(2, vec![FixtureCount::new("Shower", 2)], 12.0, 10.0, -2.0),
                segment(3, vec![FixtureCount::new("Shower", 1)], 5.0, -2.0, -1.5),
            ],
        }
    }

    #[test]
    fn test_solve_path_pressure_chain() {
        let result = solve_path(&test_path(), &Network::default()).unwrap();
        assert_eq!(result.segments.len(), 3);

        let mut upstream = 2.0;
        for s in &result.segments {
            let expected = upstream + s.elevation_delta_m - s.total_head_loss_m;
            assert!((s.final_pressure_mca - expected).abs() < 1e-9);
            upstream = s.final_pressure_mca;
        }
        assert!((result.total_head_loss_m - result.segments[2].cumulative_head_loss_m).abs() < 1e-12);
    }

    #[test]
    fn test_segment_flow_and_diameter() {
        let result = solve_path(&test_path(), &Network::default()).unwrap();
        let first = &result.segments[0];
        // ΣP = 4 x 0.4 + 4 x 0.3 = 2.8
        assert!((first.weight_sum - 2.8).abs() < 1e-12);
        assert!((first.flow_lps - 0.3 * 2.8f64.sqrt()).abs() < 1e-12);
        // 0.502 L/s fits DN 20 PVC (18.4 mm) at 1.89 m/s
        assert_eq!(first.nominal_diameter_mm, 20);
        assert!(first.velocity_mps <= MAX_VELOCITY_MPS);
        assert!((first.virtual_length_m - (10.0 + 2.0 * 0.7)).abs() < 1e-12);
    }

    #[test]
    fn test_head_loss_split_is_proportional() {
        let result = solve_path(&test_path(), &Network::default()).unwrap();
        let s = &result.segments[0];
        let ratio = s.distributed_head_loss_m / s.total_head_loss_m;
        assert!((ratio - s.real_length_m / s.virtual_length_m).abs() < 1e-12);
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let mut path = test_path();
        path.segments.clear();
        assert!(solve_path(&path, &Network::default()).is_err());
    }

    #[test]
    fn test_negative_length_is_rejected_with_field_path() {
        let mut path = test_path();
        path.segments[1].real_length_m = -3.0;
        match solve_path(&path, &Network::default()) {
            Err(CalcError::InvalidInput { field, .. }) => assert_eq!(field, "segments[1].real_length_m"),
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_flow_segment() {
        let mut path = test_path();
        path.segments[2].fixtures.clear();
        let result = solve_path(&path, &Network { material: PipeMaterial::Ppr, ..Network::default() }).unwrap();
        let s = &result.segments[2];
        assert_eq!(s.flow_lps, 0.0);
        assert_eq!(s.velocity_mps, 0.0);
        assert_eq!(s.nominal_diameter_mm, 20);
        assert_eq!(s.total_head_loss_m, 0.0);
        assert!(result.warnings.iter().any(|w| w.code == WarningCode::ZeroFlow));
    }

    #[test]
    fn test_excess_velocity_takes_largest() {
        // 5 L/s through PPR DN 50 (40.8 mm) runs at 3.8 m/s
        let choice = select_diameter(PipeMaterial::Ppr, 5.0, MAX_VELOCITY_MPS).unwrap();
        assert!(choice.degraded);
        assert_eq!(choice.value.size.nominal_mm, 50);
        assert!(choice.value.velocity_mps > MAX_VELOCITY_MPS);
    }

    #[test]
    fn test_unmapped_names_warn() {
        let mut path = test_path();
        path.segments[0].fittings.push(FittingCount::new("Mystery valve", 1));
        path.segments[0].fixtures.push(FixtureCount::new("Mystery tap", 1));
        let result = solve_path(&path, &Network::default()).unwrap();
        assert!(result.warnings.iter().any(|w| w.code == WarningCode::UnmappedFitting));
        assert!(result.warnings.iter().any(|w| w.code == WarningCode::UnmappedFixture));
    }

    #[test]
    fn test_minimum_pressure_flag() {
        let mut path = test_path();
        path.initial_pressure_mca = 0.0;
        path.segments[1].end_elevation_m = 10.0;
        path.segments[2].start_elevation_m = 10.0;
        path.segments[2].end_elevation_m = 10.0;
        let result = solve_path(&path, &Network::default()).unwrap();
        assert!(!result.all_minimum_pressures_met());
        assert!(result.warnings.iter().any(|w| w.code == WarningCode::MinimumPressureNotMet));
    }

    fn single_segment_path(fixture: &str, quantity: u32, pressure: f64) -> Path {
        Path {
            id: 7,
            name: "Single".to_string(),
            initial_pressure_mca: pressure,
            segments: vec![Segment {
                id: 1,
                description: "Branch".to_string(),
                fixtures: vec![FixtureCount::new(fixture, quantity)],
                real_length_m: 5.0,
                start_elevation_m: 0.0,
                end_elevation_m: 0.0,
                fittings: vec![],
                terminal_fixture: fixture.to_string(),
            }],
        }
    }

    #[test]
    fn test_upsize_advice_near_velocity_limit() {
        // ΣP = 6.4, Q = 0.759 L/s, 2.85 m/s in PVC DN 20
        let result = solve_path(&single_segment_path("WC flush valve", 2, 30.0), &Network::default()).unwrap();
        assert_eq!(result.segments[0].nominal_diameter_mm, 20);
        assert!(result.segments[0].velocity_mps > UPSIZE_ADVICE_MPS);
        assert_eq!(result.suggestions.len(), 1);
        assert_eq!(result.suggestions[0].new_nominal_diameter_mm, 25);
    }

    #[test]
    fn test_low_velocity_without_smaller_size_gives_no_advice() {
        // 0.134 L/s in PVC DN 20 is slow, but PVC has nothing below DN 20
        let path = single_segment_path("Garden faucet", 1, 30.0);
        let pvc = solve_path(&path, &Network::default()).unwrap();
        assert!(pvc.segments[0].velocity_mps < DOWNSIZE_ADVICE_MPS);
        assert!(pvc.suggestions.is_empty());

        let ppr = solve_path(&path, &Network { material: PipeMaterial::Ppr, ..Network::default() }).unwrap();
        assert_eq!(ppr.segments[0].nominal_diameter_mm, 15);
    }

    #[test]
    fn test_darcy_network() {
        let network = Network {
            material: PipeMaterial::Pvc,
            friction: FrictionMethod::DarcyWeisbach { roughness_m: 1.5e-6 },
        };
        let result = solve_path(&test_path(), &network).unwrap();
        assert!(result.total_head_loss_m > 0.0);
    }

    #[test]
    fn test_deterministic() {
        let a = solve_path(&test_path(), &Network::default()).unwrap();
        let b = solve_path(&test_path(), &Network::default()).unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn material() -> impl Strategy<Value = PipeMaterial> {
        prop::sample::select(PipeMaterial::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn velocity_bound_or_flagged(material in material(), flow in 0.0f64..20.0) {
            let choice = select_diameter(material, flow, MAX_VELOCITY_MPS).unwrap();
            if choice.degraded {
                prop_assert_eq!(Some(choice.value.size), material.sizes().last().copied());
            } else {
                prop_assert!(choice.value.velocity_mps <= MAX_VELOCITY_MPS);
                // smallest such size: the next smaller one would be too fast
                if flow > 0.0 {
                    if let Some(smaller) = material.next_smaller(choice.value.size.nominal_mm) {
                        let q: CubicMetersPerSecond = LitersPerSecond(flow).into();
                        prop_assert!(velocity(q, Millimeters(smaller.internal_mm).into()) > MAX_VELOCITY_MPS);
                    }
                }
            }
        }

        #[test]
        fn cumulative_loss_non_decreasing(
            lengths in prop::collection::vec(0.0f64..40.0, 1..6),
            showers in prop::collection::vec(0u32..12, 1..6),
        ) {
            let segments: Vec<Segment> = lengths
                .iter()
                .zip(showers.iter().cycle())
                .enumerate()
                .map(|(i, (len, n))| Segment {
                    id: i as u32 + 1,
                    description: String::new(),
                    fixtures: vec![FixtureCount::new("Shower", *n)],
                    real_length_m: *len,
                    start_elevation_m: 0.0,
                    end_elevation_m: 0.0,
                    fittings: vec![FittingCount::new("Tee 90° side outlet", 1)],
                    terminal_fixture: "Shower".to_string(),
                })
                .collect();
            let path = Path { id: 1, name: "p".to_string(), initial_pressure_mca: 10.0, segments };
            let result = solve_path(&path, &Network::default()).unwrap();
            let mut previous = 0.0;
            for s in &result.segments {
                prop_assert!(s.cumulative_head_loss_m >= previous);
                previous = s.cumulative_head_loss_m;
            }
            let sum: f64 = result.segments.iter().map(|s| s.total_head_loss_m).sum();
            prop_assert!((sum - result.total_head_loss_m).abs() < 1e-9);
        }
    }
}
