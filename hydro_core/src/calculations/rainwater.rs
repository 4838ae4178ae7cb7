//! # Rainwater Drainage Module
//!
//! Roof drainage per NBR 10844: conductor diameters, gutter capacity,
//! partially-full collectors and an optional retention tank.
//!
//! ```text
//! Q [L/s] = I [mm/h] · A [m²] / 3600
//! V [m³]  = I · t [min] · A / 60000
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{non_negative, positive, CalcResult};
use crate::hydraulics::channel::{solve_partial_flow, GutterSection, PartialFlow, SolverSettings};
use crate::report::{ModuleReport, ReportSection, Warning, WarningCode};
use crate::tables::pipes::ChannelMaterial;

/// Vertical conductor DN for a flow per down-pipe (L/s).
pub fn conductor_dn(flow_lps: f64) -> u32 {
    if flow_lps <= 2.22 {
        75
    } else if flow_lps <= 6.84 {
        100
    } else if flow_lps <= 12.5 {
        125
    } else if flow_lps <= 21.0 {
        150
    } else {
        200
    }
}

/// Roof flow (L/s) for an intensity (mm/h) over an area (m²).
pub fn roof_flow_lps(intensity_mm_h: f64, area_m2: f64) -> f64 {
    intensity_mm_h * area_m2 / 3600.0
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureArea {
    pub description: String,
    pub area_m2: f64,
    pub down_pipes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    pub description: String,
    /// Roof area draining to this collector (m²)
    pub area_m2: f64,
    pub length_m: f64,
    pub slope_percent: f64,
    pub diameter_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GutterConfig {
    pub section: GutterSection,
    pub material: ChannelMaterial,
    pub slope_percent: f64,
}

impl Default for GutterConfig {
    fn default() -> Self {
        GutterConfig {
            section: GutterSection::default(),
            material: ChannelMaterial::Pvc,
            slope_percent: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub enabled: bool,
    pub duration_min: f64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        RetentionConfig {
            enabled: false,
            duration_min: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainwaterConfig {
    /// Design rainfall intensity (mm/h)
    pub intensity_mm_h: f64,
    pub areas: Vec<CaptureArea>,
    pub gutter: GutterConfig,
    pub collectors: Vec<CollectorConfig>,
    pub collector_material: ChannelMaterial,
    pub solver: SolverSettings,
    pub retention: RetentionConfig,
}

impl Default for RainwaterConfig {
    fn default() -> Self {
        RainwaterConfig {
            intensity_mm_h: 150.0,
            areas: vec![CaptureArea {
                description: "Main roof".to_string(),
                area_m2: 150.0,
                down_pipes: 2,
            }],
            gutter: GutterConfig::default(),
            collectors: vec![CollectorConfig {
                description: "Main collector".to_string(),
                area_m2: 150.0,
                length_m: 20.0,
                slope_percent: 1.0,
                diameter_mm: 150.0,
            }],
            collector_material: ChannelMaterial::Pvc,
            solver: SolverSettings::default(),
            retention: RetentionConfig::default(),
        }
    }
}

impl RainwaterConfig {
    pub fn validate(&self) -> CalcResult<()> {
        non_negative("intensity_mm_h", self.intensity_mm_h)?;
        for (i, area) in self.areas.iter().enumerate() {
            non_negative("area_m2", area.area_m2).map_err(|e| e.within(format!("areas[{}]", i)))?;
        }
        self.gutter.section.validate().map_err(|e| e.within("gutter.section"))?;
        positive("slope_percent", self.gutter.slope_percent).map_err(|e| e.within("gutter"))?;
        for (i, c) in self.collectors.iter().enumerate() {
            let ctx = format!("collectors[{}]", i);
            non_negative("area_m2", c.area_m2).map_err(|e| e.within(&ctx))?;
            non_negative("length_m", c.length_m).map_err(|e| e.within(&ctx))?;
            positive("slope_percent", c.slope_percent).map_err(|e| e.within(&ctx))?;
            positive("diameter_mm", c.diameter_mm).map_err(|e| e.within(&ctx))?;
        }
        if self.retention.enabled {
            positive("duration_min", self.retention.duration_min).map_err(|e| e.within("retention"))?;
        }
        Ok(())
    }
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSizing {
    pub description: String,
    pub area_m2: f64,
    pub flow_lps: f64,
    pub down_pipes: u32,
    pub flow_per_down_pipe_lps: f64,
    /// None when the area has no down-pipes
    pub conductor_dn: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GutterCheck {
    pub section: GutterSection,
    pub material: ChannelMaterial,
    pub slope_percent: f64,
    pub area_m2: f64,
    pub wetted_perimeter_m: f64,
    pub hydraulic_radius_m: f64,
    pub capacity_lps: f64,
    pub adequate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorSizing {
    pub description: String,
    pub flow_lps: f64,
    pub diameter_mm: f64,
    pub slope_percent: f64,
    pub flow: PartialFlow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionSizing {
    pub duration_min: f64,
    pub volume_m3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainwaterOutcome {
    pub intensity_mm_h: f64,
    pub areas: Vec<AreaSizing>,
    pub total_area_m2: f64,
    pub total_flow_lps: f64,
    pub gutter: GutterCheck,
    pub collectors: Vec<CollectorSizing>,
    pub retention: Option<RetentionSizing>,
    pub warnings: Vec<Warning>,
}

/// Size the rainwater drainage system.
pub fn calculate(config: &RainwaterConfig) -> CalcResult<RainwaterOutcome> {
    config.validate()?;
    let mut warnings = Vec::new();
    let intensity = config.intensity_mm_h;

    // === Conductors ===
    let areas: Vec<AreaSizing> = config
        .areas
        .iter()
        .map(|a| {
            let q = roof_flow_lps(intensity, a.area_m2);
            let (per_pipe, dn) = if a.down_pipes == 0 {
                warnings.push(Warning::new(
                    WarningCode::ZeroFlow,
                    format!("'{}' has no down-pipes; no conductor sized", a.description),
                ));
                (0.0, None)
            } else {
                let per_pipe = q / f64::from(a.down_pipes);
                (per_pipe, Some(conductor_dn(per_pipe)))
            };
            AreaSizing {
                description: a.description.clone(),
                area_m2: a.area_m2,
                flow_lps: q,
                down_pipes: a.down_pipes,
                flow_per_down_pipe_lps: per_pipe,
                conductor_dn: dn,
            }
        })
        .collect();
    let total_area: f64 = areas.iter().map(|a| a.area_m2).sum();
    let total_flow: f64 = areas.iter().map(|a| a.flow_lps).sum();

    // === Gutter ===
    let section = config.gutter.section;
    let capacity = section.capacity_lps(config.gutter.slope_percent / 100.0, config.gutter.material.manning_n());
    let adequate = capacity > total_flow;
    if !adequate {
        warnings.push(Warning::new(
            WarningCode::CapacityExceeded,
            format!(
                "Gutter capacity {:.2} L/s is below the roof flow of {:.2} L/s",
                capacity, total_flow
            ),
        ));
    }
    let gutter = GutterCheck {
        section,
        material: config.gutter.material,
        slope_percent: config.gutter.slope_percent,
        area_m2: section.area(),
        wetted_perimeter_m: section.wetted_perimeter(),
        hydraulic_radius_m: section.hydraulic_radius(),
        capacity_lps: capacity,
        adequate,
    };

    // === Collectors ===
    let n = config.collector_material.manning_n();
    let collectors = config
        .collectors
        .iter()
        .enumerate()
        .map(|(i, c)| -> CalcResult<CollectorSizing> {
            let q = roof_flow_lps(intensity, c.area_m2);
            let flow = solve_partial_flow(q, c.diameter_mm / 1000.0, c.slope_percent / 100.0, n, config.solver)
                .map_err(|e| e.within(format!("collectors[{}]", i)))?;
            warnings.extend(
                flow.warnings
                    .iter()
                    .map(|w| Warning::new(w.code, format!("{}: {}", c.description, w.message))),
            );
            Ok(CollectorSizing {
                description: c.description.clone(),
                flow_lps: q,
                diameter_mm: c.diameter_mm,
                slope_percent: c.slope_percent,
                flow,
            })
        })
        .collect::<CalcResult<Vec<_>>>()?;

    let retention = config.retention.enabled.then(|| RetentionSizing {
        duration_min: config.retention.duration_min,
        volume_m3: intensity * config.retention.duration_min * total_area / 60000.0,
    });

    tracing::debug!(total_flow_lps = total_flow, gutter_capacity_lps = capacity, "rainwater sized");

    Ok(RainwaterOutcome {
        intensity_mm_h: intensity,
        areas,
        total_area_m2: total_area,
        total_flow_lps: total_flow,
        gutter,
        collectors,
        retention,
        warnings,
    })
}

impl ReportSection for RainwaterOutcome {
    fn write_to(&self, report: &mut ModuleReport) {
        report.result("Rainfall intensity", self.intensity_mm_h, "mm/h");
        report.result("Total roof flow", self.total_flow_lps, "L/s");

        for area in &self.areas {
            let sizing = match area.conductor_dn {
                Some(dn) => {
                    report.result(format!("Conductor DN ({})", area.description), dn, "mm");
                    format!(
                        "{} down-pipe(s): {:.2} L/s each, DN {} mm",
                        area.down_pipes, area.flow_per_down_pipe_lps, dn
                    )
                }
                None => {
                    report.result(format!("Conductor DN ({})", area.description), "not sized", "");
                    "No down-pipes: no conductor sized".to_string()
                }
            };
            report.step(
                format!("Conductor for '{}'", area.description),
                "NBR 10844",
                format!(
                    "Q = I × A / 3600 = {} × {} / 3600 = {:.2} L/s\n{}",
                    self.intensity_mm_h, area.area_m2, area.flow_lps, sizing
                ),
            );
        }

        let g = &self.gutter;
        report.result("Gutter capacity", g.capacity_lps, "L/s");
        report.result("Gutter adequate", g.adequate, "");
        report.step(
            "Gutter capacity (Manning)",
            "NBR 10844",
            format!(
                "{} {}, n = {}, S = {}%\nA = {:.4} m², P = {:.3} m, Rh = {:.4} m\nQ = A × Rh^(2/3) × S^(1/2) / n = {:.2} L/s ({} {:.2} L/s)",
                g.material.display_name(),
                g.section.describe(),
                g.material.manning_n(),
                g.slope_percent,
                g.area_m2,
                g.wetted_perimeter_m,
                g.hydraulic_radius_m,
                g.capacity_lps,
                if g.adequate { "OK, above" } else { "insufficient for" },
                self.total_flow_lps
            ),
        );

        for c in &self.collectors {
            report.result(format!("{} depth ratio y/D", c.description), c.flow.depth_ratio, "");
            report.result(format!("{} velocity", c.description), c.flow.velocity_mps, "m/s");
            report.step(
                format!("Collector '{}'", c.description),
                "NBR 10844",
                format!(
                    "Q = {:.2} L/s in Ø {:.0} mm at {}%: y = {:.1} mm (y/D = {:.2}) after {} iterations\nv = {:.2} m/s, Rh = {:.4} m, τ = {:.2} Pa{}",
                    c.flow_lps,
                    c.diameter_mm,
                    c.slope_percent,
                    c.flow.depth_m * 1000.0,
                    c.flow.depth_ratio,
                    c.flow.iterations,
                    c.flow.velocity_mps,
                    c.flow.hydraulic_radius_m,
                    c.flow.tractive_stress_pa,
                    if c.flow.self_cleansing { " (self-cleansing)" } else { "" }
                ),
            );
        }

        if let Some(r) = &self.retention {
            report.result("Retention tank volume", r.volume_m3, "m³");
            report.step(
                "Retention tank",
                "NBR 10844",
                format!(
                    "V = I × t × A / 60000 = {} × {} × {} / 60000 = {:.2} m³",
                    self.intensity_mm_h, r.duration_min, self.total_area_m2, r.volume_m3
                ),
            );
        }

        report.warnings.extend(self.warnings.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{ModuleDetail, ModuleKind};

    #[test]
    fn test_conductor_bands() {
        assert_eq!(conductor_dn(2.22), 75);
        assert_eq!(conductor_dn(3.125), 100);
        assert_eq!(conductor_dn(12.0), 125);
        assert_eq!(conductor_dn(21.0), 150);
        assert_eq!(conductor_dn(25.0), 200);
    }

    #[test]
    fn test_default_roof() {
        let outcome = calculate(&RainwaterConfig::default()).unwrap();
        // 150 mm/h over 150 m² → 6.25 L/s, two down-pipes
        assert!((outcome.total_flow_lps - 6.25).abs() < 1e-12);
        assert!((outcome.areas[0].flow_per_down_pipe_lps - 3.125).abs() < 1e-12);
        assert_eq!(outcome.areas[0].conductor_dn, Some(100));
        assert!((outcome.gutter.capacity_lps - 129.6).abs() < 0.1);
        assert!(outcome.gutter.adequate);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_collector_runs_partially_full() {
        let outcome = calculate(&RainwaterConfig::default()).unwrap();
        let c = &outcome.collectors[0];
        assert!(c.flow.converged);
        assert!(!c.flow.capacity_exceeded);
        assert!(c.flow.depth_ratio > 0.0 && c.flow.depth_ratio < 0.938);
        assert!(c.flow.self_cleansing);
    }

    #[test]
    fn test_undersized_gutter_warns() {
        let config = RainwaterConfig {
            gutter: GutterConfig {
                section: GutterSection::Rectangular { width_m: 0.05, height_m: 0.03 },
                ..GutterConfig::default()
            },
            ..RainwaterConfig::default()
        };
        let outcome = calculate(&config).unwrap();
        assert!(!outcome.gutter.adequate);
        assert!(outcome.warnings.iter().any(|w| w.code == WarningCode::CapacityExceeded));
    }

    #[test]
    fn test_no_down_pipes() {
        let config = RainwaterConfig {
            areas: vec![CaptureArea {
                description: "Balcony".to_string(),
                area_m2: 20.0,
                down_pipes: 0,
            }],
            ..RainwaterConfig::default()
        };
        let outcome = calculate(&config).unwrap();
        assert_eq!(outcome.areas[0].flow_per_down_pipe_lps, 0.0);
        assert_eq!(outcome.areas[0].conductor_dn, None);
        assert!(outcome.warnings.iter().any(|w| w.code == WarningCode::ZeroFlow));

        let mut report = ModuleReport::new(ModuleKind::Rainwater, ModuleDetail::Rainwater(outcome.clone()));
        outcome.write_to(&mut report);
        let dn = report.find_result("Conductor DN (Balcony)").unwrap();
        assert_eq!(dn.value.to_string(), "not sized");
    }

    #[test]
    fn test_retention_volume() {
        let config = RainwaterConfig {
            retention: RetentionConfig { enabled: true, duration_min: 10.0 },
            ..RainwaterConfig::default()
        };
        let outcome = calculate(&config).unwrap();
        // 150 × 10 × 150 / 60000
        assert!((outcome.retention.unwrap().volume_m3 - 3.75).abs() < 1e-12);
    }

    #[test]
    fn test_flat_collector_rejected() {
        let mut config = RainwaterConfig::default();
        config.collectors[0].slope_percent = 0.0;
        let err = calculate(&config).unwrap_err();
        assert!(err.to_string().contains("collectors[0].slope_percent"));
    }
}
