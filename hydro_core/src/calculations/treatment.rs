//! # On-Site Sewage Treatment
//!
//! Septic tank (NBR 7229), anaerobic filter and final disposal (NBR 13969).
//!
//! ## Formulas
//!
//! ```text
//! Septic tank:      V = 1000 + N·(C·T + K)          [L]
//! Anaerobic filter: V = 1.6·N·C                     [L]
//! Infiltration:     A = N·C / Ta                    [m²]
//! Drying bed:       A = 0.08·N                      [m²]
//! ```
//!
//! `N` contributors, `C` contribution (L/person·day), `T` detention time
//! (days), `K` sludge accumulation for the cleaning interval, `Ta` soil
//! application rate (L/m²·day).

use serde::{Deserialize, Serialize};

use crate::errors::{at_least_one, non_negative, positive, CalcResult};
use crate::report::{ModuleReport, ReportSection, Warning, WarningCode};

/// Sludge accumulation K (L/person) for cleaning intervals of 1 to 5 years
pub const SLUDGE_ACCUMULATION: [f64; 5] = [94.0, 134.0, 174.0, 214.0, 254.0];

pub const SEPTIC_MIN_DEPTH_M: f64 = 1.2;
pub const SEPTIC_MAX_DEPTH_M: f64 = 2.2;
pub const SEPTIC_MIN_WIDTH_M: f64 = 0.8;
pub const SEPTIC_MIN_LENGTH_M: f64 = 1.0;

/// Useful height of the anaerobic filter bed (m)
pub const FILTER_HEIGHT_M: f64 = 1.2;

pub const SOAKAWAY_DIAMETER_M: f64 = 1.5;
pub const SOAKAWAY_MIN_HEIGHT_M: f64 = 1.0;

/// Drying bed area per contributor (m²)
pub const DRYING_BED_AREA_PER_PERSON: f64 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposal {
    /// Infiltration pit
    #[default]
    Soakaway,
    /// Infiltration trench
    Trench,
}

/// Treatment chain input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreatmentConfig {
    pub enabled: bool,
    /// Sewage contribution C (L/person·day)
    pub contribution_lpd: f64,
    /// Years between septic tank cleanings; clamped to 1..=5
    pub cleaning_interval_years: u32,
    /// Soil application rate (L/m²·day)
    pub infiltration_rate: f64,
    pub septic_tank_count: u32,
    pub filter_count: u32,
    pub soakaway_count: u32,
    pub disposal: Disposal,
    pub trench_width_m: f64,
    pub drying_bed: bool,
}

impl Default for TreatmentConfig {
    fn default() -> Self {
        TreatmentConfig {
            enabled: false,
            contribution_lpd: 120.0,
            cleaning_interval_years: 1,
            infiltration_rate: 50.0,
            septic_tank_count: 1,
            filter_count: 1,
            soakaway_count: 1,
            disposal: Disposal::Soakaway,
            trench_width_m: 0.5,
            drying_bed: false,
        }
    }
}

impl TreatmentConfig {
    pub fn validate(&self) -> CalcResult<()> {
        non_negative("contribution_lpd", self.contribution_lpd)?;
        non_negative("infiltration_rate", self.infiltration_rate)?;
        at_least_one("septic_tank_count", self.septic_tank_count)?;
        at_least_one("filter_count", self.filter_count)?;
        if self.disposal == Disposal::Soakaway {
            at_least_one("soakaway_count", self.soakaway_count)?;
        } else {
            positive("trench_width_m", self.trench_width_m)?;
        }
        Ok(())
    }

    /// Cleaning interval clamped to the tabulated range
    pub fn effective_interval(&self) -> u32 {
        self.cleaning_interval_years.clamp(1, 5)
    }
}

/// Septic tank detention time T (days) for a contribution C (L/person·day).
pub fn detention_days(contribution_lpd: f64) -> f64 {
    if contribution_lpd <= 100.0 {
        1.0
    } else {
        (1.0 - 0.0004 * (contribution_lpd - 100.0)).max(0.5)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SepticTank {
    pub detention_days: f64,
    pub sludge_rate: f64,
    pub cleaning_interval_years: u32,
    pub total_volume_l: f64,
    pub count: u32,
    pub unit_volume_m3: f64,
    pub length_m: f64,
    pub width_m: f64,
    pub depth_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnaerobicFilter {
    pub total_volume_l: f64,
    pub count: u32,
    pub unit_volume_m3: f64,
    pub diameter_m: f64,
    pub height_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisposalSizing {
    Soakaway {
        count: u32,
        unit_area_m2: f64,
        diameter_m: f64,
        bottom_area_m2: f64,
        height_m: f64,
    },
    Trench {
        width_m: f64,
        length_m: f64,
    },
}

/// Sized treatment chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentOutcome {
    pub contributors: u32,
    pub contribution_lpd: f64,
    pub septic_tank: SepticTank,
    pub filter: AnaerobicFilter,
    pub infiltration_rate: f64,
    pub infiltration_area_m2: f64,
    pub disposal: DisposalSizing,
    pub drying_bed_area_m2: Option<f64>,
    pub warnings: Vec<Warning>,
}

/// Size septic tank, filter and disposal for `contributors` people.
pub fn size_treatment(config: &TreatmentConfig, contributors: u32) -> CalcResult<TreatmentOutcome> {
    config.validate()?;
    let n = f64::from(contributors);
    let c = config.contribution_lpd;
    let mut warnings = Vec::new();

    // === Septic tank ===
    let interval = config.effective_interval();
    let k = SLUDGE_ACCUMULATION[(interval - 1) as usize];
    let t = detention_days(c);
    let septic_total = 1000.0 + n * (c * t + k);
    let septic_unit_m3 = septic_total / f64::from(config.septic_tank_count) / 1000.0;
    let depth = (septic_unit_m3 * 0.4).clamp(SEPTIC_MIN_DEPTH_M, SEPTIC_MAX_DEPTH_M);
    let width = (septic_unit_m3 / depth / 2.0).sqrt().max(SEPTIC_MIN_WIDTH_M);
    let septic_tank = SepticTank {
        detention_days: t,
        sludge_rate: k,
        cleaning_interval_years: interval,
        total_volume_l: septic_total,
        count: config.septic_tank_count,
        unit_volume_m3: septic_unit_m3,
        length_m: (2.0 * width).max(SEPTIC_MIN_LENGTH_M),
        width_m: width,
        depth_m: depth,
    };

    // === Anaerobic filter ===
    let filter_total = 1.6 * n * c;
    let filter_unit_m3 = filter_total / f64::from(config.filter_count) / 1000.0;
    let filter_area = filter_unit_m3 / FILTER_HEIGHT_M;
    let filter = AnaerobicFilter {
        total_volume_l: filter_total,
        count: config.filter_count,
        unit_volume_m3: filter_unit_m3,
        diameter_m: (4.0 * filter_area / std::f64::consts::PI).sqrt(),
        height_m: FILTER_HEIGHT_M,
    };

    // === Final disposal ===
    let infiltration_area = if config.infiltration_rate > 0.0 {
        n * c / config.infiltration_rate
    } else {
        warnings.push(Warning::new(
            WarningCode::ZeroFlow,
            "Soil infiltration rate is zero; infiltration area not computed",
        ));
        0.0
    };
    let disposal = match config.disposal {
        Disposal::Soakaway => {
            let unit_area = infiltration_area / f64::from(config.soakaway_count);
            let bottom = std::f64::consts::PI * SOAKAWAY_DIAMETER_M.powi(2) / 4.0;
            let height = if unit_area <= bottom {
                SOAKAWAY_MIN_HEIGHT_M
            } else {
                (unit_area - bottom) / (std::f64::consts::PI * SOAKAWAY_DIAMETER_M)
            };
            DisposalSizing::Soakaway {
                count: config.soakaway_count,
                unit_area_m2: unit_area,
                diameter_m: SOAKAWAY_DIAMETER_M,
                bottom_area_m2: bottom,
                height_m: height,
            }
        }
        Disposal::Trench => DisposalSizing::Trench {
            width_m: config.trench_width_m,
            length_m: infiltration_area / config.trench_width_m,
        },
    };

    Ok(TreatmentOutcome {
        contributors,
        contribution_lpd: c,
        septic_tank,
        filter,
        infiltration_rate: config.infiltration_rate,
        infiltration_area_m2: infiltration_area,
        disposal,
        drying_bed_area_m2: config.drying_bed.then(|| DRYING_BED_AREA_PER_PERSON * n),
        warnings,
    })
}

impl ReportSection for TreatmentOutcome {
    fn write_to(&self, report: &mut ModuleReport) {
        let st = &self.septic_tank;
        report.result(format!("Septic tank useful volume ({} units)", st.count), st.total_volume_l / 1000.0, "m³");
        report.result(
            format!("Septic tank dimensions ({} units)", st.count),
            format!("{:.2} x {:.2} x {:.2}", st.length_m, st.width_m, st.depth_m),
            "m (L x W x H)",
        );
        report.step(
            "Septic tank volume",
            "NBR 7229",
            format!(
                "V = 1000 + N × (C × T + K) = 1000 + {} × ({} × {:.2} + {}) = {:.0} L for {} unit(s)\nK for cleaning every {} year(s)",
                self.contributors, self.contribution_lpd, st.detention_days, st.sludge_rate, st.total_volume_l, st.count, st.cleaning_interval_years
            ),
        );
        report.step(
            "Septic tank dimensions",
            "NBR 7229",
            format!(
                "{:.2} m³ per unit, L ≈ 2W, {} m ≤ H ≤ {} m: {:.2} x {:.2} x {:.2} m",
                st.unit_volume_m3, SEPTIC_MIN_DEPTH_M, SEPTIC_MAX_DEPTH_M, st.length_m, st.width_m, st.depth_m
            ),
        );

        let f = &self.filter;
        report.result(format!("Anaerobic filter useful volume ({} units)", f.count), f.total_volume_l / 1000.0, "m³");
        report.result(
            format!("Anaerobic filter dimensions ({} units)", f.count),
            format!("Ø{:.2} x {:.2}", f.diameter_m, f.height_m),
            "m (D x H)",
        );
        report.step(
            "Anaerobic filter",
            "NBR 13969",
            format!(
                "V = 1.6 × N × C = 1.6 × {} × {} = {:.0} L; {:.2} m³ per unit at H = {} m gives Ø{:.2} m",
                self.contributors, self.contribution_lpd, f.total_volume_l, f.unit_volume_m3, f.height_m, f.diameter_m
            ),
        );

        report.result("Required infiltration area", self.infiltration_area_m2, "m²");
        let disposal = match &self.disposal {
            DisposalSizing::Soakaway {
                count,
                unit_area_m2,
                diameter_m,
                bottom_area_m2,
                height_m,
            } => {
                report.result(
                    format!("Soakaway dimensions ({} units)", count),
                    format!("Ø{:.2} x {:.2}", diameter_m, height_m),
                    "m (D x H)",
                );
                if unit_area_m2 <= bottom_area_m2 {
                    format!(
                        "Bottom area {:.2} m² covers the {:.2} m² required per unit; minimum height {} m adopted",
                        bottom_area_m2, unit_area_m2, SOAKAWAY_MIN_HEIGHT_M
                    )
                } else {
                    format!(
                        "h = (A − A_bottom) / (π × D) = ({:.2} − {:.2}) / (π × {}) = {:.2} m",
                        unit_area_m2, bottom_area_m2, diameter_m, height_m
                    )
                }
            }
            DisposalSizing::Trench { width_m, length_m } => {
                report.result("Infiltration trench length", *length_m, "m");
                format!("L = A / width = {:.2} / {} = {:.2} m", self.infiltration_area_m2, width_m, length_m)
            }
        };
        report.step(
            "Final disposal",
            "NBR 13969",
            format!(
                "A = N × C / Ta = {} × {} / {} = {:.2} m²\n{}",
                self.contributors, self.contribution_lpd, self.infiltration_rate, self.infiltration_area_m2, disposal
            ),
        );

        if let Some(area) = self.drying_bed_area_m2 {
            report.result("Sludge drying bed area", area, "m²");
        }
        report.warnings.extend(self.warnings.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detention_time() {
        assert_eq!(detention_days(80.0), 1.0);
        assert!((detention_days(120.0) - 0.992).abs() < 1e-12);
        assert_eq!(detention_days(5000.0), 0.5);
    }

    #[test]
    fn test_septic_tank_four_people() {
        let outcome = size_treatment(&TreatmentConfig::default(), 4).unwrap();
        let st = &outcome.septic_tank;
        // 1000 + 4 × (120 × 0.992 + 94)
        assert!((st.total_volume_l - 1852.16).abs() < 1e-9);
        assert_eq!(st.depth_m, 1.2);
        assert!((st.width_m - (1.85216f64 / 1.2 / 2.0).sqrt()).abs() < 1e-12);
        assert!((st.length_m - 2.0 * st.width_m).abs() < 1e-12);
    }

    #[test]
    fn test_filter_and_soakaway() {
        let outcome = size_treatment(&TreatmentConfig::default(), 4).unwrap();
        assert_eq!(outcome.filter.total_volume_l, 768.0);
        assert!((outcome.filter.diameter_m - 0.9027).abs() < 1e-4);
        assert!((outcome.infiltration_area_m2 - 9.6).abs() < 1e-12);
        match outcome.disposal {
            DisposalSizing::Soakaway { height_m, .. } => assert!((height_m - 1.6622).abs() < 1e-4),
            other => panic!("expected soakaway, got {:?}", other),
        }
    }

    #[test]
    fn test_trench() {
        let config = TreatmentConfig {
            disposal: Disposal::Trench,
            ..TreatmentConfig::default()
        };
        let outcome = size_treatment(&config, 4).unwrap();
        assert_eq!(
            outcome.disposal,
            DisposalSizing::Trench {
                width_m: 0.5,
                length_m: 19.2
            }
        );
    }

    #[test]
    fn test_small_soakaway_uses_minimum_height() {
        let outcome = size_treatment(&TreatmentConfig::default(), 0).unwrap();
        match outcome.disposal {
            DisposalSizing::Soakaway { height_m, .. } => assert_eq!(height_m, SOAKAWAY_MIN_HEIGHT_M),
            other => panic!("expected soakaway, got {:?}", other),
        }
        assert_eq!(outcome.septic_tank.total_volume_l, 1000.0);
    }

    #[test]
    fn test_interval_clamped() {
        let config = TreatmentConfig {
            cleaning_interval_years: 9,
            ..TreatmentConfig::default()
        };
        let outcome = size_treatment(&config, 4).unwrap();
        assert_eq!(outcome.septic_tank.sludge_rate, 254.0);
        let config = TreatmentConfig {
            cleaning_interval_years: 0,
            ..TreatmentConfig::default()
        };
        assert_eq!(size_treatment(&config, 4).unwrap().septic_tank.sludge_rate, 94.0);
    }

    #[test]
    fn test_zero_infiltration_rate_warns() {
        let config = TreatmentConfig {
            infiltration_rate: 0.0,
            ..TreatmentConfig::default()
        };
        let outcome = size_treatment(&config, 4).unwrap();
        assert_eq!(outcome.infiltration_area_m2, 0.0);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_zero_tank_count_rejected() {
        let config = TreatmentConfig {
            septic_tank_count: 0,
            ..TreatmentConfig::default()
        };
        assert!(size_treatment(&config, 4).is_err());
    }

    #[test]
    fn test_drying_bed() {
        let config = TreatmentConfig {
            drying_bed: true,
            ..TreatmentConfig::default()
        };
        let outcome = size_treatment(&config, 10).unwrap();
        assert!((outcome.drying_bed_area_m2.unwrap() - 0.8).abs() < 1e-12);
    }
}
