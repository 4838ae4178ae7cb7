//! # Rainwater Reuse Module
//!
//! Harvest potential, storage and economics of non-potable rainwater reuse
//! per NBR 15527.
//!
//! ```text
//! harvest [m³/year] = P [mm] / 1000 · A · C · η_filter
//! used [L/year]     = min(harvest, demand · 365)
//! payback [years]   = investment / (savings − maintenance)
//! ```
//!
//! Payback is infinite (serialized as `null`) when the yearly savings do not
//! cover maintenance.

use serde::{Deserialize, Deserializer, Serialize};

use super::tank::commercial_tank;
use crate::errors::{non_negative, percentage, positive, CalcError, CalcResult};
use crate::project::BuildingProfile;
use crate::report::{ModuleReport, ReportSection, Warning, WarningCode};

/// Reservoir volume mode.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StorageSizing {
    /// demand · storage days / reservoir efficiency
    #[default]
    Automatic,
    /// A volume chosen by the designer; autonomy is derived from it
    Manual { adopted_l: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReuseConfig {
    pub catchment_area_m2: f64,
    pub runoff_coefficient: f64,
    pub filter_efficiency_percent: f64,
    pub reservoir_efficiency_percent: f64,
    pub annual_rainfall_mm: f64,
    /// Non-potable demand supplied by the reservoir (L/day)
    pub daily_demand_l: f64,
    pub storage_days: f64,
    pub storage: StorageSizing,
    /// Potable water tariff (currency/m³)
    pub water_cost_per_m3: f64,
    pub annual_maintenance: f64,
    pub investment: f64,
}

impl Default for ReuseConfig {
    fn default() -> Self {
        ReuseConfig {
            catchment_area_m2: 150.0,
            runoff_coefficient: 0.95,
            filter_efficiency_percent: 85.0,
            reservoir_efficiency_percent: 95.0,
            annual_rainfall_mm: 1400.0,
            daily_demand_l: 200.0,
            storage_days: 7.0,
            storage: StorageSizing::Automatic,
            water_cost_per_m3: 4.5,
            annual_maintenance: 100.0,
            investment: 15000.0,
        }
    }
}

impl ReuseConfig {
    pub fn validate(&self) -> CalcResult<()> {
        non_negative("catchment_area_m2", self.catchment_area_m2)?;
        if !(0.0..=1.0).contains(&self.runoff_coefficient) {
            return Err(CalcError::invalid_input(
                "runoff_coefficient",
                self.runoff_coefficient.to_string(),
                "Must be between 0 and 1",
            ));
        }
        percentage("filter_efficiency_percent", self.filter_efficiency_percent)?;
        percentage("reservoir_efficiency_percent", self.reservoir_efficiency_percent)?;
        non_negative("annual_rainfall_mm", self.annual_rainfall_mm)?;
        non_negative("daily_demand_l", self.daily_demand_l)?;
        non_negative("storage_days", self.storage_days)?;
        if let StorageSizing::Manual { adopted_l } = self.storage {
            positive("adopted_l", adopted_l).map_err(|e| e.within("storage"))?;
        }
        non_negative("water_cost_per_m3", self.water_cost_per_m3)?;
        non_negative("annual_maintenance", self.annual_maintenance)?;
        non_negative("investment", self.investment)
    }
}

fn null_as_infinity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReuseEconomics {
    pub used_volume_l: f64,
    pub potable_reduction_percent: f64,
    pub annual_savings: f64,
    pub net_annual_savings: f64,
    #[serde(deserialize_with = "null_as_infinity")]
    pub payback_years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReuseOutcome {
    pub harvest_m3_per_year: f64,
    pub daily_demand_l: f64,
    pub storage: StorageSizing,
    pub reservoir_volume_l: f64,
    pub commercial_volume_l: f64,
    pub autonomy_days: f64,
    pub economics: ReuseEconomics,
    pub warnings: Vec<Warning>,
}

/// Annual harvest potential (m³).
pub fn annual_harvest_m3(config: &ReuseConfig) -> f64 {
    config.annual_rainfall_mm / 1000.0
        * config.catchment_area_m2
        * config.runoff_coefficient
        * config.filter_efficiency_percent
        / 100.0
}

/// Size the reuse reservoir and its economics.
pub fn calculate(config: &ReuseConfig, building: &BuildingProfile) -> CalcResult<ReuseOutcome> {
    config.validate()?;
    let mut warnings = Vec::new();
    let harvest = annual_harvest_m3(config);
    let efficiency = config.reservoir_efficiency_percent / 100.0;

    // === Reservoir ===
    let (volume, autonomy) = match config.storage {
        StorageSizing::Automatic => (config.daily_demand_l * config.storage_days / efficiency, config.storage_days),
        StorageSizing::Manual { adopted_l } => {
            let autonomy = if config.daily_demand_l > 0.0 {
                adopted_l / config.daily_demand_l
            } else {
                0.0
            };
            (adopted_l, autonomy)
        }
    };
    let tank = commercial_tank(volume);
    if tank.degraded {
        warnings.push(Warning::new(
            WarningCode::DegradedSelection,
            format!("No commercial tank holds {:.0} L; split the reservoir", volume),
        ));
    }

    // === Economics ===
    let yearly_demand = config.daily_demand_l * 365.0;
    let used = (harvest * 1000.0).min(yearly_demand);
    let potable_yearly = building.daily_demand_l() * 365.0;
    let reduction = if potable_yearly > 0.0 {
        used / potable_yearly * 100.0
    } else {
        warnings.push(Warning::new(WarningCode::ZeroFlow, "Building has no potable demand to offset"));
        0.0
    };
    let savings = used / 1000.0 * config.water_cost_per_m3;
    let net = savings - config.annual_maintenance;
    let payback = if net > 0.0 { config.investment / net } else { f64::INFINITY };

    tracing::debug!(harvest_m3 = harvest, reservoir_l = volume, payback_years = payback, "reuse sized");

    Ok(ReuseOutcome {
        harvest_m3_per_year: harvest,
        daily_demand_l: config.daily_demand_l,
        storage: config.storage,
        reservoir_volume_l: volume,
        commercial_volume_l: tank.value,
        autonomy_days: autonomy,
        economics: ReuseEconomics {
            used_volume_l: used,
            potable_reduction_percent: reduction,
            annual_savings: savings,
            net_annual_savings: net,
            payback_years: payback,
        },
        warnings,
    })
}

impl ReportSection for ReuseOutcome {
    fn write_to(&self, report: &mut ModuleReport) {
        report.result("Annual harvest potential", self.harvest_m3_per_year, "m³/year");
        report.result("Reservoir volume", self.reservoir_volume_l, "L");
        report.result("Commercial reservoir", self.commercial_volume_l, "L");
        report.result("Autonomy", self.autonomy_days, "days");
        report.result("Potable consumption reduction", self.economics.potable_reduction_percent, "%");
        report.result("Payback", self.economics.payback_years, "years");

        report.step(
            "Harvest potential",
            "NBR 15527",
            format!("V = P / 1000 × A × C × η = {:.3} m³/year", self.harvest_m3_per_year),
        );
        let volume = match self.storage {
            StorageSizing::Automatic => format!(
                "V = demand × days / efficiency = {} × {} / efficiency = {:.0} L",
                self.daily_demand_l, self.autonomy_days, self.reservoir_volume_l
            ),
            StorageSizing::Manual { adopted_l } => format!(
                "Adopted {:.0} L: autonomy = {:.0} / {} = {:.1} days",
                adopted_l, adopted_l, self.daily_demand_l, self.autonomy_days
            ),
        };
        report.step("Reservoir volume", "NBR 15527", volume);

        let e = &self.economics;
        let payback = if e.payback_years.is_finite() {
            format!("payback = {:.1} years", e.payback_years)
        } else {
            "savings do not cover maintenance; no payback".to_string()
        };
        report.step(
            "Economic feasibility",
            "NBR 15527",
            format!(
                "Used volume {:.0} L/year ({:.1}% of potable consumption)\nSavings {:.2}/year, net of maintenance {:.2}/year: {}",
                e.used_volume_l, e.potable_reduction_percent, e.annual_savings, e.net_annual_savings, payback
            ),
        );

        report.warnings.extend(self.warnings.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvest_potential() {
        // 1.4 m × 150 m² × 0.95 × 0.85
        let harvest = annual_harvest_m3(&ReuseConfig::default());
        assert!((harvest - 169.575).abs() < 1e-9);
    }

    #[test]
    fn test_automatic_reservoir() {
        let outcome = calculate(&ReuseConfig::default(), &BuildingProfile::default()).unwrap();
        assert!((outcome.reservoir_volume_l - 200.0 * 7.0 / 0.95).abs() < 1e-9);
        assert!(outcome.commercial_volume_l >= outcome.reservoir_volume_l);
        assert_eq!(outcome.autonomy_days, 7.0);
    }

    #[test]
    fn test_economics() {
        let outcome = calculate(&ReuseConfig::default(), &BuildingProfile::default()).unwrap();
        let e = &outcome.economics;
        // demand caps the harvest: 200 × 365 = 73 000 L
        assert_eq!(e.used_volume_l, 73000.0);
        // 4 persons × 150 L/day × 365
        assert!((e.potable_reduction_percent - 100.0 / 3.0).abs() < 1e-9);
        assert!((e.annual_savings - 328.5).abs() < 1e-9);
        assert!((e.payback_years - 15000.0 / 228.5).abs() < 1e-9);
    }

    #[test]
    fn test_unprofitable_payback_is_infinite() {
        let config = ReuseConfig {
            annual_maintenance: 500.0,
            ..ReuseConfig::default()
        };
        let outcome = calculate(&config, &BuildingProfile::default()).unwrap();
        assert!(outcome.economics.payback_years.is_infinite());

        let json = serde_json::to_value(&outcome.economics).unwrap();
        assert!(json["payback_years"].is_null());
        let back: ReuseEconomics = serde_json::from_value(json).unwrap();
        assert!(back.payback_years.is_infinite());
    }

    #[test]
    fn test_manual_autonomy() {
        let config = ReuseConfig {
            storage: StorageSizing::Manual { adopted_l: 3000.0 },
            ..ReuseConfig::default()
        };
        let outcome = calculate(&config, &BuildingProfile::default()).unwrap();
        assert_eq!(outcome.reservoir_volume_l, 3000.0);
        assert!((outcome.autonomy_days - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_runoff_out_of_range() {
        let config = ReuseConfig {
            runoff_coefficient: 1.2,
            ..ReuseConfig::default()
        };
        assert!(calculate(&config, &BuildingProfile::default()).is_err());
    }
}
