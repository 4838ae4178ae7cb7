//! # Tank Sizer
//!
//! Sizes the upper and lower water reservoirs (NBR 5626):
//!
//! 1. Consumption reserve = daily demand × reserve days
//! 2. Total reserve = consumption reserve plus the fire reserve, either summed
//!    or merged (fire water stored inside the consumption volume)
//! 3. Split between tiers by the upper-tier percentage; a tier with no tanks
//!    hands its share to the other
//! 4. Per-tank volume = tier volume / tank count, rounded up to a commercial
//!    capacity
//!
//! A capacity the caller already adopted is kept as long as it still covers
//! the per-tank requirement; otherwise a new commercial size is suggested.

use serde::{Deserialize, Serialize};

use crate::errors::{non_negative, CalcError, CalcResult};
use crate::report::{ModuleReport, ReportSection, Suggestion, Warning, WarningCode};
use crate::tables::catalogs::COMMERCIAL_TANKS_L;
use crate::tables::{select_at_least, Selection};

/// How the fire reserve joins the consumption reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireIntegration {
    /// Fire reserve stored on top of the consumption reserve
    #[default]
    Summed,
    /// Fire reserve stored inside the consumption volume: total = max(consumption, fire)
    Merged,
}

/// Reservoir layout.
///
/// ## JSON Example
///
/// ```json
/// {
///   "upper_count": 1,
///   "lower_count": 1,
///   "upper_percent": 40.0,
///   "fire_reserve_l": 5000.0,
///   "fire_integration": "summed",
///   "adopted_upper_l": 2000.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservoirConfig {
    pub upper_count: u32,
    pub lower_count: u32,
    /// Share of the total reserve stored in the upper tier (%)
    pub upper_percent: f64,
    pub fire_reserve_l: f64,
    pub fire_integration: FireIntegration,
    /// Commercial capacity per upper tank already adopted by the designer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adopted_upper_l: Option<f64>,
    /// Commercial capacity per lower tank already adopted by the designer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adopted_lower_l: Option<f64>,
}

impl Default for ReservoirConfig {
    fn default() -> Self {
        ReservoirConfig {
            upper_count: 1,
            lower_count: 0,
            upper_percent: 100.0,
            fire_reserve_l: 0.0,
            fire_integration: FireIntegration::Summed,
            adopted_upper_l: None,
            adopted_lower_l: None,
        }
    }
}

impl ReservoirConfig {
    pub fn validate(&self) -> CalcResult<()> {
        if self.upper_count == 0 && self.lower_count == 0 {
            return Err(CalcError::invalid_input(
                "upper_count",
                "0",
                "At least one upper or lower tank is required",
            ));
        }
        if !(0.0..=100.0).contains(&self.upper_percent) {
            return Err(CalcError::invalid_input(
                "upper_percent",
                self.upper_percent.to_string(),
                "Must be within [0, 100] %",
            ));
        }
        non_negative("fire_reserve_l", self.fire_reserve_l)?;
        if let Some(v) = self.adopted_upper_l {
            non_negative("adopted_upper_l", v)?;
        }
        if let Some(v) = self.adopted_lower_l {
            non_negative("adopted_lower_l", v)?;
        }
        Ok(())
    }

    /// Upper-tier share actually applied, after empty tiers hand over their share.
    pub fn effective_upper_percent(&self) -> f64 {
        match (self.upper_count, self.lower_count) {
            (0, _) => 0.0,
            (_, 0) => 100.0,
            _ => self.upper_percent,
        }
    }
}

/// Tank tier position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Upper,
    Lower,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Upper => "Upper",
            Tier::Lower => "Lower",
        }
    }
}

/// Sizing of one reservoir tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSizing {
    pub tier: Tier,
    pub count: u32,
    /// Volume stored in the whole tier (L)
    pub volume_l: f64,
    /// Required volume per tank (L)
    pub required_per_tank_l: f64,
    /// Commercial capacity per tank; `None` when the tier has no tanks
    pub commercial_per_tank_l: Option<f64>,
    /// Requirement exceeds the largest commercial tank
    pub degraded: bool,
}

/// Reserve volumes and tank selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservoirOutcome {
    pub daily_demand_l: f64,
    pub reserve_days: f64,
    pub consumption_reserve_l: f64,
    pub fire_reserve_l: f64,
    pub fire_integration: FireIntegration,
    pub total_reserve_l: f64,
    pub upper_percent: f64,
    pub upper: TierSizing,
    pub lower: TierSizing,
    pub suggestions: Vec<Suggestion>,
    pub warnings: Vec<Warning>,
}

impl ReservoirOutcome {
    /// Installed commercial capacity over both tiers (L)
    pub fn installed_capacity_l(&self) -> f64 {
        [&self.upper, &self.lower]
            .iter()
            .map(|t| t.commercial_per_tank_l.unwrap_or(0.0) * f64::from(t.count))
            .sum()
    }
}

/// Total reserve for a consumption reserve and a fire reserve.
pub fn total_reserve(consumption_l: f64, fire_l: f64, integration: FireIntegration) -> f64 {
    match integration {
        FireIntegration::Summed => consumption_l + fire_l,
        FireIntegration::Merged => consumption_l.max(fire_l),
    }
}

/// Smallest commercial tank of at least `required_l`, else the largest (degraded).
pub fn commercial_tank(required_l: f64) -> Selection<f64> {
    select_at_least(&COMMERCIAL_TANKS_L, |c| *c, required_l)
        .unwrap_or_else(|| Selection::degraded(required_l))
}

/// Size both reservoir tiers.
///
/// # Errors
///
/// `InvalidInput` when both tiers are empty, the split percentage is outside
/// [0, 100], or a volume is negative.
pub fn size_reservoirs(config: &ReservoirConfig, daily_demand_l: f64, reserve_days: f64) -> CalcResult<ReservoirOutcome> {
    config.validate()?;
    non_negative("daily_demand_l", daily_demand_l)?;
    non_negative("reserve_days", reserve_days)?;

    let consumption = daily_demand_l * reserve_days;
    let total = total_reserve(consumption, config.fire_reserve_l, config.fire_integration);
    let upper_percent = config.effective_upper_percent();
    let upper_volume = total * upper_percent / 100.0;
    let lower_volume = total - upper_volume;

    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    let upper = size_tier(Tier::Upper, config.upper_count, upper_volume, config.adopted_upper_l, &mut warnings);
    let lower = size_tier(Tier::Lower, config.lower_count, lower_volume, config.adopted_lower_l, &mut warnings);

    if let Some(capacity) = upper.commercial_per_tank_l {
        if config.adopted_upper_l != Some(capacity) {
            suggestions.push(Suggestion::UpperTankCapacity { liters: capacity });
        }
    }
    if let Some(capacity) = lower.commercial_per_tank_l {
        if config.adopted_lower_l != Some(capacity) {
            suggestions.push(Suggestion::LowerTankCapacity { liters: capacity });
        }
    }

    tracing::debug!(total_reserve_l = total, upper_l = upper_volume, lower_l = lower_volume, "reservoirs sized");

    Ok(ReservoirOutcome {
        daily_demand_l,
        reserve_days,
        consumption_reserve_l: consumption,
        fire_reserve_l: config.fire_reserve_l,
        fire_integration: config.fire_integration,
        total_reserve_l: total,
        upper_percent,
        upper,
        lower,
        suggestions,
        warnings,
    })
}

fn size_tier(tier: Tier, count: u32, volume_l: f64, adopted_l: Option<f64>, warnings: &mut Vec<Warning>) -> TierSizing {
    if count == 0 {
        return TierSizing {
            tier,
            count,
            volume_l,
            required_per_tank_l: 0.0,
            commercial_per_tank_l: None,
            degraded: false,
        };
    }
    let required = volume_l / f64::from(count);

    // an adopted capacity that still covers the requirement is never shrunk
    if let Some(adopted) = adopted_l.filter(|a| *a > 0.0 && *a >= required) {
        return TierSizing {
            tier,
            count,
            volume_l,
            required_per_tank_l: required,
            commercial_per_tank_l: Some(adopted),
            degraded: false,
        };
    }

    let pick = commercial_tank(required);
    if pick.degraded {
        warnings.push(Warning::new(
            WarningCode::DegradedSelection,
            format!(
                "{} tank: {:.0} L per tank exceeds the largest commercial tank ({:.0} L); add tanks to the tier",
                tier.label(),
                required,
                pick.value
            ),
        ));
    }
    TierSizing {
        tier,
        count,
        volume_l,
        required_per_tank_l: required,
        commercial_per_tank_l: Some(pick.value),
        degraded: pick.degraded,
    }
}

impl ReportSection for ReservoirOutcome {
    fn write_to(&self, report: &mut ModuleReport) {
        report.result("Consumption reserve", self.consumption_reserve_l, "L");
        report.result("Fire reserve", self.fire_reserve_l, "L");
        report.result(format!("Total reserve ({} days + fire)", self.reserve_days), self.total_reserve_l, "L");
        for tier in [&self.upper, &self.lower] {
            if let Some(capacity) = tier.commercial_per_tank_l {
                report.result(format!("{} tank required (per unit)", tier.tier.label()), tier.required_per_tank_l, "L");
                report.result(format!("{} tanks adopted", tier.tier.label()), format!("{} x {:.0} L", tier.count, capacity), "");
            }
        }

        let fire = match self.fire_integration {
            FireIntegration::Summed => format!(
                "V = D × days + V_fire = {:.0} × {} + {:.0} = {:.0} L",
                self.daily_demand_l, self.reserve_days, self.fire_reserve_l, self.total_reserve_l
            ),
            FireIntegration::Merged => format!(
                "V = max(D × days, V_fire) = max({:.0} × {}, {:.0}) = {:.0} L",
                self.daily_demand_l, self.reserve_days, self.fire_reserve_l, self.total_reserve_l
            ),
        };
        report.step("Total reserve volume", "NBR 5626", fire);

        let mut split = format!(
            "Upper share {:.0} %: {:.0} L; lower share: {:.0} L",
            self.upper_percent, self.upper.volume_l, self.lower.volume_l
        );
        for tier in [&self.upper, &self.lower] {
            if let Some(capacity) = tier.commercial_per_tank_l {
                split.push_str(&format!(
                    "\n{}: {:.0} L / {} = {:.0} L per tank, adopted {:.0} L",
                    tier.tier.label(),
                    tier.volume_l,
                    tier.count,
                    tier.required_per_tank_l,
                    capacity
                ));
            }
        }
        report.step("Reserve distribution", "NBR 5626", split);

        report.warnings.extend(self.warnings.iter().cloned());
        report.suggestions.extend(self.suggestions.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_person_reserve() {
        // 4 persons x 150 L/day x 2 days
        let outcome = size_reservoirs(&ReservoirConfig::default(), 600.0, 2.0).unwrap();
        assert_eq!(outcome.consumption_reserve_l, 1200.0);
        assert_eq!(outcome.total_reserve_l, 1200.0);
        assert_eq!(outcome.upper.commercial_per_tank_l, Some(1500.0));
        assert_eq!(outcome.lower.commercial_per_tank_l, None);
        assert_eq!(outcome.suggestions, vec![Suggestion::UpperTankCapacity { liters: 1500.0 }]);
    }

    #[test]
    fn test_fire_integration_modes() {
        assert_eq!(total_reserve(10000.0, 5000.0, FireIntegration::Summed), 15000.0);
        assert_eq!(total_reserve(10000.0, 5000.0, FireIntegration::Merged), 10000.0);
        assert_eq!(total_reserve(3000.0, 5000.0, FireIntegration::Merged), 5000.0);
    }

    #[test]
    fn test_split_between_tiers() {
        let config = ReservoirConfig {
            upper_count: 1,
            lower_count: 2,
            upper_percent: 40.0,
            fire_reserve_l: 2000.0,
            ..ReservoirConfig::default()
        };
        let outcome = size_reservoirs(&config, 5000.0, 2.0).unwrap();
        assert_eq!(outcome.total_reserve_l, 12000.0);
        assert!((outcome.upper.volume_l - 4800.0).abs() < 1e-9);
        assert!((outcome.lower.volume_l - 7200.0).abs() < 1e-9);
        assert_eq!(outcome.upper.commercial_per_tank_l, Some(5000.0));
        assert_eq!(outcome.lower.commercial_per_tank_l, Some(4000.0));
    }

    #[test]
    fn test_empty_upper_tier_hands_over() {
        let config = ReservoirConfig {
            upper_count: 0,
            lower_count: 1,
            upper_percent: 60.0,
            ..ReservoirConfig::default()
        };
        let outcome = size_reservoirs(&config, 1000.0, 1.0).unwrap();
        assert_eq!(outcome.upper_percent, 0.0);
        assert_eq!(outcome.lower.volume_l, 1000.0);
        assert!(outcome.upper.commercial_per_tank_l.is_none());
    }

    #[test]
    fn test_no_tanks_is_invalid() {
        let config = ReservoirConfig {
            upper_count: 0,
            lower_count: 0,
            ..ReservoirConfig::default()
        };
        assert!(size_reservoirs(&config, 1000.0, 1.0).is_err());
    }

    #[test]
    fn test_adopted_capacity_is_sticky() {
        let config = ReservoirConfig {
            adopted_upper_l: Some(2000.0),
            ..ReservoirConfig::default()
        };
        let outcome = size_reservoirs(&config, 600.0, 2.0).unwrap();
        assert_eq!(outcome.upper.commercial_per_tank_l, Some(2000.0));
        assert!(outcome.suggestions.is_empty());

        // too small now: grows
        let outcome = size_reservoirs(&config, 1500.0, 2.0).unwrap();
        assert_eq!(outcome.upper.commercial_per_tank_l, Some(3000.0));
        assert_eq!(outcome.suggestions.len(), 1);
    }

    #[test]
    fn test_oversized_requirement_is_degraded() {
        let outcome = size_reservoirs(&ReservoirConfig::default(), 40000.0, 2.0).unwrap();
        assert!(outcome.upper.degraded);
        assert_eq!(outcome.upper.commercial_per_tank_l, Some(50000.0));
        assert!(outcome.warnings.iter().any(|w| w.code == WarningCode::DegradedSelection));
    }
}
