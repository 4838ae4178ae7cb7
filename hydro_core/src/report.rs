//! # Report Contract
//!
//! Everything a sizer hands back to its callers: labelled results, the
//! ordered derivation narrative, warnings, and explicit suggestions the caller
//! may choose to apply to its configuration. Document generators and the
//! [`compliance`](crate::compliance) evaluator consume only these types.
//!
//! ## Structure
//!
//! ```text
//! ProjectReport
//! └── modules: Vec<ModuleReport>
//!     ├── results:     Vec<ResultEntry>       (label / value / unit)
//!     ├── steps:       Vec<CalculationStep>   (ordered narrative, with standard cited)
//!     ├── warnings:    Vec<Warning>
//!     ├── suggestions: Vec<Suggestion>        (never applied automatically)
//!     └── detail:      ModuleDetail           (typed outcome, incl. paths / gas paths)
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::gas::GasPathResult;
use crate::calculations::{ModuleDetail, ModuleKind};
use crate::hydraulics::path::PathResult;

// ============================================================================
// Results and narrative
// ============================================================================

/// A single reported value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl From<f64> for ResultValue {
    fn from(v: f64) -> Self {
        ResultValue::Number(v)
    }
}

impl From<u32> for ResultValue {
    fn from(v: u32) -> Self {
        ResultValue::Number(f64::from(v))
    }
}

impl From<bool> for ResultValue {
    fn from(v: bool) -> Self {
        ResultValue::Flag(v)
    }
}

impl From<&str> for ResultValue {
    fn from(v: &str) -> Self {
        ResultValue::Text(v.to_string())
    }
}

impl From<String> for ResultValue {
    fn from(v: String) -> Self {
        ResultValue::Text(v)
    }
}

impl std::fmt::Display for ResultValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultValue::Number(v) if v.is_finite() => write!(f, "{:.2}", v),
            ResultValue::Number(_) => write!(f, "∞"),
            ResultValue::Flag(true) => write!(f, "yes"),
            ResultValue::Flag(false) => write!(f, "no"),
            ResultValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Label / value / unit triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub label: String,
    pub value: ResultValue,
    pub unit: String,
}

/// One step of the derivation narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationStep {
    /// Short heading, e.g. "Daily consumption"
    pub description: String,
    /// Formula, substitution and result as plain text
    pub detail: String,
    /// Standard clause the step follows, e.g. "NBR 5626"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// A cited standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standard {
    pub code: String,
    pub description: String,
}

// ============================================================================
// Warnings
// ============================================================================

/// Machine-readable warning category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    /// Fixture name not in the fixture tables; contributed zero
    UnmappedFixture,
    /// Fitting name not in the equivalent-length table; contributed zero
    UnmappedFitting,
    /// A segment or load carries no flow
    ZeroFlow,
    /// No catalog diameter keeps velocity within the limit
    ExcessVelocity,
    /// A catalog fallback was used because nothing met the requirement
    DegradedSelection,
    /// Terminal fixture pressure below its normative minimum
    MinimumPressureNotMet,
    /// NPSH available does not exceed NPSH required
    CavitationRisk,
    /// Water-hammer overpressure calls for protection devices
    TransientProtection,
    /// An iterative solver stopped at its iteration cap
    NonConvergence,
    /// Flow exceeds a section's capacity
    CapacityExceeded,
    /// Drain laid flatter than its minimum slope
    InsufficientSlope,
    /// A missing or zero input was replaced by a default
    DefaultApplied,
}

/// A non-fatal finding surfaced alongside the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub code: WarningCode,
    pub message: String,
}

impl Warning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!(code = ?code, "{}", message);
        Warning { code, message }
    }
}

// ============================================================================
// Suggestions
// ============================================================================

/// A value the engine recommends writing back into the configuration.
///
/// The engine never mutates its input; callers decide whether to adopt these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Suggestion {
    UpperTankCapacity { liters: f64 },
    LowerTankCapacity { liters: f64 },
    Pump { name: String, manufacturer: String },
    WaterMeter { nominal_diameter_mm: u32, name: String },
    BuildingFeedDiameter { nominal_diameter_mm: u32 },
    PressureReducingValve { floor: u32, static_pressure_mca: f64 },
    DiameterChange {
        path_id: u32,
        segment_id: u32,
        description: String,
        new_nominal_diameter_mm: u32,
        justification: String,
    },
    SewagePump { name: String },
    InspectionChamber { location: String },
}

impl std::fmt::Display for Suggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Suggestion::UpperTankCapacity { liters } => write!(f, "Upper tank of {:.0} L", liters),
            Suggestion::LowerTankCapacity { liters } => write!(f, "Lower tank of {:.0} L", liters),
            Suggestion::Pump { name, manufacturer } => write!(f, "Pump {} ({})", name, manufacturer),
            Suggestion::WaterMeter { name, .. } => write!(f, "Water meter {}", name),
            Suggestion::BuildingFeedDiameter { nominal_diameter_mm } => {
                write!(f, "Building feed DN {} mm", nominal_diameter_mm)
            }
            Suggestion::PressureReducingValve { floor, static_pressure_mca } => write!(
                f,
                "Pressure-reducing valve at floor {} ({:.1} mca static)",
                floor, static_pressure_mca
            ),
            Suggestion::DiameterChange {
                path_id,
                segment_id,
                new_nominal_diameter_mm,
                justification,
                ..
            } => write!(
                f,
                "Path {} segment {}: DN {} mm ({})",
                path_id, segment_id, new_nominal_diameter_mm, justification
            ),
            Suggestion::SewagePump { name } => write!(f, "Sewage pump {}", name),
            Suggestion::InspectionChamber { location } => write!(f, "Inspection chamber: {}", location),
        }
    }
}

// ============================================================================
// Module and project reports
// ============================================================================

/// Output of one sizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleReport {
    pub kind: ModuleKind,
    pub name: String,
    pub standards: Vec<Standard>,
    pub results: Vec<ResultEntry>,
    pub steps: Vec<CalculationStep>,
    pub warnings: Vec<Warning>,
    pub suggestions: Vec<Suggestion>,
    pub detail: ModuleDetail,
}

impl ModuleReport {
    /// Empty report for a module kind, to be filled by its sizer.
    pub fn new(kind: ModuleKind, detail: ModuleDetail) -> Self {
        ModuleReport {
            kind,
            name: kind.display_name().to_string(),
            standards: kind
                .standards()
                .iter()
                .map(|(code, description)| Standard {
                    code: code.to_string(),
                    description: description.to_string(),
                })
                .collect(),
            results: Vec::new(),
            steps: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
            detail,
        }
    }

    /// Append a result entry
    pub fn result(&mut self, label: impl Into<String>, value: impl Into<ResultValue>, unit: impl Into<String>) {
        self.results.push(ResultEntry {
            label: label.into(),
            value: value.into(),
            unit: unit.into(),
        });
    }

    /// Append a narrative step citing a standard
    pub fn step(&mut self, description: impl Into<String>, reference: &str, detail: impl Into<String>) {
        self.steps.push(CalculationStep {
            description: description.into(),
            detail: detail.into(),
            reference: if reference.is_empty() { None } else { Some(reference.to_string()) },
        });
    }

    /// Look up a result by label
    pub fn find_result(&self, label: &str) -> Option<&ResultEntry> {
        self.results.iter().find(|r| r.label == label)
    }

    /// Detailed water paths (cold and hot water modules)
    pub fn paths(&self) -> &[PathResult] {
        match &self.detail {
            ModuleDetail::ColdWater(o) => &o.paths,
            ModuleDetail::HotWater(o) => &o.paths,
            _ => &[],
        }
    }

    /// Detailed gas paths (fuel gas module)
    pub fn gas_paths(&self) -> &[GasPathResult] {
        match &self.detail {
            ModuleDetail::FuelGas(o) => &o.paths,
            _ => &[],
        }
    }

    pub fn has_warning(&self, code: WarningCode) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

/// Something a sizer outcome can narrate into a module report.
pub trait ReportSection {
    fn write_to(&self, report: &mut ModuleReport);
}

/// Output of every enabled module, in canonical module order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReport {
    pub modules: Vec<ModuleReport>,
}

impl ProjectReport {
    pub fn module(&self, kind: ModuleKind) -> Option<&ModuleReport> {
        self.modules.iter().find(|m| m.kind == kind)
    }

    /// All warnings across modules
    pub fn warnings(&self) -> impl Iterator<Item = (&ModuleKind, &Warning)> {
        self.modules
            .iter()
            .flat_map(|m| m.warnings.iter().map(move |w| (&m.kind, w)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_value_untagged_json() {
        assert_eq!(serde_json::to_string(&ResultValue::from(1.5)).unwrap(), "1.5");
        assert_eq!(serde_json::to_string(&ResultValue::from("OK")).unwrap(), "\"OK\"");
        assert_eq!(serde_json::to_string(&ResultValue::from(true)).unwrap(), "true");
    }

    #[test]
    fn test_result_value_display() {
        assert_eq!(ResultValue::from(1.23456).to_string(), "1.23");
        assert_eq!(ResultValue::from(f64::INFINITY).to_string(), "∞");
        assert_eq!(ResultValue::from(false).to_string(), "no");
    }

    #[test]
    fn test_suggestion_tagged_json() {
        let s = Suggestion::UpperTankCapacity { liters: 1500.0 };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"kind\":\"upper_tank_capacity\""));
    }
}
