//! # Unit Types
//!
//! Thin newtype wrappers for the units that cross module boundaries. The
//! Brazilian plumbing standards mix L/s, m³/h and L/min for flow, mm and m for
//! diameters, and metres of water column (mca) for pressure, so conversions
//! are made explicit here rather than scattered as magic factors.
//!
//! All wrappers serialize as plain numbers.
//!
//! ## Example
//!
//! ```rust
//! use hydro_core::units::{CubicMetersPerHour, LitersPerSecond};
//!
//! let q = LitersPerSecond(1.0);
//! let q_h: CubicMetersPerHour = q.into();
//! assert!((q_h.0 - 3.6).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

/// Standard gravity (m/s²)
pub const GRAVITY: f64 = 9.81;

/// One metre of water column in kPa (ρg/1000 with ρ = 1000 kg/m³)
pub const KPA_PER_MCA: f64 = 9.81;

/// One millibar in millimetres of water column
pub const MMH2O_PER_MBAR: f64 = 10.197;

// ============================================================================
// Flow Units
// ============================================================================

/// Flow in litres per second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LitersPerSecond(pub f64);

/// Flow in cubic metres per second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicMetersPerSecond(pub f64);

/// Flow in cubic metres per hour
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicMetersPerHour(pub f64);

/// Flow in litres per minute
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LitersPerMinute(pub f64);

impl From<LitersPerSecond> for CubicMetersPerSecond {
    fn from(q: LitersPerSecond) -> Self {
        CubicMetersPerSecond(q.0 / 1000.0)
    }
}

impl From<CubicMetersPerSecond> for LitersPerSecond {
    fn from(q: CubicMetersPerSecond) -> Self {
        LitersPerSecond(q.0 * 1000.0)
    }
}

impl From<LitersPerSecond> for CubicMetersPerHour {
    fn from(q: LitersPerSecond) -> Self {
        CubicMetersPerHour(q.0 * 3.6)
    }
}

impl From<CubicMetersPerHour> for LitersPerSecond {
    fn from(q: CubicMetersPerHour) -> Self {
        LitersPerSecond(q.0 / 3.6)
    }
}

impl From<LitersPerSecond> for LitersPerMinute {
    fn from(q: LitersPerSecond) -> Self {
        LitersPerMinute(q.0 * 60.0)
    }
}

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimetres (pipe diameters)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

impl Meters {
    /// Area of a full circle with this diameter (m²)
    pub fn circle_area(self) -> f64 {
        std::f64::consts::PI * self.0 * self.0 / 4.0
    }
}

/// Mean velocity (m/s) of a flow through a full circular section.
///
/// Returns 0 for a non-positive diameter so callers never divide by zero.
pub fn velocity(flow: CubicMetersPerSecond, diameter: Meters) -> f64 {
    let area = diameter.circle_area();
    if area <= 0.0 {
        return 0.0;
    }
    flow.0 / area
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_conversions() {
        let q = LitersPerSecond(2.5);
        let m3s: CubicMetersPerSecond = q.into();
        assert!((m3s.0 - 0.0025).abs() < 1e-15);
        let back: LitersPerSecond = CubicMetersPerHour(9.0).into();
        assert!((back.0 - 2.5).abs() < 1e-12);
        let lpm: LitersPerMinute = q.into();
        assert!((lpm.0 - 150.0).abs() < 1e-12);
    }

    #[test]
    fn test_velocity() {
        // 1 L/s through 25 mm internal diameter
        let v = velocity(LitersPerSecond(1.0).into(), Millimeters(25.0).into());
        assert!((v - 2.037).abs() < 0.001);
        assert_eq!(velocity(CubicMetersPerSecond(1.0), Meters(0.0)), 0.0);
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Millimeters(18.4)).unwrap();
        assert_eq!(json, "18.4");
    }
}
