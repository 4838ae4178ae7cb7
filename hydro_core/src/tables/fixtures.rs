//! # Fixture Tables
//!
//! Per-fixture normative loads:
//!
//! - Water supply weights and minimum dynamic pressures (NBR 5626)
//! - Sewage contribution units (UHC, Hunter method) and discharge units
//!   (probabilistic method) (NBR 8160)
//!
//! Fixtures are looked up by display name because project files carry the
//! names the designer picked from a list. An unknown name is not an error;
//! callers contribute zero and raise a warning.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Minimum dynamic pressure (mca) at any point of use without its own entry
pub const DEFAULT_MINIMUM_PRESSURE_MCA: f64 = 1.0;

/// Water-supply fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaterFixture {
    pub name: &'static str,
    /// Relative weight P for Q = 0.3·√ΣP
    pub weight: f64,
    /// Minimum dynamic pressure (mca)
    pub minimum_pressure_mca: f64,
}

/// Sanitary fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SewageFixture {
    pub name: &'static str,
    /// Hunter contribution units (UHC)
    pub hunter_units: f64,
    /// Discharge units for the probabilistic method
    pub discharge_units: f64,
    /// Water closet, which forces DN 100 on its stack and collector
    pub water_closet: bool,
}

const fn water(name: &'static str, weight: f64, minimum_pressure_mca: f64) -> WaterFixture {
    WaterFixture { name, weight, minimum_pressure_mca }
}

const fn sewage(name: &'static str, hunter_units: f64, discharge_units: f64, water_closet: bool) -> SewageFixture {
    SewageFixture { name, hunter_units, discharge_units, water_closet }
}

pub const WATER_FIXTURES: [WaterFixture; 12] = [
    water("Shower", 0.4, 1.0),
    water("Bidet shower", 0.1, 2.0),
    water("Lavatory faucet", 0.3, 1.0),
    water("Kitchen sink faucet", 0.3, 1.0),
    water("WC flush tank", 0.3, 0.5),
    water("WC flush valve", 3.2, 1.5),
    water("Washing machine", 0.4, 2.0),
    water("Dishwasher", 0.3, 2.0),
    water("Laundry tub", 0.3, DEFAULT_MINIMUM_PRESSURE_MCA),
    water("Garden faucet", 0.2, DEFAULT_MINIMUM_PRESSURE_MCA),
    water("Urinal (flush tank)", 0.1, DEFAULT_MINIMUM_PRESSURE_MCA),
    water("Urinal (flush valve)", 0.4, DEFAULT_MINIMUM_PRESSURE_MCA),
];

pub const SEWAGE_FIXTURES: [SewageFixture; 12] = [
    sewage("WC (flush tank)", 3.0, 1.3, true),
    sewage("WC (flush valve)", 6.0, 10.2, true),
    sewage("Lavatory", 1.0, 0.3, false),
    sewage("Shower", 2.0, 0.4, false),
    sewage("Bathtub", 2.0, 0.8, false),
    sewage("Kitchen sink", 2.0, 0.8, false),
    sewage("Dishwasher", 2.0, 0.8, false),
    sewage("Washing machine", 3.0, 0.8, false),
    sewage("Laundry tub", 3.0, 0.8, false),
    sewage("Urinal (flush valve)", 4.0, 0.2, false),
    sewage("Urinal (flush tank)", 2.0, 0.1, false),
    sewage("Floor drain", 1.0, 0.0, false),
];

static WATER_INDEX: Lazy<HashMap<&'static str, &'static WaterFixture>> =
    Lazy::new(|| WATER_FIXTURES.iter().map(|f| (f.name, f)).collect());

static SEWAGE_INDEX: Lazy<HashMap<&'static str, &'static SewageFixture>> =
    Lazy::new(|| SEWAGE_FIXTURES.iter().map(|f| (f.name, f)).collect());

pub fn water_fixture(name: &str) -> Option<&'static WaterFixture> {
    WATER_INDEX.get(name).copied()
}

pub fn sewage_fixture(name: &str) -> Option<&'static SewageFixture> {
    SEWAGE_INDEX.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups() {
        assert_eq!(water_fixture("WC flush valve").map(|f| f.weight), Some(3.2));
        assert_eq!(water_fixture("Bidet shower").map(|f| f.minimum_pressure_mca), Some(2.0));
        assert!(water_fixture("Jacuzzi").is_none());

        let wc = sewage_fixture("WC (flush tank)").unwrap();
        assert_eq!(wc.hunter_units, 3.0);
        assert!(wc.water_closet);
        assert!(!sewage_fixture("Lavatory").unwrap().water_closet);
    }

    #[test]
    fn test_names_unique() {
        assert_eq!(WATER_INDEX.len(), WATER_FIXTURES.len());
        assert_eq!(SEWAGE_INDEX.len(), SEWAGE_FIXTURES.len());
    }
}
