//! # Water Properties
//!
//! Temperature-indexed properties of water between 10 °C and 60 °C.
//! Values between tabulated temperatures are linearly interpolated; outside
//! the table the nearest end row is used.

use serde::{Deserialize, Serialize};

/// Properties of water at one temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterProperties {
    /// Temperature (°C)
    pub temperature_c: f64,
    /// Vapour pressure (mca)
    pub vapor_pressure_mca: f64,
    /// Density (kg/m³)
    pub density: f64,
    /// Dynamic viscosity (Pa·s)
    pub dynamic_viscosity: f64,
    /// Bulk modulus of elasticity (Pa)
    pub bulk_modulus_pa: f64,
}

impl WaterProperties {
    /// Kinematic viscosity (m²/s)
    pub fn kinematic_viscosity(&self) -> f64 {
        self.dynamic_viscosity / self.density
    }
}

const fn row(temperature_c: f64, vapor_pressure_mca: f64, density: f64, dynamic_viscosity: f64, bulk_modulus_pa: f64) -> WaterProperties {
    WaterProperties {
        temperature_c,
        vapor_pressure_mca,
        density,
        dynamic_viscosity,
        bulk_modulus_pa,
    }
}

pub const WATER_TABLE: [WaterProperties; 5] = [
    row(10.0, 0.125, 999.7, 1.307e-3, 2.03e9),
    row(20.0, 0.238, 998.2, 1.002e-3, 2.15e9),
    row(30.0, 0.432, 995.7, 0.798e-3, 2.24e9),
    row(40.0, 0.752, 992.2, 0.653e-3, 2.28e9),
    row(60.0, 2.03, 983.2, 0.467e-3, 2.25e9),
];

/// Reference temperature for Darcy-Weisbach friction on cold-water networks
pub const REFERENCE_TEMPERATURE_C: f64 = 20.0;

/// Water properties at `temperature_c`.
pub fn properties_at(temperature_c: f64) -> WaterProperties {
    let first = WATER_TABLE[0];
    let last = WATER_TABLE[WATER_TABLE.len() - 1];
    if temperature_c.is_nan() || temperature_c <= first.temperature_c {
        return first;
    }
    if temperature_c >= last.temperature_c {
        return last;
    }
    for pair in WATER_TABLE.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if temperature_c <= hi.temperature_c {
            let t = (temperature_c - lo.temperature_c) / (hi.temperature_c - lo.temperature_c);
            let lerp = |a: f64, b: f64| a + (b - a) * t;
            return WaterProperties {
                temperature_c,
                vapor_pressure_mca: lerp(lo.vapor_pressure_mca, hi.vapor_pressure_mca),
                density: lerp(lo.density, hi.density),
                dynamic_viscosity: lerp(lo.dynamic_viscosity, hi.dynamic_viscosity),
                bulk_modulus_pa: lerp(lo.bulk_modulus_pa, hi.bulk_modulus_pa),
            };
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabulated_rows() {
        let p = properties_at(20.0);
        assert_eq!(p.density, 998.2);
        assert_eq!(p.vapor_pressure_mca, 0.238);
    }

    #[test]
    fn test_interpolation() {
        let p = properties_at(25.0);
        assert!((p.vapor_pressure_mca - 0.335).abs() < 1e-9);
        assert!((p.density - 996.95).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_outside_table() {
        assert_eq!(properties_at(4.0), WATER_TABLE[0]);
        assert_eq!(properties_at(95.0), WATER_TABLE[4]);
    }

    #[test]
    fn test_kinematic_viscosity_at_20c() {
        let nu = properties_at(20.0).kinematic_viscosity();
        assert!((nu - 1.004e-6).abs() < 1e-8);
    }
}
