//! # Head-Loss Laws
//!
//! Unit head loss J (m/m) for full-bore pressurised flow:
//!
//! - Hazen-Williams: J = 10.67·Q^1.852 / (C^1.852·D^4.87)
//! - Darcy-Weisbach: J = f·V²/(2gD), with f from Swamee-Jain at every Reynolds number
//!
//! Q in m³/s, D in m. Zero flow or zero diameter gives zero loss.

use serde::{Deserialize, Serialize};

use crate::errors::{positive, CalcResult};
use crate::tables::water::WaterProperties;
use crate::units::GRAVITY;

/// Friction law used for a network.
///
/// ## JSON Example
///
/// ```json
/// { "method": "hazen_williams", "c": 150.0 }
/// { "method": "darcy_weisbach", "roughness_m": 0.00015 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum FrictionMethod {
    HazenWilliams { c: f64 },
    DarcyWeisbach { roughness_m: f64 },
}

impl Default for FrictionMethod {
    fn default() -> Self {
        FrictionMethod::HazenWilliams { c: 150.0 }
    }
}

impl FrictionMethod {
    pub fn validate(&self) -> CalcResult<()> {
        match self {
            FrictionMethod::HazenWilliams { c } => positive("c", *c),
            FrictionMethod::DarcyWeisbach { roughness_m } => {
                crate::errors::non_negative("roughness_m", *roughness_m)
            }
        }
    }

    /// Unit head loss (m/m) for `flow_m3s` through internal diameter `diameter_m`.
    pub fn unit_loss(&self, flow_m3s: f64, diameter_m: f64, water: &WaterProperties) -> f64 {
        match self {
            FrictionMethod::HazenWilliams { c } => hazen_williams(flow_m3s, *c, diameter_m),
            FrictionMethod::DarcyWeisbach { roughness_m } => {
                darcy_weisbach(flow_m3s, diameter_m, *roughness_m, water)
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FrictionMethod::HazenWilliams { c } => format!("Hazen-Williams (C = {})", c),
            FrictionMethod::DarcyWeisbach { roughness_m } => {
                format!("Darcy-Weisbach / Swamee-Jain (ε = {} m)", roughness_m)
            }
        }
    }
}

/// Hazen-Williams unit head loss (m/m)
pub fn hazen_williams(flow_m3s: f64, c: f64, diameter_m: f64) -> f64 {
    if flow_m3s <= 0.0 || diameter_m <= 0.0 || c <= 0.0 {
        return 0.0;
    }
    10.67 * flow_m3s.powf(1.852) / (c.powf(1.852) * diameter_m.powf(4.87))
}

/// Reynolds number Re = V·D/ν
pub fn reynolds(velocity_mps: f64, diameter_m: f64, water: &WaterProperties) -> f64 {
    velocity_mps * diameter_m / water.kinematic_viscosity()
}

/// Swamee-Jain explicit Darcy friction factor.
///
/// f = 0.25 / [log10(ε/(3.7·D) + 5.74/Re^0.9)]²
pub fn friction_factor(reynolds: f64, roughness_m: f64, diameter_m: f64) -> f64 {
    if reynolds <= 0.0 {
        return 0.0;
    }
    let log_term = (roughness_m / (3.7 * diameter_m) + 5.74 / reynolds.powf(0.9)).log10();
    0.25 / (log_term * log_term)
}

/// Darcy-Weisbach unit head loss (m/m)
pub fn darcy_weisbach(flow_m3s: f64, diameter_m: f64, roughness_m: f64, water: &WaterProperties) -> f64 {
    if flow_m3s <= 0.0 || diameter_m <= 0.0 {
        return 0.0;
    }
    let area = std::f64::consts::PI * diameter_m * diameter_m / 4.0;
    let v = flow_m3s / area;
    let f = friction_factor(reynolds(v, diameter_m, water), roughness_m, diameter_m);
    f * v * v / (2.0 * GRAVITY * diameter_m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::water::properties_at;

    #[test]
    fn test_hazen_williams_reference_value() {
        // 1 L/s, C = 150, D = 23.2 mm
        let j = hazen_williams(0.001, 150.0, 0.0232);
        assert!((j - 0.2524).abs() < 0.001, "J = {}", j);
    }

    #[test]
    fn test_zero_flow_zero_loss() {
        let water = properties_at(20.0);
        assert_eq!(hazen_williams(0.0, 150.0, 0.02), 0.0);
        assert_eq!(darcy_weisbach(0.0, 0.02, 1.5e-4, &water), 0.0);
    }

    #[test]
    fn test_swamee_jain_smooth_pipe() {
        // Smooth pipe, Re = 1e5: Blasius gives f ≈ 0.0178
        let f = friction_factor(1.0e5, 0.0, 0.05);
        assert!((f - 0.0179).abs() < 0.0005, "f = {}", f);
    }

    #[test]
    fn test_swamee_jain_at_low_reynolds() {
        // No laminar switch: Re = 1000 still follows Swamee-Jain (≈ 0.0698, not 64/Re)
        let f = friction_factor(1000.0, 1e-4, 0.02);
        assert!((f - 0.06979).abs() < 1e-4, "f = {}", f);
    }

    #[test]
    fn test_methods_agree_roughly() {
        // Both laws on smooth plastic pipe land within 25 % of each other
        let water = properties_at(20.0);
        let hw = FrictionMethod::HazenWilliams { c: 150.0 }.unit_loss(0.001, 0.0232, &water);
        let dw = FrictionMethod::DarcyWeisbach { roughness_m: 1.5e-6 }.unit_loss(0.001, 0.0232, &water);
        assert!((hw - dw).abs() / hw < 0.25, "hw = {}, dw = {}", hw, dw);
    }

    #[test]
    fn test_friction_method_json() {
        let m: FrictionMethod = serde_json::from_str(r#"{"method":"darcy_weisbach","roughness_m":0.00015}"#).unwrap();
        assert_eq!(m, FrictionMethod::DarcyWeisbach { roughness_m: 0.00015 });
        assert!(FrictionMethod::HazenWilliams { c: 0.0 }.validate().is_err());
    }
}
