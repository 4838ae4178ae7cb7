//! # Pipe Materials
//!
//! Commercial nominal diameters (DN) and their internal diameters per
//! material, plus the material constants the solvers need: Hazen-Williams
//! coefficient, elastic modulus (water hammer) and thermal conductivity
//! (hot-water recirculation losses).
//!
//! Internal diameters follow manufacturer tables for class-PN pipe in common
//! Brazilian use (PVC soldável, PPR PN25, galvanised steel, CPVC, copper
//! class E, HDPE PE80).

use serde::{Deserialize, Serialize};

/// A nominal size with its internal diameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeSize {
    /// Nominal diameter (mm)
    pub nominal_mm: u32,
    /// Internal diameter (mm)
    pub internal_mm: f64,
}

const fn size(nominal_mm: u32, internal_mm: f64) -> PipeSize {
    PipeSize { nominal_mm, internal_mm }
}

const PVC: [PipeSize; 10] = [
    size(20, 18.4),
    size(25, 23.2),
    size(32, 29.8),
    size(40, 36.6),
    size(50, 46.2),
    size(60, 56.6),
    size(75, 71.0),
    size(100, 94.0),
    size(125, 117.4),
    size(150, 140.8),
];

const PPR: [PipeSize; 6] = [
    size(15, 10.2),
    size(20, 16.2),
    size(25, 20.4),
    size(32, 26.0),
    size(40, 32.6),
    size(50, 40.8),
];

const STEEL: [PipeSize; 4] = [size(25, 26.6), size(32, 35.1), size(40, 40.9), size(50, 52.5)];

const CPVC: [PipeSize; 6] = [
    size(15, 12.5),
    size(22, 18.1),
    size(28, 23.7),
    size(35, 29.7),
    size(42, 36.3),
    size(54, 47.5),
];

const COPPER: [PipeSize; 6] = [
    size(15, 13.0),
    size(22, 19.8),
    size(28, 25.8),
    size(35, 32.4),
    size(42, 39.2),
    size(54, 50.8),
];

const HDPE: [PipeSize; 6] = [
    size(20, 16.0),
    size(25, 20.4),
    size(32, 26.2),
    size(40, 32.8),
    size(50, 41.0),
    size(63, 51.6),
];

/// Ratio used for an uncataloged DN: internal ≈ 0.9 × nominal
pub const UNCATALOGED_INTERNAL_RATIO: f64 = 0.9;

/// Pipe material for pressurised water and gas lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipeMaterial {
    /// Rigid PVC (cold water)
    Pvc,
    /// Polypropylene random copolymer (hot and cold water)
    Ppr,
    /// Galvanised steel
    Steel,
    /// Chlorinated PVC (hot water)
    Cpvc,
    /// Copper (hot water, gas)
    Copper,
    /// High-density polyethylene (building feed)
    Hdpe,
}

impl PipeMaterial {
    pub const ALL: [PipeMaterial; 6] = [
        PipeMaterial::Pvc,
        PipeMaterial::Ppr,
        PipeMaterial::Steel,
        PipeMaterial::Cpvc,
        PipeMaterial::Copper,
        PipeMaterial::Hdpe,
    ];

    /// Catalog sizes in ascending order
    pub fn sizes(&self) -> &'static [PipeSize] {
        match self {
            PipeMaterial::Pvc => &PVC,
            PipeMaterial::Ppr => &PPR,
            PipeMaterial::Steel => &STEEL,
            PipeMaterial::Cpvc => &CPVC,
            PipeMaterial::Copper => &COPPER,
            PipeMaterial::Hdpe => &HDPE,
        }
    }

    /// Internal diameter (mm) for a nominal diameter.
    ///
    /// Falls back to 0.9 × DN for a size this material does not list.
    pub fn internal_diameter_mm(&self, nominal_mm: u32) -> f64 {
        self.sizes()
            .iter()
            .find(|s| s.nominal_mm == nominal_mm)
            .map(|s| s.internal_mm)
            .unwrap_or(f64::from(nominal_mm) * UNCATALOGED_INTERNAL_RATIO)
    }

    /// Whether the DN is in this material's catalog
    pub fn has_size(&self, nominal_mm: u32) -> bool {
        self.sizes().iter().any(|s| s.nominal_mm == nominal_mm)
    }

    /// Next catalog size above `nominal_mm`
    pub fn next_larger(&self, nominal_mm: u32) -> Option<PipeSize> {
        self.sizes().iter().copied().find(|s| s.nominal_mm > nominal_mm)
    }

    /// Next catalog size below `nominal_mm`
    pub fn next_smaller(&self, nominal_mm: u32) -> Option<PipeSize> {
        self.sizes().iter().rev().copied().find(|s| s.nominal_mm < nominal_mm)
    }

    /// Hazen-Williams roughness coefficient C for new pipe
    pub fn hazen_williams_c(&self) -> f64 {
        match self {
            PipeMaterial::Pvc => 150.0,
            PipeMaterial::Ppr => 150.0,
            PipeMaterial::Steel => 130.0,
            PipeMaterial::Cpvc => 150.0,
            PipeMaterial::Copper => 140.0,
            PipeMaterial::Hdpe => 150.0,
        }
    }

    /// Young's modulus of the pipe wall (Pa)
    pub fn elastic_modulus_pa(&self) -> f64 {
        match self {
            PipeMaterial::Pvc => 2.8e9,
            PipeMaterial::Ppr => 0.8e9,
            PipeMaterial::Steel => 200e9,
            PipeMaterial::Cpvc => 2.9e9,
            PipeMaterial::Copper => 110e9,
            PipeMaterial::Hdpe => 0.9e9,
        }
    }

    /// Thermal conductivity of the wall, W/(m·K)
    pub fn thermal_conductivity(&self) -> f64 {
        match self {
            PipeMaterial::Pvc => 0.19,
            PipeMaterial::Ppr => 0.24,
            PipeMaterial::Steel => 50.0,
            PipeMaterial::Cpvc => 0.14,
            PipeMaterial::Copper => 401.0,
            PipeMaterial::Hdpe => 0.40,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PipeMaterial::Pvc => "PVC",
            PipeMaterial::Ppr => "PPR",
            PipeMaterial::Steel => "Galvanised steel",
            PipeMaterial::Cpvc => "CPVC",
            PipeMaterial::Copper => "Copper",
            PipeMaterial::Hdpe => "HDPE",
        }
    }
}

/// Lining of an open channel or gravity pipe, for Manning's n.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMaterial {
    Pvc,
    Concrete,
    SmoothMetal,
    Aluminum,
}

impl ChannelMaterial {
    /// Manning roughness coefficient n
    pub fn manning_n(&self) -> f64 {
        match self {
            ChannelMaterial::Pvc => 0.009,
            ChannelMaterial::Concrete => 0.013,
            ChannelMaterial::SmoothMetal => 0.011,
            ChannelMaterial::Aluminum => 0.010,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChannelMaterial::Pvc => "PVC",
            ChannelMaterial::Concrete => "Concrete",
            ChannelMaterial::SmoothMetal => "Smooth metal",
            ChannelMaterial::Aluminum => "Aluminium",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogs_ascending() {
        for material in PipeMaterial::ALL {
            let sizes = material.sizes();
            assert!(!sizes.is_empty());
            for pair in sizes.windows(2) {
                assert!(pair[0].nominal_mm < pair[1].nominal_mm);
                assert!(pair[0].internal_mm < pair[1].internal_mm);
            }
        }
    }

    #[test]
    fn test_internal_diameter_lookup() {
        assert_eq!(PipeMaterial::Pvc.internal_diameter_mm(25), 23.2);
        assert_eq!(PipeMaterial::Ppr.internal_diameter_mm(20), 16.2);
        // Uncataloged size falls back to 0.9 x DN
        assert!((PipeMaterial::Steel.internal_diameter_mm(20) - 18.0).abs() < 1e-12);
    }

    #[test]
    fn test_neighbours() {
        assert_eq!(PipeMaterial::Pvc.next_larger(25).map(|s| s.nominal_mm), Some(32));
        assert_eq!(PipeMaterial::Pvc.next_smaller(25).map(|s| s.nominal_mm), Some(20));
        assert!(PipeMaterial::Pvc.next_smaller(20).is_none());
        assert!(PipeMaterial::Pvc.next_larger(150).is_none());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&PipeMaterial::Hdpe).unwrap();
        assert_eq!(json, "\"hdpe\"");
        let m: ChannelMaterial = serde_json::from_str("\"smooth_metal\"").unwrap();
        assert_eq!(m.manning_n(), 0.011);
    }
}
