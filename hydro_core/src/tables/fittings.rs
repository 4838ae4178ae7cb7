//! # Fitting Equivalent Lengths
//!
//! Equivalent pipe length (m) of common fittings and valves, tabulated at
//! DN 20 to DN 75 (NBR 5626 annex tables for PVC). A fitting on a pipe of an
//! untabulated DN takes the value of the nearest tabulated DN.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::nearest_by;

/// Nominal diameters (mm) the table is given at
pub const TABULATED_DN: [u32; 7] = [20, 25, 32, 40, 50, 60, 75];

/// (name, equivalent lengths at TABULATED_DN)
const FITTINGS: [(&str, [f64; 7]); 11] = [
    ("Elbow 90°", [0.7, 0.8, 1.0, 1.2, 1.7, 2.0, 2.5]),
    ("Elbow 45°", [0.3, 0.4, 0.5, 0.6, 0.8, 1.0, 1.2]),
    ("Long-radius bend 90°", [0.4, 0.5, 0.6, 0.8, 1.0, 1.2, 1.5]),
    ("Tee 90° straight run", [0.3, 0.4, 0.5, 0.6, 0.9, 1.1, 1.4]),
    ("Tee 90° side outlet", [1.2, 1.5, 1.8, 2.2, 2.8, 3.4, 4.0]),
    ("Gate valve open", [0.15, 0.2, 0.2, 0.3, 0.4, 0.5, 0.6]),
    ("Globe valve open", [4.0, 5.0, 6.0, 8.0, 10.0, 12.0, 15.0]),
    ("Pressure valve open", [3.5, 4.0, 5.5, 8.0, 12.0, 15.0, 18.0]),
    ("Check valve light", [1.0, 1.2, 1.6, 2.0, 2.5, 3.0, 3.5]),
    ("Normal inlet", [0.4, 0.5, 0.7, 0.9, 1.2, 1.5, 1.8]),
    ("Pipe outlet", [0.8, 1.0, 1.2, 1.5, 2.0, 2.4, 3.0]),
];

static FITTING_INDEX: Lazy<HashMap<&'static str, &'static [f64; 7]>> =
    Lazy::new(|| FITTINGS.iter().map(|(name, row)| (*name, row)).collect());

/// Names of every tabulated fitting
pub fn fitting_names() -> impl Iterator<Item = &'static str> {
    FITTINGS.iter().map(|(name, _)| *name)
}

/// Equivalent length (m) of one fitting on a pipe of nominal diameter `dn`.
///
/// `None` when the fitting name is not tabulated.
pub fn equivalent_length_m(name: &str, dn: u32) -> Option<f64> {
    let row = FITTING_INDEX.get(name)?;
    let column = nearest_by(&TABULATED_DN, |d| f64::from(*d), f64::from(dn))?;
    let idx = TABULATED_DN.iter().position(|d| *d == column)?;
    Some(row[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_dn() {
        assert_eq!(equivalent_length_m("Elbow 90°", 25), Some(0.8));
        assert_eq!(equivalent_length_m("Globe valve open", 75), Some(15.0));
    }

    #[test]
    fn test_nearest_dn() {
        // PPR DN 15 maps to the DN 20 column, DN 100 to DN 75
        assert_eq!(equivalent_length_m("Elbow 90°", 15), Some(0.7));
        assert_eq!(equivalent_length_m("Elbow 90°", 100), Some(2.5));
        // copper DN 22 is nearest to DN 20
        assert_eq!(equivalent_length_m("Tee 90° side outlet", 22), Some(1.2));
    }

    #[test]
    fn test_unknown_fitting() {
        assert_eq!(equivalent_length_m("Flux capacitor", 25), None);
        assert_eq!(fitting_names().count(), FITTINGS.len());
    }
}
