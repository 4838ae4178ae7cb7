//! # Reference Tables
//!
//! Immutable normative data: pipe internal diameters, fitting equivalent
//! lengths, fixture weights and units, minimum pressures, Manning
//! coefficients, water properties and equipment catalogs. Nothing here is
//! mutated at runtime; user-extensible catalogs (pumps, heaters) are carried
//! in the project configuration and default to the entries defined here.
//!
//! ## Modules
//!
//! - [`pipes`] - Pipe materials, internal diameters and material properties
//! - [`fittings`] - Equivalent lengths of fittings by nominal diameter
//! - [`fixtures`] - Fixture weights, sewage units and minimum pressures
//! - [`water`] - Temperature-indexed water properties
//! - [`catalogs`] - Tanks, water meters, pumps, sewage pumps, gas shelters, heaters

pub mod catalogs;
pub mod fittings;
pub mod fixtures;
pub mod pipes;
pub mod water;

use serde::{Deserialize, Serialize};

pub use pipes::PipeMaterial;

/// A catalog pick, flagged when it had to fall back.
///
/// `degraded` is true when no entry satisfied the requirement and the
/// nearest feasible extreme of the catalog was used instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Selection<T> {
    pub value: T,
    pub degraded: bool,
}

impl<T> Selection<T> {
    pub fn exact(value: T) -> Self {
        Selection { value, degraded: false }
    }

    pub fn degraded(value: T) -> Self {
        Selection { value, degraded: true }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Selection<U> {
        Selection {
            value: f(self.value),
            degraded: self.degraded,
        }
    }
}

/// Smallest entry whose capacity reaches `required`, else the largest (degraded).
///
/// Entries must be sorted by ascending capacity. Returns `None` only for an
/// empty catalog.
pub fn select_at_least<T: Copy>(entries: &[T], capacity: impl Fn(&T) -> f64, required: f64) -> Option<Selection<T>> {
    if let Some(hit) = entries.iter().find(|e| capacity(e) >= required) {
        return Some(Selection::exact(*hit));
    }
    entries.last().map(|e| Selection::degraded(*e))
}

/// Entry whose key is closest to `target`; ties go to the earlier entry.
pub fn nearest_by<T: Copy>(entries: &[T], key: impl Fn(&T) -> f64, target: f64) -> Option<T> {
    let mut best: Option<(T, f64)> = None;
    for e in entries {
        let distance = (key(e) - target).abs();
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((*e, distance)),
        }
    }
    best.map(|(e, _)| e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_at_least() {
        let sizes = [500.0, 1000.0, 2000.0];
        let pick = select_at_least(&sizes, |s| *s, 600.0).unwrap();
        assert_eq!(pick, Selection::exact(1000.0));

        let over = select_at_least(&sizes, |s| *s, 5000.0).unwrap();
        assert_eq!(over.value, 2000.0);
        assert!(over.degraded);

        assert!(select_at_least::<f64>(&[], |s| *s, 1.0).is_none());
    }

    #[test]
    fn test_nearest_by_tie_prefers_first() {
        let dns = [20u32, 25, 32];
        assert_eq!(nearest_by(&dns, |d| f64::from(*d), 22.5), Some(20));
        assert_eq!(nearest_by(&dns, |d| f64::from(*d), 30.0), Some(32));
        assert_eq!(nearest_by(&dns, |d| f64::from(*d), 100.0), Some(32));
    }
}
