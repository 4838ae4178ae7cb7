//! # hydro_core - Building Plumbing, Drainage and Gas Sizing Engine
//!
//! `hydro_core` sizes the water, sewage, rainwater and gas systems of a
//! building against the Brazilian NBR standards. All inputs and outputs are
//! JSON-serializable, so a project can be fed from a file, a UI or another
//! service and the report handed to any document generator.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Every module is recomputed from its configuration on each call
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured validation errors with dotted field paths
//! - **Explicit Suggestions**: Suggested tanks, pumps and diameters are returned, never applied
//!
//! ## Quick Start
//!
//! ```rust
//! use hydro_core::calculations::calculate_project;
//! use hydro_core::project::ProjectConfiguration;
//!
//! let config = ProjectConfiguration::new("Residence", "J. Engineer");
//! let report = calculate_project(&config).unwrap();
//!
//! for module in &report.modules {
//!     println!("{}: {} results", module.name, module.results.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`project`] - Project configuration, building profile and metadata
//! - [`calculations`] - One sizer per building system and the orchestrator
//! - [`hydraulics`] - Flow estimation, head loss, path solver, open channels
//! - [`tables`] - Immutable reference tables and catalogs
//! - [`report`] - Results, narrative, warnings and suggestions
//! - [`compliance`] - Normative checklist over a calculated project
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod compliance;
pub mod errors;
pub mod hydraulics;
pub mod project;
pub mod report;
pub mod tables;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{calculate_module, calculate_project, ModuleDetail, ModuleKind};
pub use compliance::{evaluate, ChecklistItem, ComplianceStatus};
pub use errors::{CalcError, CalcResult};
pub use project::{BuildingProfile, ProjectConfiguration, ProjectMetadata};
pub use report::{ModuleReport, ProjectReport, Suggestion, Warning, WarningCode};
