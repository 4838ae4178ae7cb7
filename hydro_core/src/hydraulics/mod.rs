//! # Hydraulic Primitives
//!
//! Building blocks shared by every sizer:
//!
//! - [`flow`] - Fixture loads to probable flow (Hunter / probabilistic)
//! - [`head_loss`] - Hazen-Williams and Darcy-Weisbach unit head loss
//! - [`path`] - Segment-by-segment diameter, head loss and pressure along a path
//! - [`channel`] - Manning gutters and partially-full circular collectors

pub mod channel;
pub mod flow;
pub mod head_loss;
pub mod path;

pub use flow::{FixtureCount, SewageMethod};
pub use head_loss::FrictionMethod;
pub use path::{solve_path, FittingCount, Network, Path, PathResult, Segment, SegmentResult};
