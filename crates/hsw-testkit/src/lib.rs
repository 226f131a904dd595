//! Test support for the HSW index.
//!
//! - Deterministic dataset generators (points on a line, seeded clouds, blobs)
//! - Proptest strategies for datasets and build parameters
//! - A recording [`Meter`](hsw_observe::Meter) for asserting on telemetry
//!
//! # Usage
//!
//! ```
//! use hsw_testkit::generators::{line_points, uniform_cloud};
//!
//! let line = line_points(9);
//! assert_eq!(line[8], vec![8.0, 0.0]);
//!
//! let cloud = uniform_cloud(7, 100, 2);
//! assert_eq!(cloud.len(), 100);
//! ```

pub mod generators;
pub mod recorder;
pub mod strategies;

pub use generators::{clustered_blobs, line_points, uniform_cloud};
pub use recorder::RecordingMeter;
pub use strategies::{arb_build_params, arb_dataset, BuildParams};
