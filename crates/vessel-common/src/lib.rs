//! # vessel-common
//!
//! Shared utilities for the Vessel container engine:
//! - Container identity generation
//! - Standard filesystem paths
//! - Common error types

#![warn(missing_docs)]

pub mod error;
pub mod id;
pub mod paths;

pub use error::{VesselError, VesselResult};
pub use id::random_id;
pub use paths::VesselPaths;
