//! Common error types for the Vessel engine.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`VesselError`].
pub type VesselResult<T> = Result<T, VesselError>;

/// Errors surfaced by the Vessel container engine.
#[derive(Error, Diagnostic, Debug)]
pub enum VesselError {
    /// No record exists for the requested container name.
    #[error("Container not found: {name}")]
    #[diagnostic(code(vessel::container::not_found))]
    ContainerNotFound {
        /// The container name that was looked up.
        name: String,
    },

    /// The container is not in the state the operation requires.
    #[error("Container {name} is {status}, expected {expected}")]
    #[diagnostic(
        code(vessel::container::wrong_state),
        help("Stop the container first with `vessel stop <name>`")
    )]
    WrongState {
        /// The container name.
        name: String,
        /// Its current status.
        status: String,
        /// The status the operation requires.
        expected: String,
    },

    /// Image archive missing from the image root.
    #[error("Image not found: {image}")]
    #[diagnostic(code(vessel::image::not_found))]
    ImageNotFound {
        /// The image name that was requested.
        image: String,
    },

    /// No mounted cgroup hierarchy carries the subsystem.
    #[error("Cgroup subsystem not mounted: {subsystem}")]
    #[diagnostic(code(vessel::cgroup::not_mounted))]
    CgroupNotMounted {
        /// The subsystem name (cpu, cpuset, memory).
        subsystem: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(vessel::io))]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    #[diagnostic(code(vessel::serialization))]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(vessel::config))]
    Config {
        /// The error message.
        message: String,
    },

    /// Internal error (should not happen).
    #[error("Internal error: {message}")]
    #[diagnostic(code(vessel::internal))]
    Internal {
        /// The error message.
        message: String,
    },
}

impl From<serde_json::Error> for VesselError {
    fn from(err: serde_json::Error) -> Self {
        VesselError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = VesselError::ContainerNotFound {
            name: "demo".to_string(),
        };
        assert_eq!(err.to_string(), "Container not found: demo");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VesselError = io_err.into();
        assert!(matches!(err, VesselError::Io(_)));
    }

    #[test]
    fn wrong_state_display() {
        let err = VesselError::WrongState {
            name: "demo".to_string(),
            status: "running".to_string(),
            expected: "stopped".to_string(),
        };
        assert_eq!(err.to_string(), "Container demo is running, expected stopped");
    }
}
