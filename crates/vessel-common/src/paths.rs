//! Standard filesystem paths for Vessel.

use std::path::PathBuf;

use once_cell::sync::Lazy;

/// Default data root for Vessel (image archives and container layers).
pub static VESSEL_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("VESSEL_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/var/lib/vessel"))
});

/// Default state root for Vessel (per-container records and logs).
pub static VESSEL_STATE_DIR: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("VESSEL_STATE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/var/run/vessel"))
});

/// Name of the per-container record file.
pub const CONFIG_NAME: &str = "config.json";

/// Name of the per-container log file.
pub const LOG_NAME: &str = "container.log";

/// Standard paths used by the Vessel engine.
#[derive(Debug, Clone)]
pub struct VesselPaths {
    /// Data root (default: /var/lib/vessel).
    pub root: PathBuf,
    /// State root (default: /var/run/vessel).
    pub state: PathBuf,
}

impl VesselPaths {
    /// Create paths with default locations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create paths with a custom data root; state lives under it too.
    ///
    /// Used by tests to keep everything inside one temporary directory.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let state = root.join("state");
        Self { root, state }
    }

    /// Directory holding image archives (`<image>.tar`).
    #[must_use]
    pub fn images(&self) -> PathBuf {
        self.root.join("images")
    }

    /// Archive file for a named image.
    #[must_use]
    pub fn image_archive(&self, image: &str) -> PathBuf {
        self.images().join(format!("{image}.tar"))
    }

    /// Extracted read-only layer for a named image.
    ///
    /// Shared by every container created from that image.
    #[must_use]
    pub fn image_layer(&self, image: &str) -> PathBuf {
        self.root.join("layers").join(image)
    }

    /// Directory for a container's filesystem layers.
    #[must_use]
    pub fn container(&self, name: &str) -> PathBuf {
        self.root.join("containers").join(name)
    }

    /// A container's private writable layer.
    #[must_use]
    pub fn write_layer(&self, name: &str) -> PathBuf {
        self.container(name).join("upper")
    }

    /// A container's overlay work directory.
    #[must_use]
    pub fn work_dir(&self, name: &str) -> PathBuf {
        self.container(name).join("work")
    }

    /// A container's root filesystem mount point.
    #[must_use]
    pub fn mount_point(&self, name: &str) -> PathBuf {
        self.container(name).join("merged")
    }

    /// Directory holding a container's persisted record and log.
    #[must_use]
    pub fn info_dir(&self, name: &str) -> PathBuf {
        self.state.join(name)
    }

    /// A container's record file.
    #[must_use]
    pub fn config_file(&self, name: &str) -> PathBuf {
        self.info_dir(name).join(CONFIG_NAME)
    }

    /// A container's log file.
    #[must_use]
    pub fn log_file(&self, name: &str) -> PathBuf {
        self.info_dir(name).join(LOG_NAME)
    }
}

impl Default for VesselPaths {
    fn default() -> Self {
        Self {
            root: VESSEL_ROOT.clone(),
            state: VESSEL_STATE_DIR.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_root() {
        let paths = VesselPaths::with_root("/tmp/vessel-test");
        assert_eq!(
            paths.image_layer("busybox"),
            PathBuf::from("/tmp/vessel-test/layers/busybox")
        );
        assert_eq!(
            paths.mount_point("demo"),
            PathBuf::from("/tmp/vessel-test/containers/demo/merged")
        );
        assert_eq!(paths.state, PathBuf::from("/tmp/vessel-test/state"));
    }

    #[test]
    fn record_paths() {
        let paths = VesselPaths::with_root("/tmp/vessel-test");
        assert_eq!(
            paths.config_file("demo"),
            PathBuf::from("/tmp/vessel-test/state/demo/config.json")
        );
        assert_eq!(
            paths.log_file("demo"),
            PathBuf::from("/tmp/vessel-test/state/demo/container.log")
        );
    }

    #[test]
    fn image_archive_path() {
        let paths = VesselPaths::with_root("/tmp/vessel-test");
        assert_eq!(
            paths.image_archive("busybox"),
            PathBuf::from("/tmp/vessel-test/images/busybox.tar")
        );
    }
}
