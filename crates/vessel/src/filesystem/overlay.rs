//! OverlayFS union mount for a container rootfs.

use std::path::{Path, PathBuf};

use vessel_common::{VesselError, VesselResult};

/// An overlay mount: one read-only lower layer, a writable upper layer,
/// and the merged mount point.
///
/// Writes land in the upper layer; reads fall through to the lower layer
/// for files not yet copied up. The lower layer is shared across every
/// container built from the same image and is never modified.
#[derive(Debug, Clone)]
pub struct OverlayFs {
    /// Read-only image layer.
    pub lower_dir: PathBuf,
    /// Private writable layer.
    pub upper_dir: PathBuf,
    /// Work directory (required by overlayfs).
    pub work_dir: PathBuf,
    /// Merged mount point.
    pub merged_dir: PathBuf,
}

impl OverlayFs {
    /// Create a new overlay configuration.
    pub fn new(
        lower_dir: PathBuf,
        upper_dir: PathBuf,
        work_dir: PathBuf,
        merged_dir: PathBuf,
    ) -> Self {
        Self {
            lower_dir,
            upper_dir,
            work_dir,
            merged_dir,
        }
    }

    /// Layout for a container: `upper`, `work` and `merged` under the
    /// container's layer directory, over the shared image layer.
    pub fn for_container(container_dir: &Path, image_layer: PathBuf) -> Self {
        Self {
            lower_dir: image_layer,
            upper_dir: container_dir.join("upper"),
            work_dir: container_dir.join("work"),
            merged_dir: container_dir.join("merged"),
        }
    }

    /// Create the writable and mount-point directories.
    pub fn create_dirs(&self) -> VesselResult<()> {
        std::fs::create_dir_all(&self.upper_dir)?;
        std::fs::create_dir_all(&self.work_dir)?;
        std::fs::create_dir_all(&self.merged_dir)?;
        Ok(())
    }

    /// Mount the union at the merged directory.
    #[cfg(target_os = "linux")]
    pub fn mount(&self) -> VesselResult<()> {
        use rustix::mount::{MountFlags, mount};
        use std::ffi::CString;

        self.create_dirs()?;

        let options = self.mount_options();

        tracing::debug!(
            merged = %self.merged_dir.display(),
            options = %options,
            "Mounting overlayfs"
        );

        let fstype = CString::new("overlay").expect("static string");
        let options_c = CString::new(options.as_str()).map_err(|_| VesselError::Config {
            message: "Invalid overlay options (contains null byte)".to_string(),
        })?;

        mount(
            "overlay",
            &self.merged_dir,
            fstype.as_c_str(),
            MountFlags::empty(),
            options_c.as_c_str(),
        )
        .map_err(|e| VesselError::Io(e.into()))?;

        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    pub fn mount(&self) -> VesselResult<()> {
        Err(VesselError::Internal {
            message: "overlayfs requires Linux".to_string(),
        })
    }

    /// Unmount the union (detached, so held references do not block
    /// teardown).
    pub fn unmount(&self) -> VesselResult<()> {
        super::detach_unmount(&self.merged_dir)
    }

    /// The overlay mount options string.
    #[must_use]
    pub fn mount_options(&self) -> String {
        format!(
            "lowerdir={},upperdir={},workdir={}",
            self.lower_dir.display(),
            self.upper_dir.display(),
            self.work_dir.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_mount_options() {
        let overlay = OverlayFs::new(
            PathBuf::from("/layers/busybox"),
            PathBuf::from("/upper"),
            PathBuf::from("/work"),
            PathBuf::from("/merged"),
        );

        let options = overlay.mount_options();
        assert!(options.contains("lowerdir=/layers/busybox"));
        assert!(options.contains("upperdir=/upper"));
        assert!(options.contains("workdir=/work"));
    }

    #[test]
    fn container_layout() {
        let overlay = OverlayFs::for_container(
            Path::new("/var/lib/vessel/containers/demo"),
            PathBuf::from("/var/lib/vessel/layers/busybox"),
        );
        assert_eq!(
            overlay.merged_dir,
            PathBuf::from("/var/lib/vessel/containers/demo/merged")
        );
        assert_eq!(
            overlay.upper_dir,
            PathBuf::from("/var/lib/vessel/containers/demo/upper")
        );
    }
}
