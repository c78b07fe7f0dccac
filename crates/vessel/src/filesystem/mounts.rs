//! Mount operations.

use std::path::Path;

use vessel_common::{VesselError, VesselResult};

/// Bind-mount `source` onto `target`.
#[cfg(target_os = "linux")]
pub fn bind_mount(source: &Path, target: &Path) -> VesselResult<()> {
    use rustix::mount::{MountFlags, mount};
    use std::ffi::CString;

    tracing::debug!(
        source = %source.display(),
        target = %target.display(),
        "Creating bind mount"
    );

    let empty = CString::new("").expect("static string");
    mount(
        source,
        target,
        empty.as_c_str(),
        MountFlags::BIND,
        empty.as_c_str(),
    )
    .map_err(|e| VesselError::Io(e.into()))?;

    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn bind_mount(_source: &Path, _target: &Path) -> VesselResult<()> {
    Err(VesselError::Internal {
        message: "bind mounts require Linux".to_string(),
    })
}

/// Lazily unmount `target`.
///
/// Detaching rather than plain unmounting lets teardown proceed while
/// stray processes still hold the mount open.
#[cfg(target_os = "linux")]
pub fn detach_unmount(target: &Path) -> VesselResult<()> {
    use rustix::mount::{UnmountFlags, unmount};

    tracing::debug!(target = %target.display(), "Unmounting");

    unmount(target, UnmountFlags::DETACH).map_err(|e| VesselError::Io(e.into()))?;

    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn detach_unmount(_target: &Path) -> VesselResult<()> {
    Err(VesselError::Internal {
        message: "unmount requires Linux".to_string(),
    })
}
