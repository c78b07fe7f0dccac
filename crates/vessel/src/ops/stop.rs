#![allow(unsafe_code)]
//! Stop a running container.

use vessel_common::{VesselError, VesselPaths, VesselResult};

use crate::state::{ContainerStatus, StateStore};

/// Deliver SIGTERM to a container's recorded pid and mark it stopped.
///
/// Termination is a separate invocation signalling the recorded process,
/// not an in-process cancellation of the original orchestration. The
/// record is rewritten with status `stopped` and an empty pid.
pub fn stop_container(paths: &VesselPaths, name: &str) -> VesselResult<()> {
    let store = StateStore::new(paths.clone());
    let info = store.get(name)?;

    if info.status != ContainerStatus::Running {
        return Err(VesselError::WrongState {
            name: name.to_string(),
            status: info.status.to_string(),
            expected: "running".to_string(),
        });
    }

    let pid: libc::pid_t = info.pid.parse().map_err(|_| VesselError::Internal {
        message: format!("record for {} holds invalid pid {:?}", name, info.pid),
    })?;

    // SIGTERM, so the container's process tree can exit cleanly.
    // SAFETY: plain kill(2) on a recorded pid.
    let ret = unsafe { libc::kill(pid, libc::SIGTERM) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        tracing::error!(container = name, pid, error = %err, "Failed to signal container");
        return Err(VesselError::Io(err));
    }

    store.update(name, ContainerStatus::Stopped, "")?;
    tracing::info!(container = name, pid, "Container stopped");
    Ok(())
}
