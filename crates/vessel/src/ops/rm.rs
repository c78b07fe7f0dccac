//! Remove a stopped container.

use vessel_common::{VesselError, VesselPaths, VesselResult};

use crate::filesystem;
use crate::state::{ContainerStatus, StateStore};

/// Delete a stopped container's record and filesystem layers.
///
/// Refuses unless the container is stopped, leaving the record unchanged.
/// The shared read-only image layer is never touched.
pub fn remove_container(paths: &VesselPaths, name: &str) -> VesselResult<()> {
    let store = StateStore::new(paths.clone());
    let info = store.get(name)?;

    if info.status != ContainerStatus::Stopped {
        return Err(VesselError::WrongState {
            name: name.to_string(),
            status: info.status.to_string(),
            expected: "stopped".to_string(),
        });
    }

    store.remove(name)?;
    filesystem::delete_workspace(paths, &info.volume, name);

    tracing::info!(container = name, "Container removed");
    Ok(())
}
