//! Container listing.

use vessel_common::{VesselPaths, VesselResult};

use crate::state::StateStore;

/// Print every container record as a table.
pub fn list_containers(paths: &VesselPaths) -> VesselResult<()> {
    let store = StateStore::new(paths.clone());
    let containers = store.list()?;

    println!(
        "{:<12} {:<14} {:<8} {:<9} {:<24} {}",
        "ID", "NAME", "PID", "STATUS", "COMMAND", "CREATED"
    );
    for info in containers {
        println!(
            "{:<12} {:<14} {:<8} {:<9} {:<24} {}",
            info.id, info.name, info.pid, info.status, info.command, info.created_time
        );
    }

    Ok(())
}
