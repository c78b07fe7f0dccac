//! Container log inspection.

use std::io::Write;

use vessel_common::{VesselError, VesselPaths, VesselResult};

/// Print a container's captured standard output.
///
/// Only non-interactive containers write a log file; an interactive
/// container's output went to the operator's terminal.
pub fn print_logs(paths: &VesselPaths, name: &str) -> VesselResult<()> {
    let log_path = paths.log_file(name);
    if !log_path.exists() {
        return Err(VesselError::ContainerNotFound {
            name: name.to_string(),
        });
    }

    let content = std::fs::read(&log_path)?;
    std::io::stdout().write_all(&content)?;
    Ok(())
}
