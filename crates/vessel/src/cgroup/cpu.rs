//! CPU share adapter.

use vessel_common::VesselResult;

use super::{ResourceConfig, Subsystem, hierarchy};

/// Adapter over the `cpu` hierarchy; limits relative CPU weight.
pub struct CpuSubsystem;

impl Subsystem for CpuSubsystem {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn set(&self, cgroup_path: &str, config: &ResourceConfig) -> VesselResult<()> {
        let dir = hierarchy::cgroup_dir(self.name(), cgroup_path, true)?;
        if !config.cpu_share.is_empty() {
            std::fs::write(dir.join("cpu.shares"), &config.cpu_share)?;
        }
        Ok(())
    }

    fn apply(&self, cgroup_path: &str, pid: u32) -> VesselResult<()> {
        super::write_tasks(self.name(), cgroup_path, pid)
    }

    fn remove(&self, cgroup_path: &str) -> VesselResult<()> {
        super::remove_dir(self.name(), cgroup_path)
    }
}
