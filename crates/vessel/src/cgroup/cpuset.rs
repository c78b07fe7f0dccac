//! CPU set adapter.

use vessel_common::VesselResult;

use super::{ResourceConfig, Subsystem, hierarchy};

/// Adapter over the `cpuset` hierarchy; pins the cgroup to a CPU list.
pub struct CpusetSubsystem;

impl Subsystem for CpusetSubsystem {
    fn name(&self) -> &'static str {
        "cpuset"
    }

    fn set(&self, cgroup_path: &str, config: &ResourceConfig) -> VesselResult<()> {
        let dir = hierarchy::cgroup_dir(self.name(), cgroup_path, true)?;
        if !config.cpu_set.is_empty() {
            // A fresh cpuset cgroup refuses task enrollment until both
            // cpus and mems are populated.
            std::fs::write(dir.join("cpuset.cpus"), &config.cpu_set)?;
            std::fs::write(dir.join("cpuset.mems"), "0")?;
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
