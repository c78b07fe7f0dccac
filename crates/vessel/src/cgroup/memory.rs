//! Memory ceiling adapter.

use vessel_common::VesselResult;

use super::{ResourceConfig, Subsystem, hierarchy};

/// Adapter over the `memory` hierarchy; caps the cgroup's memory usage.
pub struct MemorySubsystem;

impl Subsystem for MemorySubsystem {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn set(&self, cgroup_path: &str, config: &ResourceConfig) -> VesselResult<()> {
        let dir = hierarchy::cgroup_dir(self.name(), cgroup_path, true)?;
        if !config.memory_limit.is_empty() {
            std::fs::write(dir.join("memory.limit_in_bytes"), &config.memory_limit)?;
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
