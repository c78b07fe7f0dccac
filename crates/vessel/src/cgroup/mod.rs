//! Cgroup v1 resource control.
//!
//! Each controllable resource (cpu share, cpu set, memory ceiling) is an
//! adapter over its kernel control-group hierarchy; the [`CgroupManager`]
//! fans operations across all adapters for one container's cgroup path.

mod cpu;
mod cpuset;
mod hierarchy;
mod manager;
mod memory;

pub use cpu::CpuSubsystem;
pub use cpuset::CpusetSubsystem;
pub use manager::CgroupManager;
pub use memory::MemorySubsystem;

use vessel_common::VesselResult;

/// Resource limits for one container run.
///
/// Values are passed verbatim to the kernel control files; an empty
/// string leaves that resource at the kernel default.
#[derive(Debug, Clone, Default)]
pub struct ResourceConfig {
    /// Memory ceiling, kernel byte-quantity format (e.g. `100m`).
    pub memory_limit: String,
    /// Relative CPU weight.
    pub cpu_share: String,
    /// CPU index list (e.g. `0-1` or `0,3`).
    pub cpu_set: String,
}

impl ResourceConfig {
    /// True when no resource field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memory_limit.is_empty() && self.cpu_share.is_empty() && self.cpu_set.is_empty()
    }
}

/// One resource adapter over a cgroup v1 hierarchy.
///
/// An adapter owns no state; every method resolves the hierarchy mount
/// point from the running process's mount table on each call.
pub trait Subsystem {
    /// Kernel name of the subsystem (`cpu`, `cpuset`, `memory`).
    fn name(&self) -> &'static str;

    /// Write this adapter's limit for `config` into the cgroup at
    /// `cgroup_path`, creating the directory if needed. An empty config
    /// field writes nothing.
    fn set(&self, cgroup_path: &str, config: &ResourceConfig) -> VesselResult<()>;

    /// Enroll `pid` into the cgroup at `cgroup_path`.
    fn apply(&self, cgroup_path: &str, pid: u32) -> VesselResult<()>;

    /// Remove the cgroup directory at `cgroup_path`.
    fn remove(&self, cgroup_path: &str) -> VesselResult<()>;
}

/// Enroll a pid by writing it into the cgroup's task file.
fn write_tasks(subsystem: &'static str, cgroup_path: &str, pid: u32) -> VesselResult<()> {
    let dir = hierarchy::cgroup_dir(subsystem, cgroup_path, true)?;
    std::fs::write(dir.join("tasks"), pid.to_string())?;
    Ok(())
}

/// Remove a cgroup directory. The kernel refuses while tasks remain
/// enrolled; callers treat that as a degraded outcome.
fn remove_dir(subsystem: &'static str, cgroup_path: &str) -> VesselResult<()> {
    let dir = hierarchy::cgroup_dir(subsystem, cgroup_path, false)?;
    std::fs::remove_dir(dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config() {
        assert!(ResourceConfig::default().is_empty());
        let config = ResourceConfig {
            memory_limit: "100m".to_string(),
            ..Default::default()
        };
        assert!(!config.is_empty());
    }
}
