//! The per-container cgroup controller.

use vessel_common::{VesselError, VesselResult};

use super::{CpuSubsystem, CpusetSubsystem, MemorySubsystem, ResourceConfig, Subsystem};

/// Applies resource limits and enrolls a pid across every subsystem
/// adapter as one logical unit.
///
/// Created once per container run; [`CgroupManager::destroy`] is called
/// best-effort when the container exits or its creation aborts. A missing
/// kernel subsystem degrades that one resource instead of failing the
/// whole container.
pub struct CgroupManager {
    /// Cgroup path, relative to each hierarchy's mount point.
    path: String,
    /// Resource limits for this run.
    config: ResourceConfig,
    /// Adapters in fixed order: cpuset, memory, cpu.
    subsystems: Vec<Box<dyn Subsystem>>,
}

impl CgroupManager {
    /// Create a controller for the cgroup named `path`.
    #[must_use]
    pub fn new(path: impl Into<String>, config: ResourceConfig) -> Self {
        Self {
            path: path.into(),
            config,
            subsystems: vec![
                Box::new(CpusetSubsystem),
                Box::new(MemorySubsystem),
                Box::new(CpuSubsystem),
            ],
        }
    }

    /// Write the configured limits into every adapter's control files.
    ///
    /// A fully empty config touches no kernel file. Otherwise every
    /// adapter materializes its cgroup directory (so the path exists
    /// under all hierarchies or none), and per-adapter failures are
    /// collected without stopping the rest.
    pub fn set(&self) -> VesselResult<()> {
        if self.config.is_empty() {
            return Ok(());
        }

        let mut first_err = None;
        for subsystem in &self.subsystems {
            if let Err(err) = subsystem.set(&self.path, &self.config) {
                tracing::warn!(
                    subsystem = subsystem.name(),
                    cgroup = %self.path,
                    error = %err,
                    "Failed to set resource limit"
                );
                first_err.get_or_insert(err);
            }
        }
        Self::degraded(first_err)
    }

    /// Enroll `pid` into every adapter's cgroup.
    ///
    /// No-op when no limits are configured. Failures leave the limits
    /// incomplete rather than aborting the container.
    pub fn apply(&self, pid: u32) -> VesselResult<()> {
        if self.config.is_empty() {
            return Ok(());
        }

        let mut first_err = None;
        for subsystem in &self.subsystems {
            if let Err(err) = subsystem.apply(&self.path, pid) {
                tracing::warn!(
                    subsystem = subsystem.name(),
                    cgroup = %self.path,
                    pid,
                    error = %err,
                    "Failed to enroll pid in cgroup"
                );
                first_err.get_or_insert(err);
            }
        }
        Self::degraded(first_err)
    }

    /// Remove every adapter's cgroup directory, best-effort.
    ///
    /// Removal failures are logged only; teardown must proceed even if
    /// the kernel has not yet released all enrolled tasks.
    pub fn destroy(&self) {
        if self.config.is_empty() {
            return;
        }

        for subsystem in &self.subsystems {
            if let Err(err) = subsystem.remove(&self.path) {
                tracing::warn!(
                    subsystem = subsystem.name(),
                    cgroup = %self.path,
                    error = %err,
                    "Failed to remove cgroup"
                );
            }
        }
    }

    /// Map a collected per-adapter failure into the caller's "limits may
    /// be incomplete" signal.
    fn degraded(first_err: Option<VesselError>) -> VesselResult<()> {
        match first_err {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}
