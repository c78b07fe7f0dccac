//! Cgroup v1 hierarchy discovery.
//!
//! A v1 subsystem lives wherever the host mounted it. The mount point is
//! found by scanning `/proc/self/mountinfo` for the cgroup entry whose
//! superblock options name the subsystem.

use std::path::PathBuf;

use vessel_common::{VesselError, VesselResult};

/// Locate the mount point of the hierarchy carrying `subsystem`.
pub fn find_mountpoint(subsystem: &str) -> VesselResult<PathBuf> {
    let mountinfo = std::fs::read_to_string("/proc/self/mountinfo")?;
    parse_mountpoint(&mountinfo, subsystem).ok_or_else(|| VesselError::CgroupNotMounted {
        subsystem: subsystem.to_string(),
    })
}

/// Scan mountinfo text for the hierarchy whose options include
/// `subsystem`.
///
/// A line looks like:
/// `39 34 0:33 / /sys/fs/cgroup/memory rw,nosuid - cgroup cgroup rw,memory`
/// where field 4 is the mount point and the final field holds the
/// superblock options.
fn parse_mountpoint(mountinfo: &str, subsystem: &str) -> Option<PathBuf> {
    for line in mountinfo.lines() {
        let fields: Vec<&str> = line.split(' ').collect();
        let (Some(mount_point), Some(options)) = (fields.get(4), fields.last()) else {
            continue;
        };
        if options.split(',').any(|opt| opt == subsystem) {
            return Some(PathBuf::from(mount_point));
        }
    }
    None
}

/// Resolve the absolute directory of `cgroup_path` under the hierarchy
/// carrying `subsystem`, creating it when `auto_create` is set.
pub fn cgroup_dir(
    subsystem: &str,
    cgroup_path: &str,
    auto_create: bool,
) -> VesselResult<PathBuf> {
    let dir = find_mountpoint(subsystem)?.join(cgroup_path);
    if !dir.exists() {
        if !auto_create {
            return Err(VesselError::Config {
                message: format!("cgroup {} does not exist under {}", cgroup_path, subsystem),
            });
        }
        std::fs::create_dir(&dir)?;
        tracing::debug!(subsystem, path = %dir.display(), "Created cgroup directory");
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOUNTINFO: &str = "\
34 25 0:29 / /sys/fs/cgroup ro,nosuid,nodev,noexec shared:9 - tmpfs tmpfs ro,mode=755
39 34 0:33 / /sys/fs/cgroup/memory rw,nosuid,nodev,noexec,relatime shared:15 - cgroup cgroup rw,memory
40 34 0:34 / /sys/fs/cgroup/cpu,cpuacct rw,nosuid,nodev,noexec,relatime shared:16 - cgroup cgroup rw,cpu,cpuacct
41 34 0:35 / /sys/fs/cgroup/cpuset rw,nosuid,nodev,noexec,relatime shared:17 - cgroup cgroup rw,cpuset";

    #[test]
    fn finds_memory_hierarchy() {
        assert_eq!(
            parse_mountpoint(MOUNTINFO, "memory"),
            Some(PathBuf::from("/sys/fs/cgroup/memory"))
        );
    }

    #[test]
    fn finds_combined_cpu_hierarchy() {
        // cpu and cpuacct share one hierarchy; the option list still
        // matches on the exact subsystem name.
        assert_eq!(
            parse_mountpoint(MOUNTINFO, "cpu"),
            Some(PathBuf::from("/sys/fs/cgroup/cpu,cpuacct"))
        );
    }

    #[test]
    fn no_partial_option_match() {
        // "cpuset" must not match the "cpu" option of another hierarchy.
        assert_eq!(
            parse_mountpoint(MOUNTINFO, "cpuset"),
            Some(PathBuf::from("/sys/fs/cgroup/cpuset"))
        );
        assert_eq!(parse_mountpoint(MOUNTINFO, "pids"), None);
    }
}
