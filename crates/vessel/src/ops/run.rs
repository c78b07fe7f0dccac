#![allow(unsafe_code)]
//! The "run a container" use case.

use vessel_common::{VesselPaths, VesselResult, random_id};

use crate::cgroup::{CgroupManager, ResourceConfig};
use crate::container::{new_parent_process, send_init_command};
use crate::filesystem;
use crate::state::StateStore;

/// Options for one container run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Wire the container to the controlling terminal and wait for it.
    pub tty: bool,
    /// Container name; defaults to a random identity.
    pub name: Option<String>,
    /// Raw `host:container` volume spec, or empty.
    pub volume: String,
    /// Extra `KEY=VALUE` environment entries for the container.
    pub env: Vec<String>,
    /// Resource limits.
    pub resources: ResourceConfig,
}

/// Create and start a container.
///
/// Drives the filesystem manager, process isolation manager, cgroup
/// controller and state store in order, rolling back everything acquired
/// so far if a fatal step fails. In foreground mode this blocks until the
/// container exits and then tears it down; detached, it returns
/// immediately and teardown happens at `stop`/`rm` time.
pub fn run_container(
    paths: &VesselPaths,
    image_name: &str,
    command: &[String],
    opts: RunOptions,
) -> VesselResult<()> {
    let container_name = opts.name.clone().unwrap_or_else(random_id);

    let (mut parent, write_end) = new_parent_process(
        paths,
        opts.tty,
        &opts.volume,
        &container_name,
        image_name,
        &opts.env,
    )?;

    let mut child = match parent.spawn() {
        Ok(child) => child,
        Err(err) => {
            tracing::error!(error = %err, "Failed to spawn container process");
            filesystem::delete_workspace(paths, &opts.volume, &container_name);
            return Err(err.into());
        }
    };
    let pid = child.id();
    tracing::info!(container = %container_name, pid, "Container process started");

    let store = StateStore::new(paths.clone());
    if let Err(err) = store.record(pid, command, &container_name, &opts.volume) {
        tracing::error!(error = %err, "Failed to persist container record");
        kill_and_reap(&mut child);
        filesystem::delete_workspace(paths, &opts.volume, &container_name);
        return Err(err);
    }

    let cgroup = CgroupManager::new(format!("vessel-{container_name}"), opts.resources.clone());
    let set_result = cgroup.set();
    let apply_result = cgroup.apply(pid);
    if set_result.is_err() || apply_result.is_err() {
        tracing::warn!(
            container = %container_name,
            "Resource limits may be incomplete"
        );
    }

    if let Err(err) = send_init_command(command, write_end) {
        tracing::error!(error = %err, "Failed to deliver startup command");
        kill_and_reap(&mut child);
        cgroup.destroy();
        let _ = store.remove(&container_name);
        filesystem::delete_workspace(paths, &opts.volume, &container_name);
        return Err(err);
    }

    if opts.tty {
        let status = child.wait()?;
        tracing::info!(
            container = %container_name,
            code = ?status.code(),
            "Container exited"
        );

        cgroup.destroy();
        if let Err(err) = store.remove(&container_name) {
            tracing::warn!(error = %err, "Failed to delete container record");
        }
        filesystem::delete_workspace(paths, &opts.volume, &container_name);
    } else {
        // Detached: the child is never waited on here; its cgroup and
        // record outlive this invocation until stop/rm.
        tracing::info!(container = %container_name, "Container running detached");
        println!("{container_name}");
    }

    Ok(())
}

/// Kill a half-created child and collect its exit, best-effort.
fn kill_and_reap(child: &mut std::process::Child) {
    // SAFETY: plain kill(2) on the pid we just spawned.
    unsafe {
        libc::kill(child.id() as libc::pid_t, libc::SIGKILL);
    }
    let _ = child.wait();
}
