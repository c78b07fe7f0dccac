//! Exec into a running container.

use std::process::Command;

use vessel_common::{VesselError, VesselPaths, VesselResult};

use crate::state::StateStore;

/// Environment variable carrying the target container's host pid.
///
/// Consumed, together with [`ENV_EXEC_CMD`], by the privileged
/// namespace-entry hook: a constructor-style native hook that joins the
/// target's namespaces via `/proc/<pid>/ns/*` before this program's own
/// entry point runs, executes the command, and exits the helper.
pub const ENV_EXEC_PID: &str = "VESSEL_EXEC_PID";

/// Environment variable carrying the command to run inside the container.
pub const ENV_EXEC_CMD: &str = "VESSEL_EXEC_CMD";

/// Run a command inside a running container's namespaces.
///
/// Spawns a helper copy of this binary with the two namespace-entry
/// variables set and the target container's own environment merged in;
/// the helper's namespaces are otherwise untouched before the hook runs.
pub fn exec_container(paths: &VesselPaths, name: &str, command: &[String]) -> VesselResult<()> {
    let store = StateStore::new(paths.clone());
    let info = store.get(name)?;

    if info.pid.is_empty() {
        return Err(VesselError::WrongState {
            name: name.to_string(),
            status: info.status.to_string(),
            expected: "running".to_string(),
        });
    }

    let cmd_str = command.join(" ");
    tracing::info!(container = name, pid = %info.pid, command = %cmd_str, "Entering container");

    let mut helper = Command::new("/proc/self/exe");
    helper
        .arg("exec")
        .arg(name)
        .args(command)
        .env(ENV_EXEC_PID, &info.pid)
        .env(ENV_EXEC_CMD, &cmd_str)
        .envs(container_env(&info.pid));

    let status = helper.status()?;
    if !status.success() {
        tracing::warn!(container = name, code = ?status.code(), "Exec helper exited nonzero");
    }
    Ok(())
}

/// Read the target container's environment from `/proc/<pid>/environ`.
///
/// Entries are NUL-separated `KEY=VALUE` strings.
fn container_env(pid: &str) -> Vec<(String, String)> {
    let path = format!("/proc/{pid}/environ");
    let Ok(raw) = std::fs::read(&path) else {
        tracing::warn!(path = %path, "Could not read container environment");
        return Vec::new();
    };

    raw.split(|b| *b == 0)
        .filter_map(|entry| {
            let entry = std::str::from_utf8(entry).ok()?;
            let (key, value) = entry.split_once('=')?;
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_environ_parses() {
        // Our own /proc entry is a valid sample of the format.
        let pid = std::process::id().to_string();
        let env = container_env(&pid);
        assert!(env.iter().all(|(k, _)| !k.is_empty()));
        assert!(env.iter().any(|(k, _)| k == "PATH"));
    }
}
