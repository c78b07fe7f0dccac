#![allow(unsafe_code)]
//! Parent side of the container process.

use std::fs::File;
use std::io::Write;
use std::os::fd::{IntoRawFd, OwnedFd};
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

use rustix::thread::UnshareFlags;
use vessel_common::{VesselError, VesselPaths, VesselResult};

use super::INIT_PIPE_FD;
use crate::filesystem;

/// Build the container's first process and its startup-command channel.
///
/// The returned [`Command`] re-invokes the running binary with the
/// internal `init` subcommand, so one binary plays both the orchestrator
/// and container-pid-1 roles. New UTS, PID, mount, network and IPC
/// namespaces are requested for the child: the PID namespace is unshared
/// here on the parent side (it only ever affects children), the rest in a
/// pre-exec hook in the child itself, so no partially isolated child is
/// observable.
///
/// Side effect: builds the container's filesystem workspace so the mount
/// point exists before the child starts in it.
pub fn new_parent_process(
    paths: &VesselPaths,
    tty: bool,
    volume: &str,
    container_name: &str,
    image_name: &str,
    env: &[String],
) -> VesselResult<(Command, OwnedFd)> {
    filesystem::new_workspace(paths, volume, image_name, container_name)?;

    let (read_end, write_end) = rustix::pipe::pipe_with(rustix::pipe::PipeFlags::CLOEXEC)
        .map_err(|e| VesselError::Io(e.into()))?;

    let mut cmd = Command::new("/proc/self/exe");
    cmd.arg("init");
    cmd.current_dir(paths.mount_point(container_name));
    cmd.envs(parse_env(env));

    if tty {
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
    } else {
        std::fs::create_dir_all(paths.info_dir(container_name))?;
        let log = File::create(paths.log_file(container_name))?;
        cmd.stdout(Stdio::from(log));
    }

    // The read end moves into the child over descriptor 3; the CLOEXEC
    // original closes at exec. The closure may run more than once in
    // theory, so it must not consume the fd.
    let read_fd = read_end.into_raw_fd();
    let hook = move || {
        // SAFETY: between fork and exec; dup2 and unshare are
        // async-signal-safe raw syscalls.
        if unsafe { libc::dup2(read_fd, INIT_PIPE_FD) } == -1 {
            return Err(std::io::Error::last_os_error());
        }
        unsafe {
            rustix::thread::unshare_unsafe(
                UnshareFlags::NEWNS
                    | UnshareFlags::NEWUTS
                    | UnshareFlags::NEWIPC
                    | UnshareFlags::NEWNET,
            )?;
        }
        Ok(())
    };
    // SAFETY: the hook only performs the raw syscalls above.
    unsafe {
        cmd.pre_exec(hook);
    }

    // The next child this process spawns becomes pid 1 of a fresh pid
    // namespace.
    unsafe { rustix::thread::unshare_unsafe(UnshareFlags::NEWPID) }
        .map_err(|e| VesselError::Io(e.into()))?;

    Ok((cmd, write_end))
}

/// Write the user's startup command into the channel and close it,
/// unblocking the init process's read.
///
/// Tokens are joined with a single space; init splits on the same
/// separator. Arguments containing spaces are therefore not
/// distinguishable from separate tokens — a documented limitation of the
/// encoding.
pub fn send_init_command(command: &[String], write_end: OwnedFd) -> VesselResult<()> {
    let joined = command.join(" ");
    tracing::info!(command = %joined, "Sending startup command");

    let mut pipe = File::from(write_end);
    pipe.write_all(joined.as_bytes())?;
    // Dropping the file closes the last write end; the child's read
    // returns EOF.
    Ok(())
}

/// Split `KEY=VALUE` strings into env pairs; malformed entries are
/// dropped with a warning.
fn parse_env(env: &[String]) -> Vec<(String, String)> {
    env.iter()
        .filter_map(|entry| match entry.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                Some((key.to_string(), value.to_string()))
            }
            _ => {
                tracing::warn!(entry = %entry, "Ignoring malformed env entry (expected KEY=VALUE)");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parsing() {
        let env = vec![
            "FOO=bar".to_string(),
            "EMPTY=".to_string(),
            "broken".to_string(),
            "=nokey".to_string(),
        ];
        let pairs = parse_env(&env);
        assert_eq!(
            pairs,
            vec![
                ("FOO".to_string(), "bar".to_string()),
                ("EMPTY".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn command_join_is_single_space() {
        // The pipe encoding cannot represent embedded spaces; "echo",
        // "a b" and "echo", "a", "b" serialize identically.
        let with_spaces = ["echo".to_string(), "a b".to_string()].join(" ");
        let separate = ["echo".to_string(), "a".to_string(), "b".to_string()].join(" ");
        assert_eq!(with_spaces, separate);
    }
}
