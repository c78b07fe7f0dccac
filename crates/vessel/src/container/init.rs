#![allow(unsafe_code)]
//! Container init: the first process inside the new namespaces.

use std::ffi::CString;
use std::fs::File;
use std::io::Read;
use std::os::fd::FromRawFd;
use std::path::{Path, PathBuf};

use rustix::mount::{MountFlags, mount};
use vessel_common::{VesselError, VesselResult};

use super::INIT_PIPE_FD;
use crate::filesystem;

/// Run as the container's first process.
///
/// Executed only inside the re-exec'd child, after its namespaces are in
/// effect: switches the root filesystem to the mount point the parent
/// placed us in, reads the startup command from the inherited pipe, and
/// replaces this process image with the user's command — the same pid
/// becomes the user's process, so inside the container it shows as pid 1.
///
/// Returns only on failure; the caller exits non-zero.
pub fn run_container_init_process() -> VesselResult<()> {
    setup_mount()?;

    let command = read_startup_command()?;

    let path = find_in_path(&command[0]).ok_or_else(|| VesselError::Config {
        message: format!("executable {} not found on PATH", command[0]),
    })?;
    tracing::info!(path = %path.display(), "Resolved container command");

    exec(&path, &command)
}

/// Read the startup command from the inherited pipe descriptor.
///
/// Blocks until the parent writes the command and closes its end. The
/// payload is split on single spaces; arguments containing spaces are not
/// recoverable (a documented limitation of the pipe encoding).
fn read_startup_command() -> VesselResult<Vec<String>> {
    // SAFETY: descriptor 3 is the pipe read end the parent dup'd in
    // before exec; nothing else in this process owns it.
    let mut pipe = unsafe { File::from_raw_fd(INIT_PIPE_FD) };

    let mut payload = String::new();
    pipe.read_to_string(&mut payload)?;

    if payload.is_empty() {
        return Err(VesselError::Config {
            message: "no startup command received on init pipe".to_string(),
        });
    }

    Ok(payload.split(' ').map(str::to_string).collect())
}

/// Switch this process's root to the current working directory and mount
/// the fresh kernel filesystems a container expects.
fn setup_mount() -> VesselResult<()> {
    let new_root = std::env::current_dir()?;
    tracing::info!(root = %new_root.display(), "Switching container root");

    // Mount events must stop propagating to the host before the root is
    // re-plumbed; pivot_root refuses shared mounts.
    make_rprivate()?;

    pivot_root(&new_root)?;

    // A fresh /proc, with flags that keep a hostile root filesystem from
    // supplying set-id binaries or device nodes through it.
    let proc_flags = MountFlags::NOEXEC | MountFlags::NOSUID | MountFlags::NODEV;
    mount_fs("proc", "/proc", "proc", proc_flags, "")?;

    mount_fs(
        "tmpfs",
        "/dev",
        "tmpfs",
        MountFlags::NOSUID | MountFlags::STRICTATIME,
        "mode=755",
    )?;

    Ok(())
}

/// Pivot the process root to `new_root`, detaching the old root.
///
/// The new root is first bind-mounted onto itself: `pivot_root(2)`
/// requires a mount point, not merely a directory. The old root lands on
/// a transient directory under the new root, is lazily unmounted (other
/// processes may still reference it), and the directory is removed.
pub fn pivot_root(new_root: &Path) -> VesselResult<()> {
    mount_self_bind(new_root)?;

    let put_old = new_root.join(".pivot_root");
    std::fs::create_dir_all(&put_old)?;

    let new_root_c =
        CString::new(new_root.as_os_str().as_encoded_bytes()).map_err(|_| VesselError::Config {
            message: "root path contains a null byte".to_string(),
        })?;
    let put_old_c =
        CString::new(put_old.as_os_str().as_encoded_bytes()).map_err(|_| VesselError::Config {
            message: "pivot path contains a null byte".to_string(),
        })?;

    // SAFETY: both paths are valid C strings for the duration of the call.
    let ret = unsafe {
        libc::syscall(
            libc::SYS_pivot_root,
            new_root_c.as_ptr(),
            put_old_c.as_ptr(),
        )
    };
    if ret != 0 {
        return Err(VesselError::Io(std::io::Error::last_os_error()));
    }

    std::env::set_current_dir("/")?;

    let old_root = Path::new("/.pivot_root");
    filesystem::detach_unmount(old_root)?;
    std::fs::remove_dir(old_root)?;

    Ok(())
}

/// Mark the whole mount tree private to this namespace.
fn make_rprivate() -> VesselResult<()> {
    use rustix::mount::{MountPropagationFlags, mount_change};

    mount_change(
        "/",
        MountPropagationFlags::PRIVATE | MountPropagationFlags::REC,
    )
    .map_err(|e| VesselError::Io(e.into()))?;
    Ok(())
}

/// Bind-mount a directory onto itself so it becomes a mount point.
fn mount_self_bind(path: &Path) -> VesselResult<()> {
    let empty = CString::new("").expect("static string");
    mount(
        path,
        path,
        empty.as_c_str(),
        MountFlags::BIND | MountFlags::REC,
        empty.as_c_str(),
    )
    .map_err(|e| VesselError::Io(e.into()))?;
    Ok(())
}

/// Mount a kernel filesystem at `target`.
fn mount_fs(
    source: &str,
    target: &str,
    fstype: &str,
    flags: MountFlags,
    data: &str,
) -> VesselResult<()> {
    let fstype_c = CString::new(fstype).expect("static string");
    let data_c = CString::new(data).expect("static string");
    mount(source, target, fstype_c.as_c_str(), flags, data_c.as_c_str())
        .map_err(|e| VesselError::Io(e.into()))?;
    Ok(())
}

/// Resolve an executable name the way the shell would.
fn find_in_path(name: &str) -> Option<PathBuf> {
    if name.contains('/') {
        let path = PathBuf::from(name);
        return is_executable(&path).then_some(path);
    }

    let search_path = std::env::var_os("PATH")?;
    std::env::split_paths(&search_path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Replace this process image with the resolved command.
///
/// Returns only if the kernel refuses the replacement.
fn exec(path: &Path, command: &[String]) -> VesselResult<()> {
    let path_c =
        CString::new(path.as_os_str().as_encoded_bytes()).map_err(|_| VesselError::Config {
            message: "command path contains a null byte".to_string(),
        })?;

    let args: Vec<CString> = command
        .iter()
        .filter_map(|arg| CString::new(arg.as_bytes()).ok())
        .collect();
    let mut argv: Vec<*const libc::c_char> = args.iter().map(|a| a.as_ptr()).collect();
    argv.push(std::ptr::null());

    // SAFETY: argv is null-terminated and its CStrings outlive the call.
    unsafe {
        libc::execv(path_c.as_ptr(), argv.as_ptr());
    }

    Err(VesselError::Internal {
        message: format!(
            "exec {} failed: {}",
            path.display(),
            std::io::Error::last_os_error()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_absolute_paths_directly() {
        assert_eq!(find_in_path("/bin/sh"), Some(PathBuf::from("/bin/sh")));
        assert_eq!(find_in_path("/no/such/binary"), None);
    }

    #[test]
    fn resolves_names_on_path() {
        // sh is present on any host this engine targets.
        let sh = find_in_path("sh").expect("sh should be on PATH");
        assert!(sh.is_absolute());
        assert!(is_executable(&sh));
    }

    #[test]
    fn startup_command_splits_on_single_space() {
        let payload = "/bin/echo hello world";
        let tokens: Vec<&str> = payload.split(' ').collect();
        assert_eq!(tokens, vec!["/bin/echo", "hello", "world"]);
    }
}
