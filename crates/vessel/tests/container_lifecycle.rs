//! Integration tests for the container record lifecycle.
//!
//! Exercises the state machine the CLI-facing operations rely on —
//! create, list, stop-mutation, remove-refusal, remove — on a temporary
//! state root. Kernel-side effects (mounts, namespaces, cgroups) need
//! root and are not driven from here.

use std::error::Error;

use tempfile::TempDir;
use vessel::{ContainerStatus, StateStore};
use vessel_common::VesselPaths;

fn echo_command() -> Vec<String> {
    vec!["/bin/echo".to_string(), "hello".to_string()]
}

#[test]
fn create_then_list_shows_one_running_record() -> Result<(), Box<dyn Error>> {
    let temp = TempDir::new()?;
    let paths = VesselPaths::with_root(temp.path());
    let store = StateStore::new(paths);

    store.record(std::process::id(), &echo_command(), "demo", "")?;

    let listed = store.list()?;
    let matching: Vec<_> = listed.iter().filter(|c| c.name == "demo").collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].status, ContainerStatus::Running);
    assert_eq!(matching[0].command, "/bin/echo hello");
    assert!(!matching[0].pid.is_empty());
    assert_eq!(matching[0].id.len(), 10);

    Ok(())
}

#[test]
fn stop_clears_pid_and_marks_stopped() -> Result<(), Box<dyn Error>> {
    let temp = TempDir::new()?;
    let paths = VesselPaths::with_root(temp.path());
    let store = StateStore::new(paths);

    store.record(4242, &echo_command(), "bg", "")?;
    store.update("bg", ContainerStatus::Stopped, "")?;

    let info = store.get("bg")?;
    assert_eq!(info.status, ContainerStatus::Stopped);
    assert_eq!(info.pid, "");

    Ok(())
}

#[test]
fn remove_refuses_running_container() -> Result<(), Box<dyn Error>> {
    let temp = TempDir::new()?;
    let paths = VesselPaths::with_root(temp.path());
    let store = StateStore::new(paths.clone());

    store.record(4242, &echo_command(), "busy", "/host:/data")?;

    // The rm operation must refuse and leave the record unchanged.
    let before = store.get("busy")?;
    let result = vessel::ops::remove_container(&paths, "busy");
    assert!(result.is_err());
    assert_eq!(store.get("busy")?, before);

    Ok(())
}

#[test]
fn remove_deletes_record_and_layers_but_not_image() -> Result<(), Box<dyn Error>> {
    let temp = TempDir::new()?;
    let paths = VesselPaths::with_root(temp.path());
    let store = StateStore::new(paths.clone());

    // Simulate the layers a run would have left behind. No mounts are
    // active, so teardown's unmount steps degrade to logged warnings.
    let image_layer = paths.image_layer("busybox");
    std::fs::create_dir_all(&image_layer)?;
    std::fs::create_dir_all(paths.write_layer("done"))?;
    std::fs::create_dir_all(paths.mount_point("done"))?;

    store.record(4242, &echo_command(), "done", "")?;
    store.update("done", ContainerStatus::Stopped, "")?;

    vessel::ops::remove_container(&paths, "done")?;

    assert!(!store.exists("done"));
    assert!(!paths.container("done").exists());
    // The shared read-only layer stays.
    assert!(image_layer.exists());

    Ok(())
}

#[test]
fn removing_unknown_container_reports_not_found() -> Result<(), Box<dyn Error>> {
    let temp = TempDir::new()?;
    let paths = VesselPaths::with_root(temp.path());

    let err = vessel::ops::remove_container(&paths, "ghost").unwrap_err();
    assert!(err.to_string().contains("not found"));

    Ok(())
}
