//! Container filesystem layers.
//!
//! Builds and dismantles a container's root filesystem view: a shared
//! read-only image layer, a private writable layer union-mounted over it,
//! and optional host-volume bind mounts.

mod mounts;
mod overlay;
mod workspace;

pub use mounts::{bind_mount, detach_unmount};
pub use overlay::OverlayFs;
pub use workspace::{delete_workspace, new_workspace, parse_volume_spec};
