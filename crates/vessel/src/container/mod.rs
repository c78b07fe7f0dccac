//! Process isolation.
//!
//! The parent side builds a not-yet-started child that re-invokes this
//! binary's `init` subcommand inside fresh namespaces; the init side
//! pivots into the container rootfs and replaces itself with the user's
//! command. The two halves communicate over a one-shot pipe on a fixed
//! descriptor.

mod init;
mod process;

pub use init::run_container_init_process;
pub use process::{new_parent_process, send_init_command};

/// Descriptor index of the startup-command pipe in the init process.
///
/// The first free slot after stdin/stdout/stderr; the parent dups the
/// pipe's read end there before exec.
pub const INIT_PIPE_FD: i32 = 3;
