//! CLI command definitions and handlers.

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use vessel_common::VesselPaths;

use crate::cgroup::ResourceConfig;
use crate::ops;

/// Vessel - Minimal Container Engine
#[derive(Parser)]
#[command(name = "vessel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Engine commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create a container with namespace and cgroup isolation
    Run {
        /// Attach the container to the current terminal and wait
        #[arg(long = "ti", conflicts_with = "detach")]
        tty: bool,

        /// Run the container in the background
        #[arg(long = "d")]
        detach: bool,

        /// Memory limit (kernel byte-quantity format, e.g. 100m)
        #[arg(long = "m", value_name = "bytes")]
        memory: Option<String>,

        /// Relative CPU weight
        #[arg(long = "cpushare", value_name = "weight")]
        cpu_share: Option<String>,

        /// CPU index list (e.g. 0-1)
        #[arg(long = "cpuset", value_name = "cpus")]
        cpu_set: Option<String>,

        /// Bind a host directory into the container
        #[arg(long = "v", value_name = "host:container")]
        volume: Option<String>,

        /// Container name (defaults to a random identity)
        #[arg(long)]
        name: Option<String>,

        /// Extra environment entries for the container
        #[arg(long = "e", value_name = "key=val")]
        env: Vec<String>,

        /// Image name
        image: String,

        /// Command to run inside the container
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// Init container process (internal use only, never call directly)
    #[command(hide = true)]
    Init,

    /// Package a container's filesystem into an image
    Commit {
        /// Container name
        container: String,

        /// Image name to write
        image: String,
    },

    /// List all containers
    Ps,

    /// Print the captured output of a container
    Logs {
        /// Container name
        container: String,
    },

    /// Run a command inside a running container
    Exec {
        /// Container name
        container: String,

        /// Command to run
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// Stop a running container
    Stop {
        /// Container name
        container: String,
    },

    /// Remove a stopped container
    Rm {
        /// Container name
        container: String,
    },
}

impl Cli {
    /// Execute the parsed command.
    pub fn execute(self) -> Result<()> {
        let paths = VesselPaths::new();

        match self.command {
            Commands::Run {
                tty,
                detach: _,
                memory,
                cpu_share,
                cpu_set,
                volume,
                name,
                env,
                image,
                command,
            } => {
                let opts = ops::RunOptions {
                    tty,
                    name,
                    volume: volume.unwrap_or_default(),
                    env,
                    resources: ResourceConfig {
                        memory_limit: memory.unwrap_or_default(),
                        cpu_share: cpu_share.unwrap_or_default(),
                        cpu_set: cpu_set.unwrap_or_default(),
                    },
                };

                ops::run_container(&paths, &image, &command, opts)
                    .map_err(|e| color_eyre::eyre::eyre!("Failed to run container: {}", e))
            }

            Commands::Init => {
                // Reached only via the self-re-exec in new_parent_process;
                // on success the process image is replaced and this call
                // never returns.
                crate::container::run_container_init_process()
                    .map_err(|e| color_eyre::eyre::eyre!("Container init failed: {}", e))
            }

            Commands::Commit { container, image } => {
                ops::commit_container(&paths, &container, &image)
                    .map_err(|e| color_eyre::eyre::eyre!("Failed to commit container: {}", e))
            }

            Commands::Ps => ops::list_containers(&paths)
                .map_err(|e| color_eyre::eyre::eyre!("Failed to list containers: {}", e)),

            Commands::Logs { container } => ops::print_logs(&paths, &container)
                .map_err(|e| color_eyre::eyre::eyre!("Failed to read logs: {}", e)),

            Commands::Exec { container, command } => {
                if std::env::var_os(ops::ENV_EXEC_PID).is_some() {
                    // We are the re-exec'd helper: the namespace-entry
                    // hook already joined the target and ran the command
                    // before main started.
                    tracing::info!(pid = std::process::id(), "Exec helper callback");
                    return Ok(());
                }

                ops::exec_container(&paths, &container, &command)
                    .map_err(|e| color_eyre::eyre::eyre!("Failed to exec into container: {}", e))
            }

            Commands::Stop { container } => ops::stop_container(&paths, &container)
                .map_err(|e| color_eyre::eyre::eyre!("Failed to stop container: {}", e)),

            Commands::Rm { container } => ops::remove_container(&paths, &container)
                .map_err(|e| color_eyre::eyre::eyre!("Failed to remove container: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::parse_from([
            "vessel", "run", "--ti", "--m", "100m", "--cpushare", "512", "--v",
            "/host:/data", "--name", "demo", "--e", "FOO=bar", "busybox", "/bin/sh",
        ]);
        let Commands::Run {
            tty,
            memory,
            cpu_share,
            volume,
            name,
            env,
            image,
            command,
            ..
        } = cli.command
        else {
            panic!("expected run");
        };
        assert!(tty);
        assert_eq!(memory.as_deref(), Some("100m"));
        assert_eq!(cpu_share.as_deref(), Some("512"));
        assert_eq!(volume.as_deref(), Some("/host:/data"));
        assert_eq!(name.as_deref(), Some("demo"));
        assert_eq!(env, vec!["FOO=bar".to_string()]);
        assert_eq!(image, "busybox");
        assert_eq!(command, vec!["/bin/sh".to_string()]);
    }

    #[test]
    fn tty_and_detach_conflict() {
        let parsed = Cli::try_parse_from(["vessel", "run", "--ti", "--d", "busybox", "sh"]);
        assert!(parsed.is_err());
    }
}
