//! Container state persistence.
//!
//! One JSON record per container, in a directory keyed by container name
//! under the state root. The store provides no locking: the CLI-driven
//! access pattern is single-writer-per-container-name.

use std::fmt;

use serde::{Deserialize, Serialize};
use vessel_common::{VesselError, VesselPaths, VesselResult, random_id};

/// Lifecycle status of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    /// The container's first process is alive.
    Running,
    /// The container was stopped by the operator.
    Stopped,
    /// The container's first process exited on its own.
    Exited,
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Exited => "exited",
        };
        write!(f, "{s}")
    }
}

/// The persisted record for one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// Random 10-digit identity (collisions accepted).
    pub id: String,
    /// Human-chosen name, or a random identity when unspecified.
    pub name: String,
    /// Host pid of the container's first process; empty once stopped.
    pub pid: String,
    /// The container's entry command, space-joined.
    pub command: String,
    /// Formatted creation timestamp.
    pub created_time: String,
    /// Lifecycle status.
    pub status: ContainerStatus,
    /// Raw `host:container` volume spec, or empty.
    pub volume: String,
    /// Ordered `host:container` port strings, for the network subsystem.
    pub port_mapping: Vec<String>,
}

/// Durable store of container records, rooted at an injectable state
/// directory.
#[derive(Debug)]
pub struct StateStore {
    paths: VesselPaths,
}

impl StateStore {
    /// Create a store over the given paths.
    #[must_use]
    pub fn new(paths: VesselPaths) -> Self {
        Self { paths }
    }

    /// Persist a fresh record for a just-started container.
    ///
    /// Generates the random identity, stamps the creation time and sets
    /// the status to running. Failure here is fatal to container
    /// creation; the caller must tear down what it already built.
    pub fn record(
        &self,
        pid: u32,
        command: &[String],
        name: &str,
        volume: &str,
    ) -> VesselResult<ContainerInfo> {
        let info = ContainerInfo {
            id: random_id(),
            name: name.to_string(),
            pid: pid.to_string(),
            command: command.join(" "),
            created_time: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            status: ContainerStatus::Running,
            volume: volume.to_string(),
            port_mapping: Vec::new(),
        };

        std::fs::create_dir_all(self.paths.info_dir(name))?;
        let json = serde_json::to_string(&info)?;
        std::fs::write(self.paths.config_file(name), json)?;

        tracing::debug!(container = name, id = %info.id, "Recorded container");
        Ok(info)
    }

    /// Load one record by container name.
    pub fn get(&self, name: &str) -> VesselResult<ContainerInfo> {
        let path = self.paths.config_file(name);
        if !path.exists() {
            return Err(VesselError::ContainerNotFound {
                name: name.to_string(),
            });
        }
        let json = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Enumerate every record under the state root.
    ///
    /// A corrupt or unreadable record is skipped with a warning rather
    /// than failing the listing.
    pub fn list(&self) -> VesselResult<Vec<ContainerInfo>> {
        let mut containers = Vec::new();

        if !self.paths.state.exists() {
            return Ok(containers);
        }

        for entry in std::fs::read_dir(&self.paths.state)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            match self.get(&name) {
                Ok(info) => containers.push(info),
                Err(err) => {
                    tracing::warn!(container = %name, error = %err, "Skipping unreadable record");
                }
            }
        }

        Ok(containers)
    }

    /// Rewrite a record's status and pid.
    ///
    /// The record is written to a temporary file and renamed into place
    /// so a crash mid-write cannot truncate it.
    pub fn update(&self, name: &str, status: ContainerStatus, pid: &str) -> VesselResult<()> {
        let mut info = self.get(name)?;
        info.status = status;
        info.pid = pid.to_string();

        let json = serde_json::to_string(&info)?;
        let path = self.paths.config_file(name);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;

        tracing::debug!(container = name, status = %status, "Updated record");
        Ok(())
    }

    /// Delete a container's record directory (config and log).
    ///
    /// The stopped-only precondition is enforced by the caller.
    pub fn remove(&self, name: &str) -> VesselResult<()> {
        let dir = self.paths.info_dir(name);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
            tracing::debug!(container = name, "Deleted record");
        }
        Ok(())
    }

    /// Whether a record exists for `name`.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.paths.config_file(name).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(temp: &tempfile::TempDir) -> StateStore {
        StateStore::new(VesselPaths::with_root(temp.path()))
    }

    fn command() -> Vec<String> {
        vec!["/bin/sh".to_string(), "-c".to_string(), "true".to_string()]
    }

    #[test]
    fn record_and_get() {
        let temp = tempdir().unwrap();
        let store = store(&temp);

        let info = store.record(4242, &command(), "demo", "").unwrap();
        assert_eq!(info.id.len(), 10);
        assert_eq!(info.status, ContainerStatus::Running);

        let loaded = store.get("demo").unwrap();
        assert_eq!(loaded, info);
        assert_eq!(loaded.pid, "4242");
        assert_eq!(loaded.command, "/bin/sh -c true");
    }

    #[test]
    fn info_round_trips_through_json() {
        let info = ContainerInfo {
            id: "1234567890".to_string(),
            name: "demo".to_string(),
            pid: "77".to_string(),
            command: "/bin/echo hello".to_string(),
            created_time: "2026-08-07 12:00:00".to_string(),
            status: ContainerStatus::Running,
            volume: "/host/data:/data".to_string(),
            port_mapping: vec!["8080:80".to_string()],
        };
        let json = serde_json::to_string(&info).unwrap();
        let back: ContainerInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn list_skips_corrupt_records() {
        let temp = tempdir().unwrap();
        let store = store(&temp);

        store.record(1, &command(), "good", "").unwrap();

        let bad_dir = temp.path().join("state").join("bad");
        std::fs::create_dir_all(&bad_dir).unwrap();
        std::fs::write(bad_dir.join("config.json"), "not json").unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "good");
    }

    #[test]
    fn stop_mutation() {
        let temp = tempdir().unwrap();
        let store = store(&temp);

        store.record(99, &command(), "demo", "").unwrap();
        store.update("demo", ContainerStatus::Stopped, "").unwrap();

        let info = store.get("demo").unwrap();
        assert_eq!(info.status, ContainerStatus::Stopped);
        assert_eq!(info.pid, "");
    }

    #[test]
    fn remove_record() {
        let temp = tempdir().unwrap();
        let store = store(&temp);

        store.record(1, &command(), "demo", "").unwrap();
        assert!(store.exists("demo"));

        store.remove("demo").unwrap();
        assert!(!store.exists("demo"));
        assert!(matches!(
            store.get("demo"),
            Err(VesselError::ContainerNotFound { .. })
        ));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ContainerStatus::Running).unwrap();
        assert_eq!(json, "\"running\"");
        assert_eq!(ContainerStatus::Stopped.to_string(), "stopped");
    }
}
