//! Package a container into an image archive.

use std::fs::File;

use flate2::Compression;
use flate2::write::GzEncoder;
use vessel_common::{VesselError, VesselPaths, VesselResult};

/// Archive a container's root filesystem view into a distributable image.
///
/// The mount point (writable layer merged over the image layer) is
/// tarred into `<root>/images/<image>.tar`, where `run` will find it.
pub fn commit_container(
    paths: &VesselPaths,
    container_name: &str,
    image_name: &str,
) -> VesselResult<()> {
    let mount_point = paths.mount_point(container_name);
    if !mount_point.exists() {
        return Err(VesselError::ContainerNotFound {
            name: container_name.to_string(),
        });
    }

    std::fs::create_dir_all(paths.images())?;
    let archive_path = paths.image_archive(image_name);
    tracing::info!(
        container = container_name,
        archive = %archive_path.display(),
        "Committing container"
    );

    let file = File::create(&archive_path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);
    builder.append_dir_all(".", &mount_point)?;
    builder.into_inner()?.finish()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn commits_mount_point_to_archive() {
        let temp = tempdir().unwrap();
        let paths = VesselPaths::with_root(temp.path());

        let merged = paths.mount_point("demo");
        std::fs::create_dir_all(&merged).unwrap();
        std::fs::write(merged.join("greeting"), b"hello\n").unwrap();

        commit_container(&paths, "demo", "demo-image").unwrap();
        assert!(paths.image_archive("demo-image").exists());
    }

    #[test]
    fn unknown_container_is_refused() {
        let temp = tempdir().unwrap();
        let paths = VesselPaths::with_root(temp.path());
        assert!(matches!(
            commit_container(&paths, "nosuch", "img"),
            Err(VesselError::ContainerNotFound { .. })
        ));
    }
}
