//! Container workspace assembly and teardown.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use vessel_common::{VesselError, VesselPaths, VesselResult};

use super::OverlayFs;

/// Build a container's root filesystem view.
///
/// Extracts the image's read-only layer if this is the first container
/// from that image, creates the private writable layer, union-mounts the
/// two at the container's mount point, and bind-mounts the optional
/// `host:container` volume inside it. A malformed volume spec is logged
/// and ignored; the container still starts without the volume.
pub fn new_workspace(
    paths: &VesselPaths,
    volume: &str,
    image_name: &str,
    container_name: &str,
) -> VesselResult<()> {
    ensure_read_only_layer(paths, image_name)?;

    let overlay = OverlayFs::for_container(
        &paths.container(container_name),
        paths.image_layer(image_name),
    );
    overlay.mount()?;

    if !volume.is_empty() {
        match parse_volume_spec(volume) {
            Some((host_path, container_path)) => {
                mount_volume(paths, container_name, host_path, container_path)?;
            }
            None => {
                tracing::warn!(volume, "Volume spec is not host:container, ignoring");
            }
        }
    }

    Ok(())
}

/// Tear down a container's root filesystem view, in reverse order of
/// assembly.
///
/// Every step logs and continues: a partially torn-down workspace is less
/// harmful than leaking an inconsistent container state into the caller.
/// The shared read-only image layer is never removed here.
pub fn delete_workspace(paths: &VesselPaths, volume: &str, container_name: &str) {
    if !volume.is_empty() {
        if let Some((_, container_path)) = parse_volume_spec(volume) {
            let target = paths
                .mount_point(container_name)
                .join(container_path.trim_start_matches('/'));
            if let Err(err) = super::detach_unmount(&target) {
                tracing::warn!(target = %target.display(), error = %err, "Failed to unmount volume");
            }
        }
    }

    let mount_point = paths.mount_point(container_name);
    if let Err(err) = super::detach_unmount(&mount_point) {
        tracing::warn!(target = %mount_point.display(), error = %err, "Failed to unmount rootfs");
    }

    let container_dir = paths.container(container_name);
    if container_dir.exists() {
        if let Err(err) = std::fs::remove_dir_all(&container_dir) {
            tracing::warn!(dir = %container_dir.display(), error = %err, "Failed to remove container layers");
        }
    }
}

/// Extract the image archive into its read-only layer, exactly once.
///
/// An existing layer directory short-circuits the extraction, so the
/// layer is shared untouched across containers.
fn ensure_read_only_layer(paths: &VesselPaths, image_name: &str) -> VesselResult<()> {
    let layer = paths.image_layer(image_name);
    if layer.exists() {
        tracing::debug!(image = image_name, "Read-only layer already extracted");
        return Ok(());
    }

    let archive_path = paths.image_archive(image_name);
    if !archive_path.exists() {
        return Err(VesselError::ImageNotFound {
            image: image_name.to_string(),
        });
    }

    std::fs::create_dir_all(&layer)?;
    extract_archive(&archive_path, &layer)?;
    tracing::info!(image = image_name, layer = %layer.display(), "Extracted read-only layer");
    Ok(())
}

/// Unpack a tar archive, transparently handling gzip compression.
fn extract_archive(archive_path: &Path, dest: &Path) -> VesselResult<()> {
    let mut file = File::open(archive_path)?;

    let mut magic = [0u8; 2];
    let gzipped = file.read_exact(&mut magic).is_ok() && magic == [0x1f, 0x8b];
    file.seek(SeekFrom::Start(0))?;

    if gzipped {
        let decoder = flate2::read::GzDecoder::new(BufReader::new(file));
        tar::Archive::new(decoder).unpack(dest)?;
    } else {
        tar::Archive::new(BufReader::new(file)).unpack(dest)?;
    }
    Ok(())
}

/// Split a `host:container` volume spec.
///
/// Returns `None` unless there are exactly two non-empty segments.
pub fn parse_volume_spec(volume: &str) -> Option<(&str, &str)> {
    match volume.split(':').collect::<Vec<_>>()[..] {
        [host, container] if !host.is_empty() && !container.is_empty() => {
            Some((host, container))
        }
        _ => None,
    }
}

/// Bind-mount `host_path` onto `container_path` inside the mount point.
///
/// Both directories are created if absent.
fn mount_volume(
    paths: &VesselPaths,
    container_name: &str,
    host_path: &str,
    container_path: &str,
) -> VesselResult<()> {
    let host = Path::new(host_path);
    if !host.exists() {
        std::fs::create_dir_all(host)?;
    }

    let target = paths
        .mount_point(container_name)
        .join(container_path.trim_start_matches('/'));
    std::fs::create_dir_all(&target)?;

    super::bind_mount(host, &target)?;

    tracing::info!(
        host = host_path,
        container = container_path,
        "Volume mounted"
    );
    Ok(())
}
