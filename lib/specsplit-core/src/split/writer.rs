use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::SplitError;
use crate::yaml::ToYaml;

use super::service::Service;

/// Prepares the output directory for a partitioning run.
///
/// An existing directory is fatal unless `overwrite` is set, in which case
/// it is removed and recreated so stale service files never linger.
///
/// # Errors
///
/// Returns [`SplitError::DestinationExists`] when the directory exists and
/// `overwrite` is `false`, or an I/O error from removal/creation.
pub fn create_dest_dir(dir: &Path, overwrite: bool) -> Result<(), SplitError> {
    if dir.exists() {
        if !overwrite {
            return Err(SplitError::DestinationExists {
                path: dir.to_path_buf(),
            });
        }
        fs::remove_dir_all(dir)?;
        info!(path = %dir.display(), "cleaned destination directory");
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Writes each service document to `<dir>/<service>.yaml`, returning the
/// files written.
///
/// # Errors
///
/// Returns a [`SplitError`] on serialization or filesystem failure.
pub fn write_services(
    dir: &Path,
    services: &BTreeMap<String, Service>,
) -> Result<Vec<PathBuf>, SplitError> {
    let mut written = Vec::with_capacity(services.len());
    for (name, service) in services {
        let file = dir.join(format!("{name}.yaml"));
        fs::write(&file, service.to_yaml()?)?;
        info!(service = %name, file = %file.display(), "wrote service document");
        written.push(file);
    }
    Ok(written)
}
