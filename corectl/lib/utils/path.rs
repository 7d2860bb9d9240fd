//! Filesystem layout of the corectl home directory.

use std::path::{Path, PathBuf};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The sub directory in the user's home where corectl keeps images and run state.
pub const COREOS_HOME_DIR: &str = ".coreos";

/// The environment variable that overrides the corectl home directory.
pub const COREOS_HOME_ENV_VAR: &str = "COREOS_HOME";

/// The sub directory holding one run directory per active VM.
pub const RUNNING_SUBDIR: &str = "running";

/// The sub directory holding downloaded CoreOS images.
pub const IMAGES_SUBDIR: &str = "images";

/// The name of the serialized VM descriptor inside a run directory.
pub const RUN_CONFIG_FILENAME: &str = "config";

/// The name of the side-loaded cloud-config inside a run directory.
pub const LOCAL_CLOUD_CONFIG_FILENAME: &str = "cloud-config.local";

/// The PXE kernel image file name.
pub const VMLINUZ_FILENAME: &str = "coreos_production_pxe.vmlinuz";

/// The PXE initrd image file name.
pub const INITRD_FILENAME: &str = "coreos_production_pxe_image.cpio.gz";

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns `<home>/running/<uuid>`.
pub fn run_dir_path(home: &Path, uuid: &uuid::Uuid) -> PathBuf {
    home.join(RUNNING_SUBDIR).join(uuid.to_string())
}

/// Returns `<home>/images/<channel>/<version>`.
pub fn image_dir_path(home: &Path, channel: &str, version: &str) -> PathBuf {
    home.join(IMAGES_SUBDIR).join(channel).join(version)
}

/// Joins `path` onto `base` unless it is already absolute.
pub fn absolutize(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
