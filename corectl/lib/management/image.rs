use std::path::{Path, PathBuf};

use getset::Getters;
use tokio::fs;

use crate::{
    config::{Channel, LATEST_VERSION},
    utils::{image_dir_path, IMAGES_SUBDIR, INITRD_FILENAME, VMLINUZ_FILENAME},
    CorectlError, CorectlResult,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A CoreOS PXE image available in the local image cache.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub with_prefix")]
pub struct LocalImage {
    /// The concrete version of the image, never `latest`.
    version: String,

    /// The PXE kernel.
    vmlinuz: PathBuf,

    /// The PXE initrd.
    initrd: PathBuf,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl LocalImage {
    /// Returns where the image of `channel`/`version` lives under `home`, without touching disk.
    pub fn at(home: &Path, channel: Channel, version: &str) -> Self {
        let dir = image_dir_path(home, channel.as_str(), version);
        Self {
            version: version.to_string(),
            vmlinuz: dir.join(VMLINUZ_FILENAME),
            initrd: dir.join(INITRD_FILENAME),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Finds the local image for `channel` and `version` under `home`.
///
/// `latest` resolves to the greatest version directory under the channel, compared as semantic
/// versions; directory names that are not versions are ignored. Both the kernel and the initrd
/// must be present.
///
/// ## Errors
/// Returns [`CorectlError::ImageNotFound`] if no matching image is cached.
pub async fn lookup_image(
    home: &Path,
    channel: Channel,
    version: &str,
) -> CorectlResult<LocalImage> {
    let version = if version == LATEST_VERSION {
        match latest_version(home, channel).await? {
            Some(version) => version,
            None => {
                return Err(CorectlError::ImageNotFound {
                    channel: channel.to_string(),
                    version: version.to_string(),
                    path: home.join(IMAGES_SUBDIR).join(channel.as_str()),
                })
            }
        }
    } else {
        version.to_string()
    };

    let image = LocalImage::at(home, channel, &version);
    for file in [&image.vmlinuz, &image.initrd] {
        if fs::metadata(file).await.is_err() {
            return Err(CorectlError::ImageNotFound {
                channel: channel.to_string(),
                version,
                path: image_dir_path(home, channel.as_str(), &image.version),
            });
        }
    }

    tracing::info!("using CoreOS {} {}", channel, image.version);
    Ok(image)
}

async fn latest_version(home: &Path, channel: Channel) -> CorectlResult<Option<String>> {
    let channel_dir = home.join(IMAGES_SUBDIR).join(channel.as_str());
    let mut entries = match fs::read_dir(&channel_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut latest: Option<semver::Version> = None;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }

        let name = entry.file_name();
        let Some(version) = name.to_str().and_then(|n| semver::Version::parse(n).ok()) else {
            tracing::debug!("skipping non-version image directory {:?}", name);
            continue;
        };

        if latest.as_ref().map_or(true, |l| version > *l) {
            latest = Some(version);
        }
    }

    Ok(latest.map(|v| v.to_string()))
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
