use std::path::{Path, PathBuf};

use getset::Getters;
use tokio::fs;

use crate::{
    utils::{run_dir_path, LOCAL_CLOUD_CONFIG_FILENAME, RUN_CONFIG_FILENAME},
    vm::VmDescriptor,
    CorectlError, CorectlResult, HostContext,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The per-VM directory at `<home>/running/<uuid>`.
///
/// A run directory holds the serialized descriptor as `config` and, when the cloud-config is a
/// local file, a copy of it as `cloud-config.local`. The presence of `config` marks the UUID as
/// taken.
///
/// [`RunDir::remove`] deletes the directory and reports failures. A run directory dropped without
/// being removed is deleted in `Drop`, with failures only logged.
#[derive(Debug, Getters)]
pub struct RunDir {
    /// The directory itself.
    #[getset(get = "pub with_prefix")]
    path: PathBuf,

    removed: bool,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl RunDir {
    /// Creates the run directory for `uuid`.
    ///
    /// ## Errors
    /// Returns [`CorectlError::DuplicateRun`] if the directory already holds a descriptor.
    pub async fn create(ctx: &HostContext, uuid: &uuid::Uuid) -> CorectlResult<Self> {
        let path = run_dir_path(ctx.get_home(), uuid);
        if fs::try_exists(path.join(RUN_CONFIG_FILENAME)).await? {
            return Err(CorectlError::DuplicateRun(*uuid));
        }

        fs::create_dir_all(&path).await?;
        tracing::debug!("created run directory {}", path.display());

        Ok(Self {
            path,
            removed: false,
        })
    }

    /// Returns the path of the serialized descriptor.
    pub fn config_path(&self) -> PathBuf {
        self.path.join(RUN_CONFIG_FILENAME)
    }

    /// Writes `vm` as pretty JSON to `config` and returns the JSON.
    pub async fn write_descriptor(&self, vm: &VmDescriptor) -> CorectlResult<String> {
        let json = serde_json::to_string_pretty(vm)?;
        fs::write(self.config_path(), &json).await?;
        Ok(json)
    }

    /// Copies a local cloud-config into the run directory as `cloud-config.local`.
    pub async fn side_load_cloud_config(&self, source: &Path) -> CorectlResult<()> {
        let target = self.path.join(LOCAL_CLOUD_CONFIG_FILENAME);
        fs::copy(source, &target).await?;
        tracing::debug!("side-loaded {} into {}", source.display(), target.display());
        Ok(())
    }

    /// Hands the run directory and everything in it to the invoking user.
    pub async fn fix_ownership(&self, ctx: &HostContext) -> CorectlResult<()> {
        let (uid, gid) = ctx.owner();
        nix::unistd::chown(&self.path, Some(uid), Some(gid))?;

        let mut entries = fs::read_dir(&self.path).await?;
        while let Some(entry) = entries.next_entry().await? {
            nix::unistd::chown(&entry.path(), Some(uid), Some(gid))?;
        }

        tracing::debug!("{} now owned by {}:{}", self.path.display(), uid, gid);
        Ok(())
    }

    /// Deletes the run directory.
    pub async fn remove(mut self) -> CorectlResult<()> {
        self.removed = true;
        fs::remove_dir_all(&self.path).await?;
        tracing::debug!("removed run directory {}", self.path.display());
        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Drop for RunDir {
    fn drop(&mut self) {
        if self.removed {
            return;
        }

        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            tracing::error!(
                "failed to remove run directory {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
