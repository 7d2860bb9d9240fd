//! Host identity and filesystem roots for a corectl invocation.
//!
//! A [`HostContext`] is built once at startup and handed to every component that needs to know
//! who invoked corectl or where its files live: the device parser resolves relative volume paths
//! against [`HostContext::get_pwd`], the launch-spec builder puts the login name on the kernel
//! command line, and the session manager uses the ids for the NFS export signature and for
//! handing the run directory back to the invoking user.

use std::{
    env,
    path::{Path, PathBuf},
};

use getset::{CopyGetters, Getters};
use nix::unistd::{self, Gid, Uid, User};
use typed_builder::TypedBuilder;

use crate::{
    utils::{COREOS_HOME_DIR, COREOS_HOME_ENV_VAR},
    CorectlError, CorectlResult,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const SUDO_UID_ENV_VAR: &str = "SUDO_UID";
const SUDO_GID_ENV_VAR: &str = "SUDO_GID";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Who is running corectl and where its state lives.
///
/// ## Examples
///
/// ```
/// use corectl::HostContext;
///
/// let ctx = HostContext::builder()
///     .uid(501)
///     .gid(20)
///     .username("core")
///     .home("/Users/core/.coreos")
///     .pwd("/Users/core/vms")
///     .build();
///
/// assert_eq!(ctx.get_username(), "core");
/// assert!(!ctx.has_powers());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters, TypedBuilder)]
pub struct HostContext {
    /// The real user id of the invoking user. Under `sudo` this is `SUDO_UID`.
    #[getset(get_copy = "pub with_prefix")]
    uid: u32,

    /// The real group id of the invoking user. Under `sudo` this is `SUDO_GID`.
    #[getset(get_copy = "pub with_prefix")]
    gid: u32,

    /// The login name of the invoking user.
    #[builder(setter(into))]
    #[getset(get = "pub with_prefix")]
    username: String,

    /// The corectl home directory holding `images/` and `running/`.
    #[builder(setter(into))]
    #[getset(get = "pub with_prefix")]
    home: PathBuf,

    /// The working directory corectl was invoked from.
    #[builder(setter(into))]
    #[getset(get = "pub with_prefix")]
    pwd: PathBuf,

    /// Whether corectl runs with an effective uid of root.
    #[builder(default)]
    privileged: bool,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl HostContext {
    /// Inspects the current process and builds the context for this invocation.
    ///
    /// `home` overrides the corectl home directory. Without it, `COREOS_HOME` is consulted, then
    /// `~/.coreos` of the invoking user.
    pub fn detect(home: Option<PathBuf>) -> CorectlResult<Self> {
        let privileged = unistd::geteuid().is_root();
        let (uid, gid) = if privileged {
            (
                sudo_id(SUDO_UID_ENV_VAR).unwrap_or_else(|| unistd::getuid().as_raw()),
                sudo_id(SUDO_GID_ENV_VAR).unwrap_or_else(|| unistd::getgid().as_raw()),
            )
        } else {
            (unistd::getuid().as_raw(), unistd::getgid().as_raw())
        };

        let user = User::from_uid(Uid::from_raw(uid))?.ok_or_else(|| {
            CorectlError::custom(anyhow::anyhow!("no user entry for uid {}", uid))
        })?;

        let home = match home.or_else(|| env::var_os(COREOS_HOME_ENV_VAR).map(PathBuf::from)) {
            Some(home) => home,
            // The root's home would be picked up under sudo, so use the invoking user's entry.
            None if privileged => user.dir.join(COREOS_HOME_DIR),
            None => dirs::home_dir()
                .ok_or(CorectlError::HomeNotFound)?
                .join(COREOS_HOME_DIR),
        };

        let ctx = Self {
            uid,
            gid,
            username: user.name,
            home,
            pwd: env::current_dir()?,
            privileged,
        };

        tracing::debug!("host context: {:?}", ctx);
        Ok(ctx)
    }

    /// Whether corectl runs with root privileges and must hand files back to the invoking user.
    pub fn has_powers(&self) -> bool {
        self.privileged
    }

    /// Returns the invoking user's uid and gid as `nix` types.
    pub fn owner(&self) -> (Uid, Gid) {
        (Uid::from_raw(self.uid), Gid::from_raw(self.gid))
    }

    /// Resolves `path` against the invocation's working directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        crate::utils::absolutize(&self.pwd, path)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn sudo_id(var: &str) -> Option<u32> {
    env::var(var).ok().and_then(|id| id.parse().ok())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
