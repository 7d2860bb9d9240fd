use std::{
    error::Error,
    fmt::{self, Display},
    path::PathBuf,
};
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a corectl-related operation.
pub type CorectlResult<T> = Result<T, CorectlError>;

/// An error that aborts a corectl run.
///
/// Every variant here is fatal. Recoverable input problems (a bad CPU count, a RAM value below
/// the floor, a malformed UUID, a `tap` interface) never surface as errors; they are logged and
/// replaced with a default by the validation step that sees them.
#[derive(pretty_error_debug::Debug, Error)]
pub enum CorectlError {
    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An error that can represent any error.
    #[error(transparent)]
    Custom(#[from] AnyError),

    /// An error that occurred while (de)serializing a VM descriptor.
    #[error("descriptor serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A host identity lookup failed.
    #[error("host identity error: {0}")]
    HostIdentity(#[from] nix::Error),

    /// A device specifier was rejected.
    #[error("invalid device: {0}")]
    InvalidDevice(#[from] InvalidDeviceError),

    /// The hypervisor executable could not be located.
    #[error("hypervisor binary not found at: {0}\nSource: {1}")]
    HypervisorNotFound(String, which::Error),

    /// The hypervisor executable could not be started.
    #[error("failed to start hypervisor {0}: {1}")]
    HypervisorSpawnFailed(PathBuf, std::io::Error),

    /// A run directory for the same UUID already holds a descriptor.
    #[error("aborting. another VM seems to be running with same UUID ({0})")]
    DuplicateRun(uuid::Uuid),

    /// The cloud-config reference is neither a reachable URL nor a local file.
    #[error("cloud-config {0} is neither a reachable URL nor an existing file: {1}")]
    CloudConfigNotFound(String, std::io::Error),

    /// The requested CoreOS image is not available locally.
    #[error("no local {channel}/{version} image found at {}. pull it first", path.display())]
    ImageNotFound {
        /// The release channel.
        channel: String,

        /// The release version.
        version: String,

        /// The image directory that was searched.
        path: PathBuf,
    },

    /// Reloading the NFS export service failed.
    #[error("unable to restart NFS: {0}")]
    NfsReloadFailed(String),

    /// The config root could not be determined.
    #[error("unable to determine the corectl home directory")]
    HomeNotFound,
}

/// An error raised while parsing or allocating a device specifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidDeviceError {
    /// A `--net` token does not follow `(eth|tap)[0-9]`.
    #[error("aborting: --net {0} not in a reasonable format (eth|tap)[0-9]{{1}}$")]
    NetworkFormat(String),

    /// A `--volume` token does not follow `(cdrom[0-9]|vd[a-z])@PATH`.
    #[error("aborting: --volume {0} not in a recognizable format - ((cdrom([0-9]{{1}})|vd([a-z]{{1}}))$@PATH")]
    VolumeFormat(String),

    /// The path half of a `--volume` token does not exist.
    #[error("aborting: {0} not a valid file path")]
    VolumePathNotFound(String),

    /// The same slot was declared twice within one device class.
    #[error("aborting: attempting to define {0} twice")]
    DuplicateSlot(String),

    /// A slot was declared before its predecessor.
    #[error("aborting: cannot spec slot '{0}' without slot '{1}' populated in advance")]
    SlotGap(String, String),

    /// A persisted descriptor lists a device under another class's slots.
    #[error("aborting: {0} listed under the wrong device class")]
    WrongClass(String),
}

/// An error that can represent any error.
#[derive(Debug)]
pub struct AnyError {
    error: anyhow::Error,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl CorectlError {
    /// Creates a new `Err` result.
    pub fn custom(error: impl Into<anyhow::Error>) -> CorectlError {
        CorectlError::Custom(AnyError {
            error: error.into(),
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl PartialEq for AnyError {
    fn eq(&self, other: &Self) -> bool {
        self.error.to_string() == other.error.to_string()
    }
}

impl Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Error for AnyError {}
