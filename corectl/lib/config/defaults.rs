//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The default number of vCPUs to give the guest.
pub const DEFAULT_NUM_VCPUS: u32 = 1;

/// The default, and minimum, amount of RAM in MiB to give the guest.
pub const DEFAULT_RAM_MIB: u32 = 1024;

/// The default CoreOS release channel.
pub const DEFAULT_CHANNEL: &str = "alpha";

/// The version placeholder that resolves to the newest local image.
pub const LATEST_VERSION: &str = "latest";

/// The UUID placeholder that asks for a freshly generated UUID.
pub const RANDOM_UUID: &str = "random";

/// The default xhyve binary.
pub const DEFAULT_XHYVE_PATH: &str = "/usr/local/bin/xhyve";

/// The default NFS exports file.
pub const DEFAULT_EXPORTS_PATH: &str = "/etc/exports";
