//! Device specifiers given on the command line.
//!
//! Network interfaces are written as `eth<digit>` (or `tap<digit>`, which is recognized but not
//! supported yet). Volumes are written as `vd<letter>@<path>` for hard drives and
//! `cdrom<digit>@<path>` for CD-ROM drives.

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use getset::{CopyGetters, Getters};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{utils, InvalidDeviceError};

use super::Slotted;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

static ETH_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^eth([0-9])$").unwrap());

static TAP_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^tap([0-9])$").unwrap());

static HDD_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^vd([a-z])$").unwrap());

static CDROM_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^cdrom([0-9])$").unwrap());

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The kind of a guest network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkKind {
    /// A virtio-net interface on the host's vmnet bridge.
    Raw,

    /// A tap-backed interface. Recognized on the command line but not supported.
    Tap,
}

/// A guest network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, CopyGetters)]
pub struct NetworkInterface {
    /// The kind of interface.
    #[serde(rename = "type")]
    #[getset(get_copy = "pub with_prefix")]
    kind: NetworkKind,

    /// The slot within the network device class.
    #[getset(get_copy = "pub with_prefix")]
    slot: u8,
}

/// The kind of a guest storage device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageKind {
    /// A virtio-blk hard drive, declared as `vd<letter>`.
    #[serde(rename = "HDD")]
    Hdd,

    /// An AHCI CD-ROM drive, declared as `cdrom<digit>`.
    #[serde(rename = "CDROM")]
    Cdrom,
}

/// A guest storage device backed by a host file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, CopyGetters)]
pub struct StorageDevice {
    /// The kind of drive.
    #[serde(rename = "type")]
    #[getset(get_copy = "pub with_prefix")]
    kind: StorageKind,

    /// The slot within the drive's device class.
    #[getset(get_copy = "pub with_prefix")]
    slot: u8,

    /// The absolute path of the backing file.
    #[getset(get = "pub with_prefix")]
    path: PathBuf,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl NetworkInterface {
    /// Creates a raw interface in `slot`.
    pub fn raw(slot: u8) -> Self {
        Self {
            kind: NetworkKind::Raw,
            slot,
        }
    }

    /// Parses a `--net` token.
    ///
    /// Returns `Ok(None)` for an empty token and for `tap` interfaces, which are accepted
    /// syntactically but produce no device.
    ///
    /// ## Examples
    ///
    /// ```
    /// use corectl::vm::NetworkInterface;
    ///
    /// assert_eq!(NetworkInterface::parse("eth1").unwrap(), Some(NetworkInterface::raw(1)));
    /// assert_eq!(NetworkInterface::parse("tap0").unwrap(), None);
    /// assert_eq!(NetworkInterface::parse("").unwrap(), None);
    /// assert!(NetworkInterface::parse("eth10").is_err());
    /// ```
    pub fn parse(token: &str) -> Result<Option<Self>, InvalidDeviceError> {
        if token.is_empty() {
            return Ok(None);
        }

        if let Some(captures) = ETH_PATTERN.captures(token) {
            return Ok(Some(Self::raw(digit_slot(&captures[1]))));
        }

        if TAP_PATTERN.is_match(token) {
            tracing::warn!("tap interfaces not yet supported. ignoring {}", token);
            return Ok(None);
        }

        Err(InvalidDeviceError::NetworkFormat(token.to_string()))
    }
}

impl StorageDevice {
    /// Creates a storage device.
    pub fn new(kind: StorageKind, slot: u8, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            slot,
            path: path.into(),
        }
    }

    /// Parses a `--volume` token, resolving its path against `pwd`.
    ///
    /// The token must split into exactly one tag and one path on `@`, and the path must exist.
    /// Returns `Ok(None)` for an empty token.
    pub fn parse(token: &str, pwd: &Path) -> Result<Option<Self>, InvalidDeviceError> {
        if token.is_empty() {
            return Ok(None);
        }

        let parts: Vec<&str> = token.split('@').collect();
        let &[tag, raw_path] = parts.as_slice() else {
            return Err(InvalidDeviceError::VolumeFormat(token.to_string()));
        };

        if raw_path.is_empty() {
            return Err(InvalidDeviceError::VolumePathNotFound(raw_path.to_string()));
        }

        let path = utils::absolutize(pwd, raw_path);
        if std::fs::metadata(&path).is_err() {
            return Err(InvalidDeviceError::VolumePathNotFound(raw_path.to_string()));
        }

        if let Some(captures) = HDD_PATTERN.captures(tag) {
            let letter = captures[1].as_bytes()[0];
            return Ok(Some(Self::new(StorageKind::Hdd, letter - b'a', path)));
        }

        if let Some(captures) = CDROM_PATTERN.captures(tag) {
            return Ok(Some(Self::new(
                StorageKind::Cdrom,
                digit_slot(&captures[1]),
                path,
            )));
        }

        Err(InvalidDeviceError::VolumeFormat(token.to_string()))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn digit_slot(digit: &str) -> u8 {
    digit.as_bytes()[0] - b'0'
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Slotted for NetworkInterface {
    fn slot(&self) -> u8 {
        self.slot
    }

    fn tag_for(&self, slot: u8) -> String {
        match self.kind {
            NetworkKind::Raw => format!("eth{}", slot),
            NetworkKind::Tap => format!("tap{}", slot),
        }
    }
}

impl Slotted for StorageDevice {
    fn slot(&self) -> u8 {
        self.slot
    }

    fn tag_for(&self, slot: u8) -> String {
        match self.kind {
            StorageKind::Hdd => format!("vd{}", (b'a' + slot) as char),
            StorageKind::Cdrom => format!("cdrom{}", slot),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
