use std::{io, path::PathBuf, process::Command};

use getset::Getters;

use crate::{CorectlError, CorectlResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The host directory exported to guests.
const EXPORTED_DIR: &str = "/Users";

/// The vmnet subnet guests live on.
const GUEST_NETWORK: &str = "-network 192.168.64.0 -mask 255.255.255.0";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Something that makes the NFS server pick up a changed exports file.
pub trait ExportsReloader {
    /// Reloads the exports.
    fn reload(&self) -> CorectlResult<()>;
}

/// Reloads exports by running `nfsd restart`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nfsd;

/// The NFS exports file and the line that shares `/Users` with guests.
///
/// The share line is
///
/// ```text
/// /Users -network 192.168.64.0 -mask 255.255.255.0 -alldirs -mapall=<uid>:<gid>
/// ```
///
/// and is compared against whole lines of the file, so sharing is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub with_prefix")]
pub struct NfsExports {
    /// The exports file, usually `/etc/exports`.
    path: PathBuf,

    /// The share line for the invoking user.
    signature: String,
}

/// Keeps `/Users` shared for as long as it lives.
///
/// [`NfsShare::release`] unshares and reports failures. If the guard is dropped without being
/// released, it unshares in `Drop` and only logs failures.
#[derive(Debug)]
pub struct NfsShare<R: ExportsReloader> {
    exports: NfsExports,
    reloader: R,
    released: bool,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl NfsExports {
    /// Describes the share of `/Users` for `uid`:`gid` in the exports file at `path`.
    pub fn new(path: impl Into<PathBuf>, uid: u32, gid: u32) -> Self {
        Self {
            path: path.into(),
            signature: format!(
                "{} {} -alldirs -mapall={}:{}",
                EXPORTED_DIR, GUEST_NETWORK, uid, gid
            ),
        }
    }

    /// Returns whether the share line is present.
    pub fn is_shared(&self) -> CorectlResult<bool> {
        Ok(self.contains_signature(&self.read()?))
    }

    /// Appends the share line and reloads, unless it is already there.
    ///
    /// Returns whether the file was changed.
    pub fn share(&self, reloader: &impl ExportsReloader) -> CorectlResult<bool> {
        let contents = self.read()?;
        if self.contains_signature(&contents) {
            tracing::debug!("{} already exported in {}", EXPORTED_DIR, self.path.display());
            return Ok(false);
        }

        std::fs::write(&self.path, format!("{}\n{}\n", contents, self.signature))?;
        reloader.reload()?;

        tracing::info!("exported {} over NFS", EXPORTED_DIR);
        Ok(true)
    }

    /// Removes the share line and reloads, if it is there.
    ///
    /// Returns whether the file was changed.
    pub fn unshare(&self, reloader: &impl ExportsReloader) -> CorectlResult<bool> {
        let contents = self.read()?;
        if !self.contains_signature(&contents) {
            return Ok(false);
        }

        let mut kept: Vec<&str> = Vec::new();
        for line in contents.split_inclusive('\n') {
            if line.trim_end_matches('\n') != self.signature {
                kept.push(line);
                continue;
            }

            // `share` puts a blank line ahead of the signature.
            if kept.last().is_some_and(|prev| *prev == "\n") {
                kept.pop();
            }
        }

        std::fs::write(&self.path, kept.concat())?;
        reloader.reload()?;

        tracing::info!("stopped exporting {} over NFS", EXPORTED_DIR);
        Ok(true)
    }

    fn read(&self) -> CorectlResult<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn contains_signature(&self, contents: &str) -> bool {
        contents.lines().any(|line| line == self.signature)
    }
}

impl<R: ExportsReloader> NfsShare<R> {
    /// Shares `/Users` through `exports`, reloading with `reloader` if the file changes.
    pub fn acquire(exports: NfsExports, reloader: R) -> CorectlResult<Self> {
        exports.share(&reloader)?;
        Ok(Self {
            exports,
            reloader,
            released: false,
        })
    }

    /// Returns the exports file this share lives in.
    pub fn exports(&self) -> &NfsExports {
        &self.exports
    }

    /// Unshares `/Users`.
    pub fn release(mut self) -> CorectlResult<()> {
        self.released = true;
        self.exports.unshare(&self.reloader)?;
        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl ExportsReloader for Nfsd {
    fn reload(&self) -> CorectlResult<()> {
        let status = Command::new("nfsd")
            .arg("restart")
            .status()
            .map_err(|e| CorectlError::NfsReloadFailed(e.to_string()))?;

        if !status.success() {
            return Err(CorectlError::NfsReloadFailed(format!(
                "nfsd restart exited with {}",
                status
            )));
        }

        Ok(())
    }
}

impl<R: ExportsReloader + ?Sized> ExportsReloader for &R {
    fn reload(&self) -> CorectlResult<()> {
        (**self).reload()
    }
}

impl<R: ExportsReloader> Drop for NfsShare<R> {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        if let Err(e) = self.exports.unshare(&self.reloader) {
            tracing::error!(
                "failed to unshare {} from {}: {}",
                EXPORTED_DIR,
                self.exports.path.display(),
                e
            );
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use tempfile::TempDir;

    use super::*;

    const SIGNATURE: &str =
        "/Users -network 192.168.64.0 -mask 255.255.255.0 -alldirs -mapall=501:20";

    #[derive(Default)]
    struct CountingReloader {
        reloads: Cell<usize>,
    }

    impl ExportsReloader for CountingReloader {
        fn reload(&self) -> CorectlResult<()> {
            self.reloads.set(self.reloads.get() + 1);
            Ok(())
        }
    }

    struct FailingReloader;

    impl ExportsReloader for FailingReloader {
        fn reload(&self) -> CorectlResult<()> {
            Err(CorectlError::NfsReloadFailed("nfsd is not running".into()))
        }
    }

    fn exports_with(contents: &str) -> anyhow::Result<(TempDir, NfsExports)> {
        let dir = TempDir::new()?;
        let path = dir.path().join("exports");
        std::fs::write(&path, contents)?;
        Ok((dir, NfsExports::new(path, 501, 20)))
    }

    fn signature_lines(exports: &NfsExports) -> anyhow::Result<usize> {
        Ok(std::fs::read_to_string(exports.get_path())?
            .lines()
            .filter(|l| *l == SIGNATURE)
            .count())
    }

    #[test]
    fn test_nfs_exports_signature() {
        let exports = NfsExports::new("/etc/exports", 501, 20);
        assert_eq!(exports.get_signature(), SIGNATURE);
    }

    #[test]
    fn test_nfs_exports_share_twice_adds_one_line() -> anyhow::Result<()> {
        let (_dir, exports) = exports_with("/opt -ro\n")?;
        let reloader = CountingReloader::default();

        assert!(exports.share(&reloader)?);
        assert!(!exports.share(&reloader)?);

        assert_eq!(signature_lines(&exports)?, 1);
        assert_eq!(reloader.reloads.get(), 1);
        assert!(exports.is_shared()?);
        Ok(())
    }

    #[test]
    fn test_nfs_exports_unshare_without_share_is_noop() -> anyhow::Result<()> {
        let (_dir, exports) = exports_with("/opt -ro\n")?;
        let reloader = CountingReloader::default();

        assert!(!exports.unshare(&reloader)?);
        assert_eq!(reloader.reloads.get(), 0);
        assert_eq!(std::fs::read_to_string(exports.get_path())?, "/opt -ro\n");
        Ok(())
    }

    #[test]
    fn test_nfs_exports_share_then_unshare_restores_file() -> anyhow::Result<()> {
        let (_dir, exports) = exports_with("/opt -ro")?;
        let reloader = CountingReloader::default();

        exports.share(&reloader)?;
        assert_eq!(
            std::fs::read_to_string(exports.get_path())?,
            format!("/opt -ro\n{SIGNATURE}\n")
        );

        // The last entry keeps the line ending it was given on share.
        exports.unshare(&reloader)?;
        assert_eq!(std::fs::read_to_string(exports.get_path())?, "/opt -ro\n");
        assert_eq!(reloader.reloads.get(), 2);

        let (_dir, exports) = exports_with("/opt -ro\n")?;
        exports.share(&reloader)?;
        assert_eq!(
            std::fs::read_to_string(exports.get_path())?,
            format!("/opt -ro\n\n{SIGNATURE}\n")
        );
        exports.unshare(&reloader)?;
        assert_eq!(std::fs::read_to_string(exports.get_path())?, "/opt -ro\n");
        Ok(())
    }

    #[test]
    fn test_nfs_exports_unshare_keeps_neighbouring_lines_apart() -> anyhow::Result<()> {
        let (_dir, exports) = exports_with(&format!("/opt -ro\n{SIGNATURE}\n/srv -ro\n"))?;
        let reloader = CountingReloader::default();

        assert!(exports.unshare(&reloader)?);
        assert_eq!(
            std::fs::read_to_string(exports.get_path())?,
            "/opt -ro\n/srv -ro\n"
        );

        let (_dir, exports) = exports_with(&format!("/opt -ro\n{SIGNATURE}"))?;
        assert!(exports.unshare(&reloader)?);
        assert_eq!(std::fs::read_to_string(exports.get_path())?, "/opt -ro\n");
        Ok(())
    }

    #[test]
    fn test_nfs_exports_unshare_leading_line() -> anyhow::Result<()> {
        let (_dir, exports) = exports_with(&format!("{SIGNATURE}\n/opt -ro\n"))?;
        let reloader = CountingReloader::default();

        assert!(exports.unshare(&reloader)?);
        assert_eq!(std::fs::read_to_string(exports.get_path())?, "/opt -ro\n");
        Ok(())
    }

    #[test]
    fn test_nfs_exports_missing_file_is_empty() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let exports = NfsExports::new(dir.path().join("exports"), 501, 20);
        assert!(!exports.is_shared()?);

        exports.share(&CountingReloader::default())?;
        assert_eq!(signature_lines(&exports)?, 1);
        Ok(())
    }

    #[test]
    fn test_nfs_exports_reload_failure_is_fatal() -> anyhow::Result<()> {
        let (_dir, exports) = exports_with("")?;
        assert!(matches!(
            exports.share(&FailingReloader),
            Err(CorectlError::NfsReloadFailed(_))
        ));
        Ok(())
    }

    #[test]
    fn test_nfs_share_guard_unshares_on_drop() -> anyhow::Result<()> {
        let (_dir, exports) = exports_with("/opt -ro\n")?;
        let reloader = CountingReloader::default();

        {
            let share = NfsShare::acquire(exports.clone(), &reloader)?;
            assert!(share.exports().is_shared()?);
        }

        assert!(!exports.is_shared()?);
        assert_eq!(reloader.reloads.get(), 2);
        Ok(())
    }

    #[test]
    fn test_nfs_share_guard_release() -> anyhow::Result<()> {
        let (_dir, exports) = exports_with("/opt -ro\n")?;
        let reloader = CountingReloader::default();

        let share = NfsShare::acquire(exports.clone(), &reloader)?;
        share.release()?;

        assert!(!exports.is_shared()?);
        assert_eq!(reloader.reloads.get(), 2);
        Ok(())
    }

    #[test]
    fn test_nfs_share_guard_unshares_preexisting_line() -> anyhow::Result<()> {
        let (_dir, exports) = exports_with(&format!("/opt -ro\n{SIGNATURE}\n"))?;
        let reloader = CountingReloader::default();

        let share = NfsShare::acquire(exports.clone(), &reloader)?;
        assert_eq!(reloader.reloads.get(), 0);
        share.release()?;

        assert!(!exports.is_shared()?);
        assert_eq!(reloader.reloads.get(), 1);
        Ok(())
    }
}
