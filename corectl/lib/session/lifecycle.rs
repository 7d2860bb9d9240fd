use std::{
    fmt,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
};

use getset::{CopyGetters, Getters};
use tokio::process::Command;

use crate::{
    cli::AnsiStyles,
    vm::{LaunchSpec, VmDescriptor},
    CorectlError, CorectlResult, HostContext,
};

use super::{ExportsReloader, NfsExports, NfsShare, Nfsd, RunDir};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Where a [`Session`] is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing has been touched yet.
    #[default]
    Idle,

    /// The run directory exists.
    RunDirCreated,

    /// `/Users` is exported to the guest.
    Shared,

    /// The hypervisor is running.
    Booting,

    /// The hypervisor is gone and `/Users` is being unexported.
    Unsharing,

    /// The run directory has been removed.
    Cleaned,
}

/// Runs one VM from a finished descriptor to its exit.
///
/// A session walks `Idle → RunDirCreated → Shared → Booting → Unsharing → Cleaned`. Once the run
/// directory or the NFS share has been acquired, it is released again on every exit path.
#[derive(Debug, Getters, CopyGetters)]
pub struct Session<R: ExportsReloader = Nfsd> {
    /// The invoking user and corectl home.
    #[getset(get = "pub with_prefix")]
    ctx: HostContext,

    /// The NFS exports file.
    #[getset(get = "pub with_prefix")]
    exports_path: PathBuf,

    /// Reloads NFS after the exports file changes.
    reloader: R,

    /// The current lifecycle state.
    #[getset(get_copy = "pub with_prefix")]
    state: SessionState,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Session {
    /// Creates a session that edits `exports_path` and reloads with `nfsd restart`.
    pub fn new(ctx: HostContext, exports_path: impl Into<PathBuf>) -> Self {
        Self::with_reloader(ctx, exports_path, Nfsd)
    }
}

impl<R: ExportsReloader> Session<R> {
    /// Creates a session that edits `exports_path` and reloads with `reloader`.
    pub fn with_reloader(ctx: HostContext, exports_path: impl Into<PathBuf>, reloader: R) -> Self {
        Self {
            ctx,
            exports_path: exports_path.into(),
            reloader,
            state: SessionState::Idle,
        }
    }

    /// Boots `vm` and blocks until the hypervisor exits.
    ///
    /// The descriptor is echoed to stdout and persisted to the run directory before boot. A
    /// hypervisor that exits unsuccessfully is logged, not treated as an error, and its status is
    /// returned.
    pub async fn run(&mut self, vm: &VmDescriptor) -> CorectlResult<ExitStatus> {
        let spec = LaunchSpec::build(vm, &self.ctx);

        let run_dir = RunDir::create(&self.ctx, &vm.get_uuid()).await?;
        advance(&mut self.state, SessionState::RunDirCreated);

        if let Some(cloud_config) = vm.get_cloud_config().as_ref().and_then(|c| c.local_path()) {
            run_dir.side_load_cloud_config(cloud_config).await?;
        }

        let exports = NfsExports::new(
            &self.exports_path,
            self.ctx.get_uid(),
            self.ctx.get_gid(),
        );
        let share = NfsShare::acquire(exports, &self.reloader)?;
        advance(&mut self.state, SessionState::Shared);

        let json = run_dir.write_descriptor(vm).await?;
        println!("{}", json);

        if self.ctx.has_powers() {
            run_dir.fix_ownership(&self.ctx).await?;
        }

        println!("\n{}", "booting ...".header());
        advance(&mut self.state, SessionState::Booting);
        let status = boot(vm.get_xhyve(), &spec).await?;
        if !status.success() {
            tracing::warn!("xhyve exited with {}", status);
        }

        advance(&mut self.state, SessionState::Unsharing);
        share.release()?;

        run_dir.remove().await?;
        advance(&mut self.state, SessionState::Cleaned);

        Ok(status)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn advance(state: &mut SessionState, next: SessionState) {
    tracing::debug!("session {} -> {}", state, next);
    *state = next;
}

async fn boot(xhyve: &Path, spec: &LaunchSpec) -> CorectlResult<ExitStatus> {
    tracing::debug!("{} {}", xhyve.display(), spec.argv().join(" "));

    let mut child = Command::new(xhyve)
        .args(spec.argv())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| CorectlError::HypervisorSpawnFailed(xhyve.to_path_buf(), e))?;

    Ok(child.wait().await?)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            Self::Idle => "idle",
            Self::RunDirCreated => "run-dir-created",
            Self::Shared => "shared",
            Self::Booting => "booting",
            Self::Unsharing => "unsharing",
            Self::Cleaned => "cleaned",
        };

        write!(f, "{}", state)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
