use std::{cell::Cell, os::unix::fs::PermissionsExt, path::PathBuf};

use corectl::{
    session::{ExportsReloader, Session, SessionState},
    utils::{
        image_dir_path, run_dir_path, INITRD_FILENAME, LOCAL_CLOUD_CONFIG_FILENAME,
        RUN_CONFIG_FILENAME, VMLINUZ_FILENAME,
    },
    vm::{RunRequest, VmDescriptor},
    CorectlError, CorectlResult, HostContext,
};
use tempfile::TempDir;

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[test_log::test(tokio::test)]
async fn test_session_runs_and_cleans_up() -> anyhow::Result<()> {
    let env = helper::Env::new(3)?;
    std::fs::write(env.root.path().join("user-data"), "#cloud-config\n")?;

    let request = RunRequest::builder()
        .xhyve(env.xhyve.display().to_string())
        .cloud_config("user-data")
        .build();
    let vm = VmDescriptor::assemble(&request, &env.ctx).await?;

    let reloader = helper::CountingReloader::default();
    let mut session = Session::with_reloader(env.ctx.clone(), &env.exports, &reloader);
    let status = session.run(&vm).await?;

    // A failing hypervisor is reported through its status, not as an error.
    assert_eq!(status.code(), Some(3));
    assert_eq!(session.get_state(), SessionState::Cleaned);

    // The run directory existed during boot and is gone afterwards.
    let observed = env.root.path().join("observed");
    let persisted: VmDescriptor =
        serde_json::from_str(&std::fs::read_to_string(observed.join(RUN_CONFIG_FILENAME))?)?;
    assert_eq!(persisted, vm);
    assert_eq!(
        std::fs::read_to_string(observed.join(LOCAL_CLOUD_CONFIG_FILENAME))?,
        "#cloud-config\n"
    );
    assert!(!run_dir_path(env.ctx.get_home(), &vm.get_uuid()).exists());

    // /Users was exported during boot and the exports file is restored afterwards.
    let exports_during_boot = std::fs::read_to_string(env.root.path().join("exports-at-boot"))?;
    assert!(exports_during_boot
        .lines()
        .any(|l| l == "/Users -network 192.168.64.0 -mask 255.255.255.0 -alldirs -mapall=501:20"));
    assert_eq!(std::fs::read_to_string(&env.exports)?, "/opt -ro\n");
    assert_eq!(reloader.reloads.get(), 2);

    // xhyve saw the UUID and the kexec boot token.
    let argv = std::fs::read_to_string(env.root.path().join("argv"))?;
    let argv: Vec<&str> = argv.lines().collect();
    let u = argv.iter().position(|a| *a == "-U").unwrap();
    assert_eq!(argv[u + 1], vm.get_uuid().to_string());
    assert_eq!(argv[argv.len() - 2], "-f");
    assert!(argv[argv.len() - 1].starts_with("kexec,"));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_session_refuses_duplicate_uuid() -> anyhow::Result<()> {
    let env = helper::Env::new(0)?;

    let request = RunRequest::builder()
        .xhyve(env.xhyve.display().to_string())
        .build();
    let vm = VmDescriptor::assemble(&request, &env.ctx).await?;

    let run_dir = run_dir_path(env.ctx.get_home(), &vm.get_uuid());
    std::fs::create_dir_all(&run_dir)?;
    std::fs::write(run_dir.join(RUN_CONFIG_FILENAME), "{}")?;

    let reloader = helper::CountingReloader::default();
    let mut session = Session::with_reloader(env.ctx.clone(), &env.exports, &reloader);
    assert!(matches!(
        session.run(&vm).await,
        Err(CorectlError::DuplicateRun(uuid)) if uuid == vm.get_uuid()
    ));

    // Nothing was touched: the other run keeps its directory and NFS stays as it was.
    assert_eq!(session.get_state(), SessionState::Idle);
    assert!(run_dir.join(RUN_CONFIG_FILENAME).exists());
    assert_eq!(std::fs::read_to_string(&env.exports)?, "/opt -ro\n");
    assert_eq!(reloader.reloads.get(), 0);
    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Helpers
//--------------------------------------------------------------------------------------------------

mod helper {
    use super::*;

    #[derive(Default)]
    pub(super) struct CountingReloader {
        pub(super) reloads: Cell<usize>,
    }

    impl ExportsReloader for CountingReloader {
        fn reload(&self) -> CorectlResult<()> {
            self.reloads.set(self.reloads.get() + 1);
            Ok(())
        }
    }

    pub(super) struct Env {
        pub(super) root: TempDir,
        pub(super) ctx: HostContext,
        pub(super) xhyve: PathBuf,
        pub(super) exports: PathBuf,
    }

    impl Env {
        /// Sets up a corectl home with one cached image, an exports file and a fake xhyve that
        /// records what it sees and exits with `exit_code`.
        pub(super) fn new(exit_code: i32) -> anyhow::Result<Self> {
            let root = TempDir::new()?;
            let ctx = HostContext::builder()
                .uid(501)
                .gid(20)
                .username("core")
                .home(root.path().join(".coreos"))
                .pwd(root.path())
                .build();

            let image = image_dir_path(ctx.get_home(), "alpha", "845.0.0");
            std::fs::create_dir_all(&image)?;
            for file in [VMLINUZ_FILENAME, INITRD_FILENAME] {
                std::fs::write(image.join(file), b"")?;
            }

            let exports = root.path().join("exports");
            std::fs::write(&exports, "/opt -ro\n")?;

            let xhyve = root.path().join("xhyve");
            let script = format!(
                "#!/bin/sh\n\
                 for arg in \"$@\"; do printf '%s\\n' \"$arg\"; done > '{root}/argv'\n\
                 cp -R '{home}/running/'* '{root}/observed'\n\
                 cp '{exports}' '{root}/exports-at-boot'\n\
                 exit {exit_code}\n",
                root = root.path().display(),
                home = ctx.get_home().display(),
                exports = exports.display(),
            );
            std::fs::write(&xhyve, script)?;
            std::fs::set_permissions(&xhyve, std::fs::Permissions::from_mode(0o755))?;

            Ok(Self {
                root,
                ctx,
                xhyve,
                exports,
            })
        }
    }
}
