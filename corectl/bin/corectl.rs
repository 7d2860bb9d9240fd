//! `corectl` boots CoreOS guests on the xhyve hypervisor.
//!
//! ## Usage
//!
//! ```bash
//! sudo corectl run \
//!     --channel=stable \
//!     --memory=2048 \
//!     --cpus=2 \
//!     --volume=vda@disk.img,cdrom0@boot.iso \
//!     --net=eth0,eth1 \
//!     --cloud-config=user-data \
//!     --sshkey="$(cat ~/.ssh/id_rsa.pub)"
//! ```
//!
//! The VM's console is attached to the terminal until the guest shuts down.

use clap::Parser;
use corectl::{
    cli::{CorectlArgs, CorectlSubcommand},
    session::Session,
    vm::VmDescriptor,
    CorectlResult, HostContext,
};
use tracing_subscriber::EnvFilter;

//--------------------------------------------------------------------------------------------------
// Functions: main
//--------------------------------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> CorectlResult<()> {
    // Parse command line arguments
    let args = CorectlArgs::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let ctx = HostContext::detect(args.home)?;
    match args.subcommand {
        CorectlSubcommand::Run(run) => {
            let vm = VmDescriptor::assemble(&run.to_request(), &ctx).await?;
            Session::new(ctx, run.exports).run(&vm).await?;
        }
    }

    Ok(())
}
