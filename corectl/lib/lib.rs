//! `corectl` boots CoreOS guests on the xhyve hypervisor.
//!
//! # Overview
//!
//! A `corectl run` takes a loose set of command-line flags and turns them into a running VM:
//!
//! - Every flag is validated into a [`vm::VmDescriptor`]. Bad sizing values fall back to
//!   defaults with a warning, while bad device specifiers abort the run.
//! - Network interfaces, hard drives and CD-ROM drives each get their own slot space. Slots must
//!   be declared in order, starting at zero, with no gaps and no repeats.
//! - The descriptor becomes an xhyve argument vector and a kernel command line through
//!   [`vm::LaunchSpec`].
//! - A [`session::Session`] creates the run directory, exports `/Users` over NFS, boots xhyve
//!   with the console attached, and tears everything down again when the guest exits.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use corectl::{
//!     session::Session,
//!     vm::{RunRequest, VmDescriptor},
//!     HostContext,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = HostContext::detect(None)?;
//!     let request = RunRequest::builder()
//!         .channel("stable")
//!         .memory("2048")
//!         .volumes(vec!["vda@disk.img".to_string()])
//!         .build();
//!
//!     let vm = VmDescriptor::assemble(&request, &ctx).await?;
//!     Session::new(ctx, "/etc/exports").run(&vm).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Release channels and defaults
//! - [`management`] - The local image cache
//! - [`session`] - Run directory, NFS share and hypervisor process
//! - [`utils`] - Filesystem layout of the corectl home
//! - [`vm`] - Device slots, the VM descriptor and the launch spec
//!
//! # Platform Support
//!
//! - macOS: xhyve and `nfsd` are macOS-only, so only macOS can boot guests
//! - Linux: everything short of booting builds and runs, which is enough for tests

#![warn(missing_docs)]

mod context;
mod error;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod cli;
pub mod config;
pub mod management;
pub mod session;
pub mod utils;
pub mod vm;

pub use context::*;
pub use error::*;
