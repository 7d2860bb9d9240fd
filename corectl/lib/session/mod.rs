//! Running a VM: the run directory, the NFS share and the hypervisor process.

mod exports;
mod lifecycle;
mod run_dir;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use exports::*;
pub use lifecycle::*;
pub use run_dir::*;
