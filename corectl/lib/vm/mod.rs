//! The VM descriptor and everything that goes into it.
//!
//! Device specifiers are parsed into [`NetworkInterface`]s and [`StorageDevice`]s, placed into
//! per-class [`SlotTable`]s, and collected into a [`VmDescriptor`] together with the guest's
//! sizing, image and cloud-config. A finished descriptor is turned into an xhyve command line by
//! [`LaunchSpec`].

mod cloud_config;
mod descriptor;
mod device;
mod launch;
mod slot;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use cloud_config::*;
pub use descriptor::*;
pub use device::*;
pub use launch::*;
pub use slot::*;
