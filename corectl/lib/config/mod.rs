//! Configuration types and helpers.

mod channel;
mod defaults;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use channel::*;
pub use defaults::*;
