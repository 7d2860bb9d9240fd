//! Management of the local CoreOS image cache.

mod image;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use image::*;
