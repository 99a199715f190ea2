pub mod device;
pub mod outcome;

pub use device::*;
pub use outcome::*;
