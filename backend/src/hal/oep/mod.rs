mod kernel_set;
mod lanes;

pub use kernel_set::*;
pub use lanes::*;
