mod backend;
mod capability;
mod error;
mod family;
mod job;
mod kernel_set;
mod lane;

pub use backend::*;
pub use capability::*;
pub use error::*;
pub use family::*;
pub use job::*;
pub use kernel_set::*;
pub use lane::*;
