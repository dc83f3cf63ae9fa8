use crate::hal::layouts::{Backend, Capabilities, KernelSet};

pub trait KernelSetNew<B: Backend> {
    /// Binds the backend's kernels for `caps`.
    fn new(caps: Capabilities) -> KernelSet<B>;
}
