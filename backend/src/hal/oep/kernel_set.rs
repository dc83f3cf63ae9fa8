use crate::hal::layouts::{Backend, Capabilities, KernelSet};

/// # Safety
/// Implementations must only report lane widths their lane kernels can run.
pub unsafe trait KernelSetNewImpl<B: Backend> {
    fn kernel_set_new_impl(caps: Capabilities) -> KernelSet<B>;
}
