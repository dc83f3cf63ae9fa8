use crate::{
    hal::{
        layouts::{Capabilities, KernelSet},
        oep::KernelSetNewImpl,
    },
    implementation::cpu_ref::CpuRef,
};

unsafe impl KernelSetNewImpl<Self> for CpuRef {
    fn kernel_set_new_impl(caps: Capabilities) -> KernelSet<Self> {
        KernelSet::from_capabilities(caps)
    }
}
