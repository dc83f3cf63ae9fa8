use crate::hal::{
    api::KernelSetNew,
    layouts::{Backend, Capabilities, KernelSet},
    oep::KernelSetNewImpl,
};

impl<B> KernelSetNew<B> for KernelSet<B>
where
    B: Backend + KernelSetNewImpl<B>,
{
    fn new(caps: Capabilities) -> Self {
        B::kernel_set_new_impl(caps)
    }
}
