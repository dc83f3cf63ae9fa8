use crate::hal::layouts::Backend;

/// One lane as seen by a vector kernel during a round.
///
/// Unoccupied lanes are passed as `Inactive`: kernels must leave them
/// untouched.
pub enum LaneSlot<'a, B: Backend> {
    Inactive,
    Active {
        state: &'a mut B::LaneState,
        /// Whole message span of the occupying job.
        src: &'a [u8],
        /// Whole output span (empty for hash and MAC lanes).
        dst: &'a mut [u8],
        /// Bytes already processed.
        offset: usize,
    },
}

impl<B: Backend> LaneSlot<'_, B> {
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, LaneSlot::Active { .. })
    }
}
