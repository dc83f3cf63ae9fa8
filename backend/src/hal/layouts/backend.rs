/// A family of vector kernels sharing one running-state representation.
///
/// The scheduler never looks inside [`Backend::LaneState`]: it stores one per
/// occupied lane, hands it to the kernels by reference on every round and
/// drops it when the lane is freed.
pub trait Backend: Sized + Send + Sync {
    /// Per-lane running state (expanded key and chaining value, partial
    /// digest, partial MAC accumulator).
    type LaneState: Send;

    fn name() -> &'static str;
}
