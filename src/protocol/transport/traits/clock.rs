//! Monotonic time abstraction providing the two timing primitives the node
//! needs: a free-running microsecond counter and a blocking busy-wait.

/// Microsecond clock contract.
///
/// `now_us` wraps naturally at `u32::MAX`; consumers compare instants with
/// wrapping arithmetic, so a wrap mid-frame is harmless. `delay_us` blocks
/// the caller for the requested duration and is the only suspension
/// mechanism the node uses.
pub trait Clock {
    /// Current value of the free-running microsecond counter.
    fn now_us(&mut self) -> u32;
    /// Busy-wait for `us` microseconds.
    fn delay_us(&mut self, us: u32);
}
