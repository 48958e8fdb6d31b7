//! Transport layer: frame representation, 11-bit identifier handling, the
//! GPIO line driver, and the hardware abstraction traits.
//!
//! ## Timing constants
//!
//! Bit-banged timing is driven entirely by the host-provided microsecond
//! clock; the constants below document its practical envelope.

pub mod can_frame;
pub mod line;
pub mod traits;

/// Bit rates this node is designed for, in bits per second.
///
/// Any positive rate is accepted by `begin`; these are the values the
/// timing model was sized against.
pub const SUPPORTED_BIT_RATES: [u32; 6] =
    [50_000, 100_000, 125_000, 250_000, 500_000, 1_000_000];

/// Highest bit rate at which busy-wait microsecond timing is dependable.
///
/// Above this, one bit lasts fewer than eight microseconds and jitter from
/// the host's `delay_us` implementation eats a significant share of the bit
/// time; transmission keeps working on a quiet bus but arbitration and
/// sampling margins shrink quickly.
pub const MAX_RELIABLE_BIT_RATE: u32 = 125_000;

/// Upper bound on the length of one frame in bit times, stuff bits and the
/// recessive tail included.
///
/// A blocking transmission therefore occupies the caller for at most this
/// many bit times (about 1.1 ms at 125 kbit/s).
pub const WORST_CASE_FRAME_BITS: u32 = 135;
