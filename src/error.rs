//! Error definitions shared across library modules.
//! Each type models a specific failure scenario (bit-buffer access, frame
//! reception, frame transmission).
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors raised while reading fields out of an accumulated logical bit buffer.
pub enum BitReadError {
    /// Attempted to read past the end of the buffer.
    #[error("attempted to read out of bounds -> asked: {asked}, available: {available}")]
    OutOfBounds { asked: usize, available: usize },
    /// Requested more bits than the target type can hold.
    #[error("cannot read more than {max} bits. Requested: {asked}")]
    TooLongForType { max: u8, asked: u8 },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// A sixth consecutive bit of identical polarity where the stuffing rule
/// demanded an opposite one, outside a closing end-of-frame run.
#[error("bit stuffing violated")]
pub struct StuffViolation;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Failures detected while receiving a frame. Every variant counts as one
/// receive error for fault confinement.
pub enum FrameError {
    /// Six consecutive bits of identical polarity inside the stuffed span.
    #[error(transparent)]
    Stuff(#[from] StuffViolation),
    /// The accumulated bits outgrew the receive buffer.
    #[error("receive buffer overflow")]
    Overflow,
    /// Computed CRC-15 does not match the 15 bits received on the wire.
    #[error("CRC mismatch -> computed: {computed:#06x}, received: {received:#06x}")]
    Crc { computed: u16, received: u16 },
    /// The frame ended before the fields its DLC implies were accumulated.
    #[error(transparent)]
    Bits(#[from] BitReadError),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Reasons a transmission did not complete with an acknowledged frame.
pub enum SendError {
    /// `begin` has not been called on this node yet.
    #[error("node not configured: call begin first")]
    NotConfigured,
    /// The node is in Bus-Off; the bus was not touched.
    #[error("node is bus-off")]
    BusOff,
    /// A dominant level was read back while driving recessive inside the
    /// arbitration window. Error counters are left untouched.
    #[error("arbitration lost")]
    ArbitrationLost,
    /// No receiver pulled the ACK slot dominant. Counts as a transmit error.
    #[error("no acknowledgement received")]
    NoAck,
}
