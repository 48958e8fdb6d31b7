//! Frame (de)serialization engine: turns a [`CanFrame`] into the logical
//! pre-stuff bit sequence and back.
//!
//! The sequence covers the fields between SOF and the CRC delimiter, in
//! transmission order: 11 identifier bits MSB-first, RTR, IDE, r0 (all zero
//! for a standard data frame), 4 DLC bits, the payload bytes MSB-first, and
//! the 15 CRC bits. SOF itself is not stored: it is driven (respectively
//! consumed) by the node, and a leading zero bit is transparent to the CRC.
use crate::error::FrameError;
use crate::infra::codec::bits::{BitBuffer, BitReader};
use crate::infra::codec::crc::Crc15;
use crate::protocol::transport::can_frame::{CanFrame, CanId};

/// Identifier field width.
pub const ID_BITS: usize = 11;
/// RTR + IDE + r0.
pub const FLAG_BITS: usize = 3;
/// Data Length Code field width.
pub const DLC_BITS: usize = 4;
/// CRC field width.
pub const CRC_BITS: usize = 15;
/// Bits preceding the data field: identifier, flags, DLC.
pub const HEADER_BITS: usize = ID_BITS + FLAG_BITS + DLC_BITS;
/// Payload ceiling in bytes; larger DLC values are clamped here.
pub const MAX_DATA_BYTES: u8 = 8;

/// Index one past the data field for a payload of `dlc` bytes. Both the
/// CRC-covered span and the arbitration-monitored span end here.
pub const fn data_end(dlc: u8) -> usize {
    HEADER_BITS + dlc as usize * 8
}

//==================================================================================ENCODE
/// Serialize a frame into its logical bit sequence, CRC included.
/// A DLC above eight is clamped; exactly `min(dlc, 8)` payload bytes are
/// emitted and advertised.
pub fn encode(frame: &CanFrame) -> BitBuffer {
    let mut bits = BitBuffer::new();

    let id = frame.id.raw();
    for shift in (0..ID_BITS).rev() {
        bits.push((id >> shift) & 1 == 1);
    }
    // RTR, IDE, r0: all dominant for a standard data frame.
    for _ in 0..FLAG_BITS {
        bits.push(false);
    }
    let dlc = frame.dlc.min(MAX_DATA_BYTES);
    for shift in (0..DLC_BITS).rev() {
        bits.push((dlc >> shift) & 1 == 1);
    }
    for &byte in &frame.data[..dlc as usize] {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1 == 1);
        }
    }

    let crc = Crc15::over(bits.iter());
    for shift in (0..CRC_BITS).rev() {
        bits.push((crc >> shift) & 1 == 1);
    }
    bits
}

//==================================================================================DECODE
/// Rebuild a frame from accumulated logical bits and verify its CRC.
///
/// Trailing bits beyond the CRC field (the recessive tail sampled while the
/// end-of-frame run was forming) are ignored. A buffer that ends before the
/// fields its DLC implies surfaces as [`FrameError::Bits`].
pub fn decode(bits: &BitBuffer) -> Result<CanFrame, FrameError> {
    let mut reader = BitReader::new(bits);

    let id = CanId::new(reader.read_u16(ID_BITS as u8)?);
    // RTR, IDE and r0 are carried on the wire but not interpreted.
    reader.advance(FLAG_BITS as u8)?;
    let dlc = reader.read_u8(DLC_BITS as u8)?.min(MAX_DATA_BYTES);

    let mut data = [0u8; 8];
    for slot in data.iter_mut().take(dlc as usize) {
        *slot = reader.read_u8(8)?;
    }

    let received = reader.read_u16(CRC_BITS as u8)?;
    let computed = Crc15::over(bits.iter().take(data_end(dlc)));
    if computed != received {
        return Err(FrameError::Crc { computed, received });
    }

    Ok(CanFrame { id, dlc, data })
}
