//! `softcan` library: a software-only CAN 2.0A node for `no_std`
//! environments. The crate bit-bangs standard 11-bit-identifier frames over
//! two GPIO lines supplied by the host, with no dedicated CAN controller:
//! NRZ signaling with bit stuffing, CRC-15, bit-by-bit arbitration,
//! acknowledgement, and TEC/REC fault confinement.
#![no_std]
//==================================================================================
/// Protocol and low-level errors (bit-buffer access, frame decoding,
/// transmission failures).
pub mod error;
/// Bit-level infrastructure: logical bit buffer, stuffing codec, CRC-15,
/// and the frame (de)serialization engine.
pub mod infra;
/// CAN 2.0A protocol implementation: the node object, fault confinement,
/// and the transport layer (frame model, line driver, hardware traits).
pub mod protocol;
//==================================================================================
