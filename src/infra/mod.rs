//! Low-level infrastructure shared by the transmit and receive paths.
pub mod codec;
