//! Thin driver over the TX/RX pin pair: drive a level, release for the ACK
//! slot, sample the bus.
use crate::infra::codec::{DOMINANT, RECESSIVE};
use crate::protocol::transport::traits::can_pins::{RxPin, TxPin};

/// The two GPIO lines of the node, owned exclusively by it.
pub struct Line<TX, RX> {
    tx: TX,
    rx: RX,
}

impl<TX: TxPin, RX: RxPin> Line<TX, RX> {
    /// Take ownership of the pin pair. The line is not driven until
    /// [`idle`](Self::idle) runs.
    pub fn new(tx: TX, rx: RX) -> Self {
        Self { tx, rx }
    }

    /// Drive the bus to its idle (recessive) level.
    #[inline]
    pub fn idle(&mut self) {
        self.tx.set_recessive();
    }

    /// Drive one bit level: `false` = dominant, `true` = recessive.
    #[inline]
    pub fn drive(&mut self, bit: bool) {
        if bit == RECESSIVE {
            self.tx.set_recessive();
        } else {
            self.tx.set_dominant();
        }
    }

    /// Pull the bus dominant.
    #[inline]
    pub fn drive_dominant(&mut self) {
        self.tx.set_dominant();
    }

    /// Drive the bus recessive.
    #[inline]
    pub fn drive_recessive(&mut self) {
        self.tx.set_recessive();
    }

    /// Stop driving so another node may pull the line dominant.
    #[inline]
    pub fn release(&mut self) {
        self.tx.release();
    }

    /// Sample the bus: `true` = recessive, `false` = dominant.
    #[inline]
    pub fn sample(&mut self) -> bool {
        self.rx.is_recessive()
    }

    /// Checks whether the bus currently reads dominant.
    #[inline]
    pub fn sample_is_dominant(&mut self) -> bool {
        self.rx.is_recessive() == DOMINANT
    }
}
