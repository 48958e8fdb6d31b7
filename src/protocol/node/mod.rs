//! The CAN node object: lifecycle, the blocking transmitter and the
//! non-blocking, tick-driven receiver.
//!
//! The node is single-threaded and cooperative. The host polls
//! [`read_frame`](CanNode::read_frame) at a rate at least equal to the bit
//! rate and calls [`send_frame`](CanNode::send_frame) synchronously;
//! a transmission busy-waits for the duration of one frame. The two calls
//! must never overlap: the node owns its pins and state exclusively.
mod receiver;

use receiver::{Receiver, SampleOutcome};

use crate::error::{FrameError, SendError};
use crate::infra::codec::engine;
use crate::infra::codec::stuffing::{StuffRun, EOF_RUN};
use crate::infra::codec::{DOMINANT, RECESSIVE};
use crate::protocol::fault::{FaultConfinement, NodeState};
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::line::Line;
use crate::protocol::transport::traits::can_pins::{RxPin, TxPin};
use crate::protocol::transport::traits::clock::Clock;

//==================================================================================READ_STATUS
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Outcome of one [`CanNode::read_frame`] poll.
pub enum ReadStatus {
    /// Nothing new on the bus.
    NoMessage,
    /// A frame was received, validated and acknowledged.
    Message(CanFrame),
    /// A frame was received damaged; the receive error counter moved.
    Error(FrameError),
}

//==================================================================================CAN_NODE
/// A software CAN 2.0A node over one TX pin, one RX pin and a microsecond
/// clock.
pub struct CanNode<TX, RX, CK> {
    line: Line<TX, RX>,
    clock: CK,
    bit_time_us: u32,
    fault: FaultConfinement,
    receiver: Receiver,
    last_sample_us: u32,
}

impl<TX: TxPin, RX: RxPin, CK: Clock> CanNode<TX, RX, CK> {
    /// Take ownership of the pin pair and the clock. The bus is not touched
    /// until [`begin`](Self::begin) runs.
    pub fn new(rx_pin: RX, tx_pin: TX, clock: CK) -> Self {
        Self {
            line: Line::new(tx_pin, rx_pin),
            clock,
            bit_time_us: 0,
            fault: FaultConfinement::new(),
            receiver: Receiver::new(),
            last_sample_us: 0,
        }
    }

    /// Configure the node for `baudrate` bits per second (must be
    /// positive): idle the line recessive, derive the bit time, reset
    /// fault confinement and the receiver, and arm the sampling timestamp.
    ///
    /// Re-running `begin` is also the only recovery from Bus-Off: both
    /// error counters return to zero and the state to Error-Active.
    ///
    /// Rates above [`MAX_RELIABLE_BIT_RATE`] work on a best-effort basis
    /// only; see the transport constants.
    ///
    /// [`MAX_RELIABLE_BIT_RATE`]: crate::protocol::transport::MAX_RELIABLE_BIT_RATE
    pub fn begin(&mut self, baudrate: u32) {
        self.line.idle();
        self.bit_time_us = 1_000_000 / baudrate;
        self.fault = FaultConfinement::new();
        self.receiver = Receiver::new();
        self.last_sample_us = self.clock.now_us();
    }

    /// Transmit error counter.
    pub fn tec(&self) -> u16 {
        self.fault.tec()
    }

    /// Receive error counter.
    pub fn rec(&self) -> u16 {
        self.fault.rec()
    }

    /// Fault-confinement state of the node.
    pub fn state(&self) -> NodeState {
        self.fault.state()
    }

    //==============================================================================TRANSMIT
    /// Drive `frame` onto the bus and wait for acknowledgement. Blocks for
    /// the duration of one frame (worst case about 135 bit times).
    ///
    /// Returns `Ok(())` only if the whole frame went out and a dominant bit
    /// was observed in the ACK slot. Arbitration is monitored from the
    /// first identifier bit through the end of the data field: a dominant
    /// read-back while driving recessive means a higher-priority competitor
    /// owns the bus, and the attempt stops without touching the error
    /// counters. A missing acknowledgement costs eight TEC points.
    pub fn send_frame(&mut self, frame: &CanFrame) -> Result<(), SendError> {
        if self.bit_time_us == 0 {
            return Err(SendError::NotConfigured);
        }
        if self.fault.state() == NodeState::BusOff {
            return Err(SendError::BusOff);
        }

        let bits = engine::encode(frame);
        let monitored_until = engine::data_end(frame.dlc.min(engine::MAX_DATA_BYTES));

        self.drive_bit(DOMINANT); // SOF

        let mut stuffing = StuffRun::after_sof();
        for (index, bit) in bits.iter().enumerate() {
            let monitored = index < monitored_until;
            self.drive_bit(bit);
            if monitored && bit == RECESSIVE && self.line.sample_is_dominant() {
                return Err(self.arbitration_lost());
            }
            if let Some(stuff) = stuffing.push(bit) {
                self.drive_bit(stuff);
                if monitored && stuff == RECESSIVE && self.line.sample_is_dominant() {
                    return Err(self.arbitration_lost());
                }
            }
        }

        // CRC delimiter.
        self.drive_bit(RECESSIVE);

        if !self.ack_slot() {
            #[cfg(feature = "defmt")]
            defmt::warn!("transmit not acknowledged (id={:#X})", frame.id.raw());
            self.fault.on_tx_failure();
            return Err(SendError::NoAck);
        }

        // ACK delimiter, then EOF.
        self.drive_bit(RECESSIVE);
        for _ in 0..EOF_RUN {
            self.drive_bit(RECESSIVE);
        }

        self.fault.on_tx_success();
        Ok(())
    }

    /// Drive one bit level for a full bit time.
    fn drive_bit(&mut self, bit: bool) {
        self.line.drive(bit);
        self.clock.delay_us(self.bit_time_us);
    }

    /// Release the line for one bit time and look for a dominant
    /// acknowledgement. The output is restored to recessive before
    /// returning, whatever was sampled.
    fn ack_slot(&mut self) -> bool {
        self.line.release();
        self.clock.delay_us(self.bit_time_us);
        let acked = self.line.sample_is_dominant();
        self.line.drive_recessive();
        acked
    }

    /// Arbitration was lost while driving recessive: the line already
    /// carries the winner's dominant level and this node's output is
    /// recessive, so ceasing to drive needs no further pin action.
    fn arbitration_lost(&mut self) -> SendError {
        #[cfg(feature = "defmt")]
        defmt::debug!("arbitration lost");
        SendError::ArbitrationLost
    }

    //==============================================================================RECEIVE
    /// Poll the bus for one bit. Non-blocking: a call either samples one
    /// bit (when a bit time has elapsed since the last sample) or returns
    /// immediately, except on a validated frame where it blocks about two
    /// bit times to drive the acknowledgement.
    ///
    /// The sampling timestamp advances additively by one bit time per
    /// sample, which keeps the cadence phase-locked to the transmitter
    /// once SOF has been seen; the host must poll at least as fast as the
    /// bit rate for the lock to hold.
    ///
    /// The end of a frame is recognised on the seventh consecutive
    /// recessive bit, several bit periods after the nominal ACK slot has
    /// passed. The dominant acknowledgement emitted at that point is too
    /// late for any transmitter to observe in its one-bit sampling window,
    /// [`send_frame`](Self::send_frame) included: two of these nodes
    /// cannot complete the send/acknowledge handshake on their own. A
    /// transmitting peer scores the frame as unacknowledged even when it
    /// decodes cleanly here, unless another bus participant (for instance
    /// a controller in always-acknowledge mode) fills the slot in time.
    pub fn read_frame(&mut self) -> ReadStatus {
        if self.bit_time_us == 0 || self.fault.state() == NodeState::BusOff {
            return ReadStatus::NoMessage;
        }

        let now = self.clock.now_us();
        if now.wrapping_sub(self.last_sample_us) < self.bit_time_us {
            return ReadStatus::NoMessage;
        }
        self.last_sample_us = self.last_sample_us.wrapping_add(self.bit_time_us);

        let bit = self.line.sample();
        match self.receiver.accept(bit) {
            SampleOutcome::Quiet | SampleOutcome::Accumulating => ReadStatus::NoMessage,
            SampleOutcome::Broken(error) => {
                self.fault.on_rx_failure();
                ReadStatus::Error(error)
            }
            SampleOutcome::FrameEnd => match engine::decode(self.receiver.bits()) {
                Ok(frame) => {
                    self.acknowledge();
                    self.fault.on_rx_success();
                    ReadStatus::Message(frame)
                }
                Err(error) => {
                    // No acknowledgement: the transmitter's ACK slot stays
                    // recessive and its own counters move.
                    self.fault.on_rx_failure();
                    ReadStatus::Error(error)
                }
            },
        }
    }

    /// Pull the bus dominant for one bit time after letting the CRC
    /// delimiter pass, then idle the line again.
    fn acknowledge(&mut self) {
        self.clock.delay_us(self.bit_time_us);
        self.line.drive_dominant();
        self.clock.delay_us(self.bit_time_us);
        self.line.drive_recessive();
    }
}
