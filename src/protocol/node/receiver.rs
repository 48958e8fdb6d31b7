//! Working set of the receive path: the Idle/Sof/Frame sub-state machine
//! fed one sampled bit at a time by the node's polling cadence.
use crate::error::FrameError;
use crate::infra::codec::bits::BitBuffer;
use crate::infra::codec::stuffing::{Destuffer, DestuffEvent};
use crate::infra::codec::DOMINANT;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum RxState {
    /// Waiting for a dominant edge (SOF) on an idle bus.
    #[default]
    Idle,
    /// SOF seen; the next sample is the first identifier bit.
    Sof,
    /// Accumulating frame bits.
    Frame,
}

/// What one accepted sample meant to the receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum SampleOutcome {
    /// Bus idle; nothing frame-related happened.
    Quiet,
    /// The sample was folded into the frame under reception.
    Accumulating,
    /// EOF recognised; the buffer holds a complete candidate frame.
    FrameEnd,
    /// The reception broke down; the machine is back to Idle.
    Broken(FrameError),
}

/// Receive working set: logical bit buffer plus destuffing state.
pub(super) struct Receiver {
    state: RxState,
    bits: BitBuffer,
    destuff: Destuffer,
}

impl Receiver {
    pub(super) fn new() -> Self {
        Self {
            state: RxState::Idle,
            bits: BitBuffer::new(),
            destuff: Destuffer::after_sof(),
        }
    }

    /// Accumulated logical bits of the frame that just ended.
    pub(super) fn bits(&self) -> &BitBuffer {
        &self.bits
    }

    /// Feed one sampled wire bit.
    pub(super) fn accept(&mut self, bit: bool) -> SampleOutcome {
        match self.state {
            RxState::Idle => {
                if bit == DOMINANT {
                    // SOF: arm the working set for a new frame.
                    self.bits.clear();
                    self.destuff = Destuffer::after_sof();
                    self.state = RxState::Sof;
                }
                SampleOutcome::Quiet
            }
            RxState::Sof => {
                self.state = RxState::Frame;
                self.frame_bit(bit)
            }
            RxState::Frame => self.frame_bit(bit),
        }
    }

    fn frame_bit(&mut self, bit: bool) -> SampleOutcome {
        match self.destuff.feed(bit) {
            Ok(DestuffEvent::Bit(logical)) => {
                if self.bits.is_full() {
                    self.state = RxState::Idle;
                    return SampleOutcome::Broken(FrameError::Overflow);
                }
                self.bits.push(logical);
                SampleOutcome::Accumulating
            }
            Ok(DestuffEvent::Stuff) | Ok(DestuffEvent::Closing) => SampleOutcome::Accumulating,
            Ok(DestuffEvent::EndOfFrame) => {
                self.state = RxState::Idle;
                SampleOutcome::FrameEnd
            }
            Err(violation) => {
                self.state = RxState::Idle;
                SampleOutcome::Broken(violation.into())
            }
        }
    }
}
