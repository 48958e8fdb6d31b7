//! Bit stuffing codec.
//!
//! The stuffable span runs from SOF through the end of the CRC field
//! inclusive: after five bits of identical polarity, one bit of opposite
//! polarity is inserted on the wire and discarded on reception. The stuff
//! bit itself starts a new run of length one. Delimiters, the ACK slot and
//! EOF are never stuffed; the receive side therefore also delimits the
//! frame, since seven consecutive recessive bits can only be the EOF.
use crate::error::StuffViolation;
use crate::infra::codec::DOMINANT;

/// Run length at which a stuff bit is inserted (respectively expected).
pub const STUFF_RUN: u8 = 5;
/// Run length of recessive bits that terminates a frame (EOF).
pub const EOF_RUN: u8 = 7;

//==================================================================================STUFF_RUN
#[derive(Clone, Copy, Debug)]
/// Transmit-side run tracker. Feed it every logical bit about to be driven;
/// it answers with the stuff bit to drive right after, when one is due.
pub struct StuffRun {
    last: bool,
    run: u8,
}

impl StuffRun {
    /// Tracker state right after driving SOF: a run of one dominant bit.
    pub const fn after_sof() -> Self {
        Self {
            last: DOMINANT,
            run: 1,
        }
    }

    /// Account for `bit` being driven. Returns `Some(stuff)` when the run
    /// just reached five identical bits; the caller must drive `stuff`
    /// next, and the run restarts on it.
    pub fn push(&mut self, bit: bool) -> Option<bool> {
        if bit == self.last {
            self.run += 1;
        } else {
            self.last = bit;
            self.run = 1;
        }
        if self.run == STUFF_RUN {
            let stuff = !self.last;
            self.last = stuff;
            self.run = 1;
            return Some(stuff);
        }
        None
    }
}

//==================================================================================DESTUFFER
/// Outcome of feeding one sampled wire bit to the [`Destuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestuffEvent {
    /// A logical bit to append to the frame buffer.
    Bit(bool),
    /// A stuff bit; removed from the logical stream.
    Stuff,
    /// Sixth consecutive recessive bit: an end-of-frame run is closing,
    /// nothing is appended.
    Closing,
    /// Seventh consecutive recessive bit: the frame ended at the last
    /// appended bit.
    EndOfFrame,
}

#[derive(Clone, Copy, Debug)]
/// Receive-side line decoder: removes stuff bits, reports stuff-rule
/// violations, and recognises the EOF run.
pub struct Destuffer {
    last: bool,
    run: u8,
    /// Set once a run of five identical bits completes; the next sample is
    /// then either the stuff bit or part of a closing EOF run.
    pending_stuff: bool,
}

impl Destuffer {
    /// Decoder state right after sampling SOF: a run of one dominant bit.
    pub const fn after_sof() -> Self {
        Self {
            last: DOMINANT,
            run: 1,
            pending_stuff: false,
        }
    }

    /// Feed one sampled wire bit.
    pub fn feed(&mut self, bit: bool) -> Result<DestuffEvent, StuffViolation> {
        if self.pending_stuff {
            if bit != self.last {
                if self.run > STUFF_RUN {
                    // A dominant bit interrupting a closing recessive run.
                    return Err(StuffViolation);
                }
                self.last = bit;
                self.run = 1;
                self.pending_stuff = false;
                return Ok(DestuffEvent::Stuff);
            }
            // The run continues past five identical bits.
            self.run += 1;
            if bit == DOMINANT {
                return Err(StuffViolation);
            }
            if self.run >= EOF_RUN {
                return Ok(DestuffEvent::EndOfFrame);
            }
            return Ok(DestuffEvent::Closing);
        }

        if bit == self.last {
            self.run += 1;
        } else {
            self.last = bit;
            self.run = 1;
        }
        if self.run == STUFF_RUN {
            self.pending_stuff = true;
        }
        Ok(DestuffEvent::Bit(bit))
    }
}
