//! Fault confinement: the TEC/REC counter pair and the three-state machine
//! that moves the node between Error-Active, Error-Passive and Bus-Off.
//!
//! The node object owns exactly one instance; the transmit and receive
//! paths report their outcomes through the four event hooks and the state
//! is reclassified after every mutation. Bus-Off is sticky: only a full
//! re-initialisation of the node clears it.

/// Penalty added to the transmit error counter on a failed transmission.
const TX_FAILURE_PENALTY: u16 = 8;

//==================================================================================NODE_STATE
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Operating states of the fault-confinement machine.
pub enum NodeState {
    /// Normal operation.
    #[default]
    ErrorActive,
    /// One counter passed 127. Operation continues; a future extension may
    /// restrict active error signalling in this state.
    ErrorPassive,
    /// One counter passed 255. Both send and read become silent no-ops
    /// until the node is re-initialised.
    BusOff,
}

//==================================================================================FAULT_CONFINEMENT
#[derive(Clone, Copy, Debug, Default)]
/// Error counters and their state classification.
pub struct FaultConfinement {
    tec: u16,
    rec: u16,
    state: NodeState,
}

impl FaultConfinement {
    /// Fresh counters: both zero, Error-Active.
    pub const fn new() -> Self {
        Self {
            tec: 0,
            rec: 0,
            state: NodeState::ErrorActive,
        }
    }

    /// Transmit error counter.
    #[inline]
    pub fn tec(&self) -> u16 {
        self.tec
    }

    /// Receive error counter.
    #[inline]
    pub fn rec(&self) -> u16 {
        self.rec
    }

    /// Current state classification.
    #[inline]
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// A transmission failed (missing acknowledgement).
    pub fn on_tx_failure(&mut self) {
        if self.state != NodeState::BusOff {
            self.tec = self.tec.saturating_add(TX_FAILURE_PENALTY);
        }
        self.reclassify();
    }

    /// A frame was received damaged (stuff, structure or CRC error).
    pub fn on_rx_failure(&mut self) {
        if self.state != NodeState::BusOff {
            self.rec = self.rec.saturating_add(1);
        }
        self.reclassify();
    }

    /// A transmission completed and was acknowledged.
    pub fn on_tx_success(&mut self) {
        if self.tec > 0 {
            self.tec -= 1;
        }
        self.reclassify();
    }

    /// A frame was received and validated.
    pub fn on_rx_success(&mut self) {
        if self.rec > 0 {
            self.rec -= 1;
        }
        self.reclassify();
    }

    /// Re-derive the state from the counter pair. The classification is
    /// the single authority; nothing else sets `state`.
    fn reclassify(&mut self) {
        let next = if self.tec > 255 || self.rec > 255 {
            NodeState::BusOff
        } else if self.tec > 127 || self.rec > 127 {
            NodeState::ErrorPassive
        } else {
            NodeState::ErrorActive
        };

        #[cfg(feature = "defmt")]
        if next != self.state {
            defmt::warn!(
                "fault state change: {} -> {} (tec={}, rec={})",
                self.state,
                next,
                self.tec,
                self.rec
            );
        }

        self.state = next;
    }
}
