//! Test doubles simulating the wired-AND bus, the GPIO pin pair and the
//! microsecond clock for a node under test.
//!
//! A [`SimBus`] combines three contributions into one wired-AND level:
//! the TX drives of the attached node(s) (logged with timestamps), an
//! optional scripted external driver (one level per bit period, emulating
//! a competing or transmitting peer), and an acknowledging peer that pulls
//! the line dominant whenever a node releases its TX pin. Nodes attached
//! to the same bus share its clock and its drive log. Time is virtual:
//! `delay_us` simply advances it.
#![allow(dead_code)]
use std::cell::RefCell;
use std::rc::Rc;

use softcan::infra::codec::engine;
use softcan::infra::codec::stuffing::StuffRun;
use softcan::infra::codec::{DOMINANT, RECESSIVE};
use softcan::protocol::node::{CanNode, ReadStatus};
use softcan::protocol::transport::can_frame::CanFrame;
use softcan::protocol::transport::traits::can_pins::{RxPin, TxPin};
use softcan::protocol::transport::traits::clock::Clock;

/// Bit rate used across the suite.
pub const BIT_RATE: u32 = 125_000;
/// One bit period at [`BIT_RATE`], in microseconds.
pub const BIT_TIME_US: u32 = 1_000_000 / BIT_RATE;

/// A node wired to the simulated bus.
pub type SimNode = CanNode<SimTxPin, SimRxPin, SimClock>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Drive {
    Dominant,
    Recessive,
    Released,
}

struct BusState {
    now_us: u32,
    /// TX drive transitions of the node, `(timestamp, new state)`.
    transitions: Vec<(u32, Drive)>,
    /// External wire pattern, one level per bit period from `script_origin_us`.
    /// An exhausted script reads recessive, like a competitor gone silent.
    script: Vec<bool>,
    script_origin_us: u32,
    /// When set, a released TX line reads dominant: a peer acknowledging.
    ack_on_release: bool,
    /// Number of RX samples the node took.
    samples: usize,
}

impl BusState {
    fn drive_at(&self, t: u32) -> Drive {
        let mut level = Drive::Released;
        for &(ts, drive) in &self.transitions {
            if ts <= t {
                level = drive;
            } else {
                break;
            }
        }
        level
    }

    fn script_at(&self, t: u32) -> Option<bool> {
        if self.script.is_empty() || t < self.script_origin_us {
            return None;
        }
        let index = ((t - self.script_origin_us) / BIT_TIME_US) as usize;
        self.script.get(index).copied()
    }

    /// Wired-AND level at instant `t`: dominant wins.
    fn wire_at(&self, t: u32) -> bool {
        let own = self.drive_at(t);
        if own == Drive::Dominant {
            return DOMINANT;
        }
        if self.script_at(t) == Some(DOMINANT) {
            return DOMINANT;
        }
        if own == Drive::Released && self.ack_on_release {
            return DOMINANT;
        }
        RECESSIVE
    }

    fn record(&mut self, drive: Drive) {
        self.transitions.push((self.now_us, drive));
    }
}

//==================================================================================SIM_BUS
/// Harness handle over one simulated bus attachment.
pub struct SimBus {
    state: Rc<RefCell<BusState>>,
}

impl SimBus {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(BusState {
                now_us: 0,
                transitions: Vec::new(),
                script: Vec::new(),
                script_origin_us: 0,
                ack_on_release: false,
                samples: 0,
            })),
        }
    }

    /// Build a node attached to this bus, already configured at [`BIT_RATE`].
    pub fn node(&self) -> SimNode {
        let mut node = self.node_unconfigured();
        node.begin(BIT_RATE);
        node
    }

    /// Build a node attached to this bus without calling `begin`.
    pub fn node_unconfigured(&self) -> SimNode {
        let tx = SimTxPin {
            state: Rc::clone(&self.state),
        };
        let rx = SimRxPin {
            state: Rc::clone(&self.state),
        };
        let clock = SimClock {
            state: Rc::clone(&self.state),
        };
        CanNode::new(rx, tx, clock)
    }

    pub fn now(&self) -> u32 {
        self.state.borrow().now_us
    }

    /// Advance virtual time without any node activity.
    pub fn advance(&self, us: u32) {
        self.state.borrow_mut().now_us += us;
    }

    /// Enable or disable the acknowledging peer.
    pub fn set_ack_on_release(&self, on: bool) {
        self.state.borrow_mut().ack_on_release = on;
    }

    /// Install an external wire pattern starting at the current instant.
    pub fn load_script(&self, bits: &[bool]) {
        let mut state = self.state.borrow_mut();
        state.script = bits.to_vec();
        state.script_origin_us = state.now_us;
    }

    /// Wire levels sampled at bit centers, `count` periods from `origin_us`.
    pub fn wire_bits(&self, origin_us: u32, count: usize) -> Vec<bool> {
        let state = self.state.borrow();
        (0..count)
            .map(|k| state.wire_at(origin_us + k as u32 * BIT_TIME_US + BIT_TIME_US / 2))
            .collect()
    }

    /// Number of TX drive transitions so far.
    pub fn transition_count(&self) -> usize {
        self.state.borrow().transitions.len()
    }

    /// Checks whether the node pulled the line dominant after `after_us`.
    pub fn drove_dominant_after(&self, after_us: u32) -> bool {
        self.state
            .borrow()
            .transitions
            .iter()
            .any(|&(ts, drive)| ts >= after_us && drive == Drive::Dominant)
    }

    /// Instants at which a node released its TX pin (the ACK slot).
    pub fn release_instants(&self) -> Vec<u32> {
        self.state
            .borrow()
            .transitions
            .iter()
            .filter(|&&(_, drive)| drive == Drive::Released)
            .map(|&(ts, _)| ts)
            .collect()
    }

    /// Instants at which a node drove the line dominant.
    pub fn dominant_instants(&self) -> Vec<u32> {
        self.state
            .borrow()
            .transitions
            .iter()
            .filter(|&&(_, drive)| drive == Drive::Dominant)
            .map(|&(ts, _)| ts)
            .collect()
    }

    /// Number of RX samples the node took so far.
    pub fn sample_count(&self) -> usize {
        self.state.borrow().samples
    }
}

//==================================================================================SIM_PINS
pub struct SimTxPin {
    state: Rc<RefCell<BusState>>,
}

impl TxPin for SimTxPin {
    fn set_dominant(&mut self) {
        self.state.borrow_mut().record(Drive::Dominant);
    }

    fn set_recessive(&mut self) {
        self.state.borrow_mut().record(Drive::Recessive);
    }

    fn release(&mut self) {
        self.state.borrow_mut().record(Drive::Released);
    }
}

pub struct SimRxPin {
    state: Rc<RefCell<BusState>>,
}

impl RxPin for SimRxPin {
    fn is_recessive(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        state.samples += 1;
        // Read the level of the bit period that just elapsed, not the one
        // about to start: samples land exactly on period boundaries.
        let t = state.now_us.wrapping_sub(1);
        state.wire_at(t)
    }
}

pub struct SimClock {
    state: Rc<RefCell<BusState>>,
}

impl Clock for SimClock {
    fn now_us(&mut self) -> u32 {
        self.state.borrow().now_us
    }

    fn delay_us(&mut self, us: u32) {
        self.state.borrow_mut().now_us += us;
    }
}

//==================================================================================WIRE_BUILDERS
fn wire_from_logical(bits: impl Iterator<Item = bool>, acked: bool) -> Vec<bool> {
    let mut wire = vec![DOMINANT]; // SOF
    let mut stuffing = StuffRun::after_sof();
    for bit in bits {
        wire.push(bit);
        if let Some(stuff) = stuffing.push(bit) {
            wire.push(stuff);
        }
    }
    wire.push(RECESSIVE); // CRC delimiter
    wire.push(if acked { DOMINANT } else { RECESSIVE }); // ACK slot
    wire.push(RECESSIVE); // ACK delimiter
    wire.extend(std::iter::repeat(RECESSIVE).take(7)); // EOF
    wire
}

/// Full wire image of `frame`: SOF, stuffed fields and CRC, delimiters,
/// ACK slot (dominant when `acked`) and EOF.
pub fn frame_wire_bits(frame: &CanFrame, acked: bool) -> Vec<bool> {
    wire_from_logical(engine::encode(frame).iter(), acked)
}

/// Wire image of `frame` with one logical bit flipped before stuffing:
/// payload corruption that keeps the stuffing layer consistent.
pub fn corrupted_wire_bits(frame: &CanFrame, flip_logical_index: usize) -> Vec<bool> {
    let logical = engine::encode(frame);
    assert!(flip_logical_index < logical.len());
    wire_from_logical(
        logical
            .iter()
            .enumerate()
            .map(|(i, bit)| if i == flip_logical_index { !bit } else { bit }),
        false,
    )
}

/// Drive `wire` into `node` one bit per period, collecting every status
/// other than `NoMessage`.
pub fn feed_wire(bus: &SimBus, node: &mut SimNode, wire: &[bool]) -> Vec<ReadStatus> {
    bus.load_script(wire);
    let mut outcomes = Vec::new();
    for _ in 0..wire.len() {
        bus.advance(BIT_TIME_US);
        match node.read_frame() {
            ReadStatus::NoMessage => {}
            status => outcomes.push(status),
        }
    }
    outcomes
}
