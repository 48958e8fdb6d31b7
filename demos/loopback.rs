//! # Loopback Quickstart
//!
//! Minimal example demonstrating the basics of softcan without hardware:
//! - Attach a node to a simulated pin pair and a virtual clock
//! - Transmit a frame and record the bus levels it produced
//! - Replay the recording into a second node and decode the frame
//!
//! This example uses `std` for a quick trial run. On a real board, implement
//! `TxPin`, `RxPin` and `Clock` over your HAL's GPIO and timer primitives.
//!
//! ```bash
//! cargo run --example loopback
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use softcan::protocol::node::{CanNode, ReadStatus};
use softcan::protocol::transport::can_frame::{CanFrame, CanId};
use softcan::protocol::transport::traits::can_pins::{RxPin, TxPin};
use softcan::protocol::transport::traits::clock::Clock;

const BIT_RATE: u32 = 125_000;
const BIT_TIME_US: u32 = 1_000_000 / BIT_RATE;

// ============================================================================
// Simulated bus attachment
// ============================================================================

#[derive(Clone, Copy, PartialEq)]
enum Drive {
    Dominant,
    Recessive,
    Released,
}

struct Wire {
    now_us: u32,
    transitions: Vec<(u32, Drive)>,
    /// Replayed levels, one per bit period from time zero.
    script: Vec<bool>,
    /// Acknowledge whenever the node releases its TX pin.
    ack_on_release: bool,
}

impl Wire {
    fn drive_at(&self, t: u32) -> Drive {
        let mut level = Drive::Released;
        for &(ts, drive) in &self.transitions {
            if ts <= t {
                level = drive;
            }
        }
        level
    }

    /// Wired-AND of the node's own drive, the replayed script and the
    /// acknowledging peer: `false` = dominant wins.
    fn level_at(&self, t: u32) -> bool {
        let own = self.drive_at(t);
        if own == Drive::Dominant {
            return false;
        }
        if let Some(&level) = self.script.get((t / BIT_TIME_US) as usize) {
            if !level {
                return false;
            }
        }
        !(own == Drive::Released && self.ack_on_release)
    }
}

struct SimTx(Rc<RefCell<Wire>>);
struct SimRx(Rc<RefCell<Wire>>);
struct SimClock(Rc<RefCell<Wire>>);

impl TxPin for SimTx {
    fn set_dominant(&mut self) {
        let mut wire = self.0.borrow_mut();
        let now = wire.now_us;
        wire.transitions.push((now, Drive::Dominant));
    }
    fn set_recessive(&mut self) {
        let mut wire = self.0.borrow_mut();
        let now = wire.now_us;
        wire.transitions.push((now, Drive::Recessive));
    }
    fn release(&mut self) {
        let mut wire = self.0.borrow_mut();
        let now = wire.now_us;
        wire.transitions.push((now, Drive::Released));
    }
}

impl RxPin for SimRx {
    fn is_recessive(&mut self) -> bool {
        let wire = self.0.borrow();
        wire.level_at(wire.now_us.wrapping_sub(1))
    }
}

impl Clock for SimClock {
    fn now_us(&mut self) -> u32 {
        self.0.borrow().now_us
    }
    fn delay_us(&mut self, us: u32) {
        self.0.borrow_mut().now_us += us;
    }
}

fn attach() -> (Rc<RefCell<Wire>>, CanNode<SimTx, SimRx, SimClock>) {
    let wire = Rc::new(RefCell::new(Wire {
        now_us: 0,
        transitions: Vec::new(),
        script: Vec::new(),
        ack_on_release: false,
    }));
    let mut node = CanNode::new(
        SimRx(Rc::clone(&wire)),
        SimTx(Rc::clone(&wire)),
        SimClock(Rc::clone(&wire)),
    );
    node.begin(BIT_RATE);
    (wire, node)
}

// ============================================================================
// Main walk-through
// ============================================================================

fn main() {
    println!("=== softcan Loopback Quickstart ===\n");

    // ======================================================================
    // 1. Build a frame
    // ======================================================================
    println!("1. Building a frame");

    let frame = CanFrame::new(CanId::new(0x123), &[0xDE, 0xAD, 0xBE, 0xEF]);
    println!("   id: {:#05X}, dlc: {}", frame.id.raw(), frame.dlc);
    print!("   payload:");
    for byte in frame.payload() {
        print!(" {byte:02X}");
    }
    println!("\n");

    // ======================================================================
    // 2. Transmit it over the simulated wire
    // ======================================================================
    println!("2. Transmitting at {BIT_RATE} bit/s");

    let (tx_wire, mut sender) = attach();
    tx_wire.borrow_mut().ack_on_release = true;

    match sender.send_frame(&frame) {
        Ok(()) => println!("   acknowledged, tec: {}", sender.tec()),
        Err(e) => {
            eprintln!("   transmission failed: {e:?}");
            return;
        }
    }

    // Sample the recorded bus levels once per bit period.
    let elapsed = tx_wire.borrow().now_us;
    let bits: Vec<bool> = {
        let wire = tx_wire.borrow();
        (0..elapsed / BIT_TIME_US)
            .map(|k| wire.level_at(k * BIT_TIME_US + BIT_TIME_US / 2))
            .collect()
    };

    println!("   {} bit times on the wire:", bits.len());
    print!("   ");
    for &bit in &bits {
        print!("{}", if bit { '1' } else { '0' });
    }
    println!("\n");

    // ======================================================================
    // 3. Replay the recording into a second node
    // ======================================================================
    println!("3. Receiving");

    let (rx_wire, mut receiver) = attach();
    rx_wire.borrow_mut().script = bits.clone();

    let mut received = None;
    for _ in 0..bits.len() {
        rx_wire.borrow_mut().now_us += BIT_TIME_US;
        match receiver.read_frame() {
            ReadStatus::NoMessage => {}
            ReadStatus::Message(decoded) => received = Some(decoded),
            ReadStatus::Error(e) => {
                eprintln!("   receive error: {e:?}");
                return;
            }
        }
    }

    match received {
        Some(decoded) => {
            println!("   id: {:#05X}, dlc: {}", decoded.id.raw(), decoded.dlc);
            print!("   payload:");
            for byte in decoded.payload() {
                print!(" {byte:02X}");
            }
            println!();
            println!("   match: {}\n", decoded == frame);
        }
        None => {
            eprintln!("   no frame decoded");
            return;
        }
    }

    println!("Quickstart complete.");
}
