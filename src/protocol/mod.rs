//! High-level components of the CAN 2.0A node: fault confinement, the node
//! object itself, and the transport layer (frame model, line driver,
//! hardware abstraction traits).
pub mod fault;
pub mod node;
pub mod transport;
