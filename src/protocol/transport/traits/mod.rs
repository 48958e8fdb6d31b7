//! Abstraction traits used by the transport layer (GPIO pin pair and
//! microsecond clock). These four primitives are the only thing the node
//! consumes from its host.
pub mod can_pins;
pub mod clock;
