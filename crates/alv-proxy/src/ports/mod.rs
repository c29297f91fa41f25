//! Ports (API and SPI) for the verification proxy.

pub mod inbound;
pub mod outbound;
