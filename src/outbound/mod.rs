//! Outbound adapters implementing the domain ports.

pub mod memory;
pub mod object_store;
pub mod smtp;
