//! Typed, read-only views over the structured command outputs of a device.
//!
//! None of these own any data, they borrow from a [crate::Snapshot] payload.
//! Constructors return `None` when the payload doesn't have the expected
//! shape, rather than failing.

mod bgp;
pub use bgp::*;

mod greent;
pub use greent::*;
