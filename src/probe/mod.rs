//! Probes the allocation engine consults on every operation: whether a
//! recorded owner process is still alive, and whether a candidate port is
//! free to bind on loopback.

pub mod availability;
pub mod liveness;

pub use availability::try_bind;
pub use liveness::alive;
