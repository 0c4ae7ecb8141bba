//! The persistent registry document: its shape and its durable codec.
//!
//! Nothing in this module takes the cross-process lock; callers (the
//! allocation engine) are responsible for holding [`crate::lock::LockGuard`]
//! for the duration of any read-modify-write sequence.

pub mod codec;
pub mod model;

pub use model::{AllocationEntry, AllocationRecord, RegistryDocument, CURRENT_VERSION};
