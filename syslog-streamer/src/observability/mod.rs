//! Structured logging vocabulary shared by every layer.
//!
//! The crate never installs a subscriber; it only emits `tracing` events keyed
//! by the names in [`events`] and the field keys in [`fields`].

pub mod events;
pub mod fields;
