//! Data-plane layer.
//!
//! Owns the per-source ingestion tasks, the shared delivery queue and the
//! single dispatch loop that fans queued payloads out to destination sinks.
//! Ingestion tasks only push; the dispatch loop is the sole owner of sink
//! state, so file handles and sockets are never written concurrently.

pub(crate) mod address_resolution;
pub(crate) mod delivery_queue;
pub(crate) mod destination_sink;
pub(crate) mod egress_dispatcher;
pub(crate) mod ingress_listener;
pub(crate) mod syslog_sender;
