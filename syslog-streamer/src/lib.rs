/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! # syslog-streamer
//!
//! `syslog-streamer` relays syslog-style text messages from UDP ports or files
//! to remote syslog hosts or local files, following a many-to-many routing
//! table.
//!
//! Typical usage is API-first: describe rules with [`RuleDescriptor`], turn
//! them into a validated [`RoutingTable`] with [`FlowTableBuilder`], then run
//! a [`SyslogStreamer`] over it.
//!
//! ## Building a routing table
//!
//! Rules naming the same source are merged in rule order; destination lists
//! are concatenated without deduplication.
//!
//! ```
//! use syslog_streamer::{FlowTableBuilder, RuleDescriptor};
//!
//! let rules = vec![
//!     RuleDescriptor::default()
//!         .with_name("rule1")
//!         .with_source_ports([514])
//!         .with_dest_hosts(["localhost:666"])
//!         .with_dest_files(["output.dat"]),
//!     RuleDescriptor::default()
//!         .with_name("rule2")
//!         .with_source_file("replay.dat")
//!         .with_dest_hosts(["10.0.0.1"]),
//! ];
//!
//! let table = FlowTableBuilder::new("/etc/relay").build(&rules).unwrap();
//!
//! assert_eq!(table.len(), 2);
//! assert!(table.has_network_sources());
//! assert!(table.has_file_sources());
//! assert_eq!(
//!     table.keys().collect::<Vec<_>>(),
//!     vec!["localhost:514", "file:///etc/relay/replay.dat"]
//! );
//! ```
//!
//! ## Rule contract
//!
//! Every rule needs exactly one kind of source and at least one destination.
//! Violations are reported with the rule label before anything is started.
//!
//! ```
//! use syslog_streamer::{ConfigErrorKind, FlowTableBuilder, RuleDescriptor};
//!
//! let both = RuleDescriptor::default()
//!     .with_name("both")
//!     .with_source_ports([514])
//!     .with_source_file("in.dat")
//!     .with_dest_hosts(["10.0.0.1"]);
//!
//! let err = FlowTableBuilder::new("/tmp").build(&[both]).unwrap_err();
//! assert_eq!(err.kind, ConfigErrorKind::ConflictingSource);
//! assert_eq!(
//!     err.to_string(),
//!     "rule 'both': conflicting sources, source ports and source file are mutually exclusive"
//! );
//! ```
//!
//! ## Internal architecture map
//!
//! - API facade: [`SyslogStreamer`] lifecycle and per-source status
//! - Control plane: rule validation, host grammar, merge and loop detection
//! - Data plane: ingestion tasks, the shared delivery queue, destination sinks
//!   and the single dispatch loop
//! - Codec: RFC 3164 `PRI HEADER MSG` packet encoding
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events with canonical `event` and `component` fields and
//! does not initialize a global subscriber. Binaries and tests are responsible
//! for one-time `tracing_subscriber` initialization at process boundaries.

pub mod codec;
pub mod control_plane;
mod data_plane;

mod endpoint;
pub use endpoint::{
    DestinationEndpoint, HostPort, SourceEndpoint, DEFAULT_SYSLOG_PORT, FILE_SCHEME,
    LOCAL_SOURCE_HOST,
};

mod error;
pub use error::{
    ConfigError, ConfigErrorKind, DeliveryError, SinkError, SourceError, StreamerError,
};

#[doc(hidden)]
pub mod observability;

mod source_state;
pub use source_state::{SourceState, SourceStatus};

mod streamer;
pub use streamer::{StartReport, StreamerOptions, SyslogStreamer, DEFAULT_RECV_BUFFER_SIZE};

pub use control_plane::{FlowTableBuilder, RoutingTable, RuleDescriptor};
pub use data_plane::delivery_queue::{
    DeliveryQueue, PushOutcome, QueueClosed, QueuePolicy, QueuedMessage,
};
pub use data_plane::destination_sink::{build_sinks, DestinationSink, SinkDelivery};
pub use data_plane::egress_dispatcher::DispatchSummary;
pub use data_plane::ingress_listener::{
    open_source, FileIngress, IngressHandler, IngressSource, SourceExit, UdpIngress,
};
pub use data_plane::syslog_sender::{DeliveryReport, SyslogSender};
