//! Control-plane layer.
//!
//! Turns unvalidated [`RuleDescriptor`]s into an immutable [`RoutingTable`].
//! Every structural invariant (exactly one source kind, at least one
//! destination, well-formed host tokens, no direct self-loop) is checked here,
//! so the data plane never sees an invalid route.
//!
//! ```
//! use syslog_streamer::control_plane::{FlowTableBuilder, RuleDescriptor};
//! use syslog_streamer::ConfigErrorKind;
//!
//! let looping = RuleDescriptor::default()
//!     .with_name("echo")
//!     .with_source_ports([514])
//!     .with_dest_hosts(["localhost"]);
//!
//! let err = FlowTableBuilder::new("/tmp").build(&[looping]).unwrap_err();
//! assert_eq!(err.rule, "echo");
//! assert_eq!(
//!     err.kind,
//!     ConfigErrorKind::LoopDetected("localhost:514".to_string())
//! );
//! ```

mod flow_table;
mod host_token;
mod rule_descriptor;

pub use flow_table::{FlowTableBuilder, PartialTable, RouteEntry, RoutingTable};
pub use host_token::{is_valid_host, is_valid_hostname, is_valid_ipv4, parse_host_token};
pub use rule_descriptor::RuleDescriptor;
