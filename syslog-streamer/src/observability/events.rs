//! Canonical structured event names used across `syslog-streamer`.

// Control-plane events.
pub const FLOW_TABLE_BUILD_START: &str = "flow_table_build_start";
pub const FLOW_TABLE_BUILD_OK: &str = "flow_table_build_ok";
pub const FLOW_TABLE_BUILD_FAILED: &str = "flow_table_build_failed";

// Ingress events.
pub const INGRESS_BIND_OK: &str = "ingress_bind_ok";
pub const INGRESS_BIND_FAILED: &str = "ingress_bind_failed";
pub const INGRESS_FILE_OPEN_OK: &str = "ingress_file_open_ok";
pub const INGRESS_FILE_OPEN_FAILED: &str = "ingress_file_open_failed";
pub const INGRESS_RECEIVE: &str = "ingress_receive";
pub const INGRESS_RECV_FAILED: &str = "ingress_recv_failed";
pub const INGRESS_ENQUEUE_FAILED: &str = "ingress_enqueue_failed";
pub const INGRESS_EOF: &str = "ingress_eof";
pub const INGRESS_CANCELLED: &str = "ingress_cancelled";

// Delivery queue events.
pub const QUEUE_EVICTED_OLDEST: &str = "queue_evicted_oldest";
pub const QUEUE_CLOSED: &str = "queue_closed";

// Egress and sink events.
pub const EGRESS_SEND_ATTEMPT: &str = "egress_send_attempt";
pub const EGRESS_SEND_OK: &str = "egress_send_ok";
pub const EGRESS_SEND_FAILED: &str = "egress_send_failed";
pub const EGRESS_RESOLVE_FAILED: &str = "egress_resolve_failed";
pub const EGRESS_NO_ROUTE: &str = "egress_no_route";
pub const SINK_READY: &str = "sink_ready";
pub const SINK_OPEN_OK: &str = "sink_open_ok";
pub const SINK_OPEN_FAILED: &str = "sink_open_failed";
pub const SINK_WRITE_FAILED: &str = "sink_write_failed";
pub const SINK_DISABLED: &str = "sink_disabled";

// Streamer lifecycle events.
pub const STREAMER_START: &str = "streamer_start";
pub const STREAMER_START_OK: &str = "streamer_start_ok";
pub const STREAMER_SHUTDOWN_START: &str = "streamer_shutdown_start";
pub const STREAMER_SHUTDOWN_OK: &str = "streamer_shutdown_ok";
pub const SOURCE_TASK_SPAWN: &str = "source_task_spawn";
pub const SOURCE_TASK_EXIT: &str = "source_task_exit";
pub const SOURCE_TASK_FAILED: &str = "source_task_failed";
pub const DISPATCH_LOOP_START: &str = "dispatch_loop_start";
pub const DISPATCH_LOOP_EXIT: &str = "dispatch_loop_exit";
