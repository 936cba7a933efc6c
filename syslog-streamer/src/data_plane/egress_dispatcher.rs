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

//! The single dispatch loop draining the delivery queue into sinks.

use crate::codec::PacketTemplate;
use crate::data_plane::delivery_queue::DeliveryQueue;
use crate::data_plane::destination_sink::DestinationSink;
use crate::observability::{events, fields};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const COMPONENT: &str = "egress_dispatcher";

/// Counters reported when the dispatch loop ends.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DispatchSummary {
    pub dispatched: u64,
    pub network_failures: u64,
    pub file_failures: u64,
    pub unrouted: u64,
}

/// Pops messages in global FIFO order until the queue is closed and empty,
/// then releases every sink.
pub(crate) async fn run_dispatch_loop(
    queue: Arc<DeliveryQueue>,
    mut sinks: HashMap<Arc<str>, DestinationSink>,
    template: PacketTemplate,
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();
    debug!(
        event = events::DISPATCH_LOOP_START,
        component = COMPONENT,
        sinks = sinks.len(),
        "dispatch loop started"
    );

    while let Some(message) = queue.pop().await {
        let Some(sink) = sinks.get_mut(&message.source_key) else {
            warn!(
                event = events::EGRESS_NO_ROUTE,
                component = COMPONENT,
                source = message.source_key.as_ref(),
                reason = fields::REASON_UNKNOWN_SOURCE,
                "no sink for queued message"
            );
            summary.unrouted += 1;
            continue;
        };

        let outcome = sink.deliver(&message.payload, &template).await;
        summary.dispatched += 1;
        summary.network_failures += outcome.network_failures as u64;
        summary.file_failures += outcome.file_failures as u64;
    }

    for sink in sinks.values_mut() {
        sink.close().await;
    }

    info!(
        event = events::DISPATCH_LOOP_EXIT,
        component = COMPONENT,
        dispatched = summary.dispatched,
        network_failures = summary.network_failures,
        file_failures = summary.file_failures,
        unrouted = summary.unrouted,
        "dispatch loop drained"
    );
    summary
}
