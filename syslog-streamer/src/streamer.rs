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

//! Routing-engine facade: spawns ingestion and dispatch, coordinates shutdown.

use crate::codec::PacketTemplate;
use crate::control_plane::RoutingTable;
use crate::data_plane::delivery_queue::{DeliveryQueue, QueuePolicy};
use crate::data_plane::destination_sink::build_sinks;
use crate::data_plane::egress_dispatcher::{run_dispatch_loop, DispatchSummary};
use crate::data_plane::ingress_listener::{run_ingress_task, IngressHandler};
use crate::endpoint::SourceEndpoint;
use crate::error::{SinkError, StreamerError};
use crate::observability::events;
use crate::source_state::SourceStatus;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const COMPONENT: &str = "streamer";
const EGRESS_BIND_ADDRESS: &str = "0.0.0.0:0";

/// Datagrams longer than this are truncated on receive.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 8192;

/// Engine-wide knobs that are not part of the routing table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StreamerOptions {
    pub queue_policy: QueuePolicy,
    pub packet: PacketTemplate,
    pub recv_buffer_size: usize,
}

impl Default for StreamerOptions {
    fn default() -> Self {
        Self {
            queue_policy: QueuePolicy::default(),
            packet: PacketTemplate::default(),
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }
}

/// Non-fatal problems found while starting.
#[derive(Debug, Default)]
pub struct StartReport {
    pub sink_failures: Vec<SinkError>,
}

struct SourceSlot {
    key: Arc<str>,
    endpoint: SourceEndpoint,
    status_rx: watch::Receiver<SourceStatus>,
    status_tx: Option<watch::Sender<SourceStatus>>,
}

/// Relays messages according to one immutable [`RoutingTable`].
///
/// One ingestion task runs per source key and one dispatch task drains the
/// shared queue. [`SyslogStreamer::shutdown`] stops ingestion, lets dispatch
/// finish the backlog and closes every file.
///
/// ```no_run
/// use syslog_streamer::{FlowTableBuilder, RuleDescriptor, StreamerOptions, SyslogStreamer};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let rules = vec![RuleDescriptor::default()
///     .with_source_ports([514])
///     .with_dest_hosts(["10.0.0.1"])
///     .with_dest_files(["/var/log/relay.log"])];
/// let table = FlowTableBuilder::new("/etc/relay").build(&rules).unwrap();
///
/// let mut streamer = SyslogStreamer::new("relay", table, StreamerOptions::default());
/// streamer.start().await.unwrap();
/// tokio::time::sleep(std::time::Duration::from_secs(60)).await;
/// let summary = streamer.shutdown().await.unwrap();
/// println!("dispatched {}", summary.dispatched);
/// # });
/// ```
pub struct SyslogStreamer {
    name: String,
    routing_table: Arc<RoutingTable>,
    options: StreamerOptions,
    queue: Arc<DeliveryQueue>,
    cancel: CancellationToken,
    sources: Vec<SourceSlot>,
    ingress_tasks: Vec<JoinHandle<()>>,
    dispatch_task: Option<JoinHandle<DispatchSummary>>,
    started: bool,
}

impl SyslogStreamer {
    pub fn new(name: &str, routing_table: RoutingTable, options: StreamerOptions) -> Self {
        let sources = routing_table
            .entries()
            .map(|entry| {
                let (status_tx, status_rx) = watch::channel(SourceStatus::default());
                SourceSlot {
                    key: Arc::from(entry.source_key()),
                    endpoint: entry.source.clone(),
                    status_rx,
                    status_tx: Some(status_tx),
                }
            })
            .collect();

        Self {
            name: name.to_string(),
            queue: Arc::new(DeliveryQueue::new(options.queue_policy)),
            routing_table: Arc::new(routing_table),
            options,
            cancel: CancellationToken::new(),
            sources,
            ingress_tasks: Vec::new(),
            dispatch_task: None,
            started: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    pub fn options(&self) -> &StreamerOptions {
        &self.options
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Builds sinks and spawns the dispatch task plus one ingestion task per
    /// source. Must be called from within a Tokio runtime.
    ///
    /// Sink files that cannot be opened do not abort the start; they are
    /// returned in the report and skipped during delivery.
    pub async fn start(&mut self) -> Result<StartReport, StreamerError> {
        if self.started {
            return Err(StreamerError::AlreadyStarted(self.name.clone()));
        }

        info!(
            event = events::STREAMER_START,
            component = COMPONENT,
            streamer = self.name.as_str(),
            sources = self.sources.len(),
            "starting streamer"
        );

        let egress_socket = UdpSocket::bind(EGRESS_BIND_ADDRESS)
            .await
            .map_err(StreamerError::EgressSocket)?;
        let (sinks, sink_failures) = build_sinks(&self.routing_table, Arc::new(egress_socket)).await;

        self.dispatch_task = Some(tokio::spawn(run_dispatch_loop(
            self.queue.clone(),
            sinks,
            self.options.packet.clone(),
        )));

        for slot in self.sources.iter_mut() {
            let Some(status_tx) = slot.status_tx.take() else {
                continue;
            };
            info!(
                event = events::SOURCE_TASK_SPAWN,
                component = COMPONENT,
                streamer = self.name.as_str(),
                source = slot.key.as_ref(),
                "spawning ingestion task"
            );
            self.ingress_tasks.push(tokio::spawn(run_ingress_task(
                slot.endpoint.clone(),
                IngressHandler::new(slot.key.clone(), self.queue.clone()),
                status_tx,
                self.cancel.child_token(),
                self.options.recv_buffer_size,
            )));
        }

        self.started = true;
        info!(
            event = events::STREAMER_START_OK,
            component = COMPONENT,
            streamer = self.name.as_str(),
            sink_failures = sink_failures.len(),
            "streamer started"
        );
        Ok(StartReport { sink_failures })
    }

    /// Current status of every source, in routing-table order.
    pub fn source_states(&self) -> Vec<(String, SourceStatus)> {
        self.sources
            .iter()
            .map(|slot| (slot.key.to_string(), slot.status_rx.borrow().clone()))
            .collect()
    }

    pub fn source_status(&self, source_key: &str) -> Option<SourceStatus> {
        self.sources
            .iter()
            .find(|slot| slot.key.as_ref() == source_key)
            .map(|slot| slot.status_rx.borrow().clone())
    }

    /// Resolves once the network source `source_key` is bound, or `None` if it
    /// failed, finished without binding or does not exist.
    pub async fn wait_for_bound_address(&self, source_key: &str) -> Option<SocketAddr> {
        let slot = self
            .sources
            .iter()
            .find(|slot| slot.key.as_ref() == source_key)?;
        let mut status_rx = slot.status_rx.clone();

        let result = status_rx
            .wait_for(|status| status.bound_address.is_some() || status.state.is_finished())
            .await
            .map(|status| status.bound_address);
        match result {
            Ok(address) => address,
            Err(_) => status_rx.borrow().bound_address,
        }
    }

    /// Resolves when every file source has stopped or failed.
    pub async fn wait_for_file_sources(&self) {
        for slot in self.sources.iter().filter(|slot| slot.endpoint.is_file()) {
            let mut status_rx = slot.status_rx.clone();
            // A dropped sender means the task is gone; its last status stands.
            let _ = status_rx.wait_for(|status| status.state.is_finished()).await;
        }
    }

    /// Stops ingestion, drains the queue to completion and closes the sinks.
    pub async fn shutdown(&mut self) -> Result<DispatchSummary, StreamerError> {
        if !self.started {
            return Err(StreamerError::NotStarted(self.name.clone()));
        }
        let Some(dispatch_task) = self.dispatch_task.take() else {
            return Err(StreamerError::NotStarted(self.name.clone()));
        };

        info!(
            event = events::STREAMER_SHUTDOWN_START,
            component = COMPONENT,
            streamer = self.name.as_str(),
            backlog = self.queue.len(),
            "shutting down streamer"
        );

        self.cancel.cancel();
        for task in self.ingress_tasks.drain(..) {
            if let Err(err) = task.await {
                warn!(
                    event = events::SOURCE_TASK_FAILED,
                    component = COMPONENT,
                    streamer = self.name.as_str(),
                    err = %err,
                    "ingestion task ended abnormally"
                );
            }
        }

        self.queue.close();
        let summary = dispatch_task.await.map_err(|err| {
            error!(
                event = events::DISPATCH_LOOP_EXIT,
                component = COMPONENT,
                streamer = self.name.as_str(),
                err = %err,
                "dispatch task ended abnormally"
            );
            StreamerError::DispatchTask(err.to_string())
        })?;

        info!(
            event = events::STREAMER_SHUTDOWN_OK,
            component = COMPONENT,
            streamer = self.name.as_str(),
            dispatched = summary.dispatched,
            "streamer drained and stopped"
        );
        Ok(summary)
    }
}

impl Drop for SyslogStreamer {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.queue.close();
    }
}
