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

//! UDP syslog client fanning one packet out to a set of hosts.

use crate::codec::{Facility, Header, Msg, Packet, Pri, Severity};
use crate::data_plane::address_resolution::resolve;
use crate::endpoint::HostPort;
use crate::error::DeliveryError;
use crate::observability::{events, fields};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, warn, Level};

const COMPONENT: &str = "syslog_sender";
const EGRESS_BIND_ADDRESS: &str = "0.0.0.0:0";

#[derive(Debug)]
struct TargetHost {
    address: HostPort,
    resolved: Option<SocketAddr>,
}

/// Outcome of one fan-out. Failures never stop delivery to the other hosts.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failures: Vec<DeliveryError>,
}

impl DeliveryReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Sends syslog packets to a deduplicated set of `host:port` targets.
///
/// Host names are resolved on first use and the result cached; a failed
/// resolution is retried on the next send.
///
/// ```no_run
/// use syslog_streamer::codec::{Facility, Severity};
/// use syslog_streamer::{HostPort, SyslogSender};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let mut sender = SyslogSender::bind().await.unwrap();
/// sender.add_host(HostPort::new("10.0.0.1", 514));
///
/// let report = sender
///     .log(Facility::Local0, Severity::Notice, b"relay started", true)
///     .await;
/// assert_eq!(report.delivered, 1);
/// # });
/// ```
#[derive(Debug)]
pub struct SyslogSender {
    socket: Arc<UdpSocket>,
    hosts: Vec<TargetHost>,
    tag: Option<String>,
    hostname: Option<String>,
}

impl SyslogSender {
    /// Opens an IPv4 socket on an ephemeral port.
    pub async fn bind() -> io::Result<Self> {
        let socket = UdpSocket::bind(EGRESS_BIND_ADDRESS).await?;
        Ok(Self::with_socket(Arc::new(socket)))
    }

    pub fn with_socket(socket: Arc<UdpSocket>) -> Self {
        Self {
            socket,
            hosts: Vec::new(),
            tag: None,
            hostname: None,
        }
    }

    /// Tag used by [`SyslogSender::log`] instead of the program name.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Hostname used by [`SyslogSender::log`] instead of the local machine name.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Returns `false` when the target is already present.
    pub fn add_host(&mut self, address: HostPort) -> bool {
        if self.hosts.iter().any(|host| host.address == address) {
            return false;
        }
        self.hosts.push(TargetHost {
            address,
            resolved: None,
        });
        true
    }

    /// Returns `false` when the target was not present.
    pub fn remove_host(&mut self, address: &HostPort) -> bool {
        let before = self.hosts.len();
        self.hosts.retain(|host| &host.address != address);
        self.hosts.len() != before
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    pub fn hosts(&self) -> impl Iterator<Item = &HostPort> {
        self.hosts.iter().map(|host| &host.address)
    }

    /// Builds a packet stamped now, tagged with the program name, and sends it
    /// to every host.
    pub async fn log(
        &mut self,
        facility: Facility,
        severity: Severity,
        content: &[u8],
        with_pid: bool,
    ) -> DeliveryReport {
        let packet = Packet::new(
            Pri::new(facility, severity),
            Header::new(None, self.hostname.as_deref()),
            Msg::new(
                self.tag.as_deref(),
                content,
                with_pid.then(std::process::id),
            ),
        );
        self.send_packet(&packet).await
    }

    pub async fn send_packet(&mut self, packet: &Packet) -> DeliveryReport {
        let bytes = packet.to_bytes();
        self.send_bytes(&bytes).await
    }

    /// One datagram per host, in insertion order.
    pub async fn send_bytes(&mut self, datagram: &[u8]) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for host in self.hosts.iter_mut() {
            let destination = host.address.to_string();

            let target = match host.resolved {
                Some(target) => target,
                None => match resolve(&host.address).await {
                    Ok(target) => *host.resolved.insert(target),
                    Err(err) => {
                        warn!(
                            event = events::EGRESS_RESOLVE_FAILED,
                            component = COMPONENT,
                            destination = destination.as_str(),
                            err = %err,
                            "unable to resolve destination"
                        );
                        report.failures.push(DeliveryError {
                            destination,
                            source: err,
                        });
                        continue;
                    }
                },
            };

            if tracing::enabled!(Level::DEBUG) {
                debug!(
                    event = events::EGRESS_SEND_ATTEMPT,
                    component = COMPONENT,
                    destination = destination.as_str(),
                    peer = %target,
                    payload = %fields::format_payload_preview(datagram),
                    "sending datagram"
                );
            }

            match self.socket.send_to(datagram, target).await {
                Ok(bytes) => {
                    debug!(
                        event = events::EGRESS_SEND_OK,
                        component = COMPONENT,
                        destination = destination.as_str(),
                        bytes,
                        "datagram sent"
                    );
                    report.delivered += 1;
                }
                Err(err) => {
                    warn!(
                        event = events::EGRESS_SEND_FAILED,
                        component = COMPONENT,
                        destination = destination.as_str(),
                        err = %err,
                        "unable to send datagram"
                    );
                    report.failures.push(DeliveryError {
                        destination,
                        source: err,
                    });
                }
            }
        }

        report
    }
}
