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

use std::net::SocketAddr;
use std::time::Duration;
use syslog_streamer::{FlowTableBuilder, RuleDescriptor, StreamerOptions, SyslogStreamer};
use tokio::net::UdpSocket;

pub(crate) const RECV_TIMEOUT: Duration = Duration::from_secs(3);

pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub(crate) fn make_streamer(
    name: &str,
    base_dir: &std::path::Path,
    rules: &[RuleDescriptor],
) -> SyslogStreamer {
    let table = FlowTableBuilder::new(base_dir)
        .build(rules)
        .expect("rules should be valid");
    SyslogStreamer::new(name, table, StreamerOptions::default())
}

/// Loopback socket standing in for a remote syslog host.
#[allow(dead_code)]
pub(crate) async fn remote_host() -> (UdpSocket, String) {
    let socket = UdpSocket::bind("127.0.0.1:0")
        .await
        .expect("loopback bind should succeed");
    let port = socket.local_addr().expect("bound socket has an address").port();
    (socket, format!("127.0.0.1:{port}"))
}

#[allow(dead_code)]
pub(crate) async fn recv_datagram(socket: &UdpSocket) -> String {
    let mut buf = vec![0u8; 2048];
    let (len, _) = tokio::time::timeout(RECV_TIMEOUT, socket.recv_from(&mut buf))
        .await
        .expect("datagram should arrive before the timeout")
        .expect("receive should succeed");
    String::from_utf8_lossy(&buf[..len]).into_owned()
}

#[allow(dead_code)]
pub(crate) async fn send_datagram(target: SocketAddr, payload: &[u8]) {
    let client = UdpSocket::bind("127.0.0.1:0")
        .await
        .expect("client bind should succeed");
    client
        .send_to(payload, target)
        .await
        .expect("client send should succeed");
}

#[allow(dead_code)]
pub(crate) async fn bound_address(streamer: &SyslogStreamer, source_key: &str) -> SocketAddr {
    tokio::time::timeout(RECV_TIMEOUT, streamer.wait_for_bound_address(source_key))
        .await
        .expect("source should settle before the timeout")
        .expect("source should be bound")
}
