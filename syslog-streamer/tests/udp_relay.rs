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

mod support;

use syslog_streamer::{RuleDescriptor, SourceState};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn datagram_fans_out_to_remote_host_and_file() {
    support::init_logging();
    let dir = tempfile::tempdir().unwrap();
    let (remote, remote_address) = support::remote_host().await;

    let rules = vec![RuleDescriptor::default()
        .with_name("rule1")
        .with_source_ports([0])
        .with_dest_hosts([remote_address])
        .with_dest_files(["out.dat"])];
    let mut streamer = support::make_streamer("udp-relay", dir.path(), &rules);
    let report = streamer.start().await.unwrap();
    assert!(report.sink_failures.is_empty());

    let source = support::bound_address(&streamer, "localhost:0").await;
    support::send_datagram(source, b"hello\r\n").await;

    let packet = support::recv_datagram(&remote).await;
    assert!(packet.starts_with("<14> "), "{packet}");
    assert!(packet.ends_with(": hello"), "{packet}");
    assert!(packet.len() <= 1024);

    let summary = streamer.shutdown().await.unwrap();
    assert_eq!(summary.dispatched, 1);
    assert_eq!(summary.network_failures, 0);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("out.dat")).unwrap(),
        "hello\n"
    );
    assert_eq!(streamer.source_states()[0].1.state, SourceState::Stopped);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn datagrams_from_one_source_keep_their_order() {
    support::init_logging();
    let dir = tempfile::tempdir().unwrap();
    let (remote, remote_address) = support::remote_host().await;

    let rules = vec![RuleDescriptor::default()
        .with_source_hosts(["127.0.0.1:0"])
        .with_dest_hosts([remote_address.clone(), remote_address])];
    let mut streamer = support::make_streamer("udp-order", dir.path(), &rules);
    streamer.start().await.unwrap();

    let source = support::bound_address(&streamer, "127.0.0.1:0").await;
    let client = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    for payload in ["m1", "m2", "m3"] {
        client.send_to(payload.as_bytes(), source).await.unwrap();
    }

    // Duplicate destinations collapse into one datagram per message.
    for expected in ["m1", "m2", "m3"] {
        let packet = support::recv_datagram(&remote).await;
        assert!(packet.ends_with(&format!(": {expected}")), "{packet}");
    }

    let summary = streamer.shutdown().await.unwrap();
    assert_eq!(summary.dispatched, 3);
}
