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

//! Per-source delivery state: network targets plus open append-mode files.

use crate::codec::PacketTemplate;
use crate::control_plane::RoutingTable;
use crate::data_plane::syslog_sender::SyslogSender;
use crate::endpoint::DestinationEndpoint;
use crate::error::SinkError;
use crate::observability::events;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

const COMPONENT: &str = "destination_sink";
const LINE_TERMINATOR: &[u8] = b"\n";

struct FileSink {
    path: PathBuf,
    file: File,
}

impl FileSink {
    async fn open(path: &Path) -> Result<Self, SinkError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|source| SinkError::FileAccess {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    async fn append_line(&mut self, payload: &[u8]) -> std::io::Result<()> {
        self.file.write_all(payload).await?;
        self.file.write_all(LINE_TERMINATOR).await?;
        self.file.flush().await
    }
}

/// Failures counted while delivering one message.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SinkDelivery {
    pub network_failures: usize,
    pub file_failures: usize,
}

/// Everything one routing-table key delivers to.
///
/// Network targets are deduplicated by `host:port`; each distinct file path
/// gets one append-mode handle. A file whose write fails is closed and skipped
/// for the rest of the run.
pub struct DestinationSink {
    source_key: Arc<str>,
    network: SyslogSender,
    files: Vec<FileSink>,
}

impl DestinationSink {
    pub fn source_key(&self) -> &str {
        &self.source_key
    }

    pub fn network_target_count(&self) -> usize {
        self.network.host_count()
    }

    pub fn open_file_count(&self) -> usize {
        self.files.len()
    }

    pub fn file_paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|sink| sink.path.as_path())
    }

    /// Sends one packet per network target, then appends `payload + "\n"`
    /// to every open file.
    pub async fn deliver(&mut self, payload: &[u8], template: &PacketTemplate) -> SinkDelivery {
        let mut outcome = SinkDelivery::default();

        if self.network.host_count() > 0 {
            let packet = template.build(payload);
            let report = self.network.send_packet(&packet).await;
            outcome.network_failures = report.failures.len();
        }

        let mut failed = Vec::new();
        for (position, sink) in self.files.iter_mut().enumerate() {
            if let Err(err) = sink.append_line(payload).await {
                warn!(
                    event = events::SINK_WRITE_FAILED,
                    component = COMPONENT,
                    source = self.source_key.as_ref(),
                    destination = %sink.path.display(),
                    err = %err,
                    "unable to append to sink file"
                );
                failed.push(position);
            }
        }
        outcome.file_failures = failed.len();

        for position in failed.into_iter().rev() {
            let sink = self.files.remove(position);
            warn!(
                event = events::SINK_DISABLED,
                component = COMPONENT,
                source = self.source_key.as_ref(),
                destination = %sink.path.display(),
                "sink file disabled"
            );
        }

        outcome
    }

    /// Flushes and releases every file handle.
    pub async fn close(&mut self) {
        for mut sink in self.files.drain(..) {
            if let Err(err) = sink.file.flush().await {
                warn!(
                    event = events::SINK_WRITE_FAILED,
                    component = COMPONENT,
                    source = self.source_key.as_ref(),
                    destination = %sink.path.display(),
                    err = %err,
                    "unable to flush sink file on close"
                );
            }
        }
    }
}

/// Builds one [`DestinationSink`] per routing-table key.
///
/// Files that cannot be opened are reported and left out; the rest of the
/// sink is still usable.
pub async fn build_sinks(
    table: &RoutingTable,
    socket: Arc<UdpSocket>,
) -> (HashMap<Arc<str>, DestinationSink>, Vec<SinkError>) {
    let mut sinks = HashMap::with_capacity(table.len());
    let mut failures = Vec::new();

    for entry in table.entries() {
        let source_key: Arc<str> = Arc::from(entry.source_key());
        let mut network = SyslogSender::with_socket(socket.clone());
        let mut files: Vec<FileSink> = Vec::new();
        let mut seen_paths: Vec<&Path> = Vec::new();

        for destination in &entry.destinations {
            match destination {
                DestinationEndpoint::Network(address) => {
                    network.add_host(address.clone());
                }
                DestinationEndpoint::File(path) => {
                    if seen_paths.contains(&path.as_path()) {
                        continue;
                    }
                    seen_paths.push(path.as_path());

                    match FileSink::open(path).await {
                        Ok(sink) => {
                            debug!(
                                event = events::SINK_OPEN_OK,
                                component = COMPONENT,
                                source = source_key.as_ref(),
                                destination = %path.display(),
                                "sink file opened"
                            );
                            files.push(sink);
                        }
                        Err(err) => {
                            warn!(
                                event = events::SINK_OPEN_FAILED,
                                component = COMPONENT,
                                source = source_key.as_ref(),
                                err = %err,
                                "sink file unavailable"
                            );
                            failures.push(err);
                        }
                    }
                }
            }
        }

        info!(
            event = events::SINK_READY,
            component = COMPONENT,
            source = source_key.as_ref(),
            network_targets = network.host_count(),
            files = files.len(),
            "destination sink ready"
        );

        sinks.insert(
            source_key.clone(),
            DestinationSink {
                source_key,
                network,
                files,
            },
        );
    }

    (sinks, failures)
}

#[cfg(test)]
mod tests {
    use super::build_sinks;
    use crate::codec::PacketTemplate;
    use crate::control_plane::{FlowTableBuilder, RuleDescriptor};
    use std::sync::Arc;
    use tokio::net::UdpSocket;

    async fn egress_socket() -> Arc<UdpSocket> {
        Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap())
    }

    #[tokio::test]
    async fn duplicate_destinations_collapse_per_sink() {
        let dir = tempfile::tempdir().unwrap();
        let rule = RuleDescriptor::default()
            .with_source_ports([5514])
            .with_dest_hosts(["10.0.0.1", "10.0.0.1:514", "10.0.0.2"])
            .with_dest_files(["out.dat", "out.dat"]);
        let table = FlowTableBuilder::new(dir.path())
            .build(&[rule.clone(), rule])
            .unwrap();

        let (sinks, failures) = build_sinks(&table, egress_socket().await).await;

        assert!(failures.is_empty());
        let sink = &sinks["localhost:5514"];
        assert_eq!(sink.network_target_count(), 2);
        assert_eq!(sink.open_file_count(), 1);
        assert_eq!(sink.source_key(), "localhost:5514");
    }

    #[tokio::test]
    async fn unopenable_file_is_reported_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let rule = RuleDescriptor::default()
            .with_source_ports([5514])
            .with_dest_files(["missing-dir/out.dat", "ok.dat"]);
        let table = FlowTableBuilder::new(dir.path()).build(&[rule]).unwrap();

        let (sinks, failures) = build_sinks(&table, egress_socket().await).await;

        assert_eq!(failures.len(), 1);
        let sink = &sinks["localhost:5514"];
        assert_eq!(
            sink.file_paths().collect::<Vec<_>>(),
            vec![dir.path().join("ok.dat").as_path()]
        );
    }

    #[tokio::test]
    async fn deliver_appends_payload_lines() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.dat");
        std::fs::write(&output, b"existing\n").unwrap();
        let rule = RuleDescriptor::default()
            .with_source_ports([5514])
            .with_dest_files([output.clone()]);
        let table = FlowTableBuilder::new(dir.path()).build(&[rule]).unwrap();
        let (mut sinks, _) = build_sinks(&table, egress_socket().await).await;
        let sink = sinks.get_mut("localhost:5514").unwrap();

        let template = PacketTemplate::default();
        for payload in [&b"first"[..], b"", b"third"] {
            let outcome = sink.deliver(payload, &template).await;
            assert_eq!(outcome.file_failures, 0);
        }
        sink.close().await;

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "existing\nfirst\n\nthird\n"
        );
    }
}
