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

//! Ingestion tasks that read sources and feed the delivery queue.

use crate::data_plane::address_resolution::resolve;
use crate::data_plane::delivery_queue::{DeliveryQueue, PushOutcome, QueueClosed, QueuedMessage};
use crate::endpoint::{HostPort, SourceEndpoint};
use crate::error::SourceError;
use crate::observability::{events, fields};
use crate::source_state::{SourceState, SourceStatus};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Split};
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Level};

const COMPONENT: &str = "ingress_listener";
const RECV_BACKOFF_BASE: Duration = Duration::from_millis(10);
const RECV_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Pause before the next receive after `consecutive_errors` failures in a row.
fn recv_backoff(consecutive_errors: u32) -> Duration {
    let shift = consecutive_errors.saturating_sub(1).min(16);
    RECV_BACKOFF_BASE
        .saturating_mul(1 << shift)
        .min(RECV_BACKOFF_MAX)
}

fn trim_trailing_whitespace(mut payload: &[u8]) -> &[u8] {
    while let [rest @ .., last] = payload {
        if !last.is_ascii_whitespace() {
            break;
        }
        payload = rest;
    }
    payload
}

fn trim_whitespace(mut payload: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = payload {
        if !first.is_ascii_whitespace() {
            break;
        }
        payload = rest;
    }
    trim_trailing_whitespace(payload)
}

/// Per-source record passed to the ingestion entry point: which source it
/// serves and where its messages go.
#[derive(Clone)]
pub struct IngressHandler {
    source_key: Arc<str>,
    queue: Arc<DeliveryQueue>,
}

impl IngressHandler {
    pub fn new(source_key: Arc<str>, queue: Arc<DeliveryQueue>) -> Self {
        Self { source_key, queue }
    }

    pub fn source_key(&self) -> &str {
        &self.source_key
    }

    pub async fn forward(&self, payload: &[u8]) -> Result<PushOutcome, QueueClosed> {
        if tracing::enabled!(Level::DEBUG) {
            debug!(
                event = events::INGRESS_RECEIVE,
                component = COMPONENT,
                source = self.source_key.as_ref(),
                bytes = payload.len(),
                payload = %fields::format_payload_preview(payload),
                "received message"
            );
        }

        let message = QueuedMessage::new(self.source_key.clone(), payload.to_vec());
        self.queue.push(message).await.map_err(|err| {
            warn!(
                event = events::INGRESS_ENQUEUE_FAILED,
                component = COMPONENT,
                source = self.source_key.as_ref(),
                reason = fields::REASON_QUEUE_CLOSED,
                "dropping message, delivery queue closed"
            );
            err
        })
    }
}

/// Why an ingestion loop returned without error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SourceExit {
    EndOfInput,
    Cancelled,
}

/// An opened source that can be drained into a handler.
#[async_trait]
pub trait IngressSource: Send {
    /// Local address for network sources.
    fn local_address(&self) -> Option<SocketAddr>;

    async fn run(
        &mut self,
        handler: &IngressHandler,
        cancel: &CancellationToken,
    ) -> Result<SourceExit, SourceError>;
}

/// One datagram is one message, trailing whitespace removed.
pub struct UdpIngress {
    socket: UdpSocket,
    local_address: Option<SocketAddr>,
    recv_buffer_size: usize,
}

impl UdpIngress {
    pub async fn bind(address: &HostPort, recv_buffer_size: usize) -> Result<Self, SourceError> {
        let bind_error = |source| SourceError::Bind {
            address: address.to_string(),
            source,
        };

        let target = resolve(address).await.map_err(bind_error)?;
        let socket = UdpSocket::bind(target).await.map_err(bind_error)?;
        let local_address = socket.local_addr().ok();

        Ok(Self {
            socket,
            local_address,
            recv_buffer_size: recv_buffer_size.max(1),
        })
    }
}

#[async_trait]
impl IngressSource for UdpIngress {
    fn local_address(&self) -> Option<SocketAddr> {
        self.local_address
    }

    async fn run(
        &mut self,
        handler: &IngressHandler,
        cancel: &CancellationToken,
    ) -> Result<SourceExit, SourceError> {
        let mut recv_buf = vec![0u8; self.recv_buffer_size];
        let mut consecutive_errors: u32 = 0;

        loop {
            let received = tokio::select! {
                biased;

                _ = cancel.cancelled() => return Ok(SourceExit::Cancelled),

                received = self.socket.recv_from(&mut recv_buf) => received,
            };

            match received {
                Ok((len, peer)) => {
                    consecutive_errors = 0;
                    debug!(
                        component = COMPONENT,
                        source = handler.source_key(),
                        peer = %peer,
                        bytes = len,
                        "datagram received"
                    );
                    let payload = trim_trailing_whitespace(&recv_buf[..len]);

                    let forwarded = tokio::select! {
                        biased;

                        _ = cancel.cancelled() => return Ok(SourceExit::Cancelled),

                        forwarded = handler.forward(payload) => forwarded,
                    };
                    if forwarded.is_err() {
                        return Ok(SourceExit::Cancelled);
                    }
                }
                Err(err) => {
                    // Transient on UDP (e.g. ICMP port unreachable); keep listening.
                    consecutive_errors = consecutive_errors.saturating_add(1);
                    let backoff = recv_backoff(consecutive_errors);
                    warn!(
                        event = events::INGRESS_RECV_FAILED,
                        component = COMPONENT,
                        source = handler.source_key(),
                        consecutive_errors,
                        backoff_ms = backoff.as_millis() as u64,
                        err = %err,
                        "datagram receive failed"
                    );
                    tokio::select! {
                        biased;

                        _ = cancel.cancelled() => return Ok(SourceExit::Cancelled),

                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }
    }
}

/// One line is one message, surrounding whitespace removed.
pub struct FileIngress {
    path: PathBuf,
    lines: Split<BufReader<File>>,
}

impl FileIngress {
    pub async fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)
            .await
            .map_err(|source| SourceError::FileAccess {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).split(b'\n'),
        })
    }
}

#[async_trait]
impl IngressSource for FileIngress {
    fn local_address(&self) -> Option<SocketAddr> {
        None
    }

    async fn run(
        &mut self,
        handler: &IngressHandler,
        cancel: &CancellationToken,
    ) -> Result<SourceExit, SourceError> {
        loop {
            let segment = tokio::select! {
                biased;

                _ = cancel.cancelled() => return Ok(SourceExit::Cancelled),

                segment = self.lines.next_segment() => segment,
            };

            let line = match segment {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(SourceExit::EndOfInput),
                Err(source) => {
                    return Err(SourceError::FileAccess {
                        path: self.path.clone(),
                        source,
                    })
                }
            };

            let forwarded = tokio::select! {
                biased;

                _ = cancel.cancelled() => return Ok(SourceExit::Cancelled),

                forwarded = handler.forward(trim_whitespace(&line)) => forwarded,
            };
            if forwarded.is_err() {
                return Ok(SourceExit::Cancelled);
            }
        }
    }
}

/// Opens the source named by `endpoint`.
pub async fn open_source(
    endpoint: &SourceEndpoint,
    recv_buffer_size: usize,
) -> Result<Box<dyn IngressSource>, SourceError> {
    match endpoint {
        SourceEndpoint::Network(address) => {
            let source = UdpIngress::bind(address, recv_buffer_size).await?;
            Ok(Box::new(source))
        }
        SourceEndpoint::File(path) => {
            let source = FileIngress::open(path).await?;
            Ok(Box::new(source))
        }
    }
}

fn publish(status: &watch::Sender<SourceStatus>, update: impl FnOnce(&mut SourceStatus)) {
    status.send_modify(update);
}

/// Entry point of one ingestion task. Drives `Idle -> Running -> Stopped`,
/// or to `Failed` when the source cannot be opened or read.
pub(crate) async fn run_ingress_task(
    endpoint: SourceEndpoint,
    handler: IngressHandler,
    status: watch::Sender<SourceStatus>,
    cancel: CancellationToken,
    recv_buffer_size: usize,
) {
    let opened = tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            publish(&status, |current| current.state = SourceState::Stopped);
            return;
        }

        opened = open_source(&endpoint, recv_buffer_size) => opened,
    };

    let mut source = match opened {
        Ok(source) => source,
        Err(err) => {
            let event = if endpoint.is_file() {
                events::INGRESS_FILE_OPEN_FAILED
            } else {
                events::INGRESS_BIND_FAILED
            };
            error!(
                event,
                component = COMPONENT,
                source = handler.source_key(),
                err = %err,
                "source unavailable"
            );
            publish(&status, |current| {
                current.state = SourceState::Failed(err.to_string())
            });
            return;
        }
    };

    let bound_address = source.local_address();
    let event = if endpoint.is_file() {
        events::INGRESS_FILE_OPEN_OK
    } else {
        events::INGRESS_BIND_OK
    };
    info!(
        event,
        component = COMPONENT,
        source = handler.source_key(),
        bound_address = %fields::format_optional_address(bound_address),
        "source running"
    );
    publish(&status, |current| *current = SourceStatus::running(bound_address));

    match source.run(&handler, &cancel).await {
        Ok(exit) => {
            let event = match exit {
                SourceExit::EndOfInput => events::INGRESS_EOF,
                SourceExit::Cancelled => events::INGRESS_CANCELLED,
            };
            info!(
                event,
                component = COMPONENT,
                source = handler.source_key(),
                "source stopped"
            );
            publish(&status, |current| current.state = SourceState::Stopped);
        }
        Err(err) => {
            error!(
                event = events::SOURCE_TASK_FAILED,
                component = COMPONENT,
                source = handler.source_key(),
                err = %err,
                "source failed"
            );
            publish(&status, |current| {
                current.state = SourceState::Failed(err.to_string())
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        recv_backoff, run_ingress_task, trim_trailing_whitespace, trim_whitespace, FileIngress,
        IngressHandler, IngressSource, SourceExit, UdpIngress,
    };
    use crate::data_plane::delivery_queue::{DeliveryQueue, QueuePolicy};
    use crate::endpoint::{HostPort, SourceEndpoint};
    use crate::error::SourceError;
    use crate::source_state::{SourceState, SourceStatus};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;
    use tokio_util::sync::CancellationToken;

    fn handler(queue: &Arc<DeliveryQueue>, key: &str) -> IngressHandler {
        IngressHandler::new(Arc::from(key), queue.clone())
    }

    #[test]
    fn trimming_rules() {
        assert_eq!(trim_trailing_whitespace(b"  hello \r\n"), b"  hello");
        assert_eq!(trim_whitespace(b"\t hello world \r"), b"hello world");
        assert_eq!(trim_whitespace(b" \r\n"), b"");
    }

    #[test]
    fn repeated_receive_errors_back_off_up_to_a_cap() {
        assert_eq!(recv_backoff(1), Duration::from_millis(10));
        assert_eq!(recv_backoff(2), Duration::from_millis(20));
        assert_eq!(recv_backoff(5), Duration::from_millis(160));
        assert_eq!(recv_backoff(8), Duration::from_secs(1));
        assert_eq!(recv_backoff(u32::MAX), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn file_lines_are_trimmed_and_queued_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.dat");
        std::fs::write(&path, b"first\r\n  second  \n\nlast").unwrap();
        let queue = Arc::new(DeliveryQueue::new(QueuePolicy::Unbounded));

        let mut source = FileIngress::open(&path).await.unwrap();
        let exit = source
            .run(&handler(&queue, "file:///in.dat"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(exit, SourceExit::EndOfInput);
        let mut payloads = Vec::new();
        while !queue.is_empty() {
            payloads.push(queue.pop().await.unwrap().payload);
        }
        assert_eq!(
            payloads,
            vec![b"first".to_vec(), b"second".to_vec(), b"".to_vec(), b"last".to_vec()]
        );
    }

    #[tokio::test]
    async fn missing_file_is_a_file_access_error() {
        let dir = tempfile::tempdir().unwrap();

        let result = FileIngress::open(&dir.path().join("absent.dat")).await;

        assert!(matches!(result, Err(SourceError::FileAccess { .. })));
    }

    #[tokio::test]
    async fn udp_source_forwards_datagrams_until_cancelled() {
        let queue = Arc::new(DeliveryQueue::new(QueuePolicy::Unbounded));
        let mut source = UdpIngress::bind(&HostPort::new("127.0.0.1", 0), 8192)
            .await
            .unwrap();
        let bound = source.local_address().unwrap();
        let cancel = CancellationToken::new();

        let task = {
            let handler = handler(&queue, "127.0.0.1:0");
            let cancel = cancel.clone();
            tokio::spawn(async move { source.run(&handler, &cancel).await })
        };

        let client = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"hello\n", bound).await.unwrap();

        let message = tokio::time::timeout(Duration::from_secs(2), queue.pop())
            .await
            .expect("datagram should be queued")
            .unwrap();
        assert_eq!(message.payload, b"hello".to_vec());
        assert_eq!(&*message.source_key, "127.0.0.1:0");

        cancel.cancel();
        let exit = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("source should stop")
            .unwrap()
            .unwrap();
        assert_eq!(exit, SourceExit::Cancelled);
    }

    #[tokio::test]
    async fn bind_conflict_marks_task_failed() {
        let occupied = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = occupied.local_addr().unwrap().port();
        let queue = Arc::new(DeliveryQueue::new(QueuePolicy::Unbounded));
        let (status_tx, mut status_rx) = watch::channel(SourceStatus::default());

        run_ingress_task(
            SourceEndpoint::Network(HostPort::new("127.0.0.1", port)),
            handler(&queue, "127.0.0.1"),
            status_tx,
            CancellationToken::new(),
            8192,
        )
        .await;

        let state = status_rx.borrow_and_update().state.clone();
        match state {
            SourceState::Failed(reason) => assert!(reason.contains(&port.to_string())),
            other => panic!("expected failed state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn file_task_ends_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.dat");
        std::fs::write(&path, b"only line\n").unwrap();
        let queue = Arc::new(DeliveryQueue::new(QueuePolicy::Unbounded));
        let (status_tx, status_rx) = watch::channel(SourceStatus::default());

        run_ingress_task(
            SourceEndpoint::File(path),
            handler(&queue, "file"),
            status_tx,
            CancellationToken::new(),
            8192,
        )
        .await;

        assert_eq!(status_rx.borrow().state, SourceState::Stopped);
        assert_eq!(queue.len(), 1);
    }
}
