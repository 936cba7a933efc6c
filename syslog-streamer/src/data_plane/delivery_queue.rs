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

//! Shared FIFO between ingestion tasks and the single dispatch task.

use crate::observability::events;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex as AsyncMutex, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const COMPONENT: &str = "delivery_queue";

/// One payload waiting for fan-out, tagged with the source it came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueuedMessage {
    pub source_key: Arc<str>,
    pub payload: Vec<u8>,
}

impl QueuedMessage {
    pub fn new(source_key: Arc<str>, payload: Vec<u8>) -> Self {
        Self {
            source_key,
            payload,
        }
    }
}

/// What happens when producers outrun the dispatch task.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum QueuePolicy {
    /// Never rejects or drops; memory grows with the backlog.
    #[default]
    Unbounded,
    /// Producers wait for room once `capacity` messages are queued.
    Block { capacity: usize },
    /// The oldest queued message is discarded to make room.
    DropOldest { capacity: usize },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PushOutcome {
    Queued,
    EvictedOldest,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("delivery queue is closed")]
pub struct QueueClosed;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

enum Backend {
    Unbounded {
        tx: Mutex<Option<mpsc::UnboundedSender<QueuedMessage>>>,
        rx: AsyncMutex<mpsc::UnboundedReceiver<QueuedMessage>>,
    },
    Bounded {
        tx: Mutex<Option<mpsc::Sender<QueuedMessage>>>,
        rx: AsyncMutex<mpsc::Receiver<QueuedMessage>>,
    },
    // mpsc cannot evict from the front, so drop-oldest keeps its own ring.
    Ring {
        capacity: usize,
        messages: Mutex<VecDeque<QueuedMessage>>,
        not_empty: Notify,
    },
}

/// Many-producer, single-consumer queue with a configurable full policy.
///
/// After [`DeliveryQueue::close`] pushes fail, while [`DeliveryQueue::pop`]
/// keeps returning queued messages until the backlog is drained.
pub struct DeliveryQueue {
    policy: QueuePolicy,
    backend: Backend,
    closed: CancellationToken,
    // Signed: a pop may be counted before the matching push.
    queued: AtomicIsize,
}

impl DeliveryQueue {
    pub fn new(policy: QueuePolicy) -> Self {
        let backend = match policy {
            QueuePolicy::Unbounded => {
                let (tx, rx) = mpsc::unbounded_channel();
                Backend::Unbounded {
                    tx: Mutex::new(Some(tx)),
                    rx: AsyncMutex::new(rx),
                }
            }
            QueuePolicy::Block { capacity } => {
                let (tx, rx) = mpsc::channel(capacity.max(1));
                Backend::Bounded {
                    tx: Mutex::new(Some(tx)),
                    rx: AsyncMutex::new(rx),
                }
            }
            QueuePolicy::DropOldest { capacity } => Backend::Ring {
                capacity: capacity.max(1),
                messages: Mutex::new(VecDeque::new()),
                not_empty: Notify::new(),
            },
        };
        Self {
            policy,
            backend,
            closed: CancellationToken::new(),
            queued: AtomicIsize::new(0),
        }
    }

    pub fn policy(&self) -> QueuePolicy {
        self.policy
    }

    pub async fn push(&self, message: QueuedMessage) -> Result<PushOutcome, QueueClosed> {
        if self.closed.is_cancelled() {
            return Err(QueueClosed);
        }

        let outcome = match &self.backend {
            Backend::Unbounded { tx, .. } => {
                let guard = lock(tx);
                let tx = guard.as_ref().ok_or(QueueClosed)?;
                tx.send(message).map_err(|_| QueueClosed)?;
                PushOutcome::Queued
            }
            Backend::Bounded { tx, .. } => {
                let tx = lock(tx).clone().ok_or(QueueClosed)?;
                tokio::select! {
                    biased;

                    _ = self.closed.cancelled() => return Err(QueueClosed),

                    sent = tx.send(message) => sent.map_err(|_| QueueClosed)?,
                }
                PushOutcome::Queued
            }
            Backend::Ring {
                capacity,
                messages,
                not_empty,
            } => {
                let outcome = {
                    let mut messages = lock(messages);
                    if self.closed.is_cancelled() {
                        return Err(QueueClosed);
                    }
                    let mut outcome = PushOutcome::Queued;
                    if messages.len() >= *capacity {
                        if let Some(evicted) = messages.pop_front() {
                            self.queued.fetch_sub(1, Ordering::AcqRel);
                            warn!(
                                event = events::QUEUE_EVICTED_OLDEST,
                                component = COMPONENT,
                                source = evicted.source_key.as_ref(),
                                capacity = *capacity,
                                "queue full, dropped oldest message"
                            );
                        }
                        outcome = PushOutcome::EvictedOldest;
                    }
                    messages.push_back(message);
                    outcome
                };
                not_empty.notify_one();
                outcome
            }
        };

        self.queued.fetch_add(1, Ordering::AcqRel);
        Ok(outcome)
    }

    /// Waits for the next message. `None` once closed and drained.
    pub async fn pop(&self) -> Option<QueuedMessage> {
        let message = match &self.backend {
            Backend::Unbounded { rx, .. } => rx.lock().await.recv().await,
            Backend::Bounded { rx, .. } => rx.lock().await.recv().await,
            Backend::Ring {
                messages,
                not_empty,
                ..
            } => loop {
                {
                    let mut messages = lock(messages);
                    if let Some(message) = messages.pop_front() {
                        break Some(message);
                    }
                    if self.closed.is_cancelled() {
                        break None;
                    }
                }
                // A notify_one issued before this point leaves a stored permit,
                // so a push between the check and the wait is not missed.
                not_empty.notified().await;
            },
        };

        if message.is_some() {
            self.queued.fetch_sub(1, Ordering::AcqRel);
        }
        message
    }

    /// Rejects further pushes and releases blocked producers. Once the
    /// backlog is popped, `pop` returns `None`.
    pub fn close(&self) {
        self.closed.cancel();
        match &self.backend {
            Backend::Unbounded { tx, .. } => drop(lock(tx).take()),
            Backend::Bounded { tx, .. } => drop(lock(tx).take()),
            // Leaves a permit if the consumer is between its check and its wait.
            Backend::Ring { not_empty, .. } => not_empty.notify_one(),
        }
        debug!(
            event = events::QUEUE_CLOSED,
            component = COMPONENT,
            backlog = self.len(),
            "delivery queue closed"
        );
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    pub fn len(&self) -> usize {
        self.queued.load(Ordering::Acquire).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
