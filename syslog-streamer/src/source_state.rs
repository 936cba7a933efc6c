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

//! Run status of one ingestion task.

use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

/// `Idle -> Running -> (Stopped | Failed)`. A source that cannot be opened
/// goes from `Idle` straight to `Failed`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum SourceState {
    #[default]
    Idle,
    Running,
    Stopped,
    Failed(String),
}

impl SourceState {
    pub fn is_finished(&self) -> bool {
        matches!(self, SourceState::Stopped | SourceState::Failed(_))
    }
}

impl Display for SourceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceState::Idle => write!(f, "idle"),
            SourceState::Running => write!(f, "running"),
            SourceState::Stopped => write!(f, "stopped"),
            SourceState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Snapshot published by an ingestion task.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SourceStatus {
    pub state: SourceState,
    /// Local address of a bound UDP source, once bound.
    pub bound_address: Option<SocketAddr>,
}

impl SourceStatus {
    pub fn running(bound_address: Option<SocketAddr>) -> Self {
        Self {
            state: SourceState::Running,
            bound_address,
        }
    }
}
