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

//! Error types for flow-table construction, ingestion, sinks and delivery.

use std::path::PathBuf;
use thiserror::Error;

/// The invariant a routing rule violated.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ConfigErrorKind {
    #[error("invalid hostname '{0}'")]
    InvalidHostname(String),

    #[error("invalid port in host token '{0}'")]
    InvalidPort(String),

    #[error("no source configured, exactly one of source ports or source file is required")]
    MissingSource,

    #[error("conflicting sources, source ports and source file are mutually exclusive")]
    ConflictingSource,

    #[error("no destination configured, at least one destination host or file is required")]
    MissingDestination,

    #[error("loop detected: {0} --> {0}")]
    LoopDetected(String),
}

/// Construction-time failure; no relaying starts when one is returned.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("rule '{rule}': {kind}")]
pub struct ConfigError {
    pub rule: String,
    pub kind: ConfigErrorKind,
}

impl ConfigError {
    pub fn new(rule: impl Into<String>, kind: ConfigErrorKind) -> Self {
        Self {
            rule: rule.into(),
            kind,
        }
    }

    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}

/// Failure that ends a single ingestion task. Sibling sources keep running.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read source file {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure that disables a single file sink. Other sinks keep receiving.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to access sink file {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One failed datagram send during best-effort fan-out.
#[derive(Debug, Error)]
#[error("failed to deliver to {destination}: {source}")]
pub struct DeliveryError {
    pub destination: String,
    #[source]
    pub source: std::io::Error,
}

/// Engine lifecycle failures.
#[derive(Debug, Error)]
pub enum StreamerError {
    #[error("streamer '{0}' is already started")]
    AlreadyStarted(String),

    #[error("streamer '{0}' was never started")]
    NotStarted(String),

    #[error("unable to open egress socket: {0}")]
    EgressSocket(#[source] std::io::Error),

    #[error("dispatch task terminated abnormally: {0}")]
    DispatchTask(String),
}
