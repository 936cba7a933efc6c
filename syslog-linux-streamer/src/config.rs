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

use crate::error::StreamerAppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use syslog_streamer::codec::{Facility, PacketTemplate, PriEncoding, Severity};
use syslog_streamer::{QueuePolicy, RuleDescriptor, StreamerOptions, DEFAULT_RECV_BUFFER_SIZE};

const DEFAULT_QUEUE_CAPACITY: usize = 4096;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub(crate) streamer: StreamerConfig,
    pub(crate) rules: Vec<RuleDescriptor>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct StreamerConfig {
    #[serde(default)]
    pub(crate) queue: QueueConfig,
    #[serde(default)]
    pub(crate) packet: PacketConfig,
    #[serde(default = "default_recv_buffer_size")]
    pub(crate) recv_buffer_size: usize,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum QueuePolicyKind {
    #[default]
    Unbounded,
    Block,
    DropOldest,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    #[serde(default)]
    pub(crate) policy: QueuePolicyKind,
    #[serde(default = "default_queue_capacity")]
    pub(crate) capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            policy: QueuePolicyKind::default(),
            capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct PacketConfig {
    #[serde(default)]
    pub(crate) facility: Option<String>,
    #[serde(default)]
    pub(crate) severity: Option<String>,
    #[serde(default)]
    pub(crate) tag: Option<String>,
    #[serde(default)]
    pub(crate) pid: bool,
    #[serde(default)]
    pub(crate) hostname: Option<String>,
    #[serde(default)]
    pub(crate) pri_encoding: Option<String>,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_recv_buffer_size() -> usize {
    DEFAULT_RECV_BUFFER_SIZE
}

impl QueueConfig {
    pub(crate) fn policy(&self) -> QueuePolicy {
        match self.policy {
            QueuePolicyKind::Unbounded => QueuePolicy::Unbounded,
            QueuePolicyKind::Block => QueuePolicy::Block {
                capacity: self.capacity,
            },
            QueuePolicyKind::DropOldest => QueuePolicy::DropOldest {
                capacity: self.capacity,
            },
        }
    }
}

impl PacketConfig {
    pub(crate) fn template(&self) -> Result<PacketTemplate, StreamerAppError> {
        let mut template = PacketTemplate::default();
        if let Some(facility) = &self.facility {
            template.facility = facility.parse::<Facility>()?;
        }
        if let Some(severity) = &self.severity {
            template.severity = severity.parse::<Severity>()?;
        }
        if let Some(encoding) = &self.pri_encoding {
            template.encoding = encoding
                .parse::<PriEncoding>()
                .map_err(StreamerAppError::PriEncoding)?;
        }
        template.tag = self.tag.clone();
        template.pid = self.pid.then(std::process::id);
        template.hostname = self.hostname.clone();
        Ok(template)
    }
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            queue: QueueConfig::default(),
            packet: PacketConfig::default(),
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }
}

impl StreamerConfig {
    pub(crate) fn options(&self) -> Result<StreamerOptions, StreamerAppError> {
        Ok(StreamerOptions {
            queue_policy: self.queue.policy(),
            packet: self.packet.template()?,
            recv_buffer_size: self.recv_buffer_size,
        })
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, StreamerAppError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| StreamerAppError::ReadConfig {
                path: path.to_path_buf(),
                source,
            })?;
        json5::from_str(&contents).map_err(|source| StreamerAppError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }
}
