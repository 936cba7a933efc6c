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

//! Unvalidated routing rule as produced by a configuration front end.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One routing rule before validation.
///
/// The network side of the source is `source_ports` (bound on `localhost`)
/// and/or `source_hosts` (`host[:port]` tokens naming the bind address). It is
/// mutually exclusive with `source_file`. Empty lists count as absent.
///
/// ```
/// use syslog_streamer::RuleDescriptor;
///
/// let rule = RuleDescriptor::default()
///     .with_name("rule1")
///     .with_source_ports([514])
///     .with_dest_hosts(["localhost:666"])
///     .with_dest_files(["output.dat"]);
///
/// assert_eq!(rule.label(0), "rule1");
/// assert!(rule.has_network_source());
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "src_port")]
    pub source_ports: Option<Vec<u16>>,
    #[serde(default, rename = "src_host")]
    pub source_hosts: Option<Vec<String>>,
    #[serde(default, rename = "src_file")]
    pub source_file: Option<PathBuf>,
    #[serde(default, rename = "dst_host")]
    pub dest_hosts: Option<Vec<String>>,
    #[serde(default, rename = "dst_file")]
    pub dest_files: Option<Vec<PathBuf>>,
}

fn non_empty<T>(list: &Option<Vec<T>>) -> bool {
    list.as_ref().is_some_and(|items| !items.is_empty())
}

impl RuleDescriptor {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_source_ports(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.source_ports = Some(ports.into_iter().collect());
        self
    }

    pub fn with_source_hosts<S: Into<String>>(mut self, hosts: impl IntoIterator<Item = S>) -> Self {
        self.source_hosts = Some(hosts.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_source_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_file = Some(path.into());
        self
    }

    pub fn with_dest_hosts<S: Into<String>>(mut self, hosts: impl IntoIterator<Item = S>) -> Self {
        self.dest_hosts = Some(hosts.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_dest_files<P: Into<PathBuf>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.dest_files = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Name used in error messages: the section name, or its 1-based position.
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("rule #{}", index + 1),
        }
    }

    pub fn has_network_source(&self) -> bool {
        non_empty(&self.source_ports) || non_empty(&self.source_hosts)
    }

    pub fn has_file_source(&self) -> bool {
        self.source_file
            .as_ref()
            .is_some_and(|path| !path.as_os_str().is_empty())
    }

    pub fn has_destination(&self) -> bool {
        non_empty(&self.dest_hosts) || non_empty(&self.dest_files)
    }
}
