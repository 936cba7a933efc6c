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

//! Source and destination endpoints and their canonical identity strings.

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Port used when a host token carries no explicit `:port`.
pub const DEFAULT_SYSLOG_PORT: u16 = 514;

/// Scheme prefix of every file endpoint identity.
pub const FILE_SCHEME: &str = "file://";

/// Host that port-only sources bind to.
pub const LOCAL_SOURCE_HOST: &str = "localhost";

/// A validated `host:port` pair.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct HostPort {
    pub host: String,
    pub port: u16,
}

impl HostPort {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Display for HostPort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

fn file_identity(path: &Path) -> String {
    format!("{FILE_SCHEME}{}", path.display())
}

/// [`SourceEndpoint`] is where messages are ingested from: a local UDP port or a
/// file replayed line by line.
///
/// Its identity is the canonical string used as the routing table key.
///
/// ```
/// use syslog_streamer::{HostPort, SourceEndpoint};
///
/// let udp = SourceEndpoint::Network(HostPort::new("localhost", 514));
/// assert_eq!(udp.identity(), "localhost:514");
///
/// let file = SourceEndpoint::File("/var/log/in.dat".into());
/// assert_eq!(file.identity(), "file:///var/log/in.dat");
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SourceEndpoint {
    Network(HostPort),
    File(PathBuf),
}

impl SourceEndpoint {
    pub fn identity(&self) -> String {
        match self {
            SourceEndpoint::Network(address) => address.to_string(),
            SourceEndpoint::File(path) => file_identity(path),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, SourceEndpoint::File(_))
    }
}

impl Display for SourceEndpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identity())
    }
}

/// Where messages are delivered to: a remote syslog host or an append-only file.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum DestinationEndpoint {
    Network(HostPort),
    File(PathBuf),
}

impl DestinationEndpoint {
    pub fn identity(&self) -> String {
        match self {
            DestinationEndpoint::Network(address) => address.to_string(),
            DestinationEndpoint::File(path) => file_identity(path),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, DestinationEndpoint::File(_))
    }
}

impl Display for DestinationEndpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identity())
    }
}
