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

//! Full packet assembly and the per-streamer packet template.

use crate::codec::header::Header;
use crate::codec::msg::Msg;
use crate::codec::priority::{Facility, Pri, PriEncoding, Severity};

/// Bytes past this length are cut before the datagram is sent.
pub const MAX_PACKET_LEN: usize = 1024;

/// `PRI HEADER MSG`, serialized and bounded to [`MAX_PACKET_LEN`] bytes.
///
/// ```
/// use syslog_streamer::codec::{Facility, Header, Msg, Packet, Pri, Severity};
///
/// let packet = Packet::new(
///     Pri::new(Facility::User, Severity::Info),
///     Header::new(Some("Jun  1 18:34:03"), Some("myhost")),
///     Msg::new(Some("myprog"), b"Hello World", None),
/// );
///
/// assert_eq!(
///     packet.to_bytes(),
///     b"<14> Jun  1 18:34:03 myhost myprog: Hello World".to_vec()
/// );
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Packet {
    pub pri: Pri,
    pub header: Header,
    pub msg: Msg,
}

impl Packet {
    pub fn new(pri: Pri, header: Header, msg: Msg) -> Self {
        Self { pri, header, msg }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = format!("{} {} ", self.pri, self.header).into_bytes();
        self.msg.encode_into(&mut buf);
        buf.truncate(MAX_PACKET_LEN);
        buf
    }
}

/// Fixed packet fields applied to every relayed payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PacketTemplate {
    pub facility: Facility,
    pub severity: Severity,
    pub encoding: PriEncoding,
    pub tag: Option<String>,
    pub pid: Option<u32>,
    pub hostname: Option<String>,
}

impl Default for PacketTemplate {
    fn default() -> Self {
        Self {
            facility: Facility::User,
            severity: Severity::Info,
            encoding: PriEncoding::default(),
            tag: None,
            pid: None,
            hostname: None,
        }
    }
}

impl PacketTemplate {
    /// Wraps `content` with a fresh header stamped with the current local time.
    pub fn build(&self, content: &[u8]) -> Packet {
        Packet::new(
            Pri::new(self.facility, self.severity).with_encoding(self.encoding),
            Header::new(None, self.hostname.as_deref()),
            Msg::new(self.tag.as_deref(), content, self.pid),
        )
    }
}
