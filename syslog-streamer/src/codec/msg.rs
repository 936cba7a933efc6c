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

//! MSG part of an RFC 3164 packet: tag, optional pid and content.

use lazy_static::lazy_static;
use std::path::Path;

pub const MAX_TAG_LEN: usize = 32;

const TAG_CONTENT_SEPARATOR: &[u8] = b": ";
const FALLBACK_PROGRAM_NAME: &str = "syslog-streamer";

lazy_static! {
    static ref PROGRAM_NAME: String = std::env::args_os()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_PROGRAM_NAME.to_string());
}

/// Name of the running program, the default tag.
pub fn program_name() -> &'static str {
    PROGRAM_NAME.as_str()
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Msg {
    tag: String,
    pid: Option<u32>,
    content: Vec<u8>,
}

impl Msg {
    pub fn new(tag: Option<&str>, content: &[u8], pid: Option<u32>) -> Self {
        let tag = tag
            .unwrap_or_else(|| program_name())
            .chars()
            .take(MAX_TAG_LEN)
            .collect();

        Self {
            tag,
            pid,
            content: separate_content(content),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Content as it will appear on the wire, separator included.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub(crate) fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.tag.as_bytes());
        if let Some(pid) = self.pid {
            buf.extend_from_slice(format!("[{pid}]").as_bytes());
        }
        buf.extend_from_slice(&self.content);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.tag.len() + self.content.len() + 12);
        self.encode_into(&mut buf);
        buf
    }
}

// Tag and content must be split by a non-alphanumeric character.
fn separate_content(content: &[u8]) -> Vec<u8> {
    match content.first() {
        Some(first) if first.is_ascii_alphanumeric() => {
            let mut separated = Vec::with_capacity(content.len() + TAG_CONTENT_SEPARATOR.len());
            separated.extend_from_slice(TAG_CONTENT_SEPARATOR);
            separated.extend_from_slice(content);
            separated
        }
        _ => content.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::{program_name, Msg, MAX_TAG_LEN};

    #[test]
    fn alphanumeric_content_gets_separator() {
        let msg = Msg::new(Some("myprog"), b"Hello World", None);

        assert_eq!(msg.to_bytes(), b"myprog: Hello World".to_vec());
    }

    #[test]
    fn punctuated_content_is_left_alone() {
        let msg = Msg::new(Some("myprog"), b"[42]: already separated", None);

        assert_eq!(msg.to_bytes(), b"myprog[42]: already separated".to_vec());
    }

    #[test]
    fn pid_sits_between_tag_and_separated_content() {
        let msg = Msg::new(Some("myprog"), b"Hello", Some(1234));

        assert_eq!(msg.to_bytes(), b"myprog[1234]: Hello".to_vec());
    }

    #[test]
    fn empty_content_adds_nothing() {
        let msg = Msg::new(Some("myprog"), b"", None);

        assert_eq!(msg.to_bytes(), b"myprog".to_vec());
    }

    #[test]
    fn long_tag_is_truncated() {
        let tag = "t".repeat(40);
        let msg = Msg::new(Some(&tag), b"x", None);

        assert_eq!(msg.tag().chars().count(), MAX_TAG_LEN);
    }

    #[test]
    fn missing_tag_defaults_to_program_name() {
        let msg = Msg::new(None, b"x", None);

        let expected: String = program_name().chars().take(MAX_TAG_LEN).collect();
        assert_eq!(msg.tag(), expected);
    }
}
